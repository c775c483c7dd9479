//! Implementation of the `#[stack_fn]` attribute macro

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{
    Expr, FnArg, ItemFn, Lifetime, Lit, LitStr, Meta, Pat, PatType, ReturnType, Token, Type,
    TypeParamBound, parse_macro_input,
};

pub fn stack_fn_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    let attrs = match parse_attribute(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };

    let sig_info = match parse_function_signature(&input_fn) {
        Ok(info) => info,
        Err(err) => return err.to_compile_error().into(),
    };

    match generate_code(&attrs, &sig_info, &input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Arguments of `#[stack_fn(...)]`
struct StackFnAttrs {
    name: LitStr,
    /// Output names, with the literal they came from for error spans
    returns: Option<(Vec<String>, LitStr)>,
}

/// Information extracted from the function signature
struct SignatureInfo {
    fn_name: syn::Ident,
    /// `H` in the leading `host: &mut H` parameter
    host_type: Box<Type>,
    /// Parameter names and types (excluding the host)
    params: Vec<(syn::Ident, Box<Type>)>,
    /// One entry per pushed value; empty for `()`
    outputs: Vec<Type>,
}

fn string_value(meta_value: &Expr) -> syn::Result<LitStr> {
    if let Expr::Lit(expr_lit) = meta_value {
        if let Lit::Str(lit) = &expr_lit.lit {
            return Ok(lit.clone());
        }
    }
    Err(syn::Error::new_spanned(
        meta_value,
        "expected a string literal",
    ))
}

/// Parse `name = "Op"` and the optional `returns = "a, b"`
fn parse_attribute(attr: TokenStream) -> syn::Result<StackFnAttrs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse(attr)?;

    let mut name = None;
    let mut returns = None;
    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected attribute format: #[stack_fn(name = \"Op\", returns = \"a, b\")]",
            ));
        };
        if nv.path.is_ident("name") {
            let lit = string_value(&nv.value)?;
            if syn::parse_str::<syn::Ident>(&lit.value()).is_err() {
                return Err(syn::Error::new_spanned(
                    &lit,
                    "name must be a valid identifier",
                ));
            }
            name = Some(lit);
        } else if nv.path.is_ident("returns") {
            let lit = string_value(&nv.value)?;
            let names: Vec<String> = lit
                .value()
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
            returns = Some((names, lit));
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "expected 'name' or 'returns'",
            ));
        }
    }

    let name = name.ok_or_else(|| {
        syn::Error::new(
            Span::call_site(),
            "missing 'name' attribute: #[stack_fn(name = \"Op\")]",
        )
    })?;
    Ok(StackFnAttrs { name, returns })
}

/// The host type as named in the `Operation<H>` impl header.
///
/// A bare `dyn Trait` behind `&mut` borrows the reference's lifetime, but in
/// an impl header it defaults to `'static`; spell that out so the generated
/// `invoke` matches the trait method.
fn static_host(elem: &Type) -> Box<Type> {
    let mut host = elem.clone();
    if let Type::TraitObject(object) = &mut host {
        let has_lifetime = object
            .bounds
            .iter()
            .any(|bound| matches!(bound, TypeParamBound::Lifetime(_)));
        if !has_lifetime {
            object
                .bounds
                .push(TypeParamBound::Lifetime(Lifetime::new("'static", Span::call_site())));
        }
    }
    Box::new(host)
}

/// Parse the function signature and extract host, parameter and output types
fn parse_function_signature(func: &ItemFn) -> syn::Result<SignatureInfo> {
    let fn_name = func.sig.ident.clone();

    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "stack_fn functions cannot be generic",
        ));
    }

    let mut inputs_iter = func.sig.inputs.iter();

    // First parameter: the native host
    let host_input = inputs_iter.next().ok_or_else(|| {
        syn::Error::new_spanned(&func.sig, "Missing host parameter (first parameter)")
    })?;
    let host_type = match host_input {
        FnArg::Typed(PatType { ty, .. }) => match &**ty {
            Type::Reference(reference) if reference.mutability.is_some() => {
                static_host(&reference.elem)
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    ty,
                    "First parameter must be the host as `&mut H`",
                ));
            }
        },
        FnArg::Receiver(_) => {
            return Err(syn::Error::new_spanned(
                host_input,
                "stack_fn cannot be applied to methods",
            ));
        }
    };

    // Remaining parameters are popped off the stack
    let mut params = Vec::new();
    for input in inputs_iter {
        let FnArg::Typed(PatType { pat, ty, .. }) = input else {
            return Err(syn::Error::new_spanned(input, "Expected typed parameter"));
        };
        let Pat::Ident(pat_ident) = &**pat else {
            return Err(syn::Error::new_spanned(pat, "Expected identifier pattern"));
        };
        params.push((pat_ident.ident.clone(), ty.clone()));
    }

    let outputs = match &func.sig.output {
        ReturnType::Default => Vec::new(),
        ReturnType::Type(_, ty) => match &**ty {
            Type::Tuple(tuple) => tuple.elems.iter().cloned().collect(),
            ty => vec![ty.clone()],
        },
    };

    Ok(SignatureInfo {
        fn_name,
        host_type,
        params,
        outputs,
    })
}

/// Generate the function, the operation struct and its `Operation` impl
fn generate_code(
    attrs: &StackFnAttrs,
    sig_info: &SignatureInfo,
    input_fn: &ItemFn,
) -> syn::Result<TokenStream2> {
    let op_name = attrs.name.value();
    let struct_name = syn::Ident::new(&op_name, attrs.name.span());
    let fn_name = &sig_info.fn_name;
    let host_type = &sig_info.host_type;
    // `&mut dyn A + 'static` does not parse without parentheses.
    let host_param = match &**host_type {
        Type::TraitObject(_) => quote! { &mut (#host_type) },
        _ => quote! { &mut #host_type },
    };

    let output_names: Vec<String> = match &attrs.returns {
        Some((names, lit)) => {
            if names.len() != sig_info.outputs.len() {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!(
                        "returns names {} output(s) but the function returns {}",
                        names.len(),
                        sig_info.outputs.len()
                    ),
                ));
            }
            names.clone()
        }
        None if sig_info.outputs.is_empty() => Vec::new(),
        None => {
            return Err(syn::Error::new_spanned(
                &input_fn.sig.output,
                "missing 'returns' attribute naming the outputs",
            ));
        }
    };

    let param_names: Vec<_> = sig_info.params.iter().map(|(name, _)| name).collect();
    let param_types: Vec<_> = sig_info.params.iter().map(|(_, ty)| ty).collect();
    let input_labels: Vec<String> = param_names
        .iter()
        .map(|name| name.unraw().to_string())
        .collect();
    let output_types = &sig_info.outputs;

    let push_outputs = match output_types.len() {
        0 => quote! {
            let () = result;
        },
        1 => quote! {
            ::quadgl_core::adaptor::push_result(stack, result);
        },
        n => {
            let bindings: Vec<_> = (0..n)
                .map(|i| syn::Ident::new(&format!("out{}", i), Span::call_site()))
                .collect();
            quote! {
                let ( #( #bindings ),* ) = result;
                #( ::quadgl_core::adaptor::push_result(stack, #bindings); )*
            }
        }
    };

    let struct_doc = format!("Stack operation `{}`, generated from `{}`.", op_name, fn_name);

    Ok(quote! {
        #input_fn

        #[doc = #struct_doc]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct #struct_name;

        impl #struct_name {
            pub const NAME: &'static str = #op_name;
        }

        impl ::quadgl_core::Operation<#host_type> for #struct_name {
            fn signature(&self) -> &'static ::quadgl_core::Signature {
                static SIGNATURE: ::quadgl_core::Signature = ::quadgl_core::Signature::new(
                    #op_name,
                    &[#(
                        ::quadgl_core::Param::new(
                            #input_labels,
                            <#param_types as ::quadgl_core::StackValue>::TAG,
                        )
                    ),*],
                    &[#(
                        ::quadgl_core::Param::new(
                            #output_names,
                            <#output_types as ::quadgl_core::StackValue>::TAG,
                        )
                    ),*],
                );
                &SIGNATURE
            }

            fn invoke(
                &self,
                host: #host_param,
                stack: &mut ::quadgl_core::Stack<::quadgl_core::StackElement>,
            ) -> ::core::result::Result<(), ::quadgl_core::AdaptorError> {
                let mut args = ::quadgl_core::adaptor::pop_args(
                    stack,
                    <Self as ::quadgl_core::Operation<#host_type>>::signature(self),
                )?;
                #( let #param_names = args.take::<#param_types>(); )*
                drop(args);

                let result = #fn_name(host, #( #param_names ),*);
                #push_outputs
                Ok(())
            }
        }
    })
}
