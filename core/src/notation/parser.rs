use core::ops::Range;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;

use crate::adaptor::Signature;
use crate::values::Tag;

#[derive(Parser)]
#[grammar = "notation/notation.pest"]
pub struct NotationParser;

/// A malformed declaration or script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// Byte range in the parsed source.
    pub span: Range<usize>,
}

impl SyntaxError {
    fn at(pair: &Pair<'_, Rule>, message: impl Into<String>) -> Self {
        let span = pair.as_span();
        SyntaxError {
            message: message.into(),
            span: span.start()..span.end(),
        }
    }
}

impl From<pest::error::Error<Rule>> for SyntaxError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.location {
            pest::error::InputLocation::Pos(pos) => pos..pos,
            pest::error::InputLocation::Span((start, end)) => start..end,
        };
        SyntaxError {
            message: err.variant.message().into_owned(),
            span,
        }
    }
}

/// A parameter as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParam {
    pub name: String,
    pub tag: Tag,
    pub span: Range<usize>,
}

/// One parsed stack-effect declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub inputs: Vec<DeclaredParam>,
    pub outputs: Vec<DeclaredParam>,
    pub name_span: Range<usize>,
    pub span: Range<usize>,
}

impl Declaration {
    /// Parses exactly one declaration.
    ///
    /// ```
    /// use quadgl_core::notation::Declaration;
    ///
    /// let decl = Declaration::parse("GetVersion( -- major:i64 minor:i64 )").unwrap();
    /// assert_eq!(decl.name, "GetVersion");
    /// assert_eq!(decl.outputs.len(), 2);
    /// ```
    pub fn parse(source: &str) -> Result<Declaration, SyntaxError> {
        let mut pairs = NotationParser::parse(Rule::single_declaration, source)?;
        let root = pairs.next().ok_or_else(|| SyntaxError {
            message: "empty input".into(),
            span: 0..0,
        })?;
        let pair = root
            .into_inner()
            .find(|pair| pair.as_rule() == Rule::declaration)
            .ok_or_else(|| SyntaxError {
                message: "expected a declaration".into(),
                span: 0..source.len(),
            })?;
        build_declaration(pair)
    }

    /// Whether arity and tags agree with `signature` (names are ignored).
    pub fn matches(&self, signature: &Signature) -> bool {
        self.name == signature.name
            && same_tags(&self.inputs, signature.inputs.iter().map(|p| p.tag))
            && same_tags(&self.outputs, signature.outputs.iter().map(|p| p.tag))
    }
}

fn same_tags(declared: &[DeclaredParam], expected: impl ExactSizeIterator<Item = Tag>) -> bool {
    declared.len() == expected.len() && declared.iter().map(|p| p.tag).eq(expected)
}

/// Parses a file of declarations, skipping blank lines and `//` comments.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>, SyntaxError> {
    let pairs = NotationParser::parse(Rule::declaration_file, source)?;
    let mut declarations = Vec::new();
    for root in pairs {
        for pair in root.into_inner() {
            if pair.as_rule() == Rule::declaration {
                declarations.push(build_declaration(pair)?);
            }
        }
    }
    Ok(declarations)
}

fn build_declaration(pair: Pair<'_, Rule>) -> Result<Declaration, SyntaxError> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();

    let name_pair = inner
        .next()
        .ok_or_else(|| SyntaxError {
            message: "missing operation name".into(),
            span: span.start()..span.end(),
        })?;
    let name_span = name_pair.as_span();

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for side in inner {
        let params = match side.as_rule() {
            Rule::inputs => &mut inputs,
            Rule::outputs => &mut outputs,
            _ => continue,
        };
        for param in side.into_inner() {
            params.push(build_param(param)?);
        }
    }

    Ok(Declaration {
        name: name_pair.as_str().to_string(),
        inputs,
        outputs,
        name_span: name_span.start()..name_span.end(),
        span: span.start()..span.end(),
    })
}

fn build_param(pair: Pair<'_, Rule>) -> Result<DeclaredParam, SyntaxError> {
    let span = pair.as_span();
    let mut inner = pair.clone().into_inner();
    let (Some(name), Some(tag)) = (inner.next(), inner.next()) else {
        return Err(SyntaxError::at(&pair, "expected `name:type`"));
    };
    let tag_value = Tag::from_name(tag.as_str())
        .ok_or_else(|| SyntaxError::at(&tag, format!("unknown type `{}`", tag.as_str())))?;
    Ok(DeclaredParam {
        name: name.as_str().to_string(),
        tag: tag_value,
        span: span.start()..span.end(),
    })
}

/// One token of a word script.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub kind: WordKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WordKind {
    Int(i64),
    Float(f64),
    Str(String),
    /// An operation or a named constant.
    Name(String),
}

/// Splits a word script into literals and names.
///
/// ```
/// use quadgl_core::notation::{parse_script, WordKind};
///
/// let words = parse_script("0x8B31 CreateShader").unwrap();
/// assert_eq!(words[0].kind, WordKind::Int(0x8B31));
/// assert_eq!(words[1].kind, WordKind::Name("CreateShader".into()));
/// ```
pub fn parse_script(source: &str) -> Result<Vec<Word>, SyntaxError> {
    let pairs = NotationParser::parse(Rule::script, source)?;
    let mut words = Vec::new();
    for root in pairs {
        for pair in root.into_inner() {
            if pair.as_rule() == Rule::EOI {
                continue;
            }
            let span = pair.as_span();
            let kind = build_word(&pair)?;
            words.push(Word {
                kind,
                span: span.start()..span.end(),
            });
        }
    }
    Ok(words)
}

fn build_word(pair: &Pair<'_, Rule>) -> Result<WordKind, SyntaxError> {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::integer => text
            .parse()
            .map(WordKind::Int)
            .map_err(|_| SyntaxError::at(pair, "integer literal out of range")),
        Rule::hex => {
            let (sign, rest) = match text.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", text),
            };
            let digits = rest.strip_prefix("0x").unwrap_or(rest);
            // The sign goes through the parser so that i64::MIN fits.
            i64::from_str_radix(&format!("{sign}{digits}"), 16)
                .map(WordKind::Int)
                .map_err(|_| SyntaxError::at(pair, "hex literal out of range"))
        }
        Rule::float => text
            .parse()
            .map(WordKind::Float)
            .map_err(|_| SyntaxError::at(pair, "invalid float literal")),
        Rule::string => {
            let body = pair
                .clone()
                .into_inner()
                .next()
                .map(|body| body.as_str())
                .unwrap_or_default();
            unescape(body).map(WordKind::Str).map_err(|message| SyntaxError::at(pair, message))
        }
        Rule::ident => Ok(WordKind::Name(text.to_string())),
        rule => Err(SyntaxError::at(pair, format!("unexpected {:?}", rule))),
    }
}

fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(format!("unknown escape `\\{}`", other)),
            None => return Err("dangling `\\` at end of string".into()),
        }
    }
    Ok(out)
}
