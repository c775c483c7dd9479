//! Test the #[stack_fn] macro

use pretty_assertions::assert_eq;
use quadgl_core::{Context, Operation, Pointer, StackElement, Tag, Text};
use quadgl_macros::stack_fn;

/// Host that remembers every call.
#[derive(Default)]
struct Journal {
    entries: Vec<String>,
}

#[stack_fn(name = "Note")]
fn note(journal: &mut Journal, text: Text) {
    journal.entries.push(text.to_string());
}

#[stack_fn(name = "Count", returns = "count")]
fn count(journal: &mut Journal) -> i64 {
    journal.entries.len() as i64
}

#[stack_fn(name = "DivMod", returns = "quotient, remainder")]
fn div_mod(_journal: &mut Journal, a: i64, b: i64) -> (i64, i64) {
    (a / b, a % b)
}

#[stack_fn(name = "Describe", returns = "summary")]
fn describe(_journal: &mut Journal, r#type: i64, scale: f64, data: Pointer) -> Text {
    Text::from(format!("{} {} {}", r#type, scale, data.is_null()))
}

#[test]
fn test_generated_signatures() {
    assert_eq!(Note.signature().to_string(), "Note( text:str -- )");
    assert_eq!(Count.signature().to_string(), "Count( -- count:i64 )");
    assert_eq!(
        DivMod.signature().to_string(),
        "DivMod( a:i64 b:i64 -- quotient:i64 remainder:i64 )"
    );
    assert_eq!(
        Describe.signature().to_string(),
        "Describe( type:i64 scale:f64 data:ptr -- summary:str )"
    );
    assert_eq!(DivMod::NAME, "DivMod");
}

#[test]
fn test_signature_is_static() {
    assert!(std::ptr::eq(Count.signature(), Count.signature()));
}

#[test]
fn test_unit_return_pushes_nothing() {
    let mut journal = Journal::default();
    let mut ctx = Context::default();
    ctx.push("hello");
    ctx.call(&mut journal, &Note);
    assert!(ctx.stack().is_empty());
    assert_eq!(journal.entries, vec!["hello"]);
}

#[test]
fn test_tuple_outputs_first_deepest() {
    let mut ctx = Context::default();
    ctx.push(17i64);
    ctx.push(5i64);
    ctx.call(&mut Journal::default(), &DivMod);
    assert_eq!(
        ctx.stack().as_slice(),
        &[StackElement::Int(3), StackElement::Int(2)]
    );
}

#[test]
fn test_arguments_arrive_in_push_order() {
    let mut ctx = Context::default();
    ctx.push(7i64);
    ctx.push(0.5);
    ctx.push(Pointer::NULL);
    ctx.call(&mut Journal::default(), &Describe);
    assert_eq!(ctx.pop(), Some(StackElement::from("7 0.5 true")));
    assert!(ctx.stack().is_empty());
}

#[test]
fn test_violation_leaves_host_untouched() {
    let mut journal = Journal::default();
    let mut ctx = Context::default();
    ctx.push(1i64);

    let err = ctx.try_call(&mut journal, &Note).unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(journal.entries.is_empty());

    let err = ctx.try_call(&mut journal, &DivMod).unwrap_err();
    assert!(err.is_underflow());
    assert_eq!(ctx.stack().as_slice(), &[StackElement::Int(1)]);
}

#[test]
fn test_output_tags() {
    let outputs: Vec<Tag> = DivMod.signature().outputs.iter().map(|p| p.tag).collect();
    assert_eq!(outputs, vec![Tag::Int, Tag::Int]);
    assert_eq!(Describe.signature().outputs[0].tag, Tag::Str);
}

/// Native subsystem reached through a trait object, as the GL binding does.
trait Tally {
    fn add(&mut self, value: i64) -> i64;
}

impl Tally for Journal {
    fn add(&mut self, value: i64) -> i64 {
        self.entries.push(value.to_string());
        self.entries.len() as i64
    }
}

#[stack_fn(name = "Add", returns = "entries")]
fn add(tally: &mut dyn Tally, value: i64) -> i64 {
    tally.add(value)
}

static TALLY_OPS: &[&dyn Operation<dyn Tally>] = &[&Add];

fn run_all(tally: &mut (dyn Tally + 'static), ctx: &mut Context) {
    for operation in TALLY_OPS {
        ctx.push(7i64);
        ctx.call(tally, *operation);
    }
}

#[test]
fn test_trait_object_host() {
    let mut journal = Journal::default();
    let mut ctx = Context::default();
    run_all(&mut journal, &mut ctx);

    assert_eq!(Add.signature().to_string(), "Add( value:i64 -- entries:i64 )");
    assert_eq!(ctx.stack().as_slice(), &[StackElement::Int(1)]);
    assert_eq!(journal.entries, vec!["7"]);
}
