//! Unit tests for stack elements and tags.

use pretty_assertions::assert_eq;

use super::{Pointer, StackElement, Tag, Text};

#[test]
fn test_tag_matches_variant() {
    assert_eq!(StackElement::Int(7).tag(), Tag::Int);
    assert_eq!(StackElement::Float(0.25).tag(), Tag::Float);
    assert_eq!(StackElement::str("log").tag(), Tag::Str);
    assert_eq!(StackElement::Ptr(Pointer::NULL).tag(), Tag::Ptr);
}

#[test]
fn test_tag_names_round_trip() {
    for tag in Tag::ALL {
        assert_eq!(Tag::from_name(tag.name()), Some(tag));
    }
    assert_eq!(Tag::from_name("i32"), None);
}

#[test]
fn test_accessors_reject_other_tags() {
    let element = StackElement::Int(3);
    assert_eq!(element.as_int(), Some(3));
    assert_eq!(element.as_float(), None);
    assert!(element.as_text().is_none());
    assert!(element.as_pointer().is_none());
}

#[test]
fn test_equality_requires_same_tag() {
    assert_ne!(StackElement::Int(1), StackElement::Float(1.0));
    assert_eq!(StackElement::Float(f64::NAN), StackElement::Float(f64::NAN));
    assert_eq!(
        StackElement::Str(Text::new("a")),
        StackElement::from("a"),
        "text compares by contents"
    );
}

#[test]
fn test_pointer_from_slice() {
    let data = [1.0f32, 2.0, 3.0];
    let ptr = Pointer::from_slice(&data);
    assert_eq!(ptr.addr(), data.as_ptr() as usize);
    assert!(!ptr.is_null());
    assert!(Pointer::NULL.is_null());
}

#[test]
fn test_display() {
    assert_eq!(StackElement::Int(-4).to_string(), "-4");
    assert_eq!(StackElement::Float(1.0).to_string(), "1.0");
    assert_eq!(StackElement::str("hi").to_string(), "\"hi\"");
}
