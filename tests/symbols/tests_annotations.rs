//! Annotation tests: argument defaults, use-site targets, annotation types.

use std::sync::Arc;

use crate::helpers::assertions::*;
use crate::helpers::fixtures::*;
use symview::oracle::*;
use symview::symbol::{Annotation, Origin, ResolvedType, SymbolError, UseSiteTarget};

fn arguments_of(annotation: &Annotation, session: &symview::Session) -> Vec<(String, ConstantValue, Origin)> {
    annotation
        .arguments(session)
        .unwrap()
        .iter()
        .map(|argument| {
            let AnnotationValue::Constant(value) = argument.value() else {
                panic!("expected a constant argument");
            };
            (
                argument.name().unwrap_or("").to_string(),
                value.clone(),
                argument.origin(),
            )
        })
        .collect()
}

#[test]
fn test_named_argument_keeps_other_defaults() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.named, None).unwrap();

    assert_eq!(
        arguments_of(&annotation, &session),
        [
            ("a".to_string(), ConstantValue::Int(5), Origin::Source),
            ("b".to_string(), ConstantValue::String("x".into()), Origin::Synthetic),
            ("c".to_string(), ConstantValue::Int(3), Origin::Synthetic),
        ]
    );
}

#[test]
fn test_positional_argument_covers_parameter_at_same_index() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.positional, None).unwrap();

    assert_eq!(
        arguments_of(&annotation, &session),
        [
            (String::new(), ConstantValue::Int(7), Origin::Source),
            ("b".to_string(), ConstantValue::String("x".into()), Origin::Synthetic),
            ("c".to_string(), ConstantValue::Int(3), Origin::Synthetic),
        ]
    );
}

#[test]
fn test_argument_locations_and_parents() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.named, None).unwrap();
    let arguments = annotation.arguments(&session).unwrap();

    assert_location(&annotation.location(&session), "p/Ann.kt", 5);
    assert_eq!(arguments[0].location(&session), annotation.location(&session));
    assert!(arguments[1].location(&session).is_absent());
    for argument in arguments {
        assert_eq!(argument.parent(&session).unwrap(), Some(annotation.node_id()));
        assert!(!argument.is_spread());
    }

    // computed once
    let again = annotation.arguments(&session).unwrap();
    assert_same(&arguments[1], &again[1]);
}

#[test]
fn test_unknown_annotation_class() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.unknown, None).unwrap();

    assert_eq!(annotation.short_name(), "Missing");
    assert!(annotation.annotation_type(&session).unwrap().is_none());
    assert!(annotation.arguments(&session).unwrap().is_empty());
}

#[test]
fn test_annotation_type_reference() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.named, None).unwrap();

    assert_eq!(annotation.short_name(), "Ann");
    assert_eq!(annotation.qualified_name(), Some("p.Ann"));
    let ty = annotation.annotation_type(&session).unwrap().unwrap();
    assert_eq!(ty.render(&session).unwrap(), "Ann");
    assert_eq!(ty.parent(&session).unwrap(), Some(annotation.node_id()));
    let ResolvedType::Type(resolved) = ty.resolve(&session).unwrap() else {
        panic!("annotation class should resolve");
    };
    assert_eq!(resolved.declaration(&session).unwrap().symbol_key(), keys.annotation_class);
}

#[test]
fn test_default_arguments_are_not_implemented() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let annotation = session.annotation(keys.named, None).unwrap();

    let err = annotation.default_arguments(&session).unwrap_err();
    assert!(err.is_not_implemented());
    assert!(matches!(err, SymbolError::NotImplemented("default_arguments")));
}

#[test]
fn test_declaration_annotations_are_owned_by_declaration() {
    let (oracle, keys) = annotation_oracle();
    let session = session(oracle);
    let target = session.declaration(keys.target).unwrap();

    let annotations = target.annotations(&session).unwrap();
    let names: Vec<&str> = annotations.iter().map(|a| a.short_name()).collect();
    assert_eq!(names, ["Ann", "Ann", "Missing"]);
    for annotation in annotations {
        assert_eq!(annotation.parent(&session).unwrap(), Some(target.node_id()));
        assert_eq!(annotation.origin(), Origin::Source);
    }

    // the same application under another parent is another wrapper
    let detached = session.annotation(keys.named, None).unwrap();
    assert!(!Arc::ptr_eq(&annotations[0], &detached));
}

#[test]
fn test_use_site_target() {
    let mut b = MemoryOracle::builder();
    let file = b.add_file("u/U.kt", "u", "package u\n\n@file:Tag\n");
    let tagged = b.add_annotation(RawAnnotation::new("u.Tag").with_target(RawUseSiteTarget::File));
    let plain = b.add_annotation(RawAnnotation::new("u.Tag"));
    b.add_file_annotation(file, tagged);
    b.add_file_annotation(file, plain);
    let session = session(b.build());

    let source = session.file(file).unwrap();
    let targets: Vec<_> = source
        .annotations(&session)
        .unwrap()
        .iter()
        .map(|a| a.use_site_target())
        .collect();
    assert_eq!(targets, [Some(UseSiteTarget::File), None]);
}

#[test]
fn test_non_native_default_syntax_is_internal_error() {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let file = b.add_file("j/J.kt", "j", "package j\n");
    let class = b.add_top_level(
        file,
        RawSymbol::class("JAnn", RawClassKind::AnnotationClass).with_origin(RawOrigin::InteropSource),
    );
    let ctor = b.add_member(class, RawSymbol::constructor());
    let expr = b.add_constant(ConstantValue::Int(1));
    b.add_member(
        ctor,
        RawSymbol::value_parameter("value", int).with_syntax(
            native(file, 0)
                .with_form(SyntaxForm::Interop)
                .with_default_value(expr),
        ),
    );
    let applied = b.add_annotation(RawAnnotation::new("j.JAnn"));
    let session = session(b.build());

    let annotation = session.annotation(applied, None).unwrap();
    assert_internal(annotation.arguments(&session));
    // the failure is not cached
    assert_internal(annotation.arguments(&session));
}
