//! Type reference tests.
//!
//! Element dispatch over type shapes, resolution to full types or the error
//! sentinel, and where references point in source.

use rstest::rstest;

use crate::helpers::assertions::*;
use crate::helpers::fixtures::*;
use symview::oracle::*;
use symview::symbol::{Modifier, NodeId, Origin, ReferenceElement, ResolvedType, Variance};
use symview::Session;

/// Every type shape the oracle can report, plus a host function to own
/// references to them.
struct Shapes {
    host: SymbolKey,
    synthetic_host: SymbolKey,
    int: TypeKey,
    nullable_int: TypeKey,
    list_int: TypeKey,
    suspend_fn: TypeKey,
    dynamic: TypeKey,
    flexible: TypeKey,
    flexible_error: TypeKey,
    error: TypeKey,
    class_error: TypeKey,
    unknown_class: TypeKey,
    type_parameter: TypeKey,
    intersection: TypeKey,
    definitely_not_null: TypeKey,
    annotated: TypeKey,
}

fn shapes_oracle() -> (MemoryOracle, Shapes) {
    let mut b = MemoryOracle::builder();
    b.add_library("kotlin", RawSymbol::class("Int", RawClassKind::Class).with_origin(RawOrigin::Library));
    b.add_library("kotlin", RawSymbol::class("String", RawClassKind::Class).with_origin(RawOrigin::Library));
    let list = b.add_library(
        "kotlin.collections",
        RawSymbol::class("List", RawClassKind::Interface).with_origin(RawOrigin::Library),
    );
    b.add_member(list, RawSymbol::type_parameter("E"));

    let file = b.add_file("t/T.kt", "t", "package t\n\nfun <T> host() {}\n");
    let host = b.add_top_level(file, RawSymbol::function("host").with_syntax(native(file, 11)));
    let t = b.add_member(host, RawSymbol::type_parameter("T"));
    let synthetic_host = b.add_top_level(
        file,
        RawSymbol::function("generated").with_origin(RawOrigin::SourceMemberGenerated),
    );

    let int = b.add_type(RawType::class("kotlin.Int"));
    let nullable_int = b.add_type(RawType::class("kotlin.Int").nullable());
    let string = b.add_type(RawType::class("kotlin.String"));
    let list_int = b.add_type(RawType::new(
        TypeShape::Class {
            class_name: "kotlin.collections.List".into(),
            arguments: vec![RawTypeArgument::Projection {
                variance: RawVariance::Out,
                ty: int,
            }],
        },
        "List<Int>",
    ));
    let suspend_fn = b.add_type(RawType::new(
        TypeShape::Functional {
            class_name: "kotlin.coroutines.SuspendFunction1".into(),
            arguments: Vec::new(),
            is_suspend: true,
            receiver: None,
            parameters: vec![string],
            return_type: int,
        },
        "suspend (String) -> Int",
    ));
    let dynamic = b.add_type(RawType::new(TypeShape::Dynamic, "dynamic"));
    let flexible = b.add_type(RawType::new(
        TypeShape::Flexible {
            lower: int,
            upper: nullable_int,
        },
        "Int!",
    ));
    let error = b.add_type(RawType::new(TypeShape::Error, "ERROR"));
    let flexible_error = b.add_type(RawType::new(
        TypeShape::Flexible {
            lower: error,
            upper: error,
        },
        "ERROR!",
    ));
    let class_error = b.add_type(RawType::new(
        TypeShape::ClassError {
            class_name: "x.Missing".into(),
        },
        "Missing",
    ));
    let unknown_class = b.add_type(RawType::class("x.Unknown"));
    let type_parameter = b.add_type(RawType::new(TypeShape::TypeParameter { symbol: t }, "T"));
    let intersection = b.add_type(RawType::new(TypeShape::Intersection(vec![int, string]), "Int & String"));
    let definitely_not_null = b.add_type(RawType::new(TypeShape::DefinitelyNotNull(type_parameter), "T & Any"));
    let marker = b.add_annotation(RawAnnotation::new("t.Marker"));
    let annotated = b.add_type(RawType::class("kotlin.Int").with_annotations(vec![marker]));

    (
        b.build(),
        Shapes {
            host,
            synthetic_host,
            int,
            nullable_int,
            list_int,
            suspend_fn,
            dynamic,
            flexible,
            flexible_error,
            error,
            class_error,
            unknown_class,
            type_parameter,
            intersection,
            definitely_not_null,
            annotated,
        },
    )
}

fn host_node(session: &Session, host: SymbolKey) -> NodeId {
    session.function(host).unwrap().node_id()
}

// =============================================================================
// ELEMENTS
// =============================================================================

#[test]
fn test_class_type_element() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.list_int, Some(parent), -1).unwrap();

    let Some(ReferenceElement::Classifier(classifier)) = reference.element(&session).unwrap() else {
        panic!("expected a classifier reference");
    };
    assert_eq!(classifier.referenced_name(), "List");
    assert_eq!(classifier.qualified_name(), "kotlin.collections.List");
    assert_eq!(classifier.parent(&session).unwrap(), Some(reference.node_id()));
    assert_eq!(classifier.origin(), Origin::Source);

    let arguments = classifier.type_arguments(&session).unwrap();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].variance, Variance::Covariant);
    let argument = arguments[0].type_ref.as_ref().unwrap();
    assert_eq!(argument.render(&session).unwrap(), "Int");
    assert_eq!(argument.parent(&session).unwrap(), Some(classifier.node_id()));

    // the element is computed once
    let again = reference.element(&session).unwrap().unwrap();
    assert_eq!(again.node_id(), classifier.node_id());
}

#[test]
fn test_functional_type_element() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.suspend_fn, Some(parent), -1).unwrap();

    let Some(ReferenceElement::Callable(callable)) = reference.element(&session).unwrap() else {
        panic!("expected a callable reference");
    };
    assert!(callable.is_suspend());
    assert!(callable.receiver_type(&session).unwrap().is_none());
    let parameters: Vec<String> = callable
        .function_parameters(&session)
        .unwrap()
        .iter()
        .map(|p| p.render(&session).unwrap().to_string())
        .collect();
    assert_eq!(parameters, ["String"]);
    assert_eq!(callable.return_type(&session).unwrap().render(&session).unwrap(), "Int");

    assert_has_modifier(reference.modifiers(&session).unwrap(), Modifier::Suspend);
}

#[test]
fn test_dynamic_type_element() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.dynamic, Some(parent), -1).unwrap();

    let Some(ReferenceElement::Dynamic(dynamic)) = reference.element(&session).unwrap() else {
        panic!("expected a dynamic reference");
    };
    assert_eq!(dynamic.parent(&session).unwrap(), Some(reference.node_id()));
    assert!(reference.modifiers(&session).unwrap().is_empty());
}

#[test]
fn test_flexible_type_uses_lower_bound() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.flexible, Some(parent), -1).unwrap();

    let Some(ReferenceElement::Classifier(classifier)) = reference.element(&session).unwrap() else {
        panic!("expected a classifier reference");
    };
    assert_eq!(classifier.type_key(), keys.int);
    assert_eq!(classifier.referenced_name(), "Int");
}

#[test]
fn test_flexible_type_with_non_class_lower_bound_is_internal_error() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.flexible_error, Some(parent), -1).unwrap();
    assert_internal(reference.element(&session));
}

#[rstest]
#[case::error(|s: &Shapes| s.error)]
#[case::class_error(|s: &Shapes| s.class_error)]
#[case::type_parameter(|s: &Shapes| s.type_parameter)]
fn test_types_without_element(#[case] pick: fn(&Shapes) -> TypeKey) {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(pick(&keys), Some(parent), -1).unwrap();
    assert!(reference.element(&session).unwrap().is_none());
}

#[rstest]
#[case::intersection(|s: &Shapes| s.intersection)]
#[case::definitely_not_null(|s: &Shapes| s.definitely_not_null)]
fn test_unsupported_shapes_are_internal_errors(#[case] pick: fn(&Shapes) -> TypeKey) {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(pick(&keys), Some(parent), -1).unwrap();
    assert_internal(reference.element(&session));
    // not memoized: the failure is reported again
    assert_internal(reference.element(&session));
}

#[test]
fn test_references_without_physical_parent_have_no_element() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);

    let orphan = session.type_reference(keys.list_int, None, -1).unwrap();
    assert_eq!(orphan.origin(), Origin::Synthetic);
    assert!(orphan.location(&session).is_absent());
    assert!(orphan.element(&session).unwrap().is_none());

    let generated = host_node(&session, keys.synthetic_host);
    let reference = session.type_reference(keys.list_int, Some(generated), -1).unwrap();
    assert_eq!(reference.origin(), Origin::Synthetic);
    assert!(reference.element(&session).unwrap().is_none());
}

// =============================================================================
// RESOLUTION
// =============================================================================

#[test]
fn test_resolve_class_type() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);

    let reference = session.type_reference(keys.list_int, Some(parent), -1).unwrap();
    let ResolvedType::Type(ty) = reference.resolve(&session).unwrap() else {
        panic!("expected a resolved type");
    };
    assert_eq!(ty.to_string(), "List<Int>");
    assert_eq!(ty.declaration(&session).unwrap().simple_name(), "List");
    assert!(!ty.is_star_projected(&session).unwrap());
    let arguments = ty.arguments(&session).unwrap();
    assert_eq!(arguments.len(), 1);
    // arguments of a resolved type have no owning node
    assert_eq!(arguments[0].type_ref.as_ref().unwrap().parent(&session).unwrap(), None);

    // one Type per oracle type
    let other_parent = session.type_reference(keys.int, Some(parent), -1).unwrap().node_id();
    let elsewhere = session.type_reference(keys.list_int, Some(other_parent), -1).unwrap();
    assert_same(&ty, elsewhere.resolve(&session).unwrap().as_type().unwrap());
}

#[rstest]
#[case::error(|s: &Shapes| s.error)]
#[case::class_error(|s: &Shapes| s.class_error)]
#[case::unknown_class(|s: &Shapes| s.unknown_class)]
#[case::dynamic(|s: &Shapes| s.dynamic)]
fn test_unresolvable_types_resolve_to_error(#[case] pick: fn(&Shapes) -> TypeKey) {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(pick(&keys), Some(parent), -1).unwrap();
    assert!(reference.resolve(&session).unwrap().is_error());
}

#[test]
fn test_nullable_and_flexible_types() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);

    let nullable = session.type_reference(keys.nullable_int, Some(parent), -1).unwrap();
    assert_eq!(nullable.render(&session).unwrap(), "Int?");
    let ty = nullable.resolve(&session).unwrap().as_type().cloned().unwrap();
    assert!(ty.is_marked_nullable());
    assert_eq!(ty.to_string(), "Int?");

    let flexible = session.type_reference(keys.flexible, Some(parent), -1).unwrap();
    let ty = flexible.resolve(&session).unwrap().as_type().cloned().unwrap();
    assert_eq!(ty.declaration(&session).unwrap().simple_name(), "Int");
    assert!(ty.arguments(&session).unwrap().is_empty());
}

#[test]
fn test_function_type_flags() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let ty = session.resolved_type(keys.suspend_fn).unwrap();
    assert!(ty.is_suspend_function_type());
    assert!(!ty.is_function_type());
}

// =============================================================================
// ANNOTATIONS & LOCATIONS
// =============================================================================

#[test]
fn test_reference_annotations_are_owned_by_the_reference() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.annotated, Some(parent), -1).unwrap();

    let annotations = reference.annotations(&session).unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].short_name(), "Marker");
    assert_eq!(annotations[0].parent(&session).unwrap(), Some(reference.node_id()));

    let ty = session.resolved_type(keys.annotated).unwrap();
    let type_annotations = ty.annotations(&session).unwrap();
    assert_eq!(type_annotations[0].parent(&session).unwrap(), None);
    assert!(!std::sync::Arc::ptr_eq(&annotations[0], &type_annotations[0]));
}

#[test]
fn test_primary_reference_shares_parent_location() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let host = session.function(keys.host).unwrap();
    let reference = session.type_reference(keys.int, Some(host.node_id()), -1).unwrap();

    assert_location(&reference.location(&session), "t/T.kt", 3);
    assert_eq!(reference.location(&session), host.location(&session));
    assert_eq!(reference.origin(), Origin::Source);

    // an index past the parent's entry list has nowhere to point
    let indexed = session.type_reference(keys.int, Some(host.node_id()), 4).unwrap();
    assert!(indexed.location(&session).is_absent());
}

#[test]
fn test_reference_children_include_element() {
    let (oracle, keys) = shapes_oracle();
    let session = session(oracle);
    let parent = host_node(&session, keys.host);
    let reference = session.type_reference(keys.list_int, Some(parent), -1).unwrap();

    let children = reference.node_id().children(&session).unwrap();
    let element = reference.element(&session).unwrap().unwrap();
    assert_eq!(children, [element.node_id()]);
}
