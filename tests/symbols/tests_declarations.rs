//! Declaration wrapper tests.
//!
//! Names, parents, locations, modifiers, accessors and return types of
//! class, function, property and type parameter wrappers.

use std::sync::Arc;

use rstest::rstest;

use crate::helpers::assertions::*;
use crate::helpers::fixtures::*;
use symview::oracle::*;
use symview::symbol::{
    Annotation, ClassKind, FunctionKind, Modifier, NodeId, Origin, ResolvedType, Variance,
};
use symview::{Location, Session, SessionConfig};

const BOX_SOURCE: &str = "package demo\n\nclass Box<out T : Any> : Base(), Marker\n";

struct BoxFixture {
    class: SymbolKey,
    ctor: SymbolKey,
    type_parameter: SymbolKey,
}

/// `class Box<out T : Any> : Base(), Marker` with an explicit constructor.
fn box_oracle() -> (MemoryOracle, BoxFixture) {
    let mut b = MemoryOracle::builder();
    let any = b.add_type(RawType::class("kotlin.Any"));
    let base = b.add_type(RawType::class("demo.Base"));
    let marker = b.add_type(RawType::class("demo.Marker"));
    let file = b.add_file("demo/Box.kt", "demo", BOX_SOURCE);

    let mut class = RawSymbol::class("Box", RawClassKind::Class).with_syntax(
        native(file, 14).with_supertype_entries(vec![RawPosition::new(file, 39), RawPosition::new(file, 47)]),
    );
    if let Some(raw) = class.class_mut() {
        raw.supertypes = vec![base, marker];
    }
    let class = b.add_top_level(file, class);

    let mut type_parameter = RawSymbol::type_parameter("T")
        .with_syntax(native(file, 28).with_bound_entries(vec![RawPosition::new(file, 32)]));
    if let RawSymbolData::TypeParameter(tp) = &mut type_parameter.data {
        tp.variance = RawVariance::Out;
        tp.bounds = vec![any];
    }
    let type_parameter = b.add_member(class, type_parameter);
    let ctor = b.add_member(class, RawSymbol::constructor().with_syntax(native(file, 23)));

    b.add_top_level(file, RawSymbol::class("Base", RawClassKind::Class));
    b.add_top_level(file, RawSymbol::class("Marker", RawClassKind::Interface));

    (
        b.build(),
        BoxFixture {
            class,
            ctor,
            type_parameter,
        },
    )
}

// =============================================================================
// NAMES & PARENTS
// =============================================================================

#[test]
fn test_qualified_names_follow_parents() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);

    let foo = session.declaration(keys.foo).unwrap();
    let x = session.declaration(keys.x).unwrap();
    assert_eq!(qualified(&session, &foo).as_deref(), Some("foo.Foo"));
    assert_eq!(qualified(&session, &x).as_deref(), Some("foo.Foo.X"));

    let bar = session.declaration(keys.compiled).unwrap();
    assert_eq!(qualified(&session, &bar).as_deref(), Some("foo.compiled.Bar"));
}

#[test]
fn test_local_declarations_have_no_qualified_name() {
    let mut b = MemoryOracle::builder();
    let file = b.add_file("l/Local.kt", "l", "fun f() { class L { class N } }\n");
    let f = b.add_top_level(file, RawSymbol::function("f"));
    let local = b.add_member(f, RawSymbol::class("L", RawClassKind::Class));
    let nested = b.add_member(local, RawSymbol::class("N", RawClassKind::Class));
    let session = session(b.build());

    let local = session.declaration(local).unwrap();
    let nested = session.declaration(nested).unwrap();
    assert_eq!(qualified(&session, &local), None);
    // absence propagates from the local parent
    assert_eq!(qualified(&session, &nested), None);

    let f = session.declaration(f).unwrap();
    assert_eq!(qualified(&session, &f).as_deref(), Some("l.f"));
    assert!(local.parent_declaration(&session).unwrap().unwrap().is_same(&f));
}

#[test]
fn test_parent_chain() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);

    let x = session.property(keys.x).unwrap();
    let foo = session.class(keys.foo).unwrap();
    let file = session.file(keys.file).unwrap();

    assert_eq!(x.parent(&session).unwrap(), Some(foo.node_id()));
    assert_eq!(foo.parent(&session).unwrap(), Some(file.node_id()));
    assert_eq!(file.parent(&session).unwrap(), None);

    let parent = x.parent_declaration(&session).unwrap().unwrap();
    assert_same(parent.as_class().unwrap(), &foo);

    // compiled top-level declarations have neither file nor container
    let bar = session.class(keys.compiled).unwrap();
    assert_eq!(bar.parent(&session).unwrap(), None);
}

#[test]
fn test_file_accessors() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);
    let file = session.file(keys.file).unwrap();

    assert_eq!(file.file_path(), "foo/Foo.kt");
    assert_eq!(file.file_name(), "Foo.kt");
    assert_eq!(file.package_name(), "foo");
    assert_eq!(file.origin(), Origin::Source);
    assert_eq!(file.location(&session), Location::file("foo/Foo.kt", 1, 1));

    let names: Vec<String> = file
        .declarations(&session)
        .map(|d| d.unwrap().simple_name().to_string())
        .collect();
    assert_eq!(names, ["Foo"]);
}

// =============================================================================
// LOCATIONS & ORIGINS
// =============================================================================

#[test]
fn test_source_locations() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);

    let foo = session.class(keys.foo).unwrap();
    assert_location(&foo.location(&session), "foo/Foo.kt", 3);

    let x = session.property(keys.x).unwrap();
    assert_eq!(x.location(&session), Location::file("foo/Foo.kt", 4, 5));
    let y = session.property(keys.y).unwrap();
    assert_eq!(y.location(&session), Location::file("foo/Foo.kt", 5, 5));
}

#[test]
fn test_compiled_symbols_have_absent_location() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);

    let bar = session.class(keys.compiled).unwrap();
    assert!(bar.location(&session).is_absent());
    assert_eq!(bar.origin(), Origin::Binary);
    assert_eq!(session.class(keys.foo).unwrap().origin(), Origin::Source);
}

// =============================================================================
// MODIFIERS
// =============================================================================

#[test]
fn test_property_modifiers() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);

    let x = session.property(keys.x).unwrap();
    let modifiers = x.modifiers(&session).unwrap();
    assert_has_modifier(modifiers, Modifier::Const);
    assert_has_modifier(modifiers, Modifier::Public);
    assert_has_modifier(modifiers, Modifier::Final);

    let y = session.property(keys.y).unwrap();
    assert!(!y.modifiers(&session).unwrap().contains(&Modifier::Const));
}

#[rstest]
#[case(RawClassKind::Class, ClassKind::Class, None)]
#[case(RawClassKind::Interface, ClassKind::Interface, None)]
#[case(RawClassKind::EnumClass, ClassKind::EnumClass, Some(Modifier::Enum))]
#[case(RawClassKind::CompanionObject, ClassKind::Object, None)]
#[case(RawClassKind::AnonymousObject, ClassKind::Object, None)]
#[case(RawClassKind::AnnotationClass, ClassKind::AnnotationClass, Some(Modifier::Annotation))]
fn test_class_kind_mapping(
    #[case] raw: RawClassKind,
    #[case] expected: ClassKind,
    #[case] implied: Option<Modifier>,
) {
    let mut b = MemoryOracle::builder();
    let file = b.add_file("k/K.kt", "k", "");
    let key = b.add_top_level(file, RawSymbol::class("K", raw));
    let session = session(b.build());

    let class = session.class(key).unwrap();
    assert_eq!(class.class_kind().unwrap(), expected);
    assert_eq!(class.is_companion_object(), raw == RawClassKind::CompanionObject);
    if let Some(modifier) = implied {
        assert_has_modifier(class.modifiers(&session).unwrap(), modifier);
    }
}

#[test]
fn test_unknown_class_kind_is_internal_error() {
    let mut b = MemoryOracle::builder();
    let file = b.add_file("k/K.kt", "k", "");
    let key = b.add_top_level(file, RawSymbol::class("K", RawClassKind::Class));
    if let Some(class) = b.symbol_mut(key).and_then(RawSymbol::class_mut) {
        class.kind = None;
    }
    let session = session(b.build());

    let class = session.class(key).unwrap();
    assert_internal(class.class_kind());
    // failures are not memoized
    assert_internal(class.modifiers(&session).map(|m| m.len()));
    assert_internal(class.modifiers(&session).map(|m| m.len()));
}

// =============================================================================
// TYPE PARAMETERS & SUPERTYPES
// =============================================================================

#[test]
fn test_type_parameter() {
    let (oracle, keys) = box_oracle();
    let session = session(oracle);

    let class = session.class(keys.class).unwrap();
    let parameters = class.type_parameters(&session).unwrap();
    assert_eq!(parameters.len(), 1);
    let t = &parameters[0];
    assert_same(t, &session.type_parameter(keys.type_parameter).unwrap());

    assert_eq!(t.simple_name(), "T");
    assert_eq!(t.variance(), Variance::Covariant);
    assert!(!t.is_reified());
    assert_has_modifier(t.modifiers(), Modifier::Out);
    assert_eq!(t.qualified_name(&session).unwrap().map(|n| n.as_str()), Some("demo.Box.T"));
    assert_eq!(t.parent(&session).unwrap(), Some(class.node_id()));

    let bounds = t.bounds(&session).unwrap();
    assert_eq!(bounds.len(), 1);
    assert_eq!(bounds[0].index(), 0);
    assert_eq!(bounds[0].location(&session), Location::file("demo/Box.kt", 3, 19));
}

#[test]
fn test_super_types_are_indexed() {
    let (oracle, keys) = box_oracle();
    let session = session(oracle);
    let class = session.class(keys.class).unwrap();

    let supers = class.super_types(&session).unwrap();
    assert_eq!(supers.len(), 2);
    assert_eq!(supers[0].index(), 0);
    assert_eq!(supers[1].index(), 1);
    assert_eq!(supers[0].render(&session).unwrap(), "Base");
    assert_eq!(supers[0].location(&session), Location::file("demo/Box.kt", 3, 26));
    assert_eq!(supers[1].location(&session), Location::file("demo/Box.kt", 3, 34));
    assert_eq!(supers[1].parent(&session).unwrap(), Some(class.node_id()));

    let names: Vec<String> = supers
        .iter()
        .map(|s| match s.resolve(&session).unwrap() {
            ResolvedType::Type(ty) => ty.declaration(&session).unwrap().simple_name().to_string(),
            ResolvedType::Error => "<error>".to_string(),
        })
        .collect();
    assert_eq!(names, ["Base", "Marker"]);
}

// =============================================================================
// FUNCTIONS & RETURN TYPES
// =============================================================================

#[test]
fn test_constructor_returns_star_projected_class_type() {
    let (oracle, keys) = box_oracle();
    let session = session(oracle);
    let ctor = session.function(keys.ctor).unwrap();

    assert!(ctor.is_constructor());
    assert_eq!(ctor.simple_name(), "<init>");
    assert_eq!(ctor.function_kind(&session).unwrap(), FunctionKind::Member);

    // the oracle itself reports Unit for constructors
    let raw = session.oracle().return_type(keys.ctor).unwrap();
    assert_eq!(session.oracle().ty(raw).unwrap().rendered, "Unit");

    let ret = ctor.return_type(&session).unwrap().unwrap();
    assert_eq!(ret.render(&session).unwrap(), "Box<*>");
    let resolved = ret.resolve(&session).unwrap();
    let ty = resolved.as_type().unwrap();
    assert!(ty.is_star_projected(&session).unwrap());

    let class = session.class(keys.class).unwrap();
    assert_same(ty, &class.as_star_projected_type(&session).unwrap());
    assert_same(&class.primary_constructor(&session).unwrap().unwrap(), &ctor);
    assert_eq!(ctor.location(&session).path(), Some("demo/Box.kt"));
}

struct InteropFixture {
    get: SymbolKey,
}

fn interop_oracle() -> (MemoryOracle, InteropFixture) {
    let mut b = MemoryOracle::builder();
    b.add_library("kotlin", RawSymbol::class("Any", RawClassKind::Class).with_origin(RawOrigin::Library));
    let list = b.add_library(
        "java.util",
        RawSymbol::class("List", RawClassKind::Interface).with_origin(RawOrigin::InteropLibrary),
    );
    let get = b.add_member(list, RawSymbol::function("get").with_origin(RawOrigin::InteropLibrary));
    if let Some(function) = b.symbol_mut(get).and_then(RawSymbol::function_mut) {
        function.is_interop_method = true;
    }
    let unresolved = b.add_type(RawType::new(TypeShape::Error, "E!"));
    let resolved = b.add_type(RawType::class("kotlin.Any"));
    b.defer_interop_return_type(get, unresolved, resolved);
    (b.build(), InteropFixture { get })
}

#[test]
fn test_interop_return_type_is_forced() {
    let (oracle, keys) = interop_oracle();
    let oracle = Arc::new(oracle);
    let session = Session::new(oracle.clone(), SessionConfig::default());

    let get = session.function(keys.get).unwrap();
    assert_eq!(get.origin(), Origin::InteropBinary);
    assert!(oracle.has_deferred_return_type(keys.get));

    let ret = get.return_type(&session).unwrap().unwrap();
    assert!(!oracle.has_deferred_return_type(keys.get));
    assert_eq!(ret.render(&session).unwrap(), "Any");
    let resolved = ret.resolve(&session).unwrap();
    let declaration = resolved.as_type().unwrap().declaration(&session).unwrap();
    assert_eq!(declaration.simple_name(), "Any");
}

#[test]
fn test_interop_workaround_can_be_disabled() {
    let (oracle, keys) = interop_oracle();
    let oracle = Arc::new(oracle);
    let config = SessionConfig::new().with_interop_return_type_workaround(false);
    let session = Session::new(oracle.clone(), config);

    let get = session.function(keys.get).unwrap();
    let ret = get.return_type(&session).unwrap().unwrap();
    assert!(oracle.has_deferred_return_type(keys.get));
    assert_eq!(ret.render(&session).unwrap(), "E!");
    assert!(ret.resolve(&session).unwrap().is_error());
}

#[test]
fn test_value_parameters() {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let file = b.add_file("p/F.kt", "p", "fun f(vararg xs: Int) {}\n");
    let f = b.add_top_level(file, RawSymbol::function("f").with_syntax(native(file, 0)));
    let mut xs = RawSymbol::value_parameter("xs", int).with_syntax(native(file, 6).with_keywords(["vararg"]));
    if let RawSymbolData::ValueParameter(p) = &mut xs.data {
        p.flags.is_vararg = true;
    }
    b.add_member(f, xs);
    let session = session(b.build());

    let f = session.function(f).unwrap();
    assert_eq!(f.function_kind(&session).unwrap(), FunctionKind::TopLevel);
    let parameters = f.parameters(&session).unwrap();
    assert_eq!(parameters.len(), 1);
    let xs = &parameters[0];
    assert_eq!(xs.name(), Some("xs"));
    assert!(xs.is_vararg());
    assert!(!xs.has_default());
    assert_eq!(xs.parent(&session).unwrap(), Some(f.node_id()));
    assert_eq!(xs.location(&session), Location::file("p/F.kt", 1, 7));

    let ty = xs.ty(&session).unwrap();
    assert_eq!(ty.render(&session).unwrap(), "Int");
    assert_eq!(ty.origin(), xs.origin());
    assert_eq!(ty.location(&session), xs.location(&session));
}

// =============================================================================
// ACCESSORS
// =============================================================================

struct AccessorFixture {
    interface_property: SymbolKey,
    class_property: SymbolKey,
    broken_property: SymbolKey,
}

/// `interface I { val p: Int }` and `class C { var q: Int; var r: Int }`,
/// all accessors compiler-generated. `q` carries annotations aimed at
/// several use sites; the setter of `r` is missing its parameter.
fn accessor_oracle() -> (MemoryOracle, AccessorFixture) {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let file = b.add_file("acc/I.kt", "acc", "");

    let i = b.add_top_level(file, RawSymbol::class("I", RawClassKind::Interface));
    let interface_property = b.add_member(i, RawSymbol::property("p", int));
    b.add_member(interface_property, RawSymbol::getter(int));

    let a_get = b.add_annotation(RawAnnotation::new("acc.OnGet").with_target(RawUseSiteTarget::PropertyGetter));
    let a_set = b.add_annotation(RawAnnotation::new("acc.OnSet").with_target(RawUseSiteTarget::PropertySetter));
    let a_plain = b.add_annotation(RawAnnotation::new("acc.Plain"));
    let a_setparam =
        b.add_annotation(RawAnnotation::new("acc.OnSetParam").with_target(RawUseSiteTarget::SetterParameter));
    let g1 = b.add_annotation(RawAnnotation::new("acc.G1"));
    let g2 = b.add_annotation(RawAnnotation::new("acc.G2").with_target(RawUseSiteTarget::SetterParameter));
    let s1 = b.add_annotation(RawAnnotation::new("acc.S1").with_target(RawUseSiteTarget::PropertyGetter));
    let s2 = b.add_annotation(RawAnnotation::new("acc.S2"));

    let c = b.add_top_level(file, RawSymbol::class("C", RawClassKind::Class));
    let mut q = RawSymbol::property("q", int).with_annotations(vec![a_get, a_set, a_plain, a_setparam]);
    if let Some(property) = q.property_mut() {
        property.flags.is_mutable = true;
    }
    let class_property = b.add_member(c, q);
    b.add_member(class_property, RawSymbol::getter(int).with_annotations(vec![g1, g2]));
    let setter = b.add_member(class_property, RawSymbol::setter().with_annotations(vec![s1, s2]));
    b.add_member(setter, RawSymbol::value_parameter("value", int));

    let broken_property = b.add_member(c, RawSymbol::property("r", int));
    b.add_member(broken_property, RawSymbol::setter());

    (
        b.build(),
        AccessorFixture {
            interface_property,
            class_property,
            broken_property,
        },
    )
}

fn short_names(annotations: &[Arc<Annotation>]) -> Vec<&str> {
    annotations.iter().map(|a| a.short_name()).collect()
}

#[test]
fn test_synthetic_accessor_in_interface_is_abstract() {
    let (oracle, keys) = accessor_oracle();
    let session = session(oracle);

    let p = session.property(keys.interface_property).unwrap();
    let getter = p.getter(&session).unwrap().unwrap();
    assert_eq!(getter.origin(), Origin::Synthetic);
    assert!(getter.location(&session).is_absent());
    assert_has_modifier(getter.modifiers(&session).unwrap(), Modifier::Abstract);

    let q = session.property(keys.class_property).unwrap();
    let getter = q.getter(&session).unwrap().unwrap();
    assert_eq!(getter.origin(), Origin::Synthetic);
    assert!(!getter.modifiers(&session).unwrap().contains(&Modifier::Abstract));
}

#[test]
fn test_accessor_annotations_follow_use_site_targets() {
    let (oracle, keys) = accessor_oracle();
    let session = session(oracle);
    let q = session.property(keys.class_property).unwrap();

    assert_eq!(short_names(q.annotations(&session).unwrap()), ["Plain"]);

    let getter = q.getter(&session).unwrap().unwrap();
    assert_eq!(short_names(getter.annotations(&session).unwrap()), ["G1", "OnGet"]);

    let setter = q.setter(&session).unwrap().unwrap();
    assert_eq!(short_names(setter.annotations(&session).unwrap()), ["S2", "OnSet"]);

    // pulled annotations are owned by the accessor
    let pulled = &getter.annotations(&session).unwrap()[1];
    assert_eq!(pulled.parent(&session).unwrap(), Some(getter.node_id()));
}

#[test]
fn test_setter_parameter_receives_property_setparam_annotations() {
    let (oracle, keys) = accessor_oracle();
    let session = session(oracle);
    let q = session.property(keys.class_property).unwrap();
    let setter = q.setter(&session).unwrap().unwrap();
    let value = setter.parameter(&session).unwrap();

    let annotations = value.annotations(&session).unwrap();
    assert_eq!(short_names(annotations), ["OnSetParam"]);
    assert_eq!(annotations[0].parent(&session).unwrap(), Some(value.node_id()));
    assert!(
        value
            .node_id()
            .children(&session)
            .unwrap()
            .contains(&annotations[0].node_id())
    );

    // reachable from exactly one node
    let elsewhere = [
        q.annotations(&session).unwrap(),
        setter.annotations(&session).unwrap(),
        q.getter(&session).unwrap().unwrap().annotations(&session).unwrap(),
    ];
    for annotations in elsewhere {
        assert!(!short_names(annotations).contains(&"OnSetParam"));
    }
}

#[test]
fn test_accessor_links() {
    let (oracle, keys) = accessor_oracle();
    let session = session(oracle);
    let q = session.property(keys.class_property).unwrap();
    assert!(q.is_mutable());

    let getter = q.getter(&session).unwrap().unwrap();
    assert_same(&getter.receiver(&session).unwrap(), &q);
    assert_eq!(getter.parent(&session).unwrap(), Some(NodeId::Property(q.id())));
    assert_eq!(getter.return_type(&session).unwrap().render(&session).unwrap(), "Int");

    let setter = q.setter(&session).unwrap().unwrap();
    let value = setter.parameter(&session).unwrap();
    assert_eq!(value.name(), Some("value"));
    assert_eq!(value.parent(&session).unwrap(), Some(setter.node_id()));
}

#[test]
fn test_setter_without_parameter_is_internal_error() {
    let (oracle, keys) = accessor_oracle();
    let session = session(oracle);
    let r = session.property(keys.broken_property).unwrap();
    let setter = r.setter(&session).unwrap().unwrap();
    assert_internal(setter.parameter(&session));
}
