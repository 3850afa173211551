//! Oracle fixtures for tests.
//!
//! Each fixture builds a [`MemoryOracle`] shaped like what a front end
//! would report for the source text next to it.

use std::sync::Arc;

use symview::oracle::*;
use symview::{Session, SessionConfig};

pub const FOO_SOURCE: &str = r#"package foo

object Foo {
    const val X = 1
    val y = 2
}
"#;

pub const DOC_SOURCE: &str = r#"package docs

/**
 * A class
 * with two lines
 */
class Outer {
    /** fn doc */
    fun f() {}
    val p = 1
}

fun top() {}
"#;

pub fn native(file: FileKey, offset: u32) -> RawSyntax {
    RawSyntax::native(RawPosition::new(file, offset))
}

pub fn session(oracle: MemoryOracle) -> Session {
    Session::new(Arc::new(oracle), SessionConfig::default())
}

pub fn session_with_config(oracle: MemoryOracle, config: SessionConfig) -> Session {
    Session::new(Arc::new(oracle), config)
}

/// Keys of interest in [`const_properties_oracle`].
pub struct ConstFixture {
    pub file: FileKey,
    pub foo: SymbolKey,
    pub x: SymbolKey,
    pub y: SymbolKey,
    pub compiled: SymbolKey,
}

/// `object Foo { const val X = 1; val y = 2 }` plus a compiled
/// `foo.compiled.Bar` without constants.
pub fn const_properties_oracle() -> (MemoryOracle, ConstFixture) {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let file = b.add_file("foo/Foo.kt", "foo", FOO_SOURCE);
    let foo = b.add_top_level(
        file,
        RawSymbol::class("Foo", RawClassKind::Object).with_syntax(native(file, 13)),
    );

    let mut x = RawSymbol::property("X", int).with_syntax(native(file, 30).with_keywords(["const"]));
    x.property_mut().unwrap().flags.is_const = true;
    let x = b.add_member(foo, x);
    let y = b.add_member(foo, RawSymbol::property("y", int).with_syntax(native(file, 50)));

    let compiled = b.add_library(
        "foo.compiled",
        RawSymbol::class("Bar", RawClassKind::Object).with_origin(RawOrigin::Library),
    );
    b.add_member(compiled, RawSymbol::property("z", int).with_origin(RawOrigin::Library));

    (
        b.build(),
        ConstFixture {
            file,
            foo,
            x,
            y,
            compiled,
        },
    )
}

/// The declarations of [`DOC_SOURCE`]; the constructor of `Outer` is
/// compiler-generated.
pub fn doc_string_oracle() -> MemoryOracle {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let file = b.add_file("docs/Outer.kt", "docs", DOC_SOURCE);
    let outer = b.add_top_level(
        file,
        RawSymbol::class("Outer", RawClassKind::Class)
            .with_syntax(native(file, 51).with_doc("\n * A class\n * with two lines\n ")),
    );
    b.add_member(outer, RawSymbol::constructor());
    b.add_member(
        outer,
        RawSymbol::function("f").with_syntax(native(file, 87).with_doc(" fn doc ")),
    );
    b.add_member(outer, RawSymbol::property("p", int).with_syntax(native(file, 102)));
    b.add_top_level(file, RawSymbol::function("top").with_syntax(native(file, 115)));
    b.build()
}

/// Keys of interest in [`annotation_oracle`].
pub struct AnnotationFixture {
    pub annotation_class: SymbolKey,
    pub target: SymbolKey,
    pub named: AnnotationKey,
    pub positional: AnnotationKey,
    pub unknown: AnnotationKey,
}

/// `annotation class Ann(val a: Int = 1, val b: String = "x", val c: Int = 3)`
/// applied as `@Ann(a = 5)`, `@Ann(7)` and `@Missing` on `class Target`.
pub fn annotation_oracle() -> (MemoryOracle, AnnotationFixture) {
    let mut b = MemoryOracle::builder();
    let int = b.add_type(RawType::class("kotlin.Int"));
    let string = b.add_type(RawType::class("kotlin.String"));
    let file = b.add_file("p/Ann.kt", "p", "package p\n\nannotation class Ann\n\n@Ann class Target\n");

    let annotation_class = b.add_top_level(
        file,
        RawSymbol::class("Ann", RawClassKind::AnnotationClass).with_syntax(native(file, 11)),
    );
    let ctor = b.add_member(annotation_class, RawSymbol::constructor().with_syntax(native(file, 28)));
    let defaults = [
        ("a", int, ConstantValue::Int(1)),
        ("b", string, ConstantValue::String("x".into())),
        ("c", int, ConstantValue::Int(3)),
    ];
    for (name, ty, value) in defaults {
        let expr = b.add_constant(value);
        let mut parameter = RawSymbol::value_parameter(name, ty)
            .with_syntax(native(file, 28).with_default_value(expr));
        if let RawSymbolData::ValueParameter(p) = &mut parameter.data {
            p.flags.has_default_value = true;
        }
        b.add_member(ctor, parameter);
    }

    let named = b.add_annotation(
        RawAnnotation::new("p.Ann")
            .with_arguments(vec![RawArgument::named(
                "a",
                AnnotationValue::Constant(ConstantValue::Int(5)),
            )])
            .at(RawPosition::new(file, 33)),
    );
    let positional = b.add_annotation(RawAnnotation::new("p.Ann").with_arguments(vec![
        RawArgument::positional(AnnotationValue::Constant(ConstantValue::Int(7))),
    ]));
    let unknown = b.add_annotation(RawAnnotation::new("p.Missing"));

    let target = b.add_top_level(
        file,
        RawSymbol::class("Target", RawClassKind::Class)
            .with_syntax(native(file, 38))
            .with_annotations(vec![named, positional, unknown]),
    );

    (
        b.build(),
        AnnotationFixture {
            annotation_class,
            target,
            named,
            positional,
            unknown,
        },
    )
}
