//! Resolver entry points.

use rstest::rstest;

use crate::helpers::fixtures::*;
use symview::oracle::*;
use symview::{Resolver, SessionConfig, SymbolError};

fn two_files() -> MemoryOracle {
    let mut b = MemoryOracle::builder();
    let first = b.add_file("a/A.kt", "a", "package a\n\nclass A\nclass B\n");
    b.add_top_level(first, RawSymbol::class("A", RawClassKind::Class).with_syntax(native(first, 11)));
    b.add_top_level(first, RawSymbol::class("B", RawClassKind::Class).with_syntax(native(first, 19)));
    let second = b.add_file("a/C.kt", "a", "package a\n\nobject C\n");
    b.add_top_level(second, RawSymbol::class("C", RawClassKind::Object).with_syntax(native(second, 11)));
    b.build()
}

#[rstest]
#[case::global_pool(None)]
#[case::dedicated_pool(Some(2))]
fn test_par_map_files_keeps_file_order(#[case] parallelism: Option<usize>) {
    let config = match parallelism {
        Some(threads) => SessionConfig::new().with_parallelism(threads),
        None => SessionConfig::new(),
    };
    let session = session_with_config(two_files(), config);
    let resolver = Resolver::new(&session);

    let counts = resolver
        .par_map_files(|session, file| {
            Ok((file.file_name().to_string(), file.declarations(session).count()))
        })
        .unwrap();
    assert_eq!(counts, [("A.kt".to_string(), 2), ("C.kt".to_string(), 1)]);
}

#[test]
fn test_worker_pool_is_built_once_per_session() {
    let session = session_with_config(two_files(), SessionConfig::new().with_parallelism(2));
    let resolver = Resolver::new(&session);

    let pool = session.worker_pool().unwrap();
    assert_eq!(pool.current_num_threads(), 2);
    resolver.par_map_files(|_, _| Ok(())).unwrap();
    resolver.par_map_files(|_, _| Ok(())).unwrap();
    assert!(std::ptr::eq(pool, session.worker_pool().unwrap()));

    let default = session_with_config(two_files(), SessionConfig::new());
    assert!(default.worker_pool().is_none());
}

#[test]
fn test_par_map_files_propagates_errors() {
    let session = session(two_files());
    let resolver = Resolver::new(&session);

    let result = resolver.par_map_files(|_, file| {
        if file.file_name() == "C.kt" {
            Err(SymbolError::NotImplemented("C.kt"))
        } else {
            Ok(())
        }
    });
    assert!(result.unwrap_err().is_not_implemented());
}

#[test]
fn test_par_map_files_shares_wrappers() {
    let session = session(two_files());
    let resolver = Resolver::new(&session);

    let classes = resolver
        .par_map_files(|session, file| {
            file.declarations(session)
                .map(|d| d.map(|d| d.node_id()))
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap();
    let again: Vec<_> = resolver
        .new_files()
        .unwrap()
        .iter()
        .map(|file| {
            file.declarations(&session)
                .map(|d| d.unwrap().node_id())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(classes, again);
    assert_eq!(session.stats().get("class"), 3);
}

#[test]
fn test_declarations_from_package() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);
    let resolver = Resolver::new(&session);

    let compiled: Vec<_> = resolver
        .declarations_from_package("foo.compiled")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(compiled.len(), 1);
    assert_eq!(compiled[0].symbol_key(), keys.compiled);
    assert_eq!(compiled[0].simple_name(), "Bar");
    assert_eq!(compiled[0].package_name(), "foo.compiled");
    assert_eq!(resolver.declarations_from_package("nowhere").count(), 0);
}

#[test]
fn test_class_by_name() {
    let (oracle, keys) = const_properties_oracle();
    let session = session(oracle);
    let resolver = Resolver::new(&session);

    let foo = resolver.class_by_name("foo.Foo").unwrap().unwrap();
    assert!(std::sync::Arc::ptr_eq(&foo, &session.class(keys.foo).unwrap()));
    assert!(resolver.class_by_name("foo.Nope").unwrap().is_none());
}
