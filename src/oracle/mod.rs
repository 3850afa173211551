//! The oracle boundary: the front-end analysis engine seen as a black box.
//!
//! The symbol layer never parses or type-checks anything itself. It asks an
//! [`Oracle`] for raw symbols, types, annotation applications, constant
//! values and physical positions, then wraps what comes back.
//!
//! ## Query groups
//!
//! ```text
//! symbol queries     new_files, file, declarations_in_package, class_by_name,
//!                    symbol, annotation
//! type resolution    ty, classifier, class_type, star_projected_type,
//!                    return_type, resolve_interop_return_type
//! constants          evaluate_constant
//! positions          line_col
//! ```
//!
//! [`MemoryOracle`] is an in-memory implementation used by sample workloads
//! and tests.

mod memory;
mod raw;

use std::sync::Arc;

use text_size::TextSize;
use thiserror::Error;

use crate::base::LineCol;

pub use memory::{MemoryOracle, MemoryOracleBuilder};
pub use raw::*;

/// Failures reported by the oracle itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(SymbolKey),

    #[error("unknown type {0:?}")]
    UnknownType(TypeKey),

    #[error("unknown annotation {0:?}")]
    UnknownAnnotation(AnnotationKey),

    #[error("unknown file {0:?}")]
    UnknownFile(FileKey),

    #[error("{0}")]
    Other(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// The front-end analysis engine.
///
/// Implementations may lock internally; every method may be called from
/// several worker threads at once.
pub trait Oracle: Send + Sync {
    /// Files that belong to this session's scope.
    fn new_files(&self) -> Vec<FileKey>;

    fn file(&self, file: FileKey) -> OracleResult<Arc<RawFile>>;

    /// Top-level declarations of a package, source and compiled alike.
    fn declarations_in_package(&self, package: &str) -> Vec<SymbolKey>;

    /// Look up a class by its fully qualified name.
    fn class_by_name(&self, qualified_name: &str) -> Option<SymbolKey>;

    fn symbol(&self, key: SymbolKey) -> OracleResult<Arc<RawSymbol>>;

    fn annotation(&self, key: AnnotationKey) -> OracleResult<Arc<RawAnnotation>>;

    fn ty(&self, key: TypeKey) -> OracleResult<Arc<RawType>>;

    /// The classifier (class or type parameter) a type refers to.
    fn classifier(&self, ty: TypeKey) -> Option<SymbolKey>;

    /// The type of a class with its own type parameters as arguments.
    fn class_type(&self, class: SymbolKey) -> OracleResult<TypeKey>;

    /// The type of a class with every argument replaced by a star projection.
    fn star_projected_type(&self, class: SymbolKey) -> OracleResult<TypeKey>;

    /// The declared return type of a function as currently known.
    fn return_type(&self, function: SymbolKey) -> OracleResult<TypeKey>;

    /// Force resolution of an interop method's return type against the
    /// generic environment of its declaring class.
    fn resolve_interop_return_type(
        &self,
        function: SymbolKey,
        declaring_class: SymbolKey,
    ) -> OracleResult<()>;

    /// Evaluate an expression as a compile-time constant.
    fn evaluate_constant(&self, expr: ExprKey) -> Option<ConstantValue>;

    fn line_col(&self, file: FileKey, offset: TextSize) -> Option<LineCol>;
}
