//! Symbol layer: cached wrappers over oracle results.
//!
//! ## Shape
//!
//! ```text
//! Session ── owns ──> SymbolCaches (one IdentityCache per wrapper kind)
//!    │                     │
//!    │ wraps               └─ Arc<Wrapper> slots, addressed by Copy ids
//!    v
//! SourceFile ─> Declaration (class, function, property, type parameter)
//!                  ├─> PropertyGetter / PropertySetter
//!                  ├─> ValueParameter
//!                  ├─> TypeReference ─> Classifier/Callable/DynamicReference
//!                  └─> Annotation ─> ValueArgument
//! ```
//!
//! Children are owned through `Arc`s filled lazily exactly once. Parents are
//! [`NodeId`]s resolved through the session. Structurally equal queries
//! return the same `Arc`.

mod accessor;
mod annotation;
pub(crate) mod cache;
mod class;
mod declaration;
mod error;
mod file;
mod function;
mod location;
mod modifier;
mod node;
mod parameter;
mod property;
mod session;
mod type_ref;
mod types;
mod visitor;

pub use accessor::{GetterId, PropertyGetter, PropertySetter, SetterId};
pub use annotation::{
    Annotation, AnnotationId, ArgumentSource, UseSiteTarget, ValueArgument, ValueArgumentId,
};
pub use cache::{ArenaId, IdentityCache};
pub use class::{ClassDeclaration, ClassId, ClassKind};
pub use declaration::Declaration;
pub use error::{SymbolError, SymbolResult};
pub use file::{SourceFile, SourceFileId};
pub use function::{FunctionDeclaration, FunctionId, FunctionKind};
pub use location::{Origin, map_origin, to_location};
pub use modifier::{Modifier, ModifierSet, modifiers_from_keywords, modifiers_from_syntax};
pub use node::NodeId;
pub use parameter::{TypeParameter, TypeParameterId, ValueParameter, ValueParameterId};
pub use property::{PropertyDeclaration, PropertyId};
pub use session::{CacheStats, Handle, Session, SymbolCaches, TypeReferenceKey};
pub use type_ref::{
    CallableReference, CallableReferenceId, ClassifierReference, ClassifierReferenceId,
    DynamicReference, DynamicReferenceId, ReferenceElement, TypeReference, TypeReferenceId,
};
pub use types::{ResolvedType, Type, TypeArgument, TypeId, Variance};
pub use visitor::{SymbolVisitor, walk_top_down};
