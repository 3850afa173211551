//! Resolved types.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::Declaration;
use super::error::{SymbolError, SymbolResult};
use super::node::NodeId;
use super::session::Session;
use super::type_ref::TypeReference;
use crate::oracle::{RawType, RawTypeArgument, RawVariance, TypeKey, TypeShape};

define_id!(
    /// Handle of a [`Type`].
    TypeId,
    "type"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Star,
    Invariant,
    Covariant,
    Contravariant,
}

impl From<RawVariance> for Variance {
    fn from(variance: RawVariance) -> Self {
        match variance {
            RawVariance::Invariant => Variance::Invariant,
            RawVariance::Out => Variance::Covariant,
            RawVariance::In => Variance::Contravariant,
        }
    }
}

/// One type argument: a variance and, unless it is a star, a reference.
#[derive(Debug, Clone)]
pub struct TypeArgument {
    pub variance: Variance,
    pub type_ref: Option<Arc<TypeReference>>,
}

impl TypeArgument {
    pub fn is_star(&self) -> bool {
        self.variance == Variance::Star
    }
}

/// Wrap raw arguments as references owned by `parent`.
pub(crate) fn type_arguments(
    session: &Session,
    arguments: &[RawTypeArgument],
    parent: Option<NodeId>,
) -> SymbolResult<Vec<TypeArgument>> {
    arguments
        .iter()
        .map(|argument| match *argument {
            RawTypeArgument::Star => Ok(TypeArgument {
                variance: Variance::Star,
                type_ref: None,
            }),
            RawTypeArgument::Projection { variance, ty } => Ok(TypeArgument {
                variance: variance.into(),
                type_ref: Some(session.type_reference(ty, parent, -1)?),
            }),
        })
        .collect()
}

/// Result of resolving a type reference.
#[derive(Debug, Clone)]
pub enum ResolvedType {
    /// The oracle could not classify the type.
    Error,
    Type(Arc<Type>),
}

impl ResolvedType {
    pub fn is_error(&self) -> bool {
        matches!(self, ResolvedType::Error)
    }

    pub fn as_type(&self) -> Option<&Arc<Type>> {
        match self {
            ResolvedType::Error => None,
            ResolvedType::Type(ty) => Some(ty),
        }
    }
}

/// A fully resolved type, one per oracle type.
pub struct Type {
    id: TypeId,
    key: TypeKey,
    raw: Arc<RawType>,
    declaration: OnceCell<Declaration>,
    arguments: OnceCell<Vec<TypeArgument>>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("rendered", &self.raw.rendered)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw.rendered)?;
        if self.raw.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl Type {
    pub(crate) fn new(id: TypeId, key: TypeKey, raw: Arc<RawType>) -> Self {
        Self {
            id,
            key,
            raw,
            declaration: OnceCell::new(),
            arguments: OnceCell::new(),
            annotations: OnceCell::new(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    /// The classifier behind this type.
    pub fn declaration(&self, session: &Session) -> SymbolResult<&Declaration> {
        self.declaration.get_or_try_init(|| {
            let Some(classifier) = session.oracle().classifier(self.key) else {
                return Err(SymbolError::inconsistency(
                    format!("type `{}`", self.raw.rendered),
                    "type with a classifier",
                    self.raw.shape.describe(),
                ));
            };
            session.declaration(classifier)
        })
    }

    pub fn arguments(&self, session: &Session) -> SymbolResult<&[TypeArgument]> {
        self.arguments
            .get_or_try_init(|| {
                let raw = match &self.raw.shape {
                    TypeShape::Flexible { lower, .. } => session.oracle().ty(*lower)?,
                    TypeShape::DefinitelyNotNull(inner) => session.oracle().ty(*inner)?,
                    _ => Arc::clone(&self.raw),
                };
                match &raw.shape {
                    TypeShape::Class { arguments, .. } | TypeShape::Functional { arguments, .. } => {
                        type_arguments(session, arguments, None)
                    }
                    _ => Ok(Vec::new()),
                }
            })
            .map(Vec::as_slice)
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                self.raw
                    .annotations
                    .iter()
                    .map(|&key| session.annotation(key, None))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn is_marked_nullable(&self) -> bool {
        self.raw.nullable
    }

    pub fn is_function_type(&self) -> bool {
        matches!(self.raw.shape, TypeShape::Functional { is_suspend: false, .. })
    }

    pub fn is_suspend_function_type(&self) -> bool {
        matches!(self.raw.shape, TypeShape::Functional { is_suspend: true, .. })
    }

    /// Every argument is a star projection.
    pub fn is_star_projected(&self, session: &Session) -> SymbolResult<bool> {
        let arguments = self.arguments(session)?;
        Ok(!arguments.is_empty() && arguments.iter().all(TypeArgument::is_star))
    }

    pub fn rendered(&self) -> &str {
        &self.raw.rendered
    }
}
