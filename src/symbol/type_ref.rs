//! Type references and their structural elements.
//!
//! A [`TypeReference`] is one use of an oracle type at one place in the
//! tree: keyed by (type, parent, index) where index is the position in a
//! supertype or bound list and `-1` marks a primary reference.
//!
//! `element` dispatch on the oracle type shape:
//!
//! ```text
//! functional      → CallableReference
//! dynamic         → DynamicReference
//! class           → ClassifierReference
//! flexible        → ClassifierReference of the lower bound
//! error, type var → none
//! anything else   → internal consistency error
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::error::{SymbolError, SymbolResult};
use super::location::{Origin, to_location};
use super::modifier::{Modifier, ModifierSet};
use super::node::NodeId;
use super::session::Session;
use super::types::{ResolvedType, TypeArgument, type_arguments};
use crate::base::{Location, Name};
use crate::oracle::{RawType, RawTypeArgument, TypeKey, TypeShape};

define_id!(
    /// Handle of a [`TypeReference`].
    TypeReferenceId,
    "type reference"
);
define_id!(
    /// Handle of a [`ClassifierReference`].
    ClassifierReferenceId,
    "classifier reference"
);
define_id!(
    /// Handle of a [`CallableReference`].
    CallableReferenceId,
    "callable reference"
);
define_id!(
    /// Handle of a [`DynamicReference`].
    DynamicReferenceId,
    "dynamic reference"
);

/// The structural shape behind a type reference.
#[derive(Debug, Clone)]
pub enum ReferenceElement {
    Classifier(Arc<ClassifierReference>),
    Callable(Arc<CallableReference>),
    Dynamic(Arc<DynamicReference>),
}

impl ReferenceElement {
    pub fn node_id(&self) -> NodeId {
        match self {
            ReferenceElement::Classifier(e) => e.node_id(),
            ReferenceElement::Callable(e) => e.node_id(),
            ReferenceElement::Dynamic(e) => e.node_id(),
        }
    }
}

#[derive(Debug)]
pub struct TypeReference {
    id: TypeReferenceId,
    ty: TypeKey,
    parent: Option<NodeId>,
    index: i32,
    origin: Origin,
    element: OnceCell<Option<ReferenceElement>>,
    modifiers: OnceCell<ModifierSet>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl TypeReference {
    pub(crate) fn new(id: TypeReferenceId, ty: TypeKey, parent: Option<NodeId>, index: i32, origin: Origin) -> Self {
        Self {
            id,
            ty,
            parent,
            index,
            origin,
            element: OnceCell::new(),
            modifiers: OnceCell::new(),
            annotations: OnceCell::new(),
        }
    }

    pub fn id(&self) -> TypeReferenceId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::TypeReference(self.id)
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    fn raw_type(&self, session: &Session) -> SymbolResult<Arc<RawType>> {
        Ok(session.oracle().ty(self.ty)?)
    }

    /// Rendered text of the referenced type.
    pub fn render(&self, session: &Session) -> SymbolResult<Name> {
        let raw = self.raw_type(session)?;
        Ok(if raw.nullable {
            Name::new(format!("{}?", raw.rendered))
        } else {
            raw.rendered.clone()
        })
    }

    /// `None` for references without a physical parent, and for error and
    /// type-parameter types.
    pub fn element(&self, session: &Session) -> SymbolResult<Option<&ReferenceElement>> {
        self.element
            .get_or_try_init(|| self.compute_element(session))
            .map(Option::as_ref)
    }

    fn compute_element(&self, session: &Session) -> SymbolResult<Option<ReferenceElement>> {
        if self.parent.is_none() || self.origin == Origin::Synthetic {
            return Ok(None);
        }
        let raw = self.raw_type(session)?;
        let element = match &raw.shape {
            TypeShape::Functional { .. } => ReferenceElement::Callable(session.callable_reference(self.ty, self)?),
            TypeShape::Dynamic => ReferenceElement::Dynamic(session.dynamic_reference(self)),
            TypeShape::Class { .. } => ReferenceElement::Classifier(session.classifier_reference(self.ty, self)?),
            TypeShape::Flexible { lower, .. } => {
                let lower_raw = session.oracle().ty(*lower)?;
                if !matches!(lower_raw.shape, TypeShape::Class { .. }) {
                    return Err(SymbolError::inconsistency(
                        format!("lower bound of flexible type `{}`", raw.rendered),
                        "class type",
                        lower_raw.shape.describe(),
                    ));
                }
                ReferenceElement::Classifier(session.classifier_reference(*lower, self)?)
            }
            TypeShape::Error | TypeShape::ClassError { .. } | TypeShape::TypeParameter { .. } => {
                return Ok(None);
            }
            other => {
                return Err(SymbolError::inconsistency(
                    format!("type reference `{}`", raw.rendered),
                    "functional, dynamic, class, flexible, error or type parameter type",
                    other.describe(),
                ));
            }
        };
        Ok(Some(element))
    }

    /// Resolve to a full type, or the error sentinel when the oracle cannot
    /// classify it.
    pub fn resolve(&self, session: &Session) -> SymbolResult<ResolvedType> {
        let raw = self.raw_type(session)?;
        if matches!(raw.shape, TypeShape::Error | TypeShape::ClassError { .. })
            || session.oracle().classifier(self.ty).is_none()
        {
            return Ok(ResolvedType::Error);
        }
        Ok(ResolvedType::Type(session.resolved_type(self.ty)?))
    }

    /// `suspend` for suspend functional types, nothing otherwise.
    pub fn modifiers(&self, session: &Session) -> SymbolResult<&ModifierSet> {
        self.modifiers.get_or_try_init(|| {
            let raw = self.raw_type(session)?;
            let mut set = ModifierSet::default();
            if let TypeShape::Functional { is_suspend: true, .. } = raw.shape {
                set.insert(Modifier::Suspend);
            }
            Ok(set)
        })
    }

    /// Annotations on the reference itself, not on the resolved type.
    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                let raw = self.raw_type(session)?;
                raw.annotations
                    .iter()
                    .map(|&key| session.annotation(key, Some(self.node_id())))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Primary references share their parent's location; indexed ones point
    /// at their entry in the parent's supertype or bound list.
    pub fn location(&self, session: &Session) -> Location {
        let Some(parent) = self.parent else {
            return Location::Absent;
        };
        if self.index < 0 {
            return parent.location(session).unwrap_or(Location::Absent);
        }
        let index = self.index as usize;
        let position = match parent {
            NodeId::Class(id) => session.get(id).ok().and_then(|class| {
                let syntax = class.core.raw.syntax.as_ref()?;
                syntax.supertype_entries.get(index).copied()
            }),
            NodeId::TypeParameter(id) => session.get(id).ok().and_then(|parameter| {
                let syntax = parameter.core.raw.syntax.as_ref()?;
                syntax.bound_entries.get(index).copied()
            }),
            _ => None,
        };
        to_location(session.oracle(), position)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(self.parent)
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        children.extend(self.element(session)?.map(ReferenceElement::node_id));
        Ok(children)
    }
}

/// A reference to a class, with its type arguments.
#[derive(Debug)]
pub struct ClassifierReference {
    id: ClassifierReferenceId,
    ty: TypeKey,
    owner: TypeReferenceId,
    origin: Origin,
    class_name: Name,
    raw_arguments: Vec<RawTypeArgument>,
    type_arguments: OnceCell<Vec<TypeArgument>>,
}

impl ClassifierReference {
    pub(crate) fn new(
        id: ClassifierReferenceId,
        ty: TypeKey,
        owner: TypeReferenceId,
        origin: Origin,
        class_name: Name,
        raw_arguments: Vec<RawTypeArgument>,
    ) -> Self {
        Self {
            id,
            ty,
            owner,
            origin,
            class_name,
            raw_arguments,
            type_arguments: OnceCell::new(),
        }
    }

    pub fn id(&self) -> ClassifierReferenceId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::ClassifierReference(self.id)
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Short class name.
    pub fn referenced_name(&self) -> &str {
        self.class_name.rsplit('.').next().unwrap_or(&self.class_name)
    }

    pub fn qualified_name(&self) -> &str {
        &self.class_name
    }

    pub fn type_arguments(&self, session: &Session) -> SymbolResult<&[TypeArgument]> {
        self.type_arguments
            .get_or_try_init(|| type_arguments(session, &self.raw_arguments, Some(self.node_id())))
            .map(Vec::as_slice)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn location(&self, session: &Session) -> Location {
        NodeId::TypeReference(self.owner)
            .location(session)
            .unwrap_or(Location::Absent)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::TypeReference(self.owner)))
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        Ok(self
            .type_arguments(session)?
            .iter()
            .filter_map(|argument| argument.type_ref.as_ref().map(|r| r.node_id()))
            .collect())
    }
}

/// The parts of a functional type.
#[derive(Debug, Clone)]
pub(crate) struct FunctionShape {
    pub(crate) is_suspend: bool,
    pub(crate) receiver: Option<TypeKey>,
    pub(crate) parameters: Vec<TypeKey>,
    pub(crate) return_type: TypeKey,
}

/// A reference to a functional type.
#[derive(Debug)]
pub struct CallableReference {
    id: CallableReferenceId,
    ty: TypeKey,
    owner: TypeReferenceId,
    origin: Origin,
    shape: FunctionShape,
    receiver_type: OnceCell<Option<Arc<TypeReference>>>,
    function_parameters: OnceCell<Vec<Arc<TypeReference>>>,
    return_type: OnceCell<Arc<TypeReference>>,
}

impl CallableReference {
    pub(crate) fn new(
        id: CallableReferenceId,
        ty: TypeKey,
        owner: TypeReferenceId,
        origin: Origin,
        shape: FunctionShape,
    ) -> Self {
        Self {
            id,
            ty,
            owner,
            origin,
            shape,
            receiver_type: OnceCell::new(),
            function_parameters: OnceCell::new(),
            return_type: OnceCell::new(),
        }
    }

    pub fn id(&self) -> CallableReferenceId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::CallableReference(self.id)
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn is_suspend(&self) -> bool {
        self.shape.is_suspend
    }

    pub fn receiver_type(&self, session: &Session) -> SymbolResult<Option<&Arc<TypeReference>>> {
        self.receiver_type
            .get_or_try_init(|| {
                self.shape
                    .receiver
                    .map(|ty| session.type_reference(ty, Some(self.node_id()), -1))
                    .transpose()
            })
            .map(Option::as_ref)
    }

    pub fn function_parameters(&self, session: &Session) -> SymbolResult<&[Arc<TypeReference>]> {
        self.function_parameters
            .get_or_try_init(|| {
                self.shape
                    .parameters
                    .iter()
                    .map(|&ty| session.type_reference(ty, Some(self.node_id()), -1))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn return_type(&self, session: &Session) -> SymbolResult<&Arc<TypeReference>> {
        self.return_type
            .get_or_try_init(|| session.type_reference(self.shape.return_type, Some(self.node_id()), -1))
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn location(&self, session: &Session) -> Location {
        NodeId::TypeReference(self.owner)
            .location(session)
            .unwrap_or(Location::Absent)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::TypeReference(self.owner)))
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.receiver_type(session)?.map(|r| r.node_id()).into_iter().collect();
        children.extend(self.function_parameters(session)?.iter().map(|p| p.node_id()));
        children.push(self.return_type(session)?.node_id());
        Ok(children)
    }
}

/// A reference to the dynamic type.
#[derive(Debug)]
pub struct DynamicReference {
    id: DynamicReferenceId,
    owner: TypeReferenceId,
    origin: Origin,
}

impl DynamicReference {
    pub(crate) fn new(id: DynamicReferenceId, owner: TypeReferenceId, origin: Origin) -> Self {
        Self { id, owner, origin }
    }

    pub fn id(&self) -> DynamicReferenceId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::DynamicReference(self.id)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn location(&self, session: &Session) -> Location {
        NodeId::TypeReference(self.owner)
            .location(session)
            .unwrap_or(Location::Absent)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::TypeReference(self.owner)))
    }

    pub(crate) fn children(&self, _session: &Session) -> SymbolResult<Vec<NodeId>> {
        Ok(Vec::new())
    }
}
