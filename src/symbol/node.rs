//! Node handles.
//!
//! [`NodeId`] is the closed set of wrapper kinds. Parent links are stored as
//! `NodeId`s and resolved through the session, never as owning pointers.

use super::annotation::{AnnotationId, ValueArgumentId};
use super::accessor::{GetterId, SetterId};
use super::class::ClassId;
use super::error::SymbolResult;
use super::file::SourceFileId;
use super::function::FunctionId;
use super::location::Origin;
use super::parameter::{TypeParameterId, ValueParameterId};
use super::property::PropertyId;
use super::session::Session;
use super::type_ref::{
    CallableReferenceId, ClassifierReferenceId, DynamicReferenceId, TypeReferenceId,
};
use super::visitor::SymbolVisitor;
use crate::base::Location;

/// A non-owning handle to any wrapper in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    File(SourceFileId),
    Class(ClassId),
    Function(FunctionId),
    Property(PropertyId),
    Getter(GetterId),
    Setter(SetterId),
    ValueParameter(ValueParameterId),
    TypeParameter(TypeParameterId),
    TypeReference(TypeReferenceId),
    ClassifierReference(ClassifierReferenceId),
    CallableReference(CallableReferenceId),
    DynamicReference(DynamicReferenceId),
    Annotation(AnnotationId),
    ValueArgument(ValueArgumentId),
}

/// Run `$body` with `$node` bound to the resolved wrapper, whatever its kind.
macro_rules! with_node {
    ($session:expr, $id:expr, |$node:ident| $body:expr) => {
        match $id {
            NodeId::File(id) => { let $node = $session.get(id)?; $body }
            NodeId::Class(id) => { let $node = $session.get(id)?; $body }
            NodeId::Function(id) => { let $node = $session.get(id)?; $body }
            NodeId::Property(id) => { let $node = $session.get(id)?; $body }
            NodeId::Getter(id) => { let $node = $session.get(id)?; $body }
            NodeId::Setter(id) => { let $node = $session.get(id)?; $body }
            NodeId::ValueParameter(id) => { let $node = $session.get(id)?; $body }
            NodeId::TypeParameter(id) => { let $node = $session.get(id)?; $body }
            NodeId::TypeReference(id) => { let $node = $session.get(id)?; $body }
            NodeId::ClassifierReference(id) => { let $node = $session.get(id)?; $body }
            NodeId::CallableReference(id) => { let $node = $session.get(id)?; $body }
            NodeId::DynamicReference(id) => { let $node = $session.get(id)?; $body }
            NodeId::Annotation(id) => { let $node = $session.get(id)?; $body }
            NodeId::ValueArgument(id) => { let $node = $session.get(id)?; $body }
        }
    };
}

impl NodeId {
    pub fn kind(self) -> &'static str {
        match self {
            NodeId::File(_) => "file",
            NodeId::Class(_) => "class",
            NodeId::Function(_) => "function",
            NodeId::Property(_) => "property",
            NodeId::Getter(_) => "getter",
            NodeId::Setter(_) => "setter",
            NodeId::ValueParameter(_) => "value parameter",
            NodeId::TypeParameter(_) => "type parameter",
            NodeId::TypeReference(_) => "type reference",
            NodeId::ClassifierReference(_) => "classifier reference",
            NodeId::CallableReference(_) => "callable reference",
            NodeId::DynamicReference(_) => "dynamic reference",
            NodeId::Annotation(_) => "annotation",
            NodeId::ValueArgument(_) => "value argument",
        }
    }

    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeId::Class(_) | NodeId::Function(_) | NodeId::Property(_) | NodeId::TypeParameter(_)
        )
    }

    /// Double dispatch: call the visitor method for this node's kind.
    pub fn accept<D, R, V>(self, session: &Session, visitor: &mut V, data: &mut D) -> SymbolResult<R>
    where
        V: SymbolVisitor<D, R> + ?Sized,
    {
        match self {
            NodeId::File(id) => visitor.visit_file(session, &session.get(id)?, data),
            NodeId::Class(id) => visitor.visit_class(session, &session.get(id)?, data),
            NodeId::Function(id) => visitor.visit_function(session, &session.get(id)?, data),
            NodeId::Property(id) => visitor.visit_property(session, &session.get(id)?, data),
            NodeId::Getter(id) => visitor.visit_getter(session, &session.get(id)?, data),
            NodeId::Setter(id) => visitor.visit_setter(session, &session.get(id)?, data),
            NodeId::ValueParameter(id) => {
                visitor.visit_value_parameter(session, &session.get(id)?, data)
            }
            NodeId::TypeParameter(id) => {
                visitor.visit_type_parameter(session, &session.get(id)?, data)
            }
            NodeId::TypeReference(id) => {
                visitor.visit_type_reference(session, &session.get(id)?, data)
            }
            NodeId::ClassifierReference(id) => {
                visitor.visit_classifier_reference(session, &session.get(id)?, data)
            }
            NodeId::CallableReference(id) => {
                visitor.visit_callable_reference(session, &session.get(id)?, data)
            }
            NodeId::DynamicReference(id) => {
                visitor.visit_dynamic_reference(session, &session.get(id)?, data)
            }
            NodeId::Annotation(id) => visitor.visit_annotation(session, &session.get(id)?, data),
            NodeId::ValueArgument(id) => {
                visitor.visit_value_argument(session, &session.get(id)?, data)
            }
        }
    }

    pub fn origin(self, session: &Session) -> SymbolResult<Origin> {
        with_node!(session, self, |node| Ok(node.origin()))
    }

    pub fn location(self, session: &Session) -> SymbolResult<Location> {
        with_node!(session, self, |node| Ok(node.location(session)))
    }

    pub fn parent(self, session: &Session) -> SymbolResult<Option<NodeId>> {
        with_node!(session, self, |node| node.parent(session))
    }

    /// Owned children, in traversal order.
    pub fn children(self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        with_node!(session, self, |node| node.children(session))
    }
}
