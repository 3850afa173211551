//! Visitor over the wrapped symbol graph.
//!
//! Every `visit_*` method has a default. Declaration kinds route through
//! [`SymbolVisitor::visit_declaration`]; everything ends up in
//! [`SymbolVisitor::default_handler`].

use std::sync::Arc;

use super::annotation::{Annotation, ValueArgument};
use super::accessor::{PropertyGetter, PropertySetter};
use super::class::ClassDeclaration;
use super::declaration::Declaration;
use super::error::SymbolResult;
use super::file::SourceFile;
use super::function::FunctionDeclaration;
use super::node::NodeId;
use super::parameter::{TypeParameter, ValueParameter};
use super::property::PropertyDeclaration;
use super::session::Session;
use super::type_ref::{CallableReference, ClassifierReference, DynamicReference, TypeReference};

pub trait SymbolVisitor<D, R> {
    fn default_handler(&mut self, session: &Session, node: NodeId, data: &mut D) -> SymbolResult<R>;

    fn visit_declaration(
        &mut self,
        session: &Session,
        declaration: &Declaration,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, declaration.node_id(), data)
    }

    fn visit_file(&mut self, session: &Session, file: &Arc<SourceFile>, data: &mut D) -> SymbolResult<R> {
        self.default_handler(session, file.node_id(), data)
    }

    fn visit_class(
        &mut self,
        session: &Session,
        class: &Arc<ClassDeclaration>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.visit_declaration(session, &Declaration::Class(Arc::clone(class)), data)
    }

    fn visit_function(
        &mut self,
        session: &Session,
        function: &Arc<FunctionDeclaration>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.visit_declaration(session, &Declaration::Function(Arc::clone(function)), data)
    }

    fn visit_property(
        &mut self,
        session: &Session,
        property: &Arc<PropertyDeclaration>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.visit_declaration(session, &Declaration::Property(Arc::clone(property)), data)
    }

    fn visit_type_parameter(
        &mut self,
        session: &Session,
        parameter: &Arc<TypeParameter>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.visit_declaration(session, &Declaration::TypeParameter(Arc::clone(parameter)), data)
    }

    fn visit_getter(&mut self, session: &Session, getter: &Arc<PropertyGetter>, data: &mut D) -> SymbolResult<R> {
        self.default_handler(session, getter.node_id(), data)
    }

    fn visit_setter(&mut self, session: &Session, setter: &Arc<PropertySetter>, data: &mut D) -> SymbolResult<R> {
        self.default_handler(session, setter.node_id(), data)
    }

    fn visit_value_parameter(
        &mut self,
        session: &Session,
        parameter: &Arc<ValueParameter>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, parameter.node_id(), data)
    }

    fn visit_type_reference(
        &mut self,
        session: &Session,
        reference: &Arc<TypeReference>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, reference.node_id(), data)
    }

    fn visit_classifier_reference(
        &mut self,
        session: &Session,
        reference: &Arc<ClassifierReference>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, reference.node_id(), data)
    }

    fn visit_callable_reference(
        &mut self,
        session: &Session,
        reference: &Arc<CallableReference>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, reference.node_id(), data)
    }

    fn visit_dynamic_reference(
        &mut self,
        session: &Session,
        reference: &Arc<DynamicReference>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, reference.node_id(), data)
    }

    fn visit_annotation(
        &mut self,
        session: &Session,
        annotation: &Arc<Annotation>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, annotation.node_id(), data)
    }

    fn visit_value_argument(
        &mut self,
        session: &Session,
        argument: &Arc<ValueArgument>,
        data: &mut D,
    ) -> SymbolResult<R> {
        self.default_handler(session, argument.node_id(), data)
    }
}

/// Visit `root` and then every node below it, parents before children.
pub fn walk_top_down<D, V>(session: &Session, root: NodeId, visitor: &mut V, data: &mut D) -> SymbolResult<()>
where
    V: SymbolVisitor<D, ()> + ?Sized,
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        node.accept(session, visitor, data)?;
        let children = node.children(session)?;
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}
