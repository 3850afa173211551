//! Property declarations.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::accessor::{PropertyGetter, PropertySetter};
use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::{Declaration, DeclarationCore};
use super::error::SymbolResult;
use super::location::Origin;
use super::modifier::{Modifier, ModifierSet, add_if};
use super::node::NodeId;
use super::parameter::TypeParameter;
use super::session::Session;
use super::type_ref::TypeReference;
use crate::base::{Location, Name};
use crate::oracle::{RawProperty, RawSymbol, RawUseSiteTarget, SymbolKey};

define_id!(
    /// Handle of a [`PropertyDeclaration`].
    PropertyId,
    "property"
);

#[derive(Debug)]
pub struct PropertyDeclaration {
    id: PropertyId,
    pub(crate) core: DeclarationCore,
    property: RawProperty,
    modifiers: OnceCell<ModifierSet>,
    ty: OnceCell<Arc<TypeReference>>,
    extension_receiver: OnceCell<Option<Arc<TypeReference>>>,
    getter: OnceCell<Option<Arc<PropertyGetter>>>,
    setter: OnceCell<Option<Arc<PropertySetter>>>,
    type_parameters: OnceCell<Vec<Arc<TypeParameter>>>,
}

impl PropertyDeclaration {
    pub(crate) fn new(id: PropertyId, key: SymbolKey, raw: Arc<RawSymbol>, property: RawProperty) -> Self {
        Self {
            id,
            core: DeclarationCore::new(key, raw),
            property,
            modifiers: OnceCell::new(),
            ty: OnceCell::new(),
            extension_receiver: OnceCell::new(),
            getter: OnceCell::new(),
            setter: OnceCell::new(),
            type_parameters: OnceCell::new(),
        }
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Property(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core.key
    }

    pub fn simple_name(&self) -> &str {
        self.core.raw.display_name()
    }

    pub fn qualified_name(&self, session: &Session) -> SymbolResult<Option<&Name>> {
        self.core.qualified_name(session, self.simple_name())
    }

    pub fn package_name(&self) -> &str {
        &self.core.raw.package
    }

    pub fn doc_string(&self) -> Option<&str> {
        self.core.doc_string()
    }

    pub fn is_mutable(&self) -> bool {
        self.property.flags.is_mutable
    }

    pub fn has_backing_field(&self) -> bool {
        self.property.flags.has_backing_field
    }

    pub fn modifiers(&self, _session: &Session) -> SymbolResult<&ModifierSet> {
        self.modifiers.get_or_try_init(|| {
            let mut set = self.core.keyword_modifiers();
            set.extend(Modifier::from_visibility(self.core.raw.visibility));
            set.extend(self.core.raw.modality.map(Modifier::from_modality));
            let flags = self.property.flags;
            add_if(&mut set, flags.is_const, Modifier::Const);
            add_if(&mut set, flags.is_lateinit, Modifier::Lateinit);
            add_if(&mut set, flags.is_static, Modifier::JavaStatic);
            add_if(&mut set, flags.is_override, Modifier::Override);
            add_if(&mut set, flags.is_external, Modifier::External);
            Ok(set)
        })
    }

    /// Annotations of the property itself; accessor-targeted ones belong to
    /// the accessors.
    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations_where(session, self.node_id(), |target| {
            !matches!(
                target,
                Some(
                    RawUseSiteTarget::PropertyGetter
                        | RawUseSiteTarget::PropertySetter
                        | RawUseSiteTarget::SetterParameter
                )
            )
        })
    }

    pub fn ty(&self, session: &Session) -> SymbolResult<&Arc<TypeReference>> {
        self.ty
            .get_or_try_init(|| session.type_reference(self.property.ty, Some(self.node_id()), -1))
    }

    pub fn extension_receiver(&self, session: &Session) -> SymbolResult<Option<&Arc<TypeReference>>> {
        self.extension_receiver
            .get_or_try_init(|| {
                self.property
                    .receiver_type
                    .map(|ty| session.type_reference(ty, Some(self.node_id()), -1))
                    .transpose()
            })
            .map(Option::as_ref)
    }

    pub fn getter(&self, session: &Session) -> SymbolResult<Option<&Arc<PropertyGetter>>> {
        self.getter
            .get_or_try_init(|| {
                self.property
                    .getter
                    .map(|key| session.getter(self.id, key))
                    .transpose()
            })
            .map(Option::as_ref)
    }

    pub fn setter(&self, session: &Session) -> SymbolResult<Option<&Arc<PropertySetter>>> {
        self.setter
            .get_or_try_init(|| {
                self.property
                    .setter
                    .map(|key| session.setter(self.id, key))
                    .transpose()
            })
            .map(Option::as_ref)
    }

    pub fn type_parameters(&self, session: &Session) -> SymbolResult<&[Arc<TypeParameter>]> {
        self.type_parameters
            .get_or_try_init(|| {
                self.property
                    .type_parameters
                    .iter()
                    .map(|&key| session.type_parameter(key))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn parent_declaration(&self, session: &Session) -> SymbolResult<Option<Declaration>> {
        match self.parent(session)? {
            Some(parent) => session.node_declaration(parent),
            None => Ok(None),
        }
    }

    pub fn origin(&self) -> Origin {
        self.core.origin()
    }

    pub fn location(&self, session: &Session) -> Location {
        self.core.location(session)
    }

    pub fn parent(&self, session: &Session) -> SymbolResult<Option<NodeId>> {
        self.core.parent(session)
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        children.extend(self.type_parameters(session)?.iter().map(|p| p.node_id()));
        children.extend(self.extension_receiver(session)?.map(|r| r.node_id()));
        children.push(self.ty(session)?.node_id());
        children.extend(self.getter(session)?.map(|g| g.node_id()));
        children.extend(self.setter(session)?.map(|s| s.node_id()));
        Ok(children)
    }
}
