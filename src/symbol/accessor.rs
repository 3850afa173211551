//! Property accessors.
//!
//! An accessor is keyed by its owning property and its own symbol. A
//! native-origin accessor without physical syntax was generated by the
//! compiler and reports [`Origin::Synthetic`]; inside an interface it is
//! implicitly abstract.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::class::ClassKind;
use super::declaration::Declaration;
use super::error::{SymbolError, SymbolResult};
use super::location::{Origin, map_origin, symbol_location};
use super::modifier::{Modifier, ModifierSet, modifiers_from_syntax};
use super::node::NodeId;
use super::parameter::ValueParameter;
use super::property::{PropertyDeclaration, PropertyId};
use super::session::Session;
use super::type_ref::TypeReference;
use crate::base::Location;
use crate::oracle::{RawSymbol, RawUseSiteTarget, SymbolKey, TypeKey};

define_id!(
    /// Handle of a [`PropertyGetter`].
    GetterId,
    "getter"
);
define_id!(
    /// Handle of a [`PropertySetter`].
    SetterId,
    "setter"
);

#[derive(Debug)]
struct AccessorCore {
    key: SymbolKey,
    raw: Arc<RawSymbol>,
    receiver: PropertyId,
    modifiers: OnceCell<ModifierSet>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl AccessorCore {
    fn new(key: SymbolKey, raw: Arc<RawSymbol>, receiver: PropertyId) -> Self {
        Self {
            key,
            raw,
            receiver,
            modifiers: OnceCell::new(),
            annotations: OnceCell::new(),
        }
    }

    fn origin(&self) -> Origin {
        match map_origin(&self.raw) {
            Origin::Source if self.raw.syntax.is_none() => Origin::Synthetic,
            origin => origin,
        }
    }

    fn modifiers(&self, session: &Session) -> SymbolResult<&ModifierSet> {
        self.modifiers.get_or_try_init(|| {
            let mut set = self
                .raw
                .syntax
                .as_ref()
                .map(modifiers_from_syntax)
                .unwrap_or_default();
            if self.origin() == Origin::Synthetic {
                let property = session.get(self.receiver)?;
                if let Some(Declaration::Class(class)) = property.parent_declaration(session)? {
                    if class.class_kind()? == ClassKind::Interface {
                        set.insert(Modifier::Abstract);
                    }
                }
            }
            Ok(set)
        })
    }

    /// Own annotations minus those aimed at `excluded`, then the property's
    /// annotations aimed at `pulled`.
    fn annotations(
        &self,
        session: &Session,
        owner: NodeId,
        excluded: RawUseSiteTarget,
        pulled: RawUseSiteTarget,
    ) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                let mut result = Vec::new();
                for &key in &self.raw.annotations {
                    if session.oracle().annotation(key)?.use_site_target != Some(excluded) {
                        result.push(session.annotation(key, Some(owner))?);
                    }
                }
                let property = session.get(self.receiver)?;
                for &key in &property.core.raw.annotations {
                    if session.oracle().annotation(key)?.use_site_target == Some(pulled) {
                        result.push(session.annotation(key, Some(owner))?);
                    }
                }
                Ok(result)
            })
            .map(Vec::as_slice)
    }
}

#[derive(Debug)]
pub struct PropertyGetter {
    id: GetterId,
    core: AccessorCore,
    return_type_key: TypeKey,
    return_type: OnceCell<Arc<TypeReference>>,
}

impl PropertyGetter {
    pub(crate) fn new(
        id: GetterId,
        receiver: PropertyId,
        key: SymbolKey,
        raw: Arc<RawSymbol>,
        return_type: TypeKey,
    ) -> Self {
        Self {
            id,
            core: AccessorCore::new(key, raw, receiver),
            return_type_key: return_type,
            return_type: OnceCell::new(),
        }
    }

    pub fn id(&self) -> GetterId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Getter(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core.key
    }

    /// The owning property.
    pub fn receiver(&self, session: &Session) -> SymbolResult<Arc<PropertyDeclaration>> {
        session.get(self.core.receiver)
    }

    pub fn modifiers(&self, session: &Session) -> SymbolResult<&ModifierSet> {
        self.core.modifiers(session)
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations(
            session,
            self.node_id(),
            RawUseSiteTarget::SetterParameter,
            RawUseSiteTarget::PropertyGetter,
        )
    }

    pub fn return_type(&self, session: &Session) -> SymbolResult<&Arc<TypeReference>> {
        self.return_type
            .get_or_try_init(|| session.type_reference(self.return_type_key, Some(self.node_id()), -1))
    }

    pub fn origin(&self) -> Origin {
        self.core.origin()
    }

    pub fn location(&self, session: &Session) -> Location {
        symbol_location(session.oracle(), &self.core.raw)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::Property(self.core.receiver)))
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        children.push(self.return_type(session)?.node_id());
        Ok(children)
    }
}

#[derive(Debug)]
pub struct PropertySetter {
    id: SetterId,
    core: AccessorCore,
    parameter_key: Option<SymbolKey>,
    parameter: OnceCell<Arc<ValueParameter>>,
}

impl PropertySetter {
    pub(crate) fn new(
        id: SetterId,
        receiver: PropertyId,
        key: SymbolKey,
        raw: Arc<RawSymbol>,
        parameter: Option<SymbolKey>,
    ) -> Self {
        Self {
            id,
            core: AccessorCore::new(key, raw, receiver),
            parameter_key: parameter,
            parameter: OnceCell::new(),
        }
    }

    pub fn id(&self) -> SetterId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Setter(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core.key
    }

    pub fn receiver(&self, session: &Session) -> SymbolResult<Arc<PropertyDeclaration>> {
        session.get(self.core.receiver)
    }

    pub fn modifiers(&self, session: &Session) -> SymbolResult<&ModifierSet> {
        self.core.modifiers(session)
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations(
            session,
            self.node_id(),
            RawUseSiteTarget::PropertyGetter,
            RawUseSiteTarget::PropertySetter,
        )
    }

    /// The single value parameter of the setter.
    pub fn parameter(&self, session: &Session) -> SymbolResult<&Arc<ValueParameter>> {
        self.parameter.get_or_try_init(|| {
            let Some(key) = self.parameter_key else {
                return Err(SymbolError::inconsistency(
                    format!("setter of {:?}", self.core.receiver),
                    "setter with a value parameter",
                    "no parameter",
                ));
            };
            session.value_parameter(key, self.node_id())
        })
    }

    pub fn origin(&self) -> Origin {
        self.core.origin()
    }

    pub fn location(&self, session: &Session) -> Location {
        symbol_location(session.oracle(), &self.core.raw)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::Property(self.core.receiver)))
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        children.push(self.parameter(session)?.node_id());
        Ok(children)
    }
}
