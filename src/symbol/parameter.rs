//! Value and type parameters.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::DeclarationCore;
use super::error::SymbolResult;
use super::location::{Origin, map_origin, symbol_location};
use super::modifier::{Modifier, ModifierSet, add_if};
use super::node::NodeId;
use super::session::Session;
use super::type_ref::TypeReference;
use super::types::Variance;
use crate::base::{Location, Name};
use crate::oracle::{RawSymbol, RawTypeParameter, RawUseSiteTarget, RawValueParameter, SymbolKey};

define_id!(
    /// Handle of a [`ValueParameter`].
    ValueParameterId,
    "value parameter"
);
define_id!(
    /// Handle of a [`TypeParameter`].
    TypeParameterId,
    "type parameter"
);

/// A value parameter, keyed by its symbol and the node that owns it.
#[derive(Debug)]
pub struct ValueParameter {
    id: ValueParameterId,
    key: SymbolKey,
    raw: Arc<RawSymbol>,
    parameter: RawValueParameter,
    parent: NodeId,
    ty: OnceCell<Arc<TypeReference>>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl ValueParameter {
    pub(crate) fn new(
        id: ValueParameterId,
        key: SymbolKey,
        raw: Arc<RawSymbol>,
        parameter: RawValueParameter,
        parent: NodeId,
    ) -> Self {
        Self {
            id,
            key,
            raw,
            parameter,
            parent,
            ty: OnceCell::new(),
            annotations: OnceCell::new(),
        }
    }

    pub fn id(&self) -> ValueParameterId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::ValueParameter(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.name.as_deref()
    }

    pub fn has_default(&self) -> bool {
        self.parameter.flags.has_default_value
    }

    pub fn is_vararg(&self) -> bool {
        self.parameter.flags.is_vararg
    }

    pub fn is_noinline(&self) -> bool {
        self.parameter.flags.is_noinline
    }

    pub fn is_crossinline(&self) -> bool {
        self.parameter.flags.is_crossinline
    }

    pub fn ty(&self, session: &Session) -> SymbolResult<&Arc<TypeReference>> {
        self.ty
            .get_or_try_init(|| session.type_reference(self.parameter.ty, Some(self.node_id()), -1))
    }

    /// Own annotations. The value parameter of a setter also receives the
    /// owning property's annotations aimed at the setter parameter.
    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                let mut result = self
                    .raw
                    .annotations
                    .iter()
                    .map(|&key| session.annotation(key, Some(self.node_id())))
                    .collect::<SymbolResult<Vec<_>>>()?;
                if let NodeId::Setter(setter) = self.parent {
                    let property = session.get(setter)?.receiver(session)?;
                    for &key in &property.core.raw.annotations {
                        let target = session.oracle().annotation(key)?.use_site_target;
                        if target == Some(RawUseSiteTarget::SetterParameter) {
                            result.push(session.annotation(key, Some(self.node_id()))?);
                        }
                    }
                }
                Ok(result)
            })
            .map(Vec::as_slice)
    }

    pub fn origin(&self) -> Origin {
        map_origin(&self.raw)
    }

    pub fn location(&self, session: &Session) -> Location {
        symbol_location(session.oracle(), &self.raw)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(self.parent))
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        children.push(self.ty(session)?.node_id());
        Ok(children)
    }
}

/// A type parameter of a class, function or property.
#[derive(Debug)]
pub struct TypeParameter {
    id: TypeParameterId,
    pub(crate) core: DeclarationCore,
    parameter: RawTypeParameter,
    modifiers: OnceCell<ModifierSet>,
    bounds: OnceCell<Vec<Arc<TypeReference>>>,
}

impl TypeParameter {
    pub(crate) fn new(
        id: TypeParameterId,
        key: SymbolKey,
        raw: Arc<RawSymbol>,
        parameter: RawTypeParameter,
    ) -> Self {
        Self {
            id,
            core: DeclarationCore::new(key, raw),
            parameter,
            modifiers: OnceCell::new(),
            bounds: OnceCell::new(),
        }
    }

    pub fn id(&self) -> TypeParameterId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::TypeParameter(self.id)
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

    pub fn variance(&self) -> Variance {
        Variance::from(self.parameter.variance)
    }

    pub fn is_reified(&self) -> bool {
        self.parameter.is_reified
    }

    pub fn modifiers(&self) -> &ModifierSet {
        self.modifiers.get_or_init(|| {
            let mut set = self.core.keyword_modifiers();
            set.extend(Modifier::from_variance(self.parameter.variance));
            add_if(&mut set, self.parameter.is_reified, Modifier::Reified);
            set
        })
    }

    /// Upper bounds, indexed by their position in the bound list.
    pub fn bounds(&self, session: &Session) -> SymbolResult<&[Arc<TypeReference>]> {
        self.bounds
            .get_or_try_init(|| {
                self.parameter
                    .bounds
                    .iter()
                    .enumerate()
                    .map(|(i, &ty)| session.type_reference(ty, Some(self.node_id()), i as i32))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations_where(session, self.node_id(), |_| true)
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
        children.extend(self.bounds(session)?.iter().map(|b| b.node_id()));
        Ok(children)
    }
}
