//! Class declarations.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::{Declaration, DeclarationCore};
use super::error::{SymbolError, SymbolResult};
use super::function::FunctionDeclaration;
use super::location::Origin;
use super::modifier::{Modifier, ModifierSet, add_if};
use super::node::NodeId;
use super::parameter::TypeParameter;
use super::session::Session;
use super::type_ref::TypeReference;
use super::types::Type;
use crate::base::{Location, Name};
use crate::oracle::{RawClass, RawClassKind, RawSymbol, SymbolKey};

define_id!(
    /// Handle of a [`ClassDeclaration`].
    ClassId,
    "class"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    Object,
    AnnotationClass,
}

#[derive(Debug)]
pub struct ClassDeclaration {
    id: ClassId,
    pub(crate) core: DeclarationCore,
    class: RawClass,
    modifiers: OnceCell<ModifierSet>,
    type_parameters: OnceCell<Vec<Arc<TypeParameter>>>,
    super_types: OnceCell<Vec<Arc<TypeReference>>>,
}

impl ClassDeclaration {
    pub(crate) fn new(id: ClassId, key: SymbolKey, raw: Arc<RawSymbol>, class: RawClass) -> Self {
        Self {
            id,
            core: DeclarationCore::new(key, raw),
            class,
            modifiers: OnceCell::new(),
            type_parameters: OnceCell::new(),
            super_types: OnceCell::new(),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Class(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core.key
    }

    /// Anonymous objects have no name.
    pub fn simple_name(&self) -> &str {
        self.core.raw.name.as_deref().unwrap_or("<no name provided>")
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

    pub fn class_kind(&self) -> SymbolResult<ClassKind> {
        let Some(kind) = self.class.kind else {
            return Err(SymbolError::inconsistency(
                format!("class `{}`", self.simple_name()),
                "known class kind",
                "none",
            ));
        };
        Ok(match kind {
            RawClassKind::Class => ClassKind::Class,
            RawClassKind::Interface => ClassKind::Interface,
            RawClassKind::EnumClass => ClassKind::EnumClass,
            RawClassKind::EnumEntry => ClassKind::EnumEntry,
            RawClassKind::Object | RawClassKind::CompanionObject | RawClassKind::AnonymousObject => {
                ClassKind::Object
            }
            RawClassKind::AnnotationClass => ClassKind::AnnotationClass,
        })
    }

    pub fn is_companion_object(&self) -> bool {
        self.class.kind == Some(RawClassKind::CompanionObject)
    }

    pub fn modifiers(&self, _session: &Session) -> SymbolResult<&ModifierSet> {
        self.modifiers.get_or_try_init(|| {
            let mut set = self.core.keyword_modifiers();
            set.extend(Modifier::from_visibility(self.core.raw.visibility));
            set.extend(self.core.raw.modality.map(Modifier::from_modality));
            let kind = self.class_kind()?;
            add_if(&mut set, kind == ClassKind::EnumClass, Modifier::Enum);
            add_if(&mut set, kind == ClassKind::AnnotationClass, Modifier::Annotation);
            let flags = self.class.flags;
            add_if(&mut set, flags.is_data, Modifier::Data);
            add_if(&mut set, flags.is_inner, Modifier::Inner);
            add_if(&mut set, flags.is_value, Modifier::Value);
            add_if(&mut set, flags.is_fun, Modifier::Fun);
            add_if(&mut set, flags.is_expect, Modifier::Expect);
            add_if(&mut set, flags.is_actual, Modifier::Actual);
            Ok(set)
        })
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations_where(session, self.node_id(), |_| true)
    }

    pub fn type_parameters(&self, session: &Session) -> SymbolResult<&[Arc<TypeParameter>]> {
        self.type_parameters
            .get_or_try_init(|| {
                self.class
                    .type_parameters
                    .iter()
                    .map(|&key| session.type_parameter(key))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Supertype references, indexed by their position in the supertype list.
    pub fn super_types(&self, session: &Session) -> SymbolResult<&[Arc<TypeReference>]> {
        self.super_types
            .get_or_try_init(|| {
                self.class
                    .supertypes
                    .iter()
                    .enumerate()
                    .map(|(i, &ty)| session.type_reference(ty, Some(self.node_id()), i as i32))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn constructors<'a>(
        &'a self,
        session: &'a Session,
    ) -> impl Iterator<Item = SymbolResult<Arc<FunctionDeclaration>>> + 'a {
        self.class
            .constructors
            .iter()
            .map(move |&key| session.function(key))
    }

    pub fn primary_constructor(&self, session: &Session) -> SymbolResult<Option<Arc<FunctionDeclaration>>> {
        self.constructors(session).next().transpose()
    }

    /// Constructors first, then members. Re-queried on every call.
    pub fn declarations<'a>(
        &'a self,
        session: &'a Session,
    ) -> impl Iterator<Item = SymbolResult<Declaration>> + 'a {
        self.class
            .constructors
            .iter()
            .chain(&self.class.members)
            .map(move |&key| session.declaration(key))
    }

    pub fn as_star_projected_type(&self, session: &Session) -> SymbolResult<Arc<Type>> {
        let ty = session.oracle().star_projected_type(self.core.key)?;
        session.resolved_type(ty)
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
        children.extend(self.super_types(session)?.iter().map(|t| t.node_id()));
        for declaration in self.declarations(session) {
            children.push(declaration?.node_id());
        }
        Ok(children)
    }
}
