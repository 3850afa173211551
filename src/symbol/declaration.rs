//! Declarations: the named nodes of the symbol graph.
//!
//! [`DeclarationCore`] holds what every declaration wrapper shares: the
//! raw symbol and the lazily resolved parent, qualified name and
//! annotations. [`Declaration`] is the closed sum over declaration kinds.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::class::ClassDeclaration;
use super::error::SymbolResult;
use super::function::FunctionDeclaration;
use super::location::{Origin, map_origin, symbol_location};
use super::modifier::{ModifierSet, modifiers_from_syntax};
use super::node::NodeId;
use super::parameter::TypeParameter;
use super::property::PropertyDeclaration;
use super::session::Session;
use crate::base::{Location, Name};
use crate::oracle::{RawSymbol, RawSymbolKind, RawUseSiteTarget, SymbolKey};

pub(crate) struct DeclarationCore {
    pub(crate) key: SymbolKey,
    pub(crate) raw: Arc<RawSymbol>,
    parent: OnceCell<Option<NodeId>>,
    qualified_name: OnceCell<Option<Name>>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl std::fmt::Debug for DeclarationCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarationCore")
            .field("key", &self.key)
            .field("name", &self.raw.name)
            .field("kind", &self.raw.kind)
            .finish_non_exhaustive()
    }
}

impl DeclarationCore {
    pub(crate) fn new(key: SymbolKey, raw: Arc<RawSymbol>) -> Self {
        Self {
            key,
            raw,
            parent: OnceCell::new(),
            qualified_name: OnceCell::new(),
            annotations: OnceCell::new(),
        }
    }

    pub(crate) fn origin(&self) -> Origin {
        map_origin(&self.raw)
    }

    pub(crate) fn location(&self, session: &Session) -> Location {
        symbol_location(session.oracle(), &self.raw)
    }

    pub(crate) fn parent(&self, session: &Session) -> SymbolResult<Option<NodeId>> {
        self.parent
            .get_or_try_init(|| session.container_node(&self.raw))
            .copied()
    }

    /// Parent's qualified name plus `simple_name`.
    ///
    /// Local declarations have none, and absence propagates down from the
    /// parent. Declarations directly in a file are package-qualified.
    pub(crate) fn qualified_name(&self, session: &Session, simple_name: &str) -> SymbolResult<Option<&Name>> {
        self.qualified_name
            .get_or_try_init(|| {
                if self.raw.kind == RawSymbolKind::Local {
                    return Ok(None);
                }
                match self.parent(session)? {
                    None | Some(NodeId::File(_)) => Ok(Some(package_qualified(&self.raw.package, simple_name))),
                    Some(parent) => match session.node_declaration(parent)? {
                        Some(declaration) => Ok(declaration
                            .qualified_name(session)?
                            .map(|q| Name::new(format!("{q}.{simple_name}")))),
                        None => Ok(None),
                    },
                }
            })
            .map(Option::as_ref)
    }

    /// Annotations written on this symbol whose use-site target passes `keep`.
    pub(crate) fn annotations_where(
        &self,
        session: &Session,
        owner: NodeId,
        keep: impl Fn(Option<RawUseSiteTarget>) -> bool,
    ) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                let mut result = Vec::with_capacity(self.raw.annotations.len());
                for &key in &self.raw.annotations {
                    let raw = session.oracle().annotation(key)?;
                    if keep(raw.use_site_target) {
                        result.push(session.annotation(key, Some(owner))?);
                    }
                }
                Ok(result)
            })
            .map(Vec::as_slice)
    }

    pub(crate) fn doc_string(&self) -> Option<&str> {
        self.raw.syntax.as_ref()?.doc_comment.as_deref()
    }

    pub(crate) fn keyword_modifiers(&self) -> ModifierSet {
        self.raw
            .syntax
            .as_ref()
            .map(modifiers_from_syntax)
            .unwrap_or_default()
    }
}

pub(crate) fn package_qualified(package: &str, simple_name: &str) -> Name {
    if package.is_empty() {
        Name::new(simple_name)
    } else {
        Name::new(format!("{package}.{simple_name}"))
    }
}

/// Any declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Class(Arc<ClassDeclaration>),
    Function(Arc<FunctionDeclaration>),
    Property(Arc<PropertyDeclaration>),
    TypeParameter(Arc<TypeParameter>),
}

impl Declaration {
    fn core(&self) -> &DeclarationCore {
        match self {
            Declaration::Class(d) => &d.core,
            Declaration::Function(d) => &d.core,
            Declaration::Property(d) => &d.core,
            Declaration::TypeParameter(d) => &d.core,
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            Declaration::Class(d) => d.node_id(),
            Declaration::Function(d) => d.node_id(),
            Declaration::Property(d) => d.node_id(),
            Declaration::TypeParameter(d) => d.node_id(),
        }
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core().key
    }

    pub fn simple_name(&self) -> &str {
        match self {
            Declaration::Class(d) => d.simple_name(),
            Declaration::Function(d) => d.simple_name(),
            Declaration::Property(d) => d.simple_name(),
            Declaration::TypeParameter(d) => d.simple_name(),
        }
    }

    pub fn qualified_name(&self, session: &Session) -> SymbolResult<Option<&Name>> {
        self.core().qualified_name(session, self.simple_name())
    }

    pub fn package_name(&self) -> &str {
        &self.core().raw.package
    }

    pub fn modifiers(&self, session: &Session) -> SymbolResult<&ModifierSet> {
        match self {
            Declaration::Class(d) => d.modifiers(session),
            Declaration::Function(d) => d.modifiers(session),
            Declaration::Property(d) => d.modifiers(session),
            Declaration::TypeParameter(d) => Ok(d.modifiers()),
        }
    }

    pub fn doc_string(&self, session: &Session) -> SymbolResult<Option<&str>> {
        match self {
            Declaration::Function(d) => d.doc_string(session),
            _ => Ok(self.core().doc_string()),
        }
    }

    pub fn origin(&self) -> Origin {
        self.core().origin()
    }

    pub fn location(&self, session: &Session) -> Location {
        self.core().location(session)
    }

    pub fn parent(&self, session: &Session) -> SymbolResult<Option<NodeId>> {
        self.core().parent(session)
    }

    pub fn parent_declaration(&self, session: &Session) -> SymbolResult<Option<Declaration>> {
        match self.parent(session)? {
            Some(parent) => session.node_declaration(parent),
            None => Ok(None),
        }
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        match self {
            Declaration::Class(d) => d.annotations(session),
            Declaration::Function(d) => d.annotations(session),
            Declaration::Property(d) => d.annotations(session),
            Declaration::TypeParameter(d) => d.annotations(session),
        }
    }

    /// Wrapper identity.
    pub fn is_same(&self, other: &Declaration) -> bool {
        self.node_id() == other.node_id()
    }

    pub fn as_class(&self) -> Option<&Arc<ClassDeclaration>> {
        match self {
            Declaration::Class(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionDeclaration>> {
        match self {
            Declaration::Function(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Arc<PropertyDeclaration>> {
        match self {
            Declaration::Property(d) => Some(d),
            _ => None,
        }
    }
}
