//! Function declarations, constructors included.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::{Declaration, DeclarationCore};
use super::error::{SymbolError, SymbolResult};
use super::location::Origin;
use super::modifier::{Modifier, ModifierSet, add_if};
use super::node::NodeId;
use super::parameter::{TypeParameter, ValueParameter};
use super::session::Session;
use super::type_ref::TypeReference;
use super::types::Type;
use crate::base::{Location, Name};
use crate::oracle::{Modality, RawBody, RawFunction, RawStatement, RawSymbol, RawSymbolKind, SymbolKey, SyntaxForm};

define_id!(
    /// Handle of a [`FunctionDeclaration`].
    FunctionId,
    "function"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Member,
    TopLevel,
    /// A SAM constructor
    Lambda,
}

#[derive(Debug)]
pub struct FunctionDeclaration {
    id: FunctionId,
    pub(crate) core: DeclarationCore,
    function: RawFunction,
    modifiers: OnceCell<ModifierSet>,
    extension_receiver: OnceCell<Option<Arc<TypeReference>>>,
    return_type: OnceCell<Option<Arc<TypeReference>>>,
    parameters: OnceCell<Vec<Arc<ValueParameter>>>,
    type_parameters: OnceCell<Vec<Arc<TypeParameter>>>,
    doc_string: OnceCell<Option<String>>,
}

impl FunctionDeclaration {
    pub(crate) fn new(id: FunctionId, key: SymbolKey, raw: Arc<RawSymbol>, function: RawFunction) -> Self {
        Self {
            id,
            core: DeclarationCore::new(key, raw),
            function,
            modifiers: OnceCell::new(),
            extension_receiver: OnceCell::new(),
            return_type: OnceCell::new(),
            parameters: OnceCell::new(),
            type_parameters: OnceCell::new(),
            doc_string: OnceCell::new(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Function(self.id)
    }

    pub fn symbol_key(&self) -> SymbolKey {
        self.core.key
    }

    pub fn is_constructor(&self) -> bool {
        self.function.is_constructor
    }

    /// Constructors are named `<init>`.
    pub fn simple_name(&self) -> &str {
        if self.function.is_constructor {
            return "<init>";
        }
        self.core.raw.name.as_deref().unwrap_or("<anonymous>")
    }

    pub fn qualified_name(&self, session: &Session) -> SymbolResult<Option<&Name>> {
        self.core.qualified_name(session, self.simple_name())
    }

    pub fn package_name(&self) -> &str {
        &self.core.raw.package
    }

    fn context(&self, session: &Session) -> String {
        let declaring = self
            .core
            .raw
            .container
            .and_then(|key| session.oracle().symbol(key).ok())
            .map(|raw| raw.display_name().to_string());
        match declaring {
            Some(class) => format!("function `{}` declared in `{class}`", self.simple_name()),
            None => format!("function `{}` ({:?})", self.simple_name(), self.core.raw.kind),
        }
    }

    pub fn function_kind(&self, session: &Session) -> SymbolResult<FunctionKind> {
        match self.core.raw.kind {
            RawSymbolKind::ClassMember => Ok(FunctionKind::Member),
            RawSymbolKind::TopLevel => Ok(FunctionKind::TopLevel),
            RawSymbolKind::SamConstructor => Ok(FunctionKind::Lambda),
            other => Err(SymbolError::inconsistency(
                self.context(session),
                "class member, top-level or SAM constructor",
                format!("{other:?}"),
            )),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.core.raw.modality == Some(Modality::Abstract)
    }

    pub fn modifiers(&self, _session: &Session) -> SymbolResult<&ModifierSet> {
        self.modifiers.get_or_try_init(|| {
            let mut set = self.core.keyword_modifiers();
            set.extend(Modifier::from_visibility(self.core.raw.visibility));
            set.extend(self.core.raw.modality.map(Modifier::from_modality));
            let flags = self.function.flags;
            add_if(&mut set, flags.is_external, Modifier::External);
            add_if(&mut set, flags.is_infix, Modifier::Infix);
            add_if(&mut set, flags.is_inline, Modifier::Inline);
            add_if(&mut set, flags.is_static, Modifier::JavaStatic);
            add_if(&mut set, flags.is_suspend, Modifier::Suspend);
            add_if(&mut set, flags.is_operator, Modifier::Operator);
            add_if(&mut set, flags.is_override, Modifier::Override);
            add_if(&mut set, flags.is_tailrec, Modifier::Tailrec);
            Ok(set)
        })
    }

    /// Synthetic constructors borrow the documentation of their class.
    pub fn doc_string(&self, session: &Session) -> SymbolResult<Option<&str>> {
        self.doc_string
            .get_or_try_init(|| {
                if self.is_synthetic_constructor() {
                    return match self.parent(session)? {
                        Some(NodeId::Class(id)) => Ok(session.get(id)?.doc_string().map(str::to_owned)),
                        _ => Ok(None),
                    };
                }
                Ok(self.core.doc_string().map(str::to_owned))
            })
            .map(Option::as_deref)
    }

    fn is_synthetic_constructor(&self) -> bool {
        self.function.is_constructor
            && (self.origin() == Origin::Synthetic || self.core.raw.syntax.is_none())
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.core.annotations_where(session, self.node_id(), |_| true)
    }

    pub fn extension_receiver(&self, session: &Session) -> SymbolResult<Option<&Arc<TypeReference>>> {
        self.extension_receiver
            .get_or_try_init(|| {
                self.function
                    .receiver_type
                    .map(|ty| session.type_reference(ty, Some(self.node_id()), -1))
                    .transpose()
            })
            .map(Option::as_ref)
    }

    /// Constructors return the star-projected type of their class.
    pub fn return_type(&self, session: &Session) -> SymbolResult<Option<&Arc<TypeReference>>> {
        self.return_type
            .get_or_try_init(|| {
                if session.config().interop_return_type_workaround
                    && self.origin().is_interop()
                    && self.function.is_interop_method
                {
                    let Some(declaring) = self.core.raw.container else {
                        return Err(SymbolError::inconsistency(
                            self.context(session),
                            "interop method with a declaring class",
                            "no container",
                        ));
                    };
                    tracing::debug!(function = self.simple_name(), "forcing interop return type resolution");
                    session
                        .oracle()
                        .resolve_interop_return_type(self.core.key, declaring)?;
                }

                let ty = if self.function.is_constructor {
                    let class = match self.parent(session)? {
                        Some(NodeId::Class(id)) => session.get(id)?,
                        other => {
                            return Err(SymbolError::inconsistency(
                                self.context(session),
                                "constructor declared in a class",
                                format!("{other:?}"),
                            ));
                        }
                    };
                    session.oracle().star_projected_type(class.symbol_key())?
                } else {
                    session.oracle().return_type(self.core.key)?
                };
                session
                    .type_reference(ty, Some(self.node_id()), -1)
                    .map(Some)
            })
            .map(Option::as_ref)
    }

    pub fn parameters(&self, session: &Session) -> SymbolResult<&[Arc<ValueParameter>]> {
        self.parameters
            .get_or_try_init(|| {
                self.function
                    .value_parameters
                    .iter()
                    .map(|&key| session.value_parameter(key, self.node_id()))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn type_parameters(&self, session: &Session) -> SymbolResult<&[Arc<TypeParameter>]> {
        self.type_parameters
            .get_or_try_init(|| {
                self.function
                    .type_parameters
                    .iter()
                    .map(|&key| session.type_parameter(key))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Local declarations among the top-level statements of a block body.
    ///
    /// Expression bodies, missing bodies and interop syntax yield nothing.
    pub fn declarations<'a>(
        &'a self,
        session: &'a Session,
    ) -> impl Iterator<Item = SymbolResult<Declaration>> + 'a {
        let statements: &[RawStatement] = match &self.core.raw.syntax {
            Some(syntax) if syntax.form == SyntaxForm::Native => match &syntax.body {
                Some(RawBody::Block(statements)) => statements,
                _ => &[],
            },
            _ => &[],
        };
        statements
            .iter()
            .filter_map(|statement| match statement {
                RawStatement::Declaration(key) => Some(*key),
                RawStatement::Expression => None,
            })
            .map(move |key| session.declaration(key))
    }

    pub fn find_overridee(&self, _session: &Session) -> SymbolResult<Option<Declaration>> {
        Err(SymbolError::NotImplemented("find_overridee"))
    }

    pub fn as_member_of(&self, _session: &Session, _containing: &Type) -> SymbolResult<Arc<Type>> {
        Err(SymbolError::NotImplemented("as_member_of"))
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
        children.extend(self.parameters(session)?.iter().map(|p| p.node_id()));
        children.extend(self.return_type(session)?.map(|r| r.node_id()));
        for declaration in self.declarations(session) {
            children.push(declaration?.node_id());
        }
        Ok(children)
    }
}
