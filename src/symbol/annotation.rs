//! Annotation applications and their arguments.
//!
//! `arguments` is the explicitly written arguments followed by defaults
//! synthesized from the annotation class's sole constructor, for every
//! parameter not already covered by name or position.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;

use super::cache::define_id;
use super::error::{SymbolError, SymbolResult};
use super::location::{Origin, to_location};
use super::node::NodeId;
use super::session::Session;
use super::type_ref::TypeReference;
use crate::base::{Location, Name};
use crate::oracle::{
    AnnotationKey, AnnotationValue, ConstantValue, RawAnnotation, RawPosition, RawSymbol,
    RawSymbolData, RawUseSiteTarget, SymbolKey, SyntaxForm,
};

define_id!(
    /// Handle of an [`Annotation`].
    AnnotationId,
    "annotation"
);
define_id!(
    /// Handle of a [`ValueArgument`].
    ValueArgumentId,
    "value argument"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseSiteTarget {
    File,
    Property,
    Field,
    Get,
    Set,
    Receiver,
    Param,
    SetParam,
    Delegate,
}

impl From<RawUseSiteTarget> for UseSiteTarget {
    fn from(target: RawUseSiteTarget) -> Self {
        match target {
            RawUseSiteTarget::File => UseSiteTarget::File,
            RawUseSiteTarget::Property => UseSiteTarget::Property,
            RawUseSiteTarget::Field => UseSiteTarget::Field,
            RawUseSiteTarget::PropertyGetter => UseSiteTarget::Get,
            RawUseSiteTarget::PropertySetter => UseSiteTarget::Set,
            RawUseSiteTarget::Receiver => UseSiteTarget::Receiver,
            RawUseSiteTarget::ConstructorParameter => UseSiteTarget::Param,
            RawUseSiteTarget::SetterParameter => UseSiteTarget::SetParam,
            RawUseSiteTarget::PropertyDelegateField => UseSiteTarget::Delegate,
        }
    }
}

/// Where a value argument comes from: the n-th written argument, or the
/// default of a constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentSource {
    Explicit(u32),
    Default(SymbolKey),
}

#[derive(Debug)]
pub struct Annotation {
    id: AnnotationId,
    key: AnnotationKey,
    raw: Arc<RawAnnotation>,
    parent: Option<NodeId>,
    arguments: OnceCell<Vec<Arc<ValueArgument>>>,
    annotation_type: OnceCell<Option<Arc<TypeReference>>>,
}

impl Annotation {
    pub(crate) fn new(id: AnnotationId, key: AnnotationKey, raw: Arc<RawAnnotation>, parent: Option<NodeId>) -> Self {
        Self {
            id,
            key,
            raw,
            parent,
            arguments: OnceCell::new(),
            annotation_type: OnceCell::new(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::Annotation(self.id)
    }

    pub fn annotation_key(&self) -> AnnotationKey {
        self.key
    }

    /// Fully qualified name of the annotation class, if resolved.
    pub fn qualified_name(&self) -> Option<&str> {
        self.raw.class_name.as_deref()
    }

    pub fn short_name(&self) -> &str {
        match &self.raw.class_name {
            Some(name) => name.rsplit('.').next().unwrap_or(name),
            None => "<error>",
        }
    }

    pub fn use_site_target(&self) -> Option<UseSiteTarget> {
        self.raw.use_site_target.map(UseSiteTarget::from)
    }

    pub fn arguments(&self, session: &Session) -> SymbolResult<&[Arc<ValueArgument>]> {
        self.arguments
            .get_or_try_init(|| self.compute_arguments(session))
            .map(Vec::as_slice)
    }

    fn compute_arguments(&self, session: &Session) -> SymbolResult<Vec<Arc<ValueArgument>>> {
        let mut arguments: Vec<Arc<ValueArgument>> = self
            .raw
            .arguments
            .iter()
            .enumerate()
            .map(|(i, argument)| {
                session.value_argument(
                    self.id,
                    ArgumentSource::Explicit(i as u32),
                    argument.name.clone(),
                    argument.value.clone(),
                    Origin::Source,
                    self.raw.position,
                )
            })
            .collect();

        let Some(constructor) = self.sole_constructor(session)? else {
            return Ok(arguments);
        };
        let RawSymbolData::Function(function) = &constructor.data else {
            return Err(SymbolError::inconsistency(
                format!("constructor of annotation `{}`", self.short_name()),
                "function",
                constructor.data.describe(),
            ));
        };

        let mut parameters = Vec::with_capacity(function.value_parameters.len());
        for &key in &function.value_parameters {
            parameters.push((key, session.oracle().symbol(key)?));
        }

        // positional arguments cover the parameter at the same position
        let mut covered: FxHashSet<&str> = FxHashSet::default();
        for (i, argument) in self.raw.arguments.iter().enumerate() {
            match &argument.name {
                Some(name) => {
                    covered.insert(name.as_str());
                }
                None => {
                    if let Some(name) = parameters.get(i).and_then(|(_, p)| p.name.as_deref()) {
                        covered.insert(name);
                    }
                }
            }
        }

        for (key, parameter) in &parameters {
            let Some(name) = parameter.name.as_ref() else {
                continue;
            };
            if covered.contains(name.as_str()) {
                continue;
            }
            if let Some(value) = default_value(session, parameter)? {
                arguments.push(session.value_argument(
                    self.id,
                    ArgumentSource::Default(*key),
                    Some(name.clone()),
                    AnnotationValue::Constant(value),
                    Origin::Synthetic,
                    None,
                ));
            }
        }
        Ok(arguments)
    }

    fn sole_constructor(&self, session: &Session) -> SymbolResult<Option<Arc<RawSymbol>>> {
        let Some(class_name) = &self.raw.class_name else {
            return Ok(None);
        };
        let Some(class_key) = session.oracle().class_by_name(class_name) else {
            return Ok(None);
        };
        let class = session.oracle().symbol(class_key)?;
        let RawSymbolData::Class(raw_class) = &class.data else {
            return Err(SymbolError::inconsistency(
                format!("annotation class `{class_name}`"),
                "class",
                class.data.describe(),
            ));
        };
        match raw_class.constructors.as_slice() {
            [constructor] => Ok(Some(session.oracle().symbol(*constructor)?)),
            _ => Ok(None),
        }
    }

    pub fn default_arguments(&self, _session: &Session) -> SymbolResult<&[Arc<ValueArgument>]> {
        Err(SymbolError::NotImplemented("default_arguments"))
    }

    /// Reference to the annotation class type; `None` when the class is
    /// unknown to the oracle.
    pub fn annotation_type(&self, session: &Session) -> SymbolResult<Option<&Arc<TypeReference>>> {
        self.annotation_type
            .get_or_try_init(|| {
                let Some(class_key) = self
                    .raw
                    .class_name
                    .as_deref()
                    .and_then(|name| session.oracle().class_by_name(name))
                else {
                    return Ok(None);
                };
                let ty = session.oracle().class_type(class_key)?;
                session
                    .type_reference(ty, Some(self.node_id()), -1)
                    .map(Some)
            })
            .map(Option::as_ref)
    }

    pub fn origin(&self) -> Origin {
        Origin::Source
    }

    pub fn location(&self, session: &Session) -> Location {
        to_location(session.oracle(), self.raw.position)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(self.parent)
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotation_type(session)?.map(|t| t.node_id()).into_iter().collect();
        children.extend(self.arguments(session)?.iter().map(|a| a.node_id()));
        Ok(children)
    }
}

/// Constant default of a constructor parameter, if it declares one.
fn default_value(session: &Session, parameter: &RawSymbol) -> SymbolResult<Option<ConstantValue>> {
    let Some(syntax) = &parameter.syntax else {
        return Ok(None);
    };
    match &syntax.form {
        SyntaxForm::Native => Ok(syntax
            .default_value
            .and_then(|expr| session.oracle().evaluate_constant(expr))),
        other => Err(SymbolError::inconsistency(
            format!("default value of parameter `{}`", parameter.display_name()),
            "native parameter syntax",
            format!("{other:?}"),
        )),
    }
}

/// One argument of an annotation application.
#[derive(Debug)]
pub struct ValueArgument {
    id: ValueArgumentId,
    annotation: AnnotationId,
    name: Option<Name>,
    value: AnnotationValue,
    origin: Origin,
    position: Option<RawPosition>,
}

impl ValueArgument {
    pub(crate) fn new(
        id: ValueArgumentId,
        annotation: AnnotationId,
        name: Option<Name>,
        value: AnnotationValue,
        origin: Origin,
        position: Option<RawPosition>,
    ) -> Self {
        Self {
            id,
            annotation,
            name,
            value,
            origin,
            position,
        }
    }

    pub fn id(&self) -> ValueArgumentId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::ValueArgument(self.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &AnnotationValue {
        &self.value
    }

    pub fn is_spread(&self) -> bool {
        false
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn location(&self, session: &Session) -> Location {
        to_location(session.oracle(), self.position)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(Some(NodeId::Annotation(self.annotation)))
    }

    pub(crate) fn children(&self, _session: &Session) -> SymbolResult<Vec<NodeId>> {
        Ok(Vec::new())
    }
}
