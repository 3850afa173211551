//! Analysis session: owns the oracle and one identity cache per wrapper kind.
//!
//! A [`Session`] lives for one compilation. Every wrapper handed out is
//! created through it, memoized in its caches and addressed by a `Copy`
//! handle that only this session can resolve. Dropping or closing the
//! session discards every wrapper at once.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use super::annotation::{Annotation, AnnotationId, ArgumentSource, ValueArgument, ValueArgumentId};
use super::accessor::{GetterId, PropertyGetter, PropertySetter, SetterId};
use super::cache::{ArenaId, IdentityCache};
use super::class::{ClassDeclaration, ClassId};
use super::declaration::Declaration;
use super::error::{SymbolError, SymbolResult};
use super::file::{SourceFile, SourceFileId};
use super::function::{FunctionDeclaration, FunctionId};
use super::location::Origin;
use super::node::NodeId;
use super::parameter::{TypeParameter, TypeParameterId, ValueParameter, ValueParameterId};
use super::property::{PropertyDeclaration, PropertyId};
use super::type_ref::{
    CallableReference, CallableReferenceId, ClassifierReference, ClassifierReferenceId,
    DynamicReference, DynamicReferenceId, FunctionShape, TypeReference, TypeReferenceId,
};
use super::types::{Type, TypeId};
use crate::base::Name;
use crate::config::SessionConfig;
use crate::oracle::{
    AnnotationKey, AnnotationValue, FileKey, Oracle, RawPosition, RawSymbol, RawSymbolData,
    SymbolKey, TypeKey, TypeShape,
};

/// Key of a type reference: oracle type, owning node, position in a
/// supertype/bound list (`-1` for primary references).
pub type TypeReferenceKey = (TypeKey, Option<NodeId>, i32);

/// One identity cache per wrapper kind.
#[derive(Debug, Default)]
pub struct SymbolCaches {
    pub(crate) files: IdentityCache<FileKey, SourceFile, SourceFileId>,
    pub(crate) classes: IdentityCache<SymbolKey, ClassDeclaration, ClassId>,
    pub(crate) functions: IdentityCache<SymbolKey, FunctionDeclaration, FunctionId>,
    pub(crate) properties: IdentityCache<SymbolKey, PropertyDeclaration, PropertyId>,
    pub(crate) getters: IdentityCache<(PropertyId, SymbolKey), PropertyGetter, GetterId>,
    pub(crate) setters: IdentityCache<(PropertyId, SymbolKey), PropertySetter, SetterId>,
    pub(crate) value_parameters: IdentityCache<(SymbolKey, NodeId), ValueParameter, ValueParameterId>,
    pub(crate) type_parameters: IdentityCache<SymbolKey, TypeParameter, TypeParameterId>,
    pub(crate) type_references: IdentityCache<TypeReferenceKey, TypeReference, TypeReferenceId>,
    pub(crate) classifier_references:
        IdentityCache<(TypeKey, TypeReferenceId), ClassifierReference, ClassifierReferenceId>,
    pub(crate) callable_references:
        IdentityCache<(TypeKey, TypeReferenceId), CallableReference, CallableReferenceId>,
    pub(crate) dynamic_references: IdentityCache<TypeReferenceId, DynamicReference, DynamicReferenceId>,
    pub(crate) types: IdentityCache<TypeKey, Type, TypeId>,
    pub(crate) annotations: IdentityCache<(AnnotationKey, Option<NodeId>), Annotation, AnnotationId>,
    pub(crate) value_arguments: IdentityCache<(AnnotationId, ArgumentSource), ValueArgument, ValueArgumentId>,
}

impl SymbolCaches {
    fn stats(&self) -> CacheStats {
        let mut counts = IndexMap::new();
        counts.insert(SourceFileId::KIND, self.files.len());
        counts.insert(ClassId::KIND, self.classes.len());
        counts.insert(FunctionId::KIND, self.functions.len());
        counts.insert(PropertyId::KIND, self.properties.len());
        counts.insert(GetterId::KIND, self.getters.len());
        counts.insert(SetterId::KIND, self.setters.len());
        counts.insert(ValueParameterId::KIND, self.value_parameters.len());
        counts.insert(TypeParameterId::KIND, self.type_parameters.len());
        counts.insert(TypeReferenceId::KIND, self.type_references.len());
        counts.insert(ClassifierReferenceId::KIND, self.classifier_references.len());
        counts.insert(CallableReferenceId::KIND, self.callable_references.len());
        counts.insert(DynamicReferenceId::KIND, self.dynamic_references.len());
        counts.insert(TypeId::KIND, self.types.len());
        counts.insert(AnnotationId::KIND, self.annotations.len());
        counts.insert(ValueArgumentId::KIND, self.value_arguments.len());
        CacheStats { counts }
    }

    fn clear(&self) {
        self.files.clear();
        self.classes.clear();
        self.functions.clear();
        self.properties.clear();
        self.getters.clear();
        self.setters.clear();
        self.value_parameters.clear();
        self.type_parameters.clear();
        self.type_references.clear();
        self.classifier_references.clear();
        self.callable_references.clear();
        self.dynamic_references.clear();
        self.types.clear();
        self.annotations.clear();
        self.value_arguments.clear();
    }
}

/// Number of wrappers per kind, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    counts: IndexMap<&'static str, usize>,
}

impl CacheStats {
    pub fn get(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, n)| format!("{k}={n}"))
            .collect();
        write!(f, "{} wrappers ({})", self.total(), parts.join(", "))
    }
}

/// A handle that resolves through one of the session caches.
pub trait Handle: ArenaId {
    type Key: Eq + Hash + fmt::Debug;
    type Target;

    fn cache(caches: &SymbolCaches) -> &IdentityCache<Self::Key, Self::Target, Self>;
}

macro_rules! impl_handle {
    ($($id:ty => $key:ty, $target:ty, $field:ident;)*) => {
        $(
            impl Handle for $id {
                type Key = $key;
                type Target = $target;

                fn cache(caches: &SymbolCaches) -> &IdentityCache<$key, $target, $id> {
                    &caches.$field
                }
            }
        )*
    };
}

impl_handle! {
    SourceFileId => FileKey, SourceFile, files;
    ClassId => SymbolKey, ClassDeclaration, classes;
    FunctionId => SymbolKey, FunctionDeclaration, functions;
    PropertyId => SymbolKey, PropertyDeclaration, properties;
    GetterId => (PropertyId, SymbolKey), PropertyGetter, getters;
    SetterId => (PropertyId, SymbolKey), PropertySetter, setters;
    ValueParameterId => (SymbolKey, NodeId), ValueParameter, value_parameters;
    TypeParameterId => SymbolKey, TypeParameter, type_parameters;
    TypeReferenceId => TypeReferenceKey, TypeReference, type_references;
    ClassifierReferenceId => (TypeKey, TypeReferenceId), ClassifierReference, classifier_references;
    CallableReferenceId => (TypeKey, TypeReferenceId), CallableReference, callable_references;
    DynamicReferenceId => TypeReferenceId, DynamicReference, dynamic_references;
    TypeId => TypeKey, Type, types;
    AnnotationId => (AnnotationKey, Option<NodeId>), Annotation, annotations;
    ValueArgumentId => (AnnotationId, ArgumentSource), ValueArgument, value_arguments;
}

/// One analysis session over an oracle.
pub struct Session {
    oracle: Arc<dyn Oracle>,
    config: SessionConfig,
    caches: SymbolCaches,
    workers: OnceCell<Option<rayon::ThreadPool>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("caches", &self.caches)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session. Caches start empty.
    pub fn new(oracle: Arc<dyn Oracle>, config: SessionConfig) -> Self {
        tracing::debug!(module = %config.module_name, "opening symbol session");
        Self {
            oracle,
            config,
            caches: SymbolCaches::default(),
            workers: OnceCell::new(),
        }
    }

    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.caches.stats()
    }

    /// The dedicated worker pool, built on first use when the config sets a
    /// parallelism. `None` means work runs on the global pool.
    pub fn worker_pool(&self) -> Option<&rayon::ThreadPool> {
        self.workers
            .get_or_init(|| {
                let threads = self.config.parallelism?;
                match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => Some(pool),
                    Err(err) => {
                        tracing::warn!(%err, threads, "falling back to the global worker pool");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// End the session, discarding every wrapper.
    pub fn close(self) -> CacheStats {
        let stats = self.caches.stats();
        self.caches.clear();
        tracing::debug!(module = %self.config.module_name, %stats, "closed symbol session");
        stats
    }

    /// Resolve a handle issued by this session.
    pub fn get<I: Handle>(&self, id: I) -> SymbolResult<Arc<I::Target>> {
        I::cache(&self.caches)
            .get(id)
            .ok_or(SymbolError::StaleHandle {
                kind: I::KIND,
                index: id.index(),
            })
    }

    // ========================================================================
    // WRAPPING
    // ========================================================================

    pub fn file(&self, key: FileKey) -> SymbolResult<Arc<SourceFile>> {
        if let Some(found) = self.caches.files.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.file(key)?;
        Ok(self
            .caches
            .files
            .get_or_create(key, |id| SourceFile::new(id, key, raw)))
    }

    pub fn class(&self, key: SymbolKey) -> SymbolResult<Arc<ClassDeclaration>> {
        if let Some(found) = self.caches.classes.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::Class(class) = &raw.data else {
            return Err(unexpected_symbol(&raw, "class"));
        };
        let class = class.clone();
        Ok(self
            .caches
            .classes
            .get_or_create(key, |id| ClassDeclaration::new(id, key, raw, class)))
    }

    pub fn function(&self, key: SymbolKey) -> SymbolResult<Arc<FunctionDeclaration>> {
        if let Some(found) = self.caches.functions.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::Function(function) = &raw.data else {
            return Err(unexpected_symbol(&raw, "function"));
        };
        let function = function.clone();
        Ok(self
            .caches
            .functions
            .get_or_create(key, |id| FunctionDeclaration::new(id, key, raw, function)))
    }

    pub fn property(&self, key: SymbolKey) -> SymbolResult<Arc<PropertyDeclaration>> {
        if let Some(found) = self.caches.properties.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::Property(property) = &raw.data else {
            return Err(unexpected_symbol(&raw, "property"));
        };
        let property = property.clone();
        Ok(self
            .caches
            .properties
            .get_or_create(key, |id| PropertyDeclaration::new(id, key, raw, property)))
    }

    pub fn getter(&self, owner: PropertyId, key: SymbolKey) -> SymbolResult<Arc<PropertyGetter>> {
        if let Some(found) = self.caches.getters.lookup(&(owner, key)) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::Getter { return_type } = raw.data else {
            return Err(unexpected_symbol(&raw, "getter"));
        };
        Ok(self.caches.getters.get_or_create((owner, key), |id| {
            PropertyGetter::new(id, owner, key, raw, return_type)
        }))
    }

    pub fn setter(&self, owner: PropertyId, key: SymbolKey) -> SymbolResult<Arc<PropertySetter>> {
        if let Some(found) = self.caches.setters.lookup(&(owner, key)) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::Setter { parameter } = raw.data else {
            return Err(unexpected_symbol(&raw, "setter"));
        };
        Ok(self.caches.setters.get_or_create((owner, key), |id| {
            PropertySetter::new(id, owner, key, raw, parameter)
        }))
    }

    pub fn value_parameter(&self, key: SymbolKey, parent: NodeId) -> SymbolResult<Arc<ValueParameter>> {
        if let Some(found) = self.caches.value_parameters.lookup(&(key, parent)) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::ValueParameter(parameter) = &raw.data else {
            return Err(unexpected_symbol(&raw, "value parameter"));
        };
        let parameter = parameter.clone();
        Ok(self
            .caches
            .value_parameters
            .get_or_create((key, parent), |id| ValueParameter::new(id, key, raw, parameter, parent)))
    }

    pub fn type_parameter(&self, key: SymbolKey) -> SymbolResult<Arc<TypeParameter>> {
        if let Some(found) = self.caches.type_parameters.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.symbol(key)?;
        let RawSymbolData::TypeParameter(parameter) = &raw.data else {
            return Err(unexpected_symbol(&raw, "type parameter"));
        };
        let parameter = parameter.clone();
        Ok(self
            .caches
            .type_parameters
            .get_or_create(key, |id| TypeParameter::new(id, key, raw, parameter)))
    }

    /// Wrap any declaration-shaped symbol.
    pub fn declaration(&self, key: SymbolKey) -> SymbolResult<Declaration> {
        let raw = self.oracle.symbol(key)?;
        match &raw.data {
            RawSymbolData::Class(_) => self.class(key).map(Declaration::Class),
            RawSymbolData::Function(_) => self.function(key).map(Declaration::Function),
            RawSymbolData::Property(_) => self.property(key).map(Declaration::Property),
            RawSymbolData::TypeParameter(_) => self.type_parameter(key).map(Declaration::TypeParameter),
            RawSymbolData::Getter { .. }
            | RawSymbolData::Setter { .. }
            | RawSymbolData::ValueParameter(_) => Err(unexpected_symbol(&raw, "declaration")),
        }
    }

    /// Wrap an oracle type as a reference owned by `parent`.
    ///
    /// `index` is the position in the parent's supertype or bound list, or
    /// `-1` for a primary reference.
    pub fn type_reference(
        &self,
        ty: TypeKey,
        parent: Option<NodeId>,
        index: i32,
    ) -> SymbolResult<Arc<TypeReference>> {
        let key = (ty, parent, index);
        if let Some(found) = self.caches.type_references.lookup(&key) {
            return Ok(found);
        }
        let origin = match parent {
            Some(node) => node.origin(self)?,
            None => Origin::Synthetic,
        };
        Ok(self
            .caches
            .type_references
            .get_or_create(key, |id| TypeReference::new(id, ty, parent, index, origin)))
    }

    /// Wrap a resolvable oracle type.
    pub fn resolved_type(&self, ty: TypeKey) -> SymbolResult<Arc<Type>> {
        if let Some(found) = self.caches.types.lookup(&ty) {
            return Ok(found);
        }
        let raw = self.oracle.ty(ty)?;
        Ok(self.caches.types.get_or_create(ty, |id| Type::new(id, ty, raw)))
    }

    pub fn annotation(&self, key: AnnotationKey, parent: Option<NodeId>) -> SymbolResult<Arc<Annotation>> {
        if let Some(found) = self.caches.annotations.lookup(&(key, parent)) {
            return Ok(found);
        }
        let raw = self.oracle.annotation(key)?;
        Ok(self
            .caches
            .annotations
            .get_or_create((key, parent), |id| Annotation::new(id, key, raw, parent)))
    }

    pub(crate) fn value_argument(
        &self,
        annotation: AnnotationId,
        source: ArgumentSource,
        name: Option<Name>,
        value: AnnotationValue,
        origin: Origin,
        position: Option<RawPosition>,
    ) -> Arc<ValueArgument> {
        self.caches
            .value_arguments
            .get_or_create((annotation, source), |id| {
                ValueArgument::new(id, annotation, name, value, origin, position)
            })
    }

    pub(crate) fn classifier_reference(
        &self,
        ty: TypeKey,
        owner: &TypeReference,
    ) -> SymbolResult<Arc<ClassifierReference>> {
        let key = (ty, owner.id());
        if let Some(found) = self.caches.classifier_references.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.ty(ty)?;
        let TypeShape::Class {
            class_name,
            arguments,
        } = &raw.shape
        else {
            return Err(SymbolError::inconsistency(
                format!("classifier reference `{}`", raw.rendered),
                "class type",
                raw.shape.describe(),
            ));
        };
        let (class_name, arguments) = (class_name.clone(), arguments.clone());
        let (owner_id, origin) = (owner.id(), owner.origin());
        Ok(self.caches.classifier_references.get_or_create(key, |id| {
            ClassifierReference::new(id, ty, owner_id, origin, class_name, arguments)
        }))
    }

    pub(crate) fn callable_reference(
        &self,
        ty: TypeKey,
        owner: &TypeReference,
    ) -> SymbolResult<Arc<CallableReference>> {
        let key = (ty, owner.id());
        if let Some(found) = self.caches.callable_references.lookup(&key) {
            return Ok(found);
        }
        let raw = self.oracle.ty(ty)?;
        let TypeShape::Functional {
            is_suspend,
            receiver,
            parameters,
            return_type,
            ..
        } = &raw.shape
        else {
            return Err(SymbolError::inconsistency(
                format!("callable reference `{}`", raw.rendered),
                "functional type",
                raw.shape.describe(),
            ));
        };
        let shape = FunctionShape {
            is_suspend: *is_suspend,
            receiver: *receiver,
            parameters: parameters.clone(),
            return_type: *return_type,
        };
        let (owner_id, origin) = (owner.id(), owner.origin());
        Ok(self
            .caches
            .callable_references
            .get_or_create(key, |id| CallableReference::new(id, ty, owner_id, origin, shape)))
    }

    pub(crate) fn dynamic_reference(&self, owner: &TypeReference) -> Arc<DynamicReference> {
        let (owner_id, origin) = (owner.id(), owner.origin());
        self.caches
            .dynamic_references
            .get_or_create(owner_id, |id| DynamicReference::new(id, owner_id, origin))
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// The node enclosing a raw symbol: its container declaration, else its file.
    pub(crate) fn container_node(&self, raw: &RawSymbol) -> SymbolResult<Option<NodeId>> {
        let Some(container) = raw.container else {
            return match raw.file {
                Some(file) => Ok(Some(NodeId::File(self.file(file)?.id()))),
                None => Ok(None),
            };
        };
        let container_raw = self.oracle.symbol(container)?;
        match &container_raw.data {
            RawSymbolData::Getter { .. } | RawSymbolData::Setter { .. } => {
                let Some(property_key) = container_raw.container else {
                    return Err(SymbolError::inconsistency(
                        format!("accessor container of `{}`", raw.display_name()),
                        "accessor owned by a property",
                        "accessor without property",
                    ));
                };
                let property = self.property(property_key)?;
                if matches!(container_raw.data, RawSymbolData::Getter { .. }) {
                    Ok(Some(NodeId::Getter(self.getter(property.id(), container)?.id())))
                } else {
                    Ok(Some(NodeId::Setter(self.setter(property.id(), container)?.id())))
                }
            }
            _ => Ok(Some(self.declaration(container)?.node_id())),
        }
    }

    /// The declaration behind a node, if the node is one.
    pub fn node_declaration(&self, node: NodeId) -> SymbolResult<Option<Declaration>> {
        Ok(match node {
            NodeId::Class(id) => Some(Declaration::Class(self.get(id)?)),
            NodeId::Function(id) => Some(Declaration::Function(self.get(id)?)),
            NodeId::Property(id) => Some(Declaration::Property(self.get(id)?)),
            NodeId::TypeParameter(id) => Some(Declaration::TypeParameter(self.get(id)?)),
            _ => None,
        })
    }
}

fn unexpected_symbol(raw: &RawSymbol, expected: &'static str) -> SymbolError {
    SymbolError::inconsistency(
        format!("symbol `{}` ({:?})", raw.display_name(), raw.kind),
        expected,
        raw.data.describe(),
    )
}
