//! In-memory oracle.
//!
//! Holds a fully materialized symbol table. Class types and star-projected
//! types are derived for every named class at build time, and interop
//! methods can be given a "raw" return type that only turns into the real
//! one once [`Oracle::resolve_interop_return_type`] has been called, the
//! same way a real front end reports interop return types lazily.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::raw::*;
use super::{Oracle, OracleError, OracleResult};
use crate::base::{LineCol, LineIndex, Name};

/// Builder for [`MemoryOracle`].
#[derive(Debug, Default)]
pub struct MemoryOracleBuilder {
    files: Vec<RawFile>,
    line_indexes: Vec<Option<LineIndex>>,
    new_files: Vec<FileKey>,
    packages: FxHashMap<Name, Vec<SymbolKey>>,
    symbols: Vec<RawSymbol>,
    types: Vec<RawType>,
    annotations: Vec<RawAnnotation>,
    constants: Vec<Option<ConstantValue>>,
    return_types: FxHashMap<SymbolKey, TypeKey>,
    deferred_returns: FxHashMap<SymbolKey, TypeKey>,
    classifiers: FxHashMap<TypeKey, SymbolKey>,
}

impl MemoryOracleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file that belongs to the session's scope.
    pub fn add_file(&mut self, path: &str, package: &str, text: &str) -> FileKey {
        let key = FileKey(self.files.len() as u32);
        self.files.push(RawFile {
            path: Name::new(path),
            package: Name::new(package),
            declarations: Vec::new(),
            annotations: Vec::new(),
        });
        self.line_indexes.push(Some(LineIndex::new(text)));
        self.new_files.push(key);
        key
    }

    pub fn add_file_annotation(&mut self, file: FileKey, annotation: AnnotationKey) {
        if let Some(raw) = self.files.get_mut(file.index()) {
            raw.annotations.push(annotation);
        }
    }

    /// Add a symbol as-is, without wiring it into any container.
    pub fn add_symbol(&mut self, symbol: RawSymbol) -> SymbolKey {
        let key = SymbolKey(self.symbols.len() as u32);
        self.symbols.push(symbol);
        key
    }

    /// Add a top-level declaration of a source file.
    pub fn add_top_level(&mut self, file: FileKey, mut symbol: RawSymbol) -> SymbolKey {
        let package = self
            .files
            .get(file.index())
            .map(|f| f.package.clone())
            .unwrap_or_default();
        symbol.file = Some(file);
        symbol.container = None;
        symbol.kind = RawSymbolKind::TopLevel;
        symbol.package = package.clone();
        let key = self.add_symbol(symbol);
        if let Some(raw) = self.files.get_mut(file.index()) {
            raw.declarations.push(key);
        }
        self.packages.entry(package).or_default().push(key);
        key
    }

    /// Add a top-level declaration that only exists in compiled input.
    pub fn add_library(&mut self, package: &str, mut symbol: RawSymbol) -> SymbolKey {
        symbol.file = None;
        symbol.container = None;
        symbol.kind = RawSymbolKind::TopLevel;
        symbol.package = Name::new(package);
        let key = self.add_symbol(symbol);
        self.packages.entry(Name::new(package)).or_default().push(key);
        key
    }

    /// Add `symbol` as a member of `owner`, wiring it into the owner's payload.
    ///
    /// Declarations added to a function become local declarations; the
    /// caller is responsible for listing them in the function body.
    pub fn add_member(&mut self, owner: SymbolKey, mut symbol: RawSymbol) -> SymbolKey {
        let key = SymbolKey(self.symbols.len() as u32);
        let Some(owner_sym) = self.symbols.get_mut(owner.index()) else {
            return self.add_symbol(symbol);
        };
        symbol.container = Some(owner);
        symbol.file = owner_sym.file;
        symbol.package = owner_sym.package.clone();

        match (&mut owner_sym.data, &mut symbol.data) {
            (RawSymbolData::Class(class), RawSymbolData::TypeParameter(_)) => {
                class.type_parameters.push(key);
            }
            (RawSymbolData::Class(class), RawSymbolData::Function(f)) if f.is_constructor => {
                symbol.kind = RawSymbolKind::ClassMember;
                class.constructors.push(key);
            }
            (RawSymbolData::Class(class), _) => {
                symbol.kind = RawSymbolKind::ClassMember;
                class.members.push(key);
            }
            (RawSymbolData::Function(function), RawSymbolData::ValueParameter(_)) => {
                function.value_parameters.push(key);
            }
            (RawSymbolData::Function(function), RawSymbolData::TypeParameter(_)) => {
                function.type_parameters.push(key);
            }
            (RawSymbolData::Function(_), _) => {
                symbol.kind = RawSymbolKind::Local;
            }
            (RawSymbolData::Property(property), RawSymbolData::Getter { .. }) => {
                property.getter = Some(key);
            }
            (RawSymbolData::Property(property), RawSymbolData::Setter { .. }) => {
                property.setter = Some(key);
            }
            (RawSymbolData::Property(property), RawSymbolData::TypeParameter(_)) => {
                property.type_parameters.push(key);
            }
            (RawSymbolData::Setter { parameter }, RawSymbolData::ValueParameter(_)) => {
                *parameter = Some(key);
            }
            _ => {}
        }
        self.add_symbol(symbol)
    }

    pub fn add_type(&mut self, ty: RawType) -> TypeKey {
        let key = TypeKey(self.types.len() as u32);
        self.types.push(ty);
        key
    }

    pub fn add_annotation(&mut self, annotation: RawAnnotation) -> AnnotationKey {
        let key = AnnotationKey(self.annotations.len() as u32);
        self.annotations.push(annotation);
        key
    }

    /// Add an expression that evaluates to `value`.
    pub fn add_constant(&mut self, value: ConstantValue) -> ExprKey {
        let key = ExprKey(self.constants.len() as u32);
        self.constants.push(Some(value));
        key
    }

    /// Add an expression that is not a compile-time constant.
    pub fn add_non_constant(&mut self) -> ExprKey {
        let key = ExprKey(self.constants.len() as u32);
        self.constants.push(None);
        key
    }

    pub fn set_return_type(&mut self, function: SymbolKey, ty: TypeKey) {
        self.return_types.insert(function, ty);
    }

    /// Report `raw` as the return type of an interop method until the
    /// oracle is asked to resolve it, after which `resolved` is reported.
    pub fn defer_interop_return_type(&mut self, function: SymbolKey, raw: TypeKey, resolved: TypeKey) {
        self.return_types.insert(function, raw);
        self.deferred_returns.insert(function, resolved);
    }

    /// Override the classifier the oracle reports for a type.
    pub fn set_classifier(&mut self, ty: TypeKey, classifier: SymbolKey) {
        self.classifiers.insert(ty, classifier);
    }

    pub fn symbol_mut(&mut self, key: SymbolKey) -> Option<&mut RawSymbol> {
        self.symbols.get_mut(key.index())
    }

    /// Fully qualified name of a named, non-local class.
    fn qualified_class_name(&self, key: SymbolKey) -> Option<Name> {
        let mut segments = Vec::new();
        let mut current = Some(key);
        let mut package = Name::default();
        while let Some(k) = current {
            let sym = self.symbols.get(k.index())?;
            if !matches!(sym.data, RawSymbolData::Class(_)) || sym.kind == RawSymbolKind::Local {
                return None;
            }
            segments.push(sym.name.clone()?);
            package = sym.package.clone();
            current = sym.container;
        }
        segments.reverse();
        let relative = segments.join(".");
        Some(if package.is_empty() {
            Name::new(relative)
        } else {
            Name::new(format!("{package}.{relative}"))
        })
    }

    pub fn build(mut self) -> MemoryOracle {
        let mut classes_by_name = FxHashMap::default();
        let mut class_types = FxHashMap::default();

        for index in 0..self.symbols.len() {
            let key = SymbolKey(index as u32);
            let RawSymbolData::Class(class) = &self.symbols[index].data else {
                continue;
            };
            let type_parameters = class.type_parameters.clone();
            let Some(fq_name) = self.qualified_class_name(key) else {
                continue;
            };
            let short = self.symbols[index].display_name().to_string();

            let mut own_args = Vec::new();
            for tp in &type_parameters {
                let tp_name = self
                    .symbols
                    .get(tp.index())
                    .map(|s| s.display_name().to_string())
                    .unwrap_or_default();
                let ty = self.add_type(RawType::new(TypeShape::TypeParameter { symbol: *tp }, tp_name));
                own_args.push(RawTypeArgument::Projection {
                    variance: RawVariance::Invariant,
                    ty,
                });
            }
            let rendered_own = render_with_args(&short, &own_args, |a| match a {
                RawTypeArgument::Projection { ty, .. } => self.types[ty.index()].rendered.to_string(),
                RawTypeArgument::Star => "*".to_string(),
            });
            let star_args = vec![RawTypeArgument::Star; own_args.len()];
            let rendered_star = render_with_args(&short, &star_args, |_| "*".to_string());

            let own = self.add_type(RawType::new(
                TypeShape::Class {
                    class_name: fq_name.clone(),
                    arguments: own_args,
                },
                rendered_own,
            ));
            let star = self.add_type(RawType::new(
                TypeShape::Class {
                    class_name: fq_name.clone(),
                    arguments: star_args,
                },
                rendered_star,
            ));
            classes_by_name.insert(fq_name, key);
            class_types.insert(key, (own, star));
        }

        // Functions without a recorded return type (constructors, mostly)
        // report Unit, as front ends do.
        let mut unit = None;
        for index in 0..self.symbols.len() {
            let key = SymbolKey(index as u32);
            if matches!(self.symbols[index].data, RawSymbolData::Function(_))
                && !self.return_types.contains_key(&key)
            {
                let ty = *unit.get_or_insert_with(|| self.add_type(RawType::class("kotlin.Unit")));
                self.return_types.insert(key, ty);
            }
        }

        tracing::debug!(
            files = self.files.len(),
            symbols = self.symbols.len(),
            types = self.types.len(),
            "built in-memory oracle"
        );

        MemoryOracle {
            files: self.files.into_iter().map(Arc::new).collect(),
            line_indexes: self.line_indexes,
            new_files: self.new_files,
            packages: self.packages,
            symbols: self.symbols.into_iter().map(Arc::new).collect(),
            types: self.types.into_iter().map(Arc::new).collect(),
            annotations: self.annotations.into_iter().map(Arc::new).collect(),
            constants: self.constants,
            classes_by_name,
            class_types,
            classifiers: self.classifiers,
            return_types: RwLock::new(self.return_types),
            deferred_returns: RwLock::new(self.deferred_returns),
        }
    }
}

fn render_with_args(
    short: &str,
    args: &[RawTypeArgument],
    render: impl Fn(&RawTypeArgument) -> String,
) -> String {
    if args.is_empty() {
        short.to_string()
    } else {
        let rendered: Vec<String> = args.iter().map(render).collect();
        format!("{short}<{}>", rendered.join(", "))
    }
}

/// A fully materialized oracle.
#[derive(Debug)]
pub struct MemoryOracle {
    files: Vec<Arc<RawFile>>,
    line_indexes: Vec<Option<LineIndex>>,
    new_files: Vec<FileKey>,
    packages: FxHashMap<Name, Vec<SymbolKey>>,
    symbols: Vec<Arc<RawSymbol>>,
    types: Vec<Arc<RawType>>,
    annotations: Vec<Arc<RawAnnotation>>,
    constants: Vec<Option<ConstantValue>>,
    classes_by_name: FxHashMap<Name, SymbolKey>,
    class_types: FxHashMap<SymbolKey, (TypeKey, TypeKey)>,
    classifiers: FxHashMap<TypeKey, SymbolKey>,
    return_types: RwLock<FxHashMap<SymbolKey, TypeKey>>,
    deferred_returns: RwLock<FxHashMap<SymbolKey, TypeKey>>,
}

impl MemoryOracle {
    pub fn builder() -> MemoryOracleBuilder {
        MemoryOracleBuilder::new()
    }

    /// Whether an interop return type is still waiting to be resolved.
    pub fn has_deferred_return_type(&self, function: SymbolKey) -> bool {
        self.deferred_returns.read().contains_key(&function)
    }
}

impl Oracle for MemoryOracle {
    fn new_files(&self) -> Vec<FileKey> {
        self.new_files.clone()
    }

    fn file(&self, file: FileKey) -> OracleResult<Arc<RawFile>> {
        self.files
            .get(file.index())
            .cloned()
            .ok_or(OracleError::UnknownFile(file))
    }

    fn declarations_in_package(&self, package: &str) -> Vec<SymbolKey> {
        self.packages.get(package).cloned().unwrap_or_default()
    }

    fn class_by_name(&self, qualified_name: &str) -> Option<SymbolKey> {
        self.classes_by_name.get(qualified_name).copied()
    }

    fn symbol(&self, key: SymbolKey) -> OracleResult<Arc<RawSymbol>> {
        self.symbols
            .get(key.index())
            .cloned()
            .ok_or(OracleError::UnknownSymbol(key))
    }

    fn annotation(&self, key: AnnotationKey) -> OracleResult<Arc<RawAnnotation>> {
        self.annotations
            .get(key.index())
            .cloned()
            .ok_or(OracleError::UnknownAnnotation(key))
    }

    fn ty(&self, key: TypeKey) -> OracleResult<Arc<RawType>> {
        self.types
            .get(key.index())
            .cloned()
            .ok_or(OracleError::UnknownType(key))
    }

    fn classifier(&self, ty: TypeKey) -> Option<SymbolKey> {
        if let Some(explicit) = self.classifiers.get(&ty) {
            return Some(*explicit);
        }
        let raw = self.types.get(ty.index())?;
        match &raw.shape {
            TypeShape::Class { class_name, .. } | TypeShape::Functional { class_name, .. } => {
                self.classes_by_name.get(class_name).copied()
            }
            TypeShape::TypeParameter { symbol } => Some(*symbol),
            TypeShape::Flexible { lower, .. } => self.classifier(*lower),
            TypeShape::DefinitelyNotNull(inner) => self.classifier(*inner),
            TypeShape::ClassError { .. }
            | TypeShape::Dynamic
            | TypeShape::Error
            | TypeShape::Intersection(_) => None,
        }
    }

    fn class_type(&self, class: SymbolKey) -> OracleResult<TypeKey> {
        self.class_types
            .get(&class)
            .map(|(own, _)| *own)
            .ok_or(OracleError::UnknownSymbol(class))
    }

    fn star_projected_type(&self, class: SymbolKey) -> OracleResult<TypeKey> {
        self.class_types
            .get(&class)
            .map(|(_, star)| *star)
            .ok_or(OracleError::UnknownSymbol(class))
    }

    fn return_type(&self, function: SymbolKey) -> OracleResult<TypeKey> {
        self.return_types
            .read()
            .get(&function)
            .copied()
            .ok_or(OracleError::UnknownSymbol(function))
    }

    fn resolve_interop_return_type(
        &self,
        function: SymbolKey,
        declaring_class: SymbolKey,
    ) -> OracleResult<()> {
        let symbol = self.symbol(function)?;
        if symbol.container != Some(declaring_class) {
            return Err(OracleError::Other(format!(
                "{function:?} is not declared in {declaring_class:?}"
            )));
        }
        if let Some(resolved) = self.deferred_returns.write().remove(&function) {
            self.return_types.write().insert(function, resolved);
        }
        Ok(())
    }

    fn evaluate_constant(&self, expr: ExprKey) -> Option<ConstantValue> {
        self.constants.get(expr.index()).cloned().flatten()
    }

    fn line_col(&self, file: FileKey, offset: TextSize) -> Option<LineCol> {
        self.line_indexes
            .get(file.index())?
            .as_ref()?
            .line_col(offset)
    }
}
