//! Raw, oracle-level data model.
//!
//! These are the shapes the front end hands out. They carry no identity of
//! their own beyond the key they were fetched with; the symbol layer wraps
//! them into cached nodes.

use std::fmt;

use text_size::TextSize;

use crate::base::Name;

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_key!(
    /// Identity of an oracle-level symbol.
    SymbolKey
);
define_key!(
    /// Identity of an oracle-level type.
    TypeKey
);
define_key!(
    /// Identity of one annotation application.
    AnnotationKey
);
define_key!(
    /// Identity of a source file known to the oracle.
    FileKey
);
define_key!(
    /// Identity of an expression that can be constant-evaluated.
    ExprKey
);

// ============================================================================
// POSITIONS & SYNTAX
// ============================================================================

/// A physical source position: file plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPosition {
    pub file: FileKey,
    pub offset: TextSize,
}

impl RawPosition {
    pub fn new(file: FileKey, offset: u32) -> Self {
        Self {
            file,
            offset: TextSize::from(offset),
        }
    }
}

/// The shape of the physical syntax node behind a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxForm {
    /// A declaration written in the native source language
    Native,
    /// Platform (interop) source syntax
    Interop,
    /// Anything else the front end may report
    Other(Name),
}

/// A statement at the top level of a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatement {
    Declaration(SymbolKey),
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    Block(Vec<RawStatement>),
    Expression,
}

/// Physical syntax attached to a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSyntax {
    pub form: SyntaxForm,
    pub position: RawPosition,
    /// Modifier keywords as written (`const`, `override`, ...)
    pub modifier_keywords: Vec<Name>,
    pub doc_comment: Option<String>,
    /// Positions of the entries of a supertype list, in order
    pub supertype_entries: Vec<RawPosition>,
    /// Positions of the entries of a bound list, in order
    pub bound_entries: Vec<RawPosition>,
    pub body: Option<RawBody>,
    pub default_value: Option<ExprKey>,
}

impl RawSyntax {
    pub fn native(position: RawPosition) -> Self {
        Self {
            form: SyntaxForm::Native,
            position,
            modifier_keywords: Vec::new(),
            doc_comment: None,
            supertype_entries: Vec::new(),
            bound_entries: Vec::new(),
            body: None,
            default_value: None,
        }
    }

    pub fn with_form(mut self, form: SyntaxForm) -> Self {
        self.form = form;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.modifier_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_supertype_entries(mut self, entries: Vec<RawPosition>) -> Self {
        self.supertype_entries = entries;
        self
    }

    pub fn with_bound_entries(mut self, entries: Vec<RawPosition>) -> Self {
        self.bound_entries = entries;
        self
    }

    pub fn with_body(mut self, body: RawBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_default_value(mut self, expr: ExprKey) -> Self {
        self.default_value = Some(expr);
        self
    }
}

// ============================================================================
// SYMBOLS
// ============================================================================

/// How the front end classifies where a symbol came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawOrigin {
    Source,
    Library,
    InteropSource,
    InteropLibrary,
    SourceMemberGenerated,
    Plugin,
    Delegated,
    SubstitutionOverride,
}

/// The front end's symbol-kind classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawSymbolKind {
    ClassMember,
    TopLevel,
    SamConstructor,
    Local,
    Accessor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    Local,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Final,
    Open,
    Abstract,
    Sealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawVariance {
    Invariant,
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    Object,
    CompanionObject,
    AnonymousObject,
    AnnotationClass,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassFlags {
    pub is_data: bool,
    pub is_inner: bool,
    pub is_value: bool,
    pub is_fun: bool,
    pub is_expect: bool,
    pub is_actual: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClass {
    pub kind: Option<RawClassKind>,
    pub flags: ClassFlags,
    pub type_parameters: Vec<SymbolKey>,
    pub supertypes: Vec<TypeKey>,
    pub constructors: Vec<SymbolKey>,
    pub members: Vec<SymbolKey>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionFlags {
    pub is_external: bool,
    pub is_infix: bool,
    pub is_inline: bool,
    pub is_static: bool,
    pub is_suspend: bool,
    pub is_operator: bool,
    pub is_override: bool,
    pub is_tailrec: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFunction {
    pub is_constructor: bool,
    pub receiver_type: Option<TypeKey>,
    pub type_parameters: Vec<SymbolKey>,
    pub value_parameters: Vec<SymbolKey>,
    pub flags: FunctionFlags,
    /// The underlying representation is an interop (platform) method.
    pub is_interop_method: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    pub is_mutable: bool,
    pub is_const: bool,
    pub is_lateinit: bool,
    pub is_static: bool,
    pub is_override: bool,
    pub is_external: bool,
    pub has_backing_field: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub ty: TypeKey,
    pub receiver_type: Option<TypeKey>,
    pub type_parameters: Vec<SymbolKey>,
    pub getter: Option<SymbolKey>,
    pub setter: Option<SymbolKey>,
    pub flags: PropertyFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterFlags {
    pub has_default_value: bool,
    pub is_vararg: bool,
    pub is_noinline: bool,
    pub is_crossinline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValueParameter {
    pub ty: TypeKey,
    pub flags: ParameterFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTypeParameter {
    pub bounds: Vec<TypeKey>,
    pub variance: RawVariance,
    pub is_reified: bool,
}

/// Variant payload of a raw symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSymbolData {
    Class(RawClass),
    Function(RawFunction),
    Property(RawProperty),
    Getter { return_type: TypeKey },
    Setter { parameter: Option<SymbolKey> },
    ValueParameter(RawValueParameter),
    TypeParameter(RawTypeParameter),
}

impl RawSymbolData {
    pub fn describe(&self) -> &'static str {
        match self {
            RawSymbolData::Class(_) => "class",
            RawSymbolData::Function(_) => "function",
            RawSymbolData::Property(_) => "property",
            RawSymbolData::Getter { .. } => "getter",
            RawSymbolData::Setter { .. } => "setter",
            RawSymbolData::ValueParameter(_) => "value parameter",
            RawSymbolData::TypeParameter(_) => "type parameter",
        }
    }
}

/// One symbol as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSymbol {
    /// `None` for constructors and anonymous objects
    pub name: Option<Name>,
    pub kind: RawSymbolKind,
    pub origin: RawOrigin,
    pub container: Option<SymbolKey>,
    pub file: Option<FileKey>,
    pub package: Name,
    pub visibility: Visibility,
    pub modality: Option<Modality>,
    pub annotations: Vec<AnnotationKey>,
    pub syntax: Option<RawSyntax>,
    pub data: RawSymbolData,
}

impl RawSymbol {
    pub fn new(name: Option<&str>, data: RawSymbolData) -> Self {
        Self {
            name: name.map(Name::new),
            kind: RawSymbolKind::TopLevel,
            origin: RawOrigin::Source,
            container: None,
            file: None,
            package: Name::default(),
            visibility: Visibility::Public,
            modality: None,
            annotations: Vec::new(),
            syntax: None,
            data,
        }
    }

    pub fn class(name: &str, kind: RawClassKind) -> Self {
        Self::new(
            Some(name),
            RawSymbolData::Class(RawClass {
                kind: Some(kind),
                ..RawClass::default()
            }),
        )
        .with_modality(Modality::Final)
    }

    pub fn function(name: &str) -> Self {
        Self::new(Some(name), RawSymbolData::Function(RawFunction::default()))
            .with_modality(Modality::Final)
    }

    pub fn constructor() -> Self {
        Self::new(
            None,
            RawSymbolData::Function(RawFunction {
                is_constructor: true,
                ..RawFunction::default()
            }),
        )
    }

    pub fn property(name: &str, ty: TypeKey) -> Self {
        Self::new(
            Some(name),
            RawSymbolData::Property(RawProperty {
                ty,
                receiver_type: None,
                type_parameters: Vec::new(),
                getter: None,
                setter: None,
                flags: PropertyFlags {
                    has_backing_field: true,
                    ..PropertyFlags::default()
                },
            }),
        )
        .with_modality(Modality::Final)
    }

    pub fn value_parameter(name: &str, ty: TypeKey) -> Self {
        Self::new(
            Some(name),
            RawSymbolData::ValueParameter(RawValueParameter {
                ty,
                flags: ParameterFlags::default(),
            }),
        )
    }

    pub fn type_parameter(name: &str) -> Self {
        Self::new(
            Some(name),
            RawSymbolData::TypeParameter(RawTypeParameter {
                bounds: Vec::new(),
                variance: RawVariance::Invariant,
                is_reified: false,
            }),
        )
    }

    pub fn getter(return_type: TypeKey) -> Self {
        Self::new(None, RawSymbolData::Getter { return_type }).with_kind(RawSymbolKind::Accessor)
    }

    /// A setter; its parameter is attached with `MemoryOracleBuilder::add_member`.
    pub fn setter() -> Self {
        Self::new(None, RawSymbolData::Setter { parameter: None })
            .with_kind(RawSymbolKind::Accessor)
    }

    pub fn with_kind(mut self, kind: RawSymbolKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_origin(mut self, origin: RawOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = Some(modality);
        self
    }

    pub fn with_syntax(mut self, syntax: RawSyntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<AnnotationKey>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Mutable access to the class payload, if this is a class.
    pub fn class_mut(&mut self) -> Option<&mut RawClass> {
        match &mut self.data {
            RawSymbolData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut RawFunction> {
        match &mut self.data {
            RawSymbolData::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn property_mut(&mut self) -> Option<&mut RawProperty> {
        match &mut self.data {
            RawSymbolData::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTypeArgument {
    Star,
    Projection { variance: RawVariance, ty: TypeKey },
}

/// Structural tag of an oracle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A plain class type; `class_name` is the fully qualified class id
    Class {
        class_name: Name,
        arguments: Vec<RawTypeArgument>,
    },
    /// A class type whose class could not be found
    ClassError { class_name: Name },
    Functional {
        class_name: Name,
        arguments: Vec<RawTypeArgument>,
        is_suspend: bool,
        receiver: Option<TypeKey>,
        parameters: Vec<TypeKey>,
        return_type: TypeKey,
    },
    Dynamic,
    Flexible { lower: TypeKey, upper: TypeKey },
    TypeParameter { symbol: SymbolKey },
    Error,
    Intersection(Vec<TypeKey>),
    DefinitelyNotNull(TypeKey),
}

impl TypeShape {
    pub fn describe(&self) -> &'static str {
        match self {
            TypeShape::Class { .. } => "class type",
            TypeShape::ClassError { .. } => "class error type",
            TypeShape::Functional { .. } => "functional type",
            TypeShape::Dynamic => "dynamic type",
            TypeShape::Flexible { .. } => "flexible type",
            TypeShape::TypeParameter { .. } => "type parameter type",
            TypeShape::Error => "error type",
            TypeShape::Intersection(_) => "intersection type",
            TypeShape::DefinitelyNotNull(_) => "definitely non-null type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawType {
    pub shape: TypeShape,
    pub nullable: bool,
    pub annotations: Vec<AnnotationKey>,
    /// Rendered text, used for display only
    pub rendered: Name,
}

impl RawType {
    pub fn new(shape: TypeShape, rendered: impl Into<Name>) -> Self {
        Self {
            shape,
            nullable: false,
            annotations: Vec::new(),
            rendered: rendered.into(),
        }
    }

    /// A plain class type without arguments, rendered by its short name.
    pub fn class(class_name: &str) -> Self {
        let short = class_name.rsplit('.').next().unwrap_or(class_name);
        Self::new(
            TypeShape::Class {
                class_name: Name::new(class_name),
                arguments: Vec::new(),
            },
            short,
        )
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<AnnotationKey>) -> Self {
        self.annotations = annotations;
        self
    }
}

// ============================================================================
// ANNOTATIONS & CONSTANTS
// ============================================================================

/// The result of constant evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => f.write_str("null"),
            ConstantValue::Boolean(v) => write!(f, "{v}"),
            ConstantValue::Char(v) => write!(f, "'{v}'"),
            ConstantValue::Byte(v) => write!(f, "{v}"),
            ConstantValue::Short(v) => write!(f, "{v}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}L"),
            ConstantValue::Float(v) => write!(f, "{v}f"),
            ConstantValue::Double(v) => write!(f, "{v}"),
            ConstantValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// The oracle's closed use-site-target enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawUseSiteTarget {
    File,
    Property,
    Field,
    PropertyGetter,
    PropertySetter,
    Receiver,
    ConstructorParameter,
    SetterParameter,
    PropertyDelegateField,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Constant(ConstantValue),
    Array(Vec<AnnotationValue>),
    Annotation(AnnotationKey),
    ClassLiteral(TypeKey),
    EnumEntry(Name),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawArgument {
    pub name: Option<Name>,
    pub value: AnnotationValue,
}

impl RawArgument {
    pub fn named(name: &str, value: AnnotationValue) -> Self {
        Self {
            name: Some(Name::new(name)),
            value,
        }
    }

    pub fn positional(value: AnnotationValue) -> Self {
        Self { name: None, value }
    }
}

/// One annotation application.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    /// Fully qualified class id of the annotation class
    pub class_name: Option<Name>,
    pub use_site_target: Option<RawUseSiteTarget>,
    pub arguments: Vec<RawArgument>,
    pub position: Option<RawPosition>,
}

impl RawAnnotation {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: Some(Name::new(class_name)),
            use_site_target: None,
            arguments: Vec::new(),
            position: None,
        }
    }

    pub fn with_target(mut self, target: RawUseSiteTarget) -> Self {
        self.use_site_target = Some(target);
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<RawArgument>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn at(mut self, position: RawPosition) -> Self {
        self.position = Some(position);
        self
    }
}

/// A source file known to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: Name,
    pub package: Name,
    pub declarations: Vec<SymbolKey>,
    pub annotations: Vec<AnnotationKey>,
}
