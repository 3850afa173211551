//! Declaration modifiers.

use rustc_hash::FxHashSet;

use crate::base::Name;
use crate::oracle::{Modality, RawSyntax, RawVariance, SyntaxForm, Visibility};

/// One modifier flag. Sets of these carry no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Private,
    Internal,
    Protected,
    In,
    Out,
    Override,
    Lateinit,
    Enum,
    Sealed,
    Annotation,
    Data,
    Inner,
    Fun,
    Value,
    Suspend,
    Tailrec,
    Operator,
    Infix,
    Inline,
    External,
    Abstract,
    Final,
    Open,
    Vararg,
    Noinline,
    Crossinline,
    Reified,
    Expect,
    Actual,
    Const,
    JavaDefault,
    JavaNative,
    JavaStatic,
    JavaStrict,
    JavaSynchronized,
    JavaTransient,
    JavaVolatile,
}

pub type ModifierSet = FxHashSet<Modifier>;

impl Modifier {
    /// Parse a modifier keyword as written in native source.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "public" => Modifier::Public,
            "private" => Modifier::Private,
            "internal" => Modifier::Internal,
            "protected" => Modifier::Protected,
            "in" => Modifier::In,
            "out" => Modifier::Out,
            "override" => Modifier::Override,
            "lateinit" => Modifier::Lateinit,
            "enum" => Modifier::Enum,
            "sealed" => Modifier::Sealed,
            "annotation" => Modifier::Annotation,
            "data" => Modifier::Data,
            "inner" => Modifier::Inner,
            "fun" => Modifier::Fun,
            "value" => Modifier::Value,
            "suspend" => Modifier::Suspend,
            "tailrec" => Modifier::Tailrec,
            "operator" => Modifier::Operator,
            "infix" => Modifier::Infix,
            "inline" => Modifier::Inline,
            "external" => Modifier::External,
            "abstract" => Modifier::Abstract,
            "final" => Modifier::Final,
            "open" => Modifier::Open,
            "vararg" => Modifier::Vararg,
            "noinline" => Modifier::Noinline,
            "crossinline" => Modifier::Crossinline,
            "reified" => Modifier::Reified,
            "expect" => Modifier::Expect,
            "actual" => Modifier::Actual,
            "const" => Modifier::Const,
            _ => return None,
        };
        Some(modifier)
    }

    /// Parse a modifier keyword as written in platform (interop) source.
    pub fn from_interop_keyword(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "public" => Modifier::Public,
            "private" => Modifier::Private,
            "protected" => Modifier::Protected,
            "abstract" => Modifier::Abstract,
            "final" => Modifier::Final,
            "static" => Modifier::JavaStatic,
            "default" => Modifier::JavaDefault,
            "native" => Modifier::JavaNative,
            "strictfp" => Modifier::JavaStrict,
            "synchronized" => Modifier::JavaSynchronized,
            "transient" => Modifier::JavaTransient,
            "volatile" => Modifier::JavaVolatile,
            _ => return None,
        };
        Some(modifier)
    }

    pub fn from_visibility(visibility: Visibility) -> Option<Self> {
        match visibility {
            Visibility::Public => Some(Modifier::Public),
            Visibility::Private => Some(Modifier::Private),
            Visibility::Protected => Some(Modifier::Protected),
            Visibility::Internal => Some(Modifier::Internal),
            Visibility::Local | Visibility::Unknown => None,
        }
    }

    pub fn from_modality(modality: Modality) -> Self {
        match modality {
            Modality::Final => Modifier::Final,
            Modality::Open => Modifier::Open,
            Modality::Abstract => Modifier::Abstract,
            Modality::Sealed => Modifier::Sealed,
        }
    }

    pub fn from_variance(variance: RawVariance) -> Option<Self> {
        match variance {
            RawVariance::Invariant => None,
            RawVariance::In => Some(Modifier::In),
            RawVariance::Out => Some(Modifier::Out),
        }
    }
}

/// Translate written modifier keywords; unknown keywords are skipped.
pub fn modifiers_from_keywords(keywords: &[Name]) -> ModifierSet {
    keywords
        .iter()
        .filter_map(|kw| Modifier::from_keyword(kw))
        .collect()
}

/// Modifiers written on a declaration, read with the keyword table of the
/// syntax's language. Syntax of any other form contributes none.
pub fn modifiers_from_syntax(syntax: &RawSyntax) -> ModifierSet {
    let parse: fn(&str) -> Option<Modifier> = match syntax.form {
        SyntaxForm::Native => Modifier::from_keyword,
        SyntaxForm::Interop => Modifier::from_interop_keyword,
        SyntaxForm::Other(_) => return ModifierSet::default(),
    };
    syntax
        .modifier_keywords
        .iter()
        .filter_map(|kw| parse(kw))
        .collect()
}

/// Add `modifier` when `flag` is set.
pub(crate) fn add_if(set: &mut ModifierSet, flag: bool, modifier: Modifier) {
    if flag {
        set.insert(modifier);
    }
}
