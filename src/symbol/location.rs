//! Location and origin resolution.
//!
//! - [`to_location`] turns an optional physical position into a [`Location`]
//! - [`map_origin`] classifies where a raw symbol came from

use crate::base::Location;
use crate::oracle::{Oracle, RawOrigin, RawPosition, RawSymbol, SyntaxForm};

/// Where a wrapped symbol comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Written in the native source language
    Source,
    /// Compiled native input
    Binary,
    /// Written in the platform (interop) language
    Interop,
    /// Compiled platform input
    InteropBinary,
    /// Manufactured by the compiler
    Synthetic,
}

impl Origin {
    pub fn is_interop(self) -> bool {
        matches!(self, Origin::Interop | Origin::InteropBinary)
    }
}

/// Convert a nullable physical position into a location.
///
/// Missing positions, unknown files and out-of-range offsets all resolve to
/// [`Location::Absent`].
pub fn to_location(oracle: &dyn Oracle, position: Option<RawPosition>) -> Location {
    let Some(position) = position else {
        return Location::Absent;
    };
    let Ok(file) = oracle.file(position.file) else {
        return Location::Absent;
    };
    match oracle.line_col(position.file, position.offset) {
        Some(lc) => Location::from_line_col(file.path.as_str(), lc),
        None => Location::Absent,
    }
}

/// Classify the origin of a raw symbol.
pub fn map_origin(symbol: &RawSymbol) -> Origin {
    match symbol.origin {
        RawOrigin::Source => Origin::Source,
        RawOrigin::Library => Origin::Binary,
        // interop symbols without platform source syntax come from class files
        RawOrigin::InteropSource => match &symbol.syntax {
            Some(syntax) if syntax.form == SyntaxForm::Interop => Origin::Interop,
            _ => Origin::InteropBinary,
        },
        RawOrigin::InteropLibrary => Origin::InteropBinary,
        RawOrigin::SourceMemberGenerated
        | RawOrigin::Plugin
        | RawOrigin::Delegated
        | RawOrigin::SubstitutionOverride => Origin::Synthetic,
    }
}

/// Physical location of a raw symbol.
pub(crate) fn symbol_location(oracle: &dyn Oracle, symbol: &RawSymbol) -> Location {
    to_location(oracle, symbol.syntax.as_ref().map(|s| s.position))
}
