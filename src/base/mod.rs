//! Foundation types for the symview layer.
//!
//! This module provides the small vocabulary shared by every other module:
//! - [`Name`] - cheap-to-clone identifier text
//! - [`TextSize`] - byte offsets reported by the oracle
//! - [`LineCol`], [`LineIndex`] - offset to line/column conversion
//! - [`Location`] - normalized source location or the absent sentinel
//!
//! This module has NO dependencies on other symview modules.

mod position;

pub use position::{LineCol, LineIndex, Location};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

/// An identifier or dotted name. Short names stay inline.
pub type Name = smol_str::SmolStr;
