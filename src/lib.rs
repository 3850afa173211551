//! # symview-base
//!
//! A cached, lazily evaluated symbol view over a compiler front end.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! processing → Resolver front door, SymbolProcessor, sample processors
//!   ↓
//! symbol     → Session, identity caches, wrappers, visitor
//!   ↓
//! oracle     → Oracle trait (front-end boundary), raw model, MemoryOracle
//!   ↓
//! base       → Primitives (Name, TextSize, LineIndex, Location)
//! ```

// ============================================================================
// MODULES (dependency order: base → oracle → symbol → processing)
// ============================================================================

/// Foundation types: Name, TextSize, LineIndex, Location
pub mod base;

/// Session configuration
pub mod config;

/// Front-end boundary: Oracle trait, raw data model, in-memory oracle
pub mod oracle;

/// Symbol wrappers, identity caches and the analysis session
pub mod symbol;

/// Resolver and symbol processors
pub mod processing;

// Re-export foundation types
pub use base::{LineCol, LineIndex, Location, Name, TextRange, TextSize};
pub use config::SessionConfig;
pub use processing::{Resolver, SymbolProcessor};
pub use symbol::{Declaration, NodeId, Origin, Session, SymbolError, SymbolResult};
