//! Symbol layer tests
//!
//! - Wrapper identity through the session caches
//! - Declarations: names, modifiers, accessors, return types
//! - Type references: element dispatch, resolution, locations
//! - Annotations: argument defaults, use-site targets
//! - Visitor traversal

pub mod tests_annotations;
pub mod tests_declarations;
pub mod tests_type_refs;
