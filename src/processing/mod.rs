//! Processing: the resolver front door and the workloads built on it.

mod const_properties;
mod doc_string;
mod processor;
mod resolver;

pub use const_properties::ConstPropertiesProcessor;
pub use doc_string::DocStringProcessor;
pub use processor::{SymbolProcessor, run_processor};
pub use resolver::Resolver;
