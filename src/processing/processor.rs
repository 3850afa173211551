//! The processor contract and a single-round driver.

use crate::symbol::{Declaration, Session, SymbolResult};

use super::resolver::Resolver;

/// A workload run against a session's symbol graph.
pub trait SymbolProcessor {
    /// Process one round. Returns the declarations that could not be
    /// handled yet.
    fn process(&mut self, resolver: &Resolver<'_>) -> SymbolResult<Vec<Declaration>>;

    /// Called once after the last round.
    fn finish(&mut self) {}

    /// Called instead of [`SymbolProcessor::finish`] when a round failed.
    fn on_error(&mut self) {}
}

/// Run one processing round followed by `finish`.
///
/// Returns the deferred declarations of the round.
pub fn run_processor<P>(session: &Session, processor: &mut P) -> SymbolResult<Vec<Declaration>>
where
    P: SymbolProcessor + ?Sized,
{
    let resolver = Resolver::new(session);
    match processor.process(&resolver) {
        Ok(deferred) => {
            tracing::debug!(
                module = %session.config().module_name,
                deferred = deferred.len(),
                "processing round finished"
            );
            processor.finish();
            Ok(deferred)
        }
        Err(err) => {
            tracing::error!(module = %session.config().module_name, %err, "processing round failed");
            processor.on_error();
            Err(err)
        }
    }
}
