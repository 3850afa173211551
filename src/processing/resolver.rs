//! Resolver: the front door processors query through.

use std::sync::Arc;

use rayon::prelude::*;

use crate::symbol::{
    ClassDeclaration, Declaration, NodeId, Session, SourceFile, SymbolResult, SymbolVisitor,
    walk_top_down,
};

/// Entry points into one session's symbol graph.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    session: &'s Session,
}

impl<'s> Resolver<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Files in this session's scope, in oracle order.
    pub fn new_files(&self) -> SymbolResult<Vec<Arc<SourceFile>>> {
        self.session
            .oracle()
            .new_files()
            .into_iter()
            .map(|key| self.session.file(key))
            .collect()
    }

    /// Top-level declarations of a package. Re-queries the oracle on every
    /// call.
    pub fn declarations_from_package(
        &self,
        package: &str,
    ) -> impl Iterator<Item = SymbolResult<Declaration>> + 's {
        let session = self.session;
        session
            .oracle()
            .declarations_in_package(package)
            .into_iter()
            .map(move |key| session.declaration(key))
    }

    pub fn class_by_name(&self, qualified_name: &str) -> SymbolResult<Option<Arc<ClassDeclaration>>> {
        self.session
            .oracle()
            .class_by_name(qualified_name)
            .map(|key| self.session.class(key))
            .transpose()
    }

    /// Declarations in the new files carrying an annotation whose class has
    /// the given fully qualified name.
    pub fn symbols_with_annotation(&self, annotation_name: &str) -> SymbolResult<Vec<Declaration>> {
        let mut collector = AnnotatedCollector { annotation_name };
        let mut found = Vec::new();
        for file in self.new_files()? {
            walk_top_down(self.session, file.node_id(), &mut collector, &mut found)?;
        }
        tracing::debug!(annotation = annotation_name, count = found.len(), "collected annotated symbols");
        Ok(found)
    }

    /// Run `f` over every new file on a worker pool.
    ///
    /// Uses the session's dedicated pool when it is configured with a
    /// parallelism, the global pool otherwise. Results keep file order.
    pub fn par_map_files<T, F>(&self, f: F) -> SymbolResult<Vec<T>>
    where
        T: Send,
        F: Fn(&Session, &Arc<SourceFile>) -> SymbolResult<T> + Sync + Send,
    {
        let files = self.new_files()?;
        let session = self.session;
        let run = || {
            files
                .par_iter()
                .map(|file| f(session, file))
                .collect::<SymbolResult<Vec<T>>>()
        };
        match session.worker_pool() {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

struct AnnotatedCollector<'a> {
    annotation_name: &'a str,
}

impl SymbolVisitor<Vec<Declaration>, ()> for AnnotatedCollector<'_> {
    fn default_handler(&mut self, _session: &Session, _node: NodeId, _data: &mut Vec<Declaration>) -> SymbolResult<()> {
        Ok(())
    }

    fn visit_declaration(
        &mut self,
        session: &Session,
        declaration: &Declaration,
        data: &mut Vec<Declaration>,
    ) -> SymbolResult<()> {
        let annotated = declaration
            .annotations(session)?
            .iter()
            .any(|a| a.qualified_name() == Some(self.annotation_name));
        if annotated {
            data.push(declaration.clone());
        }
        Ok(())
    }
}
