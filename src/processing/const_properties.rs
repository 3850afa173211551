//! Collects the names of `const` properties.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::base::Name;
use crate::symbol::{
    ClassDeclaration, Declaration, FunctionDeclaration, Modifier, NodeId, PropertyDeclaration,
    Session, SymbolResult, SymbolVisitor,
};

use super::processor::SymbolProcessor;
use super::resolver::Resolver;

/// Names of every `const` property in the new files and in the configured
/// library packages, sorted.
#[derive(Debug, Default)]
pub struct ConstPropertiesProcessor {
    library_packages: Vec<Name>,
    results: Vec<String>,
}

impl ConstPropertiesProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also scan the top-level declarations of a compiled package.
    pub fn with_library_package(mut self, package: impl Into<Name>) -> Self {
        self.library_packages.push(package.into());
        self
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }
}

impl SymbolProcessor for ConstPropertiesProcessor {
    fn process(&mut self, resolver: &Resolver<'_>) -> SymbolResult<Vec<Declaration>> {
        let session = resolver.session();
        let mut visitor = ConstPropertiesVisitor::default();
        let mut names = Vec::new();
        for file in resolver.new_files()? {
            for declaration in file.declarations(session) {
                declaration?.node_id().accept::<_, (), _>(session, &mut visitor, &mut names)?;
            }
        }
        for package in &self.library_packages {
            for declaration in resolver.declarations_from_package(package) {
                declaration?.node_id().accept::<_, (), _>(session, &mut visitor, &mut names)?;
            }
        }
        self.results.extend(names);
        Ok(Vec::new())
    }

    fn finish(&mut self) {
        self.results.sort();
    }
}

#[derive(Default)]
struct ConstPropertiesVisitor {
    seen: FxHashSet<NodeId>,
}

impl SymbolVisitor<Vec<String>, ()> for ConstPropertiesVisitor {
    fn default_handler(&mut self, _session: &Session, _node: NodeId, _data: &mut Vec<String>) -> SymbolResult<()> {
        Ok(())
    }

    fn visit_class(
        &mut self,
        session: &Session,
        class: &Arc<ClassDeclaration>,
        data: &mut Vec<String>,
    ) -> SymbolResult<()> {
        for declaration in class.declarations(session) {
            declaration?.node_id().accept::<_, (), _>(session, self, data)?;
        }
        Ok(())
    }

    fn visit_function(
        &mut self,
        session: &Session,
        function: &Arc<FunctionDeclaration>,
        data: &mut Vec<String>,
    ) -> SymbolResult<()> {
        for declaration in function.declarations(session) {
            declaration?.node_id().accept::<_, (), _>(session, self, data)?;
        }
        Ok(())
    }

    fn visit_property(
        &mut self,
        session: &Session,
        property: &Arc<PropertyDeclaration>,
        data: &mut Vec<String>,
    ) -> SymbolResult<()> {
        if !self.seen.insert(property.node_id()) {
            return Ok(());
        }
        if property.modifiers(session)?.contains(&Modifier::Const) {
            data.push(property.simple_name().to_string());
        }
        Ok(())
    }
}
