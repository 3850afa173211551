//! Collects `name: doc` lines for documented and undocumented declarations.

use std::sync::Arc;

use crate::symbol::{
    ClassDeclaration, Declaration, FunctionDeclaration, NodeId, PropertyDeclaration, Session,
    SymbolResult, SymbolVisitor,
};

use super::processor::SymbolProcessor;
use super::resolver::Resolver;

/// One `name: doc` line per class, function and property reachable from the
/// new files, sorted.
///
/// Line breaks inside a doc comment are rendered as a literal `\n`; a
/// missing doc comment renders as `null`.
#[derive(Debug, Default)]
pub struct DocStringProcessor {
    results: Vec<String>,
}

impl DocStringProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }
}

impl SymbolProcessor for DocStringProcessor {
    fn process(&mut self, resolver: &Resolver<'_>) -> SymbolResult<Vec<Declaration>> {
        let session = resolver.session();
        let mut collector = DocStringCollector;
        for file in resolver.new_files()? {
            for declaration in file.declarations(session) {
                declaration?
                    .node_id()
                    .accept::<_, (), _>(session, &mut collector, &mut self.results)?;
            }
        }
        Ok(Vec::new())
    }

    fn finish(&mut self) {
        self.results.sort();
    }
}

pub(crate) fn render_doc(name: &str, doc: Option<&str>) -> String {
    match doc {
        Some(doc) => {
            let mut rendered = String::with_capacity(doc.len());
            let mut chars = doc.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '\n' => rendered.push_str("\\n"),
                    // \r\n and a lone \r both end a line
                    '\r' => {
                        chars.next_if_eq(&'\n');
                        rendered.push_str("\\n");
                    }
                    c => rendered.push(c),
                }
            }
            format!("{name}: {rendered}")
        }
        None => format!("{name}: null"),
    }
}

struct DocStringCollector;

impl SymbolVisitor<Vec<String>, ()> for DocStringCollector {
    fn default_handler(&mut self, _session: &Session, _node: NodeId, _data: &mut Vec<String>) -> SymbolResult<()> {
        Ok(())
    }

    fn visit_class(
        &mut self,
        session: &Session,
        class: &Arc<ClassDeclaration>,
        data: &mut Vec<String>,
    ) -> SymbolResult<()> {
        data.push(render_doc(class.simple_name(), class.doc_string()));
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
        data.push(render_doc(function.simple_name(), function.doc_string(session)?));
        for declaration in function.declarations(session) {
            declaration?.node_id().accept::<_, (), _>(session, self, data)?;
        }
        Ok(())
    }

    fn visit_property(
        &mut self,
        _session: &Session,
        property: &Arc<PropertyDeclaration>,
        data: &mut Vec<String>,
    ) -> SymbolResult<()> {
        data.push(render_doc(property.simple_name(), property.doc_string()));
        Ok(())
    }
}
