//! Source files.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::annotation::Annotation;
use super::cache::define_id;
use super::declaration::Declaration;
use super::error::SymbolResult;
use super::location::Origin;
use super::node::NodeId;
use super::session::Session;
use crate::base::Location;
use crate::oracle::{FileKey, RawFile};

define_id!(
    /// Handle of a [`SourceFile`].
    SourceFileId,
    "file"
);

#[derive(Debug)]
pub struct SourceFile {
    id: SourceFileId,
    key: FileKey,
    raw: Arc<RawFile>,
    annotations: OnceCell<Vec<Arc<Annotation>>>,
}

impl SourceFile {
    pub(crate) fn new(id: SourceFileId, key: FileKey, raw: Arc<RawFile>) -> Self {
        Self {
            id,
            key,
            raw,
            annotations: OnceCell::new(),
        }
    }

    pub fn id(&self) -> SourceFileId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::File(self.id)
    }

    pub fn file_key(&self) -> FileKey {
        self.key
    }

    pub fn file_path(&self) -> &str {
        &self.raw.path
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.raw
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.raw.path)
    }

    pub fn package_name(&self) -> &str {
        &self.raw.package
    }

    /// Top-level declarations, in source order. Re-queried on every call.
    pub fn declarations<'a>(
        &'a self,
        session: &'a Session,
    ) -> impl Iterator<Item = SymbolResult<Declaration>> + 'a {
        self.raw
            .declarations
            .iter()
            .map(move |&key| session.declaration(key))
    }

    pub fn annotations(&self, session: &Session) -> SymbolResult<&[Arc<Annotation>]> {
        self.annotations
            .get_or_try_init(|| {
                self.raw
                    .annotations
                    .iter()
                    .map(|&key| session.annotation(key, Some(self.node_id())))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn origin(&self) -> Origin {
        Origin::Source
    }

    pub fn location(&self, _session: &Session) -> Location {
        Location::file(self.raw.path.as_str(), 1, 1)
    }

    pub fn parent(&self, _session: &Session) -> SymbolResult<Option<NodeId>> {
        Ok(None)
    }

    pub(crate) fn children(&self, session: &Session) -> SymbolResult<Vec<NodeId>> {
        let mut children: Vec<NodeId> = self.annotations(session)?.iter().map(|a| a.node_id()).collect();
        for declaration in self.declarations(session) {
            children.push(declaration?.node_id());
        }
        Ok(children)
    }
}
