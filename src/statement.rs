use crate::error::{Result, StatementAnalystError};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// An uploaded statement: its file name plus the raw document bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDocument {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl StatementDocument {
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// A PDF statement, the only kind the host UI accepts.
    #[must_use]
    pub fn pdf(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name, "application/pdf", bytes)
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StatementAnalystError::InvalidFileName(path.display().to_string()))?
            .to_string();

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let bytes = fs::read(path).await?;

        if bytes.is_empty() {
            return Err(StatementAnalystError::EmptyStatement(name));
        }

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Loaded statements keyed by file name, in upload order. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct StatementSet {
    documents: Vec<StatementDocument>,
}

impl StatementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement unless one with the same name is already loaded.
    /// Returns `true` when the set grew.
    pub fn insert(&mut self, document: StatementDocument) -> bool {
        if self.contains(&document.name) {
            debug!("Statement '{}' already loaded, skipping", document.name);
            return false;
        }
        self.documents.push(document);
        true
    }

    /// Insert a batch, returning how many statements were new.
    pub fn extend<I: IntoIterator<Item = StatementDocument>>(&mut self, documents: I) -> usize {
        documents
            .into_iter()
            .filter(|document| self.insert(document.clone()))
            .count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.iter().any(|doc| doc.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&StatementDocument> {
        self.documents.iter().find(|doc| doc.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.name.as_str())
    }

    pub fn documents(&self) -> &[StatementDocument] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatementDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a StatementSet {
    type Item = &'a StatementDocument;
    type IntoIter = std::slice::Iter<'a, StatementDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
