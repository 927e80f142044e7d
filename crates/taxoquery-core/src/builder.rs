//! Document builders: fetch plus parse behind one seam.
//!
//! [`DocumentBuilder`] is the backing-model boundary of the engine. The
//! shipped implementations parse into the arena model; an alternative XML
//! backend would plug in here without touching anything downstream.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::dom::XmlDocument;
use crate::parser::{DocumentParseError, parse_document};
use crate::resolver::UriResolver;

/// Why a document could not be built.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchFailure {
    #[error("uri does not resolve to a readable location: {0}")]
    Resolve(String),
    #[error("i/o failure: {0}")]
    Io(Arc<std::io::Error>),
    #[error(transparent)]
    Parse(DocumentParseError),
    #[error("no document mapped for this uri")]
    NotMapped,
}

/// Failure to fetch or parse the document at a URI.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to build document {uri}: {cause}")]
pub struct DocumentFetchError {
    pub uri: Url,
    #[source]
    pub cause: FetchFailure,
}

impl DocumentFetchError {
    pub fn new(uri: &Url, cause: FetchFailure) -> Self {
        Self { uri: uri.clone(), cause }
    }
}

/// Builds the parsed document for a URI.
pub trait DocumentBuilder: Send + Sync {
    fn build(&self, uri: &Url) -> Result<Arc<XmlDocument>, DocumentFetchError>;
}

impl<B: DocumentBuilder + ?Sized> DocumentBuilder for Arc<B> {
    fn build(&self, uri: &Url) -> Result<Arc<XmlDocument>, DocumentFetchError> {
        (**self).build(uri)
    }
}

/// Reads documents from the local filesystem after URI resolution.
#[derive(Debug, Clone)]
pub struct LocalDocumentBuilder {
    resolver: UriResolver,
}

impl LocalDocumentBuilder {
    pub fn new(resolver: UriResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &UriResolver {
        &self.resolver
    }
}

impl DocumentBuilder for LocalDocumentBuilder {
    fn build(&self, uri: &Url) -> Result<Arc<XmlDocument>, DocumentFetchError> {
        let resolved = self.resolver.resolve(uri);
        let path = resolved
            .to_file_path()
            .map_err(|()| DocumentFetchError::new(uri, FetchFailure::Resolve(resolved.to_string())))?;
        let text = std::fs::read_to_string(&path)
            .map_err(|e| DocumentFetchError::new(uri, FetchFailure::Io(Arc::new(e))))?;
        // The document keeps its logical URI; the resolved location is a
        // fetch detail and must not leak into base-URI computation.
        parse_document(uri.clone(), &text)
            .map_err(|e| DocumentFetchError::new(uri, FetchFailure::Parse(e)))
    }
}

/// Serves documents from an in-memory URI -> text map.
///
/// Backs "load these strings and nothing else" workflows and tests.
#[derive(Debug, Clone, Default)]
pub struct MappedDocumentBuilder {
    documents: HashMap<Url, String>,
}

impl MappedDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, uri: Url, text: impl Into<String>) -> Self {
        self.documents.insert(uri, text.into());
        self
    }

    pub fn insert(&mut self, uri: Url, text: impl Into<String>) {
        self.documents.insert(uri, text.into());
    }
}

impl DocumentBuilder for MappedDocumentBuilder {
    fn build(&self, uri: &Url) -> Result<Arc<XmlDocument>, DocumentFetchError> {
        let text = self
            .documents
            .get(uri)
            .ok_or_else(|| DocumentFetchError::new(uri, FetchFailure::NotMapped))?;
        parse_document(uri.clone(), text)
            .map_err(|e| DocumentFetchError::new(uri, FetchFailure::Parse(e)))
    }
}
