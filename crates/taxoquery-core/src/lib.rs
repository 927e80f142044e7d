pub mod builder;
pub mod cache;
pub mod dom;
pub mod name;
pub mod parser;
pub mod resolver;

pub use builder::{DocumentBuilder, DocumentFetchError, FetchFailure, LocalDocumentBuilder, MappedDocumentBuilder};
pub use cache::{CachingDocumentBuilder, DEFAULT_DOCUMENT_CACHE_CAPACITY};
pub use dom::{NodeId, XML_NAMESPACE, XmlAttribute, XmlDocument, XmlElem, XmlFragmentKey};
pub use name::{EName, InvalidNameError, QName, Scope};
pub use parser::{DocumentParseError, parse_document};
pub use resolver::UriResolver;
