//! URI resolution strategies.
//!
//! A resolver is a total function from logical document URI to fetchable URI.
//! Whether the resolved location can actually be opened is the document
//! builder's concern.

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

/// Total `Url -> Url` mapping applied before fetching a document.
#[derive(Clone)]
pub enum UriResolver {
    /// Fetch the URI as given.
    Identity,
    /// Map `scheme://authority/path` onto `<root>/authority/path` as a
    /// `file:` URI. `file:` URIs pass through unchanged.
    LocalMirror { root: PathBuf },
    /// User-supplied transformer.
    Custom(Arc<dyn Fn(&Url) -> Url + Send + Sync>),
}

impl UriResolver {
    pub fn identity() -> Self {
        UriResolver::Identity
    }

    pub fn local_mirror(root: impl Into<PathBuf>) -> Self {
        UriResolver::LocalMirror { root: root.into() }
    }

    pub fn from_fn(f: impl Fn(&Url) -> Url + Send + Sync + 'static) -> Self {
        UriResolver::Custom(Arc::new(f))
    }

    pub fn resolve(&self, uri: &Url) -> Url {
        match self {
            UriResolver::Identity => uri.clone(),
            UriResolver::LocalMirror { root } => mirror(root, uri).unwrap_or_else(|| uri.clone()),
            UriResolver::Custom(f) => f(uri),
        }
    }
}

impl std::fmt::Debug for UriResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UriResolver::Identity => f.write_str("UriResolver::Identity"),
            UriResolver::LocalMirror { root } => {
                f.debug_struct("UriResolver::LocalMirror").field("root", root).finish()
            }
            UriResolver::Custom(_) => f.write_str("UriResolver::Custom(..)"),
        }
    }
}

fn mirror(root: &PathBuf, uri: &Url) -> Option<Url> {
    if uri.scheme() == "file" {
        return Some(uri.clone());
    }
    let mut path = root.clone();
    if let Some(host) = uri.host_str() {
        path.push(host);
    }
    for segment in uri.path_segments().into_iter().flatten() {
        if !segment.is_empty() {
            path.push(segment);
        }
    }
    Url::from_file_path(&path).ok()
}
