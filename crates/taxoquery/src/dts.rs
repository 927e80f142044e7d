//! DTS collection: finding the transitive closure of taxonomy documents
//! reachable from a set of entry points.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use taxoquery_core::{DocumentBuilder, XmlElem};
use tracing::debug;
use url::Url;

use crate::diag::{Diagnostics, default_sink};
use crate::element::TaxonomyDocument;
use crate::error::DtsDiscoveryError;
use crate::ns::{
    LINK_ARCROLE_REF, LINK_LINKBASE_REF, LINK_ROLE_REF, XBRLDT_TYPED_DOMAIN_REF, XLINK_HREF,
    XLINK_TYPE, XS_IMPORT, XS_INCLUDE,
};

/// Cooperative cancellation flag, checked between documents.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Closure by XBRL discovery rules.
    Discovery,
    /// Only the supplied URIs, verbatim.
    Trivial,
}

/// Collects the document set of a DTS through a [`DocumentBuilder`].
pub struct DtsCollector<B> {
    builder: B,
    strategy: Strategy,
    lenient: bool,
    cancel: CancelToken,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<B: DocumentBuilder> DtsCollector<B> {
    /// Closure-by-discovery collector (the default strategy).
    pub fn discovering(builder: B) -> Self {
        Self::new(builder, Strategy::Discovery)
    }

    /// Collector that fetches exactly the supplied URIs and nothing else.
    pub fn trivial(builder: B) -> Self {
        Self::new(builder, Strategy::Trivial)
    }

    fn new(builder: B, strategy: Strategy) -> Self {
        Self {
            builder,
            strategy,
            lenient: false,
            cancel: CancelToken::new(),
            diagnostics: default_sink(),
        }
    }

    /// Skip unfetchable/unparseable documents with a warning instead of
    /// failing the build.
    #[must_use]
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Collect all documents of the DTS, in discovery order.
    pub fn collect(&self, entry_points: &[Url]) -> Result<Vec<TaxonomyDocument>, DtsDiscoveryError> {
        let mut queue: VecDeque<Url> = VecDeque::new();
        let mut seen: HashSet<Url> = HashSet::new();
        for uri in entry_points {
            let uri = strip_fragment(uri);
            if seen.insert(uri.clone()) {
                queue.push_back(uri);
            }
        }

        let mut documents = Vec::new();
        while let Some(uri) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                return Err(DtsDiscoveryError::Cancelled);
            }
            let xml = match self.builder.build(&uri) {
                Ok(xml) => xml,
                Err(source) => {
                    if self.lenient {
                        self.diagnostics.warning(&format!("skipping undiscoverable document {uri}: {source}"));
                        continue;
                    }
                    return Err(DtsDiscoveryError::Document { uri, source });
                }
            };
            let document = TaxonomyDocument::from_xml(xml);
            if self.strategy == Strategy::Discovery {
                for reference in discover_references(&document) {
                    let reference = strip_fragment(&reference);
                    if seen.insert(reference.clone()) {
                        queue.push_back(reference);
                    }
                }
            }
            debug!(uri = %document.uri(), "discovered taxonomy document");
            documents.push(document);
        }
        Ok(documents)
    }
}

fn strip_fragment(uri: &Url) -> Url {
    let mut out = uri.clone();
    out.set_fragment(None);
    out
}

/// Enumerate the document URIs this document refers to, per the XBRL
/// discovery rules.
fn discover_references(document: &TaxonomyDocument) -> Vec<Url> {
    let root = document.root().backing_elem();
    let mut out = Vec::new();
    for elem in root.descendant_or_self_elems() {
        if let Some(uri) = reference_target(&elem) {
            out.push(uri);
        }
    }
    out
}

fn reference_target(elem: &XmlElem) -> Option<Url> {
    let name = elem.name();
    if name == &*XS_IMPORT || name == &*XS_INCLUDE {
        let location = elem.attribute_local("schemaLocation")?;
        return elem.base_uri().join(location).ok();
    }
    if name == &*LINK_LINKBASE_REF
        || name == &*LINK_ROLE_REF
        || name == &*LINK_ARCROLE_REF
        || elem.attribute(&XLINK_TYPE) == Some("locator")
    {
        let href = elem.attribute(&XLINK_HREF)?;
        return elem.base_uri().join(href).ok();
    }
    // Typed dimension domains may live in other documents.
    if let Some(href) = elem.attribute(&XBRLDT_TYPED_DOMAIN_REF) {
        return elem.base_uri().join(href).ok();
    }
    None
}
