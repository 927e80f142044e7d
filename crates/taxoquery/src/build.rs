//! End-to-end taxonomy building: resolver, cached document builder,
//! collector, relationship factory, query facade.

use std::sync::Arc;

use taxoquery_core::{CachingDocumentBuilder, DEFAULT_DOCUMENT_CACHE_CAPACITY, DocumentBuilder};
use url::Url;

use crate::base::{SubstitutionGroupMap, TaxonomyBase};
use crate::diag::{Diagnostics, default_sink};
use crate::dts::{CancelToken, DtsCollector};
use crate::error::TaxonomyError;
use crate::factory::{ArcFilter, RelationshipFactory};
use crate::taxonomy::BasicTaxonomy;

/// Builder wiring the whole pipeline together.
///
/// ```no_run
/// use std::sync::Arc;
/// use taxoquery::TaxonomyBuilder;
/// use taxoquery_core::{LocalDocumentBuilder, UriResolver};
/// use url::Url;
///
/// # fn main() -> Result<(), taxoquery::TaxonomyError> {
/// let docs = LocalDocumentBuilder::new(UriResolver::local_mirror("/opt/taxonomies"));
/// let taxonomy = TaxonomyBuilder::new(Arc::new(docs))
///     .lenient(true)
///     .build(&[Url::parse("http://www.example.com/2024/entry.xsd").unwrap()])?;
/// println!("{} relationships", taxonomy.relationships().len());
/// # Ok(())
/// # }
/// ```
pub struct TaxonomyBuilder {
    document_builder: Arc<dyn DocumentBuilder>,
    cache_size: usize,
    trivial_collection: bool,
    lenient: bool,
    arc_filter: Option<ArcFilter>,
    extra_substitution_groups: SubstitutionGroupMap,
    cancel: CancelToken,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TaxonomyBuilder {
    pub fn new(document_builder: Arc<dyn DocumentBuilder>) -> Self {
        Self {
            document_builder,
            cache_size: DEFAULT_DOCUMENT_CACHE_CAPACITY,
            trivial_collection: false,
            lenient: false,
            arc_filter: None,
            extra_substitution_groups: SubstitutionGroupMap::new(),
            cancel: CancelToken::new(),
            diagnostics: default_sink(),
        }
    }

    /// Document cache capacity (default 5000).
    #[must_use]
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Collect exactly the entry-point URIs instead of the discovery
    /// closure.
    #[must_use]
    pub fn trivial_collection(mut self) -> Self {
        self.trivial_collection = true;
        self
    }

    /// Tolerate undiscoverable documents and unclassifiable arcs (default:
    /// strict).
    #[must_use]
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Restrict which arcs yield relationships.
    #[must_use]
    pub fn with_arc_filter(mut self, filter: ArcFilter) -> Self {
        self.arc_filter = Some(filter);
        self
    }

    /// Extra substitution-group edges for concepts whose ancestors are not
    /// part of the loaded document set.
    #[must_use]
    pub fn with_extra_substitution_groups(mut self, extras: SubstitutionGroupMap) -> Self {
        self.extra_substitution_groups = extras;
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

    /// Run the pipeline for the given entry points.
    pub fn build(&self, entry_points: &[Url]) -> Result<BasicTaxonomy, TaxonomyError> {
        let cached =
            CachingDocumentBuilder::with_capacity(Arc::clone(&self.document_builder), self.cache_size);
        let collector = if self.trivial_collection {
            DtsCollector::trivial(cached)
        } else {
            DtsCollector::discovering(cached)
        };
        let documents = collector
            .lenient(self.lenient)
            .with_cancel_token(self.cancel.clone())
            .with_diagnostics(Arc::clone(&self.diagnostics))
            .collect(entry_points)?;

        let base =
            TaxonomyBase::from_documents_with_extras(documents, self.extra_substitution_groups.clone());

        let mut factory = if self.lenient {
            RelationshipFactory::lenient()
        } else {
            RelationshipFactory::strict()
        };
        factory = factory
            .with_cancel_token(self.cancel.clone())
            .with_diagnostics(Arc::clone(&self.diagnostics));
        if let Some(filter) = &self.arc_filter {
            factory = factory.with_arc_filter(Arc::clone(filter));
        }
        let relationships = factory.extract(&base)?;

        BasicTaxonomy::from_base_and_relationships(base, relationships, self.lenient)
    }
}
