//! Error kinds of the taxonomy layer.
//!
//! In lenient mode, per-item failures during discovery and classification are
//! routed through the [`Diagnostics`](crate::diag::Diagnostics) sink instead
//! and the offending item is elided; in strict mode the first of them aborts
//! the build. Nothing here retries.

use taxoquery_core::{DocumentFetchError, EName};
use url::Url;

/// Strict-mode failure during DTS closure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DtsDiscoveryError {
    #[error("dts discovery failed at {uri}")]
    Document {
        uri: Url,
        #[source]
        source: DocumentFetchError,
    },
    #[error("dts discovery cancelled")]
    Cancelled,
}

/// An XLink locator whose href points at nothing in the discovered set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("dangling locator {label:?} -> {href} in {doc_uri}")]
pub struct DanglingLocatorError {
    pub doc_uri: Url,
    pub label: String,
    pub href: String,
}

/// Strict-mode arc that matches no classification dispatch entry.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot classify arc {arc_ename} with arcrole {arcrole:?} in {elr} ({doc_uri})")]
pub struct ArcClassificationError {
    pub doc_uri: Url,
    pub elr: String,
    pub arcrole: Option<String>,
    pub arc_ename: EName,
}

/// A global element declaration in mutually exclusive substitution groups.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid concept declaration {ename}: {reason}")]
pub struct InvalidConceptDeclaration {
    pub ename: EName,
    pub reason: String,
}

/// Inconsistent `@use`/`@priority` combinations during network resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkComputationError {
    #[error("invalid use value {value:?} on arc in {elr}")]
    InvalidUse { elr: String, value: String },
    #[error("invalid priority value {value:?} on arc in {elr}")]
    InvalidPriority { elr: String, value: String },
}

/// A `get_*` lookup whose contract asserts presence found nothing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("required element not found: {what}")]
pub struct MissingElementError {
    pub what: String,
}

/// Umbrella error of the taxonomy layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaxonomyError {
    #[error(transparent)]
    Discovery(#[from] DtsDiscoveryError),
    #[error(transparent)]
    DanglingLocator(#[from] DanglingLocatorError),
    #[error(transparent)]
    ArcClassification(#[from] ArcClassificationError),
    #[error(transparent)]
    InvalidConceptDeclaration(#[from] InvalidConceptDeclaration),
    #[error(transparent)]
    NetworkComputation(#[from] NetworkComputationError),
    #[error(transparent)]
    MissingElement(#[from] MissingElementError),
}
