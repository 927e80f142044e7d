//! Read-only, in-memory query engine for XBRL taxonomies.
//!
//! The pipeline: a [`DtsCollector`] discovers the document set from entry
//! points through a (cached) document builder, a [`TaxonomyBase`] indexes
//! the parsed documents, a [`RelationshipFactory`] resolves XLink arcs into
//! typed relationships, and a [`BasicTaxonomy`] exposes the query API over
//! the frozen result. Nothing mutates after construction; filtering and
//! network resolution return new snapshots.

pub mod base;
pub mod build;
pub mod concept;
pub mod diag;
pub mod dts;
pub mod element;
pub mod error;
pub mod factory;
pub mod network;
pub mod ns;
pub mod relationship;
pub mod taxonomy;

pub use base::{SubstitutionGroupMap, TaxonomyBase};
pub use build::TaxonomyBuilder;
pub use concept::{ConceptDeclaration, ConceptDeclarationBuilder};
pub use diag::{CollectingDiagnostics, Diagnostics, TracingDiagnostics};
pub use dts::{CancelToken, DtsCollector};
pub use element::{
    ArcUse, ArcroleRef, ArcroleType, ExtendedLink, GlobalAttributeDeclaration,
    GlobalElementDeclaration, Linkbase, NamedTypeDefinition, NonStandardResource, RoleRef,
    RoleType, TaxonomyDocument, TaxonomyElem, XLinkArc, XLinkLocator, XLinkResource, XsdSchema,
};
pub use error::{
    ArcClassificationError, DanglingLocatorError, DtsDiscoveryError, InvalidConceptDeclaration,
    MissingElementError, NetworkComputationError, TaxonomyError,
};
pub use factory::{ArcFilter, RelationshipFactory};
pub use network::{DefaultNetworkResolver, NetworkResolver};
pub use relationship::{
    BaseSetKey, ConceptResourceKind, ConceptResourceRelationship, EndpointId, EquivalenceKey,
    InterConceptKind, InterConceptRelationship, NonStandardRelationship, Relationship,
    ResourceEnd, StandardRelationship,
};
pub use taxonomy::BasicTaxonomy;
