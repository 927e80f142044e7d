//! Typed relationships extracted from XLink arcs.
//!
//! The hierarchy is deep but closed: standard relationships have a concept
//! source; inter-concept relationships have a concept target too, with the
//! dimensional sub-kinds as a kind tag; non-standard relationships identify
//! their endpoints by fragment key only. Every relationship is backed by
//! exactly one arc in the underlying documents.

use taxoquery_core::{EName, XmlElem, XmlFragmentKey};
use url::Url;

use crate::element::{GlobalElementDeclaration, NonStandardResource, XLinkArc, XLinkResource};

/// Identity of a relationship endpoint.
///
/// Concepts are identified by EName; anything else falls back to the
/// fragment key, the only admissible identity for non-standard endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EndpointId {
    Concept(EName),
    Fragment(XmlFragmentKey),
}

/// Base-set coordinates of an arc, per XBRL 2.1 network resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseSetKey {
    pub elr: String,
    pub arcrole: String,
    pub arc_ename: EName,
    pub link_ename: EName,
}

/// Equivalence-class key: endpoints plus non-exempt arc attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EquivalenceKey {
    pub source: EndpointId,
    pub target: EndpointId,
    pub nonexempt_attributes: Vec<(EName, String)>,
}

/// Fields shared by every relationship variant.
#[derive(Clone, Debug)]
pub(crate) struct RelationshipCore {
    pub(crate) arc: XLinkArc,
    pub(crate) link_ename: EName,
    pub(crate) arc_ename: EName,
    pub(crate) elr: String,
    pub(crate) arcrole: String,
}

/// Sub-kind of an inter-concept relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterConceptKind {
    ParentChild,
    Calculation,
    HasHypercube { is_all: bool },
    HypercubeDimension,
    DimensionDomain,
    DomainMember,
    DimensionDefault,
    /// Concept endpoints under one of the remaining standard arcroles
    /// (general-special, essence-alias, ...), or an unrecognized arcrole in
    /// lenient classification.
    Other,
}

impl InterConceptKind {
    pub fn is_has_hypercube(self) -> bool {
        matches!(self, InterConceptKind::HasHypercube { .. })
    }

    pub fn is_dimensional(self) -> bool {
        matches!(
            self,
            InterConceptKind::HasHypercube { .. }
                | InterConceptKind::HypercubeDimension
                | InterConceptKind::DimensionDomain
                | InterConceptKind::DomainMember
                | InterConceptKind::DimensionDefault
        )
    }
}

/// Relationship between two concepts.
#[derive(Clone, Debug)]
pub struct InterConceptRelationship {
    pub(crate) core: RelationshipCore,
    pub(crate) kind: InterConceptKind,
    pub(crate) source: GlobalElementDeclaration,
    pub(crate) target: GlobalElementDeclaration,
}

impl InterConceptRelationship {
    pub fn kind(&self) -> InterConceptKind {
        self.kind
    }

    pub fn source_ename(&self) -> &EName {
        self.source.target_ename()
    }

    pub fn target_ename(&self) -> &EName {
        self.target.target_ename()
    }

    pub fn source_declaration(&self) -> &GlobalElementDeclaration {
        &self.source
    }

    pub fn target_declaration(&self) -> &GlobalElementDeclaration {
        &self.target
    }

    pub fn arc(&self) -> &XLinkArc {
        &self.core.arc
    }

    pub fn elr(&self) -> &str {
        &self.core.elr
    }

    pub fn arcrole(&self) -> &str {
        &self.core.arcrole
    }

    pub fn order(&self) -> f64 {
        self.core.arc.order()
    }

    /// `xbrldt:usable` of the backing arc; meaningful on dimension-domain
    /// and domain-member relationships.
    pub fn usable(&self) -> bool {
        self.core.arc.usable()
    }

    /// For has-hypercube relationships: whether the arcrole is `all`.
    pub fn is_all(&self) -> bool {
        matches!(self.kind, InterConceptKind::HasHypercube { is_all: true })
    }

    /// `xbrldt:targetRole` when present, the arc's own ELR otherwise.
    pub fn effective_target_role(&self) -> &str {
        self.core.arc.target_role().unwrap_or(&self.core.elr)
    }

    /// Consecutiveness in DRS traversal: the target of `self` is the source
    /// of `next`, in the ELR that `self` effectively targets.
    pub fn is_followed_by(&self, next: &InterConceptRelationship) -> bool {
        self.target_ename() == next.source_ename() && self.effective_target_role() == next.elr()
    }
}

/// Sub-kind of a concept-to-resource relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConceptResourceKind {
    ConceptLabel,
    ConceptReference,
    /// Standard-link arc to a resource with an unrecognized arcrole
    /// (lenient classification only).
    Other,
}

/// The resource end of a concept-resource relationship.
#[derive(Clone, Debug)]
pub enum ResourceEnd {
    Standard(XLinkResource),
    NonStandard(NonStandardResource),
}

impl ResourceEnd {
    pub fn backing_elem(&self) -> &XmlElem {
        match self {
            ResourceEnd::Standard(r) => r.backing_elem(),
            ResourceEnd::NonStandard(r) => r.backing_elem(),
        }
    }

    pub fn key(&self) -> XmlFragmentKey {
        self.backing_elem().fragment_key()
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            ResourceEnd::Standard(r) => r.role(),
            ResourceEnd::NonStandard(r) => r.role(),
        }
    }

    pub fn text(&self) -> String {
        match self {
            ResourceEnd::Standard(r) => r.text(),
            ResourceEnd::NonStandard(r) => r.text(),
        }
    }

    pub fn language(&self) -> Option<String> {
        self.backing_elem().language()
    }
}

/// Relationship from a concept to a resource (label, reference).
#[derive(Clone, Debug)]
pub struct ConceptResourceRelationship {
    pub(crate) core: RelationshipCore,
    pub(crate) kind: ConceptResourceKind,
    pub(crate) source: GlobalElementDeclaration,
    pub(crate) resource: ResourceEnd,
}

impl ConceptResourceRelationship {
    pub fn kind(&self) -> ConceptResourceKind {
        self.kind
    }

    pub fn source_ename(&self) -> &EName {
        self.source.target_ename()
    }

    pub fn source_declaration(&self) -> &GlobalElementDeclaration {
        &self.source
    }

    pub fn resource(&self) -> &ResourceEnd {
        &self.resource
    }

    pub fn arc(&self) -> &XLinkArc {
        &self.core.arc
    }

    pub fn elr(&self) -> &str {
        &self.core.elr
    }

    pub fn arcrole(&self) -> &str {
        &self.core.arcrole
    }
}

/// Relationship with a concept source.
#[derive(Clone, Debug)]
pub enum StandardRelationship {
    InterConcept(InterConceptRelationship),
    ConceptResource(ConceptResourceRelationship),
}

impl StandardRelationship {
    pub fn source_ename(&self) -> &EName {
        match self {
            StandardRelationship::InterConcept(r) => r.source_ename(),
            StandardRelationship::ConceptResource(r) => r.source_ename(),
        }
    }

    pub fn elr(&self) -> &str {
        match self {
            StandardRelationship::InterConcept(r) => r.elr(),
            StandardRelationship::ConceptResource(r) => r.elr(),
        }
    }

    pub fn as_inter_concept(&self) -> Option<&InterConceptRelationship> {
        match self {
            StandardRelationship::InterConcept(r) => Some(r),
            StandardRelationship::ConceptResource(_) => None,
        }
    }
}

/// Relationship in a non-standard link, keyed by fragment identity.
#[derive(Clone, Debug)]
pub struct NonStandardRelationship {
    pub(crate) core: RelationshipCore,
    pub(crate) source: XmlElem,
    pub(crate) target: XmlElem,
}

impl NonStandardRelationship {
    pub fn source_elem(&self) -> &XmlElem {
        &self.source
    }

    pub fn target_elem(&self) -> &XmlElem {
        &self.target
    }

    pub fn source_key(&self) -> XmlFragmentKey {
        self.source.fragment_key()
    }

    pub fn target_key(&self) -> XmlFragmentKey {
        self.target.fragment_key()
    }

    pub fn arc(&self) -> &XLinkArc {
        &self.core.arc
    }

    pub fn elr(&self) -> &str {
        &self.core.elr
    }

    pub fn arcrole(&self) -> &str {
        &self.core.arcrole
    }
}

/// Any extracted relationship.
#[derive(Clone, Debug)]
pub enum Relationship {
    Standard(StandardRelationship),
    NonStandard(NonStandardRelationship),
}

impl Relationship {
    pub(crate) fn core(&self) -> &RelationshipCore {
        match self {
            Relationship::Standard(StandardRelationship::InterConcept(r)) => &r.core,
            Relationship::Standard(StandardRelationship::ConceptResource(r)) => &r.core,
            Relationship::NonStandard(r) => &r.core,
        }
    }

    pub fn arc(&self) -> &XLinkArc {
        &self.core().arc
    }

    pub fn elr(&self) -> &str {
        &self.core().elr
    }

    pub fn arcrole(&self) -> &str {
        &self.core().arcrole
    }

    pub fn link_ename(&self) -> &EName {
        &self.core().link_ename
    }

    pub fn arc_ename(&self) -> &EName {
        &self.core().arc_ename
    }

    pub fn doc_uri(&self) -> &Url {
        self.core().arc.doc_uri()
    }

    pub fn as_standard(&self) -> Option<&StandardRelationship> {
        match self {
            Relationship::Standard(r) => Some(r),
            Relationship::NonStandard(_) => None,
        }
    }

    pub fn as_inter_concept(&self) -> Option<&InterConceptRelationship> {
        self.as_standard().and_then(StandardRelationship::as_inter_concept)
    }

    pub fn as_concept_resource(&self) -> Option<&ConceptResourceRelationship> {
        match self {
            Relationship::Standard(StandardRelationship::ConceptResource(r)) => Some(r),
            _ => None,
        }
    }

    pub fn as_non_standard(&self) -> Option<&NonStandardRelationship> {
        match self {
            Relationship::NonStandard(r) => Some(r),
            Relationship::Standard(_) => None,
        }
    }

    pub fn source_id(&self) -> EndpointId {
        match self {
            Relationship::Standard(r) => EndpointId::Concept(r.source_ename().clone()),
            Relationship::NonStandard(r) => EndpointId::Fragment(r.source_key()),
        }
    }

    pub fn target_id(&self) -> EndpointId {
        match self {
            Relationship::Standard(StandardRelationship::InterConcept(r)) => {
                EndpointId::Concept(r.target_ename().clone())
            }
            Relationship::Standard(StandardRelationship::ConceptResource(r)) => {
                EndpointId::Fragment(r.resource.key())
            }
            Relationship::NonStandard(r) => EndpointId::Fragment(r.target_key()),
        }
    }

    /// `xbrldt:targetRole` when present, the arc's own ELR otherwise.
    pub fn effective_target_role(&self) -> &str {
        let core = self.core();
        core.arc.target_role().unwrap_or(&core.elr)
    }

    /// The only admissible definition of consecutive relationships:
    /// `self.target = other.source` and `self.effective_target_role =
    /// other.elr`.
    pub fn is_followed_by(&self, other: &Relationship) -> bool {
        self.target_id() == other.source_id() && self.effective_target_role() == other.elr()
    }

    pub fn base_set_key(&self) -> BaseSetKey {
        let core = self.core();
        BaseSetKey {
            elr: core.elr.clone(),
            arcrole: core.arcrole.clone(),
            arc_ename: core.arc_ename.clone(),
            link_ename: core.link_ename.clone(),
        }
    }

    pub fn equivalence_key(&self) -> EquivalenceKey {
        EquivalenceKey {
            source: self.source_id(),
            target: self.target_id(),
            nonexempt_attributes: self.core().arc.nonexempt_attributes(),
        }
    }
}
