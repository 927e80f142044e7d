//! Relationship extraction: resolving arcs against locator/resource label
//! maps and classifying each (arc, from, to) triple.

use std::collections::HashMap;
use std::sync::Arc;

use taxoquery_core::XmlElem;
use url::Url;

use crate::base::TaxonomyBase;
use crate::diag::{Diagnostics, default_sink};
use crate::dts::CancelToken;
use crate::element::{ExtendedLink, TaxonomyElem, XLinkArc};
use crate::error::{ArcClassificationError, DanglingLocatorError, DtsDiscoveryError, TaxonomyError};
use crate::ns;
use crate::ns::{
    LINK_CALCULATION_ARC, LINK_DEFINITION_ARC, LINK_LABEL_ARC, LINK_PRESENTATION_ARC,
    LINK_REFERENCE_ARC, XLINK_LABEL_ATTR, arcrole,
};
use crate::relationship::{
    ConceptResourceKind, ConceptResourceRelationship, InterConceptKind, InterConceptRelationship,
    NonStandardRelationship, Relationship, RelationshipCore, ResourceEnd, StandardRelationship,
};

/// Predicate restricting which arcs yield relationships.
pub type ArcFilter = Arc<dyn Fn(&XLinkArc) -> bool + Send + Sync>;

/// Resolves arcs into typed relationships over a [`TaxonomyBase`].
pub struct RelationshipFactory {
    lenient: bool,
    arc_filter: Option<ArcFilter>,
    cancel: CancelToken,
    diagnostics: Arc<dyn Diagnostics>,
}

impl RelationshipFactory {
    /// Strict factory: the first unresolvable locator or unclassifiable arc
    /// fails the build.
    pub fn strict() -> Self {
        Self::new(false)
    }

    /// Lenient factory: problematic items are skipped (or classified to the
    /// closest super-kind) with a warning.
    pub fn lenient() -> Self {
        Self::new(true)
    }

    fn new(lenient: bool) -> Self {
        Self { lenient, arc_filter: None, cancel: CancelToken::new(), diagnostics: default_sink() }
    }

    #[must_use]
    pub fn with_arc_filter(mut self, filter: ArcFilter) -> Self {
        self.arc_filter = Some(filter);
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

    /// Extract all relationships, in document discovery order and document
    /// order within each document.
    pub fn extract(&self, base: &TaxonomyBase) -> Result<Vec<Relationship>, TaxonomyError> {
        let mut out = Vec::new();
        for document in base.documents() {
            for linkbase in document.linkbases() {
                for link in linkbase.extended_links() {
                    self.extract_from_link(base, document.uri(), &link, &mut out)?;
                }
            }
        }
        Ok(out)
    }

    fn extract_from_link(
        &self,
        base: &TaxonomyBase,
        doc_uri: &Url,
        link: &ExtendedLink,
        out: &mut Vec<Relationship>,
    ) -> Result<(), TaxonomyError> {
        let elr = link.elr().to_string();
        let link_ename = link.backing_elem().name().clone();

        // Label -> endpoint elements. A label may be carried by several
        // locators/resources; each pairing yields its own relationship.
        let mut endpoints: HashMap<String, Vec<XmlElem>> = HashMap::new();
        for locator in link.child_locators() {
            let Some(label) = locator.label() else {
                self.diagnostics.warning(&format!("locator without xlink:label in {doc_uri}"));
                continue;
            };
            let resolved = locator.resolved_href().and_then(|href| base.elem_by_uri_with_fragment(&href));
            match resolved {
                Some(elem) => endpoints.entry(label.to_string()).or_default().push(elem),
                None => {
                    let error = DanglingLocatorError {
                        doc_uri: doc_uri.clone(),
                        label: label.to_string(),
                        href: locator.raw_href().unwrap_or_default().to_string(),
                    };
                    if self.lenient {
                        self.diagnostics.warning(&error.to_string());
                    } else {
                        return Err(error.into());
                    }
                }
            }
        }
        for resource in link.child_resources() {
            let Some(label) = resource.attribute(&XLINK_LABEL_ATTR) else {
                self.diagnostics.warning(&format!("resource without xlink:label in {doc_uri}"));
                continue;
            };
            endpoints.entry(label.to_string()).or_default().push(resource.clone());
        }

        for arc in link.child_arcs() {
            if self.cancel.is_cancelled() {
                return Err(DtsDiscoveryError::Cancelled.into());
            }
            if self.arc_filter.as_ref().is_some_and(|filter| !filter(&arc)) {
                continue;
            }
            let (Some(from), Some(to), Some(arcrole)) =
                (arc.from_label(), arc.to_label(), arc.arcrole())
            else {
                let error = classification_error(doc_uri, &elr, &arc);
                if self.lenient {
                    self.diagnostics.warning(&format!("arc missing from/to/arcrole: {error}"));
                    continue;
                }
                return Err(error.into());
            };
            let (Some(sources), Some(targets)) = (endpoints.get(from), endpoints.get(to)) else {
                let error = classification_error(doc_uri, &elr, &arc);
                if self.lenient {
                    self.diagnostics.warning(&format!("arc references unknown label: {error}"));
                    continue;
                }
                return Err(error.into());
            };

            let arcrole = arcrole.to_string();
            for source in sources {
                for target in targets {
                    let core = RelationshipCore {
                        arc: arc.clone(),
                        link_ename: link_ename.clone(),
                        arc_ename: arc.backing_elem().name().clone(),
                        elr: elr.clone(),
                        arcrole: arcrole.clone(),
                    };
                    if let Some(relationship) = self.classify(doc_uri, core, source, target)? {
                        out.push(relationship);
                    }
                }
            }
        }
        Ok(())
    }

    /// Two-level dispatch: link kind first, then arc name x arcrole.
    fn classify(
        &self,
        doc_uri: &Url,
        core: RelationshipCore,
        source: &XmlElem,
        target: &XmlElem,
    ) -> Result<Option<Relationship>, TaxonomyError> {
        if !ns::is_standard_extended_link(&core.link_ename) {
            return Ok(Some(non_standard(core, source, target)));
        }

        let Some(source_decl) =
            TaxonomyElem::classify(source.clone()).as_global_element_declaration().cloned()
        else {
            // Standard link, but the from-end is no concept. The closest
            // matching super-kind keeps fragment identity.
            return self.fallback(doc_uri, core, source, target, "standard arc with non-concept source");
        };

        let target_elem = TaxonomyElem::classify(target.clone());
        match target_elem {
            TaxonomyElem::XLinkResource(resource) => {
                let kind = match concept_resource_kind(&core) {
                    Some(kind) => kind,
                    None => {
                        return self.fallback(doc_uri, core, source, target, "unrecognized concept-resource arc");
                    }
                };
                Ok(Some(Relationship::Standard(StandardRelationship::ConceptResource(
                    ConceptResourceRelationship {
                        core,
                        kind,
                        source: source_decl,
                        resource: ResourceEnd::Standard(resource),
                    },
                ))))
            }
            TaxonomyElem::NonStandardResource(resource) => {
                let kind = match concept_resource_kind(&core) {
                    Some(kind) => kind,
                    None => {
                        return self.fallback(doc_uri, core, source, target, "unrecognized concept-resource arc");
                    }
                };
                Ok(Some(Relationship::Standard(StandardRelationship::ConceptResource(
                    ConceptResourceRelationship {
                        core,
                        kind,
                        source: source_decl,
                        resource: ResourceEnd::NonStandard(resource),
                    },
                ))))
            }
            TaxonomyElem::GlobalElementDeclaration(target_decl) => {
                let kind = match inter_concept_kind(&core) {
                    Some(kind) => kind,
                    None => {
                        return self.fallback(doc_uri, core, source, target, "unrecognized inter-concept arc");
                    }
                };
                Ok(Some(Relationship::Standard(StandardRelationship::InterConcept(
                    InterConceptRelationship { core, kind, source: source_decl, target: target_decl },
                ))))
            }
            _ => self.fallback(doc_uri, core, source, target, "standard arc with unrecognized target"),
        }
    }

    /// Lenient fallback for triples the dispatch table rejects: keep the
    /// closest super-kind. Inter-concept/resource mismatches degrade to the
    /// generic kinds; anything else degrades to a non-standard relationship.
    fn fallback(
        &self,
        doc_uri: &Url,
        core: RelationshipCore,
        source: &XmlElem,
        target: &XmlElem,
        reason: &str,
    ) -> Result<Option<Relationship>, TaxonomyError> {
        if !self.lenient {
            return Err(ArcClassificationError {
                doc_uri: doc_uri.clone(),
                elr: core.elr.clone(),
                arcrole: Some(core.arcrole.clone()),
                arc_ename: core.arc_ename.clone(),
            }
            .into());
        }
        self.diagnostics.warning(&format!(
            "{reason}: arcrole {} in {} ({doc_uri})",
            core.arcrole, core.elr
        ));

        let source_decl = TaxonomyElem::classify(source.clone()).as_global_element_declaration().cloned();
        let target_elem = TaxonomyElem::classify(target.clone());
        if let Some(source_decl) = source_decl {
            match target_elem {
                TaxonomyElem::GlobalElementDeclaration(target_decl) => {
                    return Ok(Some(Relationship::Standard(StandardRelationship::InterConcept(
                        InterConceptRelationship {
                            core,
                            kind: InterConceptKind::Other,
                            source: source_decl,
                            target: target_decl,
                        },
                    ))));
                }
                TaxonomyElem::XLinkResource(resource) => {
                    return Ok(Some(Relationship::Standard(StandardRelationship::ConceptResource(
                        ConceptResourceRelationship {
                            core,
                            kind: ConceptResourceKind::Other,
                            source: source_decl,
                            resource: ResourceEnd::Standard(resource),
                        },
                    ))));
                }
                TaxonomyElem::NonStandardResource(resource) => {
                    return Ok(Some(Relationship::Standard(StandardRelationship::ConceptResource(
                        ConceptResourceRelationship {
                            core,
                            kind: ConceptResourceKind::Other,
                            source: source_decl,
                            resource: ResourceEnd::NonStandard(resource),
                        },
                    ))));
                }
                _ => {}
            }
        }
        Ok(Some(non_standard(core, source, target)))
    }
}

/// Dispatch of standard inter-concept arcs by arc name x arcrole.
fn inter_concept_kind(core: &RelationshipCore) -> Option<InterConceptKind> {
    let arcrole = core.arcrole.as_str();
    if core.arc_ename == *LINK_DEFINITION_ARC {
        return match arcrole {
            arcrole::ALL => Some(InterConceptKind::HasHypercube { is_all: true }),
            arcrole::NOT_ALL => Some(InterConceptKind::HasHypercube { is_all: false }),
            arcrole::HYPERCUBE_DIMENSION => Some(InterConceptKind::HypercubeDimension),
            arcrole::DIMENSION_DOMAIN => Some(InterConceptKind::DimensionDomain),
            arcrole::DOMAIN_MEMBER => Some(InterConceptKind::DomainMember),
            arcrole::DIMENSION_DEFAULT => Some(InterConceptKind::DimensionDefault),
            arcrole::GENERAL_SPECIAL
            | arcrole::ESSENCE_ALIAS
            | arcrole::SIMILAR_TUPLES
            | arcrole::REQUIRES_ELEMENT => Some(InterConceptKind::Other),
            _ => None,
        };
    }
    if core.arc_ename == *LINK_PRESENTATION_ARC {
        return (arcrole == arcrole::PARENT_CHILD).then_some(InterConceptKind::ParentChild);
    }
    if core.arc_ename == *LINK_CALCULATION_ARC {
        return (arcrole == arcrole::SUMMATION_ITEM).then_some(InterConceptKind::Calculation);
    }
    None
}

fn concept_resource_kind(core: &RelationshipCore) -> Option<ConceptResourceKind> {
    if core.arc_ename == *LINK_LABEL_ARC && core.arcrole == arcrole::CONCEPT_LABEL {
        return Some(ConceptResourceKind::ConceptLabel);
    }
    if core.arc_ename == *LINK_REFERENCE_ARC && core.arcrole == arcrole::CONCEPT_REFERENCE {
        return Some(ConceptResourceKind::ConceptReference);
    }
    None
}

fn classification_error(doc_uri: &Url, elr: &str, arc: &XLinkArc) -> ArcClassificationError {
    ArcClassificationError {
        doc_uri: doc_uri.clone(),
        elr: elr.to_string(),
        arcrole: arc.arcrole().map(str::to_string),
        arc_ename: arc.backing_elem().name().clone(),
    }
}

fn non_standard(core: RelationshipCore, source: &XmlElem, target: &XmlElem) -> Relationship {
    Relationship::NonStandard(NonStandardRelationship {
        core,
        source: source.clone(),
        target: target.clone(),
    })
}
