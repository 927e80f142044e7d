//! The query facade: an immutable taxonomy snapshot with eager indices.
//!
//! A `BasicTaxonomy` never changes after construction; filtering and network
//! resolution return new instances. Queries are index lookups plus type
//! filters and never touch the parser again. Value lists inside the indices
//! keep the master relationship-list order.

use std::collections::{BTreeSet, HashMap, HashSet};

use taxoquery_core::{EName, XmlFragmentKey};
use tracing::warn;
use url::Url;

use crate::base::TaxonomyBase;
use crate::concept::{ConceptDeclaration, ConceptDeclarationBuilder};
use crate::element::GlobalElementDeclaration;
use crate::error::{MissingElementError, NetworkComputationError, TaxonomyError};
use crate::network::NetworkResolver;
use crate::relationship::{
    ConceptResourceKind, ConceptResourceRelationship, InterConceptKind, InterConceptRelationship,
    NonStandardRelationship, Relationship, StandardRelationship,
};

/// Read-only taxonomy with relationship and concept indices.
#[derive(Debug)]
pub struct BasicTaxonomy {
    base: TaxonomyBase,
    relationships: Vec<Relationship>,
    standard_by_source: HashMap<EName, Vec<usize>>,
    inter_concept_by_source: HashMap<EName, Vec<usize>>,
    inter_concept_by_target: HashMap<EName, Vec<usize>>,
    non_standard_by_source: HashMap<XmlFragmentKey, Vec<usize>>,
    non_standard_by_target: HashMap<XmlFragmentKey, Vec<usize>>,
    concept_declarations: Vec<ConceptDeclaration>,
    concept_declarations_by_ename: HashMap<EName, ConceptDeclaration>,
}

impl BasicTaxonomy {
    /// Build from a taxonomy base and its extracted relationships.
    ///
    /// Concept classification runs once, here. In lenient mode a
    /// structurally invalid declaration is skipped with a warning; in strict
    /// mode it fails the build.
    pub fn from_base_and_relationships(
        base: TaxonomyBase,
        relationships: Vec<Relationship>,
        lenient: bool,
    ) -> Result<Self, TaxonomyError> {
        let builder = ConceptDeclarationBuilder::new(base.net_substitution_group_map());
        let mut concept_declarations = Vec::new();
        for decl in base.global_element_declarations() {
            match builder.build(decl) {
                Ok(Some(concept)) => concept_declarations.push(concept),
                Ok(None) => {}
                Err(error) if lenient => {
                    warn!("skipping invalid concept declaration: {error}");
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(Self::with_parts(base, relationships, concept_declarations))
    }

    fn with_parts(
        base: TaxonomyBase,
        relationships: Vec<Relationship>,
        concept_declarations: Vec<ConceptDeclaration>,
    ) -> Self {
        let mut standard_by_source: HashMap<EName, Vec<usize>> = HashMap::new();
        let mut inter_concept_by_source: HashMap<EName, Vec<usize>> = HashMap::new();
        let mut inter_concept_by_target: HashMap<EName, Vec<usize>> = HashMap::new();
        let mut non_standard_by_source: HashMap<XmlFragmentKey, Vec<usize>> = HashMap::new();
        let mut non_standard_by_target: HashMap<XmlFragmentKey, Vec<usize>> = HashMap::new();

        for (index, relationship) in relationships.iter().enumerate() {
            match relationship {
                Relationship::Standard(standard) => {
                    standard_by_source
                        .entry(standard.source_ename().clone())
                        .or_default()
                        .push(index);
                    if let StandardRelationship::InterConcept(ic) = standard {
                        inter_concept_by_source
                            .entry(ic.source_ename().clone())
                            .or_default()
                            .push(index);
                        inter_concept_by_target
                            .entry(ic.target_ename().clone())
                            .or_default()
                            .push(index);
                    }
                }
                Relationship::NonStandard(ns) => {
                    non_standard_by_source.entry(ns.source_key()).or_default().push(index);
                    non_standard_by_target.entry(ns.target_key()).or_default().push(index);
                }
            }
        }

        let mut concept_declarations_by_ename = HashMap::new();
        for concept in &concept_declarations {
            concept_declarations_by_ename
                .entry(concept.target_ename().clone())
                .or_insert_with(|| concept.clone());
        }

        Self {
            base,
            relationships,
            standard_by_source,
            inter_concept_by_source,
            inter_concept_by_target,
            non_standard_by_source,
            non_standard_by_target,
            concept_declarations,
            concept_declarations_by_ename,
        }
    }

    pub fn base(&self) -> &TaxonomyBase {
        &self.base
    }

    /// The master relationship list, in extraction order.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    // ---------------------------------------------------------------------
    // Type-filtered scans (order-preserving)

    pub fn find_all_inter_concept_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.relationships.iter().filter_map(Relationship::as_inter_concept).collect()
    }

    pub fn find_all_inter_concept_relationships_of_kind(
        &self,
        kind: InterConceptKind,
    ) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships()
            .into_iter()
            .filter(|r| r.kind() == kind)
            .collect()
    }

    pub fn find_all_has_hypercube_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships()
            .into_iter()
            .filter(|r| r.kind().is_has_hypercube())
            .collect()
    }

    pub fn find_all_parent_child_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::ParentChild)
    }

    pub fn find_all_calculation_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::Calculation)
    }

    pub fn find_all_hypercube_dimension_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::HypercubeDimension)
    }

    pub fn find_all_dimension_domain_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::DimensionDomain)
    }

    pub fn find_all_domain_member_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::DomainMember)
    }

    pub fn find_all_dimension_default_relationships(&self) -> Vec<&InterConceptRelationship> {
        self.find_all_inter_concept_relationships_of_kind(InterConceptKind::DimensionDefault)
    }

    pub fn find_all_concept_resource_relationships(&self) -> Vec<&ConceptResourceRelationship> {
        self.relationships.iter().filter_map(Relationship::as_concept_resource).collect()
    }

    pub fn find_all_non_standard_relationships(&self) -> Vec<&NonStandardRelationship> {
        self.relationships.iter().filter_map(Relationship::as_non_standard).collect()
    }

    // ---------------------------------------------------------------------
    // Indexed lookups

    fn indexed<'a>(&'a self, indices: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Relationship> {
        indices.into_iter().flatten().map(|index| &self.relationships[*index])
    }

    pub fn find_outgoing_standard_relationships(&self, source: &EName) -> Vec<&StandardRelationship> {
        self.indexed(self.standard_by_source.get(source))
            .filter_map(Relationship::as_standard)
            .collect()
    }

    pub fn find_outgoing_inter_concept_relationships(&self, source: &EName) -> Vec<&InterConceptRelationship> {
        self.indexed(self.inter_concept_by_source.get(source))
            .filter_map(Relationship::as_inter_concept)
            .collect()
    }

    pub fn find_outgoing_inter_concept_relationships_of_kind(
        &self,
        source: &EName,
        kind: InterConceptKind,
    ) -> Vec<&InterConceptRelationship> {
        self.find_outgoing_inter_concept_relationships(source)
            .into_iter()
            .filter(|r| r.kind() == kind)
            .collect()
    }

    pub fn find_incoming_inter_concept_relationships(&self, target: &EName) -> Vec<&InterConceptRelationship> {
        self.indexed(self.inter_concept_by_target.get(target))
            .filter_map(Relationship::as_inter_concept)
            .collect()
    }

    pub fn find_incoming_inter_concept_relationships_of_kind(
        &self,
        target: &EName,
        kind: InterConceptKind,
    ) -> Vec<&InterConceptRelationship> {
        self.find_incoming_inter_concept_relationships(target)
            .into_iter()
            .filter(|r| r.kind() == kind)
            .collect()
    }

    pub fn find_outgoing_non_standard_relationships(&self, source: &XmlFragmentKey) -> Vec<&NonStandardRelationship> {
        self.indexed(self.non_standard_by_source.get(source))
            .filter_map(Relationship::as_non_standard)
            .collect()
    }

    pub fn find_incoming_non_standard_relationships(&self, target: &XmlFragmentKey) -> Vec<&NonStandardRelationship> {
        self.indexed(self.non_standard_by_target.get(target))
            .filter_map(Relationship::as_non_standard)
            .collect()
    }

    /// Concept labels of one concept, in extraction order.
    pub fn find_concept_labels(&self, concept: &EName) -> Vec<&ConceptResourceRelationship> {
        self.indexed(self.standard_by_source.get(concept))
            .filter_map(Relationship::as_concept_resource)
            .filter(|r| r.kind() == ConceptResourceKind::ConceptLabel)
            .collect()
    }

    pub fn find_concept_references(&self, concept: &EName) -> Vec<&ConceptResourceRelationship> {
        self.indexed(self.standard_by_source.get(concept))
            .filter_map(Relationship::as_concept_resource)
            .filter(|r| r.kind() == ConceptResourceKind::ConceptReference)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Concept declarations

    pub fn concept_declarations(&self) -> &[ConceptDeclaration] {
        &self.concept_declarations
    }

    pub fn find_concept_declaration(&self, ename: &EName) -> Option<&ConceptDeclaration> {
        self.concept_declarations_by_ename.get(ename)
    }

    /// Asserted-present variant of [`Self::find_concept_declaration`].
    pub fn get_concept_declaration(&self, ename: &EName) -> Result<&ConceptDeclaration, MissingElementError> {
        self.find_concept_declaration(ename)
            .ok_or_else(|| MissingElementError { what: format!("concept declaration {ename}") })
    }

    pub fn find_global_element_declaration(&self, ename: &EName) -> Option<&GlobalElementDeclaration> {
        self.base.find_global_element_declaration(ename)
    }

    // ---------------------------------------------------------------------
    // Dimensional queries

    /// Has-hypercube relationships applying to `concept`: its own, plus
    /// those inherited through incoming consecutive domain-member paths.
    ///
    /// For every domain-member relationship on such a path, the
    /// has-hypercubes of that relationship's source in that relationship's
    /// ELR count as inherited. Results keep extraction order.
    pub fn find_all_own_or_inherited_has_hypercubes(&self, concept: &EName) -> Vec<&InterConceptRelationship> {
        let mut found: BTreeSet<usize> = BTreeSet::new();
        self.collect_has_hypercubes_on_elr(concept, None, &mut found);

        // Backward walk over incoming domain-member relationships. The state
        // records the ELR the next (child-side) relationship lives in, which
        // the incoming one must effectively target.
        let mut stack: Vec<(EName, Option<String>)> = vec![(concept.clone(), None)];
        let mut visited: HashSet<(EName, Option<String>)> = HashSet::new();
        while let Some((current, required_target_role)) = stack.pop() {
            for rel in
                self.find_incoming_inter_concept_relationships_of_kind(&current, InterConceptKind::DomainMember)
            {
                if let Some(required) = &required_target_role {
                    if rel.effective_target_role() != required {
                        continue;
                    }
                }
                let ancestor = rel.source_ename().clone();
                self.collect_has_hypercubes_on_elr(&ancestor, Some(rel.elr()), &mut found);
                let state = (ancestor, Some(rel.elr().to_string()));
                if visited.insert(state.clone()) {
                    stack.push(state);
                }
            }
        }

        found
            .into_iter()
            .filter_map(|index| self.relationships[index].as_inter_concept())
            .collect()
    }

    fn collect_has_hypercubes_on_elr(&self, source: &EName, elr: Option<&str>, out: &mut BTreeSet<usize>) {
        if let Some(indices) = self.inter_concept_by_source.get(source) {
            for &index in indices {
                if let Some(rel) = self.relationships[index].as_inter_concept() {
                    if rel.kind().is_has_hypercube() && elr.is_none_or(|elr| rel.elr() == elr) {
                        out.insert(index);
                    }
                }
            }
        }
    }

    /// All members per dimension in the DRS of one has-hypercube.
    pub fn find_all_dimension_members(&self, hh: &InterConceptRelationship) -> HashMap<EName, HashSet<EName>> {
        self.dimension_members(hh)
            .into_iter()
            .map(|(dimension, members)| (dimension, members.into_keys().collect()))
            .collect()
    }

    /// Usable members per dimension in the DRS of one has-hypercube.
    ///
    /// An arc with `xbrldt:usable="false"` prunes its target only; the
    /// subtree below stays governed by its own arcs. A member targeted by
    /// several DRS arcs is usable if any of them says so.
    pub fn find_all_usable_dimension_members(&self, hh: &InterConceptRelationship) -> HashMap<EName, HashSet<EName>> {
        self.dimension_members(hh)
            .into_iter()
            .map(|(dimension, members)| {
                let usable = members
                    .into_iter()
                    .filter_map(|(member, usable)| usable.then_some(member))
                    .collect();
                (dimension, usable)
            })
            .collect()
    }

    /// DRS traversal: consecutive hypercube-dimension, dimension-domain and
    /// domain-member chains. Yields member -> "any arc targeting it usable".
    fn dimension_members(&self, hh: &InterConceptRelationship) -> HashMap<EName, HashMap<EName, bool>> {
        let mut result: HashMap<EName, HashMap<EName, bool>> = HashMap::new();
        if !hh.kind().is_has_hypercube() {
            return result;
        }
        for hd in self.find_outgoing_inter_concept_relationships_of_kind(
            hh.target_ename(),
            InterConceptKind::HypercubeDimension,
        ) {
            if !hh.is_followed_by(hd) {
                continue;
            }
            let members = result.entry(hd.target_ename().clone()).or_default();
            for dd in self.find_outgoing_inter_concept_relationships_of_kind(
                hd.target_ename(),
                InterConceptKind::DimensionDomain,
            ) {
                if !hd.is_followed_by(dd) {
                    continue;
                }
                self.collect_members(dd, members, &mut HashSet::new());
            }
        }
        result
    }

    fn collect_members(
        &self,
        rel: &InterConceptRelationship,
        members: &mut HashMap<EName, bool>,
        visited: &mut HashSet<(EName, String)>,
    ) {
        let member = rel.target_ename().clone();
        *members.entry(member.clone()).or_insert(false) |= rel.usable();

        let state = (member.clone(), rel.effective_target_role().to_string());
        if !visited.insert(state) {
            return;
        }
        for dm in
            self.find_outgoing_inter_concept_relationships_of_kind(&member, InterConceptKind::DomainMember)
        {
            if rel.is_followed_by(dm) {
                self.collect_members(dm, members, visited);
            }
        }
    }

    /// Dimension-default relationships of one dimension.
    pub fn find_all_dimension_defaults(&self, dimension: &EName) -> Vec<&InterConceptRelationship> {
        self.find_outgoing_inter_concept_relationships_of_kind(dimension, InterConceptKind::DimensionDefault)
    }

    // ---------------------------------------------------------------------
    // Sub-taxonomy filters

    /// Keep only the documents in `keep`; relationships and concept
    /// declarations from excluded documents drop out. The net
    /// substitution-group map travels along as the extras of the result, so
    /// concept classification stays faithful.
    #[must_use]
    pub fn filtering_document_uris(&self, keep: &HashSet<Url>) -> BasicTaxonomy {
        let base = self
            .base
            .filtering_document_uris(keep, self.base.net_substitution_group_map().clone());
        let relationships: Vec<Relationship> = self
            .relationships
            .iter()
            .filter(|r| keep.contains(r.doc_uri()))
            .cloned()
            .collect();
        let concepts = self
            .concept_declarations
            .iter()
            .filter(|c| keep.contains(c.global_element_declaration().doc_uri()))
            .cloned()
            .collect();
        Self::with_parts(base, relationships, concepts)
    }

    /// Keep only the relationships satisfying `p`; the DOM stays intact and
    /// derived indices are rebuilt from the survivors.
    #[must_use]
    pub fn filtering_relationships(&self, p: impl Fn(&Relationship) -> bool) -> BasicTaxonomy {
        let relationships: Vec<Relationship> =
            self.relationships.iter().filter(|&r| p(r)).cloned().collect();
        Self::with_parts(self.base.clone(), relationships, self.concept_declarations.clone())
    }

    /// Excise prohibited and overridden relationships per XBRL 2.1 network
    /// resolution. Applying the result to the same resolver again changes
    /// nothing.
    pub fn resolve_prohibition_and_overriding(
        &self,
        resolver: &dyn NetworkResolver,
    ) -> Result<BasicTaxonomy, NetworkComputationError> {
        let removals = resolver.compute_removals(&self.relationships)?;
        let removed: HashSet<usize> = removals.into_values().flatten().collect();
        let relationships: Vec<Relationship> = self
            .relationships
            .iter()
            .enumerate()
            .filter(|(index, _)| !removed.contains(index))
            .map(|(_, r)| r.clone())
            .collect();
        Ok(Self::with_parts(self.base.clone(), relationships, self.concept_declarations.clone()))
    }
}
