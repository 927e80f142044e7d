//! Concept declarations: global element declarations classified through
//! substitution-group closure.

use taxoquery_core::EName;

use crate::base::SubstitutionGroupMap;
use crate::element::GlobalElementDeclaration;
use crate::error::InvalidConceptDeclaration;
use crate::ns::{XBRLDT_DIMENSION_ITEM, XBRLDT_HYPERCUBE_ITEM, XBRLI_ITEM, XBRLI_TUPLE};

/// A global element declaration in substitution group `xbrli:item` or
/// `xbrli:tuple`, directly or transitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConceptDeclaration {
    Tuple(GlobalElementDeclaration),
    /// Item that is neither hypercube nor dimension.
    PrimaryItem(GlobalElementDeclaration),
    Hypercube(GlobalElementDeclaration),
    /// Dimension with `xbrldt:typedDomainRef`.
    TypedDimension(GlobalElementDeclaration),
    ExplicitDimension(GlobalElementDeclaration),
}

impl ConceptDeclaration {
    pub fn global_element_declaration(&self) -> &GlobalElementDeclaration {
        match self {
            ConceptDeclaration::Tuple(d)
            | ConceptDeclaration::PrimaryItem(d)
            | ConceptDeclaration::Hypercube(d)
            | ConceptDeclaration::TypedDimension(d)
            | ConceptDeclaration::ExplicitDimension(d) => d,
        }
    }

    pub fn target_ename(&self) -> &EName {
        self.global_element_declaration().target_ename()
    }

    pub fn is_item(&self) -> bool {
        !matches!(self, ConceptDeclaration::Tuple(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, ConceptDeclaration::Tuple(_))
    }

    pub fn is_primary_item(&self) -> bool {
        matches!(self, ConceptDeclaration::PrimaryItem(_))
    }

    pub fn is_hypercube(&self) -> bool {
        matches!(self, ConceptDeclaration::Hypercube(_))
    }

    pub fn is_dimension(&self) -> bool {
        matches!(
            self,
            ConceptDeclaration::TypedDimension(_) | ConceptDeclaration::ExplicitDimension(_)
        )
    }
}

/// Classifies global element declarations against a net substitution-group
/// map.
#[derive(Clone, Debug)]
pub struct ConceptDeclarationBuilder<'a> {
    substitution_groups: &'a SubstitutionGroupMap,
}

impl<'a> ConceptDeclarationBuilder<'a> {
    pub fn new(substitution_groups: &'a SubstitutionGroupMap) -> Self {
        Self { substitution_groups }
    }

    /// Classify one declaration.
    ///
    /// Returns `Ok(None)` for declarations that are no concept at all, and
    /// an error for structurally contradictory substitution-group
    /// combinations.
    pub fn build(
        &self,
        decl: &GlobalElementDeclaration,
    ) -> Result<Option<ConceptDeclaration>, InvalidConceptDeclaration> {
        let Some(sg) = decl.substitution_group() else {
            return Ok(None);
        };
        let reaches = |root: &EName| self.substitution_groups.chain_reaches(&sg, root);

        let is_item = reaches(&XBRLI_ITEM);
        let is_tuple = reaches(&XBRLI_TUPLE);
        let is_hypercube = reaches(&XBRLDT_HYPERCUBE_ITEM);
        let is_dimension = reaches(&XBRLDT_DIMENSION_ITEM);

        let invalid = |reason: &str| InvalidConceptDeclaration {
            ename: decl.target_ename().clone(),
            reason: reason.to_string(),
        };

        if is_item && is_tuple {
            return Err(invalid("declaration is both item and tuple"));
        }
        if is_hypercube && is_dimension {
            return Err(invalid("declaration is both hypercube and dimension"));
        }
        if (is_hypercube || is_dimension) && !is_item {
            return Err(invalid("hypercubes and dimensions must be items"));
        }

        let concept = if is_tuple {
            Some(ConceptDeclaration::Tuple(decl.clone()))
        } else if is_hypercube {
            Some(ConceptDeclaration::Hypercube(decl.clone()))
        } else if is_dimension {
            if decl.typed_domain_ref().is_some() {
                Some(ConceptDeclaration::TypedDimension(decl.clone()))
            } else {
                Some(ConceptDeclaration::ExplicitDimension(decl.clone()))
            }
        } else if is_item {
            Some(ConceptDeclaration::PrimaryItem(decl.clone()))
        } else {
            None
        };
        Ok(concept)
    }
}
