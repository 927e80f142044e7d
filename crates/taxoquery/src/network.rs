//! XBRL 2.1 network resolution: prohibition and overriding.
//!
//! Within one base set `(elr, arcrole, arc name, link name)`, relationships
//! backed by equivalent arcs form an equivalence class. The class's winning
//! priority is the maximum; a `use="prohibited"` arc at the winning priority
//! removes the whole class from the network, otherwise the class keeps
//! exactly its winning-priority relationships.

use std::collections::{BTreeSet, HashMap};

use crate::element::ArcUse;
use crate::error::NetworkComputationError;
use crate::relationship::{BaseSetKey, EquivalenceKey, Relationship};

/// Computes, per base set, the relationships removed by prohibition and
/// overriding.
pub trait NetworkResolver: Send + Sync {
    /// Indices into `relationships` that the resolved networks exclude,
    /// grouped by base set.
    fn compute_removals(
        &self,
        relationships: &[Relationship],
    ) -> Result<HashMap<BaseSetKey, BTreeSet<usize>>, NetworkComputationError>;
}

/// The XBRL 2.1 rules as written.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNetworkResolver;

impl NetworkResolver for DefaultNetworkResolver {
    fn compute_removals(
        &self,
        relationships: &[Relationship],
    ) -> Result<HashMap<BaseSetKey, BTreeSet<usize>>, NetworkComputationError> {
        let mut base_sets: HashMap<BaseSetKey, Vec<usize>> = HashMap::new();
        for (index, relationship) in relationships.iter().enumerate() {
            base_sets.entry(relationship.base_set_key()).or_default().push(index);
        }

        let mut removals: HashMap<BaseSetKey, BTreeSet<usize>> = HashMap::new();
        for (base_set, indices) in base_sets {
            let mut classes: HashMap<EquivalenceKey, Vec<usize>> = HashMap::new();
            for index in indices {
                classes.entry(relationships[index].equivalence_key()).or_default().push(index);
            }

            let mut removed: BTreeSet<usize> = BTreeSet::new();
            for class in classes.values() {
                resolve_class(relationships, class, &mut removed)?;
            }
            if !removed.is_empty() {
                removals.insert(base_set, removed);
            }
        }
        Ok(removals)
    }
}

fn resolve_class(
    relationships: &[Relationship],
    class: &[usize],
    removed: &mut BTreeSet<usize>,
) -> Result<(), NetworkComputationError> {
    let mut decorated = Vec::with_capacity(class.len());
    for &index in class {
        let relationship = &relationships[index];
        let arc = relationship.arc();
        let priority = arc.priority().map_err(|value| NetworkComputationError::InvalidPriority {
            elr: relationship.elr().to_string(),
            value,
        })?;
        let arc_use = arc.arc_use().map_err(|value| NetworkComputationError::InvalidUse {
            elr: relationship.elr().to_string(),
            value,
        })?;
        decorated.push((index, priority, arc_use));
    }

    let winning = decorated.iter().map(|(_, p, _)| *p).max().unwrap_or(0);
    let prohibited_wins = decorated
        .iter()
        .any(|(_, p, u)| *p == winning && *u == ArcUse::Prohibited);

    for (index, priority, arc_use) in decorated {
        let kept = !prohibited_wins && priority == winning && arc_use == ArcUse::Optional;
        if !kept {
            removed.insert(index);
        }
    }
    Ok(())
}
