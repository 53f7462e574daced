/*!
 * Sibling order reconstruction.
 *
 * Reference annotations that subdivide one parent only record who precedes
 * them. The orderer turns those predecessor pointers back into a sequence,
 * refusing any group that does not form exactly one chain.
 */

use std::collections::{HashMap, HashSet};

use crate::document::{AnnotationId, DocumentIndex, TierId};
use crate::errors::{ChainBreak, TimeError};

/// Reconstructs sibling order from predecessor pointers
pub struct SiblingOrderer<'a> {
    index: &'a DocumentIndex,
}

impl<'a> SiblingOrderer<'a> {
    pub fn new(index: &'a DocumentIndex) -> Self {
        Self { index }
    }

    /// Order every annotation whose `ref_parent` is `parent`.
    pub fn order(&self, parent: &AnnotationId) -> Result<Vec<AnnotationId>, TimeError> {
        self.ensure_known(parent)?;
        let group: Vec<&AnnotationId> = self.index.dependents(parent).iter().collect();
        self.chain(parent, &group)
    }

    /// Order the annotations under `parent` that belong to `tier`.
    ///
    /// Parents can carry dependents on several child tiers, each tier holding
    /// its own chain; this restricts the walk to one of them.
    pub fn order_within(
        &self,
        parent: &AnnotationId,
        tier: &TierId,
    ) -> Result<Vec<AnnotationId>, TimeError> {
        self.ensure_known(parent)?;
        let group: Vec<&AnnotationId> = self
            .index
            .dependents(parent)
            .iter()
            .filter(|id| {
                self.index
                    .annotation(id)
                    .is_some_and(|a| &a.parent_tier == tier)
            })
            .collect();
        self.chain(parent, &group)
    }

    fn ensure_known(&self, parent: &AnnotationId) -> Result<(), TimeError> {
        if self.index.annotation(parent).is_none() {
            return Err(TimeError::UnknownAnnotation(parent.clone()));
        }
        Ok(())
    }

    fn chain(
        &self,
        parent: &AnnotationId,
        group: &[&AnnotationId],
    ) -> Result<Vec<AnnotationId>, TimeError> {
        if group.is_empty() {
            return Ok(Vec::new());
        }

        let broken = |reason| TimeError::BrokenChain {
            parent: parent.clone(),
            reason,
        };

        let members: HashSet<&AnnotationId> = group.iter().copied().collect();
        let mut heads = Vec::new();
        let mut successor: HashMap<&AnnotationId, &AnnotationId> = HashMap::with_capacity(group.len());

        for &id in group {
            let predecessor = self
                .index
                .annotation(id)
                .and_then(|a| a.order_predecessor.as_ref());

            match predecessor {
                None => heads.push(id.clone()),
                Some(predecessor) => {
                    if !members.contains(predecessor) {
                        return Err(broken(ChainBreak::DanglingPredecessor {
                            annotation: id.clone(),
                            predecessor: predecessor.clone(),
                        }));
                    }
                    if successor.insert(predecessor, id).is_some() {
                        return Err(broken(ChainBreak::ForkedPredecessor(predecessor.clone())));
                    }
                }
            }
        }

        let head = match heads.len() {
            0 => return Err(broken(ChainBreak::NoHead)),
            1 => heads.remove(0),
            _ => return Err(broken(ChainBreak::MultipleHeads(heads))),
        };

        let mut ordered = Vec::with_capacity(group.len());
        ordered.push(head);
        // Bounded by the group size; a cycle among non-head members just stops short
        while ordered.len() < group.len() {
            let last = &ordered[ordered.len() - 1];
            match successor.get(last) {
                Some(&next) => ordered.push(next.clone()),
                None => break,
            }
        }

        if ordered.len() < group.len() {
            let placed: HashSet<&AnnotationId> = ordered.iter().collect();
            let unreachable = group
                .iter()
                .filter(|id| !placed.contains(**id))
                .map(|id| (*id).clone())
                .collect();
            return Err(broken(ChainBreak::Unreachable(unreachable)));
        }

        Ok(ordered)
    }
}
