/*!
 * Annotation time resolution.
 *
 * Alignable annotations carry their time directly through two markers.
 * Reference annotations inherit it from the parent they point at: a lone
 * dependent takes the whole parent span, a group of N ordered dependents
 * splits it into N equal parts. The equal split is an approximation, not
 * timing recovered from the file.
 */

use std::collections::HashSet;

use log::debug;

use crate::document::{
    Annotation, AnnotationId, AnnotationKind, DocumentIndex, MarkerId, ResolvedInterval,
};
use crate::errors::{ChainBreak, TimeError};
use crate::timing::cache::IntervalCache;
use crate::timing::siblings::SiblingOrderer;

/// Resolves concrete intervals for annotations of one index
pub struct TimeResolver<'a> {
    // @field: Document being resolved
    index: &'a DocumentIndex,

    // @field: Memo table shared across calls
    cache: &'a IntervalCache,

    // @field: Maximum parent hops from an annotation to its alignable root
    hop_limit: usize,
}

impl<'a> TimeResolver<'a> {
    /// Create a resolver whose hop limit equals the annotation count.
    ///
    /// No acyclic chain is longer than that, so the default limit only ever
    /// stops cycles.
    pub fn new(index: &'a DocumentIndex, cache: &'a IntervalCache) -> Self {
        Self {
            index,
            cache,
            hop_limit: index.annotation_count(),
        }
    }

    /// Use a tighter hop limit than the annotation count.
    pub fn with_hop_limit(mut self, hop_limit: usize) -> Self {
        self.hop_limit = hop_limit.min(self.index.annotation_count());
        self
    }

    /// Resolve the `[start, end)` interval of an annotation.
    ///
    /// Sibling groups are formed per tier: the dependents of a parent that sit
    /// on the same tier as the annotation split the parent span among
    /// themselves, and dependents on other child tiers split it independently.
    ///
    /// The hop limit is checked against the full parent chain before any
    /// cached ancestor is used, so the outcome never depends on earlier calls.
    pub fn resolve(&self, id: &AnnotationId) -> Result<ResolvedInterval, TimeError> {
        let chain = self.ancestry(id)?;

        // Nearest link of the chain whose interval is already known
        let mut known = None;
        for (depth, annotation) in chain.iter().enumerate() {
            if let Some(interval) = self.cache.get(&annotation.id) {
                known = Some((depth, interval));
                break;
            }
        }

        let (depth, mut interval) = match known {
            Some(found) => found,
            None => {
                let root = chain
                    .last()
                    .copied()
                    .ok_or_else(|| TimeError::UnknownAnnotation(id.clone()))?;
                let interval = self.alignable_interval(root)?;
                self.cache.store(&root.id, interval);
                (chain.len() - 1, interval)
            }
        };

        // Walk back down, subdividing at each level
        for annotation in chain[..depth].iter().rev() {
            interval = self.subdivide_for(annotation, interval)?;
        }

        debug!("Resolved {} to {} via {} hop(s)", id, interval, chain.len() - 1);
        Ok(interval)
    }

    // Parent chain from `id` up to its alignable root, `id` first
    fn ancestry(&self, id: &AnnotationId) -> Result<Vec<&'a Annotation>, TimeError> {
        let index: &'a DocumentIndex = self.index;
        let mut current = index
            .annotation(id)
            .ok_or_else(|| TimeError::UnknownAnnotation(id.clone()))?;
        let mut chain = vec![current];
        let mut seen: HashSet<&'a AnnotationId> = HashSet::from([&current.id]);

        while let AnnotationKind::Reference { parent } = &current.kind {
            let hops = chain.len();
            if hops > self.hop_limit {
                return Err(TimeError::HopLimitExceeded {
                    annotation: id.clone(),
                    limit: self.hop_limit,
                });
            }

            current = index
                .annotation(parent)
                .ok_or_else(|| TimeError::UnknownAnnotation(parent.clone()))?;
            if !seen.insert(&current.id) {
                return Err(TimeError::CycleDetected {
                    annotation: id.clone(),
                    hops,
                });
            }
            chain.push(current);
        }

        Ok(chain)
    }

    fn alignable_interval(&self, annotation: &Annotation) -> Result<ResolvedInterval, TimeError> {
        let (start, end) = match annotation.alignable_span() {
            Some(span) => span,
            None => return Err(TimeError::UnknownAnnotation(annotation.id.clone())),
        };

        let value_of = |marker: &MarkerId| {
            self.index
                .marker(marker)
                .and_then(|m| m.value_ms)
                .ok_or_else(|| TimeError::UnresolvableTime {
                    annotation: annotation.id.clone(),
                    marker: marker.clone(),
                })
        };
        let start_ms = value_of(start)?;
        let end_ms = value_of(end)?;

        if start_ms > end_ms {
            return Err(TimeError::InvertedInterval {
                annotation: annotation.id.clone(),
                start_ms,
                end_ms,
            });
        }

        Ok(ResolvedInterval::new(start_ms, end_ms))
    }

    // Stores the interval of every sibling in the group, not just `annotation`
    fn subdivide_for(
        &self,
        annotation: &Annotation,
        parent_interval: ResolvedInterval,
    ) -> Result<ResolvedInterval, TimeError> {
        let parent = match annotation.ref_parent() {
            Some(parent) => parent,
            None => return Ok(parent_interval),
        };

        let siblings = SiblingOrderer::new(self.index).order_within(parent, &annotation.parent_tier)?;
        let count = siblings.len();

        let mut own = None;
        for (position, sibling) in siblings.iter().enumerate() {
            let interval = parent_interval.subdivide(position, count);
            self.cache.store(sibling, interval);
            if sibling == &annotation.id {
                own = Some(interval);
            }
        }

        own.ok_or_else(|| TimeError::BrokenChain {
            parent: parent.clone(),
            reason: ChainBreak::Unreachable(vec![annotation.id.clone()]),
        })
    }
}
