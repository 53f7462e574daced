/*!
 * Session facade over one loaded transcription document.
 *
 * A `Transcript` owns the document index and the interval cache. Readers
 * share the index; edits take it exclusively and clear the cache before
 * releasing it, so no reader ever sees an interval computed from stale data.
 *
 * - `listing`: ordered per-tier text listing with resolved start times
 * - `check`: per-annotation and per-tier failure report
 */

pub mod check;
pub mod listing;

use log::{debug, info};
use parking_lot::RwLock;

use crate::app_config::ResolutionConfig;
use crate::document::{
    Annotation, AnnotationId, DocumentIndex, DocumentTree, MarkerId, ResolvedInterval, Tier, TierId,
};
use crate::errors::{EditError, HierarchyError, MalformedDocument, TimeError};
use crate::hierarchy::sort_tiers;
use crate::timing::{IntervalCache, SiblingOrderer, TimeResolver};

pub use check::{run_check, CheckReport};
pub use listing::{build_listing, render_listing, ListingEntry, TierListing};

/// One loaded document with memoized time resolution
pub struct Transcript {
    // @field: Single source of truth for the document
    index: RwLock<DocumentIndex>,

    // @field: Resolved intervals, cleared on structural edits
    cache: IntervalCache,

    // @field: Optional override of the resolver hop limit
    hop_limit: Option<usize>,
}

impl Transcript {
    /// Load a parsed document with default resolution settings.
    pub fn load(tree: DocumentTree) -> Result<Self, MalformedDocument> {
        Self::load_with(tree, &ResolutionConfig::default())
    }

    /// Load a parsed document.
    pub fn load_with(tree: DocumentTree, config: &ResolutionConfig) -> Result<Self, MalformedDocument> {
        let index = DocumentIndex::build(tree)?;
        info!(
            "Loaded transcript with {} tiers and {} annotations",
            index.tier_count(),
            index.annotation_count()
        );

        Ok(Self {
            index: RwLock::new(index),
            cache: IntervalCache::new(config.cache_enabled),
            hop_limit: config.hop_limit,
        })
    }

    fn resolver<'a>(&'a self, index: &'a DocumentIndex) -> TimeResolver<'a> {
        let resolver = TimeResolver::new(index, &self.cache);
        match self.hop_limit {
            Some(limit) => resolver.with_hop_limit(limit),
            None => resolver,
        }
    }

    /// Concrete interval of an annotation.
    pub fn resolved_time(&self, id: &AnnotationId) -> Result<ResolvedInterval, TimeError> {
        let index = self.index.read();
        self.resolver(&index).resolve(id)
    }

    /// Dependents of `parent` in sibling order.
    pub fn order_siblings(&self, parent: &AnnotationId) -> Result<Vec<AnnotationId>, TimeError> {
        let index = self.index.read();
        SiblingOrderer::new(&index).order(parent)
    }

    /// Tiers in hierarchy order (parents before children).
    pub fn ordered_tiers(&self) -> Result<Vec<Tier>, HierarchyError> {
        let tiers: Vec<Tier> = self.index.read().tiers().cloned().collect();
        sort_tiers(tiers)
    }

    /// Tiers in document order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.index.read().tiers().cloned().collect()
    }

    pub fn annotation(&self, id: &AnnotationId) -> Option<Annotation> {
        self.index.read().annotation(id).cloned()
    }

    /// Annotations of a tier in document order.
    pub fn annotations_of(&self, tier: &TierId) -> Vec<Annotation> {
        self.index
            .read()
            .annotations_of(tier)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Direct child tiers of `tier`.
    pub fn child_tiers(&self, tier: &TierId) -> Vec<Tier> {
        self.index
            .read()
            .child_tiers(tier)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Largest recorded marker value, 0 if there is none.
    pub fn max_time(&self) -> u64 {
        self.index.read().max_time()
    }

    /// Replace an annotation's text. Resolved times stay valid.
    pub fn update_annotation_text(&self, id: &AnnotationId, text: &str) -> Result<(), EditError> {
        self.index.write().set_annotation_text(id, text)
    }

    /// Change a marker's time value and drop every resolved interval.
    pub fn set_marker_value(&self, id: &MarkerId, value_ms: Option<u64>) -> Result<(), EditError> {
        let mut index = self.index.write();
        index.set_marker_value(id, value_ms)?;
        self.cache.clear();
        debug!("Marker {} set to {:?}; interval cache invalidated", id, value_ms);
        Ok(())
    }

    /// Repoint a reference annotation's predecessor and drop every resolved interval.
    pub fn set_order_predecessor(
        &self,
        id: &AnnotationId,
        predecessor: Option<AnnotationId>,
    ) -> Result<(), EditError> {
        let mut index = self.index.write();
        index.set_order_predecessor(id, predecessor)?;
        self.cache.clear();
        debug!("Predecessor of {} changed; interval cache invalidated", id);
        Ok(())
    }

    /// Rebuild the document tree for export.
    pub fn to_tree(&self) -> DocumentTree {
        self.index.read().to_tree()
    }

    /// Cache statistics as (hits, misses, hit rate).
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.cache.stats()
    }
}
