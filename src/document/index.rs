/*!
 * Id-keyed lookup tables over a parsed document.
 *
 * The index is built once per loaded document and owns every marker,
 * annotation and tier. Everything else refers to entities by id.
 */

use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};

use crate::document::model::{
    Annotation, AnnotationId, AnnotationKind, DocumentTree, MarkerId, MarkerNode, TierId,
    TierNode, Tier, TimeMarker,
};
use crate::errors::{EditError, MalformedDocument};

/// Lookup tables for one loaded document
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    // @field: Markers by id
    markers: HashMap<MarkerId, TimeMarker>,

    // @field: Marker ids in document order
    marker_order: Vec<MarkerId>,

    // @field: Annotations by id
    annotations: HashMap<AnnotationId, Annotation>,

    // @field: Tiers by id
    tiers: HashMap<TierId, Tier>,

    // @field: Tier ids in document order
    tier_order: Vec<TierId>,

    // @field: Reference annotations grouped by ref_parent, document order
    dependents: HashMap<AnnotationId, Vec<AnnotationId>>,

    // @field: Uninterpreted document attributes
    extra: Map<String, Value>,
}

impl DocumentIndex {
    /// Build the index, validating every cross-reference.
    pub fn build(tree: DocumentTree) -> Result<Self, MalformedDocument> {
        let DocumentTree {
            time_markers,
            tiers: tier_nodes,
            extra,
        } = tree;

        let mut markers = HashMap::with_capacity(time_markers.len());
        let mut marker_order = Vec::with_capacity(time_markers.len());
        for MarkerNode { id, value } in time_markers {
            if markers.contains_key(&id) {
                return Err(MalformedDocument::DuplicateMarker(id));
            }
            marker_order.push(id.clone());
            markers.insert(id.clone(), TimeMarker { id, value_ms: value });
        }

        let mut annotations = HashMap::new();
        let mut tiers = HashMap::with_capacity(tier_nodes.len());
        let mut tier_order = Vec::with_capacity(tier_nodes.len());
        for node in tier_nodes {
            let tier = Self::index_tier(node, &mut annotations)?;
            if tiers.contains_key(&tier.id) {
                return Err(MalformedDocument::DuplicateTier(tier.id));
            }
            tier_order.push(tier.id.clone());
            tiers.insert(tier.id.clone(), tier);
        }

        let mut index = Self {
            markers,
            marker_order,
            annotations,
            tiers,
            tier_order,
            dependents: HashMap::new(),
            extra,
        };
        index.validate_annotations()?;
        index.validate_tiers()?;
        index.rebuild_dependents();

        debug!(
            "Indexed document: {} markers, {} annotations, {} tiers",
            index.markers.len(),
            index.annotations.len(),
            index.tiers.len()
        );

        Ok(index)
    }

    fn index_tier(
        node: TierNode,
        annotations: &mut HashMap<AnnotationId, Annotation>,
    ) -> Result<Tier, MalformedDocument> {
        let mut annotation_ids = Vec::with_capacity(node.annotations.len());

        for annotation in node.annotations {
            let (kind, order_predecessor) = match (annotation.alignable, annotation.reference) {
                (Some(span), None) => (
                    AnnotationKind::Alignable {
                        start: span.start,
                        end: span.end,
                    },
                    None,
                ),
                (None, Some(link)) => (AnnotationKind::Reference { parent: link.parent }, link.previous),
                _ => return Err(MalformedDocument::AmbiguousKind(annotation.id)),
            };

            if annotations.contains_key(&annotation.id) {
                return Err(MalformedDocument::DuplicateAnnotation(annotation.id));
            }

            annotation_ids.push(annotation.id.clone());
            annotations.insert(
                annotation.id.clone(),
                Annotation {
                    id: annotation.id,
                    parent_tier: node.id.clone(),
                    kind,
                    payload_text: annotation.value,
                    order_predecessor,
                    extra: annotation.extra,
                },
            );
        }

        Ok(Tier {
            id: node.id,
            parent_tier: node.parent,
            annotation_ids,
            extra: node.extra,
        })
    }

    // Walks annotations in document order so the first reported error is stable
    fn validate_annotations(&self) -> Result<(), MalformedDocument> {
        for annotation in self.annotations_in_document_order() {
            match &annotation.kind {
                AnnotationKind::Alignable { start, end } => {
                    for marker in [start, end] {
                        if !self.markers.contains_key(marker) {
                            return Err(MalformedDocument::UnknownMarker {
                                annotation: annotation.id.clone(),
                                marker: marker.clone(),
                            });
                        }
                    }
                }
                AnnotationKind::Reference { parent } => {
                    self.require_annotation(&annotation.id, parent)?;
                }
            }

            if let Some(predecessor) = &annotation.order_predecessor {
                self.require_annotation(&annotation.id, predecessor)?;
            }
        }
        Ok(())
    }

    fn require_annotation(
        &self,
        annotation: &AnnotationId,
        target: &AnnotationId,
    ) -> Result<(), MalformedDocument> {
        if self.annotations.contains_key(target) {
            Ok(())
        } else {
            Err(MalformedDocument::UnknownAnnotation {
                annotation: annotation.clone(),
                target: target.clone(),
            })
        }
    }

    fn validate_tiers(&self) -> Result<(), MalformedDocument> {
        for tier_id in &self.tier_order {
            let tier = &self.tiers[tier_id];
            if let Some(parent) = &tier.parent_tier {
                if !self.tiers.contains_key(parent) {
                    return Err(MalformedDocument::UnknownParentTier {
                        tier: tier.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // A forest has no parent chain longer than the tier count
        let limit = self.tiers.len();
        for tier_id in &self.tier_order {
            let mut current = self.tiers[tier_id].parent_tier.as_ref();
            let mut hops = 0;
            while let Some(parent) = current {
                hops += 1;
                if parent == tier_id || hops > limit {
                    return Err(MalformedDocument::CyclicTierParentage(tier_id.clone()));
                }
                current = self.tiers[parent].parent_tier.as_ref();
            }
        }
        Ok(())
    }

    fn rebuild_dependents(&mut self) {
        let mut dependents: HashMap<AnnotationId, Vec<AnnotationId>> = HashMap::new();
        for annotation in self.annotations_in_document_order() {
            if let Some(parent) = annotation.ref_parent() {
                dependents
                    .entry(parent.clone())
                    .or_default()
                    .push(annotation.id.clone());
            }
        }
        self.dependents = dependents;
    }

    fn annotations_in_document_order(&self) -> impl Iterator<Item = &Annotation> {
        self.tier_order
            .iter()
            .flat_map(|tier_id| self.tiers[tier_id].annotation_ids.iter())
            .map(|id| &self.annotations[id])
    }

    pub fn marker(&self, id: &MarkerId) -> Option<&TimeMarker> {
        self.markers.get(id)
    }

    pub fn annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    pub fn tier(&self, id: &TierId) -> Option<&Tier> {
        self.tiers.get(id)
    }

    /// Annotations of a tier in document order; empty for an unknown tier.
    pub fn annotations_of(&self, tier: &TierId) -> Vec<&Annotation> {
        self.tiers
            .get(tier)
            .map(|t| t.annotation_ids.iter().map(|id| &self.annotations[id]).collect())
            .unwrap_or_default()
    }

    /// Tiers in document order.
    pub fn tiers(&self) -> impl Iterator<Item = &Tier> {
        self.tier_order.iter().map(|id| &self.tiers[id])
    }

    /// Markers in document order.
    pub fn markers(&self) -> impl Iterator<Item = &TimeMarker> {
        self.marker_order.iter().map(|id| &self.markers[id])
    }

    /// Reference annotations whose `ref_parent` is `parent`, in document order.
    pub fn dependents(&self, parent: &AnnotationId) -> &[AnnotationId] {
        self.dependents
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Direct child tiers of `tier`, in document order.
    pub fn child_tiers(&self, tier: &TierId) -> Vec<&Tier> {
        self.tiers()
            .filter(|t| t.parent_tier.as_ref() == Some(tier))
            .collect()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Largest recorded marker value, or 0 when no marker has a value.
    pub fn max_time(&self) -> u64 {
        self.markers
            .values()
            .filter_map(|m| m.value_ms)
            .max()
            .unwrap_or(0)
    }

    /// Rebuild the document tree, in original order and with extras intact.
    pub fn to_tree(&self) -> DocumentTree {
        let time_markers = self
            .markers()
            .map(|m| MarkerNode {
                id: m.id.clone(),
                value: m.value_ms,
            })
            .collect();

        let tiers = self
            .tiers()
            .map(|tier| TierNode {
                id: tier.id.clone(),
                parent: tier.parent_tier.clone(),
                annotations: tier
                    .annotation_ids
                    .iter()
                    .map(|id| self.annotations[id].to_node())
                    .collect(),
                extra: tier.extra.clone(),
            })
            .collect();

        DocumentTree {
            time_markers,
            tiers,
            extra: self.extra.clone(),
        }
    }

    /// Replace an annotation's text. Timing structures are untouched.
    pub fn set_annotation_text(&mut self, id: &AnnotationId, text: &str) -> Result<(), EditError> {
        let annotation = self
            .annotations
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownAnnotation(id.clone()))?;
        annotation.payload_text = text.to_string();
        Ok(())
    }

    /// Record or clear a marker's time value.
    pub fn set_marker_value(&mut self, id: &MarkerId, value_ms: Option<u64>) -> Result<(), EditError> {
        let marker = self
            .markers
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownMarker(id.clone()))?;
        marker.value_ms = value_ms;
        Ok(())
    }

    /// Repoint a reference annotation's sibling predecessor.
    pub fn set_order_predecessor(
        &mut self,
        id: &AnnotationId,
        predecessor: Option<AnnotationId>,
    ) -> Result<(), EditError> {
        let annotation = self
            .annotations
            .get(id)
            .ok_or_else(|| EditError::UnknownAnnotation(id.clone()))?;

        if annotation.is_alignable() {
            return Err(EditError::Rejected {
                annotation: id.clone(),
                reason: "alignable annotations have no sibling order".to_string(),
            });
        }

        if let Some(predecessor) = &predecessor {
            if predecessor == id {
                return Err(EditError::Rejected {
                    annotation: id.clone(),
                    reason: "an annotation cannot follow itself".to_string(),
                });
            }
            if !self.annotations.contains_key(predecessor) {
                return Err(EditError::UnknownAnnotation(predecessor.clone()));
            }
        }

        if let Some(annotation) = self.annotations.get_mut(id) {
            annotation.order_predecessor = predecessor;
        }
        Ok(())
    }
}
