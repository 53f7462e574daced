/*!
 * Document model types for time-aligned transcriptions.
 *
 * Two layers live here:
 * - the parsed document tree (`DocumentTree` and its nodes), which is what the
 *   parsing layer hands over and what the export layer writes back
 * - the entity types (`TimeMarker`, `Annotation`, `Tier`) the index stores,
 *   keyed by id
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a time marker (a time slot)
    MarkerId
);
entity_id!(
    /// Identifier of an annotation
    AnnotationId
);
entity_id!(
    /// Identifier of a tier
    TierId
);

/// Parsed transcription document as delivered by the parsing layer.
///
/// Attributes the engine does not interpret are kept in `extra` so that an
/// export writes them back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Time markers in document order
    #[serde(default)]
    pub time_markers: Vec<MarkerNode>,

    /// Tiers in document order, each holding its annotations
    #[serde(default)]
    pub tiers: Vec<TierNode>,

    /// Uninterpreted document attributes (header, media descriptors, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentTree {
    /// Create an empty document tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a time marker.
    pub fn with_marker(mut self, id: &str, value_ms: Option<u64>) -> Self {
        self.time_markers.push(MarkerNode {
            id: MarkerId::from(id),
            value: value_ms,
        });
        self
    }

    /// Append a tier.
    pub fn with_tier(mut self, tier: TierNode) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Total number of annotations across all tiers.
    pub fn annotation_count(&self) -> usize {
        self.tiers.iter().map(|t| t.annotations.len()).sum()
    }
}

/// A time marker as it appears in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerNode {
    pub id: MarkerId,

    /// Recorded time in milliseconds; absent markers are legal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

/// A tier as it appears in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierNode {
    pub id: TierId,

    /// Parent tier, if this tier is nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TierId>,

    /// Annotations in document order
    #[serde(default)]
    pub annotations: Vec<AnnotationNode>,

    /// Uninterpreted tier attributes (participant, linguistic type, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TierNode {
    /// Create a root tier with no annotations.
    pub fn new(id: &str) -> Self {
        Self {
            id: TierId::from(id),
            parent: None,
            annotations: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Nest this tier under `parent`.
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(TierId::from(parent));
        self
    }

    /// Append an annotation.
    pub fn with_annotation(mut self, annotation: AnnotationNode) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// An annotation as it appears in the document.
///
/// Exactly one of `alignable` and `reference` is expected to be present; the
/// index rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationNode {
    pub id: AnnotationId,

    /// Annotation text
    #[serde(default)]
    pub value: String,

    /// Boundary markers of a directly time-aligned annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignable: Option<AlignableSpan>,

    /// Parent link of an annotation that inherits its time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceLink>,

    /// Uninterpreted annotation attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationNode {
    /// Create an alignable annotation spanning `start`..`end`.
    pub fn alignable(id: &str, start: &str, end: &str, value: &str) -> Self {
        Self {
            id: AnnotationId::from(id),
            value: value.to_string(),
            alignable: Some(AlignableSpan {
                start: MarkerId::from(start),
                end: MarkerId::from(end),
            }),
            reference: None,
            extra: Map::new(),
        }
    }

    /// Create a reference annotation under `parent`, following `previous`.
    pub fn reference(id: &str, parent: &str, previous: Option<&str>, value: &str) -> Self {
        Self {
            id: AnnotationId::from(id),
            value: value.to_string(),
            alignable: None,
            reference: Some(ReferenceLink {
                parent: AnnotationId::from(parent),
                previous: previous.map(AnnotationId::from),
            }),
            extra: Map::new(),
        }
    }
}

/// Boundary markers of an alignable annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignableSpan {
    pub start: MarkerId,
    pub end: MarkerId,
}

/// Parent link of a reference annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLink {
    /// Annotation whose span this one subdivides or inherits
    pub parent: AnnotationId,

    /// Preceding sibling; `None` marks the first of the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<AnnotationId>,
}

/// A named time value owned by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMarker {
    pub id: MarkerId,
    pub value_ms: Option<u64>,
}

/// How an annotation obtains its time span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Span recorded directly by two markers
    Alignable { start: MarkerId, end: MarkerId },
    /// Span derived from a parent annotation
    Reference { parent: AnnotationId },
}

/// An annotation owned by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub parent_tier: TierId,
    pub kind: AnnotationKind,
    pub payload_text: String,

    /// Weak back-reference to the preceding sibling (id lookup only)
    pub order_predecessor: Option<AnnotationId>,

    pub(crate) extra: Map<String, Value>,
}

impl Annotation {
    /// Boundary markers when the annotation is alignable.
    pub fn alignable_span(&self) -> Option<(&MarkerId, &MarkerId)> {
        match &self.kind {
            AnnotationKind::Alignable { start, end } => Some((start, end)),
            AnnotationKind::Reference { .. } => None,
        }
    }

    /// Parent annotation when the annotation is a reference.
    pub fn ref_parent(&self) -> Option<&AnnotationId> {
        match &self.kind {
            AnnotationKind::Alignable { .. } => None,
            AnnotationKind::Reference { parent } => Some(parent),
        }
    }

    pub fn is_alignable(&self) -> bool {
        matches!(self.kind, AnnotationKind::Alignable { .. })
    }

    /// Rebuild the document node for export.
    pub(crate) fn to_node(&self) -> AnnotationNode {
        let (alignable, reference) = match &self.kind {
            AnnotationKind::Alignable { start, end } => (
                Some(AlignableSpan {
                    start: start.clone(),
                    end: end.clone(),
                }),
                None,
            ),
            AnnotationKind::Reference { parent } => (
                None,
                Some(ReferenceLink {
                    parent: parent.clone(),
                    previous: self.order_predecessor.clone(),
                }),
            ),
        };

        AnnotationNode {
            id: self.id.clone(),
            value: self.payload_text.clone(),
            alignable,
            reference,
            extra: self.extra.clone(),
        }
    }
}

/// A tier owned by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub id: TierId,
    pub parent_tier: Option<TierId>,

    /// Annotation ids in document order
    pub annotation_ids: Vec<AnnotationId>,

    pub(crate) extra: Map<String, Value>,
}

impl Tier {
    /// Create a tier with no annotations and no extra attributes.
    pub fn new(id: &str, parent_tier: Option<&str>) -> Self {
        Self {
            id: TierId::from(id),
            parent_tier: parent_tier.map(TierId::from),
            annotation_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_tier.is_none()
    }
}

/// Concrete time span of an annotation, `start_ms <= end_ms`.
///
/// Derived on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedInterval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl ResolvedInterval {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Length of the span. An inverted interval has length zero.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Split into `count` consecutive parts and return part `position`.
    ///
    /// Uses floor division on millisecond boundaries, so the parts partition
    /// the interval exactly. This is an equal-share approximation; the document
    /// does not record where inside the parent a sub-annotation really falls.
    pub fn subdivide(&self, position: usize, count: usize) -> Self {
        if count <= 1 {
            return *self;
        }
        let duration = u128::from(self.duration_ms());
        let n = count as u128;
        let offset = |k: u128| (k * duration / n) as u64;
        let k = position as u128;

        Self {
            start_ms: self.start_ms + offset(k),
            end_ms: self.start_ms + offset(k + 1),
        }
    }
}

impl fmt::Display for ResolvedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_ms, self.end_ms)
    }
}
