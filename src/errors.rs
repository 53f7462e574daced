/*!
 * Error types for the elantime engine.
 *
 * Loading failures (`MalformedDocument`) are fatal to a document. Time,
 * ordering and hierarchy failures are reported per annotation or per tier
 * group so a caller can substitute a placeholder and carry on.
 */

use thiserror::Error;

use crate::document::{AnnotationId, MarkerId, TierId};

/// Errors that make a document impossible to index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedDocument {
    /// Two time markers share an id
    #[error("Duplicate time marker id: {0}")]
    DuplicateMarker(MarkerId),

    /// Two annotations share an id
    #[error("Duplicate annotation id: {0}")]
    DuplicateAnnotation(AnnotationId),

    /// Two tiers share an id
    #[error("Duplicate tier id: {0}")]
    DuplicateTier(TierId),

    /// Annotation is neither alignable nor a reference, or claims to be both
    #[error("Annotation {0} must be either alignable or a reference")]
    AmbiguousKind(AnnotationId),

    /// Alignable span names a marker that does not exist
    #[error("Annotation {annotation} references unknown time marker {marker}")]
    UnknownMarker {
        annotation: AnnotationId,
        marker: MarkerId,
    },

    /// Parent or predecessor id does not resolve
    #[error("Annotation {annotation} references unknown annotation {target}")]
    UnknownAnnotation {
        annotation: AnnotationId,
        target: AnnotationId,
    },

    /// Tier parent id does not resolve
    #[error("Tier {tier} has unknown parent tier {parent}")]
    UnknownParentTier { tier: TierId, parent: TierId },

    /// Tier parentage loops back on itself
    #[error("Tier {0} is part of a parent cycle")]
    CyclicTierParentage(TierId),
}

/// Why a sibling chain could not be ordered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainBreak {
    /// Every member has a predecessor
    #[error("no member without a predecessor")]
    NoHead,

    /// More than one member claims to be first
    #[error("multiple heads: {}", join_ids(.0))]
    MultipleHeads(Vec<AnnotationId>),

    /// A predecessor points outside the sibling group
    #[error("{annotation} follows {predecessor} which is not in the group")]
    DanglingPredecessor {
        annotation: AnnotationId,
        predecessor: AnnotationId,
    },

    /// Two members claim the same predecessor
    #[error("more than one member follows {0}")]
    ForkedPredecessor(AnnotationId),

    /// Members that the walk from the head never reaches
    #[error("members not reachable from the head: {}", join_ids(.0))]
    Unreachable(Vec<AnnotationId>),
}

/// Per-annotation time resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// A boundary marker has no recorded value
    #[error("Annotation {annotation} has no time: marker {marker} has no value")]
    UnresolvableTime {
        annotation: AnnotationId,
        marker: MarkerId,
    },

    /// The parent chain returns to an annotation it already passed
    #[error("Annotation {annotation} has a cyclic reference chain (detected after {hops} parent hops)")]
    CycleDetected { annotation: AnnotationId, hops: usize },

    /// The parent chain is longer than the configured hop limit
    #[error("Annotation {annotation} is more than {limit} parent hops from an alignable annotation")]
    HopLimitExceeded { annotation: AnnotationId, limit: usize },

    /// Sibling order could not be reconstructed
    #[error("Broken sibling chain under {parent}: {reason}")]
    BrokenChain { parent: AnnotationId, reason: ChainBreak },

    /// Start marker value lies after the end marker value
    #[error("Annotation {annotation} starts at {start_ms}ms but ends at {end_ms}ms")]
    InvertedInterval {
        annotation: AnnotationId,
        start_ms: u64,
        end_ms: u64,
    },

    /// Id not present in the index
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(AnnotationId),
}

/// Tier ordering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Tiers that could not be placed after their parent
    #[error("Invalid tier hierarchy; unplaced tiers: {}", join_ids(.unplaced))]
    InvalidHierarchy { unplaced: Vec<TierId> },
}

/// Errors raised by mutation hooks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(AnnotationId),

    #[error("Unknown time marker: {0}")]
    UnknownMarker(MarkerId),

    /// Edit would leave the document in a state the index rejects
    #[error("Rejected edit on {annotation}: {reason}")]
    Rejected {
        annotation: AnnotationId,
        reason: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Document could not be indexed
    #[error("Malformed document: {0}")]
    Document(#[from] MalformedDocument),

    /// Annotation time could not be resolved
    #[error("Time resolution error: {0}")]
    Time(#[from] TimeError),

    /// Tiers could not be ordered
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Mutation was refused
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
