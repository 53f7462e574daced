/*!
 * Transcription document model and index.
 *
 * - `model`: parsed document tree and the entity types the engine works on
 * - `index`: id-keyed lookup tables built once per loaded document
 */

pub mod index;
pub mod model;

pub use index::DocumentIndex;
pub use model::{
    AlignableSpan, Annotation, AnnotationId, AnnotationKind, AnnotationNode, DocumentTree,
    MarkerId, MarkerNode, ReferenceLink, ResolvedInterval, Tier, TierId, TierNode, TimeMarker,
};
