use log::debug;
use serde::Serialize;

use crate::document::AnnotationId;
use crate::errors::{HierarchyError, TimeError};
use crate::transcript::Transcript;

// @module: Consistency report for a loaded transcript

/// Failures found in a loaded transcript
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Number of annotations examined
    pub annotations: usize,

    /// Number of annotations with a resolved time
    pub resolved: usize,

    /// Annotations whose time could not be resolved
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<(AnnotationId, TimeError)>,

    /// Tier ordering failure, if any
    #[serde(serialize_with = "serialize_hierarchy")]
    pub hierarchy: Option<HierarchyError>,

    /// Largest marker value in the document
    pub max_time_ms: u64,
}

impl CheckReport {
    /// True when every annotation resolved and the tiers could be ordered
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.hierarchy.is_none()
    }
}

/// Resolve every annotation and order the tiers, collecting every failure.
pub fn run_check(transcript: &Transcript) -> CheckReport {
    let mut report = CheckReport {
        max_time_ms: transcript.max_time(),
        ..CheckReport::default()
    };

    if let Err(e) = transcript.ordered_tiers() {
        report.hierarchy = Some(e);
    }

    for tier in transcript.tiers() {
        for id in &tier.annotation_ids {
            report.annotations += 1;
            match transcript.resolved_time(id) {
                Ok(_) => report.resolved += 1,
                Err(e) => report.failures.push((id.clone(), e)),
            }
        }
    }

    debug!(
        "Checked {} annotations: {} resolved, {} failed",
        report.annotations,
        report.resolved,
        report.failures.len()
    );
    report
}

fn serialize_failures<S>(failures: &[(AnnotationId, TimeError)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(failures.len()))?;
    for (id, error) in failures {
        map.serialize_entry(id, &error.to_string())?;
    }
    map.end()
}

fn serialize_hierarchy<S>(hierarchy: &Option<HierarchyError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match hierarchy {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
