use log::warn;

use crate::app_config::DisplayConfig;
use crate::document::{AnnotationId, ResolvedInterval, TierId};
use crate::errors::TimeError;
use crate::hierarchy::tier_depths;
use crate::transcript::Transcript;

// @module: Ordered text listing of a transcript

/// One annotation line of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub annotation: AnnotationId,
    pub interval: Result<ResolvedInterval, TimeError>,
    pub text: String,
}

/// One tier of a listing with its annotations in document order
#[derive(Debug, Clone, PartialEq)]
pub struct TierListing {
    pub tier: TierId,
    pub depth: usize,
    pub entries: Vec<ListingEntry>,
}

/// Collect every tier in hierarchy order with resolved annotation times.
///
/// Failures do not abort the listing: an unorderable tier set falls back to
/// document order, and an unresolvable annotation keeps its error in place of
/// an interval.
pub fn build_listing(transcript: &Transcript) -> Vec<TierListing> {
    let tiers = match transcript.ordered_tiers() {
        Ok(tiers) => tiers,
        Err(e) => {
            warn!("{}; listing tiers in document order", e);
            transcript.tiers()
        }
    };
    let depths = tier_depths(&tiers);

    tiers
        .into_iter()
        .map(|tier| {
            let entries = transcript
                .annotations_of(&tier.id)
                .into_iter()
                .map(|annotation| {
                    let interval = transcript.resolved_time(&annotation.id);
                    if let Err(e) = &interval {
                        warn!("Using placeholder for {}: {}", annotation.id, e);
                    }
                    ListingEntry {
                        annotation: annotation.id,
                        interval,
                        text: annotation.payload_text,
                    }
                })
                .collect();

            TierListing {
                depth: depths.get(&tier.id).copied().unwrap_or(0),
                tier: tier.id,
                entries,
            }
        })
        .collect()
}

/// Render a listing as plain text, one annotation per line.
pub fn render_listing(listing: &[TierListing], display: &DisplayConfig) -> String {
    let mut out = String::new();

    for tier in listing {
        let indent = if display.indent_child_tiers {
            "  ".repeat(tier.depth)
        } else {
            String::new()
        };

        if display.show_tier_headers {
            out.push_str(&format!("{}[{}]\n", indent, tier.tier));
        }

        for entry in &tier.entries {
            let time = match &entry.interval {
                Ok(interval) => display.time_format.format(interval.start_ms),
                Err(_) => display.placeholder.clone(),
            };
            out.push_str(&format!("{}{}\t{}\n", indent, time, entry.text));
        }
    }

    out
}
