/*!
 * Tier hierarchy ordering.
 *
 * Produces the display/export order of tiers: every root in input order,
 * each followed by its descendants, siblings kept in input order.
 */

use std::collections::HashMap;

use log::debug;

use crate::document::{Tier, TierId};
use crate::errors::HierarchyError;

/// Order tiers so that every tier comes after its parent.
///
/// Tiers that cannot be reached from a root (their parent is missing from the
/// input, or the parent graph loops) are reported instead of being dropped.
pub fn sort_tiers(tiers: Vec<Tier>) -> Result<Vec<Tier>, HierarchyError> {
    let order = {
        let mut children: HashMap<&TierId, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (position, tier) in tiers.iter().enumerate() {
            match &tier.parent_tier {
                Some(parent) => children.entry(parent).or_default().push(position),
                None => roots.push(position),
            }
        }

        let mut placed = vec![false; tiers.len()];
        let mut order = Vec::with_capacity(tiers.len());
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();

        while let Some(position) = stack.pop() {
            if placed[position] {
                continue;
            }
            placed[position] = true;
            order.push(position);

            if let Some(kids) = children.get(&tiers[position].id) {
                stack.extend(kids.iter().rev().copied().filter(|k| !placed[*k]));
            }
        }

        if order.len() < tiers.len() {
            let unplaced = tiers
                .iter()
                .zip(&placed)
                .filter(|(_, placed)| !**placed)
                .map(|(tier, _)| tier.id.clone())
                .collect();
            return Err(HierarchyError::InvalidHierarchy { unplaced });
        }
        order
    };

    let mut slots: Vec<Option<Tier>> = tiers.into_iter().map(Some).collect();
    let sorted: Vec<Tier> = order
        .into_iter()
        .filter_map(|position| slots[position].take())
        .collect();

    debug!("Sorted {} tiers into hierarchy order", sorted.len());
    Ok(sorted)
}

/// Nesting depth of each tier, roots at 0.
///
/// Expects hierarchy order (as returned by `sort_tiers`); a tier whose parent
/// has not been seen yet is treated as a root.
pub fn tier_depths(tiers: &[Tier]) -> HashMap<TierId, usize> {
    let mut depths: HashMap<TierId, usize> = HashMap::with_capacity(tiers.len());
    for tier in tiers {
        let depth = tier
            .parent_tier
            .as_ref()
            .and_then(|parent| depths.get(parent))
            .map_or(0, |d| d + 1);
        depths.insert(tier.id.clone(), depth);
    }
    depths
}
