//! Incremental radial layout.
//!
//! Newly discovered nodes fan out around the node that revealed them, away
//! from the graph's center. Placement is deterministic given the parent
//! position and the ordered new-node list, and deliberately ignores other
//! branches: dense graphs may overlap visually, which is accepted.

use std::f64::consts::PI;

use crate::graph::Position;

/// Horizontal interval between bootstrap roots. Roots start one interval from
/// the origin so the root test below (`y == 0 && x != 0`) holds for them all.
pub const ROOT_SPACING: f64 = 250.0;

const ROOT_SPREAD_RADIUS: f64 = 600.0;
const BRANCH_SPREAD_RADIUS: f64 = 500.0;
const ROOT_TOTAL_SPREAD: f64 = 0.8 * PI;
// Narrower fan for non-root expansions, reducing crossings with siblings
const BRANCH_TOTAL_SPREAD: f64 = PI / 1.5;

/// Positions for the bootstrap roots: a horizontal line at y = 0.
pub fn place_roots(count: usize) -> Vec<Position> {
    (0..count)
        .map(|i| Position::new((i as f64 + 1.0) * ROOT_SPACING, 0.0))
        .collect()
}

/// Whether a node was placed by the bootstrap rather than by an expansion.
fn is_root(position: Position) -> bool {
    position.y == 0.0 && position.x != 0.0
}

/// Positions for `count` genuinely new nodes revealed by expanding the node
/// at `parent`. Roots fan straight down; everything else fans outward along
/// the ray from the origin through the parent.
pub fn place_children(parent: Position, count: usize) -> Vec<Position> {
    if count == 0 {
        return Vec::new();
    }

    let root = is_root(parent);
    let center_angle = if root {
        PI / 2.0
    } else {
        parent.y.atan2(parent.x)
    };
    let radius = if root { ROOT_SPREAD_RADIUS } else { BRANCH_SPREAD_RADIUS };
    let total_spread = if root { ROOT_TOTAL_SPREAD } else { BRANCH_TOTAL_SPREAD };

    (0..count)
        .map(|i| {
            let offset = if count > 1 {
                (i as f64 - (count as f64 - 1.0) / 2.0) * (total_spread / (count as f64 + 1.0))
            } else {
                0.0
            };
            let angle = center_angle + offset;
            Position::new(
                parent.x + radius * angle.cos(),
                parent.y + radius * angle.sin(),
            )
        })
        .collect()
}
