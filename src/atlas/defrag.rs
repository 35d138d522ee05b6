//! Free-space defragmentation for the atlas.
//!
//! Two passes run after every release and every canvas growth:
//!
//! 1. Full-edge merging: two free rectangles whose shared edge is complete
//!    are exactly one rectangle, so they are replaced by their union until no
//!    such pair is left.
//! 2. Partial-edge improvement: for neighbours that only share part of an
//!    edge, the band they have in common can be merged while the overhangs
//!    stay behind as remainders. Such a move is adopted only when it makes the
//!    free set better, where "better" compares the rectangle areas sorted
//!    from largest to smallest, lexicographically.

use crate::geometry::Region;

/// Merge free rectangles that share a full edge until none do.
///
/// Returns the number of merges performed.
pub(crate) fn merge_full_edges(free: &mut Vec<Region>) -> usize {
    let mut merges = 0;
    'scan: loop {
        for i in 0..free.len() {
            for j in (i + 1)..free.len() {
                if let Some(merged) = free[i].merge_full_edge(free[j]) {
                    free[i] = merged;
                    free.swap_remove(j);
                    merges += 1;
                    continue 'scan;
                }
            }
        }
        break;
    }
    merges
}

/// Adopt improving partial-edge merges, at most `max_moves` of them.
///
/// Each iteration picks the single best move over all pairs. Returns the
/// number of moves adopted.
pub(crate) fn improve_partial_edges(free: &mut Vec<Region>, max_moves: usize) -> usize {
    let mut moves = 0;
    while moves < max_moves {
        let mut best: Option<(Vec<i64>, Vec<Region>)> = None;
        let mut current = area_profile(free);

        for i in 0..free.len() {
            for j in (i + 1)..free.len() {
                let Some(replacement) = partial_merge(free[i], free[j]) else {
                    continue;
                };
                let candidate: Vec<Region> = free
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i && *k != j)
                    .map(|(_, r)| *r)
                    .chain(replacement)
                    .collect();
                let profile = area_profile(&candidate);
                if profile > current {
                    current = profile.clone();
                    best = Some((profile, candidate));
                }
            }
        }

        let Some((_, candidate)) = best else {
            break;
        };
        *free = candidate;
        merge_full_edges(free);
        moves += 1;
    }

    if moves == max_moves && max_moves > 0 {
        tracing::debug!(max_moves, "atlas defragmentation stopped at its iteration cap");
    }
    moves
}

/// Merge the shared band of two neighbouring rectangles.
///
/// Returns the band followed by the non-empty overhangs of both inputs, or
/// `None` if the rectangles do not touch along a segment of positive length.
pub(crate) fn partial_merge(a: Region, b: Region) -> Option<Vec<Region>> {
    let side_by_side = if a.right() == b.x {
        Some((a, b))
    } else if b.right() == a.x {
        Some((b, a))
    } else {
        None
    };
    if let Some((left, right)) = side_by_side {
        let top = left.y.max(right.y);
        let bottom = left.bottom().min(right.bottom());
        if bottom > top {
            let mut out = vec![Region::new(left.x, top, left.width + right.width, bottom - top)];
            for r in [left, right] {
                out.push(Region::new(r.x, r.y, r.width, top - r.y));
                out.push(Region::new(r.x, bottom, r.width, r.bottom() - bottom));
            }
            out.retain(|r| !r.is_empty());
            return Some(out);
        }
    }

    let stacked = if a.bottom() == b.y {
        Some((a, b))
    } else if b.bottom() == a.y {
        Some((b, a))
    } else {
        None
    };
    if let Some((upper, lower)) = stacked {
        let left = upper.x.max(lower.x);
        let right = upper.right().min(lower.right());
        if right > left {
            let mut out = vec![Region::new(left, upper.y, right - left, upper.height + lower.height)];
            for r in [upper, lower] {
                out.push(Region::new(r.x, r.y, left - r.x, r.height));
                out.push(Region::new(right, r.y, r.right() - right, r.height));
            }
            out.retain(|r| !r.is_empty());
            return Some(out);
        }
    }

    None
}

/// Areas sorted largest first.
pub(crate) fn area_profile(rects: &[Region]) -> Vec<i64> {
    let mut areas: Vec<i64> = rects.iter().map(|r| r.area()).collect();
    areas.sort_unstable_by(|a, b| b.cmp(a));
    areas
}
