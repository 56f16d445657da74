use std::cmp::Ordering;

use super::accumulator::VoteAccumulator;
use super::circles::CircleCandidate;

/// Collect the accumulator cells with at least `min_votes` votes as candidates,
/// strongest first.
///
/// Ties are broken by smaller radius, then smaller `center_x`, then smaller `center_y`.
pub fn collect_candidates<A: VoteAccumulator>(
    acc: &A,
    min_votes: f32,
    dp: f32,
    min_radius: u32,
) -> Vec<CircleCandidate> {
    let mut candidates = Vec::new();
    acc.for_each_cell(|bin, votes| {
        if votes as f32 >= min_votes {
            candidates.push(CircleCandidate {
                center_x: bin.x as f32 * dp,
                center_y: bin.y as f32 * dp,
                radius: min_radius + bin.r as u32,
                votes,
            });
        }
    });

    candidates.sort_by(compare_candidates);
    candidates
}

fn compare_candidates(a: &CircleCandidate, b: &CircleCandidate) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then(a.radius.cmp(&b.radius))
        .then(a.center_x.total_cmp(&b.center_x))
        .then(a.center_y.total_cmp(&b.center_y))
}

/// Greedily keep candidates whose center is at least `min_dist` away from every
/// center kept before. The radius plays no part.
pub fn suppress_close_centers(candidates: Vec<CircleCandidate>, min_dist: f32) -> Vec<CircleCandidate> {
    let mut accepted: Vec<CircleCandidate> = Vec::new();
    for candidate in candidates {
        let far_enough = accepted.iter().all(|other| {
            (candidate.center_x - other.center_x).hypot(candidate.center_y - other.center_y)
                >= min_dist
        });
        if far_enough {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Rank candidates gathered from several accumulators and suppress the close ones.
pub fn select_peaks(mut candidates: Vec<CircleCandidate>, min_dist: f32) -> Vec<CircleCandidate> {
    log::debug!("{} accumulator cells reach the vote threshold", candidates.len());
    candidates.sort_by(compare_candidates);
    suppress_close_centers(candidates, min_dist)
}
