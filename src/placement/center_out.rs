//! Center-out placement
//!
//! Vines are seeded near the middle of the grid and only accepted when the
//! head's straight run to the border is empty at placement time. Removing the
//! vines in reverse placement order therefore always succeeds, so no solver call
//! is needed while placing.

use crate::algorithm::feasibility::{ReachabilityLayer, has_clear_exit};
use crate::algorithm::selection::{
    CENTER_OUT_FORWARD_BONUS, CENTER_OUT_FREEDOM_WEIGHT, CENTER_OUT_TOP_PICK,
    CENTER_OUT_TURN_BONUS, SCORE_JITTER, ScoredCell, center_out_lengths, choose_center_seed,
    last_step, pick_scored,
};
use crate::algorithm::executor::RandomSelector;
use crate::io::configuration::MAX_PLACEMENT_ATTEMPTS;
use crate::io::error::Result;
use crate::placement::filler::{fill_edges, fill_gaps};
use crate::placement::{Placement, PlacementContext, PlacementStrategy, is_placeable, place_planned};
use crate::spatial::geometry::{Direction, Point, choose_exit_direction, directions_by_edge_distance, exit_ray};
use crate::spatial::grid::Occupancy;
use crate::spatial::vine::Vine;
use log::debug;

/// Center-out strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct CenterOut;

impl PlacementStrategy for CenterOut {
    fn name(&self) -> &'static str {
        "center-out"
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<Placement> {
        let config = ctx.config;
        let mut placement = Placement::new(config.width, config.height, config.mask.as_ref());
        let (low, high) = config.spec.avg_length_range;
        let lengths = center_out_lengths(
            config.width,
            config.height,
            config.min_coverage,
            (low + high) / 2,
            (config.vine_count, config.spec.vine_count_range.1),
            ctx.rng,
        );
        debug!("center-out: planned {} vines", lengths.len());

        place_planned(self, &lengths, &mut placement, ctx)?;
        let edge_fillers = fill_edges(&mut placement, ctx)?;
        let gap_fillers = fill_gaps(&mut placement, ctx)?;
        debug!(
            "center-out: {} vines after {edge_fillers} edge and {gap_fillers} gap fillers, coverage {:.3}",
            placement.len(),
            placement.coverage()
        );
        Ok(placement)
    }

    fn grow_vine(
        &self,
        id: &str,
        target_len: usize,
        placement: &Placement,
        ctx: &mut PlacementContext<'_>,
    ) -> Option<Vine> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            ctx.stats.placement_attempts += 1;
            let seed = choose_center_seed(&placement.occupancy, ctx.rng)?;
            if let Some(vine) = grow_from_seed(id, seed, target_len, &placement.occupancy, ctx.rng) {
                return Some(vine);
            }
        }
        None
    }
}

/// First direction whose exit run is empty and whose neck cell is free
///
/// The nearest edge is tried first, then the rest by edge distance.
fn clear_exit_direction(occupancy: &Occupancy, seed: Point) -> Option<Direction> {
    let (width, height) = (occupancy.width(), occupancy.height());
    let preferred = choose_exit_direction(seed, width, height);
    std::iter::once(preferred)
        .chain(directions_by_edge_distance(seed, width, height))
        .find(|&dir| {
            occupancy.is_exit_path_clear(seed, dir) && occupancy.is_free(seed.step(dir.opposite()))
        })
}

/// Grow a vine whose head sits at `seed` and whose exit run is clear
pub fn grow_from_seed(
    id: &str,
    seed: Point,
    target_len: usize,
    occupancy: &Occupancy,
    rng: &mut RandomSelector,
) -> Option<Vine> {
    if !occupancy.is_free(seed) {
        return None;
    }
    let direction = clear_exit_direction(occupancy, seed)?;
    let ray = exit_ray(seed, direction, occupancy.width(), occupancy.height());
    let mut path = vec![seed, seed.step(direction.opposite())];

    let mut layer = ReachabilityLayer::new(occupancy);
    layer.claim(&path);
    let mut baseline = layer.reachable_from_edges();

    while path.len() < target_len {
        let Some(&tail) = path.last() else {
            break;
        };
        let heading = last_step(&path);

        let mut candidates = Vec::new();
        for (dir, next) in Direction::ALL.into_iter().zip(tail.neighbors()) {
            if !layer.is_open(next) || ray.contains(&next) {
                continue;
            }
            // Candidates that cut off more than themselves would seal a pocket
            if layer.reachable_with(next) + 1 < baseline {
                continue;
            }
            let mut score = if heading == Some(dir) {
                CENTER_OUT_FORWARD_BONUS
            } else {
                CENTER_OUT_TURN_BONUS
            };
            let open = next.neighbors().into_iter().filter(|&n| layer.is_open(n)).count();
            score += CENTER_OUT_FREEDOM_WEIGHT * open as f64;
            score += rng.unit() * SCORE_JITTER;
            candidates.push(ScoredCell { cell: next, score });
        }

        let Some(next) = pick_scored(candidates, CENTER_OUT_TOP_PICK, rng) else {
            break;
        };
        path.push(next);
        layer.claim(&[next]);
        baseline = layer.reachable_from_edges();
    }

    let vine = Vine::new(id, direction, path);
    (is_placeable(&vine, occupancy) && has_clear_exit(occupancy, &vine.ordered_path, direction))
        .then_some(vine)
}
