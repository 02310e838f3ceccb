//! Direction-first placement
//!
//! Seeds favour the border. The exit direction points at the nearest edge and
//! the body grows backward from the head with weighted turns. Unlike center-out
//! the exit run may be occupied, so each candidate is checked against the
//! blocking graph to keep the layout free of deadlocks.

use crate::algorithm::executor::RandomSelector;
use crate::algorithm::selection::{
    DIRECTION_FIRST_FORWARD_BONUS, DIRECTION_FIRST_FREEDOM_WEIGHT, DIRECTION_FIRST_TOP_PICK,
    DIRECTION_FIRST_TURN_BONUS, SCORE_JITTER, ScoredCell, ZIG_ZAG_PENALTY,
    choose_edge_biased_seed, density_score, direction_first_lengths, last_step, pick_scored,
    previous_step,
};
use crate::analysis::blocking::BlockingGraph;
use crate::io::configuration::{EXTENSION_PASSES, MAX_PLACEMENT_ATTEMPTS};
use crate::io::error::Result;
use crate::placement::filler::{fill_edges, fill_gaps};
use crate::placement::{Placement, PlacementContext, PlacementStrategy, is_placeable, place_planned};
use crate::spatial::geometry::{Direction, Point, choose_exit_direction, exit_ray};
use crate::spatial::grid::Occupancy;
use crate::spatial::vine::Vine;
use log::debug;

/// Direction-first strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectionFirst;

impl PlacementStrategy for DirectionFirst {
    fn name(&self) -> &'static str {
        "direction-first"
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<Placement> {
        let config = ctx.config;
        let mut placement = Placement::new(config.width, config.height, config.mask.as_ref());
        let lengths = direction_first_lengths(
            config.width,
            config.height,
            config.min_coverage,
            (config.vine_count, config.spec.vine_count_range.1),
            config.spec.avg_length_range,
            ctx.rng,
        );
        debug!(
            "direction-first: planned {} vines totalling {} cells",
            lengths.len(),
            lengths.iter().sum::<usize>()
        );

        place_planned(self, &lengths, &mut placement, ctx)?;
        let extended = extend_tails(&mut placement, ctx.rng)?;
        let gap_fillers = fill_gaps(&mut placement, ctx)?;
        let edge_fillers = fill_edges(&mut placement, ctx)?;
        debug!(
            "direction-first: {extended} tail extensions, {gap_fillers} gap and {edge_fillers} edge fillers, coverage {:.3}",
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
            let seed = choose_edge_biased_seed(&placement.occupancy, ctx.rng)?;
            let Some(vine) = grow_from_seed(id, seed, target_len, &placement.occupancy, ctx.rng)
            else {
                continue;
            };
            if !closes_cycle(&placement.vines, &vine) {
                return Some(vine);
            }
        }
        None
    }
}

/// Check whether adding the candidate would create circular blocking
pub fn closes_cycle(vines: &[Vine], candidate: &Vine) -> bool {
    let mut all = vines.to_vec();
    all.push(candidate.clone());
    BlockingGraph::build(&all).has_cycle()
}

/// Grow a vine from `seed` with the head pointing at the nearest edge
pub fn grow_from_seed(
    id: &str,
    seed: Point,
    target_len: usize,
    occupancy: &Occupancy,
    rng: &mut RandomSelector,
) -> Option<Vine> {
    let (width, height) = (occupancy.width(), occupancy.height());
    let direction = choose_exit_direction(seed, width, height);
    let neck = seed.step(direction.opposite());
    if !occupancy.is_free(seed) || !occupancy.is_free(neck) {
        return None;
    }
    let ray = exit_ray(seed, direction, width, height);
    let mut path = vec![seed, neck];

    while path.len() < target_len {
        let Some(&tail) = path.last() else {
            break;
        };
        let heading = last_step(&path);
        let before = previous_step(&path);

        let mut candidates = Vec::new();
        for (dir, next) in Direction::ALL.into_iter().zip(tail.neighbors()) {
            if !occupancy.is_free(next) || path.contains(&next) || ray.contains(&next) {
                continue;
            }
            let mut score = if heading == Some(dir) {
                DIRECTION_FIRST_FORWARD_BONUS
            } else {
                DIRECTION_FIRST_TURN_BONUS
            };
            // Turning back the way the previous turn came from
            if heading != Some(dir) && before == Some(dir) && heading != before {
                score -= ZIG_ZAG_PENALTY;
            }
            let open = next
                .neighbors()
                .into_iter()
                .filter(|n| occupancy.is_free(*n) && !path.contains(n))
                .count();
            score += DIRECTION_FIRST_FREEDOM_WEIGHT * open as f64;
            score += density_score(occupancy, next);
            score += rng.unit() * SCORE_JITTER;
            candidates.push(ScoredCell { cell: next, score });
        }

        let Some(next) = pick_scored(candidates, DIRECTION_FIRST_TOP_PICK, rng) else {
            break;
        };
        path.push(next);
    }

    let vine = Vine::new(id, direction, path);
    is_placeable(&vine, occupancy).then_some(vine)
}

/// Grow existing tails into free neighbours
///
/// Up to `EXTENSION_PASSES` passes; an extension is kept only when the layout
/// stays free of circular blocking and self-blocking. Returns the number of
/// cells added.
///
/// # Errors
///
/// Returns a structural violation if an extended vine cannot be re-inserted
pub fn extend_tails(placement: &mut Placement, rng: &mut RandomSelector) -> Result<usize> {
    let mut added = 0;
    for _ in 0..EXTENSION_PASSES {
        let mut progress = false;
        for index in 0..placement.vines.len() {
            let Some(vine) = placement.vines.get(index).cloned() else {
                continue;
            };
            let Some(tail) = vine.tail() else {
                continue;
            };
            let options = placement.occupancy.free_neighbors(tail);
            let Some(&next) = options.get(rng.index(options.len())) else {
                continue;
            };

            let mut extended = vine.clone();
            extended.ordered_path.push(next);
            placement.occupancy.remove(&vine);
            let mut trial = placement.vines.clone();
            if let Some(slot) = trial.get_mut(index) {
                *slot = extended.clone();
            }
            let accepted = is_placeable(&extended, &placement.occupancy)
                && !BlockingGraph::build(&trial).has_cycle();

            if accepted {
                placement.occupancy.insert(&extended)?;
                placement.vines = trial;
                added += 1;
                progress = true;
            } else {
                placement.occupancy.insert(&vine)?;
            }
        }
        if !progress {
            break;
        }
    }
    Ok(added)
}
