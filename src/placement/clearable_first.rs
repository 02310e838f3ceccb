//! Clearable-first placement
//!
//! Anchors are seeded near the border, then the remaining space is filled with
//! arbitrary vines using skewed lengths, then leftover single cells are absorbed
//! by growing existing tails. Every acceptance is re-checked with the greedy
//! solver against all vines accepted before it.

use crate::algorithm::executor::RandomSelector;
use crate::algorithm::selection::{
    ANCHOR_EDGE_BUFFER, ScoredCell, choose_anchor_seed, choose_region_biased_seed,
    choose_sparse_seed, density_score, last_step, max_vine_length, pick_top_three,
    skewed_length, weighted_exit_direction,
};
use crate::algorithm::solver::is_solvable_greedy;
use crate::io::configuration::{
    EXTENSION_PASSES, MAX_CONSECUTIVE_FILL_FAILURES, MAX_PLACEMENT_ATTEMPTS,
};
use crate::io::difficulty::VarietyProfile;
use crate::io::error::Result;
use crate::placement::{Placement, PlacementContext, PlacementStrategy, is_placeable};
use crate::spatial::geometry::{Direction, Point, exit_ray};
use crate::spatial::grid::Occupancy;
use crate::spatial::vine::Vine;
use log::debug;

/// Share of the expected vine count placed as anchors
pub const ANCHOR_FRACTION: f64 = 0.3;
/// Cells per expected vine when sizing the anchor phase
pub const CELLS_PER_ANCHOR_ESTIMATE: usize = 5;
/// Cells per allowed two- or three-cell vine
pub const CELLS_PER_SHORT_VINE: usize = 50;
/// Fill failures after which seeds come from the sparsest cells
pub const SPARSE_SEED_AFTER: usize = 25;
/// Fill failures after which the short-vine cap is lifted
pub const SHORT_CAP_RELEASE_AFTER: usize = 20;
/// Score bonus for growing straight
pub const STRAIGHT_BONUS: f64 = 0.5;
/// Upper bound of the growth jitter
pub const GROWTH_JITTER: f64 = 0.3;

/// Clearable-first strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearableFirst;

impl PlacementStrategy for ClearableFirst {
    fn name(&self) -> &'static str {
        "clearable-first"
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<Placement> {
        let config = ctx.config;
        let mut placement = Placement::new(config.width, config.height, config.mask.as_ref());
        let area = placement.occupancy.visible_count();
        // Length-weighted draws capped at the tier's longest average
        let max_length = max_vine_length(config.width, config.height)
            .min(config.spec.avg_length_range.1)
            .max(4);
        let max_vines = config.max_vines();
        let max_short = (area / CELLS_PER_SHORT_VINE).max(1);
        let mut short_count = 0;

        // Anchors
        let anchor_target =
            ((((area / CELLS_PER_ANCHOR_ESTIMATE) as f64) * ANCHOR_FRACTION) as usize).max(2);
        let mut anchors = 0;
        for _ in 0..anchor_target * MAX_PLACEMENT_ATTEMPTS {
            if anchors >= anchor_target || placement.len() >= max_vines {
                break;
            }
            ctx.stats.placement_attempts += 1;
            let Some(seed) = choose_anchor_seed(&placement.occupancy, ANCHOR_EDGE_BUFFER, ctx.rng)
            else {
                break;
            };
            let remaining = placement.occupancy.visible_count() - placement.occupancy.occupied_count();
            let length = skewed_length(max_length, remaining, short_count, max_short, ctx.rng);
            if length <= 3 && short_count >= max_short {
                continue;
            }
            let id = placement.next_id();
            if let Some(vine) = try_grow(&id, seed, length, &placement, ctx) {
                if vine.len() <= 3 {
                    short_count += 1;
                }
                placement.push(vine)?;
                anchors += 1;
            }
        }
        debug!("clearable-first: {anchors}/{anchor_target} anchors placed");

        // Fill
        let mut failures = 0;
        for _ in 0..area * 2 {
            if placement.coverage() >= config.min_coverage
                || failures >= MAX_CONSECUTIVE_FILL_FAILURES
                || placement.len() >= max_vines
            {
                break;
            }
            ctx.stats.placement_attempts += 1;
            let seed = if failures > SPARSE_SEED_AFTER {
                choose_sparse_seed(&placement.occupancy, ctx.rng)
            } else {
                choose_region_biased_seed(&placement.occupancy, &config.profile, ctx.rng)
            };
            let Some(seed) = seed else {
                break;
            };
            let cap = if failures > SHORT_CAP_RELEASE_AFTER {
                usize::MAX
            } else {
                max_short
            };
            let remaining = placement.occupancy.visible_count() - placement.occupancy.occupied_count();
            let length = skewed_length(max_length, remaining, short_count, cap, ctx.rng);
            if length <= 3 && short_count >= cap {
                failures += 1;
                continue;
            }
            let id = placement.next_id();
            match try_grow(&id, seed, length, &placement, ctx) {
                Some(vine) => {
                    if vine.len() <= 3 {
                        short_count += 1;
                    }
                    placement.push(vine)?;
                    failures = 0;
                }
                None => failures += 1,
            }
        }

        let extended = extend_tails_checked(&mut placement, ctx.rng)?;
        debug!(
            "clearable-first: {} vines, {extended} tail extensions, coverage {:.3}",
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
            let seed =
                choose_region_biased_seed(&placement.occupancy, &ctx.config.profile, ctx.rng)?;
            if let Some(vine) = try_grow(id, seed, target_len, placement, ctx) {
                return Some(vine);
            }
        }
        None
    }
}

/// Grow from a seed and keep the vine only if the layout stays greedy-solvable
fn try_grow(
    id: &str,
    seed: Point,
    target_len: usize,
    placement: &Placement,
    ctx: &mut PlacementContext<'_>,
) -> Option<Vine> {
    let vine = grow_from_seed(
        id,
        seed,
        target_len,
        &placement.occupancy,
        &ctx.config.profile,
        ctx.rng,
    )?;
    ctx.stats.solvability_checks += 1;
    let mut trial = placement.vines.clone();
    trial.push(vine.clone());
    is_solvable_greedy(
        placement.occupancy.width(),
        placement.occupancy.height(),
        &trial,
        ctx.config.mask.as_ref(),
    )
    .then_some(vine)
}

/// Grow a vine from `seed`, heading toward a weighted choice of edge
///
/// The neck sits opposite the exit direction when that cell is free; otherwise
/// the head direction follows whichever free neighbour becomes the neck. Growth
/// prefers crowded cells near the border so the layout stays compact.
pub fn grow_from_seed(
    id: &str,
    seed: Point,
    target_len: usize,
    occupancy: &Occupancy,
    profile: &VarietyProfile,
    rng: &mut RandomSelector,
) -> Option<Vine> {
    if !occupancy.is_free(seed) {
        return None;
    }
    let (width, height) = (occupancy.width(), occupancy.height());
    let preferred = weighted_exit_direction(seed, width, height, profile, rng);
    let neck = if occupancy.is_free(seed.step(preferred.opposite())) {
        seed.step(preferred.opposite())
    } else {
        let options = occupancy.free_neighbors(seed);
        *options.get(rng.index(options.len()))?
    };
    let direction = Direction::between(neck, seed)?;
    let ray = exit_ray(seed, direction, width, height);
    let mut path = vec![seed, neck];

    while path.len() < target_len {
        let Some(&tail) = path.last() else {
            break;
        };
        let heading = last_step(&path);
        let candidates: Vec<ScoredCell> = Direction::ALL
            .into_iter()
            .zip(tail.neighbors())
            .filter(|(_, next)| occupancy.is_free(*next) && !path.contains(next) && !ray.contains(next))
            .map(|(dir, next)| {
                let straight = if heading == Some(dir) { STRAIGHT_BONUS } else { 0.0 };
                ScoredCell {
                    cell: next,
                    score: density_score(occupancy, next) + straight + rng.unit() * GROWTH_JITTER,
                }
            })
            .collect();
        let Some(next) = pick_top_three(candidates, rng) else {
            break;
        };
        path.push(next);
    }

    let vine = Vine::new(id, direction, path);
    is_placeable(&vine, occupancy).then_some(vine)
}

/// Grow tails into leftover cells, keeping each extension only when the
/// layout remains greedy-solvable
///
/// # Errors
///
/// Returns a structural violation if a vine cannot be re-inserted
pub fn extend_tails_checked(placement: &mut Placement, rng: &mut RandomSelector) -> Result<usize> {
    let (width, height) = (placement.occupancy.width(), placement.occupancy.height());
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
            let mut options = placement.occupancy.free_neighbors(tail);
            rng.shuffle(&mut options);

            placement.occupancy.remove(&vine);
            let mut kept = None;
            for next in options {
                let mut extended = vine.clone();
                extended.ordered_path.push(next);
                if !is_placeable(&extended, &placement.occupancy) {
                    continue;
                }
                let mut trial = placement.vines.clone();
                if let Some(slot) = trial.get_mut(index) {
                    *slot = extended.clone();
                }
                if is_solvable_greedy(width, height, &trial, None) {
                    kept = Some((extended, trial));
                    break;
                }
            }

            match kept {
                Some((extended, trial)) => {
                    placement.occupancy.insert(&extended)?;
                    placement.vines = trial;
                    added += 1;
                    progress = true;
                }
                None => placement.occupancy.insert(&vine)?,
            }
        }
        if !progress {
            break;
        }
    }
    Ok(added)
}
