//! Vine placement strategies
//!
//! Every strategy grows vines into a per-attempt [`Placement`], drawing all
//! randomness from the attempt's [`RandomSelector`]. Strategies that follow a
//! planned list of lengths share [`place_planned`], which routes failed vines
//! into the recovery subsystem.

use crate::algorithm::executor::{GenerationConfig, RandomSelector};
use crate::algorithm::feasibility::head_matches_direction;
use crate::algorithm::recovery::recover;
use crate::analysis::statistics::GenerationStats;
use crate::io::configuration::MIN_VINE_LENGTH;
use crate::io::dump::FailureDump;
use crate::io::error::Result;
use crate::spatial::geometry::blocks_own_exit;
use crate::spatial::grid::Occupancy;
use crate::spatial::mask::Mask;
use crate::spatial::vine::Vine;
use log::debug;

/// Center-out placement with the reverse-order clearing guarantee
pub mod center_out;
/// Edge anchors followed by greedy-checked fill
pub mod clearable_first;
/// Seeded growth toward the nearest edge
pub mod direction_first;
/// Edge fillers and gap filling
pub mod filler;

/// Vines accepted so far in one attempt, in placement order
#[derive(Clone, Debug)]
pub struct Placement {
    /// Accepted vines; index order is placement order
    pub vines: Vec<Vine>,
    /// Cells claimed by `vines`
    pub occupancy: Occupancy,
    next_id: usize,
}

impl Placement {
    /// Start an empty placement on a grid with an optional mask
    pub fn new(width: usize, height: usize, mask: Option<&Mask>) -> Self {
        Self {
            vines: Vec::new(),
            occupancy: Occupancy::with_mask(width, height, mask),
            next_id: 0,
        }
    }

    /// Reserve a fresh identifier
    ///
    /// Identifiers are never reused within an attempt, even after removals.
    pub fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("vine_{}", self.next_id)
    }

    /// Accept a vine
    ///
    /// # Errors
    ///
    /// Returns a structural violation if any of its cells are unavailable
    pub fn push(&mut self, vine: Vine) -> Result<()> {
        self.occupancy.insert(&vine)?;
        self.vines.push(vine);
        Ok(())
    }

    /// Remove a vine by identifier and release its cells
    pub fn remove(&mut self, id: &str) -> Option<Vine> {
        let index = self.vines.iter().position(|v| v.id == id)?;
        let vine = self.vines.remove(index);
        self.occupancy.remove(&vine);
        Some(vine)
    }

    /// Number of accepted vines
    pub const fn len(&self) -> usize {
        self.vines.len()
    }

    /// Check whether nothing has been placed yet
    pub const fn is_empty(&self) -> bool {
        self.vines.is_empty()
    }

    /// Covered fraction of the visible cells
    pub fn coverage(&self) -> f64 {
        self.occupancy.coverage()
    }

    /// Check whether any free cell still has a free neighbour
    pub fn has_room(&self) -> bool {
        self.occupancy
            .empty_cells()
            .into_iter()
            .any(|cell| self.occupancy.free_neighbor_count(cell) > 0)
    }
}

/// Mutable state threaded through one placement attempt
pub struct PlacementContext<'a> {
    /// Active configuration, including escalation adjustments
    pub config: &'a GenerationConfig,
    /// Attempt-scoped random source
    pub rng: &'a mut RandomSelector,
    /// Counters for the whole generation call
    pub stats: &'a mut GenerationStats,
    /// Zero-based whole-level attempt number
    pub attempt: usize,
    /// Dump captured by recovery when it gives up
    pub dump: Option<FailureDump>,
}

/// A way of filling a grid with vines
pub trait PlacementStrategy {
    /// Name used in logs and reports
    fn name(&self) -> &'static str;

    /// Fill a fresh grid according to the context's configuration
    ///
    /// # Errors
    ///
    /// Returns `PlacementExhausted` when recovery cannot place a planned vine
    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<Placement>;

    /// Grow one vine of roughly `target_len` cells against the current placement
    ///
    /// Returns `None` when no acceptable vine was found within the strategy's
    /// seed budget. Used both by the main loop and by recovery retries.
    fn grow_vine(
        &self,
        id: &str,
        target_len: usize,
        placement: &Placement,
        ctx: &mut PlacementContext<'_>,
    ) -> Option<Vine>;
}

/// Place vines for each planned length, recovering from failures
///
/// Stops early once the coverage target is met or no free cell pair remains.
///
/// # Errors
///
/// Returns `PlacementExhausted` when recovery gives up on a vine
pub fn place_planned(
    strategy: &dyn PlacementStrategy,
    lengths: &[usize],
    placement: &mut Placement,
    ctx: &mut PlacementContext<'_>,
) -> Result<()> {
    for &target_len in lengths {
        if placement.coverage() >= ctx.config.min_coverage {
            debug!(
                "{}: coverage target reached with {} vines",
                strategy.name(),
                placement.len()
            );
            break;
        }
        if !placement.has_room() {
            debug!("{}: no free cell pairs left", strategy.name());
            break;
        }

        let id = placement.next_id();
        match strategy.grow_vine(&id, target_len, placement, ctx) {
            Some(vine) => placement.push(vine)?,
            None => {
                debug!(
                    "{}: {id} (length {target_len}) failed, starting recovery",
                    strategy.name()
                );
                recover(strategy, placement, &id, target_len, ctx)?;
            }
        }
    }
    Ok(())
}

/// Rules every candidate must satisfy before it is accepted
///
/// Minimum length, head/neck orientation, no body segment on the head's exit
/// ray, and every cell free and visible.
pub fn is_placeable(vine: &Vine, occupancy: &Occupancy) -> bool {
    vine.len() >= MIN_VINE_LENGTH
        && head_matches_direction(&vine.ordered_path, vine.head_direction)
        && !blocks_own_exit(
            &vine.ordered_path,
            vine.head_direction,
            occupancy.width(),
            occupancy.height(),
        )
        && occupancy.check_cells(&vine.id, &vine.ordered_path).is_ok()
}
