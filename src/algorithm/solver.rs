//! Solvability search over vine removal orders
//!
//! A search state is a bitmask over vine indices where a set bit means the vine is
//! still on the grid. The initial state has every bit set and the goal state is zero.
//! Four variants share the movable test:
//! - exact breadth-first search for up to 24 vines
//! - weighted A* over the same range, exploring fewer states
//! - heuristic best-first search for 25 to 63 vines
//! - a greedy removal pass for larger levels and as a cheap generation pre-check
//!
//! Every variant stops on a state budget. Running out of budget is reported as
//! "gave up", which callers must read as "unknown", never as "unsolvable".

use crate::io::configuration::{
    DEFAULT_ASTAR_WEIGHT, EXACT_SOLVER_MAX_VINES, HEURISTIC_SOLVER_MAX_VINES, MAX_GRID_CELLS,
};
use crate::io::error::{Result, VineError, invalid_parameter};
use crate::spatial::geometry::{Point, advance, has_self_overlap};
use crate::spatial::level::Level;
use crate::spatial::mask::{Mask, MaskLookup};
use crate::spatial::vine::Vine;
use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::fmt;

/// Requested search variant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SolverMode {
    /// Pick by vine count: exact, heuristic, then greedy
    #[default]
    Auto,
    /// Breadth-first search, at most 24 vines
    Exact,
    /// Weighted A* up to 24 vines, automatic selection above
    #[value(name = "astar")]
    AStar,
    /// Best-first search with static blocking tie-breaks, at most 63 vines
    Heuristic,
    /// Single greedy removal pass at any size
    Greedy,
}

/// Search variant that produced a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SolverKind {
    /// Nothing to search, the level has no vines
    #[serde(rename = "none")]
    None,
    /// Breadth-first search
    #[serde(rename = "exact")]
    Exact,
    /// Weighted A*
    #[serde(rename = "exact-astar")]
    AStar,
    /// Heuristic best-first search
    #[serde(rename = "heuristic")]
    Heuristic,
    /// Greedy removal pass
    #[serde(rename = "greedy")]
    Greedy,
}

impl SolverKind {
    /// Name used in reports
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Exact => "exact",
            Self::AStar => "exact-astar",
            Self::Heuristic => "heuristic",
            Self::Greedy => "greedy",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a solvability query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SolveReport {
    /// A complete removal order was found
    pub solvable: bool,
    /// States taken off the frontier (greedy: rounds run)
    pub states_explored: usize,
    /// Variant that ran
    pub solver: SolverKind,
    /// The search stopped without a verdict
    pub gave_up: bool,
}

impl SolveReport {
    /// Check for a proof that no removal order exists
    pub const fn is_proven_unsolvable(&self) -> bool {
        !self.solvable && !self.gave_up
    }

    /// Convert an undecided report into a budget error
    ///
    /// # Errors
    ///
    /// Returns `SearchBudgetExhausted` when the search gave up
    pub fn require_verdict(self, max_states: usize) -> Result<Self> {
        if self.gave_up {
            return Err(VineError::SearchBudgetExhausted {
                solver: self.solver.as_str(),
                states_explored: self.states_explored,
                max_states,
            });
        }
        Ok(self)
    }
}

/// Immutable view of a vine layout prepared for repeated movable tests
pub struct SearchSpace<'a> {
    width: usize,
    height: usize,
    vines: &'a [Vine],
    /// Owning vine index per flat cell index
    owners: Vec<Option<usize>>,
    mask: Option<MaskLookup>,
}

impl<'a> SearchSpace<'a> {
    /// Prepare a layout for searching
    pub fn new(width: usize, height: usize, vines: &'a [Vine], mask: Option<&Mask>) -> Self {
        let mut owners = vec![None; width * height];
        for (index, vine) in vines.iter().enumerate() {
            for cell in &vine.ordered_path {
                if cell.in_bounds(width, height) {
                    let flat = cell.y as usize * width + cell.x as usize;
                    if let Some(slot) = owners.get_mut(flat) {
                        *slot = Some(index);
                    }
                }
            }
        }
        Self {
            width,
            height,
            vines,
            owners,
            mask: mask.map(Mask::lookup),
        }
    }

    /// Prepare a level for searching
    pub fn from_level(level: &'a Level) -> Self {
        Self::new(level.width(), level.height(), &level.vines, level.mask.as_ref())
    }

    /// Number of vines
    pub const fn len(&self) -> usize {
        self.vines.len()
    }

    /// Check for a layout without vines
    pub const fn is_empty(&self) -> bool {
        self.vines.is_empty()
    }

    /// State with every vine present
    pub fn full_state(&self) -> u64 {
        1u64.checked_shl(self.vines.len() as u32)
            .map_or(u64::MAX, |bit| bit - 1)
    }

    fn owner(&self, cell: Point) -> Option<usize> {
        if !cell.in_bounds(self.width, self.height) {
            return None;
        }
        self.owners
            .get(cell.y as usize * self.width + cell.x as usize)
            .copied()
            .flatten()
    }

    /// Check whether vine `index` can slide off the grid
    ///
    /// `present` reports which other vines are still on the grid. The walk runs
    /// for at most `width + height + length` steps.
    pub fn is_movable<F>(&self, index: usize, present: F) -> bool
    where
        F: Fn(usize) -> bool,
    {
        let Some(vine) = self.vines.get(index) else {
            return false;
        };
        if vine.is_empty() {
            return false;
        }

        let mut positions = vine.ordered_path.clone();
        let max_steps = self.width + self.height + vine.len();
        for _ in 0..max_steps {
            positions = advance(&positions, vine.head_direction);
            let Some(&head) = positions.first() else {
                return false;
            };
            if !head.in_bounds(self.width, self.height) {
                return true;
            }
            if has_self_overlap(&positions) {
                return false;
            }
            if self
                .owner(head)
                .is_some_and(|other| other != index && present(other))
            {
                return false;
            }
        }
        false
    }

    fn is_movable_in(&self, index: usize, state: u64) -> bool {
        self.is_movable(index, |other| is_present(state, other))
    }

    /// Present vines whose next head cell is held by another present vine or masked out
    fn blocked_count(&self, state: u64) -> usize {
        self.vines
            .iter()
            .enumerate()
            .filter(|&(index, _)| is_present(state, index))
            .filter(|&(index, vine)| {
                vine.target().is_some_and(|target| {
                    let masked = target.in_bounds(self.width, self.height)
                        && self.mask.as_ref().is_some_and(|m| !m.is_visible(target));
                    let held = self
                        .owner(target)
                        .is_some_and(|other| other != index && is_present(state, other));
                    masked || held
                })
            })
            .count()
    }

    fn priority(&self, state: u64, weight: usize) -> usize {
        self.blocked_count(state) * weight + state.count_ones() as usize
    }

    /// Number of vines each vine blocks in the full layout
    fn static_blocking(&self) -> Vec<usize> {
        let mut counts = vec![0; self.vines.len()];
        for (index, vine) in self.vines.iter().enumerate() {
            if let Some(blocker) = vine.target().and_then(|t| self.owner(t)) {
                if blocker != index {
                    if let Some(count) = counts.get_mut(blocker) {
                        *count += 1;
                    }
                }
            }
        }
        counts
    }

    /// Exhaustive breadth-first search
    pub fn breadth_first(&self, max_states: usize) -> SolveReport {
        let start = self.full_state();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut states = 0;

        while let Some(state) = queue.pop_front() {
            if states >= max_states {
                return undecided(SolverKind::Exact, states);
            }
            states += 1;
            if state == 0 {
                return solved(SolverKind::Exact, states);
            }
            for index in 0..self.vines.len() {
                if is_present(state, index) && self.is_movable_in(index, state) {
                    let next = state & !bit(index);
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        unsolved(SolverKind::Exact, states)
    }

    /// Weighted A* search
    ///
    /// Expands the state with the lowest `blocked * weight + remaining` first.
    pub fn weighted_astar(&self, max_states: usize, weight: usize) -> SolveReport {
        self.best_first(max_states, weight, SolverKind::AStar, None)
    }

    /// Best-first search preferring removals that free the most other vines
    pub fn heuristic(&self, max_states: usize) -> SolveReport {
        let freed = self.static_blocking();
        self.best_first(
            max_states,
            DEFAULT_ASTAR_WEIGHT,
            SolverKind::Heuristic,
            Some(&freed),
        )
    }

    fn best_first(
        &self,
        max_states: usize,
        weight: usize,
        kind: SolverKind,
        freed: Option<&[usize]>,
    ) -> SolveReport {
        let start = self.full_state();
        let mut visited = HashSet::from([start]);
        // (priority, tie-break, insertion order, state)
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0u64;
        frontier.push(Reverse((self.priority(start, weight), 0usize, sequence, start)));
        let mut states = 0;

        while let Some(Reverse((_, _, _, state))) = frontier.pop() {
            if states >= max_states {
                return undecided(kind, states);
            }
            states += 1;
            if state == 0 {
                return solved(kind, states);
            }
            for index in 0..self.vines.len() {
                if !is_present(state, index) || !self.is_movable_in(index, state) {
                    continue;
                }
                let next = state & !bit(index);
                if !visited.insert(next) {
                    continue;
                }
                let tie = freed
                    .and_then(|counts| counts.get(index))
                    .map_or(0, |&count| usize::MAX - count);
                sequence += 1;
                frontier.push(Reverse((self.priority(next, weight), tie, sequence, next)));
            }
        }

        unsolved(kind, states)
    }

    /// Repeated single passes removing every movable vine until a pass removes none
    ///
    /// A failure only means the pass got stuck, so it is reported as "gave up".
    pub fn greedy(&self) -> SolveReport {
        let mut present = vec![true; self.vines.len()];
        let mut remaining = self.vines.len();
        let mut rounds = 0;

        loop {
            rounds += 1;
            let mut removed = false;
            for index in 0..self.vines.len() {
                if !present.get(index).copied().unwrap_or(false) {
                    continue;
                }
                if self.is_movable(index, |other| present.get(other).copied().unwrap_or(false)) {
                    if let Some(flag) = present.get_mut(index) {
                        *flag = false;
                    }
                    remaining -= 1;
                    removed = true;
                }
            }
            if remaining == 0 {
                return solved(SolverKind::Greedy, rounds);
            }
            if !removed {
                return undecided(SolverKind::Greedy, rounds);
            }
        }
    }

    /// Check that the vines clear one by one in the given order
    pub fn clears_in_order(&self, order: &[usize]) -> bool {
        let mut present = vec![true; self.vines.len()];
        for &index in order {
            if !present.get(index).copied().unwrap_or(false) {
                return false;
            }
            if !self.is_movable(index, |other| present.get(other).copied().unwrap_or(false)) {
                return false;
            }
            if let Some(flag) = present.get_mut(index) {
                *flag = false;
            }
        }
        present.iter().all(|&p| !p)
    }
}

const fn bit(index: usize) -> u64 {
    if index < 64 { 1u64 << index } else { 0 }
}

const fn is_present(state: u64, index: usize) -> bool {
    state & bit(index) != 0
}

const fn solved(solver: SolverKind, states_explored: usize) -> SolveReport {
    SolveReport {
        solvable: true,
        states_explored,
        solver,
        gave_up: false,
    }
}

const fn unsolved(solver: SolverKind, states_explored: usize) -> SolveReport {
    SolveReport {
        solvable: false,
        states_explored,
        solver,
        gave_up: false,
    }
}

const fn undecided(solver: SolverKind, states_explored: usize) -> SolveReport {
    SolveReport {
        solvable: false,
        states_explored,
        solver,
        gave_up: true,
    }
}

/// Check solvability of a level with the requested variant
///
/// # Errors
///
/// Returns `InvalidParameter` when a forced variant cannot address the level's
/// vine count, the budget is zero, or the grid size is unusable
pub fn solve(level: &Level, max_states: usize, mode: SolverMode) -> Result<SolveReport> {
    if max_states == 0 {
        return Err(invalid_parameter(
            "max_states",
            &max_states,
            &"must be at least 1",
        ));
    }
    if level.checked_area().is_none() {
        return Err(invalid_parameter(
            "grid_size",
            &format!("{}x{}", level.width(), level.height()),
            &format!("must be non-empty and at most {MAX_GRID_CELLS} cells"),
        ));
    }
    let space = SearchSpace::from_level(level);
    let count = space.len();

    let report = match mode {
        SolverMode::Greedy => space.greedy(),
        SolverMode::Exact => {
            if count > EXACT_SOLVER_MAX_VINES {
                return Err(invalid_parameter(
                    "solver",
                    &"exact",
                    &format!("{count} vines exceeds the exact limit of {EXACT_SOLVER_MAX_VINES}"),
                ));
            }
            space.breadth_first(max_states)
        }
        SolverMode::Heuristic => {
            if count > HEURISTIC_SOLVER_MAX_VINES {
                return Err(invalid_parameter(
                    "solver",
                    &"heuristic",
                    &format!(
                        "{count} vines exceeds the heuristic limit of {HEURISTIC_SOLVER_MAX_VINES}"
                    ),
                ));
            }
            space.heuristic(max_states)
        }
        SolverMode::AStar if count > 0 && count <= EXACT_SOLVER_MAX_VINES => {
            space.weighted_astar(max_states, DEFAULT_ASTAR_WEIGHT)
        }
        SolverMode::AStar | SolverMode::Auto => auto_select(&space, max_states),
    };
    Ok(report)
}

fn auto_select(space: &SearchSpace<'_>, max_states: usize) -> SolveReport {
    match space.len() {
        0 => solved(SolverKind::None, 0),
        n if n <= EXACT_SOLVER_MAX_VINES => space.breadth_first(max_states),
        n if n <= HEURISTIC_SOLVER_MAX_VINES => space.heuristic(max_states),
        _ => space.greedy(),
    }
}

/// Greedy pre-check used during generation
pub fn is_solvable_greedy(width: usize, height: usize, vines: &[Vine], mask: Option<&Mask>) -> bool {
    SearchSpace::new(width, height, vines, mask).greedy().solvable
}
