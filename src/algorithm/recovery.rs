//! Recovery from a vine that could not be placed
//!
//! Three escalating steps, each retrying the failing vine after removing some
//! accepted vines: targeted single removals, removal of the most recent window,
//! and cycle-breaking removals. Removed vines are not re-placed; later filler
//! passes reclaim their cells. When every step fails a failure dump is left in
//! the context for the orchestrator.

use crate::analysis::blocking::BlockingGraph;
use crate::io::configuration::CYCLE_BREAKER_MAX_COMBOS;
use crate::io::dump::FailureDump;
use crate::io::error::{Result, VineError};
use crate::placement::{Placement, PlacementContext, PlacementStrategy};
use log::{debug, warn};

/// Try to place the failing vine after freeing space
///
/// On success the new vine is pushed onto the placement.
///
/// # Errors
///
/// Returns `PlacementExhausted` when every recovery step failed; the placement
/// is then restored to its state on entry.
pub fn recover(
    strategy: &dyn PlacementStrategy,
    placement: &mut Placement,
    failing_id: &str,
    target_len: usize,
    ctx: &mut PlacementContext<'_>,
) -> Result<()> {
    let snapshot = placement.clone();

    if single_removals(strategy, placement, failing_id, target_len, ctx)? {
        return Ok(());
    }
    if window_removals(strategy, placement, failing_id, target_len, ctx)? {
        return Ok(());
    }
    *placement = snapshot.clone();
    if break_cycles(strategy, placement, failing_id, target_len, ctx)? {
        return Ok(());
    }
    *placement = snapshot;

    let message = format!(
        "could not place {failing_id} (length {target_len}) after {} backtracks",
        ctx.stats.backtracks_attempted
    );
    warn!("{message}");
    ctx.dump = Some(FailureDump::capture(
        ctx.config,
        ctx.attempt,
        failing_id,
        &message,
        &placement.occupancy,
        &placement.vines,
    ));
    Err(VineError::PlacementExhausted {
        vine_id: failing_id.to_string(),
        placed: placement.len(),
        dump: None,
    })
}

/// Remove the given vines and retry; restores them on failure
fn retry_without(
    strategy: &dyn PlacementStrategy,
    placement: &mut Placement,
    remove: &[String],
    failing_id: &str,
    target_len: usize,
    ctx: &mut PlacementContext<'_>,
) -> Result<bool> {
    ctx.stats.backtracks_attempted += 1;
    let snapshot = placement.clone();
    for id in remove {
        placement.remove(id);
    }
    if let Some(vine) = strategy.grow_vine(failing_id, target_len, placement, ctx) {
        debug!("recovered {failing_id} by removing {}", remove.join(", "));
        placement.push(vine)?;
        return Ok(true);
    }
    *placement = snapshot;
    Ok(false)
}

/// Remove one high-impact vine at a time
fn single_removals(
    strategy: &dyn PlacementStrategy,
    placement: &mut Placement,
    failing_id: &str,
    target_len: usize,
    ctx: &mut PlacementContext<'_>,
) -> Result<bool> {
    let candidates = BlockingGraph::build(&placement.vines)
        .backtrack_candidates(failing_id, ctx.config.backtrack_window);
    for candidate in candidates {
        if retry_without(
            strategy,
            placement,
            std::slice::from_ref(&candidate),
            failing_id,
            target_len,
            ctx,
        )? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Remove the most recent window of vines, widening on each attempt
fn window_removals(
    strategy: &dyn PlacementStrategy,
    placement: &mut Placement,
    failing_id: &str,
    target_len: usize,
    ctx: &mut PlacementContext<'_>,
) -> Result<bool> {
    let window = ctx.config.backtrack_window;
    for _ in 0..ctx.config.max_backtrack_attempts {
        if placement.len() < 2 {
            break;
        }
        let keep = placement.len().saturating_sub(window).max(1);
        let recent: Vec<String> = placement
            .vines
            .iter()
            .skip(keep)
            .map(|v| v.id.clone())
            .collect();
        for id in &recent {
            placement.remove(id);
        }
        ctx.stats.backtracks_attempted += 1;
        if let Some(vine) = strategy.grow_vine(failing_id, target_len, placement, ctx) {
            debug!("recovered {failing_id} after dropping {} recent vines", recent.len());
            placement.push(vine)?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Remove vines on blocking cycles: the shortest single vine first, then
/// bounded pairs and triplets ranked by impact
fn break_cycles(
    strategy: &dyn PlacementStrategy,
    placement: &mut Placement,
    failing_id: &str,
    target_len: usize,
    ctx: &mut PlacementContext<'_>,
) -> Result<bool> {
    let graph = BlockingGraph::build(&placement.vines);
    for chain in graph.cycles() {
        let shortest = chain
            .iter()
            .filter_map(|id| placement.vines.iter().find(|v| &v.id == id))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.id.cmp(&b.id)))
            .map(|v| v.id.clone());
        if let Some(id) = shortest {
            if retry_without(strategy, placement, &[id], failing_id, target_len, ctx)? {
                return Ok(true);
            }
        }

        for combo in ranked_combinations(&graph, placement, &chain) {
            if retry_without(strategy, placement, &combo, failing_id, target_len, ctx)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Pairs (and triplets for longer chains) scored by ten times the blocking
/// out-degree plus length, best first, fewer vines winning ties
pub fn ranked_combinations(
    graph: &BlockingGraph,
    placement: &Placement,
    chain: &[String],
) -> Vec<Vec<String>> {
    let max_size = if chain.len() >= 3 { 3 } else { chain.len().min(2) };
    let score = |ids: &[String]| -> usize {
        ids.iter()
            .map(|id| {
                let degree = graph.index_of(id).map_or(0, |i| graph.out_degree(i));
                let length = placement
                    .vines
                    .iter()
                    .find(|v| &v.id == id)
                    .map_or(0, |v| v.len());
                degree * 10 + length
            })
            .sum()
    };

    let mut combos: Vec<Vec<String>> = Vec::new();
    for size in 2..=max_size {
        combinations(chain, size, &mut Vec::new(), 0, &mut combos);
    }
    combos.sort_by(|a, b| score(b).cmp(&score(a)).then_with(|| a.len().cmp(&b.len())));
    combos.truncate(CYCLE_BREAKER_MAX_COMBOS);
    combos
}

fn combinations(
    items: &[String],
    size: usize,
    current: &mut Vec<String>,
    start: usize,
    out: &mut Vec<Vec<String>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for index in start..items.len() {
        if let Some(item) = items.get(index) {
            current.push(item.clone());
            combinations(items, size, current, index + 1, out);
            current.pop();
        }
    }
}
