//! Short vines that close the gaps left by the main placement loop
//!
//! Every filler is placed with an empty exit run, so it can always be cleared
//! before anything placed earlier. Adding fillers after the main loop never
//! affects the solvability of the vines already accepted.

use crate::algorithm::executor::RandomSelector;
use crate::algorithm::feasibility::has_clear_exit;
use crate::io::configuration::GAP_FILL_PASSES;
use crate::io::error::Result;
use crate::placement::{Placement, PlacementContext, is_placeable};
use crate::spatial::geometry::{Direction, Point, directions_by_edge_distance, distance_to_edge, exit_ray};
use crate::spatial::grid::Occupancy;
use crate::spatial::vine::Vine;

/// Shortest gap vine tried before falling back to two cells
pub const GAP_VINE_MIN: usize = 3;
/// Longest gap vine
pub const GAP_VINE_MAX: usize = 5;

/// Place two-cell vines on the border, heads facing outward
///
/// Stops once the placement holds the configured maximum number of vines.
/// Returns the number of fillers placed.
///
/// # Errors
///
/// Returns a structural violation if an accepted filler cannot be inserted
pub fn fill_edges(placement: &mut Placement, ctx: &mut PlacementContext<'_>) -> Result<usize> {
    let mut cells: Vec<Point> = placement
        .occupancy
        .empty_cells()
        .into_iter()
        .filter(|&cell| placement.occupancy.is_edge(cell))
        .collect();
    ctx.rng.shuffle(&mut cells);

    let limit = ctx.config.max_vines();
    let mut placed = 0;
    for cell in cells {
        if placement.len() >= limit {
            break;
        }
        ctx.stats.placement_attempts += 1;
        let id = placement.next_id();
        if let Some(vine) = edge_filler(&id, cell, &placement.occupancy) {
            placement.push(vine)?;
            placed += 1;
        }
    }
    Ok(placed)
}

/// Two-cell vine on a border cell facing off the grid
pub fn edge_filler(id: &str, cell: Point, occupancy: &Occupancy) -> Option<Vine> {
    if !occupancy.is_free(cell) {
        return None;
    }
    let (width, height) = (occupancy.width(), occupancy.height());
    Direction::ALL
        .into_iter()
        .filter(|&dir| distance_to_edge(cell, dir, width, height) == 0)
        .map(|dir| Vine::new(id, dir, vec![cell, cell.step(dir.opposite())]))
        .find(|vine| is_placeable(vine, occupancy))
}

/// Grow leftover cells into short vines with clear exits
///
/// Each pass visits the empty cells in shuffled order and tries a three to
/// five cell vine first, then a two-cell one. Passes stop early when one makes
/// no progress or the vine limit is reached. Returns the number of vines placed.
///
/// # Errors
///
/// Returns a structural violation if an accepted filler cannot be inserted
pub fn fill_gaps(placement: &mut Placement, ctx: &mut PlacementContext<'_>) -> Result<usize> {
    let limit = ctx.config.max_vines();
    let mut placed = 0;
    for _ in 0..GAP_FILL_PASSES {
        let mut cells = placement.occupancy.empty_cells();
        ctx.rng.shuffle(&mut cells);

        let mut progress = false;
        for cell in cells {
            if placement.len() >= limit {
                return Ok(placed);
            }
            ctx.stats.placement_attempts += 1;
            let target_len = ctx.rng.range(GAP_VINE_MIN, GAP_VINE_MAX);
            let id = placement.next_id();
            let vine = gap_vine(&id, cell, target_len, &placement.occupancy, ctx.rng)
                .or_else(|| gap_vine(&id, cell, 2, &placement.occupancy, ctx.rng));
            if let Some(vine) = vine {
                placement.push(vine)?;
                placed += 1;
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }
    Ok(placed)
}

/// Vine headed at `cell` with a clear exit and a body of up to `target_len` cells
///
/// The body hugs the most enclosed free cells so small pockets fill first.
/// Returns `None` unless the result reaches `target_len` or is a two-cell filler.
pub fn gap_vine(
    id: &str,
    cell: Point,
    target_len: usize,
    occupancy: &Occupancy,
    rng: &mut RandomSelector,
) -> Option<Vine> {
    if !occupancy.is_free(cell) {
        return None;
    }
    let (width, height) = (occupancy.width(), occupancy.height());

    for direction in directions_by_edge_distance(cell, width, height) {
        let neck = cell.step(direction.opposite());
        if !occupancy.is_exit_path_clear(cell, direction) || !occupancy.is_free(neck) {
            continue;
        }
        let ray = exit_ray(cell, direction, width, height);
        let mut path = vec![cell, neck];

        while path.len() < target_len {
            let Some(&tail) = path.last() else {
                break;
            };
            let mut options: Vec<Point> = occupancy
                .free_neighbors(tail)
                .into_iter()
                .filter(|n| !path.contains(n) && !ray.contains(n))
                .collect();
            if options.is_empty() {
                break;
            }
            rng.shuffle(&mut options);
            options.sort_by_key(|&n| occupancy.free_neighbor_count(n));
            if let Some(&next) = options.first() {
                path.push(next);
            }
        }

        if path.len() != target_len {
            continue;
        }
        let vine = Vine::new(id, direction, path);
        if is_placeable(&vine, occupancy) && has_clear_exit(occupancy, &vine.ordered_path, direction) {
            return Some(vine);
        }
    }
    None
}
