//! Structural validation of complete levels
//!
//! Collects every problem instead of stopping at the first, so a validator run
//! reports a full picture of a broken level file.

use crate::analysis::blocking::BlockingGraph;
use crate::io::configuration::{MAX_GRID_CELLS, MIN_VINE_LENGTH};
use crate::io::error::{VineError, structural_violation};
use crate::spatial::geometry::{Direction, Point, exit_ray};
use crate::spatial::level::Level;
use std::collections::HashMap;

/// Check bounds, mask consistency, overlap, minimum length, head/neck
/// orientation, connectivity, circular blocking and self-blocking
///
/// Errors come back in a fixed order: per-cell problems in vine order, then
/// per-vine shape problems, then the circular blocking check, then self-blocking.
/// An unusable grid size is reported alone, since no cell check means anything
/// without a grid.
pub fn validate_structural(level: &Level) -> Vec<VineError> {
    let mut errors = Vec::new();
    let (width, height) = (level.width(), level.height());

    if level.checked_area().is_none() {
        errors.push(structural_violation(
            "",
            None,
            format!("grid size {width}x{height} must be non-empty and at most {MAX_GRID_CELLS} cells"),
        ));
        return errors;
    }

    let mut occupied: HashMap<Point, &str> = HashMap::new();
    for vine in &level.vines {
        for &cell in &vine.ordered_path {
            if !cell.in_bounds(width, height) {
                errors.push(structural_violation(
                    &vine.id,
                    Some(cell),
                    format!("cell {cell} out of bounds (grid {width}x{height})"),
                ));
                continue;
            }
            if !level.is_cell_visible(cell) {
                errors.push(structural_violation(
                    &vine.id,
                    Some(cell),
                    format!("cell {cell} is masked out but occupied"),
                ));
            }
            if let Some(existing) = occupied.get(&cell) {
                errors.push(structural_violation(
                    &vine.id,
                    Some(cell),
                    format!("cell {cell} overlaps with vine {existing}"),
                ));
            } else {
                occupied.insert(cell, &vine.id);
            }
        }
    }

    for vine in &level.vines {
        if vine.len() < MIN_VINE_LENGTH {
            errors.push(structural_violation(
                &vine.id,
                vine.head(),
                format!(
                    "vine has only {} segments (minimum {MIN_VINE_LENGTH})",
                    vine.len()
                ),
            ));
            continue;
        }

        if let (Some(head), Some(neck)) = (vine.head(), vine.neck()) {
            let expected = vine.head_direction.delta();
            let actual = (head.x - neck.x, head.y - neck.y);
            if actual != expected {
                errors.push(structural_violation(
                    &vine.id,
                    Some(head),
                    format!(
                        "head/neck mismatch: head={head} neck={neck} direction={} (expected delta ({},{}), got ({},{}))",
                        vine.head_direction, expected.0, expected.1, actual.0, actual.1
                    ),
                ));
            }
        }

        for (i, pair) in vine.ordered_path.windows(2).enumerate() {
            if let [prev, curr] = pair {
                let distance = prev.manhattan(*curr);
                if distance != 1 {
                    errors.push(structural_violation(
                        &vine.id,
                        Some(*curr),
                        format!(
                            "segments {}->{} not adjacent: {prev}->{curr} (manhattan={distance})",
                            i,
                            i + 1
                        ),
                    ));
                }
            }
        }
    }

    if let Some(chain) = BlockingGraph::build(&level.vines).cycles().into_iter().next() {
        errors.push(VineError::CircularBlocking { chain });
    }

    for vine in &level.vines {
        if let Some(cell) =
            self_blocking_cell(&vine.ordered_path, vine.head_direction, width, height)
        {
            errors.push(structural_violation(
                &vine.id,
                Some(cell),
                format!("self-blocking: segment at {cell} blocks head exit path"),
            ));
        }
    }

    errors
}

/// First body segment lying on the head's exit ray
fn self_blocking_cell(
    path: &[Point],
    direction: Direction,
    width: usize,
    height: usize,
) -> Option<Point> {
    let (&head, body) = path.split_first()?;
    let ray = exit_ray(head, direction, width, height);
    body.iter().copied().find(|cell| ray.contains(cell))
}
