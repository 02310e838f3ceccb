use crate::algorithm::executor::RandomSelector;
use crate::io::configuration::MIN_VINE_LENGTH;
use crate::io::difficulty::{RegionBias, VarietyProfile};
use crate::spatial::geometry::{Direction, Point, distance_to_edge};
use crate::spatial::grid::Occupancy;

// Growth scoring weights
/// Score for continuing straight during center-out growth
pub const CENTER_OUT_FORWARD_BONUS: f64 = 1.5;
/// Score for turning during center-out growth
pub const CENTER_OUT_TURN_BONUS: f64 = 1.5;
/// Score per free neighbour of a center-out candidate
pub const CENTER_OUT_FREEDOM_WEIGHT: f64 = 0.8;
/// Probability of taking the best center-out candidate
pub const CENTER_OUT_TOP_PICK: f64 = 0.8;
/// Score for continuing straight during direction-first growth
pub const DIRECTION_FIRST_FORWARD_BONUS: f64 = 2.0;
/// Score for turning during direction-first growth
pub const DIRECTION_FIRST_TURN_BONUS: f64 = 1.0;
/// Penalty for reversing the previous turn
pub const ZIG_ZAG_PENALTY: f64 = 0.75;
/// Score per free neighbour of a direction-first candidate
pub const DIRECTION_FIRST_FREEDOM_WEIGHT: f64 = 0.3;
/// Probability of taking the best direction-first candidate
pub const DIRECTION_FIRST_TOP_PICK: f64 = 0.7;
/// Upper bound of the random jitter added to every growth score
pub const SCORE_JITTER: f64 = 0.5;
/// Probability of seeding direction-first vines on the border
pub const EDGE_SEED_PREFERENCE: f64 = 0.8;
/// Cells from the border counted as "near the edge" for anchor seeds
pub const ANCHOR_EDGE_BUFFER: i32 = 3;
/// Random probes made when looking for a sparse seed
pub const SPARSE_SEED_SAMPLES: usize = 60;

/// Candidate cell with its growth score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredCell {
    /// Candidate cell
    pub cell: Point,
    /// Higher is better
    pub score: f64,
}

/// Pick from scored candidates: the best with probability `top_pick`, otherwise uniformly
///
/// Candidates are ranked by descending score; equal scores keep their input order.
pub fn pick_scored(
    mut candidates: Vec<ScoredCell>,
    top_pick: f64,
    rng: &mut RandomSelector,
) -> Option<Point> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    if candidates.len() > 1 && rng.chance(top_pick) {
        return candidates.first().map(|c| c.cell);
    }
    if candidates.len() > 1 {
        let index = rng.index(candidates.len());
        return candidates.get(index).map(|c| c.cell);
    }
    candidates.first().map(|c| c.cell)
}

/// Empty cells with at least one free neighbour, closest to the grid center first
pub fn center_seed_candidates(occupancy: &Occupancy) -> Vec<Point> {
    let center_x = occupancy.width() as f64 / 2.0;
    let center_y = occupancy.height() as f64 / 2.0;
    let distance = |p: &Point| (f64::from(p.x) - center_x).abs() + (f64::from(p.y) - center_y).abs();

    let mut candidates: Vec<Point> = occupancy
        .empty_cells()
        .into_iter()
        .filter(|&p| occupancy.free_neighbor_count(p) > 0)
        .collect();
    candidates.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
    candidates
}

/// Pick a seed among the cells nearest the center
///
/// The pool is the closest quarter of the candidates but never fewer than five.
pub fn choose_center_seed(occupancy: &Occupancy, rng: &mut RandomSelector) -> Option<Point> {
    let candidates = center_seed_candidates(occupancy);
    if candidates.is_empty() {
        return None;
    }
    let pool = (candidates.len() / 4).max(5).min(candidates.len());
    candidates.get(rng.index(pool)).copied()
}

/// Pick a direction-first seed, preferring border cells
pub fn choose_edge_biased_seed(occupancy: &Occupancy, rng: &mut RandomSelector) -> Option<Point> {
    let (edge, interior): (Vec<Point>, Vec<Point>) = occupancy
        .empty_cells()
        .into_iter()
        .filter(|&p| occupancy.free_neighbor_count(p) > 0)
        .partition(|&p| occupancy.is_edge(p));

    if !edge.is_empty() && (interior.is_empty() || rng.chance(EDGE_SEED_PREFERENCE)) {
        return edge.get(rng.index(edge.len())).copied();
    }
    interior.get(rng.index(interior.len())).copied()
}

/// Pick an empty cell within `buffer` cells of the border
pub fn choose_anchor_seed(
    occupancy: &Occupancy,
    buffer: i32,
    rng: &mut RandomSelector,
) -> Option<Point> {
    let (width, height) = (occupancy.width(), occupancy.height());
    let candidates: Vec<Point> = occupancy
        .empty_cells()
        .into_iter()
        .filter(|&p| {
            Direction::ALL
                .iter()
                .map(|&d| distance_to_edge(p, d, width, height))
                .min()
                .is_some_and(|d| d <= buffer)
        })
        .collect();
    candidates.get(rng.index(candidates.len())).copied()
}

/// Pick a uniformly random empty cell
pub fn choose_random_seed(occupancy: &Occupancy, rng: &mut RandomSelector) -> Option<Point> {
    let empty = occupancy.empty_cells();
    empty.get(rng.index(empty.len())).copied()
}

/// Sample empty cells and keep the one with the most free neighbours
///
/// Used when filling is stuck in tight clusters.
pub fn choose_sparse_seed(occupancy: &Occupancy, rng: &mut RandomSelector) -> Option<Point> {
    let empty = occupancy.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let mut best: Option<(usize, Point)> = None;
    for _ in 0..SPARSE_SEED_SAMPLES {
        let Some(&cell) = empty.get(rng.index(empty.len())) else {
            continue;
        };
        let score = occupancy.free_neighbor_count(cell);
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, cell));
            if score == 4 {
                break;
            }
        }
    }
    best.map(|(_, cell)| cell)
}

/// Pick an empty cell weighted by the profile's region bias and local emptiness
pub fn choose_region_biased_seed(
    occupancy: &Occupancy,
    profile: &VarietyProfile,
    rng: &mut RandomSelector,
) -> Option<Point> {
    let (width, height) = (occupancy.width(), occupancy.height());
    let empty = occupancy.empty_cells();
    let weights: Vec<f64> = empty
        .iter()
        .map(|&p| {
            let base = match profile.region_bias {
                RegionBias::Edge => {
                    let nearest = Direction::ALL
                        .iter()
                        .map(|&d| distance_to_edge(p, d, width, height))
                        .min()
                        .unwrap_or(0);
                    f64::from(1 + (width as i32 / 2 - nearest).max(0))
                }
                RegionBias::Center => {
                    let dx = f64::from(p.x) - (width as f64 - 1.0) / 2.0;
                    let dy = f64::from(p.y) - (height as f64 - 1.0) / 2.0;
                    1.0 / (0.1 + dx * dx + dy * dy)
                }
                RegionBias::Balanced => 1.0,
            };
            base * (1.0 + occupancy.emptiness(p) as f64 / 9.0)
        })
        .collect();
    if empty.is_empty() {
        return None;
    }
    empty.get(rng.weighted_choice(&weights)).copied()
}

/// Choose an exit direction weighted toward near edges and the profile's balance
pub fn weighted_exit_direction(
    pos: Point,
    width: usize,
    height: usize,
    profile: &VarietyProfile,
    rng: &mut RandomSelector,
) -> Direction {
    let weights: Vec<f64> = Direction::ALL
        .iter()
        .zip(profile.dir_balance.iter())
        .map(|(&dir, &balance)| {
            let distance = distance_to_edge(pos, dir, width, height).max(0);
            balance / f64::from(distance + 1)
        })
        .collect();
    Direction::ALL
        .get(rng.weighted_choice(&weights))
        .copied()
        .unwrap_or(Direction::Up)
}

/// Longest vine any strategy will aim for on this grid
pub const fn max_vine_length(width: usize, height: usize) -> usize {
    let cap = (width + height) / 2;
    if cap < MIN_VINE_LENGTH {
        MIN_VINE_LENGTH
    } else {
        cap
    }
}

/// Target lengths for center-out placement
///
/// Enough vines of roughly the tier's average length to reach the target cell
/// count, held within `count_range`. Each length varies by one either way.
pub fn center_out_lengths(
    width: usize,
    height: usize,
    min_coverage: f64,
    avg_length: usize,
    count_range: (usize, usize),
    rng: &mut RandomSelector,
) -> Vec<usize> {
    let target_cells = (width * height) as f64 * min_coverage;
    let avg = avg_length.max(MIN_VINE_LENGTH);
    let count = plan_count(target_cells as usize / avg, count_range);
    let cap = max_vine_length(width, height);

    (0..count)
        .map(|_| {
            let length = (avg + rng.range(0, 2)).saturating_sub(1);
            length.clamp(MIN_VINE_LENGTH, cap)
        })
        .collect()
}

/// Vine count needed for a cell target, held within `count_range`
///
/// The upper bound wins when the range is inverted.
pub fn plan_count(needed: usize, count_range: (usize, usize)) -> usize {
    needed.max(count_range.0).min(count_range.1).max(1)
}

/// Target lengths for direction-first placement
///
/// The count aims for the middle of `length_range` within `count_range`. Lengths
/// are uniform up to twice the average, which is itself held in `length_range`,
/// then topped up one cell at a time until the plan covers the target.
pub fn direction_first_lengths(
    width: usize,
    height: usize,
    min_coverage: f64,
    count_range: (usize, usize),
    length_range: (usize, usize),
    rng: &mut RandomSelector,
) -> Vec<usize> {
    let total = width * height;
    let target_cells = (total as f64 * min_coverage) as usize;
    let shortest = length_range.0.max(MIN_VINE_LENGTH);
    let longest = length_range.1.max(shortest);
    let middle = (shortest + longest) / 2;
    let count = plan_count(target_cells / middle, count_range);
    let avg = (target_cells / count).clamp(shortest, longest);
    let max_length = (avg * 2).min(total / 4).max(3);

    let mut lengths: Vec<usize> = (0..count)
        .map(|_| rng.range(MIN_VINE_LENGTH, max_length))
        .collect();
    let mut planned: usize = lengths.iter().sum();

    if lengths.iter().all(|&l| l >= max_length) {
        return lengths;
    }
    while planned < target_cells {
        let index = rng.index(lengths.len());
        if let Some(length) = lengths.get_mut(index) {
            if *length < max_length {
                *length += 1;
                planned += 1;
            }
        }
        if lengths.iter().all(|&l| l >= max_length) {
            break;
        }
    }
    lengths
}

/// Length drawn with probability proportional to the length itself
///
/// Capped by the remaining free cells. Once `short_count` reaches `max_short`
/// the draw starts at four cells so two- and three-cell vines stay rare.
pub fn skewed_length(
    max_length: usize,
    remaining: usize,
    short_count: usize,
    max_short: usize,
    rng: &mut RandomSelector,
) -> usize {
    let effective_max = max_length.min(remaining).max(MIN_VINE_LENGTH);
    let min_length = if short_count >= max_short && effective_max > 3 {
        4
    } else {
        MIN_VINE_LENGTH
    };
    let weights: Vec<f64> = (min_length..=effective_max).map(|l| l as f64).collect();
    min_length + rng.weighted_choice(&weights)
}

/// Length drawn from the profile's short/medium/long mix
pub fn profile_length(profile: &VarietyProfile, max_length: usize, rng: &mut RandomSelector) -> usize {
    let (low, high) = match rng.weighted_choice(&profile.length_mix) {
        0 => (2, 3),
        1 => (4, 6),
        _ => (7, max_length.max(7)),
    };
    rng.range(low, high).clamp(MIN_VINE_LENGTH, max_length.max(MIN_VINE_LENGTH))
}

/// Direction of the last step taken by a growing path
pub fn last_step(path: &[Point]) -> Option<Direction> {
    match path {
        [.., prev, last] => Direction::between(*prev, *last),
        _ => None,
    }
}

/// Direction of the step before the last one
pub fn previous_step(path: &[Point]) -> Option<Direction> {
    match path {
        [.., a, b, _] => Direction::between(*a, *b),
        _ => None,
    }
}

/// Local crowding score used to keep growth compact
///
/// Combines the covered share of the 3x3 block around the cell with a bonus
/// for sitting on or next to the border.
pub fn density_score(occupancy: &Occupancy, cell: Point) -> f64 {
    let (width, height) = (occupancy.width(), occupancy.height());
    let crowded = 1.0 - occupancy.emptiness(cell) as f64 / 9.0;
    let edge_distance = Direction::ALL
        .iter()
        .map(|&d| distance_to_edge(cell, d, width, height))
        .min()
        .unwrap_or(0);
    let edge_bonus = (1.0 - f64::from(edge_distance) / 2.0).max(0.0);
    crowded * 2.0 + edge_bonus
}

/// Pick among the three best candidates with 60/25/15 odds
pub fn pick_top_three(mut candidates: Vec<ScoredCell>, rng: &mut RandomSelector) -> Option<Point> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let odds = [0.60, 0.25, 0.15];
    let weights = odds.get(..candidates.len().min(3)).unwrap_or(&[]);
    if weights.is_empty() {
        return None;
    }
    candidates.get(rng.weighted_choice(weights)).map(|c| c.cell)
}
