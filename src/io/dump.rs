//! Failure dumps for offline replay of placements that could not recover
//!
//! File names depend only on level id, seed and attempt, so replaying the same
//! request overwrites the same dump.

use crate::algorithm::executor::GenerationConfig;
use crate::io::error::{Result, WithPath};
use crate::spatial::geometry::{Direction, Point};
use crate::spatial::grid::Occupancy;
use crate::spatial::vine::Vine;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Snapshot of a placement at the moment recovery gave up
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureDump {
    /// Level being generated
    pub level_id: u32,
    /// `[width, height]`
    pub grid: [usize; 2],
    /// Request seed
    pub seed: u64,
    /// Zero-based whole-level attempt
    pub attempt: usize,
    /// Vine that could not be placed
    pub vine_id: String,
    /// Human-readable reason
    pub message: String,
    /// Coverage of the partial placement
    pub coverage: f64,
    /// Accepted vines in placement order
    pub vines: Vec<Vine>,
    /// Covered cells in row-major order
    pub occupied: Vec<Point>,
}

impl FailureDump {
    /// Capture the partial placement
    pub fn capture(
        config: &GenerationConfig,
        attempt: usize,
        vine_id: &str,
        message: &str,
        occupancy: &Occupancy,
        vines: &[Vine],
    ) -> Self {
        let occupied = (0..occupancy.area())
            .map(|index| occupancy.point(index))
            .filter(|&p| occupancy.is_occupied(p))
            .collect();
        Self {
            level_id: config.level_id,
            grid: [occupancy.width(), occupancy.height()],
            seed: config.seed,
            attempt,
            vine_id: vine_id.to_string(),
            message: message.to_string(),
            coverage: occupancy.coverage(),
            vines: vines.to_vec(),
            occupied,
        }
    }

    /// File name stem shared by the JSON and text dumps
    pub fn file_stem(&self) -> String {
        format!(
            "failure_level_{}_seed_{}_attempt_{}",
            self.level_id, self.seed, self.attempt
        )
    }

    /// Write `<stem>.json` and `<stem>.txt` into `dir`, creating it if needed
    ///
    /// Returns the JSON path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or either file cannot be written
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).with_path(dir, "create dump directory")?;
        let json_path = dir.join(format!("{}.json", self.file_stem()));
        let text_path = dir.join(format!("{}.txt", self.file_stem()));

        let json = serde_json::to_string_pretty(self).with_path(&json_path, "serialize")?;
        std::fs::write(&json_path, json).with_path(&json_path, "write dump")?;
        std::fs::write(&text_path, self.render()).with_path(&text_path, "write dump")?;
        Ok(json_path)
    }

    /// Text report with a header and the grid drawing
    pub fn render(&self) -> String {
        let [width, height] = self.grid;
        let mut out = String::new();
        let _ = writeln!(out, "level {} seed {} attempt {}", self.level_id, self.seed, self.attempt);
        let _ = writeln!(out, "failing vine: {}", self.vine_id);
        let _ = writeln!(out, "message: {}", self.message);
        let _ = writeln!(
            out,
            "grid {width}x{height}, {} vines, coverage {:.1}%",
            self.vines.len(),
            self.coverage * 100.0
        );
        out.push('\n');
        out.push_str(&render_ascii(width, height, &self.vines));
        out
    }
}

/// Draw vines as text, top row first
///
/// Heads are arrows, bodies a letter per vine (cycling a-z), empty cells dots.
pub fn render_ascii(width: usize, height: usize, vines: &[Vine]) -> String {
    let mut rows = vec![vec!['.'; width]; height];
    for (index, vine) in vines.iter().enumerate() {
        let letter = char::from(b'a' + (index % 26) as u8);
        for (segment, cell) in vine.ordered_path.iter().enumerate() {
            if !cell.in_bounds(width, height) {
                continue;
            }
            let symbol = if segment == 0 {
                match vine.head_direction {
                    Direction::Up => '^',
                    Direction::Down => 'v',
                    Direction::Left => '<',
                    Direction::Right => '>',
                }
            } else {
                letter
            };
            if let Some(slot) = rows
                .get_mut(cell.y as usize)
                .and_then(|row| row.get_mut(cell.x as usize))
            {
                *slot = symbol;
            }
        }
    }

    let mut out = String::with_capacity((width + 1) * height);
    for row in rows.iter().rev() {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}
