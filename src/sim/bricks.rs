//! The brick grid
//!
//! Bricks never store their own position. Every position is derived from
//! the grid cell and the field's `vertical_offset`, so the descent hazard
//! moves the whole field with a single mutation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, circle_rect_overlap};
use crate::brick_offset_left;
use crate::consts::*;

/// Brick status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickStatus {
    Alive,
    Destroyed,
}

/// A grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brick {
    pub column: usize,
    pub row: usize,
    pub status: BrickStatus,
}

impl Brick {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == BrickStatus::Alive
    }
}

/// How a brick was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyCause {
    /// Direct ball contact
    Hit,
    /// Caught in an incendiary blast around a direct hit
    Splash,
}

/// Record of one destroyed brick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destroyed {
    pub column: usize,
    pub row: usize,
    pub rect: Rect,
    pub cause: DestroyCause,
}

impl Destroyed {
    pub fn score(&self) -> u64 {
        match self.cause {
            DestroyCause::Hit => BRICK_SCORE,
            DestroyCause::Splash => SPLASH_SCORE,
        }
    }
}

/// The 2D grid of bricks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickField {
    /// Cells indexed `[column][row]`
    cells: Vec<Vec<Brick>>,
    /// Top of row 0 (grows as the field descends)
    vertical_offset: f32,
    /// Number of cells with status Alive
    alive_count: usize,
}

impl BrickField {
    /// Build a field from a row-major pattern (`row * BRICK_COLUMNS + column`)
    pub fn from_pattern(pattern: &[u8]) -> Self {
        let mut alive_count = 0;
        let cells = (0..BRICK_COLUMNS)
            .map(|column| {
                (0..BRICK_ROWS)
                    .map(|row| {
                        let alive = pattern
                            .get(row * BRICK_COLUMNS + column)
                            .is_some_and(|&cell| cell != 0);
                        if alive {
                            alive_count += 1;
                        }
                        Brick {
                            column,
                            row,
                            status: if alive {
                                BrickStatus::Alive
                            } else {
                                BrickStatus::Destroyed
                            },
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            cells,
            vertical_offset: BRICK_OFFSET_TOP,
            alive_count,
        }
    }

    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    #[inline]
    pub fn vertical_offset(&self) -> f32 {
        self.vertical_offset
    }

    pub fn is_cleared(&self) -> bool {
        self.alive_count == 0
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&Brick> {
        self.cells.get(column).and_then(|c| c.get(row))
    }

    /// All cells, column-major
    pub fn iter(&self) -> impl Iterator<Item = &Brick> {
        self.cells.iter().flatten()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Brick> {
        self.iter().filter(|b| b.is_alive())
    }

    /// Current rectangle of a cell
    pub fn rect(&self, column: usize, row: usize) -> Rect {
        Rect::new(
            column as f32 * (BRICK_WIDTH + BRICK_PADDING) + brick_offset_left(),
            row as f32 * BRICK_ROW_HEIGHT + self.vertical_offset,
            BRICK_WIDTH,
            BRICK_HEIGHT,
        )
    }

    /// Find and destroy the first alive brick the ball overlaps.
    ///
    /// With `incendiary` set, the 8 neighbouring cells are destroyed too
    /// (no chaining). The direct hit is always the first entry of the
    /// returned list; an empty list means nothing was hit.
    pub fn check_and_destroy(
        &mut self,
        center: Vec2,
        radius: f32,
        incendiary: bool,
    ) -> Vec<Destroyed> {
        let mut hit = None;
        'scan: for column in 0..BRICK_COLUMNS {
            for row in 0..BRICK_ROWS {
                if self.cells[column][row].is_alive()
                    && circle_rect_overlap(center, radius, &self.rect(column, row))
                {
                    hit = Some((column, row));
                    break 'scan;
                }
            }
        }

        let Some((column, row)) = hit else {
            return Vec::new();
        };

        let mut destroyed = Vec::with_capacity(if incendiary { 9 } else { 1 });
        destroyed.extend(self.destroy(column, row, DestroyCause::Hit));

        if incendiary {
            let columns = column.saturating_sub(1)..=(column + 1).min(BRICK_COLUMNS - 1);
            for c in columns {
                let rows = row.saturating_sub(1)..=(row + 1).min(BRICK_ROWS - 1);
                for r in rows {
                    if (c, r) != (column, row) {
                        destroyed.extend(self.destroy(c, r, DestroyCause::Splash));
                    }
                }
            }
        }

        destroyed
    }

    /// Destroy one cell; `None` if it was already destroyed
    fn destroy(&mut self, column: usize, row: usize, cause: DestroyCause) -> Option<Destroyed> {
        let brick = &mut self.cells[column][row];
        if !brick.is_alive() {
            return None;
        }
        brick.status = BrickStatus::Destroyed;
        self.alive_count -= 1;
        Some(Destroyed {
            column,
            row,
            rect: self.rect(column, row),
            cause,
        })
    }

    /// Lowest bottom edge among alive bricks
    pub fn lowest_alive_bottom(&self) -> Option<f32> {
        self.alive()
            .map(|b| self.rect(b.column, b.row).bottom())
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Whether one more descent step would put an alive brick on the line
    pub fn descent_would_breach(&self, line: f32) -> bool {
        self.lowest_alive_bottom()
            .is_some_and(|bottom| bottom + BRICK_ROW_HEIGHT >= line)
    }

    /// Move the whole field down one row
    pub fn descend(&mut self) {
        self.vertical_offset += BRICK_ROW_HEIGHT;
    }

    /// Recount alive cells; returns true if the cached count was wrong
    pub fn repair_alive_count(&mut self) -> bool {
        let actual = self.alive().count();
        if actual != self.alive_count {
            self.alive_count = actual;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub(crate) fn set_vertical_offset(&mut self, offset: f32) {
        self.vertical_offset = offset;
    }
}
