/*
 * Pheromone Module
 *
 * A two-channel concentration grid laid over the world. Agents deposit into
 * the cell under them; every step each channel evaporates, diffuses into its
 * neighbourhood and is clamped. Recruited agents lay the `Recruit` channel,
 * which other agents climb by following its gradient.
 */

use nannou::prelude::*;

use crate::params::PheromoneParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Laid by every agent as it moves
    Trail,
    /// Laid by recruited agents heading for a goal
    Recruit,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Trail, Channel::Recruit];
}

pub struct PheromoneField {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,
    origin: Vec2,
    extent: Vec2,
    trail: Vec<f32>,
    recruit: Vec<f32>,
    // Double buffer for the diffusion pass
    scratch: Vec<f32>,
}

impl PheromoneField {
    pub fn new(bounds: Rect, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((bounds.w() / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.h() / cell_size).ceil() as usize).max(1);
        let len = cols * rows;

        Self {
            cols,
            rows,
            cell_size,
            origin: vec2(bounds.left(), bounds.bottom()),
            extent: bounds.wh(),
            trail: vec![0.0; len],
            recruit: vec![0.0; len],
            scratch: vec![0.0; len],
        }
    }

    pub fn values(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Trail => &self.trail,
            Channel::Recruit => &self.recruit,
        }
    }

    fn values_mut(&mut self, channel: Channel) -> &mut [f32] {
        match channel {
            Channel::Trail => &mut self.trail,
            Channel::Recruit => &mut self.recruit,
        }
    }

    // Column and row under a world position, None outside the world.
    // The top and right walls belong to the last row and column.
    pub fn cell_at(&self, pos: Point2) -> Option<(usize, usize)> {
        let local = pos - self.origin;
        if local.x < 0.0 || local.y < 0.0 || local.x > self.extent.x || local.y > self.extent.y {
            return None;
        }
        let col = ((local.x / self.cell_size) as usize).min(self.cols - 1);
        let row = ((local.y / self.cell_size) as usize).min(self.rows - 1);
        Some((col, row))
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Point2 {
        self.origin + vec2((col as f32 + 0.5) * self.cell_size, (row as f32 + 0.5) * self.cell_size)
    }

    #[inline]
    pub fn value(&self, col: usize, row: usize, channel: Channel) -> f32 {
        self.values(channel)[row * self.cols + col]
    }

    pub fn deposit(&mut self, pos: Point2, channel: Channel, amount: f32, max_concentration: f32) {
        if let Some((col, row)) = self.cell_at(pos) {
            let index = row * self.cols + col;
            let cell = &mut self.values_mut(channel)[index];
            *cell = (*cell + amount).clamp(0.0, max_concentration);
        }
    }

    pub fn sample(&self, pos: Point2, channel: Channel) -> f32 {
        self.cell_at(pos)
            .map(|(col, row)| self.value(col, row, channel))
            .unwrap_or(0.0)
    }

    // Central-difference gradient (one-sided at the borders), per world unit
    pub fn gradient(&self, pos: Point2, channel: Channel) -> Vec2 {
        let (col, row) = match self.cell_at(pos) {
            Some(cell) => cell,
            None => return Vec2::ZERO,
        };

        let left = col.saturating_sub(1);
        let right = (col + 1).min(self.cols - 1);
        let down = row.saturating_sub(1);
        let up = (row + 1).min(self.rows - 1);

        let dx = if right > left {
            (self.value(right, row, channel) - self.value(left, row, channel))
                / ((right - left) as f32 * self.cell_size)
        } else {
            0.0
        };
        let dy = if up > down {
            (self.value(col, up, channel) - self.value(col, down, channel))
                / ((up - down) as f32 * self.cell_size)
        } else {
            0.0
        };

        vec2(dx, dy)
    }

    // Evaporate, diffuse and clamp every channel
    pub fn step(&mut self, settings: &PheromoneParams) {
        let (cols, rows) = (self.cols, self.rows);
        for channel in Channel::ALL {
            let source = match channel {
                Channel::Trail => &mut self.trail,
                Channel::Recruit => &mut self.recruit,
            };
            diffuse_into(source, &mut self.scratch, cols, rows, settings);
            std::mem::swap(source, &mut self.scratch);
        }
    }

    pub fn total(&self, channel: Channel) -> f32 {
        self.values(channel).iter().sum()
    }

    pub fn max_value(&self, channel: Channel) -> f32 {
        self.values(channel).iter().copied().fold(0.0, f32::max)
    }

    pub fn clear(&mut self) {
        self.trail.iter_mut().for_each(|c| *c = 0.0);
        self.recruit.iter_mut().for_each(|c| *c = 0.0);
    }
}

fn diffuse_into(source: &[f32], target: &mut [f32], cols: usize, rows: usize, settings: &PheromoneParams) {
    let keep = 1.0 - settings.evaporation_rate;
    let rate = settings.diffusion_rate;
    let reach = settings.diffusion_radius as isize;

    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let own = source[index] * keep;

            let mut sum = 0.0;
            let mut count = 0;
            for dy in -reach..=reach {
                let y = row as isize + dy;
                if y < 0 || y >= rows as isize {
                    continue;
                }
                for dx in -reach..=reach {
                    let x = col as isize + dx;
                    if (dx == 0 && dy == 0) || x < 0 || x >= cols as isize {
                        continue;
                    }
                    sum += source[y as usize * cols + x as usize] * keep;
                    count += 1;
                }
            }

            let mixed = if count > 0 {
                (1.0 - rate) * own + rate * (sum / count as f32)
            } else {
                own
            };

            let clamped = mixed.clamp(0.0, settings.max_concentration);
            target[index] = if clamped < settings.min_concentration { 0.0 } else { clamped };
        }
    }
}
