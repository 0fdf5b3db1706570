/*
 * Objects Module
 *
 * Things the agents interact with besides each other: pushable balls,
 * static blocks placed by the user, and the goal region balls are pushed to.
 */

use nannou::prelude::*;

pub const OBJECT_RADIUS: f32 = 20.0;
pub const OBJECT_MASS: f32 = 5.0;
// Velocity kept per step (friction)
pub const OBJECT_DAMPING: f32 = 0.95;
pub const BLOCK_SIZE: f32 = 20.0;

// A ball that agents can shove toward the goal
#[derive(Debug, Clone)]
pub struct MovableObject {
    pub position: Point2,
    pub velocity: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub is_dragging: bool,
}

impl MovableObject {
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius: OBJECT_RADIUS,
            mass: OBJECT_MASS,
            is_dragging: false,
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        if !self.is_dragging {
            self.velocity += force / self.mass;
        }
    }

    pub fn update(&mut self, bounds: Rect) {
        if self.is_dragging {
            return;
        }

        self.position += self.velocity;
        self.velocity *= OBJECT_DAMPING;

        if self.position.x < bounds.left() || self.position.x > bounds.right() {
            self.velocity.x = -self.velocity.x;
            self.position.x = self.position.x.clamp(bounds.left(), bounds.right());
        }
        if self.position.y < bounds.bottom() || self.position.y > bounds.top() {
            self.velocity.y = -self.velocity.y;
            self.position.y = self.position.y.clamp(bounds.bottom(), bounds.top());
        }
    }

    pub fn start_drag(&mut self) {
        self.is_dragging = true;
    }

    pub fn drag_to(&mut self, position: Point2) {
        if self.is_dragging {
            self.position = position;
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
        self.velocity = Vec2::ZERO;
    }

    pub fn contains(&self, point: Point2) -> bool {
        self.position.distance(point) < self.radius
    }
}

// A static square obstacle, centred on its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub position: Point2,
    pub size: f32,
}

impl Block {
    pub fn new(position: Point2) -> Self {
        Self { position, size: BLOCK_SIZE }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_xy_wh(self.position, vec2(self.size, self.size))
    }

    // Box of half-width `half_extent` around `point` intersects the block
    pub fn overlaps(&self, point: Point2, half_extent: f32) -> bool {
        let reach = self.size / 2.0 + half_extent;
        (point.x - self.position.x).abs() < reach && (point.y - self.position.y).abs() < reach
    }
}

// Circular region the balls are pushed into; doubles as the colony nest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Point2,
    pub radius: f32,
}

impl Goal {
    // Place the goal `inset` units in from the bottom-right corner of the world
    pub fn in_corner(bounds: Rect, inset: f32, radius: f32) -> Self {
        Self {
            position: pt2(bounds.right() - inset, bounds.bottom() + inset),
            radius,
        }
    }

    pub fn contains(&self, point: Point2) -> bool {
        self.position.distance(point) < self.radius
    }

    pub fn within(&self, point: Point2, radius: f32) -> bool {
        self.position.distance(point) < radius
    }
}
