/*
 * Agent Module
 *
 * This module defines the Agent struct (a boid/ant) and its movement.
 * Steering forces are accumulated into the acceleration and integrated once
 * per physics step; edge handling and collisions keep the agent in the world.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::objects::{Block, MovableObject};
use crate::steering::{self, Kinematics, Limits};

// Collision radius and drawn triangle size of an agent
pub const AGENT_SIZE: f32 = 5.0;
// Steps a freshly spawned or signalled agent stays highlighted
pub const FLASH_STEPS: u32 = 3;
// Steps an agent stays recruited after receiving a broadcast
pub const RECRUIT_STEPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Wanderer,
    Recruited,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub position: Point2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub role: Role,
    pub goal: Option<Vec2>,
    // Set once the agent has been reached by a broadcast during the current step
    pub has_received: bool,
    pub flash: u32,
    recruit_timer: u32,
}

impl Agent {
    pub fn new(position: Point2, heading: f32, speed: f32) -> Self {
        Self {
            position,
            velocity: vec2(heading.cos(), heading.sin()) * speed,
            acceleration: Vec2::ZERO,
            role: Role::Wanderer,
            goal: None,
            has_received: false,
            flash: FLASH_STEPS,
            recruit_timer: 0,
        }
    }

    // Spawn at a random point inside `bounds` with a random heading
    pub fn random<R: Rng>(rng: &mut R, bounds: Rect, speed: f32) -> Self {
        let x = rng.gen_range(bounds.left()..bounds.right());
        let y = rng.gen_range(bounds.bottom()..bounds.top());
        Self::spawn_at(rng, pt2(x, y), speed)
    }

    pub fn spawn_at<R: Rng>(rng: &mut R, position: Point2, speed: f32) -> Self {
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        Self::new(position, heading, speed)
    }

    #[inline]
    pub fn kinematics(&self) -> Kinematics {
        Kinematics { position: self.position, velocity: self.velocity }
    }

    // Apply a force to the agent
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    // Update the agent's position based on its velocity and acceleration
    pub fn integrate(&mut self, max_speed: f32) {
        self.velocity = steering::limit(self.velocity + self.acceleration, max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;

        self.flash = self.flash.saturating_sub(1);
        if self.recruit_timer > 0 {
            self.recruit_timer -= 1;
            if self.recruit_timer == 0 {
                self.role = Role::Wanderer;
                self.goal = None;
            }
        }
    }

    // Wrap the agent around the world edges, landing in [min, max)
    pub fn wrap_edges(&mut self, bounds: Rect) {
        self.position.x = wrap_into(self.position.x, bounds.left(), bounds.w());
        self.position.y = wrap_into(self.position.y, bounds.bottom(), bounds.h());
    }

    // Keep the agent inside the world, pointing the offending velocity component back in
    pub fn bounce_edges(&mut self, bounds: Rect) {
        bounce_axis(&mut self.position.x, &mut self.velocity.x, bounds.left(), bounds.right());
        bounce_axis(&mut self.position.y, &mut self.velocity.y, bounds.bottom(), bounds.top());
    }

    // Push out of a block along the shallowest axis and bounce off it
    pub fn collide_block(&mut self, block: &Block) -> bool {
        let half = block.size / 2.0 + AGENT_SIZE / 2.0;
        let offset = self.position - block.position;
        let overlap_x = half - offset.x.abs();
        let overlap_y = half - offset.y.abs();

        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return false;
        }

        if overlap_x < overlap_y {
            let side = if offset.x >= 0.0 { 1.0 } else { -1.0 };
            self.position.x += overlap_x * side;
            self.velocity.x = self.velocity.x.abs() * side;
        } else {
            let side = if offset.y >= 0.0 { 1.0 } else { -1.0 };
            self.position.y += overlap_y * side;
            self.velocity.y = self.velocity.y.abs() * side;
        }
        true
    }

    // Resolve overlap with a ball; the ball receives the opposite impulse
    pub fn collide_object(&mut self, object: &mut MovableObject, push: f32) -> bool {
        let offset = self.position - object.position;
        let d = offset.length();
        let overlap = object.radius + AGENT_SIZE - d;

        if overlap <= 0.0 {
            return false;
        }

        let normal = if d > 0.0 { offset / d } else { vec2(1.0, 0.0) };
        self.position += normal * overlap;
        if self.velocity.dot(normal) < 0.0 {
            self.velocity = steering::reflect(self.velocity, normal);
        }
        object.apply_force(-normal * push);
        true
    }

    // Accept a relayed goal: become recruited and steer toward it
    pub fn receive(&mut self, goal: Vec2, limits: Limits) {
        self.has_received = true;
        self.role = Role::Recruited;
        self.goal = Some(goal);
        self.flash = FLASH_STEPS;
        self.recruit_timer = RECRUIT_STEPS;
        let force = steering::seek(self.kinematics(), goal, limits);
        self.apply_force(force);
    }

    pub fn is_recruited(&self) -> bool {
        self.role == Role::Recruited
    }

    pub fn heading(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }
}

fn wrap_into(value: f32, min: f32, span: f32) -> f32 {
    let wrapped = min + (value - min).rem_euclid(span);
    // rem_euclid can round up to exactly `span` for tiny negative offsets
    if wrapped >= min + span {
        min
    } else {
        wrapped
    }
}

fn bounce_axis(position: &mut f32, velocity: &mut f32, min: f32, max: f32) {
    if *position < min {
        *position = min;
        *velocity = velocity.abs();
    } else if *position > max {
        *position = max;
        *velocity = -velocity.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Rect {
        Rect::from_w_h(100.0, 100.0)
    }

    #[test]
    fn integrate_clamps_speed_and_resets_acceleration() {
        let mut agent = Agent::new(pt2(0.0, 0.0), 0.0, 1.0);
        agent.apply_force(vec2(50.0, 0.0));
        agent.integrate(4.0);
        assert!((agent.velocity.length() - 4.0).abs() < 1e-5);
        assert!((agent.position.x - 4.0).abs() < 1e-5);
        assert_eq!(agent.acceleration, Vec2::ZERO);
    }

    #[test]
    fn wrap_keeps_agent_in_half_open_bounds() {
        let mut agent = Agent::new(pt2(55.0, -51.0), 0.0, 0.0);
        agent.wrap_edges(world());
        assert!((agent.position.x - -45.0).abs() < 1e-4);
        assert!((agent.position.y - 49.0).abs() < 1e-4);

        // Steps longer than the world still land inside
        let mut agent = Agent::new(pt2(260.0, 0.0), 0.0, 0.0);
        agent.wrap_edges(world());
        assert!(agent.position.x >= -50.0 && agent.position.x < 50.0);
    }

    #[test]
    fn bounce_clamps_and_points_inward() {
        let mut agent = Agent::new(pt2(70.0, -60.0), 0.0, 0.0);
        agent.velocity = vec2(3.0, -2.0);
        agent.bounce_edges(world());
        assert_eq!(agent.position, pt2(50.0, -50.0));
        assert!(agent.velocity.x < 0.0);
        assert!(agent.velocity.y > 0.0);
    }

    #[test]
    fn block_collision_pushes_out() {
        let block = Block::new(pt2(0.0, 0.0));
        let mut agent = Agent::new(pt2(-11.0, 1.0), 0.0, 0.0);
        agent.velocity = vec2(2.0, 0.0);
        assert!(agent.collide_block(&block));
        assert!(agent.position.x <= -(block.size / 2.0 + AGENT_SIZE / 2.0) + 1e-4);
        assert!(agent.velocity.x < 0.0);

        let mut far = Agent::new(pt2(40.0, 40.0), 0.0, 0.0);
        assert!(!far.collide_block(&block));
    }

    #[test]
    fn object_collision_reflects_and_pushes_ball() {
        let mut ball = MovableObject::new(pt2(0.0, 0.0));
        let mut agent = Agent::new(pt2(-20.0, 0.0), 0.0, 0.0);
        agent.velocity = vec2(3.0, 0.0);

        assert!(agent.collide_object(&mut ball, 0.5));
        assert!((agent.position.x - -(ball.radius + AGENT_SIZE)).abs() < 1e-4);
        assert!(agent.velocity.x < 0.0);
        // Ball is shoved away from the agent, scaled by its mass
        assert!(ball.velocity.x > 0.0);
    }

    #[test]
    fn recruitment_expires() {
        let mut agent = Agent::new(pt2(0.0, 0.0), 0.0, 1.0);
        agent.receive(vec2(10.0, 0.0), Limits { max_speed: 4.0, max_force: 0.5 });
        assert!(agent.is_recruited());
        assert!(agent.acceleration.x > 0.0);

        for _ in 0..RECRUIT_STEPS {
            agent.integrate(4.0);
        }
        assert_eq!(agent.role, Role::Wanderer);
        assert_eq!(agent.goal, None);
    }
}
