/*
 * Swarm Module
 *
 * World state and the per-step simulation pipeline. Forces are computed from
 * an immutable snapshot of the agents (optionally in parallel with rayon),
 * broadcasts are relayed breadth-first, then everything is integrated and
 * kept inside the world. Objects, the goal, pheromones and the colony
 * economy are updated afterwards.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::colony::Colony;
use crate::error::{SwarmError, SwarmResult};
use crate::objects::{Block, Goal, MovableObject};
use crate::params::{Behavior, EdgeMode, SimulationParams};
use crate::pheromone::{Channel, PheromoneField};
use crate::spatial_grid::SpatialGrid;
use crate::steering::{self, Kinematics, Limits};

// Clicking this close to the current target removes it
pub const TARGET_CLEAR_RADIUS: f32 = 12.0;

// Placement attempts before a respawned ball falls back to the opposite corner
const SPAWN_ATTEMPTS: usize = 32;

// What one agent wants to do this step, computed from the snapshot
#[derive(Debug, Default)]
struct Intent {
    force: Vec2,
    pushes: Vec<(usize, Vec2)>,
    broadcast: Option<Vec2>,
}

// Read-only view of the world shared by the force pass
struct ForceContext<'a> {
    params: &'a SimulationParams,
    limits: Limits,
    agents: &'a [Agent],
    snapshot: &'a [Kinematics],
    grid: Option<&'a SpatialGrid>,
    objects: &'a [MovableObject],
    obstacles: &'a [Vec2],
    goal: Goal,
    target: Option<Vec2>,
    pheromones: Option<&'a PheromoneField>,
    jitter: &'a [Vec2],
}

impl<'a> ForceContext<'a> {
    fn neighbors(&self, index: usize, radius: f32) -> Vec<Kinematics> {
        let position = self.snapshot[index].position;
        match self.grid {
            Some(grid) => grid
                .query(position, radius)
                .into_iter()
                .filter(|&j| j != index)
                .map(|j| self.snapshot[j])
                .collect(),
            None => self
                .snapshot
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != index)
                .map(|(_, k)| *k)
                .collect(),
        }
    }

    fn intent(&self, index: usize) -> Intent {
        let mut intent = Intent::default();

        match self.params.behavior {
            Behavior::Flock => intent.force += self.flock_force(index),
            Behavior::Forage => self.forage(index, &mut intent),
        }

        if let Some(field) = self.pheromones {
            if !self.agents[index].is_recruited() {
                intent.force += self.follow_trail(index, field);
            }
        }

        intent
    }

    fn flock_force(&self, index: usize) -> Vec2 {
        let mut force = self.flocking_rules(index);
        if let Some(target) = self.target {
            let agent = self.snapshot[index];
            force += steering::seek(agent, target, self.limits) * self.params.flocking.target_attraction;
        }
        force
    }

    // Weighted alignment, cohesion and separation (blocks count as obstacles)
    fn flocking_rules(&self, index: usize) -> Vec2 {
        let agent = self.snapshot[index];
        let flocking = &self.params.flocking;
        let neighbors = self.neighbors(index, flocking.neighbor_radius.max(flocking.separation_radius));

        let alignment = steering::alignment(agent, &neighbors, flocking.neighbor_radius, self.limits);
        let cohesion = steering::cohesion(agent, &neighbors, flocking.neighbor_radius, self.limits);
        let separation = steering::separation(
            agent,
            &neighbors,
            flocking.separation_radius,
            self.obstacles,
            flocking.obstacle_separation_radius,
            self.limits,
        );

        alignment * flocking.alignment_weight + cohesion * flocking.cohesion_weight + separation * flocking.separation_weight
    }

    fn forage(&self, index: usize, intent: &mut Intent) {
        let agent = self.snapshot[index];
        let objects = &self.params.objects;

        // Scatter
        intent.force += self.jitter[index] * self.limits.max_force;

        // Shove any ball within reach toward the goal
        for (k, object) in self.objects.iter().enumerate() {
            if agent.position.distance(object.position) < objects.push_range {
                let to_goal = self.goal.position - object.position;
                if to_goal.length_squared() > f32::EPSILON {
                    intent.pushes.push((k, to_goal.normalize() * objects.push_force));
                }
            }
        }

        // Head for the closest ball not already settled, and tell the others
        let closest = self
            .objects
            .iter()
            .filter(|object| !self.goal.within(object.position, objects.settle_radius))
            .map(|object| (object.position, agent.position.distance(object.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((position, distance)) = closest {
            if distance < objects.attraction_radius {
                intent.broadcast = Some(position);
                intent.force += steering::seek(agent, position, self.limits);
            }
        }

        let state = &self.agents[index];
        if let (true, Some(goal)) = (state.is_recruited(), state.goal) {
            intent.force += steering::seek(agent, goal, self.limits);
        }

        let flocking = &self.params.flocking;
        let avoid = steering::separation(
            agent,
            &[],
            flocking.separation_radius,
            self.obstacles,
            flocking.obstacle_separation_radius,
            self.limits,
        );
        intent.force += avoid * flocking.separation_weight;
    }

    fn follow_trail(&self, index: usize, field: &PheromoneField) -> Vec2 {
        let agent = self.snapshot[index];
        let gradient = field.gradient(agent.position, Channel::Recruit);
        if gradient.length_squared() <= f32::EPSILON {
            return Vec2::ZERO;
        }
        let desired = steering::set_magnitude(gradient, self.limits.max_speed);
        steering::steer_towards(agent.velocity, desired, self.limits.max_force) * self.params.pheromone.follow_weight
    }
}

pub struct Swarm {
    pub agents: Vec<Agent>,
    pub objects: Vec<MovableObject>,
    pub blocks: Vec<Block>,
    pub goal: Goal,
    pub target: Option<Vec2>,
    pub colony: Colony,
    pub pheromones: PheromoneField,
    pub grid: SpatialGrid,
    pub bounds: Rect,
    pub goal_complete: bool,
    pub steps: u64,
    // Agents recruited by broadcasts during the last step
    pub last_broadcast_reach: usize,
    rng: StdRng,
}

impl Swarm {
    pub fn new(params: &SimulationParams) -> Self {
        let bounds = Rect::from_w_h(params.world_width, params.world_height);
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let goal = Goal::in_corner(bounds, params.objects.goal_inset, params.objects.goal_radius);
        let agents = (0..params.num_agents)
            .map(|_| Agent::random(&mut rng, bounds, params.max_speed))
            .collect();
        let objects = (0..params.objects.count)
            .map(|_| MovableObject::new(random_outside_goal(&mut rng, bounds, &goal, params)))
            .collect();

        Self {
            agents,
            objects,
            blocks: Vec::new(),
            goal,
            target: None,
            colony: Colony::new(&params.colony),
            pheromones: PheromoneField::new(bounds, params.pheromone.cell_size),
            grid: SpatialGrid::new(params.interaction_radius(), bounds),
            bounds,
            goal_complete: false,
            steps: 0,
            last_broadcast_reach: 0,
            rng,
        }
    }

    pub fn reset(&mut self, params: &SimulationParams) {
        *self = Self::new(params);
        info!(
            scenario = params.scenario.label(),
            agents = self.agents.len(),
            objects = self.objects.len(),
            "simulation reset"
        );
    }

    // Advance the world by one physics step
    pub fn step(&mut self, params: &SimulationParams) {
        // 1. Snapshot and spatial index
        let snapshot: Vec<Kinematics> = self.agents.iter().map(Agent::kinematics).collect();
        let cell_size = params.interaction_radius();
        if (cell_size - self.grid.cell_size).abs() > 5.0 {
            self.grid = SpatialGrid::new(cell_size, self.bounds);
        }
        if params.enable_spatial_grid {
            self.grid.rebuild(snapshot.iter().map(|k| k.position));
        }

        let jitter: Vec<Vec2> = match params.behavior {
            Behavior::Forage => (0..snapshot.len())
                .map(|_| vec2(self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(-1.0..=1.0)))
                .collect(),
            Behavior::Flock => Vec::new(),
        };
        let obstacles: Vec<Vec2> = self.blocks.iter().map(|b| b.position).collect();

        // 2. Forces from the snapshot
        let intents: Vec<Intent> = {
            let context = self.force_context(params, &snapshot, &obstacles, &jitter);
            if params.enable_parallel {
                (0..snapshot.len()).into_par_iter().map(|i| context.intent(i)).collect()
            } else {
                (0..snapshot.len()).map(|i| context.intent(i)).collect()
            }
        };

        let mut origins = Vec::new();
        for (i, intent) in intents.iter().enumerate() {
            self.agents[i].apply_force(intent.force);
            if let Some(goal) = intent.broadcast {
                origins.push((i, goal));
            }
        }

        // 3. Relay broadcasts
        self.last_broadcast_reach = self.relay(origins, params).len();

        // 4. Pushes, integration, collisions, edges
        for intent in &intents {
            for &(k, impulse) in &intent.pushes {
                self.objects[k].apply_force(impulse);
            }
        }

        let push = params.objects.collision_push;
        for agent in &mut self.agents {
            agent.integrate(params.max_speed);
            for block in &self.blocks {
                agent.collide_block(block);
            }
            for object in &mut self.objects {
                agent.collide_object(object, push);
            }
            match params.edge_mode {
                EdgeMode::Wrap => agent.wrap_edges(self.bounds),
                EdgeMode::Bounce => agent.bounce_edges(self.bounds),
            }
        }

        // 5. Objects
        for object in &mut self.objects {
            object.update(self.bounds);
        }

        // 6. Goal
        if params.colony.enabled {
            self.deliver_settled(params);
        } else {
            let complete = !self.objects.is_empty()
                && self.objects.iter().all(|object| self.goal.contains(object.position));
            if complete && !self.goal_complete {
                info!(steps = self.steps, "all objects are in the goal");
            }
            self.goal_complete = complete;
        }

        // 7. Pheromones
        if params.pheromone.enabled {
            let settings = &params.pheromone;
            for agent in &self.agents {
                self.pheromones.deposit(
                    agent.position,
                    Channel::Trail,
                    settings.trail_deposit,
                    settings.max_concentration,
                );
                if agent.is_recruited() {
                    self.pheromones.deposit(
                        agent.position,
                        Channel::Recruit,
                        settings.recruit_deposit,
                        settings.max_concentration,
                    );
                }
            }
            self.pheromones.step(settings);
        }

        // 8. Per-step bookkeeping
        for agent in &mut self.agents {
            agent.has_received = false;
        }
        self.steps += 1;
    }

    fn force_context<'a>(
        &'a self,
        params: &'a SimulationParams,
        snapshot: &'a [Kinematics],
        obstacles: &'a [Vec2],
        jitter: &'a [Vec2],
    ) -> ForceContext<'a> {
        ForceContext {
            params,
            limits: Limits {
                max_speed: params.max_speed,
                max_force: params.max_force,
            },
            agents: &self.agents,
            snapshot,
            grid: params.enable_spatial_grid.then_some(&self.grid),
            objects: &self.objects,
            obstacles,
            goal: self.goal,
            target: self.target,
            pheromones: params.pheromone.enabled.then_some(&self.pheromones),
            jitter,
        }
    }

    // Breadth-first relay of goals from the given senders. Every agent reached
    // steers toward the goal and gets one round of flocking. Returns the
    // indices reached, in relay order.
    fn relay(&mut self, origins: Vec<(usize, Vec2)>, params: &SimulationParams) -> Vec<usize> {
        if origins.is_empty() {
            return Vec::new();
        }

        let radius = params.objects.broadcast_radius;
        let limits = Limits {
            max_speed: params.max_speed,
            max_force: params.max_force,
        };
        let use_grid = params.enable_spatial_grid;

        if use_grid {
            self.grid.rebuild(self.agents.iter().map(|a| a.position));
        }

        // A sender does not receive its own relay
        for &(sender, _) in &origins {
            self.agents[sender].has_received = true;
        }

        let radius_sq = radius * radius;
        let mut reached = Vec::new();
        let mut queue: VecDeque<(usize, Vec2)> = origins.into();

        while let Some((sender, goal)) = queue.pop_front() {
            let origin = self.agents[sender].position;
            let candidates: Vec<usize> = if use_grid {
                self.grid.query(origin, radius)
            } else {
                (0..self.agents.len()).collect()
            };

            for j in candidates {
                let receiver = &mut self.agents[j];
                if j == sender || receiver.has_received {
                    continue;
                }
                if receiver.position.distance_squared(origin) < radius_sq {
                    receiver.receive(goal, limits);
                    queue.push_back((j, goal));
                    reached.push(j);
                }
            }
        }

        if reached.is_empty() {
            return reached;
        }

        let snapshot: Vec<Kinematics> = self.agents.iter().map(Agent::kinematics).collect();
        let obstacles: Vec<Vec2> = self.blocks.iter().map(|b| b.position).collect();
        let impulses: Vec<Vec2> = {
            let context = self.force_context(params, &snapshot, &obstacles, &[]);
            reached.iter().map(|&j| context.flocking_rules(j)).collect()
        };
        for (&j, impulse) in reached.iter().zip(impulses) {
            self.agents[j].apply_force(impulse);
        }

        debug!(reached = reached.len(), "broadcast relayed");
        reached
    }

    // Balls that reach the nest become food and reappear elsewhere
    fn deliver_settled(&mut self, params: &SimulationParams) {
        for k in 0..self.objects.len() {
            let object = &self.objects[k];
            if object.is_dragging || !self.goal.within(object.position, params.objects.settle_radius) {
                continue;
            }

            self.colony.deliver(&params.colony);
            let position = random_outside_goal(&mut self.rng, self.bounds, &self.goal, params);
            let object = &mut self.objects[k];
            object.position = position;
            object.velocity = Vec2::ZERO;
            info!(food = self.colony.food, delivered = self.colony.delivered, "object delivered to nest");
        }
    }

    pub fn add_agent(&mut self, params: &SimulationParams) {
        let agent = Agent::random(&mut self.rng, self.bounds, params.max_speed);
        self.agents.push(agent);
        debug!(population = self.agents.len(), "agent added");
    }

    pub fn add_agent_at(&mut self, position: Point2, params: &SimulationParams) {
        let agent = Agent::spawn_at(&mut self.rng, position, params.max_speed);
        self.agents.push(agent);
        debug!(population = self.agents.len(), "agent added");
    }

    pub fn remove_agent(&mut self) -> Option<Agent> {
        let removed = self.agents.pop();
        if removed.is_some() {
            debug!(population = self.agents.len(), "agent removed");
        }
        removed
    }

    // Grow or shrink the population to match the agent count slider
    pub fn sync_population(&mut self, params: &SimulationParams) {
        let bounds = self.bounds;
        let rng = &mut self.rng;
        self.agents
            .resize_with(params.num_agents, || Agent::random(&mut *rng, bounds, params.max_speed));
    }

    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    pub fn toggle_target(&mut self, position: Point2) {
        self.target = match self.target {
            Some(current) if current.distance(position) < TARGET_CLEAR_RADIUS => None,
            _ => Some(position),
        };
        debug!(position = ?self.target, "target toggled");
    }

    pub fn place_block(&mut self, position: Point2) {
        self.blocks.push(Block::new(position));
        debug!(blocks = self.blocks.len(), "block placed");
    }

    // Start dragging the ball under the cursor, if any
    pub fn grab_object(&mut self, position: Point2) -> bool {
        match self.objects.iter_mut().find(|object| object.contains(position)) {
            Some(object) => {
                object.start_drag();
                true
            }
            None => false,
        }
    }

    pub fn drag_objects(&mut self, position: Point2) {
        for object in &mut self.objects {
            object.drag_to(position);
        }
    }

    pub fn release_objects(&mut self) {
        for object in self.objects.iter_mut().filter(|object| object.is_dragging) {
            object.end_drag();
        }
    }

    pub fn lay_egg(&mut self, params: &SimulationParams) -> SwarmResult<()> {
        self.colony.lay_egg(&params.colony)?;
        info!(food = self.colony.food, larvae = self.colony.larvae, "egg laid");
        Ok(())
    }

    // Turn a larva into a new agent at the nest
    pub fn hatch(&mut self, params: &SimulationParams) -> SwarmResult<()> {
        if !params.colony.enabled {
            return Err(SwarmError::InvalidParam {
                field: "colony.enabled",
                reason: "the colony economy is switched off".to_string(),
            });
        }
        self.colony.hatch(&params.colony, self.agents.len())?;
        let nest = self.goal.position;
        self.add_agent_at(nest, params);
        info!(
            population = self.agents.len(),
            food = self.colony.food,
            larvae = self.colony.larvae,
            "larva hatched"
        );
        Ok(())
    }

    pub fn recruited_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_recruited()).count()
    }
}

// Random point inside the world, clear of the goal's settle region
fn random_outside_goal<R: Rng>(rng: &mut R, bounds: Rect, goal: &Goal, params: &SimulationParams) -> Point2 {
    let margin = (params.objects.goal_radius + crate::objects::OBJECT_RADIUS).max(params.objects.settle_radius);
    let inner = bounds.pad(crate::objects::OBJECT_RADIUS.min(bounds.w().min(bounds.h()) / 4.0));

    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = pt2(
            rng.gen_range(inner.left()..=inner.right()),
            rng.gen_range(inner.bottom()..=inner.top()),
        );
        if goal.position.distance(candidate) > margin {
            return candidate;
        }
    }

    // Mirror of the goal through the world centre
    bounds.xy() * 2.0 - goal.position
}
