/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and simulation counters to be displayed in the UI and the debug overlay.
 *
 * Includes metrics for:
 * - FPS and frame time
 * - Physics steps run per frame
 * - Broadcast reach and recruited agents
 * - Pheromone totals per channel
 */

use std::time::Duration;

use crate::pheromone::Channel;
use crate::swarm::Swarm;

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_updates_per_frame: usize,
    pub steps: u64,
    pub recruited: usize,
    pub broadcast_reach: usize,
    pub trail_total: f32,
    pub recruit_total: f32,
}

impl DebugInfo {
    pub fn record_frame(&mut self, fps: f32, frame_time: Duration, physics_updates: usize) {
        self.fps = fps;
        self.frame_time = frame_time;
        self.physics_updates_per_frame = physics_updates;
    }

    pub fn record_swarm(&mut self, swarm: &Swarm) {
        self.steps = swarm.steps;
        self.recruited = swarm.recruited_count();
        self.broadcast_reach = swarm.last_broadcast_reach;
        self.trail_total = swarm.pheromones.total(Channel::Trail);
        self.recruit_total = swarm.pheromones.total(Channel::Recruit);
    }

    pub fn lines(&self, population: usize) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Physics steps/frame: {}", self.physics_updates_per_frame),
            format!("Step: {}", self.steps),
            format!("Agents: {} ({} recruited)", population, self.recruited),
            format!("Last broadcast reach: {}", self.broadcast_reach),
            format!("Pheromone trail/recruit: {:.1} / {:.1}", self.trail_total, self.recruit_total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Scenario, SimulationParams};

    #[test]
    fn records_swarm_counters() {
        let params = SimulationParams {
            seed: Some(1),
            ..SimulationParams::for_scenario(Scenario::Colony)
        };
        let mut swarm = Swarm::new(&params);
        swarm.step(&params);

        let mut info = DebugInfo::default();
        info.record_swarm(&swarm);
        assert_eq!(info.steps, 1);
        assert!(info.trail_total > 0.0);
        assert_eq!(info.lines(swarm.agents.len()).len(), 7);
    }
}
