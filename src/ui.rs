/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for adjusting simulation parameters
 * and buttons that issue the same Commands as the keyboard. The HUD and the
 * debug overlay are drawn with nannou text.
 */

use nannou::prelude::*;
use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::input::Command;
use crate::params::{Scenario, SimulationParams};
use crate::swarm::Swarm;

// What the panel asked for this frame
#[derive(Debug, Default)]
pub struct UiOutcome {
    pub commands: Vec<Command>,
    pub num_agents_changed: bool,
    pub any_changed: bool,
}

// A "-" / "+" button pair next to a label
fn nudge_row(ui: &mut egui::Ui, label: &str, commands: &mut Vec<Command>, make: fn(bool) -> Command) {
    ui.horizontal(|ui| {
        if ui.button("-").clicked() {
            commands.push(make(false));
        }
        if ui.button("+").clicked() {
            commands.push(make(true));
        }
        ui.label(label);
    });
}

// Update the UI and return the commands it issued and what changed
pub fn update_ui(egui: &mut Egui, params: &mut SimulationParams, swarm: &Swarm, debug_info: &DebugInfo) -> UiOutcome {
    let mut commands = Vec::new();

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Swarm Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Scenario", |ui| {
                let mut scenario = params.scenario;
                for option in [Scenario::Flocking, Scenario::Target, Scenario::Soccer, Scenario::Colony] {
                    ui.radio_value(&mut scenario, option, option.label());
                }
                if scenario != params.scenario {
                    commands.push(Command::SwitchScenario(scenario));
                }
                if ui.button("Reset").clicked() {
                    commands.push(Command::Reset);
                }
            });

            ui.collapsing("Agents", |ui| {
                let agents_range = params.num_agents_range();
                ui.add(egui::Slider::new(&mut params.num_agents, agents_range).text("Agents"));
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        commands.push(Command::AddAgent);
                    }
                    if ui.button("Remove").clicked() {
                        commands.push(Command::RemoveAgent);
                    }
                });
                ui.add(egui::Slider::new(&mut params.max_speed, SimulationParams::get_max_speed_range()).text("Max Speed"));
                ui.add(egui::Slider::new(&mut params.max_force, SimulationParams::get_max_force_range()).text("Max Force"));
            });

            ui.collapsing("Flocking Behavior", |ui| {
                let flocking = &mut params.flocking;
                ui.add(egui::Slider::new(&mut flocking.separation_weight, SimulationParams::get_weight_range()).text("Separation Weight"));
                ui.add(egui::Slider::new(&mut flocking.alignment_weight, SimulationParams::get_weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut flocking.cohesion_weight, SimulationParams::get_weight_range()).text("Cohesion Weight"));
                ui.add(egui::Slider::new(&mut flocking.target_attraction, SimulationParams::get_rate_range()).text("Target Attraction"));
                ui.add(egui::Slider::new(&mut flocking.neighbor_radius, SimulationParams::get_radius_range()).text("Neighbor Radius"));
                ui.add(egui::Slider::new(&mut flocking.separation_radius, SimulationParams::get_radius_range()).text("Separation Radius"));
                ui.add(egui::Slider::new(&mut flocking.obstacle_separation_radius, SimulationParams::get_radius_range()).text("Obstacle Separation"));

                nudge_row(ui, "Neighbor radius", &mut commands, Command::NeighborRadius);
                nudge_row(ui, "Separation radius", &mut commands, Command::SeparationRadius);
                nudge_row(ui, "Obstacle radius", &mut commands, Command::ObstacleRadius);
            });

            ui.collapsing("Objects", |ui| {
                let objects = &mut params.objects;
                ui.add(egui::Slider::new(&mut objects.push_force, SimulationParams::get_rate_range()).text("Push Force"));
                ui.add(egui::Slider::new(&mut objects.attraction_radius, SimulationParams::get_radius_range()).text("Attraction Radius"));
                ui.add(egui::Slider::new(&mut objects.broadcast_radius, SimulationParams::get_radius_range()).text("Broadcast Radius"));
                ui.label(if swarm.goal_complete { "Goal: complete" } else { "Goal: open" });
            });

            ui.collapsing("Pheromones", |ui| {
                let pheromone = &mut params.pheromone;
                ui.checkbox(&mut pheromone.enabled, "Enabled");
                ui.add(egui::Slider::new(&mut pheromone.evaporation_rate, SimulationParams::get_rate_range()).text("Evaporation"));
                ui.add(egui::Slider::new(&mut pheromone.diffusion_rate, SimulationParams::get_rate_range()).text("Diffusion"));
                ui.add(egui::Slider::new(&mut pheromone.follow_weight, SimulationParams::get_weight_range()).text("Follow Weight"));
            });

            ui.collapsing("Colony", |ui| {
                ui.checkbox(&mut params.colony.enabled, "Economy");
                ui.label(format!("Food: {}  Larvae: {}  Hatched: {}", swarm.colony.food, swarm.colony.larvae, swarm.colony.hatched));
                ui.horizontal(|ui| {
                    if ui.button("Lay egg").clicked() {
                        commands.push(Command::LayEgg);
                    }
                    if ui.button("Hatch").clicked() {
                        commands.push(Command::Hatch);
                    }
                });
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.checkbox(&mut params.enable_spatial_grid, "Enable Spatial Grid");
                ui.add(egui::Slider::new(&mut params.physics_fps, 10.0..=120.0).text("Physics FPS"));

                ui.separator();

                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Total Agents: {}", swarm.agents.len()));
            });

            ui.checkbox(&mut params.show_fov, "Show Field of View");
            ui.checkbox(&mut params.show_pheromones, "Show Pheromones");
            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    let (num_agents_changed, any_changed) = params.detect_changes();
    UiOutcome {
        commands,
        num_agents_changed,
        any_changed,
    }
}

fn draw_panel(draw: &Draw, window_rect: Rect, lines: &[String], top: f32) {
    let margin = 20.0;
    let line_height = 18.0;
    let panel_width = 260.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = top - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(rgba(0.0, 0.0, 0.0, 0.7));

    let text_y = top - margin;
    for (i, text) in lines.iter().enumerate() {
        draw.text(text)
            .x_y(panel_x, text_y - i as f32 * line_height)
            .w(panel_width - margin)
            .left_justify()
            .color(WHITE)
            .font_size(13);
    }
}

// Simulation status in the top-right corner
pub fn draw_hud(draw: &Draw, window_rect: Rect, swarm: &Swarm, params: &SimulationParams) -> f32 {
    let mut lines = vec![
        format!("Scenario: {}", params.scenario.label()),
        format!("Agents: {}", swarm.agents.len()),
        format!("Max Speed: {:.1}", params.max_speed),
        format!("Max Force: {:.2}", params.max_force),
        format!("Neighbor Radius: {:.0}", params.flocking.neighbor_radius),
        format!("Separation Radius: {:.0}", params.flocking.separation_radius),
        format!("Object Separation: {:.0}", params.flocking.obstacle_separation_radius),
    ];
    if params.colony.enabled {
        lines.push(format!("Food: {}  Larvae: {}", swarm.colony.food, swarm.colony.larvae));
    }
    if swarm.goal_complete {
        lines.push("All objects in goal".to_string());
    }
    if params.pause_simulation {
        lines.push("Paused".to_string());
    }

    draw_panel(draw, window_rect, &lines, window_rect.top());
    window_rect.top() - 18.0 * lines.len() as f32 - 30.0
}

// Draw debug information below the HUD
pub fn draw_debug_info(draw: &Draw, window_rect: Rect, debug_info: &DebugInfo, population: usize, top: f32) {
    draw_panel(draw, window_rect, &debug_info.lines(population), top);
}
