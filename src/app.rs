/*
 * Application Module
 *
 * This module defines the main application model and the nannou update loop.
 * Physics runs on a fixed timestep: frame time is accumulated and the swarm
 * is stepped once per `1 / physics_fps` seconds, independent of the render
 * rate. Launch parameters are handed over from main before nannou starts.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::debug::DebugInfo;
use crate::input;
use crate::params::SimulationParams;
use crate::renderer;
use crate::swarm::Swarm;
use crate::ui;

// Upper bound on catch-up steps after a slow frame
const MAX_STEPS_PER_FRAME: usize = 8;

static LAUNCH_PARAMS: OnceLock<SimulationParams> = OnceLock::new();

/// Hand the validated parameters to the nannou model builder.
pub fn set_launch_params(params: SimulationParams) -> Result<(), SimulationParams> {
    LAUNCH_PARAMS.set(params)
}

// Main model for the application
pub struct Model {
    pub swarm: Swarm,
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub sprite: Option<wgpu::Texture>,
    pub mouse_position: Vec2,
    // Fixed timestep physics variables
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
}

fn fatal(what: &str, err: impl std::fmt::Debug) -> ! {
    error!(?err, "{}", what);
    std::process::exit(1);
}

fn step_size(params: &SimulationParams) -> Duration {
    Duration::from_secs_f32(1.0 / params.physics_fps.max(1.0))
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let params = LAUNCH_PARAMS.get().cloned().unwrap_or_default();

    let window_id = app
        .new_window()
        .title(format!("Swarm Simulation - {}", params.scenario.label()))
        .size(params.world_width as u32, params.world_height as u32)
        .view(renderer::view)
        .key_pressed(input::key_pressed)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .raw_event(input::raw_window_event)
        .build()
        .unwrap_or_else(|err| fatal("failed to open window", err));

    let egui = match app.window(window_id) {
        Some(window) => Egui::from_window(&window),
        None => fatal("window closed during startup", "missing window"),
    };

    let sprite = params.sprite_path.as_deref().and_then(|path| {
        match renderer::load_sprite(app, path) {
            Ok(texture) => {
                info!(path = %path.display(), "loaded agent sprite");
                Some(texture)
            }
            Err(err) => {
                warn!(%err, "falling back to drawn agents");
                None
            }
        }
    });

    let swarm = Swarm::new(&params);
    info!(
        scenario = params.scenario.label(),
        agents = swarm.agents.len(),
        objects = swarm.objects.len(),
        pheromones = params.pheromone.enabled,
        colony = params.colony.enabled,
        "simulation started"
    );

    Model {
        swarm,
        physics_step_size: step_size(&params),
        params,
        egui,
        debug_info: DebugInfo::default(),
        sprite,
        mouse_position: Vec2::ZERO,
        physics_accumulator: Duration::ZERO,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.egui.set_elapsed_time(update.since_start);
    let outcome = ui::update_ui(&mut model.egui, &mut model.params, &model.swarm, &model.debug_info);

    for command in outcome.commands {
        input::dispatch(model, command);
    }
    if outcome.num_agents_changed {
        model.swarm.sync_population(&model.params);
    }
    if outcome.any_changed {
        model.physics_step_size = step_size(&model.params);
    }

    let current_time = Instant::now();
    let frame_time = current_time.duration_since(model.last_update_time);
    model.last_update_time = current_time;

    let mut physics_updates_this_frame = 0;
    if model.params.pause_simulation {
        model.physics_accumulator = Duration::ZERO;
    } else {
        model.physics_accumulator += frame_time;

        while model.physics_accumulator >= model.physics_step_size {
            model.swarm.step(&model.params);
            model.physics_accumulator -= model.physics_step_size;
            physics_updates_this_frame += 1;

            if physics_updates_this_frame >= MAX_STEPS_PER_FRAME {
                model.physics_accumulator = Duration::ZERO;
                break;
            }
        }
    }

    model
        .debug_info
        .record_frame(app.fps(), update.since_last, physics_updates_this_frame);
    model.debug_info.record_swarm(&model.swarm);
}
