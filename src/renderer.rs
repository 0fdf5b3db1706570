/*
 * Renderer Module
 *
 * This module handles the rendering of the swarm simulation.
 * The world is scaled uniformly to fit the window. It draws the pheromone
 * heat map, the goal, blocks, balls and agents (as a sprite when one was
 * loaded, otherwise a triangle pointing along the velocity), then the HUD
 * and the egui panel on top.
 */

use nannou::prelude::*;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use tracing::warn;

use crate::agent::{Agent, AGENT_SIZE};
use crate::app::Model;
use crate::error::{SwarmError, SwarmResult};
use crate::pheromone::{Channel, PheromoneField};
use crate::swarm::Swarm;
use crate::ui;

// Cells fainter than this fraction of the clamp are not drawn
const HEATMAP_CUTOFF: f32 = 0.02;
const TARGET_COLOR: (f32, f32, f32) = (1.0, 0.7, 0.24);

pub fn load_sprite(app: &App, path: &Path) -> SwarmResult<wgpu::Texture> {
    wgpu::Texture::from_path(app, path).map_err(|err| SwarmError::Sprite {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

// Uniform scale that fits the whole world inside the window
pub fn view_scale(window_rect: Rect, world: Rect) -> f32 {
    (window_rect.w() / world.w()).min(window_rect.h() / world.h())
}

pub fn screen_to_world(pos: Point2, window_rect: Rect, world: Rect) -> Point2 {
    pos / view_scale(window_rect, world)
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let swarm = &model.swarm;
    let params = &model.params;
    let world = draw.scale(view_scale(window_rect, swarm.bounds));

    // World boundary
    world
        .rect()
        .xy(swarm.bounds.xy())
        .wh(swarm.bounds.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    if params.show_pheromones {
        draw_pheromones(&world, &swarm.pheromones, params.pheromone.max_concentration);
    }

    draw_scene(&world, swarm);

    if params.show_fov {
        for agent in &swarm.agents {
            world
                .ellipse()
                .xy(agent.position)
                .radius(params.flocking.neighbor_radius)
                .no_fill()
                .stroke(rgba(0.4, 0.4, 1.0, 0.15))
                .stroke_weight(1.0);
            world
                .ellipse()
                .xy(agent.position)
                .radius(params.flocking.separation_radius)
                .no_fill()
                .stroke(rgba(1.0, 0.3, 0.3, 0.25))
                .stroke_weight(1.0);
        }
    }

    for agent in &swarm.agents {
        match &model.sprite {
            Some(texture) => draw_sprite(&world, texture, agent),
            None => draw_triangle(&world, agent),
        }
    }

    let hud_bottom = ui::draw_hud(&draw, window_rect, swarm, params);
    if params.show_debug {
        ui::draw_debug_info(&draw, window_rect, &model.debug_info, swarm.agents.len(), hud_bottom);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to render frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to render control panel");
    }
}

fn draw_scene(draw: &Draw, swarm: &Swarm) {
    // Goal: outline while open, filled once every ball is in
    let goal = draw.ellipse().xy(swarm.goal.position).radius(swarm.goal.radius);
    if swarm.goal_complete {
        goal.color(rgb(0.0, 1.0, 0.0));
    } else {
        goal.no_fill().stroke(rgb(0.0, 1.0, 0.0)).stroke_weight(3.0);
    }

    for block in &swarm.blocks {
        draw.rect().xy(block.position).w_h(block.size, block.size).color(WHITE);
    }

    for object in &swarm.objects {
        draw.ellipse().xy(object.position).radius(object.radius).color(rgb(1.0, 1.0, 0.0));
    }

    if let Some(target) = swarm.target {
        let (r, g, b) = TARGET_COLOR;
        draw.ellipse().xy(target).radius(6.0).color(rgb(r, g, b));
    }
}

fn agent_color(agent: &Agent) -> Rgb {
    if agent.flash > 0 || agent.is_recruited() {
        rgb(0.0, 1.0, 0.0)
    } else {
        rgb(1.0, 1.0, 1.0)
    }
}

fn draw_triangle(draw: &Draw, agent: &Agent) {
    let angle = agent.heading();
    let corner = |offset: f32| agent.position + vec2((angle + offset).cos(), (angle + offset).sin()) * AGENT_SIZE;

    draw.tri()
        .points(corner(0.0), corner(2.5), corner(-2.5))
        .color(agent_color(agent));
}

// Sprites are drawn pointing up, so turn them a quarter from the heading
fn draw_sprite(draw: &Draw, texture: &wgpu::Texture, agent: &Agent) {
    draw.texture(texture)
        .xy(agent.position)
        .w_h(AGENT_SIZE * 4.0, AGENT_SIZE * 4.0)
        .rotate(agent.heading() - FRAC_PI_2);
}

fn draw_pheromones(draw: &Draw, field: &PheromoneField, max_concentration: f32) {
    let size = field.cell_size;
    for row in 0..field.rows {
        for col in 0..field.cols {
            let trail = field.value(col, row, Channel::Trail) / max_concentration;
            let recruit = field.value(col, row, Channel::Recruit) / max_concentration;
            let strength = trail.max(recruit);
            if strength < HEATMAP_CUTOFF {
                continue;
            }
            draw.rect()
                .xy(field.cell_center(col, row))
                .w_h(size, size)
                .color(rgba(recruit, 0.2 * trail, trail, 0.6 * strength));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_fits_world_in_window() {
        let world = Rect::from_w_h(1000.0, 1000.0);
        assert_eq!(view_scale(Rect::from_w_h(800.0, 600.0), world), 0.6);
        assert_eq!(view_scale(Rect::from_w_h(2000.0, 3000.0), world), 2.0);
    }

    #[test]
    fn screen_points_map_back_to_world() {
        let world = Rect::from_w_h(1000.0, 1000.0);
        let window = Rect::from_w_h(500.0, 500.0);
        assert_eq!(screen_to_world(pt2(100.0, -50.0), window, world), pt2(200.0, -100.0));
    }
}
