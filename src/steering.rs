/*
 * Steering Module
 *
 * Pure steering-vector maths shared by every behaviour. Each rule follows
 * Reynolds: Steering = Desired - Velocity, with the result capped at the
 * agent's maximum force.
 * 1. Separation: Avoid crowding neighbours and obstacles
 * 2. Alignment: Steer towards the average heading of neighbours
 * 3. Cohesion: Steer towards the average position of neighbours
 */

use nannou::prelude::*;

// Minimal view of an agent needed by the steering rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

// Per-agent limits handed to every rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub max_speed: f32,
    pub max_force: f32,
}

// Scale a vector down to `max` if it is longer
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > max * max && length_squared > 0.0 {
        v * (max / length_squared.sqrt())
    } else {
        v
    }
}

// Point a vector in the same direction with the given length; zero stays zero
#[inline]
pub fn set_magnitude(v: Vec2, magnitude: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > 0.0 {
        v * (magnitude / length_squared.sqrt())
    } else {
        Vec2::ZERO
    }
}

#[inline]
pub fn steer_towards(velocity: Vec2, desired: Vec2, max_force: f32) -> Vec2 {
    limit(desired - velocity, max_force)
}

// Mirror `v` about a unit normal
#[inline]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - normal * (2.0 * v.dot(normal))
}

// Steer at full speed toward a target point
pub fn seek(agent: Kinematics, target: Vec2, limits: Limits) -> Vec2 {
    let to_target = target - agent.position;
    if to_target.length_squared() <= f32::EPSILON {
        return Vec2::ZERO;
    }
    steer_towards(agent.velocity, set_magnitude(to_target, limits.max_speed), limits.max_force)
}

// Average heading of neighbours within `radius`
pub fn alignment(agent: Kinematics, neighbors: &[Kinematics], radius: f32, limits: Limits) -> Vec2 {
    let radius_sq = radius * radius;
    let mut sum = Vec2::ZERO;
    let mut count = 0;

    for other in neighbors {
        let d_squared = agent.position.distance_squared(other.position);
        if d_squared > 0.0 && d_squared < radius_sq {
            sum += other.velocity;
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }

    let average = sum / count as f32;
    if average.length_squared() <= f32::EPSILON {
        return Vec2::ZERO;
    }
    steer_towards(agent.velocity, set_magnitude(average, limits.max_speed), limits.max_force)
}

// Average position of neighbours within `radius`
pub fn cohesion(agent: Kinematics, neighbors: &[Kinematics], radius: f32, limits: Limits) -> Vec2 {
    let radius_sq = radius * radius;
    let mut center = Vec2::ZERO;
    let mut count = 0;

    for other in neighbors {
        let d_squared = agent.position.distance_squared(other.position);
        if d_squared > 0.0 && d_squared < radius_sq {
            center += other.position;
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }

    seek(agent, center / count as f32, limits)
}

// Push away from neighbours inside `radius` and obstacles inside `obstacle_radius`
pub fn separation(
    agent: Kinematics,
    neighbors: &[Kinematics],
    radius: f32,
    obstacles: &[Vec2],
    obstacle_radius: f32,
    limits: Limits,
) -> Vec2 {
    let mut away = Vec2::ZERO;
    let mut count = 0;

    let neighbor_points = neighbors.iter().map(|other| (other.position, radius));
    let obstacle_points = obstacles.iter().map(|&p| (p, obstacle_radius));

    for (point, within) in neighbor_points.chain(obstacle_points) {
        let diff = agent.position - point;
        let d = diff.length();
        if d > 0.0 && d < within {
            // Unit vector pointing away from the neighbour
            away += diff / d;
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }

    away /= count as f32;
    if away.length_squared() <= f32::EPSILON {
        return Vec2::ZERO;
    }
    steer_towards(agent.velocity, set_magnitude(away, limits.max_speed), limits.max_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: Limits = Limits { max_speed: 4.0, max_force: 0.1 };

    fn at(x: f32, y: f32, vx: f32, vy: f32) -> Kinematics {
        Kinematics { position: vec2(x, y), velocity: vec2(vx, vy) }
    }

    #[test]
    fn limit_caps_long_vectors_only() {
        assert_eq!(limit(vec2(3.0, 4.0), 10.0), vec2(3.0, 4.0));
        let capped = limit(vec2(30.0, 40.0), 5.0);
        assert!((capped.length() - 5.0).abs() < 1e-5);
        assert!((capped.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn set_magnitude_keeps_zero() {
        assert_eq!(set_magnitude(Vec2::ZERO, 3.0), Vec2::ZERO);
        assert!((set_magnitude(vec2(0.0, 0.5), 3.0).y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let r = reflect(vec2(1.0, -2.0), vec2(0.0, 1.0));
        assert!((r - vec2(1.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn no_neighbors_means_no_force() {
        let agent = at(0.0, 0.0, 1.0, 0.0);
        assert_eq!(alignment(agent, &[], 50.0, LIMITS), Vec2::ZERO);
        assert_eq!(cohesion(agent, &[], 50.0, LIMITS), Vec2::ZERO);
        assert_eq!(separation(agent, &[], 50.0, &[], 50.0, LIMITS), Vec2::ZERO);
    }

    #[test]
    fn self_and_coincident_neighbors_are_ignored() {
        let agent = at(5.0, 5.0, 1.0, 0.0);
        let neighbors = [agent, at(5.0, 5.0, -1.0, 0.0)];
        assert_eq!(alignment(agent, &neighbors, 50.0, LIMITS), Vec2::ZERO);
        assert_eq!(separation(agent, &neighbors, 50.0, &[], 50.0, LIMITS), Vec2::ZERO);
    }

    #[test]
    fn neighbors_outside_radius_are_ignored() {
        let agent = at(0.0, 0.0, 1.0, 0.0);
        let far = [at(100.0, 0.0, 0.0, 1.0)];
        assert_eq!(cohesion(agent, &far, 50.0, LIMITS), Vec2::ZERO);
        assert_eq!(alignment(agent, &far, 50.0, LIMITS), Vec2::ZERO);
    }

    #[test]
    fn cohesion_pulls_toward_center() {
        let agent = at(0.0, 0.0, 0.0, 0.0);
        let neighbors = [at(10.0, 0.0, 0.0, 0.0), at(10.0, 10.0, 0.0, 0.0), at(10.0, -10.0, 0.0, 0.0)];
        let force = cohesion(agent, &neighbors, 50.0, LIMITS);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn separation_pushes_away_from_neighbors_and_obstacles() {
        let agent = at(0.0, 0.0, 0.0, 0.0);
        let neighbors = [at(5.0, 0.0, 0.0, 0.0)];
        let force = separation(agent, &neighbors, 30.0, &[], 50.0, LIMITS);
        assert!(force.x < 0.0);

        let force = separation(agent, &[], 30.0, &[vec2(0.0, 20.0)], 50.0, LIMITS);
        assert!(force.y < 0.0);
    }

    #[test]
    fn alignment_matches_neighbor_heading() {
        let agent = at(0.0, 0.0, 1.0, 0.0);
        let neighbors = [at(10.0, 0.0, 0.0, 2.0), at(-10.0, 0.0, 0.0, 2.0)];
        let force = alignment(agent, &neighbors, 50.0, LIMITS);
        assert!(force.y > 0.0);
        assert!(force.x < 0.0);
    }

    #[test]
    fn forces_never_exceed_max_force() {
        let agent = at(0.0, 0.0, -4.0, 0.0);
        let neighbors: Vec<Kinematics> = (1..20)
            .map(|i| at(i as f32, (i * 3 % 7) as f32, 4.0, -(i as f32)))
            .collect();
        let obstacles = [vec2(2.0, 2.0), vec2(-3.0, 1.0)];

        for force in [
            alignment(agent, &neighbors, 100.0, LIMITS),
            cohesion(agent, &neighbors, 100.0, LIMITS),
            separation(agent, &neighbors, 100.0, &obstacles, 100.0, LIMITS),
            seek(agent, vec2(500.0, -500.0), LIMITS),
        ] {
            assert!(force.length() <= LIMITS.max_force + 1e-5, "force {:?} too large", force);
        }
    }

    #[test]
    fn seek_at_target_is_zero() {
        let agent = at(3.0, 3.0, 1.0, 1.0);
        assert_eq!(seek(agent, vec2(3.0, 3.0), LIMITS), Vec2::ZERO);
    }
}
