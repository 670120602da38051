//! Character physics: force-driven velocity with friction, and axis-separated
//! collision against blocking boxes.
//!
//! Algorithm per tick:
//! 1. `a = intent * force`
//! 2. `v = v * (1 - friction) + a * dt`, clamped to `max_speed`
//! 3. No intent and `|v| < STOP_SPEED` snaps `v` to zero
//! 4. Move on x, push out of any overlapped box along x, zero `v.x`
//! 5. Same for y
//!
//! Resolving one axis at a time keeps fast characters from tunnelling and
//! lets them slide along walls instead of snagging on corners.

use serde::{Deserialize, Serialize};

use crate::constants::STOP_SPEED;
use crate::geometry::{Rect, Vec2};

/// Tunable motion constants for one kind of character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Velocity cap in pixels per second.
    pub max_speed: f32,
    /// Acceleration applied along the intent vector.
    pub force: f32,
    /// Fraction of velocity lost every tick (0 = none, 1 = all).
    pub friction: f32,
}

/// Per-character kinematic state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Desired movement direction; input for the player, steering for guests.
    pub intent: Vec2,
}

impl Kinematics {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Drop intent and residual velocity at once.
    pub fn halt(&mut self) {
        self.intent = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Update velocity from intent, friction and the speed cap.
pub fn integrate_velocity(kin: &mut Kinematics, params: &MotionParams, dt: f32) {
    kin.acceleration = kin.intent * params.force;
    kin.velocity = kin.velocity * (1.0 - params.friction) + kin.acceleration * dt;
    kin.velocity = kin.velocity.clamp_length(params.max_speed);
    if kin.intent.is_zero() && kin.velocity.length() < STOP_SPEED {
        kin.velocity = Vec2::ZERO;
    }
}

fn resolve_axis(hitbox: &mut Rect, velocity: &mut Vec2, axis: Axis, obstacles: &[Rect]) {
    for obstacle in obstacles {
        if !hitbox.intersects(obstacle) {
            continue;
        }
        match axis {
            Axis::X => {
                if velocity.x > 0.0 {
                    hitbox.set_right(obstacle.left());
                } else if velocity.x < 0.0 {
                    hitbox.set_left(obstacle.right());
                }
                velocity.x = 0.0;
            }
            Axis::Y => {
                if velocity.y > 0.0 {
                    hitbox.set_bottom(obstacle.top());
                } else if velocity.y < 0.0 {
                    hitbox.set_top(obstacle.bottom());
                }
                velocity.y = 0.0;
            }
        }
    }
}

/// Move a hitbox by the current velocity, resolving collisions per axis.
pub fn move_and_collide(hitbox: &mut Rect, kin: &mut Kinematics, dt: f32, obstacles: &[Rect]) {
    hitbox.x += kin.velocity.x * dt;
    resolve_axis(hitbox, &mut kin.velocity, Axis::X, obstacles);

    hitbox.y += kin.velocity.y * dt;
    resolve_axis(hitbox, &mut kin.velocity, Axis::Y, obstacles);
}

/// One full physics step: integrate, then move with collision.
pub fn step(
    hitbox: &mut Rect,
    kin: &mut Kinematics,
    params: &MotionParams,
    dt: f32,
    obstacles: &[Rect],
) {
    integrate_velocity(kin, params, dt);
    move_and_collide(hitbox, kin, dt, obstacles);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> MotionParams {
        MotionParams {
            max_speed: 200.0,
            force: 2000.0,
            friction: 0.1,
        }
    }

    #[test]
    fn test_intent_accelerates_and_caps_speed() {
        let mut kin = Kinematics {
            intent: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        integrate_velocity(&mut kin, &params(), 0.016);
        assert!(kin.velocity.x > 0.0);
        for _ in 0..200 {
            integrate_velocity(&mut kin, &params(), 0.016);
        }
        assert!(kin.speed() <= 200.0 + 1e-3);
    }

    #[test]
    fn test_friction_snaps_to_rest() {
        let mut kin = Kinematics {
            velocity: Vec2::new(50.0, 0.0),
            ..Default::default()
        };
        for _ in 0..100 {
            integrate_velocity(&mut kin, &params(), 0.016);
        }
        assert_eq!(kin.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_collision_pushes_out_along_x() {
        let wall = Rect::new(20.0, 0.0, 10.0, 100.0);
        let mut hitbox = Rect::new(0.0, 40.0, 10.0, 10.0);
        let mut kin = Kinematics {
            velocity: Vec2::new(1000.0, 0.0),
            ..Default::default()
        };
        move_and_collide(&mut hitbox, &mut kin, 0.015, &[wall]);
        assert_eq!(hitbox.right(), 20.0);
        assert_eq!(kin.velocity.x, 0.0);
    }

    #[test]
    fn test_slides_along_wall() {
        // Moving diagonally into a wall on the right keeps the y motion.
        let wall = Rect::new(20.0, 0.0, 10.0, 100.0);
        let mut hitbox = Rect::new(5.0, 40.0, 10.0, 10.0);
        let mut kin = Kinematics {
            velocity: Vec2::new(600.0, 300.0),
            ..Default::default()
        };
        move_and_collide(&mut hitbox, &mut kin, 0.02, &[wall]);
        assert_eq!(hitbox.right(), 20.0);
        assert!((hitbox.top() - 46.0).abs() < 1e-4);
        assert_eq!(kin.velocity.x, 0.0);
        assert_eq!(kin.velocity.y, 300.0);
    }

    #[test]
    fn test_collision_pushes_out_along_y() {
        let floor = Rect::new(0.0, 30.0, 100.0, 10.0);
        let mut hitbox = Rect::new(40.0, 15.0, 10.0, 10.0);
        let mut kin = Kinematics {
            velocity: Vec2::new(0.0, 500.0),
            ..Default::default()
        };
        move_and_collide(&mut hitbox, &mut kin, 0.02, &[floor]);
        assert_eq!(hitbox.bottom(), 30.0);
        assert_eq!(kin.velocity.y, 0.0);
    }
}
