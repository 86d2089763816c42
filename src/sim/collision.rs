//! Collision detection and response
//!
//! The field is an axis-aligned box: walls on top and bottom, the player
//! paddle flush with the left edge and the AI paddle flush with the right.

use glam::Vec2;

use super::state::{Ball, Paddle};
use crate::consts::{MAX_BOUNCE_ANGLE, PADDLE_CONTACT_SLACK, WALL_CONTACT_MARGIN};

/// Which edge the ball has left the field through, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryExit {
    Left,
    Right,
}

/// Check whether the ball's leading edge is past a goal line
pub fn boundary_exit(ball: &Ball, field_width: f32) -> Option<BoundaryExit> {
    if ball.left() < 0.0 {
        Some(BoundaryExit::Left)
    } else if ball.right() > field_width {
        Some(BoundaryExit::Right)
    } else {
        None
    }
}

/// Reflect off the top/bottom walls.
///
/// Inverts the vertical velocity and pulls the ball one pixel inside the
/// wall so it cannot stick or tunnel. Returns true on a bounce.
pub fn reflect_off_walls(ball: &mut Ball, field_height: f32) -> bool {
    if ball.bottom() > field_height || ball.top() < 0.0 {
        ball.vel.y = -ball.vel.y;
        let min = ball.radius + 1.0;
        let max = (field_height - ball.radius - 1.0).max(min);
        ball.pos.y = ball.pos.y.clamp(min, max);
        true
    } else {
        false
    }
}

/// Whether the ball overlaps the player paddle's contact zone.
///
/// Contacts within `WALL_CONTACT_MARGIN` of a wall are ignored; the wall
/// reflection already handled that tick.
pub fn touches_player(ball: &Ball, paddle: &Paddle, field_height: f32) -> bool {
    ball.left() <= paddle.width + PADDLE_CONTACT_SLACK
        && paddle.spans(ball)
        && ball.top() > WALL_CONTACT_MARGIN
        && ball.bottom() < field_height - WALL_CONTACT_MARGIN
}

/// Whether the ball is entering the AI paddle (flush with the right edge)
pub fn touches_ai(ball: &Ball, paddle: &Paddle, field_width: f32) -> bool {
    ball.right() > field_width - paddle.width && paddle.spans(ball) && ball.vel.x > 0.0
}

/// Bounce angle for a return, from the impact offset to the paddle center.
///
/// Zero at the center, `±MAX_BOUNCE_ANGLE` at (or beyond) the paddle edges.
pub fn bounce_angle(ball_y: f32, paddle: &Paddle) -> f32 {
    let half = paddle.height / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    let offset = ((ball_y - paddle.center_y()) / half).clamp(-1.0, 1.0);
    offset * MAX_BOUNCE_ANGLE
}

/// Velocity leaving the player paddle (always toward the AI side)
pub fn return_velocity(speed: f32, angle: f32) -> Vec2 {
    Vec2::new(speed * angle.cos(), speed * angle.sin())
}
