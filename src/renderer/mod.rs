//! 2D rendering
//!
//! Drawing goes through the `Surface` trait so the same code paints the
//! browser canvas and a recording surface in tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use crate::confetti::ConfettiEngine;
use crate::sim::SimulationState;

/// Field background
pub const BACKGROUND: &str = "#25262C";
/// Paddles and ball
pub const FOREGROUND: &str = "#fdd760";
/// Label painted on the player paddle
pub const PLAYER_LABEL: &str = "YOU";

/// Drawing primitives needed by the game
pub trait Surface {
    /// Pixel dimensions (width, height)
    fn size(&self) -> (f32, f32);
    /// Erase everything (transparent)
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str);
    /// Text anchored at (x, y), rotated by `angle` radians
    fn fill_rotated_text(&mut self, text: &str, x: f32, y: f32, angle: f32, color: &str);
    /// Square of side `size` centered at (cx, cy), rotated by `angle` radians
    fn fill_rotated_square(&mut self, cx: f32, cy: f32, size: f32, angle: f32, color: &str);
}

/// Paint the play field
pub fn draw_field(state: &SimulationState, surface: &mut impl Surface) {
    let t = &state.tuning;
    surface.fill_rect(0.0, 0.0, t.field_width, t.field_height, BACKGROUND);

    let player = &state.player;
    surface.fill_rect(0.0, player.y, player.width, player.height, FOREGROUND);
    surface.fill_rotated_text(
        PLAYER_LABEL,
        12.0,
        player.y + 10.0,
        std::f32::consts::FRAC_PI_2,
        BACKGROUND,
    );

    let ai = &state.ai;
    surface.fill_rect(t.field_width - ai.width, ai.y, ai.width, ai.height, FOREGROUND);

    let ball = &state.ball;
    surface.fill_circle(ball.pos.x, ball.pos.y, ball.radius, FOREGROUND);
}

/// Paint the confetti overlay
pub fn draw_confetti(engine: &ConfettiEngine, surface: &mut impl Surface) {
    surface.clear();
    for p in engine.particles() {
        surface.fill_rotated_square(p.pos.x, p.pos.y, p.size, p.angle, p.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::RecordEntry;
    use crate::settings::{ConfettiConfig, Tuning};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Rect(f32, f32, f32, f32, String),
        Circle(f32, f32, f32, String),
        Text(String, f32),
        Square(String),
    }

    #[derive(Default)]
    struct Recording {
        ops: Vec<Op>,
    }

    impl Surface for Recording {
        fn size(&self) -> (f32, f32) {
            (800.0, 500.0)
        }

        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
            self.ops.push(Op::Rect(x, y, w, h, color.to_string()));
        }

        fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
            self.ops.push(Op::Circle(x, y, radius, color.to_string()));
        }

        fn fill_rotated_text(&mut self, text: &str, _x: f32, _y: f32, angle: f32, _color: &str) {
            self.ops.push(Op::Text(text.to_string(), angle));
        }

        fn fill_rotated_square(&mut self, _cx: f32, _cy: f32, _size: f32, _angle: f32, color: &str) {
            self.ops.push(Op::Square(color.to_string()));
        }
    }

    #[test]
    fn test_field_layout() {
        let state = SimulationState::new(Tuning::default(), RecordEntry::default());
        let mut surface = Recording::default();
        draw_field(&state, &mut surface);

        assert_eq!(
            surface.ops,
            vec![
                Op::Rect(0.0, 0.0, 800.0, 500.0, BACKGROUND.into()),
                Op::Rect(0.0, 200.0, 40.0, 100.0, FOREGROUND.into()),
                Op::Text(PLAYER_LABEL.into(), std::f32::consts::FRAC_PI_2),
                Op::Rect(760.0, 200.0, 40.0, 100.0, FOREGROUND.into()),
                Op::Circle(400.0, 250.0, 20.0, FOREGROUND.into()),
            ]
        );
    }

    #[test]
    fn test_confetti_overlay() {
        let mut engine = ConfettiEngine::new(ConfettiConfig::default(), 800.0, 500.0, 3);
        engine.trigger(0.0);
        engine.step(200.0);
        let mut surface = Recording::default();
        draw_confetti(&engine, &mut surface);

        assert_eq!(surface.ops.first(), Some(&Op::Clear));
        assert_eq!(surface.ops.len(), 1 + engine.len());
    }
}
