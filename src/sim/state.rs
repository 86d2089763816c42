//! Game state and core simulation types
//!
//! Everything a frame needs lives in `SimulationState`; it is only changed by
//! `start_round` and `advance_frame`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clamp_paddle_y;
use crate::highscores::RecordEntry;
use crate::settings::Tuning;

/// Which round of the game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Goal-based round: reach the rally target or beat the AI
    One,
    /// Endurance round: speed keeps growing until someone misses
    Two,
}

/// Round lifecycle. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Idle,
    Phase1Running,
    Phase1Won,
    Phase1Lost,
    Phase2Running,
    Phase2Won,
    Phase2Lost,
}

impl RoundState {
    pub fn running(phase: Phase) -> Self {
        match phase {
            Phase::One => RoundState::Phase1Running,
            Phase::Two => RoundState::Phase2Running,
        }
    }

    pub fn finished(phase: Phase, outcome: Outcome) -> Self {
        match (phase, outcome) {
            (Phase::One, Outcome::Won) => RoundState::Phase1Won,
            (Phase::One, Outcome::Lost) => RoundState::Phase1Lost,
            (Phase::Two, Outcome::Won) => RoundState::Phase2Won,
            (Phase::Two, Outcome::Lost) => RoundState::Phase2Lost,
        }
    }

    /// Phase this state belongs to (`None` while idle)
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RoundState::Idle => None,
            RoundState::Phase1Running | RoundState::Phase1Won | RoundState::Phase1Lost => {
                Some(Phase::One)
            }
            RoundState::Phase2Running | RoundState::Phase2Won | RoundState::Phase2Lost => {
                Some(Phase::Two)
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RoundState::Phase1Running | RoundState::Phase2Running)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            RoundState::Phase1Won | RoundState::Phase2Won => Some(Outcome::Won),
            RoundState::Phase1Lost | RoundState::Phase2Lost => Some(Outcome::Lost),
            _ => None,
        }
    }
}

/// How a round ended for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Ball left through the player's (left) edge
    LeftEdge,
    /// Ball left through the AI's (right) edge
    RightEdge,
    /// Phase 1 rally target reached
    GoalReached,
}

impl EndReason {
    pub fn outcome(&self) -> Outcome {
        match self {
            EndReason::LeftEdge => Outcome::Lost,
            EndReason::RightEdge | EndReason::GoalReached => Outcome::Won,
        }
    }
}

/// Saturating count of player returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyCounter {
    count: u32,
    cap: u32,
}

impl RallyCounter {
    pub fn new(cap: u32) -> Self {
        Self { count: 0, cap }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Add one return, saturating at the cap
    pub fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1).min(self.cap);
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.cap
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.radius
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

/// A paddle (player on the left, AI on the right)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the ball's vertical extent meets the paddle's
    pub fn spans(&self, ball: &Ball) -> bool {
        ball.bottom() >= self.y && ball.top() <= self.bottom()
    }
}

/// Summary published when a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub phase: Phase,
    pub outcome: Outcome,
    pub reason: EndReason,
    /// Final rally count of the phase's counter
    pub rallies: u32,
}

/// Things that happened during a frame (consumed by the controller)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Ball bounced off the top or bottom wall
    WallBounce,
    /// Player returned the ball
    PlayerReturn { rallies: u32, speed: f32 },
    /// AI returned the ball
    AiReturn,
    /// Phase 2 count beat the record; must be persisted
    RecordBroken(RecordEntry),
    /// Round ended; no further frames will run
    RoundOver(RoundSummary),
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub tuning: Tuning,
    pub round: RoundState,
    pub ball: Ball,
    pub player: Paddle,
    pub ai: Paddle,
    /// Phase 1 returns, bounded by the rally goal
    pub goal_rallies: RallyCounter,
    /// Phase 2 returns, bounded by the rally cap
    pub endurance_rallies: RallyCounter,
    /// Phase 2 speed accumulated from frames and returns
    pub extra_speed: f32,
    /// One-shot latch so an overlap episode resolves only once
    pub player_collision_active: bool,
    pub player_name: String,
    pub record: RecordEntry,
    /// Frames simulated in the current round
    pub frame: u64,
}

impl SimulationState {
    /// Idle state with the ball and paddles centered
    pub fn new(tuning: Tuning, record: RecordEntry) -> Self {
        let paddle = |y| Paddle {
            y,
            width: tuning.paddle_width,
            height: tuning.paddle_height,
        };
        Self {
            tuning,
            round: RoundState::Idle,
            ball: Ball {
                pos: Vec2::new(tuning.field_width / 2.0, tuning.field_height / 2.0),
                vel: Vec2::ZERO,
                radius: tuning.ball_radius,
            },
            player: paddle(tuning.paddle_center_y()),
            ai: paddle(tuning.paddle_center_y()),
            goal_rallies: RallyCounter::new(tuning.goal_rallies),
            endurance_rallies: RallyCounter::new(tuning.rally_cap),
            extra_speed: 0.0,
            player_collision_active: false,
            player_name: String::new(),
            record,
            frame: 0,
        }
    }

    /// Reset ball, paddles and counters and start running `phase`
    pub fn start_round<R: Rng + ?Sized>(&mut self, phase: Phase, player_name: &str, rng: &mut R) {
        let t = self.tuning;

        self.ball.pos = Vec2::new(t.field_width / 2.0, t.field_height / 2.0);
        self.ball.vel = Vec2::new(
            t.base_speed * random_sign(rng),
            t.serve_vertical_speed * random_sign(rng),
        );
        self.player.y = t.paddle_center_y();
        self.ai.y = t.paddle_center_y();
        self.goal_rallies.reset();
        self.endurance_rallies.reset();
        self.extra_speed = 0.0;
        self.player_collision_active = false;
        self.player_name = player_name.to_string();
        self.frame = 0;
        self.round = RoundState::running(phase);

        log::info!(
            "{:?} round started for {} (serve {:.1}, {:.1})",
            phase,
            self.player_name,
            self.ball.vel.x,
            self.ball.vel.y
        );
    }

    /// Stop the round with the given reason and summarize it
    pub fn end_round(&mut self, reason: EndReason) -> Option<RoundSummary> {
        let phase = self.phase().filter(|_| self.round.is_running())?;
        let outcome = reason.outcome();
        self.round = RoundState::finished(phase, outcome);
        self.player_collision_active = false;

        let summary = RoundSummary {
            phase,
            outcome,
            reason,
            rallies: self.rallies(),
        };
        log::info!(
            "{:?} round over: {:?} ({:?}) after {} rallies",
            phase,
            outcome,
            reason,
            summary.rallies
        );
        Some(summary)
    }

    pub fn phase(&self) -> Option<Phase> {
        self.round.phase()
    }

    /// Rally count of the active (or last) phase
    pub fn rallies(&self) -> u32 {
        match self.phase() {
            Some(Phase::Two) => self.endurance_rallies.count(),
            _ => self.goal_rallies.count(),
        }
    }

    /// Move the player paddle so its center follows the pointer
    pub fn set_player_target(&mut self, pointer_y: f32) {
        self.player.y = clamp_paddle_y(
            pointer_y - self.player.height / 2.0,
            self.tuning.field_height,
            self.player.height,
        );
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}
