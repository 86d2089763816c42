//! Game controller
//!
//! Turns UI signals (start, advance, restart, new round, pointer) and
//! simulation events into `Command`s for the driver. It performs no I/O of
//! its own except writing the record through the `ScoreStore`; network
//! calls and drawing are requested as commands.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::StartError;
use crate::highscores::RecordEntry;
use crate::persistence::ScoreStore;
use crate::ranking::{RankingClient, RankingEntry, Transport};
use crate::settings::GameConfig;
use crate::sim::{
    FrameInput, FrameResult, GameEvent, Outcome, Phase, RoundState, RoundSummary,
    SimulationState, advance_frame,
};

/// Button offered after a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    AdvancePhase,
    Restart,
    NewRound,
}

/// End-of-round message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeView {
    /// Phase 1 cleared: coupon revealed, phase 2 unlocked
    CouponUnlocked { code: String },
    /// Phase 1 lost
    RetryForCoupon,
    EnduranceWon { rallies: u32 },
    EnduranceLost { rallies: u32, record: u32 },
}

impl OutcomeView {
    pub fn message(&self) -> String {
        match self {
            OutcomeView::CouponUnlocked { code } => {
                format!("You won! Your coupon: {}", code)
            }
            OutcomeView::RetryForCoupon => {
                "You lost! Try again to earn your coupon.".to_string()
            }
            OutcomeView::EnduranceWon { rallies } => {
                format!("AMAZING! You won with {} rallies! 🏆", rallies)
            }
            OutcomeView::EnduranceLost { rallies, record } => {
                format!("You made {} rallies! Record: {}", rallies, record)
            }
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(
            self,
            OutcomeView::CouponUnlocked { .. } | OutcomeView::EnduranceWon { .. }
        )
    }

    pub fn next_action(&self) -> NextAction {
        match self {
            OutcomeView::CouponUnlocked { .. } => NextAction::AdvancePhase,
            OutcomeView::RetryForCoupon => NextAction::Restart,
            OutcomeView::EnduranceWon { .. } | OutcomeView::EnduranceLost { .. } => {
                NextAction::NewRound
            }
        }
    }
}

/// A phase 2 result good enough for the remote podium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPlacement {
    pub rank: usize,
    pub score: u32,
    pub name: String,
}

impl TopPlacement {
    pub fn medal(&self) -> &'static str {
        match self.rank {
            1 => "🥇",
            2 => "🥈",
            _ => "🥉",
        }
    }

    pub fn message(&self) -> String {
        format!(
            "🎉 CONGRATULATIONS {}! 🎉 You placed #{} with {} {} rallies. Register your result?",
            self.name.to_uppercase(),
            self.rank,
            self.medal(),
            self.score
        )
    }
}

/// Work the driver must carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cancel the frame loop
    StopFrames,
    /// Start a fresh frame loop
    StartFrames,
    /// Detach pointer/touch listeners
    ReleasePointer,
    /// Attach pointer/touch listeners
    BindPointer,
    ClearConfetti,
    TriggerConfetti,
    ShowOutcome(OutcomeView),
    /// Ask whether to register a podium result
    PromptTopPlacement(TopPlacement),
    /// Write a score to the leaderboard (re-fetches on success)
    SubmitScore { name: String, score: u32 },
}

/// Display sink snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub phase: Option<Phase>,
    pub rallies: u32,
    pub goal: u32,
    pub record: RecordEntry,
}

impl Hud {
    /// Phase 1 progress, e.g. `Rallies: 3 / 10`
    pub fn progress_label(&self) -> String {
        format!("Rallies: {} / {}", self.rallies, self.goal)
    }
}

pub struct GameController<S: ScoreStore, T: Transport> {
    config: GameConfig,
    sim: SimulationState,
    store: S,
    ranking: Rc<RankingClient<T>>,
    rng: Pcg32,
    player_name: String,
    pointer_bound: bool,
    pointer_y: Option<f32>,
    pending_placement: Option<TopPlacement>,
    last_summary: Option<RoundSummary>,
}

impl<S: ScoreStore, T: Transport> GameController<S, T> {
    /// Create the controller; the record is read from `store` once, here
    pub fn new(config: GameConfig, store: S, ranking: Rc<RankingClient<T>>, seed: u64) -> Self {
        let record = RecordEntry::load(&store);
        let sim = SimulationState::new(config.tuning, record);
        Self {
            config,
            sim,
            store,
            ranking,
            rng: Pcg32::seed_from_u64(seed),
            player_name: String::new(),
            pointer_bound: false,
            pointer_y: None,
            pending_placement: None,
            last_summary: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.sim
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ranking(&self) -> Rc<RankingClient<T>> {
        Rc::clone(&self.ranking)
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn is_pointer_bound(&self) -> bool {
        self.pointer_bound
    }

    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.last_summary
    }

    pub fn pending_placement(&self) -> Option<&TopPlacement> {
        self.pending_placement.as_ref()
    }

    /// Start phase 1 for a named player
    pub fn start(&mut self, name: &str) -> Result<Vec<Command>, StartError> {
        let name = name.trim();
        if name.is_empty() {
            log::warn!("Start rejected: empty player name");
            return Err(StartError::EmptyName);
        }
        self.player_name = name.to_string();
        Ok(self.begin_round(Phase::One))
    }

    /// Move on to phase 2 (only after winning phase 1)
    pub fn advance_phase(&mut self) -> Vec<Command> {
        if self.sim.round != RoundState::Phase1Won {
            log::warn!("Advance ignored in {:?}", self.sim.round);
            return Vec::new();
        }
        self.begin_round(Phase::Two)
    }

    /// Play phase 1 again
    pub fn restart(&mut self) -> Vec<Command> {
        if self.player_name.is_empty() {
            log::warn!("Restart ignored: no player yet");
            return Vec::new();
        }
        self.begin_round(Phase::One)
    }

    /// Replay the phase of the last round
    pub fn new_round(&mut self) -> Vec<Command> {
        if self.player_name.is_empty() {
            log::warn!("New round ignored: no player yet");
            return Vec::new();
        }
        let phase = self.sim.phase().unwrap_or(Phase::One);
        self.begin_round(phase)
    }

    /// Pointer position relative to the field top; ignored while unbound
    pub fn pointer_moved(&mut self, y: f32) {
        if self.pointer_bound {
            self.pointer_y = Some(y);
        }
    }

    /// Run one simulation frame
    pub fn frame(&mut self) -> Vec<Command> {
        if !self.sim.round.is_running() {
            return Vec::new();
        }
        let input = FrameInput {
            pointer_y: self.pointer_y.take(),
        };
        let FrameResult { state, events } = advance_frame(&self.sim, &input);
        self.sim = state;

        let mut commands = Vec::new();
        for event in events {
            match event {
                GameEvent::RecordBroken(record) => {
                    log::info!("New record: {}", record.label());
                    record.save(&mut self.store);
                }
                GameEvent::RoundOver(summary) => commands.extend(self.end_round(summary)),
                GameEvent::PlayerReturn { .. } | GameEvent::AiReturn | GameEvent::WallBounce => {}
            }
        }
        commands
    }

    /// Register the pending podium result
    pub fn confirm_placement(&mut self) -> Vec<Command> {
        match self.pending_placement.take() {
            Some(placement) => {
                log::info!("Registering #{} for {}", placement.rank, placement.name);
                vec![Command::SubmitScore {
                    name: placement.name,
                    score: placement.score,
                }]
            }
            None => Vec::new(),
        }
    }

    pub fn dismiss_placement(&mut self) {
        if self.pending_placement.take().is_some() {
            log::info!("Registration cancelled by player");
        }
    }

    /// Adopt the remote leader as the displayed record when it is higher.
    ///
    /// Not persisted: the local store only tracks records made here.
    pub fn apply_remote_leader(&mut self, leader: &RankingEntry) -> bool {
        if self.sim.record.is_beaten_by(leader.score) {
            log::info!("Remote record {} ({})", leader.score, leader.name);
            self.sim.record = RecordEntry::new(leader.name.clone(), leader.score);
            true
        } else {
            false
        }
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.sim.phase(),
            rallies: self.sim.rallies(),
            goal: self.sim.tuning.goal_rallies,
            record: self.sim.record.clone(),
        }
    }

    fn begin_round(&mut self, phase: Phase) -> Vec<Command> {
        self.sim.start_round(phase, &self.player_name, &mut self.rng);
        self.pointer_bound = true;
        self.pointer_y = None;
        self.pending_placement = None;
        vec![
            Command::StopFrames,
            Command::ReleasePointer,
            Command::ClearConfetti,
            Command::BindPointer,
            Command::StartFrames,
        ]
    }

    fn end_round(&mut self, summary: RoundSummary) -> Vec<Command> {
        self.pointer_bound = false;
        self.pointer_y = None;
        self.last_summary = Some(summary);

        let mut commands = vec![Command::StopFrames, Command::ReleasePointer];
        match (summary.phase, summary.outcome) {
            (Phase::One, Outcome::Won) => {
                commands.push(Command::ShowOutcome(OutcomeView::CouponUnlocked {
                    code: self.config.coupon_code.clone(),
                }));
                commands.push(Command::TriggerConfetti);
            }
            (Phase::One, Outcome::Lost) => {
                commands.push(Command::ShowOutcome(OutcomeView::RetryForCoupon));
            }
            (Phase::Two, Outcome::Won) => {
                commands.push(Command::ShowOutcome(OutcomeView::EnduranceWon {
                    rallies: summary.rallies,
                }));
                commands.push(Command::TriggerConfetti);
                if let Some(rank) = self.ranking.check_top_placement(summary.rallies) {
                    let placement = TopPlacement {
                        rank,
                        score: summary.rallies,
                        name: self.player_name.clone(),
                    };
                    self.pending_placement = Some(placement.clone());
                    commands.push(Command::PromptTopPlacement(placement));
                }
            }
            (Phase::Two, Outcome::Lost) => {
                commands.push(Command::ShowOutcome(OutcomeView::EnduranceLost {
                    rallies: summary.rallies,
                    record: self.sim.record.value,
                }));
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::persistence::MemoryStore;
    use crate::ranking::{HttpRequest, HttpResponse};
    use glam::Vec2;

    /// Always answers with the same board
    struct FixedBoard(&'static str);

    impl Transport for FixedBoard {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::ok(self.0))
        }
    }

    const PODIUM: &str = r#"[
        {"nome": "Ana", "rebate": 100},
        {"nome": "Bia", "rebate": 90},
        {"nome": "Caio", "rebate": 80}
    ]"#;

    fn controller(store: MemoryStore) -> GameController<MemoryStore, FixedBoard> {
        let config = GameConfig::default();
        let ranking = Rc::new(RankingClient::new(FixedBoard(PODIUM), "https://board.test"));
        pollster::block_on(ranking.fetch_top(10));
        GameController::new(config, store, ranking, 99)
    }

    /// Put the ball past the right goal line
    fn force_right_exit(c: &mut GameController<MemoryStore, FixedBoard>) {
        c.sim.ball.pos = Vec2::new(790.0, 250.0);
    }

    fn force_left_exit(c: &mut GameController<MemoryStore, FixedBoard>) {
        c.sim.ball.pos = Vec2::new(10.0, 250.0);
    }

    const ROUND_START: [Command; 5] = [
        Command::StopFrames,
        Command::ReleasePointer,
        Command::ClearConfetti,
        Command::BindPointer,
        Command::StartFrames,
    ];

    #[test]
    fn test_empty_name_rejected() {
        let mut c = controller(MemoryStore::new());
        assert_eq!(c.start("   "), Err(StartError::EmptyName));
        assert_eq!(c.state().round, RoundState::Idle);
        assert!(!c.is_pointer_bound());
    }

    #[test]
    fn test_start_tears_down_before_binding() {
        let mut c = controller(MemoryStore::new());
        let commands = c.start("  Eva ").unwrap();
        assert_eq!(commands, ROUND_START);
        assert_eq!(c.player_name(), "Eva");
        assert_eq!(c.state().round, RoundState::Phase1Running);
        assert!(c.is_pointer_bound());
    }

    #[test]
    fn test_phase1_win_unlocks_coupon_and_phase2() {
        let mut c = controller(MemoryStore::new());
        c.start("Eva").unwrap();
        force_right_exit(&mut c);
        let commands = c.frame();
        assert_eq!(
            commands,
            vec![
                Command::StopFrames,
                Command::ReleasePointer,
                Command::ShowOutcome(OutcomeView::CouponUnlocked {
                    code: GameConfig::default().coupon_code
                }),
                Command::TriggerConfetti,
            ]
        );
        assert!(!c.is_pointer_bound());

        assert_eq!(c.advance_phase(), ROUND_START);
        assert_eq!(c.state().round, RoundState::Phase2Running);
    }

    #[test]
    fn test_advance_requires_phase1_win() {
        let mut c = controller(MemoryStore::new());
        assert!(c.advance_phase().is_empty());
        c.start("Eva").unwrap();
        assert!(c.advance_phase().is_empty());
        force_left_exit(&mut c);
        let commands = c.frame();
        assert!(commands.contains(&Command::ShowOutcome(OutcomeView::RetryForCoupon)));
        assert!(c.advance_phase().is_empty());
        assert_eq!(c.restart(), ROUND_START);
        assert_eq!(c.state().round, RoundState::Phase1Running);
    }

    #[test]
    fn test_pointer_ignored_while_unbound() {
        let mut c = controller(MemoryStore::new());
        c.pointer_moved(100.0);
        c.start("Eva").unwrap();
        c.pointer_moved(100.0);
        c.frame();
        assert_eq!(c.state().player.y, 50.0);

        force_left_exit(&mut c);
        c.frame();
        c.pointer_moved(400.0);
        assert_eq!(c.pointer_y, None);
    }

    #[test]
    fn test_pointer_outside_field_pins_paddle_to_edge() {
        let mut c = controller(MemoryStore::new());
        c.start("Eva").unwrap();
        c.pointer_moved(-300.0);
        c.frame();
        assert_eq!(c.state().player.y, 0.0);
        c.pointer_moved(900.0);
        c.frame();
        assert_eq!(c.state().player.y, 400.0);
    }

    #[test]
    fn test_record_persisted_when_beaten() {
        let mut c = controller(MemoryStore::with_entries([
            (RecordEntry::VALUE_KEY, "2"),
            (RecordEntry::HOLDER_KEY, "Ana"),
        ]));
        c.start("Eva").unwrap();
        c.sim.round = RoundState::Phase1Won;
        c.advance_phase();

        for _ in 0..3 {
            c.sim.ball.pos = Vec2::new(66.0, 250.0);
            c.sim.ball.vel = Vec2::new(-5.0, 0.0);
            c.sim.player.y = 200.0;
            c.frame();
            c.sim.ball.pos = Vec2::new(300.0, 250.0);
            c.frame();
        }

        assert_eq!(c.hud().rallies, 3);
        assert_eq!(RecordEntry::load(c.store()), RecordEntry::new("Eva", 3));
        assert_eq!(c.hud().record.label(), "3 (Eva)");
    }

    #[test]
    fn test_phase2_podium_win_prompts_then_submits() {
        let mut c = controller(MemoryStore::new());
        c.start("Eva").unwrap();
        c.sim.round = RoundState::Phase1Won;
        c.advance_phase();
        for _ in 0..95 {
            c.sim.endurance_rallies.increment();
        }
        force_right_exit(&mut c);
        let commands = c.frame();

        let expected = TopPlacement {
            rank: 2,
            score: 95,
            name: "Eva".into(),
        };
        assert!(commands.contains(&Command::TriggerConfetti));
        assert_eq!(
            commands.last(),
            Some(&Command::PromptTopPlacement(expected.clone()))
        );
        assert_eq!(c.pending_placement(), Some(&expected));

        assert_eq!(
            c.confirm_placement(),
            vec![Command::SubmitScore {
                name: "Eva".into(),
                score: 95
            }]
        );
        assert!(c.confirm_placement().is_empty());
    }

    #[test]
    fn test_phase2_low_win_no_prompt_and_dismiss() {
        let mut c = controller(MemoryStore::new());
        c.start("Eva").unwrap();
        c.sim.round = RoundState::Phase1Won;
        c.advance_phase();
        force_right_exit(&mut c);
        let commands = c.frame();
        assert!(commands.contains(&Command::ShowOutcome(OutcomeView::EnduranceWon {
            rallies: 0
        })));
        assert!(!commands
            .iter()
            .any(|cmd| matches!(cmd, Command::PromptTopPlacement(_))));
        c.dismiss_placement();
        assert!(c.confirm_placement().is_empty());
    }

    #[test]
    fn test_phase2_loss_reports_record_and_new_round_replays_phase2() {
        let mut c = controller(MemoryStore::with_entries([(RecordEntry::VALUE_KEY, "7")]));
        c.start("Eva").unwrap();
        c.sim.round = RoundState::Phase1Won;
        c.advance_phase();
        force_left_exit(&mut c);
        let commands = c.frame();
        let view = OutcomeView::EnduranceLost {
            rallies: 0,
            record: 7,
        };
        assert_eq!(view.next_action(), NextAction::NewRound);
        assert!(commands.contains(&Command::ShowOutcome(view)));
        assert_eq!(c.last_summary().map(|s| s.outcome), Some(Outcome::Lost));

        assert_eq!(c.new_round(), ROUND_START);
        assert_eq!(c.state().round, RoundState::Phase2Running);
    }

    #[test]
    fn test_remote_leader_only_raises_record() {
        let mut c = controller(MemoryStore::with_entries([(RecordEntry::VALUE_KEY, "50")]));
        assert!(!c.apply_remote_leader(&RankingEntry::new("Ana", 40)));
        assert!(c.apply_remote_leader(&RankingEntry::new("Ana", 60)));
        assert_eq!(c.hud().record, RecordEntry::new("Ana", 60));
        // Display only: the store still holds the local record
        assert_eq!(RecordEntry::load(c.store()).value, 50);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            OutcomeView::EnduranceLost {
                rallies: 4,
                record: 9
            }
            .message(),
            "You made 4 rallies! Record: 9"
        );
        assert!(OutcomeView::CouponUnlocked { code: "X".into() }.is_win());
        let hud = Hud {
            phase: Some(Phase::One),
            rallies: 3,
            goal: 10,
            record: RecordEntry::default(),
        };
        assert_eq!(hud.progress_label(), "Rallies: 3 / 10");
    }
}
