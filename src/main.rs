//! Rally Pong entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use rally_pong::confetti::ConfettiEngine;
    use rally_pong::controller::{Command, GameController, Hud, NextAction, OutcomeView};
    use rally_pong::persistence::LocalStorageStore;
    use rally_pong::platform::{FrameGate, LoopToken};
    use rally_pong::ranking::web::FetchTransport;
    use rally_pong::ranking::{Leaderboard, OFFLINE_BANNER, OFFLINE_HINT, RankingClient};
    use rally_pong::renderer::canvas::CanvasSurface;
    use rally_pong::renderer::{draw_confetti, draw_field};
    use rally_pong::settings::GameConfig;
    use rally_pong::sim::Phase;

    const FIELD_CANVAS: &str = "gameCanvas";
    const CONFETTI_CANVAS: &str = "confeteCanvas";

    type Controller = GameController<LocalStorageStore, FetchTransport>;

    /// Mouse listener on the document, touch listener on the field canvas;
    /// both removed on drop
    struct PointerListeners {
        document: Document,
        canvas: HtmlCanvasElement,
        mouse: Closure<dyn FnMut(MouseEvent)>,
        touch: Closure<dyn FnMut(TouchEvent)>,
    }

    impl PointerListeners {
        fn bind(
            document: &Document,
            canvas: &HtmlCanvasElement,
            game: &Rc<RefCell<Game>>,
        ) -> Self {
            let mouse = {
                let game = game.clone();
                let canvas = canvas.clone();
                Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                    let y = field_y(&canvas, event.client_y() as f32);
                    game.borrow_mut().controller.pointer_moved(y);
                })
            };
            let touch = {
                let game = game.clone();
                let canvas = canvas.clone();
                Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    if let Some(touch) = event.touches().get(0) {
                        let y = field_y(&canvas, touch.client_y() as f32);
                        game.borrow_mut().controller.pointer_moved(y);
                    }
                })
            };
            // Off-field positions clamp the paddle to the nearest edge
            let _ = document
                .add_event_listener_with_callback("mousemove", mouse.as_ref().unchecked_ref());
            let _ = canvas
                .add_event_listener_with_callback("touchmove", touch.as_ref().unchecked_ref());
            Self {
                document: document.clone(),
                canvas: canvas.clone(),
                mouse,
                touch,
            }
        }
    }

    impl Drop for PointerListeners {
        fn drop(&mut self) {
            let _ = self.document.remove_event_listener_with_callback(
                "mousemove",
                self.mouse.as_ref().unchecked_ref(),
            );
            let _ = self.canvas.remove_event_listener_with_callback(
                "touchmove",
                self.touch.as_ref().unchecked_ref(),
            );
        }
    }

    /// Client y to field coordinates (canvas may be scaled by CSS)
    fn field_y(canvas: &HtmlCanvasElement, client_y: f32) -> f32 {
        let rect = canvas.get_bounding_client_rect();
        let scale = if rect.height() > 0.0 {
            canvas.height() as f32 / rect.height() as f32
        } else {
            1.0
        };
        (client_y - rect.top() as f32) * scale
    }

    /// Game instance holding all state
    struct Game {
        controller: Controller,
        field: CanvasSurface,
        overlay: CanvasSurface,
        confetti: ConfettiEngine,
        frames: FrameGate,
        overlay_frames: FrameGate,
        pointer: Option<PointerListeners>,
    }

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn element(id: &str) -> Option<HtmlElement> {
        document()?
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = element(id) {
            let display = if visible { "block" } else { "none" };
            let _ = el.style().set_property("display", display);
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn window_size() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        let dim = |v: Result<JsValue, JsValue>| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or_default() as f32
        };
        (dim(window.inner_width()), dim(window.inner_height()))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger unavailable: {e}").into());
        }

        log::info!("Rally Pong starting...");

        let config = GameConfig::load();
        let seed = js_sys::Date::now() as u64;

        let field = CanvasSurface::by_id(FIELD_CANVAS)?;
        field.canvas().set_width(config.tuning.field_width as u32);
        field.canvas().set_height(config.tuning.field_height as u32);

        let overlay = CanvasSurface::by_id(CONFETTI_CANVAS)?;
        let (w, h) = window_size();
        overlay.canvas().set_width(w as u32);
        overlay.canvas().set_height(h as u32);

        let ranking = Rc::new(RankingClient::new(
            FetchTransport,
            config.leaderboard_url.clone(),
        ));
        let confetti = ConfettiEngine::new(config.confetti, w, h, seed);
        let controller =
            GameController::new(config, LocalStorageStore::open(), ranking, seed);

        let game = Rc::new(RefCell::new(Game {
            controller,
            field,
            overlay,
            confetti,
            frames: FrameGate::new(),
            overlay_frames: FrameGate::new(),
            pointer: None,
        }));
        log::info!("Game initialized with seed: {}", seed);

        {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            draw_field(g.controller.state(), &mut g.field);
            update_hud(&g.controller.hud());
        }

        setup_start(game.clone());
        setup_round_buttons(game.clone());
        setup_placement_dialog(game.clone());
        setup_resize(game.clone());

        refresh_ranking(game);

        log::info!("Rally Pong ready");
        Ok(())
    }

    /// Carry out controller commands in order
    fn apply(game: &Rc<RefCell<Game>>, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::StopFrames => game.borrow().frames.stop(),
                Command::StartFrames => {
                    let token = game.borrow().frames.start();
                    let phase = game.borrow().controller.state().phase();
                    show_round_panels(phase);
                    request_frame(game.clone(), token);
                }
                Command::ReleasePointer => {
                    // Dropped outside the borrow so removal never re-enters
                    let listeners = game.borrow_mut().pointer.take();
                    drop(listeners);
                }
                Command::BindPointer => {
                    let Some(document) = document() else {
                        continue;
                    };
                    let canvas = game.borrow().field.canvas().clone();
                    let listeners = PointerListeners::bind(&document, &canvas, game);
                    game.borrow_mut().pointer = Some(listeners);
                }
                Command::ClearConfetti => {
                    let mut g = game.borrow_mut();
                    g.overlay_frames.stop();
                    g.confetti.clear();
                    let g = &mut *g;
                    draw_confetti(&g.confetti, &mut g.overlay);
                }
                Command::TriggerConfetti => {
                    let token = {
                        let mut g = game.borrow_mut();
                        g.confetti.trigger(js_sys::Date::now());
                        g.overlay_frames.start()
                    };
                    request_overlay_frame(game.clone(), token);
                }
                Command::ShowOutcome(view) => show_outcome(&view),
                Command::PromptTopPlacement(placement) => {
                    set_text("placement-message", &placement.message());
                    set_visible("placement-dialog", true);
                }
                Command::SubmitScore { name, score } => {
                    set_visible("placement-dialog", false);
                    submit_score(game.clone(), name, score);
                }
            }
        }
    }

    fn request_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game, token);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken) {
        let commands = {
            let mut g = game.borrow_mut();
            if !g.frames.is_current(token) {
                return;
            }
            let commands = g.controller.frame();
            let g = &mut *g;
            draw_field(g.controller.state(), &mut g.field);
            update_hud(&g.controller.hud());
            commands
        };

        apply(&game, commands);

        let keep_going = game.borrow().frames.is_current(token);
        if keep_going {
            request_frame(game, token);
        }
    }

    fn request_overlay_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            overlay_loop(game, token);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn overlay_loop(game: Rc<RefCell<Game>>, token: LoopToken) {
        let active = {
            let mut g = game.borrow_mut();
            if !g.overlay_frames.is_current(token) {
                return;
            }
            g.confetti.step(js_sys::Date::now());
            let g = &mut *g;
            draw_confetti(&g.confetti, &mut g.overlay);
            g.confetti.is_active()
        };

        if active {
            request_overlay_frame(game, token);
        } else {
            game.borrow().overlay_frames.stop();
        }
    }

    fn update_hud(hud: &Hud) {
        match hud.phase {
            Some(Phase::Two) => {
                set_text("hud-rallies", &hud.rallies.to_string());
                set_text("hud-record", &hud.record.label());
            }
            _ => set_text("hud-progress", &hud.progress_label()),
        }
    }

    fn show_round_panels(phase: Option<Phase>) {
        let phase_two = phase == Some(Phase::Two);
        set_visible("hud-phase1", !phase_two);
        set_visible("hud-phase2", phase_two);
        set_visible("outcome", false);
        set_visible("coupon", false);
        set_visible("placement-dialog", false);
        for id in ["advance-btn", "restart-btn", "new-round-btn"] {
            set_visible(id, false);
        }
    }

    fn show_outcome(view: &OutcomeView) {
        set_text("outcome-message", &view.message());
        set_visible("outcome", true);
        if let OutcomeView::CouponUnlocked { code } = view {
            set_text("coupon-code", code);
            set_visible("coupon", true);
        }
        let button = match view.next_action() {
            NextAction::AdvancePhase => "advance-btn",
            NextAction::Restart => "restart-btn",
            NextAction::NewRound => "new-round-btn",
        };
        set_visible(button, true);
    }

    fn show_leaderboard(board: &Leaderboard) {
        let Some(document) = document() else {
            return;
        };
        let Some(list) = document.get_element_by_id("ranking-list") else {
            return;
        };
        list.set_inner_html("");
        if board.offline {
            set_text("ranking-status", &format!("{OFFLINE_BANNER}. {OFFLINE_HINT}"));
        } else {
            set_text("ranking-status", "");
        }
        for line in board.lines() {
            if let Ok(item) = document.create_element("li") {
                item.set_text_content(Some(&line));
                let _ = list.append_child(&item);
            }
        }
    }

    fn refresh_ranking(game: Rc<RefCell<Game>>) {
        let (client, n) = {
            let g = game.borrow();
            (g.controller.ranking(), g.controller.config().leaderboard_size)
        };
        set_text("ranking-status", "Loading ranking...");
        wasm_bindgen_futures::spawn_local(async move {
            let board = client.fetch_top(n).await;
            show_leaderboard(&board);
            if let Some(leader) = &board.leader {
                let mut g = game.borrow_mut();
                if g.controller.apply_remote_leader(leader) {
                    update_hud(&g.controller.hud());
                }
            }
        });
    }

    fn submit_score(game: Rc<RefCell<Game>>, name: String, score: u32) {
        let (client, n) = {
            let g = game.borrow();
            (g.controller.ranking(), g.controller.config().leaderboard_size)
        };
        wasm_bindgen_futures::spawn_local(async move {
            match client.submit_score(&name, score, n).await {
                Ok(board) => {
                    show_leaderboard(&board);
                    if let Some(leader) = &board.leader {
                        let mut g = game.borrow_mut();
                        if g.controller.apply_remote_leader(leader) {
                            update_hud(&g.controller.hud());
                        }
                    }
                    alert(&format!("✅ Result saved: {} with {} rallies", name, score));
                }
                Err(e) => {
                    log::warn!("Could not save result: {}", e);
                    alert("❌ Could not save your result. Please try again.");
                }
            }
        });
    }

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn try_start(game: &Rc<RefCell<Game>>) {
        let name = element("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        let result = game.borrow_mut().controller.start(&name);
        match result {
            Ok(commands) => {
                set_visible("start-panel", false);
                apply(game, commands);
            }
            Err(e) => {
                log::warn!("{}", e);
                alert("Please enter your name to start.");
            }
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(el) = element(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start(game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click("start-btn", move || try_start(&game));
        }

        // Enter in the name field starts too
        if let Some(input) = element("player-name") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    try_start(&game);
                }
            });
            let _ =
                input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_round_buttons(game: Rc<RefCell<Game>>) {
        let buttons: [(&str, fn(&mut Controller) -> Vec<Command>); 3] = [
            ("advance-btn", Controller::advance_phase),
            ("restart-btn", Controller::restart),
            ("new-round-btn", Controller::new_round),
        ];
        for (id, action) in buttons {
            let game = game.clone();
            on_click(id, move || {
                let commands = action(&mut game.borrow_mut().controller);
                apply(&game, commands);
            });
        }
    }

    fn setup_placement_dialog(game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click("confirm-placement-btn", move || {
                let commands = game.borrow_mut().controller.confirm_placement();
                apply(&game, commands);
            });
        }
        on_click("cancel-placement-btn", move || {
            game.borrow_mut().controller.dismiss_placement();
            set_visible("placement-dialog", false);
        });
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = window_size();
            let mut g = game.borrow_mut();
            g.overlay.canvas().set_width(w as u32);
            g.overlay.canvas().set_height(h as u32);
            g.confetti.resize(w, h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rally Pong (native) starting...");
    log::info!("Native mode runs a headless autoplay - run with `trunk serve` for the web version");

    autoplay();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play both phases with a paddle that follows the ball
#[cfg(not(target_arch = "wasm32"))]
fn autoplay() {
    use std::rc::Rc;

    use rally_pong::controller::{Command, GameController};
    use rally_pong::persistence::MemoryStore;
    use rally_pong::ranking::{Leaderboard, OfflineTransport, RankingClient};
    use rally_pong::settings::GameConfig;

    const MAX_FRAMES: usize = 50_000;

    let config = GameConfig::load();
    let board_size = config.leaderboard_size;
    let ranking = Rc::new(RankingClient::new(OfflineTransport, config.leaderboard_url.clone()));
    let mut controller = GameController::new(config, MemoryStore::new(), ranking, 7);

    let play = |controller: &mut GameController<MemoryStore, OfflineTransport>| {
        for _ in 0..MAX_FRAMES {
            let y = controller.state().ball.pos.y;
            controller.pointer_moved(y);
            let commands = controller.frame();
            if let Some(Command::ShowOutcome(view)) = commands
                .iter()
                .find(|c| matches!(c, Command::ShowOutcome(_)))
            {
                println!("{}", view.message());
                return;
            }
        }
        log::warn!("Round still running after {} frames", MAX_FRAMES);
    };

    if let Err(e) = controller.start("Autoplay") {
        log::error!("{}", e);
        return;
    }
    play(&mut controller);

    if !controller.advance_phase().is_empty() {
        play(&mut controller);
    }
    println!("Record: {}", controller.hud().record.label());

    for line in Leaderboard::offline(board_size).lines() {
        println!("{}", line);
    }
}
