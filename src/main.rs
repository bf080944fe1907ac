//! Ninja Sling entry point
//!
//! In the browser this owns the game loop: DOM input becomes queued
//! [`InputEvent`]s, every animation frame runs one tick, and the drained
//! events drive audio, storage and the leaderboard. Drawing is delegated to
//! `window.ninjaSlingRender(frameJson)`.
//!
//! Natively it plays a short scripted session and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use ninja_sling::audio::{AudioManager, SoundEffect};
    use ninja_sling::consts::{VIEW_HEIGHT, VIEW_WIDTH};
    use ninja_sling::highscores::{Leaderboard, MAX_HIGH_SCORES, format_relative, generate_player_id};
    use ninja_sling::persistence::{LocalStore, load_high_score, save_high_score};
    use ninja_sling::platform::{FrameClock, Viewport};
    use ninja_sling::sim::{GameEvent, InputEvent, SimulationState, TickInput, tick};
    use ninja_sling::view::FrameView;
    use ninja_sling::{HighScores, PlayerProfile, Settings};

    const DEFAULT_PLAYER_NAME: &str = "Ninja";

    // Hand the frame to the page's canvas renderer, if it installed one
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (typeof window.ninjaSlingRender === 'function') {
                window.ninjaSlingRender(json);
            }
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        state: SimulationState,
        settings: Settings,
        store: Option<LocalStore>,
        audio: AudioManager,
        leaderboard: HighScores,
        player: Option<PlayerProfile>,
        input: TickInput,
        clock: FrameClock,
        canvas: HtmlCanvasElement,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement) -> Self {
            let store = LocalStore::open()
                .map_err(|e| log::warn!("Storage disabled: {}", e))
                .ok();

            let mut state = SimulationState::new(seed);
            let (settings, leaderboard, player) = match &store {
                Some(store) => {
                    let stored = load_high_score(store).unwrap_or_else(|e| {
                        log::warn!("Ignoring stored high score: {}", e);
                        0
                    });
                    let leaderboard = HighScores::load(store);
                    // The board can remember a better run than the high score key
                    state.high_score = stored.max(leaderboard.top_score().unwrap_or(0));
                    let player = PlayerProfile::load(store).unwrap_or_else(|e| {
                        log::warn!("Ignoring stored player: {}", e);
                        None
                    });
                    (Settings::load(store), leaderboard, player)
                }
                None => (Settings::default(), HighScores::new(), None),
            };

            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());

            let mut game = Self {
                state,
                settings,
                store,
                audio,
                leaderboard,
                player,
                input: TickInput::default(),
                clock: FrameClock::new(),
                canvas,
            };
            if game.player.is_none() {
                game.change_name(DEFAULT_PLAYER_NAME);
            }
            game
        }

        /// Fresh identity under `name`
        fn new_profile(&self, name: &str) -> ninja_sling::Result<PlayerProfile> {
            let now = js_sys::Date::now() as u64;
            let mut rng = Pcg32::seed_from_u64(self.state.seed ^ now);
            PlayerProfile::new(name, generate_player_id(now, &mut rng))
        }

        fn set_player(&mut self, player: PlayerProfile) {
            if let Some(store) = self.store.as_mut() {
                if let Err(e) = player.save(store) {
                    log::warn!("Could not save player: {}", e);
                }
            }
            log::info!("Playing as {} ({})", player.name, player.id);
            self.player = Some(player);
            self.update_player_label();
        }

        /// Rename the current player (same id), or start one if there is none
        fn change_name(&mut self, name: &str) {
            let player = match &self.player {
                Some(player) => player.rename(name),
                None => self.new_profile(name),
            };
            match player {
                Ok(player) => self.set_player(player),
                Err(e) => log::warn!("Rejected player name {:?}: {}", name, e),
            }
        }

        /// Drop the stored identity; runs are not recorded until a name is set
        fn forget_player(&mut self) {
            if let Some(store) = self.store.as_mut() {
                if let Err(e) = PlayerProfile::forget(store) {
                    log::warn!("Could not forget player: {}", e);
                }
            }
            if let Some(player) = self.player.take() {
                log::info!("Forgot player {} ({})", player.name, player.id);
            }
            self.update_player_label();
            self.render_leaderboard();
        }

        fn viewport(&self) -> Viewport {
            let rect = self.canvas.get_bounding_client_rect();
            Viewport {
                left: rect.left() as f32,
                top: rect.top() as f32,
                width: rect.width() as f32,
                height: rect.height() as f32,
                canvas_width: self.canvas.width() as f32,
                canvas_height: self.canvas.height() as f32,
            }
        }

        fn pointer_down(&mut self, client: Vec2) {
            self.audio.resume();
            let world = self.viewport().to_world(client, &self.state.camera);
            self.input.push(InputEvent::PointerDown(world));
        }

        fn pointer_move(&mut self, client: Vec2) {
            let world = self.viewport().to_world(client, &self.state.camera);
            self.input.push(InputEvent::PointerMove(world));
        }

        fn pointer_up(&mut self) {
            self.input.push(InputEvent::PointerUp);
        }

        /// Run one simulation tick and react to what happened
        fn update(&mut self, time: f64) {
            let elapsed = self.clock.advance(time);
            let input = std::mem::take(&mut self.input);
            tick(&mut self.state, &input, elapsed);

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }

            match event {
                GameEvent::HighScore { score } => {
                    if let Some(store) = self.store.as_mut() {
                        if let Err(e) = save_high_score(store, *score) {
                            log::warn!("Could not save high score: {}", e);
                        }
                    }
                }
                GameEvent::GameOver { final_score, .. } => {
                    let Some(player) = &self.player else { return };
                    let on_board = self.leaderboard.qualifies(*final_score);
                    let submission =
                        self.leaderboard
                            .submit(player, *final_score, js_sys::Date::now());
                    if !submission.updated {
                        return;
                    }
                    log::info!("New personal best {} (rank {:?})", final_score, submission.rank);
                    if let Some(store) = self.store.as_mut() {
                        if let Err(e) = self.leaderboard.save(store) {
                            log::warn!("Could not save leaderboard: {}", e);
                        }
                    }
                    // A best below the visible board leaves it unchanged
                    if on_board {
                        self.render_leaderboard();
                    }
                }
                _ => {}
            }
        }

        /// Render the current frame
        fn render(&self) {
            let Some(view) = FrameView::capture(&self.state, &self.settings) else {
                return;
            };
            match view.to_json() {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Could not serialize frame: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-high-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.high_score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.clock.fps().to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-phase") {
                el.set_text_content(Some(self.state.phase.label()));
            }
        }

        fn update_player_label(&self) {
            let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("hud-player"))
            else {
                return;
            };
            let name = self.player.as_ref().map_or("Guest", |p| p.name.as_str());
            el.set_text_content(Some(name));
        }

        fn render_leaderboard(&self) {
            let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("leaderboard"))
            else {
                return;
            };

            if self.leaderboard.is_empty() {
                el.set_inner_html("<li class=\"empty\">No scores yet</li>");
                return;
            }

            let now = js_sys::Date::now();
            let me = self.player.as_ref().map(|p| p.id.as_str());
            let rows: String = self
                .leaderboard
                .top(MAX_HIGH_SCORES)
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let class = if Some(entry.player_id.as_str()) == me { " class=\"me\"" } else { "" };
                    format!(
                        "<li{}><span>#{}</span><span>{}</span><span>{}</span><span>{}</span></li>",
                        class,
                        i + 1,
                        escape_html(&entry.player_name),
                        entry.score,
                        format_relative(now, entry.timestamp)
                    )
                })
                .collect();
            el.set_inner_html(&rows);
        }
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Ninja Sling starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(VIEW_WIDTH as u32);
        canvas.set_height(VIEW_HEIGHT as u32);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone())));
        log::info!("Game initialized with seed: {}", seed);

        game.borrow().render_leaderboard();
        game.borrow().update_player_label();
        setup_input_handlers(&canvas, game.clone());
        setup_player_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Ninja Sling running!");
    }

    fn touch_point(event: &TouchEvent) -> Option<Vec2> {
        let touch = event.touches().get(0)?;
        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Mouse down - start a drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                game.borrow_mut().pointer_down(client);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - tracked on the window so a drag can leave the canvas
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                game.borrow_mut().pointer_move(client);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release the slingshot
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().pointer_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(client) = touch_point(&event) {
                    game.borrow_mut().pointer_down(client);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(client) = touch_point(&event) {
                    game.borrow_mut().pointer_move(client);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().pointer_up();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Player menu buttons and tab visibility
    fn setup_player_handlers(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Change name - keeps the player id and leaderboard entry
        if let Some(button) = document.get_element_by_id("change-name") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let Some(window) = web_sys::window() else { return };
                let current = game
                    .borrow()
                    .player
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                if let Ok(Some(name)) =
                    window.prompt_with_message_and_default("Enter your name:", &current)
                {
                    game.borrow_mut().change_name(&name);
                }
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Forget player - the next name starts a new identity
        if let Some(button) = document.get_element_by_id("forget-player") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                game.borrow_mut().forget_player();
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tab switch - rAF stops while hidden, so restart frame timing
        {
            let closure = Closure::<dyn FnMut()>::new(move || {
                game.borrow_mut().clock.reset();
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Scripted headless session: a bot plays each candidate sling out on a copy
/// of the session and takes the one that lands highest.
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use ninja_sling::consts::FIXED_FRAME_MS;
    use ninja_sling::highscores::Leaderboard;
    use ninja_sling::persistence::{MemoryStore, load_high_score, save_high_score};
    use ninja_sling::sim::{GameEvent, GamePhase, InputEvent, SimulationState, TickInput, tick};
    use ninja_sling::{HighScores, PlayerProfile, Tuning};

    /// Frames to wait on a platform before the next sling
    const AIM_DELAY: u64 = 20;
    /// Frames a trial sling may take to come to rest
    const LOOKAHEAD_FRAMES: usize = 300;
    const ANGLE_STEPS: usize = 15;
    const STRENGTHS: [f32; 5] = [0.4, 0.55, 0.7, 0.85, 1.0];

    /// Headless Ninja Sling: a bot slings its way up the tower
    #[derive(Parser, Debug)]
    #[command(name = "ninja-sling")]
    #[command(about = "Play a scripted Ninja Sling session without a browser", long_about = None)]
    pub struct Args {
        /// Session seed
        #[arg(default_value_t = 42)]
        pub seed: u64,

        /// JSON file overriding physics and generation tuning
        pub tuning: Option<PathBuf>,

        /// Frames to play (60 per second)
        #[arg(long, default_value_t = 60 * 120)]
        pub frames: u64,
    }

    /// Where a trial sling came to rest
    #[derive(Debug, Clone, Copy)]
    struct Landing {
        drag: Vec2,
        y: f32,
        points: u32,
    }

    /// Drag points fanned over the upper half circle around the ball
    fn candidates(ball: Vec2, max_power: f32) -> impl Iterator<Item = Vec2> {
        (0..ANGLE_STEPS).flat_map(move |i| {
            let angle = (15.0 + 150.0 * i as f32 / (ANGLE_STEPS - 1) as f32).to_radians();
            let dir = Vec2::new(angle.cos(), -angle.sin());
            STRENGTHS
                .into_iter()
                .map(move |strength| ball + dir * max_power * strength)
        })
    }

    /// Play a sling out on a copy of the session. `None` if it dies or
    /// never settles.
    fn try_sling(state: &SimulationState, drag: Vec2) -> Option<Landing> {
        let mut trial = state.clone();
        trial.drain_events();

        let mut input = TickInput::default();
        input.push(InputEvent::PointerDown(trial.ball.pos));
        input.push(InputEvent::PointerMove(drag));
        input.push(InputEvent::PointerUp);
        tick(&mut trial, &input, FIXED_FRAME_MS);

        let mut frames = 0;
        while trial.ball.launched && frames < LOOKAHEAD_FRAMES {
            tick(&mut trial, &TickInput::default(), FIXED_FRAME_MS);
            frames += 1;
        }

        let events = trial.drain_events();
        if events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            return None;
        }
        events.iter().find_map(|e| match e {
            GameEvent::Landed { points, .. } => Some(Landing {
                drag,
                y: trial.ball.pos.y,
                points: points.unwrap_or(0),
            }),
            _ => None,
        })
    }

    /// Best sling from the current rest: a scoring landing if there is one,
    /// then the highest
    fn choose(state: &SimulationState) -> Vec2 {
        let ball = state.ball.pos;
        candidates(ball, state.slingshot.max_power)
            .filter_map(|drag| try_sling(state, drag))
            .max_by(|a, b| {
                (a.points > 0)
                    .cmp(&(b.points > 0))
                    .then(b.y.total_cmp(&a.y))
            })
            .map(|landing| landing.drag)
            // Nothing safe in reach: hop in place and wait for the platforms to move
            .unwrap_or(ball - Vec2::new(0.0, state.slingshot.max_power * 0.3))
    }

    pub fn run(args: &Args, tuning: Tuning) -> ninja_sling::Result<()> {
        let seed = args.seed;
        let mut store = MemoryStore::new();
        let mut leaderboard = HighScores::new();
        let player = PlayerProfile::new("Headless", format!("bot-{seed}"))?;

        let mut state = SimulationState::with_tuning(seed, tuning);
        state.high_score = load_high_score(&store)?;
        let mut rested_for = 0;
        let mut peak = state.ball.pos.y;

        for _ in 0..args.frames {
            let mut input = TickInput::default();
            if state.phase == GamePhase::Ready {
                rested_for += 1;
                if rested_for >= AIM_DELAY {
                    rested_for = 0;
                    input.push(InputEvent::PointerDown(state.ball.pos));
                    input.push(InputEvent::PointerMove(choose(&state)));
                    input.push(InputEvent::PointerUp);
                }
            }

            tick(&mut state, &input, FIXED_FRAME_MS);
            peak = peak.min(state.ball.pos.y);

            for event in state.drain_events() {
                match event {
                    GameEvent::HighScore { score } => save_high_score(&mut store, score)?,
                    GameEvent::GameOver { cause, final_score } => {
                        let on_board = leaderboard.qualifies(final_score);
                        let submission =
                            leaderboard.submit(&player, final_score, state.time_ticks as f64);
                        log::info!(
                            "{:?} with {} points ({:?}, made the board: {})",
                            cause,
                            final_score,
                            submission,
                            on_board
                        );
                    }
                    GameEvent::Landed {
                        points: Some(points),
                        ..
                    } => log::info!("+{} at y={:.0}", points, state.ball.pos.y),
                    other => log::debug!("{:?}", other),
                }
            }
        }

        println!(
            "Seed {}: score {} (best {}), peak y={:.0}, camera at y={:.0}, {} platforms live",
            seed,
            state.score,
            load_high_score(&store)?.max(state.high_score),
            peak,
            state.camera.y,
            state.platforms.len()
        );
        for (i, entry) in leaderboard.top(5).iter().enumerate() {
            println!("  #{} {} {}", i + 1, entry.player_name, entry.score);
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let args = headless::Args::parse();
    log::info!("Ninja Sling (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    let tuning = match &args.tuning {
        Some(path) => match ninja_sling::Tuning::from_file(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => ninja_sling::Tuning::default(),
    };

    if let Err(e) = headless::run(&args, tuning) {
        log::error!("Headless session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
