//! Neon Runner entry point
//!
//! Handles platform-specific initialization and drives one `tick` per frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use neon_runner::consts::MAX_FRAME_DT;
    use neon_runner::{
        GameState, InputEvent, Key, RenderFrame, RenderSink, RunnerConfig, SessionPhase,
    };

    /// Receives captured frames until a GPU backend is attached to the canvas
    struct CanvasSink {
        frames: u64,
        /// Packed instance buffer, reused every frame
        instances: Vec<u8>,
    }

    impl RenderSink for CanvasSink {
        fn draw(&mut self, frame: &RenderFrame) {
            self.frames += 1;
            frame.write_instances(&mut self.instances);
            if self.frames % 600 == 0 {
                log::trace!(
                    "Frame {}: {} bytes of instance data",
                    self.frames,
                    self.instances.len()
                );
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        frame: RenderFrame,
        sink: CanvasSink,
        last_time: f64,
        collisions: u32,
    }

    impl Game {
        fn new(state: GameState) -> Self {
            let frame = RenderFrame::for_state(&state);
            Self {
                state,
                frame,
                sink: CanvasSink {
                    frames: 0,
                    instances: Vec::new(),
                },
                last_time: 0.0,
                collisions: 0,
            }
        }

        /// Advance the simulation and hand the frame to the sink
        fn update(&mut self, dt: f32) {
            let report = self.state.tick(dt);
            if let Some(hit) = report.collision {
                self.collisions += 1;
                log::info!("Hit a {:?} at {:.0}m", hit.kind, report.distance);
            }
            if self.sink.is_ready() {
                self.frame.capture(&self.state);
                self.sink.draw(&self.frame);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            if let Some(el) = document.query_selector("#hud-distance .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!(
                    "{:.0}",
                    self.state.distance_traveled()
                )));
            }

            if let Some(el) = document.query_selector("#hud-speed .hud-value").ok().flatten() {
                // Display km/h
                let kmh = self.state.current_speed() * 3.6;
                el.set_text_content(Some(&format!("{:.0}", kmh)));
            }

            if let Some(el) = document.query_selector("#hud-hits .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.collisions.to_string()));
            }

            if let Some(el) = document.get_element_by_id("start-prompt") {
                let class = if self.state.phase() == SessionPhase::Ready {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if self.state.phase() == SessionPhase::Paused {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }
        }

        fn toggle_pause(&mut self) {
            match self.state.phase() {
                SessionPhase::Running => {
                    self.state.release_input();
                    self.state.pause();
                }
                SessionPhase::Paused => self.state.resume(),
                SessionPhase::Ready => {}
            }
        }

        fn start_or_restart(&mut self) {
            match self.state.phase() {
                SessionPhase::Ready => self.state.start(),
                _ => {
                    self.state.restart();
                    self.collisions = 0;
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&JsValue::from_str(&format!("Failed to init logger: {e}")));
        }

        log::info!("Neon Runner starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        canvas.set_width((client_w as f64 * dpr) as u32);
        canvas.set_height((client_h as f64 * dpr) as u32);

        let seed = js_sys::Date::now() as u64;
        let state = match GameState::new(RunnerConfig::default(), seed) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(state)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, &canvas, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Neon Runner running!");
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        // Pointer steering, in canvas-relative pixels
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                g.state.handle_input(InputEvent::PointerMove {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                    width: w,
                    height: h,
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let mut g = game.borrow_mut();
                if let Some(key) = Key::from_code(&code) {
                    event.prevent_default();
                    if !event.repeat() {
                        g.state.handle_input(InputEvent::KeyDown(key));
                    }
                    return;
                }
                match code.as_str() {
                    "Escape" | "KeyP" => g.toggle_pause(),
                    "Enter" => g.start_or_restart(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    game.borrow_mut().state.handle_input(InputEvent::KeyUp(key));
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // First frame integrates nothing
            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.state.release_input();
                    if g.state.phase() == SessionPhase::Running {
                        g.state.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.state.release_input();
                if g.state.phase() == SessionPhase::Running {
                    g.state.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use neon_runner::{
        ConfigError, GameState, InputEvent, Key, RenderFrame, RenderSink, RunnerConfig,
    };

    const FRAME_DT: f32 = 1.0 / 60.0;
    const DEMO_SECONDS: u32 = 60;

    /// Logs a summary of every second's worth of frames
    struct LogSink {
        frames: u64,
    }

    impl RenderSink for LogSink {
        fn draw(&mut self, frame: &RenderFrame) {
            self.frames += 1;
            if self.frames % 60 == 0 {
                log::debug!(
                    "Frame {}: {} scenery, {} obstacles, car x={:.2}, fov={:.1}",
                    self.frames,
                    frame.scenery.len(),
                    frame.obstacles.len(),
                    frame.vehicle.lateral,
                    frame.camera.fov
                );
            }
        }
    }

    /// Scripted input for second `t` of the demo
    fn script(second: u32) -> Vec<InputEvent> {
        let mut events = Vec::new();
        match second % 8 {
            0 => events.push(InputEvent::KeyDown(Key::Left)),
            2 => events.push(InputEvent::KeyUp(Key::Left)),
            4 => events.push(InputEvent::KeyDown(Key::Right)),
            6 => events.push(InputEvent::KeyUp(Key::Right)),
            _ => {}
        }
        match second {
            20 => events.push(InputEvent::KeyDown(Key::Nitro)),
            28 => events.push(InputEvent::KeyUp(Key::Nitro)),
            40 => events.push(InputEvent::KeyDown(Key::Brake)),
            44 => events.push(InputEvent::KeyUp(Key::Brake)),
            _ => {}
        }
        events
    }

    fn load_config(path: Option<&str>) -> Result<RunnerConfig, ConfigError> {
        match path {
            Some(path) => RunnerConfig::from_file(path),
            None => Ok(RunnerConfig::default()),
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let mut args = std::env::args().skip(1);
        let config = load_config(args.next().as_deref())?;
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

        let mut state = GameState::new(config, seed)?;
        let mut frame = RenderFrame::for_state(&state);
        let mut sink = LogSink { frames: 0 };
        let mut collisions = 0u32;

        state.start();
        for second in 0..DEMO_SECONDS {
            for event in script(second) {
                state.handle_input(event);
            }
            for _ in 0..60 {
                let report = state.tick(FRAME_DT);
                if let Some(hit) = report.collision {
                    collisions += 1;
                    log::info!("Hit a {:?} at {:.0}m", hit.kind, report.distance);
                }
                if sink.is_ready() {
                    frame.capture(&state);
                    sink.draw(&frame);
                }
            }
            log::info!(
                "{:>3}s  distance {:>7.0}m  speed {:>5.1}  obstacles {}",
                second + 1,
                state.distance_traveled(),
                state.current_speed(),
                state.obstacles().active_count()
            );
        }

        log::info!(
            "Demo finished: {:.0}m, {} collisions, {} segments recycled",
            state.distance_traveled(),
            collisions,
            state.world().recycled_total()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neon Runner (native) starting headless demo...");
    log::info!("Run with `trunk serve` for the web version");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
