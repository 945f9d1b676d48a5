//! Frame loop
//!
//! Glues input, menus, the fixed-step simulation, audio and rendering. The
//! windowing layer calls [`FeederApp::frame`] once per displayed frame with
//! the keys pressed since the last one.

use std::sync::Arc;

use crate::assets::AssetCatalog;
use crate::audio::{AudioBackend, AudioEngine, SoundBank};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::context::{FeederContext, FeederRegistry};
use crate::daylight::TimeOfDay;
use crate::error::FeederError;
use crate::menu::{Menu, MenuAction, MenuKind};
use crate::scene::{Renderer, build_scene};
use crate::settings::Settings;
use crate::sim::{FeederEvent, FeederState, TickInput, tick};
use crate::update::UpdateCheck;

/// Keys the app reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

/// One displayed frame's worth of input
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Presses since the last frame, in order
    pub keys: Vec<Key>,
    /// Wall-clock seconds since the last frame
    pub dt: f32,
}

pub struct FeederApp<R: Renderer> {
    settings: Settings,
    registry: FeederRegistry,
    state: FeederState,
    catalog: AssetCatalog,
    audio: AudioEngine,
    renderer: R,
    main_menu: Menu,
    pause_menu: Menu,
    update_check: UpdateCheck,
    accumulator: f32,
    input: TickInput,
    /// Fixed time of day instead of the local clock
    time_override: Option<TimeOfDay>,
}

impl<R: Renderer> FeederApp<R> {
    /// Load the configured feeder and open the main menu
    pub fn new(
        settings: Settings,
        registry: FeederRegistry,
        backend: Arc<dyn AudioBackend>,
        mut renderer: R,
        update_check: UpdateCheck,
    ) -> Result<Self, FeederError> {
        let context = registry.get(&settings.feeder)?.clone();
        let root = settings.asset_root.clone();
        let catalog = AssetCatalog::load(&context, &root, &mut renderer)?;
        let bank = SoundBank::load(&context, &root, backend.as_ref())?;

        let mut audio = AudioEngine::new(backend, bank, settings.volume());
        if settings.start_muted {
            audio.disable();
        }
        audio.restart_background()?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Starting {} with seed {seed}", context.name);

        let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
        let mut main_menu = Menu::new(MenuKind::Main, names.clone(), &context.name);
        main_menu.open();
        let pause_menu = Menu::new(MenuKind::Pause, names, &context.name);

        Ok(Self {
            settings,
            registry,
            state: FeederState::new(context, seed),
            catalog,
            audio,
            renderer,
            main_menu,
            pause_menu,
            update_check,
            accumulator: 0.0,
            input: TickInput::default(),
            time_override: None,
        })
    }

    pub fn state(&self) -> &FeederState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FeederState {
        &mut self.state
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn main_menu(&self) -> &Menu {
        &self.main_menu
    }

    pub fn pause_menu(&self) -> &Menu {
        &self.pause_menu
    }

    pub fn context(&self) -> &FeederContext {
        self.state.context()
    }

    /// Pin the scenery to one time of day; `None` follows the local clock
    pub fn set_time_of_day(&mut self, time: Option<TimeOfDay>) {
        self.time_override = time;
    }

    fn time_of_day(&self) -> TimeOfDay {
        self.time_override.unwrap_or_else(TimeOfDay::now)
    }

    /// Process one frame: keys, simulation, audio, then draw
    pub fn frame(&mut self, input: &FrameInput) -> Result<(), FeederError> {
        self.main_menu.begin_frame();
        self.pause_menu.begin_frame();

        if self.main_menu.is_open() {
            // Nothing moves behind the main menu
            for &key in &input.keys {
                let current = self.state.context().name.clone();
                let action = self.main_menu.handle_key(key, &current);
                self.apply(action)?;
            }
            self.accumulator = 0.0;
        } else {
            for &key in &input.keys {
                if self.pause_menu.is_open() {
                    let current = self.state.context().name.clone();
                    let action = self.pause_menu.handle_key(key, &current);
                    self.apply(action)?;
                } else {
                    match key {
                        Key::Escape => self.pause_menu.open(),
                        Key::Enter => self.input.refill = true,
                        Key::Up | Key::Down => {}
                    }
                }
            }
            self.update(input.dt);
        }

        self.draw();
        Ok(())
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;
        self.input.time_of_day = self.time_of_day();
        self.input.finished_songs.extend(self.audio.poll_finished());

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.input.sound_disabled = self.audio.is_disabled();
            let events = tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.refill = false;
            self.input.finished_songs.clear();

            for event in events {
                self.handle_event(event);
            }
        }
    }

    fn handle_event(&mut self, event: FeederEvent) {
        match event {
            FeederEvent::SongRequested { bird, song } => {
                if let Err(e) = self.audio.play_song(bird, song) {
                    log::warn!("Bird {bird} could not sing: {e}");
                }
            }
            FeederEvent::BirdSpawned { .. } | FeederEvent::BirdPerched { .. } => {}
            FeederEvent::BirdLeft { bird } => log::debug!("Bird {bird} left"),
        }
    }

    fn apply(&mut self, action: MenuAction) -> Result<(), FeederError> {
        match action {
            MenuAction::None | MenuAction::Close => Ok(()),
            MenuAction::ToggleSound => {
                self.audio.toggle();
                Ok(())
            }
            MenuAction::SwitchFeeder(name) => self.switch_feeder(&name),
        }
    }

    /// Load another registered feeder. Every bird leaves.
    pub fn switch_feeder(&mut self, name: &str) -> Result<(), FeederError> {
        let context = self.registry.get(name)?.clone();
        let root = self.settings.asset_root.clone();
        self.catalog = AssetCatalog::load(&context, &root, &mut self.renderer)?;
        let bank = SoundBank::load(&context, &root, self.audio.backend())?;
        self.audio.reload(bank)?;
        self.state.switch_context(context);
        self.input = TickInput::default();
        self.accumulator = 0.0;
        Ok(())
    }

    fn draw(&mut self) {
        let time_of_day = self.time_of_day();
        let current = &self.state.context().name;
        let sound_disabled = self.audio.is_disabled();
        let update_available = self.update_check.poll();

        let menu = [&self.main_menu, &self.pause_menu]
            .into_iter()
            .find(|m| m.is_open())
            .map(|m| (m.kind(), m.lines(current, sound_disabled, update_available)));

        let scene = build_scene(&self.state, &self.catalog, time_of_day, menu);
        self.renderer.present(&scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::write_assets;
    use crate::audio::SilentBackend;
    use crate::context::BACKYARD_SUNFLOWER;
    use crate::scene::HeadlessRenderer;
    use std::time::Duration;
    use tempfile::TempDir;

    fn app() -> (TempDir, FeederApp<HeadlessRenderer>) {
        let dir = TempDir::new().unwrap();
        let context = FeederContext::backyard_sunflower();
        write_assets(dir.path(), &context);

        let mut registry = FeederRegistry::with_builtin();
        let mut porch = context.clone();
        porch.name = "Porch".into();
        registry.register(porch);

        let settings = Settings {
            asset_root: dir.path().to_path_buf(),
            seed: Some(12345),
            check_for_updates: false,
            ..Default::default()
        };
        let backend = Arc::new(SilentBackend {
            clip_length: Duration::from_millis(20),
        });
        let mut app = FeederApp::new(
            settings,
            registry,
            backend,
            HeadlessRenderer::default(),
            UpdateCheck::disabled(),
        )
        .unwrap();
        app.set_time_of_day(Some(TimeOfDay::Day));
        (dir, app)
    }

    fn press(app: &mut FeederApp<HeadlessRenderer>, keys: &[Key]) {
        app.frame(&FrameInput {
            keys: keys.to_vec(),
            dt: SIM_DT,
        })
        .unwrap();
    }

    fn idle(app: &mut FeederApp<HeadlessRenderer>, frames: u32) {
        for _ in 0..frames {
            press(app, &[]);
        }
    }

    #[test]
    fn test_main_menu_holds_simulation() {
        let (_dir, mut app) = app();
        assert!(app.main_menu().is_open());
        idle(&mut app, 30);
        assert_eq!(app.state().time_ticks, 0);
        let scene = app.renderer().last_scene().unwrap();
        assert_eq!(scene.menu, Some(MenuKind::Main));

        press(&mut app, &[Key::Enter]);
        assert!(!app.main_menu().is_open());
        idle(&mut app, 30);
        assert!(app.state().time_ticks >= 29);
    }

    #[test]
    fn test_pause_menu_keeps_feeder_running() {
        let (_dir, mut app) = app();
        press(&mut app, &[Key::Escape]);
        assert!(!app.main_menu().is_open());

        press(&mut app, &[Key::Escape]);
        assert!(app.pause_menu().is_open());
        let before = app.state().time_ticks;
        idle(&mut app, 10);
        assert!(app.state().time_ticks > before);

        press(&mut app, &[Key::Escape]);
        assert!(!app.pause_menu().is_open());
    }

    #[test]
    fn test_enter_refills_only_without_menu() {
        let (_dir, mut app) = app();
        press(&mut app, &[Key::Enter]);
        app.state_mut().seed_pile.consume(1000.0, SIM_DT);
        let low = app.state().seed_pile.count();

        press(&mut app, &[Key::Enter]);
        assert!(app.state().seed_pile.count() > low);

        press(&mut app, &[Key::Escape]);
        let before = app.state().seed_pile.count();
        // Enter on the current feeder closes the pause menu instead
        press(&mut app, &[Key::Enter]);
        assert!(!app.pause_menu().is_open());
        assert!(app.state().seed_pile.count() <= before);
    }

    #[test]
    fn test_switching_feeder_clears_birds() {
        let (_dir, mut app) = app();
        press(&mut app, &[Key::Enter]);
        idle(&mut app, 60 * 60);

        press(&mut app, &[Key::Escape]);
        press(&mut app, &[Key::Down, Key::Enter]);
        assert_eq!(app.context().name, "Porch");
        assert!(app.state().birds.is_empty());
        assert!(app.state().perches.iter().all(|p| !p.occupied));
        assert!(!app.pause_menu().is_open());
    }

    #[test]
    fn test_sound_row_toggles_mute() {
        let (_dir, mut app) = app();
        press(&mut app, &[Key::Up, Key::Enter]);
        assert!(app.audio().is_disabled());
        assert!(app.main_menu().is_open());
        let scene = app.renderer().last_scene().unwrap();
        assert!(scene.menu_lines.iter().any(|l| l.text == "Unmute"));

        press(&mut app, &[Key::Enter]);
        assert!(!app.audio().is_disabled());
        assert_eq!(app.context().name, BACKYARD_SUNFLOWER);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let (_dir, mut app) = app();
        press(&mut app, &[Key::Enter]);
        let before = app.state().time_ticks;
        app.frame(&FrameInput {
            keys: Vec::new(),
            dt: 10.0,
        })
        .unwrap();
        assert!(app.state().time_ticks - before <= u64::from(MAX_SUBSTEPS));
    }
}
