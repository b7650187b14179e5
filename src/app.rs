//! Application orchestrator
//!
//! Owns every component and runs the single-threaded loop. One tick:
//! commands, capture, track, map, game update, cursor, render, FPS, pacing.

use image::imageops;

use crate::camera::{self, FrameSource};
use crate::config::AppConfig;
use crate::cursor::Cursor;
use crate::display::{Command, Display};
use crate::error::StartupResult;
use crate::mapper::{CoordinateMapper, ScreenPoint};
use crate::pacing::{FpsCounter, FrameClock};
use crate::renderer::scene::Layer;
use crate::renderer::vertex::colors;
use crate::renderer::{Assets, Draw, PictureInPicture, Scene};
use crate::sim::{GameManager, GamePhase, TickReport};
use crate::tracking::{Backends, Frame, Tracker, build_tracker};
use crate::ui;

const PIP_MARGIN: u32 = 10;
const PIP_BORDER_WIDTH: u32 = 2;

pub struct App {
    config: AppConfig,
    camera: Box<dyn FrameSource>,
    tracker: Box<dyn Tracker>,
    display: Box<dyn Display>,
    assets: Assets,
    mapper: CoordinateMapper,
    game: GameManager,
    cursor: Cursor,
    fps: FpsCounter,
    clock: FrameClock,
    debug: bool,
    fullscreen: bool,
    running: bool,
    shut_down: bool,
}

impl App {
    /// Open the configured capture source, build the tracker and load assets.
    ///
    /// The camera is released again if a later step fails.
    pub fn setup(
        config: AppConfig,
        backends: Backends,
        display: Box<dyn Display>,
        seed: u64,
    ) -> StartupResult<Self> {
        config.validate()?;

        let mut camera = camera::open(&config.camera)?;
        let tracker = match build_tracker(&config.tracker, backends) {
            Ok(tracker) => tracker,
            Err(e) => {
                camera.release();
                return Err(e);
            }
        };
        let assets = match Assets::load(&config.assets, config.screen.width, config.screen.height)
        {
            Ok(assets) => assets,
            Err(e) => {
                camera.release();
                return Err(e);
            }
        };

        Ok(Self::new(
            config,
            camera,
            tracker,
            display,
            assets,
            seed,
        ))
    }

    /// Assemble an app from ready components
    pub fn new(
        config: AppConfig,
        camera: Box<dyn FrameSource>,
        tracker: Box<dyn Tracker>,
        mut display: Box<dyn Display>,
        assets: Assets,
        seed: u64,
    ) -> Self {
        let (width, height) = (config.screen.width, config.screen.height);
        let g = &config.gameplay;
        let game = GameManager::new(g, width, height, seed);
        let cursor = Cursor::new(g.cursor_radius, g.trail_length);

        if config.screen.fullscreen {
            display.set_fullscreen(true);
        }
        log::info!(
            "Asteroid Destroyer ready: {}x{} screen, {} tracking, seed {}",
            width,
            height,
            tracker.name(),
            seed
        );

        Self {
            mapper: CoordinateMapper::new(width, height),
            clock: FrameClock::new(config.screen.target_fps),
            debug: config.debug_overlay,
            fullscreen: config.screen.fullscreen,
            camera,
            tracker,
            display,
            assets,
            game,
            cursor,
            fps: FpsCounter::new(),
            running: true,
            shut_down: false,
            config,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.game.phase()
    }

    pub fn game(&self) -> &GameManager {
        &self.game
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Skip frame pacing (for headless runs)
    pub fn set_unpaced(&mut self) {
        self.clock = FrameClock::new(0);
    }

    fn handle_command(&mut self, command: Command) {
        log::debug!("Command {command:?} in {:?}", self.game.phase());
        match command {
            Command::StartOrRestart => match self.game.phase() {
                GamePhase::Menu | GamePhase::GameOver => {
                    self.game.start();
                    self.cursor.clear();
                }
                GamePhase::Playing => {}
            },
            Command::Back => match self.game.phase() {
                GamePhase::Menu => self.running = false,
                GamePhase::Playing | GamePhase::GameOver => {
                    self.game.return_to_menu();
                    self.cursor.clear();
                }
            },
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.display.set_fullscreen(self.fullscreen);
            }
            Command::ToggleDebug => {
                self.debug = !self.debug;
                log::info!("Debug view {}", if self.debug { "on" } else { "off" });
            }
            Command::Close => self.running = false,
        }
    }

    /// Capture and mirror one frame
    fn capture(&mut self) -> Option<Frame> {
        let frame = self.camera.read_frame()?;
        if self.config.camera.mirror {
            Some(imageops::flip_horizontal(&frame))
        } else {
            Some(frame)
        }
    }

    /// Run one iteration of the loop without pacing
    pub fn tick(&mut self) -> TickReport {
        for command in self.display.poll_commands() {
            self.handle_command(command);
        }
        if !self.running {
            return TickReport::default();
        }

        let frame = self.capture();
        let target: Option<ScreenPoint> = frame
            .as_ref()
            .and_then(|f| self.tracker.process_frame(f))
            .map(|p| self.mapper.map_to_screen(p.x, p.y));

        let report = self.game.update(target);
        if report.destroyed > 0 {
            log::debug!("Destroyed {} asteroid(s), score {}", report.destroyed, self.game.score());
        }
        if self.game.phase() == GamePhase::Playing {
            self.cursor.update(target);
        }

        let scene = self.build_scene(frame.as_ref());
        self.display.present(&scene, &self.assets);
        self.fps.tick();
        report
    }

    fn build_scene(&self, frame: Option<&Frame>) -> Scene {
        let (width, height) = (self.config.screen.width, self.config.screen.height);
        let mut scene = Scene::new(width, height);
        let list = &mut scene.draw_list;

        match self.game.phase() {
            GamePhase::Menu => ui::menu(list, width, height),
            GamePhase::Playing | GamePhase::GameOver => {
                list.set_layer(Layer::Asteroids);
                for asteroid in self.game.asteroids() {
                    asteroid.draw(list, &self.assets);
                }
                list.set_layer(Layer::Particles);
                for particle in self.game.particles() {
                    particle.draw(list, &self.assets);
                }
                if self.game.phase() == GamePhase::Playing {
                    list.set_layer(Layer::Cursor);
                    self.cursor.draw(list, &self.assets);
                    ui::hud(list, self.game.score(), self.game.lives(), self.fps.fps(), width);
                } else {
                    ui::game_over(list, self.game.score(), width, height);
                }
            }
        }

        if self.debug {
            scene.pip = frame.map(|f| self.picture_in_picture(f));
        }
        scene
    }

    /// Tracker debug view scaled to a quarter of the screen height
    fn picture_in_picture(&self, frame: &Frame) -> PictureInPicture {
        let screen = &self.config.screen;
        let (cam_w, cam_h) = self.camera.resolution();
        let pip_h = (screen.height / 4).max(1);
        let pip_w = ((pip_h as f32 * cam_w as f32 / cam_h.max(1) as f32) as u32).max(1);

        let debug = self.tracker.debug_image(frame);
        let image = imageops::resize(&debug, pip_w, pip_h, imageops::FilterType::Triangle);

        PictureInPicture {
            image,
            x: screen.width.saturating_sub(pip_w + PIP_MARGIN),
            y: screen.height.saturating_sub(pip_h + PIP_MARGIN),
            border: colors::PIP_BORDER,
            border_width: PIP_BORDER_WIDTH,
        }
    }

    /// Run until closed, then shut down
    pub fn run(&mut self) {
        log::info!("Entering main loop");
        while self.running && self.display.is_open() {
            self.tick();
            self.clock.wait();
        }
        log::info!("Main loop finished, final score {}", self.game.score());
        self.shutdown();
    }

    /// Release the camera, then the tracker. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.running = false;
        self.camera.release();
        self.tracker.close();
        log::info!("Shut down");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::TextItem;
    use crate::tracking::TrackedPoint;
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct FakeCamera {
        frames: VecDeque<Option<Frame>>,
        resolution: (u32, u32),
        log: Log,
    }

    impl FrameSource for FakeCamera {
        fn read_frame(&mut self) -> Option<Frame> {
            self.frames.pop_front().flatten()
        }
        fn resolution(&self) -> (u32, u32) {
            self.resolution
        }
        fn release(&mut self) {
            self.log.borrow_mut().push("camera");
        }
    }

    /// Reports a fixed target and remembers the last frame it saw
    struct FakeTracker {
        target: Option<TrackedPoint>,
        seen: Rc<RefCell<Option<Frame>>>,
        log: Log,
    }

    impl Tracker for FakeTracker {
        fn name(&self) -> &'static str {
            "fake"
        }
        fn process_frame(&mut self, frame: &Frame) -> Option<TrackedPoint> {
            *self.seen.borrow_mut() = Some(frame.clone());
            self.target
        }
        fn debug_image(&self, frame: &Frame) -> RgbImage {
            frame.clone()
        }
        fn close(&mut self) {
            self.log.borrow_mut().push("tracker");
        }
    }

    #[derive(Default)]
    struct Shared {
        commands: VecDeque<Command>,
        presented: u32,
        pip: Option<(u32, u32, u32, u32)>,
        texts: Vec<TextItem>,
        fullscreen: bool,
    }

    struct FakeDisplay(Rc<RefCell<Shared>>);

    impl Display for FakeDisplay {
        fn poll_commands(&mut self) -> Vec<Command> {
            self.0.borrow_mut().commands.drain(..).collect()
        }
        fn present(&mut self, scene: &Scene, _assets: &Assets) {
            let mut s = self.0.borrow_mut();
            s.presented += 1;
            s.pip = scene
                .pip
                .as_ref()
                .map(|p| (p.x, p.y, p.image.width(), p.image.height()));
            s.texts = scene.draw_list.texts().cloned().collect();
        }
        fn set_fullscreen(&mut self, fullscreen: bool) {
            self.0.borrow_mut().fullscreen = fullscreen;
        }
        fn is_open(&self) -> bool {
            true
        }
    }

    struct Harness {
        app: App,
        display: Rc<RefCell<Shared>>,
        seen: Rc<RefCell<Option<Frame>>>,
        log: Log,
    }

    impl Harness {
        fn new(frames: Vec<Option<Frame>>, target: Option<TrackedPoint>) -> Self {
            let log: Log = Rc::default();
            let display = Rc::new(RefCell::new(Shared::default()));
            let seen = Rc::new(RefCell::new(None));
            let resolution = frames
                .iter()
                .flatten()
                .next()
                .map_or((64, 48), |f| f.dimensions());
            let camera = FakeCamera {
                frames: frames.into(),
                resolution,
                log: Rc::clone(&log),
            };
            let tracker = FakeTracker {
                target,
                seen: Rc::clone(&seen),
                log: Rc::clone(&log),
            };
            let app = App::new(
                AppConfig::default(),
                Box::new(camera),
                Box::new(tracker),
                Box::new(FakeDisplay(Rc::clone(&display))),
                Assets::default(),
                7,
            );
            Self {
                app,
                display,
                seen,
                log,
            }
        }

        fn send(&self, command: Command) {
            self.display.borrow_mut().commands.push_back(command);
        }
    }

    fn frame() -> Frame {
        RgbImage::new(64, 48)
    }

    #[test]
    fn test_commands_drive_phases() {
        let mut h = Harness::new(vec![], None);
        h.app.tick();
        assert_eq!(h.app.phase(), GamePhase::Menu);

        h.send(Command::StartOrRestart);
        h.app.tick();
        assert_eq!(h.app.phase(), GamePhase::Playing);

        h.send(Command::Back);
        h.app.tick();
        assert_eq!(h.app.phase(), GamePhase::Menu);
        assert!(h.app.is_running());

        h.send(Command::Back);
        h.app.tick();
        assert!(!h.app.is_running());
        // Nothing presented once stopped
        assert_eq!(h.display.borrow().presented, 3);
    }

    #[test]
    fn test_missing_frames_mean_no_target() {
        let mut h = Harness::new(vec![None, None], TrackedPoint::from_normalized(0.5, 0.5));
        h.send(Command::StartOrRestart);
        h.app.tick();
        h.app.tick();
        assert_eq!(h.app.game().state().time_ticks, 2);
        assert_eq!(h.app.cursor().position(), None);
        assert!(h.seen.borrow().is_none());
    }

    #[test]
    fn test_target_is_mapped_to_screen() {
        let target = TrackedPoint::from_normalized(0.5, 0.25);
        let mut h = Harness::new(vec![Some(frame()); 3], target);
        h.send(Command::StartOrRestart);
        h.app.tick();
        assert_eq!(h.app.cursor().position(), Some(ScreenPoint::new(640, 180)));
    }

    #[test]
    fn test_cursor_only_follows_while_playing() {
        let target = TrackedPoint::from_normalized(0.5, 0.5);
        let mut h = Harness::new(vec![Some(frame()); 3], target);
        h.app.tick();
        assert_eq!(h.app.cursor().position(), None);
        assert!(h.seen.borrow().is_some());
    }

    #[test]
    fn test_frames_are_mirrored() {
        let mut img = RgbImage::new(64, 48);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let mut h = Harness::new(vec![Some(img)], None);
        h.app.tick();
        let seen = h.seen.borrow();
        assert_eq!(seen.as_ref().unwrap().get_pixel(63, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_debug_toggle_adds_pip() {
        let mut h = Harness::new(vec![Some(frame()); 3], None);
        h.app.tick();
        assert_eq!(h.display.borrow().pip, None);

        h.send(Command::ToggleDebug);
        h.app.tick();
        // 1280x720 screen, 4:3 camera
        assert_eq!(h.display.borrow().pip, Some((1030, 530, 240, 180)));
    }

    #[test]
    fn test_pip_follows_camera_aspect() {
        let mut h = Harness::new(vec![Some(RgbImage::new(96, 54)); 2], None);
        h.send(Command::ToggleDebug);
        h.app.tick();
        // 16:9 camera widens the view
        assert_eq!(h.display.borrow().pip, Some((950, 530, 320, 180)));
    }

    #[test]
    fn test_fullscreen_toggle_reaches_display() {
        let mut h = Harness::new(vec![], None);
        h.send(Command::ToggleFullscreen);
        h.app.tick();
        assert!(h.display.borrow().fullscreen);
    }

    #[test]
    fn test_scene_text_follows_phase() {
        let mut h = Harness::new(vec![], None);
        h.app.tick();
        let title = h.display.borrow().texts[0].text.clone();
        assert_eq!(title, "ASTEROID DESTROYER");

        h.send(Command::StartOrRestart);
        h.app.tick();
        assert_eq!(h.display.borrow().texts[0].text, "Score: 0");
    }

    #[test]
    fn test_shutdown_releases_camera_then_tracker_once() {
        let h = Harness::new(vec![], None);
        let log = Rc::clone(&h.log);
        let mut app = h.app;
        app.shutdown();
        app.shutdown();
        drop(app);
        assert_eq!(*log.borrow(), vec!["camera", "tracker"]);
    }

    #[test]
    fn test_drop_shuts_down() {
        let h = Harness::new(vec![], None);
        let log = Rc::clone(&h.log);
        drop(h);
        assert_eq!(*log.borrow(), vec!["camera", "tracker"]);
    }
}
