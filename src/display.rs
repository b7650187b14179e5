//! Display backends and runtime commands
//!
//! A display shows each finished [`Scene`] and reports user commands. The
//! headless display rasterizes in memory and can dump PNG snapshots, which is
//! enough to run the whole game without a window.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::str::FromStr;

use image::RgbaImage;

use crate::renderer::{Assets, Rasterizer, Scene, TextItem};

/// User commands, polled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start from the menu or restart after game over
    StartOrRestart,
    /// Leave the current game for the menu; quits from the menu
    Back,
    ToggleFullscreen,
    ToggleDebug,
    /// Window closed
    Close,
}

impl Command {
    /// Map a key name to its command
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Space" => Some(Command::StartOrRestart),
            "Escape" => Some(Command::Back),
            "f" | "F" => Some(Command::ToggleFullscreen),
            "d" | "D" => Some(Command::ToggleDebug),
            _ => None,
        }
    }
}

pub trait Display {
    /// Commands received since the last poll, oldest first
    fn poll_commands(&mut self) -> Vec<Command>;

    fn present(&mut self, scene: &Scene, assets: &Assets);

    fn set_fullscreen(&mut self, fullscreen: bool);

    fn is_open(&self) -> bool;
}

/// A key press delivered before the given frame, written `TICK:KEY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedKey {
    pub tick: u64,
    pub command: Command,
}

impl FromStr for ScriptedKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tick, key) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TICK:KEY, got '{s}'"))?;
        let tick = tick
            .trim()
            .parse()
            .map_err(|e| format!("bad tick '{tick}': {e}"))?;
        let command = Command::from_key(key).ok_or_else(|| format!("unknown key '{key}'"))?;
        Ok(Self { tick, command })
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Start a game on the first tick
    pub autostart: bool,
    /// Key presses to replay
    pub keys: Vec<ScriptedKey>,
    /// Close after this many presented frames
    pub max_ticks: Option<u64>,
    /// Write every Nth frame as a PNG
    pub snapshot_every: Option<u64>,
    pub snapshot_dir: PathBuf,
}

pub struct HeadlessDisplay {
    options: HeadlessOptions,
    rasterizer: Rasterizer,
    pending: VecDeque<Command>,
    frames: u64,
    open: bool,
    last_frame: Option<RgbaImage>,
    last_texts: Vec<TextItem>,
}

impl HeadlessDisplay {
    pub fn new(options: HeadlessOptions) -> Self {
        let mut pending = VecDeque::new();
        if options.autostart {
            pending.push_back(Command::StartOrRestart);
        }
        if let Some(every) = options.snapshot_every {
            log::info!(
                "Writing every {every} frame(s) to {}",
                options.snapshot_dir.display()
            );
        }
        Self {
            options,
            rasterizer: Rasterizer::new(),
            pending,
            frames: 0,
            open: true,
            last_frame: None,
            last_texts: Vec::new(),
        }
    }

    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last_frame.as_ref()
    }

    /// Text of the last frame, back to front
    pub fn last_texts(&self) -> &[TextItem] {
        &self.last_texts
    }

    fn write_snapshot(&self, frame: &RgbaImage) {
        let dir = &self.options.snapshot_dir;
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Cannot create snapshot directory {}: {e}", dir.display());
            return;
        }
        let path = dir.join(format!("frame_{:06}.png", self.frames));
        match frame.save(&path) {
            Ok(()) => log::debug!("Snapshot {}", path.display()),
            Err(e) => log::warn!("Failed to write snapshot {}: {e}", path.display()),
        }
    }
}

impl Display for HeadlessDisplay {
    fn poll_commands(&mut self) -> Vec<Command> {
        let frames = self.frames;
        self.pending.extend(
            self.options
                .keys
                .iter()
                .filter(|k| k.tick == frames)
                .map(|k| k.command),
        );
        let mut commands: Vec<Command> = self.pending.drain(..).collect();
        if self
            .options
            .max_ticks
            .is_some_and(|max| self.frames >= max)
        {
            commands.push(Command::Close);
        }
        if commands.contains(&Command::Close) {
            self.open = false;
        }
        commands
    }

    fn present(&mut self, scene: &Scene, assets: &Assets) {
        let frame = self.rasterizer.render(scene, assets);
        self.frames += 1;
        if self
            .options
            .snapshot_every
            .is_some_and(|n| n > 0 && self.frames % n == 0)
        {
            self.write_snapshot(&frame);
        }
        self.last_texts = scene.draw_list.texts().cloned().collect();
        self.last_frame = Some(frame);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        log::info!("Fullscreen {}", if fullscreen { "on" } else { "off" });
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key(" "), Some(Command::StartOrRestart));
        assert_eq!(Command::from_key("Escape"), Some(Command::Back));
        assert_eq!(Command::from_key("D"), Some(Command::ToggleDebug));
        assert_eq!(Command::from_key("q"), None);
    }

    #[test]
    fn test_scripted_keys_parse() {
        let key: ScriptedKey = "120:Escape".parse().unwrap();
        assert_eq!(
            key,
            ScriptedKey {
                tick: 120,
                command: Command::Back
            }
        );
        assert!("Escape".parse::<ScriptedKey>().is_err());
        assert!("x:Space".parse::<ScriptedKey>().is_err());
        assert!("3:q".parse::<ScriptedKey>().is_err());
    }

    #[test]
    fn test_scripted_keys_fire_on_their_tick() {
        let options = HeadlessOptions {
            keys: vec!["1:d".parse().unwrap(), "2:Space".parse().unwrap()],
            ..HeadlessOptions::default()
        };
        let mut display = HeadlessDisplay::new(options);
        let scene = Scene::new(8, 8);
        assert!(display.poll_commands().is_empty());
        display.present(&scene, &Assets::default());
        assert_eq!(display.poll_commands(), vec![Command::ToggleDebug]);
        display.present(&scene, &Assets::default());
        assert_eq!(display.poll_commands(), vec![Command::StartOrRestart]);
        display.present(&scene, &Assets::default());
        assert!(display.poll_commands().is_empty());
    }

    #[test]
    fn test_autostart_and_tick_limit() {
        let options = HeadlessOptions {
            autostart: true,
            max_ticks: Some(2),
            ..HeadlessOptions::default()
        };
        let mut display = HeadlessDisplay::new(options);
        assert_eq!(display.poll_commands(), vec![Command::StartOrRestart]);

        let scene = Scene::new(8, 8);
        display.present(&scene, &Assets::default());
        assert!(display.poll_commands().is_empty());
        display.present(&scene, &Assets::default());
        assert_eq!(display.poll_commands(), vec![Command::Close]);
        assert!(!display.is_open());
    }

    #[test]
    fn test_snapshots_written_every_n_frames() {
        let dir = TempDir::new().unwrap();
        let options = HeadlessOptions {
            snapshot_every: Some(2),
            snapshot_dir: dir.path().join("shots"),
            ..HeadlessOptions::default()
        };
        let mut display = HeadlessDisplay::new(options);
        let scene = Scene::new(8, 8);
        for _ in 0..5 {
            display.present(&scene, &Assets::default());
        }
        let mut names: Vec<String> = std::fs::read_dir(dir.path().join("shots"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["frame_000002.png", "frame_000004.png"]);
        assert_eq!(display.last_frame().unwrap().dimensions(), (8, 8));
    }
}
