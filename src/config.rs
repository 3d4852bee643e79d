//! User configuration: engine tunables and the persisted theme.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/scroll-stage/config.toml`
//! (default `~/.config/scroll-stage/config.toml`).  The theme flag lives in
//! the same file and is read and written through [`FileStore`].

use std::path::{Path, PathBuf};

use crate::core::drag::DragConfig;
use crate::core::engine::EngineConfig;
use crate::core::error::StoreError;
use crate::core::pointer::PointerConfig;
use crate::core::theme::KeyValueStore;

const DEFAULT_FPS: u32 = 60;
pub const MIN_FPS: u32 = 10;
pub const MAX_FPS: u32 = 240;
const DEFAULT_SCRUB: f64 = 5.0;
const DEFAULT_INTRO: &[&str] = &["HELLO", "WELCOME", "PORTFOLIO"];

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Frame rate of the animation loop.
    pub fps: u32,
    /// Seconds for the cursor to close half the gap to the pointer.
    pub cursor_half_life: f64,
    /// Same for the arrow follower.
    pub arrow_half_life: f64,
    /// Fraction of the allowed range a drag may stretch past an edge.
    pub drag_overshoot: f64,
    /// Lag of the scrubbed section animations, in seconds.
    pub scrub: f64,
    /// Labels shown by the intro, in order.
    pub intro: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let pointer = PointerConfig::default();
        Self {
            fps: DEFAULT_FPS,
            cursor_half_life: pointer.cursor_half_life,
            arrow_half_life: pointer.arrow_half_life,
            drag_overshoot: DragConfig::default().overshoot,
            scrub: DEFAULT_SCRUB,
            intro: DEFAULT_INTRO.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Engine settings derived from this config.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            pointer: PointerConfig {
                cursor_half_life: self.cursor_half_life,
                arrow_half_life: self.arrow_half_life,
            },
            drag: DragConfig {
                overshoot: self.drag_overshoot,
                ..DragConfig::default()
            },
        }
    }

    /// Seconds per frame.
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.fps)
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                tracing::debug!("no config at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Persist current config to `path`.  Keys this struct does not own
    /// (the theme flag, anything hand-added) are left as they are.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = match std::fs::read_to_string(path) {
            Ok(existing) => existing,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HEADER.to_string(),
            Err(err) => return Err(err.into()),
        };
        for (key, value) in self.to_pairs() {
            contents = upsert(&contents, key, &value);
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for (key, value) in entries(s) {
            match key {
                "fps" => {
                    if let Ok(v) = value.parse::<u32>() {
                        config.fps = v.clamp(MIN_FPS, MAX_FPS);
                    }
                }
                "cursor_half_life" => {
                    if let Some(v) = parse_seconds(value) {
                        config.cursor_half_life = v.clamp(0.01, 10.0);
                    }
                }
                "arrow_half_life" => {
                    if let Some(v) = parse_seconds(value) {
                        config.arrow_half_life = v.clamp(0.01, 10.0);
                    }
                }
                "drag_overshoot" => {
                    if let Ok(v) = value.parse::<f64>() {
                        if v.is_finite() {
                            config.drag_overshoot = v.clamp(0.0, 0.5);
                        }
                    }
                }
                "scrub" => {
                    if let Some(v) = parse_seconds(value) {
                        config.scrub = v.clamp(0.05, 30.0);
                    }
                }
                "intro" => {
                    let labels: Vec<String> = value
                        .split(',')
                        .map(|part| part.trim().trim_matches('"'))
                        .filter(|part| !part.is_empty())
                        .map(str::to_string)
                        .collect();
                    if !labels.is_empty() {
                        config.intro = labels;
                    }
                }
                _ => {}
            }
        }

        config
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fps", self.fps.to_string()),
            ("cursor_half_life", self.cursor_half_life.to_string()),
            ("arrow_half_life", self.arrow_half_life.to_string()),
            ("drag_overshoot", self.drag_overshoot.to_string()),
            ("scrub", self.scrub.to_string()),
            ("intro", self.intro.join(", ")),
        ]
    }
}

const HEADER: &str = "\
# scroll-stage configuration
# Format: key = value
# theme = dark | light
# intro = Label1, Label2, ...
";

fn parse_seconds(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// `key = value` pairs, skipping comments and section headers.
fn entries(s: &str) -> impl Iterator<Item = (&str, &str)> {
    s.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

/// Replace the first `key = ...` line, or append one.
fn upsert(contents: &str, key: &str, value: &str) -> String {
    let mut replaced = false;
    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| {
            let is_key = line
                .split_once('=')
                .is_some_and(|(k, _)| k.trim() == key && !line.trim_start().starts_with('#'));
            if is_key && !replaced {
                replaced = true;
                format!("{key} = {value}")
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(format!("{key} = {value}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Return the config file path (`$XDG_CONFIG_HOME/scroll-stage/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-stage").join("config.toml")
}

// ───────────────────────────────────────── file store ────────

/// [`KeyValueStore`] backed by the config file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let found = entries(&contents)
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.trim_matches('"').to_string());
        Ok(found)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HEADER.to_string(),
            Err(err) => return Err(err.into()),
        };
        std::fs::write(&self.path, upsert(&contents, key, value))?;
        Ok(())
    }
}
