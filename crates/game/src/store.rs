use crate::config::{EnemyConfig, GameConfig, MatchConfig, TowersConfig};
use crate::skills::SkillProfile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::warn;

/// Abstract persisted key-value storage. The browser build backs this with
/// localStorage; tests and the headless runner use the implementations below.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// One JSON object blob on disk holding every key. Load and write failures are
/// logged and swallowed; persistence trouble must never take the game down.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = HashMap::new();
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, String>>(&text) {
                Ok(map) => entries = map,
                Err(e) => warn!(path = %path.display(), error = %e, "config blob is malformed, starting from defaults"),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not read config blob"),
        }
        Self { path, entries }
    }

    fn flush(&self) {
        match serde_json::to_string_pretty(&self.entries) {
            Ok(text) => {
                if let Err(e) = std::fs::write(&self.path, text) {
                    warn!(path = %self.path.display(), error = %e, "could not write config blob");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize config blob"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

/// Config sections, each stored under its own key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Game,
    Towers,
    Enemies,
    Skills,
}

impl Section {
    fn key(self) -> &'static str {
        match self {
            Section::Game => "config.game",
            Section::Towers => "config.towers",
            Section::Enemies => "config.enemies",
            Section::Skills => "config.skills",
        }
    }
}

/// Overlay stored values onto defaults, object-by-object.
///
/// Nested objects (per-enemy-type blocks, per-tower specs) merge per key
/// instead of being replaced wholesale, so a stored override of one field
/// keeps defaults for its siblings.
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// The single writer over persisted configuration.
///
/// Every load returns a fully populated struct: stored JSON is merged over the
/// serialized defaults and decoded back, so absent or malformed fields resolve
/// here rather than at every call site. Saves notify subscribers.
pub struct ConfigRepository<S: KeyValueStore> {
    store: S,
    listeners: Vec<Sender<Section>>,
}

impl<S: KeyValueStore> ConfigRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    /// Receive a `Section` marker every time that section is saved.
    pub fn subscribe(&mut self) -> Receiver<Section> {
        let (tx, rx) = channel();
        self.listeners.push(tx);
        rx
    }

    fn load_section<T>(&self, section: Section) -> T
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut merged = match serde_json::to_value(T::default()) {
            Ok(v) => v,
            Err(e) => {
                warn!(section = ?section, error = %e, "defaults failed to serialize");
                return T::default();
            }
        };
        if let Some(stored) = self.store.get(section.key()) {
            match serde_json::from_str::<Value>(&stored) {
                Ok(overlay) => deep_merge(&mut merged, &overlay),
                Err(e) => {
                    warn!(section = ?section, error = %e, "stored config is malformed, using defaults")
                }
            }
        }
        match serde_json::from_value(merged) {
            Ok(value) => value,
            Err(e) => {
                warn!(section = ?section, error = %e, "merged config failed to decode, using defaults");
                T::default()
            }
        }
    }

    fn save_section<T: Serialize>(&mut self, section: Section, value: &T) {
        match serde_json::to_string(value) {
            Ok(text) => {
                self.store.set(section.key(), &text);
                self.listeners.retain(|tx| tx.send(section).is_ok());
            }
            Err(e) => warn!(section = ?section, error = %e, "config failed to serialize, not saved"),
        }
    }

    pub fn load_game(&self) -> GameConfig {
        self.load_section(Section::Game)
    }

    pub fn load_towers(&self) -> TowersConfig {
        self.load_section(Section::Towers)
    }

    pub fn load_enemies(&self) -> EnemyConfig {
        self.load_section(Section::Enemies)
    }

    pub fn load_skills(&self) -> SkillProfile {
        self.load_section(Section::Skills)
    }

    /// Assemble everything a new match needs.
    pub fn load_match_config(&self) -> MatchConfig {
        MatchConfig {
            game: self.load_game(),
            towers: self.load_towers(),
            enemies: self.load_enemies(),
            skills: self.load_skills(),
        }
    }

    pub fn save_game(&mut self, cfg: &GameConfig) {
        self.save_section(Section::Game, cfg);
    }

    pub fn save_towers(&mut self, cfg: &TowersConfig) {
        self.save_section(Section::Towers, cfg);
    }

    pub fn save_enemies(&mut self, cfg: &EnemyConfig) {
        self.save_section(Section::Enemies, cfg);
    }

    pub fn save_skills(&mut self, profile: &SkillProfile) {
        self.save_section(Section::Skills, profile);
    }
}
