pub mod actions;
pub mod config;
pub mod effects;
pub mod enemy;
pub mod errors;
pub mod events;
pub mod game;
pub mod path;
pub mod projectile;
pub mod skills;
pub mod snapshot;
pub mod store;
pub mod systems;
pub mod tower;
pub mod world;

pub use actions::PlayerAction;
pub use config::{EnemyConfig, GameConfig, MatchConfig, TowersConfig};
pub use enemy::EnemyKind;
pub use errors::{NewGameError, PathError};
pub use events::{GameEvent, Severity};
pub use game::DefenseGame;
pub use path::{Cell, Path};
pub use skills::SkillProfile;
pub use snapshot::GameSnapshot;
pub use store::{ConfigRepository, FileStore, MemoryStore, Section};
pub use tower::TowerKind;
