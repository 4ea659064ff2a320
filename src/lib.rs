pub mod catalog;
pub mod commands;
pub mod config;
pub mod data;
pub mod enforcement;
pub mod handlers;
pub mod host;
pub mod logging;
pub mod registry;

// Log targets and display name
pub const PLUGIN_NAME: &str = "craft_ban";
pub const COMMAND_TARGET: &str = "craft_ban::command";
pub const ERROR_TARGET: &str = "craft_ban::error";
pub const EVENT_TARGET: &str = "craft_ban::handlers";
pub const CONSOLE_TARGET: &str = "craft_ban";

pub use config::CraftBanConfig;
pub use data::{Data, DataInner, TickLoopHandle};
pub use registry::{BanError, BanResult, Purpose, ResourceId};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
