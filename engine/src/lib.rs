pub mod alliance;
pub mod config;
pub mod errors;
pub mod espionage;
pub mod log;
pub mod processor;
pub mod revolt;
pub mod scheduler;
pub mod setup;
pub mod trial;
pub mod types;
pub mod visibility;


pub use config::GameConfig;
pub use errors::{ActionError, ActionResult};
pub use log::{ActionKind, ActionLogEntry, LogFilter};
pub use processor::{Action, Effect};
pub use types::*;
pub use visibility::{PublicProfile, RedactedState};
