//! §6 "External interfaces" — the minimal collaborator surface a host
//! embedding this crate needs beyond the arithmetic core and scripting
//! runtime: a single-instance file lock and a small config-file parser.

pub mod config;
pub mod lock;

pub use config::{parse as parse_config, Config, ConfigValue};
pub use lock::{acquire as acquire_lock, LockHandle};
