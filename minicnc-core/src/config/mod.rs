//! Configuration types and parsing
//!
//! Per-axis servo settings plus the machine description loaded from
//! `machine.toml`.

pub mod parser;
pub mod types;

pub use parser::{parse_machine_config, ConfigError};
pub use types::*;
