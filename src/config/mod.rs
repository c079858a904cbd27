//! Store scheduling configuration.
//!
//! This module provides the scheduling policy, the fixed shift-code table,
//! the default penalty-rule set, and a YAML [`ConfigLoader`] for stores that
//! carry their own configuration files.

mod loader;
mod types;

pub use loader::{ConfigLoader, StoreConfig};
pub use types::{SchedulePolicy, ShiftCodeTable, ShiftWindow, default_penalty_rules};
