//! Harvest configuration: the config struct, its typestate builder,
//! and accessor methods.

mod builder;
mod getters;
mod types;

pub use builder::{HarvestConfigBuilder, WithTarget};
pub use types::HarvestConfig;
