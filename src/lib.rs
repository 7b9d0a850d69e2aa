pub mod client;
pub mod config;
pub mod harvest;
pub mod model;
pub mod traits;

// Re-export common types for convenience
pub use client::GitHubClient;
pub use config::{ConfigError, HarvesterConfig};
pub use harvest::{HarvestPipeline, HarvestProfile, HarvestReport, ProfileKind};
pub use model::*;
pub use traits::*;
