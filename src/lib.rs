pub mod browser_setup;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod harvest;
pub mod logging;
pub mod utils;

pub use browser_setup::{
    apply_stealth_measures, download_managed_browser, find_browser_executable, launch_browser,
};
pub use config::HarvestConfig;
pub use downloader::FetchVerifier;
pub use harvest::{
    Candidate, CandidateCollector, Exchange, ExchangeKind, HarvestError, HarvestOrchestrator,
    HarvestResult, HarvestSummary, HarvestTarget, MediaReference, RelevanceClassifier, RunContext,
};
pub use utils::{search_feed_url, target_slug};

/// Run one harvest pass with the given configuration.
pub async fn harvest(config: HarvestConfig) -> Result<HarvestSummary, HarvestError> {
    harvest::orchestrator::run_harvest(config).await
}
