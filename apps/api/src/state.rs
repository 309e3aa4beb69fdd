use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextCompletion;
use crate::reasoning::tree::ReasoningTreeOrchestrator;
use crate::runs::RunRegistry;
use crate::summarize::orchestrator::MapReduceOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion service. `LlmClient` in production.
    pub llm: Arc<dyn TextCompletion>,
    pub config: Config,
    /// Background runs, in memory only.
    pub runs: RunRegistry,
}

impl AppState {
    pub fn new(llm: Arc<dyn TextCompletion>, config: Config) -> Self {
        let runs = RunRegistry::new(config.run_retention());
        Self { llm, config, runs }
    }

    pub fn summarizer(&self) -> MapReduceOrchestrator {
        MapReduceOrchestrator::new(self.llm.clone(), self.config.batch_options())
    }

    pub fn reasoner(&self) -> ReasoningTreeOrchestrator {
        ReasoningTreeOrchestrator::new(self.llm.clone(), self.config.batch_options())
    }
}
