// Map-reduce document analysis.
// Implements: segmentation, per-segment analysis, hierarchical reduction, failure policy.
// All completion calls go through the `TextCompletion` trait: no direct HTTP here.

pub mod analysis;
pub mod chunk_processor;
pub mod handlers;
pub mod orchestrator;
pub mod policy;
pub mod prompts;
pub mod reducer;
pub mod segmenter;
