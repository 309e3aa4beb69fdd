// Iterative reasoning engine.
// Implements: expand → critique → refine cycles, per-depth synthesis, final report.
// All completion calls go through the `TextCompletion` trait: no direct HTTP here.

pub mod handlers;
pub mod node;
pub mod persona;
pub mod prompts;
pub mod step_engine;
pub mod synthesis;
pub mod tree;
