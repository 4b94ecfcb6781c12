//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the orchestrator's run-level state machine

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
