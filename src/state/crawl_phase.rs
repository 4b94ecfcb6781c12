/// Crawl phase definitions for tracking orchestrator progress
///
/// A run moves `Initializing -> Probing -> Scheduling -> Running -> Draining -> Done`.
/// `Failed` is only reachable from `Initializing`; once the target has
/// answered, per-page problems never fail the run as a whole.
use crate::HarvestError;
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Checking that the target answers at all
    Initializing,

    /// Discovering the total number of index pages
    Probing,

    /// Resolving the plan and submitting page tasks
    Scheduling,

    /// Page tasks are in flight and results are being written
    Running,

    /// All tasks finished; aggregating the run report
    Draining,

    // ===== Terminal States =====
    /// Run finished (possibly with individual page failures)
    Done,

    /// Target was unreachable; nothing was scheduled
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Probing)
                | (Self::Initializing, Self::Failed)
                | (Self::Probing, Self::Scheduling)
                | (Self::Scheduling, Self::Running)
                // Empty plan: nothing to run
                | (Self::Scheduling, Self::Done)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Probing => "probing",
            Self::Scheduling => "scheduling",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
