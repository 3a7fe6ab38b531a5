/// Lifecycle of a crawl run
///
/// `Seeding → Running → Draining → Stopped`, with `Stopped` reachable from every
/// other state so shutdown can always run.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Loading the frontier checkpoint or the configured seeds
    Seeding,

    /// Dequeuing and processing URLs
    Running,

    /// A stop signal was observed; finishing the in-flight URL only
    Draining,

    /// Terminal: fetch client and sink closed, final checkpoint written
    Stopped,
}

impl CrawlState {
    /// Returns true if the orchestrator may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Running)
                | (Self::Seeding, Self::Stopped)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Stopped)
                | (Self::Draining, Self::Stopped)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlState::Seeding.can_transition_to(CrawlState::Running));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Draining));
        assert!(CrawlState::Draining.can_transition_to(CrawlState::Stopped));
    }

    #[test]
    fn test_stopped_reachable_from_every_live_state() {
        for state in [CrawlState::Seeding, CrawlState::Running, CrawlState::Draining] {
            assert!(state.can_transition_to(CrawlState::Stopped), "{}", state);
        }
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Seeding));
        assert!(!CrawlState::Draining.can_transition_to(CrawlState::Running));
        assert!(!CrawlState::Stopped.can_transition_to(CrawlState::Running));
        assert!(!CrawlState::Stopped.can_transition_to(CrawlState::Stopped));
        assert!(!CrawlState::Seeding.can_transition_to(CrawlState::Draining));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlState::Draining), "draining");
    }
}
