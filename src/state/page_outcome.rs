/// Per-URL dispositions recorded by the orchestrator
///
/// Every dequeued URL ends in exactly one of these outcomes.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success =====
    /// Text extracted and a record emitted
    Emitted,

    // ===== Skips (marked visited, no record) =====
    /// Already in the visited store when dequeued
    AlreadyVisited,

    /// Rejected by domain, extension or path rules before any fetch
    OutOfScope,

    /// Robots denial, retry exhaustion or a permanent fetch error
    FetchFailed,

    /// Content-Type is not HTML
    NotHtml,

    /// Neither extraction path produced text
    NoText,

    /// Redirected to a URL that is out of scope or already visited
    RedirectSkipped,

    // ===== Not finished =====
    /// A stop signal interrupted pacing or backoff; the URL goes back on the frontier
    Interrupted,
}

impl PageOutcome {
    /// Returns true if a record was emitted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Emitted)
    }

    /// Returns true if the URL was marked visited without producing a record
    pub fn is_skip(&self) -> bool {
        !matches!(self, Self::Emitted | Self::Interrupted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emitted => "emitted",
            Self::AlreadyVisited => "already_visited",
            Self::OutOfScope => "out_of_scope",
            Self::FetchFailed => "fetch_failed",
            Self::NotHtml => "not_html",
            Self::NoText => "no_text",
            Self::RedirectSkipped => "redirect_skipped",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 8] {
        [
            Self::Emitted,
            Self::AlreadyVisited,
            Self::OutOfScope,
            Self::FetchFailed,
            Self::NotHtml,
            Self::NoText,
            Self::RedirectSkipped,
            Self::Interrupted,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
