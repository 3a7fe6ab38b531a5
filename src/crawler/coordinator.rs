//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the single-flow crawl loop that coordinates:
//! - Seeding the frontier from the checkpoint or the configured seeds
//! - Scope filtering, fetching, extraction and record emission
//! - Link discovery back into the FIFO frontier
//! - Periodic checkpoints, progress reports and graceful shutdown

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchClient, FetchOutcome};
use crate::extract::extract;
use crate::output::{write_mirror, CrawlStats, JsonlSink, PageRecord, RecordSink};
use crate::state::{CrawlState, PageOutcome};
use crate::storage::{seed_frontier, FrontierCheckpoint, FrontierStore, VisitedLog, VisitedStore};
use crate::url::{canonicalize, extract_links, is_html_content_type, is_in_scope};
use crate::HarvestError;
use std::collections::{HashSet, VecDeque};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlConfig,
    fetcher: FetchClient,
    visited: VisitedStore,
    checkpoint: FrontierStore,
    sink: JsonlSink,
    queue: VecDeque<String>,
    seen: HashSet<String>,
    state: CrawlState,
    stats: CrawlStats,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator in the `Seeding` state
    ///
    /// Creates the output directories, replays the visited log, opens the records
    /// file and builds the initial queue. Failing to open the records file is fatal.
    pub fn new(config: CrawlConfig, cancel: CancellationToken) -> Result<Self, HarvestError> {
        config.output.ensure_dirs()?;

        let visited = VisitedStore::open(&config.output.visited_file())?;
        let checkpoint = FrontierStore::new(&config.output.frontier_file());
        let sink = JsonlSink::open(&config.output.records_path)?;
        let fetcher = FetchClient::new(&config, cancel.clone())?;

        let pending = seed_frontier(&checkpoint, &visited, &config.crawl.seeds)?;
        tracing::info!(
            "Seeded frontier with {} URLs ({} already visited)",
            pending.len(),
            visited.len()
        );

        let seen: HashSet<String> = pending.iter().cloned().collect();

        Ok(Self {
            config,
            fetcher,
            visited,
            checkpoint,
            sink,
            queue: pending.into(),
            seen,
            state: CrawlState::Seeding,
            stats: CrawlStats::new(),
            cancel,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// URLs waiting in the frontier, in crawl order
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Runs the crawl to completion and returns the final counters
    ///
    /// Shutdown (closing the client and sink, writing the final checkpoint) runs on
    /// every exit path; a fatal error is returned after it.
    pub async fn run(mut self) -> Result<CrawlStats, HarvestError> {
        self.transition(CrawlState::Running)?;
        tracing::info!(
            "Starting crawl: {} pending, max {} pages",
            self.queue.len(),
            self.config.crawl.max_pages
        );

        let result = self.crawl_loop().await;
        if let Err(e) = &result {
            tracing::error!("Crawl aborted: {}", e);
        }

        self.shutdown();
        result.map(|()| self.stats)
    }

    async fn crawl_loop(&mut self) -> Result<(), HarvestError> {
        let interval = self.config.crawl.checkpoint_interval.max(1);

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Stop signal received, draining");
                self.transition(CrawlState::Draining)?;
                return Ok(());
            }

            if self.stats.processed >= self.config.crawl.max_pages {
                tracing::info!("Reached max pages ({})", self.config.crawl.max_pages);
                return Ok(());
            }

            let Some(url) = self.queue.pop_front() else {
                tracing::info!("Frontier is empty, crawl complete");
                return Ok(());
            };

            let outcome = match self.process_url(&url).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.queue.push_front(url);
                    return Err(e);
                }
            };
            tracing::debug!("{} -> {}", url, outcome);
            self.stats.record(outcome);

            if outcome == PageOutcome::Interrupted {
                self.queue.push_front(url);
                tracing::info!("Stop signal interrupted a fetch, draining");
                self.transition(CrawlState::Draining)?;
                return Ok(());
            }

            if outcome.is_success() && self.stats.processed % interval == 0 {
                self.save_checkpoint();
                self.stats.log_progress(self.queue.len());
            }
        }
    }

    /// Runs one URL through filter, fetch, extract and emit
    ///
    /// Only a record write failure is returned as an error.
    async fn process_url(&mut self, url: &str) -> Result<PageOutcome, HarvestError> {
        if self.visited.contains(url) {
            return Ok(PageOutcome::AlreadyVisited);
        }

        if !is_in_scope(url, &self.config) {
            self.mark_visited(url);
            return Ok(PageOutcome::OutOfScope);
        }

        let result = match self.fetcher.fetch_outcome(url).await {
            FetchOutcome::Fetched(result) => result,
            FetchOutcome::Failed => {
                self.mark_visited(url);
                return Ok(PageOutcome::FetchFailed);
            }
            FetchOutcome::Interrupted => return Ok(PageOutcome::Interrupted),
        };

        let final_url = canonicalize(&result.final_url).unwrap_or_else(|_| url.to_string());
        if final_url != url
            && (!is_in_scope(&final_url, &self.config) || self.visited.contains(&final_url))
        {
            tracing::debug!("Redirect {} -> {} not followed", url, final_url);
            self.mark_visited(url);
            return Ok(PageOutcome::RedirectSkipped);
        }

        if !result.is_success() {
            tracing::debug!("HTTP {} for {}", result.status_code, url);
        }

        if !is_html_content_type(result.content_type.as_deref()) {
            self.mark_visited(url);
            return Ok(PageOutcome::NotHtml);
        }

        let Some(body) = result.body.as_deref() else {
            self.mark_visited(url);
            return Ok(PageOutcome::NoText);
        };

        let extracted = extract(body, &final_url);
        let Some(text) = extracted.text else {
            self.mark_visited(url);
            return Ok(PageOutcome::NoText);
        };

        let record = PageRecord::new(
            url,
            &final_url,
            result.status_code,
            result.fetched_at,
            result.content_type.clone(),
            extracted.title,
            extracted.language,
            text,
            &self.config.crawl.section,
        );
        self.sink.write(&record)?;

        if let Err(e) = write_mirror(
            self.config.output.mirror_dir.as_deref(),
            record.source_url(),
            &record.text,
        ) {
            tracing::warn!("Failed to mirror {}: {}", record.source_url(), e);
        }

        let discovered = self.enqueue_links(body, &result.final_url);
        tracing::debug!("Emitted {} ({} new links)", url, discovered);

        self.mark_visited(url);
        if final_url != url {
            self.mark_visited(&final_url);
        }

        Ok(PageOutcome::Emitted)
    }

    /// Pushes in-scope links that are neither visited nor already queued
    fn enqueue_links(&mut self, body: &str, base: &str) -> usize {
        let base = match Url::parse(base) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot resolve links against {}: {}", base, e);
                return 0;
            }
        };

        let mut added = 0;
        for link in extract_links(body, &base, &self.config) {
            if self.visited.contains(&link) || !self.seen.insert(link.clone()) {
                continue;
            }
            self.queue.push_back(link);
            added += 1;
        }
        added
    }

    fn mark_visited(&mut self, url: &str) {
        if let Err(e) = self.visited.add(url) {
            tracing::warn!("Failed to persist visited URL {}: {}", url, e);
        }
    }

    fn save_checkpoint(&mut self) {
        let pending = self.queue.make_contiguous();
        if let Err(e) = self.checkpoint.save(pending) {
            tracing::warn!("Frontier checkpoint failed: {}", e);
        }
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Enters `Stopped`: closes the client and sink, then writes the final checkpoint
    fn shutdown(&mut self) {
        if let Err(e) = self.transition(CrawlState::Stopped) {
            tracing::warn!("{}", e);
        }

        self.fetcher.close();
        if let Err(e) = self.sink.close() {
            tracing::warn!("Failed to close records file: {}", e);
        }
        self.save_checkpoint();

        self.stats.log_progress(self.queue.len());
        tracing::info!(
            "Crawl stopped: {} records, {} skipped, {} pending, {} requests in {:.1}s",
            self.stats.processed,
            self.stats.skipped(),
            self.queue.len(),
            self.fetcher.request_count(),
            self.stats.elapsed().as_secs_f64()
        );
        for (outcome, count) in self.stats.breakdown() {
            tracing::debug!(outcome = %outcome, count, "Outcome total");
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use section_harvest::config::load_config;
/// use section_harvest::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let stats = run_crawl(config, CancellationToken::new()).await?;
/// println!("{} pages", stats.processed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: CrawlConfig,
    cancel: CancellationToken,
) -> Result<CrawlStats, HarvestError> {
    Coordinator::new(config, cancel)?.run().await
}
