//! Chunked analysis pipeline.
//!
//! Drives one remote call per chunk, strictly in document order. A
//! rate-limit signal gets a fixed backoff and a bounded number of retries
//! of the same request; every other failure is recorded in the chunk's
//! report section and the run moves on. A fixed delay between chunks keeps
//! the call rate under the remote quota in the first place.
//!
//! Per chunk: `PENDING → CALLING → (SUCCESS | RATE_LIMITED | FAILED)`,
//! where `RATE_LIMITED` loops back to `CALLING` while retries remain.

use std::time::Duration;

use crate::ai::client::ApiError;
use crate::ai::prompts::{build_prompt, AnalysisKind};
use crate::chunker::{chunk_text, head, tail};
use crate::config::ReviewConfig;
use crate::report::Report;

/// Seam between the pipeline and the remote analysis service.
///
/// One call is one network round trip; the implementation classifies the
/// outcome, the pipeline decides what to do with it.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, prompt: &str) -> Result<String, ApiError>;
}

/// Sink for progress updates while a run is in flight.
///
/// `on_progress` fires once per chunk, after it reaches a terminal state;
/// `completed` climbs monotonically from 1 to `total`.
pub trait Progress {
    fn on_progress(&mut self, completed: usize, total: usize);

    /// Free-form status text (backoff notices, part announcements).
    fn on_status(&mut self, message: &str) {
        let _ = message;
    }
}

/// Progress sink that discards everything.
pub struct NullProgress;

impl Progress for NullProgress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

/// Sequential analysis driver bound to one analyzer and one configuration.
pub struct AnalysisPipeline<A> {
    analyzer: A,
    config: ReviewConfig,
}

impl<A: Analyzer> AnalysisPipeline<A> {
    pub fn new(analyzer: A, config: ReviewConfig) -> Self {
        Self { analyzer, config }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Run one editorial check over the manuscript text.
    ///
    /// Grammar walks the whole text in chunks; structure and references are
    /// single calls over their configured windows.
    pub async fn review(
        &self,
        kind: AnalysisKind,
        text: &str,
        progress: &mut dyn Progress,
    ) -> Report {
        match kind {
            AnalysisKind::Grammar => self.run_chunked(kind.instruction(), text, progress).await,
            AnalysisKind::Structure => {
                let excerpt = head(text, self.config.structure_window);
                self.run_single(kind.label(), kind.instruction(), excerpt, progress)
                    .await
            }
            AnalysisKind::References => {
                let excerpt = tail(text, self.config.references_window);
                self.run_single(kind.label(), kind.instruction(), excerpt, progress)
                    .await
            }
        }
    }

    /// Analyze `text` chunk by chunk, assembling one section per chunk.
    ///
    /// Empty text means nothing to analyze: no calls, no progress, an empty
    /// report. A failed chunk yields a section carrying the failure text in
    /// place of analysis content, so the operator can see exactly which
    /// parts were not covered.
    pub async fn run_chunked(
        &self,
        instruction: &str,
        text: &str,
        progress: &mut dyn Progress,
    ) -> Report {
        let chunks = chunk_text(text, self.config.max_chunk_len);
        let total = chunks.len();
        let mut report = Report::new();

        tracing::info!("[Pipeline] Starting chunked run: {} part(s)", total);

        for (idx, chunk) in chunks.into_iter().enumerate() {
            let position = idx + 1;
            progress.on_status(&format!("Analyzing part {} of {}", position, total));

            let prompt = build_prompt(instruction, chunk);
            let heading = format!("Part {} of {}", position, total);

            match self.call_with_retry(&prompt, progress).await {
                Ok(analysis) => report.push_section(heading, analysis),
                Err(e) => {
                    tracing::warn!("[Pipeline] Part {}/{} failed: {}", position, total, e);
                    report.push_section(heading, format!("Analysis failed for this part: {}", e));
                }
            }

            progress.on_progress(position, total);

            if position < total {
                sleep_if_nonzero(self.config.inter_call_delay).await;
            }
        }

        report
    }

    /// Analyze one fixed excerpt as a single-section report.
    pub async fn run_single(
        &self,
        heading: &str,
        instruction: &str,
        excerpt: &str,
        progress: &mut dyn Progress,
    ) -> Report {
        let mut report = Report::new();
        if excerpt.is_empty() {
            return report;
        }

        progress.on_status(&format!("Analyzing {}", heading.to_lowercase()));
        let prompt = build_prompt(instruction, excerpt);

        match self.call_with_retry(&prompt, progress).await {
            Ok(analysis) => report.push_section(heading, analysis),
            Err(e) => {
                tracing::warn!("[Pipeline] {} check failed: {}", heading, e);
                report.push_section(heading, format!("Analysis failed: {}", e));
            }
        }

        progress.on_progress(1, 1);
        report
    }

    /// One call, retried only on a rate-limit signal, at most
    /// `max_retries_per_chunk` times. A rate limit on the final attempt is
    /// returned as the failure; nothing else is ever retried.
    async fn call_with_retry(
        &self,
        prompt: &str,
        progress: &mut dyn Progress,
    ) -> Result<String, ApiError> {
        let mut retries_left = self.config.max_retries_per_chunk;

        loop {
            match self.analyzer.analyze(prompt).await {
                Err(ApiError::RateLimited) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        "[Pipeline] Quota exhausted, backing off {:?} ({} retries left)",
                        self.config.rate_limit_backoff,
                        retries_left
                    );
                    progress.on_status("Quota exhausted; waiting before retrying");
                    sleep_if_nonzero(self.config.rate_limit_backoff).await;
                }
                outcome => return outcome,
            }
        }
    }
}

async fn sleep_if_nonzero(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Analyzer that replays a fixed script of outcomes and records prompts.
    struct ScriptedAnalyzer {
        outcomes: Mutex<VecDeque<Result<String, ApiError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn new(outcomes: Vec<Result<String, ApiError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Analyzer for ScriptedAnalyzer {
        async fn analyze(&self, prompt: &str) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ApiError::Remote {
                    status: 500,
                    message: "script exhausted".to_string(),
                }))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Vec<(usize, usize)>,
        statuses: Vec<String>,
    }

    impl Progress for RecordingProgress {
        fn on_progress(&mut self, completed: usize, total: usize) {
            self.events.push((completed, total));
        }

        fn on_status(&mut self, message: &str) {
            self.statuses.push(message.to_string());
        }
    }

    fn fast_config() -> ReviewConfig {
        ReviewConfig {
            max_chunk_len: 10_000,
            inter_call_delay: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    fn pipeline(outcomes: Vec<Result<String, ApiError>>) -> AnalysisPipeline<ScriptedAnalyzer> {
        AnalysisPipeline::new(ScriptedAnalyzer::new(outcomes), fast_config())
    }

    #[tokio::test]
    async fn test_three_chunks_three_calls_in_order() {
        let text = "a".repeat(25_000);
        let pipeline = pipeline(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Ok("third".to_string()),
        ]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", &text, &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 3);
        assert_eq!(report.len(), 3);
        let sections = report.sections();
        assert_eq!(sections[0].heading, "Part 1 of 3");
        assert_eq!(sections[0].body, "first");
        assert_eq!(sections[2].heading, "Part 3 of 3");
        assert_eq!(sections[2].body, "third");
        assert_eq!(progress.events, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_exact_window_is_one_chunk() {
        let text = "b".repeat(10_000);
        let pipeline = pipeline(vec![Ok("only".to_string())]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", &text, &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 1);
        assert_eq!(report.len(), 1);
        assert_eq!(report.sections()[0].heading, "Part 1 of 1");
        assert_eq!(progress.events, vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_empty_document_is_nothing_to_analyze() {
        let pipeline = pipeline(vec![]);
        let mut progress = RecordingProgress::default();

        let report = pipeline.run_chunked("Review grammar.", "", &mut progress).await;

        assert_eq!(pipeline.analyzer.calls(), 0);
        assert!(report.is_empty());
        assert!(progress.events.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_recovers_with_one_retry() {
        let text = "c".repeat(100);
        let pipeline = pipeline(vec![
            Err(ApiError::RateLimited),
            Ok("recovered".to_string()),
        ]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", &text, &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 2);
        assert_eq!(report.len(), 1);
        assert_eq!(report.sections()[0].body, "recovered");
        assert_eq!(progress.events, vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_second_rate_limit_is_terminal() {
        let text = "d".repeat(100);
        let pipeline = pipeline(vec![Err(ApiError::RateLimited), Err(ApiError::RateLimited)]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", &text, &mut progress)
            .await;

        // One retry allowed, so exactly two calls, then degrade-and-continue.
        assert_eq!(pipeline.analyzer.calls(), 2);
        assert_eq!(report.len(), 1);
        assert!(report.sections()[0].body.contains("rate limited"));
        assert_eq!(progress.events, vec![(1, 1)]);
        assert!(progress
            .statuses
            .iter()
            .any(|s| s.contains("waiting before retrying")));
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let config = ReviewConfig {
            max_retries_per_chunk: 0,
            ..fast_config()
        };
        let analyzer = ScriptedAnalyzer::new(vec![Err(ApiError::RateLimited)]);
        let pipeline = AnalysisPipeline::new(analyzer, config);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", "e", &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 1);
        assert!(report.sections()[0].body.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_abort_run() {
        let text = "f".repeat(25_000);
        let pipeline = pipeline(vec![
            Ok("one".to_string()),
            Err(ApiError::Connection("connection reset".to_string())),
            Ok("three".to_string()),
        ]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_chunked("Review grammar.", &text, &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 3);
        assert_eq!(report.len(), 3);
        assert_eq!(report.sections()[0].body, "one");
        assert!(report.sections()[1].body.contains("connection failure"));
        assert_eq!(report.sections()[2].body, "three");
        assert_eq!(progress.events, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_remote_error_is_not_retried() {
        let pipeline = pipeline(vec![Err(ApiError::Remote {
            status: 503,
            message: "overloaded".to_string(),
        })]);
        let mut progress = RecordingProgress::default();

        let report = pipeline.run_chunked("Review grammar.", "g", &mut progress).await;

        assert_eq!(pipeline.analyzer.calls(), 1);
        assert!(report.sections()[0].body.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_single_shot_success() {
        let pipeline = pipeline(vec![Ok("structure looks compliant".to_string())]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_single("Structure", "Check structure.", "Title. Abstract.", &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 1);
        assert_eq!(report.len(), 1);
        assert_eq!(report.sections()[0].heading, "Structure");
        assert_eq!(progress.events, vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_single_shot_empty_excerpt_skips_call() {
        let pipeline = pipeline(vec![]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .run_single("Structure", "Check structure.", "", &mut progress)
            .await;

        assert_eq!(pipeline.analyzer.calls(), 0);
        assert!(report.is_empty());
        assert!(progress.events.is_empty());
    }

    #[tokio::test]
    async fn test_review_windows_structure_and_references() {
        let config = ReviewConfig {
            structure_window: 10,
            references_window: 10,
            ..fast_config()
        };
        let text = format!("{}{}", "HEAD-HEAD-", "x".repeat(100)) + "TAIL-TAIL-";

        let analyzer = ScriptedAnalyzer::new(vec![Ok("ok".to_string())]);
        let pipeline = AnalysisPipeline::new(analyzer, config.clone());
        let mut progress = RecordingProgress::default();
        pipeline
            .review(AnalysisKind::Structure, &text, &mut progress)
            .await;
        let prompts = pipeline.analyzer.prompts();
        assert!(prompts[0].contains("HEAD-HEAD-"));
        assert!(!prompts[0].contains("TAIL-TAIL-"));

        let analyzer = ScriptedAnalyzer::new(vec![Ok("ok".to_string())]);
        let pipeline = AnalysisPipeline::new(analyzer, config);
        pipeline
            .review(AnalysisKind::References, &text, &mut progress)
            .await;
        let prompts = pipeline.analyzer.prompts();
        assert!(prompts[0].contains("TAIL-TAIL-"));
        assert!(!prompts[0].contains("HEAD-HEAD-"));
    }

    #[tokio::test]
    async fn test_review_grammar_chunks_whole_text() {
        let text = "h".repeat(20_001);
        let pipeline = pipeline(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok("c".to_string()),
        ]);
        let mut progress = RecordingProgress::default();

        let report = pipeline
            .review(AnalysisKind::Grammar, &text, &mut progress)
            .await;

        assert_eq!(report.len(), 3);
        assert_eq!(progress.events, vec![(1, 3), (2, 3), (3, 3)]);
    }
}
