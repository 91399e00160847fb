//! Timed sampling loop for mood scans.
//!
//! A scan captures one frame per round, submits it for analysis, and
//! sleeps between rounds. Rounds run strictly one after another; a failed
//! round is logged and dropped without retry.

use crate::analysis::aggregate_results;
use crate::client::ClientError;
use crate::frames::{Frame, FrameSource};
use crate::models::{SampleResult, ScanSummary};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Classifies a single frame.
pub trait Analyzer: Send + Sync {
    fn analyze<'a>(&'a self, frame: &'a Frame) -> BoxFuture<'a, Result<SampleResult, ClientError>>;
}

/// Round schedule derived from a total duration and an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPlan {
    pub duration_seconds: f64,
    pub interval_seconds: f64,
    /// `floor(duration / interval)`, or 0 when the interval is not positive.
    pub sample_count: usize,
    pub interval: Duration,
}

impl ScanPlan {
    pub fn new(duration_seconds: f64, interval_seconds: f64) -> Self {
        let schedulable = interval_seconds > 0.0
            && interval_seconds.is_finite()
            && duration_seconds.is_finite()
            && duration_seconds > 0.0;

        let sample_count = if schedulable {
            (duration_seconds / interval_seconds).floor() as usize
        } else {
            0
        };

        Self {
            duration_seconds,
            interval_seconds,
            sample_count,
            interval: Duration::try_from_secs_f64(interval_seconds).unwrap_or(Duration::MAX),
        }
    }

    /// Time spent sleeping between rounds over the whole scan, saturating
    /// at `Duration::MAX`.
    pub fn total_wait(&self) -> Duration {
        if self.sample_count <= 1 {
            return Duration::ZERO;
        }

        let pauses = (self.sample_count - 1) as f64;
        Duration::try_from_secs_f64(self.interval_seconds * pauses).unwrap_or(Duration::MAX)
    }
}

/// What happened in one round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// The analyzer returned a sample (which may still lack a dominant emotion).
    Sampled { dominant_emotion: Option<String> },
    /// No frame could be captured.
    CaptureFailed(String),
    /// The frame was captured but analysis failed.
    AnalysisFailed(String),
}

impl RoundOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, RoundOutcome::Sampled { .. })
    }
}

/// Result of a completed scan session.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub summary: ScanSummary,
    /// Samples returned by the analyzer, in round order.
    pub samples: Vec<SampleResult>,
    pub rounds_failed: usize,
    pub elapsed: Duration,
}

impl ScanOutcome {
    pub fn rounds_succeeded(&self) -> usize {
        self.samples.len()
    }

    /// Samples that carried a dominant emotion.
    pub fn valid_samples(&self) -> usize {
        self.samples.iter().filter(|s| s.is_valid()).count()
    }
}

/// Receives progress events while a scan runs.
pub trait ScanObserver {
    fn scan_started(&mut self, _plan: &ScanPlan) {}
    fn round_started(&mut self, _round: usize, _total: usize) {}
    fn round_finished(&mut self, _round: usize, _outcome: &RoundOutcome) {}
    fn scan_finished(&mut self, _outcome: &ScanOutcome) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Run every round of `plan`, then reduce the collected samples.
///
/// Never fails: capture and analysis errors only drop their round.
pub async fn run_scan<F, A>(
    plan: &ScanPlan,
    frames: &mut F,
    analyzer: &A,
    observer: &mut dyn ScanObserver,
) -> ScanOutcome
where
    F: FrameSource + ?Sized,
    A: Analyzer + ?Sized,
{
    let started = Instant::now();
    let total = plan.sample_count;

    info!(
        "Starting scan: {} rounds every {:.1}s",
        total, plan.interval_seconds
    );
    observer.scan_started(plan);

    let mut samples = Vec::new();
    let mut rounds_failed = 0;

    for round in 0..total {
        debug!("Scan round {}/{}", round + 1, total);
        observer.round_started(round, total);

        let outcome = match frames.capture() {
            Ok(frame) => match analyzer.analyze(&frame).await {
                Ok(sample) => {
                    let outcome = RoundOutcome::Sampled {
                        dominant_emotion: sample.dominant_emotion.clone(),
                    };
                    samples.push(sample);
                    outcome
                }
                Err(e) if e.is_transport() => {
                    warn!("Round {}/{}: mood server unreachable: {}", round + 1, total, e);
                    RoundOutcome::AnalysisFailed(e.to_string())
                }
                Err(e) => {
                    warn!("Round {}/{}: analysis failed: {}", round + 1, total, e);
                    RoundOutcome::AnalysisFailed(e.to_string())
                }
            },
            Err(e) => {
                warn!("Round {}/{}: frame capture failed: {:#}", round + 1, total, e);
                RoundOutcome::CaptureFailed(format!("{:#}", e))
            }
        };

        if outcome.is_failure() {
            rounds_failed += 1;
        }
        observer.round_finished(round, &outcome);

        if round + 1 < total {
            sleep(plan.interval).await;
        }
    }

    let summary = aggregate_results(&samples);
    let outcome = ScanOutcome {
        summary,
        samples,
        rounds_failed,
        elapsed: started.elapsed(),
    };

    info!(
        "Scan finished: {} of {} rounds sampled, most frequent mood: {}",
        outcome.rounds_succeeded(),
        total,
        outcome
            .summary
            .most_frequent_emotion
            .as_deref()
            .unwrap_or("none")
    );
    observer.scan_finished(&outcome);

    outcome
}

/// Errors raised by the scan controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("a scan is already in progress")]
    AlreadyRunning,
}

/// Owns the state of one scanning session: whether a scan is running
/// and the outcome of the last completed one.
#[derive(Default)]
pub struct ScanController {
    in_progress: AtomicBool,
    last: Mutex<Option<ScanOutcome>>,
}

/// Marks a scan as running until dropped.
pub struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ScanController {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)] // Status accessor for callers sharing the controller
    pub fn is_scanning(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Claim the controller for a scan.
    pub fn begin(&self) -> Result<ScanGuard<'_>, ScanError> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ScanError::AlreadyRunning)?;

        Ok(ScanGuard {
            flag: &self.in_progress,
        })
    }

    /// Run a scan, rejecting the call if another one is in progress.
    /// The outcome replaces whatever the controller held before and is
    /// read back through [`ScanController::last_outcome`].
    pub async fn run<F, A>(
        &self,
        plan: &ScanPlan,
        frames: &mut F,
        analyzer: &A,
        observer: &mut dyn ScanObserver,
    ) -> Result<(), ScanError>
    where
        F: FrameSource + ?Sized,
        A: Analyzer + ?Sized,
    {
        let _guard = self.begin()?;

        let outcome = run_scan(plan, frames, analyzer, observer).await;

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(outcome);

        Ok(())
    }

    /// Outcome of the most recent completed scan.
    pub fn last_outcome(&self) -> Option<ScanOutcome> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    struct CountingFrames {
        captured: usize,
        fail_on: Vec<usize>,
    }

    impl CountingFrames {
        fn new() -> Self {
            Self {
                captured: 0,
                fail_on: Vec::new(),
            }
        }
    }

    impl FrameSource for CountingFrames {
        fn capture(&mut self) -> anyhow::Result<Frame> {
            let index = self.captured;
            self.captured += 1;
            if self.fail_on.contains(&index) {
                anyhow::bail!("camera unavailable");
            }
            Ok(Frame::from_bytes(format!("frame-{}", index), "image/png", b"px"))
        }
    }

    /// Replies from a script, then with a transport failure once exhausted.
    struct ScriptedAnalyzer {
        replies: Mutex<VecDeque<Result<SampleResult, ClientError>>>,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedAnalyzer {
        fn new(replies: Vec<Result<SampleResult, ClientError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                call_times: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Analyzer for ScriptedAnalyzer {
        fn analyze<'a>(
            &'a self,
            _frame: &'a Frame,
        ) -> BoxFuture<'a, Result<SampleResult, ClientError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Connect("http://test".to_string())));
            async move { reply }.boxed()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        started: Vec<usize>,
        finished: Vec<RoundOutcome>,
        done: bool,
    }

    impl ScanObserver for RecordingObserver {
        fn round_started(&mut self, round: usize, _total: usize) {
            self.started.push(round);
        }

        fn round_finished(&mut self, _round: usize, outcome: &RoundOutcome) {
            self.finished.push(outcome.clone());
        }

        fn scan_finished(&mut self, _outcome: &ScanOutcome) {
            self.done = true;
        }
    }

    fn sample(dominant: &str, emotions: &[(&str, f64)]) -> SampleResult {
        SampleResult::new(
            Some(dominant.to_string()),
            emotions.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_plan_sample_count() {
        assert_eq!(ScanPlan::new(10.0, 1.0).sample_count, 10);
        assert_eq!(ScanPlan::new(10.0, 3.0).sample_count, 3);
        assert_eq!(ScanPlan::new(2.5, 0.5).sample_count, 5);
        assert_eq!(ScanPlan::new(0.5, 1.0).sample_count, 0);
        assert_eq!(ScanPlan::new(10.0, 0.0).sample_count, 0);
        assert_eq!(ScanPlan::new(10.0, -1.0).sample_count, 0);
        assert_eq!(ScanPlan::new(-10.0, 1.0).sample_count, 0);
        assert_eq!(ScanPlan::new(f64::INFINITY, 1.0).sample_count, 0);
        assert_eq!(ScanPlan::new(10.0, f64::NAN).sample_count, 0);
    }

    #[test]
    fn test_plan_total_wait() {
        assert_eq!(ScanPlan::new(10.0, 1.0).total_wait(), Duration::from_secs(9));
        assert_eq!(ScanPlan::new(1.0, 1.0).total_wait(), Duration::ZERO);
        assert_eq!(ScanPlan::new(0.0, 1.0).total_wait(), Duration::ZERO);
        assert_eq!(ScanPlan::new(10.0, f64::NAN).total_wait(), Duration::ZERO);
    }

    #[test]
    fn test_plan_total_wait_large_schedules() {
        let long = ScanPlan::new(1e10, 1.0);
        assert_eq!(long.sample_count, 10_000_000_000);
        assert_eq!(long.total_wait(), Duration::from_secs(9_999_999_999));

        // 19 pauses of 5e18s do not fit in a Duration.
        let huge = ScanPlan::new(1e20, 5e18);
        assert_eq!(huge.sample_count, 20);
        assert_eq!(huge.total_wait(), Duration::MAX);
    }

    #[test]
    fn test_plan_interval_saturates() {
        let plan = ScanPlan::new(2f64.powi(100), 2f64.powi(90));
        assert_eq!(plan.sample_count, 1024);
        assert_eq!(plan.interval, Duration::MAX);

        assert_eq!(ScanPlan::new(2.0, 0.5).interval, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_issues_one_call_per_round() {
        let plan = ScanPlan::new(5.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Ok(sample("happy", &[("happy", 80.0), ("sad", 10.0)])),
            Ok(sample("happy", &[("happy", 60.0), ("sad", 20.0)])),
            Ok(sample("sad", &[("sad", 90.0)])),
        ]);
        let mut frames = CountingFrames::new();
        let mut observer = RecordingObserver::default();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut observer).await;

        assert_eq!(analyzer.calls(), 5);
        assert_eq!(frames.captured, 5);
        assert_eq!(outcome.rounds_succeeded(), 3);
        assert_eq!(outcome.rounds_failed, 2);
        assert_eq!(outcome.summary.most_frequent_emotion.as_deref(), Some("happy"));
        assert_eq!(outcome.summary.occurrence_count, 2);
        assert_eq!(outcome.summary.average_intensities.get("happy"), Some(&47));
        assert_eq!(outcome.summary.average_intensities.get("sad"), Some(&40));
        assert_eq!(observer.started, vec![0, 1, 2, 3, 4]);
        assert!(observer.done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_are_spaced_by_interval() {
        let plan = ScanPlan::new(4.0, 2.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Ok(sample("fear", &[("fear", 10.0)])),
            Ok(sample("fear", &[("fear", 20.0)])),
        ]);
        let mut frames = CountingFrames::new();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut NoopObserver).await;

        let times = analyzer.call_times.lock().unwrap().clone();
        assert_eq!(times.len(), 2);
        assert_eq!(times[1] - times[0], Duration::from_secs(2));
        // No sleep after the final round.
        assert_eq!(outcome.elapsed, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rounds_yield_empty_summary() {
        let plan = ScanPlan::new(0.5, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![Ok(sample("happy", &[]))]);
        let mut frames = CountingFrames::new();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut NoopObserver).await;

        assert_eq!(analyzer.calls(), 0);
        assert!(outcome.summary.is_empty());
        assert_eq!(outcome.summary.occurrence_count, 0);
        assert!(outcome.summary.average_intensities.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_complete_with_empty_summary() {
        let plan = ScanPlan::new(3.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Err(ClientError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            Err(ClientError::Malformed("not json".to_string())),
            Err(ClientError::Server("Face could not be detected".to_string())),
        ]);
        let mut frames = CountingFrames::new();
        let mut observer = RecordingObserver::default();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut observer).await;

        assert_eq!(analyzer.calls(), 3);
        assert_eq!(outcome.rounds_failed, 3);
        assert!(outcome.samples.is_empty());
        assert!(outcome.summary.is_empty());
        assert!(observer.finished.iter().all(|o| o.is_failure()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_skips_analysis() {
        let plan = ScanPlan::new(3.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Ok(sample("sad", &[("sad", 60.0)])),
            Ok(sample("sad", &[("sad", 30.0)])),
        ]);
        let mut frames = CountingFrames::new();
        frames.fail_on = vec![1];
        let mut observer = RecordingObserver::default();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut observer).await;

        assert_eq!(analyzer.calls(), 2);
        assert_eq!(outcome.rounds_failed, 1);
        assert!(matches!(observer.finished[1], RoundOutcome::CaptureFailed(_)));
        assert_eq!(outcome.summary.average_intensities.get("sad"), Some(&45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_without_dominant_is_not_counted() {
        let plan = ScanPlan::new(2.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Ok(SampleResult::new(None, Default::default())),
            Ok(sample("angry", &[("angry", 70.0)])),
        ]);
        let mut frames = CountingFrames::new();

        let outcome = run_scan(&plan, &mut frames, &analyzer, &mut NoopObserver).await;

        assert_eq!(outcome.rounds_succeeded(), 2);
        assert_eq!(outcome.valid_samples(), 1);
        assert_eq!(outcome.summary.average_intensities.get("angry"), Some(&70));
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_rejects_reentrant_scan() {
        let controller = ScanController::new();
        let plan = ScanPlan::new(1.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![Ok(sample("happy", &[("happy", 50.0)]))]);
        let mut frames = CountingFrames::new();

        let guard = controller.begin().unwrap();
        assert!(controller.is_scanning());
        let rejected = controller
            .run(&plan, &mut frames, &analyzer, &mut NoopObserver)
            .await;
        assert_eq!(rejected.unwrap_err(), ScanError::AlreadyRunning);
        assert_eq!(analyzer.calls(), 0);
        drop(guard);

        controller
            .run(&plan, &mut frames, &analyzer, &mut NoopObserver)
            .await
            .unwrap();
        assert!(!controller.is_scanning());
        let outcome = controller.last_outcome().unwrap();
        assert_eq!(outcome.summary.most_frequent_emotion.as_deref(), Some("happy"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_replaces_last_outcome() {
        let controller = ScanController::new();
        let plan = ScanPlan::new(1.0, 1.0);
        let analyzer = ScriptedAnalyzer::new(vec![
            Ok(sample("happy", &[("happy", 50.0)])),
            Ok(sample("sad", &[("sad", 50.0)])),
        ]);
        let mut frames = CountingFrames::new();

        assert!(controller.last_outcome().is_none());

        controller
            .run(&plan, &mut frames, &analyzer, &mut NoopObserver)
            .await
            .unwrap();
        controller
            .run(&plan, &mut frames, &analyzer, &mut NoopObserver)
            .await
            .unwrap();

        let last = controller.last_outcome().unwrap();
        assert_eq!(last.summary.most_frequent_emotion.as_deref(), Some("sad"));
    }
}
