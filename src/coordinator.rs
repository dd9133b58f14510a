use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    common::FileDescriptor,
    config::{Configuration, ReentryPolicy},
    error::AppError,
    intake::{IntakeValidator, ValidationOutcome},
    pipeline::{
        orchestration::{AnalysisPipeline, PipelineObserver, RunRegistry},
        services::{RandomSynthesizer, ResultSynthesizer, Scheduler, TokioScheduler},
        types::{DetectionResult, PipelineEvent, RunToken},
    },
};

/// An admitted run: its token plus the lazy event stream.
pub struct RunHandle {
    token: RunToken,
    file: FileDescriptor,
    events: BoxStream<'static, PipelineEvent>,
}

impl RunHandle {
    pub fn token(&self) -> RunToken {
        self.token
    }

    pub fn file(&self) -> &FileDescriptor {
        &self.file
    }

    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.next().await
    }

    pub fn into_events(self) -> BoxStream<'static, PipelineEvent> {
        self.events
    }
}

/// One analysis session: admits files, owns the current run and reports to
/// observers.
pub struct Coordinator {
    validator: IntakeValidator,
    pipeline: AnalysisPipeline,
    registry: RunRegistry,
}

impl Coordinator {
    pub fn builder(configuration: Configuration) -> CoordinatorBuilder {
        CoordinatorBuilder::new(configuration)
    }

    pub fn validate(&self, file: &FileDescriptor) -> ValidationOutcome {
        self.validator.validate(file)
    }

    /// Admits the file and registers a new run. Rejected files never reach
    /// the pipeline.
    #[instrument(skip(self, file), fields(file = %file.name()))]
    pub fn submit(&self, file: FileDescriptor) -> Result<RunHandle, AppError> {
        if let ValidationOutcome::Rejected(reason) = self.validator.validate(&file) {
            warn!("Rejected '{}': {}", file.name(), reason);
            return Err(AppError::Rejected(reason));
        }

        let guard = self.registry.begin()?;
        let token = guard.token();
        info!(
            "Starting run {} for '{}' ({} bytes, {})",
            token,
            file.name(),
            file.size_bytes(),
            file.mime_type()
        );

        let events = self.pipeline.run(file.clone(), guard);
        Ok(RunHandle {
            token,
            file,
            events,
        })
    }

    /// Submits the file and drives its run to the end, forwarding every event
    /// to `observer`. Returns `Ok(None)` when the run was cancelled.
    #[instrument(skip(self, file, observer), fields(file = %file.name()))]
    pub async fn analyze(
        &self,
        file: FileDescriptor,
        observer: &mut dyn PipelineObserver,
    ) -> Result<Option<DetectionResult>, AppError> {
        let mut handle = match self.submit(file.clone()) {
            Err(AppError::Rejected(reason)) => {
                observer.on_rejected(&file, reason);
                return Err(AppError::Rejected(reason));
            }
            other => other?,
        };

        while let Some(event) = handle.next_event().await {
            match event {
                PipelineEvent::Progress {
                    run_id,
                    percent,
                    label,
                } => observer.on_progress(run_id, percent, &label),
                PipelineEvent::Completed { result, .. } => {
                    observer.on_completed(&file, &result, result.verdict());
                    return Ok(Some(result));
                }
            }
        }

        info!("Run {} ended without a result", handle.token());
        Ok(None)
    }

    /// Drops interest in the active run. It stops at its next transition and
    /// never reports a result.
    pub fn clear(&self) -> Option<RunToken> {
        self.registry.cancel_active()
    }

    pub fn active_run(&self) -> Option<RunToken> {
        self.registry.active()
    }

    pub fn reentry_policy(&self) -> ReentryPolicy {
        self.registry.policy()
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    scheduler: Option<Arc<dyn Scheduler>>,
    synthesizer: Option<Box<dyn ResultSynthesizer>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            scheduler: None,
            synthesizer: None,
        }
    }

    // Overrides the configured per-stage delay.
    pub fn stage_delay_ms(mut self, stage_delay_ms: u64) -> Self {
        self.configuration.stage_delay_ms = stage_delay_ms;
        self
    }

    // Overrides the configured re-entry policy.
    pub fn reentry_policy(mut self, reentry_policy: ReentryPolicy) -> Self {
        self.configuration.reentry_policy = reentry_policy;
        self
    }

    // Seeds the default synthesizer. Ignored when a synthesizer is supplied.
    pub fn seed(mut self, seed: u64) -> Self {
        self.configuration.seed = Some(seed);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Box<dyn ResultSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        self.configuration.validate()?;

        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler) as Arc<dyn Scheduler>);
        let synthesizer = self.synthesizer.unwrap_or_else(|| {
            Box::new(RandomSynthesizer::from_configuration(&self.configuration))
                as Box<dyn ResultSynthesizer>
        });

        Ok(Coordinator {
            validator: IntakeValidator::new(self.configuration.max_file_size_bytes),
            pipeline: AnalysisPipeline::new(
                scheduler,
                synthesizer,
                self.configuration.stage_delay(),
            ),
            registry: RunRegistry::new(self.configuration.reentry_policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::RejectionReason;
    use crate::pipeline::services::{ImmediateScheduler, ManualScheduler};
    use crate::pipeline::types::Verdict;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingObserver {
        rejected: Vec<RejectionReason>,
        progress: Vec<(u8, String)>,
        completed: Vec<Verdict>,
    }

    impl PipelineObserver for RecordingObserver {
        fn on_rejected(&mut self, _file: &FileDescriptor, reason: RejectionReason) {
            self.rejected.push(reason);
        }

        fn on_progress(&mut self, _run_id: Uuid, percent: u8, label: &str) {
            self.progress.push((percent, label.to_string()));
        }

        fn on_completed(
            &mut self,
            _file: &FileDescriptor,
            _result: &DetectionResult,
            verdict: Verdict,
        ) {
            self.completed.push(verdict);
        }
    }

    fn coordinator() -> Coordinator {
        CoordinatorBuilder::new(Configuration::default())
            .seed(5)
            .scheduler(Arc::new(ImmediateScheduler))
            .build()
            .expect("Failed to build coordinator")
    }

    fn file(name: &str, size_bytes: u64, mime_type: &str) -> FileDescriptor {
        FileDescriptor::new(name, size_bytes, mime_type).unwrap()
    }

    #[tokio::test]
    async fn analyze_accepted_clip_reports_progress_and_result() {
        let coordinator = coordinator();
        let mut observer = RecordingObserver::default();

        let result = coordinator
            .analyze(file("clip.mp4", 5_000_000, "video/mp4"), &mut observer)
            .await
            .unwrap()
            .expect("run should complete");

        let percents: Vec<u8> = observer.progress.iter().map(|(percent, _)| *percent).collect();
        assert_eq!(percents, vec![10, 25, 40, 60, 80, 95, 100]);
        assert_eq!(observer.completed, vec![result.verdict()]);
        assert!(observer.rejected.is_empty());

        let indices: Vec<u32> = result.frame_analysis.iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![1, 31, 61, 91, 121]);
        assert_eq!(coordinator.active_run(), None);
    }

    #[tokio::test]
    async fn analyze_rejects_pdf_without_starting_a_run() {
        let coordinator = coordinator();
        let mut observer = RecordingObserver::default();

        let err = coordinator
            .analyze(file("doc.pdf", 1000, "application/pdf"), &mut observer)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Rejected(RejectionReason::NotAVideo)));
        assert_eq!(observer.rejected, vec![RejectionReason::NotAVideo]);
        assert!(observer.progress.is_empty());
        assert!(observer.completed.is_empty());
        assert_eq!(coordinator.active_run(), None);
    }

    #[test]
    fn submit_rejects_oversized_video() {
        let coordinator = coordinator();
        let result = coordinator.submit(file("big.mp4", 200_000_000, "video/mp4"));
        assert!(matches!(
            result,
            Err(AppError::Rejected(RejectionReason::TooLarge))
        ));
    }

    #[tokio::test]
    async fn reject_policy_refuses_a_second_submission() {
        let coordinator = CoordinatorBuilder::new(Configuration::default())
            .reentry_policy(ReentryPolicy::Reject)
            .scheduler(Arc::new(ImmediateScheduler))
            .build()
            .unwrap();

        let first = coordinator.submit(file("a.mp4", 10, "video/mp4")).unwrap();
        let second = coordinator.submit(file("b.mp4", 10, "video/mp4"));
        assert!(matches!(second, Err(AppError::RunInProgress(id)) if id == first.token().run_id));

        let events: Vec<PipelineEvent> = first.into_events().collect().await;
        assert_eq!(events.len(), 8);
        assert!(coordinator.submit(file("b.mp4", 10, "video/mp4")).is_ok());
    }

    #[tokio::test]
    async fn cancel_previous_policy_supersedes_the_first_run() {
        let coordinator = coordinator();
        assert_eq!(coordinator.reentry_policy(), ReentryPolicy::CancelPrevious);

        let mut first = coordinator.submit(file("a.mp4", 10, "video/mp4")).unwrap();
        assert!(first.next_event().await.is_some());

        let second = coordinator.submit(file("b.mp4", 10, "video/mp4")).unwrap();
        assert_eq!(coordinator.active_run(), Some(second.token()));
        assert_eq!(first.next_event().await, None);

        let events: Vec<PipelineEvent> = second.into_events().collect().await;
        assert!(events.last().is_some_and(PipelineEvent::is_terminal));
    }

    #[tokio::test]
    async fn clear_mid_run_yields_no_completion() {
        let scheduler = ManualScheduler::new();
        let coordinator = CoordinatorBuilder::new(Configuration::default())
            .stage_delay_ms(0)
            .scheduler(Arc::new(scheduler.clone()))
            .build()
            .unwrap();
        let mut observer = RecordingObserver::default();

        let clear = async {
            scheduler.advance(2);
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            coordinator.clear();
            scheduler.advance(20);
        };
        let (outcome, ()) = tokio::join!(
            coordinator.analyze(file("clip.mp4", 5_000_000, "video/mp4"), &mut observer),
            clear
        );

        assert_eq!(outcome.unwrap(), None);
        assert!(observer.progress.len() <= 2);
        assert!(observer.completed.is_empty());
        assert_eq!(coordinator.active_run(), None);
    }

    #[test]
    fn build_rejects_invalid_configuration() {
        let configuration = Configuration {
            deepfake_probability: -0.1,
            ..Configuration::default()
        };
        assert!(CoordinatorBuilder::new(configuration).build().is_err());
    }
}
