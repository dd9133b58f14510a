use futures::stream::{self, BoxStream, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::run_registry::RunGuard;
use super::stage_machine::{StageMachine, Transition};
use crate::common::FileDescriptor;
use crate::pipeline::services::{ResultSynthesizer, Scheduler};
use crate::pipeline::types::{PipelineEvent, PipelineStage, ANALYSIS_STAGES};

/// Drives accepted files through the fixed stage sequence and synthesizes
/// the verdict once the final stage has been reported.
#[derive(Clone)]
pub struct AnalysisPipeline {
    stages: &'static [PipelineStage],
    stage_delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    synthesizer: Arc<Mutex<Box<dyn ResultSynthesizer>>>,
}

impl AnalysisPipeline {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        synthesizer: Box<dyn ResultSynthesizer>,
        stage_delay: Duration,
    ) -> Self {
        Self {
            stages: &ANALYSIS_STAGES,
            stage_delay,
            scheduler,
            synthesizer: Arc::new(Mutex::new(synthesizer)),
        }
    }

    pub fn stages(&self) -> &'static [PipelineStage] {
        self.stages
    }

    pub fn stage_delay(&self) -> Duration {
        self.stage_delay
    }

    /// Returns the lazy event sequence of one run. Nothing happens until the
    /// stream is polled. Dropping it abandons the run, and a finished stream
    /// keeps returning `None`.
    pub fn run(&self, file: FileDescriptor, guard: RunGuard) -> BoxStream<'static, PipelineEvent> {
        let mut machine = StageMachine::new(self.stages);
        machine.start();
        debug!(
            "Run {} created for '{}' using {}",
            guard.token(),
            file.name(),
            self.scheduler.name()
        );

        let run = InFlightRun {
            file,
            guard,
            machine,
            stage_delay: self.stage_delay,
            scheduler: Arc::clone(&self.scheduler),
            synthesizer: Arc::clone(&self.synthesizer),
        };

        stream::unfold(run, next_event).fuse().boxed()
    }
}

struct InFlightRun {
    file: FileDescriptor,
    guard: RunGuard,
    machine: StageMachine,
    stage_delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    synthesizer: Arc<Mutex<Box<dyn ResultSynthesizer>>>,
}

async fn next_event(mut run: InFlightRun) -> Option<(PipelineEvent, InFlightRun)> {
    if run.machine.state().is_terminal() {
        return None;
    }

    if run.machine.next_is_stage() {
        tokio::select! {
            biased;
            _ = run.guard.cancel_token().cancelled() => {}
            _ = run.scheduler.wait(run.stage_delay) => {}
        }
    }

    let token = run.guard.token();
    if !run.guard.is_live() {
        run.machine.abandon();
        info!("Run {} for '{}' abandoned", token, run.file.name());
        return None;
    }

    match run.machine.advance()? {
        Transition::Progress(stage) => {
            debug!("Run {} reached {}% ({})", token, stage.percent, stage.label);
            let event = PipelineEvent::progress(&token, &stage);
            Some((event, run))
        }
        Transition::Complete => {
            let result = {
                let mut synthesizer = run
                    .synthesizer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                synthesizer.synthesize()
            };
            run.guard.finish();
            info!(
                "Run {} for '{}' completed: deepfake={} confidence={:.1}",
                token,
                run.file.name(),
                result.is_deepfake,
                result.confidence
            );
            let event = PipelineEvent::Completed {
                run_id: token.run_id,
                result,
            };
            Some((event, run))
        }
    }
}
