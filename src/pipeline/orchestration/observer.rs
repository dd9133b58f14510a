use uuid::Uuid;

use crate::common::FileDescriptor;
use crate::intake::RejectionReason;
use crate::pipeline::types::{DetectionResult, Verdict};

/// Presentation-side listener for everything a session reports.
pub trait PipelineObserver: Send {
    fn on_rejected(&mut self, file: &FileDescriptor, reason: RejectionReason);

    fn on_progress(&mut self, run_id: Uuid, percent: u8, label: &str);

    /// `verdict` carries the summary classification used for notifications.
    fn on_completed(&mut self, file: &FileDescriptor, result: &DetectionResult, verdict: Verdict);
}

/// Fans notifications out to several observers in registration order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(mut self, observer: Box<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl PipelineObserver for ObserverSet {
    fn on_rejected(&mut self, file: &FileDescriptor, reason: RejectionReason) {
        for observer in &mut self.observers {
            observer.on_rejected(file, reason);
        }
    }

    fn on_progress(&mut self, run_id: Uuid, percent: u8, label: &str) {
        for observer in &mut self.observers {
            observer.on_progress(run_id, percent, label);
        }
    }

    fn on_completed(&mut self, file: &FileDescriptor, result: &DetectionResult, verdict: Verdict) {
        for observer in &mut self.observers {
            observer.on_completed(file, result, verdict);
        }
    }
}
