use crate::pipeline::types::PipelineStage;

/// Lifecycle of a single run. There is no failure state: an accepted run
/// either completes or is abandoned by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// `stage_index` is the next stage to report. It equals the number of
    /// stages once the 100% stage has been reported.
    Running { stage_index: usize },
    Completed,
    Abandoned,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Progress(PipelineStage),
    Complete,
}

/// Synchronous core of the pipeline. The async driver decides when to call
/// `advance`; the machine only decides what happens next.
#[derive(Debug, Clone)]
pub struct StageMachine {
    stages: &'static [PipelineStage],
    state: RunState,
}

impl StageMachine {
    pub fn new(stages: &'static [PipelineStage]) -> Self {
        Self {
            stages,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn start(&mut self) {
        if self.state == RunState::Idle {
            self.state = RunState::Running { stage_index: 0 };
        }
    }

    /// True when the next transition reports a stage and so follows a delay.
    /// Completion follows the final stage directly.
    pub fn next_is_stage(&self) -> bool {
        matches!(self.state, RunState::Running { stage_index } if stage_index < self.stages.len())
    }

    pub fn advance(&mut self) -> Option<Transition> {
        match self.state {
            RunState::Running { stage_index } if stage_index < self.stages.len() => {
                self.state = RunState::Running {
                    stage_index: stage_index + 1,
                };
                Some(Transition::Progress(self.stages[stage_index]))
            }
            RunState::Running { .. } => {
                self.state = RunState::Completed;
                Some(Transition::Complete)
            }
            _ => None,
        }
    }

    pub fn abandon(&mut self) {
        if !self.state.is_terminal() {
            self.state = RunState::Abandoned;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::ANALYSIS_STAGES;

    #[test]
    fn idle_machine_does_not_advance() {
        let mut machine = StageMachine::new(&ANALYSIS_STAGES);
        assert_eq!(machine.advance(), None);
        assert_eq!(machine.state(), RunState::Idle);
    }

    #[test]
    fn walks_every_stage_then_completes() {
        let mut machine = StageMachine::new(&ANALYSIS_STAGES);
        machine.start();

        let mut percents = Vec::new();
        while machine.next_is_stage() {
            match machine.advance() {
                Some(Transition::Progress(stage)) => percents.push(stage.percent),
                other => panic!("unexpected transition {other:?}"),
            }
        }
        assert_eq!(percents, vec![10, 25, 40, 60, 80, 95, 100]);
        assert_eq!(machine.advance(), Some(Transition::Complete));
        assert_eq!(machine.state(), RunState::Completed);
        assert_eq!(machine.advance(), None);
    }

    #[test]
    fn abandoned_machine_stops() {
        let mut machine = StageMachine::new(&ANALYSIS_STAGES);
        machine.start();
        machine.advance();
        machine.abandon();
        assert_eq!(machine.state(), RunState::Abandoned);
        assert_eq!(machine.advance(), None);
        assert!(!machine.next_is_stage());
    }

    #[test]
    fn completed_machine_is_not_abandoned() {
        let mut machine = StageMachine::new(&ANALYSIS_STAGES[..1]);
        machine.start();
        machine.advance();
        machine.advance();
        machine.abandon();
        assert_eq!(machine.state(), RunState::Completed);
    }
}
