use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ReentryPolicy;
use crate::error::AppError;
use crate::pipeline::types::RunToken;

#[derive(Debug)]
struct ActiveRun {
    token: RunToken,
    cancel_token: CancellationToken,
}

#[derive(Debug, Default)]
struct RegistryState {
    generation: u64,
    active: Option<ActiveRun>,
}

/// Tracks the single active run of a session. Every new run and every
/// cancellation bumps the generation, so a stale run sees its token no longer
/// matches at its next stage transition.
#[derive(Debug, Clone)]
pub struct RunRegistry {
    state: Arc<Mutex<RegistryState>>,
    policy: ReentryPolicy,
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new(ReentryPolicy::default())
    }
}

impl RunRegistry {
    pub fn new(policy: ReentryPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
            policy,
        }
    }

    pub fn policy(&self) -> ReentryPolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self) -> Result<RunGuard, AppError> {
        let mut state = self.lock();

        if let Some(active) = state.active.take() {
            match self.policy {
                ReentryPolicy::Reject => {
                    let run_id = active.token.run_id;
                    state.active = Some(active);
                    debug!("Refusing new run while {} is active", run_id);
                    return Err(AppError::RunInProgress(run_id));
                }
                ReentryPolicy::CancelPrevious => {
                    info!("Superseding active run {}", active.token);
                    active.cancel_token.cancel();
                }
            }
        }

        state.generation += 1;
        let token = RunToken::new(state.generation);
        let cancel_token = CancellationToken::new();
        state.active = Some(ActiveRun {
            token,
            cancel_token: cancel_token.clone(),
        });
        debug!("Registered run {}", token);

        Ok(RunGuard {
            token,
            cancel_token,
            registry: self.clone(),
        })
    }

    /// Cancels the active run, if any, and returns its token.
    pub fn cancel_active(&self) -> Option<RunToken> {
        let mut state = self.lock();
        let active = state.active.take()?;
        state.generation += 1;
        active.cancel_token.cancel();
        info!("Cancelled run {}", active.token);
        Some(active.token)
    }

    pub fn active(&self) -> Option<RunToken> {
        self.lock().active.as_ref().map(|active| active.token)
    }

    pub fn is_current(&self, token: &RunToken) -> bool {
        let state = self.lock();
        state.generation == token.generation
            && state
                .active
                .as_ref()
                .is_some_and(|active| active.token == *token)
    }

    fn release(&self, token: &RunToken) {
        let mut state = self.lock();
        if state
            .active
            .as_ref()
            .is_some_and(|active| active.token == *token)
        {
            state.active = None;
            debug!("Released run {}", token);
        }
    }
}

/// Held by a run for as long as it is in flight. Dropping it frees the
/// registry slot, so an abandoned stream never blocks the next submission.
#[derive(Debug)]
pub struct RunGuard {
    token: RunToken,
    cancel_token: CancellationToken,
    registry: RunRegistry,
}

impl RunGuard {
    pub fn token(&self) -> RunToken {
        self.token
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// A run may apply its next transition only while this holds.
    pub fn is_live(&self) -> bool {
        !self.cancel_token.is_cancelled() && self.registry.is_current(&self.token)
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Frees the registry slot once the run has produced its result.
    pub fn finish(&self) {
        self.registry.release(&self.token);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.registry.release(&self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_registers_a_live_run() {
        let registry = RunRegistry::default();
        let guard = registry.begin().unwrap();
        assert!(guard.is_live());
        assert_eq!(registry.active(), Some(guard.token()));
        assert_eq!(guard.token().generation, 1);
    }

    #[test]
    fn cancel_previous_policy_supersedes_the_active_run() {
        let registry = RunRegistry::new(ReentryPolicy::CancelPrevious);
        let first = registry.begin().unwrap();
        let second = registry.begin().unwrap();

        assert!(!first.is_live());
        assert!(first.cancel_token().is_cancelled());
        assert!(second.is_live());
        assert!(second.token().generation > first.token().generation);

        // Dropping the stale guard must not free the new run's slot.
        drop(first);
        assert_eq!(registry.active(), Some(second.token()));
    }

    #[test]
    fn reject_policy_refuses_while_a_run_is_active() {
        let registry = RunRegistry::new(ReentryPolicy::Reject);
        let first = registry.begin().unwrap();

        let err = registry.begin().unwrap_err();
        assert!(matches!(err, AppError::RunInProgress(id) if id == first.token().run_id));
        assert!(first.is_live());

        drop(first);
        assert!(registry.begin().is_ok());
    }

    #[test]
    fn cancel_active_invalidates_the_token() {
        let registry = RunRegistry::default();
        let guard = registry.begin().unwrap();
        assert_eq!(registry.cancel_active(), Some(guard.token()));
        assert!(!guard.is_live());
        assert_eq!(registry.active(), None);
        assert_eq!(registry.cancel_active(), None);
    }

    #[test]
    fn finished_run_frees_the_slot_for_reject_policy() {
        let registry = RunRegistry::new(ReentryPolicy::Reject);
        let guard = registry.begin().unwrap();
        guard.finish();
        assert_eq!(registry.active(), None);
        assert!(registry.begin().is_ok());
    }

    #[test]
    fn guard_cancel_stops_the_run() {
        let registry = RunRegistry::default();
        let guard = registry.begin().unwrap();
        guard.cancel();
        assert!(!guard.is_live());
    }
}
