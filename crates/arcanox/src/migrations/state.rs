//! Progress tracking for the migration currently executing
//!
//! [`MigrationStateMachine`] is purely observational: the runner feeds it
//! transitions but never branches on its state.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Running,
    Completed,
    Error,
}

/// Outcome recorded for one migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub success: bool,
    pub duration: Duration,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct MigrationStateMachine {
    state: ExecutionState,
    current: Option<String>,
    started_at: Option<Instant>,
    results: BTreeMap<String, MigrationOutcome>,
}

impl Default for MigrationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationStateMachine {
    pub fn new() -> Self {
        Self {
            state: ExecutionState::Idle,
            current: None,
            started_at: None,
            results: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn current_migration(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn start(&mut self, migration: &str) {
        trace!(migration = %migration, "State machine: running");
        self.state = ExecutionState::Running;
        self.current = Some(migration.to_string());
        self.started_at = Some(Instant::now());
    }

    /// Record the outcome of the current migration
    pub fn complete(&mut self, success: bool, error: Option<String>) {
        let duration = self
            .started_at
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();

        if let Some(migration) = self.current.take() {
            self.results.insert(
                migration,
                MigrationOutcome {
                    success,
                    duration,
                    error,
                },
            );
        }

        self.state = if success {
            ExecutionState::Completed
        } else {
            ExecutionState::Error
        };
    }

    /// Time spent on the current migration; `None` unless running
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.state, self.started_at) {
            (ExecutionState::Running, Some(start)) => Some(start.elapsed()),
            _ => None,
        }
    }

    pub fn result(&self, migration: &str) -> Option<&MigrationOutcome> {
        self.results.get(migration)
    }

    pub fn results(&self) -> &BTreeMap<String, MigrationOutcome> {
        &self.results
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_transition() {
        let mut machine = MigrationStateMachine::new();
        assert_eq!(machine.state(), ExecutionState::Idle);
        assert!(machine.elapsed().is_none());

        machine.start("20240101000000_create_users");
        assert_eq!(machine.state(), ExecutionState::Running);
        assert!(machine.elapsed().is_some());

        machine.complete(true, None);
        assert_eq!(machine.state(), ExecutionState::Completed);
        assert!(machine.current_migration().is_none());
        assert!(machine.elapsed().is_none());
        assert!(machine.result("20240101000000_create_users").unwrap().success);
    }

    #[test]
    fn test_failure_is_recorded_and_reset_clears() {
        let mut machine = MigrationStateMachine::new();
        machine.start("m1");
        machine.complete(false, Some("boom".to_string()));

        assert_eq!(machine.state(), ExecutionState::Error);
        assert_eq!(machine.result("m1").unwrap().error.as_deref(), Some("boom"));

        machine.reset();
        assert_eq!(machine.state(), ExecutionState::Idle);
        assert!(machine.results().is_empty());
    }
}
