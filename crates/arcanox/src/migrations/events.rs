//! Migration lifecycle events
//!
//! The runner emits a [`MigrationEvent`] at every transition. Listeners are
//! observers only: a failing listener is logged and never aborts a migration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::definitions::MigrationDirection;
use crate::error::ArcanoxResult;

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationEvent {
    BatchStarted {
        batch: i64,
        migrations: Vec<String>,
        pretend: bool,
    },
    Migrating {
        migration: String,
        batch: i64,
        pretend: bool,
    },
    Migrated {
        migration: String,
        batch: i64,
        execution_time_ms: u128,
        pretend: bool,
    },
    RollbackStarted {
        migrations: Vec<String>,
        pretend: bool,
    },
    RollingBack {
        migration: String,
        batch: i64,
        pretend: bool,
    },
    RolledBack {
        migration: String,
        batch: i64,
        execution_time_ms: u128,
        pretend: bool,
    },
    RollbackCompleted {
        rolled_back: Vec<String>,
        pretend: bool,
    },
    Error {
        migration: String,
        direction: MigrationDirection,
        message: String,
        pretend: bool,
    },
    BatchCompleted {
        batch: i64,
        migrated: Vec<String>,
        pretend: bool,
    },
}

impl MigrationEvent {
    /// Stable snake_case event name
    pub fn name(&self) -> &'static str {
        match self {
            MigrationEvent::BatchStarted { .. } => "batch_started",
            MigrationEvent::Migrating { .. } => "migrating",
            MigrationEvent::Migrated { .. } => "migrated",
            MigrationEvent::RollbackStarted { .. } => "rollback_started",
            MigrationEvent::RollingBack { .. } => "rolling_back",
            MigrationEvent::RolledBack { .. } => "rolled_back",
            MigrationEvent::RollbackCompleted { .. } => "rollback_completed",
            MigrationEvent::Error { .. } => "error",
            MigrationEvent::BatchCompleted { .. } => "batch_completed",
        }
    }

    pub fn pretend(&self) -> bool {
        match self {
            MigrationEvent::BatchStarted { pretend, .. }
            | MigrationEvent::Migrating { pretend, .. }
            | MigrationEvent::Migrated { pretend, .. }
            | MigrationEvent::RollbackStarted { pretend, .. }
            | MigrationEvent::RollingBack { pretend, .. }
            | MigrationEvent::RolledBack { pretend, .. }
            | MigrationEvent::RollbackCompleted { pretend, .. }
            | MigrationEvent::Error { pretend, .. }
            | MigrationEvent::BatchCompleted { pretend, .. } => *pretend,
        }
    }

    /// The migration this event is about, for per-migration events
    pub fn migration(&self) -> Option<&str> {
        match self {
            MigrationEvent::Migrating { migration, .. }
            | MigrationEvent::Migrated { migration, .. }
            | MigrationEvent::RollingBack { migration, .. }
            | MigrationEvent::RolledBack { migration, .. }
            | MigrationEvent::Error { migration, .. } => Some(migration),
            _ => None,
        }
    }
}

#[async_trait]
pub trait MigrationListener: Send + Sync {
    async fn handle(&self, event: &MigrationEvent) -> ArcanoxResult<()>;
}

/// Fan-out of events to registered listeners
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Vec<Arc<dyn MigrationListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&mut self, listener: Arc<dyn MigrationListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub async fn emit(&self, event: MigrationEvent) {
        for listener in &self.listeners {
            if let Err(e) = listener.handle(&event).await {
                warn!(event = event.name(), error = %e, "Migration listener failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArcanoxError;
    use std::sync::Mutex;

    struct Recorder {
        events: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl MigrationListener for Recorder {
        async fn handle(&self, event: &MigrationEvent) -> ArcanoxResult<()> {
            self.events.lock().unwrap().push(event.name());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl MigrationListener for Failing {
        async fn handle(&self, _event: &MigrationEvent) -> ArcanoxResult<()> {
            Err(ArcanoxError::adapter("listener down"))
        }
    }

    #[tokio::test]
    async fn test_failing_listener_does_not_stop_fan_out() {
        let recorder = Arc::new(Recorder {
            events: Mutex::new(Vec::new()),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.listen(Arc::new(Failing));
        dispatcher.listen(recorder.clone());

        dispatcher
            .emit(MigrationEvent::Migrating {
                migration: "m1".to_string(),
                batch: 1,
                pretend: true,
            })
            .await;

        assert_eq!(*recorder.events.lock().unwrap(), vec!["migrating"]);
    }

    #[test]
    fn test_event_accessors() {
        let event = MigrationEvent::Error {
            migration: "m1".to_string(),
            direction: MigrationDirection::Down,
            message: "boom".to_string(),
            pretend: false,
        };
        assert_eq!(event.name(), "error");
        assert_eq!(event.migration(), Some("m1"));
        assert!(!event.pretend());

        let event = MigrationEvent::BatchCompleted {
            batch: 2,
            migrated: vec![],
            pretend: true,
        };
        assert!(event.migration().is_none());
        assert!(event.pretend());
    }
}
