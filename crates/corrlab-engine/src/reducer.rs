/*
[INPUT]:  TaskEvent stream tagged with session epochs
[OUTPUT]: Next TaskState snapshots for observers
[POS]:    Task domain logic - pure lifecycle state machine
[UPDATE]: When lifecycle transitions or observable fields change
*/

use corrlab_adapter::{AnalysisResult, JobStatus};

/// Externally observable lifecycle phase of the current task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPhase {
    /// No task is being tracked
    #[default]
    Idle,
    /// A task is being polled
    Polling,
    /// The task finished and its report was applied
    Completed,
    /// The task failed, or its report could not be retrieved
    Failed,
}

impl TaskPhase {
    /// Terminal phases only leave via a brand-new task (full reset)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskPhase::Completed | TaskPhase::Failed)
    }
}

/// Classified failure kinds surfaced to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network/connection failure; retry is a manual restart
    Transport,
    /// The server no longer knows the task
    SessionExpired,
    /// The job itself reported failure
    Application,
    /// Unexpected non-success response from the server
    Server,
}

/// Error carried on a failed task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskError {
    pub kind: FailureKind,
    pub message: String,
}

/// Observable state of the tracked task.
///
/// All mutation flows through [`reduce`]; no component writes these fields
/// directly.
#[derive(Debug, Clone, Default)]
pub struct TaskState {
    /// Session epoch this state belongs to
    pub epoch: u64,
    /// Identifier of the tracked task
    pub task_id: Option<String>,
    pub phase: TaskPhase,
    /// Completion ratio in [0, 1]; never regresses within a task
    pub progress: f64,
    /// Last human-readable status line from the server
    pub message: Option<String>,
    /// Symbol the server is currently processing
    pub current_stock: Option<String>,
    /// Final report; set exactly once, present iff completed
    pub result: Option<AnalysisResult>,
    /// Present iff failed
    pub error: Option<TaskError>,
}

/// Lifecycle events.
///
/// Every event carries the epoch of the session that produced it so the
/// reducer can drop stale replays even if a caller bypasses the scheduler's
/// own consumption-time check.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    Started {
        epoch: u64,
        task_id: String,
    },
    StatusReceived {
        epoch: u64,
        status: JobStatus,
        progress: f64,
        message: Option<String>,
        current_stock: Option<String>,
    },
    Completed {
        epoch: u64,
        result: AnalysisResult,
    },
    Failed {
        epoch: u64,
        kind: FailureKind,
        message: String,
    },
    Reset {
        epoch: u64,
    },
}

impl TaskEvent {
    /// Epoch of the session that produced this event
    pub fn epoch(&self) -> u64 {
        match self {
            TaskEvent::Started { epoch, .. }
            | TaskEvent::StatusReceived { epoch, .. }
            | TaskEvent::Completed { epoch, .. }
            | TaskEvent::Failed { epoch, .. }
            | TaskEvent::Reset { epoch } => *epoch,
        }
    }
}

/// Pure transition function for the task lifecycle.
///
/// Stale-epoch events and events that do not apply in the current phase
/// return the state unchanged, which also makes replays of identical
/// events idempotent.
pub fn reduce(state: TaskState, event: TaskEvent) -> TaskState {
    match event {
        TaskEvent::Started { epoch, task_id } => {
            // Only a newer session may start; a replayed Started is a no-op.
            if epoch <= state.epoch {
                return state;
            }
            TaskState {
                epoch,
                task_id: Some(task_id),
                phase: TaskPhase::Polling,
                ..TaskState::default()
            }
        }
        TaskEvent::StatusReceived {
            epoch,
            status: _,
            progress,
            message,
            current_stock,
        } => {
            if epoch != state.epoch || state.phase != TaskPhase::Polling {
                return state;
            }
            let mut next = state;
            // Server-reported regressions are clamped, not propagated.
            next.progress = next.progress.max(progress.clamp(0.0, 1.0));
            if let Some(message) = message {
                next.message = Some(message);
            }
            if let Some(stock) = current_stock {
                next.current_stock = Some(stock);
            }
            next
        }
        TaskEvent::Completed { epoch, result } => {
            if epoch != state.epoch
                || state.phase != TaskPhase::Polling
                || state.result.is_some()
            {
                return state;
            }
            TaskState {
                phase: TaskPhase::Completed,
                progress: 1.0,
                result: Some(result),
                error: None,
                ..state
            }
        }
        TaskEvent::Failed {
            epoch,
            kind,
            message,
        } => {
            if epoch != state.epoch || state.phase != TaskPhase::Polling {
                return state;
            }
            TaskState {
                phase: TaskPhase::Failed,
                error: Some(TaskError { kind, message }),
                ..state
            }
        }
        TaskEvent::Reset { epoch } => {
            if epoch <= state.epoch {
                return state;
            }
            TaskState {
                epoch,
                ..TaskState::default()
            }
        }
    }
}
