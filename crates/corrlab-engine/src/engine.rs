/*
[INPUT]:  Task identifiers from the submission flow or a recovered share URL
[OUTPUT]: Observable TaskState, service health, and UI intents
[POS]:    Engine facade - session ownership and supersession
[UPDATE]: When the consumer-facing surface or session rules change
*/

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use corrlab_adapter::ApiClient;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::health::{ServiceHealth, run_health_loop};
use crate::poll::run_poll_loop;
use crate::reducer::{TaskEvent, TaskState, reduce};

/// UI-facing intent emitted at the engine boundary.
///
/// Presentation layers consume these instead of the engine mutating any
/// ambient page/application state itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiIntent {
    /// Whether the consumer should present the analysis (results) layout
    pub analysis_mode: bool,
}

/// State shared between the facade and its spawned loops
pub(crate) struct Shared {
    pub(crate) client: Arc<ApiClient>,
    pub(crate) config: EngineConfig,
    /// Session counter; the logical clock that identifies stale responses
    epoch: AtomicU64,
    pub(crate) state_tx: watch::Sender<TaskState>,
    pub(crate) health_tx: watch::Sender<ServiceHealth>,
    intent_tx: watch::Sender<UiIntent>,
    /// Engine instance identity, for log correlation only
    pub(crate) instance: Uuid,
}

impl Shared {
    pub(crate) fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Apply an event unless its session was superseded in the meantime.
    ///
    /// The epoch comparison happens here, at consumption time; the reducer
    /// repeats it against the state's own epoch as defense in depth.
    pub(crate) fn apply(&self, event: TaskEvent) {
        let current = self.current_epoch();
        if event.epoch() != current {
            debug!(
                instance = %self.instance,
                event_epoch = event.epoch(),
                engine_epoch = current,
                "dropping stale event"
            );
            return;
        }
        self.state_tx
            .send_modify(|state| *state = reduce(state.clone(), event));
    }
}

/// One live polling session
struct PollSession {
    epoch: u64,
    token: CancellationToken,
}

/// The task-polling engine.
///
/// Owns a single logical "current task": polls its status, fetches the
/// final report exactly once, discards responses of superseded sessions,
/// and exposes the resulting [`TaskState`] on a watch channel.
///
/// `start_task` and `reset` spawn onto the ambient tokio runtime and must
/// be called from within one.
pub struct AnalysisEngine {
    shared: Arc<Shared>,
    session: Mutex<Option<PollSession>>,
}

impl AnalysisEngine {
    pub fn new(client: ApiClient, config: EngineConfig) -> Self {
        let (state_tx, _) = watch::channel(TaskState::default());
        let (health_tx, _) = watch::channel(ServiceHealth::default());
        let (intent_tx, _) = watch::channel(UiIntent::default());

        Self {
            shared: Arc::new(Shared {
                client: Arc::new(client),
                config,
                epoch: AtomicU64::new(0),
                state_tx,
                health_tx,
                intent_tx,
                instance: Uuid::new_v4(),
            }),
            session: Mutex::new(None),
        }
    }

    /// Observe the task lifecycle
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.shared.state_tx.subscribe()
    }

    /// Observe service health (annotates the waiting UI only)
    pub fn health(&self) -> watch::Receiver<ServiceHealth> {
        self.shared.health_tx.subscribe()
    }

    /// Observe UI intents
    pub fn intents(&self) -> watch::Receiver<UiIntent> {
        self.shared.intent_tx.subscribe()
    }

    /// Snapshot of the current task state
    pub fn state(&self) -> TaskState {
        self.shared.state_tx.borrow().clone()
    }

    /// Start tracking a task, superseding any session already in flight.
    ///
    /// The old session is invalidated before the new one exists: its token
    /// is cancelled and the epoch advances, so a timer or response callback
    /// firing afterwards is a no-op.
    pub fn start_task(&self, task_id: impl Into<String>) {
        let task_id = task_id.into();
        let mut slot = self.lock_session();

        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(old) = slot.take() {
            info!(
                instance = %self.shared.instance,
                old_epoch = old.epoch,
                new_epoch = epoch,
                "superseding active session"
            );
            old.token.cancel();
        }

        self.shared.apply(TaskEvent::Started {
            epoch,
            task_id: task_id.clone(),
        });

        let token = CancellationToken::new();
        tokio::spawn(run_poll_loop(
            self.shared.clone(),
            task_id,
            epoch,
            token.clone(),
        ));
        tokio::spawn(run_health_loop(self.shared.clone(), token.clone()));

        self.shared
            .intent_tx
            .send_replace(UiIntent { analysis_mode: true });
        *slot = Some(PollSession { epoch, token });
    }

    /// Stop tracking and clear all task state.
    ///
    /// Safe to call with no active session; cancelling an already-resolved
    /// session is a no-op.
    pub fn reset(&self) {
        let mut slot = self.lock_session();

        let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(old) = slot.take() {
            info!(
                instance = %self.shared.instance,
                old_epoch = old.epoch,
                "resetting active session"
            );
            old.token.cancel();
        }

        self.shared.apply(TaskEvent::Reset { epoch });
        self.shared
            .intent_tx
            .send_replace(UiIntent {
                analysis_mode: false,
            });
    }

    /// Wait until the current task reaches a terminal phase.
    pub async fn wait_terminal(&self) -> TaskState {
        let mut rx = self.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.phase.is_terminal() {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<PollSession>> {
        // A poisoned lock only means a panicking thread held the slot; the
        // session data itself stays usable.
        self.session.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Drop for AnalysisEngine {
    /// Consumer teardown cancels any in-flight session.
    fn drop(&mut self) {
        if let Some(session) = self.lock_session().take() {
            session.token.cancel();
        }
    }
}
