//! Root Store: composition of every slice into one state tree
//!
//! The store is an explicitly constructed handle (clone it to share). State is
//! an immutable tree of `Arc`s: a dispatch builds a new `RootState`, swaps it
//! in, and leaves untouched slices pointer-equal to their previous version so
//! consumers can detect changes with `Arc::ptr_eq`.
//!
//! Dispatch is synchronous and serialised by the watch channel's write lock,
//! so actions are applied strictly in the order `dispatch` is called.

use crate::action::{Action, SliceKey};
use crate::models::{ArModel, EmotionAnalysis, LessonDetail, Module, Quiz, Session, Subject};
use crate::resource::{AsyncResource, RequestId, ResourceStatus};
use crate::slice::{reduce, Slice, StalePolicy};
use crate::slices::{
    ArModelsSlice, AuthSlice, EmotionSlice, LessonSlice, ModulesSlice, QuizzesSlice, SubjectsSlice,
};
use lumen_common::config::StoreConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Full client state tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub auth: Arc<AsyncResource<Session>>,
    pub subjects: Arc<AsyncResource<Vec<Subject>>>,
    pub modules: Arc<AsyncResource<Vec<Module>>>,
    pub lesson: Arc<AsyncResource<LessonDetail>>,
    pub quizzes: Arc<AsyncResource<Vec<Quiz>>>,
    pub ar_models: Arc<AsyncResource<Vec<ArModel>>>,
    pub emotion: Arc<AsyncResource<EmotionAnalysis>>,
}

impl RootState {
    /// State of slice `S`
    pub fn get<S: Slice>(&self) -> &Arc<AsyncResource<S::Data>> {
        S::select(self)
    }

    /// Lifecycle phase of a slice addressed by name
    pub fn status_of(&self, key: SliceKey) -> ResourceStatus {
        match key {
            SliceKey::Auth => self.auth.status(),
            SliceKey::Subjects => self.subjects.status(),
            SliceKey::Modules => self.modules.status(),
            SliceKey::Lesson => self.lesson.status(),
            SliceKey::Quizzes => self.quizzes.status(),
            SliceKey::ArModels => self.ar_models.status(),
            SliceKey::Emotion => self.emotion.status(),
        }
    }

    /// Last error of a slice addressed by name
    pub fn error_of(&self, key: SliceKey) -> Option<&str> {
        match key {
            SliceKey::Auth => self.auth.error(),
            SliceKey::Subjects => self.subjects.error(),
            SliceKey::Modules => self.modules.error(),
            SliceKey::Lesson => self.lesson.error(),
            SliceKey::Quizzes => self.quizzes.error(),
            SliceKey::ArModels => self.ar_models.error(),
            SliceKey::Emotion => self.emotion.error(),
        }
    }

    /// Signed-in session, if any
    pub fn session(&self) -> Option<&Session> {
        self.auth.data().filter(|s| !s.token.is_empty())
    }

    /// Share of completed modules for a subject, derived from the modules
    /// slice. `None` when no modules of that subject are loaded.
    pub fn subject_progress(&self, subject_id: &str) -> Option<f64> {
        let modules: Vec<&Module> = self
            .modules
            .data()?
            .iter()
            .filter(|m| m.subject_id == subject_id)
            .collect();
        if modules.is_empty() {
            return None;
        }
        let done = modules.iter().filter(|m| m.completed).count();
        Some(done as f64 / modules.len() as f64)
    }
}

/// Apply one action; `None` when the tree is unchanged
fn apply(state: &RootState, action: Action, stale: StalePolicy) -> Option<RootState> {
    let mut next = state.clone();
    let changed = match action {
        Action::Auth(a) => swap(&mut next.auth, reduce::<AuthSlice>(&state.auth, a, stale)),
        Action::Subjects(a) => swap(&mut next.subjects, reduce::<SubjectsSlice>(&state.subjects, a, stale)),
        Action::Modules(a) => swap(&mut next.modules, reduce::<ModulesSlice>(&state.modules, a, stale)),
        Action::Lesson(a) => swap(&mut next.lesson, reduce::<LessonSlice>(&state.lesson, a, stale)),
        Action::Quizzes(a) => swap(&mut next.quizzes, reduce::<QuizzesSlice>(&state.quizzes, a, stale)),
        Action::ArModels(a) => swap(&mut next.ar_models, reduce::<ArModelsSlice>(&state.ar_models, a, stale)),
        Action::Emotion(a) => swap(&mut next.emotion, reduce::<EmotionSlice>(&state.emotion, a, stale)),
    };
    changed.then_some(next)
}

fn swap<T>(slot: &mut Arc<AsyncResource<T>>, reduced: Option<AsyncResource<T>>) -> bool {
    match reduced {
        Some(resource) => {
            *slot = Arc::new(resource);
            true
        }
        None => false,
    }
}

struct StoreInner {
    state: watch::Sender<Arc<RootState>>,
    actions: broadcast::Sender<Action>,
    next_request: AtomicU64,
    stale_policy: StalePolicy,
}

/// Single composition point for all slices
#[derive(Clone)]
pub struct RootStore {
    inner: Arc<StoreInner>,
}

impl RootStore {
    pub fn new(config: &StoreConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(RootState::default()));
        let (actions, _) = broadcast::channel(config.action_log_capacity.max(1));
        Self {
            inner: Arc::new(StoreInner {
                state,
                actions,
                next_request: AtomicU64::new(1),
                stale_policy: StalePolicy::from_config(config.ignore_stale_completions),
            }),
        }
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.inner.stale_policy
    }

    /// Route an action to its owning slice and swap in the resulting tree.
    ///
    /// Returns whether the state changed. Every action is also published to
    /// [`RootStore::actions`] subscribers, in dispatch order.
    pub fn dispatch(&self, action: Action) -> bool {
        let slice = action.slice();
        let kind = action.kind();
        let stale = self.inner.stale_policy;
        let actions = &self.inner.actions;

        let changed = self.inner.state.send_if_modified(|current| {
            let logged = (actions.receiver_count() > 0).then(|| action.clone());
            let next = apply(current, action, stale);
            if let Some(logged) = logged {
                // Err only means every subscriber dropped meanwhile
                let _ = actions.send(logged);
            }
            match next {
                Some(next) => {
                    *current = Arc::new(next);
                    true
                }
                None => false,
            }
        });

        debug!(slice = %slice, action = kind, changed, "Dispatched action");
        changed
    }

    /// Current state tree (read-only snapshot)
    pub fn state(&self) -> Arc<RootState> {
        self.inner.state.borrow().clone()
    }

    /// Current state of slice `S`
    pub fn select<S: Slice>(&self) -> Arc<AsyncResource<S::Data>> {
        S::select(&self.inner.state.borrow()).clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<Arc<RootState>> {
        self.inner.state.subscribe()
    }

    /// Log of dispatched actions from now on
    pub fn actions(&self) -> broadcast::Receiver<Action> {
        self.inner.actions.subscribe()
    }

    /// Allocate the id for a new fetch
    pub fn next_request_id(&self) -> RequestId {
        RequestId::new(self.inner.next_request.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RootStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
