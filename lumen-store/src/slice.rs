//! Async Resource Slice pattern
//!
//! A slice owns one resource of the root state. All of its behaviour lives in
//! one pure reducer, [`reduce`], shared by every slice; a slice only declares
//! its data type, its local mutations and what happens to data on failure.

use crate::action::{Action, FetchPhase, SliceAction, SliceKey};
use crate::resource::{AsyncResource, RequestId};
use crate::store::RootState;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Action type addressed to slice `S`
pub type SliceActionOf<S> = SliceAction<<S as Slice>::Local, <S as Slice>::Data>;

/// What a slice stores as data when a fetch fails
#[derive(Debug, Clone, Copy)]
pub enum FailurePolicy<T> {
    /// Keep the last successfully fetched value (stale-while-revalidate)
    RetainLast,
    /// Replace data with a declared default
    Fallback(fn() -> T),
}

/// How completions of superseded fetches are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Every completion is applied; the last one dispatched wins
    #[default]
    LastWriterWins,
    /// Only completions of the most recently started fetch are applied
    LatestOnly,
}

impl StalePolicy {
    pub fn from_config(ignore_stale_completions: bool) -> Self {
        if ignore_stale_completions {
            StalePolicy::LatestOnly
        } else {
            StalePolicy::LastWriterWins
        }
    }
}

/// One named, independently reducible region of the root state
pub trait Slice: 'static {
    const KEY: SliceKey;

    /// Cached value type
    type Data: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Local mutations of loaded data
    type Local: Clone + Debug + PartialEq + Send + Sync + 'static;

    fn failure_policy() -> FailurePolicy<Self::Data> {
        FailurePolicy::RetainLast
    }

    /// Apply a local mutation to loaded data; `None` leaves the slice unchanged
    fn reduce_local(data: &Self::Data, action: &Self::Local) -> Option<Self::Data>;

    /// Wrap a slice action into the root action
    fn wrap(action: SliceActionOf<Self>) -> Action;

    /// This slice's state within the root state
    fn select(state: &RootState) -> &Arc<AsyncResource<Self::Data>>;

    fn local(action: Self::Local) -> Action {
        Self::wrap(SliceAction::Local(action))
    }

    fn reset() -> Action {
        Self::wrap(SliceAction::Reset)
    }

    fn pending(request: RequestId) -> Action {
        Self::wrap(SliceAction::Fetch(FetchPhase::Pending { request }))
    }

    fn fulfilled(request: RequestId, data: Self::Data) -> Action {
        Self::wrap(SliceAction::Fetch(FetchPhase::Fulfilled { request, data }))
    }

    fn rejected(request: RequestId, message: impl Into<String>) -> Action {
        Self::wrap(SliceAction::Fetch(FetchPhase::Rejected {
            request,
            message: message.into(),
        }))
    }
}

/// Pure slice reducer.
///
/// Returns `None` when the action leaves the slice unchanged so the store can
/// keep the previous state object.
pub fn reduce<S: Slice>(
    state: &AsyncResource<S::Data>,
    action: SliceActionOf<S>,
    stale: StalePolicy,
) -> Option<AsyncResource<S::Data>> {
    match action {
        SliceAction::Fetch(FetchPhase::Pending { request }) => Some(state.begin(request)),
        SliceAction::Fetch(phase) => {
            let request = phase.request();
            if stale == StalePolicy::LatestOnly && state.latest_request() != Some(request) {
                debug!(
                    slice = %S::KEY,
                    request = %request,
                    latest = ?state.latest_request(),
                    "Ignoring completion of superseded fetch"
                );
                return None;
            }
            match phase {
                FetchPhase::Fulfilled { request, data } => Some(state.succeed(request, data)),
                FetchPhase::Rejected { request, message } => Some(match S::failure_policy() {
                    FailurePolicy::RetainLast => state.fail(request, message),
                    FailurePolicy::Fallback(fallback) => {
                        state.fail_with_fallback(request, message, fallback())
                    }
                }),
                FetchPhase::Pending { .. } => None,
            }
        }
        SliceAction::Local(local) => {
            let data = match state.data() {
                Some(data) if state.is_succeeded() => data,
                _ => {
                    debug!(slice = %S::KEY, action = ?local, status = %state.status(), "Local mutation ignored: no loaded data");
                    return None;
                }
            };
            match S::reduce_local(data, &local) {
                Some(next) if &next != data => Some(state.with_data(next)),
                _ => None,
            }
        }
        SliceAction::Reset => {
            if state.is_idle() && state.data().is_none() && state.latest_request().is_none() {
                None
            } else {
                Some(AsyncResource::idle())
            }
        }
    }
}
