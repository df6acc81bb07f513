//! Async fetch lifecycle driver

use crate::error::ApiError;
use crate::resource::AsyncResource;
use crate::slice::Slice;
use crate::store::RootStore;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Drive one fetch for slice `S`.
///
/// Dispatches `Pending`, awaits `fetch`, then dispatches exactly one of
/// `Fulfilled` or `Rejected`. Failures never escape; the returned snapshot
/// of the slice carries the outcome.
pub async fn run_fetch<S, Fut>(store: &RootStore, fetch: Fut) -> Arc<AsyncResource<S::Data>>
where
    S: Slice,
    Fut: Future<Output = Result<S::Data, ApiError>>,
{
    let request = store.next_request_id();
    store.dispatch(S::pending(request));
    debug!(slice = %S::KEY, request = %request, "Fetch started");

    match fetch.await {
        Ok(data) => {
            store.dispatch(S::fulfilled(request, data));
            debug!(slice = %S::KEY, request = %request, "Fetch fulfilled");
        }
        Err(err) => {
            warn!(slice = %S::KEY, request = %request, error = %err, "Fetch rejected");
            store.dispatch(S::rejected(request, err.user_message()));
        }
    }

    store.select::<S>()
}
