//! # Lumen Store
//!
//! Client-side state layer for the Lumen learning app:
//! - Async resource slices (auth, subjects, modules, lesson, quizzes, AR models, emotion)
//! - Root store with immutable, structurally shared state
//! - Retry policy with exponential backoff and jitter
//! - Payload normalisation from loosely typed server JSON
//! - HTTP transport, REST endpoint wrappers and credential persistence

pub mod action;
pub mod api;
pub mod app;
pub mod credentials;
pub mod error;
pub mod http;
pub mod models;
pub mod normalize;
pub mod resource;
pub mod retry;
pub mod slice;
pub mod slices;
pub mod store;
pub mod thunk;

pub use action::{Action, FetchPhase, SliceAction, SliceKey};
pub use api::ApiClient;
pub use app::Lumen;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, AUTH_TOKEN_KEY};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use normalize::Normalizer;
pub use resource::{AsyncResource, RequestId, ResourceStatus};
pub use retry::{Jitter, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use slice::{reduce, FailurePolicy, Slice, StalePolicy};
pub use store::{RootState, RootStore};
pub use thunk::run_fetch;
