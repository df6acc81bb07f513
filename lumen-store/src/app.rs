//! Application context: the composition root wiring store, API client,
//! normaliser, retry policy and credential store together
//!
//! Each `fetch_*` method is a thunk: it drives one slice through
//! `loading → succeeded | failed` and returns the resulting slice snapshot.
//! Errors are never returned from fetches; they land in the slice.

use crate::api::ApiClient;
use crate::credentials::{CredentialStore, FileCredentialStore, AUTH_TOKEN_KEY};
use crate::error::ApiError;
use crate::http::ReqwestTransport;
use crate::models::{ArModel, EmotionAnalysis, EmotionFrame, LessonDetail, Module, Quiz, Session, SignupRequest, Subject};
use crate::normalize::Normalizer;
use crate::resource::AsyncResource;
use crate::retry::RetryPolicy;
use crate::slice::Slice;
use crate::slices::{
    ArModelsSlice, AuthSlice, EmotionSlice, LessonLocal, LessonSlice, ModulesSlice, QuizzesSlice, SubjectsSlice,
};
use crate::store::RootStore;
use crate::thunk::run_fetch;
use lumen_common::config::TomlConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Lumen {
    store: RootStore,
    api: ApiClient,
    normalizer: Normalizer,
    retry: RetryPolicy,
    credentials: Arc<dyn CredentialStore>,
}

impl Lumen {
    pub fn new(
        store: RootStore,
        api: ApiClient,
        normalizer: Normalizer,
        retry: RetryPolicy,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            store,
            api,
            normalizer,
            retry,
            credentials,
        }
    }

    /// Build the production context: reqwest transport, file-backed
    /// credentials, store and retry policy from configuration
    pub fn from_config(config: &TomlConfig) -> lumen_common::Result<Self> {
        config.validate()?;

        let credentials: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.credentials_path()));
        let transport = ReqwestTransport::new(&config.api, Some(credentials.clone()))
            .map_err(|e| lumen_common::Error::Config(format!("HTTP client: {}", e)))?;
        let normalizer = Normalizer::new(config.api.asset_base())?;

        info!(
            base_url = %config.api.base_url,
            max_attempts = config.retry.max_attempts,
            ignore_stale_completions = config.store.ignore_stale_completions,
            "Lumen context initialized"
        );

        Ok(Self::new(
            RootStore::new(&config.store),
            ApiClient::new(Arc::new(transport)),
            normalizer,
            RetryPolicy::from_config(&config.retry),
            credentials,
        ))
    }

    pub fn store(&self) -> &RootStore {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub async fn fetch_subjects(&self) -> Arc<AsyncResource<Vec<Subject>>> {
        run_fetch::<SubjectsSlice, _>(&self.store, async {
            self.api.subjects().await.map(|p| self.normalizer.subjects(&p))
        })
        .await
    }

    /// Modules of one subject. Previously loaded modules stay visible while
    /// loading; dispatch `ModulesSlice::reset()` first for a blank screen.
    pub async fn fetch_modules(&self, subject_id: &str) -> Arc<AsyncResource<Vec<Module>>> {
        run_fetch::<ModulesSlice, _>(&self.store, async {
            self.api
                .modules(subject_id)
                .await
                .map(|p| self.normalizer.modules(&p, subject_id))
        })
        .await
    }

    pub async fn fetch_lesson(&self, lesson_id: &str) -> Arc<AsyncResource<LessonDetail>> {
        run_fetch::<LessonSlice, _>(&self.store, async {
            self.api.lesson(lesson_id).await.map(|p| self.normalizer.lesson(&p))
        })
        .await
    }

    pub async fn fetch_quizzes(&self, lesson_id: &str) -> Arc<AsyncResource<Vec<Quiz>>> {
        run_fetch::<QuizzesSlice, _>(&self.store, async {
            self.api
                .quizzes(lesson_id)
                .await
                .map(|p| self.normalizer.quizzes(&p, lesson_id))
        })
        .await
    }

    pub async fn fetch_ar_models(&self) -> Arc<AsyncResource<Vec<ArModel>>> {
        run_fetch::<ArModelsSlice, _>(&self.store, async {
            self.api.ar_models().await.map(|p| self.normalizer.ar_models(&p))
        })
        .await
    }

    /// Submit a camera frame for analysis.
    ///
    /// Transient failures are retried under the retry policy. Once retries
    /// are exhausted the slice fails and falls back to the neutral reading.
    pub async fn analyze_emotion(&self, frame: &EmotionFrame) -> Arc<AsyncResource<EmotionAnalysis>> {
        run_fetch::<EmotionSlice, _>(&self.store, async {
            self.retry
                .run_when(
                    "analyze_emotion",
                    || self.api.analyze_emotion(frame),
                    ApiError::is_transient,
                )
                .await
                .map(|p| self.normalizer.emotion(&p))
        })
        .await
    }

    /// Sign in and remember the session token
    pub async fn login(&self, email: &str, password: &str) -> Arc<AsyncResource<Session>> {
        run_fetch::<AuthSlice, _>(&self.store, async {
            let email = email.trim();
            if email.is_empty() || password.is_empty() {
                return Err(ApiError::InvalidInput(
                    "Email and password are required.".to_string(),
                ));
            }
            let payload = self.api.login(email, password).await?;
            self.establish_session(&payload).await
        })
        .await
    }

    /// Create an account and sign in with it
    pub async fn signup(&self, form: &SignupRequest) -> Arc<AsyncResource<Session>> {
        run_fetch::<AuthSlice, _>(&self.store, async {
            let form = SignupRequest {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            };
            if form.name.is_empty() || form.email.is_empty() || form.password.is_empty() {
                return Err(ApiError::InvalidInput(
                    "Name, email and password are required.".to_string(),
                ));
            }
            let payload = self.api.signup(&form).await?;
            self.establish_session(&payload).await
        })
        .await
    }

    /// Resume the session saved by a previous login.
    ///
    /// Leaves the auth slice untouched when no token is saved. A token
    /// rejected with 401 is forgotten. An unreadable credential store fails
    /// the slice without contacting the server.
    pub async fn restore_session(&self) -> Arc<AsyncResource<Session>> {
        let token = match self.credentials.get(AUTH_TOKEN_KEY).await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!("No saved session to restore");
                return self.store.select::<AuthSlice>();
            }
            Err(e) => {
                warn!(error = %e, "Could not read saved session");
                return run_fetch::<AuthSlice, _>(&self.store, async { Err(ApiError::from(e)) }).await;
            }
        };

        run_fetch::<AuthSlice, _>(&self.store, async {
            match self.api.current_user(&token).await {
                Ok(payload) => Ok(Session {
                    user: self.normalizer.user(&payload),
                    token: token.clone(),
                }),
                Err(err) => {
                    if err.status() == Some(401) {
                        info!("Saved session rejected, discarding token");
                        self.forget_token().await;
                    }
                    Err(err)
                }
            }
        })
        .await
    }

    /// Forget the saved token and clear the auth slice
    pub async fn logout(&self) {
        self.forget_token().await;
        self.store.dispatch(AuthSlice::reset());
        info!("Signed out");
    }

    /// Record reading progress for a lesson.
    ///
    /// The open lesson is updated optimistically before the report is sent;
    /// a failed report does not roll it back.
    pub async fn report_lesson_progress(&self, lesson_id: &str, percent: u8) -> Result<(), ApiError> {
        let is_open = self
            .store
            .state()
            .lesson
            .data()
            .is_some_and(|lesson| lesson.id == lesson_id);
        if is_open {
            self.store.dispatch(LessonSlice::local(LessonLocal::SetProgress(percent)));
        }

        self.api
            .report_lesson_progress(lesson_id, percent)
            .await
            .map(|_| ())
            .map_err(|err| {
                warn!(lesson_id, percent, error = %err, "Progress report failed");
                err
            })
    }

    async fn establish_session(&self, payload: &Value) -> Result<Session, ApiError> {
        let session = self.normalizer.session(payload);
        if session.token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Sign-in succeeded but no session token was returned.".to_string(),
            ));
        }
        if let Err(e) = self.credentials.set(AUTH_TOKEN_KEY, &session.token).await {
            warn!(error = %e, "Could not persist session token; session lasts until exit");
        }
        Ok(session)
    }

    async fn forget_token(&self) {
        if let Err(e) = self.credentials.remove(AUTH_TOKEN_KEY).await {
            warn!(error = %e, "Could not remove saved session token");
        }
    }
}
