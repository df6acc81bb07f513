//! REST endpoint wrappers, one method per endpoint
//!
//! Methods return the raw JSON body; callers normalise it. Any status outside
//! 2xx becomes [`ApiError::Status`].

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpTransport};
use crate::models::{EmotionFrame, SignupRequest};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let response = self.transport.request(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(ApiError::from_response(response.status, &response.body))
        }
    }

    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::post(
            "auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
    }

    /// `POST /auth/signup`
    pub async fn signup(&self, form: &SignupRequest) -> Result<Value, ApiError> {
        let body = serde_json::to_value(form).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        self.send(HttpRequest::post("auth/signup", body)).await
    }

    /// `GET /auth/me` with an explicit token
    pub async fn current_user(&self, token: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::get("auth/me").with_header("Authorization", format!("Bearer {}", token)))
            .await
    }

    /// `GET /subjects`
    pub async fn subjects(&self) -> Result<Value, ApiError> {
        self.send(HttpRequest::get("subjects")).await
    }

    /// `GET /subjects/{id}/modules`
    pub async fn modules(&self, subject_id: &str) -> Result<Value, ApiError> {
        let id = path_segment(subject_id, "subject id")?;
        self.send(HttpRequest::get(format!("subjects/{}/modules", id))).await
    }

    /// `GET /lessons/{id}`
    pub async fn lesson(&self, lesson_id: &str) -> Result<Value, ApiError> {
        let id = path_segment(lesson_id, "lesson id")?;
        self.send(HttpRequest::get(format!("lessons/{}", id))).await
    }

    /// `GET /lessons/{id}/quizzes`
    pub async fn quizzes(&self, lesson_id: &str) -> Result<Value, ApiError> {
        let id = path_segment(lesson_id, "lesson id")?;
        self.send(HttpRequest::get(format!("lessons/{}/quizzes", id))).await
    }

    /// `GET /ar-models`
    pub async fn ar_models(&self) -> Result<Value, ApiError> {
        self.send(HttpRequest::get("ar-models")).await
    }

    /// `POST /emotion/analyze`
    pub async fn analyze_emotion(&self, frame: &EmotionFrame) -> Result<Value, ApiError> {
        if frame.image.trim().is_empty() {
            return Err(ApiError::InvalidInput("No camera frame to analyze.".to_string()));
        }
        let body = serde_json::to_value(frame).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        self.send(HttpRequest::post("emotion/analyze", body)).await
    }

    /// `POST /progress/lessons/{id}`
    pub async fn report_lesson_progress(&self, lesson_id: &str, percent: u8) -> Result<Value, ApiError> {
        let id = path_segment(lesson_id, "lesson id")?;
        self.send(HttpRequest::post(
            format!("progress/lessons/{}", id),
            json!({ "progress": percent.min(100) }),
        ))
        .await
    }
}

fn path_segment<'a>(raw: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidInput(format!("Invalid {}: '{}'", what, raw)));
    }
    Ok(trimmed)
}
