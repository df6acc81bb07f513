//! View-ready domain types
//!
//! Every field has a concrete value once a payload has gone through
//! [`crate::normalize::Normalizer`]; `Option` is used only where absence is
//! meaningful (an unanswered question, a lesson without an AR model).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    /// School grade or level label
    pub grade: String,
}

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    /// Bearer token; empty when the server did not issue one
    pub token: String,
}

/// Subject in the catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    /// Display colour, e.g. `#4F46E5`
    pub color: String,
    pub module_count: u32,
    /// Completion ratio 0.0-1.0
    pub progress: f64,
    pub selected: bool,
}

/// Module (unit) within a subject
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub lesson_count: u32,
    /// Sort position within the subject
    pub position: u32,
    pub duration_minutes: u32,
    pub completed: bool,
}

/// One block of lesson content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LessonSection {
    pub heading: String,
    pub body: String,
    pub image_url: String,
}

/// Full lesson
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LessonDetail {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<LessonSection>,
    pub video_url: String,
    pub duration_minutes: u32,
    /// AR model shown alongside the lesson
    pub ar_model_id: Option<String>,
    /// Completion percentage 0-100
    pub progress: u8,
}

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`; `None` when the server withholds the answer
    pub correct_option: Option<usize>,
    /// Learner's choice, set locally
    pub selected_option: Option<usize>,
    pub explanation: String,
}

impl Question {
    pub fn is_answered(&self) -> bool {
        self.selected_option.is_some()
    }

    pub fn is_correct(&self) -> bool {
        matches!((self.selected_option, self.correct_option), (Some(a), Some(b)) if a == b)
    }
}

/// Quiz attached to a lesson
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String,
    pub title: String,
    pub questions: Vec<Question>,
    /// Zero means untimed
    pub time_limit_secs: u32,
}

/// Answer tally for one quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

impl Quiz {
    pub fn score(&self) -> QuizScore {
        QuizScore {
            correct: self.questions.iter().filter(|q| q.is_correct()).count(),
            answered: self.questions.iter().filter(|q| q.is_answered()).count(),
            total: self.questions.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(Question::is_answered)
    }
}

/// 3D model available in the AR viewer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArModel {
    pub id: String,
    pub name: String,
    pub description: String,
    /// glTF/GLB asset
    pub model_url: String,
    pub thumbnail_url: String,
    /// Display scale factor (> 0)
    pub scale: f64,
    pub selected: bool,
}

/// Result of one emotion-detection request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub dominant_emotion: String,
    /// Confidence of the dominant emotion, 0.0-1.0
    pub confidence: f64,
    /// Per-emotion scores, 0.0-1.0
    pub scores: BTreeMap<String, f64>,
    /// Estimated engagement, 0.0-1.0
    pub engagement: f64,
    pub recommendation: String,
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Camera frame submitted for emotion analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionFrame {
    /// Base64-encoded JPEG
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
}

/// Sign-up form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}
