//! Actions dispatched to the root store
//!
//! Every action belongs to exactly one slice. Fetch lifecycles use the
//! three-phase sequence `Pending` → (`Fulfilled` | `Rejected`).

use crate::models::{ArModel, EmotionAnalysis, LessonDetail, Module, Quiz, Session, Subject};
use crate::resource::RequestId;
use crate::slices::{ArModelsLocal, AuthLocal, LessonLocal, ModulesLocal, QuizzesLocal, SubjectsLocal};
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;

/// Name of one slice of the root state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceKey {
    Auth,
    Subjects,
    Modules,
    Lesson,
    Quizzes,
    ArModels,
    Emotion,
}

impl SliceKey {
    pub const ALL: [SliceKey; 7] = [
        SliceKey::Auth,
        SliceKey::Subjects,
        SliceKey::Modules,
        SliceKey::Lesson,
        SliceKey::Quizzes,
        SliceKey::ArModels,
        SliceKey::Emotion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SliceKey::Auth => "auth",
            SliceKey::Subjects => "subjects",
            SliceKey::Modules => "modules",
            SliceKey::Lesson => "lesson",
            SliceKey::Quizzes => "quizzes",
            SliceKey::ArModels => "ar_models",
            SliceKey::Emotion => "emotion",
        }
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase of a fetch lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPhase<T> {
    Pending { request: RequestId },
    Fulfilled { request: RequestId, data: T },
    Rejected { request: RequestId, message: String },
}

impl<T> FetchPhase<T> {
    pub fn request(&self) -> RequestId {
        match self {
            FetchPhase::Pending { request }
            | FetchPhase::Fulfilled { request, .. }
            | FetchPhase::Rejected { request, .. } => *request,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FetchPhase::Pending { .. } => "pending",
            FetchPhase::Fulfilled { .. } => "fulfilled",
            FetchPhase::Rejected { .. } => "rejected",
        }
    }
}

/// Action addressed to one slice
#[derive(Debug, Clone, PartialEq)]
pub enum SliceAction<L, T> {
    /// Fetch lifecycle transition
    Fetch(FetchPhase<T>),
    /// Slice-specific mutation of already loaded data
    Local(L),
    /// Back to idle with no data
    Reset,
}

impl<L, T> SliceAction<L, T> {
    /// Short label for logging
    pub fn name(&self) -> &'static str {
        match self {
            SliceAction::Fetch(phase) => phase.name(),
            SliceAction::Local(_) => "local",
            SliceAction::Reset => "reset",
        }
    }
}

/// Root action: the variant names the owning slice
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Auth(SliceAction<AuthLocal, Session>),
    Subjects(SliceAction<SubjectsLocal, Vec<Subject>>),
    Modules(SliceAction<ModulesLocal, Vec<Module>>),
    Lesson(SliceAction<LessonLocal, LessonDetail>),
    Quizzes(SliceAction<QuizzesLocal, Vec<Quiz>>),
    ArModels(SliceAction<ArModelsLocal, Vec<ArModel>>),
    Emotion(SliceAction<Infallible, EmotionAnalysis>),
}

impl Action {
    /// Owning slice
    pub fn slice(&self) -> SliceKey {
        match self {
            Action::Auth(_) => SliceKey::Auth,
            Action::Subjects(_) => SliceKey::Subjects,
            Action::Modules(_) => SliceKey::Modules,
            Action::Lesson(_) => SliceKey::Lesson,
            Action::Quizzes(_) => SliceKey::Quizzes,
            Action::ArModels(_) => SliceKey::ArModels,
            Action::Emotion(_) => SliceKey::Emotion,
        }
    }

    /// Phase/mutation label, e.g. `pending`, `local`
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Auth(a) => a.name(),
            Action::Subjects(a) => a.name(),
            Action::Modules(a) => a.name(),
            Action::Lesson(a) => a.name(),
            Action::Quizzes(a) => a.name(),
            Action::ArModels(a) => a.name(),
            Action::Emotion(a) => a.name(),
        }
    }
}
