//! Slice definitions, one per remotely sourced resource

mod ar_models;
mod auth;
mod emotion;
mod lessons;
mod modules;
mod quizzes;
mod subjects;

pub use ar_models::{ArModelsLocal, ArModelsSlice};
pub use auth::{AuthLocal, AuthSlice};
pub use emotion::{neutral_analysis, EmotionSlice};
pub use lessons::{LessonLocal, LessonSlice};
pub use modules::{ModulesLocal, ModulesSlice};
pub use quizzes::{QuizzesLocal, QuizzesSlice};
pub use subjects::{default_catalog, SubjectsLocal, SubjectsSlice};
