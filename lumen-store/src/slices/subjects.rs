//! Subject catalog
//!
//! Falls back to the built-in catalog when the catalog cannot be fetched, so
//! the home screen always has something to browse.

use crate::action::{Action, SliceKey};
use crate::models::Subject;
use crate::normalize::DEFAULT_SUBJECT_COLOR;
use crate::resource::AsyncResource;
use crate::slice::{FailurePolicy, Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct SubjectsSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum SubjectsLocal {
    /// Mark one subject selected and every other one unselected
    Select(String),
    ClearSelection,
}

/// Catalog shown when the server is unreachable
pub fn default_catalog() -> Vec<Subject> {
    let entry = |id: &str, name: &str, description: &str, color: &str| Subject {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon_url: String::new(),
        color: color.to_string(),
        module_count: 0,
        progress: 0.0,
        selected: false,
    };
    vec![
        entry("mathematics", "Mathematics", "Numbers, shapes and patterns", DEFAULT_SUBJECT_COLOR),
        entry("science", "Science", "Explore the natural world", "#059669"),
        entry("history", "History", "Stories of the past", "#B45309"),
        entry("geography", "Geography", "Places, people and environments", "#0284C7"),
        entry("english", "English", "Reading, writing and language", "#DB2777"),
    ]
}

impl Slice for SubjectsSlice {
    const KEY: SliceKey = SliceKey::Subjects;
    type Data = Vec<Subject>;
    type Local = SubjectsLocal;

    fn failure_policy() -> FailurePolicy<Vec<Subject>> {
        FailurePolicy::Fallback(default_catalog)
    }

    fn reduce_local(data: &Vec<Subject>, action: &SubjectsLocal) -> Option<Vec<Subject>> {
        match action {
            SubjectsLocal::Select(id) => {
                if !data.iter().any(|s| &s.id == id) {
                    return None;
                }
                Some(
                    data.iter()
                        .map(|s| Subject {
                            selected: &s.id == id,
                            ..s.clone()
                        })
                        .collect(),
                )
            }
            SubjectsLocal::ClearSelection => Some(
                data.iter()
                    .map(|s| Subject {
                        selected: false,
                        ..s.clone()
                    })
                    .collect(),
            ),
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Subjects(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<Vec<Subject>>> {
        &state.subjects
    }
}
