//! Lesson currently open

use crate::action::{Action, SliceKey};
use crate::models::LessonDetail;
use crate::resource::AsyncResource;
use crate::slice::{Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct LessonSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum LessonLocal {
    /// Record reading progress (percent, clamped to 100). Progress never
    /// moves backwards.
    SetProgress(u8),
}

impl Slice for LessonSlice {
    const KEY: SliceKey = SliceKey::Lesson;
    type Data = LessonDetail;
    type Local = LessonLocal;

    fn reduce_local(data: &LessonDetail, action: &LessonLocal) -> Option<LessonDetail> {
        match action {
            LessonLocal::SetProgress(percent) => {
                let percent = (*percent).min(100);
                (percent > data.progress).then(|| LessonDetail {
                    progress: percent,
                    ..data.clone()
                })
            }
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Lesson(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<LessonDetail>> {
        &state.lesson
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped_and_monotonic() {
        let lesson = LessonDetail {
            progress: 40,
            ..Default::default()
        };
        assert!(LessonSlice::reduce_local(&lesson, &LessonLocal::SetProgress(30)).is_none());
        let next = LessonSlice::reduce_local(&lesson, &LessonLocal::SetProgress(250)).unwrap();
        assert_eq!(next.progress, 100);
    }
}
