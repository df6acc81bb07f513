//! Quizzes of the open lesson and the learner's answers

use crate::action::{Action, SliceKey};
use crate::models::Quiz;
use crate::resource::AsyncResource;
use crate::slice::{Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct QuizzesSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum QuizzesLocal {
    /// Select an option; out-of-range options and unknown ids are ignored
    AnswerQuestion {
        quiz_id: String,
        question_id: String,
        option: usize,
    },
    /// Clear every answer of one quiz
    ResetAnswers { quiz_id: String },
}

impl Slice for QuizzesSlice {
    const KEY: SliceKey = SliceKey::Quizzes;
    type Data = Vec<Quiz>;
    type Local = QuizzesLocal;

    fn reduce_local(data: &Vec<Quiz>, action: &QuizzesLocal) -> Option<Vec<Quiz>> {
        match action {
            QuizzesLocal::AnswerQuestion {
                quiz_id,
                question_id,
                option,
            } => {
                let qi = data.iter().position(|q| &q.id == quiz_id)?;
                let ai = data[qi].questions.iter().position(|q| &q.id == question_id)?;
                if *option >= data[qi].questions[ai].options.len() {
                    return None;
                }
                let mut next = data.clone();
                next[qi].questions[ai].selected_option = Some(*option);
                Some(next)
            }
            QuizzesLocal::ResetAnswers { quiz_id } => {
                let qi = data.iter().position(|q| &q.id == quiz_id)?;
                let mut next = data.clone();
                for question in &mut next[qi].questions {
                    question.selected_option = None;
                }
                Some(next)
            }
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Quizzes(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<Vec<Quiz>>> {
        &state.quizzes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn quizzes() -> Vec<Quiz> {
        vec![Quiz {
            id: "q1".into(),
            questions: vec![Question {
                id: "a".into(),
                options: vec!["yes".into(), "no".into()],
                correct_option: Some(1),
                ..Default::default()
            }],
            ..Default::default()
        }]
    }

    fn answer(option: usize) -> QuizzesLocal {
        QuizzesLocal::AnswerQuestion {
            quiz_id: "q1".into(),
            question_id: "a".into(),
            option,
        }
    }

    #[test]
    fn test_answer_and_score() {
        let next = QuizzesSlice::reduce_local(&quizzes(), &answer(1)).unwrap();
        assert_eq!(next[0].questions[0].selected_option, Some(1));
        assert_eq!(next[0].score().correct, 1);
    }

    #[test]
    fn test_out_of_range_answer_ignored() {
        assert!(QuizzesSlice::reduce_local(&quizzes(), &answer(2)).is_none());
    }

    #[test]
    fn test_reset_answers() {
        let answered = QuizzesSlice::reduce_local(&quizzes(), &answer(0)).unwrap();
        let reset = QuizzesSlice::reduce_local(
            &answered,
            &QuizzesLocal::ResetAnswers {
                quiz_id: "q1".into(),
            },
        )
        .unwrap();
        assert_eq!(reset, quizzes());
    }
}
