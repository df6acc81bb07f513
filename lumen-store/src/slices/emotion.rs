//! Latest emotion-analysis result
//!
//! Inference is flaky, so the fetch runs under the retry policy and, once
//! retries are exhausted, the slice substitutes a neutral reading.

use crate::action::{Action, SliceKey};
use crate::models::EmotionAnalysis;
use crate::normalize::NEUTRAL_EMOTION;
use crate::resource::AsyncResource;
use crate::slice::{FailurePolicy, Slice, SliceActionOf};
use crate::store::RootState;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

pub struct EmotionSlice;

/// Reading stored when analysis is unavailable
pub fn neutral_analysis() -> EmotionAnalysis {
    EmotionAnalysis {
        dominant_emotion: NEUTRAL_EMOTION.to_string(),
        confidence: 0.0,
        scores: BTreeMap::new(),
        engagement: 0.5,
        recommendation: String::new(),
        analyzed_at: None,
    }
}

impl Slice for EmotionSlice {
    const KEY: SliceKey = SliceKey::Emotion;
    type Data = EmotionAnalysis;
    type Local = Infallible;

    fn failure_policy() -> FailurePolicy<EmotionAnalysis> {
        FailurePolicy::Fallback(neutral_analysis)
    }

    fn reduce_local(_data: &EmotionAnalysis, action: &Infallible) -> Option<EmotionAnalysis> {
        match *action {}
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Emotion(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<EmotionAnalysis>> {
        &state.emotion
    }
}
