//! Total mapping from raw server payloads to view-ready models
//!
//! The backend is loosely typed: keys arrive in camelCase or snake_case, ids
//! as numbers or strings, lists bare or wrapped in `{ "data": ... }`. Every
//! function here accepts any JSON value and returns a fully populated model;
//! missing or malformed fields are defaulted, never reported as errors.
//!
//! Relative asset URLs are resolved against the configured asset base:
//! `/uploads/a.png` replaces the base path, `uploads/a.png` is appended to it.

use crate::models::{
    ArModel, EmotionAnalysis, LessonDetail, LessonSection, Module, Question, Quiz, Session, Subject,
    User,
};
use chrono::{DateTime, Utc};
use lumen_common::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

type Object = Map<String, Value>;

/// Colour used for subjects that do not declare one
pub const DEFAULT_SUBJECT_COLOR: &str = "#4F46E5";
/// Dominant emotion reported when a payload carries none
pub const NEUTRAL_EMOTION: &str = "neutral";

const ID_KEYS: &[&str] = &["id", "_id", "uuid"];

/// Payload normaliser bound to one asset base URL
#[derive(Debug, Clone)]
pub struct Normalizer {
    asset_base: Url,
}

impl Normalizer {
    /// Create a normaliser; `asset_base` must be an absolute URL
    pub fn new(asset_base: &str) -> Result<Self> {
        let mut base = asset_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let asset_base = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid asset base URL '{}': {}", asset_base, e)))?;
        if asset_base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Asset base URL '{}' cannot be used as a base",
                asset_base
            )));
        }
        Ok(Self { asset_base })
    }

    pub fn asset_base(&self) -> &Url {
        &self.asset_base
    }

    /// Resolve a possibly relative URL; unusable input yields an empty string
    pub fn absolute_url(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }
        match Url::parse(raw) {
            Ok(url) if !url.cannot_be_a_base() || url.scheme() == "data" => raw.to_string(),
            _ => self
                .asset_base
                .join(raw)
                .map(String::from)
                .unwrap_or_default(),
        }
    }

    pub fn session(&self, payload: &Value) -> Session {
        let obj = as_object(unwrap_envelope(payload));
        let token = text(obj, &["token", "access_token", "accessToken", "jwt"]);
        let user = match obj.and_then(|o| o.get("user")).and_then(Value::as_object) {
            Some(user) => self.user_from(user),
            None => obj.map(|o| self.user_from(o)).unwrap_or_default(),
        };
        Session { user, token }
    }

    pub fn user(&self, payload: &Value) -> User {
        let obj = as_object(unwrap_envelope(payload));
        let obj = obj
            .and_then(|o| o.get("user"))
            .and_then(Value::as_object)
            .or(obj);
        obj.map(|o| self.user_from(o)).unwrap_or_default()
    }

    fn user_from(&self, obj: &Object) -> User {
        User {
            id: text(Some(obj), &["id", "_id", "userId", "user_id"]),
            name: text(Some(obj), &["name", "fullName", "full_name", "username"]),
            email: text(Some(obj), &["email"]),
            avatar_url: self.absolute_url(&text(
                Some(obj),
                &["avatar", "avatarUrl", "avatar_url", "profileImage"],
            )),
            grade: text(Some(obj), &["grade", "level", "class"]),
        }
    }

    pub fn subjects(&self, payload: &Value) -> Vec<Subject> {
        list_items(payload, &["subjects"])
            .into_iter()
            .enumerate()
            .map(|(index, obj)| self.subject(obj, index))
            .collect()
    }

    fn subject(&self, obj: &Object, index: usize) -> Subject {
        let o = Some(obj);
        let color = text(o, &["color", "colour", "themeColor", "theme_color"]);
        Subject {
            id: id_or_position(o, "subject", index),
            name: text(o, &["name", "title"]),
            description: text(o, &["description", "desc"]),
            icon_url: self.absolute_url(&text(o, &["icon", "iconUrl", "icon_url", "image", "imageUrl"])),
            color: if color.is_empty() {
                DEFAULT_SUBJECT_COLOR.to_string()
            } else {
                color
            },
            module_count: count(o, &["moduleCount", "module_count", "modulesCount"], "modules"),
            progress: ratio(number(o, &["progress", "completion"])),
            selected: false,
        }
    }

    /// Modules of one subject, ordered by position.
    ///
    /// `subject_id` is the requested subject and fills entries that omit it.
    pub fn modules(&self, payload: &Value, subject_id: &str) -> Vec<Module> {
        let mut modules: Vec<Module> = list_items(payload, &["modules"])
            .into_iter()
            .enumerate()
            .map(|(index, obj)| {
                let o = Some(obj);
                let own_subject = text(o, &["subjectId", "subject_id", "subject"]);
                Module {
                    id: id_or_position(o, "module", index),
                    subject_id: if own_subject.is_empty() {
                        subject_id.to_string()
                    } else {
                        own_subject
                    },
                    title: text(o, &["title", "name"]),
                    description: text(o, &["description", "desc"]),
                    thumbnail_url: self.absolute_url(&text(
                        o,
                        &["thumbnail", "thumbnailUrl", "thumbnail_url", "image", "imageUrl"],
                    )),
                    lesson_count: count(o, &["lessonCount", "lesson_count", "lessonsCount"], "lessons"),
                    position: number(o, &["order", "position", "index"])
                        .map(to_u32)
                        .unwrap_or(index as u32 + 1),
                    duration_minutes: number(o, &["duration", "durationMinutes", "duration_minutes"])
                        .map(to_u32)
                        .unwrap_or(0),
                    completed: boolean(o, &["completed", "isCompleted", "is_completed"]),
                }
            })
            .collect();
        modules.sort_by_key(|m| m.position);
        modules
    }

    pub fn lesson(&self, payload: &Value) -> LessonDetail {
        let obj = as_object(unwrap_envelope(payload));
        let obj = obj
            .and_then(|o| o.get("lesson"))
            .and_then(Value::as_object)
            .or(obj);

        let ar_model_id = {
            let direct = text(obj, &["arModelId", "ar_model_id", "modelId", "model_id"]);
            let nested = obj
                .and_then(|o| o.get("arModel").or_else(|| o.get("ar_model")))
                .and_then(Value::as_object)
                .map(|m| text(Some(m), ID_KEYS))
                .unwrap_or_default();
            [direct, nested].into_iter().find(|s| !s.is_empty())
        };

        LessonDetail {
            id: text(obj, ID_KEYS),
            module_id: text(obj, &["moduleId", "module_id", "module"]),
            title: text(obj, &["title", "name"]),
            summary: text(obj, &["summary", "description", "desc"]),
            sections: self.sections(obj),
            video_url: self.absolute_url(&text(obj, &["videoUrl", "video_url", "video"])),
            duration_minutes: number(obj, &["duration", "durationMinutes", "duration_minutes"])
                .map(to_u32)
                .unwrap_or(0),
            ar_model_id,
            progress: percent(number(obj, &["progress", "completion"])),
        }
    }

    fn sections(&self, obj: Option<&Object>) -> Vec<LessonSection> {
        let raw = obj.and_then(|o| {
            ["sections", "content", "contents"]
                .iter()
                .find_map(|key| o.get(*key))
        });
        match raw {
            Some(Value::String(body)) if !body.trim().is_empty() => vec![LessonSection {
                body: body.trim().to_string(),
                ..Default::default()
            }],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(body) => Some(LessonSection {
                        body: body.trim().to_string(),
                        ..Default::default()
                    }),
                    Value::Object(section) => {
                        let s = Some(section);
                        Some(LessonSection {
                            heading: text(s, &["heading", "title"]),
                            body: text(s, &["body", "text", "content"]),
                            image_url: self.absolute_url(&text(s, &["image", "imageUrl", "image_url"])),
                        })
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Quizzes of one lesson; a single quiz object is accepted as a list of one
    pub fn quizzes(&self, payload: &Value, lesson_id: &str) -> Vec<Quiz> {
        let mut items = list_items(payload, &["quizzes"]);
        if items.is_empty() {
            if let Some(single) = as_object(unwrap_envelope(payload)).filter(|o| o.contains_key("questions")) {
                items.push(single);
            }
        }
        items
            .into_iter()
            .enumerate()
            .map(|(index, obj)| {
                let o = Some(obj);
                let own_lesson = text(o, &["lessonId", "lesson_id", "lesson"]);
                Quiz {
                    id: id_or_position(o, "quiz", index),
                    lesson_id: if own_lesson.is_empty() {
                        lesson_id.to_string()
                    } else {
                        own_lesson
                    },
                    title: text(o, &["title", "name"]),
                    questions: list_items(obj.get("questions").unwrap_or(&Value::Null), &[])
                        .into_iter()
                        .enumerate()
                        .map(|(qi, q)| question(q, qi))
                        .collect(),
                    time_limit_secs: number(o, &["timeLimit", "time_limit", "timeLimitSecs"])
                        .map(to_u32)
                        .unwrap_or(0),
                }
            })
            .collect()
    }

    pub fn ar_models(&self, payload: &Value) -> Vec<ArModel> {
        list_items(payload, &["models", "arModels", "ar_models"])
            .into_iter()
            .enumerate()
            .map(|(index, obj)| {
                let o = Some(obj);
                ArModel {
                    id: id_or_position(o, "model", index),
                    name: text(o, &["name", "title"]),
                    description: text(o, &["description", "desc"]),
                    model_url: self.absolute_url(&text(
                        o,
                        &["modelUrl", "model_url", "url", "file", "glb"],
                    )),
                    thumbnail_url: self.absolute_url(&text(
                        o,
                        &["thumbnail", "thumbnailUrl", "thumbnail_url", "image", "imageUrl"],
                    )),
                    scale: number(o, &["scale"]).filter(|s| *s > 0.0).unwrap_or(1.0),
                    selected: false,
                }
            })
            .collect()
    }

    pub fn emotion(&self, payload: &Value) -> EmotionAnalysis {
        let obj = as_object(unwrap_envelope(payload));

        let scores: BTreeMap<String, f64> = obj
            .and_then(|o| {
                ["emotions", "scores", "probabilities"]
                    .iter()
                    .find_map(|key| o.get(*key).and_then(Value::as_object))
            })
            .map(|raw| {
                ratio_map(
                    raw.iter()
                        .filter_map(|(name, v)| {
                            let name = name.trim().to_lowercase();
                            (!name.is_empty()).then(|| (name, value_number(v).unwrap_or(0.0)))
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();

        let declared = text(obj, &["dominant_emotion", "dominantEmotion", "emotion", "label"]).to_lowercase();
        let dominant_emotion = if !declared.is_empty() {
            declared
        } else {
            strongest(&scores).unwrap_or_else(|| NEUTRAL_EMOTION.to_string())
        };

        let confidence = number(obj, &["confidence", "score"])
            .map(|c| ratio(Some(c)))
            .or_else(|| scores.get(&dominant_emotion).copied())
            .unwrap_or(0.0);

        EmotionAnalysis {
            confidence,
            scores,
            engagement: ratio(number(obj, &["engagement", "engagement_level", "engagementLevel", "attention"])),
            recommendation: text(obj, &["recommendation", "suggestion", "message"]),
            analyzed_at: timestamp(obj, &["timestamp", "analyzed_at", "analyzedAt", "created_at"]),
            dominant_emotion,
        }
    }
}

fn question(obj: &Object, index: usize) -> Question {
    let o = Some(obj);
    let options: Vec<String> = ["options", "choices", "answers"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(opt) => Some(text(Some(opt), &["text", "label", "value"])),
                    other => scalar_text(other),
                })
                .collect()
        })
        .unwrap_or_default();

    let correct_option = ["correctOption", "correct_option", "correctIndex", "answerIndex", "correctAnswer", "answer"]
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(|raw| match raw {
            Value::String(s) => options
                .iter()
                .position(|opt| opt.eq_ignore_ascii_case(s.trim()))
                .or_else(|| s.trim().parse::<usize>().ok()),
            other => other.as_u64().map(|n| n as usize),
        })
        .filter(|i| *i < options.len());

    Question {
        id: id_or_position(o, "question", index),
        prompt: text(o, &["question", "prompt", "text", "title"]),
        options,
        correct_option,
        selected_option: None,
        explanation: text(o, &["explanation", "rationale"]),
    }
}

/// Strip one `{ "data": ... }` envelope
fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner @ (Value::Object(_) | Value::Array(_))) => inner,
        _ => value,
    }
}

fn as_object(value: &Value) -> Option<&Object> {
    value.as_object()
}

/// Object entries of a list payload: a bare array, or the first array found
/// under `keys`, `items` or `results`. Non-object entries are skipped.
fn list_items<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Object> {
    let value = unwrap_envelope(value);
    let array = match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => keys
            .iter()
            .chain(["items", "results"].iter())
            .find_map(|key| obj.get(*key).and_then(Value::as_array)),
        _ => None,
    };
    array
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First string-like value under `keys`, or empty
fn text(obj: Option<&Object>, keys: &[&str]) -> String {
    obj.and_then(|o| {
        keys.iter()
            .filter_map(|key| o.get(*key))
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .find(|s| !s.is_empty())
    })
    .unwrap_or_default()
}

fn id_or_position(obj: Option<&Object>, kind: &str, index: usize) -> String {
    let id = text(obj, ID_KEYS);
    if id.is_empty() {
        format!("{}-{}", kind, index + 1)
    } else {
        id
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn number(obj: Option<&Object>, keys: &[&str]) -> Option<f64> {
    obj.and_then(|o| keys.iter().filter_map(|key| o.get(*key)).find_map(value_number))
}

fn to_u32(n: f64) -> u32 {
    n.max(0.0).min(u32::MAX as f64) as u32
}

/// Explicit count, else the length of an embedded list
fn count(obj: Option<&Object>, keys: &[&str], list_key: &str) -> u32 {
    number(obj, keys).map(to_u32).unwrap_or_else(|| {
        obj.and_then(|o| o.get(list_key))
            .and_then(Value::as_array)
            .map(|items| items.len() as u32)
            .unwrap_or(0)
    })
}

fn boolean(obj: Option<&Object>, keys: &[&str]) -> bool {
    obj.and_then(|o| keys.iter().find_map(|key| o.get(*key)))
        .map(|v| match v {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            _ => false,
        })
        .unwrap_or(false)
}

/// 0.0-1.0; values in (1, 100] are read as percentages
fn ratio(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v > 1.0 && v <= 100.0 => v / 100.0,
        Some(v) => v.clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Scale a score map to 0.0-1.0. The whole map is read as percentages as
/// soon as one entry exceeds 1.
fn ratio_map(raw: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let divisor = if raw.values().any(|v| *v > 1.0) { 100.0 } else { 1.0 };
    raw.into_iter()
        .map(|(name, v)| (name, (v / divisor).clamp(0.0, 1.0)))
        .collect()
}

/// 0-100, reading the input on the same scale as [`ratio`]
fn percent(value: Option<f64>) -> u8 {
    (ratio(value) * 100.0).round() as u8
}

fn strongest(scores: &BTreeMap<String, f64>) -> Option<String> {
    scores
        .iter()
        .fold(None::<(&String, f64)>, |best, (name, score)| match best {
            Some((_, top)) if top >= *score => best,
            _ => Some((name, *score)),
        })
        .map(|(name, _)| name.clone())
}

fn timestamp(obj: Option<&Object>, keys: &[&str]) -> Option<DateTime<Utc>> {
    let raw = text(obj, keys);
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
