use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    ShortText,
    LongText,
    MultipleChoice,
    Checkbox,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortText => "short_text",
            QuestionType::LongText => "long_text",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Checkbox => "checkbox",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "short_text" | "text" => Some(QuestionType::ShortText),
            "long_text" | "paragraph" => Some(QuestionType::LongText),
            "multiple_choice" | "choice" => Some(QuestionType::MultipleChoice),
            "checkbox" => Some(QuestionType::Checkbox),
            _ => None,
        }
    }

    /// Choice questions carry an option list; text questions never do.
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::Checkbox)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestionEdit {
    pub title: Option<String>,
    pub question_type: Option<QuestionType>,
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}
