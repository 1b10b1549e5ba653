use serde::{Deserialize, Serialize};

/// One element of a question's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Token {
    /// Literal transcript text shown as-is.
    Text { value: String },
    /// A fill-in slot bound to `blanks[index]`.
    Blank { index: usize },
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        Token::Text {
            value: value.into(),
        }
    }

    pub fn blank(index: usize) -> Self {
        Token::Blank { index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_sec: Option<u32>,
    pub tokens: Vec<Token>,
    pub blanks: Vec<String>,
}

impl Question {
    /// Number of fill-in slots.
    pub fn blank_count(&self) -> usize {
        self.blanks.len()
    }

    /// Returns the first placeholder index that does not point into `blanks`.
    pub fn validate(&self) -> Result<(), usize> {
        match self.tokens.iter().find_map(|token| match token {
            Token::Blank { index } if *index >= self.blanks.len() => Some(*index),
            _ => None,
        }) {
            Some(index) => Err(index),
            None => Ok(()),
        }
    }
}

/// Author input for creating or replacing a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub title: String,
    pub transcript: String,
    pub audio_url: String,
    pub time_limit_sec: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: "q1".to_string(),
            title: "Sample".to_string(),
            audio_url: "https://example.com/a.mp3".to_string(),
            time_limit_sec: Some(30),
            tokens: vec![Token::text("Go to "), Token::blank(0), Token::text(".")],
            blanks: vec!["Paris".to_string()],
        }
    }

    #[test]
    fn test_validate_accepts_in_range_placeholders() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_dangling_placeholder() {
        let mut question = sample();
        question.tokens.push(Token::blank(3));
        assert_eq!(question.validate(), Err(3));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["audioUrl"], "https://example.com/a.mp3");
        assert_eq!(json["timeLimitSec"], 30);
        assert_eq!(json["tokens"][0]["type"], "text");
        assert_eq!(json["tokens"][1]["type"], "blank");
        assert_eq!(json["tokens"][1]["index"], 0);
    }

    #[test]
    fn test_untimed_question_omits_time_limit() {
        let mut question = sample();
        question.time_limit_sec = None;
        let json = serde_json::to_string(&question).unwrap();
        assert!(!json.contains("timeLimitSec"));

        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time_limit_sec, None);
    }
}
