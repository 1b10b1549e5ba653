//! Transcript tokenizer.
//!
//! Authors mark answers in a transcript with square brackets:
//! `"The hotel has many [amenities]."` becomes a literal token, a
//! placeholder for blank 0 and another literal token, with
//! `"amenities"` recorded as the expected answer.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Token;

static BLANK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("blank span pattern is valid"));

/// Result of splitting a transcript into tokens and expected answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTranscript {
    pub tokens: Vec<Token>,
    pub blanks: Vec<String>,
}

/// Split `transcript` into literal and placeholder tokens.
///
/// Total over all inputs: an unmatched `[` or `]` is kept as literal text.
pub fn parse(transcript: &str) -> ParsedTranscript {
    let mut parsed = ParsedTranscript::default();
    let mut cursor = 0;

    for captures in BLANK_SPAN.captures_iter(transcript) {
        let (Some(span), Some(answer)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        if span.start() > cursor {
            parsed
                .tokens
                .push(Token::text(&transcript[cursor..span.start()]));
        }

        parsed.tokens.push(Token::blank(parsed.blanks.len()));
        parsed.blanks.push(answer.as_str().to_string());
        cursor = span.end();
    }

    if cursor < transcript.len() {
        parsed.tokens.push(Token::text(&transcript[cursor..]));
    }

    parsed
}

/// Rebuild an editable transcript, wrapping each blank's answer in brackets.
///
/// Placeholders pointing past `answers` render as empty brackets.
pub fn render(tokens: &[Token], answers: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text { value } => out.push_str(value),
            Token::Blank { index } => {
                out.push('[');
                out.push_str(answers.get(*index).map(String::as_str).unwrap_or(""));
                out.push(']');
            }
        }
    }
    out
}
