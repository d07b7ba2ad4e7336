//! Intent recognition for incoming utterances.
//!
//! The bot only needs a top-scoring intent and its confidence. Anything that
//! can produce that sits behind [`IntentRecognizer`]; the built-in
//! [`KeywordRecognizer`] is an ordered list of regex rules, first match wins.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IntentError;

/// Intents the bot knows how to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ClinicFind,
    ClinicSet,
    Greeting,
    None,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ClinicFind => "clinic_find",
            Self::ClinicSet => "clinic_set",
            Self::Greeting => "greeting",
            Self::None => "none",
        };
        write!(f, "{s}")
    }
}

/// The top-scoring intent for an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecognizedIntent {
    pub intent: Intent,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl RecognizedIntent {
    pub fn none() -> Self {
        Self {
            intent: Intent::None,
            score: 0.0,
        }
    }
}

/// Maps raw user text to an intent.
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    /// Recognizer name, for logs.
    fn name(&self) -> &str;

    async fn recognize(&self, text: &str) -> Result<RecognizedIntent, IntentError>;
}

/// A single intent rule with a compiled regex.
#[derive(Debug, Clone)]
pub struct IntentRule {
    /// Compiled regex for matching.
    pub regex: Regex,
    pub intent: Intent,
    /// Score reported when this rule matches.
    pub score: f64,
}

/// Regex-rule recognizer.
#[derive(Debug, Clone)]
pub struct KeywordRecognizer {
    rules: Vec<IntentRule>,
}

impl KeywordRecognizer {
    /// Create a recognizer with the default clinic rules.
    pub fn default_rules() -> Result<Self, IntentError> {
        let mut recognizer = Self::empty();
        // Set before find: "set my clinic" also mentions a clinic.
        recognizer.add_rule(
            r"(?i)\b(set|save|change|update)\b.*\b(clinic|doctor|provider)\b",
            Intent::ClinicSet,
            0.9,
        )?;
        recognizer.add_rule(
            r"(?i)\b(find|search|locate|show|nearest|closest|near)\b.*\b(clinics?|doctors?|providers?|urgent care)\b",
            Intent::ClinicFind,
            0.9,
        )?;
        recognizer.add_rule(
            r"(?i)\b(clinics?|doctors?|urgent care)\b.*\b(near|nearby|close)\b",
            Intent::ClinicFind,
            0.8,
        )?;
        // A bare mention is a weak signal only.
        recognizer.add_rule(r"(?i)\bclinics?\b", Intent::ClinicFind, 0.4)?;
        recognizer.add_rule(r"(?i)^\s*(hi|hello|hey|good (morning|afternoon|evening))\b", Intent::Greeting, 0.8)?;
        Ok(recognizer)
    }

    /// Create an empty recognizer (for testing).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Rules are tried in insertion order.
    pub fn add_rule(&mut self, pattern: &str, intent: Intent, score: f64) -> Result<(), IntentError> {
        self.rules.push(IntentRule {
            regex: Regex::new(pattern)?,
            intent,
            score: score.clamp(0.0, 1.0),
        });
        Ok(())
    }

    /// Evaluate `text` against the rules without going through the trait.
    pub fn evaluate(&self, text: &str) -> RecognizedIntent {
        for rule in &self.rules {
            if rule.regex.is_match(text) {
                debug!(intent = %rule.intent, score = rule.score, "Utterance matched intent rule");
                return RecognizedIntent {
                    intent: rule.intent,
                    score: rule.score,
                };
            }
        }
        RecognizedIntent::none()
    }
}

#[async_trait]
impl IntentRecognizer for KeywordRecognizer {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn recognize(&self, text: &str) -> Result<RecognizedIntent, IntentError> {
        Ok(self.evaluate(text))
    }
}
