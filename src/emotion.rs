//! Keyword-based emotion detection.
//!
//! Classifies text into one of five fixed emotions by checking which trigger
//! words from a static lexicon appear in it. Scores are the share of matched
//! keywords per emotion; if nothing matches every emotion gets the neutral score.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Score given to every emotion when no keyword matches.
pub const NEUTRAL_SCORE: f64 = 0.2;

/// Status carried by successful predictions.
pub const STATUS_OK: u16 = 200;

/// Status carried by rejected input.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// The five emotion categories, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Sadness,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Sadness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
        }
    }

    /// Trigger words for this emotion.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Anger => ANGER_KEYWORDS,
            Emotion::Disgust => DISGUST_KEYWORDS,
            Emotion::Fear => FEAR_KEYWORDS,
            Emotion::Joy => JOY_KEYWORDS,
            Emotion::Sadness => SADNESS_KEYWORDS,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Lowercase trigger words per emotion, matched as substrings
static ANGER_KEYWORDS: &[&str] = &["angry", "furious", "rage", "annoyed", "irritated", "mad"];
static DISGUST_KEYWORDS: &[&str] = &["disgust", "gross", "nasty", "repulsed", "revolting", "yuck"];
static FEAR_KEYWORDS: &[&str] = &["afraid", "scared", "terrified", "anxious", "worried", "fear"];
static JOY_KEYWORDS: &[&str] = &["happy", "joy", "glad", "delighted", "excited", "love"];
static SADNESS_KEYWORDS: &[&str] = &["sad", "down", "depressed", "unhappy", "heartbroken", "cry"];

/// Per-emotion scores. Always holds exactly the five canonical emotions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct EmotionScores {
    pub anger: f64,
    pub disgust: f64,
    pub fear: f64,
    pub joy: f64,
    pub sadness: f64,
}

impl EmotionScores {
    /// Builds scores by evaluating `f` once per emotion in canonical order.
    pub fn from_fn(mut f: impl FnMut(Emotion) -> f64) -> Self {
        Self {
            anger: f(Emotion::Anger),
            disgust: f(Emotion::Disgust),
            fear: f(Emotion::Fear),
            joy: f(Emotion::Joy),
            sadness: f(Emotion::Sadness),
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::from_fn(|_| value)
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Anger => self.anger,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Joy => self.joy,
            Emotion::Sadness => self.sadness,
        }
    }

    /// Scores paired with their emotion, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, s)| s).sum()
    }
}

/// Rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    /// Input was absent, null, or only whitespace.
    #[error("Input text is empty.")]
    InputEmpty,

    /// Input was present but not a string.
    #[error("Input must be a string.")]
    InputNotString,
}

impl PredictError {
    pub fn status(&self) -> u16 {
        STATUS_BAD_REQUEST
    }
}

/// Successful prediction: the scores, the winning emotion and status 200.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmotionReport {
    #[serde(flatten)]
    pub scores: EmotionScores,
    pub dominant_emotion: Emotion,
    pub status: u16,
}

/// Error record returned for rejected input.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorReport {
    pub error: String,
    pub status: u16,
}

impl From<PredictError> for ErrorReport {
    fn from(err: PredictError) -> Self {
        Self {
            error: err.to_string(),
            status: err.status(),
        }
    }
}

/// Either shape the predictor can return. Serializes without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Success(EmotionReport),
    Failure(ErrorReport),
}

impl Prediction {
    pub fn status(&self) -> u16 {
        match self {
            Prediction::Success(report) => report.status,
            Prediction::Failure(report) => report.status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Prediction::Success(_))
    }
}

impl From<Result<EmotionReport, PredictError>> for Prediction {
    fn from(result: Result<EmotionReport, PredictError>) -> Self {
        match result {
            Ok(report) => Prediction::Success(report),
            Err(err) => Prediction::Failure(err.into()),
        }
    }
}

/// Predicts the emotion of an arbitrary, possibly absent, input value.
///
/// `None` and JSON `null` count as empty input; any non-string value is rejected
/// with [`PredictError::InputNotString`]. Never fails past this boundary: every
/// input yields either a success or an error record.
pub fn emotion_predictor(input: Option<&Value>) -> Prediction {
    let result = match input {
        None | Some(Value::Null) => Err(PredictError::InputEmpty),
        Some(Value::String(text)) => predict_text(text),
        Some(_) => Err(PredictError::InputNotString),
    };
    result.into()
}

/// Predicts the emotion of `text`, rejecting blank strings.
pub fn predict_text(text: &str) -> Result<EmotionReport, PredictError> {
    if text.trim().is_empty() {
        return Err(PredictError::InputEmpty);
    }

    let scores = score_text(text);
    Ok(EmotionReport {
        dominant_emotion: dominant(&scores),
        scores,
        status: STATUS_OK,
    })
}

/// Scores `text` against the lexicon.
///
/// Each keyword found anywhere in the lowercased text counts once, however
/// often it occurs. Counts are normalized by their total and rounded to four
/// decimals.
pub fn score_text(text: &str) -> EmotionScores {
    let lowercase_text = text.to_lowercase();
    let counts = EmotionScores::from_fn(|emotion| {
        emotion
            .keywords()
            .iter()
            .filter(|kw| lowercase_text.contains(*kw))
            .count() as f64
    });

    let total = counts.total();
    tracing::debug!(
        anger = counts.anger,
        disgust = counts.disgust,
        fear = counts.fear,
        joy = counts.joy,
        sadness = counts.sadness,
        "keyword matches counted"
    );

    if total > 0.0 {
        EmotionScores::from_fn(|emotion| round4(counts.get(emotion) / total))
    } else {
        tracing::debug!("no keywords matched, using neutral scores");
        EmotionScores::uniform(NEUTRAL_SCORE)
    }
}

/// Emotion with the highest score. Ties go to the earliest in canonical order.
pub fn dominant(scores: &EmotionScores) -> Emotion {
    Emotion::ALL.into_iter().fold(Emotion::Anger, |best, emotion| {
        if scores.get(emotion) > scores.get(best) {
            emotion
        } else {
            best
        }
    })
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
