//! Keyword-based emotion detection with an HTTP front end.

pub mod api;
pub mod config;
pub mod emotion;

pub use emotion::{
    emotion_predictor, predict_text, Emotion, EmotionReport, EmotionScores, ErrorReport,
    PredictError, Prediction,
};
