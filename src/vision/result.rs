//! Turn the classifier's log-probabilities into a label and a confidence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of classes the classifier emits.
pub const CLASS_COUNT: usize = 2;

/// Output class. Index 0 is `Cat`, index 1 is `Dog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Cat),
            1 => Some(Label::Dog),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "cat",
            Label::Dog => "dog",
        }
    }
}

/// Response body for one classified image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

/// The inference output could not be interpreted.
#[derive(Debug, Error, PartialEq)]
pub enum OutputError {
    #[error("expected {expected} log-probabilities, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("non-finite log-probability {value} at index {index}")]
    NonFinite { index: usize, value: f32 },
}

/// Convert log-probabilities `[cat, dog]` into a [`ClassificationResult`].
///
/// Probabilities are `exp(x)`. The larger one wins; on an exact tie the lower
/// index (`cat`) wins. Any NaN or infinite entry is rejected rather than
/// guessed at. Confidence is clamped to `1.0` to absorb rounding from a
/// log-softmax that lands a hair above zero.
pub fn build_result(output: &[f32]) -> Result<ClassificationResult, OutputError> {
    if output.len() != CLASS_COUNT {
        return Err(OutputError::Length {
            expected: CLASS_COUNT,
            actual: output.len(),
        });
    }
    if let Some((index, value)) = output.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OutputError::NonFinite { index, value: *value });
    }

    let probs: Vec<f32> = output.iter().map(|v| v.exp()).collect();
    if let Some((index, _)) = probs.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        // exp overflowed: the input was far outside log-probability range.
        return Err(OutputError::NonFinite { index, value: output[index] });
    }

    let mut best = 0;
    for (i, p) in probs.iter().enumerate().skip(1) {
        if *p > probs[best] {
            best = i;
        }
    }

    let label = Label::from_index(best).ok_or(OutputError::Length {
        expected: CLASS_COUNT,
        actual: output.len(),
    })?;
    Ok(ClassificationResult {
        label,
        confidence: probs[best].min(1.0),
    })
}
