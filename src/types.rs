use serde::{Deserialize, Serialize};
use std::fmt;

/// Output from a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput<T> {
    /// The structured output, validated against the stage schema.
    pub output: T,

    /// Raw reply text from the model.
    pub raw_response: String,

    /// Model that produced this output.
    pub model: String,
}

/// Why a workflow stopped without a result.
///
/// These are legitimate negative outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The classifier said the input is not something this workflow handles.
    NotApplicable { confidence: f64 },

    /// Confidence fell below the gate threshold.
    LowConfidence { confidence: f64, threshold: f64 },

    /// The router returned a discriminant no handler is registered for.
    UnsupportedRoute { request_type: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotApplicable { confidence } => {
                write!(f, "input not applicable (confidence {:.2})", confidence)
            }
            Rejection::LowConfidence {
                confidence,
                threshold,
            } => write!(
                f,
                "confidence {:.2} below threshold {:.2}",
                confidence, threshold
            ),
            Rejection::UnsupportedRoute { request_type } => {
                write!(f, "request type '{}' not supported", request_type)
            }
        }
    }
}

/// Result of a workflow run: either the final stage output or a rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// The final output, if the run completed.
    pub fn completed(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// The rejection, if the run stopped early.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Rejected(r) => Some(r),
        }
    }

    /// Collapse into "result or nothing".
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let done: Outcome<u32> = Outcome::Completed(7);
        assert!(done.is_completed());
        assert_eq!(done.completed(), Some(&7));
        assert!(done.rejection().is_none());
        assert_eq!(done.into_option(), Some(7));

        let stopped: Outcome<u32> = Outcome::Rejected(Rejection::UnsupportedRoute {
            request_type: "other".into(),
        });
        assert!(!stopped.is_completed());
        assert!(stopped.completed().is_none());
        assert!(stopped.rejection().is_some());
        assert_eq!(stopped.into_option(), None);
    }

    #[test]
    fn test_rejection_display() {
        let r = Rejection::LowConfidence {
            confidence: 0.45,
            threshold: 0.7,
        };
        assert_eq!(r.to_string(), "confidence 0.45 below threshold 0.70");
        let r = Rejection::UnsupportedRoute {
            request_type: "other".into(),
        };
        assert_eq!(r.to_string(), "request type 'other' not supported");
    }
}
