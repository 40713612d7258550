//! Confidence gate shared by the orchestrators.

use crate::types::Rejection;

/// Threshold below which a classification is not acted upon.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// A confidence/boolean check that decides whether a workflow continues.
///
/// Confidence is taken as returned by the model; it is not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    threshold: f64,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl Gate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pass when `applicable` holds and `confidence >= threshold`.
    ///
    /// A NaN confidence never passes.
    pub fn check(&self, applicable: bool, confidence: f64) -> Result<(), Rejection> {
        if !applicable {
            return Err(Rejection::NotApplicable { confidence });
        }
        self.check_confidence(confidence)
    }

    /// Confidence-only variant used by the router.
    pub fn check_confidence(&self, confidence: f64) -> Result<(), Rejection> {
        if confidence >= self.threshold {
            Ok(())
        } else {
            Err(Rejection::LowConfidence {
                confidence,
                threshold: self.threshold,
            })
        }
    }
}
