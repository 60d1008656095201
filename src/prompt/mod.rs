pub mod announcer;
pub mod generator;
pub mod selector;
pub mod validity;

use serde::{Deserialize, Serialize};

use crate::analysis::DrivingMode;

pub use announcer::PromptAnnouncer;
pub use generator::generate_prompt;
pub use selector::{PromptSelector, Selection};
pub use validity::ValidityReason;

/// The fixed vocabulary of coaching instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptType {
    None,
    Sufficiency,
    DrivingStyle,
    AverageUrbanSpeed,
    StoppingPercentage,
    HighSpeedPercentage,
    VeryHighSpeedPercentage,
    InvalidRdeReason,
}

/// How the prompt should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emphasis {
    Neutral,
    Positive,
    Negative,
}

/// Numbers behind a prompt, for collaborators that render their own text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptParameters {
    pub speed_change_kmh: Option<f64>,
    pub duration_minutes: Option<f64>,
    /// Value of the constraint the prompt is about
    pub magnitude: Option<f64>,
    pub sufficient_mode: Option<DrivingMode>,
    pub reason_code: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOutput {
    pub prompt_type: PromptType,
    pub text: String,
    pub analysis_text: String,
    pub emphasis: Emphasis,
    pub parameters: PromptParameters,
}

impl PromptOutput {
    /// Two prompts with the same identity read the same to the driver.
    pub fn identity(&self) -> (PromptType, &str) {
        (self.prompt_type, &self.text)
    }
}

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to `decimals` places and print with trailing zeros dropped, keeping at least one
/// decimal: `45.0`, `56.44`, `2.6`.
pub fn format_rounded(value: f64, decimals: i32) -> String {
    let rounded = round_to(value, decimals);
    // avoid printing "-0.0"
    let rounded = if rounded == 0. { 0. } else { rounded };

    let text = format!("{:.*}", decimals.max(1) as usize, rounded);
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rounded() {
        assert_eq!(format_rounded(45., 2), "45.0");
        assert_eq!(format_rounded(56.44, 2), "56.44");
        assert_eq!(format_rounded(40. - 37.4, 2), "2.6");
        assert_eq!(format_rounded(16.4571, 2), "16.46");
        assert_eq!(format_rounded(4.96, 1), "5.0");
        assert_eq!(format_rounded(-0.001, 2), "0.0");
        assert_eq!(format_rounded(-19.92, 2), "-19.92");
        assert_eq!(format_rounded(10.000000000000002, 0), "10.0");
        assert_eq!(format_rounded(2.49, 0), "2.0");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.0249, 2), 0.02);
        assert_eq!(round_to(-0.1143, 2), -0.11);
        assert_eq!(round_to(37.46, 0), 37.);
    }
}
