// Error types for rde-coach

use crate::telemetry::CoachingOutput;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum RdeCoachError {
    // Errors while reading recorded validator ticks
    #[snafu(display("Unable to open tick file"))]
    TickFileError { source: io::Error },
    #[snafu(display("Invalid tick file: {path}"))]
    InvalidTickFile { path: String },
    #[snafu(display("Tick producer error: {description}"))]
    TickSourceError { description: String },

    // Errors while broadcasting prompts
    #[snafu(display("Error broadcasting coaching prompt"))]
    PromptBroadcastError {
        source: Box<SendError<CoachingOutput>>,
    },

    // Errors for the prompt writer
    #[snafu(display("Error writing prompt file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing prompt record"))]
    PromptSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}

impl From<SendError<CoachingOutput>> for RdeCoachError {
    fn from(value: SendError<CoachingOutput>) -> Self {
        RdeCoachError::PromptBroadcastError {
            source: Box::new(value),
        }
    }
}
