use std::path::Path;

use log::{error, info};

use crate::RdeCoachError;

use super::{SessionInfo, TelemetryInput, TelemetryTick};

/// Source of validator output.
///
/// A live implementation would wrap the upstream validator; [`FileTickProducer`] replays
/// a recorded session.
pub trait TickProducer {
    /// Prepare the producer, before the first call to [`TickProducer::next_input`].
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened.
    fn start(&mut self) -> Result<(), RdeCoachError>;

    /// Next record of the stream, `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the producer was not started or the source failed.
    fn next_input(&mut self) -> Result<Option<TelemetryInput>, RdeCoachError>;
}

/// Replays validator records held in memory, usually loaded from a JSON Lines file.
///
/// This enables offline coaching of recorded tests and reproducible scenarios for the
/// session logic.
#[derive(Debug, Default)]
pub struct FileTickProducer {
    cur_input: usize,
    inputs: Vec<TelemetryInput>,
    started: bool,
}

impl FileTickProducer {
    pub fn from_inputs(inputs: Vec<TelemetryInput>) -> Self {
        Self {
            cur_input: 0,
            inputs,
            started: false,
        }
    }

    /// One session made of `ticks`.
    pub fn from_ticks(info: SessionInfo, ticks: Vec<TelemetryTick>) -> Self {
        let inputs = std::iter::once(TelemetryInput::SessionStart(info))
            .chain(ticks.into_iter().map(TelemetryInput::Tick))
            .collect();
        Self::from_inputs(inputs)
    }

    /// Load the records of a JSON Lines file, one `TelemetryInput` per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or a line is not a
    /// valid record.
    pub fn from_file(file: &Path) -> Result<Self, RdeCoachError> {
        if !file.exists() {
            return Err(RdeCoachError::InvalidTickFile {
                path: format!("{:?}", file),
            });
        }

        let inputs = serde_jsonlines::json_lines(file)
            .map_err(|e| RdeCoachError::TickFileError { source: e })?
            .collect::<Result<Vec<TelemetryInput>, std::io::Error>>()
            .map_err(|e| {
                error!("Could not parse tick file {:?}: {}", file, e);
                RdeCoachError::InvalidTickFile {
                    path: format!("{:?}", file),
                }
            })?;

        info!("Loaded {} records from {:?}", inputs.len(), file);
        Ok(Self::from_inputs(inputs))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl TickProducer for FileTickProducer {
    fn start(&mut self) -> Result<(), RdeCoachError> {
        self.cur_input = 0;
        self.started = true;
        Ok(())
    }

    fn next_input(&mut self) -> Result<Option<TelemetryInput>, RdeCoachError> {
        if !self.started {
            return Err(RdeCoachError::TickSourceError {
                description: "Producer not started".to_string(),
            });
        }

        let input = self.inputs.get(self.cur_input).cloned();
        if input.is_some() {
            self.cur_input += 1;
        }
        Ok(input)
    }
}
