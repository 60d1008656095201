use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::mpsc::Receiver,
};

use log::error;

use crate::{RdeCoachError, telemetry::CoachingOutput};

/// Write every record received on `prompt_receiver` to `file` as JSON Lines, until the
/// sending side hangs up. Returns the number of records written.
pub fn write_prompts(
    file: &Path,
    prompt_receiver: Receiver<CoachingOutput>,
) -> Result<usize, RdeCoachError> {
    let prompt_file = File::create(file).map_err(|e| RdeCoachError::WriterError { source: e })?;
    let mut prompt_file_writer = BufWriter::new(prompt_file);
    let mut written = 0;
    for output in &prompt_receiver {
        let line = serde_json::to_string(&output)
            .map_err(|e| RdeCoachError::PromptSerializeError { source: e })?;
        // a failed line is reported and skipped, the replay keeps going
        match writeln!(prompt_file_writer, "{}", line) {
            Ok(()) => written += 1,
            Err(e) => error!("Error while writing prompt record to output file: {}", e),
        }
    }
    prompt_file_writer
        .flush()
        .map_err(|e| RdeCoachError::WriterError { source: e })?;
    Ok(written)
}

/// Combine what the collector and the optional writer thread returned.
///
/// A writer that fails hangs up its channel, and the collector then fails to broadcast,
/// so the writer's error is the one reported.
pub fn replay_outcome(
    collected: Result<usize, RdeCoachError>,
    written: Option<Result<usize, RdeCoachError>>,
) -> Result<(usize, Option<usize>), RdeCoachError> {
    let written = written.transpose()?;
    Ok((collected?, written))
}
