use std::{sync::mpsc::Sender, thread, time::Duration};

use log::{info, warn};

use crate::{RdeCoachError, session::RdeSession};

use super::{CoachingOutput, CoachingRecord, SessionInfo, TelemetryInput, producer::TickProducer};

/// Replay loop: runs every tick of `producer` through an [`RdeSession`] and broadcasts
/// the resulting prompts.
///
/// A fresh session is created at every session start record; ticks seen before the first
/// one go to a session built from `default_session`. Returns the number of ticks
/// processed once the producer is exhausted.
pub fn collect_prompts(
    mut producer: impl TickProducer,
    default_session: SessionInfo,
    prompt_sender: Sender<CoachingOutput>,
    prompt_writer_sender: Option<Sender<CoachingOutput>>,
    interval: Option<Duration>,
) -> Result<usize, RdeCoachError> {
    producer.start()?;

    let mut session: Option<RdeSession> = None;
    let mut processed = 0;

    while let Some(input) = producer.next_input()? {
        let output = match input {
            TelemetryInput::SessionStart(info) => {
                let info = info.sanitized();
                info!(
                    "Starting RDE session, expecting {:.1}km",
                    info.expected_distance_km
                );
                session = Some(RdeSession::new(info));
                CoachingOutput::SessionStart(info)
            }
            TelemetryInput::Tick(tick) => {
                let session = session.get_or_insert_with(|| {
                    warn!("Tick received before a session start, using the default session");
                    RdeSession::new(default_session)
                });
                let prompt = session.process(&tick);
                processed += 1;
                CoachingOutput::Prompt(Box::new(CoachingRecord {
                    timestamp_ms: tick.timestamp_ms,
                    prompt,
                    progress: session.snapshot(),
                }))
            }
        };

        if let Some(ref writer_sender) = prompt_writer_sender {
            writer_sender.send(output.clone())?;
        }
        prompt_sender.send(output)?;

        if let Some(interval) = interval {
            thread::sleep(interval);
        }
    }

    info!("Tick stream exhausted after {} ticks", processed);
    Ok(processed)
}
