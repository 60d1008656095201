use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
    time::Duration,
};

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use rde_coach::{
    AppConfig, CoachingOutput, PromptAnnouncer, RdeCoachError, SessionInfo,
    telemetry::{FileTickProducer, collect_prompts},
    writer::{replay_outcome, write_prompts},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Coach a recorded test from a JSON Lines file of validator ticks
    Replay {
        #[arg(short, long)]
        input: PathBuf,

        /// Write every prompt record to this JSON Lines file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pause between ticks, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Expected test distance in km, for sessions that do not announce one
        #[arg(long)]
        expected_distance: Option<f64>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Init,
}

fn replay(
    input: &Path,
    output: Option<PathBuf>,
    interval_ms: Option<u64>,
    expected_distance: Option<f64>,
) -> Result<(), RdeCoachError> {
    let app_config = AppConfig::from_local_file()
        .unwrap_or_else(|e| {
            warn!("Ignoring config file: {}", e);
            None
        })
        .unwrap_or_default();

    let default_session = SessionInfo {
        expected_distance_km: expected_distance.unwrap_or(app_config.expected_distance_km),
    }
    .sanitized();
    let interval = Some(interval_ms.unwrap_or(app_config.replay_interval_ms))
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    let producer = FileTickProducer::from_file(input)?;
    let (prompt_tx, prompt_rx) = mpsc::channel::<CoachingOutput>();

    // if we need to write an output file the collector sends to both the console and
    // the writer channels
    let (writer_tx, writer_handle) = match output {
        Some(output_file) => {
            let (writer_tx, writer_rx) = mpsc::channel::<CoachingOutput>();
            let handle = thread::spawn(move || write_prompts(&output_file, writer_rx));
            (Some(writer_tx), Some(handle))
        }
        None => (None, None),
    };

    let collector_handle = thread::spawn(move || {
        collect_prompts(producer, default_session, prompt_tx, writer_tx, interval)
    });

    let mut announcer = PromptAnnouncer::new();
    for output in &prompt_rx {
        match output {
            CoachingOutput::SessionStart(info) => {
                announcer.reset();
                println!(
                    "New RDE session, expected distance {:.1}km",
                    info.expected_distance_km
                );
            }
            CoachingOutput::Prompt(record) => {
                if app_config.announce_only_changes && !announcer.announce(&record.prompt) {
                    continue;
                }
                println!(
                    "[{:>7.2} min] {:?}: {} {}",
                    record.progress.total_time_min,
                    record.prompt.emphasis,
                    record.prompt.text,
                    record.prompt.analysis_text
                );
            }
        }
    }

    let collected = collector_handle
        .join()
        .map_err(|_| RdeCoachError::TickSourceError {
            description: "Prompt collector panicked".to_string(),
        })?;
    let written = writer_handle
        .map(|handle| {
            handle.join().map_err(|_| RdeCoachError::TickSourceError {
                description: "Prompt writer panicked".to_string(),
            })
        })
        .transpose()?;

    let (processed, written) = replay_outcome(collected, written)?;
    info!("Processed {} ticks", processed);
    if let Some(written) = written {
        info!("Wrote {} prompt records", written);
    }
    Ok(())
}

fn config(action: &ConfigAction) -> Result<(), RdeCoachError> {
    match action {
        ConfigAction::Show => {
            let path = AppConfig::default_path()?;
            let app_config = AppConfig::from_local_file()?.unwrap_or_else(|| {
                info!("No config file at {:?}, showing defaults", path);
                AppConfig::default()
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&app_config)
                    .map_err(|e| RdeCoachError::ConfigSerializeError { source: e })?
            );
        }
        ConfigAction::Init => {
            let app_config = AppConfig::from_local_file()?.unwrap_or_default();
            let path = app_config.save()?;
            println!("Config written to {:?}", path);
        }
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match &cli.command {
        Commands::Replay {
            input,
            output,
            interval_ms,
            expected_distance,
        } => replay(input, output.clone(), *interval_ms, *expected_distance),
        Commands::Config { action } => config(action),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
