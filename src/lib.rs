// Library interface for rde-coach
// The replay binary and the integration tests drive the engine through it

pub mod analysis;
pub mod config;
pub mod errors;
pub mod prompt;
pub mod session;
pub mod telemetry;
pub mod writer;

// Re-export commonly used types
pub use analysis::{ConstraintKind, Constraints, DrivingMode, TrajectoryAnalyser};
pub use config::AppConfig;
pub use errors::RdeCoachError;
pub use prompt::{Emphasis, PromptAnnouncer, PromptOutput, PromptType};
pub use session::RdeSession;
pub use telemetry::{CoachingOutput, SessionInfo, TelemetryInput, TelemetryTick};
