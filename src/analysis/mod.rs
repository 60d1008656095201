pub mod constraints;
pub mod progress_tracker;
pub mod speed_accumulator;
pub mod trajectory_analyser;

use serde::{Deserialize, Serialize};

pub use constraints::{
    ConstraintInputs, ConstraintKind, ConstraintVerdict, ConstraintVerdicts, Constraints,
};
pub use progress_tracker::ProgressTracker;
pub use speed_accumulator::SpeedAccumulator;
pub use trajectory_analyser::TrajectoryAnalyser;

/// Speed (km/h) at which driving stops being urban
pub const URBAN_SPEED_LIMIT_KMH: f64 = 60.0;
/// Speed (km/h) at which driving becomes motorway
pub const MOTORWAY_SPEED_THRESHOLD_KMH: f64 = 90.0;
/// Upper end of the speed band the driver is steered into for motorway driving
pub const MOTORWAY_TARGET_MAX_KMH: f64 = 145.0;

/// Maximum duration of an RDE test (minutes)
pub const MAX_TEST_DURATION_MIN: f64 = 120.0;
/// Minimum duration of an RDE test (minutes)
pub const MIN_TEST_DURATION_MIN: f64 = 90.0;

pub(crate) const MINUTES_PER_HOUR: f64 = 60.0;

/// The three driving regimes of an RDE test.
///
/// The regime is derived from the instantaneous speed only, see [`DrivingMode::from_speed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrivingMode {
    Urban,
    Rural,
    Motorway,
}

impl DrivingMode {
    /// All modes, in the order used when reporting sufficiency.
    pub const ALL: [DrivingMode; 3] = [
        DrivingMode::Motorway,
        DrivingMode::Rural,
        DrivingMode::Urban,
    ];

    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh < URBAN_SPEED_LIMIT_KMH {
            DrivingMode::Urban
        } else if speed_kmh < MOTORWAY_SPEED_THRESHOLD_KMH {
            DrivingMode::Rural
        } else {
            DrivingMode::Motorway
        }
    }

    /// Regulatory ceiling of the share of the total distance driven in this mode
    pub fn max_proportion(&self) -> f64 {
        match self {
            DrivingMode::Urban => 0.44,
            DrivingMode::Rural => 0.43,
            DrivingMode::Motorway => 0.43,
        }
    }

    /// Regulatory minimum share of the total distance driven in this mode
    pub fn min_proportion(&self) -> f64 {
        match self {
            DrivingMode::Urban => 0.23,
            DrivingMode::Rural => 0.18,
            DrivingMode::Motorway => 0.18,
        }
    }

    /// Speed band (km/h) the driver is steered into when this mode is desired.
    /// Both ends count as inside the band.
    pub fn target_speed_band(&self) -> (f64, f64) {
        match self {
            DrivingMode::Urban => (0.0, URBAN_SPEED_LIMIT_KMH),
            DrivingMode::Rural => (URBAN_SPEED_LIMIT_KMH, MOTORWAY_SPEED_THRESHOLD_KMH),
            DrivingMode::Motorway => (MOTORWAY_SPEED_THRESHOLD_KMH, MOTORWAY_TARGET_MAX_KMH),
        }
    }

    /// Average speed assumed when estimating how long a mode still has to be driven
    pub fn nominal_speed_kmh(&self) -> f64 {
        match self {
            DrivingMode::Urban => 30.0,
            DrivingMode::Rural => 75.0,
            DrivingMode::Motorway => 115.0,
        }
    }
}

impl std::fmt::Display for DrivingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrivingMode::Urban => write!(f, "urban"),
            DrivingMode::Rural => write!(f, "rural"),
            DrivingMode::Motorway => write!(f, "motorway"),
        }
    }
}
