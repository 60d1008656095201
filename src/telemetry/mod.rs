pub(crate) mod collector;
pub(crate) mod producer;

pub use collector::collect_prompts;
pub use producer::{FileTickProducer, TickProducer};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{ConstraintKind, DrivingMode},
    prompt::PromptOutput,
};

/// Distance the driver is expected to cover when nothing else is known (km)
pub const DEFAULT_EXPECTED_DISTANCE_KM: f64 = 83.0;

/// One record of the RDE validator output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryTick {
    /// Wall-clock time of the record, milliseconds
    pub timestamp_ms: i64,
    /// Cumulative distance driven below 60 km/h, meters
    pub urban_distance_m: f64,
    /// Cumulative distance driven between 60 and 90 km/h, meters
    pub rural_distance_m: f64,
    /// Cumulative distance driven at 90 km/h or more, meters
    pub motorway_distance_m: f64,
    /// Time spent in urban driving, stops included, seconds
    pub elapsed_urban_s: i64,
    /// Time since the start of the test, minutes
    pub total_time_min: f64,
    pub current_speed_kmh: f64,
    pub avg_urban_speed_kmh: f64,
    pub avg_rural_speed_kmh: f64,
    pub avg_motorway_speed_kmh: f64,
    /// 1.0 while the validator considers the test valid
    pub is_valid_signal: f64,
    /// Reason code of the validator when the test is not valid
    pub not_rde_signal: f64,
}

impl TelemetryTick {
    /// Copy of the tick with negative or non-finite measurements replaced by zero.
    ///
    /// Such values are a contract violation of the upstream validator and trip a debug
    /// assertion in debug builds. The validity signals are left untouched, they are
    /// decoded on their own.
    pub fn sanitized(&self) -> Self {
        Self {
            timestamp_ms: self.timestamp_ms,
            urban_distance_m: non_negative("urban_distance_m", self.urban_distance_m),
            rural_distance_m: non_negative("rural_distance_m", self.rural_distance_m),
            motorway_distance_m: non_negative("motorway_distance_m", self.motorway_distance_m),
            elapsed_urban_s: {
                debug_assert!(
                    self.elapsed_urban_s >= 0,
                    "elapsed_urban_s must not be negative, got {}",
                    self.elapsed_urban_s
                );
                self.elapsed_urban_s.max(0)
            },
            total_time_min: non_negative("total_time_min", self.total_time_min),
            current_speed_kmh: non_negative("current_speed_kmh", self.current_speed_kmh),
            avg_urban_speed_kmh: non_negative("avg_urban_speed_kmh", self.avg_urban_speed_kmh),
            avg_rural_speed_kmh: non_negative("avg_rural_speed_kmh", self.avg_rural_speed_kmh),
            avg_motorway_speed_kmh: non_negative(
                "avg_motorway_speed_kmh",
                self.avg_motorway_speed_kmh,
            ),
            is_valid_signal: self.is_valid_signal,
            not_rde_signal: self.not_rde_signal,
        }
    }

    /// Distance driven in all modes, km
    pub fn traveled_distance_km(&self) -> f64 {
        (self.urban_distance_m + self.rural_distance_m + self.motorway_distance_m) / 1000.
    }
}

fn non_negative(field: &str, value: f64) -> f64 {
    debug_assert!(
        value.is_finite() && value >= 0.,
        "{} must be a finite, non-negative number, got {}",
        field,
        value
    );
    if value.is_finite() && value >= 0. {
        value
    } else {
        0.
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub expected_distance_km: f64,
}

impl SessionInfo {
    /// Copy of the session info with an expected distance that can be divided by.
    ///
    /// The distance comes from tick files and the command line, so a zero, negative or
    /// non-finite value is reported and replaced by [`DEFAULT_EXPECTED_DISTANCE_KM`].
    pub fn sanitized(&self) -> Self {
        if self.expected_distance_km.is_finite() && self.expected_distance_km > 0. {
            return *self;
        }
        warn!(
            "Expected distance of {}km is not usable, using {:.1}km",
            self.expected_distance_km, DEFAULT_EXPECTED_DISTANCE_KM
        );
        Self::default()
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            expected_distance_km: DEFAULT_EXPECTED_DISTANCE_KM,
        }
    }
}

/// Records read from a tick file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TelemetryInput {
    SessionStart(SessionInfo),
    Tick(TelemetryTick),
}

/// Progress values a renderer needs to draw bars and needles next to the prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub expected_distance_km: f64,
    pub urban_proportion: f64,
    pub rural_proportion: f64,
    pub motorway_proportion: f64,
    pub current_speed_kmh: f64,
    pub total_time_min: f64,
    pub current_mode: DrivingMode,
    pub desired_mode: DrivingMode,
    /// Constraint that can no longer be satisfied, if any
    pub invalid: Option<ConstraintKind>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoachingRecord {
    pub timestamp_ms: i64,
    pub prompt: PromptOutput,
    pub progress: ProgressSnapshot,
}

/// Records produced by the prompt collector, and written to the prompt file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CoachingOutput {
    SessionStart(SessionInfo),
    Prompt(Box<CoachingRecord>),
}
