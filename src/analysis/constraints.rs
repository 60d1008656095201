use serde::{Deserialize, Serialize};

use super::{DrivingMode, MAX_TEST_DURATION_MIN, MIN_TEST_DURATION_MIN, MINUTES_PER_HOUR};

/// Cumulative minutes above 100 km/h the motorway part of a test needs
pub const HIGH_SPEED_REQUIRED_MIN: f64 = 5.0;

/// Share of the maximum motorway time that may be driven above 145 km/h
const VERY_HIGH_SPEED_MAX_SHARE: f64 = 0.03;
/// Motorway share of a minimum-length test the very-high-speed warning tiers are measured against
const VERY_HIGH_SPEED_WARNING_MOTORWAY_SHARE: f64 = 0.29;
/// (lower share, upper share) of each warning tier; the lower share is the reported value
const VERY_HIGH_SPEED_WARNING_TIERS: [(f64, f64); 2] = [(0.025, 0.026), (0.015, 0.016)];

/// Stopping and average urban speed are not reliable before this many minutes
const SETTLING_TIME_MIN: f64 = 15.0;

const STOPPING_MIN_SHARE: f64 = 0.06;
const STOPPING_MAX_SHARE: f64 = 0.30;
/// Shares below/above which the driver is warned about stopping
const STOPPING_LOW_WARNING_SHARE: f64 = 0.08;
const STOPPING_HIGH_WARNING_SHARE: f64 = 0.28;

const AVERAGE_URBAN_SPEED_MIN_KMH: f64 = 15.0;
const AVERAGE_URBAN_SPEED_MAX_KMH: f64 = 40.0;
const AVERAGE_URBAN_SPEED_LOW_WARNING_KMH: f64 = 18.0;
const AVERAGE_URBAN_SPEED_HIGH_WARNING_KMH: f64 = 38.0;
/// Below this many minutes left an out-of-range average urban speed may be judged unrecoverable
const AVERAGE_URBAN_SPEED_CORRECTION_WINDOW_MIN: f64 = 20.0;

/// The four regulatory constraints the coach keeps an eye on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// At least five minutes above 100 km/h
    HighSpeedDuration,
    /// At most 3% of motorway time above 145 km/h
    VeryHighSpeedPercentage,
    /// Stopping between 6% and 30% of urban time
    StoppingPercentage,
    /// Average urban speed between 15 and 40 km/h
    AverageUrbanSpeed,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::HighSpeedDuration => write!(f, "High speed duration"),
            ConstraintKind::VeryHighSpeedPercentage => write!(f, "Very high speed percentage"),
            ConstraintKind::StoppingPercentage => write!(f, "Stopping percentage"),
            ConstraintKind::AverageUrbanSpeed => write!(f, "Average urban speed"),
        }
    }
}

/// Outcome of evaluating one constraint for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintVerdict {
    /// Nothing to report
    Satisfied,
    /// Something to tell the driver; the meaning of the value depends on the constraint
    Warn(f64),
    /// Can no longer be satisfied in the time left
    Invalid,
}

impl ConstraintVerdict {
    pub fn value(&self) -> Option<f64> {
        match self {
            ConstraintVerdict::Warn(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ConstraintVerdict::Invalid)
    }
}

/// Everything the constraint evaluation reads, gathered from the accumulator and tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintInputs {
    pub high_speed_min: f64,
    pub very_high_speed_min: f64,
    pub stopping_min: f64,
    pub elapsed_urban_min: f64,
    pub total_time_min: f64,
    pub average_urban_speed_kmh: f64,
    pub urban_proportion: f64,
    pub expected_distance_km: f64,
}

/// Corrective values for the four constraints, `None` meaning there is nothing to report.
///
/// A `None` does not tell whether the constraint is fine or lost for good: ask the
/// analyser with `check_invalid()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Minutes still to drive above 100 km/h, `Some(0.0)` once the requirement is met
    pub high_speed: Option<f64>,
    /// Warning tier (0.015 or 0.025) of the time spent above 145 km/h
    pub very_high_speed: Option<f64>,
    /// Signed distance of the stopping share to its nearest bound
    pub stopping: Option<f64>,
    /// Signed km/h distance of the average urban speed to its nearest bound
    pub average_urban_speed: Option<f64>,
}

impl Constraints {
    pub fn values(&self) -> [Option<f64>; 4] {
        [
            self.high_speed,
            self.very_high_speed,
            self.stopping,
            self.average_urban_speed,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintVerdicts {
    pub high_speed: ConstraintVerdict,
    pub very_high_speed: ConstraintVerdict,
    pub stopping: ConstraintVerdict,
    pub average_urban_speed: ConstraintVerdict,
}

impl ConstraintVerdicts {
    pub fn evaluate(inputs: &ConstraintInputs) -> Self {
        Self {
            high_speed: high_speed_duration(inputs.high_speed_min, inputs.total_time_min),
            very_high_speed: very_high_speed_percentage(inputs.very_high_speed_min),
            stopping: stopping_percentage(
                inputs.stopping_min,
                inputs.elapsed_urban_min,
                inputs.total_time_min,
            ),
            average_urban_speed: average_urban_speed(
                inputs.average_urban_speed_kmh,
                inputs.total_time_min,
                inputs.urban_proportion,
                inputs.expected_distance_km,
            ),
        }
    }

    /// First invalid constraint, in reporting order
    pub fn first_invalid(&self) -> Option<ConstraintKind> {
        [
            (ConstraintKind::HighSpeedDuration, self.high_speed),
            (ConstraintKind::VeryHighSpeedPercentage, self.very_high_speed),
            (ConstraintKind::StoppingPercentage, self.stopping),
            (ConstraintKind::AverageUrbanSpeed, self.average_urban_speed),
        ]
        .into_iter()
        .find(|(_, verdict)| verdict.is_invalid())
        .map(|(kind, _)| kind)
    }

    pub fn constraints(&self) -> Constraints {
        Constraints {
            high_speed: self.high_speed.value(),
            very_high_speed: self.very_high_speed.value(),
            stopping: self.stopping.value(),
            average_urban_speed: self.average_urban_speed.value(),
        }
    }
}

/// Minutes still needed above 100 km/h, `Warn(0.0)` once the requirement is met.
pub fn high_speed_duration(high_speed_min: f64, total_time_min: f64) -> ConstraintVerdict {
    if high_speed_min > HIGH_SPEED_REQUIRED_MIN {
        return ConstraintVerdict::Warn(0.);
    }
    let needed_min = HIGH_SPEED_REQUIRED_MIN - high_speed_min;
    if total_time_min + needed_min <= MAX_TEST_DURATION_MIN {
        ConstraintVerdict::Warn(needed_min)
    } else {
        ConstraintVerdict::Invalid
    }
}

/// Warning tier reached by the time spent above 145 km/h.
pub fn very_high_speed_percentage(very_high_speed_min: f64) -> ConstraintVerdict {
    let limit_min =
        VERY_HIGH_SPEED_MAX_SHARE * MAX_TEST_DURATION_MIN * DrivingMode::Motorway.max_proportion();
    if very_high_speed_min > limit_min {
        return ConstraintVerdict::Invalid;
    }

    VERY_HIGH_SPEED_WARNING_TIERS
        .iter()
        .find(|(lower, upper)| {
            let lower_min = lower * MIN_TEST_DURATION_MIN * VERY_HIGH_SPEED_WARNING_MOTORWAY_SHARE;
            let upper_min = upper * MIN_TEST_DURATION_MIN * VERY_HIGH_SPEED_WARNING_MOTORWAY_SHARE;
            lower_min <= very_high_speed_min && very_high_speed_min <= upper_min
        })
        .map(|(tier, _)| ConstraintVerdict::Warn(*tier))
        .unwrap_or(ConstraintVerdict::Satisfied)
}

/// Signed distance of the stopping share of urban time to its nearest bound.
///
/// Positive values ask for more stopping below the lower bound and give the margin left
/// below the upper bound; negative values give the margin above the lower bound and ask
/// for less stopping above the upper bound.
pub fn stopping_percentage(
    stopping_min: f64,
    elapsed_urban_min: f64,
    total_time_min: f64,
) -> ConstraintVerdict {
    if total_time_min < SETTLING_TIME_MIN || stopping_min == 0. || elapsed_urban_min <= 0. {
        return ConstraintVerdict::Satisfied;
    }

    let share = stopping_min / elapsed_urban_min;
    let remaining_min = MAX_TEST_DURATION_MIN - total_time_min;

    if share < STOPPING_MIN_SHARE {
        // stopping also adds urban time
        let stop_needed_min =
            (STOPPING_MIN_SHARE * elapsed_urban_min - stopping_min) / (1. - STOPPING_MIN_SHARE);
        if stop_needed_min > remaining_min {
            return ConstraintVerdict::Invalid;
        }
    } else if share > STOPPING_MAX_SHARE {
        let drive_needed_min = stopping_min / STOPPING_MAX_SHARE - elapsed_urban_min;
        if drive_needed_min > remaining_min {
            return ConstraintVerdict::Invalid;
        }
    }

    if share < STOPPING_LOW_WARNING_SHARE {
        ConstraintVerdict::Warn(STOPPING_MIN_SHARE - share)
    } else if share > STOPPING_HIGH_WARNING_SHARE {
        ConstraintVerdict::Warn(STOPPING_MAX_SHARE - share)
    } else {
        ConstraintVerdict::Satisfied
    }
}

/// Signed km/h distance of the average urban speed to its nearest bound.
pub fn average_urban_speed(
    average_urban_speed_kmh: f64,
    total_time_min: f64,
    urban_proportion: f64,
    expected_distance_km: f64,
) -> ConstraintVerdict {
    if total_time_min < SETTLING_TIME_MIN {
        return ConstraintVerdict::Satisfied;
    }

    let remaining_min = MAX_TEST_DURATION_MIN - total_time_min;
    let out_of_range = average_urban_speed_kmh < AVERAGE_URBAN_SPEED_MIN_KMH
        || average_urban_speed_kmh > AVERAGE_URBAN_SPEED_MAX_KMH;

    if out_of_range && remaining_min < AVERAGE_URBAN_SPEED_CORRECTION_WINDOW_MIN {
        let urban_distance_left_km =
            (DrivingMode::Urban.max_proportion() - urban_proportion) * expected_distance_km;
        let required_speed_kmh = if remaining_min > 0. {
            urban_distance_left_km / (remaining_min / MINUTES_PER_HOUR)
        } else {
            f64::INFINITY
        };
        let reachable = AVERAGE_URBAN_SPEED_MIN_KMH..=AVERAGE_URBAN_SPEED_MAX_KMH;
        if !reachable.contains(&required_speed_kmh) {
            return ConstraintVerdict::Invalid;
        }
    }

    if average_urban_speed_kmh > AVERAGE_URBAN_SPEED_HIGH_WARNING_KMH {
        ConstraintVerdict::Warn(AVERAGE_URBAN_SPEED_MAX_KMH - average_urban_speed_kmh)
    } else if average_urban_speed_kmh < AVERAGE_URBAN_SPEED_LOW_WARNING_KMH {
        ConstraintVerdict::Warn(AVERAGE_URBAN_SPEED_MIN_KMH - average_urban_speed_kmh)
    } else {
        ConstraintVerdict::Satisfied
    }
}
