use log::{debug, warn};

use crate::telemetry::TelemetryTick;

use super::{
    ConstraintInputs, ConstraintKind, ConstraintVerdicts, Constraints, DrivingMode,
    MAX_TEST_DURATION_MIN, ProgressTracker, SpeedAccumulator,
};

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Tracks the progress of one RDE test and evaluates its constraints.
///
/// The analyser owns the speed accumulator and the progress tracker, and remembers the
/// first constraint that could no longer be satisfied: once set, the flag stays for the
/// rest of the test.
#[derive(Debug, Clone)]
pub struct TrajectoryAnalyser {
    tracker: ProgressTracker,
    accumulator: SpeedAccumulator,
    latest: TelemetryTick,
    invalid: Option<ConstraintKind>,
}

impl TrajectoryAnalyser {
    pub fn new(expected_distance_km: f64) -> Self {
        Self {
            tracker: ProgressTracker::new(expected_distance_km),
            accumulator: SpeedAccumulator::new(),
            latest: TelemetryTick::default(),
            invalid: None,
        }
    }

    pub fn update_progress(&mut self, tick: &TelemetryTick) {
        let tick = tick.sanitized();
        self.tracker.update(
            tick.urban_distance_m,
            tick.rural_distance_m,
            tick.motorway_distance_m,
        );
        self.accumulator.update(tick.current_speed_kmh, tick.timestamp_ms);
        self.latest = tick;
    }

    pub fn current_driving_mode(&self) -> DrivingMode {
        DrivingMode::from_speed(self.latest.current_speed_kmh)
    }

    pub fn set_desired_driving_mode(&mut self) -> DrivingMode {
        let current_mode = self.current_driving_mode();
        self.tracker.set_desired_mode(current_mode)
    }

    pub fn desired_driving_mode(&self) -> DrivingMode {
        self.tracker.desired_mode()
    }

    /// Evaluate the four constraints against the latest tick.
    ///
    /// A constraint that can no longer be satisfied reports `None` and is remembered,
    /// see [`TrajectoryAnalyser::check_invalid`].
    pub fn evaluate_constraints(&mut self) -> Constraints {
        let verdicts = ConstraintVerdicts::evaluate(&self.constraint_inputs());

        if self.invalid.is_none() {
            if let Some(kind) = verdicts.first_invalid() {
                warn!(
                    "{} can no longer be satisfied after {:.1} minutes",
                    kind, self.latest.total_time_min
                );
                self.invalid = Some(kind);
            }
        }

        let constraints = verdicts.constraints();
        debug!("Constraints at {:.2} minutes: {:?}", self.latest.total_time_min, constraints);
        constraints
    }

    fn constraint_inputs(&self) -> ConstraintInputs {
        ConstraintInputs {
            high_speed_min: self.accumulator.high_speed_time(),
            very_high_speed_min: self.accumulator.very_high_speed_time(),
            stopping_min: self.accumulator.stopping_time(),
            elapsed_urban_min: self.elapsed_urban_time(),
            total_time_min: self.latest.total_time_min,
            average_urban_speed_kmh: self.latest.avg_urban_speed_kmh,
            urban_proportion: self.tracker.proportion(DrivingMode::Urban),
            expected_distance_km: self.tracker.expected_distance_km(),
        }
    }

    /// First constraint that could no longer be satisfied during this test
    pub fn check_invalid(&self) -> Option<ConstraintKind> {
        self.invalid
    }

    /// Mode that has just become sufficient, reported once per mode
    pub fn check_sufficient(&mut self) -> Option<DrivingMode> {
        self.tracker.check_sufficient()
    }

    pub fn compute_speed_change(&self) -> f64 {
        self.tracker.speed_change(self.latest.current_speed_kmh)
    }

    pub fn compute_duration(&self) -> f64 {
        self.tracker.duration()
    }

    pub fn check_time_limit(&self) -> bool {
        self.latest.total_time_min > MAX_TEST_DURATION_MIN
    }

    pub fn expected_distance_km(&self) -> f64 {
        self.tracker.expected_distance_km()
    }

    pub fn traveled_distance_km(&self) -> f64 {
        self.latest.traveled_distance_km()
    }

    pub fn proportion(&self, mode: DrivingMode) -> f64 {
        self.tracker.proportion(mode)
    }

    pub fn percentage(&self, mode: DrivingMode) -> f64 {
        self.tracker.proportion(mode) * 100.
    }

    pub fn is_sufficient(&self, mode: DrivingMode) -> bool {
        self.tracker.is_sufficient(mode)
    }

    pub fn average_speed(&self, mode: DrivingMode) -> f64 {
        match mode {
            DrivingMode::Urban => self.latest.avg_urban_speed_kmh,
            DrivingMode::Rural => self.latest.avg_rural_speed_kmh,
            DrivingMode::Motorway => self.latest.avg_motorway_speed_kmh,
        }
    }

    pub fn average_urban_speed(&self) -> f64 {
        self.latest.avg_urban_speed_kmh
    }

    pub fn total_time(&self) -> f64 {
        self.latest.total_time_min
    }

    pub fn current_speed(&self) -> f64 {
        self.latest.current_speed_kmh
    }

    /// Urban time, stops included, in minutes
    pub fn elapsed_urban_time(&self) -> f64 {
        self.latest.elapsed_urban_s as f64 / SECONDS_PER_MINUTE
    }

    /// Share of the urban time spent stopped, `None` before any urban time elapsed
    pub fn stopping_share(&self) -> Option<f64> {
        let elapsed_urban_min = self.elapsed_urban_time();
        (elapsed_urban_min > 0.).then(|| self.accumulator.stopping_time() / elapsed_urban_min)
    }

    pub fn speed_accumulator(&self) -> &SpeedAccumulator {
        &self.accumulator
    }

    pub fn is_valid_signal(&self) -> f64 {
        self.latest.is_valid_signal
    }

    pub fn not_rde_signal(&self) -> f64 {
        self.latest.not_rde_signal
    }
}

impl Default for TrajectoryAnalyser {
    fn default() -> Self {
        Self::new(crate::telemetry::DEFAULT_EXPECTED_DISTANCE_KM)
    }
}
