use log::debug;

use crate::{
    analysis::{Constraints, DrivingMode, TrajectoryAnalyser},
    prompt::{PromptOutput, PromptSelector, generate_prompt},
    telemetry::{ProgressSnapshot, SessionInfo, TelemetryTick},
};

/// State of one RDE test, from the first tick to the last.
///
/// Feed it one validator tick at a time with [`RdeSession::process`]; drop it to cancel
/// the test.
#[derive(Debug, Clone)]
pub struct RdeSession {
    info: SessionInfo,
    analyser: TrajectoryAnalyser,
    selector: PromptSelector,
    constraints: Constraints,
    ticks: usize,
}

impl RdeSession {
    pub fn new(info: SessionInfo) -> Self {
        let info = info.sanitized();
        Self {
            info,
            analyser: TrajectoryAnalyser::new(info.expected_distance_km),
            selector: PromptSelector::new(),
            constraints: Constraints::default(),
            ticks: 0,
        }
    }

    /// Run one tick through the analyser and the prompt selection.
    pub fn process(&mut self, tick: &TelemetryTick) -> PromptOutput {
        self.analyser.update_progress(tick);
        self.analyser.set_desired_driving_mode();
        self.constraints = self.analyser.evaluate_constraints();

        let selection = self.selector.select(&mut self.analyser, &self.constraints);
        let prompt = generate_prompt(&selection, &self.analyser, &self.constraints);
        self.ticks += 1;

        debug!(
            "Tick {} at {:.2} min ({} km/h): {:?} '{}'",
            self.ticks,
            self.analyser.total_time(),
            self.analyser.current_speed(),
            prompt.prompt_type,
            prompt.text
        );
        prompt
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            expected_distance_km: self.analyser.expected_distance_km(),
            urban_proportion: self.analyser.proportion(DrivingMode::Urban),
            rural_proportion: self.analyser.proportion(DrivingMode::Rural),
            motorway_proportion: self.analyser.proportion(DrivingMode::Motorway),
            current_speed_kmh: self.analyser.current_speed(),
            total_time_min: self.analyser.total_time(),
            current_mode: self.analyser.current_driving_mode(),
            desired_mode: self.analyser.desired_driving_mode(),
            invalid: self.analyser.check_invalid(),
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn analyser(&self) -> &TrajectoryAnalyser {
        &self.analyser
    }

    /// Constraints evaluated on the last tick
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

impl Default for RdeSession {
    fn default() -> Self {
        Self::new(SessionInfo::default())
    }
}
