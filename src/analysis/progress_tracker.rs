use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use super::{DrivingMode, MINUTES_PER_HOUR};

/// Share of the expected distance covered by each driving mode.
///
/// The expected distance only ever grows: it follows the distance actually driven and
/// is raised further whenever a mode would otherwise exceed its regulatory ceiling, so
/// the reported proportions always stay in a range that can still be rendered.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    expected_distance_km: f64,
    urban_proportion: f64,
    rural_proportion: f64,
    motorway_proportion: f64,
    desired_mode: DrivingMode,
    reported_sufficient: HashSet<DrivingMode>,
}

impl ProgressTracker {
    pub fn new(expected_distance_km: f64) -> Self {
        Self {
            expected_distance_km,
            urban_proportion: 0.,
            rural_proportion: 0.,
            motorway_proportion: 0.,
            desired_mode: DrivingMode::Urban,
            reported_sufficient: HashSet::new(),
        }
    }

    /// Recompute the proportions from the cumulative distances (meters) of each mode.
    pub fn update(
        &mut self,
        urban_distance_m: f64,
        rural_distance_m: f64,
        motorway_distance_m: f64,
    ) {
        let total_distance_m = urban_distance_m + rural_distance_m + motorway_distance_m;
        self.expected_distance_km = self.expected_distance_km.max(total_distance_m / 1000.0);

        for (mode, distance_m) in [
            (DrivingMode::Urban, urban_distance_m),
            (DrivingMode::Rural, rural_distance_m),
            (DrivingMode::Motorway, motorway_distance_m),
        ] {
            if distance_m / 1000.0 / self.expected_distance_km > mode.max_proportion() {
                let raised = distance_m / 1000.0 / mode.max_proportion();
                debug!(
                    "Raising expected distance from {:.3}km to {:.3}km to cap {} share",
                    self.expected_distance_km, raised, mode
                );
                self.expected_distance_km = raised;
            }
        }

        self.urban_proportion = urban_distance_m / 1000.0 / self.expected_distance_km;
        self.rural_proportion = rural_distance_m / 1000.0 / self.expected_distance_km;
        self.motorway_proportion = motorway_distance_m / 1000.0 / self.expected_distance_km;
    }

    pub fn expected_distance_km(&self) -> f64 {
        self.expected_distance_km
    }

    pub fn proportion(&self, mode: DrivingMode) -> f64 {
        match mode {
            DrivingMode::Urban => self.urban_proportion,
            DrivingMode::Rural => self.rural_proportion,
            DrivingMode::Motorway => self.motorway_proportion,
        }
    }

    pub fn is_sufficient(&self, mode: DrivingMode) -> bool {
        self.proportion(mode) >= mode.min_proportion()
    }

    pub fn desired_mode(&self) -> DrivingMode {
        self.desired_mode
    }

    /// Pick the mode the driver should aim for next.
    ///
    /// When two modes are still missing and the driver is in neither of them, motorway is
    /// preferred over rural, and rural over urban.
    pub fn set_desired_mode(&mut self, current_mode: DrivingMode) -> DrivingMode {
        let insufficient = DrivingMode::ALL
            .iter()
            .copied()
            .filter(|mode| !self.is_sufficient(*mode))
            .collect_vec();

        self.desired_mode = match insufficient.as_slice() {
            [only] => *only,
            [first, second] => {
                if *first == current_mode || *second == current_mode {
                    current_mode
                } else {
                    // ALL is ordered motorway, rural, urban
                    *first
                }
            }
            _ => current_mode,
        };
        self.desired_mode
    }

    /// Report a mode that has become sufficient since the last call, at most once per mode.
    pub fn check_sufficient(&mut self) -> Option<DrivingMode> {
        let newly_sufficient = DrivingMode::ALL
            .iter()
            .copied()
            .find(|mode| self.is_sufficient(*mode) && !self.reported_sufficient.contains(mode))?;
        self.reported_sufficient.insert(newly_sufficient);
        Some(newly_sufficient)
    }

    /// Signed km/h change needed to bring `current_speed_kmh` into the desired mode's band.
    pub fn speed_change(&self, current_speed_kmh: f64) -> f64 {
        let (lower, upper) = self.desired_mode.target_speed_band();
        if current_speed_kmh < lower {
            lower - current_speed_kmh
        } else if current_speed_kmh > upper {
            upper - current_speed_kmh
        } else {
            0.
        }
    }

    /// Minutes still to drive in the desired mode before it reaches its ceiling, at the
    /// mode's nominal speed. Negative once the ceiling has been passed.
    pub fn duration(&self) -> f64 {
        let mode = self.desired_mode;
        let distance_left_km =
            (mode.max_proportion() - self.proportion(mode)) * self.expected_distance_km;
        distance_left_km * MINUTES_PER_HOUR / mode.nominal_speed_kmh()
    }
}
