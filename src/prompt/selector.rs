use log::debug;

use crate::analysis::{
    Constraints, DrivingMode, MAX_TEST_DURATION_MIN, MIN_TEST_DURATION_MIN, TrajectoryAnalyser,
};

use super::PromptType;

/// Share of the expected distance to drive before the coach starts giving driving advice
const ANALYSIS_START_SHARE: f64 = 1. / 5.;

/// The prompt picked for a tick, with what its text needs that the analyser cannot tell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    None,
    /// A mode has just become sufficient
    Sufficiency(DrivingMode),
    DrivingStyle,
    AverageUrbanSpeed,
    StoppingPercentage,
    HighSpeedPercentage,
    VeryHighSpeedPercentage,
    InvalidRdeReason,
}

impl Selection {
    pub fn prompt_type(&self) -> PromptType {
        match self {
            Selection::None => PromptType::None,
            Selection::Sufficiency(_) => PromptType::Sufficiency,
            Selection::DrivingStyle => PromptType::DrivingStyle,
            Selection::AverageUrbanSpeed => PromptType::AverageUrbanSpeed,
            Selection::StoppingPercentage => PromptType::StoppingPercentage,
            Selection::HighSpeedPercentage => PromptType::HighSpeedPercentage,
            Selection::VeryHighSpeedPercentage => PromptType::VeryHighSpeedPercentage,
            Selection::InvalidRdeReason => PromptType::InvalidRdeReason,
        }
    }
}

/// What the selection rules look at.
pub struct SelectionContext<'a> {
    pub analyser: &'a mut TrajectoryAnalyser,
    pub constraints: &'a Constraints,
    /// Prompt type picked on the previous tick
    pub previous: Option<PromptType>,
}

type Rule = fn(&mut SelectionContext) -> Option<Selection>;

/// Ordered list of guarded rules, the first one that fires picks the prompt.
const RULES: [(&str, Rule); 4] = [
    ("test end window", test_end_window),
    ("motorway warnings", motorway_warnings),
    ("urban warnings", urban_warnings),
    ("progress", progress),
];

/// Picks exactly one prompt per tick and remembers it for the next one.
#[derive(Debug, Clone, Default)]
pub struct PromptSelector {
    previous: Option<PromptType>,
}

impl PromptSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(
        &mut self,
        analyser: &mut TrajectoryAnalyser,
        constraints: &Constraints,
    ) -> Selection {
        let mut context = SelectionContext {
            analyser,
            constraints,
            previous: self.previous,
        };

        let selection = RULES
            .iter()
            .find_map(|(name, rule)| {
                rule(&mut context)
                    .inspect(|selection| debug!("Rule '{}' picked {:?}", name, selection))
            })
            .unwrap_or(Selection::None);

        self.previous = Some(selection.prompt_type());
        selection
    }

    pub fn previous(&self) -> Option<PromptType> {
        self.previous
    }
}

fn test_end_window(context: &mut SelectionContext) -> Option<Selection> {
    let total_time_min = context.analyser.total_time();
    (total_time_min > MIN_TEST_DURATION_MIN && total_time_min < MAX_TEST_DURATION_MIN)
        .then_some(Selection::InvalidRdeReason)
}

/// Very high speed and high speed warnings take turns while both are active.
fn motorway_warnings(context: &mut SelectionContext) -> Option<Selection> {
    if context.analyser.current_driving_mode() != DrivingMode::Motorway {
        return None;
    }

    let constraints = context.constraints;
    if constraints.very_high_speed.is_some()
        && context.previous != Some(PromptType::VeryHighSpeedPercentage)
    {
        Some(Selection::VeryHighSpeedPercentage)
    } else if constraints.high_speed.is_some_and(|minutes| minutes != 0.) {
        Some(Selection::HighSpeedPercentage)
    } else {
        None
    }
}

/// An average urban speed warning already on screen is kept until it clears.
fn urban_warnings(context: &mut SelectionContext) -> Option<Selection> {
    if context.analyser.current_driving_mode() != DrivingMode::Urban {
        return None;
    }

    let constraints = context.constraints;
    if constraints.stopping.is_some() && context.previous != Some(PromptType::AverageUrbanSpeed) {
        Some(Selection::StoppingPercentage)
    } else if constraints.average_urban_speed.is_some() {
        Some(Selection::AverageUrbanSpeed)
    } else {
        None
    }
}

fn progress(context: &mut SelectionContext) -> Option<Selection> {
    let analyser = &mut context.analyser;
    if analyser.traveled_distance_km() < analyser.expected_distance_km() * ANALYSIS_START_SHARE {
        return Some(
            analyser
                .check_sufficient()
                .map_or(Selection::None, Selection::Sufficiency),
        );
    }

    if analyser.total_time() <= MIN_TEST_DURATION_MIN {
        Some(Selection::DrivingStyle)
    } else {
        Some(Selection::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryTick;

    const EXPECTED_DISTANCE_KM: f64 = 83.0;

    fn analyser_with(tick: TelemetryTick) -> TrajectoryAnalyser {
        let mut analyser = TrajectoryAnalyser::new(EXPECTED_DISTANCE_KM);
        analyser.update_progress(&tick);
        analyser.set_desired_driving_mode();
        analyser
    }

    fn past_first_fifth() -> TelemetryTick {
        TelemetryTick {
            urban_distance_m: 8_000.,
            rural_distance_m: 5_000.,
            motorway_distance_m: 5_000.,
            total_time_min: 40.,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_to_say_at_start() {
        let mut analyser = analyser_with(TelemetryTick::default());
        let constraints = analyser.evaluate_constraints();
        let mut selector = PromptSelector::new();

        assert_eq!(
            selector.select(&mut analyser, &constraints).prompt_type(),
            PromptType::None
        );
        assert_eq!(selector.previous(), Some(PromptType::None));
    }

    #[test]
    fn test_end_window_wins() {
        for total_time_min in [90.1, 95., 119.9] {
            let mut analyser = analyser_with(TelemetryTick {
                total_time_min,
                ..past_first_fifth()
            });
            let constraints = Constraints {
                high_speed: Some(3.),
                ..Default::default()
            };
            let selection = PromptSelector::new().select(&mut analyser, &constraints);
            assert_eq!(selection.prompt_type(), PromptType::InvalidRdeReason);
        }
    }

    #[test]
    fn test_end_window_is_exclusive() {
        let mut analyser = analyser_with(TelemetryTick {
            total_time_min: 90.,
            ..past_first_fifth()
        });
        let selection = PromptSelector::new().select(&mut analyser, &Constraints::default());
        assert_eq!(selection.prompt_type(), PromptType::DrivingStyle);

        let mut analyser = analyser_with(TelemetryTick {
            total_time_min: 120.,
            ..past_first_fifth()
        });
        let selection = PromptSelector::new().select(&mut analyser, &Constraints::default());
        assert_eq!(selection.prompt_type(), PromptType::None);
    }

    #[test]
    fn test_motorway_warnings_alternate() {
        let mut analyser = analyser_with(TelemetryTick {
            current_speed_kmh: 120.,
            ..past_first_fifth()
        });
        let constraints = Constraints {
            high_speed: Some(2.),
            very_high_speed: Some(0.015),
            ..Default::default()
        };
        let mut selector = PromptSelector::new();

        let picked = (0..4)
            .map(|_| selector.select(&mut analyser, &constraints).prompt_type())
            .collect::<Vec<_>>();
        assert_eq!(
            picked,
            vec![
                PromptType::VeryHighSpeedPercentage,
                PromptType::HighSpeedPercentage,
                PromptType::VeryHighSpeedPercentage,
                PromptType::HighSpeedPercentage,
            ]
        );
    }

    #[test]
    fn test_met_high_speed_falls_through() {
        let mut analyser = analyser_with(TelemetryTick {
            current_speed_kmh: 120.,
            ..past_first_fifth()
        });
        let constraints = Constraints {
            high_speed: Some(0.),
            ..Default::default()
        };
        let selection = PromptSelector::new().select(&mut analyser, &constraints);
        assert_eq!(selection.prompt_type(), PromptType::DrivingStyle);
    }

    #[test]
    fn test_urban_warnings() {
        let mut analyser = analyser_with(TelemetryTick {
            current_speed_kmh: 30.,
            ..past_first_fifth()
        });
        let mut selector = PromptSelector::new();

        let stopping_only = Constraints {
            stopping: Some(0.02),
            ..Default::default()
        };
        assert_eq!(
            selector.select(&mut analyser, &stopping_only).prompt_type(),
            PromptType::StoppingPercentage
        );

        let speed_only = Constraints {
            average_urban_speed: Some(-5.),
            ..Default::default()
        };
        assert_eq!(
            selector.select(&mut analyser, &speed_only).prompt_type(),
            PromptType::AverageUrbanSpeed
        );

        // the average speed warning stays while it is active
        let both = Constraints {
            stopping: Some(0.02),
            average_urban_speed: Some(-5.),
            ..Default::default()
        };
        assert_eq!(
            selector.select(&mut analyser, &both).prompt_type(),
            PromptType::AverageUrbanSpeed
        );
    }

    #[test]
    fn test_rural_ignores_warnings() {
        let mut analyser = analyser_with(TelemetryTick {
            current_speed_kmh: 70.,
            ..past_first_fifth()
        });
        let constraints = Constraints {
            high_speed: Some(5.),
            very_high_speed: Some(0.025),
            stopping: Some(0.02),
            average_urban_speed: Some(-5.),
        };
        let selection = PromptSelector::new().select(&mut analyser, &constraints);
        assert_eq!(selection.prompt_type(), PromptType::DrivingStyle);
    }

    #[test]
    fn test_sufficiency_reported_once_early_on() {
        // sufficient rural driving within the first fifth of the distance
        let mut analyser = analyser_with(TelemetryTick {
            rural_distance_m: 0.185 * EXPECTED_DISTANCE_KM * 1000.,
            total_time_min: 20.,
            current_speed_kmh: 70.,
            ..Default::default()
        });
        let mut selector = PromptSelector::new();
        let constraints = Constraints::default();

        let selection = selector.select(&mut analyser, &constraints);
        assert_eq!(selection, Selection::Sufficiency(DrivingMode::Rural));
        assert_eq!(selection.prompt_type(), PromptType::Sufficiency);

        assert_eq!(selector.select(&mut analyser, &constraints), Selection::None);
        assert_eq!(selector.previous(), Some(PromptType::None));
    }
}
