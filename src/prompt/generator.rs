use crate::analysis::{Constraints, DrivingMode, MAX_TEST_DURATION_MIN, TrajectoryAnalyser};

use super::{
    Emphasis, PromptOutput, PromptParameters, PromptType, Selection, ValidityReason,
    format_rounded, round_to,
};

const NOT_YET_AVAILABLE: &str = "Analysis will be available after 1/5 of the test is completed.";
const TIME_LIMIT_REACHED: &str = "The maximum test duration has been reached.";

/// Average urban speed (km/h) splitting warnings about the lower bound from the upper one
const AVERAGE_URBAN_SPEED_MIDPOINT_KMH: f64 = 27.5;
/// Stopping share splitting warnings about the lower bound from the upper one
const STOPPING_SHARE_MIDPOINT: f64 = 0.18;

/// Turn the selected prompt type into the text shown and read to the driver.
pub fn generate_prompt(
    selection: &Selection,
    analyser: &TrajectoryAnalyser,
    constraints: &Constraints,
) -> PromptOutput {
    match *selection {
        Selection::None => none_prompt(analyser),
        Selection::Sufficiency(mode) => sufficiency_prompt(mode),
        Selection::DrivingStyle => driving_style_prompt(analyser),
        Selection::HighSpeedPercentage => high_speed_prompt(analyser, constraints.high_speed),
        Selection::VeryHighSpeedPercentage => {
            very_high_speed_prompt(analyser, constraints.very_high_speed)
        }
        Selection::AverageUrbanSpeed => {
            average_urban_speed_prompt(analyser, constraints.average_urban_speed)
        }
        Selection::StoppingPercentage => stopping_prompt(analyser, constraints.stopping),
        Selection::InvalidRdeReason => invalid_rde_reason_prompt(analyser),
    }
}

fn none_prompt(analyser: &TrajectoryAnalyser) -> PromptOutput {
    let text = if analyser.total_time() >= MAX_TEST_DURATION_MIN {
        TIME_LIMIT_REACHED
    } else {
        NOT_YET_AVAILABLE
    };
    PromptOutput {
        prompt_type: PromptType::None,
        text: text.to_string(),
        analysis_text: String::new(),
        emphasis: Emphasis::Neutral,
        parameters: PromptParameters::default(),
    }
}

fn sufficiency_prompt(mode: DrivingMode) -> PromptOutput {
    PromptOutput {
        prompt_type: PromptType::Sufficiency,
        text: format!("Your {} driving is sufficient.", mode),
        analysis_text: String::new(),
        emphasis: Emphasis::Neutral,
        parameters: PromptParameters {
            sufficient_mode: Some(mode),
            ..Default::default()
        },
    }
}

/// Driving style text and emphasis shared by the motorway prompts.
fn driving_style(analyser: &TrajectoryAnalyser) -> (String, Emphasis) {
    let speed_change = analyser.compute_speed_change();
    let mode = analyser.desired_driving_mode();
    if speed_change > 0. {
        (
            format!(
                "Aim for a higher driving speed, if it is safe to do so, for more {} driving",
                mode
            ),
            Emphasis::Positive,
        )
    } else if speed_change < 0. {
        (
            format!(
                "Aim for a lower driving speed, if it is safe to do so, for more {} driving",
                mode
            ),
            Emphasis::Negative,
        )
    } else {
        ("Your driving style is good".to_string(), Emphasis::Neutral)
    }
}

fn driving_style_prompt(analyser: &TrajectoryAnalyser) -> PromptOutput {
    let (text, emphasis) = driving_style(analyser);
    let mode = analyser.desired_driving_mode();
    let duration = analyser.compute_duration();

    // a share capped at its ceiling may leave a rounding error below zero
    let analysis_text = if (duration * 100.).round() < 0. {
        format!(
            "You have exceeded the {} driving share, avoid {} driving for the next {} minutes.",
            mode,
            mode,
            format_rounded(-duration, 2)
        )
    } else {
        format!(
            "Drive at an average speed of {} km/h for at most {} minutes.",
            mode.nominal_speed_kmh(),
            format_rounded(duration, 2)
        )
    };

    PromptOutput {
        prompt_type: PromptType::DrivingStyle,
        text,
        analysis_text,
        emphasis,
        parameters: PromptParameters {
            speed_change_kmh: Some(analyser.compute_speed_change()),
            duration_minutes: Some(duration),
            ..Default::default()
        },
    }
}

fn high_speed_prompt(analyser: &TrajectoryAnalyser, high_speed: Option<f64>) -> PromptOutput {
    let (text, emphasis) = driving_style(analyser);
    let minutes = high_speed.unwrap_or_default();
    PromptOutput {
        prompt_type: PromptType::HighSpeedPercentage,
        text,
        analysis_text: format!(
            "You need to drive at 100km/h or more for at least {} more minutes.",
            format_rounded(minutes, 1)
        ),
        emphasis,
        parameters: PromptParameters {
            speed_change_kmh: Some(analyser.compute_speed_change()),
            magnitude: high_speed,
            ..Default::default()
        },
    }
}

fn very_high_speed_prompt(
    analyser: &TrajectoryAnalyser,
    very_high_speed: Option<f64>,
) -> PromptOutput {
    let (text, _) = driving_style(analyser);
    let share = very_high_speed.unwrap_or_default();
    PromptOutput {
        prompt_type: PromptType::VeryHighSpeedPercentage,
        text,
        analysis_text: format!(
            "You have driven at 145km/h or more for {}% of the motorway driving distance.",
            format_rounded(share * 100., 1)
        ),
        emphasis: Emphasis::Negative,
        parameters: PromptParameters {
            speed_change_kmh: Some(analyser.compute_speed_change()),
            magnitude: very_high_speed,
            ..Default::default()
        },
    }
}

fn average_urban_speed_prompt(
    analyser: &TrajectoryAnalyser,
    average_urban_speed: Option<f64>,
) -> PromptOutput {
    let delta = average_urban_speed.unwrap_or_default();
    let average = format_rounded(analyser.average_urban_speed(), 2);
    let close = format!("Your average urban speed, {}km/h, is close to being invalid.", average);

    let (text, analysis_text, emphasis) =
        if analyser.average_urban_speed() >= AVERAGE_URBAN_SPEED_MIDPOINT_KMH {
            if delta >= 0. {
                (
                    close,
                    format!(
                        "You are {}km/h away from exceeding the upper limit.",
                        format_rounded(delta, 2)
                    ),
                    Emphasis::Negative,
                )
            } else {
                (
                    format!("Your average urban speed, {}km/h, is too high.", average),
                    format!(
                        "You are {}km/h more than the upper limit.",
                        format_rounded(-delta, 2)
                    ),
                    Emphasis::Negative,
                )
            }
        } else if delta <= 0. {
            (
                close,
                format!("You are {}km/h above the lower limit.", format_rounded(-delta, 2)),
                Emphasis::Positive,
            )
        } else {
            (
                format!("Your average urban speed, {}km/h, is too low.", average),
                format!(
                    "You are {}km/h less than the lower limit.",
                    format_rounded(delta, 2)
                ),
                Emphasis::Positive,
            )
        };

    PromptOutput {
        prompt_type: PromptType::AverageUrbanSpeed,
        text,
        analysis_text,
        emphasis,
        parameters: PromptParameters {
            magnitude: average_urban_speed,
            ..Default::default()
        },
    }
}

fn stopping_prompt(analyser: &TrajectoryAnalyser, stopping: Option<f64>) -> PromptOutput {
    let delta = stopping.unwrap_or_default();
    // whole percentage points of urban time, from the delta rounded to two decimals
    let points = |delta: f64| format_rounded(round_to(delta, 2) * 100., 0);
    let share = analyser.stopping_share().unwrap_or_default();

    let (text, analysis_text, emphasis) = if share < STOPPING_SHARE_MIDPOINT {
        if delta > 0. {
            (
                "You are stopping too little. Try to stop more.",
                format!(
                    "You need to stop for at least {}% more of the urban time.",
                    points(delta)
                ),
                Emphasis::Negative,
            )
        } else {
            (
                "You are close to the minimum stopping percentage. Try to stop more.",
                format!("You are stopping {}% more than the lower bound.", points(-delta)),
                Emphasis::Negative,
            )
        }
    } else if delta >= 0. {
        (
            "You are close to exceeding the stopping percentage. Try to stop less.",
            format!("You are stopping {}% less than the upper bound.", points(delta)),
            Emphasis::Positive,
        )
    } else {
        (
            "You are stopping too much. Try to stop less.",
            format!("You are stopping {}% more than the upper bound.", points(-delta)),
            Emphasis::Positive,
        )
    };

    PromptOutput {
        prompt_type: PromptType::StoppingPercentage,
        text: text.to_string(),
        analysis_text,
        emphasis,
        parameters: PromptParameters {
            magnitude: stopping,
            ..Default::default()
        },
    }
}

fn invalid_rde_reason_prompt(analyser: &TrajectoryAnalyser) -> PromptOutput {
    let reason = ValidityReason::from_signals(analyser.is_valid_signal(), analyser.not_rde_signal());
    let (text, emphasis) = match reason {
        ValidityReason::Valid => ("Your RDE test is valid so far.".to_string(), Emphasis::Positive),
        ValidityReason::Unknown => (
            "The validity of your RDE test is unknown.".to_string(),
            Emphasis::Neutral,
        ),
        reason => (format!("Your RDE test is invalid: {}.", reason), Emphasis::Negative),
    };

    let analysis_text = match analyser.check_invalid() {
        Some(constraint) => format!("{} can no longer be satisfied.", constraint),
        None => format!(
            "{} minutes of test time remaining.",
            format_rounded(MAX_TEST_DURATION_MIN - analyser.total_time(), 1)
        ),
    };

    PromptOutput {
        prompt_type: PromptType::InvalidRdeReason,
        text,
        analysis_text,
        emphasis,
        parameters: PromptParameters {
            reason_code: Some(reason.code()),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryTick;

    const EXPECTED_DISTANCE_KM: f64 = 83.0;

    fn meters(proportion: f64) -> f64 {
        proportion * EXPECTED_DISTANCE_KM * 1000.
    }

    fn analyser_with(tick: TelemetryTick) -> TrajectoryAnalyser {
        let mut analyser = TrajectoryAnalyser::new(EXPECTED_DISTANCE_KM);
        analyser.update_progress(&tick);
        analyser.set_desired_driving_mode();
        analyser
    }

    /// Only rural driving is still missing
    fn rural_missing(current_speed_kmh: f64) -> TrajectoryAnalyser {
        analyser_with(TelemetryTick {
            urban_distance_m: meters(0.30),
            rural_distance_m: meters(0.10),
            motorway_distance_m: meters(0.20),
            current_speed_kmh,
            total_time_min: 30.,
            ..Default::default()
        })
    }

    fn generate(
        selection: Selection,
        analyser: &TrajectoryAnalyser,
        constraints: Constraints,
    ) -> PromptOutput {
        generate_prompt(&selection, analyser, &constraints)
    }

    #[test]
    fn test_none_prompt() {
        let analyser = analyser_with(TelemetryTick::default());
        let prompt = generate(Selection::None, &analyser, Constraints::default());

        assert_eq!(prompt.text, NOT_YET_AVAILABLE);
        assert!(prompt.analysis_text.is_empty());
        assert_eq!(prompt.emphasis, Emphasis::Neutral);
    }

    #[test]
    fn test_none_prompt_after_time_limit() {
        let analyser = analyser_with(TelemetryTick {
            total_time_min: 121.,
            ..Default::default()
        });
        let prompt = generate(Selection::None, &analyser, Constraints::default());
        assert_eq!(prompt.text, TIME_LIMIT_REACHED);
    }

    #[test]
    fn test_sufficiency_prompt() {
        let analyser = analyser_with(TelemetryTick::default());
        let prompt = generate(
            Selection::Sufficiency(DrivingMode::Motorway),
            &analyser,
            Constraints::default(),
        );

        assert_eq!(prompt.prompt_type, PromptType::Sufficiency);
        assert_eq!(prompt.text, "Your motorway driving is sufficient.");
        assert!(prompt.analysis_text.is_empty());
        assert_eq!(prompt.parameters.sufficient_mode, Some(DrivingMode::Motorway));
    }

    #[test]
    fn test_driving_style_higher_speed() {
        let analyser = rural_missing(40.);
        let prompt = generate(Selection::DrivingStyle, &analyser, Constraints::default());

        assert_eq!(
            prompt.text,
            "Aim for a higher driving speed, if it is safe to do so, for more rural driving"
        );
        assert_eq!(
            prompt.analysis_text,
            "Drive at an average speed of 75 km/h for at most 21.91 minutes."
        );
        assert_eq!(prompt.emphasis, Emphasis::Positive);
        assert_eq!(prompt.parameters.speed_change_kmh, Some(20.));
    }

    #[test]
    fn test_driving_style_lower_speed() {
        let analyser = rural_missing(100.);
        let prompt = generate(Selection::DrivingStyle, &analyser, Constraints::default());

        assert_eq!(
            prompt.text,
            "Aim for a lower driving speed, if it is safe to do so, for more rural driving"
        );
        assert_eq!(prompt.emphasis, Emphasis::Negative);
    }

    #[test]
    fn test_driving_style_good() {
        let analyser = rural_missing(70.);
        let prompt = generate(Selection::DrivingStyle, &analyser, Constraints::default());

        assert_eq!(prompt.text, "Your driving style is good");
        assert_eq!(prompt.emphasis, Emphasis::Neutral);
    }

    #[test]
    fn test_high_speed_prompt() {
        let analyser = rural_missing(100.);
        let constraints = Constraints {
            high_speed: Some(3.46),
            ..Default::default()
        };
        let prompt = generate(Selection::HighSpeedPercentage, &analyser, constraints);

        assert_eq!(
            prompt.analysis_text,
            "You need to drive at 100km/h or more for at least 3.5 more minutes."
        );
        assert_eq!(prompt.emphasis, Emphasis::Negative);
        assert_eq!(prompt.parameters.magnitude, Some(3.46));
    }

    #[test]
    fn test_very_high_speed_prompt() {
        let analyser = rural_missing(150.);
        for (tier, share) in [(0.025, "2.5"), (0.015, "1.5")] {
            let constraints = Constraints {
                very_high_speed: Some(tier),
                ..Default::default()
            };
            let prompt = generate(Selection::VeryHighSpeedPercentage, &analyser, constraints);
            assert_eq!(
                prompt.analysis_text,
                format!(
                    "You have driven at 145km/h or more for {}% of the motorway driving distance.",
                    share
                )
            );
            assert_eq!(prompt.emphasis, Emphasis::Negative);
        }
    }

    fn average_urban_speed_prompt_for(average: f64, delta: f64) -> PromptOutput {
        let analyser = analyser_with(TelemetryTick {
            avg_urban_speed_kmh: average,
            total_time_min: 30.,
            ..Default::default()
        });
        let constraints = Constraints {
            average_urban_speed: Some(delta),
            ..Default::default()
        };
        generate(Selection::AverageUrbanSpeed, &analyser, constraints)
    }

    #[test]
    fn test_average_urban_speed_too_high() {
        let prompt = average_urban_speed_prompt_for(45., -5.);
        assert_eq!(prompt.text, "Your average urban speed, 45.0km/h, is too high.");
        assert_eq!(prompt.analysis_text, "You are 5.0km/h more than the upper limit.");
        assert_eq!(prompt.emphasis, Emphasis::Negative);
    }

    #[test]
    fn test_average_urban_speed_close_to_upper_limit() {
        let prompt = average_urban_speed_prompt_for(38.4, 40. - 38.4);
        assert_eq!(
            prompt.text,
            "Your average urban speed, 38.4km/h, is close to being invalid."
        );
        assert_eq!(
            prompt.analysis_text,
            "You are 1.6km/h away from exceeding the upper limit."
        );
        assert_eq!(prompt.emphasis, Emphasis::Negative);
    }

    #[test]
    fn test_average_urban_speed_close_to_lower_limit() {
        let prompt = average_urban_speed_prompt_for(16., -1.);
        assert_eq!(
            prompt.text,
            "Your average urban speed, 16.0km/h, is close to being invalid."
        );
        assert_eq!(prompt.analysis_text, "You are 1.0km/h above the lower limit.");
        assert_eq!(prompt.emphasis, Emphasis::Positive);
    }

    #[test]
    fn test_average_urban_speed_too_low() {
        let prompt = average_urban_speed_prompt_for(10., 5.);
        assert_eq!(prompt.text, "Your average urban speed, 10.0km/h, is too low.");
        assert_eq!(prompt.analysis_text, "You are 5.0km/h less than the lower limit.");
        assert_eq!(prompt.emphasis, Emphasis::Positive);
    }

    fn stopped_for_a_minute(elapsed_urban_s: i64) -> TrajectoryAnalyser {
        let mut analyser = TrajectoryAnalyser::new(EXPECTED_DISTANCE_KM);
        for timestamp_ms in [0, 60_000] {
            analyser.update_progress(&TelemetryTick {
                timestamp_ms,
                elapsed_urban_s,
                total_time_min: 30.,
                ..Default::default()
            });
        }
        analyser
    }

    #[test]
    fn test_stopping_too_little() {
        // 1 of 25 urban minutes stopped
        let analyser = stopped_for_a_minute(1_500);
        let constraints = Constraints {
            stopping: Some(0.02),
            ..Default::default()
        };
        let prompt = generate(Selection::StoppingPercentage, &analyser, constraints);

        assert_eq!(prompt.text, "You are stopping too little. Try to stop more.");
        assert_eq!(
            prompt.analysis_text,
            "You need to stop for at least 2.0% more of the urban time."
        );
        assert_eq!(prompt.emphasis, Emphasis::Negative);
    }

    #[test]
    fn test_stopping_points_are_whole_percentages() {
        let analyser = stopped_for_a_minute(1_500);
        let constraints = Constraints {
            stopping: Some(0.0351),
            ..Default::default()
        };
        let prompt = generate(Selection::StoppingPercentage, &analyser, constraints);

        assert_eq!(
            prompt.analysis_text,
            "You need to stop for at least 4.0% more of the urban time."
        );
        assert_eq!(prompt.parameters.magnitude, Some(0.0351));
    }

    #[test]
    fn test_stopping_close_to_lower_bound() {
        // 1 of 14 urban minutes stopped
        let analyser = stopped_for_a_minute(840);
        let constraints = Constraints {
            stopping: Some(0.06 - 1. / 14.),
            ..Default::default()
        };
        let prompt = generate(Selection::StoppingPercentage, &analyser, constraints);

        assert_eq!(
            prompt.text,
            "You are close to the minimum stopping percentage. Try to stop more."
        );
        assert_eq!(
            prompt.analysis_text,
            "You are stopping 1.0% more than the lower bound."
        );
    }

    #[test]
    fn test_stopping_too_much() {
        // 1 of 2.5 urban minutes stopped
        let analyser = stopped_for_a_minute(150);
        let constraints = Constraints {
            stopping: Some(0.30 - 0.4),
            ..Default::default()
        };
        let prompt = generate(Selection::StoppingPercentage, &analyser, constraints);

        assert_eq!(prompt.text, "You are stopping too much. Try to stop less.");
        assert_eq!(
            prompt.analysis_text,
            "You are stopping 10.0% more than the upper bound."
        );
        assert_eq!(prompt.emphasis, Emphasis::Positive);
    }

    #[test]
    fn test_stopping_close_to_upper_bound() {
        // 1 of 3.45 urban minutes stopped
        let analyser = stopped_for_a_minute(207);
        let constraints = Constraints {
            stopping: Some(0.01),
            ..Default::default()
        };
        let prompt = generate(Selection::StoppingPercentage, &analyser, constraints);

        assert_eq!(
            prompt.text,
            "You are close to exceeding the stopping percentage. Try to stop less."
        );
        assert_eq!(prompt.analysis_text, "You are stopping 1.0% less than the upper bound.");
        assert_eq!(prompt.emphasis, Emphasis::Positive);
    }

    #[test]
    fn test_invalid_rde_reason_valid() {
        let analyser = analyser_with(TelemetryTick {
            total_time_min: 95.,
            is_valid_signal: 1.,
            ..Default::default()
        });
        let prompt = generate(Selection::InvalidRdeReason, &analyser, Constraints::default());

        assert_eq!(prompt.text, "Your RDE test is valid so far.");
        assert_eq!(prompt.analysis_text, "25.0 minutes of test time remaining.");
        assert_eq!(prompt.emphasis, Emphasis::Positive);
        assert_eq!(prompt.parameters.reason_code, Some(1));
    }

    #[test]
    fn test_invalid_rde_reason_unknown() {
        let analyser = analyser_with(TelemetryTick {
            total_time_min: 100.5,
            ..Default::default()
        });
        let prompt = generate(Selection::InvalidRdeReason, &analyser, Constraints::default());

        assert_eq!(prompt.text, "The validity of your RDE test is unknown.");
        assert_eq!(prompt.analysis_text, "19.5 minutes of test time remaining.");
        assert_eq!(prompt.emphasis, Emphasis::Neutral);
    }

    #[test]
    fn test_invalid_rde_reason_with_lost_constraint() {
        let mut analyser = analyser_with(TelemetryTick {
            total_time_min: 119.,
            not_rde_signal: 3.,
            ..Default::default()
        });
        analyser.evaluate_constraints();
        let prompt = generate(Selection::InvalidRdeReason, &analyser, Constraints::default());

        assert_eq!(prompt.text, "Your RDE test is invalid: maximum speed exceeded.");
        assert_eq!(
            prompt.analysis_text,
            "High speed duration can no longer be satisfied."
        );
        assert_eq!(prompt.emphasis, Emphasis::Negative);
        assert_eq!(prompt.parameters.reason_code, Some(3));
    }
}
