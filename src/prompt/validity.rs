use serde::{Deserialize, Serialize};

/// Validity verdict of the upstream RDE validator, decoded from its reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidityReason {
    Unknown,
    Valid,
    BadTripDuration,
    MaximumSpeedExceeded,
    InvalidStoppingPercentage,
    AmbientTemperatureOutOfRange,
    InvalidDrivingDynamics,
    TooManyLongStops,
    InvalidAverageUrbanSpeed,
    InvalidUrbanProportion,
    InvalidRuralProportion,
    InvalidMotorwayProportion,
    FailedTripRequirements,
}

impl ValidityReason {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ValidityReason::Valid,
            2 => ValidityReason::BadTripDuration,
            3 => ValidityReason::MaximumSpeedExceeded,
            4 => ValidityReason::InvalidStoppingPercentage,
            5 => ValidityReason::AmbientTemperatureOutOfRange,
            6 => ValidityReason::InvalidDrivingDynamics,
            7 => ValidityReason::TooManyLongStops,
            8 => ValidityReason::InvalidAverageUrbanSpeed,
            9 => ValidityReason::InvalidUrbanProportion,
            10 => ValidityReason::InvalidRuralProportion,
            11 => ValidityReason::InvalidMotorwayProportion,
            12 => ValidityReason::FailedTripRequirements,
            _ => ValidityReason::Unknown,
        }
    }

    /// Decode the validator signals of a tick.
    ///
    /// The reason code travels in `not_rde_signal`; when it carries none, a raised
    /// `is_valid_signal` means the test is valid so far.
    pub fn from_signals(is_valid_signal: f64, not_rde_signal: f64) -> Self {
        let code = signal_code(not_rde_signal);
        if code == 0 && is_valid_signal == 1.0 {
            ValidityReason::Valid
        } else {
            ValidityReason::from_code(code)
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ValidityReason::Unknown => 0,
            ValidityReason::Valid => 1,
            ValidityReason::BadTripDuration => 2,
            ValidityReason::MaximumSpeedExceeded => 3,
            ValidityReason::InvalidStoppingPercentage => 4,
            ValidityReason::AmbientTemperatureOutOfRange => 5,
            ValidityReason::InvalidDrivingDynamics => 6,
            ValidityReason::TooManyLongStops => 7,
            ValidityReason::InvalidAverageUrbanSpeed => 8,
            ValidityReason::InvalidUrbanProportion => 9,
            ValidityReason::InvalidRuralProportion => 10,
            ValidityReason::InvalidMotorwayProportion => 11,
            ValidityReason::FailedTripRequirements => 12,
        }
    }
}

fn signal_code(signal: f64) -> u8 {
    if !signal.is_finite() || signal < 0. {
        return 0;
    }
    // anything past the table decodes as unknown
    signal.round().min(u8::MAX as f64) as u8
}

impl std::fmt::Display for ValidityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            ValidityReason::Unknown => "unknown",
            ValidityReason::Valid => "valid",
            ValidityReason::BadTripDuration => "bad trip duration",
            ValidityReason::MaximumSpeedExceeded => "maximum speed exceeded",
            ValidityReason::InvalidStoppingPercentage => "invalid stopping percentage",
            ValidityReason::AmbientTemperatureOutOfRange => "ambient temperature out of range",
            ValidityReason::InvalidDrivingDynamics => "invalid driving dynamics",
            ValidityReason::TooManyLongStops => "too many long stops",
            ValidityReason::InvalidAverageUrbanSpeed => "invalid average urban speed",
            ValidityReason::InvalidUrbanProportion => "invalid urban proportion",
            ValidityReason::InvalidRuralProportion => "invalid rural proportion",
            ValidityReason::InvalidMotorwayProportion => "invalid motorway proportion",
            ValidityReason::FailedTripRequirements => "failed trip requirements",
        };
        write!(f, "{}", reason)
    }
}
