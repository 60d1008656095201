/// Speed (km/h) above which time counts as high speed
const HIGH_SPEED_KMH: f64 = 100.0;
/// Speed (km/h) above which time counts as very high speed
const VERY_HIGH_SPEED_KMH: f64 = 145.0;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Time-weighted integrator of the speed stream.
///
/// Elapsed time between two samples is credited to a speed band only when both the
/// previous and the current sample are in that band, so a single noisy sample at a band
/// boundary never adds time.
#[derive(Debug, Clone, Default)]
pub struct SpeedAccumulator {
    stopping_min: f64,
    high_speed_min: f64,
    very_high_speed_min: f64,
    previous_speed_kmh: f64,
    last_updated_ms: Option<i64>,
}

impl SpeedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new speed sample taken at `now_ms` (milliseconds, any monotonic epoch).
    pub fn update(&mut self, speed_kmh: f64, now_ms: i64) {
        // first sample and clock jumps backwards contribute nothing
        let elapsed_ms = self
            .last_updated_ms
            .map(|last| now_ms.saturating_sub(last).max(0))
            .unwrap_or(0);
        let elapsed_min = elapsed_ms as f64 / MS_PER_MINUTE;

        if speed_kmh == 0.0 && self.previous_speed_kmh == 0.0 {
            self.stopping_min += elapsed_min;
        }
        if speed_kmh > HIGH_SPEED_KMH && self.previous_speed_kmh > HIGH_SPEED_KMH {
            self.high_speed_min += elapsed_min;
        }
        if speed_kmh > VERY_HIGH_SPEED_KMH && self.previous_speed_kmh > VERY_HIGH_SPEED_KMH {
            self.very_high_speed_min += elapsed_min;
        }

        self.previous_speed_kmh = speed_kmh;
        self.last_updated_ms = Some(now_ms);
    }

    /// Minutes spent stationary
    pub fn stopping_time(&self) -> f64 {
        self.stopping_min
    }

    /// Minutes spent above 100 km/h
    pub fn high_speed_time(&self) -> f64 {
        self.high_speed_min
    }

    /// Minutes spent above 145 km/h
    pub fn very_high_speed_time(&self) -> f64 {
        self.very_high_speed_min
    }

    pub fn previous_speed(&self) -> f64 {
        self.previous_speed_kmh
    }

    pub fn last_updated(&self) -> Option<i64> {
        self.last_updated_ms
    }
}
