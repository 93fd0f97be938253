use super::super::{
    HeartRateZones, IntensityZone, TrainingRecommendation, TrainingRecommendationReport,
};

/// Base of the age-based maximum heart rate estimate (`220 - age`)
pub const MAX_HEART_RATE_BASE: i32 = 220;
/// Zone bounds in percent of the maximum heart rate
pub const MODERATE_LOWER_PERCENT: i64 = 50;
pub const MODERATE_UPPER_PERCENT: i64 = 70;
pub const HIGH_UPPER_PERCENT: i64 = 85;

fn percent_of(percent: i64, max_heart_rate: f64) -> f64 {
    percent as f64 * max_heart_rate / 100.0
}

impl HeartRateZones {
    pub fn for_age(age: i32) -> Self {
        let max_heart_rate = f64::from(MAX_HEART_RATE_BASE - age);
        Self {
            max_heart_rate,
            moderate_min: percent_of(MODERATE_LOWER_PERCENT, max_heart_rate),
            moderate_max: percent_of(MODERATE_UPPER_PERCENT, max_heart_rate),
            high_min: percent_of(MODERATE_UPPER_PERCENT, max_heart_rate),
            high_max: percent_of(HIGH_UPPER_PERCENT, max_heart_rate),
        }
    }

    /// Moderate is checked first, so a reading on the shared boundary is moderate.
    ///
    /// Compares in whole percent points of the integral maximum heart rate;
    /// the float bounds are for display only.
    pub fn classify(&self, intensity: i32) -> Option<IntensityZone> {
        let max_heart_rate = self.max_heart_rate.round() as i64;
        let scaled = i64::from(intensity) * 100;
        let within = |lower: i64, upper: i64| {
            lower * max_heart_rate <= scaled && scaled <= upper * max_heart_rate
        };

        if within(MODERATE_LOWER_PERCENT, MODERATE_UPPER_PERCENT) {
            Some(IntensityZone::Moderate)
        } else if within(MODERATE_UPPER_PERCENT, HIGH_UPPER_PERCENT) {
            Some(IntensityZone::High)
        } else {
            None
        }
    }
}

/// Classifies recent training intensities against the athlete's heart-rate
/// zones. Samples are taken as given; limiting and ordering them is up to
/// the caller.
pub struct TrainingRecommendationGenerator;

impl Default for TrainingRecommendationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingRecommendationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, age: i32, intensities: &[i32]) -> TrainingRecommendationReport {
        let zones = HeartRateZones::for_age(age);

        let (moderate_count, high_count) =
            intensities
                .iter()
                .fold((0u32, 0u32), |(moderate, high), intensity| {
                    match zones.classify(*intensity) {
                        Some(IntensityZone::Moderate) => (moderate + 1, high),
                        Some(IntensityZone::High) => (moderate, high + 1),
                        None => (moderate, high),
                    }
                });
        let total = intensities.len() as u32;

        let recommendation = recommend(moderate_count, high_count, total);

        TrainingRecommendationReport {
            recommendation,
            message: recommendation.message().to_string(),
            zones,
            moderate_count,
            high_count,
            total,
        }
    }
}

fn recommend(moderate_count: u32, high_count: u32, total: u32) -> TrainingRecommendation {
    // a zone dominates when it holds strictly more than half of the samples
    if total == 0 {
        TrainingRecommendation::NoRecentData
    } else if 2 * moderate_count > total {
        TrainingRecommendation::ModerateHeavy
    } else if 2 * high_count > total {
        TrainingRecommendation::HighIntensityHeavy
    } else {
        TrainingRecommendation::Balanced
    }
}
