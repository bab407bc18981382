use thiserror::Error;

use crate::models::AgeBand;

/// Errors from age band derivation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgeBandError {
    #[error("Invalid input: average age must be a positive number, got {0}")]
    InvalidInput(f64),
}

/// Derives the allowed age range of a new event from its group's average age
///
/// ```text
/// spread  = ln(average_age) * spread_multiplier
/// min_age = max(min_age_floor,   floor(average_age - spread))
/// max_age = min(max_age_ceiling, ceil(average_age + spread))
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBandPolicy {
    pub min_age_floor: i32,
    pub max_age_ceiling: i32,
    pub spread_multiplier: f64,
}

impl Default for AgeBandPolicy {
    fn default() -> Self {
        Self {
            min_age_floor: 13,
            max_age_ceiling: 100,
            spread_multiplier: 4.0,
        }
    }
}

impl AgeBandPolicy {
    pub fn new(min_age_floor: i32, max_age_ceiling: i32, spread_multiplier: f64) -> Self {
        Self {
            min_age_floor,
            max_age_ceiling,
            spread_multiplier,
        }
    }

    /// Half-width of the band around `average_age`
    #[inline]
    pub fn spread(&self, average_age: f64) -> f64 {
        average_age.ln() * self.spread_multiplier
    }

    /// Derive the age band for an average age
    ///
    /// Fails with [`AgeBandError::InvalidInput`] when the logarithm is
    /// undefined (zero, negative, or non-finite input).
    pub fn derive(&self, average_age: f64) -> Result<AgeBand, AgeBandError> {
        if !average_age.is_finite() || average_age <= 0.0 {
            return Err(AgeBandError::InvalidInput(average_age));
        }

        // Below e the log goes negative; the band never inverts around the mean
        let spread = self.spread(average_age).abs();
        let raw_min = (average_age - spread).floor();
        let raw_max = (average_age + spread).ceil();

        let mut min_age = clamp_to_i32(raw_min).max(self.min_age_floor);
        let mut max_age = clamp_to_i32(raw_max).min(self.max_age_ceiling);

        // A band entirely outside [floor, ceiling] collapses onto the nearest edge
        if min_age > max_age {
            if raw_max < f64::from(self.min_age_floor) {
                max_age = min_age;
            } else {
                min_age = max_age;
            }
        }

        Ok(AgeBand { min_age, max_age })
    }
}

#[inline]
fn clamp_to_i32(value: f64) -> i32 {
    value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
