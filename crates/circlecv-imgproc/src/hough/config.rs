use super::HoughError;
use crate::parallel::ExecutionStrategy;

/// Memory ceiling used by [`HoughCirclesConfig::default`], 256 MiB.
pub const DEFAULT_MAX_ACCUMULATOR_BYTES: usize = 256 * 1024 * 1024;

/// Storage used for the vote accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccumulatorStrategy {
    /// Dense when it fits the memory ceiling, sparse otherwise.
    #[default]
    Auto,
    /// Flat array with one counter per cell.
    Dense,
    /// Hash map holding only the cells that received votes.
    Sparse,
}

/// Parameters of the gradient Hough circle detector.
///
/// # Example
///
/// ```
/// use circlecv_imgproc::hough::{AccumulatorStrategy, HoughCirclesConfig};
///
/// let config = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 30)
///     .with_accumulator(AccumulatorStrategy::Sparse);
///
/// assert!(config.validate().is_ok());
/// assert!(config.with_radius_range(30, 10).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HoughCirclesConfig {
    /// Inverse ratio of the accumulator resolution to the image resolution.
    pub dp: f32,
    /// Minimum distance between the centers of two detected circles.
    pub min_dist: f32,
    /// Upper gradient threshold, edges are kept from half of it.
    pub param1: f32,
    /// Minimum number of votes for a center to be reported.
    pub param2: f32,
    /// Smallest radius searched, in pixels.
    pub min_radius: i32,
    /// Largest radius searched, in pixels.
    pub max_radius: i32,
    /// Accumulator storage.
    pub accumulator: AccumulatorStrategy,
    /// How gradient and voting work is scheduled.
    pub execution: ExecutionStrategy,
    /// Ceiling for the accumulator memory, worker partials included.
    pub max_accumulator_bytes: usize,
}

impl Default for HoughCirclesConfig {
    fn default() -> Self {
        Self {
            dp: 1.2,
            min_dist: 20.0,
            param1: 50.0,
            param2: 50.0,
            min_radius: 10,
            max_radius: 500,
            accumulator: AccumulatorStrategy::Auto,
            execution: ExecutionStrategy::Auto,
            max_accumulator_bytes: DEFAULT_MAX_ACCUMULATOR_BYTES,
        }
    }
}

impl HoughCirclesConfig {
    /// Create a config with the detection parameters and default strategies.
    pub fn new(
        dp: f32,
        min_dist: f32,
        param1: f32,
        param2: f32,
        min_radius: i32,
        max_radius: i32,
    ) -> Self {
        Self {
            dp,
            min_dist,
            param1,
            param2,
            min_radius,
            max_radius,
            ..Default::default()
        }
    }

    /// Set the accumulator resolution ratio.
    pub fn with_dp(mut self, dp: f32) -> Self {
        self.dp = dp;
        self
    }

    /// Set the minimum distance between centers.
    pub fn with_min_dist(mut self, min_dist: f32) -> Self {
        self.min_dist = min_dist;
        self
    }

    /// Set the gradient and vote thresholds.
    pub fn with_thresholds(mut self, param1: f32, param2: f32) -> Self {
        self.param1 = param1;
        self.param2 = param2;
        self
    }

    /// Set the searched radius range, both ends included.
    pub fn with_radius_range(mut self, min_radius: i32, max_radius: i32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    /// Set the accumulator storage.
    pub fn with_accumulator(mut self, accumulator: AccumulatorStrategy) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Set the execution strategy.
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Set the accumulator memory ceiling in bytes.
    pub fn with_max_accumulator_bytes(mut self, max_accumulator_bytes: usize) -> Self {
        self.max_accumulator_bytes = max_accumulator_bytes;
        self
    }

    /// Check every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`HoughError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), HoughError> {
        check_positive("dp", self.dp)?;
        check_positive("min_dist", self.min_dist)?;
        check_positive("param1", self.param1)?;
        check_positive("param2", self.param2)?;

        if self.min_radius < 0 {
            return Err(HoughError::invalid(
                "min_radius",
                format!("must be >= 0, got {}", self.min_radius),
            ));
        }
        if self.max_radius <= 0 {
            return Err(HoughError::invalid(
                "max_radius",
                format!("must be > 0, got {}", self.max_radius),
            ));
        }
        if self.min_radius > self.max_radius {
            return Err(HoughError::invalid(
                "min_radius",
                format!(
                    "must not exceed max_radius ({} > {})",
                    self.min_radius, self.max_radius
                ),
            ));
        }

        if self.max_accumulator_bytes == 0 {
            return Err(HoughError::invalid("max_accumulator_bytes", "must be > 0"));
        }
        if self.execution == ExecutionStrategy::Fixed(0) {
            return Err(HoughError::invalid("execution", "thread count must be > 0"));
        }

        Ok(())
    }

    /// Number of radii searched.
    pub(crate) fn num_radii(&self) -> usize {
        (self.max_radius as i64 - self.min_radius as i64 + 1) as usize
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), HoughError> {
    if !value.is_finite() {
        return Err(HoughError::invalid(name, format!("must be finite, got {value}")));
    }
    if value <= 0.0 {
        return Err(HoughError::invalid(name, format!("must be > 0, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HoughCirclesConfig::default();
        assert_eq!(config.dp, 1.2);
        assert_eq!(config.min_dist, 20.0);
        assert_eq!((config.param1, config.param2), (50.0, 50.0));
        assert_eq!((config.min_radius, config.max_radius), (10, 500));
        assert_eq!(config.max_accumulator_bytes, 256 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        let base = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 30);
        let cases = [
            (base.with_dp(0.0), "dp"),
            (base.with_dp(f32::NAN), "dp"),
            (base.with_min_dist(-1.0), "min_dist"),
            (base.with_thresholds(0.0, 40.0), "param1"),
            (base.with_thresholds(50.0, f32::INFINITY), "param2"),
            (base.with_radius_range(-1, 30), "min_radius"),
            (base.with_radius_range(0, 0), "max_radius"),
            (base.with_radius_range(31, 30), "min_radius"),
            (base.with_max_accumulator_bytes(0), "max_accumulator_bytes"),
            (base.with_execution(ExecutionStrategy::Fixed(0)), "execution"),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(HoughError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected an invalid `{expected}`, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_equal_radius_bounds() {
        let config = HoughCirclesConfig::default().with_radius_range(0, 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.num_radii(), 2);

        let config = config.with_radius_range(12, 12);
        assert!(config.validate().is_ok());
        assert_eq!(config.num_radii(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_json() -> Result<(), serde_json::Error> {
        let config = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 30)
            .with_accumulator(AccumulatorStrategy::Dense)
            .with_execution(ExecutionStrategy::Fixed(2));
        let json = serde_json::to_string(&config)?;
        let back: HoughCirclesConfig = serde_json::from_str(&json)?;
        assert_eq!(back, config);

        // missing fields fall back to the defaults
        let partial: HoughCirclesConfig = serde_json::from_str(r#"{ "param2": 30.0 }"#)?;
        assert_eq!(partial, HoughCirclesConfig::default().with_thresholds(50.0, 30.0));
        Ok(())
    }
}
