use circlecv_image::{Image, ImageDtype};

use super::accumulator::{
    plan_storage, AccumulatorShape, DenseAccumulator, SparseAccumulator, Storage,
    VoteAccumulator, VotePlan, Voter,
};
use super::config::HoughCirclesConfig;
use super::edges::{select_edges, EdgeSet};
use super::gradient::GradientField;
use super::peaks::{collect_candidates, select_peaks};
use super::HoughError;

/// A detected circle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircleCandidate {
    /// Horizontal center position in pixels.
    pub center_x: f32,
    /// Vertical center position in pixels.
    pub center_y: f32,
    /// Radius in pixels.
    pub radius: u32,
    /// Number of votes gathered by the center and radius.
    pub votes: u32,
}

/// Circles found in one field, strongest first.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CircleResult {
    circles: Vec<CircleCandidate>,
    count: usize,
    mean_radius: Option<f32>,
}

impl CircleResult {
    /// Accepted circles by descending votes.
    pub fn circles(&self) -> &[CircleCandidate] {
        &self.circles
    }

    /// Number of circles.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean radius of the circles, `None` when there is none.
    pub fn mean_radius(&self) -> Option<f32> {
        self.mean_radius
    }

    /// Whether no circle was found.
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Iterate over the circles.
    pub fn iter(&self) -> std::slice::Iter<'_, CircleCandidate> {
        self.circles.iter()
    }

    /// Consume the result and return the circles.
    pub fn into_circles(self) -> Vec<CircleCandidate> {
        self.circles
    }
}

impl<'a> IntoIterator for &'a CircleResult {
    type Item = &'a CircleCandidate;
    type IntoIter = std::slice::Iter<'a, CircleCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.circles.iter()
    }
}

/// Build the final result from the accepted candidates, keeping their order.
pub fn assemble(circles: Vec<CircleCandidate>) -> CircleResult {
    let count = circles.len();
    let mean_radius = if count == 0 {
        None
    } else {
        let total = circles.iter().map(|c| c.radius as f64).sum::<f64>();
        Some((total / count as f64) as f32)
    };

    CircleResult {
        circles,
        count,
        mean_radius,
    }
}

/// Progress of a [`HoughCircleDetector`] through one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectionStage {
    /// No detection started yet.
    #[default]
    Idle,
    /// Computing the gradient field.
    ComputingGradient,
    /// Selecting edges, casting votes and thresholding the cells.
    Voting,
    /// Ranking and suppressing the peaks.
    ExtractingPeaks,
    /// The result is ready.
    Assembled,
    /// The last detection returned an error.
    Failed,
}

/// Gradient Hough circle detector.
///
/// The detector owns a validated config and records the stage reached by the
/// last call to [`HoughCircleDetector::detect`].
///
/// # Example
///
/// ```
/// use circlecv_image::Image;
/// use circlecv_imgproc::hough::{DetectionStage, HoughCircleDetector, HoughCirclesConfig};
///
/// let config = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 30);
/// let mut detector = HoughCircleDetector::new(config).unwrap();
/// assert_eq!(detector.stage(), DetectionStage::Idle);
///
/// let field = Image::<u8, 1>::from_size_val([64, 64].into(), 0).unwrap();
/// let result = detector.detect(&field).unwrap();
///
/// assert_eq!(result.count(), 0);
/// assert_eq!(result.mean_radius(), None);
/// assert_eq!(detector.stage(), DetectionStage::Assembled);
/// ```
#[derive(Debug, Clone)]
pub struct HoughCircleDetector {
    config: HoughCirclesConfig,
    stage: DetectionStage,
}

impl HoughCircleDetector {
    /// Create a detector.
    ///
    /// # Errors
    ///
    /// Returns [`HoughError::InvalidParameter`] if the config does not validate.
    pub fn new(config: HoughCirclesConfig) -> Result<Self, HoughError> {
        config.validate()?;
        Ok(Self {
            config,
            stage: DetectionStage::Idle,
        })
    }

    /// The detection parameters.
    pub fn config(&self) -> &HoughCirclesConfig {
        &self.config
    }

    /// Stage reached by the last detection.
    pub fn stage(&self) -> DetectionStage {
        self.stage
    }

    /// Detect circles in a grayscale, already smoothed, intensity field.
    ///
    /// # Errors
    ///
    /// Fails on an empty field, when the accumulator would exceed the memory
    /// ceiling, or when the thread pool cannot be built. The stage is then
    /// [`DetectionStage::Failed`].
    pub fn detect<T: ImageDtype>(&mut self, field: &Image<T, 1>) -> Result<CircleResult, HoughError> {
        self.stage = DetectionStage::Idle;
        let result = self.run(field);
        if result.is_err() {
            self.stage = DetectionStage::Failed;
        }
        result
    }

    fn run<T: ImageDtype>(&mut self, field: &Image<T, 1>) -> Result<CircleResult, HoughError> {
        let config = self.config;
        let size = field.size();
        if size.is_empty() {
            return Err(HoughError::EmptyInput);
        }

        self.stage = DetectionStage::ComputingGradient;
        let field = Image::<f32, 1>::new(size, field.as_slice().iter().map(|&v| v.into()).collect())?;
        let gradient = GradientField::compute(&field, config.execution)?;
        log::debug!("computed the gradient of a {}x{} field", size.width, size.height);

        self.stage = DetectionStage::Voting;
        let edges = select_edges(&gradient, config.param1);
        log::debug!("{} edge pixels over {}", edges.len(), config.param1 / 2.0);

        let shape = AccumulatorShape::new(size, config.dp, config.num_radii());
        let max_votes = edges.len().saturating_mul(shape.radii).saturating_mul(2);
        let plan = plan_storage(
            config.accumulator,
            shape,
            edges.len(),
            config.execution.num_workers(max_votes),
            config.max_accumulator_bytes,
        )?;
        log::debug!(
            "voting into a {}x{}x{} {:?} accumulator, {} radii per pass with {} worker(s)",
            shape.cols,
            shape.rows,
            shape.radii,
            plan.storage,
            plan.band,
            plan.workers
        );

        let voter = Voter {
            shape,
            size,
            dp: config.dp,
            min_radius: config.min_radius as usize,
        };
        let circles = match plan.storage {
            Storage::Dense => self.vote_and_extract::<DenseAccumulator>(voter, &edges, plan)?,
            Storage::Sparse => self.vote_and_extract::<SparseAccumulator>(voter, &edges, plan)?,
        };

        let result = assemble(circles);
        self.stage = DetectionStage::Assembled;
        log::debug!(
            "found {} circle(s), mean radius {:?}",
            result.count(),
            result.mean_radius()
        );

        Ok(result)
    }

    fn vote_and_extract<A: VoteAccumulator>(
        &mut self,
        voter: Voter,
        edges: &EdgeSet,
        plan: VotePlan,
    ) -> Result<Vec<CircleCandidate>, HoughError> {
        let config = self.config;
        let radii = voter.shape.radii;

        let mut candidates = Vec::new();
        for start in (0..radii).step_by(plan.band) {
            let band = Voter {
                shape: AccumulatorShape {
                    radii: plan.band.min(radii - start),
                    ..voter.shape
                },
                min_radius: voter.min_radius + start,
                ..voter
            };
            let acc = band.cast::<A>(edges, config.execution, plan.workers)?;
            candidates.extend(collect_candidates(
                &acc,
                config.param2,
                config.dp,
                band.min_radius as u32,
            ));
        }

        self.stage = DetectionStage::ExtractingPeaks;
        Ok(select_peaks(candidates, config.min_dist))
    }
}

/// Detect circles in a grayscale, already smoothed, intensity field.
///
/// Shorthand for [`HoughCircleDetector::new`] followed by
/// [`HoughCircleDetector::detect`].
///
/// # Arguments
///
/// * `field` - The intensity field, values in `[0, 255]`.
/// * `config` - The detection parameters.
///
/// # Errors
///
/// See [`HoughCircleDetector::new`] and [`HoughCircleDetector::detect`].
pub fn hough_circles<T: ImageDtype>(
    field: &Image<T, 1>,
    config: &HoughCirclesConfig,
) -> Result<CircleResult, HoughError> {
    HoughCircleDetector::new(*config)?.detect(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hough::AccumulatorStrategy;
    use crate::parallel::ExecutionStrategy;
    use circlecv_image::ImageSize;

    fn candidate(radius: u32, votes: u32) -> CircleCandidate {
        CircleCandidate {
            center_x: 0.0,
            center_y: 0.0,
            radius,
            votes,
        }
    }

    #[test]
    fn test_assemble() {
        let result = assemble(vec![candidate(10, 9), candidate(13, 4)]);
        assert_eq!(result.count(), 2);
        assert_eq!(result.mean_radius(), Some(11.5));
        assert_eq!(result.iter().map(|c| c.votes).collect::<Vec<_>>(), vec![9, 4]);

        let empty = assemble(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.count(), 0);
        assert_eq!(empty.mean_radius(), None);
        assert_eq!(empty, CircleResult::default());
    }

    #[test]
    fn test_detector_rejects_config() {
        let config = HoughCirclesConfig::default().with_radius_range(40, 20);
        assert!(matches!(
            HoughCircleDetector::new(config),
            Err(HoughError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_detector_stages() -> Result<(), HoughError> {
        let config = HoughCirclesConfig::new(1.0, 10.0, 50.0, 10.0, 2, 5)
            .with_accumulator(AccumulatorStrategy::Dense)
            .with_execution(ExecutionStrategy::Serial);
        let mut detector = HoughCircleDetector::new(config)?;
        assert_eq!(detector.stage(), DetectionStage::Idle);

        let field = Image::<f32, 1>::from_size_val([16, 16].into(), 0.0)?;
        detector.detect(&field)?;
        assert_eq!(detector.stage(), DetectionStage::Assembled);

        let empty = Image::<f32, 1>::new(ImageSize { width: 0, height: 3 }, vec![])?;
        assert_eq!(detector.detect(&empty), Err(HoughError::EmptyInput));
        assert_eq!(detector.stage(), DetectionStage::Failed);

        // a failed run does not poison the next one
        detector.detect(&field)?;
        assert_eq!(detector.stage(), DetectionStage::Assembled);

        let mut tight = HoughCircleDetector::new(config.with_max_accumulator_bytes(64))?;
        assert_eq!(
            tight.detect(&field),
            Err(HoughError::ResourceLimitExceeded {
                required: 16 * 16 * 4,
                limit: 64
            })
        );
        assert_eq!(tight.stage(), DetectionStage::Failed);

        Ok(())
    }
}
