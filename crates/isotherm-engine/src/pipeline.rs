//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::compute`] which returns only the final path,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use isotherm_engine::{ContourConfig, EngineError, Pipeline, Sample, SampleSet};
//! # fn run() -> Result<(), EngineError> {
//! let samples = SampleSet::try_new(vec![
//!     Sample::new(35.0, 139.0, 18.0),
//!     Sample::new(35.0, 139.2, 24.0),
//!     Sample::new(35.2, 139.0, 21.0),
//! ])?;
//! let staged = Pipeline::new(&samples, 20.0, ContourConfig::default())?
//!     .extract()?
//!     .order()
//!     .smooth()
//!     .into_result();
//!
//! assert_eq!(staged.smoothed.len(), staged.ordered.len());
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. Only [`Pending`] borrows the sample set; every later
//! stage owns its data.

use crate::extract::Extraction;
use crate::sample::SampleSet;
use crate::types::{ContourConfig, ContourPath, EngineError, GeoPoint, StagedResult};

/// Entry point of the staged pipeline.
///
/// `Pipeline::new` builds the [`Pending`] stage.
pub type Pipeline<'a> = Pending<'a>;

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The samples, threshold, and config are validated but not yet scanned.
/// Call [`extract`](Self::extract) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .extract() to continue"]
pub struct Pending<'a> {
    samples: &'a SampleSet,
    threshold: f64,
    config: ContourConfig,
}

impl<'a> Pending<'a> {
    /// Start a contour computation for `threshold` over `samples`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails
    /// [`ContourConfig::validate`] or `threshold` is not finite.
    pub fn new(
        samples: &'a SampleSet,
        threshold: f64,
        config: ContourConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        crate::extract::check_threshold(threshold)?;
        Ok(Self {
            samples,
            threshold,
            config,
        })
    }

    /// The input samples.
    #[must_use]
    pub const fn samples(&self) -> &'a SampleSet {
        self.samples
    }

    /// The threshold being traced.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ContourConfig {
        &self.config
    }

    /// Scan the grid for threshold cells and advance to the
    /// [`Extracted`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GridTooLarge`] if the scan region holds more
    /// than `config.max_grid_cells` cells.
    pub fn extract(self) -> Result<Extracted, EngineError> {
        let extraction = crate::extract::extract(self.samples, self.threshold, &self.config)?;
        Ok(Extracted {
            threshold: self.threshold,
            config: self.config,
            extraction,
        })
    }
}

// ───────────────────────── Stage 1: Extracted ────────────────────────

/// Pipeline state after the threshold scan.
///
/// Call [`order`](Self::order) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .order() to continue"]
pub struct Extracted {
    threshold: f64,
    config: ContourConfig,
    extraction: Extraction,
}

impl Extracted {
    /// Region, counts, and accepted cells from the scan.
    #[must_use]
    pub const fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    /// Accepted cells in scan order.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.extraction.points
    }

    /// Order the accepted cells into a loop and advance to the
    /// [`Ordered`] stage.
    pub fn order(self) -> Ordered {
        let ordered = crate::order::order_by_angle(&self.extraction.points);
        Ordered {
            threshold: self.threshold,
            config: self.config,
            extraction: self.extraction,
            ordered,
        }
    }
}

// ───────────────────────── Stage 2: Ordered ──────────────────────────

/// Pipeline state after angular ordering.
///
/// Call [`smooth`](Self::smooth) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .smooth() to continue"]
pub struct Ordered {
    threshold: f64,
    config: ContourConfig,
    extraction: Extraction,
    ordered: ContourPath,
}

impl Ordered {
    /// The ordered, unsmoothed path.
    #[must_use]
    pub const fn ordered(&self) -> &ContourPath {
        &self.ordered
    }

    /// Smooth the ordered path and advance to the [`Smoothed`] stage.
    pub fn smooth(self) -> Smoothed {
        let smoothed =
            crate::smooth::smooth_circular(&self.ordered, self.config.smoothing_half_width);
        Smoothed {
            threshold: self.threshold,
            extraction: self.extraction,
            ordered: self.ordered,
            smoothed,
        }
    }
}

// ───────────────────────── Stage 3: Smoothed ─────────────────────────

/// Pipeline state after smoothing, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`] containing all intermediates.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Smoothed {
    threshold: f64,
    extraction: Extraction,
    ordered: ContourPath,
    smoothed: ContourPath,
}

impl Smoothed {
    /// The final contour path.
    #[must_use]
    pub const fn smoothed(&self) -> &ContourPath {
        &self.smoothed
    }

    /// Consume the pipeline and return the final path only.
    #[must_use]
    pub fn into_path(self) -> ContourPath {
        self.smoothed
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            threshold: self.threshold,
            extraction: self.extraction,
            ordered: self.ordered,
            smoothed: self.smoothed,
        }
    }
}
