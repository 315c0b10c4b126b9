use super::activation::Activation;
use super::initializer::Initializer;
use super::input_validation_function::validate_dimension_greater_than_zero;
use crate::ModelError;
use ndarray::{Array1, Array2, Array3, Axis, s};

/// Initializer specification for the attention parameters
///
/// # Fields
///
/// - `visual_init` - Initializer for the visual projection weight (shape: units × regions)
/// - `sentinel_init` - Initializer for the sentinel projection weight (shape: units × regions)
/// - `hidden_init` - Initializer for the hidden projection weight (shape: units × regions)
/// - `score_init` - Initializer for the score-reduction vector (shape: regions)
/// - `fuse` - Nonlinearity mapping the concatenated branch scores to a probability distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionSpec {
    pub visual_init: Initializer,
    pub sentinel_init: Initializer,
    pub hidden_init: Initializer,
    pub score_init: Initializer,
    pub fuse: Activation,
}

impl Default for AttentionSpec {
    /// Normal(0.1) weights with a softmax fuse
    fn default() -> Self {
        Self {
            visual_init: Initializer::weight_default(),
            sentinel_init: Initializer::weight_default(),
            hidden_init: Initializer::weight_default(),
            score_init: Initializer::weight_default(),
            fuse: Activation::Softmax,
        }
    }
}

/// Materialized two-branch attention parameters
///
/// The region branch scores every visual position against the new hidden state;
/// the sentinel branch scores the gated sentinel vector the same way. Both
/// branches deliberately share `w_hidden` and `w_score`, following the original
/// adaptive attention design.
///
/// # Fields
///
/// - `w_visual` - Visual projection weight with shape (units, regions)
/// - `w_sentinel` - Sentinel projection weight with shape (units, regions)
/// - `w_hidden` - Hidden projection weight with shape (units, regions), shared by both branches
/// - `w_score` - Score-reduction vector with shape (regions,), shared by both branches
/// - `fuse` - The fusing nonlinearity, softmax by default
#[derive(Debug, Clone)]
pub struct AttentionGate {
    pub w_visual: Array2<f32>,
    pub w_sentinel: Array2<f32>,
    pub w_hidden: Array2<f32>,
    pub w_score: Array1<f32>,
    pub fuse: Activation,
}

impl AttentionGate {
    /// Materializes the attention parameters from their spec
    ///
    /// # Parameters
    ///
    /// - `spec` - Initializer specification
    /// - `units` - Number of recurrent units
    /// - `regions` - Number of visual positions in the visual context
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - The attention parameters with all tensors generated
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If `units` or `regions` is 0, or an initializer is invalid
    pub fn from_spec(spec: &AttentionSpec, units: usize, regions: usize) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(units, "units")?;
        validate_dimension_greater_than_zero(regions, "regions")?;

        Ok(Self {
            w_visual: spec.visual_init.sample((units, regions))?,
            w_sentinel: spec.sentinel_init.sample((units, regions))?,
            w_hidden: spec.hidden_init.sample((units, regions))?,
            w_score: spec.score_init.sample_vector(regions)?,
            fuse: spec.fuse,
        })
    }

    /// Number of visual regions this gate was configured for
    pub fn regions(&self) -> usize {
        self.w_score.len()
    }

    /// Computes the fused attention distribution over `regions + 1` slots
    ///
    /// The region branch computes, for every region r,
    /// `z[b, r] = Σ_k nl(visual[b, r, ·] · w_visual + (hidden · w_hidden)[b, r])[k] · w_score[k]`;
    /// the sentinel branch reduces `nl(sentinel · w_sentinel + hidden · w_hidden)`
    /// against the same score vector to one scalar per batch element. The two are
    /// concatenated and passed through the fuse nonlinearity, so each row of the
    /// result is a probability distribution whose last slot belongs to the sentinel.
    ///
    /// # Parameters
    ///
    /// - `hidden` - New hidden state with shape (batch, units)
    /// - `sentinel` - Sentinel vector with shape (batch, units)
    /// - `visual` - Visual context with shape (batch, regions, units)
    /// - `nonlinearity` - The layer nonlinearity applied inside both branches
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - Attention weights with shape (batch, regions + 1)
    pub fn scores(
        &self,
        hidden: &Array2<f32>,
        sentinel: &Array2<f32>,
        visual: &Array3<f32>,
        nonlinearity: Activation,
    ) -> Array2<f32> {
        let batch = hidden.nrows();
        let regions = self.regions();

        // Shared hidden projection, (batch, regions)
        let hg = hidden.dot(&self.w_hidden);

        let mut fused_input = Array2::<f32>::zeros((batch, regions + 1));

        // Region branch, one (regions, regions) score block per batch element
        for b in 0..batch {
            let vp = visual.index_axis(Axis(0), b).dot(&self.w_visual);
            let hg_col = hg.row(b).insert_axis(Axis(1));
            let pre = &vp + &hg_col;
            let activated = nonlinearity.apply(&pre);
            let zt = (&activated * &self.w_score).sum_axis(Axis(1));
            fused_input.slice_mut(s![b, ..regions]).assign(&zt);
        }

        // Sentinel branch, one scalar per batch element
        let pre_v = sentinel.dot(&self.w_sentinel) + &hg;
        let activated_v = nonlinearity.apply(&pre_v);
        let vt = (&activated_v * &self.w_score).sum_axis(Axis(1));
        fused_input.slice_mut(s![.., regions]).assign(&vt);

        self.fuse.apply(&fused_input)
    }

    /// Computes the attention-weighted context vector
    ///
    /// The visual context is extended with the sentinel along the region axis and
    /// reduced with the fused attention distribution.
    ///
    /// # Parameters
    ///
    /// - `hidden` - New hidden state with shape (batch, units)
    /// - `sentinel` - Sentinel vector with shape (batch, units)
    /// - `visual` - Visual context with shape (batch, regions, units)
    /// - `nonlinearity` - The layer nonlinearity applied inside both branches
    ///
    /// # Returns
    ///
    /// * `(Array2<f32>, Array2<f32>)` - The context with shape (batch, units) and
    ///   the attention weights with shape (batch, regions + 1) that produced it
    pub fn context(
        &self,
        hidden: &Array2<f32>,
        sentinel: &Array2<f32>,
        visual: &Array3<f32>,
        nonlinearity: Activation,
    ) -> (Array2<f32>, Array2<f32>) {
        let batch = hidden.nrows();
        let units = hidden.ncols();
        let regions = self.regions();

        let alpha = self.scores(hidden, sentinel, visual, nonlinearity);

        let mut context = Array2::<f32>::zeros((batch, units));
        for b in 0..batch {
            let alpha_b = alpha.row(b);
            let weighted = alpha_b
                .slice(s![..regions])
                .dot(&visual.index_axis(Axis(0), b));
            let with_sentinel = weighted + &(&sentinel.row(b) * alpha_b[regions]);
            context.row_mut(b).assign(&with_sentinel);
        }

        (context, alpha)
    }
}
