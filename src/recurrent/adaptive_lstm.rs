use super::Tensor;
use super::activation::Activation;
use super::attention::{AttentionGate, AttentionSpec};
use super::driver::{DriveMode, SequenceDriver};
use super::gate::{Gate, GateSpec, PeepholeWeights, StackedGateWeights};
use super::initializer::Initializer;
use super::input_validation_function::{
    validate_dimension_greater_than_zero, validate_mask_shape, validate_state_override,
    validate_visual_shape,
};
use super::step::{RecurrentState, StepContext};
use crate::ModelError;
use ndarray::{Array2, Array3, Axis};

/// Configuration for the adaptive attention LSTM layer
///
/// Constructed once, validated by [`AdaptiveAttentionLSTM::new`], and immutable
/// afterwards. `AdaptiveAttentionConfig::new` fills in the original design's
/// defaults; fields are public so individual settings can be overridden before
/// the layer is built.
///
/// # Fields
///
/// ## Dimensions
/// - `input_dim` - Number of input features per timestep (trailing input axes are flattened into this)
/// - `units` - Number of recurrent units
/// - `regions` - Number of visual positions in the visual context
/// - `output_dim` - Dimensionality of the emitted feature vectors
///
/// ## Parameters
/// - `ingate`, `forgetgate`, `cellgate`, `outgate`, `sentinelgate` - Specs for the five gates,
///   stacked in this order; the cell candidate defaults to tanh, the rest to sigmoid
/// - `attention` - Spec for the two-branch attention parameters
/// - `nonlinearity` - Applied to the cell state and inside both attention branches (default tanh)
/// - `output_kernel_init` - Initializer for the (units × output_dim) output projection
/// - `cell_init`, `hid_init`, `output_init` - Initializers for the (1 × d) initial-state rows,
///   broadcast across the batch
///
/// ## Behavior flags
/// - `learn_init` - Whether the initial-state rows count as trainable parameters; they are
///   never counted as regularizable either way
/// - `backwards` - Process the sequence tail-to-head; the emitted sequence is re-reversed
///   to chronological order
/// - `peepholes` - Enable elementwise cell-to-gate connections for the in/forget/out gates
/// - `gradient_steps` - Truncated-backpropagation depth recorded for a downstream autodiff
///   engine, -1 meaning unbounded; mutually exclusive with unrolling
/// - `grad_clipping` - Clip gate pre-activations to this magnitude when positive
/// - `unroll_length` - Expand the recurrence for this fixed sequence length instead of scanning;
///   `None` selects incremental iteration
/// - `precompute_input` - Compute the input projection for the whole sequence in one product
///   before driving the recurrence; never changes results
#[derive(Debug, Clone)]
pub struct AdaptiveAttentionConfig {
    pub input_dim: usize,
    pub units: usize,
    pub regions: usize,
    pub output_dim: usize,
    pub ingate: GateSpec,
    pub forgetgate: GateSpec,
    pub cellgate: GateSpec,
    pub outgate: GateSpec,
    pub sentinelgate: GateSpec,
    pub attention: AttentionSpec,
    pub nonlinearity: Activation,
    pub output_kernel_init: Initializer,
    pub cell_init: Initializer,
    pub hid_init: Initializer,
    pub output_init: Initializer,
    pub learn_init: bool,
    pub backwards: bool,
    pub peepholes: bool,
    pub gradient_steps: i32,
    pub grad_clipping: f32,
    pub unroll_length: Option<usize>,
    pub precompute_input: bool,
}

impl AdaptiveAttentionConfig {
    /// Creates a configuration with the original design's defaults
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features per timestep
    /// - `units` - Number of recurrent units
    /// - `regions` - Number of visual positions in the visual context
    /// - `output_dim` - Dimensionality of the emitted feature vectors
    pub fn new(input_dim: usize, units: usize, regions: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            units,
            regions,
            output_dim,
            ingate: GateSpec::default(),
            forgetgate: GateSpec::default(),
            cellgate: GateSpec::with_activation(Activation::Tanh),
            outgate: GateSpec::default(),
            sentinelgate: GateSpec::default(),
            attention: AttentionSpec::default(),
            nonlinearity: Activation::Tanh,
            output_kernel_init: Initializer::weight_default(),
            cell_init: Initializer::Zeros,
            hid_init: Initializer::Zeros,
            output_init: Initializer::Zeros,
            learn_init: false,
            backwards: false,
            peepholes: true,
            gradient_steps: -1,
            grad_clipping: 0.0,
            unroll_length: None,
            precompute_input: true,
        }
    }
}

/// Inputs for one forward pass
///
/// The optional collaborators are explicit optional fields rather than
/// positional entries in an input list.
///
/// # Fields
///
/// - `input` - Input sequence with shape (batch, seq_len, features...); trailing
///   feature axes beyond the second are flattened into one
/// - `mask` - Optional (batch, seq_len) tensor of 0/1 flags; 0 marks a padded
///   timestep whose state must copy the previous timestep exactly
/// - `hid_init` - Optional (batch, units) initial hidden state overriding the stored row
/// - `cell_init` - Optional (batch, units) initial cell state overriding the stored row
/// - `visual` - Visual context with shape (batch, regions, units), constant across timesteps
#[derive(Clone, Copy)]
pub struct ForwardInputs<'a> {
    pub input: &'a Tensor,
    pub mask: Option<&'a Array2<f32>>,
    pub hid_init: Option<&'a Array2<f32>>,
    pub cell_init: Option<&'a Array2<f32>>,
    pub visual: &'a Array3<f32>,
}

impl<'a> ForwardInputs<'a> {
    /// Creates forward inputs with no mask and no initial-state overrides
    pub fn new(input: &'a Tensor, visual: &'a Array3<f32>) -> Self {
        Self {
            input,
            mask: None,
            hid_init: None,
            cell_init: None,
            visual,
        }
    }

    /// Attaches a (batch, seq_len) mask
    pub fn with_mask(mut self, mask: &'a Array2<f32>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Overrides the initial hidden state with a (batch, units) tensor
    pub fn with_hid_init(mut self, hid_init: &'a Array2<f32>) -> Self {
        self.hid_init = Some(hid_init);
        self
    }

    /// Overrides the initial cell state with a (batch, units) tensor
    pub fn with_cell_init(mut self, cell_init: &'a Array2<f32>) -> Self {
        self.cell_init = Some(cell_init);
        self
    }
}

/// Adaptive attention LSTM layer with a visual sentinel
///
/// At every timestep the five-gate recurrence updates the cell and hidden
/// states and forms a gated sentinel vector; the hidden state then scores the
/// visual regions and the sentinel, and the fused attention distribution
/// produces a context vector that is projected, together with the hidden state,
/// into the output space.
///
/// # Dimensions
///
/// - Input shape: (batch, seq_len, input_dim) after trailing-axis flattening
/// - Visual context shape: (batch, regions, units)
/// - Output shape: (batch, seq_len, output_dim)
///
/// # Example
/// ```rust
/// use adaptive_lstm::prelude::*;
/// use ndarray::{Array, Array3};
///
/// let config = AdaptiveAttentionConfig::new(4, 3, 5, 2);
/// let layer = AdaptiveAttentionLSTM::new(config).unwrap();
///
/// let input = Array::ones((2, 6, 4)).into_dyn();
/// let visual = Array3::<f32>::ones((2, 5, 3));
/// let output = layer.forward(ForwardInputs::new(&input, &visual)).unwrap();
/// assert_eq!(output.shape(), &[2, 6, 2]);
/// ```
#[derive(Debug)]
pub struct AdaptiveAttentionLSTM {
    input_dim: usize,
    units: usize,
    regions: usize,
    output_dim: usize,
    gates: StackedGateWeights,
    peepholes: Option<PeepholeWeights>,
    attention: AttentionGate,
    output_kernel: Array2<f32>,
    cell_init: Array2<f32>,
    hid_init: Array2<f32>,
    output_init: Array2<f32>,
    nonlinearity: Activation,
    learn_init: bool,
    backwards: bool,
    gradient_steps: i32,
    grad_clipping: f32,
    unroll_length: Option<usize>,
    precompute_input: bool,
}

impl AdaptiveAttentionLSTM {
    /// Builds the layer, validating the configuration and materializing every parameter
    ///
    /// # Parameters
    ///
    /// * `config` - The layer configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The layer with all weights generated from their initializers
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If a dimension is 0, `grad_clipping` is negative
    ///   or non-finite, an initializer is invalid, or `unroll_length` is combined with a
    ///   truncated-gradient depth (the two execution strategies are mutually exclusive)
    pub fn new(config: AdaptiveAttentionConfig) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(config.input_dim, "input_dim")?;
        validate_dimension_greater_than_zero(config.units, "units")?;
        validate_dimension_greater_than_zero(config.regions, "regions")?;
        validate_dimension_greater_than_zero(config.output_dim, "output_dim")?;

        if !config.grad_clipping.is_finite() || config.grad_clipping < 0.0 {
            return Err(ModelError::ConfigurationError(format!(
                "grad_clipping must be a finite non-negative value, got {}",
                config.grad_clipping
            )));
        }
        if let Some(n_steps) = config.unroll_length {
            validate_dimension_greater_than_zero(n_steps, "unroll_length")?;
            if config.gradient_steps != -1 {
                return Err(ModelError::ConfigurationError(
                    "gradient_steps must be -1 when unroll_length is set".to_string(),
                ));
            }
        }

        // The cell candidate and the sentinel gate never carry peepholes
        let mut ingate = Gate::from_spec(
            &config.ingate,
            config.input_dim,
            config.units,
            config.peepholes,
        )?;
        let mut forgetgate = Gate::from_spec(
            &config.forgetgate,
            config.input_dim,
            config.units,
            config.peepholes,
        )?;
        let cellgate = Gate::from_spec(&config.cellgate, config.input_dim, config.units, false)?;
        let mut outgate = Gate::from_spec(
            &config.outgate,
            config.input_dim,
            config.units,
            config.peepholes,
        )?;
        let sentinelgate =
            Gate::from_spec(&config.sentinelgate, config.input_dim, config.units, false)?;

        let peepholes = if config.peepholes {
            Some(PeepholeWeights {
                ingate: ingate
                    .peephole
                    .take()
                    .expect("ingate materialized with a peephole"),
                forgetgate: forgetgate
                    .peephole
                    .take()
                    .expect("forgetgate materialized with a peephole"),
                outgate: outgate
                    .peephole
                    .take()
                    .expect("outgate materialized with a peephole"),
            })
        } else {
            None
        };

        let gates =
            StackedGateWeights::new([&ingate, &forgetgate, &cellgate, &outgate, &sentinelgate]);
        let attention = AttentionGate::from_spec(&config.attention, config.units, config.regions)?;
        let output_kernel = config
            .output_kernel_init
            .sample((config.units, config.output_dim))?;
        let cell_init = config.cell_init.sample((1, config.units))?;
        let hid_init = config.hid_init.sample((1, config.units))?;
        let output_init = config.output_init.sample((1, config.output_dim))?;

        Ok(Self {
            input_dim: config.input_dim,
            units: config.units,
            regions: config.regions,
            output_dim: config.output_dim,
            gates,
            peepholes,
            attention,
            output_kernel,
            cell_init,
            hid_init,
            output_init,
            nonlinearity: config.nonlinearity,
            learn_init: config.learn_init,
            backwards: config.backwards,
            gradient_steps: config.gradient_steps,
            grad_clipping: config.grad_clipping,
            unroll_length: config.unroll_length,
            precompute_input: config.precompute_input,
        })
    }

    /// Runs one forward pass over a sequence
    ///
    /// Trailing input axes beyond the second are flattened into the feature
    /// axis, the sequence is permuted to time-major, the input projection is
    /// optionally precomputed for all timesteps in one matrix product, the
    /// recurrence is driven across the time axis, and the output is assembled
    /// back to batch-major order. When the layer processes backwards the
    /// emitted sequence is reversed back to forward chronological order.
    ///
    /// # Parameters
    ///
    /// * `inputs` - The input sequence, visual context and optional mask/state overrides
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The output sequence with shape (batch, seq_len, output_dim)
    ///
    /// # Errors
    ///
    /// - `ModelError::ShapeMismatchError` - If any input tensor disagrees with the
    ///   configured shapes, or the runtime sequence length differs from `unroll_length`
    /// - `ModelError::ProcessingError` - If an internal reshape fails
    pub fn forward(&self, inputs: ForwardInputs) -> Result<Tensor, ModelError> {
        let shape = inputs.input.shape();
        if shape.len() < 3 {
            return Err(ModelError::ShapeMismatchError(format!(
                "input must have at least 3 dimensions (batch, seq_len, features), got {:?}",
                shape
            )));
        }
        let batch = shape[0];
        let seq_len = shape[1];
        let features: usize = shape[2..].iter().product();
        if features != self.input_dim {
            return Err(ModelError::ShapeMismatchError(format!(
                "input provides {} features per timestep, layer expects {}",
                features, self.input_dim
            )));
        }

        validate_visual_shape(inputs.visual, batch, self.regions, self.units)?;
        if let Some(mask) = inputs.mask {
            validate_mask_shape(mask, batch, seq_len)?;
        }

        // Flatten trailing feature axes and permute to time-major
        let input3 = inputs
            .input
            .as_standard_layout()
            .to_owned()
            .into_shape_with_order((batch, seq_len, features))
            .map_err(|e| ModelError::ProcessingError(format!("flattening input: {}", e)))?;
        let time_major = input3.permuted_axes([1, 0, 2]);
        let time_major = time_major.as_standard_layout().to_owned();

        // Precompute x · w_in + bias for the whole sequence in one product
        let driven = if self.precompute_input {
            let flat = time_major
                .into_shape_with_order((seq_len * batch, features))
                .map_err(|e| ModelError::ProcessingError(format!("projecting input: {}", e)))?;
            let projected = flat.dot(&self.gates.w_in) + &self.gates.bias;
            projected
                .into_shape_with_order((seq_len, batch, 5 * self.units))
                .map_err(|e| ModelError::ProcessingError(format!("projecting input: {}", e)))?
        } else {
            time_major
        };

        let mask_time_major = match inputs.mask {
            Some(mask) => Some(mask.t().as_standard_layout().to_owned()),
            None => None,
        };

        let init = RecurrentState {
            cell: self.resolve_init(inputs.cell_init, &self.cell_init, batch, "cell_init")?,
            hidden: self.resolve_init(inputs.hid_init, &self.hid_init, batch, "hid_init")?,
            output: self.resolve_init(None, &self.output_init, batch, "output_init")?,
        };

        let ctx = StepContext {
            gates: &self.gates,
            peepholes: self.peepholes.as_ref(),
            attention: &self.attention,
            output_kernel: &self.output_kernel,
            nonlinearity: self.nonlinearity,
            grad_clipping: self.grad_clipping,
            precomputed: self.precompute_input,
        };
        let driver = SequenceDriver {
            ctx,
            visual: inputs.visual,
            backwards: self.backwards,
        };
        let mode = match self.unroll_length {
            Some(n_steps) => DriveMode::Unroll { n_steps },
            None => DriveMode::Scan {
                gradient_steps: self.gradient_steps,
            },
        };

        let outputs = driver.run(&driven, mask_time_major.as_ref(), init, mode)?;

        // Reassemble batch-major; a backwards pass emitted the tail first
        let mut out = Array3::<f32>::zeros((batch, seq_len, self.output_dim));
        for (i, step_out) in outputs.iter().enumerate() {
            let t = if self.backwards { seq_len - 1 - i } else { i };
            out.index_axis_mut(Axis(1), t).assign(step_out);
        }

        Ok(out.into_dyn())
    }

    /// Resolves one initial-state component: an external override wins,
    /// otherwise the stored (1, d) row broadcasts across the batch
    fn resolve_init(
        &self,
        supplied: Option<&Array2<f32>>,
        stored: &Array2<f32>,
        batch: usize,
        name: &str,
    ) -> Result<Array2<f32>, ModelError> {
        match supplied {
            Some(state) => {
                validate_state_override(state, batch, stored.ncols(), name)?;
                Ok(state.clone())
            }
            None => stored
                .broadcast((batch, stored.ncols()))
                .map(|view| view.to_owned())
                .ok_or_else(|| {
                    ModelError::ProcessingError(format!("broadcasting {} across the batch", name))
                }),
        }
    }

    /// Returns the number of recurrent units
    pub fn get_units(&self) -> usize {
        self.units
    }

    /// Returns the number of input features per timestep
    pub fn get_input_dim(&self) -> usize {
        self.input_dim
    }

    /// Returns the number of visual regions
    pub fn get_regions(&self) -> usize {
        self.regions
    }

    /// Returns the dimensionality of the emitted feature vectors
    pub fn get_output_dim(&self) -> usize {
        self.output_dim
    }

    /// Returns a reference to the materialized attention parameters
    pub fn get_attention(&self) -> &AttentionGate {
        &self.attention
    }

    /// Returns a string describing the output shape of this layer
    pub fn output_shape(&self) -> String {
        format!("(None, None, {})", self.output_dim)
    }

    /// Returns the total number of trainable parameters in the layer
    ///
    /// The three initial-state rows count only when `learn_init` is set; they
    /// are never regularizable either way.
    pub fn param_count(&self) -> usize {
        let gates = 5 * (self.input_dim * self.units + self.units * self.units + self.units);
        let peepholes = if self.peepholes.is_some() {
            3 * self.units
        } else {
            0
        };
        let attention = 3 * self.units * self.regions + self.regions;
        let projection = self.units * self.output_dim;
        let init_states = if self.learn_init {
            2 * self.units + self.output_dim
        } else {
            0
        };
        gates + peepholes + attention + projection + init_states
    }
}
