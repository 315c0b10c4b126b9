use super::activation::Activation;
use super::initializer::Initializer;
use super::input_validation_function::validate_dimension_greater_than_zero;
use crate::ModelError;
use ndarray::{Array1, Array2, Axis, concatenate};

/// Initializer specification for one LSTM-style gate
///
/// # Fields
///
/// - `kernel_init` - Initializer for the input kernel (shape: input_dim × units)
/// - `recurrent_init` - Initializer for the recurrent kernel (shape: units × units)
/// - `bias_init` - Initializer for the bias (shape: 1 × units)
/// - `peephole_init` - Initializer for the peephole vector, used only when the layer enables peepholes
/// - `activation` - The gate's nonlinearity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSpec {
    pub kernel_init: Initializer,
    pub recurrent_init: Initializer,
    pub bias_init: Initializer,
    pub peephole_init: Initializer,
    pub activation: Activation,
}

impl Default for GateSpec {
    /// A sigmoid gate with Normal(0.1) weights and zero bias
    fn default() -> Self {
        Self {
            kernel_init: Initializer::weight_default(),
            recurrent_init: Initializer::weight_default(),
            bias_init: Initializer::Zeros,
            peephole_init: Initializer::weight_default(),
            activation: Activation::Sigmoid,
        }
    }
}

impl GateSpec {
    /// Creates a default gate spec with a different nonlinearity
    ///
    /// The cell-candidate gate uses this with `Activation::Tanh`.
    pub fn with_activation(activation: Activation) -> Self {
        Self {
            activation,
            ..Self::default()
        }
    }
}

/// Materialized parameters for a single gate
///
/// # Fields
///
/// - `kernel` - Weight matrix for input connections with shape (input_dim, units)
/// - `recurrent_kernel` - Weight matrix for recurrent connections with shape (units, units)
/// - `bias` - Bias vector with shape (1, units)
/// - `activation` - The gate's nonlinearity
/// - `peephole` - Optional elementwise cell-to-gate connection with shape (units,)
#[derive(Debug, Clone)]
pub struct Gate {
    pub kernel: Array2<f32>,
    pub recurrent_kernel: Array2<f32>,
    pub bias: Array2<f32>,
    pub activation: Activation,
    pub peephole: Option<Array1<f32>>,
}

impl Gate {
    /// Materializes a gate from its spec
    ///
    /// # Parameters
    ///
    /// - `spec` - Initializer specification for the gate
    /// - `input_dim` - Dimensionality of the input features
    /// - `units` - Number of units in the gate
    /// - `peephole` - Whether to materialize the peephole vector
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - The gate with all tensors generated
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If `input_dim` or `units` is 0, or an initializer is invalid
    pub fn from_spec(
        spec: &GateSpec,
        input_dim: usize,
        units: usize,
        peephole: bool,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(input_dim, "input_dim")?;
        validate_dimension_greater_than_zero(units, "units")?;

        let kernel = spec.kernel_init.sample((input_dim, units))?;
        let recurrent_kernel = spec.recurrent_init.sample((units, units))?;
        let bias = spec.bias_init.sample((1, units))?;
        let peephole = if peephole {
            Some(spec.peephole_init.sample_vector(units)?)
        } else {
            None
        };

        Ok(Self {
            kernel,
            recurrent_kernel,
            bias,
            activation: spec.activation,
            peephole,
        })
    }
}

/// Peephole vectors for the three gates with cell-to-gate connections
///
/// Present only when the layer is configured with peepholes enabled. Each vector
/// has shape (units,) and enters the matching gate pre-activation as an
/// elementwise product with the cell state, broadcast over the batch.
#[derive(Debug, Clone)]
pub struct PeepholeWeights {
    pub ingate: Array1<f32>,
    pub forgetgate: Array1<f32>,
    pub outgate: Array1<f32>,
}

/// The five gates' weights concatenated along the output axis
///
/// Lets the recurrence compute all five gate pre-activations with one matrix
/// product per source, slicing the result back into equal-width blocks in the
/// fixed order [in, forget, cell, out, sentinel]. This is a memory layout
/// optimization only: slicing must reproduce five separate per-gate products
/// exactly.
///
/// # Fields
///
/// - `w_in` - Stacked input kernels with shape (input_dim, 5 × units)
/// - `w_hid` - Stacked recurrent kernels with shape (units, 5 × units)
/// - `bias` - Stacked biases with shape (1, 5 × units)
/// - `activations` - Per-gate nonlinearities in stacking order
/// - `units` - Width of one gate block
#[derive(Debug, Clone)]
pub struct StackedGateWeights {
    pub w_in: Array2<f32>,
    pub w_hid: Array2<f32>,
    pub bias: Array2<f32>,
    pub activations: [Activation; 5],
    pub units: usize,
}

impl StackedGateWeights {
    /// Stacks five materialized gates, in [in, forget, cell, out, sentinel] order
    pub fn new(gates: [&Gate; 5]) -> Self {
        let units = gates[0].kernel.ncols();
        let w_in = concatenate(
            Axis(1),
            &[
                gates[0].kernel.view(),
                gates[1].kernel.view(),
                gates[2].kernel.view(),
                gates[3].kernel.view(),
                gates[4].kernel.view(),
            ],
        )
        .expect("gate kernels share row count by construction");
        let w_hid = concatenate(
            Axis(1),
            &[
                gates[0].recurrent_kernel.view(),
                gates[1].recurrent_kernel.view(),
                gates[2].recurrent_kernel.view(),
                gates[3].recurrent_kernel.view(),
                gates[4].recurrent_kernel.view(),
            ],
        )
        .expect("recurrent kernels share row count by construction");
        let bias = concatenate(
            Axis(1),
            &[
                gates[0].bias.view(),
                gates[1].bias.view(),
                gates[2].bias.view(),
                gates[3].bias.view(),
                gates[4].bias.view(),
            ],
        )
        .expect("gate biases share row count by construction");

        Self {
            w_in,
            w_hid,
            bias,
            activations: [
                gates[0].activation,
                gates[1].activation,
                gates[2].activation,
                gates[3].activation,
                gates[4].activation,
            ],
            units,
        }
    }
}
