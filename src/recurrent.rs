/// Module that contains activation function implementations
mod activation;
/// Module that contains the adaptive attention LSTM layer
mod adaptive_lstm;
/// Module that contains the two-branch visual attention parameters and scoring
mod attention;
/// Module that drives the recurrence across the time axis
mod driver;
/// Gate parameter structures for the five LSTM-style gates
mod gate;
/// Weight initializer implementations
mod initializer;
/// Input validation functions for the recurrent layer
mod input_validation_function;
/// Module that contains the per-timestep state transition
mod step;

pub use activation::Activation;
pub use adaptive_lstm::{AdaptiveAttentionConfig, AdaptiveAttentionLSTM, ForwardInputs};
pub use attention::{AttentionGate, AttentionSpec};
pub use driver::{DriveMode, SequenceDriver};
pub use gate::{Gate, GateSpec, PeepholeWeights, StackedGateWeights};
pub use initializer::Initializer;
pub use step::{RecurrentState, StepContext, step, step_masked};

use ndarray::ArrayD;

/// Type alias for n-dimensional arrays used as tensors by the layer
pub type Tensor = ArrayD<f32>;
