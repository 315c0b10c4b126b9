mod error;

pub use error::ModelError;

/// Module `recurrent` implements an adaptive attention LSTM with a visual sentinel.
///
/// The layer fuses an LSTM recurrence with a learned visual-attention mechanism:
/// at every timestep a fifth "sentinel" gate produces a fallback representation,
/// the hidden state scores a fixed set of visual regions plus that sentinel, and
/// the resulting probability distribution forms a context vector that is projected
/// into the emitted feature space. This is the adaptive attention mechanism used
/// in image and video captioning.
///
/// # Core Components
///
/// ## Parameters
/// - **Gate / GateSpec**: weights, bias, activation and optional peephole vector for one of the five LSTM-style gates
/// - **AttentionGate / AttentionSpec**: the two-branch attention weights and the fusing nonlinearity
/// - **Initializer**: shape-keyed value generators (zeros, constant, uniform, normal, Glorot uniform)
///
/// ## Recurrence
/// - **RecurrentState**: the (cell, hidden, output) triple threaded through the sequence
/// - **step / step_masked**: the pure per-timestep transition and its masking wrapper
/// - **SequenceDriver**: applies the step across the time axis, incrementally or unrolled to a fixed length
///
/// ## Layer
/// - **AdaptiveAttentionLSTM**: owns all parameters, validates configuration and input
///   shapes, and exposes a single `forward` operation producing a
///   `[batch, seq_len, output_dim]` output sequence
///
/// # Example
/// ```rust
/// use adaptive_lstm::prelude::*;
/// use ndarray::{Array, Array3};
///
/// // batch=2, seq_len=4, input_dim=8, regions=6, units=5, output_dim=3
/// let config = AdaptiveAttentionConfig::new(8, 5, 6, 3);
/// let layer = AdaptiveAttentionLSTM::new(config).unwrap();
///
/// let input = Array::ones((2, 4, 8)).into_dyn();
/// let visual = Array3::<f32>::ones((2, 6, 5));
///
/// let output = layer
///     .forward(ForwardInputs::new(&input, &visual))
///     .unwrap();
/// assert_eq!(output.shape(), &[2, 4, 3]);
/// ```
pub mod recurrent;

/// A convenience module that re-exports the most commonly used types from this crate.
pub mod prelude;
