use super::step::{RecurrentState, StepContext, step, step_masked};
use crate::ModelError;
use ndarray::{Array2, Array3, Axis};

/// Execution strategy for the recurrence
///
/// # Variants
///
/// - `Scan` - Incremental iteration over the time axis. `gradient_steps` bounds
///   how many past steps a downstream autodiff engine would backpropagate
///   through (-1 meaning unbounded); it is recorded here as a passthrough
///   hyperparameter and cannot affect forward values.
/// - `Unroll` - The same per-step logic expanded for a fixed number of steps
///   known at configuration time; the runtime sequence length must match.
///
/// Both modes produce numerically identical outputs for identical inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveMode {
    Scan { gradient_steps: i32 },
    Unroll { n_steps: usize },
}

/// Applies the transition function across the time axis
///
/// # Fields
///
/// - `ctx` - The parameter context handed to every step
/// - `visual` - Visual context with shape (batch, regions, units), consumed whole at every step
/// - `backwards` - Iterate tail-to-head when set
pub struct SequenceDriver<'a> {
    pub ctx: StepContext<'a>,
    pub visual: &'a Array3<f32>,
    pub backwards: bool,
}

impl SequenceDriver<'_> {
    /// Drives the recurrence and collects the per-step outputs in visit order
    ///
    /// When `backwards` is set the first collected output belongs to the last
    /// timestep; the caller restores chronological order.
    ///
    /// # Parameters
    ///
    /// - `inputs` - Time-major input with shape (seq_len, batch, input_dim), or
    ///   (seq_len, batch, 5 × units) when the input projection was precomputed
    /// - `mask` - Optional time-major mask with shape (seq_len, batch)
    /// - `init` - The initial recurrent state
    /// - `mode` - Execution strategy
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Array2<f32>>)` - One (batch, output_dim) output per timestep, in visit order
    /// - `Err(ModelError::ShapeMismatchError)` - If an unroll length disagrees with the runtime sequence length
    pub fn run(
        &self,
        inputs: &Array3<f32>,
        mask: Option<&Array2<f32>>,
        init: RecurrentState,
        mode: DriveMode,
    ) -> Result<Vec<Array2<f32>>, ModelError> {
        let seq_len = inputs.len_of(Axis(0));
        if let DriveMode::Unroll { n_steps } = mode {
            if n_steps != seq_len {
                return Err(ModelError::ShapeMismatchError(format!(
                    "unroll length {} does not match runtime sequence length {}",
                    n_steps, seq_len
                )));
            }
        }

        let order: Vec<usize> = if self.backwards {
            (0..seq_len).rev().collect()
        } else {
            (0..seq_len).collect()
        };

        let mut outputs = Vec::with_capacity(seq_len);
        let mut state = init;

        // The step variant is chosen once for the whole sequence
        match mask {
            Some(m) => {
                for &t in &order {
                    let x_t = inputs.index_axis(Axis(0), t);
                    let mask_t = m.index_axis(Axis(0), t);
                    state = step_masked(&self.ctx, x_t, mask_t, &state, self.visual);
                    outputs.push(state.output.clone());
                }
            }
            None => {
                for &t in &order {
                    let x_t = inputs.index_axis(Axis(0), t);
                    state = step(&self.ctx, x_t, &state, self.visual);
                    outputs.push(state.output.clone());
                }
            }
        }

        Ok(outputs)
    }
}
