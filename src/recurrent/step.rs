use super::activation::Activation;
use super::attention::AttentionGate;
use super::gate::{PeepholeWeights, StackedGateWeights};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, s};

/// The recurrent state threaded through the sequence
///
/// # Fields
///
/// - `cell` - Cell state with shape (batch, units)
/// - `hidden` - Hidden state with shape (batch, units)
/// - `output` - Emitted feature vector with shape (batch, output_dim)
#[derive(Debug, Clone)]
pub struct RecurrentState {
    pub cell: Array2<f32>,
    pub hidden: Array2<f32>,
    pub output: Array2<f32>,
}

/// Immutable parameter context for one forward pass
///
/// Every dependency of the transition function travels here explicitly; the
/// step itself holds no state.
///
/// # Fields
///
/// - `gates` - The stacked five-gate weights
/// - `peepholes` - Cell-to-gate connections, present only when peepholes are enabled
/// - `attention` - The two-branch attention parameters
/// - `output_kernel` - Projection from context + hidden to the output space, shape (units, output_dim)
/// - `nonlinearity` - The layer nonlinearity applied to the cell state and inside the attention branches
/// - `grad_clipping` - Clip gate pre-activations to `[-grad_clipping, grad_clipping]` when positive
/// - `precomputed` - Whether the per-step input already contains `x · w_in + bias`
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub gates: &'a StackedGateWeights,
    pub peepholes: Option<&'a PeepholeWeights>,
    pub attention: &'a AttentionGate,
    pub output_kernel: &'a Array2<f32>,
    pub nonlinearity: Activation,
    pub grad_clipping: f32,
    pub precomputed: bool,
}

/// The pure per-timestep transition
///
/// Computes the five gate pre-activations in one product against the stacked
/// weights, applies peepholes and nonlinearities, updates the cell and hidden
/// states, forms the gated sentinel vector, and projects the attention context
/// plus hidden state into the output space.
///
/// # Parameters
///
/// - `ctx` - The parameter context
/// - `x_t` - This timestep's input with shape (batch, input_dim), or
///   (batch, 5 × units) when the input projection was precomputed
/// - `state` - The previous recurrent state
/// - `visual` - Visual context with shape (batch, regions, units), constant across timesteps
///
/// # Returns
///
/// * `RecurrentState` - The new (cell, hidden, output) triple
pub fn step(
    ctx: &StepContext,
    x_t: ArrayView2<f32>,
    state: &RecurrentState,
    visual: &Array3<f32>,
) -> RecurrentState {
    let units = ctx.gates.units;

    let hid_proj = state.hidden.dot(&ctx.gates.w_hid);
    let mut gates = if ctx.precomputed {
        &x_t + &hid_proj
    } else {
        x_t.dot(&ctx.gates.w_in) + &ctx.gates.bias + &hid_proj
    };

    // A purely numeric-stability device; a no-op when the threshold is 0
    if ctx.grad_clipping > 0.0 {
        let clip = ctx.grad_clipping;
        gates.mapv_inplace(|x| x.clamp(-clip, clip));
    }

    // Fixed stacking order: [in, forget, cell, out, sentinel]
    let block = |n: usize| gates.slice(s![.., n * units..(n + 1) * units]).to_owned();
    let mut ingate = block(0);
    let mut forgetgate = block(1);
    let cell_input = block(2);
    let mut outgate = block(3);
    let ggate = block(4);

    if let Some(peep) = ctx.peepholes {
        ingate = ingate + &(&state.cell * &peep.ingate);
        forgetgate = forgetgate + &(&state.cell * &peep.forgetgate);
    }

    let ingate = ctx.gates.activations[0].apply(&ingate);
    let forgetgate = ctx.gates.activations[1].apply(&forgetgate);
    let cell_input = ctx.gates.activations[2].apply(&cell_input);
    let ggate = ctx.gates.activations[4].apply(&ggate);

    let cell = &forgetgate * &state.cell + &ingate * &cell_input;

    if let Some(peep) = ctx.peepholes {
        outgate = outgate + &(&cell * &peep.outgate);
    }
    let outgate = ctx.gates.activations[3].apply(&outgate);

    let cell_activated = ctx.nonlinearity.apply(&cell);
    let hidden = &outgate * &cell_activated;
    let sentinel = &ggate * &cell_activated;

    let (context, _alpha) = ctx
        .attention
        .context(&hidden, &sentinel, visual, ctx.nonlinearity);

    let output = (&context + &hidden).dot(ctx.output_kernel);

    RecurrentState {
        cell,
        hidden,
        output,
    }
}

/// The masked transition: `step`, then an exact copy of the previous state for
/// every batch element whose mask bit is 0
///
/// Masked timesteps are padding: the state must equal the state at t-1 exactly,
/// not a computed blend, independently per batch element.
///
/// # Parameters
///
/// - `ctx` - The parameter context
/// - `x_t` - This timestep's input
/// - `mask_t` - This timestep's mask column with shape (batch,), 0 meaning padding
/// - `state` - The previous recurrent state
/// - `visual` - Visual context, constant across timesteps
///
/// # Returns
///
/// * `RecurrentState` - The new state, with masked rows copied from `state`
pub fn step_masked(
    ctx: &StepContext,
    x_t: ArrayView2<f32>,
    mask_t: ArrayView1<f32>,
    state: &RecurrentState,
    visual: &Array3<f32>,
) -> RecurrentState {
    let mut next = step(ctx, x_t, state, visual);

    for (b, &m) in mask_t.iter().enumerate() {
        if m == 0.0 {
            next.cell.row_mut(b).assign(&state.cell.row(b));
            next.hidden.row_mut(b).assign(&state.hidden.row(b));
            next.output.row_mut(b).assign(&state.output.row(b));
        }
    }

    next
}
