use adaptive_lstm::prelude::*;
use approx::assert_abs_diff_eq;
use ndarray::{Array, Array2, Array3};

/// Builds a config whose weights are all deterministic constants, so two layer
/// instances built from it are numerically identical
fn deterministic_config(
    input_dim: usize,
    units: usize,
    regions: usize,
    output_dim: usize,
) -> AdaptiveAttentionConfig {
    let gate = GateSpec {
        kernel_init: Initializer::Constant(0.1),
        recurrent_init: Initializer::Constant(0.1),
        bias_init: Initializer::Zeros,
        peephole_init: Initializer::Constant(0.1),
        activation: Activation::Sigmoid,
    };

    let mut config = AdaptiveAttentionConfig::new(input_dim, units, regions, output_dim);
    config.ingate = gate;
    config.forgetgate = gate;
    config.cellgate = GateSpec {
        activation: Activation::Tanh,
        ..gate
    };
    config.outgate = gate;
    config.sentinelgate = gate;
    config.attention = AttentionSpec {
        visual_init: Initializer::Constant(0.1),
        sentinel_init: Initializer::Constant(0.1),
        hidden_init: Initializer::Constant(0.1),
        score_init: Initializer::Constant(0.1),
        fuse: Activation::Softmax,
    };
    config.output_kernel_init = Initializer::Constant(0.1);
    config
}

#[test]
fn test_forward_output_shape() {
    // Test that forward produces (batch, seq_len, output_dim)
    let config = AdaptiveAttentionConfig::new(8, 5, 6, 3);
    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    let input = Array::ones((2, 4, 8)).into_dyn();
    let visual = Array3::<f32>::ones((2, 6, 5));

    let output = layer
        .forward(ForwardInputs::new(&input, &visual))
        .unwrap();
    assert_eq!(output.shape(), &[2, 4, 3]);
    println!(
        "Forward shape test passed: {:?} -> {:?}",
        input.shape(),
        output.shape()
    );
}

#[test]
fn test_trailing_input_axes_are_flattened() {
    // Test that a (batch, seq, a, b) input behaves exactly like (batch, seq, a*b)
    let config = deterministic_config(8, 5, 6, 3);
    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    let flat = Array::from_shape_fn((2, 4, 8), |(b, t, f)| (b + t + f) as f32 * 0.05).into_dyn();
    let nested = flat
        .clone()
        .into_shape_with_order((2, 4, 2, 4))
        .unwrap()
        .into_dyn();
    let visual = Array3::<f32>::ones((2, 6, 5));

    let out_flat = layer.forward(ForwardInputs::new(&flat, &visual)).unwrap();
    let out_nested = layer.forward(ForwardInputs::new(&nested, &visual)).unwrap();

    assert_eq!(out_flat, out_nested);
    println!("Trailing axis flattening test passed");
}

#[test]
fn test_zero_weights_average_the_visual_context() {
    // With every weight at zero all gates sit at sigmoid(0) = 0.5, the states
    // stay at zero, and the attention distribution is uniform over the three
    // regions plus the sentinel. The context is then 0.25 * ([1,2]+[3,4]+[5,6])
    // = [2.25, 3.0] and the all-ones output kernel sums it to 5.25.
    let mut config = AdaptiveAttentionConfig::new(4, 2, 3, 1);
    let zero_gate = GateSpec {
        kernel_init: Initializer::Zeros,
        recurrent_init: Initializer::Zeros,
        bias_init: Initializer::Zeros,
        peephole_init: Initializer::Zeros,
        activation: Activation::Sigmoid,
    };
    config.ingate = zero_gate;
    config.forgetgate = zero_gate;
    config.cellgate = GateSpec {
        activation: Activation::Tanh,
        ..zero_gate
    };
    config.outgate = zero_gate;
    config.sentinelgate = zero_gate;
    config.attention = AttentionSpec {
        visual_init: Initializer::Zeros,
        sentinel_init: Initializer::Zeros,
        hidden_init: Initializer::Zeros,
        score_init: Initializer::Zeros,
        fuse: Activation::Softmax,
    };
    config.output_kernel_init = Initializer::Constant(1.0);
    config.peepholes = false;

    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    let input = Array::ones((1, 2, 4)).into_dyn();
    let visual = Array3::from_shape_vec((1, 3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

    let output = layer
        .forward(ForwardInputs::new(&input, &visual))
        .unwrap();
    assert_eq!(output.shape(), &[1, 2, 1]);
    assert_abs_diff_eq!(output[[0, 0, 0]], 5.25, epsilon = 1e-6);
    assert_abs_diff_eq!(output[[0, 1, 0]], 5.25, epsilon = 1e-6);
    println!("Zero-weight averaging test passed: output = {:?}", output);
}

#[test]
fn test_cell_init_override_drives_the_recurrence() {
    // Same zero-weight setup, but the initial cell state is all ones. Step one:
    // c1 = 0.5, h1 = s1 = 0.5 * tanh(0.5) = 0.23105858, attention stays uniform,
    // so the summed output is 5.8276464. Step two decays the cell to 0.25 and
    // emits 5.5561483.
    let mut config = AdaptiveAttentionConfig::new(4, 2, 3, 1);
    let zero_gate = GateSpec {
        kernel_init: Initializer::Zeros,
        recurrent_init: Initializer::Zeros,
        bias_init: Initializer::Zeros,
        peephole_init: Initializer::Zeros,
        activation: Activation::Sigmoid,
    };
    config.ingate = zero_gate;
    config.forgetgate = zero_gate;
    config.cellgate = GateSpec {
        activation: Activation::Tanh,
        ..zero_gate
    };
    config.outgate = zero_gate;
    config.sentinelgate = zero_gate;
    config.attention = AttentionSpec {
        visual_init: Initializer::Zeros,
        sentinel_init: Initializer::Zeros,
        hidden_init: Initializer::Zeros,
        score_init: Initializer::Zeros,
        fuse: Activation::Softmax,
    };
    config.output_kernel_init = Initializer::Constant(1.0);
    config.peepholes = false;

    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    let input = Array::ones((1, 2, 4)).into_dyn();
    let visual = Array3::from_shape_vec((1, 3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let cell_init = Array2::<f32>::ones((1, 2));

    let output = layer
        .forward(ForwardInputs::new(&input, &visual).with_cell_init(&cell_init))
        .unwrap();
    assert_abs_diff_eq!(output[[0, 0, 0]], 5.8276464, epsilon = 1e-5);
    assert_abs_diff_eq!(output[[0, 1, 0]], 5.5561483, epsilon = 1e-5);
    println!("Cell-init override test passed: output = {:?}", output);
}

#[test]
fn test_single_step_with_identity_output_kernel() {
    // Same zero-weight scenario exercised at the step level, where the output
    // kernel can be the identity: the output is the context itself, [2.25, 3.0]
    let zero_gate = GateSpec {
        kernel_init: Initializer::Zeros,
        recurrent_init: Initializer::Zeros,
        bias_init: Initializer::Zeros,
        peephole_init: Initializer::Zeros,
        activation: Activation::Sigmoid,
    };
    let ingate = Gate::from_spec(&zero_gate, 2, 2, false).unwrap();
    let forgetgate = Gate::from_spec(&zero_gate, 2, 2, false).unwrap();
    let cellgate = Gate::from_spec(
        &GateSpec {
            activation: Activation::Tanh,
            ..zero_gate
        },
        2,
        2,
        false,
    )
    .unwrap();
    let outgate = Gate::from_spec(&zero_gate, 2, 2, false).unwrap();
    let sentinelgate = Gate::from_spec(&zero_gate, 2, 2, false).unwrap();
    let gates = StackedGateWeights::new([&ingate, &forgetgate, &cellgate, &outgate, &sentinelgate]);

    let attention = AttentionGate {
        w_visual: Array2::zeros((2, 3)),
        w_sentinel: Array2::zeros((2, 3)),
        w_hidden: Array2::zeros((2, 3)),
        w_score: ndarray::Array1::zeros(3),
        fuse: Activation::Softmax,
    };
    let output_kernel = Array2::<f32>::eye(2);

    let ctx = StepContext {
        gates: &gates,
        peepholes: None,
        attention: &attention,
        output_kernel: &output_kernel,
        nonlinearity: Activation::Tanh,
        grad_clipping: 0.0,
        precomputed: false,
    };

    let x_t = Array2::<f32>::zeros((1, 2));
    let state = RecurrentState {
        cell: Array2::zeros((1, 2)),
        hidden: Array2::zeros((1, 2)),
        output: Array2::zeros((1, 2)),
    };
    let visual = Array3::from_shape_vec((1, 3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

    let next = step(&ctx, x_t.view(), &state, &visual);

    assert_abs_diff_eq!(next.output[[0, 0]], 2.25, epsilon = 1e-6);
    assert_abs_diff_eq!(next.output[[0, 1]], 3.0, epsilon = 1e-6);
    assert!(next.cell.iter().all(|&c| c == 0.0));
    assert!(next.hidden.iter().all(|&h| h == 0.0));
    println!("Identity-kernel step test passed: output = {:?}", next.output);
}

#[test]
fn test_hid_init_override_changes_the_output() {
    // Test that a non-zero initial hidden state actually reaches the gates
    let config = deterministic_config(4, 3, 5, 2);
    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    let input = Array::ones((2, 3, 4)).into_dyn();
    let visual = Array3::<f32>::ones((2, 5, 3));
    let hid_init = Array2::<f32>::ones((2, 3));

    let baseline = layer
        .forward(ForwardInputs::new(&input, &visual))
        .unwrap();
    let overridden = layer
        .forward(ForwardInputs::new(&input, &visual).with_hid_init(&hid_init))
        .unwrap();

    assert_ne!(baseline, overridden);
    println!("Hidden-init override test passed");
}

#[test]
fn test_param_count() {
    // 5 gates: 5 * (4*3 + 3*3 + 3) = 120; peepholes: 3 * 3 = 9;
    // attention: 3 * 3 * 5 + 5 = 50; projection: 3 * 2 = 6
    let config = AdaptiveAttentionConfig::new(4, 3, 5, 2);
    let layer = AdaptiveAttentionLSTM::new(config).unwrap();
    assert_eq!(layer.param_count(), 185);

    let mut without_peepholes = AdaptiveAttentionConfig::new(4, 3, 5, 2);
    without_peepholes.peepholes = false;
    let layer = AdaptiveAttentionLSTM::new(without_peepholes).unwrap();
    assert_eq!(layer.param_count(), 176);

    let mut learned_init = AdaptiveAttentionConfig::new(4, 3, 5, 2);
    learned_init.learn_init = true;
    let layer = AdaptiveAttentionLSTM::new(learned_init).unwrap();
    assert_eq!(layer.param_count(), 193);

    println!("Parameter count test passed");
}

#[test]
fn test_getters_and_output_shape_string() {
    let config = AdaptiveAttentionConfig::new(8, 5, 6, 3);
    let layer = AdaptiveAttentionLSTM::new(config).unwrap();

    assert_eq!(layer.get_input_dim(), 8);
    assert_eq!(layer.get_units(), 5);
    assert_eq!(layer.get_regions(), 6);
    assert_eq!(layer.get_output_dim(), 3);
    assert_eq!(layer.output_shape(), "(None, None, 3)");
    println!("Getter test passed: output shape = {}", layer.output_shape());
}
