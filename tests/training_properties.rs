//! End-to-end checks of the training step on the reference 25 → 20 → 20 → 20 → 5 network.

use approx::assert_abs_diff_eq;
use deepdrop::loss::error_norm;
use deepdrop::{Network, NetworkConfig, NetworkError, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn one_hot(len: usize, index: usize) -> Vec<f64> {
    let mut v = vec![0.0; len];
    v[index] = 1.0;
    v
}

/// Reference network with every weight set to the same small constant
fn constant_network(config: &NetworkConfig, value: f64) -> Network {
    let weights = config
        .layers
        .iter()
        .map(|shape| Tensor::full(vec![shape.output_dim, shape.input_dim], value))
        .collect();
    Network::from_weights(config, weights).unwrap()
}

/// The five 5x5 digit-like patterns used to exercise the reference network
fn digit_batch() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    #[rustfmt::skip]
    let patterns: [[u8; 25]; 5] = [
        [0,1,1,0,0, 0,0,1,0,0, 0,0,1,0,0, 0,0,1,0,0, 0,1,1,1,0],
        [1,1,1,1,0, 0,0,0,0,1, 0,1,1,1,0, 1,0,0,0,0, 1,1,1,1,1],
        [1,1,1,1,0, 0,0,0,0,1, 0,1,1,1,0, 0,0,0,0,1, 1,1,1,1,0],
        [0,0,0,1,0, 0,0,1,1,0, 0,1,0,1,0, 1,1,1,1,1, 0,0,0,1,0],
        [1,1,1,1,1, 1,0,0,0,0, 1,1,1,1,0, 0,0,0,0,1, 1,1,1,1,0],
    ];
    let inputs = patterns
        .iter()
        .map(|p| p.iter().map(|&v| v as f64).collect())
        .collect();
    let targets = (0..5).map(|k| one_hot(5, k)).collect();
    (inputs, targets)
}

#[test]
fn output_is_a_probability_vector() {
    init_logging();
    let network = Network::new(&NetworkConfig::deep_dropout(), 123).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let (inputs, _) = digit_batch();

    for input in &inputs {
        let cache = network.forward(input, &mut rng).unwrap();
        assert!(cache.output.data.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_abs_diff_eq!(cache.output.data.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    let extreme: Vec<f64> = (0..25).map(|i| if i % 2 == 0 { 1e3 } else { -1e3 }).collect();
    let probs = network.predict(&extreme).unwrap();
    assert!(probs.is_finite());
    assert_abs_diff_eq!(probs.data.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
}

#[test]
fn zero_dropout_forward_is_deterministic() {
    let config = NetworkConfig::deep_dropout().with_dropout_rate(0.0);
    let network = Network::new(&config, 5).unwrap();
    let (inputs, _) = digit_batch();

    let a = network.forward(&inputs[1], &mut StdRng::seed_from_u64(1)).unwrap();
    let b = network.forward(&inputs[1], &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(a.output, b.output);
    assert_eq!(a.output, network.predict(&inputs[1]).unwrap());
    assert!(a.masks().iter().all(|m| m.dropped() == 0));
}

#[test]
fn full_dropout_silences_a_layer() {
    let config = NetworkConfig::deep_dropout().with_dropout_rates(vec![0.0, 1.0, 0.0]);
    let network = Network::new(&config, 8).unwrap();
    let (inputs, _) = digit_batch();

    let cache = network.forward(&inputs[2], &mut StdRng::seed_from_u64(4)).unwrap();
    assert!(cache.hidden[1].output.data.iter().all(|&v| v == 0.0));

    // Next layer sees an all-zero input, so every pre-activation is 0 and sigmoid(0) = 0.5
    assert!(cache.linear[2].x.data.iter().all(|&v| v == 0.0));
    assert!(cache.hidden[2].activated.data.iter().all(|&v| v == 0.5));

    // Same result as zeroing the layer's outgoing weights
    let mut weights = network.weights();
    weights[2] = Tensor::zeros(weights[2].shape.clone());
    let no_dropout = NetworkConfig::deep_dropout().with_dropout_rate(0.0);
    let zeroed = Network::from_weights(&no_dropout, weights).unwrap();
    let reference = zeroed.predict(&inputs[2]).unwrap();
    for (a, b) in cache.output.data.iter().zip(&reference.data) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn repeated_training_shrinks_the_error_monotonically() {
    init_logging();
    let config = NetworkConfig::deep_dropout().with_dropout_rate(0.0);
    let mut network = constant_network(&config, 0.1);
    let mut rng = StdRng::seed_from_u64(0);

    let input = one_hot(25, 0);
    let target = one_hot(5, 0);
    let target_tensor = Tensor::from_vec(target.clone());

    let mut previous = error_norm(&network.predict(&input).unwrap(), &target_tensor);
    for step in 0..10 {
        network.train_step(&input, &target, &mut rng).unwrap();
        let current = error_norm(&network.predict(&input).unwrap(), &target_tensor);
        assert!(
            current < previous,
            "step {}: error grew from {} to {}",
            step,
            previous,
            current
        );
        previous = current;
    }
}

#[test]
fn wrong_input_length_leaves_weights_untouched() {
    let mut network = Network::new(&NetworkConfig::deep_dropout(), 77).unwrap();
    let before = network.weights();
    let mut rng = StdRng::seed_from_u64(3);

    let err = network
        .train_batch(&[vec![0.0; 24]], &[one_hot(5, 0)], &mut rng)
        .unwrap_err();
    match err {
        NetworkError::DimensionMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, 25);
            assert_eq!(actual, 24);
        }
        other => panic!("unexpected error: {other}"),
    }

    let after = network.weights();
    for (a, b) in before.iter().zip(&after) {
        let a_bits: Vec<u64> = a.data.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.data.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }
}

#[test]
fn wrong_target_length_is_rejected() {
    let mut network = Network::new(&NetworkConfig::deep_dropout(), 77).unwrap();
    let before = network.weights();
    let err = network
        .train_step(&one_hot(25, 0), &one_hot(4, 0), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(
        err,
        NetworkError::DimensionMismatch {
            expected: 5,
            actual: 4,
            ..
        }
    ));
    assert_eq!(network.weights(), before);
}

#[test]
fn same_seed_reproduces_masks_and_weights() {
    let (inputs, targets) = digit_batch();
    let run = |seed: u64| {
        let mut network = Network::new(&NetworkConfig::deep_dropout(), 10).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        network.train_batch(&inputs, &targets, &mut rng).unwrap();
        network.weights()
    };

    assert_eq!(run(2024), run(2024));
    assert_ne!(run(2024), run(2025));
}

#[test]
fn training_the_digit_batch_lowers_the_loss() {
    init_logging();
    let (inputs, targets) = digit_batch();
    let mut network = Network::new(&NetworkConfig::deep_dropout().with_learning_rate(0.5), 31).unwrap();
    let mut rng = StdRng::seed_from_u64(8);

    let (initial, _) = deepdrop::trainer::evaluate(&network, &inputs, &targets).unwrap();
    let result = deepdrop::train(
        &mut network,
        &inputs,
        &targets,
        &deepdrop::TrainingConfig::new().epochs(500).log_every(100),
        &mut rng,
    )
    .unwrap();

    let final_loss = *result.loss_history.last().unwrap();
    assert!(final_loss < initial, "loss {} -> {}", initial, final_loss);
}
