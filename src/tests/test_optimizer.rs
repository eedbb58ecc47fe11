use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::activations::Activation;
use crate::layers::{DenseLayer, WeightInit};
use crate::optimizer::{Adam, Optimizer, OptimizerWrapper, SGD};

fn layers() -> Vec<DenseLayer> {
    let mut rng = StdRng::seed_from_u64(3);
    vec![
        DenseLayer::new(2, 2, Activation::Relu, WeightInit::XavierUniform, &mut rng),
        DenseLayer::new(2, 3, Activation::Linear, WeightInit::XavierUniform, &mut rng),
    ]
}

#[test]
fn test_sgd_update_weights() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [0.3, 0.4]];

    sgd.update_weights(0, &mut weights, &gradients, 0.01);

    let expected = array![[0.999, 0.998], [0.997, 0.996]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-6);
    }
}

#[test]
fn test_sgd_update_biases() {
    let mut sgd = SGD::new();
    let mut biases = array![1.0, 1.0];
    sgd.update_biases(0, &mut biases, &array![0.1, 0.2], 0.01);

    assert!((biases[0] - 0.999).abs() < 1e-6);
    assert!((biases[1] - 0.998).abs() < 1e-6);
}

#[test]
fn test_adam_new() {
    let adam = Adam::new(&layers(), 0.9, 0.999, 1e-8);

    assert_eq!(adam.beta1, 0.9);
    assert_eq!(adam.beta2, 0.999);
    assert_eq!(adam.epsilon, 1e-8);
    assert_eq!(adam.t, 1);
    assert_eq!(adam.layer_count(), 2);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::new(&layers(), 0.9, 0.999, 1e-8);
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.5, -0.5], [2.0, -2.0]];

    adam.update_weights(0, &mut weights, &gradients, 0.01);

    // With bias correction the first step is lr * sign(g)
    assert!((weights[[0, 0]] - 0.99).abs() < 1e-5);
    assert!((weights[[0, 1]] - 1.01).abs() < 1e-5);
    assert!((weights[[1, 0]] - 0.99).abs() < 1e-5);
    assert!((weights[[1, 1]] - 1.01).abs() < 1e-5);
}

#[test]
fn test_adam_tracks_layers_independently() {
    let mut adam = Adam::new(&layers(), 0.9, 0.999, 1e-8);
    let mut first = array![[0.0, 0.0], [0.0, 0.0]];
    let mut second = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];

    adam.update_weights(0, &mut first, &array![[1.0, 1.0], [1.0, 1.0]], 0.1);
    adam.update_weights(1, &mut second, &array![[-1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]], 0.1);
    adam.finish_step();

    assert!(first.iter().all(|&w| w < 0.0));
    assert!(second.iter().all(|&w| w > 0.0));
    assert_eq!(adam.t, 2);
}

#[test]
fn test_wrapper_dispatch() {
    let mut wrapper = OptimizerWrapper::SGD(SGD::new());
    let mut biases = array![0.0, 0.0];
    wrapper.update_biases(1, &mut biases, &array![1.0, -1.0], 0.5);
    wrapper.finish_step();
    assert_eq!(biases, array![-0.5, 0.5]);
}
