use ndarray::{arr1, arr2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::activations::Activation;
use crate::layers::{DenseLayer, WeightInit};

fn rng() -> StdRng {
    StdRng::seed_from_u64(11)
}

#[test]
fn test_layer_creation() {
    let layer = DenseLayer::new(3, 2, Activation::Relu, WeightInit::XavierUniform, &mut rng());

    assert_eq!(layer.weights.shape(), [3, 2]);
    assert_eq!(layer.biases.shape(), [2]);
    assert_eq!(layer.input_size(), 3);
    assert_eq!(layer.output_size(), 2);
    assert!(layer.biases.iter().all(|&b| b == 0.0));
}

#[test]
fn test_weight_initialization_bounds() {
    let layer = DenseLayer::new(10, 20, Activation::Relu, WeightInit::XavierUniform, &mut rng());
    let limit = (6.0 / 30.0_f32).sqrt();
    for &w in layer.weights.iter() {
        assert!(w >= -limit && w <= limit);
    }

    let layer = DenseLayer::new(10, 20, Activation::Relu, WeightInit::Zeros, &mut rng());
    assert!(layer.weights.iter().all(|&w| w == 0.0));
}

#[test]
fn test_seeded_initialization_is_reproducible() {
    let a = DenseLayer::new(2, 24, Activation::Relu, WeightInit::XavierUniform, &mut rng());
    let b = DenseLayer::new(2, 24, Activation::Relu, WeightInit::XavierUniform, &mut rng());
    assert_eq!(a.weights, b.weights);
}

#[test]
fn test_forward_known_weights() {
    let mut layer = DenseLayer::new(2, 2, Activation::Relu, WeightInit::Zeros, &mut rng());
    layer.weights = arr2(&[[1.0, -1.0], [2.0, -2.0]]);
    layer.biases = arr1(&[0.5, 0.5]);

    let output = layer.forward_batch(arr2(&[[1.0, 1.0]]).view());
    assert_eq!(output, arr2(&[[3.5, 0.0]]));
    assert_eq!(layer.evaluate_batch(arr2(&[[1.0, 1.0]]).view()), output);
}

#[test]
fn test_backward_requires_forward() {
    let layer = DenseLayer::new(2, 2, Activation::Linear, WeightInit::XavierUniform, &mut rng());
    assert!(layer.backward_batch(arr2(&[[1.0, 1.0]]).view()).is_none());
}

#[test]
fn test_backward_gradients() {
    let mut layer = DenseLayer::new(2, 1, Activation::Linear, WeightInit::Zeros, &mut rng());
    layer.weights = arr2(&[[1.0], [1.0]]);
    layer.forward_batch(arr2(&[[2.0, 3.0]]).view());

    let (adjusted, weight_grads, bias_grads) = layer.backward_batch(arr2(&[[0.5]]).view()).unwrap();
    assert_eq!(adjusted, arr2(&[[0.5]]));
    assert_eq!(weight_grads, arr2(&[[1.0], [1.5]]));
    assert_eq!(bias_grads, arr1(&[0.5]));
}
