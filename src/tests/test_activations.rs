use ndarray::array;
use crate::activations::Activation;

#[test]
fn test_relu_activation() {
    let relu = Activation::Relu;
    let mut input = array![[-1.0, 0.0, 1.0, 2.0]];
    relu.apply_batch(&mut input);
    assert_eq!(input, array![[0.0, 0.0, 1.0, 2.0]]);
}

#[test]
fn test_relu_never_negative() {
    let mut input = array![[-1e10, f32::MIN / 2.0, f32::NAN, -0.0]];
    Activation::Relu.apply_batch(&mut input);
    for &v in input.iter() {
        assert!(v >= 0.0, "ReLU produced {}", v);
    }
}

#[test]
fn test_linear_is_identity() {
    let mut input = array![[-3.5, 0.0, 7.25]];
    Activation::Linear.apply_batch(&mut input);
    assert_eq!(input, array![[-3.5, 0.0, 7.25]]);
}

#[test]
fn test_derivatives() {
    let input = array![[-1.0, 0.0, 2.0]];
    assert_eq!(Activation::Relu.derivative_batch(input.view()), array![[0.0, 0.0, 1.0]]);
    assert_eq!(Activation::Linear.derivative_batch(input.view()), array![[1.0, 1.0, 1.0]]);
}
