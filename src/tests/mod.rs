// Test modules for all components
pub mod test_activations;
pub mod test_layers;
pub mod test_optimizer;
