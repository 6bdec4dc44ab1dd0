use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Dense Q-network.
///
/// ```text
/// Input:  [batch, input_dim]   one-hot board + player features
/// FC0:    input_dim -> input_dim (linear)
/// FC1:    input_dim -> 512, ReLU
/// FC2:    512 -> 512, ReLU
/// FC3:    512 -> num_actions   (Q-values, one per move)
/// ```
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc0: Linear<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct QNetworkConfig {
    pub input_dim: usize,
    pub num_actions: usize,
    #[config(default = 512)]
    pub hidden_dim: usize,
}

impl QNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc0: LinearConfig::new(self.input_dim, self.input_dim).init(device),
            fc1: LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            fc3: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: [batch, input_dim] -> [batch, num_actions].
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.fc0.forward(input);
        let x = self.relu.forward(self.fc1.forward(x));
        let x = self.relu.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Wgpu;

    type TestBackend = Wgpu<f32, i32>;

    #[test]
    fn test_network_output_shape() {
        let device = Default::default();
        let config = QNetworkConfig::new(94, 90);
        let network = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([4, 94], &device);
        let output = network.forward(input);
        assert_eq!(output.shape().dims, [4, 90]);
    }

    #[test]
    fn test_network_single_input() {
        let device = Default::default();
        let config = QNetworkConfig::new(31, 9);
        let network = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([1, 31], &device);
        let output = network.forward(input);
        assert_eq!(output.shape().dims, [1, 9]);
    }
}
