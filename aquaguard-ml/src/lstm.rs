//! Stacked LSTM Network
//!
//! ## Overview
//!
//! A small recurrent network mapping a window of feature vectors to the next
//! feature vector:
//!
//! ```text
//! x[0..T] ─▶ LSTM(hidden) ─▶ ... ─▶ LSTM(hidden) ─▶ h[T-1] ─▶ Dense ─▶ y
//!            full sequence          last step only
//! ```
//!
//! Every layer but the last passes its whole output sequence upward; the
//! dense head only sees the final hidden state of the top layer.
//!
//! ## Cell Equations
//!
//! Each step concatenates the input with the previous hidden state and runs
//! one matrix product for all four gates:
//!
//! ```text
//! z = [x_t, h_{t-1}] · W + b             W: (input + hidden, 4 · hidden)
//! i = σ(z_i)   f = σ(z_f)   g = tanh(z_g)   o = σ(z_o)
//! c_t = f ⊙ c_{t-1} + i ⊙ g
//! h_t = o ⊙ tanh(c_t)
//! ```
//!
//! Gate blocks are laid out `[i | f | g | o]` along the columns of `W`.
//!
//! ## Training Support
//!
//! [`LstmNetwork::forward_train`] keeps every intermediate activation so
//! [`LstmNetwork::backward`] can run backpropagation through time over the
//! full window. Gradients come back as a [`Gradients`] value whose tensor
//! order matches [`LstmNetwork::parameters_mut`]; the optimizer relies on
//! that pairing.
//!
//! ## Initialization
//!
//! Glorot-uniform weights (input and recurrent blocks scaled separately),
//! zero biases except the forget gate, which starts at 1 so early training
//! does not forget everything.

use ndarray::{s, Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn glorot_rows<R: Rng>(rows: usize, cols: usize, fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}

/// Gradient of the loss with respect to one weight matrix and bias
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl LayerGradients {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            weights: Array2::zeros((rows, cols)),
            bias: Array1::zeros(cols),
        }
    }
}

/// Gradients for a whole network, bottom layer first, dense head last
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub layers: Vec<LayerGradients>,
    pub dense: LayerGradients,
}

impl Gradients {
    /// Euclidean norm over every gradient entry
    pub fn global_norm(&self) -> f64 {
        self.tensors()
            .iter()
            .map(|t| t.iter().map(|v| v * v).sum::<f64>())
            .sum::<f64>()
            .sqrt()
    }

    /// Multiply every entry by `factor`
    pub fn scale(&mut self, factor: f64) {
        for layer in self.layers.iter_mut().chain(std::iter::once(&mut self.dense)) {
            layer.weights.mapv_inplace(|v| v * factor);
            layer.bias.mapv_inplace(|v| v * factor);
        }
    }

    /// Flat tensor views in parameter order
    pub fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut out = Vec::with_capacity(2 * self.layers.len() + 2);
        for layer in self.layers.iter().chain(std::iter::once(&self.dense)) {
            out.push(layer.weights.view().into_dyn());
            out.push(layer.bias.view().into_dyn());
        }
        out
    }
}

/// Activations of one time step, kept for the backward pass
#[derive(Debug, Clone)]
struct StepCache {
    concat: Array2<f64>,
    input_gate: Array2<f64>,
    forget_gate: Array2<f64>,
    candidate: Array2<f64>,
    output_gate: Array2<f64>,
    cell_prev: Array2<f64>,
    cell_tanh: Array2<f64>,
}

/// Single LSTM layer over a batch
#[derive(Debug, Clone)]
pub struct LstmLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    input_size: usize,
    hidden_size: usize,
}

impl LstmLayer {
    /// Randomly initialized layer
    pub fn new<R: Rng>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let gates = 4 * hidden_size;
        let mut weights = Array2::zeros((input_size + hidden_size, gates));
        weights
            .slice_mut(s![..input_size, ..])
            .assign(&glorot_rows(input_size, gates, input_size, gates, rng));
        weights
            .slice_mut(s![input_size.., ..])
            .assign(&glorot_rows(hidden_size, gates, hidden_size, gates, rng));

        let mut bias = Array1::zeros(gates);
        bias.slice_mut(s![hidden_size..2 * hidden_size]).fill(1.0);

        Self {
            weights,
            bias,
            input_size,
            hidden_size,
        }
    }

    /// Width of each input vector
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of hidden units
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn forward(&self, inputs: &[Array2<f64>]) -> (Vec<Array2<f64>>, Vec<StepCache>) {
        let batch = inputs.first().map_or(0, |x| x.nrows());
        let (n_in, h) = (self.input_size, self.hidden_size);

        let mut hidden = Array2::zeros((batch, h));
        let mut cell = Array2::zeros((batch, h));
        let mut outputs = Vec::with_capacity(inputs.len());
        let mut caches = Vec::with_capacity(inputs.len());

        for x in inputs {
            let mut concat = Array2::zeros((batch, n_in + h));
            concat.slice_mut(s![.., ..n_in]).assign(x);
            concat.slice_mut(s![.., n_in..]).assign(&hidden);

            let z = concat.dot(&self.weights) + &self.bias;
            let input_gate = z.slice(s![.., 0..h]).mapv(sigmoid);
            let forget_gate = z.slice(s![.., h..2 * h]).mapv(sigmoid);
            let candidate = z.slice(s![.., 2 * h..3 * h]).mapv(f64::tanh);
            let output_gate = z.slice(s![.., 3 * h..]).mapv(sigmoid);

            let next_cell = &forget_gate * &cell + &input_gate * &candidate;
            let cell_tanh = next_cell.mapv(f64::tanh);
            hidden = &output_gate * &cell_tanh;
            let cell_prev = std::mem::replace(&mut cell, next_cell);

            outputs.push(hidden.clone());
            caches.push(StepCache {
                concat,
                input_gate,
                forget_gate,
                candidate,
                output_gate,
                cell_prev,
                cell_tanh,
            });
        }

        (outputs, caches)
    }

    /// Backpropagation through time
    ///
    /// `d_outputs[t]` is the loss gradient with respect to this layer's
    /// hidden output at step `t`. Returns the parameter gradients and the
    /// gradient with respect to each step's input.
    fn backward(&self, caches: &[StepCache], d_outputs: &[Array2<f64>]) -> (LayerGradients, Vec<Array2<f64>>) {
        let batch = caches.first().map_or(0, |c| c.concat.nrows());
        let (n_in, h) = (self.input_size, self.hidden_size);

        let mut grads = LayerGradients::zeros(n_in + h, 4 * h);
        let mut d_hidden_next: Array2<f64> = Array2::zeros((batch, h));
        let mut d_cell_next: Array2<f64> = Array2::zeros((batch, h));
        let mut d_inputs = vec![Array2::<f64>::zeros((batch, n_in)); caches.len()];

        for t in (0..caches.len()).rev() {
            let step = &caches[t];

            let d_hidden = &d_outputs[t] + &d_hidden_next;
            let d_output_gate = &d_hidden * &step.cell_tanh;
            let d_cell = &d_hidden * &step.output_gate * &step.cell_tanh.mapv(|v| 1.0 - v * v) + &d_cell_next;

            let d_input_gate = &d_cell * &step.candidate;
            let d_candidate = &d_cell * &step.input_gate;
            let d_forget_gate = &d_cell * &step.cell_prev;
            d_cell_next = &d_cell * &step.forget_gate;

            let mut dz = Array2::zeros((batch, 4 * h));
            dz.slice_mut(s![.., 0..h])
                .assign(&(d_input_gate * &step.input_gate.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., h..2 * h])
                .assign(&(d_forget_gate * &step.forget_gate.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., 2 * h..3 * h])
                .assign(&(d_candidate * &step.candidate.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![.., 3 * h..])
                .assign(&(d_output_gate * &step.output_gate.mapv(|v| v * (1.0 - v))));

            grads.weights += &step.concat.t().dot(&dz);
            grads.bias += &dz.sum_axis(Axis(0));

            let d_concat = dz.dot(&self.weights.t());
            d_inputs[t] = d_concat.slice(s![.., ..n_in]).to_owned();
            d_hidden_next = d_concat.slice(s![.., n_in..]).to_owned();
        }

        (grads, d_inputs)
    }
}

/// Fully connected output head
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl DenseLayer {
    /// Randomly initialized head mapping `input_size` to `output_size`
    pub fn new<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            weights: glorot_rows(input_size, output_size, input_size, output_size, rng),
            bias: Array1::zeros(output_size),
        }
    }

    fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.weights) + &self.bias
    }

    fn backward(&self, x: &Array2<f64>, d_out: &Array2<f64>) -> (LayerGradients, Array2<f64>) {
        let grads = LayerGradients {
            weights: x.t().dot(d_out),
            bias: d_out.sum_axis(Axis(0)),
        };
        (grads, d_out.dot(&self.weights.t()))
    }
}

/// Everything the backward pass needs from one forward pass
#[derive(Debug, Clone)]
pub struct NetworkCache {
    layers: Vec<Vec<StepCache>>,
    top_hidden: Array2<f64>,
    steps: usize,
}

/// Stacked LSTM with a dense head
#[derive(Debug, Clone)]
pub struct LstmNetwork {
    layers: Vec<LstmLayer>,
    dense: DenseLayer,
    hidden_size: usize,
}

impl LstmNetwork {
    /// Build `num_layers` LSTM layers of `hidden_size` units each
    pub fn new<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        let mut layers = Vec::with_capacity(num_layers);
        for depth in 0..num_layers {
            let layer_input = if depth == 0 { input_size } else { hidden_size };
            layers.push(LstmLayer::new(layer_input, hidden_size, rng));
        }

        Self {
            layers,
            dense: DenseLayer::new(hidden_size, output_size, rng),
            hidden_size,
        }
    }

    /// Number of trainable scalars
    pub fn parameter_count(&self) -> usize {
        let lstm: usize = self.layers.iter().map(|l| l.weights.len() + l.bias.len()).sum();
        lstm + self.dense.weights.len() + self.dense.bias.len()
    }

    /// Number of LSTM layers
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Predict a batch; `inputs[t]` holds step `t` for every batch row
    pub fn forward(&self, inputs: &[Array2<f64>]) -> Array2<f64> {
        self.forward_train(inputs).0
    }

    /// Forward pass that keeps activations for [`LstmNetwork::backward`]
    pub fn forward_train(&self, inputs: &[Array2<f64>]) -> (Array2<f64>, NetworkCache) {
        let batch = inputs.first().map_or(0, |x| x.nrows());
        let mut sequence = inputs.to_vec();
        let mut caches = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let (outputs, cache) = layer.forward(&sequence);
            caches.push(cache);
            sequence = outputs;
        }

        let top_hidden = sequence
            .pop()
            .unwrap_or_else(|| Array2::zeros((batch, self.hidden_size)));
        let output = self.dense.forward(&top_hidden);

        let cache = NetworkCache {
            layers: caches,
            top_hidden,
            steps: inputs.len(),
        };
        (output, cache)
    }

    /// Gradients of the loss given `d_output`, its gradient at the head
    pub fn backward(&self, cache: &NetworkCache, d_output: &Array2<f64>) -> Gradients {
        let batch = d_output.nrows();
        let (dense, d_top) = self.dense.backward(&cache.top_hidden, d_output);

        let mut d_outputs = vec![Array2::<f64>::zeros((batch, self.hidden_size)); cache.steps];
        if let Some(last) = d_outputs.last_mut() {
            *last = d_top;
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        for (layer, steps) in self.layers.iter().zip(&cache.layers).rev() {
            let (grads, d_inputs) = layer.backward(steps, &d_outputs);
            layers.push(grads);
            d_outputs = d_inputs;
        }
        layers.reverse();

        Gradients { layers, dense }
    }

    /// Mutable views of every parameter, in [`Gradients::tensors`] order
    pub fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut params = Vec::with_capacity(2 * self.layers.len() + 2);
        for layer in self.layers.iter_mut() {
            params.push(layer.weights.view_mut().into_dyn());
            params.push(layer.bias.view_mut().into_dyn());
        }
        params.push(self.dense.weights.view_mut().into_dyn());
        params.push(self.dense.bias.view_mut().into_dyn());
        params
    }
}

/// Mean squared error and its gradient with respect to `predicted`
pub fn mse_loss(predicted: &Array2<f64>, target: &Array2<f64>) -> (f64, Array2<f64>) {
    let diff = predicted - target;
    let n = diff.len().max(1) as f64;
    let loss = diff.iter().map(|d| d * d).sum::<f64>() / n;
    (loss, diff * (2.0 / n))
}
