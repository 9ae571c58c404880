//! Embedding → LSTM → softmax classifier over character codes.
//!
//! Plain ndarray implementation with hand-written backpropagation through
//! time. Gate layout inside the fused weight matrices is input, forget, cell,
//! output.

use super::CharModelError;
use ndarray::{Array1, Array2, ArrayD, ArrayViewD, ArrayViewMutD, Axis, Zip, s};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

pub const EMBEDDING_DIM: usize = 64;
pub const HIDDEN_DIM: usize = 128;

const EMBEDDING_INIT: f32 = 0.05;
/// Clip applied to probabilities before taking the log
const PROB_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharModel {
    /// (vocab, embedding)
    embedding: Array2<f32>,
    /// (embedding, 4 * hidden)
    kernel: Array2<f32>,
    /// (hidden, 4 * hidden)
    recurrent: Array2<f32>,
    /// (4 * hidden)
    bias: Array1<f32>,
    /// (hidden, vocab)
    dense: Array2<f32>,
    /// (vocab)
    dense_bias: Array1<f32>,
}

/// Activations kept from a forward pass for the backward pass.
struct Step {
    codes: Vec<usize>,
    x: Array2<f32>,
    h_prev: Array2<f32>,
    c_prev: Array2<f32>,
    i: Array2<f32>,
    f: Array2<f32>,
    g: Array2<f32>,
    o: Array2<f32>,
    tanh_c: Array2<f32>,
}

/// Gradients with the same layout as [`CharModel`].
pub struct Gradients {
    embedding: Array2<f32>,
    kernel: Array2<f32>,
    recurrent: Array2<f32>,
    bias: Array1<f32>,
    dense: Array2<f32>,
    dense_bias: Array1<f32>,
}

impl Gradients {
    fn tensors(&self) -> [ArrayViewD<'_, f32>; 6] {
        [
            self.embedding.view().into_dyn(),
            self.kernel.view().into_dyn(),
            self.recurrent.view().into_dyn(),
            self.bias.view().into_dyn(),
            self.dense.view().into_dyn(),
            self.dense_bias.view().into_dyn(),
        ]
    }
}

/// Result of one training step on a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchStats {
    pub loss: f32,
    pub correct: usize,
}

impl CharModel {
    /// Fresh weights for `vocab_size` classes.
    pub fn new<R: Rng + ?Sized>(vocab_size: usize, rng: &mut R) -> Self {
        let embedding_dist = Uniform::new(-EMBEDDING_INIT, EMBEDDING_INIT);
        let embedding =
            Array2::from_shape_fn((vocab_size, EMBEDDING_DIM), |_| embedding_dist.sample(rng));

        let kernel = glorot((EMBEDDING_DIM, 4 * HIDDEN_DIM), rng);
        let recurrent = glorot((HIDDEN_DIM, 4 * HIDDEN_DIM), rng);
        let mut bias = Array1::zeros(4 * HIDDEN_DIM);
        bias.slice_mut(s![HIDDEN_DIM..2 * HIDDEN_DIM]).fill(1.0);

        let dense = glorot((HIDDEN_DIM, vocab_size), rng);
        let dense_bias = Array1::zeros(vocab_size);

        Self {
            embedding,
            kernel,
            recurrent,
            bias,
            dense,
            dense_bias,
        }
    }

    /// Number of input symbols, which is also the number of output classes.
    pub fn vocab_size(&self) -> usize {
        self.embedding.nrows()
    }

    /// Check that every weight agrees on the vocabulary and layer widths.
    pub fn validate(&self) -> Result<(), CharModelError> {
        let vocab = self.vocab_size();
        let expected = [
            ("embedding", self.embedding.dim(), (vocab, EMBEDDING_DIM)),
            ("kernel", self.kernel.dim(), (EMBEDDING_DIM, 4 * HIDDEN_DIM)),
            ("recurrent", self.recurrent.dim(), (HIDDEN_DIM, 4 * HIDDEN_DIM)),
            ("dense", self.dense.dim(), (HIDDEN_DIM, vocab)),
        ];
        for (name, actual, wanted) in expected {
            if actual != wanted {
                return Err(CharModelError::Shape(format!(
                    "{} is {:?}, expected {:?}",
                    name, actual, wanted
                )));
            }
        }
        if self.bias.len() != 4 * HIDDEN_DIM {
            return Err(CharModelError::Shape(format!(
                "lstm bias has {} entries, expected {}",
                self.bias.len(),
                4 * HIDDEN_DIM
            )));
        }
        if self.dense_bias.len() != vocab {
            return Err(CharModelError::Shape(format!(
                "dense bias has {} entries, expected {}",
                self.dense_bias.len(),
                vocab
            )));
        }
        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }

    /// Layer table: name, output shape and parameter count per layer.
    pub fn summary(&self, maxlen: usize) -> String {
        let vocab = self.vocab_size();
        let rows = [
            (
                "embedding (Embedding)",
                format!("(None, {}, {})", maxlen, EMBEDDING_DIM),
                self.embedding.len(),
            ),
            (
                "lstm (LSTM)",
                format!("(None, {})", HIDDEN_DIM),
                self.kernel.len() + self.recurrent.len() + self.bias.len(),
            ),
            (
                "dense (Dense)",
                format!("(None, {})", vocab),
                self.dense.len() + self.dense_bias.len(),
            ),
        ];
        let mut out = format!("{:<24}{:<20}{:>10}\n", "Layer (type)", "Output Shape", "Param #");
        out.push_str(&"=".repeat(54));
        out.push('\n');
        for (layer, shape, params) in rows {
            out.push_str(&format!("{:<24}{:<20}{:>10}\n", layer, shape, params));
        }
        out.push_str(&"=".repeat(54));
        out.push('\n');
        out.push_str(&format!("Total params: {}\n", self.parameter_count()));
        out
    }

    /// Class probabilities for a batch of padded code sequences, shape (batch, vocab).
    pub fn predict_proba(&self, inputs: &Array2<usize>) -> Array2<f32> {
        let (probs, _) = self.forward(inputs);
        probs
    }

    fn forward(&self, inputs: &Array2<usize>) -> (Array2<f32>, Vec<Step>) {
        let batch = inputs.nrows();
        let mut h = Array2::<f32>::zeros((batch, HIDDEN_DIM));
        let mut c = Array2::<f32>::zeros((batch, HIDDEN_DIM));
        let mut steps = Vec::with_capacity(inputs.ncols());

        for column in inputs.axis_iter(Axis(1)) {
            let codes = column.to_vec();
            let x = self.embedding.select(Axis(0), &codes);
            let z = x.dot(&self.kernel) + h.dot(&self.recurrent) + &self.bias;

            let i = z.slice(s![.., 0..HIDDEN_DIM]).mapv(sigmoid);
            let f = z.slice(s![.., HIDDEN_DIM..2 * HIDDEN_DIM]).mapv(sigmoid);
            let g = z.slice(s![.., 2 * HIDDEN_DIM..3 * HIDDEN_DIM]).mapv(f32::tanh);
            let o = z.slice(s![.., 3 * HIDDEN_DIM..]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let tanh_c = c_next.mapv(f32::tanh);
            let h_next = &o * &tanh_c;

            steps.push(Step {
                codes,
                x,
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                tanh_c,
            });
            h = h_next;
            c = c_next;
        }

        let mut probs = h.dot(&self.dense) + &self.dense_bias;
        softmax_rows(&mut probs);
        (probs, steps)
    }

    /// Forward and backward pass over one batch; returns the mean loss and gradients.
    pub fn gradients(
        &self,
        inputs: &Array2<usize>,
        targets: &Array2<f32>,
    ) -> (BatchStats, Gradients) {
        let batch = inputs.nrows();
        let (probs, steps) = self.forward(inputs);
        let stats = BatchStats {
            loss: cross_entropy(&probs, targets),
            correct: count_correct(&probs, targets),
        };

        let h_last = match steps.last() {
            Some(step) => &step.o * &step.tanh_c,
            None => Array2::zeros((batch, HIDDEN_DIM)),
        };

        let d_logits = (&probs - targets) / batch as f32;
        let mut grads = Gradients {
            embedding: Array2::zeros(self.embedding.raw_dim()),
            kernel: Array2::zeros(self.kernel.raw_dim()),
            recurrent: Array2::zeros(self.recurrent.raw_dim()),
            bias: Array1::zeros(self.bias.raw_dim()),
            dense: h_last.t().dot(&d_logits),
            dense_bias: d_logits.sum_axis(Axis(0)),
        };

        let mut dh = d_logits.dot(&self.dense.t());
        let mut dc = Array2::<f32>::zeros((batch, HIDDEN_DIM));
        let mut dz = Array2::<f32>::zeros((batch, 4 * HIDDEN_DIM));

        for step in steps.iter().rev() {
            dc += &(&dh * &step.o * &step.tanh_c.mapv(|t| 1.0 - t * t));

            let d_o = &dh * &step.tanh_c * &step.o.mapv(|o| o * (1.0 - o));
            let d_i = &dc * &step.g * &step.i.mapv(|i| i * (1.0 - i));
            let d_f = &dc * &step.c_prev * &step.f.mapv(|f| f * (1.0 - f));
            let d_g = &dc * &step.i * &step.g.mapv(|g| 1.0 - g * g);

            dz.slice_mut(s![.., 0..HIDDEN_DIM]).assign(&d_i);
            dz.slice_mut(s![.., HIDDEN_DIM..2 * HIDDEN_DIM]).assign(&d_f);
            dz.slice_mut(s![.., 2 * HIDDEN_DIM..3 * HIDDEN_DIM]).assign(&d_g);
            dz.slice_mut(s![.., 3 * HIDDEN_DIM..]).assign(&d_o);

            grads.kernel += &step.x.t().dot(&dz);
            grads.recurrent += &step.h_prev.t().dot(&dz);
            grads.bias += &dz.sum_axis(Axis(0));

            let dx = dz.dot(&self.kernel.t());
            for (row, &code) in step.codes.iter().enumerate() {
                let mut target = grads.embedding.row_mut(code);
                target += &dx.row(row);
            }

            dh = dz.dot(&self.recurrent.t());
            dc = &dc * &step.f;
        }

        (stats, grads)
    }

    fn tensors(&self) -> [ArrayViewD<'_, f32>; 6] {
        [
            self.embedding.view().into_dyn(),
            self.kernel.view().into_dyn(),
            self.recurrent.view().into_dyn(),
            self.bias.view().into_dyn(),
            self.dense.view().into_dyn(),
            self.dense_bias.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 6] {
        [
            self.embedding.view_mut().into_dyn(),
            self.kernel.view_mut().into_dyn(),
            self.recurrent.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
            self.dense.view_mut().into_dyn(),
            self.dense_bias.view_mut().into_dyn(),
        ]
    }
}

/// Adam with beta1 0.9, beta2 0.999 and epsilon 1e-7.
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    step: i32,
    m: Vec<ArrayD<f32>>,
    v: Vec<ArrayD<f32>>,
}

impl Adam {
    pub fn new(model: &CharModel, learning_rate: f32) -> Self {
        let zeros: Vec<ArrayD<f32>> = model
            .tensors()
            .iter()
            .map(|t| ArrayD::zeros(t.raw_dim()))
            .collect();
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
            m: zeros.clone(),
            v: zeros,
        }
    }

    pub fn apply(&mut self, model: &mut CharModel, grads: &Gradients) {
        self.step += 1;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let lr = self.learning_rate * (1.0 - beta2.powi(self.step)).sqrt()
            / (1.0 - beta1.powi(self.step));

        let params = model.tensors_mut();
        let grads = grads.tensors();
        for ((param, grad), (m, v)) in params
            .into_iter()
            .zip(grads)
            .zip(self.m.iter_mut().zip(self.v.iter_mut()))
        {
            Zip::from(param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    *p -= lr * *m / ((*v).sqrt() + epsilon);
                });
        }
    }
}

fn glorot<R: Rng + ?Sized>(shape: (usize, usize), rng: &mut R) -> Array2<f32> {
    let limit = (6.0 / (shape.0 + shape.1) as f32).sqrt();
    let dist = Uniform::new(-limit, limit);
    Array2::from_shape_fn(shape, |_| dist.sample(rng))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax_rows(logits: &mut Array2<f32>) {
    for mut row in logits.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row /= sum;
    }
}

fn cross_entropy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let batch = probs.nrows().max(1) as f32;
    let total: f32 = Zip::from(probs)
        .and(targets)
        .fold(0.0, |acc, &p, &t| {
            acc - t * p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON).ln()
        });
    total / batch
}

fn count_correct(probs: &Array2<f32>, targets: &Array2<f32>) -> usize {
    probs
        .rows()
        .into_iter()
        .zip(targets.rows())
        .filter(|(p, t)| argmax(p.iter().copied()) == argmax(t.iter().copied()))
        .count()
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax<I: IntoIterator<Item = f32>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, value) in values.into_iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn model(vocab: usize) -> CharModel {
        CharModel::new(vocab, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_shapes_validate() {
        let model = model(10);
        assert!(model.validate().is_ok());
        assert_eq!(model.vocab_size(), 10);
        let expected = 10 * 64 + (64 + 128 + 1) * 512 + 128 * 10 + 10;
        assert_eq!(model.parameter_count(), expected);
    }

    #[test]
    fn test_forget_bias_starts_at_one() {
        let model = model(4);
        assert!(model.bias.slice(s![0..HIDDEN_DIM]).iter().all(|&b| b == 0.0));
        assert!(
            model
                .bias
                .slice(s![HIDDEN_DIM..2 * HIDDEN_DIM])
                .iter()
                .all(|&b| b == 1.0)
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = model(6);
        let inputs = array![[0, 1, 2], [3, 4, 5]];
        let probs = model.predict_proba(&inputs);
        assert_eq!(probs.dim(), (2, 6));
        for row in probs.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_gradient_shapes_match_weights() {
        let model = model(5);
        let inputs = array![[0, 1, 2], [0, 3, 4]];
        let targets = array![[0.0, 0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0, 1.0]];
        let (stats, grads) = model.gradients(&inputs, &targets);
        assert!(stats.loss.is_finite());
        assert_eq!(grads.embedding.dim(), model.embedding.dim());
        assert_eq!(grads.kernel.dim(), model.kernel.dim());
        assert_eq!(grads.recurrent.dim(), model.recurrent.dim());
        assert_eq!(grads.dense.dim(), model.dense.dim());
        assert_eq!(grads.dense_bias.len(), 5);
    }

    #[test]
    fn test_loss_decreases_with_adam() {
        let mut model = model(4);
        let inputs = array![[0, 1], [1, 2], [0, 2]];
        let targets = array![
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0]
        ];
        let mut adam = Adam::new(&model, 0.01);
        let (first, _) = model.gradients(&inputs, &targets);
        for _ in 0..150 {
            let (_, grads) = model.gradients(&inputs, &targets);
            adam.apply(&mut model, &grads);
        }
        let (last, _) = model.gradients(&inputs, &targets);
        assert!(
            last.loss < first.loss * 0.5,
            "loss went from {} to {}",
            first.loss,
            last.loss
        );
        assert_eq!(last.correct, 3);
    }

    #[test]
    fn test_validate_rejects_mismatched_dense() {
        let mut model = model(4);
        model.dense = Array2::zeros((HIDDEN_DIM, 5));
        assert!(matches!(model.validate(), Err(CharModelError::Shape(_))));
    }

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax([0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax([0.5]), 0);
    }

    #[test]
    fn test_summary_lists_layers() {
        let summary = model(7).summary(5);
        assert!(summary.contains("embedding (Embedding)"));
        assert!(summary.contains("(None, 5, 64)"));
        assert!(summary.contains("lstm (LSTM)"));
        assert!(summary.contains("(None, 7)"));
    }
}
