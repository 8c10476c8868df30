//! Feed-forward controller decoded from a genome
//!
//! Inputs -> hidden (tanh) -> output (tanh), or inputs -> output (tanh) when
//! the genome has no hidden nodes. Outputs lie in [-1, 1].

use aviary_sim::{INPUT_SIZE, OUTPUT_SIZE, Policy};

use crate::genome::Genome;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedForward {
    weights: Vec<f32>,
    hidden_dim: usize,
}

impl FeedForward {
    pub fn from_genome(genome: &Genome) -> Self {
        Self {
            weights: genome.weights().to_vec(),
            hidden_dim: genome.hidden_dim(),
        }
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Forward pass: observation -> jump activation
    pub fn forward(&self, input: &[f32; INPUT_SIZE]) -> Vec<f32> {
        if self.hidden_dim == 0 {
            return dense_tanh(&self.weights, input, OUTPUT_SIZE);
        }

        let hidden_len = INPUT_SIZE * self.hidden_dim + self.hidden_dim;
        let (to_hidden, to_output) = self.weights.split_at(hidden_len);
        let hidden = dense_tanh(to_hidden, input, self.hidden_dim);
        dense_tanh(to_output, &hidden, OUTPUT_SIZE)
    }
}

impl Policy for FeedForward {
    fn evaluate(&mut self, inputs: &[f32; INPUT_SIZE]) -> Vec<f32> {
        self.forward(inputs)
    }
}

/// One fully connected layer: `outputs` rows of `input.len()` weights
/// followed by `outputs` biases
fn dense_tanh(weights: &[f32], input: &[f32], outputs: usize) -> Vec<f32> {
    let (matrix, biases) = weights.split_at(outputs * input.len());
    matrix
        .chunks_exact(input.len())
        .zip(biases)
        .map(|(row, bias)| {
            let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
            (sum + bias).tanh()
        })
        .collect()
}
