use ndarray::{Array2, Axis};

/// Activation function enum, supporting Sigmoid, Tanh, Softmax, and Linear
///
/// Sigmoid is the default gate nonlinearity, Tanh the default cell-candidate and
/// layer nonlinearity, and Softmax the default attention fuse. Linear is the
/// identity and stands in wherever a nonlinearity is explicitly disabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Sigmoid,
    Tanh,
    Softmax,
    Linear,
}

impl Activation {
    /// Forward application of the activation function
    ///
    /// Softmax is applied row-wise with max subtraction for numerical stability,
    /// so each row of the result is a probability distribution.
    ///
    /// # Parameters
    ///
    /// * `z` - Input tensor to apply the activation function to
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - A new tensor with the activation function applied
    pub fn apply(&self, z: &Array2<f32>) -> Array2<f32> {
        use rayon::prelude::*;

        match self {
            Activation::Sigmoid => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| 1.0 / (1.0 + (-x).exp()));
                result
            }
            Activation::Tanh => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| x.tanh());
                result
            }
            Activation::Softmax => {
                let mut out = z.clone();

                if out.nrows() > 8 {
                    out.axis_iter_mut(Axis(0))
                        .into_par_iter()
                        .for_each(|mut row| {
                            let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                            row.mapv_inplace(|x| (x - max_val).exp());
                            let sum = row.sum();
                            row.mapv_inplace(|x| x / sum);
                        });
                } else {
                    for mut row in out.outer_iter_mut() {
                        let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                        row.map_inplace(|x| *x = (*x - max_val).exp());
                        let sum = row.sum();
                        row.map_inplace(|x| *x /= sum);
                    }
                }
                out
            }
            Activation::Linear => z.clone(),
        }
    }
}
