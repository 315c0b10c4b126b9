use crate::ModelError;
use ndarray::{Array, Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{Normal, Uniform};

/// Weight initializer enum, an opaque value generator keyed by target shape
///
/// # Variants
///
/// - `Zeros` - All elements set to 0.0
/// - `Constant` - All elements set to the given value
/// - `Uniform` - Elements drawn from a uniform distribution over `[low, high)`
/// - `Normal` - Elements drawn from a normal distribution with the given mean and standard deviation
/// - `GlorotUniform` - Xavier/Glorot initialization, uniform over `[-limit, limit]` with `limit = sqrt(6 / (fan_in + fan_out))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Zeros,
    Constant(f32),
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
    GlorotUniform,
}

impl Initializer {
    /// The default weight initializer, a normal distribution with standard deviation 0.1
    pub fn weight_default() -> Self {
        Initializer::Normal {
            mean: 0.0,
            std_dev: 0.1,
        }
    }

    /// Validates the initializer's own parameters
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the parameters describe a valid distribution
    /// - `Err(ModelError::ConfigurationError)` otherwise
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Initializer::Uniform { low, high } => {
                if !(low < high) {
                    return Err(ModelError::ConfigurationError(format!(
                        "uniform initializer requires low < high, got [{}, {})",
                        low, high
                    )));
                }
                Ok(())
            }
            Initializer::Normal { std_dev, .. } => {
                if !std_dev.is_finite() || *std_dev < 0.0 {
                    return Err(ModelError::ConfigurationError(format!(
                        "normal initializer requires a finite non-negative standard deviation, got {}",
                        std_dev
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Materializes a matrix of the given shape
    ///
    /// # Parameters
    ///
    /// * `shape` - The (rows, columns) shape of the matrix to generate
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - The generated matrix
    /// - `Err(ModelError::ConfigurationError)` - If the initializer parameters are invalid
    pub fn sample(&self, shape: (usize, usize)) -> Result<Array2<f32>, ModelError> {
        self.validate()?;
        let out = match *self {
            Initializer::Zeros => Array2::zeros(shape),
            Initializer::Constant(value) => Array2::from_elem(shape, value),
            Initializer::Uniform { low, high } => Array::random(shape, Uniform::new(low, high)),
            Initializer::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev).map_err(|e| {
                    ModelError::ConfigurationError(format!("normal initializer: {}", e))
                })?;
                Array::random(shape, dist)
            }
            Initializer::GlorotUniform => {
                let limit = (6.0 / (shape.0 + shape.1) as f32).sqrt();
                Array::random(shape, Uniform::new(-limit, limit))
            }
        };
        Ok(out)
    }

    /// Materializes a vector of the given length
    ///
    /// For `GlorotUniform` the vector is treated as a (len, 1) matrix when
    /// computing the fan sum.
    ///
    /// # Parameters
    ///
    /// * `len` - The length of the vector to generate
    ///
    /// # Returns
    ///
    /// - `Ok(Array1<f32>)` - The generated vector
    /// - `Err(ModelError::ConfigurationError)` - If the initializer parameters are invalid
    pub fn sample_vector(&self, len: usize) -> Result<Array1<f32>, ModelError> {
        self.validate()?;
        let out = match *self {
            Initializer::Zeros => Array1::zeros(len),
            Initializer::Constant(value) => Array1::from_elem(len, value),
            Initializer::Uniform { low, high } => Array::random(len, Uniform::new(low, high)),
            Initializer::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev).map_err(|e| {
                    ModelError::ConfigurationError(format!("normal initializer: {}", e))
                })?;
                Array::random(len, dist)
            }
            Initializer::GlorotUniform => {
                let limit = (6.0 / (len + 1) as f32).sqrt();
                Array::random(len, Uniform::new(-limit, limit))
            }
        };
        Ok(out)
    }
}
