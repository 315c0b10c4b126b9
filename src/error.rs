/// Error types that can occur while configuring or running the layer
///
/// # Variants
///
/// - `ConfigurationError` - indicates invalid or contradictory hyperparameters, detected when the layer is constructed
/// - `ShapeMismatchError` - indicates an input, mask, visual-context or initial-state tensor whose dimensions are inconsistent with the configured parameter shapes
/// - `ProcessingError` - indicates an internal reshape or layout failure while processing
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    ConfigurationError(String),
    ShapeMismatchError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::ShapeMismatchError(msg) => write!(f, "Shape mismatch error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

/// Implements the standard error trait for ModelError
impl std::error::Error for ModelError {}
