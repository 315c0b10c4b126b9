use crate::ModelError;
use ndarray::{Array2, Array3};

/// Validates that a dimension value is greater than 0
///
/// # Parameters
///
/// - `value` - The dimension value to validate
/// - `name` - The name of the dimension for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_dimension_greater_than_zero(
    value: usize,
    name: &str,
) -> Result<(), ModelError> {
    if value == 0 {
        return Err(ModelError::ConfigurationError(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Validates that the visual context tensor is (batch, regions, units)
///
/// # Parameters
///
/// - `visual` - The visual context tensor to validate
/// - `batch` - Expected batch size
/// - `regions` - Expected number of visual regions
/// - `units` - Expected feature dimension per region
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_visual_shape(
    visual: &Array3<f32>,
    batch: usize,
    regions: usize,
    units: usize,
) -> Result<(), ModelError> {
    if visual.shape() != [batch, regions, units] {
        return Err(ModelError::ShapeMismatchError(format!(
            "visual context must have shape ({}, {}, {}), got {:?}",
            batch,
            regions,
            units,
            visual.shape()
        )));
    }
    Ok(())
}

/// Validates that the mask matches the input's batch and time extents
///
/// # Parameters
///
/// - `mask` - The mask tensor to validate
/// - `batch` - Expected batch size
/// - `seq_len` - Expected sequence length
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_mask_shape(
    mask: &Array2<f32>,
    batch: usize,
    seq_len: usize,
) -> Result<(), ModelError> {
    if mask.shape() != [batch, seq_len] {
        return Err(ModelError::ShapeMismatchError(format!(
            "mask must have shape ({}, {}), got {:?}",
            batch,
            seq_len,
            mask.shape()
        )));
    }
    Ok(())
}

/// Validates an externally supplied initial-state override
///
/// # Parameters
///
/// - `state` - The state tensor to validate
/// - `batch` - Expected batch size
/// - `dim` - Expected state dimension
/// - `name` - The name of the state for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_state_override(
    state: &Array2<f32>,
    batch: usize,
    dim: usize,
    name: &str,
) -> Result<(), ModelError> {
    if state.shape() != [batch, dim] {
        return Err(ModelError::ShapeMismatchError(format!(
            "{} must have shape ({}, {}), got {:?}",
            name,
            batch,
            dim,
            state.shape()
        )));
    }
    Ok(())
}
