pub use crate::ModelError;
pub use crate::recurrent::*;
