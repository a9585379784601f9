use thiserror::Error;

use crate::codegen::CodegenError;
use crate::mechanism::MechanismError;

#[derive(Error, Debug)]
pub enum MechGenError {
    #[error("Error in the mechanism: {0}")]
    Mechanism(#[from] MechanismError),
    #[error("Error during code generation: {0}")]
    Codegen(#[from] CodegenError),
}
