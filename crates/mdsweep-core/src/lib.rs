#![deny(missing_docs)]
#![doc = "Core error surface, exact decimals and parameter types for mdsweep."]

pub mod decimal;
pub mod errors;
mod types;

pub use decimal::{Decimal, MAX_SCALE};
pub use errors::{ErrorInfo, SweepError};
pub use types::{FixedScalars, ParameterTuple};
