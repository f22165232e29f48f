//! The `akamai` module: parameters in, one signed request out, result JSON back

pub mod dispatch;
pub mod outcome;
pub mod params;

use anyhow::Result;

use crate::akamai::Transport;

pub use dispatch::RequestDispatcher;
pub use outcome::{ModuleResult, Outcome, StatusPolicy};
pub use params::{ModuleArgs, ParamsError, RequestSpec};

/// Validate `args`, send the request through `transport` and build the host result
pub fn run<T: Transport>(args: ModuleArgs, transport: T) -> Result<ModuleResult> {
    let spec = RequestSpec::from_args(args)?;
    let outcome = RequestDispatcher::new(transport).dispatch(&spec)?;
    Ok(outcome.to_result())
}
