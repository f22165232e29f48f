//! Ansible binary module for the Akamai API
//!
//! Reads the module arguments, signs one request with EdgeGrid credentials
//! from an `.edgerc` file and reports the response back to the host.

pub mod akamai;
pub mod module;

pub use module::{run, ModuleArgs, ModuleResult};
