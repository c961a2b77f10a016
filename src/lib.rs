//! Form state synchronization and validation for UI inputs.
//!
//! Field controllers own their input's value and validation state and keep an
//! entry in their form's registry current. The form gates submission on every
//! field validating, then hands the collected data to a transport.

pub mod components;
pub mod field;
pub mod form;
pub mod pipeline;
pub mod prelude;
