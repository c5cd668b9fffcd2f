//! # tablebot-domain
//!
//! Pure domain model for the tablebot reservation orchestrator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error taxonomy
//! - Parse and validate **reservation requests** read from the line protocol
//! - Map free-text time preferences and calendar dates onto picker values
//! - Resolve the **credentials** a session needs from an injected lookup
//! - Build the fixed **step plan** a session executes for one request
//! - Define **results** and their single-line wire encoding
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod credentials;
pub mod plan;
pub mod request;
pub mod result;
