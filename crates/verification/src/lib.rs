//! Verification utilities for sprj
//!
//! This crate provides tools for verifying that saving a project and loading
//! it again reproduces the same pipeline, objects and bindings.

pub mod compare;
mod roundtrip;

pub use roundtrip::{RoundTripError, RoundTripReport, round_trip};
