//! Shared test utilities for scanpost integration tests.
//!
//! This module provides:
//! - `TestHarness` for an isolated working directory with unit folders
//! - Scripted `TokenSource` / `DocumentSink` fakes that record their calls

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
