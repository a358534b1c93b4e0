//! Conversion orchestrator over a caller-owned [`Segments`] list.
//!
//! [`Converter`] drives the lattice search, predictor, rewriters and
//! suppression filter and keeps the segment list valid between operations.
//! Every collaborator is a trait object so the search and learning back-ends
//! can be swapped without touching the orchestration.
//!
//! [`Segments`]: henkan_core::segments::Segments

pub mod converter;
pub mod history_reconstructor;
pub mod lattice;
pub mod predictor;
pub mod reverse_converter;
pub mod rewriter;
pub mod stats;
pub mod suppression;
pub mod user_dictionary;

#[cfg(test)]
pub(crate) mod testutil;

pub use converter::{Converter, ConverterBuilder};
