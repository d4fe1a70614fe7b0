//! # qap-io: QAP Instance & Solution I/O
//!
//! Parsing for the QAPLIB-style text formats consumed by the solver suite,
//! plus a deterministic random-instance generator for experiments.
//!
//! ## Supported formats
//!
//! | Format | Layout | Parser |
//! |--------|--------|--------|
//! | instance (`.dat`) | `n`, blank line, A matrix, blank line, B matrix | [`parse_instance`] |
//! | solution (`.sln`) | `n`, claimed objective, 1-indexed permutation | [`parse_solution`] |
//!
//! Both formats are whitespace-separated integers; parsers are strict and
//! fail with the [`qap_core::QapError`] taxonomy (`Parse` for malformed
//! tokens, `DimensionMismatch` for shape disagreements).

pub mod generate;
pub mod instance;
pub mod solution;

pub use generate::{random_cost_tensor, random_instance};
pub use instance::{parse_instance, parse_instance_str, Instance};
pub use solution::{parse_solution, parse_solution_str, SolutionFile};
