//! # qap-core: QAP Instance Modeling Core
//!
//! Provides the fundamental data structures shared by the QAP solver suite.
//!
//! ## Design Philosophy
//!
//! Instances are modeled as a pair of dense square matrices:
//! - **A**: distances between locations
//! - **B**: flows between facilities
//!
//! from which the 4-dimensional cost tensor `Q[i][j][k][l] = A[i][k] * B[j][l]`
//! is built once per instance and is immutable afterwards. All formulations,
//! the Benders decomposition and the verifier consume the tensor (or the raw
//! matrices) through this crate.
//!
//! ## Core Data Structures
//!
//! - [`SquareMatrix`] - dense row-major n x n matrix of reals
//! - [`CostTensor`] - the immutable n^4 cost tensor
//! - [`Permutation`] - a validated facility-to-location assignment
//! - [`QapError`] / [`QapResult`] - the unified error taxonomy
//! - [`Diagnostics`] - warning collection for non-fatal anomalies

pub mod assignment;
pub mod diagnostics;
pub mod error;
pub mod matrix;
pub mod tensor;

pub use assignment::{assignment_from_matrix, Permutation};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{QapError, QapResult};
pub use matrix::SquareMatrix;
pub use tensor::CostTensor;
