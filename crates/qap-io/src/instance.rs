//! Instance file parsing.
//!
//! The instance format is three blocks separated by blank lines: the size
//! `n`, the n x n distance matrix A, and the n x n flow matrix B, all
//! whitespace-separated numbers:
//!
//! ```text
//! 3
//!
//! 0 1 2
//! 1 0 3
//! 2 3 0
//!
//! 0 5 1
//! 5 0 2
//! 1 2 0
//! ```

use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A parsed QAP instance: distance matrix A, flow matrix B, and the name
/// derived from the data file it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    pub name: String,
    pub a: SquareMatrix,
    pub b: SquareMatrix,
}

impl Instance {
    pub fn new(name: impl Into<String>, a: SquareMatrix, b: SquareMatrix) -> QapResult<Self> {
        if a.n() != b.n() {
            return Err(QapError::DimensionMismatch(format!(
                "distance matrix is {0}x{0} but flow matrix is {1}x{1}",
                a.n(),
                b.n()
            )));
        }
        Ok(Self {
            name: name.into(),
            a,
            b,
        })
    }

    /// Instance size n.
    pub fn n(&self) -> usize {
        self.a.n()
    }

    /// Build the cost tensor `Q[i][j][k][l] = A[i][k] * B[j][l]`.
    pub fn cost_tensor(&self) -> QapResult<CostTensor> {
        CostTensor::from_matrices(&self.a, &self.b)
    }
}

/// Parse an instance file; the instance name is the file name.
pub fn parse_instance(path: &Path) -> QapResult<Instance> {
    let text = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_instance_str(&name, &text)
}

/// Parse instance text. `name` is carried through into the result artifact.
pub fn parse_instance_str(name: &str, text: &str) -> QapResult<Instance> {
    let blocks = split_blocks(text);
    if blocks.len() != 3 {
        return Err(QapError::Parse(format!(
            "instance '{name}': expected 3 blank-line-separated blocks (n, A, B), found {}",
            blocks.len()
        )));
    }

    let n = first_integer(&blocks[0]).ok_or_else(|| {
        QapError::Parse(format!("instance '{name}': size block holds no integer"))
    })?;
    let a = parse_matrix(&blocks[1], n, "A")?;
    let b = parse_matrix(&blocks[2], n, "B")?;
    Instance::new(name, a, b)
}

/// Group non-blank lines into blocks separated by one or more blank lines.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn first_integer(block: &str) -> Option<usize> {
    block.split_whitespace().next()?.parse().ok()
}

fn parse_matrix(block: &str, n: usize, which: &str) -> QapResult<SquareMatrix> {
    let entries: Vec<f64> = block
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| QapError::Parse(format!("matrix {which}: bad entry '{tok}'")))
        })
        .collect::<QapResult<_>>()?;
    if entries.len() != n * n {
        return Err(QapError::DimensionMismatch(format!(
            "matrix {which}: expected {} entries for n = {n}, found {}",
            n * n,
            entries.len()
        )));
    }
    SquareMatrix::from_flat(n, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL: &str = "3\n\n0 1 2\n1 0 3\n2 3 0\n\n0 5 1\n5 0 2\n1 2 0\n";

    #[test]
    fn test_parse_small_instance() {
        let inst = parse_instance_str("small3.dat", SMALL).unwrap();
        assert_eq!(inst.n(), 3);
        assert_eq!(inst.a[(1, 2)], 3.0);
        assert_eq!(inst.b[(0, 1)], 5.0);
        let q = inst.cost_tensor().unwrap();
        assert_eq!(q.at(0, 0, 1, 1), inst.a[(0, 1)] * inst.b[(0, 1)]);
    }

    #[test]
    fn test_block_count_enforced() {
        let err = parse_instance_str("bad", "3\n\n0 1 2 1 0 3 2 3 0\n");
        assert!(matches!(err, Err(QapError::Parse(_))));
    }

    #[test]
    fn test_matrix_size_enforced() {
        let err = parse_instance_str("bad", "3\n\n0 1\n\n0 5 1 5 0 2 1 2 0\n");
        assert!(matches!(err, Err(QapError::DimensionMismatch(_))));
    }

    #[test]
    fn test_parse_from_file_uses_file_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();
        let inst = parse_instance(file.path()).unwrap();
        assert_eq!(inst.n(), 3);
        assert_eq!(
            inst.name,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }
}
