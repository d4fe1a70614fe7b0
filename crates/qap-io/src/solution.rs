//! Solution file parsing.
//!
//! Solution files are whitespace/line-separated numbers: the instance size
//! `n`, the claimed objective value, then the 1-indexed permutation of
//! length `n`.

use qap_core::{Permutation, QapError, QapResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A parsed solution file with its claimed objective.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionFile {
    pub n: usize,
    pub objective: f64,
    pub permutation: Permutation,
}

/// Parse a solution file.
pub fn parse_solution(path: &Path) -> QapResult<SolutionFile> {
    let text = fs::read_to_string(path)?;
    parse_solution_str(&text)
}

/// Parse solution text.
pub fn parse_solution_str(text: &str) -> QapResult<SolutionFile> {
    let mut tokens = text.split_whitespace();

    let n: usize = next_number(&mut tokens, "instance size")?;
    let objective: f64 = next_number(&mut tokens, "claimed objective")?;

    let image: Vec<usize> = tokens
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| QapError::Parse(format!("bad permutation entry '{tok}'")))
        })
        .collect::<QapResult<_>>()?;
    if image.len() != n {
        return Err(QapError::Parse(format!(
            "solution file claims n = {n} but carries {} permutation entries",
            image.len()
        )));
    }
    let permutation = Permutation::from_one_indexed(&image)?;

    Ok(SolutionFile {
        n,
        objective,
        permutation,
    })
}

fn next_number<T: std::str::FromStr>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    what: &str,
) -> QapResult<T> {
    let tok = tokens
        .next()
        .ok_or_else(|| QapError::Parse(format!("solution file is missing the {what}")))?;
    tok.parse()
        .map_err(|_| QapError::Parse(format!("bad {what} '{tok}'")))
}
