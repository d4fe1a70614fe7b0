//! Verifier tests against the bundled instance and solution fixtures.

use std::path::Path;

use qap_algo::benders::BendersSettings;
use qap_algo::{permutation_objective, solve_benders, solve_kbl, verify, SolveLimits};
use qap_io::{parse_instance, parse_solution};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn test_small3_solution_file_verifies_against_solvers() {
    let instance = parse_instance(&fixture("small3.dat")).unwrap();
    let solution_file = parse_solution(&fixture("small3.sln")).unwrap();
    assert_eq!(solution_file.n, instance.n());

    let q = instance.cost_tensor().unwrap();
    let known = (&solution_file.permutation, solution_file.objective);

    let kbl = solve_kbl(&q, &SolveLimits::default()).unwrap();
    let report = verify(&instance.a, &instance.b, &kbl, Some(known)).unwrap();
    assert!(report.objective_match);
    assert_eq!(report.known_solution_consistent, Some(true));
    assert_eq!(report.matches_known_optimum, Some(true));

    let settings = BendersSettings {
        minimum_w_difference: 1e-6,
        ..Default::default()
    };
    let benders = solve_benders(&q, &settings).unwrap();
    let report = verify(&instance.a, &instance.b, &benders, Some(known)).unwrap();
    assert!(report.objective_match);
    assert_eq!(report.matches_known_optimum, Some(true));
    assert!(report.issues.is_empty());
}

#[test]
fn test_grid12_solution_file_is_consistent() {
    let instance = parse_instance(&fixture("grid12.dat")).unwrap();
    let solution_file = parse_solution(&fixture("grid12.sln")).unwrap();
    assert_eq!(instance.n(), 12);
    assert_eq!(solution_file.n, 12);

    // the permutation in the solution file attains exactly the claimed value
    let recomputed =
        permutation_objective(&instance.a, &instance.b, &solution_file.permutation);
    assert_eq!(recomputed, solution_file.objective);
    assert_eq!(recomputed, 53910.0);
}

#[test]
fn test_grid12_tensor_shape() {
    let instance = parse_instance(&fixture("grid12.dat")).unwrap();
    let q = instance.cost_tensor().unwrap();
    assert_eq!(q.n(), 12);
    // spot-check the product identity on a corner
    assert_eq!(q.at(0, 1, 1, 2), instance.a[(0, 1)] * instance.b[(1, 2)]);
}
