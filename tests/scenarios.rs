//! Hand-written formulas with known answers, solved through the public API.

use sat_engine::sat::cdcl::Cdcl;
use sat_engine::sat::cnf::{Cnf, MAX_VARS};
use sat_engine::sat::dimacs::parse_str;
use sat_engine::sat::dpll::Dpll;
use sat_engine::sat::error::SolverError;
use sat_engine::sat::literal::{Literal, MAX_VARIABLE};
use sat_engine::sat::solver::{
    BasicConfig, Budget, DefaultConfig, DynamicConfig, SolveResult, Solver, SolverConfig,
    SolverImpls,
};

fn lits(clause: &[i32]) -> Vec<Literal> {
    clause
        .iter()
        .map(|&l| Literal::from_dimacs(l).unwrap())
        .collect()
}

fn solve_with<S: Solver<C>, C: SolverConfig>(num_vars: usize, clauses: &[&[i32]]) -> SolveResult {
    let mut solver = S::new(num_vars).unwrap();
    for clause in clauses {
        solver.add_clause(lits(clause)).unwrap();
    }
    solver.solve()
}

/// Runs `check` against every driver and provided configuration.
fn for_each_solver(num_vars: usize, clauses: &[&[i32]], check: impl Fn(SolveResult)) {
    check(solve_with::<Cdcl<DefaultConfig>, _>(num_vars, clauses));
    check(solve_with::<Cdcl<BasicConfig>, _>(num_vars, clauses));
    check(solve_with::<Cdcl<DynamicConfig>, _>(num_vars, clauses));
    check(solve_with::<Dpll<DefaultConfig>, _>(num_vars, clauses));
    check(solve_with::<Dpll<BasicConfig>, _>(num_vars, clauses));
    check(solve_with::<SolverImpls<DynamicConfig>, _>(num_vars, clauses));
}

#[test]
fn two_variables_force_x2() {
    let clauses: &[&[i32]] = &[&[1, 2], &[-1, 2], &[1, -2]];
    for_each_solver(2, clauses, |result| {
        let model = result.into_solutions().unwrap();
        assert_eq!(model.value(1), Some(true));
        assert!(
            clauses
                .iter()
                .all(|c| lits(c).into_iter().any(|l| model.satisfies(l)))
        );
    });
}

#[test]
fn contradictory_units_fail_at_the_root() {
    for_each_solver(1, &[&[1], &[-1]], |result| {
        assert_eq!(result, SolveResult::Unsatisfiable);
    });

    let mut solver = Cdcl::<DefaultConfig>::new(1).unwrap();
    solver.add_clause(lits(&[1])).unwrap();
    solver.add_clause(lits(&[-1])).unwrap();
    assert!(solver.solve().is_unsat());
    assert_eq!(solver.stats().decisions, 0);
    assert_eq!(solver.num_learnt(), 0);
}

#[test]
fn triangle_cannot_be_two_coloured() {
    // x_i is the colour of vertex i; every edge joins different colours
    let clauses: &[&[i32]] = &[&[1, 2], &[-1, -2], &[2, 3], &[-2, -3], &[1, 3], &[-1, -3]];
    for_each_solver(3, clauses, |result| assert!(result.is_unsat()));
}

#[test]
fn empty_clause_is_unsatisfiable() {
    for_each_solver(2, &[&[1, 2], &[]], |result| assert!(result.is_unsat()));
}

#[test]
fn empty_formula_is_satisfiable() {
    for_each_solver(3, &[], |result| {
        assert_eq!(result.into_solutions().unwrap().len(), 3);
    });
}

#[test]
fn tautologies_and_duplicates_are_harmless() {
    for_each_solver(2, &[&[1, -1], &[2, 2, 2], &[-2, 1, 1]], |result| {
        let model = result.into_solutions().unwrap();
        assert_eq!(model.as_slice(), &[true, true]);
    });
}

#[test]
fn pigeonhole_is_unsatisfiable() {
    let holes = 4;
    let var = |p: i32, h: i32| p * holes + h + 1;
    let mut clauses: Vec<Vec<i32>> = (0..=holes)
        .map(|p| (0..holes).map(|h| var(p, h)).collect())
        .collect();
    for h in 0..holes {
        for p in 0..=holes {
            for q in p + 1..=holes {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }

    let mut cdcl = Cdcl::<DefaultConfig>::from_cnf(Cnf::from_dimacs(clauses.clone()).unwrap());
    assert!(cdcl.solve().is_unsat());
    assert!(cdcl.num_conflicts() > 0);
    assert!(cdcl.num_learnt() > 0);

    let mut dpll = Dpll::<DefaultConfig>::from_cnf(Cnf::from_dimacs(clauses).unwrap());
    assert!(dpll.solve().is_unsat());
    assert_eq!(dpll.num_learnt(), 0);
}

#[test]
fn out_of_range_literals_are_rejected() {
    let mut solver = Cdcl::<DefaultConfig>::new(2).unwrap();
    solver.add_clause(lits(&[1])).unwrap();

    let err = solver.add_clause(lits(&[1, 3])).unwrap_err();
    assert!(matches!(err, SolverError::InvalidLiteral { num_vars: 2, .. }));
    assert_eq!(solver.num_clauses(), 1);
    assert!(solver.solve().is_sat());

    assert!(matches!(
        Cdcl::<DefaultConfig>::new(usize::MAX),
        Err(SolverError::InvalidVariableCount { .. })
    ));
    assert_eq!(Literal::from_dimacs(0), None);
}

#[test]
fn oversized_formulas_are_refused_before_allocating() {
    for num_vars in [MAX_VARS + 1, 1 << 31] {
        assert!(matches!(
            Cdcl::<DefaultConfig>::new(num_vars),
            Err(SolverError::InvalidVariableCount { max: MAX_VARS, .. })
        ));
        assert!(matches!(
            Dpll::<DefaultConfig>::new(num_vars),
            Err(SolverError::InvalidVariableCount { max: MAX_VARS, .. })
        ));
    }
}

#[test]
fn variables_beyond_the_encoding_never_reach_a_clause() {
    assert_eq!(Literal::try_new(1 << 31, false), None);

    let mut solver = Cdcl::<DefaultConfig>::new(2).unwrap();
    let top = Literal::try_new(MAX_VARIABLE, false).unwrap();
    let err = solver.add_clause([top]).unwrap_err();
    assert_eq!(
        err,
        SolverError::InvalidLiteral {
            literal: top,
            num_vars: 2
        }
    );
    assert_eq!(solver.num_clauses(), 0);
    assert!(solver.solve().is_sat());
}

#[test]
fn dimacs_text_solves_and_prints_a_model() {
    let cnf = parse_str(
        "c two clauses\n\
         p cnf 3 2\n\
         -1 0\n\
         1 -2 3 0\n",
    )
    .unwrap();
    let mut solver = Cdcl::<DefaultConfig>::from_cnf(cnf);
    let result = solver.solve();

    assert_eq!(result.to_string(), "SATISFIABLE");
    assert_eq!(result.exit_code(), 10);
    // x1 is forced false, then x2 = true is decided and forces x3
    assert_eq!(result.solutions().unwrap().to_string(), "-1 2 3 0");
}

#[test]
fn budget_exhaustion_is_unknown_and_resumable() {
    let mut solver = Cdcl::<DefaultConfig>::new(3).unwrap();
    for clause in [&[1, 2, 3][..], &[-1, 2], &[-2, -3]] {
        solver.add_clause(lits(clause)).unwrap();
    }

    solver.set_budget(Budget::default().with_max_decisions(0));
    let result = solver.solve();
    assert_eq!(result, SolveResult::Unknown);
    assert_eq!(result.exit_code(), 0);

    solver.set_budget(Budget::unlimited());
    let model = solver.solve().into_solutions().unwrap();
    assert_eq!(model.as_slice(), &[true, true, false]);
    assert!(solver.cnf().verify(&model));
}

#[test]
fn clauses_can_be_added_between_solves() {
    let mut solver = SolverImpls::<DynamicConfig>::new(3).unwrap();
    solver.add_clause(lits(&[1, 2, 3])).unwrap();
    assert!(solver.solve().is_sat());

    solver.add_clause(lits(&[-1])).unwrap();
    solver.add_clause(lits(&[-2])).unwrap();
    let model = solver.solve().into_solutions().unwrap();
    assert_eq!(model.as_slice(), &[false, false, true]);

    solver.add_clause(lits(&[-3])).unwrap();
    assert!(solver.solve().is_unsat());
    assert_eq!(solver.num_clauses(), 4 + solver.num_learnt());
}
