use criterion::{Criterion, criterion_group, criterion_main};
use sat_engine::sat::cdcl::Cdcl;
use sat_engine::sat::cnf::Cnf;
use sat_engine::sat::conflict_analysis::FirstUip;
use sat_engine::sat::dpll::Dpll;
use sat_engine::sat::propagation::{Propagator, UnitSearch, WatchedLiterals};
use sat_engine::sat::restarter::{Fixed, Geometric, Linear, Luby, Never, Restarter};
use sat_engine::sat::solver::{BasicConfig, DefaultConfig, Solver, SolverConfig};
use sat_engine::sat::variable_selection::{FixedOrder, VariableSelection, Vsids};
use std::fmt::Debug;
use std::hint::black_box;
use std::marker::PhantomData;
use std::time::Duration;

#[derive(Debug, Clone)]
struct SelectorConfig<V: VariableSelection>(PhantomData<V>);

impl<V: VariableSelection + Debug> SolverConfig for SelectorConfig<V> {
    type Propagator = WatchedLiterals;
    type VariableSelector = V;
    type Restarter = Luby<100>;
    type Analyser = FirstUip;
}

#[derive(Debug, Clone)]
struct RestarterConfig<R: Restarter>(PhantomData<R>);

impl<R: Restarter + Debug> SolverConfig for RestarterConfig<R> {
    type Propagator = WatchedLiterals;
    type VariableSelector = Vsids;
    type Restarter = R;
    type Analyser = FirstUip;
}

#[derive(Debug, Clone)]
struct PropagatorConfig<P: Propagator>(PhantomData<P>);

impl<P: Propagator> SolverConfig for PropagatorConfig<P> {
    type Propagator = P;
    type VariableSelector = Vsids;
    type Restarter = Luby<100>;
    type Analyser = FirstUip;
}

/// Uniform random 3-SAT near the phase transition (4.26 clauses per variable).
fn random_3sat(rng: &mut fastrand::Rng, num_vars: i32) -> Cnf {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_clauses = (f64::from(num_vars) * 4.26) as usize;
    let clauses: Vec<Vec<i32>> = (0..num_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let var = rng.i32(1..=num_vars);
                    if rng.bool() { var } else { -var }
                })
                .collect()
        })
        .collect();
    Cnf::from_dimacs(clauses).expect("no zero literals")
}

/// `holes + 1` pigeons in `holes` holes. Always unsatisfiable.
fn pigeonhole(holes: i32) -> Cnf {
    let pigeons = holes + 1;
    let var = |p: i32, h: i32| p * holes + h + 1;
    let mut clauses: Vec<Vec<i32>> = (0..pigeons)
        .map(|p| (0..holes).map(|h| var(p, h)).collect())
        .collect();
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    Cnf::from_dimacs(clauses).expect("no zero literals")
}

fn instances() -> Vec<Cnf> {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    (0..50).map(|_| random_3sat(&mut rng, 40)).collect()
}

fn solve_all<S: Solver<C>, C: SolverConfig>(cnfs: &[Cnf]) {
    for cnf in cnfs {
        let mut solver = S::from_cnf(cnf.clone());
        black_box(solver.solve());
    }
}

fn bench_3sat(c: &mut Criterion) {
    let cnfs = instances();

    let mut group = c.benchmark_group("3sat - driver");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("CDCL default", |b| {
        b.iter(|| solve_all::<Cdcl<DefaultConfig>, _>(&cnfs));
    });
    group.bench_function("CDCL basic", |b| {
        b.iter(|| solve_all::<Cdcl<BasicConfig>, _>(&cnfs));
    });
    group.bench_function("DPLL", |b| {
        b.iter(|| solve_all::<Dpll<DefaultConfig>, _>(&cnfs));
    });
    group.finish();

    let mut group = c.benchmark_group("3sat - restarter");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Fixed", |b| {
        b.iter(|| solve_all::<Cdcl<RestarterConfig<Fixed<100>>>, _>(&cnfs));
    });
    group.bench_function("Linear", |b| {
        b.iter(|| solve_all::<Cdcl<RestarterConfig<Linear<100>>>, _>(&cnfs));
    });
    group.bench_function("Geometric", |b| {
        b.iter(|| solve_all::<Cdcl<RestarterConfig<Geometric<100>>>, _>(&cnfs));
    });
    group.bench_function("Luby", |b| {
        b.iter(|| solve_all::<Cdcl<RestarterConfig<Luby<100>>>, _>(&cnfs));
    });
    group.bench_function("Never", |b| {
        b.iter(|| solve_all::<Cdcl<RestarterConfig<Never>>, _>(&cnfs));
    });
    group.finish();
}

fn bench_pigeonhole(c: &mut Criterion) {
    let cnfs = vec![pigeonhole(5), pigeonhole(6)];

    let mut group = c.benchmark_group("pigeonhole - variable selection");
    group.sample_size(10);

    group.bench_function("Vsids", |b| {
        b.iter(|| solve_all::<Cdcl<SelectorConfig<Vsids>>, _>(&cnfs));
    });
    group.bench_function("Fixed Order", |b| {
        b.iter(|| solve_all::<Cdcl<SelectorConfig<FixedOrder>>, _>(&cnfs));
    });
    group.finish();

    let mut group = c.benchmark_group("pigeonhole - propagator");
    group.sample_size(10);

    group.bench_function("WatchedLiterals", |b| {
        b.iter(|| solve_all::<Cdcl<PropagatorConfig<WatchedLiterals>>, _>(&cnfs));
    });
    group.bench_function("Unit search", |b| {
        b.iter(|| solve_all::<Cdcl<PropagatorConfig<UnitSearch>>, _>(&cnfs));
    });
    group.finish();
}

criterion_group!(benches, bench_3sat, bench_pigeonhole);
criterion_main!(benches);
