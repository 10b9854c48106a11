use std::{convert::Infallible, f64::consts::PI, fmt};

use cartpole_core::{Discretization, SystemConfiguration};
use cartpole_learning::{
    CostFunctions, Error, InputOptimizer, LearningContext, LookaheadRequest,
};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn config() -> SystemConfiguration {
    let mut config = SystemConfiguration::default();
    config.discretization = Discretization {
        cart_position: 5,
        pole_angle: 8,
        cart_velocity: 5,
        pole_angular_velocity: 5,
        cart_acceleration: 3,
    };
    config
}

/// Penalizes distance from the upright pole at rest.
fn costs() -> CostFunctions {
    CostFunctions::new(
        |states: ArrayView2<'_, f64>| {
            states.map_axis(Axis(0), |s| {
                let angle_error = (s[1] - PI).abs();
                s[0] * s[0] + angle_error * angle_error + s[2] * s[2] + s[3] * s[3]
            })
        },
        |inputs: ArrayView1<'_, f64>| inputs.mapv(|u| 0.01 * u * u),
    )
}

fn context(seed: u64) -> LearningContext<ChaCha8Rng> {
    LearningContext::with_rng(config(), costs(), ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

/// Tries every candidate and keeps the cheapest successor per column.
struct Exhaustive;

impl InputOptimizer for Exhaustive {
    type Error = cartpole_solvers::batch::Error;

    fn best_inputs(&mut self, request: LookaheadRequest<'_>) -> Result<Array1<f64>, Self::Error> {
        let columns = request.states.ncols();
        let mut best = Array1::from_elem(columns, f64::INFINITY);
        let mut choice = Array1::zeros(columns);

        for &candidate in request.candidates {
            let next = request.integrator.advance_uniform(request.states, candidate)?;
            let input_cost = request
                .costs
                .input_costs(Array1::from_elem(1, candidate).view())[0];
            let totals = request.costs.state_costs(next.view()) + input_cost;
            for j in 0..columns {
                if totals[j] < best[j] {
                    best[j] = totals[j];
                    choice[j] = candidate;
                }
            }
        }
        Ok(choice)
    }
}

/// Always answers with a single input, whatever the batch size.
struct Truncating;

impl InputOptimizer for Truncating {
    type Error = Infallible;

    fn best_inputs(&mut self, _request: LookaheadRequest<'_>) -> Result<Array1<f64>, Infallible> {
        Ok(Array1::zeros(1))
    }
}

#[derive(Debug)]
struct GaveUp;

impl fmt::Display for GaveUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("gave up")
    }
}

impl std::error::Error for GaveUp {}

struct Failing;

impl InputOptimizer for Failing {
    type Error = GaveUp;

    fn best_inputs(&mut self, _request: LookaheadRequest<'_>) -> Result<Array1<f64>, GaveUp> {
        Err(GaveUp)
    }
}

#[test]
fn exhaustive_search_picks_admissible_inputs() {
    let mut context = context(2024);
    context.update_batch(64).unwrap();

    let inputs = context.best_accelerations(&mut Exhaustive).unwrap();

    assert_eq!(inputs.len(), 64);
    let candidates = context.discretizer().cart_accelerations().to_vec();
    assert_eq!(candidates, vec![-7.0, 0.0, 7.0]);
    assert!(inputs.iter().all(|u| candidates.contains(u)));

    // The chosen inputs never do worse than holding still.
    let chosen = context.advance_batch(inputs.view()).unwrap();
    let idle = context
        .advance_batch(Array1::zeros(64).view())
        .unwrap();
    let costs = context.costs();
    let chosen_cost = costs.state_costs(chosen.view()) + costs.input_costs(inputs.view());
    let idle_cost = costs.state_costs(idle.view());
    for (chosen, idle) in chosen_cost.iter().zip(idle_cost.iter()) {
        assert!(chosen <= idle);
    }
}

#[test]
fn wrong_input_count_is_rejected() {
    let mut context = context(9);
    context.update_batch(3).unwrap();

    assert!(matches!(
        context.best_accelerations(&mut Truncating),
        Err(Error::InputCount {
            expected: 3,
            got: 1
        })
    ));
}

#[test]
fn optimizer_failures_are_wrapped() {
    let mut context = context(9);
    context.update_batch(3).unwrap();

    let err = context.best_accelerations(&mut Failing).unwrap_err();
    assert!(matches!(err, Error::Optimizer(_)));
    assert_eq!(err.to_string(), "optimizer failed: gave up");
}

#[test]
fn every_sample_is_a_lattice_state() {
    let mut context = context(77);
    let space_size = context.discretizer().space_size();
    assert_eq!(space_size, 5 * 8 * 5 * 5);

    for batch_size in [1, 17, space_size] {
        context.update_batch(batch_size).unwrap();
        assert_eq!(context.batch().dim(), (4, batch_size));

        for (column, &index) in context.batch_indices().iter().enumerate() {
            let state = context.discretizer().state(index).unwrap();
            assert_eq!(
                context.batch().column(column).to_vec(),
                state.to_components().to_vec()
            );
        }
    }
}
