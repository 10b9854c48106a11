use std::f64::consts::{PI, TAU};

use approx::assert_relative_eq;
use cartpole_core::{State, SystemConfiguration, mechanical_energy};
use cartpole_solvers::{
    batch::BatchIntegrator,
    system::{Action, CartPoleSystem, Event, Status},
};
use ndarray::{Array1, Array2};

fn config() -> SystemConfiguration {
    let mut config = SystemConfiguration::default()
        .input_timestep_si(0.01)
        .dynamics_steps(10);
    config.parameters = config.parameters.pole_length_si(0.2).gravity_si(9.807);
    config
}

#[test]
fn free_swing_conserves_energy() {
    let config = config();
    let initial = State::new(0.0, 0.1, 0.0, 0.0);
    let mut system = CartPoleSystem::with_initial_state(config, initial).unwrap();

    system.advance_to(3.0, 0.0).unwrap();

    let initial_energy = mechanical_energy(&config.parameters, &initial);
    let energies = system.history().total_energies(&config.parameters);
    assert_eq!(energies.len(), 300);
    for energy in energies {
        assert_relative_eq!(energy, initial_energy, max_relative = 1e-3);
    }
}

#[test]
fn small_swing_has_pendulum_period() {
    // A uniform rod pivoting at one end: ω² = 3g / (2ℓ).
    let config = config();
    let omega = (3.0 * 9.807 / (2.0 * 0.2_f64)).sqrt();
    let period = TAU / omega;

    let mut system =
        CartPoleSystem::with_initial_state(config, State::new(0.0, 0.01, 0.0, 0.0)).unwrap();

    let mut crossings = Vec::new();
    let mut previous = system.current_state().angular_velocity();
    system
        .advance_to_observed(2.0, &mut |_t: f64, _s: &State| 0.0, |event: &Event| {
            let current = event.state.angular_velocity();
            if previous < 0.0 && current >= 0.0 {
                crossings.push(event.time);
            }
            previous = current;
            None::<Action>
        })
        .unwrap();

    // Angular velocity turns positive once per period, at the far end of the
    // swing.
    assert!(crossings.len() >= 2);
    assert_relative_eq!(crossings[1] - crossings[0], period, epsilon = 0.011);
}

#[test]
fn upright_pole_falls_without_control() {
    let config = config();
    let nudged = State::new(0.0, PI + 0.01, 0.0, 0.0);
    let mut system = CartPoleSystem::with_initial_state(config, nudged).unwrap();

    system.advance_to(0.5, 0.0).unwrap();

    let distance_from_upright = (system.current_state().angle() - PI).abs();
    assert!(distance_from_upright > 0.1);
}

#[test]
fn feedback_strategy_runs_every_tick() {
    let config = config();
    let mut system = CartPoleSystem::new(config).unwrap();

    // Push until the cart is close to 0.1 m/s, then coast.
    let status = system
        .advance_to_observed(
            0.2,
            &mut |_t: f64, state: &State| if state.velocity() < 0.095 { 1.0 } else { 0.0 },
            (),
        )
        .unwrap();

    assert_eq!(status, Status::Complete);
    let inputs = system.history().inputs();
    assert_eq!(inputs.len(), 20);
    assert_eq!(inputs[0], 1.0);
    assert_eq!(inputs[19], 0.0);
    assert_relative_eq!(system.current_state().velocity(), 0.1, epsilon = 1e-9);
}

#[test]
fn batch_tracks_independent_trajectories() {
    let config = config();
    let initials = [
        State::new(0.0, 0.2, 0.0, 0.0),
        State::new(0.1, 3.0, -1.0, 2.0),
        State::new(-0.2, 5.5, 0.5, -4.0),
    ];
    let inputs = Array1::from(vec![0.0, 4.0, -6.0]);

    let mut systems: Vec<_> = initials
        .iter()
        .map(|state| CartPoleSystem::with_initial_state(config, *state).unwrap())
        .collect();
    let mut batch = Array2::from_shape_fn((4, initials.len()), |(row, col)| {
        initials[col].to_components()[row]
    });
    let mut integrator = BatchIntegrator::new(&config).unwrap();

    for _ in 0..50 {
        batch = integrator.advance(batch.view(), inputs.view()).unwrap();
        for (system, input) in systems.iter_mut().zip(inputs.iter()) {
            system.advance_one_step(*input).unwrap();
        }
    }

    for (col, system) in systems.iter().enumerate() {
        let expected = system.current_state().to_components();
        for row in [0, 2, 3] {
            assert_relative_eq!(batch[[row, col]], expected[row], epsilon = 1e-9);
        }
        let angle_gap = (batch[[1, col]] - expected[1]).abs();
        assert!(angle_gap.min(TAU - angle_gap) < 1e-9);
    }
}
