use std::time::Instant;

use crate::simulation::integrator::{Scheme, TimeIntegrator};
use crate::simulation::states::{Formulation, NVec3, ParticleField};

/// Helper to build a field of `n` particles on a deterministic cloud
fn make_field(n: usize, formulation: Formulation) -> ParticleField {
    let mut field = ParticleField::new(formulation);

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions and strengths, no rand needed
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        let gamma = NVec3::new(
            (i_f * 0.11).cos(),
            (i_f * 0.29).sin(),
            1.0,
        ) * 0.01;
        field.add_particle(x, gamma, 0.2);
    }

    field
}

/// Time one step of each of the four steppers for a range of n
/// Prints CSV so it can be pasted straight into a spreadsheet
pub fn bench_steppers() {
    let ns = [200, 400, 800, 1600, 3200];
    let steps = 2; // steps per stepper
    let dt = 1.0e-3;

    let integrator = TimeIntegrator::new();
    let cases = [
        ("euler_classic", Scheme::Euler, Formulation::Classic),
        ("euler_reformulated", Scheme::Euler, Formulation::rvpm()),
        ("rk3_classic", Scheme::Rk3, Formulation::Classic),
        ("rk3_reformulated", Scheme::Rk3, Formulation::rvpm()),
    ];

    println!("N,stepper,ms_per_step");

    for n in ns {
        for (name, scheme, formulation) in cases {
            let mut field = make_field(n, formulation);

            // Warm-up
            if let Err(e) = integrator.step(&mut field, scheme, dt, false, None) {
                eprintln!("{name} failed at N = {n}: {e}");
                continue;
            }

            let t0 = Instant::now();
            for _ in 0..steps {
                if let Err(e) = integrator.step(&mut field, scheme, dt, false, None) {
                    eprintln!("{name} failed at N = {n}: {e}");
                    break;
                }
            }
            let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

            println!("{},{},{:.6}", n, name, ms);
        }
    }
}
