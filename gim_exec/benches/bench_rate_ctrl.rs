//! # Rate Control Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::eqpt::gimbal::GimbalFeedback;
use gim_lib::{
    est::DeltaIntegrator,
    rate_ctrl::{InputData, Params, RateCtrl, VehicleData},
};
use util::module::State;

fn rate_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build a configured RateCtrl ----

    let params = Params {
        delta_time_s: 0.02,
        k_gimbal_rate: 0.1,
        yaw_error_limit_rad: 0.5,
        yaw_rate_filt_pole: 10.0,
        max_tilt_rate_rads: 0.5,
        tilt_angle_min_rad: -1.0,
        tilt_angle_max_rad: 0.2,
        joint_offsets_rad: [0.001, -0.002, 0.0005],
        target_system: 1,
        target_component: 154,
    };

    let mut rate_ctrl = RateCtrl::with_params(params, Box::new(DeltaIntegrator::new()));

    // Representative feedback, a small constant turn with the yaw joint
    // slightly off centre
    let feedback = GimbalFeedback {
        id: 0,
        gyro_x: 0.0001,
        gyro_y: -0.0002,
        gyro_z: 0.0004,
        acc_x: 0.0,
        acc_y: 0.0,
        acc_z: -0.196,
        joint_roll: 0.01,
        joint_el: -0.2,
        joint_az: 0.15,
    };

    let vehicle = VehicleData {
        yaw_rate_earth_rads: 0.1,
        ..Default::default()
    };

    let mut id: u8 = 0;

    // Bench one full control cycle, including feedback decode and estimator
    // propagation
    c.bench_function("RateCtrl::proc", |b| {
        b.iter(|| {
            id = id.wrapping_add(1);

            let input = InputData {
                feedback: Some(GimbalFeedback { id, ..feedback }),
                tilt_dem_norm: -0.3,
                vehicle,
            };

            rate_ctrl.proc(&input).unwrap()
        })
    });
}

criterion_group!(benches, rate_ctrl_benchmark);
criterion_main!(benches);
