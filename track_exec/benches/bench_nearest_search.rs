//! # Nearest-point Search Benchmark
//!
//! The nearest-point search is a full O(L) scan executed every control
//! cycle, this benchmark keeps an eye on its cost for a dense path.

use criterion::{criterion_group, criterion_main, Criterion};

use track_lib::{
    loc::Pose2D,
    ref_path::RefPath,
    traj_ctrl::horizon,
};

fn nearest_search_benchmark(c: &mut Criterion) {
    // ---- Build a dense circular reference path ----

    let num_points = 5000;
    let poses: Vec<Pose2D> = (0..num_points)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI
                * (i as f64) / (num_points as f64);
            Pose2D::new(
                10.0 * angle.cos(),
                10.0 * angle.sin(),
                util::maths::wrap_to_pi(angle + 0.5 * std::f64::consts::PI)
            )
        })
        .collect();

    let path = RefPath::from_poses(poses).unwrap();

    // Pose slightly off the circle, partway around
    let pose = Pose2D::new(9.5, 0.8, 1.4);

    c.bench_function("find_nearest_index", |b| {
        b.iter(|| horizon::find_nearest_index(&path, &pose, 0.2))
    });
}

criterion_group!(benches, nearest_search_benchmark);
criterion_main!(benches);
