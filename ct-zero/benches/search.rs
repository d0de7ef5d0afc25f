use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ct_game::board::Board;
use ct_net::model::{ContrastNet, TowerShape};
use ct_zero::network::cpu::CpuNetwork;
use ct_zero::network::dummy::DummyNetwork;
use ct_zero::network::Network;
use ct_zero::zero::wrapper::ZeroSettings;

fn search(c: &mut Criterion) {
    let board = Board::default();
    let settings = ZeroSettings::default();

    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for simulations in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("dummy", simulations), &simulations, |b, &simulations| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| settings.build_tree(&board, &mut DummyNetwork, &mut rng, simulations))
        });
    }

    let shape = TowerShape::default().with_depth(2);
    let mut network = CpuNetwork::new(ContrastNet::random(shape, &mut StdRng::seed_from_u64(0)));
    group.bench_function("cpu_depth_2/50", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| settings.build_tree(&board, &mut network, &mut rng, 50))
    });

    group.finish();
}

fn evaluate(c: &mut Criterion) {
    let board = Board::default();
    let mut network = CpuNetwork::new(ContrastNet::random(TowerShape::default(), &mut StdRng::seed_from_u64(0)));
    c.bench_function("evaluate_default_shape", |b| b.iter(|| network.evaluate(&board)));
}

criterion_group!(benches, search, evaluate);
criterion_main!(benches);
