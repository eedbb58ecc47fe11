use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use gridpath::agent::AgentBuilder;
use gridpath::checkpoint::CheckpointPolicy;
use gridpath::config::TrainingConfig;
use gridpath::environment::{Action, Cell, State};
use gridpath::trainer::Trainer;
use gridpath::value_function::ValueFunction;

fn bench_online_update(c: &mut Criterion) {
    let mut agent = AgentBuilder::new().seed(1).build().unwrap();
    c.bench_function("online_update", |b| {
        b.iter(|| {
            agent
                .train(black_box(State::new(1, 2)), Action::Right, -0.05, State::new(2, 2), false)
                .unwrap()
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let agent = AgentBuilder::new().seed(2).build().unwrap();
    let state = State::new(3, 4);
    c.bench_function("predict", |b| b.iter(|| agent.value_function().predict(black_box(&state))));
}

fn bench_episodes(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("episodes");
    group.sample_size(10);

    for (name, checkpoint) in [("no_checkpoint", CheckpointPolicy::Never), ("every_step", CheckpointPolicy::EveryStep)] {
        let config = TrainingConfig::new(5, vec![Cell::new(2, 3), Cell::new(3, 2)], 3, dir.path().join("m.bin"), dir.path().join("e.json"))
            .with_max_iteration(500)
            .with_checkpoint(checkpoint);
        let trainer = Trainer::new(config).unwrap();

        group.bench_function(name, |b| {
            b.iter_batched(
                || AgentBuilder::new().seed(3).build().unwrap(),
                |mut agent| trainer.train_episodes(&mut agent).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_online_update, bench_predict, bench_episodes);
criterion_main!(benches);
