use slackpack::algorithm::*;
use slackpack::detail::*;
use slackpack::storage::*;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        generating_harmonic_squares,
        churning_in_memory_storage,
        packing_one_thousand_details,
}

fn generating_harmonic_squares(c: &mut criterion::Criterion) {
    c.bench_function("emit 1k harmonic square sizes", |b| {
        b.iter(|| HarmonicSquares::new(100).unwrap().take(1000).count())
    });
}

fn churning_in_memory_storage(c: &mut criterion::Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("add and drain 1k boxes", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut storage = InMemoryBoxStorage::new();
                for i in 1..=1000usize {
                    let side = 1.0 / i as f64;
                    let detail = Detail::new(
                        (0.0, 0.0),
                        (side, side * 2.0),
                        format!("B{}", i),
                        Kind::NormalBox1,
                    );
                    storage.add(detail).await.unwrap();
                }
                while storage.pop_max().await.unwrap().is_some() {}
            })
        })
    });
}

fn packing_one_thousand_details(c: &mut criterion::Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("place 1k harmonic squares", |b| {
        b.iter(|| {
            rt.block_on(async {
                let generator = HarmonicSquares::new(100).unwrap();
                let sheet = base_sheet(&generator);
                let mut engine =
                    SlackPack::new(4.0 / 3.0, 100, 1000, InMemoryBoxStorage::new()).unwrap();
                DetailPlacer::new(generator, &mut engine, sheet, 1000).run().await
            })
        })
    });
}
