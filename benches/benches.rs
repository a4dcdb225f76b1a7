use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dada_utils::{
    dada::{DadaHeader, Layout},
    writer::encode,
    Cosine, DadaConfig, RejectionSampler,
};
use ndarray::Array2;
use rand::prelude::*;

const NCHAN: usize = 256;
const NSAMPS: usize = 4096;

fn benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let data = Array2::from_shape_simple_fn((NCHAN, NSAMPS), || rng.gen::<f32>() * 100.0);
    let config = DadaConfig::default();
    let layout = Layout::new(&[NCHAN, NSAMPS], &config).unwrap();

    c.bench_function("header", |b| {
        b.iter(|| {
            DadaHeader::build(black_box(&config), black_box(&layout))
                .and_then(|h| h.to_bytes())
                .unwrap()
        })
    });

    for (nbit, order) in [(32, "TF"), (32, "FT"), (8, "TF")] {
        let config = DadaConfig {
            nbit,
            order: order.to_owned(),
            ..Default::default()
        };
        c.bench_function(&format!("encode {nbit} bit {order}"), |b| {
            b.iter(|| encode(black_box(&data), black_box(&config)).unwrap())
        });
    }

    let mut sampler = RejectionSampler::new(Cosine).set_seed(0);
    c.bench_function("rejection sample cos", |b| {
        b.iter(|| sampler.sample(0.0, std::f64::consts::FRAC_PI_2, black_box(10_000)))
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
