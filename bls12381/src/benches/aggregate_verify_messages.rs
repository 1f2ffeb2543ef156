use commonware_bls12381::{primitives::ops, Mapping, MinSig, Variant};
use criterion::{criterion_group, BatchSize, Criterion};
use rand::{thread_rng, Rng};

fn bench_aggregate_verify_messages(c: &mut Criterion) {
    for n in [10, 100, 1000].into_iter() {
        let mut msgs = Vec::with_capacity(n);
        for _ in 0..n {
            let mut msg = [0u8; 32];
            thread_rng().fill(&mut msg);
            msgs.push(msg);
        }
        for concurrency in [1, 8] {
            c.bench_function(
                &format!("{}/msgs={} conc={}", module_path!(), n, concurrency),
                |b| {
                    b.iter_batched(
                        || {
                            let mut entries = Vec::with_capacity(n);
                            let mut signatures = Vec::with_capacity(n);
                            for msg in msgs.iter() {
                                let (private, public) =
                                    ops::keypair::<_, MinSig>(&mut thread_rng());
                                signatures.push(ops::sign::<MinSig>(
                                    &private,
                                    Mapping::Hash,
                                    msg,
                                    MinSig::MESSAGE,
                                    &[],
                                ));
                                entries.push((public, msg.as_slice()));
                            }
                            (
                                entries,
                                ops::aggregate::combine_signatures::<MinSig, _>(&signatures),
                            )
                        },
                        |(entries, signature)| {
                            ops::aggregate::aggregate_verify::<MinSig>(
                                &entries,
                                &signature,
                                Mapping::Hash,
                                MinSig::MESSAGE,
                                &[],
                                concurrency,
                            )
                            .unwrap();
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_aggregate_verify_messages
}
