//! Encode/decode throughput over a 1 MiB stream.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use chainseal_core::{decode_to_vec, Blake3Digest, ChainEncoder};

const PART_SIZE: usize = 4096;
const PLAINTEXT_LEN: usize = 1 << 20;

fn plaintext() -> Vec<u8> {
    (0..PLAINTEXT_LEN).map(|i| (i % 251) as u8).collect()
}

fn bench_encode(c: &mut Criterion) {
    let data = plaintext();
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("1MiB_part4096", |b| {
        let mut encoder = ChainEncoder::new(Blake3Digest::new(), PART_SIZE);
        b.iter(|| encoder.encode_to_vec(black_box(&data)).unwrap());
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let data = plaintext();
    let mut encoder = ChainEncoder::new(Blake3Digest::new(), PART_SIZE);
    let (wire, tag) = encoder.encode_to_vec(&data).unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("1MiB_part4096", |b| {
        b.iter(|| {
            decode_to_vec(
                Cursor::new(black_box(&wire)),
                Blake3Digest::new(),
                PART_SIZE,
                tag.total_len,
                &tag.root_digest,
            )
            .unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
