use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::thread;

use bytes::BytesMut;
use pooled_bytes::codec::{BufferCursor, StreamReader, StreamWriter};
use pooled_bytes::pool::{BufferPool, PoolRegistry};

/// Benchmark get/put against fresh allocation
fn bench_pool_get_put(c: &mut Criterion) {
    let pool: BufferPool = PoolRegistry::new(64, 1 << 20);

    let mut group = c.benchmark_group("pool");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_put_4k", |b| {
        b.iter(|| {
            let buf = pool.get(black_box(4000));
            pool.put(buf);
        })
    });

    group.bench_function("guard_4k", |b| {
        b.iter(|| {
            let mut buf = pool.get_pooled(black_box(4000));
            buf.extend_from_slice(b"x");
        })
    });

    group.bench_function("fresh_alloc_4k", |b| {
        b.iter(|| black_box(BytesMut::with_capacity(black_box(4096))))
    });

    group.finish();
}

/// Benchmark contended get/put across threads
fn bench_pool_concurrent(c: &mut Criterion) {
    let pool: Arc<BufferPool> = Arc::new(PoolRegistry::new(64, 1 << 20));

    let mut group = c.benchmark_group("pool_concurrent");
    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 1000) as u64));
        group.bench_function(format!("{}_threads", threads), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let pool = Arc::clone(&pool);
                        thread::spawn(move || {
                            for i in 0..1000 {
                                let buf = pool.get(64 << (i % 8));
                                pool.put(buf);
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            })
        });
    }
    group.finish();
}

/// Benchmark varint encode/decode on both codecs
fn bench_varint(c: &mut Criterion) {
    let values: Vec<u64> = (0..1000u64)
        .map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) >> (i % 64))
        .collect();

    let mut group = c.benchmark_group("varint");
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("cursor_roundtrip", |b| {
        let mut cur = BufferCursor::with_capacity(16 * 1024);
        b.iter(|| {
            cur.reset();
            for &v in &values {
                cur.encode_uvarint(v);
            }
            for _ in &values {
                black_box(cur.decode_uvarint().unwrap());
            }
        })
    });

    group.bench_function("stream_roundtrip", |b| {
        let mut out = Vec::with_capacity(16 * 1024);
        b.iter(|| {
            out.clear();
            {
                let mut w = StreamWriter::new(&mut out);
                for &v in &values {
                    w.encode_uvarint(v).unwrap();
                }
            }
            let mut r = StreamReader::new(&out[..]);
            for _ in &values {
                black_box(r.decode_uvarint().unwrap());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pool_get_put, bench_pool_concurrent, bench_varint);
criterion_main!(benches);
