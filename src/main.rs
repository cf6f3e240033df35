use std::error::Error;
use std::hint::black_box;
use std::thread;
use std::time::Instant;

use pooled_bytes::codec::{BufferCursor, StreamReader, StreamWriter};
use pooled_bytes::config::{Codec, Command, Config, Kind};
use pooled_bytes::pool::size_class::{class_capacity, class_of, MAX_CLASS};
use pooled_bytes::pool::{CursorPool, PoolConfig, PoolRegistry};

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

type CliResult<T> = std::result::Result<T, Box<dyn Error>>;

fn main() -> CliResult<()> {
    // Parse configuration
    let config = Config::parse_args();

    // Initialize tracing
    let log_level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let pool_config = config.command.pool_config();
    match config.command {
        Command::Class { capacities } => {
            for capacity in capacities {
                let class = class_of(capacity);
                if class > MAX_CLASS {
                    println!("{}\tclass {}\tnot addressable", capacity, class);
                } else {
                    println!("{}\tclass {}\t{} bytes", capacity, class, class_capacity(class));
                }
            }
        }
        Command::Encode { kind, codec, value } => {
            let bytes = encode(kind, codec, &value)?;
            println!("{}", hex::encode(bytes));
        }
        Command::Decode { kind, codec, hex: input } => {
            let bytes = hex::decode(input.trim())?;
            let (value, consumed) = decode(kind, codec, &bytes)?;
            println!("{}", value);
            if consumed < bytes.len() {
                info!("{} trailing bytes ignored", bytes.len() - consumed);
            }
        }
        Command::Stress {
            threads,
            iterations,
            ..
        } => {
            if let Some(pool_config) = pool_config {
                stress(pool_config, threads, iterations);
            }
        }
    }

    Ok(())
}

fn encode(kind: Kind, codec: Codec, value: &str) -> CliResult<Vec<u8>> {
    match codec {
        Codec::Cursor => {
            let mut cur = BufferCursor::new();
            match kind {
                Kind::U8 => cur.encode_u8(value.parse()?),
                Kind::I8 => cur.encode_i8(value.parse()?),
                Kind::U16 => cur.encode_u16(value.parse()?),
                Kind::I16 => cur.encode_i16(value.parse()?),
                Kind::U32 => cur.encode_u32(value.parse()?),
                Kind::I32 => cur.encode_i32(value.parse()?),
                Kind::U64 => cur.encode_u64(value.parse()?),
                Kind::I64 => cur.encode_i64(value.parse()?),
                Kind::Uvarint => cur.encode_uvarint(value.parse()?),
                Kind::Varint => cur.encode_varint(value.parse()?),
                Kind::Bytes => cur.encode_bytes(&hex::decode(value)?),
                Kind::String => cur.encode_str(value),
            }
            Ok(cur.into_inner().to_vec())
        }
        Codec::Stream => {
            let mut w = StreamWriter::new(Vec::new());
            match kind {
                Kind::U8 => w.encode_u8(value.parse()?)?,
                Kind::I8 => w.encode_i8(value.parse()?)?,
                Kind::U16 => w.encode_u16(value.parse()?)?,
                Kind::I16 => w.encode_i16(value.parse()?)?,
                Kind::U32 => w.encode_u32(value.parse()?)?,
                Kind::I32 => w.encode_i32(value.parse()?)?,
                Kind::U64 => w.encode_u64(value.parse()?)?,
                Kind::I64 => w.encode_i64(value.parse()?)?,
                Kind::Uvarint => {
                    w.encode_uvarint(value.parse()?)?;
                }
                Kind::Varint => {
                    w.encode_varint(value.parse()?)?;
                }
                Kind::Bytes => {
                    w.encode_bytes(&hex::decode(value)?)?;
                }
                Kind::String => {
                    w.encode_str(value)?;
                }
            }
            Ok(w.into_inner())
        }
    }
}

/// Decode one value, returning its text form and the bytes consumed.
fn decode(kind: Kind, codec: Codec, bytes: &[u8]) -> CliResult<(String, usize)> {
    match codec {
        Codec::Cursor => {
            let mut cur = BufferCursor::from(bytes);
            let value = match kind {
                Kind::U8 => cur.decode_u8()?.to_string(),
                Kind::I8 => cur.decode_i8()?.to_string(),
                Kind::U16 => cur.decode_u16()?.to_string(),
                Kind::I16 => cur.decode_i16()?.to_string(),
                Kind::U32 => cur.decode_u32()?.to_string(),
                Kind::I32 => cur.decode_i32()?.to_string(),
                Kind::U64 => cur.decode_u64()?.to_string(),
                Kind::I64 => cur.decode_i64()?.to_string(),
                Kind::Uvarint => cur.decode_uvarint()?.to_string(),
                Kind::Varint => cur.decode_varint()?.to_string(),
                Kind::Bytes => hex::encode(cur.decode_bytes_view()?),
                Kind::String => cur.decode_string()?,
            };
            Ok((value, cur.offset()))
        }
        Codec::Stream => {
            let mut r = StreamReader::new(bytes);
            let value = match kind {
                Kind::U8 => r.decode_u8()?.to_string(),
                Kind::I8 => r.decode_i8()?.to_string(),
                Kind::U16 => r.decode_u16()?.to_string(),
                Kind::I16 => r.decode_i16()?.to_string(),
                Kind::U32 => r.decode_u32()?.to_string(),
                Kind::I32 => r.decode_i32()?.to_string(),
                Kind::U64 => r.decode_u64()?.to_string(),
                Kind::I64 => r.decode_i64()?.to_string(),
                Kind::Uvarint => r.decode_uvarint()?.to_string(),
                Kind::Varint => r.decode_varint()?.to_string(),
                Kind::Bytes => hex::encode(r.decode_bytes()?),
                Kind::String => r.decode_string()?,
            };
            Ok((value, bytes.len() - r.get_ref().len()))
        }
    }
}

/// Spread get/put cycles over every size class in the configured range.
fn stress(pool_config: PoolConfig, threads: usize, iterations: usize) {
    let pool: CursorPool = PoolRegistry::with_config(pool_config);
    let span = pool_config.max_capacity.saturating_sub(pool_config.min_capacity) + 1;
    let start = Instant::now();

    info!(
        "Stressing classes {}..={} with {} threads x {} iterations",
        pool.min_class(),
        pool.max_class(),
        threads,
        iterations
    );

    thread::scope(|s| {
        for t in 0..threads {
            let pool = &pool;
            s.spawn(move || {
                for i in 0..iterations {
                    let spread = i.wrapping_mul(7919) ^ t.wrapping_mul(104_729);
                    let requested = pool_config.min_capacity + spread % span;
                    let mut cur = pool.get_pooled(requested);
                    if requested >= 32 {
                        cur.encode_uvarint(i as u64);
                        cur.encode_str("payload");
                        black_box(cur.decode_uvarint().ok());
                    }
                }
            });
        }
    });

    let elapsed = start.elapsed();
    let stats = pool.stats();
    let ops = threads * iterations;
    info!(
        "{} get/put cycles in {:?} ({:.0} ops/sec)",
        ops,
        elapsed,
        ops as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    info!(
        "hits={} misses={} returns={} drops={} buckets={} idle={} hit_rate={:.3}",
        stats.hits,
        stats.misses,
        stats.returns,
        stats.drops,
        stats.buckets,
        stats.idle,
        stats.hit_rate()
    );
}
