use clap::{Parser, Subcommand, ValueEnum};

use crate::pool::PoolConfig;

/// pooled-bytes - inspect size classes and primitive encodings, stress pools
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the size class and pooled capacity for each capacity
    Class {
        #[arg(required = true)]
        capacities: Vec<usize>,
    },

    /// Encode one value and print the bytes as hex
    Encode {
        /// Primitive to encode
        #[arg(short, long, value_enum, default_value = "uvarint")]
        kind: Kind,

        /// Codec whose byte order to use
        #[arg(short, long, value_enum, default_value = "cursor")]
        codec: Codec,

        /// Decimal integer, hex for `bytes`, or literal text for `string`
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Decode one value from hex bytes
    Decode {
        #[arg(short, long, value_enum, default_value = "uvarint")]
        kind: Kind,

        #[arg(short, long, value_enum, default_value = "cursor")]
        codec: Codec,

        /// Encoded bytes as hex
        hex: String,
    },

    /// Exercise a cursor pool from several threads and report statistics
    Stress {
        /// Worker threads
        #[arg(short, long, default_value = "8")]
        threads: usize,

        /// Get/put cycles per thread
        #[arg(short, long, default_value = "10000")]
        iterations: usize,

        /// Smallest pooled capacity
        #[arg(long, default_value = "64")]
        min_capacity: usize,

        /// Largest pooled capacity
        #[arg(long, default_value = "65536")]
        max_capacity: usize,

        /// Idle objects kept per size class
        #[arg(long, default_value = "256")]
        bucket_depth: usize,
    },
}

/// Primitive kinds understood by `encode` and `decode`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Uvarint,
    Varint,
    Bytes,
    String,
}

/// Which codec's layout to use.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// In-memory cursor, little-endian fixed-width integers
    Cursor,
    /// Channel codec, big-endian fixed-width integers
    Stream,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse_args() -> Self {
        Config::parse()
    }
}

impl Command {
    /// Pool configuration for the `stress` subcommand.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        match self {
            Command::Stress {
                min_capacity,
                max_capacity,
                bucket_depth,
                ..
            } => Some(
                PoolConfig::new(*min_capacity, *max_capacity).with_bucket_depth(*bucket_depth),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode() {
        let config =
            Config::try_parse_from(["pooled-bytes", "encode", "-k", "varint", "-c", "stream", "-2"])
                .unwrap();
        assert_eq!(config.log_level, "info");
        match config.command {
            Command::Encode { kind, codec, value } => {
                assert_eq!(kind, Kind::Varint);
                assert_eq!(codec, Codec::Stream);
                assert_eq!(value, "-2");
            }
            _ => panic!("Expected Encode command"),
        }
    }

    #[test]
    fn test_stress_defaults() {
        let config =
            Config::try_parse_from(["pooled-bytes", "stress", "--log-level", "debug"]).unwrap();
        assert_eq!(config.log_level, "debug");
        let pool = config.command.pool_config().unwrap();
        assert_eq!(pool.min_capacity, 64);
        assert_eq!(pool.max_capacity, 65536);
        assert_eq!(pool.bucket_depth, 256);
    }

    #[test]
    fn test_class_requires_capacity() {
        assert!(Config::try_parse_from(["pooled-bytes", "class"]).is_err());
        let config = Config::try_parse_from(["pooled-bytes", "class", "1000", "1025"]).unwrap();
        assert!(config.command.pool_config().is_none());
    }
}
