// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use clockwork_api::{EngineConfig, RetryPolicy};
use thiserror::Error;

/// Clockwork Server - HTTP server for the Clockwork attendance engine
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "CLOCKWORK_DATABASE")]
    pub database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "CLOCKWORK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(short, long, env = "CLOCKWORK_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Employees scheduled concurrently by a batch request
    #[arg(long, env = "CLOCKWORK_BATCH_CONCURRENCY", default_value_t = 8)]
    pub batch_concurrency: usize,

    /// Daily records computed concurrently by a recalculation
    #[arg(long, env = "CLOCKWORK_RECALC_CONCURRENCY", default_value_t = 8)]
    pub recalc_concurrency: usize,

    /// Attempts made for an operation hitting a busy database
    #[arg(long, env = "CLOCKWORK_RETRY_ATTEMPTS", default_value_t = 4)]
    pub retry_attempts: u32,

    /// Do not run the daily automatic recalculation
    #[arg(long, env = "CLOCKWORK_DISABLE_AUTO_CALC")]
    pub disable_auto_calc: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
    #[error("{name} must be at least 1, got {value}")]
    ZeroLimit { name: &'static str, value: usize },
    #[error("retry attempts must be at least 1")]
    NoAttempts,
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database: Option<String>,
    pub addr: SocketAddr,
    pub engine: EngineConfig,
    pub auto_calc: bool,
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let ip: IpAddr = args
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(args.bind.clone()))?;
        if args.batch_concurrency == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "batch concurrency",
                value: args.batch_concurrency,
            });
        }
        if args.recalc_concurrency == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "recalculation concurrency",
                value: args.recalc_concurrency,
            });
        }
        if args.retry_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }

        Ok(Self {
            database: args.database,
            addr: SocketAddr::new(ip, args.port),
            engine: EngineConfig {
                batch_concurrency: args.batch_concurrency,
                recalc_concurrency: args.recalc_concurrency,
                retry: RetryPolicy {
                    max_attempts: args.retry_attempts,
                    base_delay: Duration::from_millis(25),
                    max_delay: Duration::from_secs(1),
                },
            },
            auto_calc: !args.disable_auto_calc,
        })
    }
}
