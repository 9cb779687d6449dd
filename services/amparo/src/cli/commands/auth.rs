use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_ARGON2_MEMORY_KIB: &str = "argon2-memory-kib";
pub const ARG_ARGON2_ITERATIONS: &str = "argon2-iterations";
pub const ARG_ARGON2_PARALLELISM: &str = "argon2-parallelism";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_hasher_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Signing secret for session tokens")
                .long_help(
                    "Signing secret for session tokens. Rotating it invalidates every outstanding session.",
                )
                .env("AMPARO_TOKEN_SECRET")
                .required(true)
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token TTL in seconds")
                .env("AMPARO_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed for CORS")
                .env("AMPARO_FRONTEND_BASE_URL")
                .default_value("http://localhost:4200"),
        )
}

fn with_hasher_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ARGON2_MEMORY_KIB)
                .long(ARG_ARGON2_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("AMPARO_ARGON2_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ARGON2_ITERATIONS)
                .long(ARG_ARGON2_ITERATIONS)
                .help("Argon2id iteration count")
                .env("AMPARO_ARGON2_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ARGON2_PARALLELISM)
                .long(ARG_ARGON2_PARALLELISM)
                .help("Argon2id parallelism degree")
                .env("AMPARO_ARGON2_PARALLELISM")
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: String,
    pub token_ttl_seconds: i64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub frontend_base_url: String,
}

impl Options {
    /// Pull the auth options out of parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            token_secret: matches
                .get_one::<String>(ARG_TOKEN_SECRET)
                .cloned()
                .context("missing required argument: --token-secret")?,
            token_ttl_seconds: matches
                .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            argon2_memory_kib: matches
                .get_one::<u32>(ARG_ARGON2_MEMORY_KIB)
                .copied()
                .unwrap_or(19_456),
            argon2_iterations: matches
                .get_one::<u32>(ARG_ARGON2_ITERATIONS)
                .copied()
                .unwrap_or(2),
            argon2_parallelism: matches
                .get_one::<u32>(ARG_ARGON2_PARALLELISM)
                .copied()
                .unwrap_or(1),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:4200".to_string()),
        })
    }
}
