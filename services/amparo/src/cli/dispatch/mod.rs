//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its full
//! configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: auth_opts.token_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        argon2_memory_kib: auth_opts.argon2_memory_kib,
        argon2_iterations: auth_opts.argon2_iterations,
        argon2_parallelism: auth_opts.argon2_parallelism,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}
