use crate::{
    api,
    auth::{HasherConfig, TokenConfig},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: String,
    pub token_ttl_seconds: i64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub frontend_base_url: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let token_config = TokenConfig::new(SecretString::from(args.token_secret))
        .with_ttl_seconds(args.token_ttl_seconds);

    let hasher_config = HasherConfig::default()
        .with_memory_kib(args.argon2_memory_kib)
        .with_iterations(args.argon2_iterations)
        .with_parallelism(args.argon2_parallelism);

    let config = api::ServerConfig {
        frontend_base_url: args.frontend_base_url,
        token: token_config,
        hasher: hasher_config,
    };

    api::new(args.port, args.dsn, config).await
}
