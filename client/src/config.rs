use std::env;

use anyhow::Context;
use preferred_pictures_shared::ClientConfig;

const IDENTITY_ENV_KEY: &str = "PREFERRED_PICTURES_IDENTITY";
const SECRET_KEY_ENV_KEY: &str = "PREFERRED_PICTURES_SECRET_KEY";
const ENDPOINT_ENV_KEY: &str = "PREFERRED_PICTURES_ENDPOINT";
const MAX_CHOICES_ENV_KEY: &str = "PREFERRED_PICTURES_MAX_CHOICES";

/// Values given on the command line; each one wins over its environment variable.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub identity: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub max_choices: Option<usize>,
}

pub fn load_env(overrides: Overrides) -> Result<ClientConfig, anyhow::Error> {
    load_from(overrides, |key| env::var(key).ok())
}

fn load_from(
    overrides: Overrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, anyhow::Error> {
    let identity = overrides
        .identity
        .or_else(|| lookup(IDENTITY_ENV_KEY))
        .with_context(|| format!("Expected {IDENTITY_ENV_KEY} to be defined"))?;
    let secret_key = overrides
        .secret_key
        .or_else(|| lookup(SECRET_KEY_ENV_KEY))
        .with_context(|| format!("Expected {SECRET_KEY_ENV_KEY} to be defined"))?;

    let mut config = ClientConfig::new(identity, secret_key);

    if let Some(endpoint) = overrides.endpoint.or_else(|| lookup(ENDPOINT_ENV_KEY)) {
        config = config.with_endpoint(endpoint);
    }

    let max_choices = match overrides.max_choices {
        Some(max) => Some(max),
        None => lookup(MAX_CHOICES_ENV_KEY)
            .map(|s| {
                s.parse::<usize>()
                    .with_context(|| format!("{MAX_CHOICES_ENV_KEY} must be a positive integer"))
            })
            .transpose()?,
    };
    if let Some(max_choices) = max_choices {
        config = config.with_max_choices(max_choices);
    }

    Ok(config)
}
