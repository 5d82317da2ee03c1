use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::correlation::{generate_correlation_id, DEFAULT_UID_LENGTH};
use crate::error::ChooseError;
use crate::query::SignedParams;
use crate::signature::make_hex_hmac_sha256;

pub const DEFAULT_ENDPOINT: &str = "https://api.preferred-pictures.com/";
pub const DEFAULT_MAX_CHOICES: usize = 35;
pub const DEFAULT_TTL: i64 = 600;
pub const DEFAULT_EXPIRATION_TTL: i64 = 3600;

/// Fields signed for the `choose` shape, in signing order.
pub const CHOOSE_SIGNING_ORDER: [&str; 12] = [
    "choices_prefix",
    "choices_suffix",
    "choices",
    "destinations_prefix",
    "destinations_suffix",
    "destinations",
    "expiration",
    "go",
    "json",
    "tournament",
    "ttl",
    "uid",
];

/// Fields signed for the legacy `choose-url` shape, in signing order.
pub const LEGACY_SIGNING_ORDER: [&str; 7] = [
    "choices",
    "expiration",
    "prefix",
    "suffix",
    "tournament",
    "ttl",
    "uid",
];

const CHOOSE_PATH: &str = "choose";
const LEGACY_CHOOSE_PATH: &str = "choose-url";

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub identity: String,
    pub secret_key: String,
    /// Prefix every URL is built on; expected to end with `/`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_choices")]
    pub max_choices: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_choices() -> usize {
    DEFAULT_MAX_CHOICES
}

impl ClientConfig {
    pub fn new(identity: impl Into<String>, secret_key: impl Into<String>) -> Self {
        ClientConfig {
            identity: identity.into(),
            secret_key: secret_key.into(),
            endpoint: default_endpoint(),
            max_choices: DEFAULT_MAX_CHOICES,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_choices(mut self, max_choices: usize) -> Self {
        self.max_choices = max_choices;
        self
    }
}

// Keeps the secret out of logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("identity", &self.identity)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("max_choices", &self.max_choices)
            .finish()
    }
}

/// Parameters for a `choose` URL.
///
/// `choices_prefix` and `choices_suffix` (likewise for destinations) are sent as their own
/// parameters and are never applied to the individual entries here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooseRequest {
    pub choices: Vec<String>,
    pub tournament: String,
    pub ttl: i64,
    pub expiration_ttl: i64,
    pub choices_prefix: Option<String>,
    pub choices_suffix: Option<String>,
    pub destinations: Option<Vec<String>>,
    pub destinations_prefix: Option<String>,
    pub destinations_suffix: Option<String>,
    pub go: bool,
    pub json: bool,
    pub uid: Option<String>,
}

impl ChooseRequest {
    pub fn new<I, S>(choices: I, tournament: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChooseRequest {
            choices: choices.into_iter().map(Into::into).collect(),
            tournament: tournament.into(),
            ttl: DEFAULT_TTL,
            expiration_ttl: DEFAULT_EXPIRATION_TTL,
            choices_prefix: None,
            choices_suffix: None,
            destinations: None,
            destinations_prefix: None,
            destinations_suffix: None,
            go: false,
            json: false,
            uid: None,
        }
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn expiration_ttl(mut self, expiration_ttl: i64) -> Self {
        self.expiration_ttl = expiration_ttl;
        self
    }

    pub fn choices_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.choices_prefix = Some(prefix.into());
        self
    }

    pub fn choices_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.choices_suffix = Some(suffix.into());
        self
    }

    pub fn destinations<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations = Some(destinations.into_iter().map(Into::into).collect());
        self
    }

    pub fn destinations_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.destinations_prefix = Some(prefix.into());
        self
    }

    pub fn destinations_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.destinations_suffix = Some(suffix.into());
        self
    }

    pub fn go(mut self, go: bool) -> Self {
        self.go = go;
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// Parameters for the legacy `choose-url` shape: one comma-joined choice list with a
/// prefix and suffix that apply to the joined string as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyChooseRequest {
    pub choices: Vec<String>,
    pub tournament: String,
    pub ttl: i64,
    pub expiration_ttl: i64,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub uid: Option<String>,
}

impl LegacyChooseRequest {
    pub fn new<I, S>(choices: I, tournament: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LegacyChooseRequest {
            choices: choices.into_iter().map(Into::into).collect(),
            tournament: tournament.into(),
            ttl: DEFAULT_TTL,
            expiration_ttl: DEFAULT_EXPIRATION_TTL,
            prefix: None,
            suffix: None,
            uid: None,
        }
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn expiration_ttl(mut self, expiration_ttl: i64) -> Self {
        self.expiration_ttl = expiration_ttl;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// Builds signed URLs against one account. Holds only immutable configuration, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Client { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn choose_url(&self, request: &ChooseRequest) -> Result<String, ChooseError> {
        self.choose_url_with(request, unix_now(), &mut rand::thread_rng())
    }

    /// Same as [Client::choose_url], reading the clock from `now` (unix seconds) and
    /// drawing a missing uid from `rng`.
    pub fn choose_url_with<R: Rng + ?Sized>(
        &self,
        request: &ChooseRequest,
        now: i64,
        rng: &mut R,
    ) -> Result<String, ChooseError> {
        self.ensure_choice_count(request.choices.len())?;

        let expiration = now.saturating_add(request.expiration_ttl);
        let uid = resolve_uid(request.uid.as_deref(), rng);

        let mut params = SignedParams::new();
        params
            .push_list("choices", request.choices.clone())
            .push("expiration", expiration.to_string())
            .push("tournament", request.tournament.as_str())
            .push("ttl", request.ttl.to_string())
            .push("uid", uid)
            .push_opt("choices_prefix", request.choices_prefix.as_deref())
            .push_opt("choices_suffix", request.choices_suffix.as_deref())
            .push_opt_list("destinations", request.destinations.as_deref())
            .push_opt("destinations_prefix", request.destinations_prefix.as_deref())
            .push_opt("destinations_suffix", request.destinations_suffix.as_deref())
            .push_flag("go", request.go)
            .push_flag("json", request.json);

        debug!(
            tournament = %request.tournament,
            choices = request.choices.len(),
            expiration,
            "Building choose URL"
        );

        self.sign_and_render(CHOOSE_PATH, params, &CHOOSE_SIGNING_ORDER)
    }

    pub fn legacy_choose_url(&self, request: &LegacyChooseRequest) -> Result<String, ChooseError> {
        self.legacy_choose_url_with(request, unix_now(), &mut rand::thread_rng())
    }

    pub fn legacy_choose_url_with<R: Rng + ?Sized>(
        &self,
        request: &LegacyChooseRequest,
        now: i64,
        rng: &mut R,
    ) -> Result<String, ChooseError> {
        self.ensure_choice_count(request.choices.len())?;

        let expiration = now.saturating_add(request.expiration_ttl);
        let uid = resolve_uid(request.uid.as_deref(), rng);

        let mut params = SignedParams::new();
        params
            .push("choices", request.choices.join(","))
            .push("expiration", expiration.to_string())
            .push("tournament", request.tournament.as_str())
            .push("uid", uid)
            .push("ttl", request.ttl.to_string())
            .push_opt("prefix", request.prefix.as_deref())
            .push_opt("suffix", request.suffix.as_deref());

        debug!(
            tournament = %request.tournament,
            choices = request.choices.len(),
            expiration,
            "Building legacy choose-url URL"
        );

        self.sign_and_render(LEGACY_CHOOSE_PATH, params, &LEGACY_SIGNING_ORDER)
    }

    fn ensure_choice_count(&self, count: usize) -> Result<(), ChooseError> {
        let max = self.config.max_choices;
        if count > max {
            debug!(count, max, "Rejecting request with too many choices");
            Err(ChooseError::TooManyChoices { count, max })
        } else {
            Ok(())
        }
    }

    fn sign_and_render(
        &self,
        path: &str,
        mut params: SignedParams,
        signing_order: &[&str],
    ) -> Result<String, ChooseError> {
        let signing_string = params.signing_string(signing_order);
        let signature = make_hex_hmac_sha256(&self.config.secret_key, &signing_string)?;

        params
            .push("identity", self.config.identity.as_str())
            .push("signature", signature);

        Ok(format!(
            "{}{path}?{}",
            self.config.endpoint,
            params.to_query_string()
        ))
    }
}

fn resolve_uid<R: Rng + ?Sized>(uid: Option<&str>, rng: &mut R) -> String {
    match uid {
        Some(uid) => uid.to_string(),
        None => generate_correlation_id(rng, DEFAULT_UID_LENGTH),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
