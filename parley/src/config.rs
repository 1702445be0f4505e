//! Process configuration from command-line flags and environment variables.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use clap::builder::{BoolishValueParser, RangedU64ValueParser};
use clap::{ArgAction, Parser};
use pchat::{DEFAULT_DELIVERY_LIMIT, DEFAULT_WINDOW};
use pprovider::{CREDENTIAL_SLOTS, DEFAULT_BASE_URL, DEFAULT_MODEL, SecretString};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const BOT_ID_VAR: &str = "PARLEY_BOT_ID";
pub const ADMIN_ID_VAR: &str = "PARLEY_ADMIN_ID";
pub const REQUEST_TIMEOUT_VAR: &str = "PARLEY_REQUEST_TIMEOUT_SECS";
pub const DELIVERY_LIMIT_VAR: &str = "PARLEY_DELIVERY_LIMIT";
pub const HISTORY_WINDOW_VAR: &str = "PARLEY_HISTORY_WINDOW";
pub const NOTIFY_TRANSPORT_FAILURE_VAR: &str = "PARLEY_NOTIFY_TRANSPORT_FAILURE";

pub const DEFAULT_BOT_ID: &str = "parley";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Scalar relay options. Each flag falls back to its environment variable, then its default.
#[derive(Parser, Debug, Clone)]
#[command(name = "parley", about = "Relay chat mentions to the Gemini generateContent API")]
pub struct RelayArgs {
    /// Model name used in the endpoint path
    #[arg(long, env = MODEL_VAR, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API base URL, without the `/models/...` suffix
    #[arg(long, env = BASE_URL_VAR, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Identity of the bot, used for mention detection
    #[arg(long, env = BOT_ID_VAR, default_value = DEFAULT_BOT_ID)]
    pub bot_id: String,

    /// Only this sender may reset or restart; unset allows everyone
    #[arg(long, env = ADMIN_ID_VAR)]
    pub admin_id: Option<String>,

    /// Deadline in seconds for each remote call and attachment download
    #[arg(
        long,
        env = REQUEST_TIMEOUT_VAR,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Maximum characters per delivered message
    #[arg(
        long,
        env = DELIVERY_LIMIT_VAR,
        default_value_t = DEFAULT_DELIVERY_LIMIT,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub delivery_limit: usize,

    /// Number of turns kept in the conversation window
    #[arg(
        long,
        env = HISTORY_WINDOW_VAR,
        default_value_t = DEFAULT_WINDOW,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub history_window: usize,

    /// Tell the user when the remote call fails in transport
    #[arg(
        long,
        env = NOTIFY_TRANSPORT_FAILURE_VAR,
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub notify_transport_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    MissingCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credentials() -> Self {
        Self::new(
            ConfigErrorKind::MissingCredentials,
            format!("set {API_KEY_VAR} or at least one of {API_KEY_VAR}_0..{API_KEY_VAR}_15"),
        )
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug)]
pub struct RelayConfig {
    pub(crate) credentials: Vec<SecretString>,
    pub model: String,
    pub base_url: String,
    pub bot_id: String,
    pub admin_id: Option<String>,
    pub request_timeout: Duration,
    pub delivery_limit: usize,
    pub history_window: usize,
    pub notify_transport_failure: bool,
}

impl RelayConfig {
    /// Parses process arguments and reads credentials from the process environment.
    ///
    /// Exits the process with a usage message when the arguments are invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_args(RelayArgs::parse(), |name| std::env::var(name).ok())
    }

    /// Combines parsed options with credentials read from any variable source.
    ///
    /// ```rust
    /// use clap::Parser;
    /// use parley::{RelayArgs, RelayConfig};
    ///
    /// let args = RelayArgs::try_parse_from(["parley", "--history-window", "4"])
    ///     .expect("valid arguments");
    /// let config = RelayConfig::from_args(args, |name| match name {
    ///     "GEMINI_API_KEY_3" => Some("key-three".to_string()),
    ///     _ => None,
    /// })
    /// .expect("valid config");
    ///
    /// assert_eq!(config.credential_count(), 1);
    /// assert_eq!(config.history_window, 4);
    /// assert_eq!(config.bot_id, "parley");
    /// ```
    pub fn from_args(
        args: RelayArgs,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let credentials = (0..CREDENTIAL_SLOTS)
            .filter_map(|slot| {
                let value = lookup(&format!("{API_KEY_VAR}_{slot}"));
                if slot == 0 && value.is_none() {
                    lookup(API_KEY_VAR)
                } else {
                    value
                }
            })
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::new)
            .collect::<Vec<_>>();

        if credentials.is_empty() {
            return Err(ConfigError::missing_credentials());
        }

        Ok(Self {
            credentials,
            model: args.model.trim().to_string(),
            base_url: args.base_url.trim().trim_end_matches('/').to_string(),
            bot_id: args.bot_id.trim().to_string(),
            admin_id: args
                .admin_id
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            delivery_limit: args.delivery_limit,
            history_window: args.history_window,
            notify_transport_failure: args.notify_transport_failure,
        })
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    fn args(flags: &[&str]) -> RelayArgs {
        RelayArgs::try_parse_from(std::iter::once("parley").chain(flags.iter().copied()))
            .expect("valid arguments")
    }

    fn config(vars: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        RelayConfig::from_args(args(&[]), |name| vars.get(name).cloned())
    }

    fn exposed(config: &RelayConfig) -> Vec<&str> {
        config.credentials.iter().map(SecretString::expose).collect()
    }

    #[test]
    fn command_definition_is_consistent() {
        RelayArgs::command().debug_assert();
    }

    #[test]
    fn every_scalar_option_reads_its_environment_variable() {
        let command = RelayArgs::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        };

        for (id, variable) in [
            ("model", MODEL_VAR),
            ("base_url", BASE_URL_VAR),
            ("bot_id", BOT_ID_VAR),
            ("admin_id", ADMIN_ID_VAR),
            ("request_timeout_secs", REQUEST_TIMEOUT_VAR),
            ("delivery_limit", DELIVERY_LIMIT_VAR),
            ("history_window", HISTORY_WINDOW_VAR),
            ("notify_transport_failure", NOTIFY_TRANSPORT_FAILURE_VAR),
        ] {
            assert_eq!(env_of(id).as_deref(), Some(variable), "{id}");
        }
    }

    #[test]
    fn defaults_apply_when_only_a_key_is_set() {
        let config = config(&[("GEMINI_API_KEY", "solo")]).expect("config");

        assert_eq!(exposed(&config), vec!["solo"]);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bot_id, DEFAULT_BOT_ID);
        assert_eq!(config.admin_id, None);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.delivery_limit, 2000);
        assert_eq!(config.history_window, 10);
        assert!(!config.notify_transport_failure);
    }

    #[test]
    fn indexed_slots_are_collected_in_order_skipping_gaps_and_blanks() {
        let config = config(&[
            ("GEMINI_API_KEY_0", "zero"),
            ("GEMINI_API_KEY_2", "  "),
            ("GEMINI_API_KEY_5", " five "),
            ("GEMINI_API_KEY_15", "fifteen"),
            ("GEMINI_API_KEY_16", "ignored"),
        ])
        .expect("config");

        assert_eq!(exposed(&config), vec!["zero", "five", "fifteen"]);
    }

    #[test]
    fn indexed_slot_zero_takes_precedence_over_bare_key() {
        let config = config(&[
            ("GEMINI_API_KEY", "bare"),
            ("GEMINI_API_KEY_0", "indexed"),
        ])
        .expect("config");

        assert_eq!(exposed(&config), vec!["indexed"]);
    }

    #[test]
    fn missing_credentials_fail_eagerly() {
        let error = config(&[("GEMINI_API_KEY_1", "   ")]).expect_err("no credentials");
        assert_eq!(error.kind, ConfigErrorKind::MissingCredentials);
    }

    #[test]
    fn overrides_are_parsed_and_trimmed() {
        let args = args(&[
            "--model",
            "gemini-pro",
            "--base-url",
            "http://localhost:8080/v1beta/",
            "--bot-id",
            "4242",
            "--admin-id",
            " 99 ",
            "--request-timeout-secs",
            "5",
            "--delivery-limit",
            "500",
            "--history-window",
            "4",
            "--notify-transport-failure",
        ]);
        let config = RelayConfig::from_args(args, |name| {
            (name == API_KEY_VAR).then(|| "k".to_string())
        })
        .expect("config");

        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.bot_id, "4242");
        assert_eq!(config.admin_id.as_deref(), Some("99"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.delivery_limit, 500);
        assert_eq!(config.history_window, 4);
        assert!(config.notify_transport_failure);
    }

    #[test]
    fn invalid_and_zero_numbers_are_rejected() {
        let parse = |flags: &[&str]| {
            RelayArgs::try_parse_from(std::iter::once("parley").chain(flags.iter().copied()))
        };

        let bad_timeout = parse(&["--request-timeout-secs", "soon"]).expect_err("bad timeout");
        let zero_window = parse(&["--history-window", "0"]).expect_err("zero window");
        let zero_limit = parse(&["--delivery-limit", "0"]).expect_err("zero limit");

        assert_eq!(bad_timeout.kind(), ErrorKind::ValueValidation);
        assert!(bad_timeout.to_string().contains("--request-timeout-secs"));
        assert_eq!(zero_window.kind(), ErrorKind::ValueValidation);
        assert_eq!(zero_limit.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn debug_output_never_contains_credentials() {
        let config = config(&[("GEMINI_API_KEY", "super-secret-key")]).expect("config");
        assert!(!format!("{config:?}").contains("super-secret-key"));
    }
}
