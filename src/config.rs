//! Startup configuration — command line, environment and secrets.
//!
//! Built once in `main` and handed to the poller by value. Nothing here is
//! read again after startup.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::PollError;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Status-check endpoint queried on every cycle.
    #[arg(long, env = "PRACTICUM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Seconds between the end of one cycle and the start of the next.
    #[arg(long, env = "RETRY_PERIOD", default_value_t = 600,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub retry_period: u64,

    /// Per-request timeout for the status endpoint, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: u64,

    /// Append-only log file.
    #[arg(long, env = "LOG_FILE", default_value = "program.log")]
    pub log_file: PathBuf,
}

// ── Secrets ─────────────────────────────────────────────────────────

/// The three secrets the bot cannot run without. Absent variables are
/// stored as empty strings; memory is wiped on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    practicum_token: String,
    telegram_token: String,
    chat_id: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Collect secrets through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            practicum_token: lookup(PRACTICUM_TOKEN_VAR).unwrap_or_default(),
            telegram_token: lookup(TELEGRAM_TOKEN_VAR).unwrap_or_default(),
            chat_id: lookup(TELEGRAM_CHAT_ID_VAR).unwrap_or_default(),
        }
    }

    /// True only if every secret is present and non-blank.
    pub fn check_tokens(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Name of the first absent variable, in declaration order.
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.chat_id),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    pub fn practicum_token(&self) -> &str {
        self.practicum_token.trim()
    }

    pub fn telegram_token(&self) -> &str {
        self.telegram_token.trim()
    }

    pub fn chat_id(&self) -> &str {
        self.chat_id.trim()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

// ── Destination ─────────────────────────────────────────────────────

/// Where notifications go: a numeric chat id or a public `@channel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl ChatTarget {
    pub fn parse(raw: &str) -> Result<Self, PollError> {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<i64>() {
            return Ok(Self::Id(id));
        }
        if raw.len() > 1 && raw.starts_with('@') && !raw[1..].contains(char::is_whitespace) {
            return Ok(Self::Username(raw.to_string()));
        }
        Err(PollError::InvalidConfig {
            var: TELEGRAM_CHAT_ID_VAR,
            reason: "expected a numeric chat id or an @channel name".into(),
        })
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

// ── Assembled config ────────────────────────────────────────────────

#[derive(Debug)]
pub struct Config {
    pub endpoint: String,
    pub retry_period: Duration,
    pub request_timeout: Duration,
    pub credentials: Credentials,
    pub chat: ChatTarget,
}

impl Config {
    /// Validate secrets and combine them with the command line.
    pub fn build(args: &Args, credentials: Credentials) -> Result<Self, PollError> {
        if let Some(missing) = credentials.first_missing() {
            return Err(PollError::MissingConfig(missing));
        }
        let chat = ChatTarget::parse(credentials.chat_id())?;

        Ok(Self {
            endpoint: args.endpoint.clone(),
            retry_period: Duration::from_secs(args.retry_period),
            request_timeout: Duration::from_secs(args.request_timeout),
            credentials,
            chat,
        })
    }
}
