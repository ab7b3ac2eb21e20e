//! Service configuration
//!
//! Configuration is read from the environment once at startup and handed to
//! the components that need it. There is no process-global configuration
//! state; the store, notifier, and scheduler each own what they were given.

use crate::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;

/// Scheduler policy knobs
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between delivery passes
    pub interval: Duration,
    /// Maximum number of due capsules processed per pass
    pub batch_limit: usize,
    /// Failed-attempt count at which a capsule is permanently failed
    pub failure_limit: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            batch_limit: 20,
            failure_limit: 5,
        }
    }
}

impl SchedulerConfig {
    /// Create a new scheduler configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pass interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-pass batch limit
    #[must_use]
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Set the permanent-failure threshold
    #[must_use]
    pub fn with_failure_limit(mut self, limit: u32) -> Self {
        self.failure_limit = limit;
        self
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDriver {
    /// In-process store, contents lost on restart (development/testing)
    Memory,
    /// Redis-backed store
    Redis,
}

impl std::str::FromStr for StoreDriver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(StoreDriver::Memory),
            "redis" => Ok(StoreDriver::Redis),
            other => Err(Error::Config(format!("unknown store driver: {other}"))),
        }
    }
}

/// Mail backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailDriver {
    /// Log the delivery intent without contacting any transport
    Console,
    /// Deliver over SMTP
    Smtp,
}

impl std::str::FromStr for MailDriver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "console" => Ok(MailDriver::Console),
            "smtp" => Ok(MailDriver::Smtp),
            other => Err(Error::Config(format!("unknown mail driver: {other}"))),
        }
    }
}

/// Mail backend configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Which backend to construct at startup
    pub driver: MailDriver,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username, if the relay requires authentication
    pub smtp_user: Option<String>,
    /// SMTP password
    pub smtp_pass: Option<String>,
    /// From mailbox, e.g. `Postdate <no-reply@example.com>`
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            driver: MailDriver::Console,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            from: "Postdate <no-reply@example.com>".to_string(),
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub store_driver: StoreDriver,
    /// Redis connection URL (used when `store_driver` is `Redis`)
    pub redis_url: String,
    /// Mail backend configuration
    pub mail: MailConfig,
    /// Scheduler policy
    pub scheduler: SchedulerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 4000)),
            store_driver: StoreDriver::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            mail: MailConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Recognized variables: `PORT`, `STORE_DRIVER`, `REDIS_URL`,
    /// `MAIL_DRIVER`, `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`,
    /// `SMTP_FROM`, `SCHEDULER_INTERVAL_SECS`, `BATCH_LIMIT`. Anything
    /// unset falls back to the defaults above.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {port}")))?;
            config.bind = SocketAddr::from(([0, 0, 0, 0], port));
        }

        if let Ok(driver) = std::env::var("STORE_DRIVER") {
            config.store_driver = driver.parse()?;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis_url = url;
        }

        if let Ok(driver) = std::env::var("MAIL_DRIVER") {
            config.mail.driver = driver.parse()?;
        }
        if let Ok(host) = std::env::var("SMTP_HOST") {
            config.mail.smtp_host = host;
        }
        if let Ok(port) = std::env::var("SMTP_PORT") {
            config.mail.smtp_port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid SMTP_PORT: {port}")))?;
        }
        if let Ok(user) = std::env::var("SMTP_USER") {
            config.mail.smtp_user = Some(user);
        }
        if let Ok(pass) = std::env::var("SMTP_PASS") {
            config.mail.smtp_pass = Some(pass);
        }
        if let Ok(from) = std::env::var("SMTP_FROM") {
            config.mail.from = from;
        }

        if let Ok(secs) = std::env::var("SCHEDULER_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::Config(format!("invalid SCHEDULER_INTERVAL_SECS: {secs}")))?;
            config.scheduler.interval = Duration::from_secs(secs);
        }
        if let Ok(limit) = std::env::var("BATCH_LIMIT") {
            config.scheduler.batch_limit = limit
                .parse()
                .map_err(|_| Error::Config(format!("invalid BATCH_LIMIT: {limit}")))?;
        }

        Ok(config)
    }
}
