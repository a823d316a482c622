//! Shared configuration types for mail-trigger.

/// Default check interval (seconds) when not specified in config.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Root configuration.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Global default check interval (seconds).
    #[cfg_attr(feature = "serde", serde(default = "default_check_interval_seconds"))]
    pub check_interval_seconds: u64,

    /// IMAP connection settings.
    pub imap: ImapConfig,

    /// Mailboxes to monitor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub monitor: Vec<MonitorConfig>,
}

/// IMAP connection settings.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ImapConfig {
    /// Hostname or IP address of the IMAP server.
    #[cfg_attr(feature = "serde", serde(default))]
    pub server: String,

    /// Optional port override.
    ///
    /// Defaults to 993 with TLS and 143 without.
    pub port: Option<u16>,

    /// Username for IMAP authentication.
    #[cfg_attr(feature = "serde", serde(default))]
    pub username: String,

    /// Password for IMAP authentication.
    #[cfg_attr(feature = "serde", serde(default))]
    pub password: Password,

    /// Whether to use implicit TLS.
    #[cfg_attr(feature = "serde", serde(default = "default_use_ssl"))]
    pub use_ssl: bool,
}

/// A monitored mailbox.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Mailbox name (e.g. INBOX).
    pub mailbox: String,

    /// Check interval override for this mailbox (seconds).
    pub check_interval_seconds: Option<u64>,

    /// Triggers evaluated against every new message, in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggers: Vec<TriggerConfig>,
}

/// A trigger rule.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriggerConfig {
    /// Pattern matched against the message text body.
    pub regex_pattern: Option<String>,

    /// Pattern matched against the sender address.
    pub from: Option<String>,

    /// Pattern matched against any of the recipient addresses.
    pub to: Option<String>,

    /// Pattern matched against the subject.
    pub subject: Option<String>,

    /// Case-insensitive matching; `true` when unset.
    pub ignore_case: Option<bool>,

    /// Stop evaluating later triggers once this one matches.
    #[cfg_attr(feature = "serde", serde(default, rename = "final"))]
    pub is_final: bool,

    /// Shell command to run on match.
    #[cfg_attr(feature = "serde", serde(default))]
    pub command: String,
}

impl Config {
    /// The effective check interval of a mailbox, in seconds.
    pub fn effective_interval_secs(&self, monitor: &MonitorConfig) -> u64 {
        monitor
            .check_interval_seconds
            .unwrap_or(self.check_interval_seconds)
    }
}

impl ImapConfig {
    /// The configured port, or the conventional one for the TLS setting.
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.use_ssl { 993 } else { 143 })
    }
}

/// Wrapper for sensitive passwords.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Create a new password wrapper.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner password value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***redacted***)")
    }
}

#[cfg(feature = "serde")]
fn default_check_interval_seconds() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

#[cfg(feature = "serde")]
fn default_use_ssl() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imap(port: Option<u16>, use_ssl: bool) -> ImapConfig {
        ImapConfig {
            server: "imap.example.com".to_owned(),
            port,
            username: "user".to_owned(),
            password: Password::new("secret"),
            use_ssl,
        }
    }

    #[test]
    fn port_defaults_follow_tls() {
        assert_eq!(imap(None, true).effective_port(), 993);
        assert_eq!(imap(None, false).effective_port(), 143);
        assert_eq!(imap(Some(1143), true).effective_port(), 1143);
    }

    #[test]
    fn mailbox_interval_overrides_global() {
        let config = Config {
            check_interval_seconds: 60,
            imap: imap(None, true),
            monitor: vec![],
        };
        let mut monitor = MonitorConfig {
            mailbox: "INBOX".to_owned(),
            check_interval_seconds: None,
            triggers: vec![],
        };
        assert_eq!(config.effective_interval_secs(&monitor), 60);
        monitor.check_interval_seconds = Some(5);
        assert_eq!(config.effective_interval_secs(&monitor), 5);
    }

    #[test]
    fn password_debug_is_redacted() {
        let rendered = format!("{:?}", Password::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
