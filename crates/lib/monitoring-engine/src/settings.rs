//! Validated, compiled engine settings.

use std::collections::HashSet;
use std::time::Duration;

use crate::BuildError;

/// Validated IMAP connection settings.
#[derive(Debug, Clone)]
pub struct ImapSettings {
    /// Hostname or IP address of the IMAP server.
    pub server: String,

    /// IMAP port.
    pub port: u16,

    /// Username for IMAP authentication.
    pub username: String,

    /// Password for IMAP authentication.
    pub password: config_core::Password,

    /// Whether to use implicit TLS.
    pub use_ssl: bool,
}

/// A compiled mailbox.
#[derive(Debug, Clone)]
pub struct Mailbox {
    /// Mailbox name (e.g. INBOX).
    pub name: String,

    /// Effective check interval.
    pub interval: Duration,

    /// Compiled triggers, in config order.
    pub triggers: Vec<trigger::Trigger>,
}

/// Validate the config and compile every trigger.
pub fn build(config: &config_core::Config) -> Result<(ImapSettings, Vec<Mailbox>), BuildError> {
    let imap = &config.imap;

    if imap.server.trim().is_empty() {
        return Err(BuildError::MissingServer);
    }

    let port = imap.effective_port();
    if port == 0 {
        return Err(BuildError::InvalidPort);
    }

    if config.monitor.is_empty() {
        return Err(BuildError::NoMailboxes);
    }

    let mut seen = HashSet::new();
    let mut mailboxes = Vec::with_capacity(config.monitor.len());

    for (index, monitor) in config.monitor.iter().enumerate() {
        let name = monitor.mailbox.as_str();
        if name.trim().is_empty() {
            return Err(BuildError::EmptyMailboxName { index });
        }
        if !seen.insert(name) {
            return Err(BuildError::DuplicateMailbox {
                mailbox: name.to_owned(),
            });
        }

        let interval_secs = config.effective_interval_secs(monitor);
        if interval_secs == 0 {
            return Err(BuildError::InvalidInterval {
                mailbox: name.to_owned(),
            });
        }

        if monitor.triggers.is_empty() {
            return Err(BuildError::NoTriggers {
                mailbox: name.to_owned(),
            });
        }

        let triggers = monitor
            .triggers
            .iter()
            .enumerate()
            .map(|(index, trigger)| {
                trigger::Trigger::compile(trigger).map_err(|source| BuildError::Trigger {
                    mailbox: name.to_owned(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        mailboxes.push(Mailbox {
            name: name.to_owned(),
            interval: Duration::from_secs(interval_secs),
            triggers,
        });
    }

    let settings = ImapSettings {
        server: imap.server.trim().to_owned(),
        port,
        username: imap.username.clone(),
        password: imap.password.clone(),
        use_ssl: imap.use_ssl,
    };

    Ok((settings, mailboxes))
}
