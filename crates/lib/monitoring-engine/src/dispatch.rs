//! Trigger evaluation and command launching.

use std::sync::Arc;

use mail_parser::MessageParser;
use monitoring_core::{CommandOutput, CommandRequest, CommandRunner, FetchedMessage, Uid};

use crate::Mailbox;

/// Env var carrying the sender address.
pub const ENV_FROM: &str = "MAIL_FROM";

/// Env var carrying the subject line.
pub const ENV_SUBJECT: &str = "MAIL_SUBJECT";

/// Env var carrying the RFC 3339 message date.
pub const ENV_DATE: &str = "MAIL_DATE";

/// Env var carrying the message UID.
pub const ENV_UID: &str = "MAIL_UID";

/// Env var carrying the mailbox name.
pub const ENV_MAILBOX: &str = "MAIL_MAILBOX";

/// The `MAIL_FROM` value used when the message has no sender.
pub const UNKNOWN_SENDER: &str = "unknown";

/// Evaluates triggers and launches their commands in the background.
#[derive(Debug)]
pub(crate) struct Dispatcher<R> {
    runner: Arc<R>,
}

impl<R> Dispatcher<R>
where
    R: CommandRunner,
{
    pub(crate) fn new(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }

    /// Evaluate the mailbox triggers against a message.
    ///
    /// Returns the number of commands launched. Commands run detached; this
    /// never waits for them.
    pub(crate) fn dispatch(&self, mailbox: &Mailbox, message: &FetchedMessage) -> usize {
        let text = extract_text(&message.body);
        let envelope = &message.envelope;
        let fields = trigger::Fields {
            body: &text,
            from: envelope.from.first().map_or("", String::as_str),
            to: &envelope.to,
            subject: envelope.subject.as_deref().unwrap_or_default(),
        };

        let mut launched = 0;
        for (index, trigger) in mailbox.triggers.iter().enumerate() {
            if !trigger.matches(&fields) {
                continue;
            }

            tracing::info!(
                mailbox = %mailbox.name,
                uid = message.uid,
                trigger = index,
                "trigger matched"
            );

            if self.launch(&mailbox.name, message, trigger.command(), &text) {
                launched += 1;
            }

            if trigger.is_final() {
                tracing::debug!(
                    mailbox = %mailbox.name,
                    uid = message.uid,
                    trigger = index,
                    "final trigger matched, skipping the rest"
                );
                break;
            }
        }

        launched
    }

    fn launch(&self, mailbox: &str, message: &FetchedMessage, command: &str, text: &str) -> bool {
        if command.trim().is_empty() {
            tracing::warn!(mailbox, uid = message.uid, "trigger command is empty, nothing to run");
            return false;
        }

        let request = CommandRequest {
            command: command.to_owned(),
            env: environment(mailbox, message),
            stdin: text.as_bytes().to_vec(),
        };

        let runner = Arc::clone(&self.runner);
        let mailbox = mailbox.to_owned();
        let uid = message.uid;

        tokio::spawn(async move {
            let command = request.command.clone();
            match runner.run(request).await {
                Ok(output) => log_output(&mailbox, uid, &command, &output),
                Err(error) => tracing::error!(
                    %error,
                    mailbox,
                    uid,
                    command,
                    "trigger command could not be run"
                ),
            }
        });

        true
    }
}

fn log_output(mailbox: &str, uid: Uid, command: &str, output: &CommandOutput) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.success() {
        tracing::info!(
            mailbox,
            uid,
            command,
            stdout = %stdout.trim_end(),
            stderr = %stderr.trim_end(),
            "trigger command finished"
        );
    } else {
        tracing::warn!(
            mailbox,
            uid,
            command,
            exit_code = ?output.exit_code,
            stdout = %stdout.trim_end(),
            stderr = %stderr.trim_end(),
            "trigger command failed"
        );
    }
}

/// The variables added to the command environment.
pub(crate) fn environment(mailbox: &str, message: &FetchedMessage) -> Vec<(String, String)> {
    let envelope = &message.envelope;
    vec![
        (
            ENV_FROM.to_owned(),
            envelope
                .from
                .first()
                .cloned()
                .unwrap_or_else(|| UNKNOWN_SENDER.to_owned()),
        ),
        (
            ENV_SUBJECT.to_owned(),
            envelope.subject.clone().unwrap_or_default(),
        ),
        (
            ENV_DATE.to_owned(),
            envelope.date.as_deref().map(format_date).unwrap_or_default(),
        ),
        (ENV_UID.to_owned(), message.uid.to_string()),
        (ENV_MAILBOX.to_owned(), mailbox.to_owned()),
    ]
}

/// Render an RFC 2822 date as RFC 3339; unparsable dates pass through.
pub fn format_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc2822(raw.trim())
        .map(|date| date.to_rfc3339())
        .unwrap_or_else(|_| raw.to_owned())
}

/// Concatenate the inline text parts of a raw message.
///
/// A message that fails to parse has no text.
pub fn extract_text(raw: &[u8]) -> String {
    let Some(message) = MessageParser::default().parse(raw) else {
        return String::new();
    };

    (0..)
        .map_while(|index| message.body_text(index))
        .collect::<Vec<_>>()
        .join("\n")
}
