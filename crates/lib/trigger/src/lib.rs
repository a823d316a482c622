//! Trigger compilation and matching.
//!
//! A trigger is up to four patterns (body, from, to, subject) paired with a
//! command. A trigger matches a message when every pattern it defines is
//! satisfied. Blank patterns count as unset; a trigger with no patterns at all
//! is rejected at compile time.

use regex::{Regex, RegexBuilder};

/// The message field a pattern applies to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Field {
    /// The extracted text body.
    Body,

    /// The sender address.
    From,

    /// Any recipient address.
    To,

    /// The subject line.
    Subject,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Body => "regex-pattern",
            Self::From => "from",
            Self::To => "to",
            Self::Subject => "subject",
        })
    }
}

/// Errors returned while compiling a trigger.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The trigger defines no patterns.
    #[error("trigger defines no patterns")]
    NoPatterns,

    /// A pattern is not a valid regular expression.
    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        /// The field the pattern applies to.
        field: Field,

        /// The regex error.
        #[source]
        source: regex::Error,
    },
}

/// The message fields a trigger is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    /// Extracted text body.
    pub body: &'a str,

    /// Sender address; empty when absent.
    pub from: &'a str,

    /// Recipient addresses.
    pub to: &'a [String],

    /// Subject line; empty when absent.
    pub subject: &'a str,
}

/// A compiled trigger.
#[derive(Debug, Clone)]
pub struct Trigger {
    body: Option<Regex>,
    from: Option<Regex>,
    to: Option<Regex>,
    subject: Option<Regex>,
    is_final: bool,
    command: String,
}

impl Trigger {
    /// Compile a trigger from its config.
    pub fn compile(config: &config_core::TriggerConfig) -> Result<Self, CompileError> {
        let ignore_case = config.ignore_case.unwrap_or(true);
        let compile = |field, pattern: &Option<String>| {
            pattern
                .as_deref()
                .filter(|pattern| !pattern.trim().is_empty())
                .map(|pattern| {
                    RegexBuilder::new(pattern)
                        .case_insensitive(ignore_case)
                        .build()
                        .map_err(|source| CompileError::InvalidPattern { field, source })
                })
                .transpose()
        };

        let trigger = Self {
            body: compile(Field::Body, &config.regex_pattern)?,
            from: compile(Field::From, &config.from)?,
            to: compile(Field::To, &config.to)?,
            subject: compile(Field::Subject, &config.subject)?,
            is_final: config.is_final,
            command: config.command.clone(),
        };

        if trigger.body.is_none()
            && trigger.from.is_none()
            && trigger.to.is_none()
            && trigger.subject.is_none()
        {
            return Err(CompileError::NoPatterns);
        }

        Ok(trigger)
    }

    /// Whether every defined pattern is satisfied by the message.
    pub fn matches(&self, message: &Fields<'_>) -> bool {
        fn check(regex: &Option<Regex>, value: &str) -> bool {
            regex.as_ref().is_none_or(|regex| regex.is_match(value))
        }

        check(&self.body, message.body)
            && check(&self.from, message.from)
            && check(&self.subject, message.subject)
            && self.to.as_ref().is_none_or(|regex| {
                message.to.iter().any(|address| regex.is_match(address))
            })
    }

    /// The command to run on match.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether a match stops evaluation of the triggers after this one.
    pub fn is_final(&self) -> bool {
        self.is_final
    }
}
