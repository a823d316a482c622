//! Error types.

/// Engine construction error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The IMAP server is not set.
    #[error("imap server is not set")]
    MissingServer,

    /// The IMAP port is zero.
    #[error("imap port must be non-zero")]
    InvalidPort,

    /// No mailboxes to monitor.
    #[error("no mailboxes to monitor")]
    NoMailboxes,

    /// A monitor entry has an empty mailbox name.
    #[error("monitor #{index} has an empty mailbox name")]
    EmptyMailboxName {
        /// The position of the monitor entry.
        index: usize,
    },

    /// The same mailbox is monitored twice.
    #[error("mailbox \"{mailbox}\" is monitored more than once")]
    DuplicateMailbox {
        /// The mailbox name.
        mailbox: String,
    },

    /// The effective check interval of a mailbox is zero.
    #[error("mailbox \"{mailbox}\" has a zero check interval")]
    InvalidInterval {
        /// The mailbox name.
        mailbox: String,
    },

    /// A mailbox has no triggers.
    #[error("mailbox \"{mailbox}\" has no triggers")]
    NoTriggers {
        /// The mailbox name.
        mailbox: String,
    },

    /// A trigger failed to compile.
    #[error("mailbox \"{mailbox}\" trigger #{index} is invalid")]
    Trigger {
        /// The mailbox name.
        mailbox: String,

        /// The position of the trigger within the mailbox.
        index: usize,

        /// The compile error.
        #[source]
        source: trigger::CompileError,
    },
}

/// Errors returned while establishing a session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError<DialError, LoginError>
where
    DialError: std::error::Error + Send + Sync + 'static,
    LoginError: std::error::Error + Send + Sync + 'static,
{
    /// The server could not be reached.
    #[error("connection failed")]
    Dial(#[source] DialError),

    /// The server rejected the credentials.
    #[error("authentication failed")]
    Login(#[source] LoginError),
}

/// Errors returned while checking a mailbox.
#[derive(Debug, thiserror::Error)]
pub enum CheckError<SessionError>
where
    SessionError: std::error::Error + Send + Sync + 'static,
{
    /// The connection was torn down.
    #[error("not connected")]
    Disconnected,

    /// Selecting the mailbox failed, e.g. because it does not exist.
    #[error("select \"{mailbox}\" failed")]
    Select {
        /// The mailbox name.
        mailbox: String,

        /// The session error.
        #[source]
        source: SessionError,
    },

    /// Searching the mailbox failed.
    #[error("search \"{mailbox}\" failed")]
    Search {
        /// The mailbox name.
        mailbox: String,

        /// The session error.
        #[source]
        source: SessionError,
    },

    /// Fetching messages failed.
    #[error("fetch \"{mailbox}\" failed")]
    Fetch {
        /// The mailbox name.
        mailbox: String,

        /// The session error.
        #[source]
        source: SessionError,
    },

    /// The server did not report the UID of the newest message.
    #[error("no UID for message {seq} in \"{mailbox}\"")]
    MissingUid {
        /// The mailbox name.
        mailbox: String,

        /// The sequence number of the message.
        seq: u32,
    },
}

/// Errors that end the polling phase.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError<SessionError>
where
    SessionError: std::error::Error + Send + Sync + 'static,
{
    /// A mailbox check failed.
    #[error(transparent)]
    Check(#[from] CheckError<SessionError>),

    /// An interval group task panicked.
    #[error("interval group task failed")]
    GroupTask(#[source] tokio::task::JoinError),
}
