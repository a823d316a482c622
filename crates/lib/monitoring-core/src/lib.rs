//! Monitoring core.
//!
//! Capabilities the monitoring engine is built from. Every side effect the
//! engine has (dialing, talking IMAP, sleeping, running commands) goes
//! through one of these traits so it can be replaced in tests.

use std::future::Future;
use std::time::Duration;

mod message;

pub use message::*;

/// IMAP connect params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams<'a> {
    /// Hostname or IP address of the IMAP server.
    pub host: &'a str,

    /// IMAP port.
    pub port: u16,

    /// Use implicit TLS; plaintext otherwise.
    pub use_tls: bool,
}

/// Dials an IMAP server.
pub trait Dialer: Send + Sync + 'static {
    /// The not-yet-authenticated client.
    type Client: Client;

    /// The error the dial may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a plaintext or TLS connection and read the server greeting.
    fn dial(
        &self,
        params: &ConnectParams<'_>,
    ) -> impl Future<Output = Result<Self::Client, Self::Error>> + Send;
}

/// A connected, unauthenticated IMAP client.
pub trait Client: Send {
    /// The authenticated session.
    type Session: Session;

    /// The error the login may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Authenticate with username and password.
    fn login(
        self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Self::Session, Self::Error>> + Send;
}

/// An authenticated IMAP session.
///
/// The session is stateful: the search and fetch operations apply to the
/// mailbox selected last.
pub trait Session: Send + 'static {
    /// The error any request may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Select a mailbox read-only.
    fn examine(
        &mut self,
        mailbox: &str,
    ) -> impl Future<Output = Result<MailboxStatus, Self::Error>> + Send;

    /// Search all messages, returning sequence numbers.
    fn search_all(&mut self) -> impl Future<Output = Result<Vec<u32>, Self::Error>> + Send;

    /// Fetch the UID of the message with the given sequence number.
    fn fetch_uid(
        &mut self,
        seq: u32,
    ) -> impl Future<Output = Result<Option<Uid>, Self::Error>> + Send;

    /// Search messages by UID range.
    fn uid_search(
        &mut self,
        range: UidRange,
    ) -> impl Future<Output = Result<Vec<Uid>, Self::Error>> + Send;

    /// Fetch envelope and full body of the given UIDs.
    ///
    /// Messages are yielded as the server sends them, in no particular order.
    fn uid_fetch(
        &mut self,
        uids: &[Uid],
    ) -> impl Future<Output = Result<MessageStream<'_, Self::Error>, Self::Error>> + Send;

    /// Close the session.
    fn logout(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A stream of fetched messages.
pub type MessageStream<'a, E> = futures_util::stream::BoxStream<'a, Result<FetchedMessage, E>>;

/// Sleep timer.
pub trait Timer: Send + Sync + 'static {
    /// Wait for the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Executes trigger commands.
pub trait CommandRunner: Send + Sync + 'static {
    /// The error command execution may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run the command to completion.
    fn run(
        &self,
        request: CommandRequest,
    ) -> impl Future<Output = Result<CommandOutput, Self::Error>> + Send;
}

/// A command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// The shell command line.
    pub command: String,

    /// Variables added on top of the inherited environment.
    pub env: Vec<(String, String)>,

    /// Data written to the command's stdin.
    pub stdin: Vec<u8>,
}

/// The outcome of a completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: Vec<u8>,

    /// Captured stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
