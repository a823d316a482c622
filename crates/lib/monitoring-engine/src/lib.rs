//! Monitoring engine.
//!
//! Watches mailboxes over one IMAP connection and runs trigger commands for
//! new messages. The engine owns the reconnect loop: it connects, records
//! how far every mailbox has been read, then polls the mailboxes grouped by
//! check interval until a request fails or a stop is requested, and starts
//! over. Progress survives reconnects, so no message is handled twice.

use std::sync::Arc;
use std::time::Duration;

use monitoring_core::{Client as _, CommandRunner, ConnectParams, Dialer, Session as _, Timer, Uid};

mod check;
mod dispatch;
mod error;
mod schedule;
mod settings;
mod stop;
mod timer;
mod watermark;


pub use dispatch::{
    ENV_DATE, ENV_FROM, ENV_MAILBOX, ENV_SUBJECT, ENV_UID, UNKNOWN_SENDER, extract_text,
    format_date,
};
pub use error::*;
pub use schedule::{IntervalGroup, group_by_interval};
pub use settings::*;
pub use stop::StopHandle;
pub use timer::TokioTimer;
pub use watermark::WatermarkStore;

/// The highest UID processed for a mailbox; `0` means nothing seen yet.
pub type Watermark = Uid;

/// Delay before retrying a failed connect.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before reconnecting after the polling phase ended.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// The session type produced by a dialer.
pub type SessionOf<D> = <<D as Dialer>::Client as monitoring_core::Client>::Session;

/// The error type of the session produced by a dialer.
pub type SessionError<D> = <SessionOf<D> as monitoring_core::Session>::Error;

/// The connect error type for a dialer.
pub type DialerConnectError<D> =
    ConnectError<<D as Dialer>::Error, <<D as Dialer>::Client as monitoring_core::Client>::Error>;

/// The live connection; empty while disconnected.
pub(crate) type Connection<D> = Arc<tokio::sync::Mutex<Option<SessionOf<D>>>>;

/// The side-effecting capabilities the engine runs on.
#[derive(Debug)]
pub struct Capabilities<D, T, R> {
    /// Opens IMAP connections.
    pub dialer: D,

    /// Drives backoffs and check intervals.
    pub timer: T,

    /// Runs trigger commands.
    pub runner: R,
}

/// State shared by the engine and its interval group tasks.
pub(crate) struct Shared<D, T, R> {
    pub(crate) imap: ImapSettings,
    pub(crate) mailboxes: Vec<Mailbox>,
    pub(crate) groups: Vec<IntervalGroup>,
    pub(crate) dialer: D,
    pub(crate) timer: T,
    pub(crate) dispatcher: dispatch::Dispatcher<R>,
    pub(crate) watermarks: WatermarkStore,
}

/// The mail trigger engine.
pub struct Engine<D, T, R> {
    shared: Arc<Shared<D, T, R>>,
    stop_handle: StopHandle,
    stop: stop::StopSignal,
}

impl<D, T, R> Engine<D, T, R>
where
    D: Dialer,
    T: Timer,
    R: CommandRunner,
{
    /// Validate the config, compile all triggers and build the engine.
    pub fn new(
        config: &config_core::Config,
        capabilities: Capabilities<D, T, R>,
    ) -> Result<Self, BuildError> {
        let (imap, mailboxes) = settings::build(config)?;
        let groups = group_by_interval(&mailboxes);
        let Capabilities {
            dialer,
            timer,
            runner,
        } = capabilities;
        let (stop_handle, stop) = stop::channel();

        Ok(Self {
            shared: Arc::new(Shared {
                imap,
                mailboxes,
                groups,
                dialer,
                timer,
                dispatcher: dispatch::Dispatcher::new(runner),
                watermarks: WatermarkStore::default(),
            }),
            stop_handle,
            stop,
        })
    }

    /// A handle that stops [`Engine::run`].
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// The compiled mailboxes.
    pub fn mailboxes(&self) -> &[Mailbox] {
        &self.shared.mailboxes
    }

    /// The interval groups.
    pub fn groups(&self) -> &[IntervalGroup] {
        &self.shared.groups
    }

    /// The current watermark of a mailbox.
    pub fn watermark(&self, mailbox: &str) -> Option<Watermark> {
        self.shared.watermarks.get(mailbox)
    }

    /// Connect and authenticate.
    pub async fn connect(&self) -> Result<SessionOf<D>, DialerConnectError<D>> {
        let imap = &self.shared.imap;
        let params = ConnectParams {
            host: &imap.server,
            port: imap.port,
            use_tls: imap.use_ssl,
        };

        tracing::info!(
            imap_server = %imap.server,
            imap_port = imap.port,
            imap_use_tls = imap.use_ssl,
            "connecting to the IMAP server"
        );

        let client = self
            .shared
            .dialer
            .dial(&params)
            .await
            .map_err(ConnectError::Dial)?;

        let session = client
            .login(&imap.username, imap.password.as_str())
            .await
            .map_err(ConnectError::Login)?;

        tracing::info!(imap_server = %imap.server, username = %imap.username, "logged in");

        Ok(session)
    }

    /// Monitor until stopped, reconnecting after every failure.
    pub async fn run(&self) {
        let mut stop = self.stop.clone();

        tracing::info!(
            mailboxes = self.shared.mailboxes.len(),
            interval_groups = self.shared.groups.len(),
            "starting mail trigger engine"
        );

        while !stop.is_stopped() {
            let session = match self.connect().await {
                Ok(session) => session,
                Err(error) => {
                    tracing::error!(
                        error = &error as &dyn std::error::Error,
                        retry_in = ?CONNECT_RETRY_DELAY,
                        "IMAP connect failed"
                    );
                    if stop
                        .sleep(&self.shared.timer, CONNECT_RETRY_DELAY)
                        .await
                        .is_stopped()
                    {
                        break;
                    }
                    continue;
                }
            };

            let connection: Connection<D> = Arc::new(tokio::sync::Mutex::new(Some(session)));

            match self.monitor(&connection).await {
                Ok(()) => tracing::info!("monitoring stopped"),
                Err(error) => tracing::error!(
                    error = &error as &dyn std::error::Error,
                    "monitoring failed"
                ),
            }

            disconnect::<D>(&connection).await;

            if stop
                .sleep(&self.shared.timer, RECONNECT_DELAY)
                .await
                .is_stopped()
            {
                break;
            }
        }

        tracing::info!("mail trigger engine stopped");
    }

    /// Initialize watermarks, then poll all interval groups until one fails
    /// or all of them stop.
    async fn monitor(&self, connection: &Connection<D>) -> Result<(), MonitorError<SessionError<D>>> {
        {
            let mut guard = connection.lock().await;
            let session = guard
                .as_mut()
                .ok_or(CheckError::<SessionError<D>>::Disconnected)?;
            check::init_watermarks(session, &self.shared.mailboxes, &self.shared.watermarks).await?;
        }

        let mut join_set = tokio::task::JoinSet::new();
        for group in 0..self.shared.groups.len() {
            join_set.spawn(schedule::poll_group(
                Arc::clone(&self.shared),
                Arc::clone(connection),
                group,
                self.stop.clone(),
            ));
        }

        // The first failing group ends the phase; the rest are aborted when
        // the set is dropped.
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(error)) => return Err(MonitorError::Check(error)),
                Err(error) => return Err(MonitorError::GroupTask(error)),
            }
        }

        Ok(())
    }
}

/// Log out and drop the live connection, if any.
async fn disconnect<D: Dialer>(connection: &Connection<D>) {
    let Some(session) = connection.lock().await.take() else {
        return;
    };

    match session.logout().await {
        Ok(()) => tracing::debug!("logged out"),
        Err(error) => tracing::debug!(%error, "logout failed, dropping the connection"),
    }
}
