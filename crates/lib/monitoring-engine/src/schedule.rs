//! Interval grouping and the per-group polling loop.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use monitoring_core::{CommandRunner, Dialer, Timer};

use crate::stop::StopSignal;
use crate::{CheckError, Connection, Mailbox, SessionError, Shared};

/// Mailboxes sharing one check interval.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IntervalGroup {
    /// The shared check interval.
    pub interval: Duration,

    /// Indices into the engine mailbox list, in config order.
    pub mailboxes: Vec<usize>,
}

/// Partition mailboxes by their effective interval, shortest first.
pub fn group_by_interval(mailboxes: &[Mailbox]) -> Vec<IntervalGroup> {
    let mut groups = BTreeMap::<Duration, Vec<usize>>::new();
    for (index, mailbox) in mailboxes.iter().enumerate() {
        groups.entry(mailbox.interval).or_default().push(index);
    }

    groups
        .into_iter()
        .map(|(interval, mailboxes)| IntervalGroup {
            interval,
            mailboxes,
        })
        .collect()
}

/// Check the group mailboxes one after another on every tick.
///
/// Returns `Ok` when stopped and the first check error otherwise.
pub(crate) async fn poll_group<D, T, R>(
    shared: Arc<Shared<D, T, R>>,
    connection: Connection<D>,
    group: usize,
    mut stop: StopSignal,
) -> Result<(), CheckError<SessionError<D>>>
where
    D: Dialer,
    T: Timer,
    R: CommandRunner,
{
    let group = &shared.groups[group];

    tracing::debug!(
        interval = ?group.interval,
        mailboxes = group.mailboxes.len(),
        "starting interval group"
    );

    loop {
        if stop.sleep(&shared.timer, group.interval).await.is_stopped() {
            return Ok(());
        }

        for &index in &group.mailboxes {
            let mailbox = &shared.mailboxes[index];

            // The lock spans the whole select-search-fetch sequence so
            // requests of different groups never interleave.
            let mut guard = connection.lock().await;
            let session = guard.as_mut().ok_or(CheckError::Disconnected)?;

            let processed =
                crate::check::check_mailbox(session, mailbox, &shared.watermarks, &shared.dispatcher)
                    .await?;

            if processed > 0 {
                tracing::info!(mailbox = %mailbox.name, processed, "processed new messages");
            }
        }
    }
}
