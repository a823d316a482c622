//! Watermark initialization and incremental mailbox checks.

use futures_util::StreamExt as _;
use monitoring_core::{CommandRunner, Session, Uid, UidRange};

use crate::dispatch::Dispatcher;
use crate::{CheckError, Mailbox, Watermark, WatermarkStore};

/// Initialize watermarks of mailboxes seen for the first time.
///
/// Nothing is stored unless every mailbox succeeds.
pub(crate) async fn init_watermarks<S>(
    session: &mut S,
    mailboxes: &[Mailbox],
    watermarks: &WatermarkStore,
) -> Result<(), CheckError<S::Error>>
where
    S: Session,
{
    let mut initialized = Vec::new();

    for mailbox in mailboxes {
        if let Some(watermark) = watermarks.get(&mailbox.name) {
            tracing::debug!(mailbox = %mailbox.name, watermark, "keeping watermark");
            continue;
        }

        let watermark = initial_watermark(session, &mailbox.name).await?;
        tracing::info!(mailbox = %mailbox.name, watermark, "initialized watermark");
        initialized.push((mailbox.name.clone(), watermark));
    }

    watermarks.init(initialized);
    Ok(())
}

/// The UID of the newest message, or `0` for an empty mailbox.
async fn initial_watermark<S>(session: &mut S, mailbox: &str) -> Result<Watermark, CheckError<S::Error>>
where
    S: Session,
{
    let status = session
        .examine(mailbox)
        .await
        .map_err(|source| CheckError::Select {
            mailbox: mailbox.to_owned(),
            source,
        })?;

    if status.exists == 0 {
        return Ok(0);
    }

    let seqs = session
        .search_all()
        .await
        .map_err(|source| CheckError::Search {
            mailbox: mailbox.to_owned(),
            source,
        })?;

    let Some(&last) = seqs.iter().max() else {
        return Ok(0);
    };

    session
        .fetch_uid(last)
        .await
        .map_err(|source| CheckError::Fetch {
            mailbox: mailbox.to_owned(),
            source,
        })?
        .ok_or_else(|| CheckError::MissingUid {
            mailbox: mailbox.to_owned(),
            seq: last,
        })
}

/// Fetch and dispatch messages newer than the mailbox watermark.
///
/// The watermark advances after every message, so progress made before a
/// failure is kept. Returns the number of messages processed.
pub(crate) async fn check_mailbox<S, R>(
    session: &mut S,
    mailbox: &Mailbox,
    watermarks: &WatermarkStore,
    dispatcher: &Dispatcher<R>,
) -> Result<usize, CheckError<S::Error>>
where
    S: Session,
    R: CommandRunner,
{
    let status = session
        .examine(&mailbox.name)
        .await
        .map_err(|source| CheckError::Select {
            mailbox: mailbox.name.clone(),
            source,
        })?;

    if status.exists == 0 {
        tracing::trace!(mailbox = %mailbox.name, "mailbox is empty");
        return Ok(0);
    }

    let watermark = watermarks.get(&mailbox.name).unwrap_or(0);

    // `n:*` always matches the newest message, even when its UID is below
    // `n`; keep only what is really new.
    let new_uids: Vec<Uid> = session
        .uid_search(UidRange::after(watermark))
        .await
        .map_err(|source| CheckError::Search {
            mailbox: mailbox.name.clone(),
            source,
        })?
        .into_iter()
        .filter(|&uid| uid > watermark)
        .collect();

    if new_uids.is_empty() {
        tracing::trace!(mailbox = %mailbox.name, watermark, "no new messages");
        return Ok(0);
    }

    tracing::debug!(
        mailbox = %mailbox.name,
        watermark,
        count = new_uids.len(),
        "fetching new messages"
    );

    let mut messages = session
        .uid_fetch(&new_uids)
        .await
        .map_err(|source| CheckError::Fetch {
            mailbox: mailbox.name.clone(),
            source,
        })?;

    let mut processed = 0;
    while let Some(message) = messages.next().await {
        let message = message.map_err(|source| CheckError::Fetch {
            mailbox: mailbox.name.clone(),
            source,
        })?;

        if message.uid <= watermark {
            tracing::debug!(mailbox = %mailbox.name, uid = message.uid, "skipping already processed message");
            continue;
        }

        dispatcher.dispatch(mailbox, &message);
        watermarks.advance(&mailbox.name, message.uid);
        processed += 1;
    }

    Ok(processed)
}
