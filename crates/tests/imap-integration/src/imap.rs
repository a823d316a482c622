//! IMAP connectivity helpers.

use std::time::Duration;

/// A raw session used to seed mailboxes.
pub type SeedSession = async_imap::Session<imap_tls::Stream>;

/// Connects over plaintext IMAP with retries until the server is ready.
pub async fn connect_with_retry(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
) -> Result<SeedSession, async_imap::error::Error> {
    let try_connect = || async move {
        let client = imap_tls::connect(host, port, false)
            .await
            .map_err(|err| async_imap::error::Error::Io(std::io::Error::other(err)))?;

        client
            .login(user, password)
            .await
            .map_err(|(err, _client)| err)
    };

    let mut attempts = 60u8;
    loop {
        let err = match try_connect().await {
            Ok(session) => return Ok(session),
            Err(err) => err,
        };

        let Some(attempts_left) = attempts.checked_sub(1) else {
            return Err(err);
        };

        attempts = attempts_left;
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// Append a message to a mailbox.
pub async fn append(
    session: &mut SeedSession,
    mailbox: &str,
    content: &[u8],
) -> Result<(), async_imap::error::Error> {
    session.append(mailbox, None, None, content).await?;
    session.noop().await
}
