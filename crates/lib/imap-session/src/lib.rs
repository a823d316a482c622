//! High-level IMAP session utilities.
//!
//! Implements the [`monitoring_core`] connection capabilities on top of
//! `async-imap`.

use futures_util::{StreamExt as _, TryStreamExt as _};
use monitoring_core::{ConnectParams, FetchedMessage, MailboxStatus, MessageStream, Uid, UidRange};

mod envelope;

/// The fetch query used for new messages.
///
/// `BODY.PEEK` keeps the `\Seen` flag untouched.
const FETCH_QUERY: &str = "(UID ENVELOPE BODYSTRUCTURE BODY.PEEK[])";

/// The session type we use.
pub type Session = async_imap::Session<imap_tls::Stream>;

/// Errors returned by session requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IMAP protocol error.
    #[error("IMAP error: {0}")]
    Imap(#[source] async_imap::error::Error),
}

/// The real dialer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dialer;

/// A connected, unauthenticated client.
#[derive(Debug)]
pub struct Client(imap_tls::Client);

/// An authenticated session.
#[derive(Debug)]
pub struct ImapSession(Session);

impl monitoring_core::Dialer for Dialer {
    type Client = Client;
    type Error = imap_tls::ConnectError;

    async fn dial(&self, params: &ConnectParams<'_>) -> Result<Client, imap_tls::ConnectError> {
        imap_tls::connect(params.host, params.port, params.use_tls)
            .await
            .map(Client)
    }
}

impl monitoring_core::Client for Client {
    type Session = ImapSession;
    type Error = async_imap::error::Error;

    async fn login(
        self,
        username: &str,
        password: &str,
    ) -> Result<ImapSession, async_imap::error::Error> {
        self.0
            .login(username, password)
            .await
            .map(ImapSession)
            .map_err(|(err, _client)| err)
    }
}

impl monitoring_core::Session for ImapSession {
    type Error = Error;

    async fn examine(&mut self, mailbox: &str) -> Result<MailboxStatus, Error> {
        let mailbox = self.0.examine(mailbox).await.map_err(Error::Imap)?;
        Ok(MailboxStatus {
            exists: mailbox.exists,
        })
    }

    async fn search_all(&mut self) -> Result<Vec<u32>, Error> {
        let mut seqs: Vec<u32> = self
            .0
            .search("ALL")
            .await
            .map_err(Error::Imap)?
            .into_iter()
            .collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    async fn fetch_uid(&mut self, seq: u32) -> Result<Option<Uid>, Error> {
        let fetches: Vec<_> = self
            .0
            .fetch(seq.to_string(), "UID")
            .await
            .map_err(Error::Imap)?
            .try_collect()
            .await
            .map_err(Error::Imap)?;
        Ok(fetches.iter().find_map(|fetch| fetch.uid))
    }

    async fn uid_search(&mut self, range: UidRange) -> Result<Vec<Uid>, Error> {
        let mut uids: Vec<Uid> = self
            .0
            .uid_search(format!("UID {range}"))
            .await
            .map_err(Error::Imap)?
            .into_iter()
            .collect();
        uids.sort_unstable();
        Ok(uids)
    }

    async fn uid_fetch(&mut self, uids: &[Uid]) -> Result<MessageStream<'_, Error>, Error> {
        let uid_set = uids
            .iter()
            .map(Uid::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let stream = self
            .0
            .uid_fetch(uid_set, FETCH_QUERY)
            .await
            .map_err(Error::Imap)?;

        Ok(stream
            .filter_map(|fetch| {
                let item = match fetch {
                    Err(err) => Some(Err(Error::Imap(err))),
                    Ok(fetch) => match fetch.uid {
                        Some(uid) => Some(Ok(FetchedMessage {
                            uid,
                            envelope: fetch.envelope().map(envelope::convert).unwrap_or_default(),
                            body: fetch.body().map(<[u8]>::to_vec).unwrap_or_default(),
                        })),
                        None => {
                            tracing::warn!(seq = fetch.message, "skipping fetch response without UID");
                            None
                        }
                    },
                };
                std::future::ready(item)
            })
            .boxed())
    }

    async fn logout(mut self) -> Result<(), Error> {
        self.0.logout().await.map_err(Error::Imap)
    }
}
