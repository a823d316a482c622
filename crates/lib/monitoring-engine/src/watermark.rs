//! Per-mailbox progress tracking.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Watermark;

/// Mailbox name to watermark mapping, shared by all interval groups.
///
/// Every access goes through one coarse lock, never held across an await.
#[derive(Debug, Default)]
pub struct WatermarkStore {
    /// The watermarks by mailbox name.
    inner: Mutex<HashMap<String, Watermark>>,
}

impl WatermarkStore {
    /// The watermark of a mailbox, if it was initialized.
    pub fn get(&self, mailbox: &str) -> Option<Watermark> {
        self.lock().get(mailbox).copied()
    }

    /// Store initial watermarks for mailboxes that have none yet.
    pub fn init<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, Watermark)>,
    {
        let mut inner = self.lock();
        for (mailbox, watermark) in entries {
            inner.entry(mailbox).or_insert(watermark);
        }
    }

    /// Raise the watermark of a mailbox to `uid` if it is higher.
    ///
    /// Returns the resulting watermark.
    pub fn advance(&self, mailbox: &str, uid: Watermark) -> Watermark {
        let mut inner = self.lock();
        match inner.get_mut(mailbox) {
            Some(current) => {
                *current = (*current).max(uid);
                *current
            }
            None => {
                inner.insert(mailbox.to_owned(), uid);
                uid
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Watermark>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
