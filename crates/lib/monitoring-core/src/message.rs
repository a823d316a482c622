//! Protocol-neutral message data.

/// A message UID.
pub type Uid = u32;

/// Mailbox state reported on select.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
}

/// A UID range with an open upper bound (`start:*`).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UidRange {
    /// The first UID of the range.
    pub start: Uid,
}

impl UidRange {
    /// The range of UIDs strictly above the watermark.
    ///
    /// A zero watermark means nothing was seen yet, so the range covers
    /// the whole mailbox.
    pub fn after(watermark: Uid) -> Self {
        Self {
            start: watermark.saturating_add(1).max(1),
        }
    }
}

impl std::fmt::Display for UidRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:*", self.start)
    }
}

/// Message envelope.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Envelope {
    /// Sender addresses.
    pub from: Vec<String>,

    /// Recipient addresses.
    pub to: Vec<String>,

    /// Subject line.
    pub subject: Option<String>,

    /// Raw date header.
    pub date: Option<String>,
}

/// A fetched message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FetchedMessage {
    /// Message UID.
    pub uid: Uid,

    /// Message envelope.
    pub envelope: Envelope,

    /// The full raw RFC 822 message.
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_watermark_covers_everything() {
        assert_eq!(UidRange::after(0).to_string(), "1:*");
    }

    #[test]
    fn range_starts_after_watermark() {
        assert_eq!(UidRange::after(12).to_string(), "13:*");
        assert_eq!(UidRange::after(u32::MAX).start, u32::MAX);
    }
}
