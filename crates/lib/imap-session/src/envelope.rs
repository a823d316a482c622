//! Envelope conversion.

use imap_proto::types::{Address, Envelope};

/// Convert the protocol envelope.
pub(crate) fn convert(envelope: &Envelope<'_>) -> monitoring_core::Envelope {
    monitoring_core::Envelope {
        from: addresses(envelope.from.as_deref()),
        to: addresses(envelope.to.as_deref()),
        subject: envelope.subject.as_deref().map(lossy),
        date: envelope.date.as_deref().map(lossy),
    }
}

/// Render the `mailbox@host` form of every address that has a mailbox.
fn addresses(list: Option<&[Address<'_>]>) -> Vec<String> {
    list.unwrap_or_default()
        .iter()
        .filter_map(|address| {
            let mailbox = address.mailbox.as_deref()?;
            Some(match address.host.as_deref() {
                Some(host) => format!("{}@{}", lossy(mailbox), lossy(host)),
                None => lossy(mailbox),
            })
        })
        .collect()
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
