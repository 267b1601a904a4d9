//! Receiving side of the hand-off, for the target application's listener.
//!
//! The listener gets a correlation id from the notification and calls
//! [`PayloadReceiver::receive`] before replying; a nonzero reply should be
//! returned when this fails.

use tracing::debug;

use crate::correlation::CorrelationId;
use crate::error::{HandoffError, HandoffResult};
use crate::staging::PayloadStaging;
use crate::uri::Uri;

#[derive(Debug, Clone)]
pub struct PayloadReceiver {
    staging: PayloadStaging,
}

impl PayloadReceiver {
    pub fn new(staging: PayloadStaging) -> Self {
        Self { staging }
    }

    /// Read, delete and parse the payload staged under `id`.
    pub fn receive(&self, id: CorrelationId) -> HandoffResult<Uri> {
        let text = self
            .staging
            .take(id)
            .map_err(|source| HandoffError::Staging {
                path: self.staging.path_for(id),
                source,
            })?;
        let uri = Uri::parse(&text)?;
        debug!(id = %id, uri = %uri, "payload received");
        Ok(uri)
    }

    /// Same as [`receive`](Self::receive) for a raw notification parameter.
    pub fn receive_lparam(&self, lparam: isize) -> HandoffResult<Uri> {
        self.receive(CorrelationId::from_lparam(lparam))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receives_what_was_staged_once() {
        let dir = tempfile::tempdir().unwrap();
        let staging = PayloadStaging::new(dir.path());
        let id = CorrelationId::generate();
        let uri = Uri::parse("myapp://project/open?path=Café").unwrap();
        staging.stage(id, &uri).unwrap();

        let receiver = PayloadReceiver::new(staging.clone());
        assert_eq!(receiver.receive_lparam(id.as_lparam()).unwrap(), uri);
        assert!(!staging.path_for(id).exists());
        assert!(matches!(
            receiver.receive(id),
            Err(HandoffError::Staging { .. })
        ));
    }

    #[test]
    fn garbage_payload_is_a_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let staging = PayloadStaging::new(dir.path());
        let id = CorrelationId::from(7);
        std::fs::write(staging.path_for(id), "not a uri ::\r\n").unwrap();

        let receiver = PayloadReceiver::new(staging);
        assert!(matches!(
            receiver.receive(id),
            Err(HandoffError::UriSyntax(_))
        ));
    }
}
