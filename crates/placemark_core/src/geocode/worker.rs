//! Background lookup execution.
//!
//! Each request runs on its own short-lived thread and reports back over a
//! channel, so the event loop keeps handling input while a lookup is in
//! flight.

use crate::editor::DraftToken;
use crate::geocode::ReverseGeocoder;
use crate::model::place::{Coordinates, PlaceMeta};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::thread;

/// Lookup issued when a draft is submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupRequest {
    pub token: DraftToken,
    pub coordinates: Coordinates,
}

/// Lookup outcome tagged with the requesting draft.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub token: DraftToken,
    pub meta: PlaceMeta,
}

/// Spawns lookups and collects their results on one channel.
pub struct LookupWorker {
    geocoder: Arc<dyn ReverseGeocoder>,
    sender: Sender<LookupResult>,
    receiver: Receiver<LookupResult>,
}

impl LookupWorker {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            geocoder,
            sender,
            receiver,
        }
    }

    /// Starts one lookup in the background.
    pub fn submit(&self, request: LookupRequest) {
        let geocoder = Arc::clone(&self.geocoder);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("geocode-{}", request.token))
            .spawn(move || {
                let meta = geocoder.lookup(request.coordinates);
                if sender
                    .send(LookupResult {
                        token: request.token,
                        meta,
                    })
                    .is_err()
                {
                    debug!("event=geocode_deliver module=geocode status=dropped reason=receiver_closed");
                }
            });

        if let Err(err) = spawned {
            warn!(
                "event=geocode_spawn module=geocode status=error token={} error={}",
                request.token, err
            );
            let _ = self.sender.send(LookupResult {
                token: request.token,
                meta: PlaceMeta::default(),
            });
        }
    }

    /// Channel on which finished lookups arrive.
    pub fn results(&self) -> &Receiver<LookupResult> {
        &self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupRequest, LookupWorker};
    use crate::editor::DraftToken;
    use crate::geocode::DisabledGeocoder;
    use crate::model::place::Coordinates;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn results_carry_request_token() {
        let worker = LookupWorker::new(Arc::new(DisabledGeocoder));
        let token = DraftToken::from_raw(7);
        worker.submit(LookupRequest {
            token,
            coordinates: Coordinates::new(0.0, 0.0).unwrap(),
        });

        let result = worker
            .results()
            .recv_timeout(Duration::from_secs(5))
            .expect("lookup result should arrive");
        assert_eq!(result.token, token);
        assert!(result.meta.is_empty());
    }
}
