use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::audio::{decode_wav, AudioClip};
use crate::kernel::event::{DecodeOutcome, DecodeTicket, Event};

type CacheKey = (String, u64);

/// Decodes clips off the tick path and posts the result back to the reactor.
///
/// The spawned task never touches engine state; it only sends
/// `Event::DecodeResolved`, which the next tick validates against the current
/// generation. Decoding is idempotent, so results are cached per clip revision.
pub struct AsyncDecoder {
    tx: mpsc::Sender<Event>,
    cache: Arc<Mutex<HashMap<CacheKey, Arc<AudioClip>>>>,
}

impl AsyncDecoder {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self {
            tx,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn dispatch(&self, ticket: DecodeTicket, bytes: Arc<[u8]>) {
        let tx = self.tx.clone();
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            let key = (ticket.segment_id.clone(), ticket.clip_revision);
            let cached = lock(&cache).get(&key).cloned();

            let outcome: DecodeOutcome = match cached {
                Some(clip) => Ok(clip),
                None => {
                    let segment_id = ticket.segment_id.clone();
                    let decoded = tokio::task::spawn_blocking(move || decode_wav(&segment_id, &bytes)).await;
                    match decoded {
                        Ok(Ok(clip)) => {
                            let clip = Arc::new(clip);
                            let mut cache = lock(&cache);
                            // Older revisions of this segment can never be scheduled again.
                            cache.retain(|(id, rev), _| id != &key.0 || *rev == key.1);
                            cache.insert(key, Arc::clone(&clip));
                            Ok(clip)
                        }
                        Ok(Err(e)) => Err(e),
                        Err(join_err) => Err(crate::error::EngineError::DecodeFailure {
                            segment_id: ticket.segment_id.clone(),
                            reason: join_err.to_string(),
                        }),
                    }
                }
            };

            debug!("Decode for segment {} resolved (ok: {})", ticket.segment_id, outcome.is_ok());
            if tx.send(Event::DecodeResolved(ticket, outcome)).await.is_err() {
                warn!("Reactor gone before decode could be delivered");
            }
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
