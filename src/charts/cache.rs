use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use rand::{rngs::OsRng, Rng};
use tracing::debug;

struct CachedArtifact {
    bytes: Bytes,
    created_at: Instant,
}

/// In-memory token → blob store with single-retrieval semantics.
///
/// A token yields its bytes at most once: `take_once` removes the entry under
/// the map's per-key lock, so concurrent readers of one token see exactly one
/// success. Entries older than `ttl` are never served, and the map holds at
/// most `max_entries` artifacts (oldest evicted first).
pub struct ArtifactCache {
    entries: DashMap<String, CachedArtifact>,
    max_entries: usize,
    ttl: Duration,
}

impl ArtifactCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn put(&self, bytes: Bytes) -> String {
        self.evict_expired();
        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().created_at)
                .map(|e| e.key().clone());
            match oldest {
                Some(token) => {
                    self.entries.remove(&token);
                    debug!(%token, "chart evicted at capacity");
                }
                None => break,
            }
        }

        let token = new_token();
        self.entries.insert(
            token.clone(),
            CachedArtifact {
                bytes,
                created_at: Instant::now(),
            },
        );
        token
    }

    pub fn take_once(&self, token: &str) -> Option<Bytes> {
        let (_, artifact) = self.entries.remove(token)?;
        if artifact.created_at.elapsed() > self.ttl {
            debug!(%token, "chart expired before retrieval");
            return None;
        }
        Some(artifact.bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, a| a.created_at.elapsed() <= ttl);
    }
}

fn new_token() -> String {
    format!("{:032x}", OsRng.gen::<u128>())
}
