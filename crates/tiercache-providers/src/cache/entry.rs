//! Memory backend entries

use std::time::Duration;
use tiercache_domain::ports::KeyTtl;
use tokio::time::Instant;

/// A stored value with its expiry and access metadata
///
/// Owned exclusively by the memory backend. An entry whose `expires_at` has
/// passed is logically absent even while it is still in the map.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    created_at: Instant,
    last_accessed_at: Instant,
    access_count: u64,
}

impl CacheEntry {
    /// Create an entry; a zero `ttl` never expires
    pub fn new(value: Vec<u8>, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            expires_at: expiry_from(ttl, now),
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    /// True once the TTL has elapsed
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Record a read and return the payload
    pub fn touch(&mut self, now: Instant) -> &[u8] {
        self.last_accessed_at = now;
        self.access_count += 1;
        &self.value
    }

    /// Replace the expiry; a zero `ttl` makes the entry persistent
    pub fn set_ttl(&mut self, ttl: Duration, now: Instant) {
        self.expires_at = expiry_from(ttl, now);
    }

    /// Remaining lifetime at `now`
    pub fn remaining(&self, now: Instant) -> KeyTtl {
        match self.expires_at {
            None => KeyTtl::Persistent,
            Some(at) => KeyTtl::Remaining(at.saturating_duration_since(now)),
        }
    }

    /// Number of successful reads
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Diagnostic snapshot relative to `now`
    pub fn info(&self, now: Instant) -> EntryInfo {
        EntryInfo {
            size_bytes: self.value.len(),
            age: now.saturating_duration_since(self.created_at),
            idle: now.saturating_duration_since(self.last_accessed_at),
            access_count: self.access_count,
            ttl: self.remaining(now),
            expired: self.is_expired(now),
        }
    }
}

/// A TTL past the clock's range never expires
fn expiry_from(ttl: Duration, now: Instant) -> Option<Instant> {
    if ttl.is_zero() { None } else { now.checked_add(ttl) }
}

/// Point-in-time view of an entry's metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Payload size
    pub size_bytes: usize,
    /// Time since the entry was written
    pub age: Duration,
    /// Time since the last read (or the write, if never read)
    pub idle: Duration,
    /// Number of reads
    pub access_count: u64,
    /// Remaining lifetime
    pub ttl: KeyTtl,
    /// Expired but not yet swept
    pub expired: bool,
}
