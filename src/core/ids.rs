//! Identifier generation for containers and commits.
//!
//! Identifier minting is injected into the activities so tests can supply
//! deterministic values and so an engine adapter can keep replayed runs
//! consistent. Providers are shared across runs and must be
//! collision-resistant; they carry no cross-run ordering guarantee.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Capability for minting run-scoped identifiers
pub trait IdProvider: Send + Sync {
    /// Mint a fresh container identifier
    fn container_id(&self) -> String;

    /// Mint a fresh commit identifier
    fn commit_sha(&self) -> String;
}

/// Production provider backed by random UUIDs
#[derive(Debug, Default)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn container_id(&self) -> String {
        format!("caas-{}", Uuid::new_v4().simple())
    }

    fn commit_sha(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic provider for tests and replay experiments.
///
/// Mints identifiers from a monotonically increasing counter, so a fresh
/// provider always yields the same sequence.
#[derive(Debug, Default)]
pub struct SequenceIdProvider {
    counter: AtomicU64,
}

impl SequenceIdProvider {
    /// Create a provider starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

impl IdProvider for SequenceIdProvider {
    fn container_id(&self) -> String {
        format!("caas-{:08x}", self.next())
    }

    fn commit_sha(&self) -> String {
        format!("{:040x}", self.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIdProvider;

        assert_ne!(ids.container_id(), ids.container_id());
        assert_ne!(ids.commit_sha(), ids.commit_sha());
    }

    #[test]
    fn test_uuid_container_id_prefix() {
        let ids = UuidIdProvider;

        assert!(ids.container_id().starts_with("caas-"));
    }

    #[test]
    fn test_sequence_ids_are_deterministic() {
        let a = SequenceIdProvider::new();
        let b = SequenceIdProvider::new();

        assert_eq!(a.container_id(), b.container_id());
        assert_eq!(a.commit_sha(), b.commit_sha());
    }

    #[test]
    fn test_sequence_commit_sha_looks_like_a_sha() {
        let ids = SequenceIdProvider::new();
        let sha = ids.commit_sha();

        assert_eq!(sha.len(), 40);
        assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
