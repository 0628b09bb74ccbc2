use std::collections::HashSet;
use std::fmt;

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Length of generated participant ids
pub const ID_LEN: usize = 20;

/// Server-assigned identifier of a connected client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hands out opaque ids, never reusing one that is still connected.
/// Released ids are forgotten, so the set only grows with live connections.
pub struct ParticipantIds {
    rng: ChaCha8Rng,
    live: HashSet<ParticipantId>,
}

impl ParticipantIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            live: HashSet::new(),
        }
    }

    pub fn allocate(&mut self) -> ParticipantId {
        loop {
            let raw: String = (&mut self.rng)
                .sample_iter(&Alphanumeric)
                .take(ID_LEN)
                .map(char::from)
                .collect();
            let id = ParticipantId(raw);
            if self.live.insert(id.clone()) {
                return id;
            }
        }
    }

    pub fn release(&mut self, id: &ParticipantId) {
        self.live.remove(id);
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_have_expected_shape() {
        let mut ids = ParticipantIds::new(7);
        let id = ids.allocate();
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = ParticipantIds::new(7);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.allocate()));
        }
        assert_eq!(ids.live_count(), 1000);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ParticipantIds::new(99);
        let mut b = ParticipantIds::new(99);
        for _ in 0..10 {
            assert_eq!(a.allocate(), b.allocate());
        }
    }

    #[test]
    fn live_ids_never_collide_across_release() {
        let mut ids = ParticipantIds::new(3);
        let kept: Vec<_> = (0..100).map(|_| ids.allocate()).collect();
        for _ in 0..500 {
            let id = ids.allocate();
            assert!(!kept.contains(&id));
            ids.release(&id);
        }
        assert_eq!(ids.live_count(), kept.len());
    }

    #[test]
    fn release_forgets_id() {
        let mut ids = ParticipantIds::new(1);
        let id = ids.allocate();
        ids.release(&id);
        assert_eq!(ids.live_count(), 0);
    }
}
