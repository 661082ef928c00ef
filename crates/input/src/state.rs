use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MoveAction;

/// Which observed keys are withheld from the rest of the application
/// (the UI overlay) once the tracker has recorded them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressPolicy {
    /// Every key the window observes is consumed, bound or not.
    #[default]
    AllKeys,
    /// Only keys with a movement action are consumed.
    MappedOnly,
}

/// What the caller should do with a key event after the tracker saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Default handling is suppressed; do not forward the event.
    Suppressed,
    /// Forward the event to the next handler.
    PassThrough,
}

/// Held/released state per lowercase key identifier.
///
/// A `BTreeMap` keeps iteration in identifier order, which is the order the
/// movement mapper applies simultaneously held actions.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: BTreeMap<String, bool>,
    policy: SuppressPolicy,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SuppressPolicy) -> Self {
        Self {
            keys: BTreeMap::new(),
            policy,
        }
    }

    /// Record a key-down. Auto-repeat presses are no-ops on the map.
    pub fn key_down(&mut self, key: &str) -> KeyDisposition {
        self.record(key, true)
    }

    /// Record a key-up.
    pub fn key_up(&mut self, key: &str) -> KeyDisposition {
        self.record(key, false)
    }

    fn record(&mut self, key: &str, pressed: bool) -> KeyDisposition {
        let key = crate::normalize_key(key);
        let disposition = self.disposition(&key);
        let previous = self.keys.insert(key, pressed);
        if previous != Some(pressed) {
            tracing::trace!(pressed, ?disposition, "key state changed");
        }
        disposition
    }

    fn disposition(&self, key: &str) -> KeyDisposition {
        match self.policy {
            SuppressPolicy::AllKeys => KeyDisposition::Suppressed,
            SuppressPolicy::MappedOnly if MoveAction::from_key(key).is_some() => {
                KeyDisposition::Suppressed
            }
            SuppressPolicy::MappedOnly => KeyDisposition::PassThrough,
        }
    }

    /// Whether a key is currently held (case-insensitive). Unseen keys are not held.
    pub fn is_held(&self, key: &str) -> bool {
        self.keys
            .get(&crate::normalize_key(key))
            .copied()
            .unwrap_or(false)
    }

    /// Identifiers of every key currently marked held, in identifier order.
    pub fn held(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|(_, pressed)| **pressed)
            .map(|(key, _)| key.as_str())
    }

    /// Actions bound to the held keys, in identifier order.
    pub fn held_actions(&self) -> impl Iterator<Item = MoveAction> + '_ {
        self.held().filter_map(MoveAction::from_key)
    }

    /// Number of distinct keys ever observed.
    pub fn observed_len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let input = InputState::new();
        assert_eq!(input.observed_len(), 0);
        assert!(!input.is_held("w"));
        assert_eq!(input.held().count(), 0);
    }

    /// Small linear congruential generator so sequences are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    #[test]
    fn last_event_wins() {
        const KEYS: [&str; 6] = ["w", "A", "s", "arrowup", "Q", "tab"];

        for seed in 0..64u64 {
            let mut rng = Lcg(seed);
            let mut input = InputState::new();
            let mut expected = std::collections::BTreeMap::new();
            let len = 1 + rng.next() % 40;

            for _ in 0..len {
                let key = KEYS[(rng.next() % KEYS.len() as u64) as usize];
                let pressed = rng.next() % 2 == 0;
                if pressed {
                    input.key_down(key);
                } else {
                    input.key_up(key);
                }
                expected.insert(key.to_ascii_lowercase(), pressed);
            }

            assert_eq!(input.observed_len(), expected.len(), "seed {seed}");
            for key in KEYS {
                let want = expected
                    .get(&key.to_ascii_lowercase())
                    .copied()
                    .unwrap_or(false);
                assert_eq!(input.is_held(key), want, "seed {seed} key {key}");
            }
            let held: Vec<_> = expected
                .iter()
                .filter(|(_, pressed)| **pressed)
                .map(|(k, _)| k.as_str())
                .collect();
            assert_eq!(input.held().collect::<Vec<_>>(), held, "seed {seed}");
        }
    }

    #[test]
    fn repeated_presses_and_releases_collapse() {
        let mut input = InputState::new();
        for _ in 0..3 {
            input.key_down("w");
        }
        input.key_up("a");
        input.key_up("a");
        assert!(input.is_held("w"));
        assert!(!input.is_held("a"));
        assert_eq!(input.observed_len(), 2);
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        let mut input = InputState::new();
        input.key_down("W");
        assert!(input.is_held("w"));
        input.key_up("w");
        assert!(!input.is_held("W"));

        input.key_down("ArrowUp");
        assert_eq!(input.held().collect::<Vec<_>>(), vec!["arrowup"]);
    }

    #[test]
    fn held_actions_skip_unbound_keys() {
        let mut input = InputState::new();
        input.key_down("x");
        input.key_down("q");
        input.key_down("w");
        let actions: Vec<_> = input.held_actions().collect();
        assert_eq!(actions, vec![MoveAction::YawLeft, MoveAction::Forward]);
    }

    #[test]
    fn missed_key_up_leaves_key_held() {
        let mut input = InputState::new();
        input.key_down("s");
        // Focus loss: no key-up is ever delivered.
        assert!(input.is_held("s"));
        assert_eq!(input.held_actions().count(), 1);
    }

    #[test]
    fn all_keys_policy_suppresses_everything() {
        let mut input = InputState::new();
        assert_eq!(input.key_down("w"), KeyDisposition::Suppressed);
        assert_eq!(input.key_down("f5"), KeyDisposition::Suppressed);
        assert_eq!(input.key_up("tab"), KeyDisposition::Suppressed);
    }

    #[test]
    fn mapped_only_policy_passes_unbound_keys() {
        let mut input = InputState::with_policy(SuppressPolicy::MappedOnly);
        assert_eq!(input.key_down("E"), KeyDisposition::Suppressed);
        assert_eq!(input.key_down("tab"), KeyDisposition::PassThrough);
        // Unbound keys are still tracked.
        assert!(input.is_held("tab"));
    }
}
