use std::collections::HashMap;
use std::sync::Mutex;

/// Replay guard: remembers which nonces each signer has used inside the
/// freshness window.
///
/// `check_and_insert` is a single atomic operation under one lock, so two
/// concurrent submissions of the same nonce cannot both pass verification.
/// Entries age out with the window, which keeps the cache bounded without a
/// background sweeper.
pub struct NonceCache {
    window_secs: f64,
    seen: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl NonceCache {
    pub fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record `nonce` for `signer` at time `now`. Returns false when the
    /// nonce was already seen inside the window.
    pub fn check_and_insert(&self, signer: &str, nonce: &str, now: f64) -> bool {
        let mut seen = self.seen.lock().expect("nonce cache lock poisoned");
        let nonces = seen.entry(signer.to_owned()).or_default();

        let window = self.window_secs;
        nonces.retain(|_, first_seen| now - *first_seen <= window);

        if nonces.contains_key(nonce) {
            return false;
        }
        nonces.insert(nonce.to_owned(), now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fresh_nonce_is_accepted_once() {
        let cache = NonceCache::new(300.0);

        assert!(cache.check_and_insert("signer", "n-1", 100.0));
        assert!(!cache.check_and_insert("signer", "n-1", 150.0));
    }

    #[test]
    fn nonces_age_out_with_the_window() {
        let cache = NonceCache::new(300.0);

        assert!(cache.check_and_insert("signer", "n-1", 100.0));
        // Well past the window the entry has been evicted; a stale-timestamp
        // check upstream is what actually blocks this request.
        assert!(cache.check_and_insert("signer", "n-1", 500.0));
    }

    #[test]
    fn signers_do_not_share_nonce_space() {
        let cache = NonceCache::new(300.0);

        assert!(cache.check_and_insert("alice", "n-1", 100.0));
        assert!(cache.check_and_insert("bob", "n-1", 100.0));
        assert!(!cache.check_and_insert("alice", "n-1", 100.0));
    }

    #[test]
    fn concurrent_same_nonce_has_one_winner() {
        let cache = Arc::new(NonceCache::new(300.0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.check_and_insert("signer", "n-race", 100.0))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
