// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Async mutual exclusion per key.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async locks addressed by key.
///
/// Holders of different keys never wait on each other. Entries nobody holds
/// or waits for are dropped on the next acquisition.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    entries: Arc<Mutex<HashMap<K, Arc<Mutex<()>>>>>,
}

impl<K> Clone for KeyedLocks<K> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash> KeyedLocks<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lock of `key`. The lock is released when the guard drops.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let entry: Arc<Mutex<()>> = {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, m| Arc::strong_count(m) > 1);
            Arc::clone(entries.entry(key).or_default())
        };
        entry.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_waits() {
        let locks: KeyedLocks<i64> = KeyedLocks::new();
        let guard = locks.lock(1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.lock(1).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks: KeyedLocks<(i64, i64)> = KeyedLocks::new();
        let _first = locks.lock((1, 1)).await;

        tokio::time::timeout(Duration::from_secs(1), locks.lock((1, 2)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_released_entries_are_dropped() {
        let locks: KeyedLocks<i64> = KeyedLocks::new();
        drop(locks.lock(1).await);
        drop(locks.lock(2).await);

        let _held = locks.lock(3).await;
        assert_eq!(locks.tracked().await, 1);
    }
}
