//! Display names handed out to accepted connections.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Name shown as the author of a client's messages (`User#<N>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("User#{}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide generator of unique display names.
///
/// Numbers start at 1, increase by one per call and are never reused, even
/// after the connection that received them is gone.
#[derive(Debug)]
pub struct DisplayNameFactory {
    next: AtomicU64,
}

impl DisplayNameFactory {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next name. Safe to call from concurrent accept paths.
    pub fn next(&self) -> DisplayName {
        DisplayName::from_sequence(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DisplayNameFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_start_at_one_and_increase() {
        // テスト項目: 表示名は User#1 から順に払い出される
        // given (前提条件):
        let factory = DisplayNameFactory::new();

        // when (操作):
        let first = factory.next();
        let second = factory.next();

        // then (期待する結果):
        assert_eq!(first.as_str(), "User#1");
        assert_eq!(second.as_str(), "User#2");
    }

    #[test]
    fn test_names_are_unique_under_concurrent_allocation() {
        // テスト項目: 複数スレッドから同時に払い出しても重複しない
        // given (前提条件):
        let factory = DisplayNameFactory::new();

        // when (操作):
        let names: Vec<DisplayName> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| (0..100).map(|_| factory.next()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        // then (期待する結果):
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), 800);
        assert_eq!(unique.len(), 800);
        assert_eq!(factory.next().as_str(), "User#801");
    }
}
