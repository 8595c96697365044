//! # Fork Ring
//!
//! Builds the table: N forks, and for every philosopher the two forks it sits
//! between, in the order it reaches for them.
//!
//! Fork `i` lies between philosopher `i` and philosopher `(i + 1) % n`, so
//! philosopher `i` eats with fork `i` and fork `(i + n - 1) % n`. Each fork is
//! created once and the same [`SharedFork`] is handed to both neighbours.
//!
//! The [`ForkOrdering`] only decides which fork is tried first. Freedom from
//! deadlock comes from the philosopher dropping its first fork whenever the
//! second is busy, so either ordering is safe.

use crate::framework::{AtomicFork, FileFork, ForkError, SharedFork};
use crate::lifecycle::DiningError;
use crate::model::ForkBackend;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Which fork a philosopher reaches for first.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForkOrdering {
    /// Lower-indexed fork first. Philosopher 0 ends up reaching the other way
    /// round from everyone else.
    #[default]
    LowerIndexFirst,
    /// Every philosopher takes its own fork `i` first. Fully symmetric.
    OwnFirst,
}

/// The two forks assigned to one philosopher.
#[derive(Clone)]
pub struct Seat {
    pub philosopher: usize,
    pub first: SharedFork,
    pub second: SharedFork,
}

impl Seat {
    pub fn new(philosopher: usize, first: SharedFork, second: SharedFork) -> Self {
        Self {
            philosopher,
            first,
            second,
        }
    }

    /// `(first, second)` fork indices.
    pub fn fork_indices(&self) -> (usize, usize) {
        (self.first.index(), self.second.index())
    }
}

impl fmt::Debug for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seat")
            .field("philosopher", &self.philosopher)
            .field("first", &self.first.index())
            .field("second", &self.second.index())
            .finish()
    }
}

/// All forks on the table plus every philosopher's seat.
pub struct ForkRing {
    forks: Vec<SharedFork>,
    seats: Vec<Seat>,
}

impl ForkRing {
    /// Builds a ring of `n` forks, creating each fork with `make_fork`.
    pub fn build<F>(n: usize, ordering: ForkOrdering, mut make_fork: F) -> Result<Self, DiningError>
    where
        F: FnMut(usize) -> Result<SharedFork, ForkError>,
    {
        if n < 2 {
            return Err(DiningError::Configuration(format!(
                "a ring needs at least 2 forks, got {n}"
            )));
        }

        let forks = (0..n).map(&mut make_fork).collect::<Result<Vec<_>, _>>()?;

        let seats = (0..n)
            .map(|philosopher| {
                let (first, second) = assignment(n, philosopher, ordering);
                Seat::new(
                    philosopher,
                    Arc::clone(&forks[first]),
                    Arc::clone(&forks[second]),
                )
            })
            .collect();

        tracing::debug!(n, ?ordering, "Fork ring built");
        Ok(Self { forks, seats })
    }

    pub fn in_memory(n: usize, ordering: ForkOrdering) -> Result<Self, DiningError> {
        Self::build(n, ordering, |index| Ok(AtomicFork::shared(index)))
    }

    pub fn from_backend(
        n: usize,
        ordering: ForkOrdering,
        backend: &ForkBackend,
    ) -> Result<Self, DiningError> {
        match backend {
            ForkBackend::Memory => Self::in_memory(n, ordering),
            ForkBackend::File { dir } => Self::build(n, ordering, |index| {
                Ok(Arc::new(FileFork::open(dir, index)?) as SharedFork)
            }),
        }
    }

    pub fn forks(&self) -> &[SharedFork] {
        &self.forks
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn into_seats(self) -> Vec<Seat> {
        self.seats
    }
}

/// `(first, second)` fork indices for `philosopher` at a table of `n`.
pub fn assignment(n: usize, philosopher: usize, ordering: ForkOrdering) -> (usize, usize) {
    let own = philosopher;
    let neighbour = (philosopher + n - 1) % n;
    match ordering {
        ForkOrdering::OwnFirst => (own, neighbour),
        ForkOrdering::LowerIndexFirst => (own.min(neighbour), own.max(neighbour)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forks_of(ring: &ForkRing, philosopher: usize) -> [usize; 2] {
        let (a, b) = ring.seats()[philosopher].fork_indices();
        let mut pair = [a, b];
        pair.sort_unstable();
        pair
    }

    #[test]
    fn test_each_fork_shared_by_adjacent_pair() {
        let n = 5;
        let ring = ForkRing::in_memory(n, ForkOrdering::default()).unwrap();
        assert_eq!(ring.forks().len(), n);
        assert_eq!(ring.seats().len(), n);

        for fork in 0..n {
            let users: Vec<usize> = (0..n)
                .filter(|&p| forks_of(&ring, p).contains(&fork))
                .collect();
            let mut expected = vec![fork, (fork + 1) % n];
            expected.sort_unstable();
            assert_eq!(users, expected, "fork {fork}");
        }
    }

    #[test]
    fn test_forks_shared_by_reference() {
        let ring = ForkRing::in_memory(4, ForkOrdering::OwnFirst).unwrap();
        for (i, seat) in ring.seats().iter().enumerate() {
            assert!(Arc::ptr_eq(&seat.first, &ring.forks()[i]));
            let next = &ring.seats()[(i + 1) % 4];
            assert!(Arc::ptr_eq(&ring.forks()[i], &next.second));
        }
    }

    #[test]
    fn test_lower_index_first_breaks_symmetry() {
        let n = 5;
        let ring = ForkRing::in_memory(n, ForkOrdering::LowerIndexFirst).unwrap();
        assert_eq!(ring.seats()[0].fork_indices(), (0, 4));
        for p in 1..n {
            assert_eq!(ring.seats()[p].fork_indices(), (p - 1, p));
        }
    }

    #[test]
    fn test_own_first_is_symmetric() {
        assert_eq!(assignment(5, 0, ForkOrdering::OwnFirst), (0, 4));
        assert_eq!(assignment(5, 3, ForkOrdering::OwnFirst), (3, 2));
    }

    #[test]
    fn test_two_philosophers_get_distinct_forks() {
        for ordering in [ForkOrdering::LowerIndexFirst, ForkOrdering::OwnFirst] {
            let ring = ForkRing::in_memory(2, ordering).unwrap();
            for seat in ring.seats() {
                let (first, second) = seat.fork_indices();
                assert_ne!(first, second);
                assert!(!Arc::ptr_eq(&seat.first, &seat.second));
            }
        }
    }

    #[test]
    fn test_rejects_tiny_ring() {
        assert!(matches!(
            ForkRing::in_memory(1, ForkOrdering::default()),
            Err(DiningError::Configuration(_))
        ));
        assert!(ForkRing::in_memory(0, ForkOrdering::default()).is_err());
    }

    #[test]
    fn test_backend_failure_propagates() {
        let result = ForkRing::build(3, ForkOrdering::default(), |index| {
            if index == 2 {
                Err(ForkError::Unavailable(index))
            } else {
                Ok(AtomicFork::shared(index))
            }
        });
        assert!(matches!(result, Err(DiningError::Fork(ForkError::Unavailable(2)))));
    }

    #[test]
    fn test_file_backend_builds_lock_files_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ForkBackend::File {
            dir: dir.path().to_path_buf(),
        };
        let ring = ForkRing::from_backend(3, ForkOrdering::default(), &backend).unwrap();
        assert_eq!(ring.forks().len(), 3);
        assert_eq!(ring.forks()[2].index(), 2);
    }
}
