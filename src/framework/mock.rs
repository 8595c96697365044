//! # Mock Forks & Testing Guide
//!
//! [`ScriptedFork`] implements [`LockHandle`] the same way the production
//! forks do, but lets a test decide what each `try_acquire` call answers and
//! counts everything that happens to the fork.
//!
//! ## When to use ScriptedFork vs AtomicFork
//!
//! | Feature | ScriptedFork | AtomicFork |
//! |---------|--------------|------------|
//! | **Fault injection** | Easy (`return_fault`) | Never faults |
//! | **Starvation scenarios** | `always_busy()` | Needs a rival holder |
//! | **Instrumentation** | Attempts, grants, releases, spurious releases | `is_held` only |
//!
//! ## Example
//!
//! ```rust
//! use dining_philosophers::framework::mock::ScriptedFork;
//! use dining_philosophers::framework::LockHandle;
//!
//! #[tokio::main]
//! async fn main() {
//!     let fork = ScriptedFork::new(0);
//!     fork.expect_try_acquire().times(2).return_busy();
//!     fork.expect_try_acquire().return_fault();
//!
//!     assert!(!fork.try_acquire().await.unwrap());
//!     assert!(!fork.try_acquire().await.unwrap());
//!     assert!(fork.try_acquire().await.is_err());
//!     // Script exhausted: behaves like a real fork again
//!     assert!(fork.try_acquire().await.unwrap());
//!
//!     fork.verify();
//! }
//! ```
//!
//! ## Spurious releases
//!
//! Forks carry no owner token, so a philosopher that released a fork it never
//! acquired would silently hand its neighbour's fork to a third party.
//! [`ScriptedFork::spurious_releases`] counts releases of a fork that was not
//! held. A correct protocol keeps it at zero.

use crate::framework::error::ForkError;
use crate::framework::fork::LockHandle;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// What a single `try_acquire` call answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Behave like a real fork: grant iff currently free.
    Real,
    /// Report the fork as held, whatever its real state.
    Busy,
    /// Report a backend fault.
    Fault,
}

/// A fork whose acquisition answers are scripted by the test.
#[derive(Debug)]
pub struct ScriptedFork {
    index: usize,
    held: AtomicBool,
    script: Arc<Mutex<VecDeque<Answer>>>,
    fallback: Answer,
    attempts: AtomicUsize,
    grants: AtomicUsize,
    releases: AtomicUsize,
    spurious_releases: AtomicUsize,
}

impl ScriptedFork {
    /// A fork that behaves like a real one once its script runs out.
    pub fn new(index: usize) -> Self {
        Self::with_fallback(index, Answer::Real)
    }

    /// A fork that never grants acquisition.
    pub fn always_busy(index: usize) -> Self {
        Self::with_fallback(index, Answer::Busy)
    }

    /// A fork whose backend faults on every acquisition.
    pub fn always_faulty(index: usize) -> Self {
        Self::with_fallback(index, Answer::Fault)
    }

    pub fn with_fallback(index: usize, fallback: Answer) -> Self {
        Self {
            index,
            held: AtomicBool::new(false),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            attempts: AtomicUsize::new(0),
            grants: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            spurious_releases: AtomicUsize::new(0),
        }
    }

    /// Queue answers for upcoming `try_acquire` calls.
    pub fn expect_try_acquire(&self) -> AcquireExpectationBuilder {
        AcquireExpectationBuilder {
            times: 1,
            script: self.script.clone(),
        }
    }

    /// Panics if scripted answers remain unused.
    pub fn verify(&self) {
        let script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if !script.is_empty() {
            panic!(
                "Fork {}: not all expectations were met. {} remaining",
                self.index,
                script.len()
            );
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn grants(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn spurious_releases(&self) -> usize {
        self.spurious_releases.load(Ordering::SeqCst)
    }

    fn next_answer(&self) -> Answer {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        script.pop_front().unwrap_or(self.fallback)
    }
}

#[async_trait]
impl LockHandle for ScriptedFork {
    fn index(&self) -> usize {
        self.index
    }

    async fn try_acquire(&self) -> Result<bool, ForkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.next_answer() {
            Answer::Real => {
                let granted = self
                    .held
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if granted {
                    self.grants.fetch_add(1, Ordering::SeqCst);
                }
                Ok(granted)
            }
            Answer::Busy => Ok(false),
            Answer::Fault => Err(ForkError::Unavailable(self.index)),
        }
    }

    fn release(&self) -> Result<(), ForkError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if !self.held.swap(false, Ordering::AcqRel) {
            self.spurious_releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Builder for `try_acquire` expectations.
pub struct AcquireExpectationBuilder {
    times: usize,
    script: Arc<Mutex<VecDeque<Answer>>>,
}

impl AcquireExpectationBuilder {
    /// Repeat the answer for `n` consecutive calls.
    pub fn times(mut self, n: usize) -> Self {
        self.times = n;
        self
    }

    pub fn return_real(self) {
        self.push(Answer::Real);
    }

    pub fn return_busy(self) {
        self.push(Answer::Busy);
    }

    pub fn return_fault(self) {
        self.push(Answer::Fault);
    }

    fn push(self, answer: Answer) {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        script.extend(std::iter::repeat(answer).take(self.times));
    }
}
