use std::fmt;

/// Where a philosopher is in its think / acquire / eat cycle.
///
/// `Eating` is the only state in which forks are held (both of them).
/// `AttemptingAcquire` holds at most one, and only between its two
/// `try_acquire` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhilosopherState {
    Thinking,
    AttemptingAcquire,
    Eating,
    Done,
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhilosopherState::Thinking => "thinking",
            PhilosopherState::AttemptingAcquire => "attempting_acquire",
            PhilosopherState::Eating => "eating",
            PhilosopherState::Done => "done",
        };
        f.write_str(name)
    }
}
