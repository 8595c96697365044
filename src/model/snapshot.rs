use std::fmt;

/// One philosopher finishing one sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealEvent {
    pub philosopher: usize,
    /// Food eaten at this sitting (always at least 1).
    pub amount: u32,
    /// Quota left after the sitting, clamped at 0.
    pub remaining: u32,
}

/// Remaining quota of every philosopher, in index order.
///
/// Displays as the classic status line: `0 [50] 1 [47] 2 [50]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub quotas: Vec<u32>,
}

impl Snapshot {
    pub fn all_done(&self) -> bool {
        self.quotas.iter().all(|&q| q == 0)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, quota) in self.quotas.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{index} [{quota}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_format() {
        let snapshot = Snapshot {
            quotas: vec![50, 47, 0],
        };
        assert_eq!(snapshot.to_string(), "0 [50] 1 [47] 2 [0]");
        assert!(!snapshot.all_done());
        assert!(Snapshot { quotas: vec![0, 0] }.all_done());
    }
}
