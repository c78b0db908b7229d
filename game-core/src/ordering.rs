/// Accepts snapshots of one stream only in increasing sequence order.
///
/// Every poll is stamped with a number from a per-stream counter when it is
/// issued. A response that settles after a newer one has been accepted is
/// stale and must not replace it.
#[derive(Debug, Default, Clone)]
pub struct SequenceGate {
    last_accepted: Option<u64>,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records `sequence` when it is newer than anything
    /// accepted so far.
    pub fn accept(&mut self, sequence: u64) -> bool {
        match self.last_accepted {
            Some(last) if sequence <= last => false,
            _ => {
                self.last_accepted = Some(sequence);
                true
            }
        }
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_increasing_sequences() {
        let mut gate = SequenceGate::new();
        assert!(gate.accept(0));
        assert!(gate.accept(1));
        assert!(gate.accept(5));
        assert_eq!(gate.last_accepted(), Some(5));
    }

    #[test]
    fn test_rejects_late_and_duplicate_snapshots() {
        let mut gate = SequenceGate::new();
        assert!(gate.accept(3));
        assert!(!gate.accept(2));
        assert!(!gate.accept(3));
        assert_eq!(gate.last_accepted(), Some(3));
        assert!(gate.accept(4));
    }
}
