//! Memory-bit transition functions.
//!
//! Ladder programs keep state in coils that read their own previous value
//! (`LD set / OR bit / ANDN reset / ST bit`).  Here the previous value is an
//! explicit argument and the next value is the return value.

/// Reset-dominant seal-in: `(set OR held) AND NOT reset`.
///
/// Used for the system run latch, where stop must win over a held start.
pub const fn seal_in(held: bool, set: bool, reset: bool) -> bool {
    (set || held) && !reset
}

/// Set-dominant latch: `set OR (held AND NOT reset)`.
///
/// Used for pump fault latches: a reset pressed while the fault condition is
/// still present leaves the latch set.
pub const fn set_dominant(held: bool, set: bool, reset: bool) -> bool {
    set || (held && !reset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_in_truth_table() {
        // (held, set, reset) -> next
        let cases = [
            (false, false, false, false),
            (false, true, false, true),
            (true, false, false, true),
            (true, true, false, true),
            (false, true, true, false),
            (true, false, true, false),
            (true, true, true, false),
            (false, false, true, false),
        ];
        for (held, set, reset, want) in cases {
            assert_eq!(seal_in(held, set, reset), want, "held={held} set={set} reset={reset}");
        }
    }

    #[test]
    fn set_wins_in_set_dominant_latch() {
        assert!(set_dominant(false, true, true));
        assert!(set_dominant(true, true, true));
        assert!(!set_dominant(true, false, true));
        assert!(set_dominant(true, false, false));
    }
}
