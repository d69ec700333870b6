//! Frequency ordering over the closed cadence set.

use crate::domain::Cadence;
use crate::error::EngineError;

/// Zero-based rank of a cadence: Daily=0, Monthly=1, Quarterly=2, Annual=3.
pub fn level_of(cadence: Cadence) -> usize {
    match cadence {
        Cadence::Daily => 0,
        Cadence::Monthly => 1,
        Cadence::Quarterly => 2,
        Cadence::Annual => 3,
    }
}

/// Inverse of [`level_of`].
pub fn cadence_of(level: usize) -> Result<Cadence, EngineError> {
    Cadence::ALL
        .get(level)
        .copied()
        .ok_or_else(|| EngineError::InvalidCadence(format!("level {level}")))
}

/// Whichever cadence has the higher level.
pub fn coarser_of(a: Cadence, b: Cadence) -> Cadence {
    if level_of(a) >= level_of(b) { a } else { b }
}

/// Coarsest cadence among `cadences`, or `None` if empty.
pub fn coarsest<I>(cadences: I) -> Option<Cadence>
where
    I: IntoIterator<Item = Cadence>,
{
    cadences.into_iter().reduce(coarser_of)
}

/// Number of periods between an observation and the same point one year earlier.
///
/// Daily data has no year-over-year window of its own and falls back to 1.
pub fn yoy_window(cadence: Cadence) -> usize {
    match cadence {
        Cadence::Monthly => 12,
        Cadence::Quarterly => 4,
        Cadence::Annual | Cadence::Daily => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_cadence() -> impl Strategy<Value = Cadence> {
        prop::sample::select(Cadence::ALL.to_vec())
    }

    #[test]
    fn levels_follow_granularity() {
        assert!(level_of(Cadence::Daily) < level_of(Cadence::Monthly));
        assert!(level_of(Cadence::Monthly) < level_of(Cadence::Quarterly));
        assert!(level_of(Cadence::Quarterly) < level_of(Cadence::Annual));
        assert!(matches!(cadence_of(4), Err(EngineError::InvalidCadence(_))));
    }

    #[test]
    fn coarsest_of_group() {
        let got = coarsest([Cadence::Monthly, Cadence::Quarterly, Cadence::Daily]);
        assert_eq!(got, Some(Cadence::Quarterly));
        assert_eq!(coarsest(Vec::<Cadence>::new()), None);
    }

    #[test]
    fn yoy_windows() {
        assert_eq!(yoy_window(Cadence::Monthly), 12);
        assert_eq!(yoy_window(Cadence::Quarterly), 4);
        assert_eq!(yoy_window(Cadence::Annual), 1);
    }

    proptest! {
        #[test]
        fn level_round_trips(c in any_cadence()) {
            prop_assert_eq!(cadence_of(level_of(c)).unwrap(), c);
        }

        #[test]
        fn coarser_of_is_commutative_max(a in any_cadence(), b in any_cadence()) {
            prop_assert_eq!(coarser_of(a, b), coarser_of(b, a));
            prop_assert_eq!(level_of(coarser_of(a, b)), level_of(a).max(level_of(b)));
        }
    }
}
