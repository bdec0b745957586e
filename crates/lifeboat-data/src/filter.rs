//! Conjunctive row filtering over the passenger table.

use crate::record::{PassengerClass, PassengerRecord, Port, Sex};

/// A set of optional column predicates combined with logical AND.
///
/// An absent predicate places no constraint on the rows. Age bounds are
/// inclusive; rows with an unknown age never satisfy an age bound, and rows
/// with an unknown port never satisfy an `embarked` predicate.
///
/// # Examples
///
/// ```
/// use lifeboat_data::{filter::PassengerFilter, record::{PassengerClass, Sex}};
///
/// let filter = PassengerFilter {
///     pclass: Some(PassengerClass::First),
///     sex: Some(Sex::Female),
///     ..PassengerFilter::default()
/// };
/// assert!(!filter.is_empty());
/// assert!(PassengerFilter::default().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassengerFilter {
    pub survived: Option<bool>,
    pub pclass: Option<PassengerClass>,
    pub sex: Option<Sex>,
    /// Inclusive lower bound on age
    pub age_min: Option<f64>,
    /// Inclusive upper bound on age
    pub age_max: Option<f64>,
    pub embarked: Option<Port>,
}

impl PassengerFilter {
    /// Returns `true` if no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if `record` satisfies every supplied predicate.
    #[must_use]
    pub fn matches(&self, record: &PassengerRecord) -> bool {
        fn check<T>(predicate: Option<T>, f: impl FnOnce(T) -> bool) -> bool {
            predicate.is_none_or(f)
        }

        check(self.survived, |survived| record.survived == survived)
            && check(self.pclass, |pclass| record.pclass == pclass)
            && check(self.sex, |sex| record.sex == sex)
            && check(self.age_min, |min| record.age.is_some_and(|age| age >= min))
            && check(self.age_max, |max| record.age.is_some_and(|age| age <= max))
            && check(self.embarked, |port| record.embarked == Some(port))
    }

    /// Returns the rows satisfying this filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, rows: &'a [PassengerRecord]) -> Vec<&'a PassengerRecord> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}
