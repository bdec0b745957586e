//! Grouped survival statistics.
//!
//! An aggregation assigns every row to at most one group of a fixed, ordered
//! group set (a [`Partition`]) and counts survivors per group. Groups come
//! out in the partition's order no matter how the rows are ordered, and a
//! group with no rows is still reported (with a zero survival rate).
//!
//! # Example
//!
//! ```
//! use lifeboat_data::aggregate::{self, Grouping};
//! # use lifeboat_data::record::PassengerRecord;
//! # let rows: Vec<PassengerRecord> = vec![];
//!
//! let stats = aggregate::aggregate(&rows, &Grouping::Class);
//! assert_eq!(stats.len(), 3);
//! assert_eq!(stats[0].label, "First Class");
//! assert_eq!(stats[0].survival_rate, 0.0);
//! ```

use std::str::FromStr;

use lifeboat_stats::ratio;
use serde::Serialize;

use crate::record::{ParseCategoryError, PassengerClass, PassengerRecord, Port, Sex};

/// Identity of one group in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    /// Machine-readable key (e.g. `1`, `female`, `0-10`, `S`)
    pub key: &'static str,
    /// Human-readable name (e.g. `First Class`, `Southampton`)
    pub label: &'static str,
}

impl Group {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Maps rows onto a fixed, ordered set of groups.
pub trait Partition {
    /// The groups, in output order.
    fn groups(&self) -> &'static [Group];

    /// Index into [`groups`](Self::groups) for `record`, or `None` if the
    /// record belongs to no group.
    fn group_of(&self, record: &PassengerRecord) -> Option<usize>;
}

/// Survival counts for a single group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSurvival {
    pub key: &'static str,
    pub label: &'static str,
    pub survived: usize,
    pub died: usize,
    pub total: usize,
    /// `survived / total` in percent, rounded to two decimals; `0` for empty groups
    pub survival_rate: f64,
}

impl GroupSurvival {
    fn from_counts(group: Group, survived: usize, total: usize) -> Self {
        Self {
            key: group.key,
            label: group.label,
            survived,
            died: total - survived,
            total,
            survival_rate: ratio::percentage(survived, total),
        }
    }
}

/// Computes per-group survival counts, in the partition's group order.
pub fn aggregate<'a, I, P>(rows: I, partition: &P) -> Vec<GroupSurvival>
where
    I: IntoIterator<Item = &'a PassengerRecord>,
    P: Partition + ?Sized,
{
    let groups = partition.groups();
    let mut counts = vec![(0, 0); groups.len()];
    for row in rows {
        if let Some(index) = partition.group_of(row) {
            let (survived, total) = &mut counts[index];
            *total += 1;
            if row.survived {
                *survived += 1;
            }
        }
    }
    groups
        .iter()
        .zip(counts)
        .map(|(group, (survived, total))| GroupSurvival::from_counts(*group, survived, total))
        .collect()
}

/// Overall survival of a row sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivalSummary {
    pub survived: usize,
    pub died: usize,
    pub total: usize,
    pub survival_rate: f64,
}

impl SurvivalSummary {
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a PassengerRecord>,
    {
        let (survived, total) = rows.into_iter().fold((0, 0), |(survived, total), row| {
            (survived + usize::from(row.survived), total + 1)
        });
        Self {
            survived,
            died: total - survived,
            total,
            survival_rate: ratio::percentage(survived, total),
        }
    }
}

const CLASS_GROUPS: [Group; 3] = [
    Group::new("1", PassengerClass::First.display_name()),
    Group::new("2", PassengerClass::Second.display_name()),
    Group::new("3", PassengerClass::Third.display_name()),
];

const GENDER_GROUPS: [Group; 2] = [
    Group::new(Sex::Female.as_str(), Sex::Female.display_name()),
    Group::new(Sex::Male.as_str(), Sex::Male.display_name()),
];

const PORT_GROUPS: [Group; 3] = [
    Group::new(
        Port::Southampton.code(),
        Port::Southampton.display_name(),
    ),
    Group::new(Port::Cherbourg.code(), Port::Cherbourg.display_name()),
    Group::new(Port::Queenstown.code(), Port::Queenstown.display_name()),
];

const AGE_GROUPS: [Group; 7] = [
    Group::new("0-10", "0-10"),
    Group::new("11-20", "11-20"),
    Group::new("21-30", "21-30"),
    Group::new("31-40", "31-40"),
    Group::new("41-50", "41-50"),
    Group::new("51-60", "51-60"),
    Group::new("61+", "61+"),
];

/// Inclusive upper bound of each age group; each group starts just above the previous bound.
const AGE_GROUP_UPPER_BOUNDS: [f64; 7] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 100.0];

const FAMILY_SIZE_GROUPS: [Group; 3] = [
    Group::new("alone", "Alone"),
    Group::new("small", "Small (2-4)"),
    Group::new("large", "Large (5+)"),
];

/// The built-in partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Ticket class 1, 2, 3
    Class,
    /// Female, then male
    Gender,
    /// Age buckets `0-10`, `11-20`, ..., `61+`; unknown ages are excluded
    AgeGroup,
    /// Southampton, Cherbourg, Queenstown; unknown ports are excluded
    Port,
    /// Travelling alone, with 2-4 family members, or with 5 or more
    FamilySize,
}

impl Grouping {
    pub const ALL: [Self; 5] = [
        Self::Class,
        Self::Gender,
        Self::AgeGroup,
        Self::Port,
        Self::FamilySize,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Gender => "gender",
            Self::AgeGroup => "age",
            Self::Port => "embarked",
            Self::FamilySize => "family",
        }
    }
}

impl FromStr for Grouping {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|grouping| grouping.name() == s)
            .ok_or_else(|| ParseCategoryError {
                field: "grouping",
                value: s.to_owned(),
            })
    }
}

impl Partition for Grouping {
    fn groups(&self) -> &'static [Group] {
        match self {
            Self::Class => &CLASS_GROUPS,
            Self::Gender => &GENDER_GROUPS,
            Self::AgeGroup => &AGE_GROUPS,
            Self::Port => &PORT_GROUPS,
            Self::FamilySize => &FAMILY_SIZE_GROUPS,
        }
    }

    fn group_of(&self, record: &PassengerRecord) -> Option<usize> {
        match self {
            Self::Class => PassengerClass::ALL.iter().position(|c| *c == record.pclass),
            Self::Gender => Sex::ALL.iter().position(|s| *s == record.sex),
            Self::AgeGroup => age_group_index(record.age?),
            Self::Port => {
                let port = record.embarked?;
                Port::ALL.iter().position(|p| *p == port)
            }
            Self::FamilySize => Some(match record.family_size() {
                0 | 1 => 0,
                2..=4 => 1,
                _ => 2,
            }),
        }
    }
}

fn age_group_index(age: f64) -> Option<usize> {
    if age.is_nan() || age < 0.0 {
        return None;
    }
    AGE_GROUP_UPPER_BOUNDS
        .iter()
        .position(|upper| age <= *upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Dataset, tests::passenger};

    fn class_rows(
        class: PassengerClass,
        total: u32,
        survived: u32,
        first_id: u32,
    ) -> Vec<PassengerRecord> {
        (0..total)
            .map(|i| {
                let mut row = passenger(first_id + i);
                row.pclass = class;
                row.survived = i < survived;
                row
            })
            .collect()
    }

    #[test]
    fn test_class_aggregation_example() {
        let mut rows = class_rows(PassengerClass::Second, 5, 2, 100);
        rows.extend(class_rows(PassengerClass::First, 10, 7, 1));

        let stats = aggregate(&rows, &Grouping::Class);
        let summary = stats
            .iter()
            .map(|s| (s.label, s.survived, s.died, s.total, s.survival_rate))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                ("First Class", 7, 3, 10, 70.0),
                ("Second Class", 2, 3, 5, 40.0),
                ("Third Class", 0, 0, 0, 0.0),
            ]
        );
    }

    #[test]
    fn test_gender_order_is_female_then_male() {
        let mut rows = vec![passenger(1), passenger(2)];
        rows[1].sex = Sex::Female;
        rows[1].survived = true;
        let stats = aggregate(&rows, &Grouping::Gender);
        assert_eq!(stats[0].key, "female");
        assert_eq!(stats[0].label, "Female");
        assert_eq!(stats[0].survival_rate, 100.0);
        assert_eq!(stats[1].key, "male");
        assert_eq!(stats[1].survival_rate, 0.0);
    }

    #[test]
    fn test_age_group_boundaries() {
        assert_eq!(age_group_index(0.0), Some(0));
        assert_eq!(age_group_index(10.0), Some(0));
        assert_eq!(age_group_index(10.5), Some(1));
        assert_eq!(age_group_index(20.0), Some(1));
        assert_eq!(age_group_index(60.5), Some(6));
        assert_eq!(age_group_index(100.0), Some(6));
        assert_eq!(age_group_index(100.5), None);
        assert_eq!(age_group_index(f64::NAN), None);
    }

    #[test]
    fn test_unknown_age_and_port_are_excluded() {
        let mut rows = (1..=4).map(passenger).collect::<Vec<_>>();
        rows[0].age = None;
        rows[1].embarked = None;
        rows[2].age = Some(10.0);

        let by_age = aggregate(&rows, &Grouping::AgeGroup);
        assert_eq!(by_age.iter().map(|s| s.total).sum::<usize>(), 3);
        assert_eq!(by_age[0].total, 1);
        assert_eq!(by_age[2].total, 2);

        let by_port = aggregate(&rows, &Grouping::Port);
        assert_eq!(by_port.iter().map(|s| s.total).sum::<usize>(), 3);
        let keys = by_port.iter().map(|s| s.key).collect::<Vec<_>>();
        assert_eq!(keys, ["S", "C", "Q"]);
        assert_eq!(by_port[0].label, "Southampton");
    }

    #[test]
    fn test_counts_are_consistent_for_every_grouping() {
        let mut rows = (1..=30).map(passenger).collect::<Vec<_>>();
        for (i, row) in rows.iter_mut().enumerate() {
            row.survived = i % 3 == 0;
            row.pclass = PassengerClass::ALL[i % 3];
            row.sex = Sex::ALL[i % 2];
            row.age = (i % 7 != 0).then_some(i as f64 * 3.5);
            row.embarked = Port::ALL.get(i % 4).copied();
            row.sibsp = (i % 5) as u32;
        }
        for grouping in Grouping::ALL {
            let stats = aggregate(&rows, &grouping);
            assert_eq!(stats.len(), grouping.groups().len());
            for s in &stats {
                assert_eq!(s.survived + s.died, s.total);
                assert!((0.0..=100.0).contains(&s.survival_rate));
            }
            assert!(stats.iter().map(|s| s.total).sum::<usize>() <= rows.len());
        }
        let by_class = aggregate(&rows, &Grouping::Class);
        assert_eq!(by_class.iter().map(|s| s.total).sum::<usize>(), rows.len());
    }

    #[test]
    fn test_family_size_buckets() {
        let mut rows = (1..=3).map(passenger).collect::<Vec<_>>();
        rows[1].sibsp = 1;
        rows[2].sibsp = 2;
        rows[2].parch = 2;
        let stats = aggregate(&rows, &Grouping::FamilySize);
        assert_eq!(
            stats.iter().map(|s| s.total).collect::<Vec<_>>(),
            [1, 1, 1]
        );
    }

    #[test]
    fn test_huge_family_counts_fall_in_largest_bucket() {
        let mut row = passenger(1);
        row.sibsp = u32::MAX;
        row.parch = 1;
        let dataset = Dataset::from_records(vec![row]).unwrap();
        let stats = aggregate(dataset.rows(), &Grouping::FamilySize);
        assert_eq!(
            stats.iter().map(|s| s.total).collect::<Vec<_>>(),
            [0, 0, 1]
        );
    }

    #[test]
    fn test_survival_summary() {
        let mut rows = (1..=3).map(passenger).collect::<Vec<_>>();
        rows[0].survived = true;
        let summary = SurvivalSummary::from_rows(&rows);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.survived, 1);
        assert_eq!(summary.died, 2);
        assert_eq!(summary.survival_rate, 33.33);
        assert_eq!(SurvivalSummary::from_rows(&[]).survival_rate, 0.0);
    }

    #[test]
    fn test_grouping_names_parse() {
        for grouping in Grouping::ALL {
            assert_eq!(grouping.name().parse::<Grouping>(), Ok(grouping));
        }
        assert!("deck".parse::<Grouping>().is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let stats = aggregate(&[passenger(1)], &Grouping::Class);
        let json = serde_json::to_value(&stats[2]).unwrap();
        assert_eq!(json["survivalRate"], 0.0);
        assert_eq!(json["label"], "Third Class");
    }
}
