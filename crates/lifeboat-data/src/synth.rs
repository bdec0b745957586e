//! Seeded synthetic passenger table for first-run bootstrapping.
//!
//! The generator draws every column independently from fixed distributions and
//! then derives survival from a chain of adjustments (class, then sex, then
//! young age), where each applicable adjustment replaces the previous survival
//! probability. The resulting joint distribution is a fixture, not a model of
//! the historical data.
//!
//! The same [`SyntheticConfig`] always produces the same table.

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, weighted::WeightedIndex},
    seq::index,
};
use rand_distr::{Exp, Normal};
use rand_pcg::Pcg32;

use crate::{
    record::{PassengerClass, PassengerRecord, Port, Sex},
    store::{Dataset, LoadDatasetError},
};

const CLASS_WEIGHTS: [f64; 3] = [0.2, 0.3, 0.5];
const SIBSP_WEIGHTS: [f64; 9] = [0.7, 0.15, 0.05, 0.05, 0.02, 0.01, 0.01, 0.005, 0.005];
const PARCH_WEIGHTS: [f64; 7] = [0.7, 0.15, 0.05, 0.05, 0.02, 0.02, 0.01];
/// Weights for S, C, Q and unknown.
const PORT_WEIGHTS: [f64; 4] = [0.7, 0.2, 0.09, 0.01];

const AGE_MEAN: f64 = 30.0;
const AGE_STD_DEV: f64 = 14.0;
const MISSING_AGE_RATIO: f64 = 0.1;
const MEAN_FARE: f64 = 30.0;
const CABIN_PROBABILITY: f64 = 0.2;

const CHILD_AGE: f64 = 10.0;
const CHILD_SURVIVAL: f64 = 0.7;

const fn class_survival(class: PassengerClass) -> f64 {
    match class {
        PassengerClass::First => 0.63,
        PassengerClass::Second => 0.47,
        PassengerClass::Third => 0.24,
    }
}

const fn sex_survival(sex: Sex) -> f64 {
    match sex {
        Sex::Female => 0.74,
        Sex::Male => 0.19,
    }
}

/// Parameters of the synthetic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticConfig {
    /// Seed of the PCG generator
    pub seed: u64,
    /// Number of passengers
    pub count: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            count: 891,
        }
    }
}

/// Generates a synthetic passenger table.
pub fn generate(config: &SyntheticConfig) -> Result<Dataset, LoadDatasetError> {
    let SyntheticConfig { seed, count } = *config;
    let mut rng = Pcg32::seed_from_u64(seed);

    let class_dist = weighted(&CLASS_WEIGHTS);
    let sibsp_dist = weighted(&SIBSP_WEIGHTS);
    let parch_dist = weighted(&PARCH_WEIGHTS);
    let port_dist = weighted(&PORT_WEIGHTS);
    let age_dist =
        Normal::new(AGE_MEAN, AGE_STD_DEV).expect("age distribution parameters are valid");
    let fare_dist = Exp::new(1.0 / MEAN_FARE).expect("fare distribution parameter is valid");

    let mut records = (1..=count)
        .map(|n| {
            let id = u32::try_from(n).expect("passenger count fits in u32");
            let pclass = PassengerClass::ALL[class_dist.sample(&mut rng)];
            let sex = if rng.random_bool(0.5) {
                Sex::Male
            } else {
                Sex::Female
            };
            let age = round_to_half(age_dist.sample(&mut rng).max(0.0));
            let sibsp = as_count(sibsp_dist.sample(&mut rng));
            let parch = as_count(parch_dist.sample(&mut rng));
            let fare = (fare_dist.sample(&mut rng) * 10_000.0).round() / 10_000.0;
            let cabin = rng
                .random_bool(CABIN_PROBABILITY)
                .then(|| format!("C{id}"));
            let embarked = Port::ALL.get(port_dist.sample(&mut rng)).copied();
            PassengerRecord {
                id,
                survived: false,
                pclass,
                name: format!("Passenger {id}"),
                sex,
                age: Some(age),
                sibsp,
                parch,
                ticket: format!("Ticket {id}"),
                fare,
                cabin,
                embarked,
            }
        })
        .collect::<Vec<_>>();

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let missing_ages = (count as f64 * MISSING_AGE_RATIO) as usize;
    for i in index::sample(&mut rng, count, missing_ages).into_iter() {
        records[i].age = None;
    }

    for record in &mut records {
        record.survived = rng.random_bool(survival_probability(record));
    }

    let survivors = records.iter().filter(|r| r.survived).count();
    log::debug!("Generated {count} synthetic passengers ({survivors} survivors, seed {seed})");

    Dataset::from_records(records)
}

/// Survival probability for a record; the last applicable adjustment wins.
fn survival_probability(record: &PassengerRecord) -> f64 {
    // Later rates replace earlier ones. The sex rate always applies, so the
    // class rate only seeds the sequence.
    let class = class_survival(record.pclass);
    [
        Some(sex_survival(record.sex)),
        record
            .age
            .is_some_and(|age| age < CHILD_AGE)
            .then_some(CHILD_SURVIVAL),
    ]
    .into_iter()
    .flatten()
    .next_back()
    .unwrap_or(class)
}

fn weighted(weights: &[f64]) -> WeightedIndex<f64> {
    WeightedIndex::new(weights).expect("weights are positive constants")
}

fn as_count(index: usize) -> u32 {
    u32::try_from(index).expect("weight tables are small")
}

fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survival_probability_last_rate_wins() {
        let mut record = crate::store::tests::passenger(1);
        record.age = Some(30.0);
        for pclass in PassengerClass::ALL {
            record.pclass = pclass;
            record.sex = Sex::Male;
            assert_eq!(survival_probability(&record), sex_survival(Sex::Male));
            record.sex = Sex::Female;
            assert_eq!(survival_probability(&record), sex_survival(Sex::Female));
        }
        record.age = Some(4.0);
        assert_eq!(survival_probability(&record), CHILD_SURVIVAL);
        record.age = None;
        assert_eq!(survival_probability(&record), sex_survival(Sex::Female));
    }

    #[test]
    fn test_same_seed_same_table() {
        let config = SyntheticConfig {
            seed: 7,
            count: 200,
        };
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.rows(), b.rows());

        let c = generate(&SyntheticConfig { seed: 8, ..config }).unwrap();
        assert_ne!(a.rows(), c.rows());
    }

    #[test]
    fn test_generated_rows_respect_invariants() {
        let dataset = generate(&SyntheticConfig::default()).unwrap();
        assert_eq!(dataset.len(), 891);
        for (expected_id, row) in (1..).zip(dataset.rows()) {
            assert_eq!(row.id, expected_id);
            assert!(row.age.is_none_or(|age| age >= 0.0 && (age * 2.0).fract() == 0.0));
            assert!(row.fare >= 0.0);
            assert!(row.sibsp <= 8);
            assert!(row.parch <= 6);
        }
        let missing = dataset.rows().iter().filter(|r| r.age.is_none()).count();
        assert_eq!(missing, 89);
    }

    #[test]
    fn test_child_adjustment_overrides_sex() {
        let mut record = crate::store::tests::passenger(1);
        record.sex = Sex::Male;
        record.age = Some(4.0);
        assert_eq!(survival_probability(&record), CHILD_SURVIVAL);
        record.age = None;
        assert_eq!(survival_probability(&record), sex_survival(Sex::Male));
    }
}
