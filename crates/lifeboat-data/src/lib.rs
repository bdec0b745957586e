//! Passenger table, filtering and survival aggregation.
//!
//! This crate owns the tabular side of Lifeboat:
//!
//! - [`record`]: the passenger row type and its categorical fields
//! - [`store`]: the immutable in-memory [`Dataset`] and its CSV persistence
//! - [`filter`]: conjunctive predicates returning order-preserving row subsets
//! - [`aggregate`]: survival counts over fixed, ordered partitions
//! - [`synth`]: a seeded synthetic table for first-run bootstrapping
//!
//! # Example
//!
//! ```
//! use lifeboat_data::{
//!     aggregate::{self, Grouping},
//!     filter::PassengerFilter,
//!     record::Sex,
//!     synth::{self, SyntheticConfig},
//! };
//!
//! let dataset = synth::generate(&SyntheticConfig::default()).unwrap();
//!
//! let women = PassengerFilter {
//!     sex: Some(Sex::Female),
//!     ..PassengerFilter::default()
//! }
//! .apply(dataset.rows());
//!
//! let by_class = aggregate::aggregate(women, &Grouping::Class);
//! assert_eq!(by_class.len(), 3);
//! ```

pub use self::store::Dataset;

pub mod aggregate;
pub mod filter;
pub mod record;
pub mod store;
pub mod synth;
