//! Statistical helpers for the Lifeboat project.
//!
//! This crate provides the small numeric toolkit shared by the data and model crates:
//!
//! - **Descriptive statistics**: mean, median, population variance and standard deviation
//! - **Frequencies**: value counts and most-frequent value with deterministic tie breaking
//! - **Ratios**: percentages rounded to two decimals, zero for empty groups
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing numeric columns
//! - [`frequency`]: Counting categorical values
//! - [`ratio`]: Rounded percentages
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use lifeboat_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Finding the most frequent category
//!
//! ```
//! use lifeboat_stats::frequency::most_frequent;
//!
//! assert_eq!(most_frequent(["S", "C", "S"]), Some("S"));
//! ```
//!
//! ## Computing a survival rate
//!
//! ```
//! use lifeboat_stats::ratio::percentage;
//!
//! assert_eq!(percentage(2, 5), 40.0);
//! ```

pub mod descriptive;
pub mod frequency;
pub mod ratio;
