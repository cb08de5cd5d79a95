//! Statistical utilities for the Data Insights project.
//!
//! This crate provides the numeric building blocks used by the analysis layer:
//!
//! - **Percentiles**: Linear-interpolation percentiles over a sample
//! - **Descriptive statistics**: Count, minimum, maximum, mean
//!
//! # Modules
//!
//! - [`percentiles`]: Percentile computation and storage
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Computing percentiles
//!
//! ```
//! use insights_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[10.0, 50.0, 90.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use insights_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
pub mod percentiles;
