//! Statistical summaries for population fitness.
//!
//! - [`descriptive`]: Descriptive statistics (min, max, mean, median, spread)
//!
//! # Examples
//!
//! ```
//! use hovolve_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
