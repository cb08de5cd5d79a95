//! Axis unit tags and their conversion into the integer axis
//!
//! Every x column carries a unit tag in its second header row. Time units
//! (`d`, `hr`, `mo`) are converted into whole days; volume units (`MMscf`,
//! `Mscf`, `kscf`, `Bcf`) are converted into millions of standard cubic feet
//! and quantized to a multiple of [`UnitConfig::ten_unit`].
//!
//! # Examples
//!
//! ```
//! use insights_engine::unit::{self, UnitConfig, UnitTag};
//!
//! let config = UnitConfig::default();
//! let days = unit::convert(&[0.0, 12.0, 36.0], UnitTag::Hours, config);
//! assert_eq!(days, vec![0, 1, 2]);
//!
//! let volume = unit::convert(&[1_234.0], UnitTag::Mscf, config);
//! assert_eq!(volume, vec![0]);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shift added before rounding day values.
///
/// Values that are mathematically integral may come out of a multiplication
/// as `n - ε`; the shift pulls them back over the rounding boundary.
pub const TRUNC_SHIFT: f64 = 0.000_01;

/// Unit tag found under an x-column header.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum UnitTag {
    #[display("d")]
    #[serde(rename = "d")]
    Days,
    #[display("hr")]
    #[serde(rename = "hr")]
    Hours,
    #[display("mo")]
    #[serde(rename = "mo")]
    Months,
    #[display("MMscf")]
    #[serde(rename = "MMscf")]
    Mmscf,
    #[display("Mscf")]
    #[serde(rename = "Mscf")]
    Mscf,
    #[display("kscf")]
    #[serde(rename = "kscf")]
    Kscf,
    #[display("Bcf")]
    #[serde(rename = "Bcf")]
    Bcf,
}

impl UnitTag {
    pub const ALL: [UnitTag; 7] = [
        UnitTag::Days,
        UnitTag::Hours,
        UnitTag::Months,
        UnitTag::Mmscf,
        UnitTag::Mscf,
        UnitTag::Kscf,
        UnitTag::Bcf,
    ];

    /// Returns `true` for volume-class units, whose axis is quantized to a coarse step.
    #[must_use]
    pub fn is_volume(self) -> bool {
        match self {
            UnitTag::Days | UnitTag::Hours | UnitTag::Months => false,
            UnitTag::Mmscf | UnitTag::Mscf | UnitTag::Kscf | UnitTag::Bcf => true,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitTag::Days => "d",
            UnitTag::Hours => "hr",
            UnitTag::Months => "mo",
            UnitTag::Mmscf => "MMscf",
            UnitTag::Mscf => "Mscf",
            UnitTag::Kscf => "kscf",
            UnitTag::Bcf => "Bcf",
        }
    }
}

/// Unrecognized unit tag on an x column.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Unknown measure: {tag}")]
pub struct UnitError {
    pub tag: String,
}

impl FromStr for UnitTag {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        UnitTag::ALL
            .into_iter()
            .find(|unit| unit.as_str() == tag)
            .ok_or_else(|| UnitError {
                tag: tag.to_owned(),
            })
    }
}

/// Conversion factors shared by every unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Days per month
    pub months_to_days: f64,
    /// Hours per day
    pub hours_to_days_denominator: f64,
    /// Scale between adjacent volume prefixes (thousands, millions, billions)
    pub kilo_unit: f64,
    /// Quantization step of volume axes, in MMscf
    pub ten_unit: i64,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            months_to_days: 30.44,
            hours_to_days_denominator: 24.0,
            kilo_unit: 1000.0,
            ten_unit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid unit configuration: `{field}` must be positive and finite (got {value})")]
pub struct ConfigError {
    pub field: &'static str,
    pub value: f64,
}

impl UnitConfig {
    /// Checks that every factor is a positive, finite number.
    #[expect(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("months_to_days", self.months_to_days),
            ("hours_to_days_denominator", self.hours_to_days_denominator),
            ("kilo_unit", self.kilo_unit),
            ("ten_unit", self.ten_unit as f64),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError { field, value });
            }
        }
        Ok(())
    }

    /// Gap-detection step for the axis of `unit`.
    ///
    /// Volume axes advance in steps of `ten_unit`; time axes return `None`
    /// and advance one day at a time.
    #[must_use]
    pub fn coarse_step(&self, unit: UnitTag) -> Option<i64> {
        unit.is_volume().then_some(self.ten_unit)
    }
}

/// Converts raw axis values declared in `unit` into the integer axis.
///
/// Preserves length and order. Non-finite inputs saturate; callers are
/// expected to have removed missing values beforehand.
#[must_use]
pub fn convert(values: &[f64], unit: UnitTag, config: UnitConfig) -> Vec<i64> {
    let UnitConfig {
        months_to_days,
        hours_to_days_denominator,
        kilo_unit,
        ten_unit,
    } = config;
    values
        .iter()
        .map(|&v| match unit {
            UnitTag::Days => round_days(v),
            UnitTag::Hours => round_days(v / hours_to_days_denominator),
            UnitTag::Months => round_days(v * months_to_days),
            UnitTag::Mmscf => round_to_step(v, ten_unit),
            UnitTag::Mscf | UnitTag::Kscf => round_to_step(v / kilo_unit, ten_unit),
            UnitTag::Bcf => round_to_step(v * kilo_unit, ten_unit),
        })
        .collect()
}

#[expect(clippy::cast_possible_truncation)]
fn round_days(value: f64) -> i64 {
    (value + TRUNC_SHIFT).round() as i64
}

#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn round_to_step(value: f64, step: i64) -> i64 {
    let step = step as f64;
    ((value / step).round_ties_even() * step) as i64
}
