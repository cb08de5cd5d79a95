//! Ingestion and normalization of paired time-series columns
//!
//! This crate turns a wide table of `(x, y)` column pairs into one aligned
//! table of evenly populated series on a common integer axis.
//!
//! # Pipeline
//!
//! 1. **Unit conversion** ([`unit`]): time axes become whole days, volume
//!    axes become MMscf quantized to a coarse step
//! 2. **Series normalization** ([`series`]): duplicate x values collapse to
//!    their first row, gaps are filled with placeholder rows, and every row
//!    gets a validity flag
//! 3. **Table assembly** ([`table`]): column pairs are extracted, normalized
//!    and padded to a common row count
//!
//! All operations are pure functions of their arguments; configuration is
//! passed in explicitly through [`AssembleOptions`].
//!
//! # Errors
//!
//! Assembly fails as a whole with an [`IngestError`]: either a
//! [`StructureError`](table::StructureError) for a malformed table or a
//! [`UnitError`](unit::UnitError) for an unrecognized x-unit tag.

use serde::{Deserialize, Serialize};

use self::{
    series::ValidityRule,
    table::StructureError,
    unit::{UnitConfig, UnitError},
};

pub mod series;
pub mod table;
pub mod unit;

/// How a fault should be reported to whoever submitted the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum FaultClass {
    /// The submitted input is malformed.
    ClientInput,
    /// The input is well-formed but holds nothing the request can be computed from.
    Unprocessable,
}

/// Failure of table ingestion.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum IngestError {
    #[display("{_0}")]
    Structure(#[error(not(source))] StructureError),
    #[display("{_0}")]
    Unit(#[error(not(source))] UnitError),
}

impl IngestError {
    #[must_use]
    pub fn fault_class(&self) -> FaultClass {
        match self {
            IngestError::Structure(_) | IngestError::Unit(_) => FaultClass::ClientInput,
        }
    }
}

/// Options for [`table::assemble`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleOptions {
    pub units: UnitConfig,
    pub validity: ValidityRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_class() {
        let err = IngestError::from(StructureError::EmptyTable);
        assert!(err.fault_class().is_client_input());
        let err = IngestError::from(UnitError {
            tag: "yr".to_owned(),
        });
        assert!(err.fault_class().is_client_input());
        assert_eq!(err.to_string(), "Unknown measure: yr");
    }

    #[test]
    fn test_options_from_json() {
        let options: AssembleOptions = serde_json::from_str(
            r#"{"units": {"ten_unit": 5}, "validity": "non_zero_value"}"#,
        )
        .unwrap();
        assert_eq!(options.units.ten_unit, 5);
        assert_eq!(options.units.kilo_unit, 1000.0);
        assert_eq!(options.validity, ValidityRule::NonZeroValue);
    }
}
