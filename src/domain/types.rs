//! Shared domain types.
//!
//! - sampling cadences (`Cadence`) and aggregation rules (`Aggregation`)
//! - structured series names (`SeriesKey`)
//! - run configuration (`AppConfig`)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Native sampling cadence of a series.
///
/// Variants are declared from finest to coarsest, so the derived `Ord` is the
/// calendar-granularity order `Daily < Monthly < Quarterly < Annual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[value(alias = "d")]
    Daily,
    #[value(alias = "m")]
    Monthly,
    #[value(alias = "q")]
    Quarterly,
    #[value(alias = "a")]
    Annual,
}

impl Cadence {
    pub const ALL: [Cadence; 4] = [
        Cadence::Daily,
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Annual,
    ];

    /// One-letter code used in series names.
    pub fn code(self) -> char {
        match self {
            Cadence::Daily => 'D',
            Cadence::Monthly => 'M',
            Cadence::Quarterly => 'Q',
            Cadence::Annual => 'A',
        }
    }

    /// Parse a one-letter cadence code.
    ///
    /// `W` (weekly) is reserved by the naming convention but not supported.
    pub fn from_code(code: &str) -> Result<Self, EngineError> {
        match code.trim() {
            "D" => Ok(Cadence::Daily),
            "M" => Ok(Cadence::Monthly),
            "Q" => Ok(Cadence::Quarterly),
            "A" => Ok(Cadence::Annual),
            "W" => Err(EngineError::InvalidCadence("weekly cadence is reserved".to_string())),
            other => Err(EngineError::InvalidCadence(other.to_string())),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Cadence::Daily => "Daily",
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::Annual => "Annual",
        }
    }
}

/// Reduction applied to the observations falling into one output period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Mean,
    Max,
}

/// Structured series name: `<Identifier>-<Source>-<CadenceCode>`.
///
/// Examples: `NGDP-BEA-Q`, `UNRATE-FRED-M`, `FFER-FRED-D`.
///
/// The identifier may itself contain dashes (figure names are sometimes used as
/// identifiers), so parsing splits from the right. The source may not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    identifier: String,
    source: String,
    cadence: Cadence,
}

impl SeriesKey {
    pub fn new(
        identifier: impl Into<String>,
        source: impl Into<String>,
        cadence: Cadence,
    ) -> Result<Self, EngineError> {
        let identifier = identifier.into();
        let source = source.into();
        if identifier.trim().is_empty() || source.trim().is_empty() || source.contains('-') {
            return Err(EngineError::CadenceMismatch(format!(
                "{identifier}-{source}-{}",
                cadence.code()
            )));
        }
        Ok(Self {
            identifier,
            source,
            cadence,
        })
    }

    /// Parse a dash-delimited series name.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        let mismatch = || EngineError::CadenceMismatch(name.to_string());

        let mut parts = name.trim().rsplitn(3, '-');
        let code = parts.next().ok_or_else(mismatch)?;
        let source = parts.next().ok_or_else(mismatch)?;
        let identifier = parts.next().ok_or_else(mismatch)?;

        let cadence = Cadence::from_code(code).map_err(|_| mismatch())?;
        Self::new(identifier, source, cadence).map_err(|_| mismatch())
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Dataset name without the cadence code (e.g. `NGDP-BEA`).
    pub fn dataset(&self) -> String {
        format!("{}-{}", self.identifier, self.source)
    }

    /// Same identifier and source at another cadence.
    pub fn with_cadence(&self, cadence: Cadence) -> Self {
        Self {
            identifier: self.identifier.clone(),
            source: self.source.clone(),
            cadence,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.identifier, self.source, self.cadence.code())
    }
}

impl FromStr for SeriesKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Locations shared by every command.
///
/// Built from CLI flags and passed explicitly to each pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory of parsed raw-series CSV files.
    pub data_dir: PathBuf,
    /// Directory holding `BEA.json`, `FRED.json` and `hierarchy.json`.
    pub config_dir: PathBuf,
}
