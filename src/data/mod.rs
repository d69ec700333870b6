//! Upstream data providers.

pub mod bea;
pub mod fred;

pub use bea::{BeaClient, BeaOptions};
pub use fred::FredClient;

/// Upstream provider of a series, taken from the `Source` part of its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    Bea,
    Fred,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Bea, Provider::Fred];

    pub fn from_source(source: &str) -> Option<Self> {
        match source {
            "BEA" => Some(Provider::Bea),
            "FRED" => Some(Provider::Fred),
            _ => None,
        }
    }

    /// Name of the request-config file for this provider.
    pub fn config_file(self) -> &'static str {
        match self {
            Provider::Bea => "BEA.json",
            Provider::Fred => "FRED.json",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Bea => "BEA",
            Provider::Fred => "FRED",
        }
    }
}
