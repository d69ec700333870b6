//! Database update: decide which configured series are due, fetch them and
//! append new observations to the store.
//!
//! Schedule (relative to today):
//! - Annual: 31 January
//! - Quarterly: last day of the first month of the current quarter
//! - Monthly: last day of the current month
//! - Daily: every day

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::catalog::{Catalog, SeriesRequest};
use crate::data::{BeaClient, FredClient, Provider};
use crate::domain::{Cadence, Period, SeriesKey, Table};
use crate::error::AppError;
use crate::io::CsvStore;

/// Day on which series of `cadence` are refreshed in the period containing `today`.
pub fn update_date(cadence: Cadence, today: NaiveDate) -> NaiveDate {
    match cadence {
        Cadence::Daily => today,
        Cadence::Monthly => Period::containing(Cadence::Monthly, today).end(),
        Cadence::Quarterly => {
            let quarter = Period::containing(Cadence::Quarterly, today);
            Period::containing(Cadence::Monthly, quarter.start()).end()
        }
        Cadence::Annual => {
            let year = Period::containing(Cadence::Annual, today);
            Period::containing(Cadence::Monthly, year.start()).end()
        }
    }
}

pub fn is_due(cadence: Cadence, today: NaiveDate) -> bool {
    update_date(cadence, today) == today
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Ignore the schedule.
    pub all: bool,
    /// Only series with no stored file yet.
    pub new_only: bool,
    /// Restrict the run to a single configured series.
    pub only: Option<SeriesKey>,
    /// Rewrite stored files instead of appending new periods.
    pub replace: bool,
    /// Pause between upstream requests.
    pub pause: Duration,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    /// Series fetched, with the number of rows written.
    pub updated: Vec<(SeriesKey, usize)>,
    pub failed: Vec<(SeriesKey, String)>,
}

impl UpdateSummary {
    /// One `key  rows` line per updated series.
    pub fn rows_report(&self) -> String {
        self.updated
            .iter()
            .map(|(key, rows)| format!("{key:<32} {rows:>6} rows"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Exit-code-4 error naming every failed series, if any failed.
    pub fn check(&self) -> Result<(), AppError> {
        if self.failed.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = self.failed.iter().map(|(k, _)| k.to_string()).collect();
        Err(AppError::new(
            4,
            format!("{} series failed to update: {}", names.len(), names.join(", ")),
        ))
    }
}

/// Fetches one configured series from its provider.
pub trait Fetcher {
    fn fetch(&self, key: &SeriesKey, request: &SeriesRequest) -> Result<Table, AppError>;
}

/// Live HTTP fetcher; clients are created only for the providers in use.
pub struct HttpFetcher {
    bea: Option<BeaClient>,
    fred: Option<FredClient>,
}

impl HttpFetcher {
    pub fn for_keys(keys: &[SeriesKey]) -> Result<Self, AppError> {
        let uses = |p: Provider| keys.iter().any(|k| Provider::from_source(k.source()) == Some(p));
        let bea = if uses(Provider::Bea) { Some(BeaClient::from_env()?) } else { None };
        let fred = if uses(Provider::Fred) { Some(FredClient::from_env()?) } else { None };
        Ok(Self { bea, fred })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, key: &SeriesKey, request: &SeriesRequest) -> Result<Table, AppError> {
        match (Provider::from_source(key.source()), &self.bea, &self.fred) {
            (Some(Provider::Bea), Some(client), _) => client.fetch(key, &request.params, &request.bea_options()),
            (Some(Provider::Fred), _, Some(client)) => client.fetch(key, &request.params),
            _ => Err(AppError::new(2, format!("No client configured for {key}."))),
        }
    }
}

/// Configured series selected by `options`, in key order.
pub fn plan(catalog: &Catalog, store: &CsvStore, options: &UpdateOptions) -> Result<Vec<SeriesKey>, AppError> {
    if let Some(only) = &options.only
        && catalog.request(only).is_none()
    {
        return Err(AppError::new(2, format!("Series {only} is not in the request config.")));
    }

    let keys = catalog
        .requests
        .keys()
        .filter(|k| options.only.as_ref().is_none_or(|only| only == *k))
        .filter(|k| !options.new_only || !store.contains(k))
        .filter(|k| options.all || is_due(k.cadence(), options.today))
        .cloned()
        .collect();
    Ok(keys)
}

/// Fetch and store every planned series.
///
/// A failing series is logged and recorded in the summary without stopping
/// the run; [`UpdateSummary::check`] turns recorded failures into an error.
pub fn update_database<F: Fetcher + ?Sized>(
    fetcher: &F,
    catalog: &Catalog,
    store: &CsvStore,
    keys: &[SeriesKey],
    options: &UpdateOptions,
) -> UpdateSummary {
    let mut summary = UpdateSummary::default();
    if keys.is_empty() {
        info!(today = %options.today, "no series due for update");
        return summary;
    }

    for (idx, key) in keys.iter().enumerate() {
        if idx > 0 && !options.pause.is_zero() {
            thread::sleep(options.pause);
        }
        let Some(request) = catalog.request(key) else {
            summary.failed.push((key.clone(), "not in request config".to_string()));
            continue;
        };

        info!(%key, "requesting");
        let result = fetcher
            .fetch(key, request)
            .and_then(|table| store.save(key, &table, options.replace).map_err(AppError::from));

        match result {
            Ok(rows) => {
                info!(%key, rows, "updated");
                summary.updated.push((key.clone(), rows));
            }
            Err(err) => {
                error!(%key, error = %err, "update failed");
                summary.failed.push((key.clone(), err.to_string()));
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_dates() {
        let today = date(2024, 5, 17);
        assert_eq!(update_date(Cadence::Annual, today), date(2024, 1, 31));
        assert_eq!(update_date(Cadence::Quarterly, today), date(2024, 4, 30));
        assert_eq!(update_date(Cadence::Monthly, today), date(2024, 5, 31));
        assert_eq!(update_date(Cadence::Daily, today), today);

        assert_eq!(update_date(Cadence::Monthly, date(2024, 2, 3)), date(2024, 2, 29));
        assert!(is_due(Cadence::Quarterly, date(2024, 10, 31)));
        assert!(!is_due(Cadence::Quarterly, date(2024, 11, 30)));
        assert!(is_due(Cadence::Annual, date(2025, 1, 31)));
        assert!(is_due(Cadence::Daily, date(2025, 3, 2)));
    }

    struct FakeFetcher;

    impl Fetcher for FakeFetcher {
        fn fetch(&self, key: &SeriesKey, _request: &SeriesRequest) -> Result<Table, AppError> {
            if key.identifier() == "BROKEN" {
                return Err(AppError::new(4, "upstream down"));
            }
            let p = Period::containing(key.cadence(), date(2024, 1, 1));
            let mut table = Table::new(key.cadence(), vec![p, p.next()]);
            table.push_column(key.identifier(), vec![1.0, 2.0]);
            Ok(table)
        }
    }

    fn catalog(names: &[&str]) -> Catalog {
        let requests = names
            .iter()
            .map(|n| {
                let request = SeriesRequest {
                    params: BTreeMap::new(),
                    drop_cols: Vec::new(),
                    mn_to_bn: false,
                    name: None,
                };
                (SeriesKey::parse(n).unwrap(), request)
            })
            .collect();
        Catalog {
            requests,
            ..Catalog::default()
        }
    }

    fn options(today: NaiveDate) -> UpdateOptions {
        UpdateOptions {
            all: false,
            new_only: false,
            only: None,
            replace: false,
            pause: Duration::ZERO,
            today,
        }
    }

    #[test]
    fn plan_follows_schedule_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let catalog = catalog(&["NGDP-BEA-A", "UNRATE-FRED-M", "FFER-FRED-D"]);
        std::fs::write(dir.path().join("FFER-FRED-D.csv"), "Time,x\n").unwrap();

        let names = |keys: Vec<SeriesKey>| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();

        let opts = options(date(2024, 5, 17));
        assert_eq!(names(plan(&catalog, &store, &opts).unwrap()), vec!["FFER-FRED-D"]);

        let opts = options(date(2024, 5, 31));
        assert_eq!(names(plan(&catalog, &store, &opts).unwrap()), vec!["FFER-FRED-D", "UNRATE-FRED-M"]);

        let opts = UpdateOptions {
            all: true,
            new_only: true,
            ..options(date(2024, 5, 17))
        };
        assert_eq!(names(plan(&catalog, &store, &opts).unwrap()), vec!["NGDP-BEA-A", "UNRATE-FRED-M"]);

        let opts = UpdateOptions {
            all: true,
            only: Some(SeriesKey::parse("NGDP-BEA-A").unwrap()),
            ..options(date(2024, 5, 17))
        };
        assert_eq!(names(plan(&catalog, &store, &opts).unwrap()), vec!["NGDP-BEA-A"]);

        let opts = UpdateOptions {
            only: Some(SeriesKey::parse("CPI-FRED-M").unwrap()),
            ..options(date(2024, 5, 17))
        };
        assert_eq!(plan(&catalog, &store, &opts).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let catalog = catalog(&["BROKEN-FRED-M", "UNRATE-FRED-M"]);
        let keys: Vec<SeriesKey> = catalog.requests.keys().cloned().collect();
        let opts = options(date(2024, 5, 31));

        let summary = update_database(&FakeFetcher, &catalog, &store, &keys, &opts);
        assert!(store.contains(&SeriesKey::parse("UNRATE-FRED-M").unwrap()));
        assert_eq!(summary.failed.len(), 1);

        // Successful counts stay reportable next to the failure.
        let report = summary.rows_report();
        assert!(report.starts_with("UNRATE-FRED-M"));
        assert!(report.ends_with(" rows"));
        assert!(!report.contains("BROKEN"));

        let err = summary.check().unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("BROKEN-FRED-M"));
    }

    #[test]
    fn second_run_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let catalog = catalog(&["GDI-BEA-Q"]);
        let keys: Vec<SeriesKey> = catalog.requests.keys().cloned().collect();
        let opts = options(date(2024, 4, 30));

        let first = update_database(&FakeFetcher, &catalog, &store, &keys, &opts);
        assert_eq!(first.updated[0].1, 2);
        assert!(first.check().is_ok());
        let second = update_database(&FakeFetcher, &catalog, &store, &keys, &opts);
        assert_eq!(second.updated[0].1, 0);
    }
}
