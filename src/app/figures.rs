//! Named figure presets.
//!
//! Each preset is a pure table builder over a `SeriesSource`: it picks the
//! stored series, merges or transforms them and returns the table a chart
//! would plot. Nothing here formats or renders.

use std::collections::BTreeMap;

use clap::ValueEnum;

use crate::catalog::Catalog;
use crate::domain::{Cadence, SeriesKey, Table};
use crate::engine::derived::{self, GDP};
use crate::engine::{SeriesSource, merge_keys, yoy_window};
use crate::error::EngineError;

const POLICY_RATES: [&str; 9] = [
    "FFER-FRED-D",
    "FFRTUPPER-FRED-D",
    "FFRTLOWER-FRED-D",
    "FFRT-FRED-D",
    "DISCOUNTPRIMARY-FRED-D",
    "SREPOMR-FRED-D",
    "IORR-FRED-D",
    "IORB-FRED-D",
    "ONRRP-FRED-D",
];

const LABOR_LEVEL: [&str; 5] = ["CNP-FRED-M", "CLF-FRED-M", "NIL-FRED-M", "EMP-FRED-M", "UNEMP-FRED-M"];

const LABOR_RATE: [&str; 7] = [
    "LFPR-FRED-M",
    "UNRATE-FRED-M",
    "U1-FRED-M",
    "U2-FRED-M",
    "U4-FRED-M",
    "U5-FRED-M",
    "U6-FRED-M",
];

const PRICE_LEVEL: [&str; 5] = [
    "CPIU-FRED-M",
    "CoreCPIU-FRED-M",
    "Chained_CPIU-FRED-M",
    "Chained_CoreCPIU-FRED-M",
    "PCE-FRED-M",
];

pub const OUTPUT_GAP: &str = "Output gap";
pub const UNEMPLOYMENT_GAP: &str = "Unemployment rate gap";
pub const INFLATION: &str = "Inflation";

// Business-cycle inputs, relabelled before merging.
const REAL_GDP: (&str, &str) = ("RGDP-FRED-Q", "Real GDP");
const POTENTIAL_GDP: (&str, &str) = ("FRGDP-FRED-Q", "Potential GDP");
const NOMINAL_GDP: &str = "NGDP-BEA-Q";
const DEFLATOR: &str = "GDPDeflator-BEA-Q";
const UNEMPLOYMENT: (&str, &str) = ("UNRATE-FRED-M", "Unemployment rate");
const NATURAL_RATE: (&str, &str) = ("NRUNEM-FRED-M", "Natural rate of unemployment");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Figure {
    GdpQuarterly,
    GdpAnnual,
    GdpShareQuarterly,
    GdpShareAnnual,
    RealGdpQuarterly,
    RealGdpAnnual,
    GdiQuarterly,
    GdiAnnual,
    BusinessCycle,
    PolicyRatesMonthly,
    PolicyRatesDaily,
    LaborLevel,
    LaborRate,
    PriceLevel,
}

impl Figure {
    pub fn title(self) -> &'static str {
        match self {
            Figure::GdpQuarterly => "Gross domestic product (quarterly)",
            Figure::GdpAnnual => "Gross domestic product (annual)",
            Figure::GdpShareQuarterly => "Percentage share of GDP (quarterly)",
            Figure::GdpShareAnnual => "Percentage share of GDP (annual)",
            Figure::RealGdpQuarterly => "Real gross domestic product (quarterly)",
            Figure::RealGdpAnnual => "Real gross domestic product (annual)",
            Figure::GdiQuarterly => "Gross domestic income (quarterly)",
            Figure::GdiAnnual => "Gross domestic income (annual)",
            Figure::BusinessCycle => "Business cycle and AD/AS model",
            Figure::PolicyRatesMonthly => "Monetary policy and interest rates (monthly)",
            Figure::PolicyRatesDaily => "Monetary policy and interest rates (daily)",
            Figure::LaborLevel => "Labor market level",
            Figure::LaborRate => "Labor market rate",
            Figure::PriceLevel => "Measures of price level",
        }
    }
}

/// Build the table behind `figure`.
pub fn build_figure<S>(source: &S, catalog: &Catalog, figure: Figure) -> Result<Table, EngineError>
where
    S: SeriesSource + ?Sized,
{
    match figure {
        Figure::GdpQuarterly => load(source, "NGDP-BEA-Q"),
        Figure::GdpAnnual => load(source, "NGDP-BEA-A"),
        Figure::GdiQuarterly => load(source, "GDI-BEA-Q"),
        Figure::GdiAnnual => load(source, "GDI-BEA-A"),
        Figure::GdpShareQuarterly => derived::percentage_share(&load(source, "NGDP-BEA-Q")?, GDP),
        Figure::GdpShareAnnual => derived::percentage_share(&load(source, "NGDP-BEA-A")?, GDP),
        Figure::RealGdpQuarterly => real_gdp(source, Cadence::Quarterly),
        Figure::RealGdpAnnual => real_gdp(source, Cadence::Annual),
        Figure::BusinessCycle => business_cycle(source),
        Figure::PolicyRatesMonthly => merged(source, &POLICY_RATES, Cadence::Monthly),
        Figure::PolicyRatesDaily => merged(source, &POLICY_RATES, Cadence::Daily),
        Figure::LaborLevel => named_monthly(source, catalog, &LABOR_LEVEL),
        Figure::LaborRate => named_monthly(source, catalog, &LABOR_RATE),
        Figure::PriceLevel => named_monthly(source, catalog, &PRICE_LEVEL),
    }
}

fn load<S: SeriesSource + ?Sized>(source: &S, name: &str) -> Result<Table, EngineError> {
    source.load_raw_series(&SeriesKey::parse(name)?)
}

fn keys(names: &[&str]) -> Result<Vec<SeriesKey>, EngineError> {
    names.iter().map(|n| SeriesKey::parse(n)).collect()
}

fn merged<S: SeriesSource + ?Sized>(source: &S, names: &[&str], minimum: Cadence) -> Result<Table, EngineError> {
    Ok(merge_keys(source, &keys(names)?, minimum)?.0)
}

fn real_gdp<S: SeriesSource + ?Sized>(source: &S, cadence: Cadence) -> Result<Table, EngineError> {
    let nominal = source.load_raw_series(&SeriesKey::parse(NOMINAL_GDP)?.with_cadence(cadence))?;
    let deflator = source.load_raw_series(&SeriesKey::parse(DEFLATOR)?.with_cadence(cadence))?;
    Ok(derived::real_from_nominal(&nominal, &deflator))
}

/// Output gap, unemployment-rate gap and GDP-deflator inflation on the rows
/// where every input is present.
fn business_cycle<S: SeriesSource + ?Sized>(source: &S) -> Result<Table, EngineError> {
    let labels = [REAL_GDP, POTENTIAL_GDP, UNEMPLOYMENT, NATURAL_RATE]
        .into_iter()
        .map(|(name, label)| Ok::<_, EngineError>((SeriesKey::parse(name)?, label.to_string())))
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    let renamed = Relabelled { inner: source, labels };

    let names = [REAL_GDP.0, POTENTIAL_GDP.0, DEFLATOR, UNEMPLOYMENT.0, NATURAL_RATE.0];
    let (merged, cadence) = merge_keys(&renamed, &keys(&names)?, Cadence::Daily)?;
    let complete = merged.drop_incomplete_rows();

    let inflation = derived::pct_change(&complete.require(GDP)?.values, yoy_window(cadence));

    let mut out = Table::new(cadence, complete.periods.clone());
    out.push_column(OUTPUT_GAP, derived::relative_gap(&complete, REAL_GDP.1, POTENTIAL_GDP.1)?);
    out.push_column(UNEMPLOYMENT_GAP, derived::difference(&complete, UNEMPLOYMENT.1, NATURAL_RATE.1)?);
    out.push_column(INFLATION, inflation);
    Ok(out)
}

/// Monthly merge with each series' column relabelled to its configured name.
fn named_monthly<S: SeriesSource + ?Sized>(source: &S, catalog: &Catalog, names: &[&str]) -> Result<Table, EngineError> {
    let keys = keys(names)?;
    let labels = keys
        .iter()
        .filter_map(|k| Some((k.clone(), catalog.display_name(k)?.to_string())))
        .collect();
    let renamed = Relabelled { inner: source, labels };
    Ok(merge_keys(&renamed, &keys, Cadence::Monthly)?.0)
}

/// Source adapter that renames the value column of single-column series.
struct Relabelled<'a, S: ?Sized> {
    inner: &'a S,
    labels: BTreeMap<SeriesKey, String>,
}

impl<S: SeriesSource + ?Sized> SeriesSource for Relabelled<'_, S> {
    fn load_raw_series(&self, key: &SeriesKey) -> Result<Table, EngineError> {
        let mut table = self.inner.load_raw_series(key)?;
        if let Some(label) = self.labels.get(key)
            && table.columns.len() == 1
        {
            table.rename_columns(&[label]);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SeriesRequest;
    use crate::domain::Period;
    use chrono::NaiveDate;

    fn series(name: &str, start: (i32, u32), columns: &[(&str, Vec<f64>)]) -> (SeriesKey, Table) {
        let key = SeriesKey::parse(name).unwrap();
        let mut p = Period::containing(key.cadence(), NaiveDate::from_ymd_opt(start.0, start.1, 1).unwrap());
        let mut periods = Vec::new();
        for _ in 0..columns[0].1.len() {
            periods.push(p);
            p = p.next();
        }
        let mut table = Table::new(key.cadence(), periods);
        for (col, values) in columns {
            table.push_column(*col, values.clone());
        }
        (key, table)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn business_cycle_gaps_and_inflation() {
        let source: BTreeMap<SeriesKey, Table> = [
            series(
                "RGDP-FRED-Q",
                (2020, 1),
                &[("Real Gross Domestic Product", vec![101.0, 102.0, 103.0, 104.0, 105.0, f64::NAN])],
            ),
            series("FRGDP-FRED-Q", (2020, 1), &[("Real Potential GDP", vec![100.0; 6])]),
            series(
                "GDPDeflator-BEA-Q",
                (2020, 1),
                &[(GDP, vec![100.0, 101.0, 102.0, 103.0, 110.0, 111.0])],
            ),
            series("UNRATE-FRED-M", (2020, 1), &[("Unemployment Rate", vec![4.0; 18])]),
            series("NRUNEM-FRED-M", (2020, 1), &[("Natural Rate", vec![4.5; 18])]),
        ]
        .into_iter()
        .collect();

        let table = build_figure(&source, &Catalog::default(), Figure::BusinessCycle).unwrap();
        assert_eq!(table.cadence, Cadence::Quarterly);
        assert_eq!(table.column_names(), vec![OUTPUT_GAP, UNEMPLOYMENT_GAP, INFLATION]);
        // 2021Q2 has no real GDP and is dropped.
        assert_eq!(table.len(), 5);
        assert_eq!(table.span().unwrap().1.label(), "2021Q1");

        assert!(close(table.columns[0].values[0], 1.0));
        assert!(close(table.columns[0].values[4], 5.0));
        assert!(table.columns[1].values.iter().all(|v| close(*v, -0.5)));
        assert!(table.columns[2].values[..4].iter().all(|v| v.is_nan()));
        assert!(close(table.columns[2].values[4], 10.0));
    }

    #[test]
    fn labor_columns_take_configured_names() {
        let mut source = BTreeMap::new();
        for name in LABOR_LEVEL {
            let (key, table) = series(name, (2021, 1), &[("Raw title", vec![1.0, 2.0])]);
            source.insert(key, table);
        }
        let mut catalog = Catalog::default();
        catalog.requests.insert(
            SeriesKey::parse("EMP-FRED-M").unwrap(),
            SeriesRequest {
                params: BTreeMap::new(),
                drop_cols: Vec::new(),
                mn_to_bn: false,
                name: Some("Employment level".to_string()),
            },
        );

        let table = build_figure(&source, &catalog, Figure::LaborLevel).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Raw title", "Raw title", "Raw title", "Employment level", "Raw title"]
        );
        assert_eq!(table.cadence, Cadence::Monthly);
    }

    #[test]
    fn policy_rates_need_every_series() {
        let mut source = BTreeMap::new();
        for name in &POLICY_RATES[..8] {
            let (key, table) = series(name, (2024, 1), &[("rate", vec![5.0; 3])]);
            source.insert(key, table);
        }
        assert_eq!(
            build_figure(&source, &Catalog::default(), Figure::PolicyRatesMonthly).unwrap_err(),
            EngineError::SeriesNotFound("ONRRP-FRED-D".to_string())
        );

        let (key, table) = series("ONRRP-FRED-D", (2024, 1), &[("rate", vec![5.3; 3])]);
        source.insert(key, table);
        let daily = build_figure(&source, &Catalog::default(), Figure::PolicyRatesDaily).unwrap();
        assert_eq!(daily.len(), 3);
        assert_eq!(daily.columns.len(), 9);
    }

    #[test]
    fn share_and_real_gdp() {
        let source: BTreeMap<SeriesKey, Table> = [
            series(
                "NGDP-BEA-A",
                (2020, 1),
                &[(GDP, vec![200.0, 220.0]), ("Personal consumption expenditures", vec![150.0, 165.0])],
            ),
            series("GDPDeflator-BEA-A", (2020, 1), &[(GDP, vec![100.0, 110.0])]),
        ]
        .into_iter()
        .collect();

        let share = build_figure(&source, &Catalog::default(), Figure::GdpShareAnnual).unwrap();
        assert_eq!(share.columns[1].values, vec![75.0, 75.0]);

        let real = build_figure(&source, &Catalog::default(), Figure::RealGdpAnnual).unwrap();
        assert!(close(real.columns[0].values[1], 200.0));
        assert!(real.columns[1].values.iter().all(|v| v.is_nan()));

        assert!(matches!(
            build_figure(&source, &Catalog::default(), Figure::GdiAnnual),
            Err(EngineError::SeriesNotFound(_))
        ));
    }
}
