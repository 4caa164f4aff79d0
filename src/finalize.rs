//! Price coercion, ordering and export of the collected records.

use crate::error::Result;
use crate::record::{ProductRecord, FIELD_NAMES};
use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

static PRICE_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[฿,]").unwrap());

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Price column of an exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Price {
    Numeric(f64),
    /// Text as scraped, used when the column could not be coerced.
    Raw(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Numeric(value) => write!(f, "{:.2}", value),
            Price::Raw(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Page")]
    pub page: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: Price,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Review Count")]
    pub review_count: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Link")]
    pub link: String,
}

impl ExportRow {
    fn new(record: &ProductRecord, price: Price) -> Self {
        Self {
            page: record.page,
            title: record.title_text(),
            price,
            brand: record.brand_text(),
            review_count: record.review_count_text(),
            rating: record.rating_text(),
            location: record.location_text(),
            link: record.link_text(),
        }
    }

    /// Field values in [`FIELD_NAMES`] order.
    pub fn fields(&self) -> [String; 8] {
        [
            self.page.to_string(),
            self.title.clone(),
            self.price.to_string(),
            self.brand.clone(),
            self.review_count.clone(),
            self.rating.clone(),
            self.location.clone(),
            self.link.clone(),
        ]
    }
}

/// Summary of the numeric price column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// The finalized rows ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub rows: Vec<ExportRow>,
    /// Records left out because they had no price.
    pub dropped: usize,
    /// False when the price column could not be coerced and rows are raw.
    pub sorted: bool,
}

impl Dataset {
    pub fn stats(&self) -> Option<PriceStats> {
        if !self.sorted {
            return None;
        }
        let prices: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| match row.price {
                Price::Numeric(value) => Some(value),
                Price::Raw(_) => None,
            })
            .collect();
        if prices.is_empty() {
            return None;
        }

        let sum: f64 = prices.iter().sum();
        Some(PriceStats {
            count: prices.len(),
            min: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: sum / prices.len() as f64,
        })
    }
}

/// Parses a displayed price such as `฿12,990.50`.
pub fn parse_price(text: &str) -> Option<f64> {
    PRICE_NOISE
        .replace_all(text, "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Coerces prices and orders the records from most to least expensive.
///
/// Records without a price are dropped first. If any remaining price fails
/// to parse, nothing is dropped or sorted and every record is exported with
/// its price text as scraped.
pub fn finalize(records: &[ProductRecord]) -> Dataset {
    let coerced: Option<Vec<(f64, &ProductRecord)>> = records
        .iter()
        .filter_map(|record| record.price.value().map(|text| (text, record)))
        .map(|(text, record)| parse_price(text).map(|value| (value, record)))
        .collect();

    match coerced {
        Some(mut priced) => {
            // sort_by is stable, equal prices keep scrape order
            priced.sort_by(|a, b| b.0.total_cmp(&a.0));
            let rows: Vec<ExportRow> = priced
                .into_iter()
                .map(|(value, record)| ExportRow::new(record, Price::Numeric(value)))
                .collect();
            let dropped = records.len() - rows.len();
            if dropped > 0 {
                log::info!("Dropped {} record(s) without a price", dropped);
            }
            Dataset {
                rows,
                dropped,
                sorted: true,
            }
        }
        None => {
            log::warn!("Price column is not numeric; exporting unsorted raw data");
            let rows = records
                .iter()
                .map(|record| ExportRow::new(record, Price::Raw(record.price_text())))
                .collect();
            Dataset {
                rows,
                dropped: 0,
                sorted: false,
            }
        }
    }
}

/// Writes the header row and one line per row.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(FIELD_NAMES)?;
    for row in &dataset.rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &dataset.rows)?;
    Ok(())
}

/// Writes the dataset to `path`, replacing any existing file.
pub fn save(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<()> {
    let file = File::create(path)?;
    match format {
        OutputFormat::Csv => write_csv(dataset, file),
        OutputFormat::Json => write_json(dataset, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Extracted;

    fn record(page: u32, title: &str, price: Option<&str>) -> ProductRecord {
        ProductRecord {
            page,
            title: Extracted::Value(title.to_string()),
            price: price.map(str::to_string).into(),
            brand: Extracted::Sentinel,
            review_count: Extracted::Sentinel,
            rating: Extracted::Value(5),
            location: Extracted::Sentinel,
            link: Extracted::Sentinel,
        }
    }

    fn csv_string(dataset: &Dataset) -> String {
        let mut out = Vec::new();
        write_csv(dataset, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_currency_text() {
        assert_eq!(parse_price("฿12,990"), Some(12990.0));
        assert_eq!(parse_price(" ฿1,234.50 "), Some(1234.5));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("฿"), None);
    }

    #[test]
    fn sorts_descending_and_keeps_ties_in_order() {
        let records = vec![
            record(1, "a", Some("฿100")),
            record(1, "b", Some("฿300")),
            record(2, "c", Some("฿100")),
        ];
        let dataset = finalize(&records);
        let titles: Vec<&str> = dataset.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);
        assert!(dataset.sorted);
    }

    #[test]
    fn drops_rows_without_price() {
        let records = vec![record(1, "a", Some("฿10")), record(1, "b", None)];
        let dataset = finalize(&records);
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(dataset.dropped, 1);
    }

    #[test]
    fn unparseable_price_falls_back_to_raw_export() {
        let records = vec![
            record(1, "a", Some("฿10")),
            record(1, "b", None),
            record(2, "c", Some("Contact seller")),
        ];
        let dataset = finalize(&records);
        assert!(!dataset.sorted);
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(dataset.rows[0].price, Price::Raw("฿10".to_string()));
        assert_eq!(dataset.rows[1].price, Price::Raw("N/A".to_string()));
        assert!(dataset.stats().is_none());
    }

    #[test]
    fn stats_cover_numeric_column() {
        let records = vec![
            record(1, "a", Some("฿100")),
            record(1, "b", Some("฿50")),
            record(1, "c", Some("฿300")),
        ];
        let stats = finalize(&records).stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 50.0);
        assert_eq!(stats.max, 300.0);
        assert_eq!(stats.mean, 150.0);
    }

    #[test]
    fn empty_dataset_still_has_header() {
        let dataset = finalize(&[]);
        assert_eq!(
            csv_string(&dataset),
            "Page,Title,Price,Brand,Review Count,Rating,Location,Link\n"
        );
    }

    #[test]
    fn csv_escapes_embedded_separators() {
        let records = vec![record(1, "Case, \"Clear\"", Some("฿1,299"))];
        let output = csv_string(&finalize(&records));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[1],
            r#"1,"Case, ""Clear""",1299.00,N/A,N/A,5,Local,N/A"#
        );
    }

    #[test]
    fn json_uses_column_names() {
        let records = vec![record(1, "a", Some("฿10"))];
        let mut out = Vec::new();
        write_json(&finalize(&records), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["Price"], serde_json::json!(10.0));
        assert_eq!(value[0]["Review Count"], "N/A");
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that are longer than the header\n".repeat(10)).unwrap();

        save(&finalize(&[]), &path, OutputFormat::Csv).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.starts_with("Page,Title,Price"));
    }
}
