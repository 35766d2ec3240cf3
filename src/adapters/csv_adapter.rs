//! CSV bar source and trade-table writer.

use crate::domain::error::EngineError;
use crate::domain::ledger::ClosedTrade;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::BarSource;
use crate::ports::report_port::TradeReportPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `date,open,high,low,close,volume` rows from a single file.
pub struct CsvBarSource {
    path: PathBuf,
}

impl CsvBarSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<f64, EngineError> {
    let raw = record
        .get(index)
        .ok_or_else(|| EngineError::data(format!("line {}: missing {} column", line, name)))?;
    let value: f64 = raw.trim().parse().map_err(|e| {
        EngineError::data(format!("line {}: invalid {} value '{}': {}", line, name, raw, e))
    })?;
    if !value.is_finite() {
        return Err(EngineError::data(format!(
            "line {}: {} must be finite, got '{}'",
            line, name, raw
        )));
    }
    Ok(value)
}

impl BarSource for CsvBarSource {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, EngineError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            EngineError::data(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| EngineError::data(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record
                .get(0)
                .ok_or_else(|| EngineError::data(format!("line {}: missing date column", line)))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                EngineError::data(format!("line {}: invalid date '{}': {}", line, date_str, e))
            })?;

            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            let bar = Bar {
                date,
                open: parse_field(&record, 1, "open", line)?,
                high: parse_field(&record, 2, "high", line)?,
                low: parse_field(&record, 3, "low", line)?,
                close: parse_field(&record, 4, "close", line)?,
                volume: parse_field(&record, 5, "volume", line)?,
            };
            if bar.high < bar.low {
                return Err(EngineError::data(format!(
                    "line {}: high {} below low {}",
                    line, bar.high, bar.low
                )));
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Writes the closed-trade table as `date,price,pnl,pnlcomm`.
pub struct CsvTradeReport;

impl TradeReportPort for CsvTradeReport {
    fn write_trades(&self, trades: &[ClosedTrade], output_path: &Path) -> Result<(), EngineError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| {
            EngineError::data(format!("failed to create {}: {}", output_path.display(), e))
        })?;
        wtr.write_record(["date", "price", "pnl", "pnlcomm"])
            .map_err(|e| EngineError::data(e.to_string()))?;
        for trade in trades {
            wtr.write_record([
                trade.date.format("%Y-%m-%d").to_string(),
                trade.price.to_string(),
                trade.pnl.to_string(),
                trade.pnl_comm.to_string(),
            ])
            .map_err(|e| EngineError::data(e.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.csv");

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(&path, csv_content).unwrap();

        (dir, path)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let source = CsvBarSource::new(path);

        let bars = source.fetch_bars(None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
        assert_eq!(bars[2].date, date(17));
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let source = CsvBarSource::new(path);

        let bars = source.fetch_bars(Some(date(16)), Some(date(16))).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(16));

        let bars = source.fetch_bars(Some(date(16)), None).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = CsvBarSource::new(dir.path().join("nope.csv"));
        assert!(matches!(
            source.fetch_bars(None, None),
            Err(EngineError::Data { .. })
        ));
    }

    #[test]
    fn fetch_bars_rejects_bad_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "date,open,high,low,close,volume\n2024-01-15,100,abc,90,105,1\n",
        )
        .unwrap();
        let err = CsvBarSource::new(path).fetch_bars(None, None).unwrap_err();
        assert!(err.to_string().contains("high"), "{err}");

        let path = dir.path().join("inverted.csv");
        fs::write(
            &path,
            "date,open,high,low,close,volume\n2024-01-15,100,90,110,105,1\n",
        )
        .unwrap();
        assert!(CsvBarSource::new(path).fetch_bars(None, None).is_err());
    }

    #[test]
    fn fetch_bars_rejects_non_finite_prices() {
        let dir = TempDir::new().unwrap();
        for (name, row) in [
            ("high", "2024-01-15,100,NaN,90,105,1"),
            ("low", "2024-01-15,100,110,-inf,105,1"),
            ("close", "2024-01-15,100,110,90,inf,1"),
        ] {
            let path = dir.path().join(format!("{name}.csv"));
            fs::write(&path, format!("date,open,high,low,close,volume\n{row}\n")).unwrap();
            let err = CsvBarSource::new(path).fetch_bars(None, None).unwrap_err();
            assert!(matches!(err, EngineError::Data { .. }), "{err}");
            assert!(err.to_string().contains(name), "{err}");
        }
    }

    #[test]
    fn trade_report_writes_table() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("trades.csv");
        let trades = vec![
            ClosedTrade {
                date: date(20),
                price: 100.0,
                pnl: 5.0,
                pnl_comm: 4.5,
            },
            ClosedTrade {
                date: date(25),
                price: 102.0,
                pnl: -1.0,
                pnl_comm: -1.5,
            },
        ];
        CsvTradeReport.write_trades(&trades, &out).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "date,price,pnl,pnlcomm");
        assert_eq!(lines[1], "2024-01-20,100,5,4.5");
        assert_eq!(lines[2], "2024-01-25,102,-1,-1.5");
        assert_eq!(lines.len(), 3);
    }
}
