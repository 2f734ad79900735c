use std::path::Path;

use backevent::{commission::TieredCommission, event::FillRecord};
use log::warn;

/// Reads broker fill rows. Rows that do not parse are logged and skipped.
pub fn load_fill_records_from_csv(path: impl AsRef<Path>) -> anyhow::Result<Vec<FillRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    Ok(read_fill_records(rdr))
}

fn read_fill_records<R: std::io::Read>(rdr: csv::Reader<R>) -> Vec<FillRecord> {
    rdr.into_deserialize()
        .filter_map(|x: csv::Result<FillRecord>| match x {
            Ok(r) => Some(r),
            Err(err) => {
                warn!("skip fill row: {}", err);
                None
            }
        })
        .collect()
}

pub fn load_schedule_from_json(path: impl AsRef<Path>) -> anyhow::Result<TieredCommission> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

#[cfg(test)]
mod tests {
    use backevent::{data::TimeIndex, event::Direction};

    use super::*;

    fn write_temp_json(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("feecheck-{}-{}.json", std::process::id(), name));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_partial_schedule() {
        let path = write_temp_json("partial", r#"{"min_per_order": 1.0, "tier_threshold": 300}"#);
        let m = load_schedule_from_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(m.min_per_order, 1.0);
        assert_eq!(m.tier_threshold, 300);
        let d = TieredCommission::default();
        assert_eq!(m.low_tier_rate, d.low_tier_rate);
        assert_eq!(m.high_tier_rate, d.high_tier_rate);
        assert_eq!(m.max_pct_of_value, d.max_pct_of_value);
    }

    #[test]
    fn test_negative_schedule_rejected() {
        let path = write_temp_json("negative", r#"{"max_pct_of_value": -1}"#);
        let res = load_schedule_from_json(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(res.is_err());

        assert!(load_schedule_from_json("/nonexistent/feecheck/schedule.json").is_err());
    }

    #[test]
    fn test_fill_csv() {
        let data = "timeindex,symbol,exchange,quantity,direction,fill_cost,commission
2023-02-01T14:30:00Z, GOOG, ARCA, 100, BUY, 5000.0,
17,AAPL,NASDAQ,600,sell,9000.5,2.75
18,AAPL,NASDAQ,-5,SELL,10.0,
19,AAPL,NASDAQ,5,HOLD,10.0,";
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let records = read_fill_records(rdr);
        assert_eq!(records.len(), 2);

        let r = &records[0];
        assert_eq!(
            r.timeindex,
            TimeIndex::Time("2023-02-01T14:30:00Z".parse().unwrap())
        );
        assert_eq!(r.symbol, "GOOG");
        assert_eq!(r.exchange, "ARCA");
        assert_eq!(r.quantity, 100);
        assert_eq!(r.direction, Direction::Buy);
        assert_eq!(r.fill_cost, 5000.0);
        assert_eq!(r.commission, None);

        let r = &records[1];
        assert_eq!(r.timeindex, TimeIndex::Bar(17));
        assert_eq!(r.direction, Direction::Sell);
        assert_eq!(r.commission, Some(2.75));
    }
}
