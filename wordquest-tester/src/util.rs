use anyhow::{Context, Result};
use chrono::NaiveDate;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

pub fn parse_today(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("--today expects YYYY-MM-DD, got '{s}'"))
}
