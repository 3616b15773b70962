use chrono::{DateTime, Utc};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Timestamped label for a batch run, e.g. `run-20260101T120000`.
pub fn run_label(at: DateTime<Utc>) -> String {
    format!("run-{}", at.format("%Y%m%dT%H%M%S"))
}
