use tabled::Table;

use crate::{analysis, error, info, types::StatsTableRow};

use super::tracks::{DataInput, load_records};

/// Prints mean and standard deviation of every numeric feature.
pub async fn stats(input: DataInput) {
    let records = match load_records(&input).await {
        Ok(records) => records,
        Err(e) => error!("Failed to load track data: {}", e),
    };

    let summaries = match analysis::summarize(&records) {
        Ok(summaries) => summaries,
        Err(e) => error!("{}", e),
    };

    info!("Statistics over {} tracks", records.len());

    let rows: Vec<StatsTableRow> = summaries
        .into_iter()
        .map(|s| StatsTableRow {
            parameter: s.name,
            mean: format!("{:.2}", s.mean),
            stdev: s
                .stdev
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));
}
