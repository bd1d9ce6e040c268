//! CSV and JSON export for completed runs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::reporting::Summary;
use crate::sim::SimResults;

/// Timestamp layout of the `timestamp` column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exports hourly results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &SimResults, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(results, io::BufWriter::new(file))
}

/// Writes hourly results as CSV to any writer.
///
/// Columns are `timestamp,demand,unserved`, then `gen:<name>` for every
/// generator followed by `spill:<name>` for every generator. Hours without
/// a shortfall have `unserved` = 0. Produces deterministic output for
/// identical inputs.
///
/// # Arguments
///
/// * `results` - Output of a completed run
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &SimResults, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let names = results.generator_names();

    let mut header = vec![
        "timestamp".to_string(),
        "demand".to_string(),
        "unserved".to_string(),
    ];
    header.extend(names.iter().map(|n| format!("gen:{n}")));
    header.extend(names.iter().map(|n| format!("spill:{n}")));
    wtr.write_record(&header)?;

    let mut unserved = results.unserved().iter().peekable();
    for (hour, ts) in results.timeline().iter().enumerate() {
        let shortfall = match unserved.peek() {
            Some((t, v)) if t == ts => {
                let v = *v;
                unserved.next();
                v
            }
            _ => 0.0,
        };

        let mut record = Vec::with_capacity(header.len());
        record.push(ts.format(TIMESTAMP_FORMAT).to_string());
        record.push(format!("{:.4}", results.demand()[hour]));
        record.push(format!("{shortfall:.4}"));
        record.extend(results.generation().row(hour).iter().map(|v| format!("{v:.4}")));
        record.extend(results.spill().row(hour).iter().map(|v| format!("{v:.4}")));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a run summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or serialization fails.
pub fn export_summary_json(summary: &Summary, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary_json(summary, io::BufWriter::new(file))
}

/// Writes a run summary as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_summary_json(summary: &Summary, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::{DemandMatrix, parse_timestamp};
    use crate::generators::{Fossil, Trace, TraceKind};
    use crate::regions::{Region, RegionMap};
    use crate::sim::Context;

    fn completed_context() -> Context {
        let map = RegionMap::new(vec![Region::new("NSW", vec![1])]).expect("valid map");
        let start = parse_timestamp("2020-01-01 00:00:00").expect("valid timestamp");
        let demand = DemandMatrix::new(start, vec![1], vec![vec![100.0], vec![150.0], vec![40.0]])
            .expect("valid demand");
        let mut ctx = Context::new(
            map,
            demand,
            vec![
                Box::new(Trace::new("Wind", TraceKind::Wind, 1, 100.0, vec![1.0; 3])),
                Box::new(Fossil::new("Coal", 1, 50.0)),
            ],
        );
        ctx.nsp_limit = 0.5;
        ctx.run(None, None).expect("run should succeed");
        ctx
    }

    fn csv_output(ctx: &Context) -> String {
        let mut buf = Vec::new();
        write_csv(ctx.results().expect("results attached"), &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn header_lists_generation_then_spill() {
        let out = csv_output(&completed_context());
        assert_eq!(
            out.lines().next(),
            Some("timestamp,demand,unserved,gen:Wind,gen:Coal,spill:Wind,spill:Coal")
        );
    }

    #[test]
    fn one_row_per_hour_with_unserved_aligned() {
        let out = csv_output(&completed_context());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        // Hour 1: wind capped at 75, coal 50, 25 unserved, 25 spilled.
        assert_eq!(
            lines[2],
            "2020-01-01 01:00:00,150.0000,25.0000,75.0000,50.0000,25.0000,0.0000"
        );
        assert!(lines[1].starts_with("2020-01-01 00:00:00,100.0000,0.0000,"));
    }

    #[test]
    fn summary_json_has_headline_fields() {
        let ctx = completed_context();
        let summary = Summary::from_context(&ctx).expect("results attached");
        let mut buf = Vec::new();
        write_summary_json(&summary, &mut buf).ok();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap_or_default();
        assert_eq!(value["timesteps"], 3);
        assert_eq!(value["unserved_hours"], 1);
        assert_eq!(value["generators"][1]["name"], "Coal");
    }
}
