//! Text exposition rendering.
//!
//! Output order follows registration order for metrics and first-observed
//! order for series, so two renders of an unchanged store are byte-identical.

use super::labels::format_labels;
use super::store::{FamilySnapshot, SeriesStore, SeriesValue};
use crate::error::{Error, Result};
use std::fmt::Write;

/// Content type of the exposition format served at the metrics path
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every definition and realized series of `store`
pub fn render(store: &SeriesStore) -> Result<Vec<u8>> {
    let mut output = String::new();
    for family in store.snapshot() {
        write_family(&mut output, &family).map_err(|e| Error::Export(e.to_string()))?;
    }
    Ok(output.into_bytes())
}

fn write_family(out: &mut String, family: &FamilySnapshot<'_>) -> std::fmt::Result {
    let name = family.fq_name;
    let label_names = family.definition.label_names();

    writeln!(out, "# HELP {} {}", name, escape_help(family.definition.help()))?;
    writeln!(out, "# TYPE {} {}", name, family.definition.kind())?;

    for (labels, value) in &family.series {
        let pairs: Vec<(&str, &str)> = label_names
            .iter()
            .map(String::as_str)
            .zip(labels.values().iter().map(String::as_str))
            .collect();

        match value {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => {
                writeln!(out, "{}{} {}", name, format_labels(&pairs), format_value(*v))?;
            }
            SeriesValue::Histogram(histogram) => {
                for (bound, count) in &histogram.buckets {
                    let le = format_value(*bound);
                    let mut bucket_labels = pairs.clone();
                    bucket_labels.push(("le", le.as_str()));
                    writeln!(out, "{}_bucket{} {}", name, format_labels(&bucket_labels), count)?;
                }
                let mut inf_labels = pairs.clone();
                inf_labels.push(("le", "+Inf"));
                writeln!(
                    out,
                    "{}_bucket{} {}",
                    name,
                    format_labels(&inf_labels),
                    histogram.count
                )?;
                let label_str = format_labels(&pairs);
                writeln!(out, "{}_sum{} {}", name, label_str, format_value(histogram.sum))?;
                writeln!(out, "{}_count{} {}", name, label_str, histogram.count)?;
            }
        }
    }
    Ok(())
}

/// Format a sample value; non-finite values use the exposition spellings
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{}", value)
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
