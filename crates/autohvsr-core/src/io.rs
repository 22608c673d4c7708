//! Reading curve sets and writing results.
//!
//! Curve sets come either as JSON (`.json`) or as a plain text table:
//!
//! ```text
//! # frequency  window_0  window_1  ...
//! 0.20         1.02      0.98
//! 0.21         1.05      1.01
//! ```
//!
//! Columns may be separated by whitespace or commas; lines starting with `#`
//! are comments.

use std::io::Write;
use std::path::Path;

use crate::curves::HvsrCurveSet;
use crate::error::{HvsrError, HvsrResult};
use crate::features::{CandidatePeak, FeatureMatrix, feature_names};
use crate::pipeline::AutoHvsrResult;
use crate::record::PeakRecord;

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Read a curve set, choosing the format from the file extension.
pub fn read_curve_set(path: impl AsRef<Path>) -> HvsrResult<HvsrCurveSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| HvsrError::io(path, e))?;
    if is_json(path) {
        serde_json::from_str(&content).map_err(|e| HvsrError::parse(path, e.to_string()))
    } else {
        parse_curve_table(&content, path)
    }
}

/// Parse the text table format; `path` is only used in error messages.
pub fn parse_curve_table(content: &str, path: impl AsRef<Path>) -> HvsrResult<HvsrCurveSet> {
    let path = path.as_ref();
    let mut frequency = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    HvsrError::parse(path, format!("line {}: '{s}' is not a number", n + 1))
                })
            })
            .collect::<HvsrResult<Vec<f64>>>()?;

        if values.len() < 2 {
            return Err(HvsrError::parse(
                path,
                format!("line {}: expected a frequency and at least one window", n + 1),
            ));
        }
        if columns.is_empty() {
            columns = vec![Vec::new(); values.len() - 1];
        } else if values.len() - 1 != columns.len() {
            return Err(HvsrError::parse(
                path,
                format!(
                    "line {}: expected {} columns, found {}",
                    n + 1,
                    columns.len() + 1,
                    values.len()
                ),
            ));
        }

        frequency.push(values[0]);
        for (column, value) in columns.iter_mut().zip(&values[1..]) {
            column.push(*value);
        }
    }

    if frequency.is_empty() {
        return Err(HvsrError::parse(path, "no data rows"));
    }
    HvsrCurveSet::new(frequency, columns)
}

/// Render a curve set in the text table format.
pub fn curve_table_string(curves: &HvsrCurveSet) -> String {
    let mut out = String::from("# frequency");
    for w in 0..curves.n_windows() {
        out.push_str(&format!(" window_{w}"));
    }
    out.push('\n');
    for (i, f) in curves.frequency().iter().enumerate() {
        out.push_str(&f.to_string());
        for curve in curves.windows() {
            out.push(' ');
            out.push_str(&curve[i].to_string());
        }
        out.push('\n');
    }
    out
}

pub(crate) fn write_text(path: &Path, content: &str) -> HvsrResult<()> {
    let mut file = std::fs::File::create(path).map_err(|e| HvsrError::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| HvsrError::io(path, e))
}

/// Serialization failures are reported as write errors on `path`.
fn to_json<T: serde::Serialize>(value: &T, path: &Path) -> HvsrResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| HvsrError::io(path, e.into()))
}

/// Write a curve set, choosing the format from the file extension.
pub fn write_curve_set(curves: &HvsrCurveSet, path: impl AsRef<Path>) -> HvsrResult<()> {
    let path = path.as_ref();
    let content = if is_json(path) {
        to_json(curves, path)?
    } else {
        curve_table_string(curves)
    };
    write_text(path, &content)
}

/// Write the pipeline result as pretty-printed JSON.
pub fn write_result_json(result: &AutoHvsrResult, path: impl AsRef<Path>) -> HvsrResult<()> {
    let path = path.as_ref();
    write_text(path, &to_json(result, path)?)
}

/// Read a pipeline result written by [`write_result_json`].
pub fn read_result_json(path: impl AsRef<Path>) -> HvsrResult<AutoHvsrResult> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| HvsrError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| HvsrError::parse(path, e.to_string()))
}

/// Header of the peak table CSV.
pub const PEAK_CSV_HEADER: &str = "window,frequency,amplitude,prominence,valid,resonance";

/// Render the labeled peak table as CSV; `resonance` is `-1` for none.
pub fn peak_csv_string(peaks: &[PeakRecord]) -> String {
    let mut out = String::from(PEAK_CSV_HEADER);
    out.push('\n');
    for p in peaks {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.window_index,
            p.frequency,
            p.amplitude,
            p.prominence,
            p.valid,
            p.resonance_id()
        ));
    }
    out
}

/// Write the labeled peak table as CSV.
pub fn write_peak_csv(peaks: &[PeakRecord], path: impl AsRef<Path>) -> HvsrResult<()> {
    write_text(path.as_ref(), &peak_csv_string(peaks))
}

/// Render unlabeled candidate peaks with their feature columns as CSV.
pub fn candidate_csv_string(candidates: &[CandidatePeak], features: &FeatureMatrix) -> String {
    let mut out = String::from("window,frequency,amplitude,prominence");
    for name in feature_names() {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for (c, row) in candidates.iter().zip(features.rows()) {
        out.push_str(&format!(
            "{},{},{},{}",
            c.window_index, c.frequency, c.amplitude, c.prominence
        ));
        for v in row {
            out.push(',');
            out.push_str(&v.to_string());
        }
        out.push('\n');
    }
    out
}

/// Write candidate peaks and features as CSV.
pub fn write_candidate_csv(
    candidates: &[CandidatePeak],
    features: &FeatureMatrix,
    path: impl AsRef<Path>,
) -> HvsrResult<()> {
    write_text(path.as_ref(), &candidate_csv_string(candidates, features))
}
