//! `.hv` text reports in the hvsrpy and Geopsy styles.
//!
//! Both styles carry the same content: f0 statistics, the mean-curve peak,
//! and a four-column table of frequency, mean curve, and the mean curve one
//! standard deviation below and above. They differ only in header layout and
//! column separator.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::curves::{CurvePoint, HvsrCurveSet};
use crate::error::{HvsrError, HvsrResult};
use crate::fundamental::FundamentalSummary;
use crate::io::write_text;
use crate::stats::{Distribution, DistributionStats};

/// Header layout of an `.hv` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HvStyle {
    /// `key = value` header, comma separated table.
    #[default]
    Hvsrpy,
    /// Geopsy header, tab separated table.
    Geopsy,
}

impl HvStyle {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            HvStyle::Hvsrpy => "hvsrpy",
            HvStyle::Geopsy => "geopsy",
        }
    }

    fn separator(self) -> char {
        match self {
            HvStyle::Hvsrpy => ',',
            HvStyle::Geopsy => '\t',
        }
    }
}

impl fmt::Display for HvStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvStyle {
    type Err = HvsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hvsrpy" => Ok(HvStyle::Hvsrpy),
            "geopsy" => Ok(HvStyle::Geopsy),
            other => Err(HvsrError::invalid_input(format!(
                "unknown .hv style '{other}' (expected 'hvsrpy' or 'geopsy')"
            ))),
        }
    }
}

/// Everything an `.hv` report holds.
#[derive(Debug, Clone, PartialEq)]
pub struct HvReport {
    /// Windows the statistics and curves cover.
    pub n_windows: usize,
    /// f0 statistics of the windows' main peaks.
    pub f0: DistributionStats,
    /// Highest point of the mean curve (f0,mc and its amplitude).
    pub mean_curve_peak: CurvePoint,
    /// Distribution of the mean curve and its band.
    pub mean_curve_distribution: Distribution,
    /// Shared frequency axis.
    pub frequency: Vec<f64>,
    /// Mean curve.
    pub mean_curve: Vec<f64>,
    /// Mean curve minus one standard deviation.
    pub lower_curve: Vec<f64>,
    /// Mean curve plus one standard deviation.
    pub upper_curve: Vec<f64>,
}

impl HvReport {
    /// Build a report for `curves`, whose windows `summary` was computed on.
    pub fn new(
        curves: &HvsrCurveSet,
        summary: &FundamentalSummary,
        distribution_mc: Distribution,
    ) -> HvsrResult<Self> {
        if summary.n_windows != curves.n_windows() {
            return Err(HvsrError::invalid_input(format!(
                "f0 summary covers {} windows but the curve set has {}",
                summary.n_windows,
                curves.n_windows()
            )));
        }
        Ok(Self {
            n_windows: summary.n_windows,
            f0: summary.f0,
            mean_curve_peak: summary.mean_curve_peak,
            mean_curve_distribution: distribution_mc,
            frequency: curves.frequency().to_vec(),
            mean_curve: curves.mean_curve(distribution_mc)?,
            lower_curve: curves.nstd_curve(-1.0, distribution_mc)?,
            upper_curve: curves.nstd_curve(1.0, distribution_mc)?,
        })
    }

    /// Band amplitudes `(lower, upper)` at the mean-curve peak.
    fn peak_band(&self) -> (f64, f64) {
        self.frequency
            .iter()
            .position(|&f| f == self.mean_curve_peak.frequency)
            .and_then(|i| Some((*self.lower_curve.get(i)?, *self.upper_curve.get(i)?)))
            .unwrap_or((f64::NAN, f64::NAN))
    }

    /// Render the report.
    pub fn to_hv_string(&self, style: HvStyle) -> String {
        let mut out = match style {
            HvStyle::Hvsrpy => self.hvsrpy_header(),
            HvStyle::Geopsy => self.geopsy_header(),
        };
        let sep = style.separator();
        let rows = self
            .frequency
            .iter()
            .zip(&self.mean_curve)
            .zip(self.lower_curve.iter().zip(&self.upper_curve));
        for ((f, mean), (lower, upper)) in rows {
            out.push_str(&format!("{f}{sep}{mean}{sep}{lower}{sep}{upper}\n"));
        }
        out
    }

    fn hvsrpy_header(&self) -> String {
        let label = self.f0.distribution.location_label();
        let mc = self.mean_curve_distribution;
        let mut out = format!(
            "# hvsrpy-style output (autohvsr {})\n",
            env!("CARGO_PKG_VERSION")
        );
        out.push_str(&format!("# Number of windows = {}\n", self.n_windows));
        out.push_str(&format!("# Distribution of f0 = {}\n", self.f0.distribution));
        out.push_str(&format!("# {label} f0 (Hz) = {}\n", self.f0.mean));
        out.push_str(&format!("# Standard deviation f0 = {}\n", self.f0.std));
        out.push_str(&format!("# {label} T0 (s) = {}\n", 1.0 / self.f0.mean));
        out.push_str(&format!("# Distribution of mean curve = {mc}\n"));
        out.push_str(&format!(
            "# f0 from mean curve (Hz) = {}\n",
            self.mean_curve_peak.frequency
        ));
        out.push_str(&format!(
            "# A0 from mean curve = {}\n",
            self.mean_curve_peak.amplitude
        ));
        out.push_str("# Frequency (Hz),Mean curve,Mean curve -1 std,Mean curve +1 std\n");
        out
    }

    fn geopsy_header(&self) -> String {
        let (a_lower, a_upper) = self.peak_band();
        let mut out = String::from("# GEOPSY output version 1.0\n");
        out.push_str(&format!("# Number of windows = {}\n", self.n_windows));
        out.push_str(&format!(
            "# f0 from average\t{}\n",
            self.mean_curve_peak.frequency
        ));
        out.push_str(&format!("# Number of windows for f0 = {}\n", self.n_windows));
        out.push_str(&format!(
            "# f0 from windows\t{}\t{}\t{}\n",
            self.f0.mean,
            self.f0.nstd(-1.0),
            self.f0.nstd(1.0)
        ));
        out.push_str(&format!(
            "# Peak amplitude\t{}\t{a_lower}\t{a_upper}\n",
            self.mean_curve_peak.amplitude
        ));
        out.push_str("# Position\t0 0 0\n");
        out.push_str("# Category\tDefault\n");
        out.push_str("# Frequency\tAverage\tMin\tMax\n");
        out
    }
}

/// Curve table and window count read back from an `.hv` report.
#[derive(Debug, Clone, PartialEq)]
pub struct HvCurves {
    /// Windows the report covers.
    pub n_windows: usize,
    /// Frequency axis.
    pub frequency: Vec<f64>,
    /// Mean curve.
    pub mean_curve: Vec<f64>,
    /// Mean curve minus one standard deviation.
    pub lower_curve: Vec<f64>,
    /// Mean curve plus one standard deviation.
    pub upper_curve: Vec<f64>,
}

/// Parse the curve table of either style; `path` is only used in errors.
pub fn parse_hv(content: &str, path: impl AsRef<Path>) -> HvsrResult<HvCurves> {
    let path = path.as_ref();
    let mut n_windows = None;
    let mut columns: [Vec<f64>; 4] = Default::default();

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(value) = comment.trim().strip_prefix("Number of windows =") {
                let count = value.trim().parse::<usize>().map_err(|_| {
                    HvsrError::parse(path, format!("line {}: bad window count", n + 1))
                })?;
                n_windows = Some(count);
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let values = line
            .split([',', '\t', ' '])
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    HvsrError::parse(path, format!("line {}: '{s}' is not a number", n + 1))
                })
            })
            .collect::<HvsrResult<Vec<f64>>>()?;
        if values.len() != 4 {
            return Err(HvsrError::parse(
                path,
                format!("line {}: expected 4 columns, found {}", n + 1, values.len()),
            ));
        }
        for (column, value) in columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let n_windows =
        n_windows.ok_or_else(|| HvsrError::parse(path, "missing 'Number of windows' header"))?;
    if columns[0].is_empty() {
        return Err(HvsrError::parse(path, "no data rows"));
    }
    let [frequency, mean_curve, lower_curve, upper_curve] = columns;
    Ok(HvCurves {
        n_windows,
        frequency,
        mean_curve,
        lower_curve,
        upper_curve,
    })
}

/// Write a report in `style`.
pub fn write_hv(report: &HvReport, style: HvStyle, path: impl AsRef<Path>) -> HvsrResult<()> {
    write_text(path.as_ref(), &report.to_hv_string(style))
}

/// Read the curve table of an `.hv` report.
pub fn read_hv(path: impl AsRef<Path>) -> HvsrResult<HvCurves> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| HvsrError::io(path, e))?;
    parse_hv(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> HvsrCurveSet {
        HvsrCurveSet::new(
            vec![1.0, 2.0, 4.0, 8.0],
            vec![
                vec![1.0, 3.0, 1.2, 1.0],
                vec![1.1, 2.5, 1.0, 0.9],
                vec![0.9, 3.5, 1.1, 1.1],
            ],
        )
        .unwrap()
    }

    fn report() -> HvReport {
        let set = curves();
        let summary =
            FundamentalSummary::from_curves(&set, Distribution::Lognormal, Distribution::Lognormal)
                .unwrap();
        HvReport::new(&set, &summary, Distribution::Lognormal).unwrap()
    }

    #[test]
    fn test_band_brackets_mean_curve() {
        let r = report();
        for i in 0..r.frequency.len() {
            assert!(r.lower_curve[i] <= r.mean_curve[i]);
            assert!(r.mean_curve[i] <= r.upper_curve[i]);
        }
        assert_eq!(r.mean_curve_peak.frequency, 2.0);
    }

    #[test]
    fn test_hvsrpy_header_carries_statistics() {
        let r = report();
        let text = r.to_hv_string(HvStyle::Hvsrpy);
        assert!(text.contains("# Number of windows = 3\n"));
        assert!(text.contains("# Distribution of f0 = lognormal\n"));
        assert!(text.contains(&format!("# LM f0 (Hz) = {}\n", r.f0.mean)));
        assert!(text.contains("# f0 from mean curve (Hz) = 2\n"));
        assert_eq!(text.lines().filter(|l| !l.starts_with('#')).count(), 4);
    }

    #[test]
    fn test_geopsy_header_layout() {
        let r = report();
        let text = r.to_hv_string(HvStyle::Geopsy);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("# GEOPSY output version 1.0"));
        assert!(text.contains("# f0 from average\t2\n"));
        assert!(text.contains("# Frequency\tAverage\tMin\tMax\n"));
        let first_row = text.lines().find(|l| !l.starts_with('#')).unwrap();
        assert_eq!(first_row.split('\t').count(), 4);
    }

    #[test]
    fn test_file_round_trip_both_styles() {
        let dir = tempfile::tempdir().unwrap();
        let r = report();
        for style in [HvStyle::Hvsrpy, HvStyle::Geopsy] {
            let path = dir.path().join(format!("site_{style}.hv"));
            write_hv(&r, style, &path).unwrap();
            let back = read_hv(&path).unwrap();
            assert_eq!(back.n_windows, r.n_windows, "{style}");
            assert_eq!(back.frequency, r.frequency, "{style}");
            assert_eq!(back.mean_curve, r.mean_curve, "{style}");
            assert_eq!(back.lower_curve, r.lower_curve, "{style}");
            assert_eq!(back.upper_curve, r.upper_curve, "{style}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_hv("1,2,3,4\n", "a.hv").unwrap_err(),
            HvsrError::Parse { .. }
        ));
        assert!(parse_hv("# Number of windows = 2\n1,2,3\n", "b.hv").is_err());
        assert!(parse_hv("# Number of windows = 2\n", "c.hv").is_err());
    }

    #[test]
    fn test_summary_must_match_curves() {
        let set = curves();
        let summary =
            FundamentalSummary::from_curves(&set, Distribution::Normal, Distribution::Normal)
                .unwrap();
        let fewer = set.select_windows(&[true, true, false]).unwrap();
        assert!(HvReport::new(&fewer, &summary, Distribution::Normal).is_err());
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("Geopsy".parse::<HvStyle>().unwrap(), HvStyle::Geopsy);
        assert!("csv".parse::<HvStyle>().is_err());
    }
}
