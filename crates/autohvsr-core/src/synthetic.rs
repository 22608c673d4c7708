//! Reproducible synthetic HVSR curve sets for demos, tests, and benchmarks.
//!
//! Each window is a flat unit baseline plus a Gaussian bump (on `log10 f`)
//! per resonance present in that window, with small multiplicative noise.

use serde::{Deserialize, Serialize};

use crate::curves::HvsrCurveSet;
use crate::error::{HvsrError, HvsrResult};

/// One synthetic resonance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticResonance {
    /// Center frequency in Hz.
    pub frequency: f64,
    /// Bump height above the unit baseline.
    pub amplitude: f64,
    /// Fraction of windows containing the resonance, in `(0, 1]`.
    pub fraction: f64,
}

impl std::str::FromStr for SyntheticResonance {
    type Err = HvsrError;

    /// Parse `FREQ:AMP[:FRACTION]`, e.g. `8.0:3.0:0.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(HvsrError::invalid_input(format!(
                "resonance '{s}' must look like FREQ:AMP[:FRACTION]"
            )));
        }
        let number = |field: &str| {
            field.trim().parse::<f64>().map_err(|_| {
                HvsrError::invalid_input(format!("'{field}' in resonance '{s}' is not a number"))
            })
        };
        Ok(Self {
            frequency: number(fields[0])?,
            amplitude: number(fields[1])?,
            fraction: fields.get(2).map_or(Ok(1.0), |f| number(*f))?,
        })
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of windows.
    pub n_windows: usize,
    /// Number of log-spaced frequency samples.
    pub n_frequencies: usize,
    /// Lowest frequency in Hz.
    pub min_frequency: f64,
    /// Highest frequency in Hz.
    pub max_frequency: f64,
    /// Resonances to inject.
    pub resonances: Vec<SyntheticResonance>,
    /// Bump width (standard deviation) on `log10 f`.
    pub width: f64,
    /// Per-window jitter of each resonance center on `log10 f`.
    pub jitter: f64,
    /// Multiplicative noise level.
    pub noise: f64,
    /// PRNG seed; zero is replaced by a fixed non-zero state.
    pub seed: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_windows: 40,
            n_frequencies: 256,
            min_frequency: 0.2,
            max_frequency: 20.0,
            resonances: vec![SyntheticResonance {
                frequency: 2.0,
                amplitude: 4.0,
                fraction: 1.0,
            }],
            width: 0.06,
            jitter: 0.02,
            noise: 0.01,
            seed: 0x1234_5678,
        }
    }
}

/// xorshift32 returning values in `[-1, 1]`.
struct Noise(u32);

impl Noise {
    fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x1234_5678 } else { seed })
    }

    fn next(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        f64::from(x as i32) / f64::from(i32::MAX)
    }
}

/// Whether window `w` of `n` carries a resonance present in `fraction` of windows.
///
/// Spreads the windows evenly instead of clustering them at the start.
fn carries(w: usize, fraction: f64) -> bool {
    ((w + 1) as f64 * fraction).floor() > (w as f64 * fraction).floor()
}

/// Generate a curve set.
pub fn generate(config: &SyntheticConfig) -> HvsrResult<HvsrCurveSet> {
    if config.n_frequencies < 2 {
        return Err(HvsrError::invalid_input("need at least two frequency samples"));
    }
    if !(config.min_frequency > 0.0 && config.max_frequency > config.min_frequency) {
        return Err(HvsrError::invalid_input(format!(
            "frequency range {}..{} Hz is invalid",
            config.min_frequency, config.max_frequency
        )));
    }
    if let Some(r) = config
        .resonances
        .iter()
        .find(|r| r.frequency <= 0.0 || !(r.fraction > 0.0 && r.fraction <= 1.0))
    {
        return Err(HvsrError::invalid_input(format!(
            "resonance at {} Hz needs a positive frequency and a fraction in (0, 1]",
            r.frequency
        )));
    }
    if config.width <= 0.0 || !(0.0..1.0).contains(&config.noise) {
        return Err(HvsrError::invalid_input(
            "width must be positive and noise must lie in [0, 1)",
        ));
    }

    let (lo, hi) = (config.min_frequency.log10(), config.max_frequency.log10());
    let step = (hi - lo) / (config.n_frequencies - 1) as f64;
    let log_axis: Vec<f64> = (0..config.n_frequencies).map(|i| lo + step * i as f64).collect();
    let frequency: Vec<f64> = log_axis.iter().map(|l| 10f64.powf(*l)).collect();

    let mut noise = Noise::new(config.seed);
    let amplitude = (0..config.n_windows)
        .map(|w| {
            let centers: Vec<(f64, f64)> = config
                .resonances
                .iter()
                .filter(|r| carries(w, r.fraction))
                .map(|r| (r.frequency.log10() + config.jitter * noise.next(), r.amplitude))
                .collect();
            log_axis
                .iter()
                .map(|&l| {
                    let bumps: f64 = centers
                        .iter()
                        .map(|&(c, a)| {
                            let x = (l - c) / config.width;
                            a * (-0.5 * x * x).exp()
                        })
                        .sum();
                    (1.0 + bumps) * (1.0 + config.noise * noise.next())
                })
                .collect()
        })
        .collect();

    HvsrCurveSet::new(frequency, amplitude)
}
