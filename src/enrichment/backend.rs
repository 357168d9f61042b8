//! Numeric array backends for the enrichment engine.
//!
//! The engine never reaches for a particular array library directly. It receives an
//! [`ArrayBackend`] chosen once from [`Backend`] and routes every vector primitive
//! through it, so an accelerated implementation can be added as another variant
//! without touching the scoring code.

use ndarray::Array1;
use std::fmt;
use std::str::FromStr;

/// Vector primitives needed by the area score.
pub trait ArrayBackend: Send + Sync {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &'static str;

    fn sum(&self, values: &[f64]) -> f64;

    /// Running sum, same length as the input.
    fn cumsum(&self, values: &[f64]) -> Vec<f64>;

    /// Trapezoidal integral with unit sample spacing.
    fn trapz(&self, values: &[f64]) -> f64;

    /// `n` evenly spaced points over `[start, stop]`, both ends included.
    fn linspace(&self, start: f64, stop: f64, n: usize) -> Vec<f64>;
}

/// Portable CPU implementation on top of `ndarray`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl ArrayBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn sum(&self, values: &[f64]) -> f64 {
        Array1::from(values.to_vec()).sum()
    }

    fn cumsum(&self, values: &[f64]) -> Vec<f64> {
        let mut arr = Array1::from(values.to_vec());
        arr.accumulate_axis_inplace(ndarray::Axis(0), |&prev, curr| *curr += prev);
        arr.to_vec()
    }

    fn trapz(&self, values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let arr = Array1::from(values.to_vec());
        let left = arr.slice(ndarray::s![..-1]);
        let right = arr.slice(ndarray::s![1..]);
        ((&left + &right) / 2.0).sum()
    }

    fn linspace(&self, start: f64, stop: f64, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => Array1::linspace(start, stop, n).to_vec(),
        }
    }
}

/// Backend selection, made once from configuration and passed down explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Cpu,
}

static CPU: CpuBackend = CpuBackend;

impl Backend {
    pub fn array_backend(&self) -> &'static dyn ArrayBackend {
        match self {
            Backend::Cpu => &CPU,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.array_backend().name())
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Backend::Cpu),
            other => Err(anyhow::anyhow!(
                "Unknown array backend '{}', available backends: cpu",
                other
            )),
        }
    }
}
