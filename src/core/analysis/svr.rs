// src/core/analysis/svr.rs
//
// Support vector regression in the libsvm text model format. Only the
// prediction side is implemented; models are trained elsewhere.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Model compiled into the binary, used when no model path is configured
pub const DEFAULT_MODEL: &str = include_str!("../../../model/default_audio_model.txt");

#[derive(Debug, Error)]
pub enum SvrModelError {
    #[error("I/O error reading model: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unsupported svm_type '{0}' (only epsilon_svr and nu_svr predict a value)")]
    UnsupportedType(String),

    #[error("unsupported kernel_type '{0}'")]
    UnsupportedKernel(String),

    #[error("model has no support vectors")]
    Empty,
}

impl SvrModelError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Linear,
    Polynomial { gamma: f64, coef0: f64, degree: i32 },
    Rbf { gamma: f64 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    fn eval(&self, sv: &[f64], x: &[f64]) -> f64 {
        match *self {
            Kernel::Linear => dot(sv, x),
            Kernel::Polynomial {
                gamma,
                coef0,
                degree,
            } => (gamma * dot(sv, x) + coef0).powi(degree),
            Kernel::Rbf { gamma } => {
                let len = sv.len().max(x.len());
                let dist: f64 = (0..len)
                    .map(|i| {
                        let d = sv.get(i).copied().unwrap_or(0.0) - x.get(i).copied().unwrap_or(0.0);
                        d * d
                    })
                    .sum();
                (-gamma * dist).exp()
            }
            Kernel::Sigmoid { gamma, coef0 } => (gamma * dot(sv, x) + coef0).tanh(),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Linear => "linear",
            Kernel::Polynomial { .. } => "polynomial",
            Kernel::Rbf { .. } => "rbf",
            Kernel::Sigmoid { .. } => "sigmoid",
        };
        write!(f, "{}", name)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// A trained regression model: `Σ coef_i · K(sv_i, x) − rho`
#[derive(Debug, Clone, PartialEq)]
pub struct SvrModel {
    kernel: Kernel,
    rho: f64,
    coefficients: Vec<f64>,
    /// Dense support vectors; feature `k` (1-based in the file) at index `k - 1`
    support_vectors: Vec<Vec<f64>>,
}

impl SvrModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SvrModelError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    /// The model embedded in the binary: a linear placeholder, not a
    /// trained regression
    pub fn builtin() -> Result<Self, SvrModelError> {
        DEFAULT_MODEL.parse()
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn num_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    /// Largest feature index the model references
    pub fn num_features(&self) -> usize {
        self.support_vectors.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.coefficients)
            .map(|(sv, coef)| coef * self.kernel.eval(sv, features))
            .sum();
        sum - self.rho
    }
}

#[derive(Default)]
struct Header {
    svm_type: Option<String>,
    kernel_type: Option<String>,
    degree: Option<i32>,
    gamma: Option<f64>,
    coef0: Option<f64>,
    rho: Option<f64>,
    total_sv: Option<usize>,
}

fn parse_value<T: FromStr>(line: usize, key: &str, value: Option<&str>) -> Result<T, SvrModelError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SvrModelError::parse(line, format!("invalid value for '{}'", key)))
}

fn parse_support_vector(line_no: usize, line: &str) -> Result<(f64, Vec<f64>), SvrModelError> {
    let mut tokens = line.split_whitespace();
    let coef: f64 = parse_value(line_no, "coefficient", tokens.next())?;

    let mut dense = Vec::new();
    for token in tokens {
        let (idx, value) = token
            .split_once(':')
            .ok_or_else(|| SvrModelError::parse(line_no, format!("expected index:value, got '{}'", token)))?;
        let idx: usize = parse_value(line_no, "feature index", Some(idx))?;
        let value: f64 = parse_value(line_no, "feature value", Some(value))?;
        if idx == 0 {
            return Err(SvrModelError::parse(line_no, "feature indices start at 1"));
        }
        if dense.len() < idx {
            dense.resize(idx, 0.0);
        }
        dense[idx - 1] = value;
    }
    Ok((coef, dense))
}

impl FromStr for SvrModel {
    type Err = SvrModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut header = Header::default();
        let mut lines = text.lines().enumerate();
        let mut saw_sv_marker = false;

        for (idx, raw) in lines.by_ref() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line == "SV" {
                saw_sv_marker = true;
                break;
            }
            let mut parts = line.split_whitespace();
            let key = parts.next().unwrap_or_default();
            let value = parts.next();
            match key {
                "svm_type" => header.svm_type = value.map(str::to_string),
                "kernel_type" => header.kernel_type = value.map(str::to_string),
                "degree" => header.degree = Some(parse_value(line_no, key, value)?),
                "gamma" => header.gamma = Some(parse_value(line_no, key, value)?),
                "coef0" => header.coef0 = Some(parse_value(line_no, key, value)?),
                "rho" => header.rho = Some(parse_value(line_no, key, value)?),
                "total_sv" => header.total_sv = Some(parse_value(line_no, key, value)?),
                // nr_class, label, probA, probB, nr_sv carry no regression state
                "nr_class" | "label" | "probA" | "probB" | "nr_sv" => {}
                other => {
                    return Err(SvrModelError::parse(line_no, format!("unknown header key '{}'", other)))
                }
            }
        }

        if !saw_sv_marker {
            return Err(SvrModelError::parse(text.lines().count(), "missing 'SV' section"));
        }

        match header.svm_type.as_deref() {
            Some("epsilon_svr") | Some("nu_svr") => {}
            Some(other) => return Err(SvrModelError::UnsupportedType(other.to_string())),
            None => return Err(SvrModelError::parse(1, "missing 'svm_type'")),
        }

        let gamma = header.gamma.unwrap_or(0.0);
        let coef0 = header.coef0.unwrap_or(0.0);
        let kernel = match header.kernel_type.as_deref() {
            Some("linear") => Kernel::Linear,
            Some("polynomial") => Kernel::Polynomial {
                gamma,
                coef0,
                degree: header.degree.unwrap_or(3),
            },
            Some("rbf") => Kernel::Rbf { gamma },
            Some("sigmoid") => Kernel::Sigmoid { gamma, coef0 },
            Some(other) => return Err(SvrModelError::UnsupportedKernel(other.to_string())),
            None => return Err(SvrModelError::parse(1, "missing 'kernel_type'")),
        };

        let rho = header
            .rho
            .ok_or_else(|| SvrModelError::parse(1, "missing 'rho'"))?;

        let mut coefficients = Vec::new();
        let mut support_vectors = Vec::new();
        for (idx, raw) in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (coef, sv) = parse_support_vector(idx + 1, line)?;
            coefficients.push(coef);
            support_vectors.push(sv);
        }

        if support_vectors.is_empty() {
            return Err(SvrModelError::Empty);
        }
        if let Some(expected) = header.total_sv {
            if expected != support_vectors.len() {
                return Err(SvrModelError::parse(
                    text.lines().count(),
                    format!(
                        "total_sv is {} but {} support vectors were found",
                        expected,
                        support_vectors.len()
                    ),
                ));
            }
        }

        Ok(SvrModel {
            kernel,
            rho,
            coefficients,
            support_vectors,
        })
    }
}
