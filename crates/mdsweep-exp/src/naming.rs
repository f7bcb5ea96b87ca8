use std::fmt;

use mdsweep_core::errors::{ErrorInfo, SweepError};
use mdsweep_core::{Decimal, ParameterTuple};
use serde::{Deserialize, Serialize};

/// Scheduler- and filesystem-safe identifier of one sweep job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parameter tuple together with its position and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Zero based position in dispatch order.
    pub index: usize,
    pub id: JobId,
    pub tuple: ParameterTuple,
}

/// Keeps ASCII letters, digits and `-`; everything else is dropped.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .collect()
}

/// Maps parameter tuples to job identifiers.
///
/// Layout: `{label}_latticesize{L}_bonddim{chi}_errorrate{p}_errormodel{m}_seed{s}`
/// where `p` carries exactly `rate_precision` fraction digits and its decimal
/// point is written as `p` (`0.105` becomes `0p105`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNamer {
    label: String,
    rate_precision: u32,
}

impl JobNamer {
    /// Builds a namer able to render every rate in `rates`.
    ///
    /// With `pinned` unset the precision is the largest scale among `rates`.
    /// A pinned precision below that would merge distinct rates and is
    /// rejected.
    pub fn new(label: &str, rates: &[Decimal], pinned: Option<u32>) -> Result<Self, SweepError> {
        let clean = sanitize_component(label);
        if clean.is_empty() {
            return Err(SweepError::Config(
                ErrorInfo::new("naming.label", "run label has no name-safe characters")
                    .with_context("label", label.to_string()),
            ));
        }
        let needed = rates.iter().map(Decimal::scale).max().unwrap_or(0);
        let rate_precision = match pinned {
            Some(precision) if precision < needed => {
                return Err(SweepError::Config(
                    ErrorInfo::new(
                        "naming.precision",
                        format!(
                            "rate precision {precision} is below the {needed} digits the error-rate axis needs"
                        ),
                    )
                    .with_hint("drop rate_precision or raise it"),
                ))
            }
            Some(precision) => precision,
            None => needed,
        };
        Ok(Self {
            label: clean,
            rate_precision,
        })
    }

    pub fn rate_precision(&self) -> u32 {
        self.rate_precision
    }

    pub fn name(&self, tuple: &ParameterTuple) -> Result<JobId, SweepError> {
        let rate = tuple.error_rate.to_fixed(self.rate_precision)?.replace('.', "p");
        let model = sanitize_component(&tuple.fixed.error_model);
        Ok(JobId(format!(
            "{}_latticesize{}_bonddim{}_errorrate{}_errormodel{}_seed{}",
            self.label, tuple.lattice_size, tuple.bond_dim, rate, model, tuple.seed
        )))
    }
}

#[cfg(test)]
mod tests {
    use mdsweep_core::FixedScalars;

    use super::*;

    fn tuple(rate: &str) -> ParameterTuple {
        ParameterTuple {
            seed: 123,
            lattice_size: 5,
            bond_dim: 64,
            error_rate: rate.parse().unwrap(),
            fixed: FixedScalars {
                num_experiments: 10,
                error_model: "Bit flip".to_string(),
                bias_prob: "0.1".parse().unwrap(),
                num_processes: 1,
                silent: false,
            },
        }
    }

    #[test]
    fn renders_documented_layout() {
        let rates: [Decimal; 1] = ["0.105".parse().unwrap()];
        let namer = JobNamer::new("decoding", &rates, None).unwrap();
        assert_eq!(
            namer.name(&tuple("0.105")).unwrap().as_str(),
            "decoding_latticesize5_bonddim64_errorrate0p105_errormodelBitflip_seed123"
        );
    }

    #[test]
    fn pads_to_axis_precision() {
        let rates: Vec<Decimal> = ["0.1", "0.125"].iter().map(|r| r.parse().unwrap()).collect();
        let namer = JobNamer::new("decoding", &rates, None).unwrap();
        assert_eq!(namer.rate_precision(), 3);
        assert!(namer.name(&tuple("0.1")).unwrap().as_str().contains("errorrate0p100_"));
    }

    #[test]
    fn rejects_lossy_pinned_precision() {
        let rates: [Decimal; 1] = ["0.125".parse().unwrap()];
        let err = JobNamer::new("decoding", &rates, Some(2)).unwrap_err();
        assert_eq!(err.info().code, "naming.precision");
        assert!(JobNamer::new("...", &rates, None).is_err());
    }
}
