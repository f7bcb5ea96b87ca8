use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;

/// Scalars shared by every job of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedScalars {
    /// Number of decoding experiments each job performs.
    pub num_experiments: u64,
    /// Error model name forwarded to the workload (e.g. `Bitflip`).
    pub error_model: String,
    /// Decoder bias probability.
    pub bias_prob: Decimal,
    /// Worker process count used inside the workload.
    pub num_processes: u32,
    /// Suppress progress output inside the workload.
    #[serde(default)]
    pub silent: bool,
}

/// One point of the sweep grid together with the shared scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTuple {
    /// Seed handed to the workload's random number generator.
    pub seed: u64,
    /// Linear size of the code lattice.
    pub lattice_size: u32,
    /// Maximum bond dimension kept during contraction.
    pub bond_dim: u32,
    /// Physical error rate.
    pub error_rate: Decimal,
    /// Scalars identical for every tuple of the sweep.
    pub fixed: FixedScalars,
}

impl ParameterTuple {
    /// Named workload arguments in invocation order.
    ///
    /// The silent flag is a bare switch and is only emitted when set.
    pub fn named_args(&self) -> Vec<(&'static str, Option<String>)> {
        let mut args = vec![
            ("lattice_size", Some(self.lattice_size.to_string())),
            ("bond_dim", Some(self.bond_dim.to_string())),
            ("error_rate", Some(self.error_rate.to_string())),
            ("num_experiments", Some(self.fixed.num_experiments.to_string())),
            ("bias_prob", Some(self.fixed.bias_prob.to_string())),
            ("error_model", Some(self.fixed.error_model.clone())),
            ("seed", Some(self.seed.to_string())),
            ("num_processes", Some(self.fixed.num_processes.to_string())),
        ];
        if self.fixed.silent {
            args.push(("silent", None));
        }
        args
    }

    /// Flattens [`ParameterTuple::named_args`] into `--name value` tokens.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for (name, value) in self.named_args() {
            tokens.push(format!("--{name}"));
            if let Some(value) = value {
                tokens.push(value);
            }
        }
        tokens
    }
}
