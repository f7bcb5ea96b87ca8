use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use mdsweep_core::errors::{ErrorInfo, SweepError};
use mdsweep_core::{Decimal, FixedScalars, ParameterTuple};
use serde::{Deserialize, Serialize};

use crate::descriptor::ResourcePlan;
use crate::grid::{Grid, GridIter};
use crate::naming::{Job, JobNamer};
use crate::range::{DecimalRange, RangeSpec};
use crate::scheduler::SchedulerSpec;
use crate::serde::{content_hash, from_yaml_slice, to_yaml_string};
use crate::workload::WorkloadSpec;

fn config_error(code: &str, message: impl Into<String>) -> SweepError {
    SweepError::Config(ErrorInfo::new(code, message))
}

/// Error-rate axis: an explicit list or a generated inclusive range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateAxis {
    Range { range: RangeSpec },
    Values(Vec<Decimal>),
}

impl RateAxis {
    /// Materialises the axis, validating a generated range.
    pub fn values(&self) -> Result<Vec<Decimal>, SweepError> {
        match self {
            RateAxis::Range { range } => Ok(DecimalRange::try_from(*range)?.iter().collect()),
            RateAxis::Values(values) => Ok(values.clone()),
        }
    }
}

/// Swept parameter axes. Enumeration order is seed, lattice size, bond
/// dimension, error rate (outermost first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxesSpec {
    pub seeds: Vec<u64>,
    pub lattice_sizes: Vec<u32>,
    pub bond_dims: Vec<u32>,
    pub error_rates: RateAxis,
}

/// Complete sweep configuration, read once before dispatch starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Run label leading every job id.
    #[serde(default = "SweepPlan::default_label")]
    pub label: String,
    pub axes: AxesSpec,
    pub fixed: FixedScalars,
    pub workload: WorkloadSpec,
    pub resources: ResourcePlan,
    #[serde(default)]
    pub scheduler: SchedulerSpec,
    /// Fraction digits used for the error rate inside job ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_precision: Option<u32>,
}

impl SweepPlan {
    fn default_label() -> String {
        "decoding".to_string()
    }

    /// Checks every axis domain and scalar; any failure is fatal.
    pub fn validate(&self) -> Result<(), SweepError> {
        let rates = self.axes.error_rates.values()?;
        require_distinct("seeds", &self.axes.seeds)?;
        require_distinct("lattice_sizes", &self.axes.lattice_sizes)?;
        require_distinct("bond_dims", &self.axes.bond_dims)?;
        require_distinct("error_rates", &rates)?;
        if self.axes.lattice_sizes.contains(&0) {
            return Err(config_error("plan.lattice_sizes", "lattice sizes must be positive"));
        }
        if self.axes.bond_dims.contains(&0) {
            return Err(config_error("plan.bond_dims", "bond dimensions must be positive"));
        }
        let one = Decimal::from(1i64);
        if let Some(rate) = rates.iter().find(|rate| !rate.is_positive() || **rate > one) {
            return Err(SweepError::Config(
                ErrorInfo::new("plan.error_rates", "error rates must lie in (0, 1]")
                    .with_context("rate", rate.to_string()),
            ));
        }
        if self.fixed.bias_prob.is_negative() || self.fixed.bias_prob > one {
            return Err(config_error("plan.bias_prob", "bias probability must lie in [0, 1]"));
        }
        if self.fixed.num_experiments == 0 {
            return Err(config_error("plan.num_experiments", "num_experiments must be positive"));
        }
        if self.fixed.num_processes == 0 {
            return Err(config_error("plan.num_processes", "num_processes must be positive"));
        }
        if self.fixed.error_model.trim().is_empty() {
            return Err(config_error("plan.error_model", "error model must not be empty"));
        }
        if self.workload.program.trim().is_empty() {
            return Err(config_error("plan.workload", "workload program must not be empty"));
        }
        if self.scheduler.submit_command.trim().is_empty() {
            return Err(config_error("plan.scheduler", "submit command must not be empty"));
        }
        self.resources.validate()?;
        JobNamer::new(&self.label, &rates, self.rate_precision)?;
        Ok(())
    }

    /// Deterministic SHA-256 of the plan contents.
    pub fn plan_hash(&self) -> Result<String, SweepError> {
        content_hash(self)
    }

    pub fn to_yaml_string(&self) -> Result<String, SweepError> {
        to_yaml_string(self)
    }

    /// Namer configured for this plan's label and error-rate axis.
    pub fn namer(&self) -> Result<JobNamer, SweepError> {
        let rates = self.axes.error_rates.values()?;
        JobNamer::new(&self.label, &rates, self.rate_precision)
    }

    /// Lazily enumerates every job of the sweep in dispatch order.
    pub fn jobs(&self) -> Result<Jobs, SweepError> {
        let error_rates = self.axes.error_rates.values()?;
        let namer = JobNamer::new(&self.label, &error_rates, self.rate_precision)?;
        let grid = Grid::new(vec![
            self.axes.seeds.len(),
            self.axes.lattice_sizes.len(),
            self.axes.bond_dims.len(),
            error_rates.len(),
        ]);
        Ok(Jobs {
            seeds: self.axes.seeds.clone(),
            lattice_sizes: self.axes.lattice_sizes.clone(),
            bond_dims: self.axes.bond_dims.clone(),
            error_rates,
            fixed: self.fixed.clone(),
            namer,
            cells: grid.iter(),
            index: 0,
        })
    }
}

fn require_distinct<T: Ord + Display>(axis: &str, values: &[T]) -> Result<(), SweepError> {
    if values.is_empty() {
        return Err(SweepError::Config(
            ErrorInfo::new("plan.axes", "axis has no values")
                .with_context("axis", axis.to_string()),
        ));
    }
    let mut seen = BTreeSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(SweepError::Config(
                ErrorInfo::new("plan.axes", "axis repeats a value")
                    .with_context("axis", axis.to_string())
                    .with_context("value", value.to_string()),
            ));
        }
    }
    Ok(())
}

/// Iterator over the jobs of a plan, produced by [`SweepPlan::jobs`].
#[derive(Debug, Clone)]
pub struct Jobs {
    seeds: Vec<u64>,
    lattice_sizes: Vec<u32>,
    bond_dims: Vec<u32>,
    error_rates: Vec<Decimal>,
    fixed: FixedScalars,
    namer: JobNamer,
    cells: GridIter,
    index: usize,
}

impl Iterator for Jobs {
    type Item = Result<Job, SweepError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.cells.next()?;
        let tuple = ParameterTuple {
            seed: self.seeds[cell[0]],
            lattice_size: self.lattice_sizes[cell[1]],
            bond_dim: self.bond_dims[cell[2]],
            error_rate: self.error_rates[cell[3]],
            fixed: self.fixed.clone(),
        };
        let index = self.index;
        self.index += 1;
        Some(self.namer.name(&tuple).map(|id| Job { index, id, tuple }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cells.size_hint()
    }
}

impl ExactSizeIterator for Jobs {}

/// Loads and validates a sweep plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, SweepError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| {
        SweepError::Config(
            ErrorInfo::new("plan.read", err.to_string())
                .with_context("path", plan_path.display().to_string()),
        )
    })?;
    let plan: SweepPlan = from_yaml_slice(&bytes)?;
    plan.validate()?;
    Ok(plan)
}
