use mdsweep_core::errors::{ErrorInfo, SweepError};
use mdsweep_core::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive arithmetic progression `start, start + step, ..., <= end`.
///
/// All arithmetic runs on integer units at the common scale of the three
/// bounds, so `(0.105, 0.115, 0.001)` yields exactly eleven values and the
/// last one is `0.115`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalRange {
    spec: RangeSpec,
    scale: u32,
    start: i128,
    step: i128,
    len: usize,
}

/// Raw start/end/step triple as written in a sweep plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
}

fn range_error(code: &str, message: impl Into<String>, spec: &RangeSpec) -> SweepError {
    SweepError::InvalidRange(
        ErrorInfo::new(code, message)
            .with_context("start", spec.start.to_string())
            .with_context("end", spec.end.to_string())
            .with_context("step", spec.step.to_string()),
    )
}

impl DecimalRange {
    /// Validates the triple and prepares the integer progression.
    pub fn new(start: Decimal, end: Decimal, step: Decimal) -> Result<Self, SweepError> {
        let spec = RangeSpec { start, end, step };
        if !step.is_positive() {
            return Err(range_error("range.step", "step must be positive", &spec));
        }
        if start > end {
            return Err(range_error(
                "range.order",
                "start must not exceed end",
                &spec,
            ));
        }
        let scale = start.scale().max(end.scale()).max(step.scale());
        let at_scale = |value: Decimal| {
            value
                .units_at(scale)
                .ok_or_else(|| range_error("range.scale", "bounds exceed decimal range", &spec))
        };
        let start_units = at_scale(start)?;
        let end_units = at_scale(end)?;
        let step_units = at_scale(step)?;
        let steps = (end_units - start_units) / step_units;
        let len = usize::try_from(steps)
            .ok()
            .and_then(|steps| steps.checked_add(1))
            .ok_or_else(|| range_error("range.len", "range has too many values", &spec))?;
        Ok(Self {
            spec,
            scale,
            start: start_units,
            step: step_units,
            len,
        })
    }

    pub fn start(&self) -> Decimal {
        self.spec.start
    }

    pub fn end(&self) -> Decimal {
        self.spec.end
    }

    pub fn step(&self) -> Decimal {
        self.spec.step
    }

    /// Number of values the range yields.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a valid range contains at least `start`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest scale among the bounds; every value fits in this many digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Starts a fresh pass over the range. May be called any number of times.
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            range: *self,
            index: 0,
        }
    }
}

impl TryFrom<RangeSpec> for DecimalRange {
    type Error = SweepError;

    fn try_from(spec: RangeSpec) -> Result<Self, Self::Error> {
        DecimalRange::new(spec.start, spec.end, spec.step)
    }
}

impl IntoIterator for &DecimalRange {
    type Item = Decimal;
    type IntoIter = RangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`DecimalRange`].
#[derive(Debug, Clone)]
pub struct RangeIter {
    range: DecimalRange,
    index: usize,
}

impl Iterator for RangeIter {
    type Item = Decimal;

    fn next(&mut self) -> Option<Decimal> {
        if self.index >= self.range.len {
            return None;
        }
        let units = self.range.start + self.range.step * self.index as i128;
        self.index += 1;
        // units stay within [start, end], which were representable at this scale
        Decimal::from_units(units, self.range.scale).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangeIter {}
