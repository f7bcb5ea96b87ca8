/// Cartesian product over axes of the given lengths, yielding index vectors.
///
/// The first axis varies slowest and the last axis fastest. A grid with no
/// axes yields one empty combination; a grid containing an empty axis
/// yields nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    lengths: Vec<usize>,
}

impl Grid {
    pub fn new(lengths: Vec<usize>) -> Self {
        Self { lengths }
    }

    pub fn axes(&self) -> usize {
        self.lengths.len()
    }

    /// Number of combinations, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.lengths
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len))
            .unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> GridIter {
        let next = if self.lengths.contains(&0) {
            None
        } else {
            Some(vec![0; self.lengths.len()])
        };
        GridIter {
            lengths: self.lengths.clone(),
            next,
            remaining: self.len(),
        }
    }
}

/// Lazy odometer over a [`Grid`].
#[derive(Debug, Clone)]
pub struct GridIter {
    lengths: Vec<usize>,
    next: Option<Vec<usize>>,
    remaining: usize,
}

impl Iterator for GridIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        self.remaining = self.remaining.saturating_sub(1);
        let mut advanced = current.clone();
        for axis in (0..advanced.len()).rev() {
            advanced[axis] += 1;
            if advanced[axis] < self.lengths[axis] {
                self.next = Some(advanced);
                return Some(current);
            }
            advanced[axis] = 0;
        }
        // every axis wrapped: the odometer is exhausted
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for GridIter {}

/// Value-level cartesian product over borrowed axes.
pub fn cartesian<T: Clone>(axes: &[Vec<T>]) -> impl Iterator<Item = Vec<T>> + '_ {
    let grid = Grid::new(axes.iter().map(Vec::len).collect());
    grid.iter().map(move |indices| {
        indices
            .iter()
            .zip(axes)
            .map(|(&idx, axis)| axis[idx].clone())
            .collect()
    })
}
