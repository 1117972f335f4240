use crate::matrix::{Matrix, NodeIndex};
use std::time::Instant;
use thiserror::Error;

/// Identifier of a row in a [`QuotaSolver`], assigned in insertion order
/// starting from zero.
pub type RowId = usize;

/// Upper bounds used to pre-size the matrix of a [`QuotaSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capacity {
    /// Maximum number of rows that may be inserted.
    pub max_rows: usize,
    /// Maximum number of columns a single row may list.
    pub max_row_width: usize,
}

/// Errors raised while building a [`QuotaSolver`].
///
/// All of these are contract violations by the caller. A row that fails
/// validation is rejected before any link is written, so the matrix is left
/// exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The declared capacity does not fit in memory addressing.
    #[error("capacity of {max_rows} rows of width {max_row_width} overflows the node arena")]
    CapacityOverflow {
        /// Requested row bound.
        max_rows: usize,
        /// Requested row width bound.
        max_row_width: usize,
    },
    /// A grid has more cells than can be addressed as columns.
    #[error("grid of {width}x{height} cells overflows the column count")]
    GridTooLarge {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// More rows were inserted than declared.
    #[error("row capacity of {max_rows} exceeded")]
    RowCapacityExceeded {
        /// Declared row bound.
        max_rows: usize,
    },
    /// A row lists more columns than declared.
    #[error("row of width {width} exceeds the declared maximum width {max_row_width}")]
    RowTooWide {
        /// Number of columns in the rejected row.
        width: usize,
        /// Declared row width bound.
        max_row_width: usize,
    },
    /// A row lists no columns at all.
    #[error("row lists no columns")]
    EmptyRow,
    /// A row lists only its shape column. Rows are only reached through
    /// primary columns, so such a row could never be selected.
    #[error("row lists no primary column")]
    NoPrimaryColumn,
    /// A row refers to a column that does not exist.
    #[error("column {column} is out of range for a matrix with {num_columns} columns")]
    ColumnOutOfRange {
        /// The offending column index.
        column: usize,
        /// Total number of columns, primary and secondary.
        num_columns: usize,
    },
    /// A row lists the same column more than once.
    #[error("column {column} appears more than once in a row")]
    DuplicateColumn {
        /// The repeated column index.
        column: usize,
    },
    /// A row is owned by a shape that has no quota.
    #[error("shape {shape} is out of range for {num_shapes} shapes")]
    UnknownShape {
        /// The offending shape id.
        shape: usize,
        /// Number of declared shapes.
        num_shapes: usize,
    },
    /// A row lists a shape column that does not belong to its owning shape.
    #[error("row lists shape column {column} but is owned by {shape:?}")]
    ShapeColumnMismatch {
        /// The shape column found in the row.
        column: usize,
        /// The declared owner of the row.
        shape: Option<usize>,
    },
}

/// Result of a search that may be cut short by a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A selection of rows satisfying every constraint, in selection order.
    Satisfiable(Vec<RowId>),
    /// Every branch was explored without finding a solution.
    Unsatisfiable,
    /// The deadline passed before the search could finish.
    Cancelled,
}

impl Outcome {
    /// Return the selected rows if a solution was found.
    pub fn solution(self) -> Option<Vec<RowId>> {
        match self {
            Outcome::Satisfiable(rows) => Some(rows),
            Outcome::Unsatisfiable | Outcome::Cancelled => None,
        }
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Number of rows tentatively selected.
    pub branches: u64,
    /// Number of rows skipped because they would exceed their shape's quota.
    pub pruned: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quota {
    required: usize,
    used: usize,
}

impl Quota {
    fn take(&mut self) -> bool {
        self.used += 1;
        if self.used > self.required {
            self.used -= 1;
            false
        } else {
            true
        }
    }

    fn release(&mut self) {
        debug_assert!(self.used > 0);
        self.used -= 1;
    }

    fn is_met(&self) -> bool {
        self.used == self.required
    }
}

#[derive(Debug)]
enum Step {
    Found,
    Exhausted,
    Cancelled,
}

/// Exact cover solver whose secondary columns carry a usage quota.
///
/// Primary columns must be covered by exactly one selected row. Each
/// secondary column stands for a shape: every selected row owned by the
/// shape counts as one use, and a solution must use each shape exactly as
/// many times as its quota says.
///
/// Column indices `0..primary_columns` are primary; secondary column `s`
/// has index `primary_columns + s`.
///
/// A solver answers a single query. The solving methods consume it, since
/// the matrix is abandoned mid-search once an answer is known.
#[derive(Debug)]
pub struct QuotaSolver {
    matrix: Matrix,
    capacity: Capacity,
    quotas: Vec<Quota>,
    /// Owning shape of each row, indexed by `RowId`.
    row_shapes: Vec<Option<usize>>,

    // Values used to track the state of solving
    selected: Vec<RowId>,
    deadline: Option<Instant>,
    stats: SearchStats,
}

impl QuotaSolver {
    /// Create an empty solver with `primary_columns` primary columns and
    /// one secondary column per entry of `quotas`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::CapacityOverflow`] if `capacity` describes more
    /// nodes than can be addressed.
    pub fn new(
        primary_columns: usize,
        quotas: &[usize],
        capacity: Capacity,
    ) -> Result<Self, SolverError> {
        let data_nodes = capacity
            .max_rows
            .checked_mul(capacity.max_row_width)
            .filter(|nodes| {
                nodes
                    .checked_add(1 + primary_columns + quotas.len())
                    .is_some()
            })
            .ok_or(SolverError::CapacityOverflow {
                max_rows: capacity.max_rows,
                max_row_width: capacity.max_row_width,
            })?;

        Ok(QuotaSolver {
            matrix: Matrix::with_capacity(primary_columns, quotas.len(), data_nodes),
            capacity,
            quotas: quotas
                .iter()
                .map(|&required| Quota { required, used: 0 })
                .collect(),
            row_shapes: Vec::with_capacity(capacity.max_rows),
            selected: Vec::new(),
            deadline: None,
            stats: SearchStats::default(),
        })
    }

    /// Number of primary columns.
    pub fn num_primary_columns(&self) -> usize {
        self.matrix.num_columns() - self.quotas.len()
    }

    /// Number of secondary (shape) columns.
    pub fn num_shapes(&self) -> usize {
        self.quotas.len()
    }

    /// Number of rows inserted so far.
    pub fn num_rows(&self) -> usize {
        self.row_shapes.len()
    }

    /// Return the secondary column index of `shape`.
    pub fn shape_column(&self, shape: usize) -> usize {
        self.num_primary_columns() + shape
    }

    /// Insert a row covering `columns`, owned by `shape`.
    ///
    /// The row may list its owner's shape column; it may not list any other
    /// shape column. Insertion order only affects which solution is found
    /// first, not whether one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the row would exceed the declared [`Capacity`], or
    /// if it is empty, lists a column twice, lists an unknown column, lists a
    /// shape column other than its owner's, or lists no primary column.
    pub fn add_row(
        &mut self,
        columns: &[usize],
        shape: Option<usize>,
    ) -> Result<RowId, SolverError> {
        self.validate_row(columns, shape)?;

        let row = self.row_shapes.len();
        self.matrix.push_row(columns, row);
        self.row_shapes.push(shape);

        Ok(row)
    }

    fn validate_row(&self, columns: &[usize], shape: Option<usize>) -> Result<(), SolverError> {
        let Capacity {
            max_rows,
            max_row_width,
        } = self.capacity;

        if self.row_shapes.len() >= max_rows {
            return Err(SolverError::RowCapacityExceeded { max_rows });
        }
        if columns.len() > max_row_width {
            return Err(SolverError::RowTooWide {
                width: columns.len(),
                max_row_width,
            });
        }
        if columns.is_empty() {
            return Err(SolverError::EmptyRow);
        }
        if let Some(shape) = shape {
            if shape >= self.num_shapes() {
                return Err(SolverError::UnknownShape {
                    shape,
                    num_shapes: self.num_shapes(),
                });
            }
        }

        let num_columns = self.matrix.num_columns();
        for (index, &column) in columns.iter().enumerate() {
            if column >= num_columns {
                return Err(SolverError::ColumnOutOfRange {
                    column,
                    num_columns,
                });
            }
            if columns[..index].contains(&column) {
                return Err(SolverError::DuplicateColumn { column });
            }
            if !self.matrix.is_primary(column)
                && shape.map(|shape| self.shape_column(shape)) != Some(column)
            {
                return Err(SolverError::ShapeColumnMismatch { column, shape });
            }
        }
        if !columns.iter().any(|&column| self.matrix.is_primary(column)) {
            return Err(SolverError::NoPrimaryColumn);
        }

        Ok(())
    }

    /// Return true if some selection of rows covers every primary column
    /// exactly once and uses every shape exactly as often as its quota.
    pub fn solve_exists(self) -> bool {
        self.solve().is_some()
    }

    /// Return the rows of the first solution found, if any.
    pub fn solve(self) -> Option<Vec<RowId>> {
        self.solve_with_stats(None).0.solution()
    }

    /// Search until a solution is found, the search space is exhausted, or
    /// `deadline` passes.
    pub fn solve_until(self, deadline: Instant) -> Outcome {
        self.solve_with_stats(Some(deadline)).0
    }

    /// Search with an optional deadline and return the search counters along
    /// with the outcome.
    pub fn solve_with_stats(mut self, deadline: Option<Instant>) -> (Outcome, SearchStats) {
        debug_assert!(self.matrix.sizes_match_rings());

        self.deadline = deadline;
        let outcome = match self.search() {
            Step::Found => Outcome::Satisfiable(self.selected),
            Step::Exhausted => Outcome::Unsatisfiable,
            Step::Cancelled => Outcome::Cancelled,
        };

        log::debug!(
            "Search over [{}] rows finished with [{:?}] after [{}] branches, [{}] pruned.",
            self.row_shapes.len(),
            outcome,
            self.stats.branches,
            self.stats.pruned
        );

        (outcome, self.stats)
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Select the uncovered primary column with the fewest rows, preferring
    /// the earliest one on ties.
    fn choose_column(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;

        for column in self.matrix.uncovered_columns() {
            let size = self.matrix.size(column);
            if best.map_or(true, |(_, best_size)| size < best_size) {
                best = Some((column, size));

                if size == 0 {
                    break;
                }
            }
        }

        best.map(|(column, _)| column)
    }

    fn search(&mut self) -> Step {
        if self.matrix.is_exhausted() {
            return if self.quotas.iter().all(Quota::is_met) {
                Step::Found
            } else {
                Step::Exhausted
            };
        }

        let Some(column) = self.choose_column() else {
            return Step::Exhausted;
        };
        if self.matrix.size(column) == 0 {
            log::trace!("Column [{}] has no rows left.", column);
            return Step::Exhausted;
        }

        self.matrix.cover(column);

        let header = Matrix::header(column);
        let mut node = self.matrix.down(header);
        while node != header {
            match self.explore(node) {
                Step::Exhausted => {}
                // The matrix is abandoned from here on, nothing is restored.
                step => return step,
            }
            if self.deadline_passed() {
                return Step::Cancelled;
            }

            node = self.matrix.down(node);
        }

        self.matrix.uncover(column);

        Step::Exhausted
    }

    /// Tentatively select the row containing `node`, whose own column has
    /// already been covered, and search below it.
    fn explore(&mut self, node: NodeIndex) -> Step {
        let row = self.matrix.row_of(node);
        let shape = self.row_shapes[row];

        if let Some(shape) = shape {
            if !self.quotas[shape].take() {
                log::trace!("Row [{}] would exceed the quota of shape [{}].", row, shape);
                self.stats.pruned += 1;
                return Step::Exhausted;
            }
        }
        self.stats.branches += 1;
        self.selected.push(row);

        // Shape columns are tracked by their quota and never covered, since
        // that would remove every other placement of the same shape.
        let mut other = self.matrix.right(node);
        while other != node {
            let column = self.matrix.column_of(other);
            if self.matrix.is_primary(column) {
                self.matrix.cover(column);
            }
            other = self.matrix.right(other);
        }

        let step = self.search();
        if let Step::Exhausted = step {
            let mut other = self.matrix.left(node);
            while other != node {
                let column = self.matrix.column_of(other);
                if self.matrix.is_primary(column) {
                    self.matrix.uncover(column);
                }
                other = self.matrix.left(other);
            }

            self.selected.pop();
            if let Some(shape) = shape {
                self.quotas[shape].release();
            }
        }

        step
    }
}
