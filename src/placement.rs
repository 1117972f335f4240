//! Every position a set of shapes can take inside a rectangular region, and
//! the translation of those positions into rows of a [`QuotaSolver`].

use crate::{
    polyomino::{Shape, ShapeTransform},
    solver::{Capacity, QuotaSolver, RowId, SolverError},
};

/// A rectangular grid together with the number of times each shape must be
/// placed in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    /// Number of grid columns.
    pub width: usize,
    /// Number of grid rows.
    pub height: usize,
    /// Required number of placements of each shape, indexed like the list of
    /// shapes the region is checked against.
    pub counts: Vec<usize>,
}

impl Region {
    /// Create a new region of `width` × `height` cells.
    pub fn new(width: usize, height: usize, counts: Vec<usize>) -> Self {
        Region {
            width,
            height,
            counts,
        }
    }

    /// Number of cells in the grid, saturating at `usize::MAX`.
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Number of cells in the grid, or `None` if it overflows.
    pub fn checked_area(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Total number of cells the required shapes occupy, saturating at
    /// `usize::MAX`.
    pub fn required_cells(&self, shapes: &[Shape]) -> usize {
        self.checked_required_cells(shapes).unwrap_or(usize::MAX)
    }

    /// Total number of cells the required shapes occupy, or `None` if it
    /// overflows.
    pub fn checked_required_cells(&self, shapes: &[Shape]) -> Option<usize> {
        self.counts
            .iter()
            .zip(shapes)
            .try_fold(0usize, |total, (&count, shape)| {
                count.checked_mul(shape.cell_count())?.checked_add(total)
            })
    }

    /// The primary column standing for the cell at `(row, column)`.
    pub fn cell_column(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }
}

/// How the cells of a region have to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitMode {
    /// The shapes must cover every cell exactly once.
    #[default]
    Exact,
    /// The shapes must not overlap, but cells may be left empty.
    Packing,
}

/// A possible placement of one orientation of a shape in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    /// Index of the shape, or of the hole pseudo-shape in packing mode.
    pub shape_index: usize,
    /// Coordinates `(row, column)` of the cells occupied in the grid.
    pub occupied_cells: Vec<(usize, usize)>,
}

/// All placements for one region, ready to be turned into a solver.
///
/// Placement `i` becomes row `i` of the solver, so a solution's [`RowId`]s
/// index straight into [`placements`](Self::placements).
#[derive(Debug, Clone)]
pub struct PlacementSet {
    placements: Vec<Placement>,
    quotas: Vec<usize>,
    width: usize,
    height: usize,
    hole: Option<usize>,
}

impl PlacementSet {
    /// Enumerate every distinct orientation of every required shape at every
    /// offset where it fits inside `region`.
    ///
    /// Shapes with a count of zero produce no placements. In
    /// [`FitMode::Packing`] an extra monomino "hole" shape is appended after
    /// the region's counts, required exactly as many times as there are
    /// cells left over.
    pub fn generate(
        region: &Region,
        shapes: &[Shape],
        transform: ShapeTransform,
        mode: FitMode,
    ) -> Self {
        let mut placements = Vec::new();
        for (shape_index, (shape, &count)) in shapes.iter().zip(&region.counts).enumerate() {
            if count == 0 {
                continue;
            }

            for orientation in shape.orientations(transform) {
                // If the orientation is larger than the grid, skip it.
                if orientation.height() > region.height || orientation.width() > region.width {
                    continue;
                }

                for top in 0..=region.height - orientation.height() {
                    for left in 0..=region.width - orientation.width() {
                        placements.push(Placement {
                            shape_index,
                            occupied_cells: orientation
                                .cells()
                                .map(|(row, column)| (top + row, left + column))
                                .collect(),
                        });
                    }
                }
            }
        }

        let mut quotas = region.counts.clone();
        let hole = match mode {
            FitMode::Exact => None,
            FitMode::Packing => {
                let hole = quotas.len();
                let holes = region.area().saturating_sub(region.required_cells(shapes));
                quotas.push(holes);

                if holes > 0 {
                    placements.extend((0..region.height).flat_map(|row| {
                        (0..region.width).map(move |column| Placement {
                            shape_index: hole,
                            occupied_cells: vec![(row, column)],
                        })
                    }));
                }

                Some(hole)
            }
        };

        log::debug!(
            "Generated [{}] placements for a [{}x{}] region with counts [{:?}].",
            placements.len(),
            region.width,
            region.height,
            region.counts
        );

        PlacementSet {
            placements,
            quotas,
            width: region.width,
            height: region.height,
            hole,
        }
    }

    /// Return the list of placements, in row order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Return the placement that became the given solver row.
    pub fn placement(&self, row: RowId) -> Option<&Placement> {
        self.placements.get(row)
    }

    /// Return the quota of every shape column, including the hole shape in
    /// packing mode.
    pub fn quotas(&self) -> &[usize] {
        &self.quotas
    }

    /// Return the index of the hole pseudo-shape, if there is one.
    pub fn hole_shape(&self) -> Option<usize> {
        self.hole
    }

    /// The exact bounds needed to hold every placement: one row per
    /// placement, each as wide as its cells plus the shape column.
    pub fn capacity(&self) -> Capacity {
        Capacity {
            max_rows: self.placements.len(),
            max_row_width: self
                .placements
                .iter()
                .map(|placement| placement.occupied_cells.len() + 1)
                .max()
                .unwrap_or(0),
        }
    }

    /// Build a solver with one primary column per grid cell, one shape column
    /// per quota, and one row per placement.
    ///
    /// # Errors
    ///
    /// Propagates any [`SolverError`] from building the matrix. Rows built
    /// from generated placements always fit the computed capacity.
    pub fn to_solver(&self) -> Result<QuotaSolver, SolverError> {
        let capacity = self.capacity();
        let mut solver = QuotaSolver::new(self.width * self.height, &self.quotas, capacity)?;

        let mut columns = Vec::with_capacity(capacity.max_row_width);
        for placement in &self.placements {
            columns.clear();
            columns.extend(
                placement
                    .occupied_cells
                    .iter()
                    .map(|&(row, column)| row * self.width + column),
            );
            columns.push(solver.shape_column(placement.shape_index));

            solver.add_row(&columns, Some(placement.shape_index))?;
        }

        Ok(solver)
    }
}
