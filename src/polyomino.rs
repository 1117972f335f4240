//! A [polyomino](https://en.wikipedia.org/wiki/Polyomino) is a plane figure
//! made of unit squares joined edge to edge. This module stores the shapes
//! that get packed into a region and enumerates their distinct orientations.

use thiserror::Error;

/// Errors raised while constructing a [`Shape`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The mask was declared with a width of zero.
    #[error("width of shape must be non-zero")]
    ZeroWidth,
    /// The mask has no cells at all.
    #[error("mask cannot be empty")]
    EmptyMask,
    /// The mask length is not a multiple of the width.
    #[error("mask of length {len} does not divide into rows of width {width}")]
    RaggedMask {
        /// Declared width.
        width: usize,
        /// Number of cells supplied.
        len: usize,
    },
    /// Every cell of the mask is empty.
    #[error("no filled cells found, shape is empty")]
    NoFilledCells,
    /// A character other than `#` or `.` was found while parsing.
    #[error("unexpected character '{found}' at row {row}, column {column}")]
    UnexpectedCharacter {
        /// Zero-based row of the character.
        row: usize,
        /// Zero-based column of the character.
        column: usize,
        /// The character itself.
        found: char,
    },
}

/// Shape of a single polyomino, encoded as a binary mask.
///
/// The mask holds `height * width` elements in row-major order, so the cell in
/// row `i` and column `j` is at index `i * width + j`. Empty rows and columns
/// on the edges are always trimmed, which makes two shapes equal exactly when
/// they have the same cells up to translation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct Shape {
    width: usize,
    mask: Vec<bool>,
}

impl Shape {
    /// Create a shape from a mask of the given width, trimming empty rows and
    /// columns from every side.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is zero, the mask is empty or does not
    /// divide into whole rows, or no cell is filled.
    pub fn new(init_width: usize, init_mask: Vec<bool>) -> Result<Self, ShapeError> {
        if init_width == 0 {
            return Err(ShapeError::ZeroWidth);
        }
        if init_mask.is_empty() {
            return Err(ShapeError::EmptyMask);
        }
        if init_mask.len() % init_width != 0 {
            return Err(ShapeError::RaggedMask {
                width: init_width,
                len: init_mask.len(),
            });
        }

        let filled: Vec<(usize, usize)> = init_mask
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell)
            .map(|(index, _)| (index / init_width, index % init_width))
            .collect();

        let rows = filled.iter().map(|&(row, _)| row);
        let columns = filled.iter().map(|&(_, column)| column);
        let (Some(r1), Some(r2), Some(c1), Some(c2)) = (
            rows.clone().min(),
            rows.max(),
            columns.clone().min(),
            columns.max(),
        ) else {
            return Err(ShapeError::NoFilledCells);
        };

        let width = c2 - c1 + 1;
        let mask = (r1..=r2)
            .flat_map(|row| (c1..=c2).map(move |column| (row, column)))
            .map(|(row, column)| init_mask[row * init_width + column])
            .collect();

        Ok(Self { width, mask })
    }

    /// Parse a shape drawn with `#` for filled cells and `.` for empty ones,
    /// one row per line. Short rows are padded with empty cells and blank
    /// lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on any other character, or if no cell is filled.
    pub fn parse(input: &str) -> Result<Self, ShapeError> {
        let lines: Vec<&str> = input
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if width == 0 {
            return Err(ShapeError::EmptyMask);
        }

        let mut mask = Vec::with_capacity(width * lines.len());
        for (row, line) in lines.iter().enumerate() {
            for (column, found) in line.chars().enumerate() {
                match found {
                    '#' => mask.push(true),
                    '.' => mask.push(false),
                    found => {
                        return Err(ShapeError::UnexpectedCharacter { row, column, found });
                    }
                }
            }
            mask.resize((row + 1) * width, false);
        }

        Self::new(width, mask)
    }

    /// Get shape width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get shape height.
    pub fn height(&self) -> usize {
        self.mask.len() / self.width
    }

    /// Return true if the cell at `(row, column)` is filled.
    pub fn is_filled(&self, row: usize, column: usize) -> bool {
        row < self.height() && column < self.width && self.mask[row * self.width + column]
    }

    /// Number of filled cells.
    pub fn cell_count(&self) -> usize {
        self.mask.iter().filter(|&&cell| cell).count()
    }

    /// Return an iterator over the `(row, column)` offsets of the filled
    /// cells, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell)
            .map(move |(index, _)| (index / width, index % width))
    }

    /// Rotate the shape a quarter turn clockwise.
    pub fn rotate(&self) -> Self {
        let cols = self.width();
        let rows = self.height();
        let mut rotated = Vec::with_capacity(self.mask.len());

        for c in 0..cols {
            for r in (0..rows).rev() {
                rotated.push(self.mask[r * cols + c]);
            }
        }

        Self {
            width: rows,
            mask: rotated,
        }
    }

    /// Mirror the shape top to bottom.
    pub fn reflect(&self) -> Self {
        let mask = self
            .mask
            .chunks(self.width)
            .rev()
            .flatten()
            .copied()
            .collect();

        Self {
            width: self.width,
            mask,
        }
    }

    /// Return the distinct orientations reachable with `transform`, sorted
    /// and without duplicates. The shape itself is always included.
    pub fn orientations(&self, transform: ShapeTransform) -> Vec<Shape> {
        let mut orientations = match transform {
            ShapeTransform::NoTransform => vec![self.clone()],
            ShapeTransform::PureRotation => self.rotations(),
            ShapeTransform::FullSymmetry => {
                let mut rotations = self.rotations();
                let reflections: Vec<_> = rotations.iter().map(Shape::reflect).collect();
                rotations.extend(reflections);
                rotations
            }
        };

        orientations.sort();
        orientations.dedup();
        orientations
    }

    fn rotations(&self) -> Vec<Shape> {
        let mut rotations = vec![self.clone()];
        let mut current = self.clone();
        for _ in 0..3 {
            current = current.rotate();
            rotations.push(current.clone());
        }
        rotations
    }
}

impl<const W: usize, const H: usize> TryFrom<[[u8; W]; H]> for Shape {
    type Error = ShapeError;

    fn try_from(arr: [[u8; W]; H]) -> Result<Self, Self::Error> {
        let mask = arr.iter().flatten().map(|&cell| cell != 0).collect();

        Self::new(W, mask)
    }
}

/// Available transformations for shapes during packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeTransform {
    /// No transformation applied to the shape.
    NoTransform,
    /// Allow rotations of the shape.
    PureRotation,
    /// Allow rotations and reflections of the shape.
    #[default]
    FullSymmetry,
}
