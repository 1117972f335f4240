#![deny(missing_docs)]

//! Implementation of [Dancing Links](https://en.wikipedia.org/wiki/Dancing_Links)
//! and [Algorithm X](https://en.wikipedia.org/wiki/Knuth%27s_Algorithm_X) for
//! deciding [exact cover](https://en.wikipedia.org/wiki/Exact_cover) problems
//! where some columns carry a quota instead of being covered once.
//!
//! The main use is polyomino packing: every grid cell is a primary column that
//! must be covered exactly once, and every shape is a secondary column that
//! must be used exactly as many times as requested.
//!
//! ```
//! use quota_dlx::{Capacity, QuotaSolver};
//!
//! // Cover three cells in a row with one domino (shape 0) and one monomino
//! // (shape 1).
//! let capacity = Capacity {
//!     max_rows: 5,
//!     max_row_width: 3,
//! };
//! let mut solver = QuotaSolver::new(3, &[1, 1], capacity).unwrap();
//! let domino = solver.shape_column(0);
//! let monomino = solver.shape_column(1);
//!
//! solver.add_row(&[0, 1, domino], Some(0)).unwrap();
//! solver.add_row(&[1, 2, domino], Some(0)).unwrap();
//! for cell in 0..3 {
//!     solver.add_row(&[cell, monomino], Some(1)).unwrap();
//! }
//!
//! assert_eq!(solver.solve(), Some(vec![0, 4]));
//! ```

pub(crate) mod matrix;
pub mod placement;
pub mod polyomino;
pub mod puzzle;
pub(crate) mod solver;

pub use solver::{Capacity, Outcome, QuotaSolver, RowId, SearchStats, SolverError};
