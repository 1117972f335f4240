//! A packing puzzle: a list of shapes followed by a list of regions, each
//! asking whether given numbers of those shapes fit in a grid.
//!
//! # Expected Format
//!
//! ```text
//! 0:
//! ###
//! ##.
//! ##.
//!
//! 1:
//! .#
//! ##
//!
//! 4x4: 1 2
//! 12x5: 3 0
//! ```
//!
//! Each shape block starts with its index followed by a colon, and is drawn
//! with `#` for filled cells and `.` for empty ones. Indices start at zero and
//! must be consecutive. Every region line gives `<width>x<height>:` followed by
//! one count per shape.

use crate::{
    placement::{FitMode, PlacementSet, Region},
    polyomino::{Shape, ShapeError, ShapeTransform},
    solver::{Outcome, SolverError},
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::{
    num::ParseIntError,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Errors raised while parsing a [`Puzzle`]. Line numbers start at one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line is neither a shape header, a shape row, nor a region.
    #[error("line {line}: expected a shape header or a region, got '{found}'")]
    UnexpectedLine {
        /// Line number.
        line: usize,
        /// Contents of the line.
        found: String,
    },
    /// A shape header has something after its colon.
    #[error("line {line}: expected shape header format '<index>:', got '{found}'")]
    WrongHeader {
        /// Line number.
        line: usize,
        /// Contents of the line.
        found: String,
    },
    /// Shape indices are not consecutive from zero.
    #[error("line {line}: expected shape {expected}, got shape {found}")]
    ShapeIndex {
        /// Line number of the header.
        line: usize,
        /// The next index in sequence.
        expected: usize,
        /// The index found in the header.
        found: usize,
    },
    /// A shape drawing is invalid.
    #[error("line {line}: could not parse shape")]
    Shape {
        /// Line number of the shape header.
        line: usize,
        /// Underlying shape error.
        source: ShapeError,
    },
    /// A number could not be parsed.
    #[error("line {line}: could not parse a number")]
    Number {
        /// Line number.
        line: usize,
        /// Underlying integer parsing error.
        source: ParseIntError,
    },
    /// A region's area or its required cell count overflows.
    #[error("line {line}: region is too large to check")]
    RegionTooLarge {
        /// Line number of the region.
        line: usize,
    },
    /// A region does not give exactly one count per shape.
    #[error("line {line}: got {found} counts, but there are {expected} shapes")]
    CountMismatch {
        /// Line number of the region.
        line: usize,
        /// Number of shapes.
        expected: usize,
        /// Number of counts on the line.
        found: usize,
    },
}

/// Settings applied to every region of a puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitOptions {
    /// Which orientations of each shape may be used.
    pub transform: ShapeTransform,
    /// Whether every cell must be covered.
    pub mode: FitMode,
    /// Give up on a region after this long.
    pub timeout: Option<Duration>,
}

/// Answer for a single region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The shapes fit.
    Fits,
    /// The shapes cannot fit.
    DoesNotFit,
    /// The timeout passed before the search finished.
    TimedOut,
}

/// Answers for every region of a puzzle, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    /// One verdict per region.
    pub verdicts: Vec<Verdict>,
}

impl Report {
    fn count(&self, verdict: Verdict) -> usize {
        self.verdicts.iter().filter(|&&v| v == verdict).count()
    }

    /// Number of regions the shapes fit in.
    pub fn fits(&self) -> usize {
        self.count(Verdict::Fits)
    }

    /// Number of regions the shapes cannot fit in.
    pub fn does_not_fit(&self) -> usize {
        self.count(Verdict::DoesNotFit)
    }

    /// Number of regions that were abandoned at the timeout.
    pub fn timed_out(&self) -> usize {
        self.count(Verdict::TimedOut)
    }
}

/// An instance of a packing puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// The shapes available for packing.
    pub shapes: Vec<Shape>,
    /// The regions to check, each with one count per shape.
    pub regions: Vec<Region>,
}

impl Puzzle {
    /// Parse a puzzle in the format described in the [module
    /// documentation](self).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the first offending line.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut shapes = Vec::new();
        let mut regions = Vec::new();

        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_end()))
            .peekable();

        while let Some((line_number, line)) = lines.next() {
            if line.is_empty() {
                continue;
            }

            let Some((head, rest)) = line.split_once(':') else {
                return Err(ParseError::UnexpectedLine {
                    line: line_number,
                    found: line.to_string(),
                });
            };

            if head.contains('x') {
                regions.push((line_number, parse_region(line_number, head, rest)?));
                continue;
            }

            if !rest.trim().is_empty() {
                return Err(ParseError::WrongHeader {
                    line: line_number,
                    found: line.to_string(),
                });
            }
            let index: usize = parse_number(line_number, head)?;
            if index != shapes.len() {
                return Err(ParseError::ShapeIndex {
                    line: line_number,
                    expected: shapes.len(),
                    found: index,
                });
            }

            let mut drawing = String::new();
            while let Some(&(_, row)) = lines.peek() {
                if row.is_empty() || row.contains(':') {
                    break;
                }
                drawing.push_str(row);
                drawing.push('\n');
                lines.next();
            }

            let shape = Shape::parse(&drawing).map_err(|source| ParseError::Shape {
                line: line_number,
                source,
            })?;
            shapes.push(shape);
        }

        for (line, region) in &regions {
            if region.counts.len() != shapes.len() {
                return Err(ParseError::CountMismatch {
                    line: *line,
                    expected: shapes.len(),
                    found: region.counts.len(),
                });
            }
            if region.checked_area().is_none() || region.checked_required_cells(&shapes).is_none() {
                return Err(ParseError::RegionTooLarge { line: *line });
            }
        }

        log::debug!(
            "Parsed puzzle with [{}] shapes and [{}] regions.",
            shapes.len(),
            regions.len()
        );

        Ok(Puzzle {
            shapes,
            regions: regions.into_iter().map(|(_, region)| region).collect(),
        })
    }

    /// Decide whether the required shapes fit in `region`.
    ///
    /// Regions whose required cell count already rules out a fit are
    /// rejected without building a matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::GridTooLarge`] if the region's area overflows,
    /// and propagates any other [`SolverError`] from building the matrix.
    pub fn check_region(
        &self,
        region: &Region,
        options: &FitOptions,
    ) -> Result<Verdict, SolverError> {
        let area = region.checked_area().ok_or(SolverError::GridTooLarge {
            width: region.width,
            height: region.height,
        })?;
        // More cells than can be counted never fit in an addressable grid.
        let required = region.checked_required_cells(&self.shapes).unwrap_or(usize::MAX);
        let impossible = match options.mode {
            FitMode::Exact => required != area,
            FitMode::Packing => required > area,
        };
        if impossible {
            log::debug!(
                "Region [{}x{}] needs [{}] cells but has [{}].",
                region.width,
                region.height,
                required,
                area
            );
            return Ok(Verdict::DoesNotFit);
        }

        let placements =
            PlacementSet::generate(region, &self.shapes, options.transform, options.mode);
        let solver = placements.to_solver()?;
        let deadline = options.timeout.map(|timeout| Instant::now() + timeout);

        let (outcome, _) = solver.solve_with_stats(deadline);
        Ok(match outcome {
            Outcome::Satisfiable(_) => Verdict::Fits,
            Outcome::Unsatisfiable => Verdict::DoesNotFit,
            Outcome::Cancelled => Verdict::TimedOut,
        })
    }

    /// Check every region, each with its own solver, in parallel.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SolverError`] raised by any region.
    pub fn check_all(&self, options: &FitOptions) -> Result<Report, SolverError> {
        let total = self.regions.len();
        let completed = AtomicUsize::new(0);

        let verdicts = self
            .regions
            .par_iter()
            .map(|region| {
                let verdict = self.check_region(region, options);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log::info!("Completed {}/{}", done, total);

                verdict
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Report { verdicts })
    }
}

fn parse_number(line: usize, input: &str) -> Result<usize, ParseError> {
    input
        .trim()
        .parse()
        .map_err(|source| ParseError::Number { line, source })
}

fn parse_region(line: usize, size: &str, counts: &str) -> Result<Region, ParseError> {
    let Some((width, height)) = size.split_once('x') else {
        return Err(ParseError::UnexpectedLine {
            line,
            found: size.to_string(),
        });
    };

    let counts = counts
        .split_whitespace()
        .map(|count| parse_number(line, count))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Region::new(
        parse_number(line, width)?,
        parse_number(line, height)?,
        counts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
0:
##
#.

1:
#

2x2: 1 1
2x2: 1 0
3x2: 2 0
2x2: 0 4
1x1: 1 0
";

    #[test]
    fn parse_small_puzzle() {
        let puzzle = Puzzle::parse(SMALL).unwrap();

        assert_eq!(puzzle.shapes.len(), 2);
        assert_eq!(puzzle.shapes[0].cell_count(), 3);
        assert_eq!(puzzle.shapes[1].cell_count(), 1);
        assert_eq!(
            puzzle.regions,
            vec![
                Region::new(2, 2, vec![1, 1]),
                Region::new(2, 2, vec![1, 0]),
                Region::new(3, 2, vec![2, 0]),
                Region::new(2, 2, vec![0, 4]),
                Region::new(1, 1, vec![1, 0]),
            ]
        );
    }

    #[test]
    fn parse_tolerates_trailing_whitespace_and_blank_lines() {
        let puzzle = Puzzle::parse("\n\n0:  \n#.# \n###\n\n\n\n3x2:   1 \n\n").unwrap();

        assert_eq!(puzzle.shapes.len(), 1);
        assert_eq!(puzzle.regions, vec![Region::new(3, 2, vec![1])]);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            Puzzle::parse("0:\n#\n\nhello\n"),
            Err(ParseError::UnexpectedLine { line: 4, .. })
        ));
        assert!(matches!(
            Puzzle::parse("0: #\n"),
            Err(ParseError::WrongHeader { line: 1, .. })
        ));
        assert!(matches!(
            Puzzle::parse("0:\n#\n\n2:\n#\n"),
            Err(ParseError::ShapeIndex {
                line: 4,
                expected: 1,
                found: 2
            })
        ));
        assert!(matches!(
            Puzzle::parse("0:\n#?\n"),
            Err(ParseError::Shape {
                line: 1,
                source: ShapeError::UnexpectedCharacter { found: '?', .. }
            })
        ));
        assert!(matches!(
            Puzzle::parse("0:\n\n"),
            Err(ParseError::Shape {
                line: 1,
                source: ShapeError::EmptyMask
            })
        ));
        assert!(matches!(
            Puzzle::parse("0:\n#\n\n3xA: 1\n"),
            Err(ParseError::Number { line: 4, .. })
        ));
        assert_eq!(
            Puzzle::parse("0:\n##\n\n2x1: 18446744073709551615\n"),
            Err(ParseError::RegionTooLarge { line: 4 })
        );
        assert_eq!(
            Puzzle::parse("0:\n#\n\n18446744073709551615x2: 1\n"),
            Err(ParseError::RegionTooLarge { line: 4 })
        );
        assert!(matches!(
            Puzzle::parse("0:\n#\n\n3x3: 1 2\n"),
            Err(ParseError::CountMismatch {
                line: 4,
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn check_small_puzzle_exact() {
        let puzzle = Puzzle::parse(SMALL).unwrap();
        let report = puzzle.check_all(&FitOptions::default()).unwrap();

        assert_eq!(
            report.verdicts,
            vec![
                Verdict::Fits,
                Verdict::DoesNotFit,
                Verdict::Fits,
                Verdict::Fits,
                Verdict::DoesNotFit,
            ]
        );
        assert_eq!(report.fits(), 3);
        assert_eq!(report.does_not_fit(), 2);
        assert_eq!(report.timed_out(), 0);
    }

    #[test]
    fn check_small_puzzle_packing() {
        let puzzle = Puzzle::parse(SMALL).unwrap();
        let options = FitOptions {
            mode: FitMode::Packing,
            ..FitOptions::default()
        };

        assert_eq!(puzzle.check_all(&options).unwrap().fits(), 4);
    }

    #[test]
    fn fixed_orientation_can_fail() {
        // Two L trominoes only tile a 3x2 grid if one of them is rotated.
        let puzzle = Puzzle::parse("0:\n##\n#.\n\n3x2: 2\n").unwrap();
        let fixed = FitOptions {
            transform: ShapeTransform::NoTransform,
            ..FitOptions::default()
        };

        assert_eq!(
            puzzle.check_region(&puzzle.regions[0], &fixed),
            Ok(Verdict::DoesNotFit)
        );
        assert_eq!(
            puzzle.check_region(&puzzle.regions[0], &FitOptions::default()),
            Ok(Verdict::Fits)
        );
    }

    #[test]
    fn zero_timeout_reports_timed_out() {
        // Three L trominoes cannot tile a 3x3 grid, so the first branch fails
        // and the deadline is checked before the second.
        let puzzle = Puzzle::parse("0:\n##\n#.\n\n3x3: 3\n").unwrap();
        let options = FitOptions {
            timeout: Some(Duration::ZERO),
            ..FitOptions::default()
        };

        assert_eq!(
            puzzle.check_region(&puzzle.regions[0], &options),
            Ok(Verdict::TimedOut)
        );
    }

    #[test]
    fn oversized_regions_do_not_overflow() {
        let puzzle = Puzzle::parse("0:\n##\n\n2x1: 1\n").unwrap();
        let options = FitOptions::default();

        let crowded = Region::new(2, 1, vec![usize::MAX]);
        assert_eq!(
            puzzle.check_region(&crowded, &options),
            Ok(Verdict::DoesNotFit)
        );
        let packed = FitOptions {
            mode: FitMode::Packing,
            ..options
        };
        assert_eq!(
            puzzle.check_region(&crowded, &packed),
            Ok(Verdict::DoesNotFit)
        );

        let huge = Region::new(usize::MAX, 2, vec![1]);
        assert_eq!(
            puzzle.check_region(&huge, &options),
            Err(SolverError::GridTooLarge {
                width: usize::MAX,
                height: 2
            })
        );
    }
}
