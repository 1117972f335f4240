use quota_dlx::{
    placement::{FitMode, PlacementSet, Region},
    polyomino::{Shape, ShapeTransform},
    RowId,
};

/// Parse a shape drawn with `#` and `.`, with rows separated by `/`.
///
/// # Panics
///  - If the drawing is not a valid shape.
#[allow(dead_code)]
pub fn shape(drawing: &str) -> Shape {
    Shape::parse(&drawing.replace('/', "\n")).unwrap()
}

/// Decide whether `shapes` fit in `region` by plain backtracking, without
/// going through the matrix at all.
///
/// The first empty cell in row-major order is either left as a hole (if the
/// mode allows any) or covered by a placement whose first cell lands on it.
#[allow(dead_code)]
pub fn brute_force_fits(
    region: &Region,
    shapes: &[Shape],
    transform: ShapeTransform,
    mode: FitMode,
) -> bool {
    let required = region.required_cells(shapes);
    let area = region.area();
    let holes = match mode {
        FitMode::Exact if required != area => return false,
        FitMode::Packing if required > area => return false,
        FitMode::Exact => 0,
        FitMode::Packing => area - required,
    };

    let orientations: Vec<Vec<Vec<(usize, usize)>>> = shapes
        .iter()
        .map(|shape| {
            shape
                .orientations(transform)
                .iter()
                .map(|orientation| orientation.cells().collect())
                .collect()
        })
        .collect();

    let mut filled = vec![false; area];
    let mut remaining = region.counts.clone();

    fill(region, &orientations, &mut filled, &mut remaining, holes, 0)
}

fn fill(
    region: &Region,
    orientations: &[Vec<Vec<(usize, usize)>>],
    filled: &mut [bool],
    remaining: &mut [usize],
    holes: usize,
    start: usize,
) -> bool {
    let Some(cell) = (start..filled.len()).find(|&cell| !filled[cell]) else {
        return remaining.iter().all(|&count| count == 0);
    };
    let (row, column) = (cell / region.width, cell % region.width);

    if holes > 0 {
        filled[cell] = true;
        let found = fill(region, orientations, filled, remaining, holes - 1, cell + 1);
        filled[cell] = false;
        if found {
            return true;
        }
    }

    for (shape, shape_orientations) in orientations.iter().enumerate() {
        if remaining[shape] == 0 {
            continue;
        }

        for cells in shape_orientations {
            let (anchor_row, anchor_column) = cells[0];
            if anchor_row > row || anchor_column > column {
                continue;
            }
            let (top, left) = (row - anchor_row, column - anchor_column);

            let targets: Option<Vec<usize>> = cells
                .iter()
                .map(|&(r, c)| {
                    let (r, c) = (top + r, left + c);
                    (r < region.height && c < region.width && !filled[r * region.width + c])
                        .then_some(r * region.width + c)
                })
                .collect();
            let Some(targets) = targets else {
                continue;
            };

            for &target in &targets {
                filled[target] = true;
            }
            remaining[shape] -= 1;

            let found = fill(region, orientations, filled, remaining, holes, cell + 1);

            remaining[shape] += 1;
            for &target in &targets {
                filled[target] = false;
            }
            if found {
                return true;
            }
        }
    }

    false
}

/// Check that `rows` is a valid answer for `placements` in `region`: no cell
/// is covered twice, every cell is covered in exact mode, and every shape is
/// used exactly as many times as its quota.
///
/// # Panics
///  - If any of the above does not hold.
#[allow(dead_code)]
pub fn assert_valid_witness(
    placements: &PlacementSet,
    region: &Region,
    mode: FitMode,
    rows: &[RowId],
) {
    let mut coverage = vec![0usize; region.area()];
    let mut uses = vec![0usize; placements.quotas().len()];

    for &row in rows {
        let placement = placements.placement(row).unwrap();
        uses[placement.shape_index] += 1;
        for &(r, c) in &placement.occupied_cells {
            coverage[region.cell_column(r, c)] += 1;
        }
    }

    log::debug!("Witness [{:?}] gives coverage [{:?}].", rows, coverage);

    assert!(
        coverage.iter().all(|&count| count <= 1),
        "Some cell is covered more than once: {coverage:?}"
    );
    if mode == FitMode::Exact {
        assert!(
            coverage.iter().all(|&count| count == 1),
            "Some cell is left uncovered: {coverage:?}"
        );
    }
    assert_eq!(uses, placements.quotas());
}
