#![no_main]

use libfuzzer_sys::fuzz_target;
use quota_dlx::{
    placement::{FitMode, PlacementSet, Region},
    polyomino::{Shape, ShapeTransform},
};

#[derive(Debug)]
struct SmallRegionInput {
    shapes: Vec<Shape>,
    region: Region,
    transform: ShapeTransform,
    mode: FitMode,
}

impl<'a> arbitrary::Arbitrary<'a> for SmallRegionInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_shapes = u.int_in_range(1..=3)?;

        let mut shapes = Vec::with_capacity(num_shapes);
        let mut counts = Vec::with_capacity(num_shapes);
        for _ in 0..num_shapes {
            // A 3x3 mask, one bit per cell.
            let bits = u.int_in_range(1..=0b1_1111_1111u16)?;
            let mask = (0..9).map(|bit| bits & (1 << bit) != 0).collect();
            shapes.push(Shape::new(3, mask).map_err(|_| arbitrary::Error::IncorrectFormat)?);
            counts.push(u.int_in_range(0..=3)?);
        }

        let region = Region::new(u.int_in_range(1..=4)?, u.int_in_range(1..=4)?, counts);
        let transform = *u.choose(&[
            ShapeTransform::NoTransform,
            ShapeTransform::PureRotation,
            ShapeTransform::FullSymmetry,
        ])?;
        let mode = *u.choose(&[FitMode::Exact, FitMode::Packing])?;

        Ok(SmallRegionInput {
            shapes,
            region,
            transform,
            mode,
        })
    }
}

fuzz_target!(|data: SmallRegionInput| {
    let placements = PlacementSet::generate(&data.region, &data.shapes, data.transform, data.mode);
    let solver = placements.to_solver().unwrap();

    let Some(rows) = solver.solve() else {
        return;
    };

    let mut coverage = vec![0usize; data.region.area()];
    let mut uses = vec![0usize; placements.quotas().len()];
    for row in rows {
        let placement = placements.placement(row).unwrap();
        uses[placement.shape_index] += 1;
        for &(r, c) in &placement.occupied_cells {
            coverage[data.region.cell_column(r, c)] += 1;
        }
    }

    assert!(coverage.iter().all(|&count| count <= 1));
    if data.mode == FitMode::Exact {
        assert!(coverage.iter().all(|&count| count == 1));
    }
    assert_eq!(uses, placements.quotas());
});
