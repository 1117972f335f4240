mod common;

use common::{assert_valid_witness, brute_force_fits, shape};
use quota_dlx::{
    placement::{FitMode, PlacementSet, Region},
    polyomino::{Shape, ShapeTransform},
    Outcome,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::time::{Duration, Instant};

fn fits(region: &Region, shapes: &[Shape], transform: ShapeTransform, mode: FitMode) -> bool {
    PlacementSet::generate(region, shapes, transform, mode)
        .to_solver()
        .unwrap()
        .solve_exists()
}

fn fits_exactly(width: usize, height: usize, shapes: &[Shape], counts: &[usize]) -> bool {
    fits(
        &Region::new(width, height, counts.to_vec()),
        shapes,
        ShapeTransform::FullSymmetry,
        FitMode::Exact,
    )
}

#[test]
fn four_monominoes_fill_two_by_two() {
    assert!(fits_exactly(2, 2, &[shape("#")], &[4]));
}

#[test]
fn domino_and_monominoes_in_two_by_two() {
    let shapes = [shape("##"), shape("#")];

    assert!(!fits_exactly(2, 2, &shapes, &[1, 1]));
    assert!(fits_exactly(2, 2, &shapes, &[1, 2]));
}

#[test]
fn tromino_in_three_by_one() {
    let tromino = [shape("###")];

    assert!(fits_exactly(3, 1, &tromino, &[1]));
    assert!(fits_exactly(1, 3, &tromino, &[1]));
    assert!(!fits_exactly(3, 1, &tromino, &[2]));
}

#[test]
fn skew_tetrominoes_never_fill_a_rectangle() {
    // No placement of an S or Z tetromino can cover a corner cell without
    // cutting off a neighbour.
    assert!(!fits_exactly(4, 4, &[shape("##./.##")], &[4]));
    assert!(fits_exactly(4, 4, &[shape("###/.#.")], &[4]));
    assert!(fits_exactly(4, 4, &[shape("##/##")], &[4]));
}

#[test]
fn dlx_agrees_with_backtracking() {
    let library = [
        shape("#"),
        shape("##"),
        shape("###"),
        shape("##/#."),
        shape("##/##"),
        shape("###/.#."),
        shape("##./.##"),
    ];

    let mut cases = Vec::new();
    for width in 1..=4 {
        for height in 1..=3 {
            for first in 0..library.len() {
                for second in first + 1..library.len() {
                    for counts in [[1, 0], [0, 2], [1, 1], [2, 1], [1, 2], [2, 2]] {
                        cases.push((width, height, first, second, counts));
                    }
                }
            }
        }
    }

    log::debug!("Checking [{}] regions in each mode.", cases.len());

    let mismatches: Vec<_> = cases
        .into_par_iter()
        .flat_map_iter(|(width, height, first, second, counts)| {
            let shapes = [library[first].clone(), library[second].clone()];
            let region = Region::new(width, height, counts.to_vec());

            [
                (ShapeTransform::FullSymmetry, FitMode::Exact),
                (ShapeTransform::NoTransform, FitMode::Exact),
                (ShapeTransform::FullSymmetry, FitMode::Packing),
                (ShapeTransform::PureRotation, FitMode::Packing),
            ]
            .into_iter()
            .filter_map(move |(transform, mode)| {
                let placements = PlacementSet::generate(&region, &shapes, transform, mode);
                let found = placements.to_solver().unwrap().solve();
                if let Some(rows) = &found {
                    assert_valid_witness(&placements, &region, mode, rows);
                }

                let expected = brute_force_fits(&region, &shapes, transform, mode);
                (found.is_some() != expected)
                    .then(|| (region.clone(), first, second, transform, mode, expected))
            })
        })
        .collect();

    assert!(mismatches.is_empty(), "Mismatched results: {mismatches:?}");
}

#[test]
fn packing_leaves_room_for_holes() {
    let shapes = [shape("##/#."), shape("#")];
    let check = |counts: Vec<usize>, mode| {
        fits(&Region::new(3, 3, counts), &shapes, ShapeTransform::FullSymmetry, mode)
    };

    assert!(!check(vec![2, 0], FitMode::Exact));
    assert!(check(vec![2, 0], FitMode::Packing));
    assert!(check(vec![2, 3], FitMode::Exact));
    assert!(!check(vec![4, 0], FitMode::Packing));
}

#[test]
fn repeated_solving_is_deterministic() {
    let shapes = [shape("##/#."), shape("##"), shape("#")];
    let region = Region::new(4, 3, vec![2, 2, 2]);
    let placements =
        PlacementSet::generate(&region, &shapes, ShapeTransform::FullSymmetry, FitMode::Exact);

    let first = placements.to_solver().unwrap().solve();
    let second = placements.to_solver().unwrap().solve();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn search_stats_are_reported() {
    let placements = PlacementSet::generate(
        &Region::new(4, 4, vec![4]),
        &[shape("##./.##")],
        ShapeTransform::FullSymmetry,
        FitMode::Exact,
    );

    let (outcome, stats) = placements.to_solver().unwrap().solve_with_stats(None);

    assert_eq!(outcome, Outcome::Unsatisfiable);
    assert!(stats.branches > 0);
}

#[test]
fn distant_deadline_does_not_change_answer() {
    let deadline = Instant::now() + Duration::from_secs(60);
    let placements = PlacementSet::generate(
        &Region::new(3, 2, vec![2]),
        &[shape("##/#.")],
        ShapeTransform::FullSymmetry,
        FitMode::Exact,
    );

    let outcome = placements.to_solver().unwrap().solve_until(deadline);
    let Outcome::Satisfiable(rows) = &outcome else {
        panic!("Expected a solution, got [{outcome:?}]");
    };
    assert_eq!(rows.len(), 2);
}

#[test]
#[ignore = "takes several seconds without optimizations"]
fn pentominoes_tile_six_by_ten() {
    let pentominoes = [
        shape(".##/##./.#."),
        shape("#####"),
        shape("####/#..."),
        shape("##../.###"),
        shape("##/##/#."),
        shape("###/.#./.#."),
        shape("#.#/###"),
        shape("#../#../###"),
        shape("#../##./.##"),
        shape(".#./###/.#."),
        shape(".#../####"),
        shape("##./.#./.##"),
    ];
    let region = Region::new(10, 6, vec![1; 12]);

    let placements = PlacementSet::generate(
        &region,
        &pentominoes,
        ShapeTransform::FullSymmetry,
        FitMode::Exact,
    );
    log::debug!("Generated [{}] placements.", placements.placements().len());

    let rows = placements.to_solver().unwrap().solve().unwrap();
    assert_valid_witness(&placements, &region, FitMode::Exact, &rows);
}
