//! Tests for cell ownership, visibility and coverage accounting

#[cfg(test)]
mod tests {
    use vinegen::VineError;
    use vinegen::io::configuration::MAX_GRID_CELLS;
    use vinegen::spatial::geometry::{Direction, Point};
    use vinegen::spatial::grid::{Occupancy, grid_area};
    use vinegen::spatial::mask::Mask;
    use vinegen::spatial::vine::Vine;

    fn horizontal(id: &str, y: i32, from: i32, to: i32) -> Vine {
        let path = (from..=to).rev().map(|x| Point::new(x, y)).collect();
        Vine::new(id, Direction::Right, path)
    }

    // Tests insert claims every cell and remove releases them again
    // Verified by not decrementing the occupied counter on removal
    #[test]
    fn test_insert_and_remove() {
        let mut occ = Occupancy::new(4, 3);
        let vine = horizontal("a", 1, 0, 2);
        occ.insert(&vine).expect("insert");

        assert_eq!(occ.occupied_count(), 3);
        assert_eq!(occ.owner(Point::new(1, 1)), Some("a"));
        assert!(!occ.is_free(Point::new(2, 1)));
        assert!(occ.is_free(Point::new(3, 1)));

        occ.remove(&vine);
        assert_eq!(occ.occupied_count(), 0);
        assert_eq!(occ.owner(Point::new(1, 1)), None);
    }

    // Tests a rejected insert leaves the grid untouched
    // Verified by writing cells before checking them
    #[test]
    fn test_overlap_is_rejected_atomically() {
        let mut occ = Occupancy::new(4, 3);
        occ.insert(&horizontal("a", 1, 1, 2)).expect("insert");

        let crossing = Vine::new(
            "b",
            Direction::Up,
            vec![Point::new(0, 2), Point::new(0, 1), Point::new(1, 1)],
        );
        let err = occ.insert(&crossing);
        assert!(matches!(
            err,
            Err(VineError::StructuralViolation { ref vine_id, cell: Some(cell), .. })
                if vine_id == "b" && cell == Point::new(1, 1)
        ));
        assert_eq!(occ.occupied_count(), 2);
        assert!(occ.is_free(Point::new(0, 2)));
    }

    // Tests out-of-bounds, masked and repeated cells are all refused
    // Verified by skipping the repeat check
    #[test]
    fn test_check_cells_rules() {
        let mask = Mask::hiding(vec![Point::new(0, 0)]);
        let occ = Occupancy::with_mask(3, 3, Some(&mask));

        assert!(occ.check_cells("v", &[Point::new(3, 0)]).is_err());
        assert!(occ.check_cells("v", &[Point::new(0, 0)]).is_err());
        assert!(
            occ.check_cells("v", &[Point::new(1, 1), Point::new(1, 1)])
                .is_err()
        );
        assert!(
            occ.check_cells("v", &[Point::new(1, 1), Point::new(2, 1)])
                .is_ok()
        );
    }

    // Tests coverage ignores masked cells
    // Verified by dividing by the grid area
    #[test]
    fn test_coverage_uses_visible_cells() {
        let mask = Mask::hiding(vec![Point::new(0, 0), Point::new(1, 0)]);
        let mut occ = Occupancy::with_mask(2, 2, Some(&mask));
        assert_eq!(occ.visible_count(), 2);
        occ.insert(&horizontal("a", 1, 0, 1)).expect("insert");
        assert!((occ.coverage() - 1.0).abs() < f64::EPSILON);
        assert!(occ.empty_cells().is_empty());
    }

    // Tests from_vines reports the first overlap
    // Verified by inserting vines without checking
    #[test]
    fn test_from_vines() {
        let ok = Occupancy::from_vines(5, 5, None, &[horizontal("a", 0, 0, 1), horizontal("b", 1, 0, 1)]);
        assert!(ok.is_ok());
        let clash = Occupancy::from_vines(5, 5, None, &[horizontal("a", 0, 0, 2), horizontal("b", 0, 2, 3)]);
        assert!(clash.is_err());
    }

    // Tests empty cells come back in row-major order from the bottom row
    // Verified by iterating columns first
    #[test]
    fn test_empty_cells_order() {
        let mut occ = Occupancy::new(2, 2);
        occ.insert(&horizontal("a", 0, 0, 1)).expect("insert");
        assert_eq!(occ.empty_cells(), vec![Point::new(0, 1), Point::new(1, 1)]);
        assert_eq!(occ.point(3), Point::new(1, 1));
        assert_eq!(occ.index(Point::new(1, 1)), Some(3));
        assert_eq!(occ.index(Point::new(2, 0)), None);
    }

    // Tests neighbour counts and the 3x3 emptiness window
    // Verified by counting occupied neighbours as free
    #[test]
    fn test_neighbourhood() {
        let mut occ = Occupancy::new(3, 3);
        assert_eq!(occ.free_neighbor_count(Point::new(1, 1)), 4);
        assert_eq!(occ.emptiness(Point::new(1, 1)), 9);
        assert_eq!(occ.emptiness(Point::new(0, 0)), 4);

        occ.insert(&horizontal("a", 2, 0, 2)).expect("insert");
        assert_eq!(occ.free_neighbors(Point::new(1, 1)), vec![
            Point::new(1, 0),
            Point::new(0, 1),
            Point::new(2, 1)
        ]);
        assert_eq!(occ.emptiness(Point::new(1, 1)), 6);
    }

    // Tests the exit run check looks past the first free cell
    // Verified by checking only the adjacent cell
    #[test]
    fn test_exit_path_clear() {
        let mut occ = Occupancy::new(5, 1);
        occ.insert(&Vine::new("a", Direction::Right, vec![Point::new(4, 0), Point::new(3, 0)]))
            .expect("insert");
        assert!(!occ.is_exit_path_clear(Point::new(0, 0), Direction::Right));
        assert!(occ.is_exit_path_clear(Point::new(1, 0), Direction::Left));
    }

    // Tests border detection on every side
    // Verified by omitting the top row check
    #[test]
    fn test_is_edge() {
        let occ = Occupancy::new(4, 4);
        assert!(occ.is_edge(Point::new(0, 2)));
        assert!(occ.is_edge(Point::new(3, 1)));
        assert!(occ.is_edge(Point::new(2, 3)));
        assert!(occ.is_edge(Point::new(1, 0)));
        assert!(!occ.is_edge(Point::new(1, 1)));
        assert!(!occ.is_edge(Point::new(4, 0)));
    }

    // Tests the area guard rejects empty, overflowing and oversized grids
    // Verified by multiplying without checked_mul
    #[test]
    fn test_grid_area() {
        assert_eq!(grid_area(4, 3), Some(12));
        assert_eq!(grid_area(MAX_GRID_CELLS, 1), Some(MAX_GRID_CELLS));
        assert_eq!(grid_area(MAX_GRID_CELLS + 1, 1), None);
        assert_eq!(grid_area(0, 7), None);
        assert_eq!(grid_area(usize::MAX, 2), None);
        assert_eq!(grid_area(100_000, 100_000), None);
    }
}
