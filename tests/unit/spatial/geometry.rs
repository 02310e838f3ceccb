//! Tests for points, directions and snake movement simulation

#[cfg(test)]
mod tests {
    use vinegen::spatial::geometry::{
        Direction, Point, advance, blocks_own_exit, choose_exit_direction, collides,
        directions_by_edge_distance, distance_to_edge, exit_ray, has_self_overlap, is_clean_exit,
    };

    // Tests the y axis grows upward
    // Verified by swapping the Up and Down deltas
    #[test]
    fn test_step_uses_bottom_left_origin() {
        let origin = Point::new(2, 2);
        assert_eq!(origin.step(Direction::Up), Point::new(2, 3));
        assert_eq!(origin.step(Direction::Down), Point::new(2, 1));
        assert_eq!(origin.step(Direction::Left), Point::new(1, 2));
        assert_eq!(origin.step(Direction::Right), Point::new(3, 2));
    }

    // Tests direction inversion and adjacency detection agree with the deltas
    // Verified by returning the same direction from opposite
    #[test]
    fn test_opposite_and_between() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let p = Point::new(5, 5);
            assert_eq!(Direction::between(p, p.step(dir)), Some(dir));
            assert_eq!(Direction::between(p.step(dir), p), Some(dir.opposite()));
        }
        assert_eq!(Direction::between(Point::new(0, 0), Point::new(1, 1)), None);
        assert_eq!(Direction::between(Point::new(0, 0), Point::new(0, 0)), None);
    }

    // Tests parsing accepts exactly the lowercase names written to level files
    // Verified by making parsing case-insensitive
    #[test]
    fn test_direction_parse_and_display() {
        for dir in Direction::ALL {
            assert_eq!(dir.to_string().parse::<Direction>(), Ok(dir));
        }
        assert!("Up".parse::<Direction>().is_err());
        assert!("north".parse::<Direction>().is_err());
    }

    // Tests distance counts cells between the point and the facing edge
    // Verified by dropping the minus one in the Up branch
    #[test]
    fn test_distance_to_edge() {
        let p = Point::new(1, 3);
        assert_eq!(distance_to_edge(p, Direction::Left, 5, 6), 1);
        assert_eq!(distance_to_edge(p, Direction::Right, 5, 6), 3);
        assert_eq!(distance_to_edge(p, Direction::Down, 5, 6), 3);
        assert_eq!(distance_to_edge(p, Direction::Up, 5, 6), 2);
    }

    // Tests nearest edge wins and ties resolve left, right, down, up
    // Verified by checking up before left
    #[test]
    fn test_choose_exit_direction_tie_order() {
        assert_eq!(choose_exit_direction(Point::new(2, 2), 5, 5), Direction::Left);
        assert_eq!(choose_exit_direction(Point::new(4, 2), 5, 5), Direction::Right);
        assert_eq!(choose_exit_direction(Point::new(2, 0), 5, 5), Direction::Down);
        assert_eq!(choose_exit_direction(Point::new(2, 4), 5, 5), Direction::Up);
        assert_eq!(choose_exit_direction(Point::new(0, 0), 5, 5), Direction::Left);
    }

    // Tests the stable sort keeps ALL order for equal distances
    // Verified by using an unstable sort
    #[test]
    fn test_directions_by_edge_distance_is_stable() {
        let order = directions_by_edge_distance(Point::new(1, 1), 3, 3);
        assert_eq!(
            order,
            [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        );
        let order = directions_by_edge_distance(Point::new(4, 1), 5, 5);
        assert_eq!(order.first(), Some(&Direction::Right));
    }

    // Tests every body segment moves into the cell ahead of it
    // Verified by shifting the body from the tail instead of the head
    #[test]
    fn test_advance_follows_the_head() {
        let path = vec![Point::new(2, 2), Point::new(1, 2), Point::new(1, 1)];
        let next = advance(&path, Direction::Right);
        assert_eq!(next, vec![Point::new(3, 2), Point::new(2, 2), Point::new(1, 2)]);
        assert!(advance(&[], Direction::Up).is_empty());
    }

    // Tests a vine has left once its head is off the grid
    // Verified by requiring every segment to be off the grid
    #[test]
    fn test_is_clean_exit() {
        assert!(is_clean_exit(&[Point::new(5, 2), Point::new(4, 2)], 5, 5));
        assert!(!is_clean_exit(&[Point::new(4, 2), Point::new(3, 2)], 5, 5));
        assert!(!is_clean_exit(&[], 5, 5));
    }

    // Tests only the head is compared against the body
    // Verified by comparing the tail instead
    #[test]
    fn test_has_self_overlap() {
        let looped = [Point::new(1, 1), Point::new(2, 1), Point::new(2, 2), Point::new(1, 1)];
        assert!(has_self_overlap(&looped));
        let straight = [Point::new(1, 1), Point::new(2, 1), Point::new(3, 1)];
        assert!(!has_self_overlap(&straight));
    }

    // Tests collisions ignore cells outside the grid
    // Verified by passing off-grid cells to the blocked callback
    #[test]
    fn test_collides_ignores_off_grid_cells() {
        let positions = [Point::new(5, 0), Point::new(4, 0)];
        assert!(collides(&positions, 5, 5, |p| p == Point::new(4, 0)));
        assert!(!collides(&positions, 5, 5, |p| p == Point::new(5, 0)));
    }

    // Tests a body segment on the head's ray is detected
    // Verified by starting the scan at the head itself
    #[test]
    fn test_blocks_own_exit() {
        // Head at (1,1) facing left, body curls round to (0,1)
        let blocked = [
            Point::new(1, 1),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 1),
        ];
        assert!(blocks_own_exit(&blocked, Direction::Left, 5, 5));
        let clear = [Point::new(1, 1), Point::new(2, 1)];
        assert!(!blocks_own_exit(&clear, Direction::Left, 5, 5));
        assert!(!blocks_own_exit(&[], Direction::Left, 5, 5));
    }

    // Tests the ray excludes the start cell and stops at the edge
    // Verified by including the start point
    #[test]
    fn test_exit_ray() {
        let ray = exit_ray(Point::new(1, 2), Direction::Right, 4, 4);
        assert_eq!(ray, vec![Point::new(2, 2), Point::new(3, 2)]);
        assert!(exit_ray(Point::new(0, 2), Direction::Left, 4, 4).is_empty());
    }

    // Tests bounds and Manhattan distance
    // Verified by allowing x == width
    #[test]
    fn test_in_bounds_and_manhattan() {
        assert!(Point::new(0, 0).in_bounds(1, 1));
        assert!(!Point::new(1, 0).in_bounds(1, 1));
        assert!(!Point::new(-1, 0).in_bounds(3, 3));
        assert_eq!(Point::new(-1, 2).manhattan(Point::new(2, -2)), 7);
        assert_eq!(
            Point::new(3, 3).neighbors(),
            [Point::new(3, 4), Point::new(3, 2), Point::new(2, 3), Point::new(4, 3)]
        );
    }
}
