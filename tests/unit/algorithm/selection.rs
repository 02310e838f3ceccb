//! Tests for seed choice, planned lengths and growth-step scoring

#[cfg(test)]
mod tests {
    use vinegen::algorithm::executor::RandomSelector;
    use vinegen::algorithm::selection::{
        ScoredCell, center_out_lengths, center_seed_candidates, choose_anchor_seed,
        choose_center_seed, choose_edge_biased_seed, choose_random_seed,
        choose_region_biased_seed, choose_sparse_seed, density_score, direction_first_lengths,
        last_step, max_vine_length, pick_scored, pick_top_three, plan_count, previous_step,
        profile_length, skewed_length, weighted_exit_direction,
    };
    use vinegen::io::difficulty::{RegionBias, VarietyProfile};
    use vinegen::spatial::geometry::{Direction, Point, distance_to_edge};
    use vinegen::spatial::grid::Occupancy;
    use vinegen::spatial::vine::Vine;

    fn edge_distance(p: Point, width: usize, height: usize) -> i32 {
        Direction::ALL
            .iter()
            .map(|&d| distance_to_edge(p, d, width, height))
            .min()
            .unwrap_or(0)
    }

    // Tests the length cap never drops below the minimum vine length
    // Verified by returning (w + h) / 2 unclamped
    #[test]
    fn test_max_vine_length() {
        assert_eq!(max_vine_length(1, 1), 2);
        assert_eq!(max_vine_length(5, 6), 5);
        assert_eq!(max_vine_length(16, 28), 22);
    }

    // Tests the plan honours vine_count and the length bounds
    // Verified by ignoring vine_count when the cell target needs fewer vines
    #[test]
    fn test_center_out_lengths() {
        let mut rng = RandomSelector::new(7);
        let lengths = center_out_lengths(5, 6, 0.8, 7, (4, 8), &mut rng);
        assert_eq!(lengths.len(), 4);
        assert!(lengths.iter().all(|&l| (2..=5).contains(&l)));

        let lengths = center_out_lengths(10, 10, 0.9, 3, (1, 100), &mut rng);
        assert_eq!(lengths.len(), 30);
        assert!(lengths.iter().all(|&l| (2..=4).contains(&l)));

        let lengths = center_out_lengths(10, 10, 0.9, 3, (1, 12), &mut rng);
        assert_eq!(lengths.len(), 12);
    }

    // Tests the planned count stays inside the tier range
    // Verified by applying the upper bound before the lower one
    #[test]
    fn test_plan_count() {
        assert_eq!(plan_count(30, (4, 12)), 12);
        assert_eq!(plan_count(2, (4, 12)), 4);
        assert_eq!(plan_count(7, (4, 12)), 7);
        assert_eq!(plan_count(0, (0, 0)), 1);
        assert_eq!(plan_count(5, (9, 6)), 6);
    }

    // Tests the plan covers the target unless every vine is at the cap
    // Verified by removing the top-up loop
    #[test]
    fn test_direction_first_lengths_reach_target() {
        for seed in 0..20 {
            let mut rng = RandomSelector::new(seed);
            let lengths = direction_first_lengths(8, 8, 0.8, (6, 6), (2, 8), &mut rng);
            let max_length = ((51 / 6) * 2).min(16).max(3);
            assert_eq!(lengths.len(), 6);
            assert!(lengths.iter().all(|&l| (2..=max_length).contains(&l)));
            let planned: usize = lengths.iter().sum();
            assert!(planned >= 51 || lengths.iter().all(|&l| l == max_length));
        }
    }

    // Tests a large grid plans around the middle of the tier's length range
    // Verified by sizing the count from the lower count bound alone
    #[test]
    fn test_direction_first_lengths_follow_tier() {
        for seed in 0..10 {
            let mut rng = RandomSelector::new(seed);
            let lengths = direction_first_lengths(20, 34, 0.93, (15, 200), (2, 6), &mut rng);
            // 632 target cells at a middle length of 4
            assert_eq!(lengths.len(), 158);
            assert!(lengths.iter().all(|&l| (2..=8).contains(&l)));
            let planned: usize = lengths.iter().sum();
            let average = planned as f64 / lengths.len() as f64;
            assert!(average <= 6.0, "average {average}");
        }

        let mut rng = RandomSelector::new(1);
        let capped = direction_first_lengths(20, 34, 0.93, (15, 100), (2, 6), &mut rng);
        assert_eq!(capped.len(), 100);
        assert!(capped.iter().all(|&l| l <= 12));
    }

    // Tests the short-vine cap lifts the draw floor to four cells
    // Verified by ignoring short_count
    #[test]
    fn test_skewed_length_short_cap() {
        let mut rng = RandomSelector::new(3);
        for _ in 0..200 {
            let capped = skewed_length(8, 100, 5, 5, &mut rng);
            assert!((4..=8).contains(&capped));
            let free = skewed_length(8, 3, 0, 5, &mut rng);
            assert!((2..=3).contains(&free));
        }
    }

    // Tests profile draws stay within the allowed range
    // Verified by skipping the final clamp
    #[test]
    fn test_profile_length_bounds() {
        let profile = VarietyProfile::for_median_length(7);
        let mut rng = RandomSelector::new(11);
        for _ in 0..200 {
            let length = profile_length(&profile, 5, &mut rng);
            assert!((2..=5).contains(&length));
        }
    }

    // Tests center seeds come from the closest candidates
    // Verified by sampling the whole candidate list
    #[test]
    fn test_choose_center_seed_stays_central() {
        let occ = Occupancy::new(7, 7);
        let candidates = center_seed_candidates(&occ);
        assert_eq!(candidates.len(), 49);

        let mut rng = RandomSelector::new(5);
        for _ in 0..50 {
            let seed = choose_center_seed(&occ, &mut rng).expect("seed");
            let dist = (f64::from(seed.x) - 3.5).abs() + (f64::from(seed.y) - 3.5).abs();
            assert!(dist <= 2.0, "seed {seed} too far from the centre");
        }
    }

    // Tests isolated free cells are never offered as seeds
    // Verified by dropping the free-neighbour filter
    #[test]
    fn test_seed_candidates_need_a_free_neighbour() {
        let mut occ = Occupancy::new(3, 1);
        occ.insert(&Vine::new("a", Direction::Right, vec![Point::new(1, 0), Point::new(0, 0)]))
            .expect("insert");
        let mut rng = RandomSelector::new(1);
        assert!(center_seed_candidates(&occ).is_empty());
        assert_eq!(choose_center_seed(&occ, &mut rng), None);
        assert_eq!(choose_edge_biased_seed(&occ, &mut rng), None);
        assert_eq!(choose_random_seed(&occ, &mut rng), Some(Point::new(2, 0)));
    }

    // Tests anchor seeds respect the edge buffer
    // Verified by comparing against the maximum edge distance
    #[test]
    fn test_anchor_seed_near_edge() {
        let occ = Occupancy::new(9, 9);
        let mut rng = RandomSelector::new(2);
        for _ in 0..100 {
            let seed = choose_anchor_seed(&occ, 1, &mut rng).expect("seed");
            assert!(edge_distance(seed, 9, 9) <= 1);
        }
    }

    // Tests edge-biased seeds land mostly on the border
    // Verified by inverting the preference probability
    #[test]
    fn test_edge_biased_seed_prefers_border() {
        let occ = Occupancy::new(8, 8);
        let mut rng = RandomSelector::new(9);
        let on_edge = (0..400)
            .filter_map(|_| choose_edge_biased_seed(&occ, &mut rng))
            .filter(|&p| occ.is_edge(p))
            .count();
        assert!(on_edge > 250, "only {on_edge} of 400 seeds on the border");
    }

    // Tests the sparse seed finds the only roomy cell
    // Verified by keeping the first sample instead of the best
    #[test]
    fn test_sparse_seed_prefers_open_cells() {
        let occ = Occupancy::new(3, 3);
        let mut rng = RandomSelector::new(4);
        assert_eq!(choose_sparse_seed(&occ, &mut rng), Some(Point::new(1, 1)));
    }

    // Tests centre bias pulls region-weighted seeds inward
    // Verified by treating Center like Balanced
    #[test]
    fn test_region_biased_seed_center() {
        let occ = Occupancy::new(9, 9);
        let profile = VarietyProfile {
            region_bias: RegionBias::Center,
            ..VarietyProfile::default()
        };
        let mut rng = RandomSelector::new(6);
        let central = (0..200)
            .filter_map(|_| choose_region_biased_seed(&occ, &profile, &mut rng))
            .filter(|&p| edge_distance(p, 9, 9) >= 3)
            .count();
        assert!(central > 100, "only {central} of 200 seeds near the centre");
    }

    // Tests exit directions lean toward the nearest edge
    // Verified by using the distance as the weight instead of its inverse
    #[test]
    fn test_weighted_exit_direction_prefers_near_edge() {
        let profile = VarietyProfile::default();
        let mut rng = RandomSelector::new(8);
        let left = (0..300)
            .filter(|_| {
                weighted_exit_direction(Point::new(0, 4), 9, 9, &profile, &mut rng)
                    == Direction::Left
            })
            .count();
        assert!(left > 150, "left chosen {left} of 300 times");
    }

    // Tests step directions are read from the path end
    // Verified by reading from the path start
    #[test]
    fn test_last_and_previous_step() {
        let path = [Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)];
        assert_eq!(last_step(&path), Some(Direction::Up));
        assert_eq!(previous_step(&path), Some(Direction::Right));
        assert_eq!(previous_step(&path[1..]), None);
        assert_eq!(last_step(&[Point::new(0, 0)]), None);
    }

    // Tests crowding and border bonus
    // Verified by removing the edge bonus term
    #[test]
    fn test_density_score() {
        let occ = Occupancy::new(9, 9);
        let corner = density_score(&occ, Point::new(0, 0));
        assert!((corner - (2.0 * 5.0 / 9.0 + 1.0)).abs() < 1e-9);
        assert!(density_score(&occ, Point::new(4, 4)).abs() < 1e-9);
    }

    // Tests the top pick and the empty case
    // Verified by sorting ascending
    #[test]
    fn test_pick_scored() {
        let mut rng = RandomSelector::new(1);
        assert_eq!(pick_scored(Vec::new(), 0.8, &mut rng), None);
        let single = vec![ScoredCell {
            cell: Point::new(2, 2),
            score: 0.0,
        }];
        assert_eq!(pick_scored(single, 0.0, &mut rng), Some(Point::new(2, 2)));

        let candidates = vec![
            ScoredCell {
                cell: Point::new(0, 0),
                score: 1.0,
            },
            ScoredCell {
                cell: Point::new(1, 0),
                score: 5.0,
            },
        ];
        assert_eq!(pick_scored(candidates, 1.0, &mut rng), Some(Point::new(1, 0)));
    }

    // Tests only the three best candidates can be drawn
    // Verified by weighting the whole candidate list
    #[test]
    fn test_pick_top_three() {
        let candidates: Vec<ScoredCell> = (0..6)
            .map(|i| ScoredCell {
                cell: Point::new(i, 0),
                score: f64::from(i),
            })
            .collect();
        let mut rng = RandomSelector::new(12);
        for _ in 0..100 {
            let pick = pick_top_three(candidates.clone(), &mut rng).expect("pick");
            assert!(pick.x >= 3);
        }
        assert_eq!(pick_top_three(Vec::new(), &mut rng), None);
    }
}
