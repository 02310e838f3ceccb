//! Tests for mask interpretation

#[cfg(test)]
mod tests {
    use vinegen::spatial::geometry::Point;
    use vinegen::spatial::mask::{Mask, MaskMode, is_visible};

    // Tests each mode against listed and unlisted cells
    // Verified by treating Show like Hide
    #[test]
    fn test_modes() {
        let listed = Point::new(1, 1);
        let other = Point::new(2, 2);

        let hide = Mask::hiding(vec![listed]);
        assert!(!hide.is_visible(listed));
        assert!(hide.is_visible(other));

        let show = Mask {
            mode: MaskMode::Show,
            points: vec![listed],
        };
        assert!(show.is_visible(listed));
        assert!(!show.is_visible(other));

        let all = Mask {
            mode: MaskMode::ShowAll,
            points: vec![listed],
        };
        assert!(all.is_visible(listed) && all.is_visible(other));
    }

    // Tests the hashed lookup agrees with the list scan
    // Verified by inverting the Hide branch in the lookup
    #[test]
    fn test_lookup_matches_mask() {
        let mask = Mask::hiding(vec![Point::new(0, 0), Point::new(3, 1)]);
        let lookup = mask.lookup();
        for y in 0..4 {
            for x in 0..4 {
                let p = Point::new(x, y);
                assert_eq!(lookup.is_visible(p), mask.is_visible(p));
            }
        }
    }

    // Tests a missing mask shows everything
    // Verified by returning false for None
    #[test]
    fn test_optional_mask() {
        assert!(is_visible(None, Point::new(9, 9)));
        let mask = Mask::hiding(vec![Point::new(9, 9)]);
        assert!(!is_visible(Some(&mask), Point::new(9, 9)));
    }

    // Tests the kebab-case mode names used in level files
    // Verified by removing the serde rename
    #[test]
    fn test_mode_serialization() {
        let mask = Mask {
            mode: MaskMode::ShowAll,
            points: Vec::new(),
        };
        let json = serde_json::to_string(&mask).expect("serialize mask");
        assert!(json.contains("\"show-all\""));
        let parsed: Mask = serde_json::from_str(r#"{"mode":"hide"}"#).expect("parse mask");
        assert_eq!(parsed, Mask::hiding(Vec::new()));
    }
}
