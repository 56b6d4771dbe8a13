//! Unit tests for acc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        assert_eq!(NodeId(42).index(), 42);
        assert_eq!(EdgeId(0).index(), 0);
    }

    #[test]
    fn ordered_by_position() {
        let mut v = vec![NodeId(3), NodeId(1), NodeId(2)];
        v.sort();
        assert_eq!(v, [NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "node#7");
        assert_eq!(EdgeId(0).to_string(), "edge#0");
    }
}

#[cfg(test)]
mod geo {
    use crate::{BBox, XY};

    #[test]
    fn distance_is_euclidean() {
        let a = XY::new(0.0, 0.0);
        let b = XY::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_2(b), 25.0);
    }

    #[test]
    fn non_finite_detected() {
        assert!(XY::new(1.0, 2.0).is_finite());
        assert!(!XY::new(f64::NAN, 2.0).is_finite());
        assert!(!XY::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn bbox_skips_non_finite_points() {
        let pts = [XY::new(1.0, 5.0), XY::new(f64::NAN, 0.0), XY::new(-2.0, 3.0)];
        let b = BBox::from_points(pts).unwrap();
        assert_eq!(b.min, XY::new(-2.0, 3.0));
        assert_eq!(b.max, XY::new(1.0, 5.0));
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 2.0);
    }

    #[test]
    fn bbox_of_nothing_is_none() {
        assert!(BBox::from_points(std::iter::empty()).is_none());
        assert!(BBox::from_points([XY::new(f64::NAN, f64::NAN)]).is_none());
    }

    #[test]
    fn intersects_and_expand() {
        let a = BBox { min: XY::new(0.0, 0.0), max: XY::new(10.0, 10.0) };
        let b = BBox { min: XY::new(15.0, 0.0), max: XY::new(20.0, 10.0) };
        assert!(!a.intersects(&b));
        assert!(a.expand(5.0).intersects(&b)); // touching counts
        assert!(a.contains(XY::new(10.0, 0.0)));
        assert!(!a.contains(XY::new(10.1, 0.0)));
    }
}

#[cfg(test)]
mod config {
    use crate::{AccessConfig, CoreError, SpeedTable};

    #[test]
    fn urban_defaults_lookup() {
        let t = SpeedTable::default();
        assert_eq!(t.speed_kph(Some("motorway")), 80.0);
        assert_eq!(t.speed_kph(Some("service")), 15.0);
        assert_eq!(t.speed_kph(Some("no_such_class")), 30.0);
        assert_eq!(t.speed_kph(None), 30.0);
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg = AccessConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AccessConfig::default());
        assert_eq!(cfg.cutoff_secs, 3600.0);
        assert_eq!(cfg.thresholds_min, vec![10.0, 20.0, 30.0, 60.0]);
    }

    #[test]
    fn toml_overrides() {
        let cfg = AccessConfig::from_toml_str(
            r#"
            cutoff_secs    = 1800
            thresholds_min = [5, 15.5]
            check_extent   = false

            [speeds]
            default_kph = 20

            [speeds.classes]
            primary = 45
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cutoff_secs, 1800.0);
        assert_eq!(cfg.thresholds_min, vec![5.0, 15.5]);
        assert!(!cfg.check_extent);
        assert_eq!(cfg.speeds.default_kph, 20.0);
        // Custom class table replaces the built-in one.
        assert_eq!(cfg.speeds.speed_kph(Some("primary")), 45.0);
        assert_eq!(cfg.speeds.speed_kph(Some("motorway")), 20.0);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = AccessConfig::from_toml_str("[speeds.classes]\nfootway = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)), "got {err:?}");
    }

    #[test]
    fn rejects_negative_cutoff() {
        let err = AccessConfig::from_toml_str("cutoff_secs = -1\n").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = AccessConfig::from_toml_str("cutof_secs = 10\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn uniform_table_with_class() {
        let t = SpeedTable::uniform(30.0).with_class("primary", 60.0);
        assert_eq!(t.speed_kph(Some("primary")), 60.0);
        assert_eq!(t.speed_kph(Some("residential")), 30.0);
        assert!(t.validate().is_ok());
        assert!(SpeedTable::uniform(f64::NAN).validate().is_err());
    }
}
