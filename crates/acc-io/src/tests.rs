//! Integration tests for acc-io.

use std::io::Cursor;

// ── Graph loader ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod graph_loader {
    use super::*;
    use crate::{IoError, load_graph_reader, parse_road_class};

    const NODES: &str = "id,x,y\n101,0,0\n102,100,0\n103,200,0\n";

    #[test]
    fn loads_nodes_and_edges() {
        let edges = "u,v,key,length,highway\n\
                     101,102,0,100,residential\n\
                     102,101,0,100,residential\n\
                     102,103,0,250.5,primary\n";
        let g = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);

        let b = g.node_by_ext_id(102).unwrap();
        let c = g.node_by_ext_id(103).unwrap();
        let e = g.find_edge(b, c, 0).unwrap();
        assert_eq!(g.edge_length_m(e), Some(250.5));
        assert_eq!(g.edge_class(e).as_str(), Some("primary"));
    }

    #[test]
    fn optional_columns_and_extra_columns() {
        let edges = "u,v,length,osmid\n101,102,100,77\n101,102,120,78\n";
        let g = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        let a = g.node_by_ext_id(101).unwrap();
        let b = g.node_by_ext_id(102).unwrap();
        // Keys auto-assigned in row order.
        let parallel: Vec<_> = g.parallel_edges(a, b).map(|e| g.edge_key(e)).collect();
        assert_eq!(parallel, vec![0, 1]);
        assert!(g.edge_ids().all(|e| g.edge_class(e).is_missing()));
    }

    #[test]
    fn empty_length_kept_as_missing() {
        let edges = "u,v,key,length,highway\n101,102,0,,residential\n";
        let g = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        let e = g.edge_ids().next().unwrap();
        assert_eq!(g.edge_length_m(e), None);
    }

    #[test]
    fn unknown_node_rejected() {
        let edges = "u,v,key,length\n101,999,0,10\n";
        let err = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(err, IoError::Parse(ref m) if m.contains("999")), "{err}");
    }

    #[test]
    fn duplicate_edge_rejected() {
        let edges = "u,v,key,length\n101,102,0,10\n101,102,0,12\n";
        let err = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(
            err,
            IoError::Spatial(acc_spatial::SpatialError::DuplicateEdge { key: 0, .. })
        ));
    }

    #[test]
    fn road_class_forms() {
        let class = |s: &str| parse_road_class(Some(s)).unwrap();
        assert!(parse_road_class(None).unwrap().is_missing());
        assert!(class("   ").is_missing());
        assert_eq!(class("tertiary").as_str(), Some("tertiary"));
        assert_eq!(class("primary|secondary").as_str(), Some("primary"));
        assert_eq!(class(r#"["trunk", "primary"]"#).as_str(), Some("trunk"));
        assert_eq!(class("['residential', 'tertiary']").as_str(), Some("residential"));
        assert!(class("[]").is_missing());
    }

    #[test]
    fn road_class_list_in_csv() {
        let edges = "u,v,key,length,highway\n101,102,0,100,\"['secondary', 'primary']\"\n";
        let g = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        let e = g.edge_ids().next().unwrap();
        assert_eq!(g.edge_class(e).as_str(), Some("secondary"));
    }
}

// ── Point loader ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod point_loader {
    use super::*;
    use crate::{IoError, PointColumns, load_points_reader};

    #[test]
    fn infers_lon_lat_and_name() {
        let csv = "NAME,Longitude,Latitude,beds\nKenyatta,36.80,-1.30,1800\nMbagathi,36.79,-1.31,\n";
        let pts = load_points_reader(Cursor::new(csv), &PointColumns::default()).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].pos.x, 36.80);
        assert_eq!(pts[0].pos.y, -1.30);
        assert_eq!(pts[0].label.as_deref(), Some("Kenyatta"));
        assert!(pts.iter().all(|p| p.weight.is_none()));
    }

    #[test]
    fn lowercase_name_and_pop_weight() {
        let csv = "x,y,pop,name\n1,2,10.5,a\n3,4,,b\n";
        let pts = load_points_reader(Cursor::new(csv), &PointColumns::default()).unwrap();
        assert_eq!(pts[0].weight, Some(10.5));
        assert_eq!(pts[1].weight, None);
        assert_eq!(pts[1].label.as_deref(), Some("b"));
    }

    #[test]
    fn explicit_columns() {
        let csv = "easting,northing,x\n500,900,1\n";
        let pts = load_points_reader(Cursor::new(csv), &PointColumns::xy("easting", "northing")).unwrap();
        assert_eq!(pts[0].pos.x, 500.0);
        assert_eq!(pts[0].pos.y, 900.0);
    }

    #[test]
    fn empty_coordinate_is_nan() {
        let csv = "lng,lat\n,1\n2,3\n";
        let pts = load_points_reader(Cursor::new(csv), &PointColumns::default()).unwrap();
        assert!(pts[0].pos.x.is_nan());
        assert!(!pts[0].pos.is_finite());
        assert!(pts[1].pos.is_finite());
    }

    #[test]
    fn missing_coordinate_columns() {
        let csv = "a,b\n1,2\n";
        let err = load_points_reader(Cursor::new(csv), &PointColumns::default()).unwrap_err();
        assert!(matches!(err, IoError::Parse(_)));
    }

    #[test]
    fn bad_number_rejected() {
        let csv = "x,y\n1,north\n";
        let err = load_points_reader(Cursor::new(csv), &PointColumns::default()).unwrap_err();
        assert!(matches!(err, IoError::Parse(ref m) if m.contains("row 1")), "{err}");
    }
}

// ── Population grid ───────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use super::*;
    use acc_core::XY;

    use crate::{IoError, PopulationGrid};

    const ASC: &str = "ncols 3\n\
                       nrows 2\n\
                       xllcorner 0\n\
                       yllcorner 0\n\
                       cellsize 100\n\
                       NODATA_value -9999\n\
                       0 5 -9999\n\
                       -3 2 8\n";

    fn grid() -> PopulationGrid {
        PopulationGrid::from_reader(Cursor::new(ASC)).unwrap()
    }

    #[test]
    fn header_and_values() {
        let g = grid();
        assert_eq!((g.ncols(), g.nrows()), (3, 2));
        assert_eq!(g.cellsize(), 100.0);
        assert_eq!(g.value(0, 1), Some(5.0));
        assert_eq!(g.value(0, 2), None);
        assert_eq!(g.value(1, 0), Some(-3.0));
    }

    #[test]
    fn cell_centres_top_row_north() {
        let g = grid();
        assert_eq!(g.cell_centre(0, 0), XY::new(50.0, 150.0));
        assert_eq!(g.cell_centre(1, 2), XY::new(250.0, 50.0));
    }

    #[test]
    fn centre_registered_header() {
        let asc = "NCOLS 1\nNROWS 1\nXLLCENTER 50\nYLLCENTER 50\nCELLSIZE 100\n4\n";
        let g = PopulationGrid::from_reader(Cursor::new(asc)).unwrap();
        assert_eq!(g.cell_centre(0, 0), XY::new(50.0, 50.0));
    }

    #[test]
    fn to_points_threshold_and_clamp() {
        let pts = grid().to_points(0.0, 100);
        // 5, 2, 8 qualify; 0 and clamped -3 do not; nodata skipped.
        let got: Vec<(XY, Option<f64>)> = pts.iter().map(|p| (p.pos, p.weight)).collect();
        assert_eq!(
            got,
            vec![
                (XY::new(150.0, 150.0), Some(5.0)),
                (XY::new(150.0, 50.0), Some(2.0)),
                (XY::new(250.0, 50.0), Some(8.0)),
            ]
        );
        assert!(pts.iter().all(|p| p.travel_time_min.is_none()));
    }

    #[test]
    fn to_points_downsamples_with_ceil_step() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let g = PopulationGrid::new(10, 1, XY::new(0.0, 0.0), 1.0, None, values).unwrap();
        // ceil(10 / 4) = 3 → cells 0, 3, 6, 9.
        let w: Vec<f64> = g.to_points(0.0, 4).iter().filter_map(|p| p.weight).collect();
        assert_eq!(w, vec![1.0, 4.0, 7.0, 10.0]);
        assert_eq!(g.to_points(0.0, 10).len(), 10);
        assert_eq!(g.to_points(5.0, 10).len(), 5);
    }

    #[test]
    fn stats_over_positive_cells() {
        let s = grid().stats().unwrap();
        assert_eq!(s.cell_count, 3);
        assert_eq!(s.total, 15.0);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 8.0);
        // Deviations 0, -3, 3 → variance 6.
        assert!((s.std_dev - 6.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn stats_none_when_empty() {
        let g = PopulationGrid::new(2, 1, XY::new(0.0, 0.0), 1.0, Some(-1.0), vec![0.0, -1.0]).unwrap();
        assert_eq!(g.stats(), None);
        assert!(g.to_points(0.0, 10).is_empty());
    }

    #[test]
    fn fractional_or_huge_dimensions_rejected() {
        let asc = "ncols 2.9\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        assert!(matches!(
            PopulationGrid::from_reader(Cursor::new(asc)),
            Err(IoError::Parse(ref m)) if m.contains("ncols")
        ));

        let asc = "ncols 1e19\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        assert!(matches!(
            PopulationGrid::from_reader(Cursor::new(asc)),
            Err(IoError::Parse(ref m)) if m.contains("ncols")
        ));

        let err = PopulationGrid::new(usize::MAX, 2, XY::new(0.0, 0.0), 1.0, None, vec![1.0]).unwrap_err();
        assert!(matches!(err, IoError::Parse(ref m) if m.contains("overflow")), "{err}");
    }

    #[test]
    fn wrong_value_count_rejected() {
        let asc = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        let err = PopulationGrid::from_reader(Cursor::new(asc)).unwrap_err();
        assert!(matches!(err, IoError::Parse(ref m) if m.contains("3 values")), "{err}");
    }

    #[test]
    fn missing_header_key_rejected() {
        let asc = "ncols 1\nnrows 1\nxllcorner 0\ncellsize 1\n1\n";
        assert!(matches!(
            PopulationGrid::from_reader(Cursor::new(asc)),
            Err(IoError::Parse(ref m)) if m.contains("yllcorner")
        ));
    }

    #[test]
    fn grid_file_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("pop.asc");
        std::fs::write(&path, ASC).unwrap();
        assert_eq!(PopulationGrid::from_path(&path).unwrap(), grid());
    }
}

// ── Writers ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod writers {
    use std::sync::Arc;

    use tempfile::TempDir;

    use acc_core::{SpeedTable, XY};
    use acc_engine::{AccessibilityEngine, PointFeature, PopulationPoint, summarize};
    use acc_spatial::{EdgeAttrs, EdgeWeightModel, RoadGraphBuilder};

    use crate::{write_node_times_csv, write_population_csv, write_summary_csv};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn rows(path: &std::path::Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let records = rdr.records().map(|r| r.unwrap()).collect();
        (headers, records)
    }

    #[test]
    fn node_times_use_external_ids() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(501, XY::new(0.0, 0.0)).unwrap();
        let c = b.add_node(502, XY::new(100.0, 0.0)).unwrap();
        let d = b.add_node(503, XY::new(200.0, 0.0)).unwrap();
        b.add_road(a, c, EdgeAttrs::new(100.0, "residential")).unwrap();
        b.add_road(c, d, EdgeAttrs::new(100.0, "residential")).unwrap();

        let engine = AccessibilityEngine::new(Arc::new(b.build()), vec![PointFeature::new(XY::new(0.0, 0.0))], vec![])
            .unwrap()
            .assign_speeds_and_travel_time(&EdgeWeightModel::new(SpeedTable::uniform(30.0)).unwrap())
            .unwrap();
        let times = engine.compute_accessibility(20.0).unwrap();

        let dir = tmp();
        let path = dir.path().join("node_times.csv");
        write_node_times_csv(&path, engine.graph(), &times).unwrap();

        let (headers, records) = rows(&path);
        assert_eq!(headers, ["node_id", "x", "y", "travel_time_sec"]);
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "501");
        assert_eq!(&records[0][3], "0");
        assert_eq!(&records[1][0], "502");
        assert_eq!(&records[1][1], "100");
        assert_eq!(&records[1][3], "12");
    }

    #[test]
    fn population_undefined_written_empty() {
        let points = vec![
            PopulationPoint { travel_time_min: Some(0.5), ..PopulationPoint::new(XY::new(1.0, 2.0), Some(10.0)) },
            PopulationPoint::new(XY::new(3.0, 4.0), None),
        ];
        let dir = tmp();
        let path = dir.path().join("population.csv");
        write_population_csv(&path, &points).unwrap();

        let (headers, records) = rows(&path);
        assert_eq!(headers, ["x", "y", "pop", "travel_time_min"]);
        assert_eq!(&records[0][2], "10");
        assert_eq!(&records[0][3], "0.5");
        assert_eq!(&records[1][2], "");
        assert_eq!(&records[1][3], "");
    }

    #[test]
    fn summary_rows_in_threshold_order() {
        let points = vec![
            PopulationPoint { travel_time_min: Some(5.0), ..PopulationPoint::new(XY::new(0.0, 0.0), Some(10.0)) },
            PopulationPoint { travel_time_min: Some(15.0), ..PopulationPoint::new(XY::new(0.0, 0.0), Some(20.0)) },
            PopulationPoint { travel_time_min: Some(65.0), ..PopulationPoint::new(XY::new(0.0, 0.0), Some(70.0)) },
        ];
        let summary = summarize(&points, &[60.0, 10.0, 20.0]);

        let dir = tmp();
        let path = dir.path().join("summary.csv");
        write_summary_csv(&path, &summary).unwrap();

        let (headers, records) = rows(&path);
        assert_eq!(headers, ["threshold_min", "percent", "covered_weight", "total_weight"]);
        let got: Vec<(String, String)> =
            records.iter().map(|r| (r[0].to_owned(), r[1].to_owned())).collect();
        assert_eq!(
            got,
            vec![
                ("60".into(), "30".into()),
                ("10".into(), "10".into()),
                ("20".into(), "30".into()),
            ]
        );
        assert!(records.iter().all(|r| &r[3] == "100"));
    }
}
