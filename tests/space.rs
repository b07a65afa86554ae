//! Space requirement records and placement definitions.

use std::io::Cursor;

use animdata::space::{pawn_positions, CellRect, PlacementDef, RequirementRole, SpaceRequirement, RECORD_SIZE};
use animdata::util::IVec2;

#[test]
fn test_boundary_values_roundtrip() {
    let reqs = [
        SpaceRequirement::must_be_clear(CellRect::new(-128, 127, 255, 255)),
        SpaceRequirement::new(RequirementRole::PawnStart, 255, CellRect::new(-128, -128, 1, 1)),
        SpaceRequirement::new(RequirementRole::PawnEnd, 0, CellRect::new(127, 0, 0, 0)),
    ];
    for req in reqs {
        req.check_range().unwrap();
        let bytes = req.encode();
        assert_eq!(bytes.len(), RECORD_SIZE);
        let back = SpaceRequirement::decode(&bytes).unwrap();
        assert_eq!(back, req);
        assert_eq!(back.encode(), bytes);
    }
    assert_eq!(reqs[0].encode(), [0, 0, 0x80, 0x7f, 0xff, 0xff]);
    assert_eq!(reqs[1].encode()[1], 255);
}

#[test]
fn test_stream_of_records() {
    let reqs = vec![
        SpaceRequirement::pawn_start(0, 0, 0),
        SpaceRequirement::pawn_start(1, 1, 0),
        SpaceRequirement::must_be_clear(CellRect::new(-1, -1, 3, 3)),
    ];
    let mut buf = Vec::new();
    for req in &reqs {
        req.write_to(&mut buf).unwrap();
    }
    assert_eq!(buf.len(), reqs.len() * RECORD_SIZE);

    let mut cursor = Cursor::new(buf);
    let back: Vec<_> = (0..reqs.len())
        .map(|_| SpaceRequirement::read_from(&mut cursor).unwrap())
        .collect();
    assert_eq!(back, reqs);
    assert!(SpaceRequirement::read_from(&mut cursor).is_err());
}

#[test]
fn test_mirror_twice_is_identity() {
    let req = SpaceRequirement::must_be_clear(CellRect::new(-2, 1, 4, 3));
    let original: Vec<IVec2> = req.cells(false, false).collect();
    let twice: Vec<IVec2> = req
        .cells(true, false)
        .map(|c| IVec2::new(-c.x, c.y))
        .collect();
    assert_eq!(twice, original);

    let both: Vec<IVec2> = req.cells(true, true).map(|c| -c).collect();
    assert_eq!(both, original);
    assert_eq!(req.cell_count(), 12);
}

#[test]
fn test_negative_width_record() {
    let req = SpaceRequirement::must_be_clear(CellRect::new(2, -1, -3, 1));
    let cells: Vec<IVec2> = req.cells(true, false).collect();
    assert_eq!(cells, vec![IVec2::new(1, -1), IVec2::new(0, -1), IVec2::new(-1, -1)]);
    assert_eq!(req.cell_count(), 3);
}

#[test]
fn test_pawn_positions_last_wins() {
    let reqs = [
        SpaceRequirement::pawn_start(1, 1, 0),
        SpaceRequirement::pawn_start(1, 2, 0),
        SpaceRequirement::pawn_end(1, 5, 5),
    ];
    let (start, end) = pawn_positions(&reqs, 1);
    assert_eq!(start.unwrap().first_cell(false, false), IVec2::new(2, 0));
    assert_eq!(end.unwrap().first_cell(false, false), IVec2::new(5, 5));
}

#[test]
fn test_placement_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stab.json");
    let def = PlacementDef {
        name: "Stab".into(),
        pawn_count: 2,
        data: "Execution/Stab".into(),
        cell_data: vec![
            SpaceRequirement::pawn_start(0, 0, 0),
            SpaceRequirement::pawn_start(1, 1, 0),
            SpaceRequirement::pawn_end(1, 2, 0),
            SpaceRequirement::must_be_clear(CellRect::new(0, 0, 3, 1)),
        ],
        ..Default::default()
    };
    std::fs::write(&path, def.to_json().unwrap()).unwrap();

    let loaded = PlacementDef::load(&path).unwrap();
    assert_eq!(loaded, def);
    assert!(loaded.config_errors().is_empty());
    assert_eq!(
        loaded.full_data_path(dir.path()),
        dir.path().join("Animations").join("Execution/Stab.anim")
    );

    let clear: Vec<_> = loaded.must_be_clear_cells(true, false, IVec2::new(4, 4)).collect();
    // Pawn cells first, in entry order, then the must-be-clear row.
    assert_eq!(
        clear,
        vec![
            IVec2::new(4, 4),
            IVec2::new(3, 4),
            IVec2::new(2, 4),
            IVec2::new(4, 4),
            IVec2::new(3, 4),
            IVec2::new(2, 4),
        ]
    );
    assert_eq!(loaded.try_get_cell(RequirementRole::PawnEnd, 1, false, true), Some(IVec2::new(2, 0)));
}
