use beatlist::utils::*;

#[test]
fn test_table_name_replaces_separators() {
    assert_eq!(table_name("Liked Songs"), "Liked_Songs");
    assert_eq!(table_name("road-trip mix"), "road_trip_mix");
}

#[test]
fn test_table_name_drops_unsafe_characters() {
    assert_eq!(table_name("Rock'n'Roll!"), "RocknRoll");
    assert_eq!(table_name("x\"; DROP TABLE y; --"), "x_DROP_TABLE_y___");
    assert_eq!(table_name("Café"), "Caf");
}

#[test]
fn test_table_name_leading_digit() {
    assert_eq!(table_name("2024 hits"), "t_2024_hits");
}

#[test]
fn test_table_name_is_idempotent() {
    for name in ["Liked Songs", "2024 hits", "a-b c!d", "", "___"] {
        let once = table_name(name);
        assert_eq!(table_name(&once), once);
    }
}

#[test]
fn test_playlist_table_name() {
    assert_eq!(playlist_table_name("Running 170"), "playlist_Running_170");
}

#[test]
fn test_remove_duplicate_ids_keeps_first_occurrence() {
    let mut ids = vec![
        "b".to_string(),
        "a".to_string(),
        "b".to_string(),
        "c".to_string(),
        "a".to_string(),
    ];
    remove_duplicate_ids(&mut ids);

    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[test]
fn test_round2() {
    assert_eq!(round2(1.234), 1.23);
    assert_eq!(round2(1.235), 1.24);
    assert_eq!(round2(-0.004), -0.0);
    assert_eq!(round2(120.0), 120.0);
}
