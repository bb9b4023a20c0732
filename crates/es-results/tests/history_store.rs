use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use es_core::{BuildingType, ConstructionPeriod, SimulationMode};
use es_results::{HistoryStore, NewSimulationRecord, ResultsError};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn preset_record(total: f64) -> NewSimulationRecord {
    NewSimulationRecord {
        simulation_type: SimulationMode::PreConfigured,
        building_type: Some(BuildingType::SingleFamilyHouse),
        weather_station: "lund".to_string(),
        construction_period: Some(ConstructionPeriod::From1986To1995),
        batch_config: None,
        building_count: 1,
        total_heating: 5000.0,
        total_cooling: 1200.0,
        total_energy: total,
        eui: total / 125.0,
        floor_area: 125.0,
        results_json: serde_json::json!({"total": total}),
        hourly_data: None,
    }
}

#[test]
fn insert_list_get_newest_first() {
    let dir = unique_temp_dir("es_history_list");
    let store = HistoryStore::new(dir.clone()).unwrap();

    let first = store.insert("alice", preset_record(9000.0)).unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let second = store.insert("alice", preset_record(9500.0)).unwrap();
    store.insert("bob", preset_record(1.0)).unwrap();

    let listed = store.list("alice").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    let loaded = store.get("alice", &first.id).unwrap();
    assert_eq!(loaded, first);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn delete_is_scoped_to_owner() {
    let dir = unique_temp_dir("es_history_delete");
    let store = HistoryStore::new(dir.clone()).unwrap();

    let mine = store.insert("alice", preset_record(9000.0)).unwrap();
    let theirs = store.insert("bob", preset_record(100.0)).unwrap();

    let denied = store.delete("alice", &theirs.id);
    assert!(matches!(denied, Err(ResultsError::RecordNotFound { .. })));
    assert_eq!(store.list("bob").unwrap().len(), 1);

    store.delete("alice", &mine.id).unwrap();
    assert!(store.list("alice").unwrap().is_empty());
    assert!(matches!(
        store.get("alice", &mine.id),
        Err(ResultsError::RecordNotFound { .. })
    ));
    assert_eq!(store.list("bob").unwrap()[0].id, theirs.id);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn rejects_path_like_ids() {
    let dir = unique_temp_dir("es_history_paths");
    let store = HistoryStore::new(dir.clone()).unwrap();
    assert!(matches!(
        store.get("alice", "../etc/passwd"),
        Err(ResultsError::InvalidPath { .. })
    ));
    let _ = std::fs::remove_dir_all(dir);
}
