//! End-to-end behaviour of a file-backed logbook across restarts.

#![allow(missing_docs)]

use std::{fs, time::Duration};

use logbook::{
    Config, FormValues, ServiceType, Session,
    autosave::Outcome,
    storage::{KeyValueStorage, MemoryStorage},
};
use tempfile::TempDir;

fn values(service_order: &str) -> FormValues {
    FormValues {
        provider_id: "P1".to_string(),
        service_order: service_order.to_string(),
        car_id: "C1".to_string(),
        odometer: 1_000.0,
        engine_hours: 50.0,
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-02".to_string(),
        kind: ServiceType::Unplanned,
        service_description: "Brake pads".to_string(),
    }
}

#[test]
fn state_survives_a_restart() {
    let tmp = TempDir::new().unwrap();

    let (draft, log) = {
        let mut session = Session::open(tmp.path(), Config::default());
        let draft = session.create_draft(values("SO-1"));
        let log = session.submit_log(values("SO-2")).unwrap();
        session.select_draft(&draft);
        (draft, log)
    };

    let session = Session::open(tmp.path(), Config::default());
    let drafts = session.store().drafts();

    assert_eq!(drafts.current_id(), Some(&draft));
    assert_eq!(drafts.get(&draft).unwrap().values, values("SO-1"));
    assert!(drafts.last_saved_at().is_some());
    assert!(!drafts.is_saving());
    assert_eq!(session.store().logs().get(&log.id), Some(&log));
}

#[test]
fn snapshot_is_a_single_versioned_file() {
    let tmp = TempDir::new().unwrap();
    let mut session = Session::open(tmp.path(), Config::default());
    session.create_draft(values("SO-1"));

    let content = fs::read_to_string(tmp.path().join("service-logbook.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(json["_version"], "1");
    assert_eq!(json["drafts"]["items"][0]["service_order"], "SO-1");
    assert_eq!(json["drafts"]["items"][0]["type"], "unplanned");
    assert!(json["service_logs"].as_array().unwrap().is_empty());
}

#[test]
fn corrupt_snapshot_starts_empty_and_is_replaced() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("service-logbook.json");
    fs::write(&path, "{ not json").unwrap();

    let mut session = Session::open(tmp.path(), Config::default());
    assert!(session.store().drafts().is_empty());
    assert!(session.store().logs().is_empty());

    session.submit_log(values("SO-1")).unwrap();

    let reopened = Session::open(tmp.path(), Config::default());
    assert_eq!(reopened.store().logs().len(), 1);
}

#[test]
fn draft_with_unreadable_readings_keeps_logs_across_restart() {
    let storage = MemoryStorage::default();
    let mut session = Session::with_storage(storage.clone(), Config::default());
    let log = session.submit_log(values("SO-1")).unwrap();
    let draft = session.create_draft(FormValues {
        odometer: f64::NAN,
        engine_hours: f64::NEG_INFINITY,
        ..values("SO-2")
    });

    let restored = Session::with_storage(storage, Config::default());

    assert_eq!(restored.store().logs().get(&log.id), Some(&log));
    let draft = restored.store().drafts().get(&draft).unwrap();
    assert!(draft.values.odometer.abs() < f64::EPSILON);
    assert!(draft.values.engine_hours.abs() < f64::EPSILON);
}

#[test]
fn storage_key_selects_the_logbook() {
    let tmp = TempDir::new().unwrap();
    let mut fleet = Config::default();
    fleet.set_storage_key("fleet");

    Session::open(tmp.path(), fleet.clone())
        .submit_log(values("SO-1"))
        .unwrap();

    assert!(tmp.path().join("fleet.json").exists());
    assert_eq!(Session::open(tmp.path(), fleet).store().logs().len(), 1);
    assert!(
        Session::open(tmp.path(), Config::default())
            .store()
            .logs()
            .is_empty()
    );
}

#[test]
fn autosave_persists_after_quiescence() {
    let storage = MemoryStorage::default();
    let mut session = Session::with_storage(storage.clone(), Config::default());
    let mut autosave = session.autosave();

    autosave.value_changed(FormValues::default(), 0);
    autosave.value_changed(values("SO-1"), 100);
    autosave.value_changed(values("SO-12"), 250);

    assert_eq!(autosave.poll(649, session.store_mut()), None);
    assert!(storage.get("service-logbook").is_none());

    let Some(Outcome::Saved(id)) = autosave.poll(650, session.store_mut()) else {
        panic!("expected the draft to be saved");
    };

    let restored = Session::with_storage(storage, Config::default());
    let draft = restored.store().drafts().get(&id).unwrap();
    assert_eq!(draft.values.service_order, "SO-12");
    assert_eq!(restored.store().drafts().current_id(), Some(&id));
}

#[test]
fn submitting_keeps_the_source_draft() {
    let storage = MemoryStorage::default();
    let mut session = Session::with_storage(storage.clone(), Config::default());
    let draft = session.create_draft(values("SO-1"));

    session.submit_log(values("SO-1")).unwrap();

    let restored = Session::with_storage(storage, Config::default());
    assert!(restored.store().drafts().get(&draft).is_some());
    assert_eq!(restored.store().drafts().current_id(), None);
    assert_eq!(restored.store().logs().len(), 1);
}

#[test]
fn declined_delete_writes_nothing() {
    let storage = MemoryStorage::default();
    let mut session = Session::with_storage(storage.clone(), Config::default());
    let log = session.submit_log(values("SO-1")).unwrap();
    let before = storage.read("service-logbook").unwrap();

    assert!(!session.delete_log(&log.id, &|_: &str| false));

    assert_eq!(storage.read("service-logbook").unwrap(), before);
}

#[test]
fn configured_delay_drives_autosave() {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.set_autosave_delay(Duration::from_millis(1_000));
    config.save(&tmp.path().join("config.toml")).unwrap();

    let config = Config::load_or_default(tmp.path());
    let session = Session::open(tmp.path(), config);
    let mut autosave = session.autosave();

    autosave.value_changed(FormValues::default(), 0);
    autosave.value_changed(values("SO-1"), 10);

    assert_eq!(autosave.deadline(), Some(1_010));
}
