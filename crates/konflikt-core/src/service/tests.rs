use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;
use crate::db::{Database, MemoryStorage, SqliteStorage};
use crate::models::{FieldDiff, Resolution};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn service() -> ConflictService<MemoryStorage> {
    ConflictService::new(MemoryStorage::new())
}

fn seeded(conflicts: &[ConflictRecord]) -> ConflictService<MemoryStorage> {
    let mut storage = MemoryStorage::new();
    let raw = serde_json::to_string(conflicts).unwrap();
    storage
        .set(&EngineConfig::default().queue_key, &raw)
        .unwrap();
    ConflictService::new(storage)
}

fn capture_events<S: Storage>(service: &mut ConflictService<S>) -> Rc<RefCell<Vec<ConflictEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    service.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn new_conflict(table: &str, record_id: &str, local: Value, remote: Value) -> NewConflict {
    let local = record(local);
    let remote = record(remote);
    let conflicting_fields = detect::detect_conflict(table, Some(&local), Some(&remote)).fields;
    NewConflict {
        table: table.to_string(),
        record_id: record_id.to_string(),
        record_title: None,
        local_record: local,
        remote_record: remote,
        conflicting_fields,
    }
}

fn name_conflict(record_id: &str) -> NewConflict {
    new_conflict(
        "customers",
        record_id,
        json!({"id": record_id, "name": "A"}),
        json!({"id": record_id, "name": "B"}),
    )
}

fn stored_conflict(record_id: &str, resolved_at: Option<DateTime<Utc>>) -> ConflictRecord {
    ConflictRecord {
        id: ConflictId::new(),
        table: "invoices".to_string(),
        record_id: record_id.to_string(),
        record_title: record_id.to_string(),
        detected_at: Utc::now() - Duration::days(90),
        local_record: record(json!({"id": record_id})),
        remote_record: record(json!({"id": record_id})),
        conflicting_fields: vec![],
        status: if resolved_at.is_some() {
            ConflictStatus::Resolved
        } else {
            ConflictStatus::Pending
        },
        resolved_at,
        resolution: resolved_at.map(|_| Resolution::KeepLocal),
    }
}

fn stored_value<S: Storage>(service: &ConflictService<S>, key: &str) -> Option<Value> {
    service
        .storage()
        .get(key)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[test]
fn add_conflict_queues_pending_entry() {
    let mut service = service();
    let events = capture_events(&mut service);

    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    assert!(conflict.is_pending());
    assert_eq!(conflict.record_title, "A");
    assert_eq!(conflict.resolved_at, None);
    assert_eq!(service.get_conflict_count(), 1);
    assert_eq!(service.get_conflict(&conflict.id), Some(&conflict));
    assert_eq!(
        *events.borrow(),
        vec![ConflictEvent::ConflictAdded {
            conflict: conflict.clone()
        }]
    );

    let persisted = stored_value(&service, "freyai_sync_conflicts").unwrap();
    assert_eq!(persisted[0]["recordId"], json!("c-1"));
}

#[test]
fn add_conflict_prefers_explicit_title() {
    let mut service = service();
    let mut data = name_conflict("c-1");
    data.record_title = Some("  Kunde Meier ".to_string());

    let conflict = service.add_conflict(data).unwrap();

    assert_eq!(conflict.record_title, "Kunde Meier");
}

#[test]
fn add_conflict_falls_back_to_remote_title() {
    let mut service = service();
    let data = NewConflict {
        table: "orders".to_string(),
        record_id: "o-1".to_string(),
        remote_record: record(json!({"id": "o-1", "po_nummer": "PO-77"})),
        ..NewConflict::default()
    };

    let conflict = service.add_conflict(data).unwrap();

    assert_eq!(conflict.record_title, "PO-77");
}

#[test]
fn add_conflict_rejects_blank_identity() {
    let mut service = service();

    let blank_id = NewConflict {
        record_id: "  ".to_string(),
        ..name_conflict("c-1")
    };
    assert!(matches!(
        service.add_conflict(blank_id),
        Err(Error::InvalidInput(_))
    ));

    let blank_table = NewConflict {
        table: " \t".to_string(),
        ..name_conflict("c-1")
    };
    assert!(matches!(
        service.add_conflict(blank_table),
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(service.conflicts().len(), 0);
}

#[test]
fn add_conflict_accepts_any_non_blank_table() {
    let mut service = service();

    for table in ["purchase-orders", "aufmaße", "hwf invoices;"] {
        let stored = service
            .add_conflict(NewConflict {
                table: format!(" {table} "),
                ..name_conflict("c-1")
            })
            .unwrap();
        assert_eq!(stored.table, table);
    }

    assert_eq!(service.get_conflict_count(), 3);
    let persisted = stored_value(&service, "freyai_sync_conflicts").unwrap();
    assert_eq!(persisted[0]["table"], json!("purchase-orders"));
}

#[test]
fn duplicate_add_refreshes_pending_entry() {
    let mut service = service();
    let first = service.add_conflict(name_conflict("c-1")).unwrap();

    let second = service
        .add_conflict(new_conflict(
            "customers",
            "c-1",
            json!({"id": "c-1", "name": "A2"}),
            json!({"id": "c-1", "name": "B2"}),
        ))
        .unwrap();

    assert_eq!(second.id, first.id);
    let pending = service.get_pending_conflicts();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].local_record["name"], json!("A2"));
    assert_eq!(pending[0].remote_record["name"], json!("B2"));
    assert_eq!(pending[0].conflicting_fields[0].remote_value, Some(json!("B2")));
}

#[test]
fn resolved_conflicts_are_never_reopened() {
    let mut service = service();
    let first = service.add_conflict(name_conflict("c-1")).unwrap();
    service.resolve_keep_local(&first.id).unwrap();

    let second = service.add_conflict(name_conflict("c-1")).unwrap();

    assert_ne!(second.id, first.id);
    assert_eq!(service.conflicts().len(), 2);
    assert_eq!(
        service.get_conflict(&first.id).unwrap().status,
        ConflictStatus::Resolved
    );
}

#[test]
fn keep_local_and_keep_remote_pick_their_side() {
    let mut service = service();
    let local_case = service.add_conflict(name_conflict("c-1")).unwrap();
    let remote_case = service.add_conflict(name_conflict("c-2")).unwrap();

    let kept_local = service.resolve_keep_local(&local_case.id).unwrap();
    let kept_remote = service.resolve_keep_remote(&remote_case.id).unwrap();

    assert_eq!(kept_local["name"], json!("A"));
    assert_eq!(kept_remote["name"], json!("B"));

    let settled = service.get_conflict(&local_case.id).unwrap();
    assert_eq!(settled.status, ConflictStatus::Resolved);
    assert_eq!(settled.resolution, Some(Resolution::KeepLocal));
    assert!(settled.resolved_at.is_some());
}

#[test]
fn manual_merge_pins_record_identity() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    let merged = service
        .resolve_manual_merge(
            &conflict.id,
            record(json!({"name": "X", "id": "malicious", "note": "merged"})),
        )
        .unwrap();

    assert_eq!(
        Value::Object(merged),
        json!({"id": "c-1", "name": "X", "note": "merged"})
    );
    assert_eq!(
        service.get_conflict(&conflict.id).unwrap().resolution,
        Some(Resolution::ManualMerge)
    );
}

#[test]
fn manual_merge_keeps_numeric_ids_numeric() {
    let mut service = service();
    let conflict = service
        .add_conflict(new_conflict(
            "orders",
            "42",
            json!({"id": 42, "total": 10}),
            json!({"id": 42, "total": 12}),
        ))
        .unwrap();

    let merged = service
        .resolve_manual_merge(&conflict.id, record(json!({"id": 7, "total": 11})))
        .unwrap();

    assert_eq!(merged["id"], json!(42));
    assert_eq!(merged["total"], json!(11));
}

#[test]
fn selections_drive_manual_merge() {
    let mut service = service();
    let conflict = service
        .add_conflict(new_conflict(
            "invoices",
            "rec-9",
            json!({"id": "rec-9", "total": 100, "status": "offen", "memo": "lokal"}),
            json!({"id": "rec-9", "total": 120, "status": "bezahlt", "memo": "lokal"}),
        ))
        .unwrap();
    let choices = HashMap::from([("status".to_string(), FieldChoice::Remote)]);

    let merged = service
        .resolve_with_selections(&conflict.id, &choices)
        .unwrap();

    assert_eq!(
        Value::Object(merged),
        json!({"id": "rec-9", "total": 100, "status": "bezahlt", "memo": "lokal"})
    );
}

#[test]
fn unknown_conflict_is_not_found() {
    let mut service = service();
    let events = capture_events(&mut service);
    let missing = ConflictId::new();

    assert!(matches!(
        service.resolve_keep_local(&missing),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        service.resolve_manual_merge(&missing, Record::new()),
        Err(Error::NotFound(_))
    ));
    assert_eq!(service.get_conflict(&missing), None);
    assert!(events.borrow().is_empty());
}

#[test]
fn resolved_conflict_cannot_be_resolved_again() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();
    service.resolve_keep_local(&conflict.id).unwrap();
    let resolved_at = service.get_conflict(&conflict.id).unwrap().resolved_at;
    let events = capture_events(&mut service);

    let again = service.resolve_keep_remote(&conflict.id);

    assert!(matches!(again, Err(Error::AlreadyResolved(_))));
    let settled = service.get_conflict(&conflict.id).unwrap();
    assert_eq!(settled.resolution, Some(Resolution::KeepLocal));
    assert_eq!(settled.resolved_at, resolved_at);
    assert!(events.borrow().is_empty());
}

#[test]
fn resolution_emits_conflict_and_record() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();
    let events = capture_events(&mut service);

    let resolved = service.resolve_keep_remote(&conflict.id).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ConflictEvent::ConflictResolved {
            conflict: settled,
            resolved_record,
        } => {
            assert_eq!(settled.id, conflict.id);
            assert_eq!(settled.resolution, Some(Resolution::KeepRemote));
            assert_eq!(resolved_record, &resolved);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn batch_resolves_every_pending_conflict() {
    let mut service = service();
    for id in ["c-1", "c-2", "c-3"] {
        service.add_conflict(name_conflict(id)).unwrap();
    }
    let events = capture_events(&mut service);

    let count = service.resolve_all_keep_local();

    assert_eq!(count, 3);
    assert_eq!(service.get_pending_conflicts().len(), 0);
    assert_eq!(service.get_conflict_history().len(), 3);
    let events = events.borrow();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events.last(),
        Some(&ConflictEvent::ConflictsBatchResolved {
            count: 3,
            strategy: Resolution::KeepLocal
        })
    );
}

#[test]
fn batch_skips_already_resolved_conflicts() {
    let mut service = service();
    let first = service.add_conflict(name_conflict("c-1")).unwrap();
    service.add_conflict(name_conflict("c-2")).unwrap();
    service.resolve_keep_local(&first.id).unwrap();

    assert_eq!(service.resolve_all_keep_remote(), 1);
    assert_eq!(
        service.get_conflict(&first.id).unwrap().resolution,
        Some(Resolution::KeepLocal)
    );
    assert_eq!(service.resolve_all_keep_remote(), 0);
}

#[test]
fn history_lists_most_recent_resolution_first() {
    let now = Utc::now();
    let older = stored_conflict("old", Some(now - Duration::days(3)));
    let newer = stored_conflict("new", Some(now - Duration::hours(2)));
    let pending = stored_conflict("open", None);
    let service = seeded(&[older, pending, newer]);

    let history = service
        .get_conflict_history()
        .iter()
        .map(|conflict| conflict.record_id.as_str())
        .collect::<Vec<_>>();

    assert_eq!(history, vec!["new", "old"]);
    assert_eq!(service.get_conflict_count(), 1);
}

#[test]
fn retention_purges_only_old_resolved_conflicts() {
    let now = Utc::now();
    let mut service = seeded(&[
        stored_conflict("forty-days", Some(now - Duration::days(40))),
        stored_conflict("one-day", Some(now - Duration::days(1))),
        stored_conflict("pending", None),
    ]);

    assert_eq!(service.clear_resolved_conflicts(30), 1);
    let remaining = service
        .conflicts()
        .iter()
        .map(|conflict| conflict.record_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(remaining, vec!["one-day", "pending"]);

    assert_eq!(service.clear_resolved_conflicts(0), 1);
    assert_eq!(service.conflicts().len(), 1);
    assert!(service.conflicts()[0].is_pending());

    let persisted = stored_value(&service, "freyai_sync_conflicts").unwrap();
    assert_eq!(persisted.as_array().map(Vec::len), Some(1));
}

#[test]
fn retention_beyond_representable_time_removes_nothing() {
    let now = Utc::now();
    let mut service = seeded(&[
        stored_conflict("ancient", Some(now - Duration::days(36_500))),
        stored_conflict("pending", None),
    ]);

    assert_eq!(service.clear_resolved_conflicts(u32::MAX), 0);
    assert_eq!(service.conflicts().len(), 2);

    let storage = service.into_storage();
    let config = EngineConfig {
        retention_days: u32::MAX,
        ..EngineConfig::default()
    };
    let mut service = ConflictService::with_config(storage, config);
    assert_eq!(service.clear_expired_conflicts(), 0);
    assert_eq!(service.clear_resolved_conflicts(36_000), 1);
}

#[test]
fn expired_cleanup_uses_configured_retention() {
    let now = Utc::now();
    let mut service = seeded(&[
        stored_conflict("ten-days", Some(now - Duration::days(10))),
        stored_conflict("two-days", Some(now - Duration::days(2))),
    ]);

    assert_eq!(service.clear_expired_conflicts(), 0);

    let storage = service.into_storage();
    let config = EngineConfig {
        retention_days: 7,
        ..EngineConfig::default()
    };
    let mut service = ConflictService::with_config(storage, config);
    assert_eq!(service.clear_expired_conflicts(), 1);
}

#[test]
fn invalid_strategy_is_ignored() {
    let mut service = service();
    let events = capture_events(&mut service);

    assert_eq!(service.set_auto_resolve_strategy("bogus"), None);
    assert_eq!(
        service.get_auto_resolve_strategy(),
        AutoResolveStrategy::Manual
    );

    assert_eq!(
        service.set_auto_resolve_strategy("remote-wins"),
        Some(AutoResolveStrategy::RemoteWins)
    );
    assert_eq!(service.set_auto_resolve_strategy("LOCAL_WINS"), None);
    assert_eq!(
        service.get_auto_resolve_strategy(),
        AutoResolveStrategy::RemoteWins
    );
    assert_eq!(
        *events.borrow(),
        vec![ConflictEvent::ConflictSettingsChanged {
            strategy: AutoResolveStrategy::RemoteWins
        }]
    );
    assert_eq!(
        stored_value(&service, "freyai_conflict_settings"),
        Some(json!({"autoResolveStrategy": "remote-wins"}))
    );
}

#[test]
fn unreadable_settings_fall_back_to_manual() {
    let mut storage = MemoryStorage::new();
    storage.set("freyai_conflict_settings", "{not json").unwrap();
    let service = ConflictService::new(storage);

    assert_eq!(
        service.get_auto_resolve_strategy(),
        AutoResolveStrategy::Manual
    );
}

#[test]
fn queue_survives_a_restart() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();
    service.add_conflict(name_conflict("c-2")).unwrap();
    service.resolve_keep_remote(&conflict.id).unwrap();

    let reloaded = ConflictService::new(service.into_storage());

    assert_eq!(reloaded.conflicts().len(), 2);
    assert_eq!(reloaded.get_conflict_count(), 1);
    assert_eq!(
        reloaded.get_conflict(&conflict.id).unwrap().resolution,
        Some(Resolution::KeepRemote)
    );
}

#[test]
fn unreadable_queue_starts_empty() {
    let mut storage = MemoryStorage::new();
    storage.set("freyai_sync_conflicts", "[{").unwrap();

    let service = ConflictService::new(storage);

    assert!(service.conflicts().is_empty());
}

#[test]
fn failed_writes_keep_the_in_memory_change() {
    let mut storage = MemoryStorage::new();
    storage.fail_writes(true);
    let mut service = ConflictService::new(storage);

    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();
    let resolved = service.resolve_keep_local(&conflict.id).unwrap();

    assert_eq!(resolved["name"], json!("A"));
    assert_eq!(service.get_conflict_count(), 0);
    assert!(service.storage().is_empty());
    assert!(service.pending_outbox().is_empty());
}

#[test]
fn resolution_merges_into_existing_collection_item() {
    let mut storage = MemoryStorage::new();
    storage
        .set(
            "hwf_customers",
            &json!([
                {"id": "c-0", "name": "Other"},
                {"id": "c-1", "name": "Old", "phone": "0171"}
            ])
            .to_string(),
        )
        .unwrap();
    let mut service = ConflictService::new(storage);
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    service.resolve_keep_remote(&conflict.id).unwrap();

    let items = service.collection("customers");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], json!("Other"));
    assert_eq!(items[1]["name"], json!("B"));
    assert_eq!(items[1]["phone"], json!("0171"));
    assert!(items[1]["updated_at"].is_string());
}

#[test]
fn resolution_appends_unknown_records() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    service.resolve_keep_local(&conflict.id).unwrap();

    let items = service.collection("customers");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], json!("c-1"));
    assert_eq!(items[0]["name"], json!("A"));
    assert!(items[0].contains_key("updated_at"));
}

#[test]
fn applying_twice_only_refreshes_the_stamp() {
    let mut service = service();
    let resolved = record(json!({"id": "c-1", "name": "A"}));

    service.apply_resolution("customers", &resolved);
    let mut first = service.collection("customers");
    service.apply_resolution("customers", &resolved);
    let mut second = service.collection("customers");

    for item in first.iter_mut().chain(second.iter_mut()) {
        item.remove("updated_at");
    }
    assert_eq!(first, second);
}

#[test]
fn unreadable_collection_is_left_untouched() {
    let mut storage = MemoryStorage::new();
    storage.set("hwf_customers", "not json").unwrap();
    let mut service = ConflictService::new(storage);
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    service.resolve_keep_local(&conflict.id).unwrap();

    assert_eq!(
        service.storage().get("hwf_customers").unwrap().as_deref(),
        Some("not json")
    );
    assert_eq!(service.get_conflict_count(), 0);
}

#[test]
fn resolutions_are_queued_for_upload() {
    let mut service = service();
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    service.resolve_keep_remote(&conflict.id).unwrap();

    let outbox = service.pending_outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].table, "customers");
    assert_eq!(outbox[0].action, OutboxAction::Upsert);
    assert_eq!(outbox[0].data["name"], json!("B"));
    assert!(outbox[0].timestamp > 0);

    assert_eq!(service.clear_outbox().unwrap(), 1);
    assert!(service.pending_outbox().is_empty());
}

#[test]
fn custom_config_changes_storage_keys() {
    let config = EngineConfig {
        queue_key: "queue".to_string(),
        collection_prefix: "app_".to_string(),
        outbox_key: "outbox".to_string(),
        ..EngineConfig::default()
    };
    let mut service = ConflictService::with_config(MemoryStorage::new(), config);
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();

    service.resolve_keep_local(&conflict.id).unwrap();

    assert!(stored_value(&service, "queue").is_some());
    assert!(stored_value(&service, "app_customers").is_some());
    assert!(stored_value(&service, "outbox").is_some());
    assert!(stored_value(&service, "freyai_sync_conflicts").is_none());
}

#[test]
fn invoice_scenario_end_to_end() {
    let mut service = service();
    let local = record(json!({
        "id": "rec-001",
        "name": "Lokaler Name",
        "status": "offen",
        "updated_at": "2024-01-01T10:00:00Z"
    }));
    let remote = record(json!({
        "id": "rec-001",
        "name": "Remote Name",
        "status": "bezahlt",
        "updated_at": "2024-01-01T12:00:00Z"
    }));

    let report = service.detect_conflict("invoices", Some(&local), Some(&remote));
    assert!(report.has_conflict);
    let fields = report
        .fields
        .iter()
        .map(|diff| diff.field.as_str())
        .collect::<Vec<_>>();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"status"));
    assert!(!fields.contains(&"id"));

    let conflict = service
        .add_conflict(NewConflict {
            table: "invoices".to_string(),
            record_id: "rec-001".to_string(),
            record_title: None,
            local_record: local,
            remote_record: remote,
            conflicting_fields: report.fields,
        })
        .unwrap();
    assert_eq!(conflict.record_title, "Lokaler Name");

    let resolved = service.resolve_keep_remote(&conflict.id).unwrap();
    assert_eq!(resolved["name"], json!("Remote Name"));
    assert_eq!(resolved["status"], json!("bezahlt"));
}

#[test]
fn ingest_queues_diverging_pairs_under_manual_strategy() {
    let mut service = service();

    let in_sync = service
        .ingest(
            "customers",
            Some(record(json!({"id": "c-1", "name": "A"}))),
            Some(record(json!({"id": "c-1", "name": "A", "user_id": "u-2"}))),
        )
        .unwrap();
    assert_eq!(in_sync, IngestOutcome::InSync);

    let queued = service
        .ingest(
            "customers",
            Some(record(json!({"id": "c-1", "name": "A"}))),
            Some(record(json!({"id": "c-1", "name": "B"}))),
        )
        .unwrap();
    let IngestOutcome::Queued(id) = queued else {
        panic!("expected a queued conflict, got {queued:?}");
    };
    assert!(service.get_conflict(&id).unwrap().is_pending());
}

#[test]
fn ingest_auto_resolves_with_configured_strategy() {
    let mut service = service();
    service.set_auto_resolve_strategy("remote-wins");

    let outcome = service
        .ingest(
            "orders",
            Some(record(json!({"id": 7, "total": 10}))),
            Some(record(json!({"id": 7, "total": 12}))),
        )
        .unwrap();

    let IngestOutcome::AutoResolved {
        conflict_id,
        resolution,
    } = outcome
    else {
        panic!("expected auto resolution, got {outcome:?}");
    };
    assert_eq!(resolution, Resolution::KeepRemote);
    let conflict = service.get_conflict(&conflict_id).unwrap();
    assert_eq!(conflict.record_id, "7");
    assert_eq!(conflict.status, ConflictStatus::Resolved);
    assert_eq!(service.collection("orders")[0]["total"], json!(12));
}

#[test]
fn ingest_rejects_diverging_pairs_without_id() {
    let mut service = service();

    let result = service.ingest(
        "customers",
        Some(record(json!({"name": "A"}))),
        Some(record(json!({"name": "B"}))),
    );

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(service.conflicts().is_empty());
}

#[test]
fn sync_pass_counts_outcomes() {
    let mut service = service();
    let mut pairs = vec![
        RecordPair {
            local: Some(record(json!({"id": "a", "name": "A"}))),
            remote: Some(record(json!({"id": "a", "name": "A"}))),
        },
        RecordPair {
            local: Some(record(json!({"id": "b", "name": "A"}))),
            remote: Some(record(json!({"id": "b", "name": "B"}))),
        },
        RecordPair {
            local: None,
            remote: Some(record(json!({"id": "c", "name": "C"}))),
        },
        RecordPair {
            local: Some(record(json!({"name": "A"}))),
            remote: Some(record(json!({"name": "B"}))),
        },
    ];

    let summary = service.run_sync_pass(&mut pairs, "customers").unwrap();

    assert_eq!(
        summary,
        SyncPassSummary {
            scanned: 4,
            in_sync: 2,
            queued: 1,
            auto_resolved: 0,
            rejected: 1,
        }
    );
    assert!(pairs.is_empty());
}

#[test]
fn service_runs_on_sqlite_storage() {
    let db = Database::open_in_memory().unwrap();
    let mut service = ConflictService::new(SqliteStorage::new(db.connection()));
    let conflict = service.add_conflict(name_conflict("c-1")).unwrap();
    service.resolve_keep_local(&conflict.id).unwrap();
    drop(service);

    let reloaded = ConflictService::new(SqliteStorage::new(db.connection()));
    assert_eq!(reloaded.conflicts().len(), 1);
    assert_eq!(reloaded.collection("customers").len(), 1);
    assert_eq!(reloaded.pending_outbox().len(), 1);
}

#[test]
fn field_diffs_carry_record_timestamps() {
    let mut service = service();
    let conflict = service
        .add_conflict(new_conflict(
            "customers",
            "c-1",
            json!({"id": "c-1", "name": "A", "created_at": "2024-01-01"}),
            json!({"id": "c-1", "name": "B", "created_at": "2024-02-01"}),
        ))
        .unwrap();

    assert_eq!(
        conflict.conflicting_fields,
        vec![FieldDiff {
            field: "name".to_string(),
            local_value: Some(json!("A")),
            remote_value: Some(json!("B")),
            local_timestamp: Some(json!("2024-01-01")),
            remote_timestamp: Some(json!("2024-02-01")),
        }]
    );
}
