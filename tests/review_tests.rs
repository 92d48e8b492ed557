use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use todo_tracker::{EventType, EventTypeTable, JsonFileStorage, TodoMap, TodoStore, generate_review};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> NaiveDateTime {
    d(2025, 9, 16).and_hms_opt(12, 0, 0).unwrap()
}

fn long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn new_store() -> (TempDir, TodoStore) {
    let dir = TempDir::new().unwrap();
    let store = TodoStore::create(dir.path().join("todos.json")).unwrap();
    (dir, store)
}

/// Add `total` items of `kind` on `date`, completing the first `completed`.
fn seed(store: &mut TodoStore, date: NaiveDate, kind: &str, total: usize, completed: usize) {
    let mut ids = Vec::new();
    for i in 0..total {
        let item = store
            .add_todo_at(&long(date), &format!("{kind} #{i}"), Some(kind), now())
            .unwrap();
        ids.push(item.id());
    }
    for id in ids.into_iter().take(completed) {
        assert!(store.mark_completed(&iso(date), id).unwrap());
    }
}

#[test]
fn empty_window_has_zero_rates() {
    let (_dir, store) = new_store();
    let report = store.generate_review(now());

    assert_eq!(report.period.start_date, "2025-09-01");
    assert_eq!(report.period.end_date, "2025-09-16");
    assert_eq!(report.total_todos, 0);
    assert_eq!(report.completed_todos, 0);
    assert_eq!(report.completion_rate, 0.0);
    assert!(report.high_frequency_uncompleted.is_empty());

    assert_eq!(report.event_type_stats.len(), 4);
    for (key, stats) in &report.event_type_stats {
        assert_eq!(stats.total, 0, "{key}");
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.uncompleted_rate, 0.0);
        assert!(stats.name.is_some());
    }
}

#[test]
fn window_is_inclusive_by_day() {
    let (_dir, mut store) = new_store();
    let today = now().date();
    seed(&mut store, today - Duration::days(16), "priority1", 1, 0);
    seed(&mut store, today - Duration::days(15), "priority1", 1, 0);
    seed(&mut store, today - Duration::days(3), "priority2", 1, 1);
    seed(&mut store, today, "priority3", 1, 1);
    seed(&mut store, today + Duration::days(1), "priority4", 1, 0);

    let report = store.generate_review(now());
    assert_eq!(report.total_todos, 3);
    assert_eq!(report.completed_todos, 2);
    assert_eq!(report.completion_rate, 66.67);
    assert_eq!(report.event_type_stats["priority1"].total, 1);
    assert_eq!(report.event_type_stats["priority4"].total, 0);
}

#[test]
fn per_type_rates_and_threshold() {
    let (_dir, mut store) = new_store();
    let day = d(2025, 9, 10);
    seed(&mut store, day, "priority2", 10, 3);
    seed(&mut store, day, "priority3", 5, 2);
    seed(&mut store, day, "priority4", 4, 2);

    let report = store.generate_review(now());
    let p2 = &report.event_type_stats["priority2"];
    assert_eq!((p2.total, p2.completed, p2.uncompleted), (10, 3, 7));
    assert_eq!(p2.uncompleted_rate, 70.0);
    assert_eq!(p2.completion_rate, 30.0);
    assert_eq!(p2.name.as_deref(), Some("Priority2"));
    assert_eq!(p2.priority, Some(2));

    // 60% sits on the threshold and still counts; 50% does not.
    assert_eq!(report.event_type_stats["priority3"].uncompleted_rate, 60.0);
    assert_eq!(report.event_type_stats["priority4"].uncompleted_rate, 50.0);

    let flagged: Vec<&str> = report
        .high_frequency_uncompleted
        .iter()
        .map(|h| h.event_type.as_str())
        .collect();
    assert_eq!(flagged, vec!["priority2", "priority3"]);

    let top = &report.high_frequency_uncompleted[0];
    assert_eq!(top.name, "Priority2");
    assert_eq!(top.uncompleted_count, 7);
    assert_eq!(top.total, 10);
    assert_eq!(top.completion_rate, 30.0);

    assert_eq!(report.total_todos, 19);
    assert_eq!(report.completed_todos, 7);
    assert_eq!(report.completion_rate, 36.84);
}

#[test]
fn unknown_types_are_tracked_under_their_key() {
    let (_dir, mut store) = new_store();
    seed(&mut store, d(2025, 9, 12), "meeting", 2, 1);

    let report = store.generate_review(now());
    let meeting = &report.event_type_stats["meeting"];
    assert_eq!((meeting.total, meeting.completed, meeting.uncompleted), (2, 1, 1));
    assert_eq!(meeting.name, None);
    assert_eq!(meeting.priority, None);
    assert_eq!(report.event_type_stats["priority4"].total, 0);
    assert_eq!(report.event_type_stats.len(), 5);
}

#[test]
fn ties_order_by_priority_then_unknown_keys_alphabetically() {
    let (_dir, mut store) = new_store();
    let day = d(2025, 9, 5);
    seed(&mut store, day, "zeta", 1, 0);
    seed(&mut store, day, "priority3", 2, 0);
    seed(&mut store, day, "alpha", 3, 0);
    seed(&mut store, day, "priority1", 1, 0);
    seed(&mut store, day, "priority2", 5, 1);

    let report = store.generate_review(now());
    let order: Vec<(&str, &str)> = report
        .high_frequency_uncompleted
        .iter()
        .map(|h| (h.event_type.as_str(), h.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("priority1", "Priority1"),
            ("priority3", "Priority3"),
            ("alpha", "alpha"),
            ("zeta", "zeta"),
            ("priority2", "Priority2"),
        ]
    );
    assert_eq!(report.high_frequency_uncompleted[4].uncompleted_rate, 80.0);
}

#[test]
fn registered_types_carry_name_and_priority() {
    let dir = TempDir::new().unwrap();
    let mut table = EventTypeTable::default();
    table.register(EventType::new("errand", 3, "#999999", "⚪", "Errand"));
    let mut store = TodoStore::with_event_types(
        Box::new(JsonFileStorage::new(dir.path().join("todos.json"))),
        table,
    )
    .unwrap();

    let item = store
        .add_todo_at("September 15, 2025", "Post office", Some("errand"), now())
        .unwrap();
    assert_eq!(item.priority(), 3);
    assert_eq!(item.color(), "#999999");

    let report = store.generate_review(now());
    let errand = &report.event_type_stats["errand"];
    assert_eq!(errand.name.as_deref(), Some("Errand"));
    assert_eq!(errand.priority, Some(3));
    assert_eq!(report.high_frequency_uncompleted[0].name, "Errand");
}

#[test]
fn report_serializes_with_type_field() {
    let (_dir, mut store) = new_store();
    seed(&mut store, d(2025, 9, 14), "priority1", 1, 0);
    let report = store.generate_review(now());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["high_frequency_uncompleted"][0]["type"], "priority1");
    assert_eq!(json["period"]["start_date"], "2025-09-01");
    assert!(json["event_type_stats"]["priority1"].get("name").is_some());
}

#[test]
fn buckets_with_malformed_dates_are_skipped() {
    let todos: TodoMap = serde_json::from_str(
        r##"{
  "2025-09-10": [
    {"id": 0, "content": "Counted", "completed": true, "created_at": "2025-09-10T09:00:00", "event_type": "priority1", "priority": 1, "color": "#ff4757", "icon": "🔴"}
  ],
  "September 12, 2025": [
    {"id": 0, "content": "Ignored", "completed": false, "created_at": "2025-09-12T09:00:00", "event_type": "priority1", "priority": 1, "color": "#ff4757", "icon": "🔴"}
  ]
}"##,
    )
    .unwrap();

    let report = generate_review(&todos, &EventTypeTable::default(), now());
    assert_eq!(report.total_todos, 1);
    assert_eq!(report.completed_todos, 1);
    assert_eq!(report.event_type_stats["priority1"].total, 1);
    assert!(report.high_frequency_uncompleted.is_empty());
}
