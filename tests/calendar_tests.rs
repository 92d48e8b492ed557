use chrono::NaiveDate;
use todo_tracker::{
    DEFAULT_EVENT_TYPE, DateRange, EventType, EventTypeTable, parse_iso_date, parse_long_date,
    to_iso,
};

#[test]
fn long_dates_convert_to_iso() {
    let cases = [
        ("September 1, 2025", "2025-09-01"),
        ("June 14, 2025", "2025-06-14"),
        ("  August 15, 2025 ", "2025-08-15"),
        ("February 29, 2024", "2024-02-29"),
    ];
    for (input, expected) in cases {
        assert_eq!(to_iso(parse_long_date(input).unwrap()), expected, "{input}");
    }
}

#[test]
fn impossible_long_dates_are_rejected() {
    assert!(parse_long_date("February 30, 2025").is_err());
    assert!(parse_long_date("February 29, 2025").is_err());
}

#[test]
fn iso_parsing_is_strict() {
    assert_eq!(
        parse_iso_date("2025-09-01"),
        NaiveDate::from_ymd_opt(2025, 9, 1)
    );
    assert!(parse_iso_date("September 1, 2025").is_none());
    assert!(parse_iso_date("2025-13-01").is_none());
}

#[test]
fn date_range_crosses_month_boundaries() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let range = DateRange::around(today, 15);
    assert_eq!(range.start_date, "2025-02-18");
    assert_eq!(range.end_date, "2025-03-20");
    assert_eq!(range.today, "2025-03-05");
}

#[test]
fn built_in_event_types() {
    let table = EventTypeTable::default();
    let keys: Vec<(&str, u32)> = table.iter().map(|t| (t.key.as_str(), t.priority)).collect();
    assert_eq!(
        keys,
        vec![
            ("priority1", 1),
            ("priority2", 2),
            ("priority3", 3),
            ("priority4", 4)
        ]
    );
    assert_eq!(table.get("priority2").unwrap().color, "#ffa502");
    assert_eq!(table.get("priority3").unwrap().icon, "🔵");
    assert_eq!(table.get("priority4").unwrap().name, "Priority4");
}

#[test]
fn unknown_keys_classify_as_default() {
    let table = EventTypeTable::default();
    assert!(table.get("meeting").is_none());
    assert_eq!(table.classify("meeting").key, DEFAULT_EVENT_TYPE);
    assert_eq!(table.classify("priority1").priority, 1);
}

#[test]
fn register_adds_or_replaces() {
    let mut table = EventTypeTable::default();
    table.register(EventType::new("urgent", 0, "#000000", "⚫", "Urgent"));
    table.register(EventType::new("priority2", 2, "#abcdef", "🟠", "Soon"));

    assert_eq!(table.iter().next().unwrap().key, "urgent");
    assert_eq!(table.iter().count(), 5);
    assert_eq!(table.get("priority2").unwrap().name, "Soon");
}
