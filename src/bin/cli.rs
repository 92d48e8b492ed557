use chrono::Local;
use std::io::{self, Write};
use todo_tracker::{DateRange, ReviewReport, TodoItem, TodoPatch, TodoStore, TrackerConfig};

fn render_todos_as_text_table(items: &[TodoItem]) -> String {
    let headers = ["id", "done", "event_type", "priority", "content"];
    let rows: Vec<[String; 5]> = items
        .iter()
        .map(|item| {
            [
                item.id().to_string(),
                if item.completed() { "x" } else { "" }.to_string(),
                item.event_type().to_string(),
                item.priority().to_string(),
                item.content().to_string(),
            ]
        })
        .collect();

    // Compute column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.chars().count());
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&headers[..]));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                       Show this help\n  types                                      List event types\n  list <YYYY-MM-DD>                          Show items for a date\n  add <event_type> <Month D, YYYY> | <text>  Add an item (e.g. add priority1 September 1, 2025 | Launch)\n  done <YYYY-MM-DD> <id>                     Toggle completion\n  edit <YYYY-MM-DD> <id> content <text...>   Replace item text\n  edit <YYYY-MM-DD> <id> type <event_type>   Change event type\n  delete <YYYY-MM-DD> <id>                   Delete an item\n  dates                                      List dates that have items\n  range                                      Show the calendar range around today\n  review                                     Show the 15-day completion review\n  clear                                      Delete every item\n  quit|exit                                  Exit"
    );
}

fn print_event_types(store: &TodoStore) {
    println!("Event types:");
    for t in store.event_types().iter() {
        println!("  {:<12} {} {:<10} priority={} color={}", t.key, t.icon, t.name, t.priority, t.color);
    }
}

fn print_review(report: &ReviewReport) {
    println!(
        "Review {} .. {}",
        report.period.start_date, report.period.end_date
    );
    println!(
        "Completed {}/{} ({}%)",
        report.completed_todos, report.total_todos, report.completion_rate
    );
    for (key, stats) in &report.event_type_stats {
        println!(
            "  {:<12} total={} completed={} uncompleted={} rate={}%",
            key, stats.total, stats.completed, stats.uncompleted, stats.completion_rate
        );
    }
    if report.high_frequency_uncompleted.is_empty() {
        println!("No frequently uncompleted event types.");
    } else {
        println!("Frequently uncompleted:");
        for entry in &report.high_frequency_uncompleted {
            println!(
                "  {} ({}): {}/{} uncompleted ({}%)",
                entry.name,
                entry.event_type,
                entry.uncompleted_count,
                entry.total,
                entry.uncompleted_rate
            );
        }
    }
}

fn print_date_range(range: &DateRange) {
    println!("Today      : {}", range.today);
    println!("Start date : {}", range.start_date);
    println!("End date   : {}", range.end_date);
}

/// Text after the first `skip` words of `raw`, keeping its spacing except for
/// the single separator before it.
fn raw_tail(raw: &str, skip: usize) -> &str {
    let mut rest = raw;
    for _ in 0..skip {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    strip_separator(rest)
}

fn strip_separator(text: &str) -> &str {
    text.strip_prefix([' ', '\t']).unwrap_or(text)
}

fn parse_date_and_id<'a>(
    date_s: Option<&'a str>,
    id_s: Option<&str>,
) -> Result<(&'a str, usize), &'static str> {
    match (date_s, id_s) {
        (Some(date), Some(id_s)) => id_s.parse().map(|id| (date, id)).map_err(|_| "Invalid id"),
        _ => Err("missing arguments"),
    }
}

fn main() {
    env_logger::init();

    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    let mut store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Unable to open {}: {e}", config.data_path.display());
            std::process::exit(1);
        }
    };

    println!("Todo Tracker (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let raw = line.trim_end_matches(['\n', '\r']);
        let input = raw.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "types" => print_event_types(&store),
            "list" => match parts.next() {
                Some(date) => print!("{}", render_todos_as_text_table(store.get_todos(date))),
                None => println!("Usage: list <YYYY-MM-DD>"),
            },
            "add" => {
                let rest = input[cmd.len()..].trim();
                let (Some((head, _)), Some((_, content))) = (rest.split_once('|'), raw.split_once('|'))
                else {
                    println!("Usage: add <event_type> <Month D, YYYY> | <text>");
                    continue;
                };
                let head = head.trim();
                let (event_type, date_input) = match head.split_once(char::is_whitespace) {
                    Some((event_type, date)) => (event_type, date.trim()),
                    None => {
                        println!("Usage: add <event_type> <Month D, YYYY> | <text>");
                        continue;
                    }
                };
                match store.add_todo(date_input, strip_separator(content), Some(event_type)) {
                    Ok(item) => println!(
                        "Added item {} ({}) on {}.",
                        item.id(),
                        item.event_type(),
                        date_input
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "done" => match parse_date_and_id(parts.next(), parts.next()) {
                Ok((date, id)) => match store.mark_completed(date, id) {
                    Ok(true) => {
                        let state = store
                            .get_todos(date)
                            .iter()
                            .find(|t| t.id() == id)
                            .map(|t| if t.completed() { "completed" } else { "open" })
                            .unwrap_or("unknown");
                        println!("Item {id} on {date} is now {state}.");
                    }
                    Ok(false) => println!("Item {id} on {date} not found."),
                    Err(e) => println!("Error: {}", e),
                },
                Err(msg) => println!("{msg}. Usage: done <YYYY-MM-DD> <id>"),
            },
            "edit" => {
                let target = parse_date_and_id(parts.next(), parts.next());
                let field = parts.next();
                let value = raw_tail(raw, 4);
                let patch = match field {
                    Some("content") if !value.trim().is_empty() => TodoPatch::content(value),
                    Some("type") if !value.trim().is_empty() => TodoPatch::event_type(value.trim()),
                    _ => {
                        println!("Usage: edit <YYYY-MM-DD> <id> content|type <value>");
                        continue;
                    }
                };
                match target {
                    Ok((date, id)) => match store.update_todo(date, id, patch) {
                        Ok(true) => println!("Updated item {id} on {date}."),
                        Ok(false) => println!("Item {id} on {date} not found."),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(msg) => println!("{msg}. Usage: edit <YYYY-MM-DD> <id> content|type <value>"),
                }
            }
            "delete" => match parse_date_and_id(parts.next(), parts.next()) {
                Ok((date, id)) => match store.delete_todo(date, id) {
                    Ok(true) => println!("Deleted item {id} on {date}."),
                    Ok(false) => println!("No items on {date}."),
                    Err(e) => println!("Error: {}", e),
                },
                Err(msg) => println!("{msg}. Usage: delete <YYYY-MM-DD> <id>"),
            },
            "dates" => {
                let dates = store.dates_with_todos();
                if dates.is_empty() {
                    println!("No dates with items.");
                } else {
                    println!("{}", dates.join(", "));
                }
            }
            "range" => print_date_range(&DateRange::current()),
            "review" => print_review(&store.generate_review(Local::now().naive_local())),
            "clear" => match store.clear_all() {
                Ok(()) => println!("All items cleared."),
                Err(e) => println!("Error: {}", e),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }

    if let Err(e) = store.shutdown() {
        eprintln!("Error saving {}: {e}", config.data_path.display());
        std::process::exit(1);
    }
}
