use crate::error::CliError;
use connectors::decoder::gdata::text;
use model::feeds::FeedInfo;
use serde::Serialize;
use serde_json::Value;

/// Feed metadata plus what the stream has learned so far.
#[derive(Debug, Serialize)]
pub struct InfoReport<'a> {
    pub locator: &'a str,
    pub count: usize,
    pub cached: usize,
    pub state: String,
    pub info: Option<&'a FeedInfo>,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_entries(start: usize, entries: &[Value], as_json: bool) -> Result<(), CliError> {
    if as_json {
        return print_json(entries);
    }
    for (offset, entry) in entries.iter().enumerate() {
        println!("{}", summary_line(start + offset, entry));
    }
    Ok(())
}

pub fn print_info(report: &InfoReport<'_>, as_json: bool) -> Result<(), CliError> {
    if as_json {
        return print_json(report);
    }

    println!("{:<10} {}", "Feed", report.locator);
    if let Some(title) = report.info.and_then(|i| i.title.as_deref()) {
        println!("{:<10} {}", "Title", title);
    }
    if let Some(updated) = report.info.and_then(|i| i.updated) {
        println!("{:<10} {}", "Updated", updated);
    }
    println!("{:<10} {}", "Results", report.count);
    println!("{:<10} {} ({})", "Cached", report.cached, report.state);
    if let Some(info) = report.info {
        for (name, link) in &info.links {
            println!("{:<10} {} -> {}", "Link", name, link.href);
        }
    }
    Ok(())
}

/// One line per entry: position, title and id when the entry has them.
fn summary_line(index: usize, entry: &Value) -> String {
    let title = text(entry, "title")
        .or_else(|| text(entry, "content"))
        .unwrap_or("(untitled)");
    match text(entry, "id") {
        Some(id) => format!("{index:>5}  {title}  [{id}]"),
        None => format!("{index:>5}  {title}"),
    }
}
