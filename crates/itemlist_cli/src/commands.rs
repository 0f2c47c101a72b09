//! Subcommand handlers.
//!
//! Handlers talk to the controller only through `RecordController`, so
//! every backend behaves the same from here.

use crate::cli::Commands;
use chrono::Local;
use itemlist_core::{
    core_version, ControllerError, Record, RecordController, RecordDraft, RecordId,
};
use std::io::{self, BufRead, Write};

pub fn run(command: Commands, store: &mut dyn RecordController) -> Result<(), String> {
    match command {
        Commands::List { query } => {
            list(store, query.as_deref().unwrap_or_default());
            Ok(())
        }
        Commands::Add { title, description } => {
            let record = store
                .create(&title, description.as_deref())
                .map_err(describe)?;
            println!("Added {}", record.id);
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            description,
            clear_description,
        } => edit(store, &id, title, description, clear_description),
        Commands::Delete { id, yes } => {
            let id = resolve(store, &id)?;
            if !yes && !confirm(&format!("Delete item {id}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            if store.delete(&id).map_err(describe)? {
                println!("Deleted {id}");
            } else {
                println!("No item with id {id}");
            }
            Ok(())
        }
        Commands::Clear { yes } => {
            if store.is_empty() {
                println!("No items.");
                return Ok(());
            }
            if !yes && !confirm(&format!("Delete all {} items?", store.len()))? {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = store.clear_all().map_err(describe)?;
            println!("Deleted {removed} items");
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

pub fn print_version() {
    println!("itemlist {}", core_version());
}

fn list(store: &dyn RecordController, query: &str) {
    for line in list_lines(store, query) {
        println!("{line}");
    }
}

/// Output of `list`: a count header, then the matches or an empty notice.
fn list_lines(store: &dyn RecordController, query: &str) -> Vec<String> {
    let mut lines = vec![format!("Items ({})", store.len())];
    let hits = store.filter(query);
    if hits.is_empty() {
        let notice = if store.is_empty() {
            "No items."
        } else {
            "No items match the search."
        };
        lines.push(notice.to_string());
        return lines;
    }
    for record in hits {
        lines.extend(record_lines(record));
    }
    lines
}

fn record_lines(record: &Record) -> Vec<String> {
    let created = record.created_at.with_timezone(&Local);
    let mut lines = vec![format!(
        "{}  {}  [{}]",
        record.id,
        record.title,
        created.format("%Y-%m-%d %H:%M:%S")
    )];
    if let Some(description) = record.description.as_deref() {
        lines.push(format!("    {description}"));
    }
    lines
}

/// Merges edit flags over the record's current values.
fn edited_values(
    current: RecordDraft,
    title: Option<String>,
    description: Option<String>,
    clear_description: bool,
) -> (String, Option<String>) {
    let title = title.unwrap_or(current.title);
    let description = if clear_description {
        None
    } else {
        description.or(current.description)
    };
    (title, description)
}

fn edit(
    store: &mut dyn RecordController,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    clear_description: bool,
) -> Result<(), String> {
    let id = resolve(store, id)?;
    let current = store.begin_edit(&id).map_err(describe)?;

    let (title, description) = edited_values(current, title, description, clear_description);

    match store.submit(&title, description.as_deref()) {
        Ok(record) => {
            println!("Updated {}", record.id);
            Ok(())
        }
        Err(err) => {
            store.cancel_edit();
            Err(describe(err))
        }
    }
}

fn resolve(store: &dyn RecordController, text: &str) -> Result<RecordId, String> {
    store
        .resolve_id(text)
        .ok_or_else(|| format!("no item with id `{}`", text.trim()))
}

fn describe(err: ControllerError) -> String {
    match err {
        ControllerError::Validation(_) => "title is required".to_string(),
        other => other.to_string(),
    }
}

fn confirm(prompt: &str) -> Result<bool, String> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt} [y/N] ").map_err(|err| err.to_string())?;
    stdout.flush().map_err(|err| err.to_string())?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| err.to_string())?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
