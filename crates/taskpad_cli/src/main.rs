//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskpad_core` linkage without the Flutter/FFI runtime.
//! - Optionally print the ordered task list of a device store file.
//!
//! Usage: `taskpad_cli [path/to/taskpad.sqlite3]`

use taskpad_core::{CoreConfig, SqliteKeyValueStore, TaskRepository, TaskService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("taskpad_core ping={}", taskpad_core::ping());
    println!("taskpad_core version={}", taskpad_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return Ok(());
    };

    let store = SqliteKeyValueStore::open(db_path.as_str())?;
    let repo = TaskRepository::open_store(store, &CoreConfig::default())?;
    let service = TaskService::new(repo);
    for row in service.list_for_display() {
        println!(
            "[{}] {} | {} | due {} | {}",
            if row.completed { "x" } else { " " },
            row.id,
            row.title,
            row.due_label,
            row.priority
        );
    }
    Ok(())
}
