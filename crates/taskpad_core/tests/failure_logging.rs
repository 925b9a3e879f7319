use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use taskpad_core::{
    CoreConfig, MemoryKeyValueStore, Priority, RepoError, TaskDraft, TaskRepository,
};

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn failed_write_is_logged_at_error_once() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut repo =
        TaskRepository::open_store(MemoryKeyValueStore::new(), &CoreConfig::default()).unwrap();
    repo.storage_mut().store_mut().set_fail_writes(true);
    LOGGER.records.lock().unwrap().clear();

    let draft = TaskDraft::new(
        "pay rent",
        "before the 5th",
        "2025-01-05T00:00:00Z".parse().unwrap(),
        Priority::High,
    );
    assert!(matches!(repo.create(draft), Err(RepoError::Storage(_))));

    let records = LOGGER.records.lock().unwrap();
    let errors: Vec<&String> = records
        .iter()
        .filter(|(level, _)| *level == Level::Error)
        .map(|(_, message)| message)
        .collect();
    assert_eq!(errors.len(), 1, "error records: {errors:?}");
    assert!(errors[0].contains("event=storage_save"));
    assert!(errors[0].contains("error_code=storage_write_failed"));
}
