// The process-wide logger is shared state, so this file holds a single test
// that walks through its lifecycle in order.

use rotolog::config::LoggerConfig;
use rotolog::logger::{global, LogSink, Logger};
use std::fs;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Sink whose `sync` reports that it started, then blocks until released,
/// standing in for a writer still compressing a large backup.
struct StalledSyncSink {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl LogSink for StalledSyncSink {
    fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(())
    }
}

#[test]
fn test_global_logger_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    // Uninitialized: sync succeeds and creates nothing
    assert!(global::current().is_none());
    global::sync().unwrap();
    assert!(!temp_dir.path().join("logs").exists());

    // Concurrent first use builds exactly one logger
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                global::get_instance()
            })
        })
        .collect();
    let loggers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for logger in &loggers[1..] {
        assert!(Arc::ptr_eq(&loggers[0], logger));
    }
    let entries: Vec<_> = fs::read_dir(temp_dir.path().join("logs"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("myapp.log")]);

    // Macros and free functions go through the shared instance
    rotolog::info!("Processing item", item_id = 7, stage = "parse");
    rotolog::debug!("below the default level");
    global::warn("free function", &[]);
    global::sync().unwrap();

    let content = fs::read_to_string(temp_dir.path().join("logs").join("myapp.log")).unwrap();
    assert!(content.contains("\tINFO\ttests/global_logger_test.rs:"));
    assert!(content.contains("\tProcessing item\titem_id=7 stage=parse\n"));
    assert!(!content.contains("below the default level"));
    assert!(content.contains("\tWARN\t"));

    // Explicit init replaces the instance
    let custom = LoggerConfig {
        log_dir: temp_dir.path().join("custom"),
        log_file: "custom.log".to_string(),
        log_level: "debug".to_string(),
        ..LoggerConfig::default()
    };
    let replaced = global::init(Some(custom)).unwrap();
    assert!(!Arc::ptr_eq(&replaced, &loggers[0]));
    assert!(Arc::ptr_eq(&replaced, &global::get_instance()));

    rotolog::debug!("now visible");
    {
        let _guard = global::sync_on_drop();
    }
    let custom_content =
        fs::read_to_string(temp_dir.path().join("custom").join("custom.log")).unwrap();
    assert!(custom_content.contains("\tDEBUG\t"));
    assert!(custom_content.contains("now visible"));

    // A failed init leaves the current instance in place
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "file").unwrap();
    let broken = LoggerConfig {
        log_dir: blocker.join("logs"),
        ..LoggerConfig::default()
    };
    assert!(global::init(Some(broken)).is_err());
    assert!(Arc::ptr_eq(&replaced, &global::get_instance()));

    // Replacing a logger whose sync is slow does not hold up other callers
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let stalled = global::install(
        Logger::builder(StalledSyncSink {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })
        .build(),
    );

    let next = LoggerConfig {
        log_dir: temp_dir.path().join("next"),
        log_file: "next.log".to_string(),
        ..LoggerConfig::default()
    };
    let reinit = thread::spawn(move || global::init(Some(next)));
    entered_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("replaced logger was never synced");

    let (found_tx, found_rx) = mpsc::channel();
    thread::spawn(move || {
        let logger = global::get_instance();
        rotolog::info!("logged during replacement");
        let _ = found_tx.send(logger);
    });
    let during = found_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("get_instance blocked while the replaced logger was syncing");
    assert!(!Arc::ptr_eq(&during, &stalled));

    release_tx.send(()).unwrap();
    let installed = reinit.join().unwrap().unwrap();
    assert!(Arc::ptr_eq(&installed, &during));

    global::sync().unwrap();
    let next_content =
        fs::read_to_string(temp_dir.path().join("next").join("next.log")).unwrap();
    assert!(next_content.contains("logged during replacement"));
}
