use std::{collections::HashMap, sync::Arc, thread};

use appframe::{
    config::{LoggingConfig, SinkKind},
    logging::{Logger, MemorySink, Severity},
};
use tempfile::tempdir;

const THREADS: usize = 8;
const MESSAGES: usize = 200;

#[test]
fn concurrent_writers_produce_complete_ordered_lines() {
    let sink = MemorySink::new();
    let logger = Arc::new(Logger::new(Box::new(sink.clone())));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                logger.register_thread_label(format!("worker-{t}"));
                for m in 0..MESSAGES {
                    assert!(logger.info(&format!("payload t={t} m={m} end")).is_success());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), THREADS * MESSAGES);

    let mut next_expected: HashMap<usize, usize> = HashMap::new();
    for (index, line) in lines.iter().enumerate() {
        assert!(line.starts_with(&format!("{:06} ", index + 1)), "bad sequence: {line}");
        assert!(line.ends_with(" end"), "torn line: {line}");

        let payload = line.split("payload ").nth(1).expect("payload missing");
        let mut parts = payload.split_whitespace();
        let t: usize = parts.next().unwrap()[2..].parse().unwrap();
        let m: usize = parts.next().unwrap()[2..].parse().unwrap();

        assert!(line.contains(&format!("[worker-{t}]")));
        let expected = next_expected.entry(t).or_insert(0);
        assert_eq!(m, *expected, "thread {t} out of order");
        *expected += 1;
    }
    assert!(next_expected.values().all(|&count| count == MESSAGES));
}

#[test]
fn file_logger_flushes_on_close() {
    let temp = tempdir().expect("failed to create tempdir");
    let config = LoggingConfig {
        sink: SinkKind::File,
        path: temp.path().join("logs/app.log"),
        min_severity: Severity::Warning,
        ..LoggingConfig::default()
    };

    let logger = Logger::from_config(&config).into_value();
    let _ = logger.info("filtered out");
    let _ = logger.warning("disk almost full");
    let _ = logger.critical("disk full");
    assert!(logger.close().is_success());

    let content = std::fs::read_to_string(temp.path().join("logs/app.log")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("WARNING") && lines[0].contains("disk almost full"));
    assert!(lines[1].contains("CRITICAL") && lines[1].contains("disk full"));
}

#[test]
fn min_severity_can_change_while_threads_log() {
    let sink = MemorySink::new();
    let logger = Arc::new(Logger::new(Box::new(sink.clone())).with_min_severity(Severity::Error));

    let writer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            for _ in 0..50 {
                let _ = logger.debug("debug noise");
                let _ = logger.error("error signal");
            }
        })
    };
    writer.join().unwrap();
    logger.set_min_severity(Severity::Debug);
    let _ = logger.debug("now visible");

    assert!(sink.matching("debug noise").is_empty());
    assert_eq!(sink.matching("error signal").len(), 50);
    assert_eq!(sink.matching("now visible").len(), 1);
}
