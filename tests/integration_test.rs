use std::{collections::HashMap, fs};

use conlog::{builder, Level, LogFormat, KB};

#[test]
fn test_logger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/output.log");
    let logger = builder()
        .log_level(Level::Debug)
        .file_path(path.to_str().unwrap())
        .format(LogFormat::Json)
        .max_size(2 * KB)
        .rotation_count(5)
        .build();
    for i in 0..200 {
        logger.log_fields(Level::Info, "message", &[("no", i.into()), ("even", (i % 2 == 0).into())]);
    }
    logger.flush().unwrap();

    let mut names = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(
        names,
        vec!["output.log", "output.log.1", "output.log.2", "output.log.3", "output.log.4"]
    );

    // the newest record is the last line of the active file, and no record is split
    let content = fs::read_to_string(&path).unwrap();
    let mut last = None;
    for line in content.lines() {
        let record: HashMap<String, String> = serde_json::from_str(line).unwrap();
        assert_eq!(record["level"], "INFO");
        last = Some(record["message"].clone());
    }
    assert_eq!(last.unwrap(), "message no=199 even=false");
    for i in 1..5 {
        let rotated = fs::read_to_string(format!("{}.{}", path.display(), i)).unwrap();
        assert_eq!(rotated.len() as u64 <= 2 * KB, true);
        for line in rotated.lines() {
            assert_eq!(serde_json::from_str::<serde_json::Value>(line).is_ok(), true);
        }
    }
}

#[test]
fn test_combined_console_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("combined.log");
    let logger = builder()
        .file_path(path.to_str().unwrap())
        .console(true)
        .color(true)
        .build();
    logger.warning("to console and file");
    logger.debug("filtered");
    logger.flush().unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    // files never get color codes
    assert_eq!(content.contains('\x1b'), false);
    assert_eq!(content.ends_with("[WARNING] to console and file\n"), true);
}
