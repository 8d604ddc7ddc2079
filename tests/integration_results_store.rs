use std::time::{Duration, Instant};

use keyrush::{
    store::{submit_result, CsvResultLog, ResultSink, ResultsDb, SinkSet},
    word_generator::FixedText,
    Error, Keystroke, ResultRecord, Step, TestConfig, TestEngine, TestResult,
};
use tempfile::tempdir;

fn finished_words_test() -> TestResult {
    let mut engine = TestEngine::with_source(
        TestConfig::words(10).unwrap(),
        Box::new(FixedText::new(["a b c d e f g h i j"])),
    );
    let t0 = Instant::now();
    let mut done = None;
    for (i, c) in "a b c d x f g h i j".chars().enumerate() {
        let at = t0 + Duration::from_millis(300 * i as u64);
        if let Step::Completed(r) = engine.handle_keystroke(Keystroke::Char(c), at) {
            done = Some(r);
        }
    }
    done.expect("ten words complete the test")
}

struct Unreachable;

impl ResultSink for Unreachable {
    fn submit(&mut self, _record: &ResultRecord) -> keyrush::Result<()> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store offline",
        )))
    }
}

#[test]
fn completed_result_lands_in_db_and_csv() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("results.db");
    let csv_path = dir.path().join("results.csv");

    let mut sinks = SinkSet::new();
    sinks.push(Box::new(ResultsDb::open(&db_path).unwrap()));
    sinks.push(Box::new(CsvResultLog::with_path(&csv_path)));

    let result = finished_words_test();
    assert!(submit_result(&mut sinks, &result).is_none());

    let stored = ResultsDb::open(&db_path).unwrap().recent(10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].mode, "words");
    assert_eq!(stored[0].errors, 1);
    assert_eq!(stored[0].characters, 19);
    assert_eq!(stored[0].wpm, result.wpm);
    assert_eq!(stored[0].accuracy, 95);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn persistence_failure_leaves_result_intact() {
    let result = finished_words_test();
    let before = result.clone();

    let notice = submit_result(&mut Unreachable, &result);

    assert!(notice.unwrap().contains("store offline"));
    assert_eq!(result, before);
}
