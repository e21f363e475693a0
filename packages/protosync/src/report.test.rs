use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{Level, Report};

#[rstest]
#[case("trace", Level::Trace)]
#[case("debug", Level::Debug)]
#[case("info", Level::Info)]
#[case("warn", Level::Warn)]
#[case("warning", Level::Warn)]
#[case("error", Level::Error)]
fn test_parse_level(#[case] src: &str, #[case] expected: Level) {
    assert_eq!(src.parse::<Level>().unwrap(), expected);
}

#[rstest]
#[case("INFO")]
#[case("verbose")]
#[case("")]
fn test_parse_invalid_level(#[case] src: &str) {
    assert!(src.parse::<Level>().is_err());
}

#[test]
fn test_filters_by_level() {
    let (report, lines) = Report::buffered(Level::Info);

    report.trace("hidden");
    report.debug("hidden");
    report.info("shown");
    report.warn("shown too");
    report.error("and this");

    assert_eq!(*lines.lock().unwrap(), vec![
        "info: shown".to_string(),
        "warn: shown too".to_string(),
        "error: and this".to_string(),
    ]);
}

#[test]
fn test_sub_reports_share_the_sink() {
    let (report, lines) = Report::buffered(Level::Trace);

    let remote = report.sub("remote");
    let repository = remote.sub("github.com/org/repo");

    report.debug("root");
    remote.trace("child");
    repository.info("grandchild");

    assert_eq!(*lines.lock().unwrap(), vec![
        "debug: root".to_string(),
        "trace: remote: child".to_string(),
        "info: remote: github.com/org/repo: grandchild".to_string(),
    ]);
}
