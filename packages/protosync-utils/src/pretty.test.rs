use rstest::rstest;

use super::Unit;

#[rstest]
#[case(0.0, "0 B")]
#[case(1023.0, "1023 B")]
#[case(1024.0, "1.0 KiB")]
#[case(1536.0, "1.5 KiB")]
#[case(3.0 * 1024.0 * 1024.0, "3.0 MiB")]
fn test_bytes(#[case] value: f64, #[case] expected: &str) {
    assert_eq!(Unit::bytes(value).to_string(), expected);
}

#[test]
fn test_unknown_size() {
    assert_eq!(Unit::maybe_bytes(None), "? B");
    assert_eq!(Unit::maybe_bytes(Some(2048)), "2.0 KiB");
}
