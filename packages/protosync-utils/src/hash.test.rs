use super::Sha256;

#[test]
fn test_from_values_is_stable() {
    let a = Sha256::from_values(&["https://github.com/acme/protos.git", "master"]);
    let b = Sha256::from_values(&["https://github.com/acme/protos.git", "master"]);

    assert_eq!(a, b);
    assert_eq!(a.to_hex().len(), 64);
}

#[test]
fn test_from_values_separates_fields() {
    let a = Sha256::from_values(&["ab", "c"]);
    let b = Sha256::from_values(&["a", "bc"]);

    assert_ne!(a, b);
}

#[test]
fn test_from_data_known_digest() {
    assert_eq!(
        Sha256::from_data("").to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    );
}
