use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{CompressionAlgorithm, Entry, Error};

use super::{craft_zip, ZipArchive};

fn sample_entries() -> Vec<Entry<'static>> {
    vec![
        Entry::new("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        Entry::new("com/acme/v1/user.proto", b"syntax = \"proto3\";\npackage com.acme.v1;\n".to_vec()),
        Entry::new("google/type/date.proto", b"syntax = \"proto3\";\n".to_vec()),
    ]
}

#[rstest]
#[case(CompressionAlgorithm::Stored)]
#[case(CompressionAlgorithm::Deflate(6))]
fn test_read_entries(#[case] compression: CompressionAlgorithm) {
    let buffer = craft_zip(&sample_entries(), compression).unwrap();
    let archive = ZipArchive::new(buffer).unwrap();

    assert_eq!(archive.len(), 3);

    let entry = archive.read("com/acme/v1/user.proto").unwrap().unwrap();
    assert_eq!(entry.data.as_ref(), b"syntax = \"proto3\";\npackage com.acme.v1;\n");
    assert_eq!(entry.mode, 0o644);
}

#[test]
fn test_names_are_sorted() {
    let buffer = craft_zip(&sample_entries(), CompressionAlgorithm::Stored).unwrap();
    let archive = ZipArchive::new(buffer).unwrap();

    assert_eq!(archive.names().collect::<Vec<_>>(), vec![
        "META-INF/MANIFEST.MF",
        "com/acme/v1/user.proto",
        "google/type/date.proto",
    ]);
}

#[rstest]
#[case("com/acme/v1/User.proto")]
#[case("/com/acme/v1/user.proto")]
#[case("com/acme/v1")]
#[case("missing.proto")]
fn test_lookup_is_exact(#[case] name: &str) {
    let buffer = craft_zip(&sample_entries(), CompressionAlgorithm::Stored).unwrap();
    let archive = ZipArchive::new(buffer).unwrap();

    assert!(archive.read(name).unwrap().is_none());
}

#[test]
fn test_trailing_comment_is_skipped() {
    let mut buffer = craft_zip(&sample_entries(), CompressionAlgorithm::Stored).unwrap();

    let comment = b"built by a test";
    let comment_length_offset = buffer.len() - 2;
    buffer[comment_length_offset..].copy_from_slice(&(comment.len() as u16).to_le_bytes());
    buffer.extend_from_slice(comment);

    let archive = ZipArchive::new(buffer).unwrap();
    assert!(archive.read("google/type/date.proto").unwrap().is_some());
}

#[test]
fn test_corrupted_entry() {
    let entries = vec![Entry::new("a.proto", b"syntax = \"proto3\";".to_vec())];
    let mut buffer = craft_zip(&entries, CompressionAlgorithm::Stored).unwrap();

    // Flip a byte of the stored data, right after the local header and name
    let data_offset = 30 + "a.proto".len();
    buffer[data_offset] ^= 0xff;

    let archive = ZipArchive::new(buffer).unwrap();
    assert!(matches!(archive.read("a.proto"), Err(Error::ChecksumMismatch(name)) if name == "a.proto"));
}

#[rstest]
#[case(b"".to_vec())]
#[case(b"definitely not a zip file, just some bytes that are long enough".to_vec())]
fn test_invalid_archive(#[case] buffer: Vec<u8>) {
    assert!(matches!(ZipArchive::new(buffer), Err(Error::InvalidZipFile(_))));
}
