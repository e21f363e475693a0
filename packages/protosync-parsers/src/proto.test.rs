use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{Error, Position};

use super::{parse, ImportModifier, Statement};

fn imports(src: &str) -> Vec<String> {
    parse(src).unwrap()
        .imports()
        .map(|(import, _)| import.to_string())
        .collect()
}

#[test]
fn test_parse_header() {
    let file = parse(indoc! {r#"
        syntax = "proto3";

        package foo.bar.v1;

        import "google/protobuf/timestamp.proto";
        import public "other/public.proto";
        import weak 'other/weak.proto';
    "#}).unwrap();

    let statements = file.entries.iter()
        .map(|entry| entry.statement.clone())
        .collect::<Vec<_>>();

    assert_eq!(statements, vec![
        Statement::Syntax("proto3".to_string()),
        Statement::Package("foo.bar.v1".to_string()),
        Statement::Import {path: "google/protobuf/timestamp.proto".to_string(), modifier: None},
        Statement::Import {path: "other/public.proto".to_string(), modifier: Some(ImportModifier::Public)},
        Statement::Import {path: "other/weak.proto".to_string(), modifier: Some(ImportModifier::Weak)},
    ]);

    assert_eq!(file.package(), Some("foo.bar.v1"));
}

#[test]
fn test_import_positions() {
    let file = parse(indoc! {r#"
        syntax = "proto3";
          import "a.proto";
    "#}).unwrap();

    let positions = file.imports()
        .map(|(_, position)| position)
        .collect::<Vec<_>>();

    assert_eq!(positions, vec![Position {line: 2, column: 3}]);
}

#[test]
fn test_skips_definitions() {
    let src = indoc! {r#"
        syntax = "proto3";

        import "a.proto";

        option go_package = "example.com/foo";

        message Foo {
            // import "commented.proto";
            string import = 1;
            message Nested {
                map<string, int32> values = 2;
            }
        }

        /* import "block.proto"; */

        service Bar {
            rpc Get(Foo) returns (Foo) {
                option (google.api.http) = { get: "/v1/foo" };
            }
        }

        import "b.proto";
    "#};

    assert_eq!(imports(src), vec!["a.proto", "b.proto"]);
}

#[rstest]
#[case(r#"import "a" "/b.proto";"#, "a/b.proto")]
#[case(r#"import "a\x2fb.proto";"#, "a/b.proto")]
#[case(r#"import "a\057b.proto";"#, "a/b.proto")]
#[case(r#"import 'it\'s.proto';"#, "it's.proto")]
fn test_import_literals(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(imports(src), vec![expected]);
}

#[test]
fn test_editions() {
    let file = parse(r#"edition = "2023"; import "a.proto";"#).unwrap();

    assert_eq!(file.entries[0].statement, Statement::Syntax("2023".to_string()));
    assert_eq!(imports(r#"edition = "2023"; import "a.proto";"#), vec!["a.proto"]);
}

#[test]
fn test_empty_statements() {
    assert_eq!(imports(r#";;import "a.proto";;"#), vec!["a.proto"]);
}

#[rstest]
#[case(r#"import "a.proto""#, Error::Expected(Position {line: 1, column: 17}, "';'".to_string()))]
#[case(r#"import a.proto;"#, Error::Expected(Position {line: 1, column: 8}, "a string literal".to_string()))]
#[case(r#"package ;"#, Error::Expected(Position {line: 1, column: 9}, "a package name".to_string()))]
#[case("import \"a.proto\n\";", Error::UnterminatedString(Position {line: 1, column: 8}))]
#[case("/* never closed", Error::UnterminatedComment(Position {line: 1, column: 1}))]
#[case("message Foo {\n  string a = 1;\n", Error::UnbalancedBraces(Position {line: 1, column: 1}))]
#[case(r#"import "\q.proto";"#, Error::InvalidEscape(Position {line: 1, column: 9}))]
fn test_errors(#[case] src: &str, #[case] expected: Error) {
    assert_eq!(parse(src), Err(expected));
}

#[test]
fn test_error_message_has_position() {
    let error = parse("syntax = \"proto3\";\nimport foo;").unwrap_err();

    assert_eq!(error.to_string(), "2:8: expected a string literal");
}
