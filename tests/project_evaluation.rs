//! End-to-end evaluation of project files on disk

mod common;

use common::{Fixture, values};
use pretty_assertions::assert_eq;
use proeval::{DiagnosticCode, LoadFlags, Project};
use rstest::rstest;

#[test]
fn variables_and_messages() {
    let fixture = Fixture::new();
    let file = fixture.write("app.pro", "X = a b c\nmessage($$X)\n");
    let mut project = fixture.project();

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    assert_eq!(values(&project, "X"), vec!["a", "b", "c"]);
    assert!(project.dump_lines().contains(&"X = a b c".to_string()));
    assert_eq!(fixture.messages(), vec!["a b c".to_string()]);
    assert!(!fixture.sink.has_errors());
}

#[test]
fn read_sets_project_location_variables() {
    let fixture = Fixture::new();
    let file = fixture.write("sub/app.pro", "HERE = $$PWD\nME = $$_FILE_\n");
    let mut project = fixture.project();

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    let dir = fixture.path("sub").to_string_lossy().into_owned();
    assert_eq!(project.project_file(), file);
    assert_eq!(project.project_dir(), dir);
    assert_eq!(values(&project, "_PRO_FILE_"), vec![file.clone()]);
    assert_eq!(values(&project, "_PRO_FILE_PWD_"), vec![dir.clone()]);
    assert_eq!(values(&project, "OUT_PWD"), vec![fixture.root()]);
    assert_eq!(values(&project, "HERE"), vec![dir]);
    assert_eq!(values(&project, "ME"), vec![file]);
}

#[test]
fn relative_project_path_resolves_against_working_directory() {
    let fixture = Fixture::new();
    fixture.write("rel.pro", "OK = yes\n");
    let mut project = fixture.project();

    assert_eq!(project.read("rel.pro", LoadFlags::ALL), Ok(true));
    assert_eq!(project.project_file(), "rel.pro");
    assert_eq!(project.project_dir(), fixture.root());
    assert_eq!(values(&project, "OK"), vec!["yes"]);
}

#[test]
fn project_from_standard_input_uses_working_directory() {
    let fixture = Fixture::new();
    fixture.write("common.pri", "SHARED = yes\n");
    let mut project = fixture.project();

    let source = "include(common.pri)\nHERE = $$PWD\nME = $$_FILE_\nEXISTS = no\nexists(common.pri): EXISTS = yes\n";
    assert_eq!(project.read_source(source, LoadFlags::ALL), Ok(true));
    assert_eq!(project.project_file(), "-");
    assert_eq!(project.project_dir(), fixture.root());
    assert_eq!(values(&project, "_PRO_FILE_"), vec!["(stdin)"]);
    assert_eq!(values(&project, "_PRO_FILE_PWD_"), vec![fixture.root()]);
    assert_eq!(values(&project, "HERE"), vec![fixture.root()]);
    assert_eq!(values(&project, "ME"), vec!["(stdin)"]);
    assert_eq!(values(&project, "SHARED"), vec!["yes"]);
    assert_eq!(values(&project, "EXISTS"), vec!["yes"]);
    assert_eq!(project.test_condition("exists(common.pri)", "(command line)", 1), Ok(true));
    assert!(!fixture.sink.has_errors());
}

#[test]
fn missing_project_is_not_fatal() {
    let fixture = Fixture::new();
    let mut project = fixture.project();

    assert_eq!(project.read("does-not-exist.pro", LoadFlags::ALL), Ok(false));
    assert!(
        fixture
            .sink
            .diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::FileAccess)
    );
}

#[test]
fn includes_resolve_relative_to_the_including_file() {
    let fixture = Fixture::new();
    fixture.write(
        "sub/part.pri",
        "PART_DIR = $$PWD\nSOURCES += part.cpp\n",
    );
    let file = fixture.write(
        "main.pro",
        r#"
SOURCES = main.cpp
include(sub/part.pri)
!include(missing.pri, , true): NO_MISSING = yes
include(sub/part.pri, NS)
"#,
    );
    let mut project = fixture.project();

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    let part = fixture.path("sub/part.pri").to_string_lossy().into_owned();
    assert_eq!(values(&project, "SOURCES"), vec!["main.cpp", "part.cpp"]);
    assert_eq!(
        values(&project, "PART_DIR"),
        vec![fixture.path("sub").to_string_lossy().into_owned()]
    );
    assert_eq!(values(&project, "NO_MISSING"), vec!["yes"]);
    assert_eq!(values(&project, "NS.SOURCES"), vec!["part.cpp"]);

    let included = values(&project, ".QMAKE_INTERNAL_INCLUDED_FILES");
    assert_eq!(included, vec![file, part]);
    assert!(fixture.sink.diagnostics().is_empty());
    assert!(!project.dump_lines().iter().any(|l| l.starts_with(".QMAKE_INTERNAL")));
}

#[test]
fn spec_features_and_command_line_assignments() {
    let fixture = Fixture::new();
    fixture.write("mkspecs/linux-gcc/qmake.conf", "QMAKE_CC = gcc\n");
    fixture.write("features/default_pre.prf", "DEFAULT_PRE = yes\n");
    fixture.write("features/default_post.prf", "DEFAULT_POST = yes\n");
    fixture.write(
        "features/myfeature.prf",
        "FEATURE_LOADED = yes\nFEATURE_SAW_POST = $$POST_SET\nCONFIG += chained\n",
    );
    fixture.write("features/chained.prf", "CHAINED = yes\n");
    let file = fixture.write(
        "app.pro",
        r#"
SEEN_PRE = $$PRE_SET
SEEN_SPEC = $$QMAKE_CC
SEEN_DEFAULT_PRE = $$DEFAULT_PRE
linux-*: SPEC_MATCH = yes
extra_cfg: HAS_EXTRA = yes
PREFIX = $$[QT_INSTALL_PREFIX]
CONFIG += myfeature
"#,
    );
    let config = fixture
        .config()
        .with_spec_dir(fixture.path("mkspecs/linux-gcc").to_string_lossy())
        .with_feature_root(fixture.path("features").to_string_lossy())
        .with_extra_var("PRE_SET = from_command_line")
        .with_post_var("POST_SET = after")
        .with_config("extra_cfg")
        .with_property("QT_INSTALL_PREFIX", "/opt/qt");
    let mut project = fixture.project_with(config);

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    assert_eq!(values(&project, "SEEN_PRE"), vec!["from_command_line"]);
    assert_eq!(values(&project, "SEEN_SPEC"), vec!["gcc"]);
    assert_eq!(values(&project, "SEEN_DEFAULT_PRE"), vec!["yes"]);
    assert_eq!(values(&project, "SPEC_MATCH"), vec!["yes"]);
    assert_eq!(values(&project, "HAS_EXTRA"), vec!["yes"]);
    assert_eq!(values(&project, "PREFIX"), vec!["/opt/qt"]);
    assert_eq!(values(&project, "POST_SET"), vec!["after"]);
    assert_eq!(values(&project, "DEFAULT_POST"), vec!["yes"]);
    assert_eq!(values(&project, "FEATURE_LOADED"), vec!["yes"]);
    assert_eq!(values(&project, "FEATURE_SAW_POST"), vec!["after"]);
    assert_eq!(values(&project, "CHAINED"), vec!["yes"]);
    assert_eq!(project.property_value("QT_INSTALL_PREFIX/get"), Some("/opt/qt".to_string()));
}

#[test]
fn pro_only_skips_spec_and_features() {
    let fixture = Fixture::new();
    fixture.write("features/default_pre.prf", "DEFAULT_PRE = yes\n");
    fixture.write("features/myfeature.prf", "FEATURE_LOADED = yes\n");
    let file = fixture.write("app.pro", "CONFIG += myfeature\n");
    let config = fixture
        .config()
        .with_spec_dir(fixture.path("no-such-spec").to_string_lossy())
        .with_feature_root(fixture.path("features").to_string_lossy());
    let mut project = fixture.project_with(config);

    assert_eq!(project.read(&file, LoadFlags::PRO_ONLY), Ok(true));
    assert!(!project.is_set("DEFAULT_PRE"));
    assert!(!project.is_set("FEATURE_LOADED"));
}

#[test]
fn error_in_default_pre_is_fatal() {
    let fixture = Fixture::new();
    let pre = fixture.write("features/default_pre.prf", "error(pre broken)\n");
    let file = fixture.write("app.pro", "X = 1\n");
    let config = fixture
        .config()
        .with_feature_root(fixture.path("features").to_string_lossy());
    let mut project = fixture.project_with(config);

    let err = project.read(&file, LoadFlags::ALL).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("pre broken"));
    assert_eq!(err.location().map(|l| l.file.to_string()), Some(pre));
    assert!(!project.is_set("X"));
}

#[test]
fn missing_spec_is_fatal() {
    let fixture = Fixture::new();
    let file = fixture.write("app.pro", "A = 1\n");
    let config = fixture.config().with_spec_dir(fixture.path("nowhere").to_string_lossy());
    let mut project = fixture.project_with(config);

    let err = project.read(&file, LoadFlags::ALL).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(!project.is_set("A"));
}

#[rstest]
#[case(None, "debug")]
#[case(Some("release"), "release")]
fn scopes_and_else(#[case] extra_config: Option<&str>, #[case] expected: &str) {
    let fixture = Fixture::new();
    let file = fixture.write(
        "modes.pro",
        r#"
contains(CONFIG, release) {
    MODE = release
} else {
    MODE = debug
}
"#,
    );
    let mut config = fixture.config();
    if let Some(value) = extra_config {
        config = config.with_config(value);
    }
    let mut project = fixture.project_with(config);

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    assert_eq!(values(&project, "MODE"), vec![expected]);
}

#[test]
fn error_call_is_fatal() {
    let fixture = Fixture::new();
    let file = fixture.write("err.pro", "A = 1\nerror(stop here)\nB = 2\n");
    let mut project = fixture.project();

    let err = project.read(&file, LoadFlags::ALL).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert_eq!(err.location().map(|l| l.line), Some(2));
    assert_eq!(values(&project, "A"), vec!["1"]);
    assert!(!project.is_set("B"));
}

#[test]
fn parse_errors() {
    let fixture = Fixture::new();
    fixture.write("broken.pri", "X = \"unterminated\n");
    let file = fixture.write(
        "app.pro",
        "!include(broken.pri): INCLUDE_FAILED = yes\nAFTER = yes\n",
    );
    let mut project = fixture.project();
    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    assert_eq!(values(&project, "INCLUDE_FAILED"), vec!["yes"]);
    assert_eq!(values(&project, "AFTER"), vec!["yes"]);
    assert!(
        fixture
            .sink
            .diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::ParseError)
    );

    let broken = fixture.write("broken.pro", "A = 1\n}\n");
    let mut project = fixture.project();
    assert!(project.read(&broken, LoadFlags::ALL).is_err());
}

#[test]
fn conditions_and_expressions_after_read() {
    let fixture = Fixture::new();
    let file = fixture.write("app.pro", "SOURCES = a.cpp b.cpp\nNAME = demo\n");
    let mut project = fixture.project();
    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));

    assert_eq!(project.test_condition("contains(SOURCES, b.cpp)", "cond", 1), Ok(true));
    assert_eq!(project.test_condition("!isEmpty(NAME):count(SOURCES, 3)", "cond", 1), Ok(false));
    assert_eq!(project.test_condition("equals(", "cond", 1), Ok(false));
    assert_eq!(project.expand("$$upper($$NAME)-$$size(SOURCES)", "expr", 1), "DEMO-2");
    assert_eq!(project.expand("$$SOURCES", "expr", 1), "a.cpp");
    assert_eq!(project.first("SOURCES"), "a.cpp");
}

#[test]
fn eval_and_generated_files() {
    let fixture = Fixture::new();
    let file = fixture.write(
        "gen.pro",
        r#"
eval(EVALED = 1 2)
COPY = $$eval(EVALED)
LINES = first second
write_file($$OUT_PWD/out/generated.txt, LINES)
READ_BACK = $$cat($$OUT_PWD/out/generated.txt, lines)
exists($$OUT_PWD/out/generated.txt): GENERATED = yes
FOUND = $$files(out/*.txt)
"#,
    );
    fixture.write("out/.keep", "");
    let mut project = fixture.project();

    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));
    assert_eq!(values(&project, "EVALED"), vec!["1", "2"]);
    assert_eq!(values(&project, "COPY"), vec!["1", "2"]);
    assert_eq!(values(&project, "READ_BACK"), vec!["first", "second"]);
    assert_eq!(values(&project, "GENERATED"), vec!["yes"]);
    assert_eq!(values(&project, "FOUND"), vec!["out/generated.txt"]);
}

#[test]
fn init_from_copies_state() {
    let fixture = Fixture::new();
    let file = fixture.write(
        "parent.pro",
        "SHARED = yes\ndefineTest(fromParent) {\n    return(true)\n}\n",
    );
    let mut parent = fixture.project();
    assert_eq!(parent.read(&file, LoadFlags::ALL), Ok(true));

    let mut child = Project::init_from(&parent);
    assert_eq!(values(&child, "SHARED"), vec!["yes"]);
    assert_eq!(child.test("fromParent", &[]), Ok(true));

    *child.values("SHARED") = proeval::ProStringList::single("changed");
    assert_eq!(values(&parent, "SHARED"), vec!["yes"]);
}

#[test]
fn dump_json_matches_variables() {
    let fixture = Fixture::new();
    let file = fixture.write("app.pro", "TARGET = demo\nQT += core gui\n");
    let mut project = fixture.project();
    assert_eq!(project.read(&file, LoadFlags::ALL), Ok(true));

    let json = project.dump_json();
    assert_eq!(json["TARGET"], serde_json::json!(["demo"]));
    assert_eq!(json["QT"], serde_json::json!(["core", "gui"]));
    assert!(json.get(".QMAKE_INTERNAL_INCLUDED_FILES").is_none());
}
