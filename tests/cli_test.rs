//! End-to-end tests driving parsed command lines through `execute_command`.
//!
//! Every test passes `--config` to a file inside its temp directory so the
//! user's global config is never read or written.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use pdf_bookmark::cli::{execute_command, Cli, CliError};
use pdf_bookmark::config::Settings;
use pdf_bookmark::exitcode;
use pdf_bookmark::util::testing::{self, add_outline_item, page_dest, sample_document};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("pdf-bookmark.toml");
        fs::write(&config, Settings::template()).unwrap();
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Result<(), CliError> {
        let config = self.config.to_string_lossy().into_owned();
        let mut argv = vec!["pdf-bookmark", "--config", config.as_str()];
        argv.extend_from_slice(args);
        execute_command(&Cli::parse_from(argv))
    }

    fn pdf_with_outline(&self, name: &str) -> PathBuf {
        let mut doc = sample_document(3);
        let dest = page_dest(&doc, 2);
        add_outline_item(&mut doc, "Last page", dest);
        let path = self.path(name);
        doc.save(&path).unwrap();
        path
    }
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================
// bookmark commands
// ============================================================

#[test]
fn given_pdf_with_outline_when_get_then_writes_sibling_text_file() {
    // Arrange
    let ws = Workspace::new();
    let pdf = ws.pdf_with_outline("report.pdf");

    // Act
    let result = ws.run(&["get", &arg(&pdf)]);

    // Assert
    assert!(result.is_ok(), "get failed: {result:?}");
    assert_eq!(
        fs::read_to_string(ws.path("report.txt")).unwrap(),
        "Last page 3\n"
    );
}

#[test]
fn given_text_with_negative_offset_when_set_then_writes_new_pdf() {
    // Arrange
    let ws = Workspace::new();
    let pdf = ws.path("scan.pdf");
    sample_document(4).save(&pdf).unwrap();
    let bookmark = ws.path("scan-toc.txt");
    fs::write(&bookmark, "Preface 3\nBody 5\n").unwrap();

    // Act
    let set = ws.run(&["set", &arg(&pdf), &arg(&bookmark), "-2"]);
    let get = ws.run(&["get", &arg(&ws.path("scan-new.pdf"))]);

    // Assert
    assert!(set.is_ok(), "set failed: {set:?}");
    assert!(get.is_ok(), "get failed: {get:?}");
    assert_eq!(
        fs::read_to_string(ws.path("scan-new.txt")).unwrap(),
        "Preface 1\nBody    3\n"
    );
}

#[test]
fn given_pdf_when_rm_then_source_keeps_its_outline() {
    let ws = Workspace::new();
    let pdf = ws.pdf_with_outline("keep.pdf");

    ws.run(&["rm", &arg(&pdf)]).expect("rm");

    assert!(ws.path("keep-new.pdf").exists());
    ws.run(&["get", &arg(&pdf)]).expect("source still has bookmarks");
}

#[test]
fn given_missing_pdf_when_get_then_noinput_exit_code() {
    let ws = Workspace::new();

    let err = ws.run(&["get", &arg(&ws.path("nope.pdf"))]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_pdf_without_outline_when_get_then_dataerr_exit_code() {
    let ws = Workspace::new();
    let pdf = ws.path("bare.pdf");
    sample_document(1).save(&pdf).unwrap();

    let err = ws.run(&["get", &arg(&pdf)]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(!ws.path("bare.txt").exists());
}

#[test]
fn given_no_subcommand_when_executing_then_usage_error() {
    let ws = Workspace::new();

    let err = ws.run(&[]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_source_as_bookmark_file_when_get_then_usage_exit_code() {
    let ws = Workspace::new();
    let pdf = ws.pdf_with_outline("same.pdf");

    let err = ws.run(&["get", &arg(&pdf), &arg(&pdf)]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

// ============================================================
// config commands
// ============================================================

#[test]
fn given_existing_config_when_init_without_force_then_usage_error() {
    let ws = Workspace::new();

    let err = ws.run(&["config", "init"]).unwrap_err();

    assert!(matches!(err, CliError::Usage(_)));
}

#[test]
fn given_existing_config_when_init_with_force_then_rewrites_template() {
    // Arrange
    let ws = Workspace::new();
    fs::write(&ws.config, "naming = \"timestamp\"\n").unwrap();

    // Act
    ws.run(&["config", "init", "--force"]).expect("init");

    // Assert
    assert_eq!(fs::read_to_string(&ws.config).unwrap(), Settings::template());
}

#[test]
fn given_invalid_config_when_running_bookmark_command_then_config_exit_code() {
    let ws = Workspace::new();
    fs::write(&ws.config, "max_outline_depth = 0\n").unwrap();
    let pdf = ws.pdf_with_outline("any.pdf");

    let err = ws.run(&["get", &arg(&pdf)]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_invalid_timestamp_format_when_running_bookmark_command_then_config_exit_code() {
    let ws = Workspace::new();
    fs::write(&ws.config, "naming = \"timestamp\"\ntimestamp_format = \"%Q\"\n").unwrap();
    let pdf = ws.pdf_with_outline("stamp.pdf");

    let err = ws.run(&["rm", &arg(&pdf)]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}
