//! End-to-end tests for the `fawm-config` compiler binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use fawm_core::blob::{self, MenuItemView};
use fawm_core::menu::{Config, Menu, MenuItem};
use pretty_assertions::assert_eq;

const SAMPLE: &str = r#"# fawm launcher
menu
  exec "Firefox" "firefox"
  exec "Terminal" "xterm -e \"top\""

  reload
  exit
end
"#;

fn compiler() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fawm-config"))
}

fn compile_file(path: &Path) -> Output {
    compiler().arg(path).output().unwrap()
}

fn compile_source(source: &str) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fawm.conf");
    fs::write(&path, source).unwrap();
    compile_file(&path)
}

#[test]
fn test_sample_compiles_to_readable_blob() {
    let output = compile_source(SAMPLE);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stderr.is_empty());

    let menu = blob::read_blob(&mut output.stdout.as_slice()).unwrap();
    assert_eq!(
        menu.to_config(),
        Config {
            menu: Some(Menu {
                items: vec![
                    MenuItem::exec("Firefox", "firefox"),
                    MenuItem::exec("Terminal", "xterm -e \"top\""),
                    MenuItem::Reload,
                    MenuItem::Exit,
                ],
            }),
        }
    );
    assert!(matches!(
        menu.item(1),
        Some(MenuItemView::Exec { command: "xterm -e \"top\"", .. })
    ));
}

#[test]
fn test_output_is_length_prefixed() {
    let output = compile_source(SAMPLE);
    let (prefix, rest) = output.stdout.split_at(8);
    let declared = u64::from_le_bytes(prefix.try_into().unwrap());
    assert_eq!(declared as usize, rest.len());
    assert_eq!(rest.len() % 8, 0);
}

#[test]
fn test_empty_file_compiles_to_no_menu() {
    let output = compile_source("");
    assert!(output.status.success());
    let menu = blob::read_blob(&mut output.stdout.as_slice()).unwrap();
    assert!(menu.menu().is_none());
    assert_eq!(menu.item_count(), 0);
}

#[test]
fn test_lexical_error_aborts_without_output() {
    let output = compile_source("menu\n  exec \"unterminated\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
}

#[test]
fn test_syntax_error_aborts_without_output() {
    let output = compile_source("menu\n  exec \"only caption\"\nend\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = compile_file(&dir.path().join("absent.conf"));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Cannot open configuration file: "), "{stderr}");
    assert!(stderr.contains("absent.conf"), "{stderr}");
}

#[test]
fn test_usage_without_arguments() {
    let output = compiler().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Usage: "), "{stderr}");
    assert!(stderr.contains("<config_file>"), "{stderr}");
}

#[test]
fn test_usage_with_extra_arguments() {
    let output = compiler().args(["a.conf", "b.conf"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
