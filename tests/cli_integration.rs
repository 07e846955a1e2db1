//! Testes de integração da CLI do fmtd.

use assert_cmd::Command;
use predicates::prelude::*;

fn fmtd() -> Command {
    Command::cargo_bin("fmtd").unwrap()
}

#[test]
fn test_help_lists_commands() {
    fmtd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("format"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_command() {
    fmtd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_status_reports_empty_cache() {
    fmtd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("no instances cached"));
}

#[test]
fn test_format_without_config_returns_input_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = "const x=1;;;\n";

    // Projeto sem arquivo de configuração: formatação não foi pedida,
    // o texto volta intacto mesmo com flags na requisição
    fmtd()
        .arg("format")
        .arg("--project-dir")
        .arg(dir.path())
        .arg("--")
        .arg("--stdin")
        .args(["--stdin-filepath", "app.js"])
        .args(["--print-width", "120"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::eq(input));
}

#[test]
fn test_format_with_config_and_missing_engine_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".xyzfmtrc"), r#"{"semi": false}"#).unwrap();

    let config_path = dir.path().join("fmtd.toml");
    std::fs::write(
        &config_path,
        "[engine]\ncommand = \"xyzfmt\"\n",
    )
    .unwrap();

    // Com configuração presente, a requisição chega ao engine; um engine
    // inexistente é uma requisição falhada, nunca um no-op silencioso
    fmtd()
        .arg("--config")
        .arg(&config_path)
        .arg("format")
        .arg("--project-dir")
        .arg(dir.path())
        .arg("--")
        .arg("--stdin")
        .args(["--stdin-filepath", "app.js"])
        .write_stdin("const x=1\n")
        .assert()
        .failure();
}

#[test]
fn test_init_writes_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("fmtd.toml");

    fmtd()
        .arg("init")
        .arg("--path")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("capacity = 10"));
    assert!(content.contains("command = \"prettier\""));
}
