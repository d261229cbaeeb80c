use assert_cmd::Command;
use tempfile::TempDir;

fn cli(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("BOOKSHELF_ENV")
        .env("BOOKSHELF_CONFIG_DIR", workdir.path().join("config"))
        .env("BOOKSHELF_TELEMETRY__LOG_DIR", workdir.path().join("logs"));
    cmd
}

#[test]
fn settings_reflect_environment_overrides() {
    let workdir = TempDir::new().unwrap();
    let output = cli(&workdir)
        .arg("settings")
        .env("BOOKSHELF_SERVER__PORT", "9123")
        .env("BOOKSHELF_DATABASE__BACKEND", "memory")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 9123);
    assert_eq!(settings["database"]["backend"], "memory");
    assert_eq!(settings["environment"], "local");
}

#[test]
fn seed_inserts_valid_entries_and_reports_rejects() {
    let workdir = TempDir::new().unwrap();
    let seed_file = workdir.path().join("books.json");
    std::fs::write(
        &seed_file,
        r#"[
            {"title": "Dummy Book 1", "description": "first", "authors": ["Ann"]},
            {"title": "Dummy Book 2", "description": "second", "authors": ["Bob", "Ann"]},
            {"title": "Broken", "description": "no authors", "authors": []},
            "not an object"
        ]"#,
    )
    .unwrap();

    let output = cli(&workdir)
        .arg("seed")
        .arg(&seed_file)
        .env("BOOKSHELF_DATABASE__PATH", workdir.path().join("data/books.redb"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("inserted 2 book(s), rejected 2"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("entry 2:"));
    assert!(stderr.contains("entry 3: not a JSON object"));
    assert!(workdir.path().join("data/books.redb").is_file());
    assert!(workdir.path().join("logs").is_dir());
}

#[test]
fn seed_fails_on_missing_file() {
    let workdir = TempDir::new().unwrap();
    cli(&workdir)
        .arg("seed")
        .arg(workdir.path().join("absent.json"))
        .env("BOOKSHELF_DATABASE__BACKEND", "memory")
        .assert()
        .failure();
}
