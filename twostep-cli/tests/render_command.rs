use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn twostep_cmd(app: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("twostep"));
    cmd.current_dir(app).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write");
}

/// Application with a `greet` module and the default layout.
fn app() -> TempDir {
    let tmp = TempDir::new().expect("app dir");
    write(
        &tmp.path().join("modules/greet/templates/helloSuccess.html"),
        "Hi {{ name }}",
    );
    write(
        &tmp.path().join("templates/layout.html"),
        "<body>{{ sf_content }}</body>",
    );
    tmp
}

#[test]
fn render_decorates_module_output() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--set", "name=Ann"])
        .assert()
        .success()
        .stdout("<body>Hi Ann</body>");
}

#[test]
fn render_without_layout_prints_module_output() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--set", "name=Ann", "--no-layout"])
        .assert()
        .success()
        .stdout("Hi Ann");
}

#[test]
fn render_escapes_set_values() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--set", "name=<b>", "--no-layout"])
        .assert()
        .success()
        .stdout("Hi &lt;b&gt;");
}

#[test]
fn render_uses_config_file_and_custom_templates() {
    let app = app();
    write(&app.path().join("modules/greet/templates/hello.tpl"), "{{ n + 1 }}");
    write(&app.path().join("templates/wrap.tpl"), "[{{ sf_content }}]");
    write(&app.path().join("twostep.yaml"), "escaping_strategy: false\n");

    twostep_cmd(app.path())
        .args([
            "render", "greet", "hello", "--template", "hello.tpl", "--layout", "wrap.tpl", "--set", "n=41",
        ])
        .assert()
        .success()
        .stdout("[42]");
}

#[test]
fn render_writes_output_file() {
    let app = app();
    let out = app.path().join("out.html");
    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--set", "name=Ann", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(fs::read_to_string(out).unwrap(), "<body>Hi Ann</body>");
}

#[test]
fn render_fails_for_missing_template() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "greet", "bye"])
        .assert()
        .failure()
        .stderr(contains("byeSuccess.html"));
}

#[test]
fn render_fails_for_unknown_module() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "shop", "index"])
        .assert()
        .failure()
        .stderr(contains("failed to initialize view for shop/index"));
}

#[test]
fn layout_and_no_layout_conflict() {
    let app = app();
    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--layout", "x", "--no-layout"])
        .assert()
        .failure();
}

#[test]
fn extensions_lists_registered_and_skipped_helpers() {
    let app = app();
    write(&app.path().join("twostep.yaml"), "standard_helpers: [Partial, Date]\n");
    twostep_cmd(app.path())
        .arg("extensions")
        .assert()
        .success()
        .stdout(contains("Url_Tera_Extension"))
        .stdout(contains("Date_Tera_Extension"))
        .stdout(contains("Partial"))
        .stdout(contains("no bundle, skipped"))
        .stdout(contains("5 extension(s) registered"));
}

#[test]
fn cache_clear_removes_entries_written_by_render() {
    let app = app();
    write(&app.path().join("twostep.yaml"), "template_cache_dir: cache\n");

    twostep_cmd(app.path())
        .args(["render", "greet", "hello", "--set", "name=Ann"])
        .assert()
        .success();
    assert!(app.path().join("cache").is_dir());

    twostep_cmd(app.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(contains("removed 2 cache entries"));

    twostep_cmd(app.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(contains("removed 0 cache entries"));
}

#[test]
fn cache_clear_without_cache_dir_is_a_no_op() {
    let app = app();
    twostep_cmd(app.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(contains("nothing to clear"));
}
