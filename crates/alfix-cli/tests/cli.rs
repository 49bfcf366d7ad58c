use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const GREETER: &str = "codeunit 50100 Greeter
{
    procedure Greet(Customer: Record Customer)
    var
        Counter: Integer;
    begin
        Message('Hello %1, it''s day %2', Customer.Name, Counter);
        Customer.\"Credit Limit\" := 100;
    end;
}
";

const CALC: &str = "codeunit 50101 Calc
{
    procedure Run(var Customer: Record Customer; Qty: Integer)
    var
        Total: Decimal;
        Factor: Decimal;
    begin
        Factor := 2;
        Total := Qty * Factor;
        Customer.Amount := Total;
    end;
}
";

struct Project {
    root: PathBuf,
}

impl Project {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "alfix-cli-{prefix}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(root.join("src")).expect("create project folder");
        fs::write(root.join("app.json"), r#"{ "name": "Demo", "version": "1.0.0.0" }"#)
            .expect("write app.json");
        Self { root }
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::write(&path, text).expect("write source");
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_alfix"))
            .current_dir(&self.root)
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("run alfix")
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// 1-based `LINE:COLUMN` of the first occurrence of `needle`.
fn position(source: &str, needle: &str) -> String {
    let offset = source.find(needle).expect("needle in source");
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let col = offset - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    format!("{line}:{col}")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success.\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read source")
}

#[test]
fn actions_lists_label_extraction_on_a_literal() {
    let project = Project::new("actions");
    project.write("src/Greeter.Codeunit.al", GREETER);
    let at = position(GREETER, "'Hello");

    let output = project.run(&["actions", "src/Greeter.Codeunit.al", "--at", &at]);
    assert_success(&output);
    assert!(stdout(&output).contains("[0] Extract to label (refactor.extract)"));

    let output = project.run(&["actions", "src/Greeter.Codeunit.al", "--at", &at, "--json"]);
    assert_success(&output);
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(entries[0]["title"], "Extract to label");
    assert_eq!(entries[0]["kind"], "refactor.extract");
    assert_eq!(entries[0]["deferred"], false);
}

#[test]
fn apply_prints_the_changed_document() {
    let project = Project::new("print");
    let path = project.write("src/Greeter.Codeunit.al", GREETER);
    let at = position(GREETER, "'Hello");

    let output = project.run(&[
        "apply",
        "src/Greeter.Codeunit.al",
        "--at",
        &at,
        "--action",
        "Extract to label",
    ]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("        HelloItsDayMsg: Label 'Hello %1, it''s day %2';\n"));
    assert!(text.contains("Message(HelloItsDayMsg, Customer.Name, Counter);"));
    assert_eq!(read(&path), GREETER);
}

#[test]
fn apply_write_updates_the_file() {
    let project = Project::new("write");
    let path = project.write("src/Greeter.Codeunit.al", GREETER);
    let at = position(GREETER, "Customer.\"Credit");

    let output = project.run(&[
        "apply",
        "src/Greeter.Codeunit.al",
        "--at",
        &at,
        "--action",
        "Convert to validate",
        "--write",
    ]);
    assert_success(&output);
    assert!(stdout(&output).contains("Updated src/Greeter.Codeunit.al"));
    assert!(read(&path).contains("        Customer.Validate(\"Credit Limit\", 100);\n"));
}

#[test]
fn config_file_enables_translation_comments() {
    let project = Project::new("config");
    project.write("src/Greeter.Codeunit.al", GREETER);
    project.write("alfix.toml", "[refactor]\nextractToLabelCreatesComment = true\n");
    let at = position(GREETER, "'Hello");

    let output = project.run(&["apply", "src/Greeter.Codeunit.al", "--at", &at, "-a", "0"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Comment = '%1 = Customer.Name, %2 = Counter'"));
}

#[test]
fn extract_procedure_reports_edits_and_rename_as_json() {
    let project = Project::new("extract");
    project.write("src/Calc.Codeunit.al", CALC);
    let at = position(CALC, "Factor := 2;");
    let end = position(CALC, "\n        Customer.Amount");

    let output = project.run(&[
        "apply",
        "src/Calc.Codeunit.al",
        "--at",
        &at,
        "--to",
        &end,
        "--action",
        "Extract procedure",
        "--json",
        "--no-input",
    ]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["title"], "Extract procedure");

    let changes = value["edit"]["changes"].as_object().expect("changes");
    assert_eq!(changes.len(), 1);
    let (uri, edits) = changes.iter().next().expect("one document");
    assert!(uri.starts_with("file://"));
    assert!(uri.ends_with("/src/Calc.Codeunit.al"));
    assert_eq!(edits[0]["newText"], "NewProcedure(Total, Qty);");
    assert_eq!(edits[0]["range"]["start"]["line"], 7);
    assert_eq!(edits[0]["range"]["start"]["character"], 8);

    assert_eq!(value["rename"]["range"]["start"]["line"], 6);
    assert_eq!(value["rename"]["range"]["start"]["character"], 8);
}

#[test]
fn tree_dumps_nodes_and_tokens() {
    let project = Project::new("tree");
    project.write("src/Greeter.Codeunit.al", GREETER);

    let output = project.run(&["tree", "src/Greeter.Codeunit.al"]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.starts_with("CompilationUnit@"));
    assert!(text.contains("CodeunitObject@"));
    assert!(text.contains("StringLiteral@"));
}

#[test]
fn unknown_action_fails_with_available_titles() {
    let project = Project::new("unknown");
    project.write("src/Greeter.Codeunit.al", GREETER);
    let at = position(GREETER, "'Hello");

    let output = project.run(&["apply", "src/Greeter.Codeunit.al", "--at", &at, "-a", "Rename"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: no action titled 'Rename'. Available: Extract to label"));
}

#[test]
fn missing_file_is_reported() {
    let project = Project::new("missing");
    let output = project.run(&["tree", "src/Nope.Codeunit.al"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("src/Nope.Codeunit.al not found"));
}
