use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FAST_CONFIG: &str = r#"(
    output_dir: "reports",
    timings: (
        tick_base_ms: 5,
        tick_increment_ms: 2,
        promotion_delay_ms: 20,
        notice_ttl_ms: 50,
        poll_interval_ms: 20,
        max_poll_attempts: 200,
        simulated_processing_ms: 60,
        simulated_generation_ms: 30,
    ),
)"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dataknow"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run dataknow")
}

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("dataknow.ron"), FAST_CONFIG).unwrap();
    fs::write(temp.path().join("research-paper.pdf"), vec![1_u8; 4096]).unwrap();
    fs::write(temp.path().join("notes.txt"), "meeting notes").unwrap();
    temp
}

fn saved_reports(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("reports"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn simulated_session_downloads_consolidated_and_custom_reports() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &[
            "research-paper.pdf",
            "notes.txt",
            "--language",
            "es",
            "--prompt",
            "Compare the methods",
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");

    assert!(stdout.contains("Analysis completed: 2 summaries"), "{stdout}");
    assert!(stdout.contains("Resumen generado por IA"), "{stdout}");

    let reports = saved_reports(temp.path());
    assert_eq!(reports.len(), 2, "{reports:?}");
    assert!(reports[0].starts_with("custom-analysis-"));
    assert!(reports[1].starts_with("documento-consolidado--"));
    let consolidated = fs::read_to_string(temp.path().join("reports").join(&reports[1])).unwrap();
    assert!(consolidated.contains("research-paper.pdf"));
}

#[test]
fn rejected_batch_exits_with_an_error() {
    let temp = workspace();
    fs::write(temp.path().join("photo.png"), b"png").unwrap();

    let output = run(temp.path(), &["photo.png"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("unsupported file format"), "{stdout}");
    assert!(saved_reports(temp.path()).is_empty());
}

#[test]
fn missing_input_file_is_reported() {
    let temp = workspace();
    let output = run(temp.path(), &["absent.pdf"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.pdf"));
}
