// Allow deprecated APIs (assert_cmd::cargo_bin is deprecated but still works)
#![allow(deprecated)]

use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command; // Run programs
use tempfile::TempDir;

/// A document of `count` one-line paragraphs: "line 0", "line 1", ...
fn write_document(dir: &Path, count: usize) -> PathBuf {
    let text: Vec<String> = (0..count).map(|i| format!("line {}", i)).collect();
    let path = dir.join("document.txt");
    fs::write(&path, text.join("\n")).unwrap();
    path
}

fn display_list(path: &Path) -> Vec<serde_json::Value> {
    let json = fs::read_to_string(path).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn drawn_text(commands: &[serde_json::Value]) -> Vec<String> {
    commands
        .iter()
        .filter(|c| c["op"] == "text")
        .filter_map(|c| c["text"].as_str().map(str::to_string))
        .collect()
}

mod test_render {
    use crate::*;

    #[test]
    fn test_display_list_shows_top_of_document() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 50);
        let output = dir.path().join("view.json");

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("--display-list")
            .arg(&output)
            .arg("--fixed-metrics")
            .arg("--size=15")
            .arg("--width=200")
            .arg("--height=100");
        cmd.assert().success();

        let text = drawn_text(&display_list(&output));
        assert_eq!(text.first().map(String::as_str), Some("line 0"));
        assert!(text.len() <= 6, "drew {} lines into a 100px view", text.len());
        assert!(!text.iter().any(|t| t == "line 40"));
        Ok(())
    }

    #[rstest]
    #[case::default_placement(false)]
    #[case::near_top(true)]
    fn test_find_scrolls_match_into_view(#[case] near_top: bool) -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 50);
        let output = dir.path().join("found.json");

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("--display-list")
            .arg(&output)
            .arg("--fixed-metrics")
            .arg("--size=15")
            .arg("--width=200")
            .arg("--height=100")
            .arg("--find")
            .arg("line 40");
        if near_top {
            cmd.arg("--near-top");
        }
        cmd.assert().success();

        let text = drawn_text(&display_list(&output));
        assert!(text.iter().any(|t| t == "line 40"));
        assert!(!text.iter().any(|t| t == "line 0"));
        Ok(())
    }

    #[test]
    fn test_fixed_metrics_cannot_rasterize() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 3);

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(dir.path().join("out.png"))
            .arg("--fixed-metrics");
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("--fixed-metrics cannot rasterize"));
        Ok(())
    }

    #[test]
    fn test_missing_input_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(dir.path().join("missing.txt"))
            .arg("--display-list")
            .arg(dir.path().join("out.json"))
            .arg("--fixed-metrics");
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read input file"));
        Ok(())
    }

    #[test]
    fn test_find_without_match() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 3);

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("--display-list")
            .arg(dir.path().join("out.json"))
            .arg("--fixed-metrics")
            .arg("--find")
            .arg("absent");
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Text not found"));
        Ok(())
    }

    #[test]
    fn test_nothing_to_write() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 3);

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render").arg("-i").arg(&input).arg("--fixed-metrics");
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to write"));
        Ok(())
    }

    #[rstest]
    #[case::zero("0")]
    #[case::not_a_number("NaN")]
    fn test_invalid_font_size(#[case] size: &str) -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 3);

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("--display-list")
            .arg(dir.path().join("out.json"))
            .arg("--fixed-metrics")
            .arg(format!("--size={}", size));
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Invalid font size"));
        Ok(())
    }

    #[rstest]
    #[case::malformed("{ not json", "Failed to load config file")]
    #[case::zero_passes(r#"{"max_convergence_passes": 0}"#, "max_convergence_passes")]
    fn test_invalid_view_config(
        #[case] config: &str,
        #[case] message: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 3);
        let config_path = dir.path().join("view.json");
        fs::write(&config_path, config)?;

        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("render")
            .arg("-i")
            .arg(&input)
            .arg("--display-list")
            .arg(dir.path().join("out.json"))
            .arg("--fixed-metrics")
            .arg("--config")
            .arg(&config_path);
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains(message));
        Ok(())
    }
}

mod test_print {
    use crate::*;

    fn print_command(input: &Path, out_dir: &Path, margin: i32) -> Result<Command, Box<dyn std::error::Error>> {
        let mut cmd = Command::cargo_bin("vw-render")?;
        cmd.arg("print")
            .arg("-i")
            .arg(input)
            .arg("-d")
            .arg(out_dir)
            .arg("--fixed-metrics")
            .arg("--size=15")
            .arg("--page-width=400")
            .arg("--page-height=300")
            .arg(format!("--margin={}", margin));
        Ok(cmd)
    }

    #[test]
    fn test_prints_all_pages() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 50);
        let out_dir = dir.path().join("pages");

        // 50 lines of 20px on a 200px printable height.
        print_command(&input, &out_dir, 50)?
            .assert()
            .success()
            .stdout(predicate::str::contains("Printed 5 pages"));

        for page in 1..=5 {
            assert!(out_dir.join(format!("page-{:03}.json", page)).exists());
        }
        assert!(!out_dir.join("page-006.json").exists());

        let first = drawn_text(&display_list(&out_dir.join("page-001.json")));
        assert_eq!(first.first().map(String::as_str), Some("line 0"));
        let last = drawn_text(&display_list(&out_dir.join("page-005.json")));
        assert!(last.iter().any(|t| t == "line 49"));
        assert!(!last.iter().any(|t| t == "line 0"));
        Ok(())
    }

    #[test]
    fn test_max_pages_cancels_job() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 50);
        let out_dir = dir.path().join("pages");

        print_command(&input, &out_dir, 50)?
            .arg("--max-pages=2")
            .assert()
            .success()
            .stdout(predicate::str::contains("Stopped after 2 pages"));

        assert!(out_dir.join("page-002.json").exists());
        assert!(!out_dir.join("page-003.json").exists());
        Ok(())
    }

    #[test]
    fn test_margin_too_large() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let input = write_document(dir.path(), 5);

        print_command(&input, &dir.path().join("pages"), 200)?
            .assert()
            .failure()
            .stderr(predicate::str::contains("no room inside a margin"));
        Ok(())
    }
}
