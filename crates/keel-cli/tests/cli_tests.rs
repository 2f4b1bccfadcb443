//! CLI integration tests for the `keel` binary

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn keel_cmd() -> Command {
    let mut cmd = Command::cargo_bin("keel").unwrap();
    cmd.env_remove("KEEL_CONFIGURATION")
        .env_remove("KEEL_LINK_KIND")
        .env_remove("KEEL_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_project(root: &Path) {
    write(
        root,
        "keel.toml",
        "[project]\nname = \"Demo\"\nversion = \"1.0.0\"\n\n[[platform]]\nmoniker = \"linux\"\n",
    );
    write(
        root,
        "Source/Demo.target.toml",
        "[target]\nname = \"Demo\"\nstartup-module = \"App\"\n",
    );
    write(
        root,
        "Source/App/App.module.toml",
        "[module]\nname = \"App\"\nkind = \"console-application\"\ndependencies = { private = [\"Core\"] }\n",
    );
    write(
        root,
        "Source/Core/Core.module.toml",
        "[module]\nname = \"Core\"\nkind = \"runtime-library\"\n",
    );
}

mod help_messages {
    use super::*;

    #[test]
    fn test_main_help_shows_all_commands() {
        keel_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("resolve"))
            .stdout(predicate::str::contains("graph"))
            .stdout(predicate::str::contains("modules"))
            .stdout(predicate::str::contains("KEEL_CONFIGURATION"));
    }
}

mod resolve {
    use super::*;

    #[test]
    fn test_resolve_prints_summary() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        keel_cmd()
            .arg("resolve")
            .arg("--project")
            .arg(temp_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Resolved Demo (linux, Development)"))
            .stdout(predicate::str::contains("Order:       Core, App"))
            .stdout(predicate::str::contains("Fingerprint:"));
    }

    #[test]
    fn test_resolve_json() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        let output = keel_cmd()
            .args(["resolve", "--json", "--configuration", "shipping", "--project"])
            .arg(temp_dir.path())
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["configuration"], "Shipping");
        assert_eq!(value["sorted"], serde_json::json!(["Core", "App"]));
    }

    #[test]
    fn test_resolve_all_configurations() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        keel_cmd()
            .args(["resolve", "--all-configurations", "--project"])
            .arg(temp_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("GameDebug"))
            .stdout(predicate::str::contains("Shipping"));
    }

    #[test]
    fn test_cycle_fails() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());
        write(
            temp_dir.path(),
            "Source/Core/Core.module.toml",
            "[module]\nname = \"Core\"\nkind = \"runtime-library\"\ndependencies = { public = [\"App\"] }\n",
        );

        keel_cmd()
            .arg("resolve")
            .arg("--project")
            .arg(temp_dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Circular dependency detected"));
    }

    #[test]
    fn test_unknown_target_fails() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        keel_cmd()
            .args(["resolve", "--target", "Nope", "--project"])
            .arg(temp_dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown target 'Nope'"));
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        keel_cmd()
            .args(["resolve", "--configuration", "Profiling"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Profiling"));
    }
}

mod graph {
    use super::*;

    #[test]
    fn test_graph_to_stdout() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        keel_cmd()
            .arg("graph")
            .arg("--project")
            .arg(temp_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::starts_with("digraph G {"))
            .stdout(predicate::str::contains("0 -> 1 [style=dotted];"));
    }

    #[test]
    fn test_graph_to_file() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());
        let output = temp_dir.path().join("demo.dot");

        keel_cmd()
            .arg("graph")
            .arg("--project")
            .arg(temp_dir.path())
            .arg("--output")
            .arg(&output)
            .assert()
            .success();

        let dot = fs::read_to_string(output).unwrap();
        assert!(dot.contains("[label=\"Core\", shape=doubleoctagon]"));
    }
}

mod modules {
    use super::*;

    #[test]
    fn test_lists_modules_and_targets() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        keel_cmd()
            .arg("modules")
            .arg("--project")
            .arg(temp_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Modules (2)"))
            .stdout(predicate::str::contains("Targets (1)"))
            .stdout(predicate::str::contains("Demo"));
    }

    #[test]
    fn test_missing_project_fails() {
        let temp_dir = TempDir::new().unwrap();

        keel_cmd()
            .arg("modules")
            .arg("--project")
            .arg(temp_dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load project"));
    }
}
