use std::time::Duration;

use gemx_adapters::AutomationGuard;
use gemx_runtime::Executor;
use tempfile::TempDir;

fn guard_with_files(files: &[(&str, &str)]) -> (TempDir, AutomationGuard) {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("automations");
    std::fs::create_dir_all(&base).unwrap();
    for (name, content) in files {
        std::fs::write(base.join(name), content).unwrap();
    }
    let guard = AutomationGuard::new(vec![base]).unwrap();
    (dir, guard)
}

#[test]
fn test_resolve_with_and_without_extension() {
    let (_dir, guard) = guard_with_files(&[("rx_brief.yaml", "steps: []"), ("commit.sh", "echo hi")]);

    assert!(guard.resolve("rx_brief").unwrap().ends_with("rx_brief.yaml"));
    assert!(guard.resolve("commit.sh").unwrap().ends_with("commit.sh"));
}

#[test]
fn test_resolve_rejects_parent_traversal() {
    let (dir, guard) = guard_with_files(&[]);
    std::fs::write(dir.path().join("secret.sh"), "echo secret").unwrap();

    let err = guard.resolve("../secret.sh").unwrap_err();
    assert!(err.to_string().contains("Path traversal denied"));
}

#[test]
fn test_resolve_rejects_absolute_path() {
    let (_dir, guard) = guard_with_files(&[]);

    let err = guard.resolve("/etc/passwd").unwrap_err();
    assert!(err.to_string().contains("Path traversal denied"));
}

#[cfg(unix)]
#[test]
fn test_resolve_rejects_symlink_escape() {
    let (dir, guard) = guard_with_files(&[]);
    let outside = dir.path().join("outside.sh");
    std::fs::write(&outside, "echo outside").unwrap();
    std::os::unix::fs::symlink(&outside, guard.bases()[0].join("link.sh")).unwrap();

    assert!(guard.resolve("link.sh").is_err());
}

#[test]
fn test_resolve_missing() {
    let (_dir, guard) = guard_with_files(&[]);

    let err = guard.resolve("nope").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_missing_bases_are_skipped() {
    let dir = TempDir::new().unwrap();
    assert!(AutomationGuard::new(vec![dir.path().join("missing")]).is_err());

    let guard = AutomationGuard::new(vec![dir.path().join("missing"), dir.path().to_path_buf()])
        .unwrap();
    assert_eq!(guard.bases().len(), 1);
}

#[test]
fn test_list_sorted_known_types_only() {
    let (_dir, guard) = guard_with_files(&[
        ("zeta.sh", ""),
        ("alpha.yaml", ""),
        ("alpha.sh", ""),
        ("notes.txt", ""),
    ]);

    assert_eq!(guard.list().unwrap(), vec!["alpha", "zeta"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_shell_automation() {
    let (_dir, guard) = guard_with_files(&[("hello.sh", "echo automated")]);
    let executor = Executor::new(Duration::from_secs(5));

    let result = guard.run(&executor, "hello", &[], None).await.unwrap();

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.stdout(), "automated");
}

#[tokio::test]
async fn test_run_yaml_automation_refused() {
    let (_dir, guard) = guard_with_files(&[("brief.yaml", "steps: []")]);
    let executor = Executor::new(Duration::from_secs(5));

    assert!(guard.run(&executor, "brief", &[], None).await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_forwards_prompt_and_args() {
    let (_dir, guard) = guard_with_files(&[(
        "brief.sh",
        "printf '%s|' \"$@\"\ncat",
    )]);
    let executor = Executor::new(Duration::from_secs(5));
    let args = vec!["--lang".to_string(), "pt br".to_string()];

    let result = guard
        .run(&executor, "brief", &args, Some("summarize this"))
        .await
        .unwrap();

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.stdout(), "--lang|pt br|summarize this");
}
