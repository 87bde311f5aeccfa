use assert_cmd::Command;
use predicates::prelude::*;

fn yt_transcripts(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("yt-transcripts").unwrap();
    cmd.env_remove("YOUTUBE_API_KEY")
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .current_dir(config_home);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();

    yt_transcripts(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_fetch_rejects_url_without_video_or_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    yt_transcripts(dir.path())
        .args(["-q", "fetch", "https://www.youtube.com/feed/trending", "--target-lang", ""])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing 'v' or 'list'"))
        .stderr(predicate::str::contains("Missing API key"));
}

#[test]
fn test_fetch_without_url_on_closed_stdin_fails() {
    let dir = tempfile::tempdir().unwrap();

    yt_transcripts(dir.path())
        .args(["-q", "fetch", "--target-lang", "en"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No playlist or video URL provided"));
}

#[test]
fn test_config_show_reports_defaults() {
    let dir = tempfile::tempdir().unwrap();

    yt_transcripts(dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration:"))
        .stdout(predicate::str::contains("API Key: missing"));
}

#[test]
fn test_config_reads_local_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "youtube:\n  api_key: from-file\n  transcript_languages: [es]\n",
    )
    .unwrap();

    yt_transcripts(dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API Key: set"))
        .stdout(predicate::str::contains("es"));
}

#[test]
fn test_doctor_runs_without_tools() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "fallback:\n  yt_dlp_path: no-such-yt-dlp\n  whisper_path: no-such-whisper\n",
    )
    .unwrap();

    yt_transcripts(dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stderr(predicate::str::contains("no-such-yt-dlp"))
        .stderr(predicate::str::contains("no-such-whisper"));
}

/// Writes an executable that records every invocation in `marker`
#[cfg(unix)]
fn recording_tool(dir: &std::path::Path, name: &str, marker: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\necho \"$@\" >> '{}'\n", marker.display())).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_fetch_does_not_run_fallback_tools_upfront() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("invocations.log");
    let yt_dlp = recording_tool(dir.path(), "fake-yt-dlp", &marker);
    let whisper = recording_tool(dir.path(), "fake-whisper", &marker);
    std::fs::write(
        dir.path().join("config.yaml"),
        format!(
            "fallback:\n  yt_dlp_path: {}\n  whisper_path: {}\n",
            yt_dlp.display(),
            whisper.display()
        ),
    )
    .unwrap();

    yt_transcripts(dir.path())
        .args(["-q", "fetch", "https://www.youtube.com/feed/trending", "--target-lang", ""])
        .assert()
        .failure();
    assert!(!marker.exists());

    yt_transcripts(dir.path()).arg("doctor").assert().success();
    let calls = std::fs::read_to_string(&marker).unwrap();
    assert!(calls.contains("--help"));
    assert!(calls.contains("--version"));
}
