// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use logforth_channel::Channels;
use logforth_channel::ErrorKind;
use logforth_channel::get_logger;
use logforth_channel::init_logger;
use logforth_channel::record::Level;
use tempfile::TempDir;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("log.xml");
    fs::write(&path, format!("<logging>{body}</logging>")).unwrap();
    path
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

// backing files of `alias` in `dir`, excluding the alias itself
fn backing_files(dir: &Path, alias: &str) -> Vec<String> {
    let prefix = format!("{alias}-");
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| {
            let filename = entry.ok()?.file_name().to_str()?.to_string();
            filename.starts_with(&prefix).then_some(filename)
        })
        .collect()
}

#[test]
fn test_file_channel_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>info</level><type>file</type></filter>",
    );

    let channels = Channels::init(temp_dir.path(), &config).unwrap();
    let app = channels.get("app");
    assert_eq!(app.name(), "app");
    assert_eq!(app.level(), Level::Info);

    app.debug(format_args!("too verbose"));
    app.info(format_args!("server started on {}", 8080));
    channels.flush();

    let content = read(temp_dir.path().join("app.log"));
    assert!(content.contains(" INFO app: server started on 8080"), "{content}");
    assert!(!content.contains("too verbose"), "{content}");
}

#[test]
fn test_file_channel_default_limits() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>info</level><type>file</type></filter>",
    );

    // 15 earlier hours of this channel, all older than the current one
    for hour in 0..15 {
        let stale = temp_dir.path().join(format!("app.log-20000101{hour:02}"));
        fs::write(stale, "old\n").unwrap();
    }

    let channels = Channels::init(temp_dir.path(), &config).unwrap();
    let app = channels.get("app");

    // the default retention trims to 10 files, the live one included
    let files = backing_files(temp_dir.path(), "app.log");
    assert_eq!(files.len(), 10, "{files:?}");
    assert!(!files.contains(&"app.log-2000010100".to_string()), "{files:?}");
    assert!(files.contains(&"app.log-2000010114".to_string()), "{files:?}");

    // well below 100 MiB nothing rolls over by size
    let payload = "y".repeat(1024);
    for _ in 0..2048 {
        app.info(format_args!("{payload}"));
    }
    channels.flush();
    let after = backing_files(temp_dir.path(), "app.log");
    assert_eq!(after.len(), 10, "{after:?}");
    // no generation suffix such as `app.log-2024081017.1`
    assert!(
        after.iter().all(|f| !f["app.log-".len()..].contains('.')),
        "{after:?}"
    );
}

#[test]
fn test_synthesized_stderr_and_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>debug</level><type>file</type></filter>",
    );

    let channels = Channels::init(temp_dir.path(), &config).unwrap();
    assert!(channels.contains("stderr"));
    assert!(channels.contains("stdout"));
    assert_eq!(channels.get("stderr").name(), "stderr");
    assert_eq!(channels.get("stderr").level(), Level::Error);
    assert_eq!(channels.get("stdout").name(), "stdout");
    assert_eq!(channels.get("stdout").level(), Level::Info);

    assert!(temp_dir.path().join("stderr.log").exists());
    assert!(temp_dir.path().join("stdout.log").exists());
}

#[test]
fn test_error_reaches_channel_and_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>info</level><type>file</type></filter>",
    );

    let channels = Channels::init(temp_dir.path(), &config).unwrap();
    channels.get("app").error(format_args!("connection lost"));
    channels.get("app").warn(format_args!("retrying"));
    channels.get("stderr").error(format_args!("direct"));
    channels.flush();

    let app = read(temp_dir.path().join("app.log"));
    let stderr = read(temp_dir.path().join("stderr.log"));
    let stdout = read(temp_dir.path().join("stdout.log"));

    assert!(app.contains("ERROR app: connection lost"), "{app}");
    assert!(stderr.contains("ERROR app: connection lost"), "{stderr}");
    assert!(!stderr.contains("retrying"), "{stderr}");
    assert!(stdout.contains(" WARN app: retrying"), "{stdout}");
    assert!(!stdout.contains("connection lost"), "{stdout}");

    // the stderr channel is its own routing target and writes once
    assert_eq!(stderr.matches("stderr: direct").count(), 1, "{stderr}");
}

#[test]
fn test_unknown_name_falls_back_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        "<filter><tag>stdout</tag><level>debug</level><type>console</type></filter>",
    );

    let channels = Channels::init(temp_dir.path(), &config).unwrap();
    let fallback = channels.get("nonexistent");
    assert_eq!(fallback.name(), "stdout");
    assert_eq!(fallback.level(), Level::Debug);

    // a console stdout channel leaves no stdout.log behind
    assert!(!temp_dir.path().join("stdout.log").exists());
    assert!(temp_dir.path().join("stderr.log").exists());
}

#[test]
fn test_invalid_configurations() {
    let temp_dir = TempDir::new().unwrap();

    let err = Channels::init(temp_dir.path(), temp_dir.path().join("missing.xml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigIo);

    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>verbose</level><type>file</type></filter>",
    );
    let err = Channels::init(temp_dir.path(), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLevel);
    assert!(!temp_dir.path().join("app.log").exists());

    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>info</level><type>socket</type></filter>",
    );
    let err = Channels::init(temp_dir.path(), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigParse);
}

// the only test in this binary touching the process-wide registry
#[test]
fn test_process_wide_registry() {
    let temp_dir = TempDir::new().unwrap();

    let err = init_logger(temp_dir.path(), temp_dir.path().join("missing.xml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigIo);
    assert_eq!(get_logger("app").name(), "default");
    assert_eq!(get_logger("stdout").name(), "default");

    let config = write_config(
        temp_dir.path(),
        "<filter><tag>app</tag><level>info</level><type>file</type></filter>",
    );
    init_logger(temp_dir.path(), &config).unwrap();
    assert_eq!(get_logger("app").name(), "app");
    assert_eq!(get_logger("nonexistent").name(), "stdout");
    get_logger("app").error(format_args!("first failure"));

    // a failed re-initialization keeps the published channels
    let err = init_logger(temp_dir.path(), temp_dir.path().join("missing.xml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigIo);
    assert_eq!(get_logger("app").name(), "app");

    // a successful one replaces them without doubling the routing
    init_logger(temp_dir.path(), &config).unwrap();
    get_logger("app").error(format_args!("second failure"));
    get_logger("app").flush();

    let stderr = read(temp_dir.path().join("stderr.log"));
    assert_eq!(stderr.matches("app: first failure").count(), 1, "{stderr}");
    assert_eq!(stderr.matches("app: second failure").count(), 1, "{stderr}");

    let app = read(temp_dir.path().join("app.log"));
    assert_eq!(app.matches("app: second failure").count(), 1, "{app}");
}
