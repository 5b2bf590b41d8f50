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
use std::sync::Arc;

use logward::Config;
use logward::Frame;
use logward::FrameResolver;
use logward::Host;
use logward::Level;
use logward::Logger;
use tempfile::TempDir;

const HEADER_FRAME: &str = "************* Log Head ****************";

#[derive(Debug)]
struct FixedFrames;

impl FrameResolver for FixedFrames {
    fn resolve(&self, skip: usize, depth: usize) -> Vec<Frame> {
        let frames = vec![
            Frame {
                module: "app::net".to_string(),
                function: "connect".to_string(),
                file: "client.rs".to_string(),
                line: 42,
            },
            Frame {
                module: "app".to_string(),
                function: "run".to_string(),
                file: "main.rs".to_string(),
                line: 7,
            },
        ];
        frames
            .into_iter()
            .skip(skip)
            .take(depth.max(1))
            .collect()
    }
}

fn file_config(dir: &Path) -> Config {
    Config::new(Host::new().cache_dir(dir))
        .dir(dir.join("logs").to_string_lossy())
        .file_prefix("app")
        .file_switch(true)
        .console_switch(false)
        .head_switch(false)
}

fn logger_with(config: Config) -> Logger {
    Logger::builder().config(config).resolver(FixedFrames).build()
}

fn today_file(dir: &Path) -> PathBuf {
    let date = jiff::Zoned::now().date();
    dir.join("logs").join(format!("app-{date}.txt"))
}

fn day_file(dir: &Path, days_ago: i64) -> PathBuf {
    let date = jiff::Zoned::now()
        .date()
        .checked_sub(jiff::Span::new().days(days_ago))
        .unwrap();
    dir.join("logs").join(format!("app-{date}.txt"))
}

#[test]
fn header_precedes_content_and_is_stamped_once() {
    let temp = TempDir::new().unwrap();
    let config = file_config(temp.path()).host(
        Host::new()
            .cache_dir(temp.path())
            .manufacturer("Acme")
            .model("Anvil 9")
            .app_version("1.4.2", 142),
    );
    let logger = logger_with(config);

    logger.i_tag("boot", "first line");
    logger.i_tag("boot", "second line");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(content.starts_with(HEADER_FRAME));
    assert_eq!(content.matches(HEADER_FRAME).count(), 2);
    assert!(content.contains("Device Manufacturer: Acme"));
    assert!(content.contains("App Version Code   : 142"));
    assert!(content.find("first line").unwrap() < content.find("second line").unwrap());
}

#[test]
fn file_lines_carry_time_glyph_and_tag() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()));

    logger.w_tag("net", "timeout");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    let line = content
        .lines()
        .find(|line| line.contains("timeout"))
        .unwrap();
    // HH:MM:SS W/net: timeout
    let (time, rest) = line.split_at(8);
    assert!(time.chars().enumerate().all(|(i, c)| {
        if i == 2 || i == 5 {
            c == ':'
        } else {
            c.is_ascii_digit()
        }
    }));
    assert_eq!(rest, " W/net: timeout");
}

#[test]
fn head_lines_flow_into_file_prefix() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()).head_switch(true));

    logger.d("payload");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    let line = content
        .lines()
        .find(|line| line.contains("payload"))
        .unwrap();
    assert!(line.contains(" D/client ["));
    assert!(line.contains("app::net::connect(client.rs:42)]: payload"));
}

#[test]
fn severity_below_file_floor_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()).file_floor(Level::Warn));

    logger.i_tag("boot", "too quiet");
    logger.flush();
    assert!(!today_file(temp.path()).exists());

    logger.e_tag("boot", "loud enough");
    logger.flush();
    assert!(today_file(temp.path()).exists());
}

#[test]
fn master_switch_off_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()).switch(false));

    logger.e_tag("boot", "dropped");
    logger.file_tag("boot", "also dropped");
    logger.flush();
    assert!(!today_file(temp.path()).exists());
}

#[test]
fn both_sinks_off_drops_even_forced_file_events() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(
        file_config(temp.path())
            .file_switch(false)
            .console_switch(false),
    );

    logger.file_tag("boot", "dropped");
    logger.flush();
    assert!(!today_file(temp.path()).exists());
}

#[test]
fn force_file_writes_with_file_switch_off() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(
        file_config(temp.path())
            .file_switch(false)
            .console_switch(true),
    );

    logger.d_tag("boot", "not persisted");
    logger.file_tag("boot", "persisted");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(content.contains("persisted"));
    assert!(!content.contains("not persisted"));
}

#[test]
fn multiple_payloads_are_labeled_in_the_body() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()));

    logger.d_tag("args", ("a", "b"));
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(content.contains("args[0] = a\nargs[1] = b\n"));
}

#[test]
fn retention_sweeps_due_day_files_on_creation() {
    let temp = TempDir::new().unwrap();
    let config = file_config(temp.path()).save_days(7);
    fs::create_dir_all(temp.path().join("logs")).unwrap();
    for days_ago in [30, 10, 1] {
        fs::write(day_file(temp.path(), days_ago), "old\n").unwrap();
    }

    let logger = logger_with(config);
    logger.i_tag("boot", "fresh");
    logger.flush();

    assert!(!day_file(temp.path(), 30).exists());
    assert!(!day_file(temp.path(), 10).exists());
    assert!(day_file(temp.path(), 1).exists());
    assert!(today_file(temp.path()).exists());
}

#[test]
fn oversized_save_days_still_writes() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()).save_days(i32::MAX));

    logger.i_tag("boot", "survives");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(content.contains("survives"));

    // The writer must also still be alive for the next line.
    logger.i_tag("boot", "and again");
    logger.flush();
    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(content.contains("and again"));
}

#[test]
fn runtime_config_replacement_takes_effect_next_call() {
    let temp = TempDir::new().unwrap();
    let logger = logger_with(file_config(temp.path()).file_switch(false));

    logger.i_tag("boot", "before");
    logger.update_config(|config| config.file_switch(true));
    logger.i_tag("boot", "after");
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    assert!(!content.contains("before"));
    assert!(content.contains("after"));
}

#[test]
fn concurrent_appends_produce_whole_lines() {
    const THREADS: usize = 16;
    const LINES_PER_THREAD: usize = 10;

    let temp = TempDir::new().unwrap();
    let logger = Arc::new(logger_with(file_config(temp.path())));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..LINES_PER_THREAD {
                    logger.i_tag("load", format!("thread-{t} line-{i} end"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush();

    let content = fs::read_to_string(today_file(temp.path())).unwrap();
    let body = content.rsplit(HEADER_FRAME).next().unwrap();
    let lines: Vec<&str> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    assert_eq!(lines.len(), THREADS * LINES_PER_THREAD);
    for line in lines {
        assert!(line.contains(" I/load: thread-"), "partial line: {line}");
        assert!(line.ends_with(" end"), "partial line: {line}");
    }
    for t in 0..THREADS {
        for i in 0..LINES_PER_THREAD {
            assert_eq!(content.matches(&format!("thread-{t} line-{i} end")).count(), 1);
        }
    }
}
