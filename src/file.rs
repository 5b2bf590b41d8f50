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

//! The file sink: day-partitioned files written by one dedicated background
//! thread.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::thread::JoinHandle;

use anyhow::Context;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;
use jiff::Zoned;
use jiff::civil::Date;

use crate::config::Config;
use crate::level::Level;

const FILE_SUFFIX: &str = ".txt";
const HEADER_FRAME: &str = "************* Log Head ****************";

/// A fully-resolved write, built from a config snapshot on the calling
/// thread. The worker needs no shared state to execute it.
#[derive(Debug)]
struct WriteTask {
    path: PathBuf,
    dir: PathBuf,
    prefix: String,
    date: Date,
    save_days: i32,
    header: String,
    line: String,
}

#[derive(Debug)]
enum Message {
    Write(WriteTask),
    Flush(Sender<()>),
    Shutdown,
}

/// Hands line appends to a single background writer so concurrent callers
/// never interleave partial writes and never block on disk I/O.
///
/// Dropping the sink shuts the worker down after draining the queue.
#[derive(Debug)]
pub(crate) struct FileSink {
    sender: Sender<Message>,
    handle: Option<JoinHandle<()>>,
}

impl FileSink {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        let handle = std::thread::Builder::new()
            .name("logward-file-writer".to_string())
            .spawn(move || worker_loop(receiver))
            .expect("failed to spawn the log file writer thread");
        Self {
            sender,
            handle: Some(handle),
        }
    }

    /// Formats one event line and enqueues it, together with everything the
    /// worker needs to create and rotate the day file.
    pub(crate) fn submit(
        &self,
        config: &Config,
        level: Level,
        tag: &str,
        file_head: &str,
        body: &str,
    ) {
        let now = Zoned::now();
        let date = now.date();
        let time = now.strftime("%H:%M:%S");
        let line = format!("{time} {}/{tag}{file_head}{body}\n", level.glyph());

        let dir = config.log_dir().to_path_buf();
        let prefix = config.file_prefix_str().to_string();
        let path = dir.join(format!("{prefix}-{date}{FILE_SUFFIX}"));
        let task = WriteTask {
            path,
            dir,
            prefix,
            date,
            save_days: config.save_days_value(),
            header: header_block(config, date),
            line,
        };
        if self.sender.send(Message::Write(task)).is_err() {
            eprintln!("log file writer is gone; dropping log line");
        }
    }

    /// Blocks until every line enqueued so far has been written.
    pub(crate) fn flush(&self) {
        let (ack, done) = bounded(0);
        if self.sender.send(Message::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.sender.send(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(receiver: Receiver<Message>) {
    for message in receiver.iter() {
        match message {
            Message::Write(task) => {
                if let Err(err) = run_task(&task) {
                    eprintln!("failed to log to {}: {err:#}", task.path.display());
                }
            }
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
            Message::Shutdown => break,
        }
    }
}

// Single worker: the exists() check cannot race another creator.
fn run_task(task: &WriteTask) -> anyhow::Result<()> {
    let existed = task.path.exists();
    if !existed {
        fs::create_dir_all(&task.dir).context("failed to create log directory")?;
        if task.save_days > 0 {
            delete_due_logs(&task.dir, &task.prefix, task.date, task.save_days);
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&task.path)
        .context("failed to open log file")?;
    if !existed {
        file.write_all(task.header.as_bytes())
            .context("failed to stamp log header")?;
    }
    file.write_all(task.line.as_bytes())
        .context("failed to append log line")
}

/// Deletes sibling day files whose embedded date is at or past the retention
/// cutoff. Each failure is reported and skipped; retention is best-effort.
fn delete_due_logs(dir: &Path, prefix: &str, today: Date, save_days: i32) {
    // A window too wide to express keeps everything; it must not unwind the
    // writer thread.
    let Ok(span) = jiff::Span::new().try_days(save_days as i64) else {
        return;
    };
    let Ok(cutoff) = today.checked_sub(span) else {
        return;
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("failed to scan log dir {}: {err}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(date) = parse_day_file(name, prefix) else {
            continue;
        };
        if date <= cutoff {
            if let Err(err) = fs::remove_file(entry.path()) {
                eprintln!("failed to delete due log {name}: {err}");
            }
        }
    }
}

/// Extracts the date from a `{prefix}-{YYYY-MM-DD}.txt` file name; anything
/// else is not a day file of ours.
fn parse_day_file(name: &str, prefix: &str) -> Option<Date> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('-')?;
    let date = rest.strip_suffix(FILE_SUFFIX)?;
    if date.len() != 10 {
        return None;
    }
    Date::strptime("%Y-%m-%d", date).ok()
}

/// The one-time block stamped at the top of a newly created day file.
fn header_block(config: &Config, date: Date) -> String {
    let host = config.host_ref();
    format!(
        "{HEADER_FRAME}\n\
         Date of Log        : {date}\n\
         Device Manufacturer: {manufacturer}\n\
         Device Model       : {model}\n\
         Platform Version   : {platform}\n\
         App Version Name   : {version_name}\n\
         App Version Code   : {version_code}\n\
         {HEADER_FRAME}\n\n",
        manufacturer = host.manufacturer_str(),
        model = host.model_str(),
        platform = host.platform_str(),
        version_name = host.app_version_name_str(),
        version_code = host.app_version_code(),
    )
}
