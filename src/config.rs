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

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::level::Level;

/// Default day-file prefix when none (or a blank one) is configured.
pub const DEFAULT_FILE_PREFIX: &str = "util";

/// Host environment facts consumed by the logger.
///
/// Everything here is supplied by the embedding application and treated as
/// opaque: device strings end up in day-file headers, and the storage roots
/// drive the default log directory probe.
#[derive(Debug, Clone)]
pub struct Host {
    manufacturer: String,
    model: String,
    platform: String,
    app_version_name: String,
    app_version_code: u32,
    external_dir: Option<PathBuf>,
    cache_dir: PathBuf,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            manufacturer: "unknown".to_string(),
            model: "unknown".to_string(),
            platform: std::env::consts::OS.to_string(),
            app_version_name: "0.0.0".to_string(),
            app_version_code: 0,
            external_dir: None,
            cache_dir: std::env::temp_dir(),
        }
    }
}

impl Host {
    /// Creates a `Host` with placeholder device facts and the system temp
    /// directory as the cache root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device manufacturer string.
    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Sets the device model string.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the platform version string.
    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Sets the application version name and code.
    #[must_use]
    pub fn app_version(mut self, name: impl Into<String>, code: u32) -> Self {
        self.app_version_name = name.into();
        self.app_version_code = code;
        self
    }

    /// Sets the external storage root, if one is mounted.
    #[must_use]
    pub fn external_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.external_dir = Some(dir.into());
        self
    }

    /// Sets the internal cache root used when no external storage is
    /// available.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn manufacturer_str(&self) -> &str {
        &self.manufacturer
    }

    pub fn model_str(&self) -> &str {
        &self.model
    }

    pub fn platform_str(&self) -> &str {
        &self.platform
    }

    pub fn app_version_name_str(&self) -> &str {
        &self.app_version_name
    }

    pub fn app_version_code(&self) -> u32 {
        self.app_version_code
    }

    // External root wins when it actually exists on disk; otherwise fall back
    // to the cache root.
    fn probe_default_dir(&self) -> PathBuf {
        match &self.external_dir {
            Some(external) if external.is_dir() => external.join("log"),
            _ => self.cache_dir.join("log"),
        }
    }
}

/// Configuration for a [`Logger`](crate::Logger).
///
/// A `Config` is built with chainable setters and handed to the logger at
/// construction time. It can be swapped at runtime via
/// [`Logger::replace_config`](crate::Logger::replace_config); reads take
/// effect on the next emission call, last write wins.
///
/// # Examples
///
/// ```
/// use logward::Config;
/// use logward::Level;
///
/// let config = Config::default()
///     .global_tag("demo")
///     .file_switch(true)
///     .file_floor(Level::Info)
///     .save_days(7);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    enabled: bool,
    console: bool,
    file: bool,
    global_tag: String,
    tag_is_derived: bool,
    head: bool,
    border: bool,
    single_tag: bool,
    console_floor: Level,
    file_floor: Level,
    stack_depth: usize,
    stack_offset: usize,
    dir: Option<PathBuf>,
    default_dir: PathBuf,
    file_prefix: String,
    save_days: i32,
    host: Host,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Host::default())
    }
}

impl Config {
    /// Creates a configuration with the original defaults: logging on,
    /// console on, file off, head and border on, single-tag on, both floors
    /// at [`Level::Verbose`], stack depth 1, rotation disabled.
    ///
    /// The default output directory is resolved once here by probing the
    /// host's storage roots.
    pub fn new(host: Host) -> Self {
        let default_dir = host.probe_default_dir();
        Self {
            enabled: true,
            console: true,
            file: false,
            global_tag: String::new(),
            tag_is_derived: true,
            head: true,
            border: true,
            single_tag: true,
            console_floor: Level::Verbose,
            file_floor: Level::Verbose,
            stack_depth: 1,
            stack_offset: 0,
            dir: None,
            default_dir,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            save_days: -1,
            host,
        }
    }

    /// Master switch. When off, every emission call is a no-op.
    #[must_use]
    pub fn switch(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enables or disables the console sink.
    #[must_use]
    pub fn console_switch(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Enables or disables the file sink.
    #[must_use]
    pub fn file_switch(mut self, file: bool) -> Self {
        self.file = file;
        self
    }

    /// Sets the global tag. A blank or whitespace-only tag switches the
    /// logger into derivation mode, where the tag is computed from the
    /// call site instead.
    #[must_use]
    pub fn global_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag.trim().is_empty() {
            self.global_tag = String::new();
            self.tag_is_derived = true;
        } else {
            self.global_tag = tag;
            self.tag_is_derived = false;
        }
        self
    }

    /// Enables or disables call-site head lines.
    #[must_use]
    pub fn head_switch(mut self, head: bool) -> Self {
        self.head = head;
        self
    }

    /// Enables or disables the console border decoration.
    #[must_use]
    pub fn border_switch(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    /// Selects the single-tag buffered console layout instead of the
    /// streaming one.
    #[must_use]
    pub fn single_tag_switch(mut self, single_tag: bool) -> Self {
        self.single_tag = single_tag;
        self
    }

    /// Minimum level accepted by the console sink.
    #[must_use]
    pub fn console_floor(mut self, floor: Level) -> Self {
        self.console_floor = floor;
        self
    }

    /// Minimum level accepted by the file sink.
    #[must_use]
    pub fn file_floor(mut self, floor: Level) -> Self {
        self.file_floor = floor;
        self
    }

    /// Number of call-site frames rendered in the head. Values below 1 are
    /// treated as 1.
    #[must_use]
    pub fn stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = depth;
        self
    }

    /// Number of additional frames to skip before the first rendered frame.
    #[must_use]
    pub fn stack_offset(mut self, offset: usize) -> Self {
        self.stack_offset = offset;
        self
    }

    /// Sets the output directory. A blank or whitespace-only string clears
    /// any override and falls back to the probed default.
    #[must_use]
    pub fn dir(mut self, dir: impl AsRef<str>) -> Self {
        let dir = dir.as_ref();
        self.dir = if dir.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(dir))
        };
        self
    }

    /// Sets the day-file prefix. A blank prefix falls back to
    /// [`DEFAULT_FILE_PREFIX`].
    #[must_use]
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.file_prefix = if prefix.trim().is_empty() {
            DEFAULT_FILE_PREFIX.to_string()
        } else {
            prefix
        };
        self
    }

    /// Number of days a day file is retained. Non-positive values disable
    /// rotation entirely.
    #[must_use]
    pub fn save_days(mut self, days: i32) -> Self {
        self.save_days = days;
        self
    }

    /// Replaces the host facts.
    #[must_use]
    pub fn host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn console_enabled(&self) -> bool {
        self.console
    }

    pub fn file_enabled(&self) -> bool {
        self.file
    }

    pub fn global_tag_str(&self) -> &str {
        &self.global_tag
    }

    pub fn tag_is_derived(&self) -> bool {
        self.tag_is_derived
    }

    pub fn head_enabled(&self) -> bool {
        self.head
    }

    pub fn border_enabled(&self) -> bool {
        self.border
    }

    pub fn single_tag_enabled(&self) -> bool {
        self.single_tag
    }

    pub fn console_floor_level(&self) -> Level {
        self.console_floor
    }

    pub fn file_floor_level(&self) -> Level {
        self.file_floor
    }

    pub fn stack_depth_value(&self) -> usize {
        self.stack_depth
    }

    pub fn stack_offset_value(&self) -> usize {
        self.stack_offset
    }

    /// The effective output directory: the configured override if any,
    /// otherwise the probed default.
    pub fn log_dir(&self) -> &Path {
        self.dir.as_deref().unwrap_or(&self.default_dir)
    }

    pub fn file_prefix_str(&self) -> &str {
        &self.file_prefix
    }

    pub fn save_days_value(&self) -> i32 {
        self.save_days
    }

    pub fn host_ref(&self) -> &Host {
        &self.host
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "switch: {}", self.enabled)?;
        writeln!(f, "console: {}", self.console)?;
        writeln!(f, "file: {}", self.file)?;
        let tag = if self.tag_is_derived {
            "<derived>"
        } else {
            &self.global_tag
        };
        writeln!(f, "tag: {tag}")?;
        writeln!(f, "head: {}", self.head)?;
        writeln!(f, "border: {}", self.border)?;
        writeln!(f, "singleTag: {}", self.single_tag)?;
        writeln!(f, "consoleFloor: {}", self.console_floor)?;
        writeln!(f, "fileFloor: {}", self.file_floor)?;
        writeln!(f, "stackDepth: {}", self.stack_depth)?;
        writeln!(f, "stackOffset: {}", self.stack_offset)?;
        writeln!(f, "dir: {}", self.log_dir().display())?;
        writeln!(f, "filePrefix: {}", self.file_prefix)?;
        write!(f, "saveDays: {}", self.save_days)
    }
}
