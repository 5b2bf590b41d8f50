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

use std::sync::RwLock;
use std::sync::RwLockReadGuard;

use crate::callsite::BacktraceResolver;
use crate::callsite::FrameResolver;
use crate::callsite::resolve_tag_head;
use crate::config::Config;
use crate::console::ConsoleSink;
use crate::file::FileSink;
use crate::format::Mode;
use crate::format::render_body;
use crate::level::Level;
use crate::payload::IntoPayloads;

/// The process logger: gates events, resolves call sites, renders payloads,
/// and fans out to the console and file sinks.
///
/// Console output happens synchronously on the calling thread; file output is
/// handed to one dedicated background writer. Dropping the logger drains that
/// writer.
///
/// # Examples
///
/// ```
/// use logward::Config;
/// use logward::Logger;
///
/// let logger = Logger::new(Config::default().global_tag("demo"));
/// logger.i("service started");
/// logger.w(("retrying", 3));
/// ```
#[derive(Debug)]
pub struct Logger {
    config: RwLock<Config>,
    resolver: Box<dyn FrameResolver>,
    console: ConsoleSink,
    file: FileSink,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Logger {
    /// Creates a logger with the given configuration and the default
    /// backtrace-based frame resolver.
    pub fn new(config: Config) -> Self {
        Self::builder().config(config).build()
    }

    /// Creates a new [`LoggerBuilder`].
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Returns a snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.read_config().clone()
    }

    /// Replaces the configuration. Takes effect on the next emission call;
    /// last write wins.
    pub fn replace_config(&self, config: Config) {
        let mut guard = match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = config;
    }

    /// Rebuilds the configuration through `f`, e.g.
    /// `logger.update_config(|c| c.console_switch(false))`.
    pub fn update_config(&self, f: impl FnOnce(Config) -> Config) {
        let mut guard = match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let updated = f(guard.clone());
        *guard = updated;
    }

    /// Blocks until every file line enqueued so far has been written.
    pub fn flush(&self) {
        self.file.flush();
    }

    fn read_config(&self) -> RwLockReadGuard<'_, Config> {
        match self.config.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The single dispatch entry point behind every emission method.
    ///
    /// Gate order: master switch, then both-sinks-off, then per-sink floors.
    /// Console and file emission are independent; both may fire for one
    /// event. `force_file` routes the event to the file sink even when the
    /// file switch is off, and away from the console.
    pub fn log(
        &self,
        level: Level,
        mode: Mode,
        force_file: bool,
        tag: Option<&str>,
        payloads: impl IntoPayloads,
    ) {
        let config = self.read_config();
        if !config.is_enabled() {
            return;
        }
        if !config.console_enabled() && !config.file_enabled() {
            return;
        }
        let (to_console, to_file) = routes(&config, level, force_file);
        if !to_console && !to_file {
            return;
        }

        let tag_head = resolve_tag_head(&config, self.resolver.as_ref(), tag);
        let body = render_body(mode, &payloads.into_payloads());

        if to_console {
            self.console.print(
                level,
                &tag_head.tag,
                tag_head.head.as_deref(),
                &body,
                config.border_enabled(),
                config.single_tag_enabled(),
            );
        }
        if to_file {
            self.file
                .submit(&config, level, &tag_head.tag, &tag_head.file_head, &body);
        }
    }

    /// Logs at [`Level::Verbose`].
    pub fn v(&self, payloads: impl IntoPayloads) {
        self.log(Level::Verbose, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Verbose`] under an explicit tag.
    pub fn v_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Verbose, Mode::Plain, false, Some(tag), payloads);
    }

    /// Logs at [`Level::Debug`].
    pub fn d(&self, payloads: impl IntoPayloads) {
        self.log(Level::Debug, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Debug`] under an explicit tag.
    pub fn d_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Debug, Mode::Plain, false, Some(tag), payloads);
    }

    /// Logs at [`Level::Info`].
    pub fn i(&self, payloads: impl IntoPayloads) {
        self.log(Level::Info, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Info`] under an explicit tag.
    pub fn i_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Info, Mode::Plain, false, Some(tag), payloads);
    }

    /// Logs at [`Level::Warn`].
    pub fn w(&self, payloads: impl IntoPayloads) {
        self.log(Level::Warn, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Warn`] under an explicit tag.
    pub fn w_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Warn, Mode::Plain, false, Some(tag), payloads);
    }

    /// Logs at [`Level::Error`].
    pub fn e(&self, payloads: impl IntoPayloads) {
        self.log(Level::Error, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Error`] under an explicit tag.
    pub fn e_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Error, Mode::Plain, false, Some(tag), payloads);
    }

    /// Logs at [`Level::Assert`].
    pub fn a(&self, payloads: impl IntoPayloads) {
        self.log(Level::Assert, Mode::Plain, false, None, payloads);
    }

    /// Logs at [`Level::Assert`] under an explicit tag.
    pub fn a_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Assert, Mode::Plain, false, Some(tag), payloads);
    }

    /// Pretty-prints `content` as JSON at [`Level::Debug`].
    pub fn json(&self, content: impl Into<String>) {
        self.log(Level::Debug, Mode::Json, false, None, content.into());
    }

    /// Pretty-prints `content` as JSON at the given level.
    pub fn json_at(&self, level: Level, content: impl Into<String>) {
        self.log(level, Mode::Json, false, None, content.into());
    }

    /// Pretty-prints `content` as JSON under an explicit tag.
    pub fn json_tag(&self, tag: &str, content: impl Into<String>) {
        self.log(Level::Debug, Mode::Json, false, Some(tag), content.into());
    }

    /// Pretty-prints `content` as XML at [`Level::Debug`].
    pub fn xml(&self, content: impl Into<String>) {
        self.log(Level::Debug, Mode::Xml, false, None, content.into());
    }

    /// Pretty-prints `content` as XML at the given level.
    pub fn xml_at(&self, level: Level, content: impl Into<String>) {
        self.log(level, Mode::Xml, false, None, content.into());
    }

    /// Pretty-prints `content` as XML under an explicit tag.
    pub fn xml_tag(&self, tag: &str, content: impl Into<String>) {
        self.log(Level::Debug, Mode::Xml, false, Some(tag), content.into());
    }

    /// Writes to the day file only, at [`Level::Debug`], even when the file
    /// switch is off.
    pub fn file(&self, payloads: impl IntoPayloads) {
        self.log(Level::Debug, Mode::Plain, true, None, payloads);
    }

    /// Writes to the day file only, at the given level.
    pub fn file_at(&self, level: Level, payloads: impl IntoPayloads) {
        self.log(level, Mode::Plain, true, None, payloads);
    }

    /// Writes to the day file only, under an explicit tag.
    pub fn file_tag(&self, tag: &str, payloads: impl IntoPayloads) {
        self.log(Level::Debug, Mode::Plain, true, Some(tag), payloads);
    }
}

// Per-sink routing for one event, after the master and both-sinks-off gates.
// A forced-file event goes to the file sink even with the file switch off,
// and never to the console.
fn routes(config: &Config, level: Level, force_file: bool) -> (bool, bool) {
    let to_console =
        config.console_enabled() && level >= config.console_floor_level() && !force_file;
    let to_file = (config.file_enabled() || force_file) && level >= config.file_floor_level();
    (to_console, to_file)
}

/// A builder for configuring [`Logger`].
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
    resolver: Box<dyn FrameResolver>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            resolver: Box::new(BacktraceResolver),
        }
    }

    /// Sets the initial configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the frame resolver used for tag and head derivation.
    #[must_use]
    pub fn resolver(mut self, resolver: impl FrameResolver) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Builds the [`Logger`], spawning its file writer thread.
    pub fn build(self) -> Logger {
        Logger {
            config: RwLock::new(self.config),
            resolver: self.resolver,
            console: ConsoleSink,
            file: FileSink::new(),
        }
    }
}
