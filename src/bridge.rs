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

//! Bridge from the `log` crate: `log::info!` and friends flow into a
//! [`Logger`].

use std::sync::Arc;

use crate::Logger;
use crate::error::SetupError;
use crate::format::Mode;
use crate::level::Level;

struct LogCrateBridge {
    logger: Arc<Logger>,
}

fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Trace => Level::Verbose,
        log::Level::Debug => Level::Debug,
        log::Level::Info => Level::Info,
        log::Level::Warn => Level::Warn,
        log::Level::Error => Level::Error,
    }
}

impl log::Log for LogCrateBridge {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let level = map_level(record.level());
        let tag = record.target();
        let tag = (!tag.is_empty()).then_some(tag);
        self.logger
            .log(level, Mode::Plain, false, tag, record.args().to_string());
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

/// Installs `logger` as the `log` crate's global logger.
///
/// All records emitted through `log` macros are forwarded with their target
/// as the tag and `Trace` mapped to [`Level::Verbose`]. The global maximum
/// level is raised to `Trace`; gating stays with the logger's own config.
///
/// # Errors
///
/// Returns an error if a global logger has already been installed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logward::Config;
/// use logward::Logger;
///
/// let logger = Arc::new(Logger::new(Config::default()));
/// logward::bridge::install(logger).unwrap();
///
/// log::info!("routed through logward");
/// ```
pub fn install(logger: Arc<Logger>) -> Result<(), SetupError> {
    log::set_boxed_logger(Box::new(LogCrateBridge { logger }))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
