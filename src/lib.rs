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

//! Logward is a structured logging core: it gates arbitrary application
//! events, renders heterogeneous payloads (text, JSON, XML, maps,
//! collections, error chains) into readable text, prints them in a bordered
//! console layout, and persists a subset to rotating, date-partitioned files
//! without blocking callers.
//!
//! # Overview
//!
//! A [`Logger`] is constructed from an explicit [`Config`] and fans each
//! event out to the console sink (synchronously) and the file sink (through
//! one dedicated background writer). Tags default to the call-site file name,
//! derived through a pluggable [`FrameResolver`].
//!
//! # Examples
//!
//! Console logging with derived tags:
//!
//! ```
//! use logward::Config;
//! use logward::Logger;
//!
//! let logger = Logger::new(Config::default());
//! logger.i("service started");
//! logger.d(("attempt", 3, "backoff_ms", 250));
//! ```
//!
//! Day files with a seven-day retention:
//!
//! ```no_run
//! use logward::Config;
//! use logward::Level;
//! use logward::Logger;
//!
//! let config = Config::default()
//!     .file_switch(true)
//!     .dir("/var/log/demo")
//!     .file_prefix("demo")
//!     .file_floor(Level::Info)
//!     .save_days(7);
//! let logger = Logger::new(config);
//! logger.i("persisted and printed");
//! logger.file("persisted only");
//! logger.flush();
//! ```

pub mod bridge;
mod callsite;
mod config;
mod console;
mod error;
mod file;
mod format;
mod level;
mod logger;
mod payload;

pub use callsite::BacktraceResolver;
pub use callsite::Frame;
pub use callsite::FrameResolver;
pub use config::Config;
pub use config::DEFAULT_FILE_PREFIX;
pub use config::Host;
pub use error::SetupError;
pub use format::Mode;
pub use level::Level;
pub use level::ParseLevelError;
pub use logger::Logger;
pub use logger::LoggerBuilder;
pub use payload::ErrorChain;
pub use payload::IntoPayloads;
pub use payload::Payload;
