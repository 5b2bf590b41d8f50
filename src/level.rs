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
use std::str::FromStr;

/// Severity of a log event.
///
/// Levels are totally ordered: `Verbose < Debug < Info < Warn < Error < Assert`.
/// A sink accepts an event when its level is at or above the sink's configured
/// floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl Level {
    /// The single-character marker used in file lines, e.g. the `D` in
    /// `14:02:59 D/MainLoop: ...`.
    pub fn glyph(self) -> char {
        match self {
            Level::Verbose => 'V',
            Level::Debug => 'D',
            Level::Info => 'I',
            Level::Warn => 'W',
            Level::Error => 'E',
            Level::Assert => 'A',
        }
    }

    /// The uppercase level name.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Verbose => "VERBOSE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Assert => "ASSERT",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when parsing a [`Level`] from a string fails.
#[derive(Debug, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "v" => Ok(Level::Verbose),
            "debug" | "d" => Ok(Level::Debug),
            "info" | "i" => Ok(Level::Info),
            "warn" | "warning" | "w" => Ok(Level::Warn),
            "error" | "e" => Ok(Level::Error),
            "assert" | "a" => Ok(Level::Assert),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
