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

//! Call-site introspection: resolving frames and deriving tags and head
//! lines from them.

use std::fmt;
use std::path::Path;

use crate::config::Config;

/// One resolved call-stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Module path of the frame, e.g. `app::net::client`.
    pub module: String,
    /// Function name, e.g. `connect`.
    pub function: String,
    /// Source file name without directories, e.g. `client.rs`.
    pub file: String,
    /// 1-based line number, 0 when unknown.
    pub line: u32,
}

impl Frame {
    fn location(&self) -> String {
        if self.module.is_empty() {
            format!("{}({}:{})", self.function, self.file, self.line)
        } else {
            format!("{}::{}({}:{})", self.module, self.function, self.file, self.line)
        }
    }
}

/// Resolves call-stack frames for tag derivation and head lines.
///
/// `skip` is the caller-configured offset past the emission call site; `depth`
/// is the maximum number of frames wanted. An empty result means the offset
/// overshot the stack, and the caller falls back to the shallowest frame with
/// head lines omitted.
pub trait FrameResolver: fmt::Debug + Send + Sync + 'static {
    fn resolve(&self, skip: usize, depth: usize) -> Vec<Frame>;
}

/// The default [`FrameResolver`], backed by native stack unwinding.
///
/// Frames belonging to this crate (and to the unwinder itself) are dropped so
/// that frame zero is the emission call site; the configured skip applies on
/// top of that.
#[derive(Debug, Default)]
pub struct BacktraceResolver;

impl FrameResolver for BacktraceResolver {
    fn resolve(&self, skip: usize, depth: usize) -> Vec<Frame> {
        let wanted = skip + depth.max(1);
        let mut frames = Vec::new();
        let mut past_internals = false;
        backtrace::trace(|frame| {
            let mut resolved = None;
            backtrace::resolve_frame(frame, |symbol| {
                if resolved.is_none() {
                    resolved = symbol_to_frame(
                        symbol.name().map(|name| name.to_string()),
                        symbol.filename(),
                        symbol.lineno(),
                    );
                }
            });
            let Some(frame) = resolved else {
                return true;
            };
            if is_internal(&frame.module) {
                // Still walking our own emission path.
                return !past_internals;
            }
            past_internals = true;
            frames.push(frame);
            frames.len() < wanted
        });
        frames.into_iter().skip(skip).take(depth.max(1)).collect()
    }
}

fn is_internal(module: &str) -> bool {
    module == "logward"
        || module.starts_with("logward::")
        || module.starts_with("backtrace")
        || module.starts_with("log::")
}

fn symbol_to_frame(
    name: Option<String>,
    filename: Option<&Path>,
    lineno: Option<u32>,
) -> Option<Frame> {
    let name = name?;
    let name = strip_hash_suffix(&name);
    let (module, function) = match name.rfind("::") {
        Some(pos) => (name[..pos].to_string(), name[pos + 2..].to_string()),
        None => (String::new(), name.to_string()),
    };
    let file = filename
        .and_then(Path::file_name)
        .map(|file| file.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(Frame {
        module,
        function,
        file,
        line: lineno.unwrap_or(0),
    })
}

// Demangled symbols carry a trailing `::h<16 hex digits>` disambiguator.
fn strip_hash_suffix(name: &str) -> &str {
    if let Some(pos) = name.rfind("::h") {
        let tail = &name[pos + 3..];
        if tail.len() == 16 && tail.bytes().all(|b| b.is_ascii_hexdigit()) {
            return &name[..pos];
        }
    }
    name
}

/// Resolved tag plus head metadata for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagHead {
    /// The tag the event is emitted under.
    pub tag: String,
    /// Console head lines, one per rendered frame. `None` when head
    /// generation is off or the stack was too shallow.
    pub head: Option<Vec<String>>,
    /// Separator between the file line prefix and the body: the bracketed
    /// first head line, or a plain `": "` when no head exists.
    pub file_head: String,
}

const PLAIN_SEPARATOR: &str = ": ";

/// Derives the tag and head lines for the current call.
pub(crate) fn resolve_tag_head(
    config: &Config,
    resolver: &dyn FrameResolver,
    supplied: Option<&str>,
) -> TagHead {
    let supplied = supplied.map(str::trim).filter(|tag| !tag.is_empty());
    let derive_tag = config.tag_is_derived() && supplied.is_none();

    // Nothing needs the stack: tag comes from the call or the global config.
    if !derive_tag && !config.head_enabled() {
        let tag = supplied.unwrap_or(config.global_tag_str()).to_string();
        return TagHead {
            tag,
            head: None,
            file_head: PLAIN_SEPARATOR.to_string(),
        };
    }

    let depth = config.stack_depth_value().max(1);
    let mut frames = resolver.resolve(config.stack_offset_value(), depth);
    let mut head_allowed = config.head_enabled();
    if frames.is_empty() {
        // The configured offset overshot the stack; use the shallowest frame
        // and emit no head lines.
        frames = resolver.resolve(0, 1);
        head_allowed = false;
    }

    let tag = match supplied {
        Some(tag) => tag.to_string(),
        None if derive_tag => frames
            .first()
            .map(|frame| file_stem(&frame.file))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| config.global_tag_str().to_string()),
        None => config.global_tag_str().to_string(),
    };

    let (head, file_head) = match frames.first() {
        Some(first) if head_allowed => {
            let thread = std::thread::current();
            let thread_name = thread.name().unwrap_or("unnamed").to_string();
            let first_line = format!("{thread_name}, {}", first.location());
            let file_head = format!(" [{first_line}]{PLAIN_SEPARATOR}");
            let indent = " ".repeat(thread_name.len() + 2);
            let mut lines = vec![first_line];
            for frame in &frames[1..] {
                lines.push(format!("{indent}{}", frame.location()));
            }
            (Some(lines), file_head)
        }
        _ => (None, PLAIN_SEPARATOR.to_string()),
    };

    TagHead {
        tag,
        head,
        file_head,
    }
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    use super::*;

    #[derive(Debug)]
    struct ManualResolver {
        frames: Vec<Frame>,
    }

    impl ManualResolver {
        fn new(frames: Vec<Frame>) -> Self {
            Self { frames }
        }
    }

    impl FrameResolver for ManualResolver {
        fn resolve(&self, skip: usize, depth: usize) -> Vec<Frame> {
            self.frames
                .iter()
                .skip(skip)
                .take(depth.max(1))
                .cloned()
                .collect()
        }
    }

    fn frame(module: &str, function: &str, file: &str, line: u32) -> Frame {
        Frame {
            module: module.to_string(),
            function: function.to_string(),
            file: file.to_string(),
            line,
        }
    }

    fn sample_frames() -> Vec<Frame> {
        vec![
            frame("app::net", "connect", "client.rs", 42),
            frame("app", "run", "main.rs", 7),
            frame("std::rt", "lang_start", "rt.rs", 1),
        ]
    }

    #[test]
    fn derives_tag_from_call_site_file() {
        let config = Config::default();
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);
        assert_eq!(tag_head.tag, "client");
    }

    #[test]
    fn supplied_tag_wins_over_derivation() {
        let config = Config::default();
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, Some("net"));
        assert_eq!(tag_head.tag, "net");
    }

    #[test]
    fn global_tag_used_when_not_deriving() {
        let config = Config::default().global_tag("app").head_switch(false);
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);
        assert_eq!(tag_head.tag, "app");
        assert_eq!(tag_head.head, None);
        assert_eq!(tag_head.file_head, ": ");
    }

    #[test]
    fn head_lines_cover_configured_depth_with_indentation() {
        let config = Config::default().stack_depth(3);
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);

        let head = tag_head.head.expect("head lines expected");
        assert_eq!(head.len(), 3);
        assert!(head[0].ends_with("app::net::connect(client.rs:42)"));
        let thread_name = std::thread::current().name().unwrap_or("unnamed").len();
        assert!(head[1].starts_with(&" ".repeat(thread_name + 2)));
        assert!(head[1].trim_start().starts_with("app::run"));
        assert!(tag_head.file_head.starts_with(" ["));
        assert!(tag_head.file_head.ends_with("]: "));
    }

    #[test]
    fn depth_clamps_to_available_frames() {
        let config = Config::default().stack_depth(10);
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);
        assert_eq!(tag_head.head.expect("head lines expected").len(), 3);
    }

    #[test]
    fn offset_beyond_stack_falls_back_without_head() {
        let config = Config::default().stack_offset(10);
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);
        assert_eq!(tag_head.tag, "client");
        assert_eq!(tag_head.head, None);
        assert_eq!(tag_head.file_head, ": ");
    }

    #[test]
    fn offset_shifts_first_frame() {
        let config = Config::default().stack_offset(1);
        let resolver = ManualResolver::new(sample_frames());
        let tag_head = resolve_tag_head(&config, &resolver, None);
        assert_eq!(tag_head.tag, "main");
    }

    #[test]
    fn backtrace_resolver_reaches_caller_code() {
        let resolver = BacktraceResolver;
        // Symbol data may be unavailable in stripped builds; the resolver
        // must stay quiet about it rather than panic.
        let frames = resolver.resolve(0, 2);
        assert!(frames.iter().all(|frame| !frame.module.starts_with("logward::")));
    }

    #[test]
    fn hash_suffix_is_stripped() {
        assert_eq!(
            strip_hash_suffix("app::run::h0123456789abcdef"),
            "app::run"
        );
        assert_eq!(strip_hash_suffix("app::run"), "app::run");
        assert_eq!(strip_hash_suffix("app::run::hxyz"), "app::run::hxyz");
    }
}
