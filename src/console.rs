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

//! The console sink: bordered or single-tag buffered rendering to the
//! standard streams.

use std::io::Write;

use crate::level::Level;

const TOP_CORNER: &str = "┌";
const MIDDLE_CORNER: &str = "├";
const LEFT_BORDER: &str = "│ ";
const BOTTOM_CORNER: &str = "└";
const SIDE_DIVIDER: &str = "────────────────────────────────────────────────────────";
const MIDDLE_DIVIDER: &str = "┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄";
const PLACEHOLDER: &str = " ";

/// Longest physical line (in bytes) written in one piece; longer bodies are
/// split into consecutive chunks of at most this width.
pub(crate) const MAX_LEN: usize = 3000;

fn top_border() -> String {
    format!("{TOP_CORNER}{SIDE_DIVIDER}{SIDE_DIVIDER}")
}

fn middle_border() -> String {
    format!("{MIDDLE_CORNER}{MIDDLE_DIVIDER}{MIDDLE_DIVIDER}")
}

fn bottom_border() -> String {
    format!("{BOTTOM_CORNER}{SIDE_DIVIDER}{SIDE_DIVIDER}")
}

/// Writes rendered events to stdout/stderr. Writes are best-effort and never
/// fail the log call.
#[derive(Debug, Default)]
pub(crate) struct ConsoleSink;

impl ConsoleSink {
    pub(crate) fn print(
        &self,
        level: Level,
        tag: &str,
        head: Option<&[String]>,
        body: &str,
        border: bool,
        single_tag: bool,
    ) {
        if single_tag {
            for chunk in buffered_chunks(head, body, border, MAX_LEN) {
                println(level, tag, &chunk);
            }
        } else {
            for line in bordered_lines(head, body, border, MAX_LEN) {
                println(level, tag, &line);
            }
        }
    }
}

// Error and Assert go to stderr, everything else to stdout.
fn println(level: Level, tag: &str, msg: &str) {
    let glyph = level.glyph();
    match level {
        Level::Error | Level::Assert => {
            let stderr = std::io::stderr();
            let _ = writeln!(stderr.lock(), "{glyph}/{tag}: {msg}");
        }
        _ => {
            let stdout = std::io::stdout();
            let _ = writeln!(stdout.lock(), "{glyph}/{tag}: {msg}");
        }
    }
}

/// Streaming layout: border, head lines, divider, width-split body lines,
/// border. Each returned string is one physical console line.
pub(crate) fn bordered_lines(
    head: Option<&[String]>,
    body: &str,
    border: bool,
    width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    if border {
        lines.push(top_border());
    }
    if let Some(head) = head {
        for head_line in head {
            if border {
                lines.push(format!("{LEFT_BORDER}{head_line}"));
            } else {
                lines.push(head_line.clone());
            }
        }
        if border {
            lines.push(middle_border());
        }
    }
    for raw_line in body.lines() {
        for chunk in split_width(raw_line, width) {
            if border {
                lines.push(format!("{LEFT_BORDER}{chunk}"));
            } else {
                lines.push(chunk.to_string());
            }
        }
    }
    if border {
        lines.push(bottom_border());
    }
    lines
}

/// Buffered layout: the whole event is pre-assembled into one multi-line
/// string, then chunked at `width` characters. Borders are re-emitted at
/// every chunk boundary so each physical write is visually self-contained.
pub(crate) fn buffered_chunks(
    head: Option<&[String]>,
    body: &str,
    border: bool,
    width: usize,
) -> Vec<String> {
    let mut msg = String::new();
    msg.push_str(PLACEHOLDER);
    msg.push('\n');
    if border {
        msg.push_str(&top_border());
        msg.push('\n');
        if let Some(head) = head {
            for head_line in head {
                msg.push_str(LEFT_BORDER);
                msg.push_str(head_line);
                msg.push('\n');
            }
            msg.push_str(&middle_border());
            msg.push('\n');
        }
        for line in body.lines() {
            msg.push_str(LEFT_BORDER);
            msg.push_str(line);
            msg.push('\n');
        }
        msg.push_str(&bottom_border());
    } else {
        if let Some(head) = head {
            for head_line in head {
                msg.push_str(head_line);
                msg.push('\n');
            }
        }
        msg.push_str(body);
    }

    let pieces = split_width(&msg, width);
    if pieces.len() <= 1 {
        return vec![msg];
    }

    let mut chunks = Vec::with_capacity(pieces.len());
    for (i, piece) in pieces.iter().enumerate() {
        if border {
            if i == 0 {
                chunks.push(format!("{piece}\n{}", bottom_border()));
            } else {
                chunks.push(format!(
                    "{PLACEHOLDER}\n{}\n{LEFT_BORDER}{piece}\n{}",
                    top_border(),
                    bottom_border()
                ));
            }
        } else if i == 0 {
            chunks.push(piece.to_string());
        } else {
            chunks.push(format!("{PLACEHOLDER}\n{piece}"));
        }
    }
    chunks
}

/// Splits `line` into consecutive chunks of `width` bytes (backing off to
/// the nearest character boundary), the remainder last. An empty line yields
/// one empty chunk so blank lines survive the round trip.
pub(crate) fn split_width(line: &str, width: usize) -> Vec<&str> {
    if line.len() <= width {
        return vec![line];
    }
    let mut chunks = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let mut end = width.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // The width is narrower than the first character; emit it whole
            // rather than stall.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}
