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

//! Pure rendering of payloads into the text body of a log event.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use serde::Serialize;

use crate::payload::Payload;

/// Rendering mode of an emission call.
///
/// Only textual payloads are affected: JSON and XML modes try to pretty-print
/// the text and degrade to the raw input when it does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Plain,
    Json,
    Xml,
}

/// Placeholder for a null payload.
pub(crate) const NULL: &str = "null";
/// Placeholder for an event whose rendered body came out empty.
pub(crate) const NOTHING: &str = "log nothing";

const JSON_INDENT: &[u8] = b"    ";
const XML_INDENT_WIDTH: usize = 4;

/// Renders the payloads of one emission call into the event body.
///
/// A single payload renders unlabeled; multiple payloads render one per line
/// as `args[i] = ...`. An empty result is replaced with the
/// `log nothing` placeholder.
pub(crate) fn render_body(mode: Mode, payloads: &[Payload]) -> String {
    let body = match payloads {
        [] => NULL.to_string(),
        [payload] => render_payload(mode, payload),
        many => {
            let mut body = String::new();
            for (i, payload) in many.iter().enumerate() {
                body.push_str("args[");
                body.push_str(&i.to_string());
                body.push_str("] = ");
                body.push_str(&render_payload(mode, payload));
                body.push('\n');
            }
            body
        }
    };
    if body.is_empty() {
        NOTHING.to_string()
    } else {
        body
    }
}

fn render_payload(mode: Mode, payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => match mode {
            Mode::Plain => text.clone(),
            Mode::Json => format_json(text),
            Mode::Xml => format_xml(text),
        },
        other => render_plain(other),
    }
}

fn render_plain(payload: &Payload) -> String {
    match payload {
        Payload::Null => NULL.to_string(),
        Payload::Text(text) => text.clone(),
        Payload::Structured(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let fields: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{key} = {}", render_plain(value)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
        Payload::Sequence(items) => {
            let elements: Vec<String> = items.iter().map(render_plain).collect();
            format!(
                "{{ size = {}, data = [{}] }}",
                items.len(),
                elements.join(", ")
            )
        }
        Payload::Raw(bytes) => {
            let elements: Vec<String> = bytes.iter().map(u8::to_string).collect();
            format!("[{}]", elements.join(", "))
        }
        Payload::Error(chain) => {
            // Transient connectivity noise is dropped on the floor.
            if chain.is_host_unreachable() {
                return String::new();
            }
            let mut text = chain.message().to_string();
            for cause in chain.causes() {
                text.push_str("\nCaused by: ");
                text.push_str(cause);
            }
            text
        }
    }
}

/// Pretty-prints a JSON object or array with a four-space indent. Anything
/// that does not parse comes back unchanged.
pub(crate) fn format_json(text: &str) -> String {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return text.to_string();
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return text.to_string();
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return text.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| text.to_string())
}

/// Re-indents an XML document through an event round-trip. Anything that does
/// not parse comes back unchanged.
pub(crate) fn format_xml(text: &str) -> String {
    if !text.trim_start().starts_with('<') {
        return text.to_string();
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT_WIDTH);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => {
                if writer.write_event(event).is_err() {
                    return text.to_string();
                }
            }
            Err(_) => return text.to_string(),
        }
    }
    match String::from_utf8(writer.into_inner()) {
        Ok(pretty) if !pretty.is_empty() => pretty,
        _ => text.to_string(),
    }
}
