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

//! Payload values accepted by emission calls.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::io;

use serde::Serialize;
use serde_json::Value;

/// A log payload.
///
/// Emission calls accept one or many payloads. Instead of dispatching on an
/// arbitrary runtime shape, callers construct one of these closed variants —
/// usually implicitly through the `From` conversions, or through
/// [`Payload::capture`] for any `Serialize` value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Nothing. Renders as the literal `null` placeholder.
    Null,
    /// Raw text. The only variant affected by the JSON/XML rendering modes.
    Text(String),
    /// Key-value pairs, rendered structurally as `{ key = value, ... }`.
    Structured(BTreeMap<String, Payload>),
    /// An ordered collection, rendered with its element count.
    Sequence(Vec<Payload>),
    /// A byte array, rendered element-wise as `[1, 2, 3]`.
    Raw(Vec<u8>),
    /// An error with its cause chain.
    Error(ErrorChain),
}

impl Payload {
    /// Captures any `Serialize` value as a payload by enumerating its fields.
    ///
    /// Maps and structs become [`Payload::Structured`], arrays and tuples
    /// become [`Payload::Sequence`], scalars become [`Payload::Text`]. If the
    /// value cannot be serialized, the serializer's error text is captured
    /// instead of failing the log call.
    pub fn capture<T: Serialize>(value: &T) -> Payload {
        match serde_json::to_value(value) {
            Ok(value) => Payload::from(value),
            Err(err) => Payload::Text(err.to_string()),
        }
    }

    /// Captures a value through its `Debug` rendering.
    pub fn from_debug<T: fmt::Debug>(value: &T) -> Payload {
        Payload::Text(format!("{value:?}"))
    }

    /// Captures an error and its cause chain.
    pub fn error(error: &(dyn Error + 'static)) -> Payload {
        Payload::Error(ErrorChain::new(error))
    }

    /// Builds a [`Payload::Sequence`] from any iterable of payload-able
    /// items.
    pub fn seq<I, P>(items: I) -> Payload
    where
        I: IntoIterator<Item = P>,
        P: Into<Payload>,
    {
        Payload::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Text(b.to_string()),
            Value::Number(n) => Payload::Text(n.to_string()),
            Value::String(s) => Payload::Text(s),
            Value::Array(items) => {
                Payload::Sequence(items.into_iter().map(Payload::from).collect())
            }
            Value::Object(map) => Payload::Structured(
                map.into_iter()
                    .map(|(key, value)| (key, Payload::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<ErrorChain> for Payload {
    fn from(chain: ErrorChain) -> Self {
        Payload::Error(chain)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Raw(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Raw(bytes.to_vec())
    }
}

/// An error message with its flattened cause chain.
///
/// Host-unreachable I/O errors anywhere in the chain are remembered so the
/// formatter can suppress them entirely; transient connectivity failures
/// otherwise drown a log in noise.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorChain {
    message: String,
    causes: Vec<String>,
    host_unreachable: bool,
}

impl ErrorChain {
    /// Walks the `source` chain of `error` and records each cause message.
    pub fn new(error: &(dyn Error + 'static)) -> Self {
        let mut host_unreachable = is_host_unreachable(error);
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            host_unreachable |= is_host_unreachable(cause);
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            causes,
            host_unreachable,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Whether any error in the chain is a host-unreachable class of
    /// I/O failure.
    pub fn is_host_unreachable(&self) -> bool {
        self.host_unreachable
    }
}

fn is_host_unreachable(error: &(dyn Error + 'static)) -> bool {
    error.downcast_ref::<io::Error>().is_some_and(|err| {
        matches!(
            err.kind(),
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable
        )
    })
}

/// One-or-many payloads for a single emission call.
///
/// Implemented for single payload-able values and for tuples of them, so
/// `logger.d("a")` and `logger.d(("a", "b"))` both work.
pub trait IntoPayloads {
    fn into_payloads(self) -> Vec<Payload>;
}

impl IntoPayloads for Payload {
    fn into_payloads(self) -> Vec<Payload> {
        vec![self]
    }
}

impl IntoPayloads for Vec<Payload> {
    fn into_payloads(self) -> Vec<Payload> {
        self
    }
}

macro_rules! single_payload {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<$ty> for Payload {
            fn from(value: $ty) -> Self {
                Payload::Text(value.to_string())
            }
        }

        impl IntoPayloads for $ty {
            fn into_payloads(self) -> Vec<Payload> {
                vec![self.into()]
            }
        }
    )+};
}

single_payload!(&str, String, bool, char, i32, i64, u32, u64, f32, f64);

impl IntoPayloads for ErrorChain {
    fn into_payloads(self) -> Vec<Payload> {
        vec![Payload::Error(self)]
    }
}

impl IntoPayloads for Value {
    fn into_payloads(self) -> Vec<Payload> {
        vec![self.into()]
    }
}

macro_rules! tuple_payloads {
    ($($name:ident),+) => {
        impl<$($name: Into<Payload>),+> IntoPayloads for ($($name,)+) {
            fn into_payloads(self) -> Vec<Payload> {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_payloads!(A);
tuple_payloads!(A, B);
tuple_payloads!(A, B, C);
tuple_payloads!(A, B, C, D);
tuple_payloads!(A, B, C, D, E);
tuple_payloads!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Session {
        user: String,
        attempts: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct RequestError {
        #[source]
        inner: io::Error,
    }

    #[test]
    fn capture_enumerates_struct_fields() {
        let session = Session {
            user: "ada".to_string(),
            attempts: 3,
        };
        let Payload::Structured(map) = Payload::capture(&session) else {
            panic!("expected a structured payload");
        };
        assert_eq!(map["user"], Payload::Text("ada".to_string()));
        assert_eq!(map["attempts"], Payload::Text("3".to_string()));
    }

    #[test]
    fn capture_maps_arrays_to_sequences() {
        let payload = Payload::capture(&vec![1, 2, 3]);
        assert_eq!(
            payload,
            Payload::Sequence(vec![
                Payload::Text("1".to_string()),
                Payload::Text("2".to_string()),
                Payload::Text("3".to_string()),
            ])
        );
    }

    #[derive(Debug)]
    struct Handle {
        fd: i32,
    }

    #[test]
    fn from_debug_captures_non_serialize_values() {
        let payload = Payload::from_debug(&Handle { fd: 7 });
        assert_eq!(payload, Payload::Text("Handle { fd: 7 }".to_string()));
    }

    #[test]
    fn error_chain_collects_causes() {
        let outer = RequestError {
            inner: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        let chain = ErrorChain::new(&outer);
        assert!(!chain.is_host_unreachable());
        assert_eq!(chain.message(), "request failed");
        assert_eq!(chain.causes().len(), 1);
        assert!(chain.causes()[0].contains("refused"));
    }

    #[test]
    fn host_unreachable_detected_anywhere_in_chain() {
        let outer = RequestError {
            inner: io::Error::new(io::ErrorKind::HostUnreachable, "no route"),
        };
        assert!(ErrorChain::new(&outer).is_host_unreachable());

        let direct = io::Error::new(io::ErrorKind::NetworkUnreachable, "down");
        assert!(ErrorChain::new(&direct).is_host_unreachable());
    }

    #[test]
    fn tuples_expand_to_many_payloads() {
        let payloads = ("a", 1i32).into_payloads();
        assert_eq!(
            payloads,
            vec![
                Payload::Text("a".to_string()),
                Payload::Text("1".to_string()),
            ]
        );
    }
}
