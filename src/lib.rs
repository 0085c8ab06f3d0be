//! Decode-only codec for the JSON trace record format.
//!
//! This crate turns self-describing JSON trace records (spans,
//! annotations, typed key/value tags, endpoints, and service dependency
//! edges) into compact in-memory values suitable for storage and
//! querying in a tracing backend. It is strictly one-directional:
//! encoding duties belong to a separate, round-trippable representation
//! elsewhere, and the encode direction of every codec fails with
//! [`DecodeError::UnsupportedOperation`].
//!
//! # Wire format
//!
//! Each record is a single JSON object. Trace and span identifiers are
//! lower-hex text: 16 characters for a 64-bit id, 32 for a 128-bit
//! trace id (high word first). Tag values arrive as JSON booleans,
//! strings, or numbers, optionally accompanied by an explicit `type`
//! field, and are normalized into a uniform byte-buffer layout:
//!
//! | type   | value bytes                                  |
//! |--------|----------------------------------------------|
//! | BOOL   | 1 byte, `0x01` or `0x00`                     |
//! | STRING | UTF-8, unmodified                            |
//! | BYTES  | base64-decoded raw bytes                     |
//! | I16    | 2 bytes, big-endian two's-complement         |
//! | I32    | 4 bytes, big-endian two's-complement         |
//! | I64    | 8 bytes, big-endian two's-complement         |
//! | DOUBLE | 8 bytes, big-endian IEEE-754 bit pattern     |
//!
//! Unrecognized object keys are skipped, so schema additions do not
//! break decoding; known-but-malformed fields are strict failures.
//!
//! # Usage
//!
//! ```
//! use tracejson::decode_span;
//!
//! let json = r#"{
//!   "traceId": "48485a3953bb6124",
//!   "name": "get",
//!   "id": "6b221d5bc9e6496c",
//!   "timestamp": 1472470996199000,
//!   "binaryAnnotations": [
//!     {"key": "http.path", "value": "/api",
//!      "endpoint": {"serviceName": "frontend"}}
//!   ]
//! }"#;
//!
//! let span = decode_span(json).unwrap();
//! assert_eq!(span.name, "get");
//! assert_eq!(span.binary_annotations[0].value, b"/api".to_vec());
//! ```

pub mod types;
mod codec;
mod hex;
mod reader;

pub use codec::{
    decode_dependency_links, decode_span, decode_spans, encode_value, AnnotationCodec,
    BinaryAnnotationCodec, DependencyLinkCodec, EndpointCodec, JsonCodec, SpanCodec,
};
pub use hex::{parse_id, parse_id128};
pub use reader::{JsonReader, Token};
pub use types::{
    Annotation, AnnotationType, BinaryAnnotation, DecodeError, DependencyLink, Endpoint, Span,
};
