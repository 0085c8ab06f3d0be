use crate::reader::Token;

// === Error types ===

/// Errors that can occur while decoding trace records.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A trace or span identifier is not valid lower-hex, or has an
    /// unsupported length.
    #[error("malformed identifier: {0:?}")]
    MalformedId(String),

    /// A tag carried a bare numeric value and no explicit type, so the
    /// value bytes cannot be resolved.
    #[error("tag {0:?} has a numeric value but no explicit type")]
    AmbiguousValueType(String),

    #[error("expected value to be a boolean, string or number but was {0:?}")]
    UnsupportedValueKind(Token),

    #[error("unknown annotation type: {0:?}")]
    UnknownAnnotationType(String),

    /// A required field was absent when the enclosing object ended.
    #[error("required field {0:?} was not set")]
    MissingField(&'static str),

    /// The encode direction was invoked on this decode-only codec.
    #[error("encoding back to JSON is not supported")]
    UnsupportedOperation,

    #[error("malformed number literal: {0:?}")]
    MalformedNumber(String),

    #[error("malformed address literal: {0:?}")]
    MalformedAddress(String),

    #[error("invalid base64 in BYTES value: {0}")]
    MalformedBase64(#[from] base64::DecodeError),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character at offset {offset}")]
    Syntax { offset: usize },
}

// === Endpoint ===

/// The network identity of the service that recorded an annotation or tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub service_name: String,
    /// Four octets packed big-endian, `0` when absent.
    pub ipv4: u32,
    /// 16-byte network-order address, if one was recorded.
    pub ipv6: Option<[u8; 16]>,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct EndpointBuilder {
    service_name: Option<String>,
    ipv4: u32,
    ipv6: Option<[u8; 16]>,
    port: Option<u16>,
}

impl EndpointBuilder {
    pub fn service_name(mut self, service_name: String) -> Self {
        self.service_name = Some(service_name);
        self
    }

    pub fn ipv4(mut self, ipv4: u32) -> Self {
        self.ipv4 = ipv4;
        self
    }

    pub fn ipv6(mut self, ipv6: [u8; 16]) -> Self {
        self.ipv6 = Some(ipv6);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn build(self) -> Result<Endpoint, DecodeError> {
        Ok(Endpoint {
            service_name: self
                .service_name
                .ok_or(DecodeError::MissingField("serviceName"))?,
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            port: self.port,
        })
    }
}

// === Annotation ===

/// A timestamped event string attached to a span.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    pub value: String,
    pub endpoint: Option<Endpoint>,
}

impl Annotation {
    pub fn builder() -> AnnotationBuilder {
        AnnotationBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct AnnotationBuilder {
    timestamp: Option<i64>,
    value: Option<String>,
    endpoint: Option<Endpoint>,
}

impl AnnotationBuilder {
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn value(mut self, value: String) -> Self {
        self.value = Some(value);
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn build(self) -> Result<Annotation, DecodeError> {
        Ok(Annotation {
            timestamp: self
                .timestamp
                .ok_or(DecodeError::MissingField("timestamp"))?,
            value: self.value.ok_or(DecodeError::MissingField("value"))?,
            endpoint: self.endpoint,
        })
    }
}

// === Binary annotation (tag) ===

/// The value type of a binary annotation.
///
/// Determines the length and byte layout of [`BinaryAnnotation::value`]:
/// 1 byte for `Bool`, 2/4/8 big-endian bytes for `I16`/`I32`/`I64`,
/// 8 bytes for `Double` (IEEE-754 bit pattern), and a variable number
/// of bytes for `String` (UTF-8) and `Bytes` (raw).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationType {
    Bool,
    String,
    Bytes,
    I16,
    I32,
    I64,
    Double,
}

impl Default for AnnotationType {
    /// The wire default when a tag omits an explicit `type` field.
    fn default() -> Self {
        Self::String
    }
}

impl AnnotationType {
    /// Parse from the wire format type name. Names are case-sensitive.
    pub fn from_wire_name(name: &str) -> Result<Self, DecodeError> {
        match name {
            "BOOL" => Ok(Self::Bool),
            "STRING" => Ok(Self::String),
            "BYTES" => Ok(Self::Bytes),
            "I16" => Ok(Self::I16),
            "I32" => Ok(Self::I32),
            "I64" => Ok(Self::I64),
            "DOUBLE" => Ok(Self::Double),
            other => Err(DecodeError::UnknownAnnotationType(other.to_string())),
        }
    }
}

/// A typed key/value attribute attached to a span.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryAnnotation {
    pub key: String,
    pub annotation_type: AnnotationType,
    /// Byte layout is dictated by `annotation_type`.
    pub value: Vec<u8>,
    pub endpoint: Option<Endpoint>,
}

impl BinaryAnnotation {
    pub fn builder() -> BinaryAnnotationBuilder {
        BinaryAnnotationBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct BinaryAnnotationBuilder {
    key: Option<String>,
    annotation_type: AnnotationType,
    value: Option<Vec<u8>>,
    endpoint: Option<Endpoint>,
}

impl BinaryAnnotationBuilder {
    pub fn key(mut self, key: String) -> Self {
        self.key = Some(key);
        self
    }

    pub fn annotation_type(mut self, annotation_type: AnnotationType) -> Self {
        self.annotation_type = annotation_type;
        self
    }

    pub fn value(mut self, value: Vec<u8>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn build(self) -> Result<BinaryAnnotation, DecodeError> {
        Ok(BinaryAnnotation {
            key: self.key.ok_or(DecodeError::MissingField("key"))?,
            annotation_type: self.annotation_type,
            value: self.value.ok_or(DecodeError::MissingField("value"))?,
            endpoint: self.endpoint,
        })
    }
}

// === Span ===

/// One timed operation in a distributed trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Low 64 bits of the trace identifier.
    pub trace_id: u64,
    /// High 64 bits, present only when the source identifier was 128-bit.
    pub trace_id_high: Option<u64>,
    pub id: u64,
    pub parent_id: Option<u64>,
    pub name: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    /// Microseconds.
    pub duration: Option<i64>,
    /// In source array order.
    pub annotations: Vec<Annotation>,
    /// In source array order.
    pub binary_annotations: Vec<BinaryAnnotation>,
    pub debug: Option<bool>,
}

impl Span {
    pub fn builder() -> SpanBuilder {
        SpanBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct SpanBuilder {
    trace_id: Option<u64>,
    trace_id_high: Option<u64>,
    id: Option<u64>,
    parent_id: Option<u64>,
    name: Option<String>,
    timestamp: Option<i64>,
    duration: Option<i64>,
    annotations: Vec<Annotation>,
    binary_annotations: Vec<BinaryAnnotation>,
    debug: Option<bool>,
}

impl SpanBuilder {
    pub fn trace_id(mut self, trace_id: u64) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn trace_id_high(mut self, trace_id_high: u64) -> Self {
        self.trace_id_high = Some(trace_id_high);
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn parent_id(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn add_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn add_binary_annotation(mut self, binary_annotation: BinaryAnnotation) -> Self {
        self.binary_annotations.push(binary_annotation);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn build(self) -> Result<Span, DecodeError> {
        Ok(Span {
            trace_id: self.trace_id.ok_or(DecodeError::MissingField("traceId"))?,
            trace_id_high: self.trace_id_high,
            id: self.id.ok_or(DecodeError::MissingField("id"))?,
            parent_id: self.parent_id,
            name: self.name.ok_or(DecodeError::MissingField("name"))?,
            timestamp: self.timestamp,
            duration: self.duration,
            annotations: self.annotations,
            binary_annotations: self.binary_annotations,
            debug: self.debug,
        })
    }
}

// === Dependency link ===

/// An aggregated edge recording that one service called another.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyLink {
    pub parent: String,
    pub child: String,
    pub call_count: i64,
}

impl DependencyLink {
    pub fn builder() -> DependencyLinkBuilder {
        DependencyLinkBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct DependencyLinkBuilder {
    parent: Option<String>,
    child: Option<String>,
    call_count: Option<i64>,
}

impl DependencyLinkBuilder {
    pub fn parent(mut self, parent: String) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn child(mut self, child: String) -> Self {
        self.child = Some(child);
        self
    }

    pub fn call_count(mut self, call_count: i64) -> Self {
        self.call_count = Some(call_count);
        self
    }

    pub fn build(self) -> Result<DependencyLink, DecodeError> {
        Ok(DependencyLink {
            parent: self.parent.ok_or(DecodeError::MissingField("parent"))?,
            child: self.child.ok_or(DecodeError::MissingField("child"))?,
            call_count: self
                .call_count
                .ok_or(DecodeError::MissingField("callCount"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_type_wire_names() {
        assert_eq!(
            AnnotationType::from_wire_name("BOOL").unwrap(),
            AnnotationType::Bool
        );
        assert_eq!(
            AnnotationType::from_wire_name("DOUBLE").unwrap(),
            AnnotationType::Double
        );
        // Matching is case-sensitive.
        let err = AnnotationType::from_wire_name("bool").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownAnnotationType(name) if name == "bool"));
    }

    #[test]
    fn test_span_builder_requires_trace_id_name_and_id() {
        let err = Span::builder().name("get".to_string()).id(1).build();
        assert!(matches!(err, Err(DecodeError::MissingField("traceId"))));

        let err = Span::builder().trace_id(1).id(1).build();
        assert!(matches!(err, Err(DecodeError::MissingField("name"))));

        let err = Span::builder().trace_id(1).name("get".to_string()).build();
        assert!(matches!(err, Err(DecodeError::MissingField("id"))));
    }

    #[test]
    fn test_endpoint_builder_requires_service_name() {
        let err = Endpoint::builder().ipv4(0x01020304).build();
        assert!(matches!(err, Err(DecodeError::MissingField("serviceName"))));
    }
}
