use base64::{engine::general_purpose, Engine as _};

use crate::hex::{parse_id, parse_id128};
use crate::reader::{JsonReader, Token};
use crate::types::{
    Annotation, AnnotationType, BinaryAnnotation, DecodeError, DependencyLink, Endpoint, Span,
};

const BASE64: general_purpose::GeneralPurpose = general_purpose::STANDARD;

/// A one-directional JSON codec for a single entity type.
///
/// Only the decode direction is implemented. Encoding duties belong to
/// a separate, fully round-trippable representation elsewhere, so
/// [`JsonCodec::write`] fails with [`DecodeError::UnsupportedOperation`]
/// for every codec.
pub trait JsonCodec {
    type Value;

    /// Decode a single value from a reader positioned at its start.
    fn read(&self, r: &mut JsonReader) -> Result<Self::Value, DecodeError>;

    /// Decode a value that may be JSON `null`; `null` yields `None`.
    fn read_opt(&self, r: &mut JsonReader) -> Result<Option<Self::Value>, DecodeError> {
        if r.peek()? == Token::Null {
            r.next_null()?;
            Ok(None)
        } else {
            self.read(r).map(Some)
        }
    }

    /// Decode a JSON array of values, preserving source order.
    fn read_list(&self, r: &mut JsonReader) -> Result<Vec<Self::Value>, DecodeError> {
        let mut values = Vec::new();
        r.begin_array()?;
        while r.has_next()? {
            values.push(self.read(r)?);
        }
        r.end_array()?;
        Ok(values)
    }

    /// Encoding back to JSON is not supported by this codec.
    fn write(&self, _value: &Self::Value) -> Result<String, DecodeError> {
        Err(DecodeError::UnsupportedOperation)
    }
}

/// Encode a raw token's text into the byte layout dictated by `ty`.
///
/// Integer types are big-endian two's-complement of the parsed value;
/// `Double` is the big-endian IEEE-754 bit pattern of the parsed value,
/// not an integer encoding.
pub fn encode_value(ty: AnnotationType, literal: &str) -> Result<Vec<u8>, DecodeError> {
    let malformed = || DecodeError::MalformedNumber(literal.to_string());
    Ok(match ty {
        AnnotationType::Bool => match literal {
            "true" => vec![1],
            "false" => vec![0],
            _ => return Err(malformed()),
        },
        AnnotationType::String => literal.as_bytes().to_vec(),
        AnnotationType::Bytes => BASE64.decode(literal)?,
        AnnotationType::I16 => literal
            .parse::<i16>()
            .map_err(|_| malformed())?
            .to_be_bytes()
            .to_vec(),
        AnnotationType::I32 => literal
            .parse::<i32>()
            .map_err(|_| malformed())?
            .to_be_bytes()
            .to_vec(),
        AnnotationType::I64 => literal
            .parse::<i64>()
            .map_err(|_| malformed())?
            .to_be_bytes()
            .to_vec(),
        AnnotationType::Double => literal
            .parse::<f64>()
            .map_err(|_| malformed())?
            .to_bits()
            .to_be_bytes()
            .to_vec(),
    })
}

/// Pack a dotted-quad IPv4 literal big-endian into a u32.
fn parse_ipv4(input: &str) -> Result<u32, DecodeError> {
    let mut ipv4: u32 = 0;
    // At most 5 segments; a 5th segment keeps the remaining dots and
    // fails the octet parse below.
    for segment in input.splitn(5, '.') {
        let octet: u8 = segment
            .parse()
            .map_err(|_| DecodeError::MalformedAddress(input.to_string()))?;
        ipv4 = ipv4 << 8 | u32::from(octet);
    }
    Ok(ipv4)
}

/// Parse an IPv6 literal into its 16-byte network-order form.
///
/// Only address literals are accepted; this never resolves hostnames.
fn parse_ipv6(input: &str) -> Result<[u8; 16], DecodeError> {
    input
        .parse::<std::net::Ipv6Addr>()
        .map(|addr| addr.octets())
        .map_err(|_| DecodeError::MalformedAddress(input.to_string()))
}

/// Decodes `{"serviceName": .., "ipv4": .., "ipv6": .., "port": ..}`.
pub struct EndpointCodec;

impl JsonCodec for EndpointCodec {
    type Value = Endpoint;

    fn read(&self, r: &mut JsonReader) -> Result<Endpoint, DecodeError> {
        let mut result = Endpoint::builder();
        r.begin_object()?;
        while r.has_next()? {
            match r.next_name()?.as_str() {
                "serviceName" => result = result.service_name(r.next_string()?),
                "ipv4" => result = result.ipv4(parse_ipv4(&r.next_string()?)?),
                "ipv6" => result = result.ipv6(parse_ipv6(&r.next_string()?)?),
                "port" => {
                    let port = r.next_i64()?;
                    let port = u16::try_from(port)
                        .map_err(|_| DecodeError::MalformedNumber(port.to_string()))?;
                    result = result.port(port);
                }
                _ => r.skip_value()?,
            }
        }
        r.end_object()?;
        result.build()
    }
}

/// Decodes `{"timestamp": .., "value": .., "endpoint": ..}`.
pub struct AnnotationCodec;

impl JsonCodec for AnnotationCodec {
    type Value = Annotation;

    fn read(&self, r: &mut JsonReader) -> Result<Annotation, DecodeError> {
        let mut result = Annotation::builder();
        r.begin_object()?;
        while r.has_next()? {
            match r.next_name()?.as_str() {
                "timestamp" => result = result.timestamp(r.next_i64()?),
                "value" => result = result.value(r.next_string()?),
                "endpoint" => {
                    if let Some(endpoint) = EndpointCodec.read_opt(r)? {
                        result = result.endpoint(endpoint);
                    }
                }
                _ => r.skip_value()?,
            }
        }
        r.end_object()?;
        result.build()
    }
}

/// Decodes a tag: `{"key": .., "value": .., "type": .., "endpoint": ..}`.
///
/// The value's type may be declared explicitly via `type`, before or
/// after `value`, or inferred from the value's JSON token kind. Since
/// the type may not be known when the value token arrives, the raw
/// token is buffered and only interpreted once the whole object has
/// been read: booleans are materialized immediately (their type is
/// unambiguous), string and number tokens are kept as raw text.
pub struct BinaryAnnotationCodec;

impl JsonCodec for BinaryAnnotationCodec {
    type Value = BinaryAnnotation;

    fn read(&self, r: &mut JsonReader) -> Result<BinaryAnnotation, DecodeError> {
        let mut result = BinaryAnnotation::builder();
        let mut key = String::new();
        let mut number: Option<String> = None;
        let mut string: Option<String> = None;
        let mut bool_value: Option<bool> = None;
        let mut ty = AnnotationType::default();

        r.begin_object()?;
        while r.has_next()? {
            match r.next_name()?.as_str() {
                "key" => {
                    key = r.next_string()?;
                    result = result.key(key.clone());
                }
                "value" => match r.peek()? {
                    Token::Bool => {
                        ty = AnnotationType::Bool;
                        bool_value = Some(r.next_bool()?);
                    }
                    Token::String => string = Some(r.next_string()?),
                    Token::Number => number = Some(r.next_literal()?.to_string()),
                    other => return Err(DecodeError::UnsupportedValueKind(other)),
                },
                "type" => ty = AnnotationType::from_wire_name(&r.next_string()?)?,
                "endpoint" => {
                    if let Some(endpoint) = EndpointCodec.read_opt(r)? {
                        result = result.endpoint(endpoint);
                    }
                }
                _ => r.skip_value()?,
            }
        }
        r.end_object()?;

        result = result.annotation_type(ty);
        // Resolve the buffered raw token now that the final type is
        // known. The match is exhaustive over AnnotationType, so
        // extending the enum without updating this encoder is a build
        // error.
        let value = match ty {
            AnnotationType::Bool => bool_value.map(|v| vec![u8::from(v)]),
            AnnotationType::String | AnnotationType::Bytes => match string {
                Some(s) => Some(encode_value(ty, &s)?),
                None if number.is_some() => {
                    return Err(DecodeError::AmbiguousValueType(key));
                }
                None => None,
            },
            AnnotationType::I16
            | AnnotationType::I32
            | AnnotationType::I64
            | AnnotationType::Double => {
                // Numbers transmitted as quoted strings fall back to
                // the buffered string token.
                match number.or(string) {
                    Some(literal) => Some(encode_value(ty, &literal)?),
                    None => None,
                }
            }
        };
        if let Some(value) = value {
            result = result.value(value);
        }
        result.build()
    }
}

/// Decodes a span object, recursing into [`AnnotationCodec`] and
/// [`BinaryAnnotationCodec`] for the two nested arrays.
pub struct SpanCodec;

impl JsonCodec for SpanCodec {
    type Value = Span;

    fn read(&self, r: &mut JsonReader) -> Result<Span, DecodeError> {
        let mut result = Span::builder();
        r.begin_object()?;
        while r.has_next()? {
            let name = r.next_name()?;
            // An explicit null is treated as if the field were absent.
            if r.peek()? == Token::Null {
                r.skip_value()?;
                continue;
            }
            match name.as_str() {
                "traceId" => {
                    let trace_id = r.next_string()?;
                    if trace_id.len() == 32 {
                        let (high, low) = parse_id128(&trace_id)?;
                        result = result.trace_id_high(high).trace_id(low);
                    } else {
                        result = result.trace_id(parse_id(&trace_id)?);
                    }
                }
                "name" => result = result.name(r.next_string()?),
                "id" => result = result.id(parse_id(&r.next_string()?)?),
                "parentId" => result = result.parent_id(parse_id(&r.next_string()?)?),
                "timestamp" => result = result.timestamp(r.next_i64()?),
                "duration" => result = result.duration(r.next_i64()?),
                "annotations" => {
                    for annotation in AnnotationCodec.read_list(r)? {
                        result = result.add_annotation(annotation);
                    }
                }
                "binaryAnnotations" => {
                    for binary_annotation in BinaryAnnotationCodec.read_list(r)? {
                        result = result.add_binary_annotation(binary_annotation);
                    }
                }
                "debug" => result = result.debug(r.next_bool()?),
                _ => r.skip_value()?,
            }
        }
        r.end_object()?;
        result.build()
    }
}

/// Decodes `{"parent": .., "child": .., "callCount": ..}`.
pub struct DependencyLinkCodec;

impl JsonCodec for DependencyLinkCodec {
    type Value = DependencyLink;

    fn read(&self, r: &mut JsonReader) -> Result<DependencyLink, DecodeError> {
        let mut result = DependencyLink::builder();
        r.begin_object()?;
        while r.has_next()? {
            match r.next_name()?.as_str() {
                "parent" => result = result.parent(r.next_string()?),
                "child" => result = result.child(r.next_string()?),
                "callCount" => result = result.call_count(r.next_i64()?),
                _ => r.skip_value()?,
            }
        }
        r.end_object()?;
        result.build()
    }
}

/// Decode a single span from JSON text.
pub fn decode_span(json: &str) -> Result<Span, DecodeError> {
    SpanCodec.read(&mut JsonReader::new(json))
}

/// Decode a JSON array of spans, preserving array order.
pub fn decode_spans(json: &str) -> Result<Vec<Span>, DecodeError> {
    SpanCodec.read_list(&mut JsonReader::new(json))
}

/// Decode a JSON array of dependency links.
pub fn decode_dependency_links(json: &str) -> Result<Vec<DependencyLink>, DecodeError> {
    DependencyLinkCodec.read_list(&mut JsonReader::new(json))
}
