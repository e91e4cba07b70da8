//! Sentence encoding/decoding
//!
//! Implements the transponder's proprietary NMEA-like sentence format:
//!
//! - Outgoing command: `$<keyword>,<f1>,<f2>,...*<checksum>`
//! - Incoming status: `$PSRT,LED,<decimal-status-byte>*<checksum>`
//!
//! The checksum is the XOR of all bytes between `$` and `*`, rendered as two
//! uppercase hex digits. Encoding and decoding are pure functions with no
//! timing or I/O concerns.

use super::ProtocolError;

/// Characters that must not appear in a keyword or field
const RESERVED: [char; 4] = ['$', '*', '\r', '\n'];

/// An outgoing command sentence, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSentence {
    /// Sentence keyword (the part right after `$`)
    keyword: String,
    /// Payload fields, in order
    fields: Vec<String>,
    /// XOR checksum over everything between `$` and `*`
    checksum: u8,
}

impl CommandSentence {
    /// Sentence keyword
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Payload fields
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Checksum value
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Render the sentence in wire form, without a line terminator
    pub fn wire(&self) -> String {
        let mut body = self.keyword.clone();
        for field in &self.fields {
            body.push(',');
            body.push_str(field);
        }
        format!("${}*{:02X}", body, self.checksum)
    }
}

/// Type of a decoded incoming sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceType {
    /// `$PSRT,LED,...` device status report
    LedStatus,
    /// Anything else on the line; dropped silently by the caller
    Unrecognized,
}

/// A decoded incoming status sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSentence {
    /// Sentence classification
    pub sentence_type: SentenceType,
    /// Comma-separated fields before the checksum delimiter, including the
    /// leading `$`-prefixed talker field
    pub fields: Vec<String>,
    /// Status byte, present only for an LED report whose third field parsed
    /// as a decimal integer
    pub status_byte: Option<u8>,
}

/// Device status flags extracted from the LED status byte.
///
/// Recomputed fresh on every status sentence; never merged with prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    /// Bit 0: device power is on
    pub power_on: bool,
    /// Bit 1: transmission timeout
    pub tx_timeout: bool,
    /// Bit 2: device error
    pub error: bool,
    /// Bit 3: silent (receive-only) mode active
    pub silent_mode: bool,
}

impl DeviceStatus {
    /// Extract the four status flags from a raw status byte
    pub fn from_byte(byte: u8) -> Self {
        Self {
            power_on: byte & 0x01 != 0,
            tx_timeout: byte & 0x02 != 0,
            error: byte & 0x04 != 0,
            silent_mode: byte & 0x08 != 0,
        }
    }
}

/// XOR checksum over a sentence body (the text between `$` and `*`)
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

fn check_reserved(part: &str, what: &str) -> Result<(), ProtocolError> {
    if part.contains(RESERVED) {
        return Err(ProtocolError::Encode(format!(
            "{what} {part:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// Build a command sentence from a keyword and payload fields.
///
/// Fails if the keyword or any field contains `$`, `*`, or a line terminator.
pub fn encode(keyword: &str, fields: &[&str]) -> Result<CommandSentence, ProtocolError> {
    check_reserved(keyword, "keyword")?;
    for field in fields {
        check_reserved(field, "field")?;
    }

    let mut body = keyword.to_string();
    for field in fields {
        body.push(',');
        body.push_str(field);
    }

    Ok(CommandSentence {
        keyword: keyword.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        checksum: checksum(&body),
    })
}

/// Split a wire sentence into its body and declared checksum.
///
/// The split is on the LAST `*` so a `*` inside a field cannot truncate the
/// body. A line without a checksum delimiter is a decode error.
pub fn split_wire(line: &str) -> Result<(&str, u8), ProtocolError> {
    let star = line
        .rfind('*')
        .ok_or_else(|| ProtocolError::Decode(format!("no checksum delimiter in {line:?}")))?;
    let declared = u8::from_str_radix(&line[star + 1..], 16)
        .map_err(|_| ProtocolError::Decode(format!("bad checksum digits in {line:?}")))?;
    let start = usize::from(line.starts_with('$'));
    Ok((&line[start..star], declared))
}

/// Verify that a wire sentence's declared checksum matches the XOR of its body.
///
/// Used as a startup self-check on the pre-computed command constants so they
/// are machine-checked rather than hand-trusted.
pub fn verify_wire_checksum(line: &str) -> Result<(), ProtocolError> {
    let (body, declared) = split_wire(line)?;
    let computed = checksum(body);
    if computed != declared {
        return Err(ProtocolError::ChecksumMismatch {
            sentence: line.to_string(),
            computed,
            declared,
        });
    }
    Ok(())
}

/// Parse an incoming line into a status sentence.
///
/// The device's checksum correctness is trusted for inbound lines, so the
/// declared checksum is isolated but not validated against the body. A line
/// without a `*` delimiter is a decode error (swallowed by the session); an
/// LED report whose status field is missing or fails to parse yields
/// `status_byte = None` so the caller degrades to an all-false status
/// instead of failing.
pub fn decode(line: &str) -> Result<StatusSentence, ProtocolError> {
    let star = line
        .rfind('*')
        .ok_or_else(|| ProtocolError::Decode(format!("no checksum delimiter in {line:?}")))?;

    let fields: Vec<String> = line[..star].split(',').map(str::to_string).collect();

    let is_led = fields.first().map(String::as_str) == Some("$PSRT")
        && fields.get(1).map(String::as_str) == Some("LED");

    if !is_led {
        return Ok(StatusSentence {
            sentence_type: SentenceType::Unrecognized,
            fields,
            status_byte: None,
        });
    }

    // An LED report is an LED report even without its status field; the
    // byte is simply absent and the caller degrades to all-false.
    let status_byte = fields.get(2).and_then(|f| f.parse::<u8>().ok());
    Ok(StatusSentence {
        sentence_type: SentenceType::LedStatus,
        fields,
        status_byte,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn checksum_is_xor_of_body() {
        assert_eq!(checksum("DUAIQ,LED"), 0x29);
        assert_eq!(checksum("PSRT,012,(--QuaRk--)"), 0x4B);
    }

    #[test]
    fn encode_renders_wire_form() {
        let sentence = encode("DUAIQ", &["LED"]).unwrap();
        assert_eq!(sentence.wire(), "$DUAIQ,LED*29");
        assert_eq!(sentence.keyword(), "DUAIQ");
        assert_eq!(sentence.fields(), ["LED".to_string()]);
        assert_eq!(sentence.checksum(), 0x29);
    }

    #[test]
    fn encode_matches_authorization_vector() {
        // The keyword may carry embedded separators; only $, * and line
        // terminators are reserved.
        let sentence = encode("PSRT,012,(--QuaRk--)", &[]).unwrap();
        assert_eq!(sentence.wire(), "$PSRT,012,(--QuaRk--)*4B");
    }

    #[test]
    fn encode_rejects_reserved_characters() {
        assert!(encode("PS$RT", &[]).is_err());
        assert!(encode("PSRT", &["a*b"]).is_err());
        assert!(encode("PSRT", &["a\r\n"]).is_err());
    }

    #[test]
    fn decode_recovers_encoded_fields() {
        let sentence = encode("DUAIQ", &["LED"]).unwrap();
        let decoded = decode(&sentence.wire()).unwrap();
        assert_eq!(decoded.fields, vec!["$DUAIQ".to_string(), "LED".to_string()]);
        assert_eq!(decoded.sentence_type, SentenceType::Unrecognized);
    }

    #[test]
    fn decode_led_status() {
        let decoded = decode("$PSRT,LED,9*71").unwrap();
        assert_eq!(decoded.sentence_type, SentenceType::LedStatus);
        assert_eq!(decoded.status_byte, Some(9));
    }

    #[test]
    fn decode_led_status_with_garbage_byte_is_absent_not_error() {
        let decoded = decode("$PSRT,LED,zzz*00").unwrap();
        assert_eq!(decoded.sentence_type, SentenceType::LedStatus);
        assert_eq!(decoded.status_byte, None);
    }

    #[test]
    fn decode_inbound_checksum_is_not_validated() {
        // The device is trusted; a wrong checksum still decodes.
        let decoded = decode("$PSRT,LED,9*FF").unwrap();
        assert_eq!(decoded.status_byte, Some(9));
    }

    #[test]
    fn decode_other_talkers_are_unrecognized() {
        let decoded = decode("$GPGGA,123519,4807.038,N*47").unwrap();
        assert_eq!(decoded.sentence_type, SentenceType::Unrecognized);
        assert_eq!(decoded.status_byte, None);
    }

    #[test]
    fn decode_is_case_sensitive_on_the_talker() {
        let decoded = decode("$psrt,LED,9*71").unwrap();
        assert_eq!(decoded.sentence_type, SentenceType::Unrecognized);
    }

    #[test]
    fn decode_without_delimiter_is_an_error() {
        assert!(decode("$PSRT,LED,9").is_err());
        assert!(decode("line noise").is_err());
    }

    #[test]
    fn decode_led_without_status_field_has_absent_byte() {
        let decoded = decode("$PSRT,LED*64").unwrap();
        assert_eq!(decoded.sentence_type, SentenceType::LedStatus);
        assert_eq!(decoded.status_byte, None);
    }

    #[test]
    fn status_bits_extract_independently() {
        let status = DeviceStatus::from_byte(0x09);
        assert!(status.power_on);
        assert!(!status.tx_timeout);
        assert!(!status.error);
        assert!(status.silent_mode);

        let status = DeviceStatus::from_byte(0x0B);
        assert!(status.power_on);
        assert!(status.tx_timeout);
        assert!(!status.error);
        assert!(status.silent_mode);

        assert_eq!(DeviceStatus::from_byte(0x00), DeviceStatus::default());
    }

    #[test]
    fn verify_wire_checksum_accepts_and_rejects() {
        assert!(verify_wire_checksum("$DUAIQ,LED*29").is_ok());
        assert!(matches!(
            verify_wire_checksum("$DUAIQ,LED*2A"),
            Err(ProtocolError::ChecksumMismatch { computed: 0x29, declared: 0x2A, .. })
        ));
    }
}
