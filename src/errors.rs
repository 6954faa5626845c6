//! Error types returned by the codec.
//!
//! Every failure is reported to the caller; nothing is retried or silently repaired. Decoders
//! additionally report the number of octets consumed before the failure where the call shape
//! allows it.

/// Any error the TPDU codec can produce.
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// The Data Coding Scheme octet selects an encoding other than the GSM 7-bit default
    /// alphabet (0x00) or UCS-2 (0x08).
    #[fail(display = "unsupported data coding scheme {:#04x}", _0)]
    UnsupportedEncoding(u8),
    /// The Message Type Indicator names a TPDU type this codec does not implement.
    #[fail(display = "unsupported message type indicator {:#04x}", _0)]
    UnknownMessageType(u8),
    /// The validity period format is Enhanced or Absolute. Only the relative one-octet format
    /// is implemented; the error is explicit so callers know to upgrade.
    #[fail(display = "non-relative validity period formats are not supported")]
    NonRelativeUnsupported,
    /// A declared field length exceeds the protocol maximum, or a fixed-size field is
    /// malformed (address over 12 digits, odd UCS-2 payload, out-of-range timestamp).
    #[fail(display = "field out of protocol bounds: {}", _0)]
    IncorrectSize(&'static str),
    /// The text contains a code point with no mapping in the GSM 7-bit default alphabet or
    /// its extension table.
    #[fail(display = "character {:?} has no GSM 03.38 mapping", _0)]
    UnmappableChar(char),
    /// A 7-bit septet stream ended on a lone 0x1B extension escape.
    #[fail(display = "7-bit user data ends on a lone escape septet")]
    TruncatedEscape,
    /// The input octets ran out before a required field was complete.
    #[fail(display = "input ends before the {} completes", _0)]
    Truncated(&'static str),
    /// A phone number contains non-digit characters, or a phone number field on the wire
    /// contains semi-octet nibbles that are neither digits nor padding.
    #[fail(display = "phone number contains invalid digits")]
    InvalidDigits,
}

pub type SmsResult<T> = Result<T, SmsError>;
