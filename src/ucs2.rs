//! UCS-2 user data, which on the wire is big-endian UTF-16 per 3GPP TS 23.038.
//!
//! Code points above U+FFFF become surrogate pairs; modems treat the User Data Length as
//! an octet count, so that is acceptable.
use encoding::{DecoderTrap, Encoding, EncoderTrap};
use encoding::all::UTF_16BE;

use crate::errors::{SmsError, SmsResult};

/// Encode text as UTF-16BE octets. The User Data Length of a UCS-2 payload is the length
/// of this buffer.
pub fn encode_ucs2(input: &str) -> Vec<u8> {
    UTF_16BE.encode(input, EncoderTrap::Replace).unwrap()
}

/// Decode UTF-16BE octets. An odd-length buffer cannot be UCS-2 and fails with
/// `IncorrectSize`; unpaired surrogates decode to the replacement character.
pub fn decode_ucs2(octets: &[u8]) -> SmsResult<String> {
    if octets.len() % 2 != 0 {
        return Err(SmsError::IncorrectSize("UCS-2 user data"));
    }
    Ok(UTF_16BE.decode(octets, DecoderTrap::Replace).unwrap())
}
