//! The `sms-tpdu` library encodes and decodes SMS Transfer Protocol Data Units (TPDUs) as
//! specified by 3GPP TS 23.040, in the two directions that matter in practice: SMS-DELIVER
//! (network → mobile) and SMS-SUBMIT (mobile → network).
//!
//! Given a [`Message`](pdu/struct.Message.html), [`Message::to_bytes`](pdu/struct.Message.html#method.to_bytes)
//! produces the exact octet stream a modem expects on its serial PDU interface, including the
//! leading Service Centre Address block; [`Message::from_bytes`](pdu/struct.Message.html#method.from_bytes)
//! reverses it. Hex framing for the AT interface is the caller's job (the
//! [`HexData`](pdu/struct.HexData.html) wrapper helps).
//!
//! ```no_run
//! use sms_tpdu::pdu::{Message, MessageType};
//!
//! let mut msg = Message::default();
//! msg.message_type = MessageType::Submit;
//! msg.address = "+79995554433".parse().unwrap();
//! msg.text = "hi".into();
//! let (tpdu_len, octets) = msg.to_bytes().unwrap();
//! // `tpdu_len` is the length argument for AT+CMGS; `octets` go on the wire hex-encoded.
//! # let _ = (tpdu_len, octets);
//! ```
//!
//! The lower layers are exposed on their own: the semi-octet codec
//! ([`semi_octet`](semi_octet/index.html)), the GSM 03.38 7-bit alphabet and its septet packing
//! ([`gsm_encoding`](gsm_encoding/index.html)), and UCS-2 text ([`ucs2`](ucs2/index.html)).

#[macro_use] extern crate log;
#[macro_use] extern crate failure_derive;
#[macro_use] extern crate num_derive;
#[macro_use] extern crate derive_is_enum_variant;

macro_rules! check_offset {
    ($b:ident, $offset:expr, $reason:expr) => {
        if $b.get($offset).is_none() {
            return Err(SmsError::Truncated($reason));
        }
    }
}

pub mod errors;
pub mod semi_octet;
pub mod gsm_encoding;
pub mod ucs2;
pub mod pdu;
#[cfg(test)]
mod property_tests;

pub use crate::errors::{SmsError, SmsResult};
pub use crate::pdu::{Message, MessageEncoding, MessageType, PhoneNumber, SmscTimestamp,
                     ValidityPeriod, VpFormat};
pub use crate::gsm_encoding::{decode_7bit, encode_7bit, pack_ussd};
pub use crate::ucs2::{decode_ucs2, encode_ucs2};
