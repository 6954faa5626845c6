//! Encoding and decoding of SMS-DELIVER and SMS-SUBMIT TPDUs (3GPP TS 23.040), together
//! with the Service Centre Address block that prefixes them on the modem serial interface.
//!
//! [`Message`](struct.Message.html) is the high-level representation to hold on to; the
//! wire layouts of the two TPDU types are internal views dispatched on the Message Type
//! Indicator. Everything here is a plain value type: encode, hand the octets off, drop.
use std::fmt;
use std::str::FromStr;
use std::convert::TryFrom;
use std::time::Duration;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike};
use num_traits::FromPrimitive;
use crate::errors::{SmsError, SmsResult};
use crate::gsm_encoding;
use crate::semi_octet;
use crate::ucs2;

/// The one Protocol Identifier this codec emits: Short Message Type 0.
const PROTOCOL_IDENTIFIER: u8 = 0x00;
/// An address field may declare at most 12 digits.
const MAX_ADDRESS_DIGITS: usize = 12;
/// An SCA block may declare at most 12 octets (11 of address body plus the TOA).
const MAX_SCA_OCTETS: usize = 12;

fn ceil_div(n: u64, block: u64) -> u64 {
    (n + block - 1) / block
}

/// Type of number value, carried in bits 4–6 of the Type-of-Address octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum TypeOfNumber {
    /// Unknown number type; the network works it out.
    Unknown = 0b0_000_0000,
    /// International number (rendered with a leading `+`).
    International = 0b0_001_0000,
    /// National number, no prefix.
    National = 0b0_010_0000,
    /// Network-specific number.
    Special = 0b0_011_0000,
    /// Subscriber number.
    Subscriber = 0b0_100_0000,
    /// Alphanumeric "number" (sender names used by companies). Not decodable as digits.
    Gsm = 0b0_101_0000,
    /// Abbreviated number.
    Short = 0b0_110_0000,
    /// Reserved for extension.
    Reserved = 0b0_111_0000
}

/// Numbering plan identification, carried in bits 0–3 of the Type-of-Address octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum NumberingPlanIdentification {
    NetworkDetermined = 0b0_000_0000,
    IsdnTelephone = 0b0_000_0001,
    Data = 0b0_000_0011,
    Telex = 0b0_000_0100,
    National = 0b0_000_1000,
    Private = 0b0_000_1001,
    Ermes = 0b0_000_1010,
    Reserved = 0b0_000_1111
}

/// The Type-of-Address octet, minus its always-set top bit.
///
/// Phone numbers parsed from strings get International/ISDN (`0x91`) when they start
/// with `+` and National/ISDN (`0xA1`) otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan_identification: NumberingPlanIdentification
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType {
            type_of_number: TypeOfNumber::National,
            numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
        }
    }
}
impl TryFrom<u8> for AddressType {
    type Error = SmsError;
    fn try_from(b: u8) -> SmsResult<Self> {
        let ton = TypeOfNumber::from_u8(b & 0b0_111_0000)
            .ok_or(SmsError::InvalidDigits)?;
        let npi = NumberingPlanIdentification::from_u8(b & 0b0_000_1111)
            .ok_or(SmsError::InvalidDigits)?;
        Ok(Self {
            type_of_number: ton,
            numbering_plan_identification: npi
        })
    }
}
impl Into<u8> for AddressType {
    fn into(self) -> u8 {
        let mut ret: u8 = 0b1_000_0000;
        ret |= self.type_of_number as u8;
        ret |= self.numbering_plan_identification as u8;
        ret
    }
}

/// A phone number: decimal digits plus an address type.
///
/// The SMSC address and the originating/destination address are both this type; an empty
/// one stands for "no SCA stored, use the modem default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneNumber {
    pub type_addr: AddressType,
    pub digits: Vec<u8>
}

impl PhoneNumber {
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
    /// Serializes to the TOA octet followed by the swapped-nibble digits, returning the
    /// digit count alongside (the address field length byte wants digits, the SCA length
    /// byte wants octets — the caller picks).
    pub fn encode(&self) -> (usize, Vec<u8>) {
        let mut ret = Vec::with_capacity(1 + (self.digits.len() + 1) / 2);
        ret.push(self.type_addr.into());
        ret.extend(semi_octet::encode_digits(&self.digits));
        (self.digits.len(), ret)
    }
    /// Reads an address body: one TOA octet, then semi-octet digits up to the `0xF` pad.
    pub fn decode(b: &[u8]) -> SmsResult<Self> {
        check_offset!(b, 0, "type-of-address octet");
        let type_addr = AddressType::try_from(b[0])?;
        let digits = semi_octet::decode_digits(&b[1..])?;
        Ok(PhoneNumber { type_addr, digits })
    }
}
impl FromStr for PhoneNumber {
    type Err = SmsError;
    fn from_str(st: &str) -> SmsResult<Self> {
        let (ton, digits_str) = match st.strip_prefix('+') {
            Some(rest) => (TypeOfNumber::International, rest),
            None => (TypeOfNumber::National, st)
        };
        let mut digits = Vec::with_capacity(digits_str.len());
        for c in digits_str.chars() {
            match c {
                '0'..='9' => digits.push(c as u8 - b'0'),
                _ => return Err(SmsError::InvalidDigits)
            }
        }
        Ok(PhoneNumber {
            type_addr: AddressType {
                type_of_number: ton,
                numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
            },
            digits
        })
    }
}
impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.type_addr.type_of_number == TypeOfNumber::International {
            write!(f, "+")?;
        }
        for d in self.digits.iter() {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// The Service Centre Time Stamp: an absolute instant carrying the signed quarter-hour
/// UTC offset it was stamped in. Re-zone with `with_timezone` for display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SmscTimestamp(pub DateTime<FixedOffset>);

impl SmscTimestamp {
    /// Seven semi-octets: year (2000-based), month, day, hour, minute, second, and the
    /// offset in quarter-hours. The sign bit is bit 3 of the quarter-hour tens digit,
    /// which the nibble swap puts in the low nibble of the final octet.
    pub fn encode(&self) -> [u8; 7] {
        let dt = &self.0;
        let offset = dt.offset().local_minus_utc();
        let quarters = (offset.abs() / 900) as u8;
        let mut tz = semi_octet::encode_pair(quarters);
        if offset < 0 {
            tz |= 0x08;
        }
        [
            semi_octet::encode_pair(dt.year().rem_euclid(100) as u8),
            semi_octet::encode_pair(dt.month() as u8),
            semi_octet::encode_pair(dt.day() as u8),
            semi_octet::encode_pair(dt.hour() as u8),
            semi_octet::encode_pair(dt.minute() as u8),
            semi_octet::encode_pair(dt.second() as u8),
            tz
        ]
    }
    /// Inverse of [`encode`](#method.encode). Anything that does not name a real
    /// wall-clock moment fails with `IncorrectSize`.
    pub fn decode(b: &[u8]) -> SmsResult<Self> {
        if b.len() != 7 {
            return Err(SmsError::IncorrectSize("service centre timestamp"));
        }
        let mut fields = [0u8; 6];
        for (i, oct) in b[..6].iter().enumerate() {
            if oct & 0x0F > 9 || oct >> 4 > 9 {
                return Err(SmsError::IncorrectSize("service centre timestamp"));
            }
            fields[i] = semi_octet::decode_pair(*oct);
        }
        let tz = b[6];
        if tz >> 4 > 9 {
            return Err(SmsError::IncorrectSize("service centre timestamp"));
        }
        let quarters = i32::from((tz & 0x07) * 10 + (tz >> 4));
        let offset_secs = if tz & 0x08 != 0 { -quarters * 900 } else { quarters * 900 };
        let offset = FixedOffset::east_opt(offset_secs)
            .ok_or(SmsError::IncorrectSize("service centre timestamp"))?;
        let naive = NaiveDate::from_ymd_opt(2000 + i32::from(fields[0]),
                                            u32::from(fields[1]),
                                            u32::from(fields[2]))
            .and_then(|d| d.and_hms_opt(u32::from(fields[3]),
                                        u32::from(fields[4]),
                                        u32::from(fields[5])))
            .ok_or(SmsError::IncorrectSize("service centre timestamp"))?;
        match offset.from_local_datetime(&naive).single() {
            Some(dt) => Ok(SmscTimestamp(dt)),
            None => Err(SmsError::IncorrectSize("service centre timestamp"))
        }
    }
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// A relative validity period.
///
/// The wire format is one octet of piecewise-bucketed duration, so encoding is lossy: a
/// round-trip lands on the upper boundary of the bucket the duration fell into.
/// Durations under five minutes encode to octet 0 (= five minutes); durations of 63
/// weeks and over saturate at octet 0xFF.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidityPeriod(pub Duration);

impl ValidityPeriod {
    pub fn to_octet(&self) -> u8 {
        let secs = self.0.as_secs();
        if secs < 5 * MINUTE {
            0x00
        } else if secs <= 12 * HOUR {
            (ceil_div(secs, 5 * MINUTE) - 1) as u8
        } else if secs <= 24 * HOUR {
            (143 + ceil_div(secs - 12 * HOUR, 30 * MINUTE)) as u8
        } else if secs <= 30 * DAY {
            (166 + ceil_div(secs, DAY)) as u8
        } else if secs <= 63 * WEEK {
            (192 + ceil_div(secs, WEEK)) as u8
        } else {
            0xFF
        }
    }
    pub fn from_octet(oct: u8) -> ValidityPeriod {
        let secs = match oct {
            0..=143 => (u64::from(oct) + 1) * 5 * MINUTE,
            144..=167 => 12 * HOUR + u64::from(oct - 143) * 30 * MINUTE,
            168..=196 => u64::from(oct - 166) * DAY,
            _ => u64::from(oct - 192) * WEEK
        };
        ValidityPeriod(Duration::from_secs(secs))
    }
}

/// The TPDU type, i.e. the Message Type Indicator in bits 0–1 of the first TPDU octet.
///
/// MTI values are shared between directions (a STATUS-REPORT and a COMMAND both carry
/// 0b10); the transfer direction disambiguates. This codec implements `Deliver` and
/// `Submit` and rejects the rest.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, is_enum_variant)]
pub enum MessageType {
    Deliver = 0x00,
    Submit = 0x01,
    StatusReport = 0x02
}

/// The text encoding, mirroring the Data Coding Scheme octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageEncoding {
    Gsm7Bit = 0x00,
    Ucs2 = 0x08
}

impl MessageEncoding {
    /// How many user data octets a declared User Data Length spans: the UDL counts
    /// septets for the 7-bit alphabet and octets for UCS-2.
    fn user_data_octets(self, udl: u8) -> usize {
        match self {
            MessageEncoding::Gsm7Bit => (usize::from(udl) * 7 + 7) / 8,
            MessageEncoding::Ucs2 => usize::from(udl)
        }
    }
}

/// The Validity Period Format: bits 3–4 of a SUBMIT first octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum VpFormat {
    NotPresent = 0b00,
    Enhanced = 0b01,
    Relative = 0b10,
    Absolute = 0b11
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct DeliverFirstOctet {
    more_messages_to_send: bool,
    loop_prevention: bool,
    status_report_indication: bool,
    udhi: bool,
    reply_path: bool
}
impl From<u8> for DeliverFirstOctet {
    fn from(b: u8) -> Self {
        DeliverFirstOctet {
            // TP-MMS is active-low: a set bit means "no more messages waiting".
            more_messages_to_send: b & 0b0000_0100 == 0,
            loop_prevention: b & 0b0000_1000 > 0,
            status_report_indication: b & 0b0001_0000 > 0,
            udhi: b & 0b0010_0000 > 0,
            reply_path: b & 0b0100_0000 > 0
        }
    }
}
impl Into<u8> for DeliverFirstOctet {
    fn into(self) -> u8 {
        let mut ret = MessageType::Deliver as u8;
        if !self.more_messages_to_send {
            ret |= 0b0000_0100;
        }
        if self.loop_prevention {
            ret |= 0b0000_1000;
        }
        if self.status_report_indication {
            ret |= 0b0001_0000;
        }
        if self.udhi {
            ret |= 0b0010_0000;
        }
        if self.reply_path {
            ret |= 0b0100_0000;
        }
        ret
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct SubmitFirstOctet {
    reject_duplicates: bool,
    vpf: VpFormat,
    status_report_request: bool,
    udhi: bool,
    reply_path: bool
}
impl From<u8> for SubmitFirstOctet {
    fn from(b: u8) -> Self {
        let vpf = VpFormat::from_u8(b >> 3 & 0b11)
            .expect("VpFormat conversions should be exhaustive!");
        SubmitFirstOctet {
            reject_duplicates: b & 0b0000_0100 > 0,
            vpf,
            status_report_request: b & 0b0010_0000 > 0,
            udhi: b & 0b0100_0000 > 0,
            reply_path: b & 0b1000_0000 > 0
        }
    }
}
impl Into<u8> for SubmitFirstOctet {
    fn into(self) -> u8 {
        let mut ret = MessageType::Submit as u8;
        if self.reject_duplicates {
            ret |= 0b0000_0100;
        }
        ret |= (self.vpf as u8) << 3;
        if self.status_report_request {
            ret |= 0b0010_0000;
        }
        if self.udhi {
            ret |= 0b0100_0000;
        }
        if self.reply_path {
            ret |= 0b1000_0000;
        }
        ret
    }
}

/// Internal structured view of an SMS-DELIVER TPDU.
#[derive(Debug, Clone, PartialEq)]
struct DeliverTpdu {
    first_octet: DeliverFirstOctet,
    originating_address: PhoneNumber,
    encoding: MessageEncoding,
    scts: SmscTimestamp,
    user_data_len: u8,
    user_data: Vec<u8>
}

impl DeliverTpdu {
    fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![];
        ret.push(self.first_octet.into());
        let (digits, addr) = self.originating_address.encode();
        ret.push(digits as u8);
        ret.extend(addr);
        ret.push(PROTOCOL_IDENTIFIER);
        ret.push(self.encoding as u8);
        ret.extend(self.scts.encode().iter());
        ret.push(self.user_data_len);
        ret.extend(&self.user_data);
        ret
    }
    fn from_bytes(b: &[u8]) -> SmsResult<(usize, Self)> {
        let mut offset = 0;
        check_offset!(b, offset, "PDU type octet");
        let first_octet = DeliverFirstOctet::from(b[offset]);
        offset += 1;
        check_offset!(b, offset, "originating address length");
        let digit_count = usize::from(b[offset]);
        if digit_count > MAX_ADDRESS_DIGITS {
            return Err(SmsError::IncorrectSize("originating address"));
        }
        offset += 1;
        let addr_end = offset + (digit_count + 1) / 2 + 1;
        if b.len() < addr_end {
            return Err(SmsError::Truncated("originating address"));
        }
        let originating_address = PhoneNumber::decode(&b[offset..addr_end])?;
        offset = addr_end;
        check_offset!(b, offset, "protocol identifier");
        offset += 1;
        check_offset!(b, offset, "data coding scheme");
        let dcs = b[offset];
        let encoding = MessageEncoding::from_u8(dcs)
            .ok_or(SmsError::UnsupportedEncoding(dcs))?;
        offset += 1;
        if b.len() < offset + 7 {
            return Err(SmsError::Truncated("service centre timestamp"));
        }
        let scts = SmscTimestamp::decode(&b[offset..offset + 7])?;
        offset += 7;
        check_offset!(b, offset, "user data length");
        let user_data_len = b[offset];
        offset += 1;
        let ud_octets = encoding.user_data_octets(user_data_len);
        if b.len() < offset + ud_octets {
            return Err(SmsError::Truncated("user data"));
        }
        let user_data = b[offset..offset + ud_octets].to_owned();
        offset += ud_octets;
        Ok((offset, DeliverTpdu {
            first_octet,
            originating_address,
            encoding,
            scts,
            user_data_len,
            user_data
        }))
    }
}

/// Internal structured view of an SMS-SUBMIT TPDU.
#[derive(Debug, Clone, PartialEq)]
struct SubmitTpdu {
    first_octet: SubmitFirstOctet,
    message_reference: u8,
    destination_address: PhoneNumber,
    encoding: MessageEncoding,
    validity_period: Option<u8>,
    user_data_len: u8,
    user_data: Vec<u8>
}

impl SubmitTpdu {
    fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![];
        ret.push(self.first_octet.into());
        ret.push(self.message_reference);
        let (digits, addr) = self.destination_address.encode();
        ret.push(digits as u8);
        ret.extend(addr);
        ret.push(PROTOCOL_IDENTIFIER);
        ret.push(self.encoding as u8);
        if let Some(vp) = self.validity_period {
            ret.push(vp);
        }
        ret.push(self.user_data_len);
        ret.extend(&self.user_data);
        ret
    }
    fn from_bytes(b: &[u8]) -> SmsResult<(usize, Self)> {
        let mut offset = 0;
        check_offset!(b, offset, "PDU type octet");
        let first_octet = SubmitFirstOctet::from(b[offset]);
        offset += 1;
        check_offset!(b, offset, "message reference");
        let message_reference = b[offset];
        offset += 1;
        check_offset!(b, offset, "destination address length");
        let digit_count = usize::from(b[offset]);
        if digit_count > MAX_ADDRESS_DIGITS {
            return Err(SmsError::IncorrectSize("destination address"));
        }
        offset += 1;
        let addr_end = offset + (digit_count + 1) / 2 + 1;
        if b.len() < addr_end {
            return Err(SmsError::Truncated("destination address"));
        }
        let destination_address = PhoneNumber::decode(&b[offset..addr_end])?;
        offset = addr_end;
        check_offset!(b, offset, "protocol identifier");
        offset += 1;
        check_offset!(b, offset, "data coding scheme");
        let dcs = b[offset];
        let encoding = MessageEncoding::from_u8(dcs)
            .ok_or(SmsError::UnsupportedEncoding(dcs))?;
        offset += 1;
        // The VPF comes from the header just parsed; only then can the VP octet be
        // consumed (or its absence accepted).
        let validity_period = match first_octet.vpf {
            VpFormat::NotPresent => None,
            VpFormat::Relative => {
                check_offset!(b, offset, "validity period");
                let vp = b[offset];
                offset += 1;
                Some(vp)
            },
            VpFormat::Enhanced | VpFormat::Absolute => {
                return Err(SmsError::NonRelativeUnsupported);
            }
        };
        check_offset!(b, offset, "user data length");
        let user_data_len = b[offset];
        offset += 1;
        let ud_octets = encoding.user_data_octets(user_data_len);
        if b.len() < offset + ud_octets {
            return Err(SmsError::Truncated("user data"));
        }
        let user_data = b[offset..offset + ud_octets].to_owned();
        offset += ud_octets;
        Ok((offset, SubmitTpdu {
            first_octet,
            message_reference,
            destination_address,
            encoding,
            validity_period,
            user_data_len,
            user_data
        }))
    }
}

/// An SMS message in the shape callers want to work with.
///
/// Construct one (start from `Default` and fill in what matters), serialize with
/// [`to_bytes`](#method.to_bytes), or obtain one from [`from_bytes`](#method.from_bytes).
/// Which fields are meaningful depends on `message_type`: `service_center_time` exists
/// on DELIVER only, `message_reference` and the validity period on SUBMIT only.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message_type: MessageType,
    pub encoding: MessageEncoding,
    pub validity_period: ValidityPeriod,
    pub vp_format: VpFormat,
    pub service_center_time: Option<SmscTimestamp>,
    pub service_center_address: PhoneNumber,
    pub address: PhoneNumber,
    pub text: String,
    pub message_reference: u8,
    pub reply_path: bool,
    pub udh_indicator: bool,
    pub status_report_indication: bool,
    pub status_report_request: bool,
    pub more_messages_to_send: bool,
    pub loop_prevention: bool,
    pub reject_duplicates: bool
}

impl Default for Message {
    fn default() -> Self {
        Message {
            message_type: MessageType::Deliver,
            encoding: MessageEncoding::Gsm7Bit,
            validity_period: ValidityPeriod::default(),
            vp_format: VpFormat::NotPresent,
            service_center_time: None,
            service_center_address: PhoneNumber::default(),
            address: PhoneNumber::default(),
            text: String::new(),
            message_reference: 0,
            reply_path: false,
            udh_indicator: false,
            status_report_indication: false,
            status_report_request: false,
            more_messages_to_send: false,
            loop_prevention: false,
            reject_duplicates: false
        }
    }
}

impl Message {
    /// Serializes the message into the octet stream the modem expects: the SCA block
    /// first, then the TPDU. Returns the TPDU length (which excludes the SCA block — it
    /// is the number `AT+CMGS` wants) alongside the full octets.
    pub fn to_bytes(&self) -> SmsResult<(usize, Vec<u8>)> {
        let mut ret = vec![];
        if self.service_center_address.is_empty() {
            ret.push(0x00);
        } else {
            let (_, sca) = self.service_center_address.encode();
            ret.push(sca.len() as u8);
            ret.extend(sca);
        }
        let sca_len = ret.len();
        let (user_data_len, user_data) = self.encode_user_data()?;
        match self.message_type {
            MessageType::Deliver => {
                let scts = self.service_center_time
                    .ok_or(SmsError::IncorrectSize("service centre timestamp"))?;
                let tpdu = DeliverTpdu {
                    first_octet: DeliverFirstOctet {
                        more_messages_to_send: self.more_messages_to_send,
                        loop_prevention: self.loop_prevention,
                        status_report_indication: self.status_report_indication,
                        udhi: self.udh_indicator,
                        reply_path: self.reply_path
                    },
                    originating_address: self.address.clone(),
                    encoding: self.encoding,
                    scts,
                    user_data_len,
                    user_data
                };
                ret.extend(tpdu.as_bytes());
            },
            MessageType::Submit => {
                let validity_period = match self.vp_format {
                    VpFormat::NotPresent => None,
                    VpFormat::Relative => Some(self.validity_period.to_octet()),
                    VpFormat::Enhanced | VpFormat::Absolute => {
                        return Err(SmsError::NonRelativeUnsupported);
                    }
                };
                let tpdu = SubmitTpdu {
                    first_octet: SubmitFirstOctet {
                        reject_duplicates: self.reject_duplicates,
                        vpf: self.vp_format,
                        status_report_request: self.status_report_request,
                        udhi: self.udh_indicator,
                        reply_path: self.reply_path
                    },
                    message_reference: self.message_reference,
                    destination_address: self.address.clone(),
                    encoding: self.encoding,
                    validity_period,
                    user_data_len,
                    user_data
                };
                ret.extend(tpdu.as_bytes());
            },
            other => return Err(SmsError::UnknownMessageType(other as u8))
        }
        trace!("encoded {:?} TPDU: {}", self.message_type, HexData(&ret));
        Ok((ret.len() - sca_len, ret))
    }

    /// Parses a message from the octet stream produced by a modem (SCA block followed by
    /// one TPDU). Returns the number of octets consumed alongside the message; trailing
    /// octets are left untouched.
    pub fn from_bytes(b: &[u8]) -> SmsResult<(usize, Message)> {
        check_offset!(b, 0, "service centre address length");
        let sca_octets = usize::from(b[0]);
        if sca_octets > MAX_SCA_OCTETS {
            return Err(SmsError::IncorrectSize("service centre address"));
        }
        let mut offset = 1;
        if b.len() < offset + sca_octets {
            return Err(SmsError::Truncated("service centre address"));
        }
        let service_center_address = if sca_octets > 0 {
            PhoneNumber::decode(&b[offset..offset + sca_octets])?
        } else {
            PhoneNumber::default()
        };
        offset += sca_octets;
        check_offset!(b, offset, "PDU type octet");
        let mti = b[offset] & 0b11;
        let message_type = MessageType::from_u8(mti)
            .ok_or(SmsError::UnknownMessageType(mti))?;
        debug!("decoding {:?} TPDU ({} octets of input)", message_type, b.len());
        let mut msg = Message::default();
        msg.message_type = message_type;
        msg.service_center_address = service_center_address;
        match message_type {
            MessageType::Deliver => {
                let (used, tpdu) = DeliverTpdu::from_bytes(&b[offset..])?;
                offset += used;
                msg.more_messages_to_send = tpdu.first_octet.more_messages_to_send;
                msg.loop_prevention = tpdu.first_octet.loop_prevention;
                msg.status_report_indication = tpdu.first_octet.status_report_indication;
                msg.udh_indicator = tpdu.first_octet.udhi;
                msg.reply_path = tpdu.first_octet.reply_path;
                msg.encoding = tpdu.encoding;
                msg.service_center_time = Some(tpdu.scts);
                msg.address = tpdu.originating_address;
                msg.text = decode_user_data(tpdu.encoding, &tpdu.user_data,
                                            tpdu.user_data_len)?;
            },
            MessageType::Submit => {
                let (used, tpdu) = SubmitTpdu::from_bytes(&b[offset..])?;
                offset += used;
                msg.reject_duplicates = tpdu.first_octet.reject_duplicates;
                msg.vp_format = tpdu.first_octet.vpf;
                msg.status_report_request = tpdu.first_octet.status_report_request;
                msg.udh_indicator = tpdu.first_octet.udhi;
                msg.reply_path = tpdu.first_octet.reply_path;
                msg.message_reference = tpdu.message_reference;
                msg.encoding = tpdu.encoding;
                if let Some(vp) = tpdu.validity_period {
                    msg.validity_period = ValidityPeriod::from_octet(vp);
                }
                msg.address = tpdu.destination_address;
                msg.text = decode_user_data(tpdu.encoding, &tpdu.user_data,
                                            tpdu.user_data_len)?;
            },
            other => return Err(SmsError::UnknownMessageType(other as u8))
        }
        Ok((offset, msg))
    }

    fn encode_user_data(&self) -> SmsResult<(u8, Vec<u8>)> {
        match self.encoding {
            MessageEncoding::Gsm7Bit => {
                let septets = gsm_encoding::gsm_encode_string(&self.text)?;
                if septets.len() > usize::from(u8::MAX) {
                    return Err(SmsError::IncorrectSize("user data"));
                }
                let packed = gsm_encoding::pack_septets(&septets);
                Ok((septets.len() as u8, packed))
            },
            MessageEncoding::Ucs2 => {
                let data = ucs2::encode_ucs2(&self.text);
                if data.len() > usize::from(u8::MAX) {
                    return Err(SmsError::IncorrectSize("user data"));
                }
                Ok((data.len() as u8, data))
            }
        }
    }
}

fn decode_user_data(encoding: MessageEncoding, data: &[u8], udl: u8) -> SmsResult<String> {
    match encoding {
        MessageEncoding::Gsm7Bit => {
            // Truncating the septet stream (rather than the decoded string) makes the
            // declared UDL count escape septets exactly once.
            let septets = gsm_encoding::unpack_septets(data, usize::from(udl));
            gsm_encoding::gsm_decode_septets(&septets)
        },
        MessageEncoding::Ucs2 => ucs2::decode_ucs2(data)
    }
}

/// Display wrapper printing octets as uppercase hex, the framing the AT interface uses.
pub struct HexData<'a>(pub &'a [u8]);
impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
impl<'a> HexData<'a> {
    /// Decodes a hex string (as read back from a modem) into octets.
    pub fn decode(data: &str) -> SmsResult<Vec<u8>> {
        data.as_bytes()
            .chunks(2)
            .map(::std::str::from_utf8)
            .map(|x| {
                match x {
                    Ok(x) => u8::from_str_radix(x, 16)
                        .map_err(|_| SmsError::InvalidDigits),
                    Err(_) => Err(SmsError::InvalidDigits)
                }
            })
            .collect()
    }
}
