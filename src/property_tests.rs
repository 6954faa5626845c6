//! Property-based round-trip tests for the codec laws: message encode/decode inversion,
//! semi-octet and septet-packing bijections, validity period bucketing, and TOA tracking.

use std::time::Duration;
use chrono::{FixedOffset, TimeZone};
use proptest::prelude::*;

use crate::gsm_encoding;
use crate::semi_octet;
use crate::ucs2;
use crate::pdu::{AddressType, Message, MessageEncoding, MessageType,
                 NumberingPlanIdentification, PhoneNumber, SmscTimestamp, TypeOfNumber,
                 ValidityPeriod, VpFormat};

// Every character here is representable in the default alphabet or its extension table.
const GSM_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 \
@£$¥èéùìòÇ\n\rØøÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ!\"#¤%&'()*+,-./:;<=>?¡ÄÖÑÜ¿äöñüà^{}\\[~]|€";

fn arb_gsm_string() -> impl Strategy<Value = String> {
    let chars = prop::sample::select(GSM_CHARS.chars().collect::<Vec<_>>());
    // 80 characters is at most 160 septets even if every one needs an escape.
    prop::collection::vec(chars, 0..80).prop_map(|v| v.into_iter().collect())
}

fn arb_ucs2_string() -> impl Strategy<Value = String> {
    // 35 scalar values is at most 70 UTF-16 code units.
    prop::collection::vec(any::<char>(), 0..35).prop_map(|v| v.into_iter().collect())
}

fn arb_text() -> impl Strategy<Value = (MessageEncoding, String)> {
    prop_oneof![
        arb_gsm_string().prop_map(|t| (MessageEncoding::Gsm7Bit, t)),
        arb_ucs2_string().prop_map(|t| (MessageEncoding::Ucs2, t)),
    ]
}

fn arb_phone() -> impl Strategy<Value = PhoneNumber> {
    (any::<bool>(), prop::collection::vec(0u8..10, 1..=12))
        .prop_map(|(international, digits)| {
            let ton = if international {
                TypeOfNumber::International
            } else {
                TypeOfNumber::National
            };
            PhoneNumber {
                type_addr: AddressType {
                    type_of_number: ton,
                    numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
                },
                digits
            }
        })
}

fn arb_sca() -> impl Strategy<Value = PhoneNumber> {
    prop_oneof![Just(PhoneNumber::default()), arb_phone()]
}

fn arb_timestamp() -> impl Strategy<Value = SmscTimestamp> {
    (2000i32..2100, 1u32..13, 1u32..29, 0u32..24, 0u32..60, 0u32..60, -56i32..57)
        .prop_map(|(y, mo, d, h, mi, s, quarters)| {
            let offset = FixedOffset::east_opt(quarters * 900).unwrap();
            SmscTimestamp(offset.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
        })
}

fn arb_deliver() -> impl Strategy<Value = Message> {
    (arb_sca(), arb_phone(), arb_timestamp(), arb_text(),
     any::<(bool, bool, bool, bool, bool)>())
        .prop_map(|(sca, addr, ts, (encoding, text), (rp, udhi, sri, mms, lp))| {
            let mut msg = Message::default();
            msg.service_center_address = sca;
            msg.address = addr;
            msg.service_center_time = Some(ts);
            msg.encoding = encoding;
            msg.text = text;
            msg.reply_path = rp;
            msg.udh_indicator = udhi;
            msg.status_report_indication = sri;
            msg.more_messages_to_send = mms;
            msg.loop_prevention = lp;
            msg
        })
}

fn arb_submit() -> impl Strategy<Value = Message> {
    (arb_sca(), arb_phone(), arb_text(), any::<u8>(),
     prop_oneof![Just(VpFormat::NotPresent), Just(VpFormat::Relative)], any::<u8>(),
     any::<(bool, bool, bool, bool)>())
        .prop_map(|(sca, addr, (encoding, text), mr, vpf, vp_octet, (rp, udhi, srr, rd))| {
            let mut msg = Message::default();
            msg.message_type = MessageType::Submit;
            msg.service_center_address = sca;
            msg.address = addr;
            msg.encoding = encoding;
            msg.text = text;
            msg.message_reference = mr;
            msg.vp_format = vpf;
            if vpf == VpFormat::Relative {
                msg.validity_period = ValidityPeriod::from_octet(vp_octet);
            }
            msg.reply_path = rp;
            msg.udh_indicator = udhi;
            msg.status_report_request = srr;
            msg.reject_duplicates = rd;
            msg
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_deliver_round_trip(msg in arb_deliver()) {
        let (_, octets) = msg.to_bytes().unwrap();
        let (consumed, back) = Message::from_bytes(&octets).unwrap();
        prop_assert_eq!(consumed, octets.len());
        prop_assert_eq!(back, msg);
    }

    #[test]
    fn prop_submit_round_trip(msg in arb_submit()) {
        let (_, octets) = msg.to_bytes().unwrap();
        let (consumed, back) = Message::from_bytes(&octets).unwrap();
        prop_assert_eq!(consumed, octets.len());
        prop_assert_eq!(back, msg);
    }

    #[test]
    fn prop_decode_encode_reproduces_octets(msg in prop_oneof![arb_deliver(), arb_submit()]) {
        let (tpdu_len, octets) = msg.to_bytes().unwrap();
        let (_, back) = Message::from_bytes(&octets).unwrap();
        let (tpdu_len2, octets2) = back.to_bytes().unwrap();
        prop_assert_eq!(octets2, octets);
        prop_assert_eq!(tpdu_len2, tpdu_len);
    }

    #[test]
    fn prop_semi_octet_bijection_on_even_digit_counts(
        pairs in prop::collection::vec((0u8..10, 0u8..10), 0..12)
    ) {
        let digits: Vec<u8> = pairs.into_iter().flat_map(|(a, b)| vec![a, b]).collect();
        let octets = semi_octet::encode_digits(&digits);
        prop_assert_eq!(octets.len() * 2, digits.len());
        prop_assert_eq!(semi_octet::decode_digits(&octets).unwrap(), digits);
    }

    #[test]
    fn prop_odd_digit_counts_round_trip(digits in prop::collection::vec(0u8..10, 1..24)) {
        let octets = semi_octet::encode_digits(&digits);
        prop_assert_eq!(semi_octet::decode_digits(&octets).unwrap(), digits);
    }

    #[test]
    fn prop_septet_packing_bijection(septets in prop::collection::vec(0u8..128, 0..200)) {
        let packed = gsm_encoding::pack_septets(&septets);
        prop_assert_eq!(packed.len(), (septets.len() * 7 + 7) / 8);
        prop_assert_eq!(gsm_encoding::unpack_septets(&packed, septets.len()), septets);
    }

    #[test]
    fn prop_gsm_text_round_trip(text in arb_gsm_string()) {
        let septets = gsm_encoding::gsm_encode_string(&text).unwrap();
        prop_assert_eq!(gsm_encoding::gsm_decode_septets(&septets).unwrap(), text);
    }

    #[test]
    fn prop_ucs2_round_trip(text in arb_ucs2_string()) {
        prop_assert_eq!(ucs2::decode_ucs2(&ucs2::encode_ucs2(&text)).unwrap(), text);
    }

    #[test]
    fn prop_vp_octet_round_trip_is_identity(octet in any::<u8>()) {
        prop_assert_eq!(ValidityPeriod::from_octet(octet).to_octet(), octet);
    }

    #[test]
    fn prop_vp_duration_round_trip_is_canonical(secs in 0u64..(70 * 7 * 86_400)) {
        let octet = ValidityPeriod(Duration::from_secs(secs)).to_octet();
        let canonical = ValidityPeriod::from_octet(octet);
        prop_assert_eq!(canonical.to_octet(), octet);
    }

    #[test]
    fn prop_toa_tracks_plus_prefix(
        digits in prop::collection::vec(0u8..10, 1..13), international in any::<bool>()
    ) {
        let mut s = String::new();
        if international {
            s.push('+');
        }
        for d in &digits {
            s.push((b'0' + d) as char);
        }
        let parsed: PhoneNumber = s.parse().unwrap();
        let (count, octets) = parsed.encode();
        prop_assert_eq!(count, digits.len());
        prop_assert_eq!(octets[0], if international { 0x91 } else { 0xA1 });
    }
}
