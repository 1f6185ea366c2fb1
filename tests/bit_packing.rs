use proptest::prelude::*;
use rlwe_wire::WireReader;
use rlwe_wire::bitstream::{pack_component, unpack_component};
use rlwe_wire::math::packed_len;

fn masked(values: &[u64], bit_length: u8) -> Vec<u64> {
    let mask = if bit_length == 64 {
        u64::MAX
    } else {
        (1u64 << bit_length) - 1
    };
    values.iter().map(|v| v & mask).collect()
}

fn bit_at(bytes: &[u8], position: usize) -> u64 {
    ((bytes[position / 8] >> (position % 8)) & 1) as u64
}

proptest! {
    #[test]
    fn unpack_inverts_pack(
        raw in prop::collection::vec(any::<u64>(), 0..200),
        bit_length in 1u8..=64,
    ) {
        let values = masked(&raw, bit_length);
        let mut out = Vec::new();
        pack_component(&values, bit_length, &mut out).unwrap();
        prop_assert_eq!(out.len(), packed_len(values.len(), bit_length));

        let mut reader = WireReader::new(&out);
        let decoded = unpack_component(&mut reader, bit_length, values.len()).unwrap();
        prop_assert_eq!(decoded, values);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn bit_k_of_value_i_lands_at_i_times_b_plus_k(
        raw in prop::collection::vec(any::<u64>(), 1..20),
        bit_length in 1u8..=64,
    ) {
        let values = masked(&raw, bit_length);
        let mut out = Vec::new();
        pack_component(&values, bit_length, &mut out).unwrap();
        let b = bit_length as usize;
        for (i, &v) in values.iter().enumerate() {
            for k in 0..b {
                prop_assert_eq!(bit_at(&out, i * b + k), (v >> k) & 1);
            }
        }
        // unused high bits of the last byte stay zero
        for position in values.len() * b..out.len() * 8 {
            prop_assert_eq!(bit_at(&out, position), 0);
        }
    }

    #[test]
    fn consecutive_runs_leave_following_fields_aligned(
        first in prop::collection::vec(0u64..(1 << 13), 0..40),
        second in prop::collection::vec(0u64..2, 0..40),
        marker in any::<u8>(),
    ) {
        let mut out = Vec::new();
        pack_component(&first, 13, &mut out).unwrap();
        pack_component(&second, 1, &mut out).unwrap();
        out.push(marker);

        let mut reader = WireReader::new(&out);
        prop_assert_eq!(unpack_component(&mut reader, 13, first.len()).unwrap(), first);
        prop_assert_eq!(unpack_component(&mut reader, 1, second.len()).unwrap(), second);
        prop_assert_eq!(reader.read_u8("marker").unwrap(), marker);
        prop_assert!(reader.finish().is_ok());
    }
}

#[test]
fn byte_length_boundaries() {
    for (count, bit_length, expected) in [
        (0usize, 1u8, 0usize),
        (0, 64, 0),
        (1, 1, 1),
        (1, 64, 8),
        (8, 1, 1),
        (9, 1, 2),
        (3, 64, 24),
        (8, 5, 5),
        (8, 3, 3),
    ] {
        let values = vec![if bit_length == 64 { u64::MAX } else { 1 }; count];
        let mut out = Vec::new();
        pack_component(&values, bit_length, &mut out).unwrap();
        assert_eq!(out.len(), expected, "{count} values at {bit_length} bits");
        assert_eq!(packed_len(count, bit_length), expected);
    }
}

#[test]
fn full_width_values_survive() {
    let values = [u64::MAX, 0, 1 << 63, 0x0123_4567_89ab_cdef];
    let mut out = Vec::new();
    pack_component(&values, 64, &mut out).unwrap();
    assert_eq!(&out[..8], &u64::MAX.to_le_bytes());
    let mut reader = WireReader::new(&out);
    assert_eq!(unpack_component(&mut reader, 64, 4).unwrap(), values);
}
