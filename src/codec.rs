//! Canonical binary encoding of sequence sets.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! count:u32
//! count × { instants:u32 lower_inc:u8 upper_inc:u8 interpolation:u8
//!           instants × { value timestamp:i64 } }
//! ```
//!
//! Values use the fixed-width encoding of their [`TemporalValue`] impl; text
//! is length-prefixed. Decoding rebuilds the set without normalization, so a
//! decoded value encodes back to the same bytes.

use crate::config::Config;
use crate::error::{Result, TempusError};
use crate::temporal::{Interpolation, TInstant, TSequence, TSequenceSet};
use crate::value::{TemporalValue, ensure_remaining};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Read;
use tempus_types::time::Timestamp;

const COUNT_LEN: usize = 4;
const SEQUENCE_HEADER_LEN: usize = 4 + 1 + 1 + 1;
const TIMESTAMP_LEN: usize = 8;

/// Encode a sequence set into a fresh buffer.
pub fn encode<V: TemporalValue>(set: &TSequenceSet<V>) -> Bytes {
    let capacity = COUNT_LEN
        + set.count() * SEQUENCE_HEADER_LEN
        + set.num_instants() * (TIMESTAMP_LEN + 8);
    let mut buf = BytesMut::with_capacity(capacity);
    encode_into(set, &mut buf);
    buf.freeze()
}

/// Append the encoding of `set` to `buf`.
pub fn encode_into<V: TemporalValue>(set: &TSequenceSet<V>, buf: &mut BytesMut) {
    buf.put_u32(set.count() as u32);
    for seq in set.sequences() {
        buf.put_u32(seq.num_instants() as u32);
        buf.put_u8(u8::from(seq.lower_inc()));
        buf.put_u8(u8::from(seq.upper_inc()));
        buf.put_u8(seq.interpolation().to_u8());
        for inst in seq.instants() {
            inst.value().encode(buf);
            buf.put_i64(inst.timestamp().as_micros());
        }
    }
}

/// Decode with the default limits.
pub fn decode<V: TemporalValue>(bytes: &[u8]) -> Result<TSequenceSet<V>> {
    decode_with_config(bytes, &Config::default())
}

pub fn decode_with_config<V: TemporalValue>(bytes: &[u8], config: &Config) -> Result<TSequenceSet<V>> {
    config.validate().map_err(TempusError::Config)?;
    let mut buf = bytes;

    ensure_remaining(&buf, COUNT_LEN)?;
    let count = buf.get_u32() as usize;
    if count == 0 {
        return Err(TempusError::InvalidFormat(
            "encoded sequence set has no sequences".to_string(),
        ));
    }
    if count > config.max_sequences {
        log::warn!(
            "Rejecting encoded sequence set with {} sequences (limit {})",
            count,
            config.max_sequences
        );
        return Err(TempusError::InvalidInput(format!(
            "sequence count {} exceeds limit {}",
            count, config.max_sequences
        )));
    }

    // Capacity is bounded by what the input could possibly hold
    let mut sequences = Vec::with_capacity(count.min(buf.remaining() / SEQUENCE_HEADER_LEN));
    for _ in 0..count {
        sequences.push(decode_sequence(&mut buf, config)?);
    }
    if buf.has_remaining() {
        return Err(TempusError::InvalidFormat(format!(
            "{} trailing bytes after sequence set",
            buf.remaining()
        )));
    }
    TSequenceSet::from_sequences(sequences, false)
}

/// Read the whole of `reader` and decode it.
pub fn read_from<V: TemporalValue, R: Read>(reader: &mut R, config: &Config) -> Result<TSequenceSet<V>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_with_config(&bytes, config)
}

fn decode_sequence<V: TemporalValue, B: Buf>(buf: &mut B, config: &Config) -> Result<TSequence<V>> {
    ensure_remaining(buf, SEQUENCE_HEADER_LEN)?;
    let n = buf.get_u32() as usize;
    let lower_inc = decode_flag(buf.get_u8())?;
    let upper_inc = decode_flag(buf.get_u8())?;
    let tag = buf.get_u8();
    let interpolation = Interpolation::from_u8(tag)
        .ok_or_else(|| TempusError::InvalidFormat(format!("unknown interpolation tag {}", tag)))?;

    if n == 0 {
        return Err(TempusError::InvalidFormat(
            "encoded sequence has no instants".to_string(),
        ));
    }
    if n > config.max_instants {
        log::warn!(
            "Rejecting encoded sequence with {} instants (limit {})",
            n,
            config.max_instants
        );
        return Err(TempusError::InvalidInput(format!(
            "instant count {} exceeds limit {}",
            n, config.max_instants
        )));
    }

    let mut instants = Vec::with_capacity(n.min(buf.remaining() / TIMESTAMP_LEN));
    for _ in 0..n {
        let value = V::decode(buf)?;
        ensure_remaining(buf, TIMESTAMP_LEN)?;
        let t = Timestamp::from_micros(buf.get_i64());
        instants.push(TInstant::new(value, t));
    }
    // An open stepwise end repeats the value before it; anything else would
    // not survive re-encoding
    if interpolation == Interpolation::Stepwise
        && !upper_inc
        && n > 1
        && !instants[n - 1].value().value_eq(instants[n - 2].value())
    {
        return Err(TempusError::InvalidFormat(format!(
            "stepwise sequence with an exclusive upper bound ends on a new value at {}",
            instants[n - 1].timestamp()
        )));
    }
    TSequence::new(instants, lower_inc, upper_inc, interpolation, false)
}

fn decode_flag(byte: u8) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TempusError::InvalidFormat(format!(
            "bound flag must be 0 or 1, got {}",
            other
        ))),
    }
}
