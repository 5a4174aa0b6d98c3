use crate::code::Code;
use crate::error::{Error, Result};
use crate::{ESCAPE, LENGTH_MASK};
use std::{io, iter, mem};

/// Position of the decoder inside the code grammar.
///
/// The long forms carry the length bits read so far, so a transition
/// never depends on anything but the state and the incoming byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecoderState {
    NewCode,
    NeedMore,
    LongTransparent { high: u8 },
    ShortColor { length: u8 },
    LongColorAwaitingLengthByte { high: u8 },
    LongColorAwaitingColorByte { length: u16 },
}

impl DecoderState {
    /// Feeds one byte, returning the next state and the code it completed.
    pub fn next(self, byte: u8) -> (DecoderState, Option<Code>) {
        use DecoderState::*;

        match self {
            NewCode if byte == ESCAPE => (NeedMore, None),
            NewCode => (NewCode, Some(Code::Literal(byte))),
            NeedMore if byte == ESCAPE => (NewCode, Some(Code::EndOfLine)),
            NeedMore => {
                let seed = byte & LENGTH_MASK;
                match byte >> 6 {
                    0b00 => (NewCode, Some(Code::ShortTransparent(seed))),
                    0b01 => (LongTransparent { high: seed }, None),
                    0b10 => (ShortColor { length: seed }, None),
                    _ => (LongColorAwaitingLengthByte { high: seed }, None),
                }
            }
            LongTransparent { high } => (
                NewCode,
                Some(Code::LongTransparent(long_length(high, byte))),
            ),
            ShortColor { length } => (
                NewCode,
                Some(Code::ShortColor {
                    length,
                    value: byte,
                }),
            ),
            // a zero length keeps collecting length bytes, some encoders pad the long form
            LongColorAwaitingLengthByte { high } => match long_length(high, byte) {
                0 => (LongColorAwaitingLengthByte { high: 0 }, None),
                length => (LongColorAwaitingColorByte { length }, None),
            },
            LongColorAwaitingColorByte { length } => (
                NewCode,
                Some(Code::LongColor {
                    length,
                    value: byte,
                }),
            ),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecoderState::NewCode => "NewCode",
            DecoderState::NeedMore => "NeedMore",
            DecoderState::LongTransparent { .. } => "LongTransparent",
            DecoderState::ShortColor { .. } => "ShortColor",
            DecoderState::LongColorAwaitingLengthByte { .. } => "LongColorAwaitingLengthByte",
            DecoderState::LongColorAwaitingColorByte { .. } => "LongColorAwaitingColorByte",
        }
    }
}

#[inline(always)]
fn long_length(high: u8, low: u8) -> u16 {
    (u16::from(high) << 8) | u16::from(low)
}

/// Streaming decoder. Bytes may arrive split at any position, which is
/// how object data fragmented over several segments shows up.
#[derive(Debug)]
pub struct DeRle {
    state: DecoderState,
    line: Vec<u8>,
    rows: Vec<Vec<u8>>,
}

impl Default for DeRle {
    fn default() -> Self {
        DeRle::new()
    }
}

impl DeRle {
    pub fn new() -> DeRle {
        DeRle {
            state: DecoderState::NewCode,
            line: vec![],
            rows: vec![],
        }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) {
        let (state, code) = self.state.next(byte);
        trace!("byte 0x{byte:02X}: {:?} -> {:?}", self.state, state);
        self.state = state;
        if let Some(code) = code {
            self.apply(code);
        }
    }

    fn apply(&mut self, code: Code) {
        trace!("decoded {code:?}");
        match code.run() {
            Some(run) => self
                .line
                .extend(iter::repeat(run.value).take(run.length as usize)),
            None => {
                debug!("row {} closed with {} pixels", self.rows.len(), self.line.len());
                self.rows.push(mem::take(&mut self.line));
            }
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Rows closed by an end-of-line marker so far.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Returns the decoded rows. Row lengths are not checked against each
    /// other; see [`crate::Bitmap::from_rows`].
    pub fn finalize(self) -> Result<Vec<Vec<u8>>> {
        if self.state != DecoderState::NewCode {
            return Err(Error::TruncatedCode(self.state.name()));
        }
        if !self.line.is_empty() {
            return Err(Error::UnterminatedRow(self.line.len()));
        }
        Ok(self.rows)
    }
}

impl io::Write for DeRle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        trace!("chunk of {} bytes: {}", buf.len(), hex::encode(buf));
        for byte in buf.iter() {
            self.update(*byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Decodes one complete stream into rows of palette indices.
pub fn decode(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let derle = data.iter().fold(DeRle::new(), |mut derle, byte| {
        derle.update(*byte);
        derle
    });
    derle.finalize()
}

#[cfg(test)]
mod tests {
    use super::{decode, DeRle, DecoderState};
    use crate::code::Code;
    use crate::error::Error;
    use crate::testing::setup;
    use std::io::Write;

    #[test]
    fn test_transitions() {
        use DecoderState::*;

        let cases = [
            (NewCode, 0x05, NewCode, Some(Code::Literal(5))),
            (NewCode, 0x00, NeedMore, None),
            (NeedMore, 0x00, NewCode, Some(Code::EndOfLine)),
            (NeedMore, 0x04, NewCode, Some(Code::ShortTransparent(4))),
            (NeedMore, 0x41, LongTransparent { high: 1 }, None),
            (NeedMore, 0x83, ShortColor { length: 3 }, None),
            (NeedMore, 0xC2, LongColorAwaitingLengthByte { high: 2 }, None),
            (
                LongTransparent { high: 1 },
                0x2C,
                NewCode,
                Some(Code::LongTransparent(300)),
            ),
            (
                ShortColor { length: 3 },
                0x09,
                NewCode,
                Some(Code::ShortColor { length: 3, value: 9 }),
            ),
            (
                LongColorAwaitingLengthByte { high: 2 },
                0x00,
                LongColorAwaitingColorByte { length: 512 },
                None,
            ),
            (
                LongColorAwaitingLengthByte { high: 0 },
                0x00,
                LongColorAwaitingLengthByte { high: 0 },
                None,
            ),
            (
                LongColorAwaitingColorByte { length: 512 },
                0x00,
                NewCode,
                Some(Code::LongColor { length: 512, value: 0 }),
            ),
        ];
        for (state, byte, expected_state, expected_code) in cases {
            assert_eq!(
                state.next(byte),
                (expected_state, expected_code),
                "{state:?} on 0x{byte:02X}"
            );
        }
    }

    #[test]
    fn test_derle_decode() {
        setup();
        let test_vector: [(&str, Vec<Vec<u8>>); 5] = [
            ("00040000", vec![vec![0, 0, 0, 0]]),
            ("010202030000", vec![vec![1, 2, 2, 3]]),
            ("00830100020000", vec![vec![1, 1, 1, 0, 0]]),
            ("0000", vec![vec![]]),
            ("00010900000900010000", vec![vec![0, 9], vec![9, 0]]),
        ];
        for (input, expected) in test_vector {
            let input = hex::decode(input).unwrap();
            assert_eq!(decode(&input).unwrap(), expected, "{}", hex::encode(&input));
        }
    }

    #[test]
    fn test_derle_long_runs() {
        setup();
        let input = hex::decode("00c046050000").unwrap();
        assert_eq!(decode(&input).unwrap(), vec![vec![5u8; 70]]);

        let input = hex::decode("0041f4".to_string() + "0000").unwrap();
        assert_eq!(decode(&input).unwrap(), vec![vec![0u8; 500]]);

        // long form used for a short distance
        let input = hex::decode("00c003070000").unwrap();
        assert_eq!(decode(&input).unwrap(), vec![vec![7u8; 3]]);

        // zero-padded long color length
        let input = hex::decode("00c00046050000").unwrap();
        assert_eq!(decode(&input).unwrap(), vec![vec![5u8; 70]]);

        // a color index that equals the escape value
        let input = hex::decode("00c100000000").unwrap();
        assert_eq!(decode(&input).unwrap(), vec![vec![0u8; 256]]);
    }

    #[test]
    fn test_derle_split_writes() {
        setup();
        let input = hex::decode(
            ["00c04605", "0000", "008301", "0002", "0000", "007fff", "0000"].concat(),
        )
        .unwrap();
        let expected = decode(&input).unwrap();
        assert_eq!(expected.len(), 3);
        for split in 0..input.len() {
            let mut derle = DeRle::new();
            derle.write_all(&input[..split]).unwrap();
            derle.write_all(&input[split..]).unwrap();
            assert_eq!(derle.finalize().unwrap(), expected, "split at {split}");
        }
    }

    #[test]
    fn test_derle_ragged_rows_are_kept() {
        setup();
        let input = hex::decode("0102000001000003030300000000").unwrap();
        let rows = decode(&input).unwrap();
        assert_eq!(rows, vec![vec![1, 2], vec![1], vec![3, 3, 3], vec![]]);
    }

    #[test]
    fn test_derle_truncated() {
        setup();
        let cases = [
            ("0102", None),
            ("0100", Some("NeedMore")),
            ("0041", Some("LongTransparent")),
            ("0083", Some("ShortColor")),
            ("00c0", Some("LongColorAwaitingLengthByte")),
            ("00c046", Some("LongColorAwaitingColorByte")),
        ];
        for (input, state) in cases {
            let input = hex::decode(input).unwrap();
            match (decode(&input), state) {
                (Err(Error::TruncatedCode(name)), Some(expected)) => assert_eq!(name, expected),
                (Err(Error::UnterminatedRow(2)), None) => {}
                (other, _) => panic!("unexpected result {other:?}"),
            }
        }
    }
}
