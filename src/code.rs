use crate::bitmap::Run;
use crate::{
    ESCAPE, FLAG_COLOR, FLAG_LONG, LENGTH_MASK, LITERAL_RUN_MAX, MAX_RUN_LENGTH, SHORT_RUN_MAX,
};
use std::io;

/// One addressable unit of the encoded stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Code {
    /// A single non-transparent pixel written as-is.
    Literal(u8),
    ShortTransparent(u8),
    LongTransparent(u16),
    ShortColor { length: u8, value: u8 },
    LongColor { length: u16, value: u8 },
    EndOfLine,
}

impl Code {
    /// Picks the code for `run`, and how many times it has to be written.
    ///
    /// Only literals repeat: a colored run of one or two pixels costs fewer
    /// bytes as raw indices than as an escaped run.
    pub fn from_run(run: Run) -> (Code, u16) {
        debug_assert!(run.length > 0 && run.length <= MAX_RUN_LENGTH);
        let code = if run.is_transparent() {
            if run.length <= SHORT_RUN_MAX {
                Code::ShortTransparent(run.length as u8)
            } else {
                Code::LongTransparent(run.length)
            }
        } else if run.length <= LITERAL_RUN_MAX {
            return (Code::Literal(run.value), run.length);
        } else if run.length <= SHORT_RUN_MAX {
            Code::ShortColor {
                length: run.length as u8,
                value: run.value,
            }
        } else {
            Code::LongColor {
                length: run.length,
                value: run.value,
            }
        };
        (code, 1)
    }

    /// The pixels this code expands to, `None` for the end-of-line marker.
    pub fn run(&self) -> Option<Run> {
        match *self {
            Code::Literal(value) => Some(Run::new(value, 1)),
            Code::ShortTransparent(length) => Some(Run::new(0, length as u16)),
            Code::LongTransparent(length) => Some(Run::new(0, length)),
            Code::ShortColor { length, value } => Some(Run::new(value, length as u16)),
            Code::LongColor { length, value } => Some(Run::new(value, length)),
            Code::EndOfLine => None,
        }
    }

    /// Serialized form, returned as a fixed buffer and the used length.
    ///
    /// Lengths must fit their form: 1..=63 for the short forms and
    /// 1..=16383 for the long ones.
    pub fn to_bytes(&self) -> ([u8; 4], usize) {
        debug_assert!(self.fits(), "{self:?} does not fit its form");
        match *self {
            Code::Literal(value) => ([value, 0, 0, 0], 1),
            Code::ShortTransparent(length) => ([ESCAPE, length, 0, 0], 2),
            Code::LongTransparent(length) => (
                [ESCAPE, FLAG_LONG | (length >> 8) as u8, length as u8, 0],
                3,
            ),
            Code::ShortColor { length, value } => ([ESCAPE, FLAG_COLOR | length, value, 0], 3),
            Code::LongColor { length, value } => (
                [
                    ESCAPE,
                    FLAG_COLOR | FLAG_LONG | (length >> 8) as u8,
                    length as u8,
                    value,
                ],
                4,
            ),
            Code::EndOfLine => ([ESCAPE, ESCAPE, 0, 0], 2),
        }
    }

    fn fits(&self) -> bool {
        match *self {
            Code::ShortTransparent(length) | Code::ShortColor { length, .. } => {
                (1..=LENGTH_MASK).contains(&length)
            }
            Code::LongTransparent(length) | Code::LongColor { length, .. } => {
                (1..=MAX_RUN_LENGTH).contains(&length)
            }
            Code::Literal(value) => value != ESCAPE,
            Code::EndOfLine => true,
        }
    }

    #[inline(always)]
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let (bytes, len) = self.to_bytes();
        trace!("emit {:?} as {}", self, hex::encode(&bytes[..len]));
        writer.write_all(&bytes[..len])
    }
}
