//! # Object Bitmap RLE
//!
//! Run-length scheme for the palette-indexed bitmaps carried by the object
//! definition segments of a PGS (Blu-ray) subtitle stream.
//!
//! Any byte other than `0x00` is a single pixel of that palette index.
//! `0x00` escapes a run, described by the byte that follows:
//!
//! ```text
//!          MSB      LSB
//!           │        │
//!           ▼        ▼
//!  0x00     CLNN NNNN   [NNNN NNNN]   [VVVV VVVV]
//!           ▲▲  ▲
//!   COLOR───┘│  └─length (high bits when LONG)
//!     LONG───┘
//! ```
//!
//! | C | L | extra bytes      | pixels                        |
//! |---|---|------------------|-------------------------------|
//! | 0 | 0 | -                | N transparent (1..=63)        |
//! | 0 | 1 | length low       | N transparent (64..=16383)    |
//! | 1 | 0 | value            | N × value (3..=63)            |
//! | 1 | 1 | length low, value| N × value (64..=16383)        |
//!
//! `0x00 0x00` ends the current line. Runs never cross a line, so a line is
//! never wider than 16383 pixels.
//!
//! Colored runs of one or two pixels are written as bare indices.
//!
//! The stream carries no size. Decoding returns the lines as they were
//! terminated; checking them against the object dimensions is up to the
//! caller, [`Bitmap::from_rows`] does exactly that.

#[macro_use]
extern crate log;

mod bitmap;
mod code;
mod derle;
mod error;
mod rle;
mod segment;

pub use bitmap::{Bitmap, Run};
pub use code::Code;
pub use derle::{decode, DeRle, DecoderState};
pub use error::{Error, Result};
pub use rle::{encode, Rle};
pub use segment::{decode_objects, encode_object, ObjectRecord, ObjectSegment, SegmentBuilder};

const ESCAPE: u8 = 0x00;
const FLAG_LONG: u8 = 0b0100_0000;
const FLAG_COLOR: u8 = 0b1000_0000;
const LENGTH_MASK: u8 = 0b0011_1111;

/// longest run a single code can describe
pub const MAX_RUN_LENGTH: u16 = 0x3FFF;
const SHORT_RUN_MAX: u16 = LENGTH_MASK as u16;
const LITERAL_RUN_MAX: u16 = 2;
