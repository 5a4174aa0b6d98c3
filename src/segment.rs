//! Glue between the codec and the object definition segments that carry
//! its payload. Segment layout itself lives with the caller; this module
//! only needs an id and the data bytes of each record.

use crate::bitmap::Bitmap;
use crate::derle::DeRle;
use crate::error::{Error, Result};
use crate::rle::encode;

/// A record holding encoded object data, or a fragment of it.
pub trait ObjectRecord {
    fn object_id(&self) -> u16;
    fn data(&self) -> &[u8];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSegment {
    pub object_id: u16,
    pub version: u8,
    pub data: Vec<u8>,
}

impl ObjectRecord for ObjectSegment {
    fn object_id(&self) -> u16 {
        self.object_id
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Packs an encoded payload into one or more transport segments.
pub trait SegmentBuilder {
    type Segment;

    fn build(
        &mut self,
        object_id: u16,
        version: u8,
        width: u16,
        height: u16,
        payload: Vec<u8>,
    ) -> Result<Vec<Self::Segment>>;
}

/// Encodes `bitmap` and hands the payload to `builder`.
pub fn encode_object<B: SegmentBuilder>(
    builder: &mut B,
    bitmap: &Bitmap,
    object_id: u16,
    version: u8,
) -> Result<Vec<B::Segment>> {
    let invalid = || Error::InvalidDimensions {
        width: bitmap.width(),
        height: bitmap.height(),
    };
    let width = u16::try_from(bitmap.width()).map_err(|_| invalid())?;
    let height = u16::try_from(bitmap.height()).map_err(|_| invalid())?;
    let payload = encode(bitmap)?;
    debug!(
        "object {object_id} v{version}: {width}x{height}, {} payload bytes",
        payload.len()
    );
    builder.build(object_id, version, width, height, payload)
}

/// Decodes the data of `records` as one continuous stream.
///
/// With `object_id` set only the matching records take part, in their
/// original order.
pub fn decode_objects<'a, R, I>(records: I, object_id: Option<u16>) -> Result<Vec<Vec<u8>>>
where
    R: ObjectRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut derle = DeRle::new();
    for record in records
        .into_iter()
        .filter(|record| object_id.map_or(true, |id| id == record.object_id()))
    {
        trace!(
            "feeding {} bytes of object {}",
            record.data().len(),
            record.object_id()
        );
        for byte in record.data() {
            derle.update(*byte);
        }
    }
    derle.finalize()
}
