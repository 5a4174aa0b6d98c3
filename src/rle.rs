use crate::bitmap::{Bitmap, Run};
use crate::code::Code;
use crate::error::{Error, Result};
use crate::MAX_RUN_LENGTH;
use std::io;

/// Streaming encoder: pixels go in row-major order, codes come out.
pub struct Rle<W> {
    status: RleStatus,
    width: usize,
    column: usize,
    rows: usize,
    writer: W,
}

#[derive(Debug, Copy, Clone)]
enum RleStatus {
    Wait,
    Run(Run),
}

impl<W: io::Write> Rle<W> {
    pub fn new(writer: W, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidDimensions { width, height: 0 });
        }
        if width > MAX_RUN_LENGTH as usize {
            return Err(Error::RowTooWide(width));
        }
        Ok(Rle {
            status: RleStatus::Wait,
            width,
            column: 0,
            rows: 0,
            writer,
        })
    }

    #[inline(always)]
    pub fn update(&mut self, pixel: u8) -> Result<()> {
        trace!("update pixel {pixel} at column {}", self.column);
        self.status = match self.status {
            RleStatus::Wait => RleStatus::Run(Run::new(pixel, 1)),
            RleStatus::Run(run) if run.value == pixel && run.length < MAX_RUN_LENGTH => {
                RleStatus::Run(Run::new(pixel, run.length + 1))
            }
            RleStatus::Run(run) => {
                self.emit(run)?;
                RleStatus::Run(Run::new(pixel, 1))
            }
        };
        self.column += 1;

        // runs never cross a row, even if the next row starts with the same index
        if self.column == self.width {
            if let RleStatus::Run(run) = self.status {
                self.emit(run)?;
            }
            Code::EndOfLine.write_to(&mut self.writer)?;
            self.status = RleStatus::Wait;
            self.column = 0;
            self.rows += 1;
            debug!("row {} closed", self.rows);
        }
        Ok(())
    }

    #[inline(always)]
    fn emit(&mut self, run: Run) -> io::Result<()> {
        let (code, repeat) = Code::from_run(run);
        for _ in 0..repeat {
            code.write_to(&mut self.writer)?;
        }
        Ok(())
    }

    /// Number of rows terminated so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finalize(mut self) -> Result<()> {
        trace!("last status: {:?}", self.status);
        if self.column != 0 {
            return Err(Error::IncompleteRow(self.column));
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: io::Write> io::Write for Rle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for pixel in buf.iter() {
            self.update(*pixel)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Encodes a whole bitmap into a fresh buffer.
pub fn encode(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bitmap.pixels().len() / 4 + 2 * bitmap.height());
    let mut rle = Rle::new(&mut out, bitmap.width())?;
    for pixel in bitmap.pixels() {
        rle.update(*pixel)?;
    }
    rle.finalize()?;
    debug!(
        "encoded {}x{} bitmap into {} bytes",
        bitmap.width(),
        bitmap.height(),
        out.len()
    );
    Ok(out)
}
