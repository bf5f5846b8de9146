use crate::error::Result;
use crate::preamble::Preamble;
use crate::reader::VectorReader;
use std::io::{BufRead, Write};

/// Copy the preamble of `input` to `out` without reading any row.
pub fn describe<R, W>(input: R, out: &mut W) -> Result<Preamble>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let (preamble, _) = VectorReader::new(input)?.into_parts();
    preamble.write_to(out)?;
    Ok(preamble)
}
