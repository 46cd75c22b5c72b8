use std::io::Read;

/// Upper bound on the up-front allocation for one read. A size header can
/// claim any length; the buffer only grows as bytes actually arrive.
const MAX_PREALLOC: usize = 64 * 1024;

/// Read until `n` bytes have arrived or the stream ends.
///
/// Returns fewer than `n` bytes only at end of stream; the caller decides
/// whether that is an error. Interrupted reads are retried by
/// `read_to_end`.
pub(crate) fn read_up_to<R: Read + ?Sized>(reader: &mut R, n: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(n.min(MAX_PREALLOC));
    Read::take(&mut *reader, n as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
