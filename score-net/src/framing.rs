//! Length-prefixed framing for TCP messages.
//!
//! Wire format: `[u32 length (big-endian)][JSON payload]`.

use std::io::{self, Read, Write};

use serde::{de::DeserializeOwned, Serialize};

/// Upper bound on a single frame. A 4096-sample detection request is
/// well under 100 KB of JSON, so this is generous headroom.
const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Write one length-prefixed JSON frame to a stream.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> io::Result<()> {
    let payload =
        serde_json::to_vec(msg).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writer.write_all(&(payload.len() as u32).to_be_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()
}

/// Read one length-prefixed JSON frame from a stream.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    // The claimed payload is NOT consumed here, so the stream is out
    // of sync; callers must drop the connection on this error. The
    // kind is distinct from the parse failure below, where the whole
    // frame has been read and the stream stays usable.
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::FileTooLarge,
            format!("frame too large: {len} bytes"),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    serde_json::from_slice(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
