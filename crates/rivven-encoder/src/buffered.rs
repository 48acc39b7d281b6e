//! Buffered decode hand-off
//!
//! Decodes exactly one event from the front of a shared buffer and then
//! trims the buffer so it starts where that event ended. The two wire
//! formats consume input differently, so the hand-off records which
//! discipline was used:
//!
//! - **Textual** (JSON): a streaming decoder reports how far it parsed.
//!   Everything after that offset is its look-ahead and stays in the buffer.
//! - **Binary** (MessagePack): the decoder pulls from a reader over the
//!   buffer. Whatever that reader still holds is the remainder and is kept.
//!
//! ```text
//!  buffer: [ event 1 ][ event 2 ][ event 3 ...
//!           ^consumed ^
//!  begin_buffered_decode -> (handoff, event 1)
//!  reconcile             -> buffer: [ event 2 ][ event 3 ...
//! ```
//!
//! The caller may append bytes between the two calls. Shrinking the buffer
//! in between is a [`EncoderError::Reconcile`] error, never a silent loss.

use crate::error::{EncoderError, Result};
use crate::event::CommonFormatEvent;
use crate::format::WireFormat;
use bytes::{Buf, BytesMut};
use tracing::debug;

/// Hand-off state between [`begin_buffered_decode`] and [`reconcile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferedDecoder {
    /// Streaming JSON decode
    Textual {
        /// Bytes parsed into the event
        consumed: usize,
        /// Buffer length seen by the decoder
        observed: usize,
    },
    /// MessagePack decode from a slice reader
    Binary {
        /// Bytes left in the reader after the event
        unread: usize,
        /// Buffer length seen by the decoder
        observed: usize,
    },
}

impl BufferedDecoder {
    pub fn format(&self) -> WireFormat {
        match self {
            Self::Textual { .. } => WireFormat::Json,
            Self::Binary { .. } => WireFormat::MsgPack,
        }
    }

    /// Number of bytes the decoded event occupied, if consistent.
    pub fn consumed(&self) -> Option<usize> {
        match *self {
            Self::Textual { consumed, observed } => (consumed <= observed).then_some(consumed),
            Self::Binary { unread, observed } => observed.checked_sub(unread),
        }
    }
}

/// Decode one event from the front of `buf`.
///
/// `buf` is not modified; pass the returned hand-off to [`reconcile`] to
/// drop the consumed bytes.
pub fn begin_buffered_decode(
    buf: &[u8],
    format: WireFormat,
) -> Result<(BufferedDecoder, CommonFormatEvent)> {
    if buf.is_empty() {
        return Err(EncoderError::serialization("no event in empty buffer"));
    }
    match format {
        WireFormat::Json => decode_textual(buf),
        WireFormat::MsgPack => decode_binary(buf),
    }
}

fn decode_textual(buf: &[u8]) -> Result<(BufferedDecoder, CommonFormatEvent)> {
    let mut stream = serde_json::Deserializer::from_slice(buf).into_iter::<CommonFormatEvent>();
    let event = match stream.next() {
        Some(event) => event?,
        None => return Err(EncoderError::serialization("no event in buffer")),
    };
    let handoff = BufferedDecoder::Textual {
        consumed: stream.byte_offset(),
        observed: buf.len(),
    };
    Ok((handoff, event))
}

fn decode_binary(buf: &[u8]) -> Result<(BufferedDecoder, CommonFormatEvent)> {
    let mut reader = buf;
    let event: CommonFormatEvent = rmp_serde::from_read(&mut reader)?;
    let handoff = BufferedDecoder::Binary {
        unread: reader.len(),
        observed: buf.len(),
    };
    Ok((handoff, event))
}

/// Trim `buf` so it holds only the bytes not consumed by the decode.
pub fn reconcile(buf: &mut BytesMut, handoff: BufferedDecoder) -> Result<()> {
    let len = buf.len();
    let start = match handoff {
        BufferedDecoder::Textual { consumed, observed } => {
            check_observed(len, observed)?;
            if consumed > observed {
                return Err(EncoderError::reconcile(format!(
                    "textual decoder consumed {} of {} observed bytes",
                    consumed, observed
                )));
            }
            consumed
        }
        BufferedDecoder::Binary { unread, observed } => {
            check_observed(len, observed)?;
            // The reader's unread tail sits at the end of the observed region.
            observed.checked_sub(unread).ok_or_else(|| {
                EncoderError::reconcile(format!(
                    "binary reader holds {} unread bytes of {} observed",
                    unread, observed
                ))
            })?
        }
    };

    buf.advance(start);
    debug!(
        "Reconciled {} buffer: {} bytes before, {} after",
        handoff.format(),
        len,
        buf.len()
    );
    Ok(())
}

fn check_observed(len: usize, observed: usize) -> Result<()> {
    if len < observed {
        return Err(EncoderError::reconcile(format!(
            "buffer shrank from {} to {} bytes since decode",
            observed, len
        )));
    }
    Ok(())
}

/// Decode the next event from `buf` and drop its bytes.
///
/// On error the buffer is left unchanged.
pub fn decode_next(buf: &mut BytesMut, format: WireFormat) -> Result<CommonFormatEvent> {
    let (handoff, event) = begin_buffered_decode(buf, format)?;
    reconcile(buf, handoff)?;
    Ok(event)
}
