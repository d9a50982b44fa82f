use bytes::Buf;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("{context}: truncated, needed {needed} bytes but {available} remain")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("{context}: bad signature")]
    BadSignature { context: &'static str },

    #[error("{0}")]
    Malformed(String),
}

/// Fails unless `buf` still holds `needed` bytes. `Buf` getters panic on underflow.
pub(crate) fn need(buf: &impl Buf, needed: usize, context: &'static str) -> Result<(), CodecError> {
    if buf.remaining() < needed {
        return Err(CodecError::Truncated {
            context,
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

/// Bounds-checked sub-slice.
pub(crate) fn slice<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    context: &'static str,
) -> Result<&'a [u8], CodecError> {
    let end = offset.checked_add(len).ok_or(CodecError::Truncated {
        context,
        needed: usize::MAX,
        available: data.len(),
    })?;
    data.get(offset..end).ok_or(CodecError::Truncated {
        context,
        needed: end,
        available: data.len(),
    })
}
