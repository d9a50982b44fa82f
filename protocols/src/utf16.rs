/// UTF-16LE without a terminator.
pub fn encode(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|c| c.to_le_bytes()).collect()
}

/// UTF-16LE followed by a two byte NUL.
pub fn encode_nul(s: &str) -> Vec<u8> {
    let mut out = encode(s);
    out.extend_from_slice(&[0, 0]);
    out
}

/// Decodes UTF-16LE up to the first NUL code unit or the end of `data`.
///
/// Returns the string and the number of bytes consumed, terminator included.
pub fn decode_nul(data: &[u8]) -> (String, usize) {
    let mut units = Vec::new();
    let mut consumed = 0;
    for pair in data.chunks_exact(2) {
        consumed += 2;
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    (String::from_utf16_lossy(&units), consumed)
}
