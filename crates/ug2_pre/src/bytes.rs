//! Little-endian integer helpers over byte slices.
//!
//! Values are assembled from individually masked bytes so the result does not depend on the host's
//! byte order. Callers guarantee the slice is long enough; a short slice panics like any other
//! out-of-bounds index.

/// Read a little-endian `u16` from the first two bytes of `bytes`
pub fn read_u16le(bytes: &[u8]) -> u16 {
    (bytes[0] as u16) | ((bytes[1] as u16) << 8)
}

/// Read a little-endian `u32` from the first four bytes of `bytes`
pub fn read_u32le(bytes: &[u8]) -> u32 {
    (bytes[0] as u32)
        | ((bytes[1] as u32) << 8)
        | ((bytes[2] as u32) << 16)
        | ((bytes[3] as u32) << 24)
}

/// Write `value` into the first two bytes of `bytes` in little-endian order
pub fn write_u16le(bytes: &mut [u8], value: u16) {
    bytes[0] = (value & 0xFF) as u8;
    bytes[1] = ((value >> 8) & 0xFF) as u8;
}

/// Write `value` into the first four bytes of `bytes` in little-endian order
pub fn write_u32le(bytes: &mut [u8], value: u32) {
    bytes[0] = (value & 0xFF) as u8;
    bytes[1] = ((value >> 8) & 0xFF) as u8;
    bytes[2] = ((value >> 16) & 0xFF) as u8;
    bytes[3] = ((value >> 24) & 0xFF) as u8;
}
