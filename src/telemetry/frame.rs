//! Telemetry frame assembly.
//!
//! Frame format: [HEADER 0xFF 0xFF] [YAW] [X] [Z] [CRC], 10 bytes total.
//! Each value field is a zigzag-encoded u16 written little-endian: yaw in
//! tenths of a degree, centroid X/Z in millimeters, all signed 16-bit
//! before encoding. The CRC is CRC-16/CCITT-FALSE over the first 8 bytes.
//!
//! Every built frame is round-tripped through the codec and checksum
//! before it leaves the framer; a mismatch means the local primitives are
//! inconsistent and is reported loudly without aborting the loop.

use crate::core::types::Point3;
use crate::error::{Error, Result};
use crate::telemetry::codec::{crc16, decode, encode};

/// Frame header bytes
pub const HEADER: [u8; 2] = [0xFF, 0xFF];
/// Total frame length in bytes
pub const FRAME_LEN: usize = 10;
/// Yaw field byte offset (tenths of a degree)
pub const OFFSET_YAW: usize = 2;
/// Centroid X field byte offset (millimeters)
pub const OFFSET_X: usize = 4;
/// Centroid Z field byte offset (millimeters)
pub const OFFSET_Z: usize = 6;
/// Checksum byte offset
pub const OFFSET_CRC: usize = 8;

/// A finished 10-byte telemetry frame. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    bytes: [u8; FRAME_LEN],
}

impl TelemetryFrame {
    /// Raw wire bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Decode the yaw field (tenths of a degree)
    pub fn yaw_decidegrees(&self) -> i16 {
        decode(self.bytes[OFFSET_YAW], self.bytes[OFFSET_YAW + 1])
    }

    /// Decode the centroid X field (millimeters)
    pub fn centroid_x_mm(&self) -> i16 {
        decode(self.bytes[OFFSET_X], self.bytes[OFFSET_X + 1])
    }

    /// Decode the centroid Z field (millimeters)
    pub fn centroid_z_mm(&self) -> i16 {
        decode(self.bytes[OFFSET_Z], self.bytes[OFFSET_Z + 1])
    }

    /// Stored checksum word
    pub fn checksum(&self) -> u16 {
        u16::from_le_bytes([self.bytes[OFFSET_CRC], self.bytes[OFFSET_CRC + 1]])
    }

    /// Recompute the CRC over the 8-byte prefix and compare with the
    /// stored checksum.
    pub fn verify_checksum(&self) -> bool {
        crc16(&self.bytes[..OFFSET_CRC]) == self.checksum()
    }
}

/// Builds telemetry frames from per-frame tracking results.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryFramer;

impl TelemetryFramer {
    /// Create a framer
    pub fn new() -> Self {
        Self
    }

    /// Quantize one field, rejecting values the wire format cannot carry.
    ///
    /// The 16-bit fields span ±3276.7 degrees and ±32.767 m; anything
    /// beyond that (or non-finite) is a per-frame error, never a silent
    /// wraparound.
    fn quantize(value: f32, scale: f32, field: &'static str) -> Result<i16> {
        let scaled = (value * scale).round();
        if !scaled.is_finite() || scaled < i16::MIN as f32 || scaled > i16::MAX as f32 {
            return Err(Error::ValueOutOfRange {
                field,
                value: scaled as f64,
            });
        }
        Ok(scaled as i16)
    }

    /// Build a frame from a yaw angle in degrees and a body centroid in
    /// meters.
    ///
    /// Returns the frame together with the outcome of the inline
    /// round-trip self-check. `false` means the local codec/CRC produced
    /// an inconsistent frame (nothing has left the process yet); the
    /// frame is still returned so the caller decides what to do with it.
    pub fn build(&self, yaw_degrees: f32, centroid: Point3) -> Result<(TelemetryFrame, bool)> {
        let syaw = Self::quantize(yaw_degrees, 10.0, "yaw")?;
        let sx = Self::quantize(centroid.x, 1000.0, "centroid.x")?;
        let sz = Self::quantize(centroid.z, 1000.0, "centroid.z")?;

        let mut bytes = [0u8; FRAME_LEN];
        bytes[..OFFSET_YAW].copy_from_slice(&HEADER);
        bytes[OFFSET_YAW..OFFSET_X].copy_from_slice(&encode(syaw).to_le_bytes());
        bytes[OFFSET_X..OFFSET_Z].copy_from_slice(&encode(sx).to_le_bytes());
        bytes[OFFSET_Z..OFFSET_CRC].copy_from_slice(&encode(sz).to_le_bytes());
        let crc = crc16(&bytes[..OFFSET_CRC]);
        bytes[OFFSET_CRC..].copy_from_slice(&crc.to_le_bytes());

        let frame = TelemetryFrame { bytes };
        let ok = self.self_check(&frame, syaw, sx, sz);
        Ok((frame, ok))
    }

    /// Round-trip every field and the checksum through the decode path.
    fn self_check(&self, frame: &TelemetryFrame, syaw: i16, sx: i16, sz: i16) -> bool {
        let fields_ok = frame.yaw_decidegrees() == syaw
            && frame.centroid_x_mm() == sx
            && frame.centroid_z_mm() == sz;
        let crc_ok = frame.verify_checksum();
        if !fields_ok || !crc_ok {
            log::error!(
                "telemetry self-check FAILED (fields_ok={}, crc_ok={}): local codec/checksum inconsistent",
                fields_ok,
                crc_ok
            );
        }
        fields_ok && crc_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_reference_values() {
        let framer = TelemetryFramer::new();
        let (frame, ok) = framer
            .build(12.3, Point3::new(0.450, -0.2, 0.800))
            .unwrap();

        assert!(ok);
        assert_eq!(frame.yaw_decidegrees(), 123);
        assert_eq!(frame.centroid_x_mm(), 450);
        assert_eq!(frame.centroid_z_mm(), 800);
        assert!(frame.verify_checksum());
    }

    #[test]
    fn test_exact_wire_layout() {
        let framer = TelemetryFramer::new();
        let (frame, _) = framer.build(12.3, Point3::new(0.450, 0.0, 0.800)).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), FRAME_LEN);
        assert_eq!(&bytes[..2], &HEADER);
        // zigzag(123) = 246, zigzag(450) = 900, zigzag(800) = 1600
        assert_eq!(&bytes[OFFSET_YAW..OFFSET_X], &246u16.to_le_bytes());
        assert_eq!(&bytes[OFFSET_X..OFFSET_Z], &900u16.to_le_bytes());
        assert_eq!(&bytes[OFFSET_Z..OFFSET_CRC], &1600u16.to_le_bytes());
        assert_eq!(
            &bytes[OFFSET_CRC..],
            &crc16(&bytes[..OFFSET_CRC]).to_le_bytes()
        );
    }

    #[test]
    fn test_negative_values_round_trip() {
        let framer = TelemetryFramer::new();
        let (frame, ok) = framer
            .build(-87.4, Point3::new(-1.234, 0.0, 0.010))
            .unwrap();

        assert!(ok);
        assert_eq!(frame.yaw_decidegrees(), -874);
        assert_eq!(frame.centroid_x_mm(), -1234);
        assert_eq!(frame.centroid_z_mm(), 10);
    }

    #[test]
    fn test_centroid_overflow_is_rejected() {
        let framer = TelemetryFramer::new();
        // 40 m -> 40000 mm, past the i16 range
        let err = framer.build(0.0, Point3::new(40.0, 0.0, 0.8)).unwrap_err();
        match err {
            Error::ValueOutOfRange { field, .. } => assert_eq!(field, "centroid.x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_yaw_overflow_is_rejected() {
        let framer = TelemetryFramer::new();
        assert!(framer.build(4000.0, Point3::new(0.0, 0.0, 0.8)).is_err());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let framer = TelemetryFramer::new();
        assert!(framer.build(f32::NAN, Point3::new(0.0, 0.0, 0.8)).is_err());
        assert!(framer
            .build(0.0, Point3::new(0.0, 0.0, f32::INFINITY))
            .is_err());
    }

    #[test]
    fn test_extreme_in_range_values_accepted() {
        let framer = TelemetryFramer::new();
        let (frame, ok) = framer
            .build(3276.7, Point3::new(32.767, 0.0, -32.768))
            .unwrap();
        assert!(ok);
        assert_eq!(frame.yaw_decidegrees(), 32767);
        assert_eq!(frame.centroid_x_mm(), 32767);
        assert_eq!(frame.centroid_z_mm(), -32768);
    }

    #[test]
    fn test_quantization_rounds_to_nearest() {
        let framer = TelemetryFramer::new();
        let (frame, _) = framer
            .build(0.06, Point3::new(0.0004, 0.0, 0.0006))
            .unwrap();
        // 0.6 deci-degrees -> 1, 0.4 mm -> 0, 0.6 mm -> 1
        assert_eq!(frame.yaw_decidegrees(), 1);
        assert_eq!(frame.centroid_x_mm(), 0);
        assert_eq!(frame.centroid_z_mm(), 1);
    }
}
