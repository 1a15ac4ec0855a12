//! Raw point cloud codec
//!
//! Wire layout per point: little-endian `x, y, z: f32`, then
//! `point_stride - 12` bytes of extra channels that are ignored here.

use bytemuck::{Pod, Zeroable};
use bytes::Bytes;
use contracts::{Frame, PointSample, RawPointCloud};

use tracing::warn;

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Bytes of the mandatory xyz prefix
pub const XYZ_BYTES: u32 = 12;

/// Stride written by `encode_point_cloud` (x, y, z, intensity)
pub const XYZI_STRIDE: u32 = 16;

/// xyz + intensity as laid out on the wire
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct WirePoint {
    xyz: [u32; 3],
    intensity: u32,
}

/// Decode the points of a raw payload, in wire order
///
/// # Errors
/// `DecodeFailed` when the stride is shorter than the xyz prefix or the
/// buffer length disagrees with `num_points * point_stride`.
pub fn decode_points(raw: &RawPointCloud, frame_id: Option<u64>) -> Result<Vec<PointSample>> {
    if raw.point_stride < XYZ_BYTES {
        return Err(IngestionError::decode(
            frame_id,
            format!(
                "point stride {} is shorter than {XYZ_BYTES} bytes",
                raw.point_stride
            ),
        ));
    }

    let stride = raw.point_stride as usize;
    let expected = (raw.num_points as usize)
        .checked_mul(stride)
        .ok_or_else(|| IngestionError::decode(frame_id, "payload size overflows"))?;
    if raw.data.len() != expected {
        return Err(IngestionError::decode(
            frame_id,
            format!(
                "payload is {} bytes, expected {} points x {} bytes = {expected}",
                raw.data.len(),
                raw.num_points,
                raw.point_stride
            ),
        ));
    }

    Ok(raw
        .data
        .chunks_exact(stride)
        .map(|chunk| {
            let xyz: [u32; 3] = bytemuck::pod_read_unaligned(&chunk[..XYZ_BYTES as usize]);
            let [x, y, z] = xyz.map(|bits| f32::from_bits(u32::from_le(bits)));
            PointSample::new(x, y, z)
        })
        .collect())
}

/// Decode a raw payload into a frame
pub fn decode_frame(timestamp: f64, frame_id: Option<u64>, raw: &RawPointCloud) -> Result<Frame> {
    Ok(Frame {
        timestamp,
        frame_id,
        points: decode_points(raw, frame_id)?,
    })
}

/// Decode a payload on its way into the frame queue
///
/// A malformed payload never becomes a frame: it is counted in
/// `decode_errors` and `None` is returned.
pub fn admit_payload(
    metrics: &IngestionMetrics,
    timestamp: f64,
    frame_id: Option<u64>,
    raw: &RawPointCloud,
) -> Option<Frame> {
    match decode_frame(timestamp, frame_id, raw) {
        Ok(frame) => Some(frame),
        Err(e) => {
            metrics.record_decode_error();
            warn!(?frame_id, error = %e, "Payload rejected");
            None
        }
    }
}

/// Encode points as xyz + intensity with a 16-byte stride
pub fn encode_point_cloud(points: &[PointSample], intensity: f32) -> RawPointCloud {
    let wire: Vec<WirePoint> = points
        .iter()
        .map(|p| WirePoint {
            xyz: [p.x, p.y, p.z].map(|v| v.to_bits().to_le()),
            intensity: intensity.to_bits().to_le(),
        })
        .collect();

    RawPointCloud {
        num_points: points.len() as u32,
        point_stride: XYZI_STRIDE,
        data: Bytes::copy_from_slice(bytemuck::cast_slice(&wire)),
    }
}
