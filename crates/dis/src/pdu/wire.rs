use bytes::{Buf, BufMut};
use glam::{DVec3, Vec3};

use super::enums::PduType;
use super::error::PduError;
use super::header::PduHeader;
use super::records::ArticulationParameter;

/// Fixed size record with a big-endian wire form.
///
/// `read` assumes the caller has already checked that `SIZE` bytes remain.
pub(crate) trait WireRecord: Sized {
    const SIZE: usize;

    fn read<B: Buf>(buf: &mut B) -> Self;

    fn write<B: BufMut>(&self, buf: &mut B);
}

pub(crate) fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<(), PduError> {
    if buf.remaining() < needed {
        return Err(PduError::Truncated {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

pub(crate) fn read_vec3<B: Buf>(buf: &mut B) -> Vec3 {
    Vec3::new(buf.get_f32(), buf.get_f32(), buf.get_f32())
}

pub(crate) fn write_vec3<B: BufMut>(buf: &mut B, v: Vec3) {
    buf.put_f32(v.x);
    buf.put_f32(v.y);
    buf.put_f32(v.z);
}

/// The f64 location if it agrees with the f32 copy to f32 precision, otherwise
/// the f32 copy widened.
pub(crate) fn reconcile_location(location: DVec3, location_f32: Vec3) -> DVec3 {
    let close = |x: f32, y: f32| (x - y).abs() <= x.abs().max(y.abs()) * f32::EPSILON;
    let narrowed = location.as_vec3();
    if close(narrowed.x, location_f32.x)
        && close(narrowed.y, location_f32.y)
        && close(narrowed.z, location_f32.z)
    {
        location
    } else {
        location_f32.as_dvec3()
    }
}

pub(crate) fn read_dvec3<B: Buf>(buf: &mut B) -> DVec3 {
    DVec3::new(buf.get_f64(), buf.get_f64(), buf.get_f64())
}

pub(crate) fn write_dvec3<B: BufMut>(buf: &mut B, v: DVec3) {
    buf.put_f64(v.x);
    buf.put_f64(v.y);
    buf.put_f64(v.z);
}

pub(crate) fn read_articulation_parameters<B: Buf>(
    buf: &mut B,
    count: usize,
) -> Result<Vec<ArticulationParameter>, PduError> {
    let needed = count * ArticulationParameter::SIZE;
    if buf.remaining() < needed {
        return Err(PduError::ArticulationOverrun {
            count,
            available: buf.remaining(),
        });
    }
    let mut params = Vec::with_capacity(count);
    for _ in 0..count {
        params.push(ArticulationParameter::read(buf));
    }
    Ok(params)
}

/// Articulation parameter counts are a single byte on the wire.
pub(crate) fn articulation_count(params: &[ArticulationParameter]) -> usize {
    if params.len() > u8::MAX as usize {
        log::warn!(
            "{} articulation parameters exceed the wire limit, sending the first {}",
            params.len(),
            u8::MAX
        );
    }
    params.len().min(u8::MAX as usize)
}

pub(crate) fn expect_type(header: &PduHeader, expected: PduType) -> Result<(), PduError> {
    if header.pdu_type != expected {
        return Err(PduError::WrongType {
            expected,
            found: header.pdu_type.into(),
        });
    }
    Ok(())
}
