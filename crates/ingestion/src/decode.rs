//! RawSample -> SensorSample decoding
//!
//! Runs on the delivery thread, so it must stay cheap: one pass over the camera buffer and
//! no other allocation than the output image.

use bytes::Bytes;
use contracts::{ImageData, RawPayload, RawSample, SensorKind, SensorPayload, SensorSample};

use crate::error::{IngestionError, Result};

/// Decode a delivery for a sensor of kind `expected`
pub fn decode(expected: SensorKind, raw: RawSample) -> Result<SensorSample> {
    let actual = raw.payload.kind();
    if actual != expected {
        return Err(IngestionError::decode(format!(
            "expected {expected} payload, got {actual}"
        )));
    }

    let payload = match raw.payload {
        RawPayload::Bgra {
            width,
            height,
            data,
        } => SensorPayload::Camera(bgra_to_rgb(width, height, &data)?),
        RawPayload::Gnss(gnss) => {
            if !(gnss.latitude.is_finite()
                && gnss.longitude.is_finite()
                && gnss.altitude.is_finite())
            {
                return Err(IngestionError::decode("non-finite gnss fix"));
            }
            SensorPayload::Gnss(gnss)
        }
        RawPayload::Imu(imu) => SensorPayload::Imu(imu),
    };

    Ok(SensorSample {
        frame: raw.frame,
        timestamp: raw.timestamp,
        payload,
    })
}

/// Drop the alpha channel and swap to RGB order
pub fn bgra_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<ImageData> {
    let pixels = width as usize * height as usize;
    if width == 0 || height == 0 || data.len() != pixels * 4 {
        return Err(IngestionError::decode(format!(
            "camera buffer of {} bytes does not match {width}x{height} BGRA",
            data.len()
        )));
    }

    let bgra: &[[u8; 4]] = bytemuck::cast_slice(data);
    let mut rgb = Vec::with_capacity(pixels * 3);
    for &[b, g, r, _a] in bgra {
        rgb.extend_from_slice(&[r, g, b]);
    }

    Ok(ImageData {
        width,
        height,
        data: Bytes::from(rgb),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GnssData, ImuData};

    fn raw(payload: RawPayload) -> RawSample {
        RawSample {
            frame: 7,
            timestamp: 0.35,
            payload,
        }
    }

    #[test]
    fn camera_channels_are_swapped() {
        let data = Bytes::from(vec![1, 2, 3, 255, 10, 20, 30, 255]);
        let sample = decode(
            SensorKind::RgbCamera,
            raw(RawPayload::Bgra {
                width: 2,
                height: 1,
                data,
            }),
        )
        .unwrap();

        assert_eq!(sample.frame, 7);
        let SensorPayload::Camera(image) = sample.payload else {
            panic!("expected camera payload");
        };
        assert_eq!(&image.data[..], &[3, 2, 1, 30, 20, 10]);
        assert!(image.is_well_formed());
    }

    #[test]
    fn truncated_camera_buffer_is_rejected() {
        let result = decode(
            SensorKind::RgbCamera,
            raw(RawPayload::Bgra {
                width: 2,
                height: 2,
                data: Bytes::from(vec![0u8; 15]),
            }),
        );
        assert!(matches!(result, Err(IngestionError::Decode { .. })));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let result = decode(SensorKind::Gnss, raw(RawPayload::Imu(ImuData::default())));
        assert!(result.is_err());
    }

    #[test]
    fn gnss_passes_through() {
        let fix = GnssData {
            latitude: 37.421999,
            longitude: -122.084,
            altitude: 15.3,
        };
        let sample = decode(SensorKind::Gnss, raw(RawPayload::Gnss(fix))).unwrap();
        assert!(matches!(sample.payload, SensorPayload::Gnss(g) if g == fix));

        let bad = GnssData {
            latitude: f64::NAN,
            ..fix
        };
        assert!(decode(SensorKind::Gnss, raw(RawPayload::Gnss(bad))).is_err());
    }
}
