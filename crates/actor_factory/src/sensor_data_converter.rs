//! CARLA sensor data conversion
//!
//! Converts CARLA native measurements into `RawSample`.
//! Only compiled when the `real-carla` feature is enabled.

use bytes::Bytes;
use carla::sensor::data::{GnssMeasurement, Image, ImuMeasurement};
use carla::sensor::{SensorData, SensorDataBase};
use contracts::{GnssData, ImuData, RawPayload, RawSample, SensorKind, Vector3};

/// Copy the BGRA buffer out of a CARLA image
fn image_to_payload(image: &Image) -> RawPayload {
    RawPayload::Bgra {
        width: image.width() as u32,
        height: image.height() as u32,
        data: Bytes::copy_from_slice(image.as_raw_bytes()),
    }
}

fn imu_to_payload(imu: &ImuMeasurement) -> RawPayload {
    let accel = imu.accelerometer();
    let gyro = imu.gyroscope();
    RawPayload::Imu(ImuData {
        accelerometer: Vector3::new(accel.x as f64, accel.y as f64, accel.z as f64),
        gyroscope: Vector3::new(gyro.x as f64, gyro.y as f64, gyro.z as f64),
        compass: imu.compass() as f64,
    })
}

fn gnss_to_payload(gnss: &GnssMeasurement) -> RawPayload {
    RawPayload::Gnss(GnssData {
        latitude: gnss.latitude(),
        longitude: gnss.longitude(),
        altitude: gnss.attitude(), // Note: carla-rust uses attitude() for altitude
    })
}

/// Convert CARLA sensor data for a sensor of the given kind
///
/// Returns None when the measurement type does not match the kind.
pub fn convert_sensor_data(kind: SensorKind, data: &SensorData) -> Option<RawSample> {
    let timestamp = data.timestamp();
    let frame = data.frame() as u64;

    let payload = match kind {
        SensorKind::RgbCamera => image_to_payload(&Image::try_from(data.clone()).ok()?),
        SensorKind::Imu => imu_to_payload(&ImuMeasurement::try_from(data.clone()).ok()?),
        SensorKind::Gnss => gnss_to_payload(&GnssMeasurement::try_from(data.clone()).ok()?),
    };

    Some(RawSample {
        frame,
        timestamp,
        payload,
    })
}
