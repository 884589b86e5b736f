//! GNSS + IMU telemetry dashboard

use contracts::{Dashboard, FrameSnapshot, GnssData, ImuData, SensorKind, SensorPayload, TextField};

use crate::error::{CompositorError, Result};

pub const DASHBOARD_WIDTH: u32 = 680;
pub const DASHBOARD_HEIGHT: u32 = 360;

const HEADER_COLOR: [u8; 3] = [255, 255, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Build the dashboard from the named GNSS and IMU sensors
///
/// A sensor that is unnamed or has no sample yet renders as zeros. A sample of the wrong
/// kind under either name is an error.
pub fn compose_dashboard(
    snapshot: &FrameSnapshot,
    gnss: Option<&str>,
    imu: Option<&str>,
) -> Result<Dashboard> {
    let gnss = gnss.map(|name| gnss_of(snapshot, name)).transpose()?.flatten();
    let imu = imu.map(|name| imu_of(snapshot, name)).transpose()?.flatten();
    Ok(render(gnss.unwrap_or_default(), imu.unwrap_or_default(), snapshot.tick))
}

fn gnss_of(snapshot: &FrameSnapshot, name: &str) -> Result<Option<GnssData>> {
    match snapshot.get(name).map(|s| &s.payload) {
        None => Ok(None),
        Some(SensorPayload::Gnss(data)) => Ok(Some(*data)),
        Some(other) => Err(CompositorError::WrongKind {
            sensor: name.to_string(),
            expected: SensorKind::Gnss,
            actual: other.kind(),
        }),
    }
}

fn imu_of(snapshot: &FrameSnapshot, name: &str) -> Result<Option<ImuData>> {
    match snapshot.get(name).map(|s| &s.payload) {
        None => Ok(None),
        Some(SensorPayload::Imu(data)) => Ok(Some(*data)),
        Some(other) => Err(CompositorError::WrongKind {
            sensor: name.to_string(),
            expected: SensorKind::Imu,
            actual: other.kind(),
        }),
    }
}

fn render(gnss: GnssData, imu: ImuData, tick: Option<u64>) -> Dashboard {
    let header = |text: &str, y| field(text.to_string(), y, 0.9, HEADER_COLOR, 2);
    let gnss_line = |text: String, y| field(text, y, 0.6, WHITE, 1);
    let imu_line = |text: String, y| field(text, y, 0.55, WHITE, 1);

    let accel = imu.accelerometer;
    let gyro = imu.gyroscope;

    let fields = vec![
        header("GNSS DATA", 40),
        gnss_line(format!("Latitude  : {:.6}", gnss.latitude), 80),
        gnss_line(format!("Longitude : {:.6}", gnss.longitude), 110),
        gnss_line(format!("Altitude  : {:.2} m", gnss.altitude), 140),
        header("IMU DATA", 190),
        imu_line(
            format!(
                "Accel (m/s²): x={:.2}, y={:.2}, z={:.2}",
                accel.x, accel.y, accel.z
            ),
            230,
        ),
        imu_line(
            format!(
                "Gyro  (rad/s): x={:.2}, y={:.2}, z={:.2}",
                gyro.x, gyro.y, gyro.z
            ),
            260,
        ),
        imu_line(format!("Compass: {:.3} rad", imu.compass), 290),
    ];

    Dashboard {
        width: DASHBOARD_WIDTH,
        height: DASHBOARD_HEIGHT,
        tick,
        fields,
    }
}

fn field(text: String, y: u32, scale: f32, color: [u8; 3], thickness: u32) -> TextField {
    TextField {
        text,
        x: 20,
        y,
        scale,
        color,
        thickness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{camera_sample, snapshot_of};
    use contracts::{SensorSample, Vector3};

    fn gnss_sample() -> SensorSample {
        SensorSample {
            frame: 12,
            timestamp: 0.6,
            payload: SensorPayload::Gnss(GnssData {
                latitude: 37.422,
                longitude: -122.084,
                altitude: 15.3,
            }),
        }
    }

    fn imu_sample() -> SensorSample {
        SensorSample {
            frame: 12,
            timestamp: 0.6,
            payload: SensorPayload::Imu(ImuData {
                accelerometer: Vector3::new(0.12, -0.5, 9.81),
                gyroscope: Vector3::new(0.0, 0.01, -0.02),
                compass: 1.5708,
            }),
        }
    }

    #[test]
    fn test_dashboard_fields() {
        let snapshot = snapshot_of(vec![("gnss", gnss_sample()), ("imu", imu_sample())]);
        let dashboard = compose_dashboard(&snapshot, Some("gnss"), Some("imu")).unwrap();

        assert_eq!((dashboard.width, dashboard.height), (680, 360));
        assert_eq!(dashboard.fields.len(), 8);

        let lat = dashboard.field("Latitude").unwrap();
        assert_eq!(lat.text, "Latitude  : 37.422000");
        assert_eq!((lat.x, lat.y), (20, 80));
        assert_eq!(lat.scale, 0.6);

        assert_eq!(
            dashboard.field("Longitude").unwrap().text,
            "Longitude : -122.084000"
        );
        assert_eq!(
            dashboard.field("Altitude").unwrap().text,
            "Altitude  : 15.30 m"
        );
        assert_eq!(
            dashboard.field("Accel").unwrap().text,
            "Accel (m/s²): x=0.12, y=-0.50, z=9.81"
        );
        assert_eq!(
            dashboard.field("Gyro").unwrap().text,
            "Gyro  (rad/s): x=0.00, y=0.01, z=-0.02"
        );
        let compass = dashboard.field("Compass").unwrap();
        assert_eq!(compass.text, "Compass: 1.571 rad");
        assert_eq!((compass.y, compass.scale), (290, 0.55));

        let header = dashboard.field("GNSS DATA").unwrap();
        assert_eq!((header.y, header.thickness), (40, 2));
        assert_eq!(header.color, HEADER_COLOR);
        assert_eq!(dashboard.field("IMU DATA").unwrap().y, 190);
    }

    #[test]
    fn test_dashboard_latitude_keeps_six_decimals() {
        let gnss = SensorSample {
            frame: 3,
            timestamp: 0.15,
            payload: SensorPayload::Gnss(GnssData {
                latitude: 37.421999,
                longitude: 0.0,
                altitude: 0.0,
            }),
        };
        let snapshot = snapshot_of(vec![("gnss", gnss)]);
        let dashboard = compose_dashboard(&snapshot, Some("gnss"), None).unwrap();

        let lat = dashboard.field("Latitude").unwrap();
        assert_eq!(lat.text, "Latitude  : 37.421999");
        assert_eq!((lat.x, lat.y), (20, 80));
        assert_eq!(lat.scale, 0.6);
    }

    #[test]
    fn test_dashboard_missing_samples_render_zero() {
        let snapshot = snapshot_of(vec![("gnss", gnss_sample())]);
        let dashboard = compose_dashboard(&snapshot, Some("gnss"), Some("imu")).unwrap();

        assert_eq!(
            dashboard.field("Accel").unwrap().text,
            "Accel (m/s²): x=0.00, y=0.00, z=0.00"
        );
        assert_eq!(dashboard.field("Compass").unwrap().text, "Compass: 0.000 rad");
        assert_eq!(
            dashboard.field("Latitude").unwrap().text,
            "Latitude  : 37.422000"
        );
    }

    #[test]
    fn test_dashboard_wrong_kind() {
        let snapshot = snapshot_of(vec![("gnss", camera_sample(2, 2, 0))]);
        let err = compose_dashboard(&snapshot, Some("gnss"), None).unwrap_err();
        assert_eq!(
            err,
            CompositorError::WrongKind {
                sensor: "gnss".into(),
                expected: SensorKind::Gnss,
                actual: SensorKind::RgbCamera,
            }
        );
    }
}
