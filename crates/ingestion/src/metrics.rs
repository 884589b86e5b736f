//! Delivery metrics

use contracts::SensorKind;

pub(crate) fn record_sample_received(sensor: &str, kind: SensorKind) {
    metrics::counter!(
        "sensor_view_samples_received_total",
        "sensor" => sensor.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

pub(crate) fn record_sample_discarded(sensor: &str, kind: SensorKind) {
    metrics::counter!(
        "sensor_view_samples_discarded_total",
        "sensor" => sensor.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

pub(crate) fn record_attached_sensors(count: usize) {
    metrics::gauge!("sensor_view_sensors_attached").set(count as f64);
}
