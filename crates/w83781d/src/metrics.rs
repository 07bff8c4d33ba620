use crate::DriverError;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct DeviceMetrics {
    pub register_reads: IntCounter,
    pub register_writes: IntCounter,
    pub transport_errors: IntCounter,
    pub refreshes: IntCounter,
    pub devices_attached: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub dev: DeviceMetrics,
}

fn counter(name: &str, help: &str) -> Result<IntCounter, DriverError> {
    IntCounter::new(name, help).map_err(|e| DriverError::Metrics(e.to_string()))
}

impl MetricsHub {
    pub fn new() -> Result<Self, DriverError> {
        let registry = Registry::new();
        let dev = DeviceMetrics {
            register_reads: counter("w83781d_register_reads", "Total chip register reads")?,
            register_writes: counter("w83781d_register_writes", "Total chip register writes")?,
            transport_errors: counter(
                "w83781d_transport_errors",
                "Register accesses that failed in the transport",
            )?,
            refreshes: counter("w83781d_refreshes", "Completed register cache refresh passes")?,
            devices_attached: IntGauge::new("w83781d_devices_attached", "Chips currently attached")
                .map_err(|e| DriverError::Metrics(e.to_string()))?,
        };
        for collector in [
            Box::new(dev.register_reads.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(dev.register_writes.clone()),
            Box::new(dev.transport_errors.clone()),
            Box::new(dev.refreshes.clone()),
            Box::new(dev.devices_attached.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|e| DriverError::Metrics(e.to_string()))?;
        }
        Ok(Self { registry, dev })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
