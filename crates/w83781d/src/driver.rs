use crate::clock::{Clock, MonotonicClock};
use crate::config::DriverConfig;
use crate::device::Device;
use crate::metrics::MetricsHub;
use crate::record::SensorRecord;
use crate::registry::{ClientRegistry, DeviceHandle};
use crate::{Channel, DriverError, Result};
use parking_lot::Mutex;
use regbus::{BusAddress, IsaBus, PortIo, PortLocks, RegisterBus, SmbusAdapter, SmbusBus};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point: detects chips, keeps them in a bounded registry and routes
/// channel reads and writes to the right device.
pub struct Driver {
    config: DriverConfig,
    clock: Arc<dyn Clock>,
    port_locks: PortLocks,
    clients: Mutex<ClientRegistry<Arc<Device>>>,
    metrics: MetricsHub,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: DriverConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let clients = Mutex::new(ClientRegistry::new(config.max_clients));
        Ok(Self {
            config,
            clock,
            port_locks: PortLocks::new(),
            clients,
            metrics: MetricsHub::new()?,
        })
    }

    /// Probes the chip behind `bus`, registers it and programs its default limits.
    /// Nothing stays registered if any step fails.
    pub fn attach(&self, bus: Box<dyn RegisterBus>) -> Result<DeviceHandle> {
        let address = bus.address();
        let device = Arc::new(Device::new(
            bus,
            self.clock.clone(),
            self.config.refresh_interval(),
            self.metrics.dev.clone(),
        ));
        let id = device.detect()?;

        let handle = {
            let mut clients = self.clients.lock();
            if clients.find(|d| d.address() == address).is_some() {
                return Err(DriverError::AlreadyAttached(address));
            }
            let handle = clients.create(device.clone())?;
            self.metrics.dev.devices_attached.inc();
            handle
        };

        if let Err(e) = device.init_chip(&self.config.init) {
            warn!(%address, error = %e, "init failed; releasing client");
            // a concurrent detach may have released the slot and the gauge already
            match self.clients.lock().destroy(handle) {
                Ok(_) => self.metrics.dev.devices_attached.dec(),
                Err(err) => warn!(%handle, error = %err, "client already released during rollback"),
            }
            return Err(e);
        }

        info!(%address, %handle, chip_id = id, "attached w83781d");
        Ok(handle)
    }

    pub fn attach_isa<P: PortIo + 'static>(&self, io: Arc<P>, base: u16) -> Result<DeviceHandle> {
        let bus = IsaBus::new(io, base, &self.port_locks)?;
        self.attach(Box::new(bus))
    }

    pub fn attach_smbus<A: SmbusAdapter + 'static>(
        &self,
        adapter: Arc<A>,
        addr7: u8,
    ) -> Result<DeviceHandle> {
        let bus = SmbusBus::new(adapter, addr7)?;
        self.attach(Box::new(bus))
    }

    pub fn detach(&self, handle: DeviceHandle) -> Result<()> {
        match self.clients.lock().destroy(handle) {
            Ok(device) => {
                self.metrics.dev.devices_attached.dec();
                info!(address = %device.address(), %handle, "detached");
                Ok(())
            }
            Err(e) => {
                warn!(%handle, "client to detach not found");
                Err(e)
            }
        }
    }

    pub fn device(&self, handle: DeviceHandle) -> Result<Arc<Device>> {
        self.clients.lock().get(handle).cloned()
    }

    pub fn find(&self, address: BusAddress) -> Option<DeviceHandle> {
        self.clients.lock().find(|d| d.address() == address)
    }

    pub fn handles(&self) -> Vec<DeviceHandle> {
        self.clients.lock().handles()
    }

    pub fn describe(&self, handle: DeviceHandle, channel: Channel) -> Result<u32> {
        self.device(handle)?.describe(channel)
    }

    pub fn read(&self, handle: DeviceHandle, channel: Channel) -> Result<Vec<i64>> {
        self.device(handle)?.read(channel)
    }

    pub fn write(&self, handle: DeviceHandle, channel: Channel, values: &[i64]) -> Result<()> {
        self.device(handle)?.write(channel, values)
    }

    pub fn record(&self, handle: DeviceHandle, channel: Channel) -> Result<SensorRecord> {
        self.device(handle)?.record(channel)
    }

    pub fn dump(&self, handle: DeviceHandle) -> Result<Vec<SensorRecord>> {
        self.device(handle)?.dump()
    }

    pub fn metrics(&self) -> &MetricsHub {
        &self.metrics
    }

    pub fn metrics_text(&self) -> String {
        self.metrics.encode_text()
    }
}
