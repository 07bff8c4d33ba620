//! w83781d: register-backed driver for the Winbond W83781D hardware monitor
//!
//! The chip is reached through any [`regbus::RegisterBus`]. Each attached chip keeps
//! a cached copy of its register file that is re-read at most once per sampling
//! window; reads decode from that copy and writes go straight through to the chip.

pub mod codec;
pub mod registers;

mod error;
pub use error::{DriverError, Result};

mod channel;
pub use channel::{Channel, TempChannel};

mod clock;
#[cfg(feature = "mock")]
pub use clock::ManualClock;
pub use clock::{Clock, MonotonicClock};

mod state;
pub use state::{CachedState, Freshness, RegisterFile};

mod config;
pub use config::{load_config_file, parse_config, DriverConfig, InitLimits, MAX_CLIENTS};

mod metrics;
pub use metrics::{DeviceMetrics, MetricsHub};

mod record;
pub use record::SensorRecord;

mod registry;
pub use registry::{ClientRegistry, DeviceHandle};

mod device;
pub use device::Device;

mod update;

mod driver;
pub use driver::Driver;

#[cfg(feature = "mock")]
pub mod sim;
