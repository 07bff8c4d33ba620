//! regbus: register transports for 8-bit sensor chips
//!
//! This crate provides a uniform register read/write capability over the two media a
//! hardware monitor chip is usually wired to: an ISA address-select/data port pair and
//! an SMBus adapter. The default build enables a `mock` backend so that binaries and
//! tests run on any host without port access.

mod types;
pub use types::{chip_id_matches, BusAddress, BusKind};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::{PortIo, RegisterBus, SmbusAdapter};

mod isa;
pub use isa::{IsaBus, PortLocks};

mod smbus;
pub use smbus::{HalAdapter, SmbusBus};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{Access, MockRegisterFile};

#[cfg(all(feature = "devport", unix))]
mod devport;

#[cfg(all(feature = "devport", unix))]
pub use devport::DevPort;
