use crate::channel::{Channel, TempChannel};
use crate::clock::Clock;
use crate::codec;
use crate::metrics::DeviceMetrics;
use crate::record::SensorRecord;
use crate::registers::{self, Bank};
use crate::state::{CachedState, Freshness, RegisterFile};
use crate::{DriverError, Result};
use parking_lot::{Mutex, RwLock};
use regbus::{BusAddress, BusKind, RegisterBus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// One attached chip: its transport, the cached register file and the lock that
/// serializes every multi-register sequence against it.
pub struct Device {
    bus: Box<dyn RegisterBus>,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
    update_lock: Mutex<()>,
    cache: RwLock<CachedState>,
    metrics: DeviceMetrics,
}

impl Device {
    pub fn new(
        bus: Box<dyn RegisterBus>,
        clock: Arc<dyn Clock>,
        refresh_interval: Duration,
        metrics: DeviceMetrics,
    ) -> Self {
        Self {
            bus,
            clock,
            refresh_interval,
            update_lock: Mutex::new(()),
            cache: RwLock::new(CachedState::default()),
            metrics,
        }
    }

    pub fn address(&self) -> BusAddress {
        self.bus.address()
    }

    pub fn bus_kind(&self) -> BusKind {
        self.bus.bus_kind()
    }

    pub(crate) fn update_lock(&self) -> &Mutex<()> {
        &self.update_lock
    }

    pub(crate) fn read_value(&self, reg: u8) -> Result<u8> {
        match self.bus.read_register(reg) {
            Ok(value) => {
                self.metrics.register_reads.inc();
                trace!(addr = %self.address(), reg, value, "read");
                Ok(value)
            }
            Err(e) => {
                self.metrics.transport_errors.inc();
                Err(e.into())
            }
        }
    }

    pub(crate) fn write_value(&self, reg: u8, value: u8) -> Result<()> {
        match self.bus.write_register(reg, value) {
            Ok(()) => {
                self.metrics.register_writes.inc();
                trace!(addr = %self.address(), reg, value, "write");
                Ok(())
            }
            Err(e) => {
                self.metrics.transport_errors.inc();
                Err(e.into())
            }
        }
    }

    /// Runs `f` with `bank` mapped into the shared window. The selector is put back
    /// to bank none before returning, whatever `f` returned.
    pub(crate) fn with_bank<T>(&self, bank: Bank, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        if bank == Bank::None {
            return f(self);
        }
        debug!(addr = %self.address(), bank = bank.value(), "select bank");
        let out = match self.write_value(registers::BANK_SELECT, bank.value()) {
            Ok(()) => f(self),
            Err(e) => Err(e),
        };
        let restored = self.write_value(registers::BANK_SELECT, Bank::None.value());
        match (out, restored) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(v), Ok(())) => Ok(v),
        }
    }

    /// Reads the chip id and checks it against the W83781D signature.
    pub fn detect(&self) -> Result<u8> {
        let id = self.read_value(registers::CHIP_ID)?;
        if regbus::chip_id_matches(id) {
            Ok(id)
        } else {
            Err(DriverError::DetectionMismatch { found: id })
        }
    }

    pub fn freshness(&self) -> Freshness {
        self.cache
            .read()
            .freshness(self.clock.now(), self.refresh_interval)
    }

    fn needs_refresh(&self) -> bool {
        self.cache
            .read()
            .needs_refresh(self.clock.now(), self.refresh_interval)
    }

    /// Refreshes the cache if it is invalid or stale. Concurrent callers block on
    /// the update lock and find the cache fresh once the first pass publishes.
    pub fn update(&self) -> Result<()> {
        if !self.needs_refresh() {
            return Ok(());
        }
        let _guard = self.update_lock.lock();
        if !self.needs_refresh() {
            return Ok(());
        }
        let registers = match self.read_register_file() {
            Ok(r) => r,
            Err(e) => {
                warn!(addr = %self.address(), error = %e, "refresh failed; keeping previous snapshot");
                return Err(e);
            }
        };
        let now = self.clock.now();
        *self.cache.write() = CachedState {
            registers,
            valid: true,
            last_refreshed: now,
        };
        self.metrics.refreshes.inc();
        debug!(addr = %self.address(), at_ms = now.as_millis() as u64, "refreshed");
        Ok(())
    }

    /// The cache as it stands, without refreshing.
    pub fn cached(&self) -> CachedState {
        *self.cache.read()
    }

    /// Consistent copy of the register file, refreshed first if needed.
    pub fn snapshot(&self) -> Result<RegisterFile> {
        self.update()?;
        Ok(self.cache.read().registers)
    }

    pub fn describe(&self, channel: Channel) -> Result<u32> {
        Ok(channel.validate()?.magnitude())
    }

    pub fn read(&self, channel: Channel) -> Result<Vec<i64>> {
        let channel = channel.validate()?;
        let registers = self.snapshot()?;
        registers.values(channel)
    }

    pub fn record(&self, channel: Channel) -> Result<SensorRecord> {
        let values = self.read(channel)?;
        Ok(SensorRecord::new(channel, values))
    }

    /// Records for every channel, all taken from the same snapshot.
    pub fn dump(&self) -> Result<Vec<SensorRecord>> {
        let registers = self.snapshot()?;
        Channel::all()
            .into_iter()
            .map(|ch| Ok(SensorRecord::new(ch, registers.values(ch)?)))
            .collect()
    }

    /// Writes the leading `values` in field order. Fields past the writable prefix
    /// are ignored; an empty slice writes nothing.
    pub fn write(&self, channel: Channel, values: &[i64]) -> Result<()> {
        let channel = channel.validate()?;
        if channel.writable_fields() == 0 {
            return Err(DriverError::ReadOnly(channel));
        }
        if values.is_empty() {
            return Ok(());
        }
        let _guard = self.update_lock.lock();
        match channel {
            Channel::In(nr) => {
                let nr = usize::from(nr);
                let encode = |val| {
                    codec::in_to_reg(val, nr)
                        .ok_or_else(|| DriverError::UnknownChannel(channel.to_string()))
                };
                if let Some(&min) = values.first() {
                    let raw = encode(min)?;
                    self.write_value(registers::in_min(nr), raw)?;
                    self.store(|r| r.in_min[nr] = raw);
                }
                if let Some(&max) = values.get(1) {
                    let raw = encode(max)?;
                    self.write_value(registers::in_max(nr), raw)?;
                    self.store(|r| r.in_max[nr] = raw);
                }
            }
            Channel::Fan(nr) => {
                let nr = usize::from(nr);
                if let Some(&min) = values.first() {
                    let raw = codec::fan_to_reg(min);
                    self.write_value(registers::fan_min(nr), raw)?;
                    self.store(|r| r.fan_min[nr - 1] = raw);
                }
            }
            Channel::Temp(t) => {
                self.write_temp_limits(t, values.first().copied(), values.get(1).copied())?;
            }
            Channel::FanDiv => {
                self.write_fan_divs(values.first().copied(), values.get(1).copied())?;
            }
            Channel::Vid | Channel::Alarms => return Err(DriverError::ReadOnly(channel)),
        }
        Ok(())
    }

    /// Sets one fan's divisor, leaving the other field untouched. Fan 3 is fixed at 2.
    pub fn set_fan_divisor(&self, fan: u8, divisor: i64) -> Result<()> {
        let _guard = self.update_lock.lock();
        match fan {
            1 => self.write_fan_divs(Some(divisor), None),
            2 => self.write_fan_divs(None, Some(divisor)),
            3 => Err(DriverError::ReadOnly(Channel::FanDiv)),
            other => Err(DriverError::UnknownChannel(format!("fan{other}_div"))),
        }
    }

    fn store(&self, f: impl FnOnce(&mut RegisterFile)) {
        f(&mut self.cache.write().registers);
    }

    /// Caller holds the update lock.
    pub(crate) fn write_temp_limits(
        &self,
        channel: TempChannel,
        over: Option<i64>,
        hyst: Option<i64>,
    ) -> Result<()> {
        let (_, over_reg, hyst_reg) = channel.registers();
        let idx = channel.index();
        let banked = channel.is_banked();
        self.with_bank(channel.bank(), |dev| {
            if let Some(over) = over {
                let raw = codec::temp_to_reg(over);
                dev.write_value(over_reg, raw)?;
                if banked {
                    dev.write_value(over_reg + 1, 0)?;
                }
                dev.store(|r| r.temp_over[idx] = raw);
            }
            if let Some(hyst) = hyst {
                let raw = codec::temp_to_reg(hyst);
                dev.write_value(hyst_reg, raw)?;
                if banked {
                    dev.write_value(hyst_reg + 1, 0)?;
                }
                dev.store(|r| r.temp_hyst[idx] = raw);
            }
            Ok(())
        })
    }

    /// Read-modify-write of the packed divisor fields. Caller holds the update lock.
    fn write_fan_divs(&self, div1: Option<i64>, div2: Option<i64>) -> Result<()> {
        let mut reg = self.read_value(registers::VID_FANDIV)?;
        for (idx, div) in [div1, div2].into_iter().enumerate() {
            if let Some(div) = div {
                reg = codec::with_fan_div(reg, idx, codec::div_to_reg(div));
            }
        }
        self.write_value(registers::VID_FANDIV, reg)?;
        let codes = codec::fan_divs(reg);
        self.store(|r| r.fan_div = codes);
        Ok(())
    }
}
