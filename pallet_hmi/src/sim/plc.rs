//! Simulated PLC register bank.
//!
//! Registers are kept as text, the way the fieldbus gateway hands them
//! over. Unwritten registers read as `"0"`. Input bits are rendered with a
//! configurable spelling so the tolerant boolean decode gets exercised.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::trace;

use pallet_common::bus::{BusError, FieldbusIo, RegisterValue};
use pallet_common::io::{Direction, RegisterAddress, RegisterKind, RegisterMap, Signal};
use pallet_common::side::Side;

/// How the simulated gateway spells a set/cleared input bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolSpelling {
    /// `1` / `0`
    #[default]
    Numeric,
    /// `true` / `false`
    Word,
    /// `ON` / `OFF`
    OnOff,
}

impl BoolSpelling {
    fn render(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::Numeric, true) => "1",
            (Self::Numeric, false) => "0",
            (Self::Word, true) => "true",
            (Self::Word, false) => "false",
            (Self::OnOff, true) => "ON",
            (Self::OnOff, false) => "OFF",
        }
    }
}

#[derive(Debug, Default)]
struct Bank {
    registers: HashMap<RegisterAddress, String>,
    write_log: Vec<(RegisterKind, u16, String)>,
    failing_writes: HashSet<(RegisterKind, u16)>,
    fail_reads: bool,
    read_count: u64,
}

/// In-memory PLC implementing [`FieldbusIo`].
#[derive(Debug)]
pub struct SimulatedPlc {
    map: RegisterMap,
    spelling: BoolSpelling,
    read_delay: Mutex<Duration>,
    bank: Mutex<Bank>,
}

impl Default for SimulatedPlc {
    fn default() -> Self {
        Self::new(RegisterMap::default())
    }
}

impl SimulatedPlc {
    pub fn new(map: RegisterMap) -> Self {
        Self::with_spelling(map, BoolSpelling::default())
    }

    pub fn with_spelling(map: RegisterMap, spelling: BoolSpelling) -> Self {
        Self {
            map,
            spelling,
            read_delay: Mutex::new(Duration::ZERO),
            bank: Mutex::new(Bank::default()),
        }
    }

    // ─── Plant side ─────────────────────────────────────────────────

    /// Drive the presence sensor of a side.
    pub fn set_pallet_present(&self, side: Side, present: bool) {
        let addr = self.map.resolve(Signal::pallet_present(side));
        self.set_raw(addr, self.spelling.render(present));
    }

    /// Put arbitrary text into a register.
    pub fn set_raw(&self, address: RegisterAddress, value: &str) {
        self.bank.lock().registers.insert(address, value.to_string());
    }

    // ─── Fault injection ────────────────────────────────────────────

    /// Make every read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.bank.lock().fail_reads = fail;
    }

    /// Reject writes to one output register.
    pub fn set_failing_write(&self, kind: RegisterKind, index: u16, fail: bool) {
        let mut bank = self.bank.lock();
        if fail {
            bank.failing_writes.insert((kind, index));
        } else {
            bank.failing_writes.remove(&(kind, index));
        }
    }

    /// Delay every read, to model a slow gateway.
    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock() = delay;
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Current text of an output register, `None` if never written.
    pub fn output(&self, kind: RegisterKind, index: u16) -> Option<String> {
        self.bank
            .lock()
            .registers
            .get(&RegisterAddress::new(kind, index, Direction::Out))
            .cloned()
    }

    /// Current text of the register behind an output signal.
    pub fn signal_output(&self, signal: Signal) -> Option<String> {
        let addr = self.map.resolve(signal);
        self.output(addr.kind, addr.index)
    }

    /// Every accepted write, in completion order.
    pub fn writes(&self) -> Vec<(RegisterKind, u16, String)> {
        self.bank.lock().write_log.clone()
    }

    /// Number of read requests served or rejected.
    pub fn read_count(&self) -> u64 {
        self.bank.lock().read_count
    }
}

#[async_trait]
impl FieldbusIo for SimulatedPlc {
    fn name(&self) -> &str {
        "simulation"
    }

    async fn read_register(
        &self,
        kind: RegisterKind,
        index: u16,
        direction: Direction,
    ) -> Result<RegisterValue, BusError> {
        let address = RegisterAddress::new(kind, index, direction);
        let delay = *self.read_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut bank = self.bank.lock();
        bank.read_count += 1;
        if bank.fail_reads {
            return Err(BusError::ReadFailed {
                address,
                reason: "simulated read fault".to_string(),
            });
        }
        let value = bank
            .registers
            .get(&address)
            .cloned()
            .unwrap_or_else(|| "0".to_string());
        trace!(%address, %value, "sim read");
        Ok(RegisterValue::new(value))
    }

    async fn write_register(
        &self,
        kind: RegisterKind,
        index: u16,
        value: &str,
    ) -> Result<(), BusError> {
        let mut bank = self.bank.lock();
        if bank.failing_writes.contains(&(kind, index)) {
            return Err(BusError::WriteFailed {
                kind,
                index,
                reason: "simulated write fault".to_string(),
            });
        }
        let address = RegisterAddress::new(kind, index, Direction::Out);
        bank.registers.insert(address, value.to_string());
        bank.write_log.push((kind, index, value.to_string()));
        trace!(%address, signal = ?self.map.signal_at(address), value, "sim write");
        Ok(())
    }
}
