//! Scenario world: a full panel/vault pair over simulated devices.
//!
//! Builds both nodes, runs the vault's serve loop on its own thread, and
//! drives the front session on the caller's thread with a scripted keypad.
//! When the drive closure returns, the panel's link endpoint is dropped,
//! the vault observes the disconnect and finishes, and the run's outcome is
//! collected into a [`WorldReport`] for assertions.
//!
//! Each node has its own virtual clock, matching the real system's two
//! free-running controllers, so the vault's actuator timeline is
//! deterministic regardless of thread scheduling.

use std::time::Duration;

use latchkey_core::ExchangeConfig;
use latchkey_panel::{FrontConfig, FrontSession, LinkPolicy};
use latchkey_vault::{VaultConfig, VaultError, VaultService};

use crate::clock::VirtualClock;
use crate::devices::{DeviceLog, SimAlarm, SimLatch};
use crate::fault::FaultLink;
use crate::link::MemoryLink;
use crate::panel::ScriptedPanel;
use crate::store::MemoryStore;

/// Front session type a scenario's drive closure receives.
pub type WorldSession = FrontSession<ScriptedPanel, MemoryLink, VirtualClock>;

/// Builder for one panel/vault scenario run.
pub struct LockWorld {
    store: MemoryStore,
    front: FrontConfig,
    vault: VaultConfig,
    drop_vault_sends: Vec<u64>,
    vault_drop_rate: Option<(f64, u64)>,
    failing_latch: bool,
}

impl Default for LockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl LockWorld {
    /// World with an unprovisioned store and test-friendly link timeouts.
    ///
    /// User-facing pauses keep their production durations (they run on the
    /// virtual clocks and cost nothing) while the real-time link waits are
    /// shortened so fault scenarios expire quickly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            front: FrontConfig {
                exchange: ExchangeConfig {
                    ready_timeout: Duration::from_millis(100),
                    verdict_timeout: Duration::from_millis(500),
                },
                policy: LinkPolicy { attempts: 2, backoff: Duration::from_millis(10) },
                ..FrontConfig::default()
            },
            vault: VaultConfig::default(),
            drop_vault_sends: Vec::new(),
            vault_drop_rate: None,
            failing_latch: false,
        }
    }

    /// Provision the store with the given credential bytes.
    #[must_use]
    pub fn stored(mut self, credential: &[u8; 5]) -> Self {
        self.store = MemoryStore::holding(credential);
        self
    }

    /// Use an existing store handle, e.g. to span two runs.
    #[must_use]
    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    /// Replace the front node configuration.
    #[must_use]
    pub fn front_config(mut self, config: FrontConfig) -> Self {
        self.front = config;
        self
    }

    /// Replace the vault configuration.
    #[must_use]
    pub fn vault_config(mut self, config: VaultConfig) -> Self {
        self.vault = config;
        self
    }

    /// Drop the vault's outgoing byte with the given send index.
    #[must_use]
    pub fn drop_vault_send(mut self, index: u64) -> Self {
        self.drop_vault_sends.push(index);
        self
    }

    /// Drop the vault's outgoing bytes at the given rate, seeded.
    #[must_use]
    pub fn vault_drop_rate(mut self, rate: f64, seed: u64) -> Self {
        self.vault_drop_rate = Some((rate, seed));
        self
    }

    /// Use a latch whose driver always reports failure.
    #[must_use]
    pub fn failing_latch(mut self) -> Self {
        self.failing_latch = true;
        self
    }

    /// Run the scenario: vault on its own thread, front session driven by
    /// the closure with the given key script.
    pub fn run<R>(
        self,
        keys: &[u8],
        drive: impl FnOnce(&mut WorldSession) -> R,
    ) -> (R, WorldReport) {
        let (panel_end, vault_end) = MemoryLink::pair();
        let panel_clock = VirtualClock::new();
        let vault_clock = VirtualClock::new();
        let devices = DeviceLog::new(vault_clock.clone());

        let mut vault_link = FaultLink::new(vault_end);
        for index in &self.drop_vault_sends {
            vault_link = vault_link.drop_send(*index);
        }
        if let Some((rate, seed)) = self.vault_drop_rate {
            vault_link = vault_link.drop_rate(rate, seed);
        }

        let vault_store = self.store.clone();
        let vault_devices = devices.clone();
        let vault_run_clock = vault_clock.clone();
        let vault_config = self.vault;
        let failing_latch = self.failing_latch;
        let vault_thread = std::thread::spawn(move || {
            let mut link = vault_link;
            let mut store = vault_store;
            let mut latch = if failing_latch {
                SimLatch::failing(vault_devices.clone())
            } else {
                SimLatch::new(vault_devices.clone())
            };
            let mut alarm = SimAlarm::new(vault_devices);
            VaultService::new(
                &mut link,
                &mut store,
                &mut latch,
                &mut alarm,
                vault_run_clock,
                vault_config,
            )
            .serve()
        });

        let mut session = FrontSession::new(
            ScriptedPanel::with_keys(keys),
            panel_end,
            panel_clock.clone(),
            self.front,
        );
        let outcome = drive(&mut session);

        // Closing the panel's endpoint lets the idle vault observe the
        // disconnect and finish its serve loop.
        let (panel, link, _clock) = session.into_parts();
        drop(link);
        let vault = vault_thread.join().ok();

        let report = WorldReport {
            vault,
            panel,
            store: self.store,
            devices,
            panel_elapsed: panel_clock.elapsed(),
            vault_elapsed: vault_clock.elapsed(),
        };
        (outcome, report)
    }
}

/// Everything a scenario can assert on after a run.
pub struct WorldReport {
    /// Vault serve outcome; `None` if the vault thread panicked.
    pub vault: Option<Result<(), VaultError>>,
    /// The scripted panel with its recorded notices.
    pub panel: ScriptedPanel,
    /// Shared store handle, for inspecting the persisted image.
    pub store: MemoryStore,
    /// Timestamped actuator timeline.
    pub devices: DeviceLog,
    /// Virtual time the front control loop accumulated.
    pub panel_elapsed: Duration,
    /// Virtual time the vault control loop accumulated.
    pub vault_elapsed: Duration,
}
