//! Panel: owner of the operator panel state and its collaborators.
//!
//! [`Panel::mount`] builds the mount-time configuration, starts presence
//! polling when a fieldbus is available and wires the collaborators in.
//! [`Panel::teardown`] cancels the poller and releases every collaborator
//! handle; it runs at most once and also runs on `Drop`.
//!
//! Every operator action is gated through the interlock engine first. A
//! gated-off action returns [`PanelError::Interlocked`] and changes
//! nothing.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use pallet_common::bus::{FieldbusIo, ProgramControl, ProgramRef};
use pallet_common::consts::{
    DEFAULT_CONFIGURATION_PROGRAM, DEFAULT_PALLETIZING_PROGRAM, POLL_INTERVAL,
};
use pallet_common::io::RegisterMap;
use pallet_common::side::Side;

use crate::event_log::EventLog;
use crate::interlock::{self, Control, Controls, InterlockInputs, PauseToggle};
use crate::poller::PresencePoller;
use crate::publisher::{ConfigFrame, ConfigPublisher, PublishError, PublishStrategy};
use crate::run::{RunController, RunError};
use crate::state::config::{ConfigState, Limits, Mutation, SelectedSide};
use crate::state::presence::Presence;
use crate::state::run::RunState;

// ─── Errors ─────────────────────────────────────────────────────────

/// Operator action failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// The control is currently disabled.
    #[error("{0} is not available right now")]
    Interlocked(Control),

    /// The panel has been torn down.
    #[error("panel has been torn down")]
    TornDown,

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    #[error("run control failed: {0}")]
    Run(#[from] RunError),
}

// ─── Settings / collaborators ───────────────────────────────────────

/// Integration choices fixed at mount time.
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub limits: Limits,
    pub palletizing_program: ProgramRef,
    pub configuration_program: ProgramRef,
    pub strategy: PublishStrategy,
    pub register_map: RegisterMap,
    pub poll_interval: Duration,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            palletizing_program: ProgramRef::new(DEFAULT_PALLETIZING_PROGRAM),
            configuration_program: ProgramRef::new(DEFAULT_CONFIGURATION_PROGRAM),
            strategy: PublishStrategy::default(),
            register_map: RegisterMap::default(),
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Injected collaborator handles. `None` means unavailable.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub fieldbus: Option<Arc<dyn FieldbusIo>>,
    pub programs: Option<Arc<dyn ProgramControl>>,
}

impl core::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collaborators")
            .field("fieldbus", &self.fieldbus.as_ref().map(|b| b.name().to_string()))
            .field("programs", &self.programs.is_some())
            .finish()
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────

/// One side panel as the operator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideView {
    pub side: Side,
    pub enabled: bool,
    pub layer: u32,
    pub slot: u32,
    pub pallet_present: bool,
}

impl SideView {
    pub fn presence_label(&self) -> &'static str {
        if self.pallet_present {
            "Pallet detected"
        } else {
            "No pallet detected"
        }
    }
}

/// Everything a presentation layer needs for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub run_state: RunState,
    pub config_sent: bool,
    pub config_valid: bool,
    pub selected_side: SelectedSide,
    pub sides: [SideView; 2],
    pub controls: Controls,
}

impl PanelSnapshot {
    pub fn side(&self, side: Side) -> &SideView {
        &self.sides[side.index()]
    }
}

// ─── Panel ──────────────────────────────────────────────────────────

/// The mounted operator panel.
#[derive(Debug)]
pub struct Panel {
    config: ConfigState,
    run: RunController,
    log: EventLog,
    publisher: ConfigPublisher,
    presence: Arc<watch::Sender<Presence>>,
    poller: Option<PresencePoller>,
    collaborators: Collaborators,
    register_map: RegisterMap,
    poll_interval: Duration,
    torn_down: bool,
}

impl Panel {
    /// Mount the panel. Must be called from within a tokio runtime when a
    /// fieldbus is supplied, since polling starts immediately.
    pub fn mount(settings: PanelSettings, collaborators: Collaborators) -> Self {
        let PanelSettings {
            limits,
            palletizing_program,
            configuration_program,
            strategy,
            register_map,
            poll_interval,
        } = settings;

        let mut panel = Self {
            config: ConfigState::new(limits),
            run: RunController::new(palletizing_program),
            log: EventLog::default(),
            publisher: ConfigPublisher::new(strategy, register_map.clone(), configuration_program),
            presence: Arc::new(watch::Sender::new(Presence::default())),
            poller: None,
            collaborators: Collaborators {
                fieldbus: None,
                programs: collaborators.programs,
            },
            register_map,
            poll_interval,
            torn_down: false,
        };

        info!(?strategy, ?limits, "panel mounted");
        if panel.collaborators.programs.is_none() {
            panel.log.warn("Program control unavailable");
        }
        panel.attach_fieldbus(collaborators.fieldbus);
        panel
    }

    /// Swap the fieldbus collaborator. The running poller is cancelled
    /// before the new one (if any) starts.
    pub fn replace_fieldbus(
        &mut self,
        fieldbus: Option<Arc<dyn FieldbusIo>>,
    ) -> Result<(), PanelError> {
        self.ensure_mounted()?;
        self.stop_polling();
        self.attach_fieldbus(fieldbus);
        Ok(())
    }

    fn attach_fieldbus(&mut self, fieldbus: Option<Arc<dyn FieldbusIo>>) {
        match &fieldbus {
            Some(bus) => {
                self.poller = Some(PresencePoller::spawn(
                    bus.clone(),
                    self.register_map.clone(),
                    self.presence.clone(),
                    self.poll_interval,
                ));
            }
            None => {
                warn!("no fieldbus collaborator, presence polling disabled");
                self.log.warn("Fieldbus I/O unavailable, presence polling disabled");
            }
        }
        self.collaborators.fieldbus = fieldbus;
    }

    fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
    }

    /// Cancel polling and release the collaborators. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.stop_polling();
        self.collaborators = Collaborators::default();
        info!("panel torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn ensure_mounted(&self) -> Result<(), PanelError> {
        if self.torn_down {
            Err(PanelError::TornDown)
        } else {
            Ok(())
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PresencePoller::is_active)
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Latest presence readings.
    pub fn presence(&self) -> Presence {
        *self.presence.borrow()
    }

    /// Receiver notified on every presence change.
    pub fn subscribe_presence(&self) -> watch::Receiver<Presence> {
        self.presence.subscribe()
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.run.state()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn publish_strategy(&self) -> PublishStrategy {
        self.publisher.strategy()
    }

    pub fn config_valid(&self) -> bool {
        self.config.is_valid(self.presence())
    }

    /// Current control enablement.
    pub fn controls(&self) -> Controls {
        interlock::evaluate(InterlockInputs {
            run_state: self.run.state(),
            config_sent: self.config.config_sent(),
            config_valid: self.config_valid(),
        })
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        let presence = self.presence();
        let view = |side: Side| {
            let cfg = self.config.side(side);
            SideView {
                side,
                enabled: cfg.enabled,
                layer: cfg.layer,
                slot: cfg.slot,
                pallet_present: presence.get(side),
            }
        };
        PanelSnapshot {
            run_state: self.run.state(),
            config_sent: self.config.config_sent(),
            config_valid: self.config.is_valid(presence),
            selected_side: self.config.selected_side(),
            sides: [view(Side::Left), view(Side::Right)],
            controls: self.controls(),
        }
    }

    fn gate(&self, control: Control) -> Result<(), PanelError> {
        self.ensure_mounted()?;
        if self.controls().allows(control) {
            Ok(())
        } else {
            warn!(%control, run_state = %self.run.state(), "control rejected by interlock");
            Err(PanelError::Interlocked(control))
        }
    }

    // ─── Configuration edits ────────────────────────────────────────

    fn edit(
        &mut self,
        control: Control,
        apply: impl FnOnce(&mut ConfigState, RunState) -> Mutation,
    ) -> Result<(), PanelError> {
        self.gate(control)?;
        let run = self.run.state();
        match apply(&mut self.config, run) {
            Mutation::Applied => {
                debug!(%control, "configuration edited");
                Ok(())
            }
            Mutation::Rejected(reason) => {
                warn!(%control, reason, "configuration edit rejected");
                Err(PanelError::Interlocked(control))
            }
        }
    }

    pub fn set_enabled(&mut self, side: Side, enabled: bool) -> Result<(), PanelError> {
        self.edit(Control::Toggle(side), |cfg, run| cfg.set_enabled(side, enabled, run))
    }

    /// Flip a side's enabled flag. Returns the new value.
    pub fn toggle(&mut self, side: Side) -> Result<bool, PanelError> {
        let enabled = !self.config.side(side).enabled;
        self.set_enabled(side, enabled)?;
        Ok(enabled)
    }

    pub fn set_layer(&mut self, side: Side, layer: i64) -> Result<(), PanelError> {
        self.edit(Control::EditLayer(side), |cfg, run| cfg.set_layer(side, layer, run))
    }

    pub fn set_slot(&mut self, side: Side, slot: i64) -> Result<(), PanelError> {
        self.edit(Control::EditSlot(side), |cfg, run| cfg.set_slot(side, slot, run))
    }

    /// Commit raw layer field text (leading integer, else 1).
    pub fn commit_layer_text(&mut self, side: Side, text: &str) -> Result<(), PanelError> {
        self.edit(Control::EditLayer(side), |cfg, run| {
            cfg.commit_layer_text(side, text, run)
        })
    }

    /// Commit raw slot field text (leading integer, else 1).
    pub fn commit_slot_text(&mut self, side: Side, text: &str) -> Result<(), PanelError> {
        self.edit(Control::EditSlot(side), |cfg, run| {
            cfg.commit_slot_text(side, text, run)
        })
    }

    pub fn reset(&mut self, side: Side) -> Result<(), PanelError> {
        self.edit(Control::Reset(side), |cfg, run| cfg.reset(side, run))?;
        self.log.info(format!("Reset {side} side to layer 1, slot 1"));
        Ok(())
    }

    // ─── Publish ────────────────────────────────────────────────────

    /// Send the current configuration to the PLC.
    pub async fn set_config(&mut self) -> Result<(), PanelError> {
        self.gate(Control::SetConfig)?;

        let frame = match ConfigFrame::from_state(&self.config) {
            Ok(frame) => frame,
            Err(e) => return Err(self.publish_failed(e)),
        };
        let fieldbus = self.collaborators.fieldbus.clone();
        let programs = self.collaborators.programs.clone();

        match self
            .publisher
            .publish(&frame, fieldbus.as_deref(), programs.as_deref())
            .await
        {
            Ok(()) => {
                self.config.mark_sent();
                self.log.info(format!("Configuration sent to PLC: {frame}"));
                Ok(())
            }
            Err(e) => Err(self.publish_failed(e)),
        }
    }

    fn publish_failed(&mut self, error: PublishError) -> PanelError {
        self.config.mark_unsent();
        self.log.error(format!("Failed to send configuration: {error}"));
        PanelError::Publish(error)
    }

    // ─── Run control ────────────────────────────────────────────────

    fn programs(&self) -> Option<Arc<dyn ProgramControl>> {
        self.collaborators.programs.clone()
    }

    fn run_failed(&mut self, action: &str, error: RunError) -> PanelError {
        self.log.error(format!("{action} failed: {error}"));
        PanelError::Run(error)
    }

    pub fn start(&mut self) -> Result<RunState, PanelError> {
        self.gate(Control::Start)?;
        let programs = self.programs();
        match self.run.start(programs.as_deref()) {
            Ok(state) => {
                self.log.info(format!("Started {}", self.run.program()));
                Ok(state)
            }
            Err(e) => Err(self.run_failed("Start", e)),
        }
    }

    pub async fn pause(&mut self) -> Result<RunState, PanelError> {
        self.gate(Control::Pause)?;
        let programs = self.programs();
        match self.run.pause(programs.as_deref()).await {
            Ok(state) => {
                self.log.info("Program paused");
                Ok(state)
            }
            Err(e) => Err(self.run_failed("Pause", e)),
        }
    }

    pub async fn resume(&mut self) -> Result<RunState, PanelError> {
        self.gate(Control::Continue)?;
        let programs = self.programs();
        match self.run.resume(programs.as_deref()).await {
            Ok(state) => {
                self.log.info("Program resumed");
                Ok(state)
            }
            Err(e) => Err(self.run_failed("Continue", e)),
        }
    }

    /// Press the shared Pause/Continue button.
    pub async fn pause_or_continue(&mut self) -> Result<RunState, PanelError> {
        match self.controls().pause_toggle {
            PauseToggle::Pause => self.pause().await,
            PauseToggle::Continue => self.resume().await,
        }
    }

    /// Quick-stop. Leaves config-sent as it was.
    pub async fn stop(&mut self) -> Result<RunState, PanelError> {
        self.gate(Control::Stop)?;
        let programs = self.programs();
        match self.run.stop(programs.as_deref()).await {
            Ok(state) => {
                self.log.info("Program stopped");
                Ok(state)
            }
            Err(e) => Err(self.run_failed("Stop", e)),
        }
    }

    pub async fn go_home(&mut self) -> Result<(), PanelError> {
        self.gate(Control::GoHome)?;
        let programs = self.programs();
        match self.run.go_home(programs.as_deref()).await {
            Ok(()) => {
                self.log.info("Go home requested");
                Ok(())
            }
            Err(e) => Err(self.run_failed("Go home", e)),
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.teardown();
    }
}
