//! Application state for the attendance API.
//!
//! This module defines the shared application state that is available
//! to all request handlers and to the background auto-logout scheduler.

use std::sync::Arc;

use crate::attendance::{
    AccessGate, AdminOverrideService, AttendanceStateMachine, AutoLogoutScheduler, Clock,
};
use crate::config::{AttendanceSettings, ConfigLoader};
use crate::error::AttendanceResult;
use crate::sales::{NoSalesData, SalesSummaryProvider};
use crate::store::{
    AttendanceLogStore, InMemoryAttendanceLog, InMemoryOverrideLog, OverrideLogStore,
    ShiftDirectory,
};

/// Shared application state.
///
/// Every service is built over the same directory, attendance log and clock,
/// so the gate, the scheduler and the override service observe each other's
/// writes.
#[derive(Clone)]
pub struct AppState {
    directory: Arc<ShiftDirectory>,
    clock: Arc<dyn Clock>,
    machine: AttendanceStateMachine,
    gate: AccessGate,
    overrides: AdminOverrideService,
    scheduler: AutoLogoutScheduler,
    sales: Arc<dyn SalesSummaryProvider>,
}

impl AppState {
    /// Creates the state over caller-supplied stores.
    pub fn new(
        directory: Arc<ShiftDirectory>,
        log: Arc<dyn AttendanceLogStore>,
        override_log: Arc<dyn OverrideLogStore>,
        settings: &AttendanceSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            machine: AttendanceStateMachine::new(directory.clone(), log.clone(), clock.clone()),
            gate: AccessGate::new(
                directory.clone(),
                log.clone(),
                clock.clone(),
                settings.warning_window_minutes,
            ),
            overrides: AdminOverrideService::new(
                directory.clone(),
                log.clone(),
                override_log,
                clock.clone(),
            ),
            scheduler: AutoLogoutScheduler::new(
                directory.clone(),
                log,
                clock.clone(),
                settings.sweep_interval(),
            ),
            sales: Arc::new(NoSalesData),
            directory,
            clock,
        }
    }

    /// Seeds a directory from configuration and backs it with in-memory logs.
    pub fn from_config(config: &ConfigLoader, clock: Arc<dyn Clock>) -> AttendanceResult<Self> {
        let directory = config.build_directory(clock.now())?;
        Ok(Self::new(
            Arc::new(directory),
            Arc::new(InMemoryAttendanceLog::new()),
            Arc::new(InMemoryOverrideLog::new()),
            config.settings(),
            clock,
        ))
    }

    /// Replaces the sales totals source.
    pub fn with_sales_provider(mut self, provider: Arc<dyn SalesSummaryProvider>) -> Self {
        self.sales = provider;
        self
    }

    /// Returns the shift and user directory.
    pub fn directory(&self) -> &ShiftDirectory {
        &self.directory
    }

    /// Returns the clock every service reads.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the clock-in/clock-out state machine.
    pub fn machine(&self) -> &AttendanceStateMachine {
        &self.machine
    }

    /// Returns the per-request access gate.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Returns the admin override service.
    pub fn overrides(&self) -> &AdminOverrideService {
        &self.overrides
    }

    /// Returns the auto-logout scheduler sharing this state's log.
    pub fn scheduler(&self) -> &AutoLogoutScheduler {
        &self.scheduler
    }

    /// Returns the sales totals source.
    pub fn sales(&self) -> &dyn SalesSummaryProvider {
        self.sales.as_ref()
    }
}
