//! Dispatcher states and the observer contract for turn processing.

use pprovider::OutcomeVerdict;

use crate::{AdminCommand, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    BuildingRequest,
    AwaitingRemote,
    Interpreting,
    Delivering,
    RolledBack,
}

impl DispatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BuildingRequest => "building_request",
            Self::AwaitingRemote => "awaiting_remote",
            Self::Interpreting => "interpreting",
            Self::Delivering => "delivering",
            Self::RolledBack => "rolled_back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackReason {
    TransportFailure,
    DeliveryFailure,
    Revert,
}

impl RollbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransportFailure => "transport_failure",
            Self::DeliveryFailure => "delivery_failure",
            Self::Revert => "revert",
        }
    }
}

pub trait DispatchHooks: Send + Sync {
    fn on_state_change(&self, _from: DispatchState, _to: DispatchState) {}

    fn on_verdict(&self, _verdict: &OutcomeVerdict) {}

    fn on_rollback(&self, _reason: RollbackReason, _removed: usize) {}

    fn on_delivery_failure(&self, _chunk_index: usize, _chunk_count: usize, _error: &GatewayError) {}

    fn on_command(&self, _command: AdminCommand) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
