//! Inbound commands to the control service.
//!
//! These represent actions requested by the outside world (HTTP layer,
//! and whatever control surface comes next) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon. Ids here are external 1-based ids; validation happens inside the
//! service, so a malformed request can never mutate state.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    /// Set one relay to an explicit state.
    Set { id: u8, on: bool },

    /// Set all sixteen relays to an explicit state.
    SetAll { on: bool },

    /// All-on unless every relay is already on, in which case all-off.
    ToggleAll,
}
