use crate::errors::TelemetryError;

/// Availability of live data on the mapping screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub enum ConnectionState {
    #[default]
    Loading,
    Ready,
    Error(String),
}

impl ConnectionState {
    /// A record validated successfully. Also clears any previous error.
    pub fn record_received(&mut self) {
        *self = Self::Ready;
    }

    pub fn fail(&mut self, error: &TelemetryError) {
        *self = Self::Error(error.to_string());
    }

    /// Enter `Loading` for a reset and hand back the state to restore if it fails.
    pub fn begin_reset(&mut self) -> ConnectionState {
        std::mem::replace(self, Self::Loading)
    }

    pub fn restore(&mut self, previous: ConnectionState) {
        *self = previous;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_loading() {
        assert!(ConnectionState::default().is_loading());
    }

    #[test]
    fn recovers_from_error_on_next_record() {
        let mut state = ConnectionState::Ready;
        state.fail(&TelemetryError::Transport("socket closed".into()));
        assert_eq!(
            state.error_message(),
            Some("connection to the telemetry store failed: socket closed")
        );

        state.record_received();
        assert!(state.is_ready());
        assert_eq!(state.error_message(), None);
    }

    #[test]
    fn no_data_while_loading_is_an_error() {
        let mut state = ConnectionState::Loading;
        state.fail(&TelemetryError::NoData);
        assert!(state.error_message().is_some());
    }

    #[test]
    fn reset_round_trip_restores_previous_state() {
        let mut state = ConnectionState::Error("stale".into());
        let previous = state.begin_reset();
        assert!(state.is_loading());

        state.restore(previous);
        assert_eq!(state, ConnectionState::Error("stale".into()));
    }
}
