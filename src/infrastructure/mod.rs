pub mod recording_notifier;
pub mod simulated_gateway;
