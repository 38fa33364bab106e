pub mod geolocation;
pub mod lifecycle;
pub mod messaging;
pub mod notifier;
pub mod queue;
pub mod roster;
pub mod runner;
pub mod session;
pub mod simulator;
