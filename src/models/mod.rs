pub mod event;
pub mod location;
pub mod message;
pub mod notification;
pub mod order;
pub mod profile;
