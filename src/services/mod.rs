//! Request-level operations composed from the stores and outbound clients

pub mod location;
pub mod notification;

pub use location::LocationService;
pub use notification::NotificationService;
