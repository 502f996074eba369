pub mod access;
pub mod identity;
pub mod messaging;

pub use identity::{IdentityService, Registration};
pub use messaging::MessagingService;
