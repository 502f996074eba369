use std::sync::Arc;

use crate::config::Config;
use crate::crypto::TokenIssuer;
use crate::service::{IdentityService, MessagingService};

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub messages: MessagingService,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<Config>,
}
