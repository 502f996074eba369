//! Who may touch a message.

use crate::db::models::MessageDetail;

/// Sender and recipient may read.
pub fn can_read(message: &MessageDetail, requester: &str) -> bool {
    requester == message.from_user.username || requester == message.to_user.username
}

/// Only the recipient may mark read.
pub fn can_mark_read(message: &MessageDetail, requester: &str) -> bool {
    requester == message.to_user.username
}
