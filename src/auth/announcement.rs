//! Announcement authorization
//!
//! Anyone may read announcements; only admins may create, update or delete
//! them, and only with a concrete announcement in hand.

use crate::auth::action::Action;
use crate::model::{Announcement, CurrentUser};
use tracing::trace;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnouncementAuth;

impl AnnouncementAuth {
    pub fn new() -> Self {
        Self
    }

    /// Resource-specific actions beyond CRUD (none for announcements)
    pub fn specific_actions(&self) -> &'static [&'static str] {
        &[]
    }

    pub fn can(
        &self,
        user: &CurrentUser,
        action: Action,
        announcement: Option<&Announcement>,
    ) -> bool {
        let allowed = match action {
            Action::Read => true,
            Action::Create | Action::Update | Action::Delete => {
                Self::admin_with_target(user, announcement)
            }
        };
        trace!(action = %action, allowed, "Announcement authorization");
        allowed
    }

    fn admin_with_target(user: &CurrentUser, announcement: Option<&Announcement>) -> bool {
        if user.is_anonymous() || announcement.is_none() {
            return false;
        }
        user.is_admin()
    }
}
