//! Authorization module
//!
//! Per-resource authorization policies, dispatched over [`Action`].

pub mod action;
pub mod announcement;

pub use action::Action;
pub use announcement::AnnouncementAuth;
