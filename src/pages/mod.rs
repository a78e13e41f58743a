//! Page controllers for the admin UI.
//!
//! Each page owns its mirrors and draft inputs and exposes one method per user
//! action. A UI binds controls to those methods and disables them while the
//! page reports [`Phase::Busy`](crate::sync::Phase::Busy).

mod admin;
mod roster;

pub use admin::*;
pub use roster::*;
