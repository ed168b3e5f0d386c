//! Domain model module declarations.

pub mod event;
pub mod record;
pub mod session;
