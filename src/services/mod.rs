//! Screen state and the request flows behind each screen.

pub mod dashboard;
pub mod login;
