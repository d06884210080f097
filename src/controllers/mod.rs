//! Page controllers.
//!
//! Each controller drives one device page: it issues the requests a user
//! action needs and records the outcome in that page's view model. Errors
//! never escape a controller; they land in the view's error region.

pub mod blacklist;
pub mod dashboard;
pub mod provisioning;
pub mod settings;
