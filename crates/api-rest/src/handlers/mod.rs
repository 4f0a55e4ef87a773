//! Request handlers, one module per resource.

pub mod donations;
pub mod donors;
pub mod requests;
pub mod units;
