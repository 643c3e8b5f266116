mod transit_app;

pub use transit_app::{TransitApp, TransitOperation};
