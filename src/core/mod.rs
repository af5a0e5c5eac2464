pub mod capture;
pub mod kiosk;
pub mod log;
pub mod resolver;
pub mod stager;
pub mod store;
pub mod sync;
pub mod trigger;
