pub mod action;
pub mod employee;
pub mod pending_event;
pub mod remote_record;
