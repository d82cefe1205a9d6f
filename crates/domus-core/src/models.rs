//! Domain models for every entity kind.

pub mod apartment;
pub mod counter;
pub mod event;
pub mod house;
pub mod reading;
pub mod request;
pub mod session;
pub mod user;
