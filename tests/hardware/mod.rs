//! Tests against a real serial device.
//!
//! The device is picked with environment variables, see [`utils::TestPortConfig`].

pub mod real_port_tests;
pub mod utils;
