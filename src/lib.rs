//! Hexbuild - reduceOS build tooling.
//!
//! Small build steps invoked from the Makefiles:
//! - driver manifest generation with LOAD_BEFORE ordering ([`order`])
//! - driver directory discovery per architecture ([`discover`])
//! - kernel module boot/user lists ([`modconf`])
//! - userspace app.conf queries ([`appinfo`])
//! - build number / date stamping ([`stamp`])
//! - initrd packaging ([`initrd`])

pub mod appinfo;
pub mod cache;
pub mod check;
pub mod commands;
pub mod conf;
pub mod config;
pub mod discover;
pub mod driver;
pub mod initrd;
pub mod manifest;
pub mod modconf;
pub mod order;
pub mod process;
pub mod stamp;

pub use driver::{ConfigError, DriverRecord, DriverSet, Environment, Priority};
pub use manifest::DriverManifest;
pub use order::OrderError;
