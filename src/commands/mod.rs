//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `drivers` - Order drivers and write the driver manifest
//! - `check` - Lint driver configs
//! - `discover` - List driver directories for an architecture
//! - `modconf` - Write kernel module boot/user lists
//! - `app` - Query a userspace app's app.conf
//! - `stamp` - Bump the build number and date
//! - `initrd` - Package the initrd
//! - `show` - Display information

mod app;
mod check;
mod discover;
mod drivers;
mod initrd;
mod modconf;
pub mod show;
mod stamp;

pub use app::cmd_app_info;
pub use check::cmd_check;
pub use discover::cmd_driver_dirs;
pub use drivers::cmd_drivers;
pub use initrd::cmd_initrd;
pub use modconf::cmd_modconf;
pub use show::cmd_show;
pub use stamp::cmd_stamp;
