//! Hexbuild - reduceOS build tooling.
//!
//! One subcommand per build step; the Makefiles call these instead of
//! scripts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hexbuild::appinfo::AppRequest;
use hexbuild::commands;
use hexbuild::config::Config;
use hexbuild::stamp::BuildConfiguration;

#[derive(Parser)]
#[command(name = "hexbuild")]
#[command(about = "reduceOS build tooling")]
#[command(
    after_help = "QUICK START:\n  hexbuild driver-dirs i386       List driver directories to build\n  hexbuild drivers storage/ahci    Write driver_conf.json\n  hexbuild check storage/ahci      Lint driver configs\n  hexbuild initrd initrd_root      Package the initrd"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order drivers by LOAD_BEFORE and write the driver manifest
    Drivers {
        /// Driver directories, each containing a driver.conf
        dirs: Vec<PathBuf>,

        /// Output file (default: DRIVER_MANIFEST or driver_conf.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check driver configs without writing anything
    Check {
        /// Driver directories, each containing a driver.conf
        dirs: Vec<PathBuf>,

        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Print driver directories that build for an architecture
    DriverDirs {
        /// Build architecture (e.g. i386, x86_64)
        arch: String,

        /// Drivers tree (default: DRIVERS_DIR or ./drivers)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Write mod_boot.conf and mod_user.conf from kernel module configs
    Modconf {
        /// Kernel modules directory (default: KMODS_DIR or source/kmods)
        dir: Option<PathBuf>,
    },

    /// Print one field of a userspace app's app.conf
    AppInfo {
        /// App directory containing app.conf
        dir: PathBuf,

        #[arg(value_enum)]
        request: AppRequest,
    },

    /// Increment the build number and set the build date in CONFIG.h
    Stamp {
        #[arg(value_enum, ignore_case = true)]
        configuration: BuildConfiguration,

        /// CONFIG.h to update (default: CONFIG_HEADER or auto-detected)
        #[arg(long)]
        header: Option<PathBuf>,
    },

    /// Package a root tree into the ustar initrd
    Initrd {
        /// Root of the initrd tree
        root: PathBuf,

        /// Output archive (default: INITRD_OUTPUT or initrd.tar)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Repack even if the tree is unchanged
        #[arg(long)]
        force: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show a driver manifest's load order
    Manifest {
        /// Manifest file (default: DRIVER_MANIFEST or driver_conf.json)
        path: Option<PathBuf>,
    },
    /// List initrd contents
    Initrd {
        /// Archive (default: INITRD_OUTPUT or initrd.tar)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let config = Config::load(&base_dir);

    match cli.command {
        Commands::Drivers {
            dirs,
            output,
            pretty,
        } => {
            let output = output.unwrap_or_else(|| config.driver_manifest.clone());
            commands::cmd_drivers(&dirs, &output, pretty)?;
        }

        Commands::Check { dirs, strict } => {
            commands::cmd_check(&dirs, strict)?;
        }

        Commands::DriverDirs { arch, root } => {
            let root = root.unwrap_or_else(|| config.drivers_dir.clone());
            commands::cmd_driver_dirs(&root, &arch)?;
        }

        Commands::Modconf { dir } => {
            let dir = dir.unwrap_or_else(|| config.kmods_dir.clone());
            commands::cmd_modconf(&dir)?;
        }

        Commands::AppInfo { dir, request } => {
            commands::cmd_app_info(&dir, request)?;
        }

        Commands::Stamp {
            configuration,
            header,
        } => {
            commands::cmd_stamp(&config, configuration, header.as_deref())?;
        }

        Commands::Initrd {
            root,
            output,
            force,
        } => {
            let output = output.unwrap_or_else(|| config.initrd_output.clone());
            commands::cmd_initrd(&root, &output, force)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Manifest { path } => commands::show::ShowTarget::Manifest { path },
                ShowTarget::Initrd { path } => commands::show::ShowTarget::Initrd { path },
            };
            commands::cmd_show(show_target, &config)?;
        }
    }

    Ok(())
}
