//! CLI command definitions
//!
//! Defines the clap commands for the returns smoke test CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::session::Role;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full returns workflow against the backend
    Run {
        /// YAML scenario overriding the built-in fixture data
        #[arg(long, short)]
        scenario: Option<PathBuf>,

        /// Also run the rejection flow (creates a second order)
        #[arg(long)]
        with_rejection: bool,

        /// Always create a new order instead of reusing an existing one
        #[arg(long)]
        fresh_order: bool,

        /// Skip the warranty checks
        #[arg(long)]
        skip_warranties: bool,

        /// Skip the audit log check
        #[arg(long)]
        skip_audit: bool,
    },

    /// Check the credentials of one role (all roles if omitted)
    Login {
        /// client, manager or admin
        role: Option<Role>,
    },

    /// List returns (the client's own, or all with --all as manager)
    Returns {
        #[arg(long)]
        all: bool,
    },

    /// Show one return
    Return {
        /// Return ID
        id: i64,
    },

    /// Send a return to evaluation (manager)
    #[command(alias = "eval")]
    Evaluate {
        /// Return ID
        id: i64,
    },

    /// Approve a return and process its refund (manager)
    Approve {
        /// Return ID
        id: i64,

        /// Evaluation notes recorded with the approval
        #[arg(long, default_value = "Approved from the command line")]
        notes: String,
    },

    /// Reject a return (manager)
    Reject {
        /// Return ID
        id: i64,

        /// Reason shown to the customer
        #[arg(long)]
        reason: String,
    },

    /// Show the client's wallet, balance, transactions and statistics
    Wallet,

    /// List warranties, or show one by ID
    Warranties {
        /// Warranty ID
        id: Option<i64>,
    },

    /// Show the latest audit log entries (admin)
    Audit {
        /// Number of entries to request
        #[arg(long, default_value = "5")]
        page_size: u32,
    },

    /// Show the effective configuration
    Config,
}
