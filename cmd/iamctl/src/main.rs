//! iamctl - validate and author IAM policies for the emulators.
//!
//! Commands:
//! - `iamctl validate` - Check a policy.yaml for structural and reference errors
//! - `iamctl fmt` - Rewrite a policy in canonical form
//! - `iamctl init` - Write a starter policy
//! - `iamctl explain` - Summarize who gets which role where

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use iam_policy::Template;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "iamctl")]
#[command(about = "Validate and author IAM policies for the secret manager and KMS emulators")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a policy file
    Validate {
        /// Path to policy.yaml
        #[arg(short, long, env = "IAM_POLICY_FILE", default_value = "policy.yaml")]
        policy: PathBuf,

        /// Fail on warnings (not just errors)
        #[arg(long)]
        strict: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Restrict permissions to these services (repeatable; default: all)
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Rewrite a policy file in canonical form (drops comments and unknown keys)
    Fmt {
        /// Path to policy.yaml
        #[arg(short, long, env = "IAM_POLICY_FILE", default_value = "policy.yaml")]
        policy: PathBuf,

        /// Only check; fail if the file is not already canonical
        #[arg(long)]
        check: bool,
    },

    /// Write a starter policy
    Init {
        /// Output path
        #[arg(default_value = "policy.yaml")]
        path: PathBuf,

        /// Starter template (basic, advanced, ci)
        #[arg(short, long, default_value = "basic")]
        template: Template,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Summarize a policy's roles, groups and bindings
    Explain {
        /// Path to policy.yaml
        #[arg(short, long, env = "IAM_POLICY_FILE", default_value = "policy.yaml")]
        policy: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            policy,
            strict,
            format,
            services,
        } => commands::validate::run(&policy, strict, format, &services),
        Commands::Fmt { policy, check } => commands::fmt::run(&policy, check),
        Commands::Init {
            path,
            template,
            force,
        } => commands::init::run(&path, template, force),
        Commands::Explain { policy } => commands::explain::run(&policy),
    }
}
