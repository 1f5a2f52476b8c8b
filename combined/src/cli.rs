//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

/// Administration tool for users, roles and query macros
#[derive(Parser, Debug)]
#[command(name = "appkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage roles and role assignments
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Show the authorities resolved for a username
    Authorities {
        username: String,
    },

    /// Expand the macros of a query and bind their parameters
    Expand(ExpandArgs),
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

/// User actions
#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user
    Create(CreateUserArgs),

    /// Find users whose username contains a fragment
    Find {
        fragment: String,
    },

    /// Disable a user so it can no longer log in
    Disable {
        username: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    pub username: String,

    #[arg(long, env = "APPKIT_USER_PASSWORD")]
    pub password: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// IANA time zone id, e.g. Europe/Paris
    #[arg(long)]
    pub time_zone: Option<String>,
}

/// Role actions
#[derive(Subcommand, Debug)]
pub enum RoleAction {
    /// Create a database role
    Create {
        code: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Assign a role to a username
    Assign {
        username: String,
        code: String,
    },

    /// Revoke a role from a username
    Revoke {
        username: String,
        code: String,
    },

    /// List all known roles
    List,
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    pub query: String,

    /// Client time zone used for USER_TIMEZONE
    #[arg(long)]
    pub time_zone: Option<String>,

    /// Moment to bind relative dates against (RFC 3339), defaults to now
    #[arg(long)]
    pub now: Option<String>,

    /// Load this user as the session user
    #[arg(long)]
    pub username: Option<String>,

    /// Query parameter as name=value, value being a date or an RFC 3339 timestamp
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}
