use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use opsync_core::{ConflictResolution, EntityType, OperationKind, OperationStatus};

#[derive(Parser)]
#[command(name = "opsync")]
#[command(about = "Queue, inspect, and reconcile record synchronization")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local sync database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue a record mutation for the next sync
    Queue {
        /// What the mutation does
        #[arg(value_enum)]
        kind: KindArg,
        /// Entity type the mutation touches
        #[arg(value_enum)]
        entity_type: EntityTypeArg,
        /// Remote ID of the entity
        entity_id: String,
        /// Mutation payload as a JSON object
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Drain all due pending operations now
    Sync,
    /// Show aggregate sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List queued operations
    Operations {
        /// Filter by lifecycle status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recorded conflicts
    Conflicts {
        /// Only resolved conflicts
        #[arg(long, conflicts_with = "unresolved")]
        resolved: bool,
        /// Only unresolved conflicts
        #[arg(long)]
        unresolved: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manually resolve a recorded conflict
    Resolve {
        /// Conflict ID
        id: String,
        /// Which value wins the disputed field
        #[arg(long, value_enum)]
        resolution: ResolutionArg,
        /// Name recorded as the resolver
        #[arg(long, value_name = "NAME")]
        by: Option<String>,
    },
    /// Reset failed operations and drain again
    Retry,
    /// Purge old completed operations and resolved conflicts
    Clear {
        /// Override the default retention window
        #[arg(long, value_name = "DAYS")]
        older_than_days: Option<i64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Create,
    Update,
    Delete,
}

impl From<KindArg> for OperationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Create => Self::Create,
            KindArg::Update => Self::Update,
            KindArg::Delete => Self::Delete,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EntityTypeArg {
    Project,
    Client,
    Invoice,
    Payment,
    TimeEntry,
    Expense,
}

impl From<EntityTypeArg> for EntityType {
    fn from(entity_type: EntityTypeArg) -> Self {
        match entity_type {
            EntityTypeArg::Project => Self::Project,
            EntityTypeArg::Client => Self::Client,
            EntityTypeArg::Invoice => Self::Invoice,
            EntityTypeArg::Payment => Self::Payment,
            EntityTypeArg::TimeEntry => Self::TimeEntry,
            EntityTypeArg::Expense => Self::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Completed,
    Failed,
    Conflict,
}

impl From<StatusArg> for OperationStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => Self::Pending,
            StatusArg::Completed => Self::Completed,
            StatusArg::Failed => Self::Failed,
            StatusArg::Conflict => Self::Conflict,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ResolutionArg {
    Local,
    Remote,
    Merge,
}

impl From<ResolutionArg> for ConflictResolution {
    fn from(resolution: ResolutionArg) -> Self {
        match resolution {
            ResolutionArg::Local => Self::Local,
            ResolutionArg::Remote => Self::Remote,
            ResolutionArg::Merge => Self::Merge,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
