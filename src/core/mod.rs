//! Core functionality for the git-launcher tool.
//!
//! This module provides the building blocks of the repository cache: metadata
//! and history persistence, cache scanning, reference resolution, branch
//! selection, the clone/reuse/update lifecycle and TTL eviction.

pub mod branch;
pub mod cache_index;
pub mod chooser;
pub mod config;
pub mod dirs;
pub mod error;
pub mod evictor;
pub mod git;
pub mod index_parser;
pub mod launch;
pub mod lifecycle;
pub mod meta;
pub mod output;
pub mod resolver;
pub mod search;

// === Error handling ===
pub use error::{GitLauncherError, Result};

// === Configuration ===
pub use config::{Config, Provider};

// === Git operations ===
pub use git::GitRepo;

// === Persistence ===
// Per-checkout metadata, the access history and the cache scan
pub use cache_index::{CacheEntry, CacheIndex};
pub use meta::{HistoryEntry, MetadataStore, RepoMeta};

// === Pipeline ===
// resolve -> select branch -> lifecycle transition -> launch, with eviction around it
pub use branch::{BranchListing, BranchSelector};
pub use evictor::TtlEvictor;
pub use lifecycle::{Checkout, RemoteStatus, RepoLifecycleManager, RepoState};
pub use resolver::{Candidate, Origin, ReferenceResolver, RepoRef};

// === External collaborators ===
pub use chooser::{Chooser, TerminalChooser, UpdateAction};
pub use search::{GhSearch, RepoSearch, SearchHit};

// === Index parsing ===
// Parser for handling user input like "1 3-5,8" -> [1, 3, 4, 5, 8]
pub use index_parser::IndexParser;

// === Output formatting ===
pub use output::{
    print_error, print_info, print_section_header, print_step, print_success, print_warning,
};
