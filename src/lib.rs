//! Git Launcher - open any repository in a local cache and launch a command in it.
//!
//! A reference (URL, `owner/repo`, or free text) is resolved to a repository,
//! cloned or reused under the cache's base directory, brought to the right
//! branch, and handed to a configured launch command. Stale checkouts are
//! evicted under a time-to-live policy.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Reference resolution and branch selection
//! - The cache lifecycle manager and TTL evictor
//! - Metadata, history and cache scanning
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Persistence
    CacheEntry,
    CacheIndex,
    // Lifecycle
    Checkout,
    // External collaborators
    Chooser,
    // Configuration
    Config,
    // Error handling
    GitLauncherError,
    // Git operations
    GitRepo,
    HistoryEntry,
    IndexParser,
    MetadataStore,
    // Resolution
    ReferenceResolver,
    RepoLifecycleManager,
    RepoMeta,
    RepoRef,
    RepoSearch,
    RepoState,
    Result,
    TtlEvictor,
    UpdateAction,
};
