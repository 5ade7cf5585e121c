//! Outbound adapters implementing domain ports.
//!
//! The hosted backend (identity, documents, file storage) is reached through
//! the ports in [`crate::domain::ports`]. This module provides the in-process
//! implementations used by the demo binary and the integration tests:
//!
//! - **memory**: accounts, profile and watched-movie documents, and avatar
//!   objects held in process, with push notifications to watchers.
//!
//! Adapters are thin translators that convert between domain types and
//! storage representations. They contain no business logic.

pub mod memory;
