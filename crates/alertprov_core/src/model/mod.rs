//! Domain model for provisioned alert notification channels.
//!
//! # Responsibility
//! - Define declared entries (to apply / to delete) as read from provisioning
//!   documents.
//! - Define stored records and the write commands issued to the store.
//!
//! # Invariants
//! - A channel is identified by `(org_id, name)` for lookup purposes.
//! - Declared entries are never mutated during reconciliation.

pub mod notification;
