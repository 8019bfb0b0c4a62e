//! Provisioning use-case services.
//!
//! # Responsibility
//! - Converge stored alert notifications onto declared provisioning documents.
//! - Stay storage-agnostic: all persistence goes through `NotificationStore`.

pub mod org_resolver;
pub mod provisioner;
