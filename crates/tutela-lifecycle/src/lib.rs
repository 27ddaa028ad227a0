//! Lifecycle engines for the Tutela data-lifecycle subsystem.
//!
//! Each engine is generic over a [`tutela_core::store::LifecycleStore`]
//! implementation and owns one concern: the consent ledger issues and
//! verifies authorizations, the export engine assembles portability
//! bundles, the erasure engine removes or rewrites subject data, and the
//! audit trail keeps the tamper-evident operation log. The coordinator
//! glues them together behind per-subject locks so callers get one
//! verify-act-log sequence per request.
//!
//! Nothing in this crate speaks HTTP or SQL.

pub mod audit;
pub mod consent;
pub mod coordinator;
pub mod erasure;
pub mod export;
pub mod locks;
pub mod token;

#[cfg(test)]
pub(crate) mod test_store;

pub use coordinator::{CoordinatorConfig, LifecycleCoordinator};
