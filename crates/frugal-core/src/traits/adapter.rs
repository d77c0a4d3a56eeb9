// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by all backend adapters.

use async_trait::async_trait;

use crate::error::FrugalError;
use crate::types::HealthStatus;

/// Identity and health reporting for a pluggable adapter.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Reports whether the adapter can currently serve requests.
    ///
    /// Must not consume upstream tokens.
    async fn health_check(&self) -> Result<HealthStatus, FrugalError>;
}
