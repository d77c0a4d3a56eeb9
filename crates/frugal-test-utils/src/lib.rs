// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Frugal integration tests.
//!
//! Provides a scripted provider adapter for fast, deterministic tests of the
//! completion pipeline without network access.
//!
//! # Components
//!
//! - [`MockProvider`] - provider adapter with queued outcomes and a call log

pub mod mock_provider;

pub use mock_provider::{MockOutcome, MockProvider};
