// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! Two kinds of service live here: infrastructure ports (`CacheStore`,
//! `CiCdConnector`, `NotificationDispatcher`) that the infrastructure layer
//! implements, and pure domain logic (`webhook_signature`) that needs no
//! I/O and is tested directly against known request bodies.

pub mod cache_store;
pub mod cicd_connector;
pub mod notification_dispatcher;
pub mod webhook_signature;

pub use cache_store::CacheStore;
pub use cicd_connector::CiCdConnector;
pub use notification_dispatcher::NotificationDispatcher;
