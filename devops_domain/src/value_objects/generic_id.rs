// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic Identifier Value Object
//!
//! A single ULID-backed identifier type, parameterized by a zero-sized marker
//! type so that `EventId`, `ExecutionId`, `OperationId`, and the other entity
//! identifiers in this domain are distinct Rust types that cannot be confused
//! with one another at compile time, while sharing one validated
//! implementation of parsing, ordering, and serialization.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use ulid::Ulid;

use crate::error::DevOpsError;

/// Per-marker validation hook. Implemented once per identifier marker type.
pub trait IdCategory {
    fn category_name() -> &'static str;

    /// Category-specific validation beyond "is a well-formed ULID".
    fn validate_id(_ulid: &Ulid) -> Result<(), DevOpsError> {
        Ok(())
    }
}

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericId<M> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<M>,
}

impl<M> Clone for GenericId<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: IdCategory> GenericId<M> {
    pub fn new() -> Self {
        Self {
            ulid: Ulid::new(),
            _marker: PhantomData,
        }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, DevOpsError> {
        M::validate_id(&ulid)?;
        Ok(Self {
            ulid,
            _marker: PhantomData,
        })
    }

    pub fn from_string(s: &str) -> Result<Self, DevOpsError> {
        let ulid = Ulid::from_string(s).map_err(|e| {
            DevOpsError::validation(format!("invalid {} id '{s}': {e}", M::category_name()))
        })?;
        Self::from_ulid(ulid)
    }

    pub fn from_timestamp(timestamp_ms: u64) -> Self {
        Self {
            ulid: Ulid::from_parts(timestamp_ms, rand::random()),
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }
}

impl<M: IdCategory> Default for GenericId<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Display for GenericId<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ulid)
    }
}

impl<M> Copy for GenericId<M> {}
