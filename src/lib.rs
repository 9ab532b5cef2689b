// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App ID Gateway - HTTP API authenticated through IBM Cloud App ID
//!
//! This crate signs users in with the OAuth2 authorization code flow and
//! protects resource endpoints with bearer tokens verified against the
//! App ID public keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token verification, code exchange and the authentication gate
//! - `config` - Environment configuration
//! - `error` - Handler error responses

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_support;
