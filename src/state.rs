// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(provider: IdentityProvider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}
