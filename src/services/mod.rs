// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod indexer;
pub mod logging;
pub mod projector;
pub mod query;
pub mod schema;
pub mod search;
