// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Full-text search over the package catalog: index schema, document
//! projection, query construction with faceting, and the engine client.

pub mod app;
pub mod models;
pub mod services;
