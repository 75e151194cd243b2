// Copyright 2026, Docplanner Engineering
// SPDX-License-Identifier: Apache-2.0
pub mod client;
pub mod events;
pub mod nodes;

pub use client::build_client;
pub use events::delete_event;
pub use nodes::reserve_replacement_node;
