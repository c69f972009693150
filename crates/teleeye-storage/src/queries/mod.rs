// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the directory tables.

pub mod conversations;
pub mod groups;
pub mod tags;
pub mod users;

/// `?1, ?2, ...` placeholders for an `IN (...)` list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
