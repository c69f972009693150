// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the TeleEye directory bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the TeleEye workspace. Every collaborator of
//! the directory (channel, state store, record store, tag extractor) is a
//! trait defined here and injected where it is needed.

pub mod conversation;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use conversation::{AddStage, Command, ConversationState, Flow, IndexStage};
pub use error::TeleEyeError;
pub use types::{AdapterType, GroupInfo, GroupKind, GroupRecord, HealthStatus, MessageId};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, PluginAdapter, RecordStore, StateStore, TagExtractor};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teleeye_error_variants_render() {
        let config = TeleEyeError::Config("test".into());
        assert_eq!(config.to_string(), "configuration error: test");

        let storage = TeleEyeError::storage(std::io::Error::other("disk"));
        assert_eq!(storage.to_string(), "storage error: disk");

        let not_found = TeleEyeError::GroupNotFound {
            handle: "nightyworld".into(),
        };
        assert_eq!(not_found.to_string(), "group not found: @nightyworld");

        let _channel = TeleEyeError::Channel {
            message: "test".into(),
            source: None,
        };
        let _internal = TeleEyeError::Internal("test".into());
    }

    #[test]
    fn serde_json_errors_become_serialization() {
        let err: TeleEyeError = serde_json::from_str::<GroupInfo>("{").unwrap_err().into();
        assert!(matches!(err, TeleEyeError::Serialization(_)));
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Channel,
            AdapterType::StateStore,
            AdapterType::RecordStore,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_state_store<T: StateStore>() {}
        fn _assert_record_store<T: RecordStore>() {}
        fn _assert_tag_extractor<T: TagExtractor>() {}
    }
}
