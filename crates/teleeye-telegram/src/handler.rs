// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic [`InboundEvent`]s.
//!
//! Only text messages, inline button presses and changes of the bot's own
//! membership are turned into events; everything else is dropped here.

use teloxide::types::{CallbackQuery, ChatKind, ChatMemberUpdated, Message, User};

use teleeye_core::types::{EventKind, GroupKind, InboundEvent, UserRecord};

/// Checks whether the message is from a private (DM) chat.
pub fn is_private(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

pub fn user_record(user: &User) -> UserRecord {
    UserRecord {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Maps Telegram's chat type flags onto the directory's group kinds.
pub fn group_kind(private: bool, group: bool, channel: bool) -> GroupKind {
    if private {
        GroupKind::Private
    } else if channel {
        GroupKind::Channel
    } else if group {
        GroupKind::Group
    } else {
        GroupKind::Supergroup
    }
}

/// A text message becomes a command or a free-text event.
pub fn message_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    Some(InboundEvent {
        id: msg.id.0.to_string(),
        chat_id: msg.chat.id.0,
        sender: msg.from.as_ref().map(user_record),
        kind: EventKind::from_text(text),
        timestamp: msg.date.to_rfc3339(),
    })
}

/// A button press becomes a callback event in the chat the button was shown in.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.clone()?;
    let chat_id = query.message.as_ref()?.chat().id.0;
    Some(InboundEvent {
        id: query.id.to_string(),
        chat_id,
        sender: Some(user_record(&query.from)),
        kind: EventKind::Callback { data },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// A change of the bot's own membership in a group or channel.
///
/// Returns `None` for private chats and for changes that keep the bot in or
/// out of the chat (for example a promotion to administrator).
pub fn membership_event(update: &ChatMemberUpdated) -> Option<InboundEvent> {
    if matches!(update.chat.kind, ChatKind::Private(_)) {
        return None;
    }

    let was_present = update.old_chat_member.kind.is_present();
    let is_present = update.new_chat_member.kind.is_present();
    let kind = match (was_present, is_present) {
        (false, true) => EventKind::BotAdded {
            handle: update.chat.username().map(str::to_string),
        },
        (true, false) => EventKind::BotRemoved,
        _ => return None,
    };

    Some(InboundEvent {
        id: format!("member-{}-{}", update.chat.id.0, update.date.timestamp()),
        chat_id: update.chat.id.0,
        sender: Some(user_record(&update.from)),
        kind,
        timestamp: update.date.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: u64, username: Option<&str>, lang: Option<&str>) -> serde_json::Value {
        let mut user = json!({ "id": id, "is_bot": false, "first_name": "Test" });
        if let Some(name) = username {
            user["username"] = json!(name);
        }
        if let Some(lang) = lang {
            user["language_code"] = json!(lang);
        }
        user
    }

    fn private_message(text: &str) -> serde_json::Value {
        json!({
            "message_id": 11,
            "date": 1700000000i64,
            "chat": { "id": 12345i64, "type": "private", "first_name": "Test" },
            "from": user(12345, Some("night_owl"), Some("zh-hans")),
            "text": text,
        })
    }

    fn group_message(text: &str) -> Message {
        serde_json::from_value(json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": { "id": -100123i64, "type": "supergroup", "title": "Test Group" },
            "from": user(12345, None, None),
            "text": text,
        }))
        .expect("failed to deserialize group message")
    }

    fn membership(old: &str, new: &str, chat: serde_json::Value) -> ChatMemberUpdated {
        let bot = json!({ "id": 999u64, "is_bot": true, "first_name": "TeleEye" });
        serde_json::from_value(json!({
            "chat": chat,
            "from": user(12345, Some("night_owl"), None),
            "date": 1700000000i64,
            "old_chat_member": { "user": bot, "status": old },
            "new_chat_member": { "user": bot, "status": new },
        }))
        .expect("failed to deserialize member update")
    }

    fn public_supergroup() -> serde_json::Value {
        json!({
            "id": -1001i64,
            "type": "supergroup",
            "title": "Nighty",
            "username": "nightyworld"
        })
    }

    #[test]
    fn private_text_becomes_command_event() {
        let msg: Message = serde_json::from_value(private_message("/index@teleeye_bot nightyworld"))
            .expect("failed to deserialize message");
        assert!(is_private(&msg));

        let event = message_event(&msg).unwrap();
        assert_eq!(event.id, "11");
        assert_eq!(event.chat_id, 12345);
        assert_eq!(
            event.kind,
            EventKind::Command {
                name: "index".into(),
                args: "nightyworld".into(),
            }
        );
        assert_eq!(event.language_code(), Some("zh-hans"));
        assert_eq!(event.sender.unwrap().username.as_deref(), Some("night_owl"));
    }

    #[test]
    fn group_message_is_not_private() {
        assert!(!is_private(&group_message("rust")));
    }

    #[test]
    fn non_text_message_yields_nothing() {
        let mut value = private_message("x");
        value.as_object_mut().unwrap().remove("text");
        value["photo"] = json!([{
            "file_id": "f",
            "file_unique_id": "u",
            "width": 1,
            "height": 1
        }]);
        let msg: Message = serde_json::from_value(value).expect("failed to deserialize photo");
        assert!(message_event(&msg).is_none());
    }

    #[test]
    fn button_press_becomes_callback_event() {
        let query: CallbackQuery = serde_json::from_value(json!({
            "id": "4382",
            "from": user(12345, None, Some("en")),
            "chat_instance": "-77",
            "data": "Technology",
            "message": private_message("Choose a category"),
        }))
        .expect("failed to deserialize callback query");

        let event = callback_event(&query).unwrap();
        assert_eq!(event.chat_id, 12345);
        assert_eq!(event.kind, EventKind::Callback { data: "Technology".into() });
    }

    #[test]
    fn bot_added_to_public_group() {
        let update = membership("left", "member", public_supergroup());
        let event = membership_event(&update).unwrap();
        assert_eq!(event.chat_id, -1001);
        assert_eq!(
            event.kind,
            EventKind::BotAdded {
                handle: Some("nightyworld".into())
            }
        );
    }

    #[test]
    fn bot_added_to_private_group_has_no_handle() {
        let chat = json!({ "id": -5i64, "type": "group", "title": "Friends" });
        let event = membership_event(&membership("left", "member", chat)).unwrap();
        assert_eq!(event.kind, EventKind::BotAdded { handle: None });
    }

    #[test]
    fn bot_removed() {
        let update = membership("member", "left", public_supergroup());
        let event = membership_event(&update).unwrap();
        assert_eq!(event.kind, EventKind::BotRemoved);
    }

    #[test]
    fn unchanged_membership_is_ignored() {
        let update = membership("member", "member", public_supergroup());
        assert!(membership_event(&update).is_none());
    }

    #[test]
    fn private_chats_have_no_membership_events() {
        let chat = json!({ "id": 12345i64, "type": "private", "first_name": "Test" });
        assert!(membership_event(&membership("left", "member", chat)).is_none());
    }

    #[test]
    fn chat_flags_map_to_group_kinds() {
        assert_eq!(group_kind(true, false, false), GroupKind::Private);
        assert_eq!(group_kind(false, true, false), GroupKind::Group);
        assert_eq!(group_kind(false, false, true), GroupKind::Channel);
        assert_eq!(group_kind(false, false, false), GroupKind::Supergroup);
    }
}
