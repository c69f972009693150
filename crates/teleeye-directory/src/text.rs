// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Localized bot texts (English and Chinese).
//!
//! A [`TextCatalog`] is built once at startup and shared. Languages are picked
//! per event from the sender's language code, falling back to the configured
//! default.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use teleeye_core::types::{GroupInfo, Keyboard, KeyboardButton};

use crate::search::RankedGroup;

/// Languages with a translation in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

impl Language {
    /// Maps an IETF-style code (`en`, `en-US`, `zh-hans`) to a catalog language.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        primary.to_ascii_lowercase().parse().ok()
    }
}

/// Fixed messages. Messages with parameters have their own methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    Help,
    InputGroupLink,
    HandleInvalid,
    GroupNotFound,
    CategoryChoosing,
    CategoryInvalid,
    TagsInvalid,
    IndexFailed,
    UnknownCommand,
    Cancelled,
    NothingToCancel,
    SearchFailed,
    Unavailable,
}

/// Topics offered on the category keyboard. The callback payload is the English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Category {
    Programming,
    Politics,
    Economics,
    Technology,
    Cryptocurrencies,
    Blockchain,
}

impl Category {
    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Category::Programming, Language::En) => "💻 Programming",
            (Category::Programming, Language::Zh) => "💻 编程",
            (Category::Politics, Language::En) => "🏛️ Politics",
            (Category::Politics, Language::Zh) => "🏛️ 政治",
            (Category::Economics, Language::En) => "📈 Economics",
            (Category::Economics, Language::Zh) => "📈 经济金融",
            (Category::Technology, Language::En) => "🖥 Technology",
            (Category::Technology, Language::Zh) => "🖥 科技",
            (Category::Cryptocurrencies, Language::En) => "₿ Cryptocurrencies",
            (Category::Cryptocurrencies, Language::Zh) => "₿ 加密货币",
            (Category::Blockchain, Language::En) => "⛓️ Blockchain",
            (Category::Blockchain, Language::Zh) => "⛓️ 区块链",
        }
    }
}

const HELP_EN: &str = "\
Send any keyword to search for related groups and channels.

Commands:

/index  - index a group or channel
/add    - index a group or channel with a topic
/cancel - abort the current command
/help   - show this help

You can also add the bot to your public group to index it automatically.";

const HELP_ZH: &str = "\
收录群组:

TeleEye 机器人提供两种方式收录你的群组

1. 直接将机器人添加为你的群组成员
2. 在机器人对话框使用 /index 或 /add 命令

搜索群组:

与机器人对话, 直接输入关键词来查找相应的群组

命令列表:

/index  - 收录群组
/add    - 收录群组并选择话题
/cancel - 取消当前命令
/help   - 显示帮助";

const INPUT_GROUP_LINK_EN: &str = "\
Please send the full link or the username of the group/channel.

e.g. https://t.me/nightyworld
e.g. nightyworld";

const INPUT_GROUP_LINK_ZH: &str = "\
请输入群组/频道的完整链接或 username.

e.g. https://t.me/nightyworld
e.g. nightyworld";

/// Immutable text lookup shared by the dispatcher and the state machine.
#[derive(Debug, Clone)]
pub struct TextCatalog {
    default_language: Language,
}

impl TextCatalog {
    pub fn new(default_language: Language) -> Self {
        Self { default_language }
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// The language for a sender, given the language code the platform reported.
    pub fn language_for(&self, code: Option<&str>) -> Language {
        code.and_then(Language::from_code)
            .unwrap_or(self.default_language)
    }

    pub fn get(&self, lang: Language, key: TextKey) -> &'static str {
        use Language::{En, Zh};
        match (key, lang) {
            (TextKey::Help, En) => HELP_EN,
            (TextKey::Help, Zh) => HELP_ZH,
            (TextKey::InputGroupLink, En) => INPUT_GROUP_LINK_EN,
            (TextKey::InputGroupLink, Zh) => INPUT_GROUP_LINK_ZH,
            (TextKey::HandleInvalid, En) => {
                "Invalid group username. It must start with a letter and contain only letters, numbers and underscores. Links must look like https://t.me/username."
            }
            (TextKey::HandleInvalid, Zh) => {
                "非法的组用户名. 用户名必须以字母开头, 且只包含字母, 数字和下划线. 链接须以 https://t.me/ 或 t.me/ 开头"
            }
            (TextKey::GroupNotFound, En) => "Found no group or channel, please check your input.",
            (TextKey::GroupNotFound, Zh) => "未找到群组或频道, 请检查你的输入",
            (TextKey::CategoryChoosing, En) => {
                "Please choose the most relevant topic for your group."
            }
            (TextKey::CategoryChoosing, Zh) => "选择一个最符合你的群组的话题",
            (TextKey::CategoryInvalid, En) => "Invalid topic, please choose or type it again.",
            (TextKey::CategoryInvalid, Zh) => "话题输入非法, 请重新输入",
            (TextKey::TagsInvalid, En) => {
                "None of those tags are valid. Tags are at least two letters, digits, underscores or Chinese characters."
            }
            (TextKey::TagsInvalid, Zh) => {
                "关键字均不合法. 关键字至少两个字符, 只能包含字母, 数字, 下划线或汉字"
            }
            (TextKey::IndexFailed, En) => "Index failed, please try again later.",
            (TextKey::IndexFailed, Zh) => "收录失败, 请稍后重试",
            (TextKey::UnknownCommand, En) => "Unknown command. Send /help for the command list.",
            (TextKey::UnknownCommand, Zh) => "未知命令, 发送 /help 查看命令列表",
            (TextKey::Cancelled, En) => "Cancelled.",
            (TextKey::Cancelled, Zh) => "已取消",
            (TextKey::NothingToCancel, En) => "There is nothing to cancel.",
            (TextKey::NothingToCancel, Zh) => "当前没有进行中的命令",
            (TextKey::SearchFailed, En) => "Search failed, please try again later.",
            (TextKey::SearchFailed, Zh) => "搜索失败, 请稍后重试",
            (TextKey::Unavailable, En) => "Something went wrong, please try again later.",
            (TextKey::Unavailable, Zh) => "服务暂时不可用, 请稍后重试",
        }
    }

    /// Prompt for tags, listing extracted suggestions when there are any.
    pub fn tag_prompt(&self, lang: Language, max_tags: usize, suggestions: &[String]) -> String {
        let mut text = match lang {
            Language::En => format!(
                "Send a few keywords for this group/channel to make it easier to find, up to {max_tags}, separated by spaces.\n\ne.g. science chat\ne.g. shopping gadgets geek"
            ),
            Language::Zh => format!(
                "为此群组/频道输入几个关键字以使其更容易被发现. 每个群组/频道最多支持 {max_tags} 个关键字, 以空格分割.\n\ne.g. 社科 闲聊\ne.g. 消费 数码 geek"
            ),
        };
        if !suggestions.is_empty() {
            let label = match lang {
                Language::En => "Suggested",
                Language::Zh => "推荐关键字",
            };
            text.push_str(&format!("\n\n{label}: {}", suggestions.join(" ")));
        }
        text
    }

    /// Summary sent after a group has been indexed.
    pub fn index_success(&self, lang: Language, group: &GroupInfo, indexed_at: &str) -> String {
        let tags = group.tags.join(", ");
        match lang {
            Language::En => format!(
                "Congratulations! Your group/channel has been indexed.\n\nTitle: {}\nDescription: {}\nTags: {}\nIndexed at: {}",
                group.title, group.description, tags, indexed_at
            ),
            Language::Zh => format!(
                "恭喜! 你的群组/频道已录入.\n\n群组/频道名: {}\n简介: {}\n检索关键字: {}\n录入时间: {}",
                group.title, group.description, tags, indexed_at
            ),
        }
    }

    /// Inline keyboard with every [`Category`], two per row.
    pub fn category_keyboard(&self, lang: Language) -> Keyboard {
        let buttons: Vec<KeyboardButton> = Category::iter()
            .map(|c| KeyboardButton {
                label: c.label(lang).to_string(),
                data: c.to_string(),
            })
            .collect();
        Keyboard {
            rows: buttons.chunks(2).map(<[KeyboardButton]>::to_vec).collect(),
        }
    }

    /// Search reply listing each group with its link and member count.
    pub fn search_results(&self, lang: Language, query: &str, results: &[RankedGroup]) -> String {
        if results.is_empty() {
            return match lang {
                Language::En => format!("No groups found for \"{}\".", query.trim()),
                Language::Zh => format!("没有找到与 \"{}\" 相关的群组", query.trim()),
            };
        }

        let members = match lang {
            Language::En => "members",
            Language::Zh => "成员",
        };
        let mut text = match lang {
            Language::En => format!("Groups matching \"{}\":\n", query.trim()),
            Language::Zh => format!("与 \"{}\" 相关的群组:\n", query.trim()),
        };
        for (i, ranked) in results.iter().enumerate() {
            let group = &ranked.group;
            text.push_str(&format!(
                "\n{}. {}\n   https://t.me/{} · {} {}",
                i + 1,
                group.title,
                group.handle,
                format_member_count(group.member_count),
                members
            ));
        }
        text
    }
}

/// `999`, `1.2k`, `3.4m`.
pub fn format_member_count(count: u32) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}k", f64::from(count) / 1_000.0),
        _ => format!("{:.1}m", f64::from(count) / 1_000_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("en-US"), Some(Language::En));
        assert_eq!(Language::from_code("zh-hans"), Some(Language::Zh));
        assert_eq!(Language::from_code("ZH_TW"), Some(Language::Zh));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let catalog = TextCatalog::new(Language::Zh);
        assert_eq!(catalog.language_for(Some("de")), Language::Zh);
        assert_eq!(catalog.language_for(None), Language::Zh);
        assert_eq!(catalog.language_for(Some("en-GB")), Language::En);
    }

    #[test]
    fn member_counts() {
        assert_eq!(format_member_count(0), "0");
        assert_eq!(format_member_count(999), "999");
        assert_eq!(format_member_count(1000), "1.0k");
        assert_eq!(format_member_count(1520), "1.5k");
        assert_eq!(format_member_count(999_999), "1000.0k");
        assert_eq!(format_member_count(3_400_000), "3.4m");
    }

    #[test]
    fn category_keyboard_has_three_rows_of_two() {
        let keyboard = TextCatalog::new(Language::En).category_keyboard(Language::Zh);
        assert_eq!(keyboard.rows.len(), 3);
        assert!(keyboard.rows.iter().all(|row| row.len() == 2));
        assert_eq!(keyboard.rows[0][0].label, "💻 编程");
        assert_eq!(keyboard.rows[0][0].data, "Programming");
        assert_eq!(keyboard.rows[2][1].data, "Blockchain");
    }

    #[test]
    fn tag_prompt_lists_suggestions() {
        let catalog = TextCatalog::new(Language::En);
        let text = catalog.tag_prompt(Language::En, 3, &["rust".into(), "async".into()]);
        assert!(text.contains("up to 3"));
        assert!(text.ends_with("Suggested: rust async"));
        assert!(!catalog.tag_prompt(Language::En, 3, &[]).contains("Suggested"));
    }

    #[test]
    fn every_key_has_both_languages() {
        let catalog = TextCatalog::new(Language::En);
        for key in [
            TextKey::Help,
            TextKey::InputGroupLink,
            TextKey::HandleInvalid,
            TextKey::GroupNotFound,
            TextKey::CategoryChoosing,
            TextKey::CategoryInvalid,
            TextKey::TagsInvalid,
            TextKey::IndexFailed,
            TextKey::UnknownCommand,
            TextKey::Cancelled,
            TextKey::NothingToCancel,
            TextKey::SearchFailed,
            TextKey::Unavailable,
        ] {
            for lang in Language::iter() {
                assert!(!catalog.get(lang, key).is_empty());
            }
        }
    }
}
