//! Inline keyboard model and the welcome keyboard.

use std::str::FromStr;

use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::i18n;

/// Opaque callback identifiers carried by keyboard buttons. The wire form is
/// the snake_case variant name ("pref_leagues", "pref_less", "pref_stop").
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CallbackAction {
    PrefLeagues,
    PrefLess,
    PrefStop,
}

/// One inline keyboard button.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    fn new(text: String, action: CallbackAction) -> Self {
        InlineButton {
            text,
            callback_data: action.to_string(),
        }
    }
}

/// Ordered button rows, serialized as the `inline_keyboard` payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

/// The three-row preferences keyboard sent with the welcome message.
pub fn welcome_keyboard(lang: &LanguageIdentifier) -> InlineKeyboard {
    InlineKeyboard {
        rows: vec![
            vec![InlineButton::new(i18n::t(lang, "btn_leagues"), CallbackAction::PrefLeagues)],
            vec![InlineButton::new(i18n::t(lang, "btn_less"), CallbackAction::PrefLess)],
            vec![InlineButton::new(i18n::t(lang, "btn_stop"), CallbackAction::PrefStop)],
        ],
    }
}

/// Parses inbound callback data; `None` for anything outside the fixed set.
pub fn parse_callback_data(data: &str) -> Option<CallbackAction> {
    CallbackAction::from_str(data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_actions_use_snake_case_wire_form() {
        assert_eq!(CallbackAction::PrefLeagues.to_string(), "pref_leagues");
        assert_eq!(CallbackAction::PrefLess.to_string(), "pref_less");
        assert_eq!(CallbackAction::PrefStop.to_string(), "pref_stop");

        assert_eq!(parse_callback_data("pref_stop"), Some(CallbackAction::PrefStop));
        assert_eq!(parse_callback_data("pref_everything"), None);
        assert_eq!(parse_callback_data(""), None);
    }

    #[test]
    fn welcome_keyboard_has_three_single_button_rows() {
        let kb = welcome_keyboard(&i18n::lang_from_locale("vi"));

        assert_eq!(kb.rows.len(), 3);
        for row in &kb.rows {
            assert_eq!(row.len(), 1);
        }
        let data: Vec<&str> = kb.rows.iter().map(|row| row[0].callback_data.as_str()).collect();
        assert_eq!(data, vec!["pref_leagues", "pref_less", "pref_stop"]);
    }

    #[test]
    fn keyboard_labels_follow_the_locale() {
        let vi = welcome_keyboard(&i18n::lang_from_locale("vi"));
        let zh = welcome_keyboard(&i18n::lang_from_locale("zh"));

        assert_eq!(vi.rows[0][0].text, "Chọn giải đấu");
        assert_eq!(zh.rows[0][0].text, "选择联赛");
    }

    #[test]
    fn keyboard_serializes_as_nested_rows() {
        let kb = welcome_keyboard(&i18n::lang_from_locale("zh"));
        let value = serde_json::to_value(&kb).unwrap();

        assert!(value.is_array());
        assert_eq!(value[0][0]["callback_data"], "pref_leagues");
        assert_eq!(value[2][0]["text"], "退订 /stop");
    }
}
