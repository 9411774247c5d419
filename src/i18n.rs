//! Locale-keyed message templates.
//!
//! Two packs: Vietnamese (primary) and Chinese (secondary). A locale tag that
//! starts with the primary prefix resolves to the Vietnamese pack, everything
//! else falls back to Chinese. Unknown keys render as the key itself — a
//! deliberate safe fallback so a missing template never breaks a reply.

use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "vi",
    };
}

/// Locale tags starting with this prefix use the primary (Vietnamese) pack.
pub const PRIMARY_LANG_PREFIX: &str = "vi";

static VI: Lazy<LanguageIdentifier> = Lazy::new(|| "vi".parse().unwrap());
static ZH: Lazy<LanguageIdentifier> = Lazy::new(|| "zh".parse().unwrap());

/// Maps a raw locale tag ("vi", "vi_VN", "zh-hans", "en", …) to a template pack.
pub fn lang_from_locale(locale: &str) -> LanguageIdentifier {
    if locale.starts_with(PRIMARY_LANG_PREFIX) {
        VI.clone()
    } else {
        ZH.clone()
    }
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&VI, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&VI, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_prefix_selects_vietnamese_pack() {
        assert_eq!(lang_from_locale("vi"), *VI);
        assert_eq!(lang_from_locale("vi_VN"), *VI);
        assert_eq!(lang_from_locale("vi-VN"), *VI);
    }

    #[test]
    fn everything_else_falls_back_to_chinese_pack() {
        assert_eq!(lang_from_locale("zh"), *ZH);
        assert_eq!(lang_from_locale("zh-hans"), *ZH);
        assert_eq!(lang_from_locale("en"), *ZH);
        assert_eq!(lang_from_locale(""), *ZH);
    }

    #[test]
    fn loads_known_translation_per_pack() {
        assert_eq!(t(&VI, "set_low"), "Đã chuyển sang tần suất thấp.");
        assert_eq!(t(&ZH, "set_low"), "已设置为低频推送。");
    }

    #[test]
    fn unknown_key_renders_as_itself() {
        assert_eq!(t(&VI, "no_such_template"), "no_such_template");
        assert_eq!(t(&ZH, "no_such_template"), "no_such_template");
    }

    #[test]
    fn welcome_converts_newlines() {
        let text = t(&VI, "welcome");
        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
    }

    #[test]
    fn leagues_echo_interpolates_the_reply() {
        let mut args = FluentArgs::new();
        args.set("leagues", FluentValue::from("V.League, EPL"));

        let text = t_args(&ZH, "leagues_saved", &args);
        assert!(text.contains("V.League, EPL"));
    }
}
