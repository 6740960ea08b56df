use std::collections::HashMap;
use std::sync::{Arc, RwLock};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/signin_i18n_generated.rs"));
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("system") {
            Self::System
        } else {
            Self::Tag(value.to_string())
        }
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

/// Message lookup over the catalogs compiled from `locales/*.toml`.
///
/// Missing keys render as the key itself so gaps are visible in the UI.
#[derive(Clone)]
pub struct I18nManager {
    catalog: Arc<Catalog>,
    locale: Arc<RwLock<Locale>>,
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(Catalog::load()),
            locale: Arc::new(RwLock::new(Locale::System)),
        }
    }

    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        let manager = Self::new();
        manager.set_locale(locale);
        manager
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let locale = locale.into();
        tracing::debug!(?locale, "switching message locale");
        match self.locale.write() {
            Ok(mut guard) => *guard = locale,
            Err(poisoned) => *poisoned.into_inner() = locale,
        }
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        let requested = match self.locale() {
            Locale::System => sys_locale::get_locale(),
            Locale::Tag(tag) => Some(tag),
        };
        self.catalog.resolve(requested.as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    /// Like [`I18nManager::t`], replacing `{name}` placeholders from `params`.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.lookup(key).unwrap_or(key);
        if params.is_empty() {
            template.to_string()
        } else {
            fill_placeholders(template, params)
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let locale = self.resolved_locale();
        let found = self.catalog.lookup(locale, key);
        if found.is_none() {
            tracing::trace!(locale, key, "missing translation");
        }
        found.or_else(|| self.catalog.lookup(self.catalog.default_locale, key))
    }
}

struct Catalog {
    default_locale: &'static str,
    entries: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    by_tag: HashMap<String, &'static str>,
    by_language: HashMap<String, &'static str>,
}

impl Catalog {
    fn load() -> Self {
        let mut entries = HashMap::new();
        let mut by_tag = HashMap::new();
        let mut by_language: HashMap<String, Option<&'static str>> = HashMap::new();

        for (locale, messages) in generated::LOCALES.iter().copied() {
            let normalized = normalize_locale_tag(locale);
            by_language
                .entry(language_of(&normalized).to_string())
                .and_modify(|existing| {
                    // Two regional variants of one language: require the full tag.
                    if *existing != Some(locale) {
                        *existing = None;
                    }
                })
                .or_insert(Some(locale));
            by_tag.insert(normalized, locale);
            entries.insert(locale, messages.iter().copied().collect::<HashMap<_, _>>());
        }

        let default_locale = generated::DEFAULT_LOCALE;
        entries.entry(default_locale).or_default();
        by_tag
            .entry(normalize_locale_tag(default_locale))
            .or_insert(default_locale);

        Self {
            default_locale,
            entries,
            by_tag,
            by_language: by_language
                .into_iter()
                .filter_map(|(language, locale)| locale.map(|locale| (language, locale)))
                .collect(),
        }
    }

    fn resolve(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };
        let normalized = normalize_locale_tag(requested);
        self.by_tag
            .get(&normalized)
            .or_else(|| self.by_language.get(language_of(&normalized)))
            .copied()
            .unwrap_or(self.default_locale)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&'static str> {
        self.entries
            .get(locale)
            .and_then(|messages| messages.get(key).copied())
    }
}

fn language_of(normalized: &str) -> &str {
    normalized.split('-').next().unwrap_or_default()
}

/// `zh_CN.UTF-8` and `ZH-cn` both become `zh-cn`.
fn normalize_locale_tag(tag: &str) -> String {
    let tag = tag.trim();
    let tag = tag.split(['.', '@']).next().unwrap_or(tag);
    tag.split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn fill_placeholders(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };
        let name = &after_open[..close];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::{I18nManager, Locale, fill_placeholders, normalize_locale_tag};
    use crate::sign_in::SignInMessages;

    #[test]
    fn default_locale_matches_built_in_messages() {
        let i18n = I18nManager::with_locale("en-US");
        assert_eq!(i18n.resolved_locale(), "en-US");
        assert_eq!(SignInMessages::localized(&i18n), SignInMessages::default());
    }

    #[test]
    fn supports_locale_tag_normalization() {
        let i18n = I18nManager::with_locale("zh_CN.UTF-8");
        assert_eq!(i18n.resolved_locale(), "zh-CN");
        assert_eq!(i18n.t("sign_in.submit.label"), "登录");
    }

    #[test]
    fn language_only_tag_falls_back_to_regional_catalog() {
        let i18n = I18nManager::with_locale("de");
        assert_eq!(i18n.resolved_locale(), "de-DE");
        assert_eq!(
            SignInMessages::localized(&i18n).password_too_short,
            "Das Passwort muss mindestens 6 Zeichen lang sein"
        );
    }

    #[test]
    fn unknown_locale_uses_default() {
        let i18n = I18nManager::with_locale("xx-YY");
        assert_eq!(i18n.resolved_locale(), i18n.default_locale());
    }

    #[test]
    fn missing_translation_shows_key() {
        let i18n = I18nManager::with_locale("de-DE");
        assert!(!i18n.has_key("sign_in.unknown"));
        assert_eq!(i18n.t("sign_in.unknown"), "sign_in.unknown");
    }

    #[test]
    fn system_keyword_selects_system_locale() {
        assert_eq!(Locale::from(" System "), Locale::System);
        assert_eq!(Locale::from("fr-FR"), Locale::Tag("fr-FR".into()));
    }

    #[test]
    fn placeholders_are_filled_and_unknown_ones_kept() {
        assert_eq!(
            fill_placeholders("at least {min} of {max}", &[("min", "6")]),
            "at least 6 of {max}"
        );
        assert_eq!(fill_placeholders("open {brace", &[("brace", "x")]), "open {brace");
        assert_eq!(normalize_locale_tag("en_US@euro"), "en-us");
    }
}
