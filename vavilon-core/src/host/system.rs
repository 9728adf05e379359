use super::LanguageSettings;

/// Language settings of the operating system, via `sys-locale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLanguages;

impl LanguageSettings for SystemLanguages {
    fn languages(&self) -> Vec<String> {
        sys_locale::get_locales()
            .filter_map(|raw| posix_to_tag(&raw))
            .collect()
    }
}

/// `en_US.UTF-8` -> `en-US`; `C` and `POSIX` carry no language.
fn posix_to_tag(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or(raw).trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
