use crate::catalog::Catalog;
use crate::error::{Result, VavilonError};
use crate::locale::LocaleTag;

/// Maps a requested locale onto a catalog key: the exact tag first, then its
/// two-character language subtag.
pub fn resolve(catalog: &Catalog, requested: &str) -> Result<LocaleTag> {
    let tag = LocaleTag::new(requested);
    if catalog.contains(tag.as_str()) {
        return Ok(tag);
    }

    let language = tag.language();
    if !language.is_empty() && catalog.contains(language.as_str()) {
        return Ok(language);
    }

    Err(VavilonError::NoDictionaryFor(tag.to_string()))
}
