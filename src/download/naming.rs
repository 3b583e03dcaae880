//! Target paths of downloaded pages.

use super::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::illust::Illust;

use reqwest::Url;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Decoded file name at the end of an image URL.
pub fn original_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", url, e)))?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(|name| {
            form_urlencoded::parse(name.as_bytes())
                .map(|(key, val)| [key, val].concat())
                .collect()
        })
        .ok_or_else(|| Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url)))
}

/// Splits `name` into root and extension, the extension keeping its dot.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Path of page `page` of `illust`, located at `url`.
///
/// `order` is the illust's 1-based position in its listing.
pub fn page_path(
    config: &DownloadConfig,
    illust: &Illust,
    order: usize,
    page: usize,
    url: &str,
) -> Result<PathBuf> {
    let mut original = original_name(url)?;
    let (root, mut ext) = {
        let (root, ext) = split_extension(&original);
        (root.to_string(), ext.to_string())
    };

    if config.convert_ugoira && ext == ".zip" {
        ext = ".gif".to_string();
        original = format!("{}{}", root, ext);
    }

    let filename = match config.name.as_deref() {
        Some(template) if !template.is_empty() => {
            let mut values = BTreeMap::new();
            values.insert("id".to_string(), illust.id.to_string());
            values.insert("title".to_string(), illust.title.clone());
            values.insert("user_id".to_string(), illust.user_id.to_string());
            values.insert("user_name".to_string(), illust.user_name.clone());
            values.insert("user_account".to_string(), illust.user_account.clone());
            values.insert("page".to_string(), page.to_string());
            values.insert("original_name".to_string(), original);
            values.insert("root".to_string(), root);
            values.insert("ext".to_string(), ext);
            match &config.addition_naming_info {
                Some(extra) => values.extend(extra.clone()),
                None => {
                    values.insert("order".to_string(), order.to_string());
                }
            }
            render(template, &values)?
        }
        _ => original,
    };

    Ok(config.directory.join(filename))
}

/// Replaces `{key}` placeholders with `values[key]`.
///
/// `{{` and `}}` produce literal braces. A leading `illust.` in a key is
/// ignored.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => key.push(c),
                        None => {
                            return Err(Error::Template(format!(
                                "unclosed placeholder in \"{}\"",
                                template
                            )))
                        }
                    }
                }
                let lookup = key.strip_prefix("illust.").unwrap_or(&key);
                let value = values
                    .get(lookup)
                    .ok_or_else(|| Error::Template(format!("unknown placeholder {{{}}}", key)))?;
                out.push_str(value);
            }
            '}' => {
                return Err(Error::Template(format!(
                    "single '}}' in \"{}\"",
                    template
                )))
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
