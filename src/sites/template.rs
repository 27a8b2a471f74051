//! Search URL templates
//!
//! Templates are plain strings with `{name}` placeholders. The placeholder
//! vocabulary covers every paging scheme the supported sites use, so a new
//! site is a new template string and never new code.

use crate::sites::TimeFilter;

/// Placeholders understood by [`UrlTemplate::render`]
///
/// | Placeholder | Value |
/// |---|---|
/// | `{keyword}` | keyword joined with the site's joiner |
/// | `{page}` | current page number |
/// | `{prev_page}` | page - 1 |
/// | `{offset}` | (page - 1) * 10 |
/// | `{next_offset}` | page * 10 |
/// | `{begin}` | time filter begin as `YYYYMMDD`, or empty |
/// | `{end}` | time filter end as `YYYYMMDD`, or empty |
pub const PLACEHOLDERS: &[&str] = &[
    "keyword",
    "page",
    "prev_page",
    "offset",
    "next_offset",
    "begin",
    "end",
];

const RESULTS_PER_PAGE: u64 = 10;

/// A search URL with `{placeholder}` slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names of all `{...}` slots in the template, in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    names.push(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        names
    }

    /// Slots that [`render`](Self::render) would leave untouched
    pub fn unknown_placeholders(&self) -> Vec<&str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !PLACEHOLDERS.contains(name))
            .collect()
    }

    /// Fills every known placeholder
    ///
    /// `encoded_keyword` must already be joined with the site's joiner.
    pub fn render(&self, page: u32, encoded_keyword: &str, filter: &TimeFilter) -> String {
        let mut out = String::with_capacity(self.0.len() + encoded_keyword.len());
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let name = &after[..end];
            match slot_value(name, page, encoded_keyword, filter) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

fn slot_value(name: &str, page: u32, keyword: &str, filter: &TimeFilter) -> Option<String> {
    let value = match name {
        "keyword" => keyword.to_string(),
        "page" => page.to_string(),
        "prev_page" => page.saturating_sub(1).to_string(),
        "offset" => (u64::from(page.saturating_sub(1)) * RESULTS_PER_PAGE).to_string(),
        "next_offset" => (u64::from(page) * RESULTS_PER_PAGE).to_string(),
        "begin" => filter.begin_param(),
        "end" => filter.end_param(),
        _ => return None,
    };
    Some(value)
}
