//! Line-oriented parser for llms.txt index documents.
//!
//! The format is a constrained subset of markdown: an optional `#` title,
//! an optional blockquote description, `##` section headings, and link
//! entries written either as list bullets or as bare links alone on a
//! line. Parsing is total; malformed lines are skipped rather than
//! reported, so arbitrary markdown never causes an error.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::types::{IndexDocument, IndexEntry};

/// Bulleted link entry: `- [label](url)` or `* [label](url)`, with an
/// optional `: description` tail.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BULLET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s+\[([^\]]*)\]\(([^()\s]+)\)\s*(?::\s*(.*))?$").unwrap()
});

/// Bare link occupying an entire line: `[label](url)`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]\(([^()\s]+)\)$").unwrap());

/// Parses llms.txt text into a structured [`IndexDocument`].
///
/// The first `# ` heading becomes the title and the first blockquote block
/// becomes the description; `## ` headings set the section label that is
/// prepended to subsequent entry titles as `Section - Label`.
///
/// ```
/// use erudita_core::parser::parse_index;
///
/// let text = "# React\n\n> UI library.\n\n## Guides\n- [Quick Start](/learn): Start here.\n";
/// let doc = parse_index(text);
/// assert_eq!(doc.title, "React");
/// assert_eq!(doc.description.as_deref(), Some("UI library."));
/// assert_eq!(doc.entries[0].title, "Guides - Quick Start");
/// assert_eq!(doc.entries[0].url, "/learn");
/// ```
#[must_use]
pub fn parse_index(text: &str) -> IndexDocument {
    let mut title = String::new();
    let mut description_lines: Vec<String> = Vec::new();
    let mut description_closed = false;
    let mut section: Option<String> = None;
    let mut entries = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();

        if let Some(rest) = line.strip_prefix("# ") {
            // First H1 wins; later ones are ignored.
            if title.is_empty() {
                title = rest.trim().to_string();
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("## ") {
            section = Some(rest.trim().to_string());
            continue;
        }

        if let Some(rest) = line.strip_prefix('>') {
            // Only the first blockquote block contributes; once a blank
            // line closes it, further quoted lines are ignored.
            if !description_closed {
                let piece = rest.trim();
                if !piece.is_empty() {
                    description_lines.push(piece.to_string());
                }
            }
            continue;
        }

        if line.trim().is_empty() {
            if !description_lines.is_empty() {
                description_closed = true;
            }
            continue;
        }

        if let Some(caps) = BULLET_LINK.captures(line) {
            entries.push(entry_from_captures(&caps, section.as_deref()));
            continue;
        }

        if let Some(caps) = BARE_LINK.captures(line.trim()) {
            entries.push(entry_from_captures(&caps, section.as_deref()));
        }
        // Anything else is prose or unsupported markup.
    }

    IndexDocument {
        title,
        description: (!description_lines.is_empty()).then(|| description_lines.join(" ")),
        entries,
    }
}

fn entry_from_captures(caps: &regex::Captures<'_>, section: Option<&str>) -> IndexEntry {
    let label = caps.get(1).map_or("", |m| m.as_str()).trim();
    let url = caps.get(2).map_or("", |m| m.as_str()).to_string();
    let description = caps
        .get(3)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    let title = match section {
        Some(section) if !section.is_empty() => format!("{section} - {label}"),
        _ => label.to_string(),
    };

    IndexEntry {
        title,
        url,
        description,
    }
}

/// Keeps only entries whose resolved URL stays on the index host under the
/// given path prefix.
///
/// Used after a root-domain fallback: an index found at the host root may
/// list documentation for the whole site, while the caller only asked for
/// the subtree at `prefix`. Matching is segment-exact, so `/docs/section`
/// does not match `/docs/section-extra`. Entries that fail to resolve
/// against the index URL are dropped.
#[must_use]
pub fn filter_by_prefix(
    entries: Vec<IndexEntry>,
    index_url: &Url,
    prefix: &str,
) -> Vec<IndexEntry> {
    let prefix = prefix.trim_end_matches('/');
    entries
        .into_iter()
        .filter(|entry| entry_matches_prefix(entry, index_url, prefix))
        .collect()
}

fn entry_matches_prefix(entry: &IndexEntry, index_url: &Url, prefix: &str) -> bool {
    let Ok(resolved) = index_url.join(&entry.url) else {
        return false;
    };
    if resolved.host_str() != index_url.host_str()
        || resolved.port_or_known_default() != index_url.port_or_known_default()
    {
        return false;
    }
    let path = resolved.path();
    path == prefix || path.starts_with(&format!("{prefix}/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn first_h1_wins() {
        let doc = parse_index("# First\n# Second\n");
        assert_eq!(doc.title, "First");
    }

    #[test]
    fn tolerates_missing_title() {
        let doc = parse_index("- [Guide](/guide)\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.entries.len(), 1);
        assert!(!doc.is_empty());
    }

    #[test]
    fn description_joins_consecutive_quote_lines() {
        let doc = parse_index("# T\n> First line\n> second line.\n");
        assert_eq!(doc.description.as_deref(), Some("First line second line."));
    }

    #[test]
    fn only_first_blockquote_counts() {
        let doc = parse_index("# T\n> Real description.\n\n> Stray quote later.\n");
        assert_eq!(doc.description.as_deref(), Some("Real description."));
    }

    #[test]
    fn sections_replace_each_other() {
        let text = "\
# Docs
- [Root](/root)

## Guides
- [Intro](/intro)

## API
- [Hooks](/hooks)
### Subsection is ignored
- [Still API](/still-api)
";
        let doc = parse_index(text);
        let titles: Vec<&str> = doc.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Root", "Guides - Intro", "API - Hooks", "API - Still API"]
        );
    }

    #[test]
    fn sectioned_entry_carries_url_and_description() {
        let doc = parse_index("# Docs\n## Guide\n- [Start](./s.md): begin here\n");
        let entry = &doc.entries[0];
        assert_eq!(entry.title, "Guide - Start");
        assert_eq!(entry.url, "./s.md");
        assert_eq!(entry.description.as_deref(), Some("begin here"));
    }

    #[test]
    fn bullet_variants_and_descriptions() {
        let text = "\
- [Plain](/plain)
* [Star](/star): Star entry.
- [Spaced](/spaced) : padded description
- [Empty desc](/empty):
";
        let doc = parse_index(text);
        assert_eq!(doc.entries.len(), 4);
        assert_eq!(doc.entries[0].description, None);
        assert_eq!(doc.entries[1].description.as_deref(), Some("Star entry."));
        assert_eq!(
            doc.entries[2].description.as_deref(),
            Some("padded description")
        );
        assert_eq!(doc.entries[3].description, None);
    }

    #[test]
    fn bare_link_must_be_alone_on_its_line() {
        let text = "\
[Standalone](/standalone)
see [inline](/inline) for details
";
        let doc = parse_index(text);
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].url, "/standalone");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "\
- not a link
- [unclosed](/oops
random prose
-[no space](/x)
";
        let doc = parse_index(text);
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn arbitrary_markdown_yields_empty_document() {
        let doc = parse_index("just some prose\n\n```rust\nfn main() {}\n```\n");
        assert!(doc.is_empty());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let doc = parse_index("# Title\r\n> Desc.\r\n\r\n- [A](/a)\r\n");
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.description.as_deref(), Some("Desc."));
        assert_eq!(doc.entries.len(), 1);
    }

    #[test]
    fn entries_preserve_document_order() {
        let text = "- [B](/b)\n- [A](/a)\n- [C](/c)\n";
        let doc = parse_index(text);
        let urls: Vec<&str> = doc.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["/b", "/a", "/c"]);
    }

    fn entry(url: &str) -> IndexEntry {
        IndexEntry {
            title: "T".to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[test]
    fn prefix_filter_is_segment_exact() {
        let index_url = Url::parse("https://example.com/llms.txt").unwrap();
        let entries = vec![
            entry("/docs/section/intro.md"),
            entry("/docs/section"),
            entry("/docs/section-extra/other.md"),
            entry("/elsewhere/page.md"),
        ];
        let kept = filter_by_prefix(entries, &index_url, "/docs/section");
        let urls: Vec<&str> = kept.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["/docs/section/intro.md", "/docs/section"]);
    }

    #[test]
    fn prefix_filter_drops_foreign_hosts() {
        let index_url = Url::parse("https://example.com/llms.txt").unwrap();
        let entries = vec![
            entry("https://example.com/docs/a.md"),
            entry("https://other.test/docs/b.md"),
            entry("docs/c.md"),
        ];
        let kept = filter_by_prefix(entries, &index_url, "/docs");
        let urls: Vec<&str> = kept.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/docs/a.md", "docs/c.md"]);
    }

    #[test]
    fn prefix_filter_drops_unresolvable_urls() {
        let index_url = Url::parse("https://example.com/llms.txt").unwrap();
        let kept = filter_by_prefix(vec![entry("https://")], &index_url, "/docs");
        assert!(kept.is_empty());
    }
}
