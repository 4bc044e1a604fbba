//! Light normalization of Obsidian-flavored Markdown.
//!
//! Three markers are handled, nothing else is parsed:
//! - wiki-links `[[Target]]`, `[[Target|Alias]]`, `![[Embed]]` become their display text
//! - tags `#tag` are removed
//! - block references `^id` at the end of a line are removed
//!
//! Every removed or flattened marker is reported in [`MarkdownMeta`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

static WIKI_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap());
// Tags start a line or follow whitespace; `# Heading` has a space so never matches.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^|[ \t])#([\p{L}\p{N}_/-]+)").unwrap());
static BLOCK_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mR)(?:^|[ \t]+)\^([A-Za-z0-9-]+)[ \t]*$").unwrap());

/// Structural markers found in a note, in first-seen order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkdownMeta {
    pub links: Vec<String>,
    pub tags: Vec<String>,
    pub block_refs: Vec<String>,
}

impl MarkdownMeta {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.tags.is_empty() && self.block_refs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub meta: MarkdownMeta,
}

/// Strip tags and block references, flatten wiki-links.
pub fn normalize(text: &str) -> Normalized {
    let mut meta = MarkdownMeta::default();

    // Block refs and tags go first so `[[Note#^id]]` / `[[#Heading]]` are
    // untouched until the link itself is flattened.
    let text = BLOCK_REF_RE.replace_all(text, |caps: &Captures| {
        push_unique(&mut meta.block_refs, &caps[1]);
        String::new()
    });

    let text = TAG_RE.replace_all(&text, |caps: &Captures| {
        let tag = &caps[2];
        if tag.chars().all(|c| c.is_ascii_digit()) {
            // `#123` is an issue number, not a tag.
            return caps[0].to_string();
        }
        push_unique(&mut meta.tags, tag);
        caps[1].to_string()
    });

    let text = WIKI_LINK_RE.replace_all(&text, |caps: &Captures| {
        let target = caps[1].trim();
        push_unique(&mut meta.links, target);
        match caps.get(2) {
            Some(alias) => alias.as_str().trim().to_string(),
            None => target.to_string(),
        }
    });

    Normalized {
        text: text.into_owned(),
        meta,
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_markers() {
        let input = "Met with [[Note A]] about #project today.\nShipped the draft. ^block1\nDone.";
        let result = normalize(input);

        assert_eq!(
            result.text,
            "Met with Note A about  today.\nShipped the draft.\nDone."
        );
        assert_eq!(result.meta.links, vec!["Note A"]);
        assert_eq!(result.meta.tags, vec!["project"]);
        assert_eq!(result.meta.block_refs, vec!["block1"]);
    }

    #[test]
    fn test_prose_is_preserved() {
        let input = "Alpha [[Note A]] beta #project gamma\ndelta epsilon ^block1\n";
        let result = normalize(input);
        for word in ["Alpha", "Note A", "beta", "gamma", "delta", "epsilon"] {
            assert!(result.text.contains(word), "lost {:?}", word);
        }
        assert!(!result.text.contains("[["));
        assert!(!result.text.contains('#'));
        assert!(!result.text.contains('^'));
    }

    #[test]
    fn test_alias_and_embed() {
        let result = normalize("See [[Projects/Roadmap|the roadmap]] and ![[diagram.png]].");
        assert_eq!(result.text, "See the roadmap and diagram.png.");
        assert_eq!(result.meta.links, vec!["Projects/Roadmap", "diagram.png"]);
    }

    #[test]
    fn test_headings_and_issue_numbers_untouched() {
        let input = "# Weekly review\n## Done\nFixed #42 and tagged #work/review";
        let result = normalize(input);
        assert_eq!(result.text, "# Weekly review\n## Done\nFixed #42 and tagged ");
        assert_eq!(result.meta.tags, vec!["work/review"]);
    }

    #[test]
    fn test_non_ascii_tags() {
        let result = normalize("今日のメモ #日記 です");
        assert_eq!(result.text, "今日のメモ  です");
        assert_eq!(result.meta.tags, vec!["日記"]);
    }

    #[test]
    fn test_inline_caret_and_url_fragments_kept() {
        let input = "x^2 grows fast, see https://example.com/#section";
        let result = normalize(input);
        assert_eq!(result.text, input);
        assert!(result.meta.is_empty());
    }

    #[test]
    fn test_block_ref_link_survives_until_flattened() {
        let result = normalize("Quote from [[Meeting#^abc123]]");
        assert_eq!(result.text, "Quote from Meeting#^abc123");
        assert!(result.meta.block_refs.is_empty());
        assert_eq!(result.meta.links, vec!["Meeting#^abc123"]);
    }

    #[test]
    fn test_crlf_block_ref() {
        let result = normalize("line one ^ref-1\r\nline two");
        assert_eq!(result.text, "line one\r\nline two");
        assert_eq!(result.meta.block_refs, vec!["ref-1"]);
    }

    #[test]
    fn test_duplicates_reported_once() {
        let result = normalize("#a [[X]] #a [[X]]");
        assert_eq!(result.meta.tags, vec!["a"]);
        assert_eq!(result.meta.links, vec!["X"]);
    }
}
