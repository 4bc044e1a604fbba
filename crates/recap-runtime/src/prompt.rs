//! Prompt assembly.

use std::fmt::Write;

use recap_ingest::ExtractedDocument;

use crate::types::SkipCounts;

/// Returned in place of an analysis when the window holds no files.
pub const NO_FILES_MESSAGE: &str = "No files were modified in the selected period.";

/// Returned in place of an analysis when files were found but none could be read.
pub fn all_skipped_message(file_count: usize, skipped: &SkipCounts) -> String {
    format!(
        "None of the {} recent files could be read ({} undecodable, {} too large); no analysis was requested.",
        file_count, skipped.unreadable, skipped.too_large
    )
}

const INSTRUCTIONS: &str = "\
Please analyze these files and summarize:
1. What kinds of files were updated
2. The main trends in the changes
3. How the development or project work is progressing
4. Changes worth paying attention to
5. For Obsidian Markdown notes (.md), the characteristics of their content and structure";

/// Render one labeled section per document, then the analysis instructions.
pub fn build_prompt(documents: &[ExtractedDocument], language: &str) -> String {
    let mut prompt = String::from(
        "The following files were recently modified.\n\
         Analyze their changes and characteristics and summarize them concisely.\n\n\
         Files and contents:\n",
    );

    for doc in documents {
        // Writing to a String cannot fail.
        let _ = writeln!(prompt, "\nFile: {}", doc.path.display());
        let _ = writeln!(prompt, "Modified: {}", doc.modified_at.to_rfc3339());
        let _ = writeln!(prompt, "Encoding: {}", doc.encoding_used);
        if let Some(meta) = doc.markdown.as_ref().filter(|m| !m.is_empty()) {
            if !meta.tags.is_empty() {
                let _ = writeln!(prompt, "Tags: {}", meta.tags.join(", "));
            }
            if !meta.links.is_empty() {
                let _ = writeln!(prompt, "Links: {}", meta.links.join(", "));
            }
        }
        let _ = writeln!(prompt, "Content:\n{}", doc.text);
        if doc.truncated {
            prompt.push_str("[... truncated]\n");
        }
    }

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    let _ = write!(prompt, "\n\nRespond in {}.\n", language);
    prompt
}
