//! Prompt construction for the repair and summary requests.
//!
//! Plain string composition; identical inputs must produce byte-identical
//! prompts.

use crate::types::Offense;

/// Character budget applied to each code snippet in the summary prompt.
pub const SUMMARY_SNIPPET_MAX_CHARS: usize = 4000;

pub fn build_fix_prompt(content: &str, offenses: &[Offense], diff: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an expert Ruby developer. Fix the RuboCop offenses listed below.\n\n");
    prompt.push_str("Rules:\n");
    prompt.push_str("- Only change lines that appear as added (+) lines in the diff context.\n");
    prompt.push_str("- Do not reformat or restructure code that no offense points at.\n");
    prompt.push_str("- Preserve the behaviour of the code exactly.\n");
    prompt.push_str("- Return the complete corrected file in a single ```ruby code block.\n\n");
    prompt.push_str("Offenses to fix:\n");
    prompt.push_str(&format_offenses(offenses));
    if let Some(diff) = diff {
        prompt.push_str("\nDiff context (the change under review):\n```diff\n");
        prompt.push_str(diff);
        prompt.push_str("\n```\n");
    }
    prompt.push_str("\nOriginal code:\n```ruby\n");
    prompt.push_str(content);
    prompt.push_str("\n```\n");
    prompt
}

pub fn build_summary_prompt(original: &str, fixed: &str, offenses: &[Offense]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "A linting bot has already repaired the Ruby file below. Write a short, \
         plain-English summary (2-3 sentences) of what changed between the original \
         and the fixed version, for a pull request description. Do not include code.\n\n",
    );
    prompt.push_str("Offenses that were addressed:\n");
    prompt.push_str(&format_offenses(offenses));
    prompt.push_str("\nOriginal:\n```ruby\n");
    prompt.push_str(&truncate_chars(original, SUMMARY_SNIPPET_MAX_CHARS));
    prompt.push_str("\n```\n\nFixed:\n```ruby\n");
    prompt.push_str(&truncate_chars(fixed, SUMMARY_SNIPPET_MAX_CHARS));
    prompt.push_str("\n```\n");
    prompt
}

fn format_offenses(offenses: &[Offense]) -> String {
    let mut out = String::new();
    for offense in offenses {
        let line = offense
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        out.push_str(&format!(
            "- line {} [{}]: {}\n",
            line, offense.rule_id, offense.message
        ));
    }
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offense(line: Option<u64>, rule: &str, message: &str) -> Offense {
        Offense {
            line,
            message: message.to_string(),
            rule_id: rule.to_string(),
        }
    }

    #[test]
    fn test_fix_prompt_is_deterministic() {
        let offenses = vec![offense(Some(3), "Layout/LineLength", "Line is too long.")];
        let diff = Some("@@ -1,2 +1,2 @@\n-a\n+b");
        let first = build_fix_prompt("def x; end", &offenses, diff);
        let second = build_fix_prompt("def x; end", &offenses, diff);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fix_prompt_sections() {
        let offenses = vec![offense(Some(3), "Layout/LineLength", "Line is too long.")];
        let prompt = build_fix_prompt("puts 'hi'", &offenses, Some("+puts 'hi'"));
        assert!(prompt.contains("Offenses to fix:"));
        assert!(prompt.contains("- line 3 [Layout/LineLength]: Line is too long."));
        assert!(prompt.contains("```diff\n+puts 'hi'\n```"));
        assert!(prompt.contains("Original code:\n```ruby\nputs 'hi'\n```"));
    }

    #[test]
    fn test_fix_prompt_without_diff() {
        let offenses = vec![offense(Some(1), "Style/FrozenStringLiteralComment", "Missing magic comment.")];
        let prompt = build_fix_prompt("puts 1", &offenses, None);
        assert!(!prompt.contains("Diff context"));
        assert!(prompt.contains("Original code:"));
    }

    #[test]
    fn test_missing_line_renders_as_unknown() {
        let offenses = vec![offense(None, "Lint/Syntax", "unexpected token")];
        let prompt = build_fix_prompt("x", &offenses, None);
        assert!(prompt.contains("- line unknown [Lint/Syntax]: unexpected token"));
    }

    #[test]
    fn test_summary_prompt_truncates_snippets() {
        let long = "a".repeat(SUMMARY_SNIPPET_MAX_CHARS + 500);
        let prompt = build_summary_prompt(&long, &long, &[]);
        // Two truncated snippets plus instructions: well under 2x the raw inputs.
        assert!(prompt.len() < 2 * SUMMARY_SNIPPET_MAX_CHARS + 1000);
    }

    #[test]
    fn test_summary_prompt_truncation_respects_char_boundaries() {
        let multibyte = "日".repeat(SUMMARY_SNIPPET_MAX_CHARS + 10);
        // Must not panic on non-ASCII boundaries.
        let prompt = build_summary_prompt(&multibyte, "fixed", &[]);
        assert!(prompt.contains("fixed"));
    }

    #[test]
    fn test_summary_prompt_is_deterministic() {
        let offenses = vec![offense(Some(2), "Style/StringLiterals", "Prefer single quotes.")];
        let first = build_summary_prompt("a = \"x\"", "a = 'x'", &offenses);
        let second = build_summary_prompt("a = \"x\"", "a = 'x'", &offenses);
        assert_eq!(first, second);
    }
}
