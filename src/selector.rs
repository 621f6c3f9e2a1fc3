use crate::types::{ChangedFile, FileStatus};

/// Pick the changed files that are worth linting: anything not removed whose
/// path carries one of the configured Ruby extensions.
///
/// Extension-less scripts (a `bin/console` with a shebang, say) are excluded
/// on purpose; content sniffing is out of scope.
pub fn eligible_files<'a>(
    files: &'a [ChangedFile],
    extensions: &[String],
) -> Vec<&'a ChangedFile> {
    files
        .iter()
        .filter(|file| file.status != FileStatus::Removed)
        .filter(|file| extensions.iter().any(|ext| file.path.ends_with(ext.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;

    fn file(path: &str, status: FileStatus) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status,
            patch: None,
        }
    }

    fn ruby_extensions() -> Vec<String> {
        LintConfig::default().extensions
    }

    #[test]
    fn test_selects_ruby_files() {
        let files = vec![
            file("app/models/user.rb", FileStatus::Modified),
            file("lib/tasks/cleanup.rake", FileStatus::Added),
            file("mygem.gemspec", FileStatus::Modified),
        ];
        let selected = eligible_files(&files, &ruby_extensions());
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_excludes_removed_files() {
        let files = vec![
            file("app/old.rb", FileStatus::Removed),
            file("app/new.rb", FileStatus::Added),
        ];
        let selected = eligible_files(&files, &ruby_extensions());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path, "app/new.rb");
    }

    #[test]
    fn test_excludes_non_ruby_files() {
        let files = vec![
            file("README.md", FileStatus::Modified),
            file("package.json", FileStatus::Modified),
            file("Gemfile", FileStatus::Modified),
            file("bin/console", FileStatus::Modified),
        ];
        let selected = eligible_files(&files, &ruby_extensions());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_renamed_files_stay_eligible() {
        let files = vec![file("app/services/billing.rb", FileStatus::Renamed)];
        let selected = eligible_files(&files, &ruby_extensions());
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let selected = eligible_files(&[], &ruby_extensions());
        assert!(selected.is_empty());
    }
}
