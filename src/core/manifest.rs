use crate::domain::model::PackageName;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

/// Characters that start a version constraint in a requirement line.
const CONSTRAINT_OPERATORS: [char; 5] = ['=', '<', '>', '~', '!'];

/// Package name from one requirement line, or `None` for blanks and comments.
pub fn parse_requirement_line(line: &str) -> Option<PackageName> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let name = line
        .split(|c: char| CONSTRAINT_OPERATORS.contains(&c))
        .next()
        .unwrap_or_default();
    PackageName::new(name)
}

/// Package names in file order. Duplicates are kept.
pub fn parse_manifest(content: &str) -> Vec<PackageName> {
    content.lines().filter_map(parse_requirement_line).collect()
}

pub async fn read_manifest<S: Storage>(storage: &S, path: &str) -> Result<Vec<PackageName>> {
    let data = storage.read_file(path).await?;
    let content = String::from_utf8(data).map_err(|e| EtlError::ProcessingError {
        message: format!("Manifest '{}' is not valid UTF-8: {}", path, e),
    })?;

    let packages = parse_manifest(&content);
    tracing::debug!("Parsed {} package names from {}", packages.len(), path);
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(content: &str) -> Vec<String> {
        parse_manifest(content)
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        assert_eq!(
            names("requests==2.31.0\n# comment\n\nnumpy>=1.20\n"),
            vec!["requests", "numpy"]
        );
    }

    #[test]
    fn test_constraint_operators_are_stripped() {
        assert_eq!(
            names("a==1\nb<2\nc>3\nd~=4\ne!=5\nf <= 6\n  g  \n"),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
    }

    #[test]
    fn test_split_happens_at_first_operator() {
        let name = parse_requirement_line("pandas>=1.5,<3.0,!=2.0.1").unwrap();
        assert_eq!(name.as_str(), "pandas");
    }

    #[test]
    fn test_indented_comment_is_skipped() {
        assert!(parse_requirement_line("    # pinned for py3.8").is_none());
    }

    #[test]
    fn test_line_with_only_constraint_is_skipped() {
        assert!(parse_requirement_line("==1.0").is_none());
        assert!(parse_requirement_line("   ").is_none());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        assert_eq!(
            names("flask\nrequests\nflask==2.0\n"),
            vec!["flask", "requests", "flask"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(names("requests==2.31.0\r\nnumpy\r\n"), vec!["requests", "numpy"]);
    }
}
