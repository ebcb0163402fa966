use std::env;
use std::fs;
use std::path::Path;

/// Look up the API key: process environment first, then the env file if it
/// exists. Returns None when neither source provides a value.
pub(crate) fn resolve_api_key(key_name: &str, env_file: &Path) -> Result<Option<String>, String> {
    if let Ok(value) = env::var(key_name) {
        if !value.trim().is_empty() {
            return Ok(Some(value));
        }
    }
    if !env_file.is_file() {
        return Ok(None);
    }
    let entries = parse_env_file(env_file)?;
    Ok(entries
        .into_iter()
        .find(|(key, _)| key == key_name)
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>, String> {
    let content = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read env file {}: {}", path.display(), err))?;

    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(format!(
                "Invalid line {} in env file {}: expected KEY=VALUE",
                index + 1,
                path.display()
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!(
                "Invalid line {} in env file {}: empty key",
                index + 1,
                path.display()
            ));
        }
        entries.push((key.to_string(), unquote(value.trim()).to_string()));
    }
    Ok(entries)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_env(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().expect("create temp file");
        fs::write(file.path(), contents).expect("write env file");
        file
    }

    #[test]
    fn parses_keys_values_comments_and_blanks() {
        let file = write_env(
            "# comment\n\nOPENAI_API_KEY=sk-test\nexport OTHER='quoted value'\nTHIRD=\"double\"\n",
        );
        let entries = parse_env_file(file.path()).expect("parse env file");
        assert_eq!(
            entries,
            vec![
                ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
                ("OTHER".to_string(), "quoted value".to_string()),
                ("THIRD".to_string(), "double".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_lines_without_equals() {
        let file = write_env("OPENAI_API_KEY\n");
        let err = parse_env_file(file.path()).expect_err("expected parse error");
        assert!(err.contains("line 1"), "error should name the line: {err}");
    }

    #[test]
    fn value_may_contain_equals() {
        let file = write_env("KEY=a=b=c\n");
        let entries = parse_env_file(file.path()).expect("parse env file");
        assert_eq!(entries, vec![("KEY".to_string(), "a=b=c".to_string())]);
    }

    #[test]
    fn resolve_falls_back_to_env_file() {
        let file = write_env("MENDER_TEST_KEY_FALLBACK=from-file\n");
        let key = resolve_api_key("MENDER_TEST_KEY_FALLBACK", file.path()).expect("resolve");
        assert_eq!(key.as_deref(), Some("from-file"));
    }

    #[test]
    fn resolve_missing_everywhere_is_none() {
        let file = write_env("UNRELATED=1\n");
        let key = resolve_api_key("MENDER_TEST_KEY_ABSENT", file.path()).expect("resolve");
        assert_eq!(key, None);
    }
}
