//! Shell escaping and command template expansion.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for shell execution.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    // Characters that require quoting
    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}

/// Expand `{{artifact}}` and `{{channel}}` placeholders in a publish
/// command template. Values are shell-quoted at the substitution site.
pub fn render_publish_command(template: &str, artifact: &str, channel: &str) -> String {
    template
        .replace("{{artifact}}", &quote_path(artifact))
        .replace("{{channel}}", &quote_arg(channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_args_are_not_quoted() {
        assert_eq!(quote_arg("edge"), "edge");
    }

    #[test]
    fn args_with_spaces_are_quoted() {
        assert_eq!(quote_arg("my artifact.snap"), "'my artifact.snap'");
    }

    #[test]
    fn embedded_single_quotes_are_escaped() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn renders_publish_template() {
        let cmd = render_publish_command(
            "snapcraft upload {{artifact}} --release={{channel}}",
            "/tmp/work/dist/app.snap",
            "edge",
        );
        assert_eq!(
            cmd,
            "snapcraft upload '/tmp/work/dist/app.snap' --release=edge"
        );
    }
}
