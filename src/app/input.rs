//! Assembly of input text from positional URLs, an input file and/or stdin.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};

use crate::cli::DownloadArgs;

/// Gathered input text, or `None` when nothing was provided.
///
/// Returns `(input_text, piped_stdin_was_empty)`. Stdin is only read when it
/// is piped and neither URLs nor `--input` were given.
pub(crate) fn collect_input(args: &DownloadArgs) -> Result<(Option<String>, bool)> {
    let mut segments = Vec::new();
    if !args.urls.is_empty() {
        segments.push(args.urls.join("\n"));
    }
    if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read input file {}", path.display()))?;
        segments.push(text);
    }

    let mut piped_stdin_was_empty = false;
    if segments.is_empty() && !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("cannot read URLs from stdin")?;
        if buffer.trim().is_empty() {
            piped_stdin_was_empty = true;
        } else {
            segments.push(buffer);
        }
    }

    let input_text = if segments.is_empty() {
        None
    } else {
        Some(segments.join("\n"))
    };
    Ok((input_text, piped_stdin_was_empty))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::collect_input;
    use crate::cli::Cli;

    #[test]
    fn test_collect_input_joins_urls_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# list\nhttps://youtu.be/aaaaaaaaaaa").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "cadmium",
            "--input",
            &path,
            "https://youtu.be/dQw4w9WgXcQ",
        ])
        .unwrap();
        let (text, empty_stdin) = collect_input(&cli.download).unwrap();
        let text = text.unwrap();
        assert!(text.starts_with("https://youtu.be/dQw4w9WgXcQ\n"));
        assert!(text.contains("https://youtu.be/aaaaaaaaaaa"));
        assert!(!empty_stdin);
    }

    #[test]
    fn test_collect_input_missing_file_is_error() {
        let cli = Cli::try_parse_from(["cadmium", "--input", "/definitely/not/here.txt"]).unwrap();
        let err = collect_input(&cli.download).unwrap_err();
        assert!(err.to_string().contains("cannot read input file"));
    }
}
