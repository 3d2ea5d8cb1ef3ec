//! Interactive stream choice for `--format custom`.

use std::io::{self, BufRead, Write};

use cadmium_core::{StreamDescriptor, StreamPicker};
use tracing::warn;

/// Lists the candidates on stderr and reads the choice from stdin.
#[derive(Debug, Default)]
pub(crate) struct StdinStreamPicker;

impl StreamPicker for StdinStreamPicker {
    fn pick(&self, title: &str, candidates: &[StreamDescriptor]) -> Vec<String> {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "Streams available for ({title}):");
        for (index, stream) in candidates.iter().enumerate() {
            let _ = writeln!(stderr, "  {:>3}. {stream}", index + 1);
        }
        let _ = write!(
            stderr,
            "Choose streams (numbers or ids, comma separated; 'all' for every stream): "
        );
        let _ = stderr.flush();

        let mut line = String::new();
        if let Err(error) = io::stdin().lock().read_line(&mut line) {
            warn!(error = %error, "could not read stream choice");
            return Vec::new();
        }
        parse_stream_choice(&line, candidates)
    }
}

/// Resolves a typed choice into stream ids, in the order given.
///
/// Tokens may be 1-based list positions or stream ids; unknown tokens and
/// repeats are dropped.
pub(crate) fn parse_stream_choice(line: &str, candidates: &[StreamDescriptor]) -> Vec<String> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("all") {
        return candidates.iter().map(|s| s.id.clone()).collect();
    }

    let mut chosen: Vec<String> = Vec::new();
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        let by_id = candidates.iter().find(|s| s.id == token);
        let by_position = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| candidates.get(index));
        match by_id.or(by_position) {
            Some(stream) if !chosen.contains(&stream.id) => chosen.push(stream.id.clone()),
            Some(_) => {}
            None => warn!(token, "ignoring unknown stream"),
        }
    }
    chosen
}
