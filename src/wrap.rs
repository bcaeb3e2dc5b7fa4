//! Greedy line wrapping for quote text, with measurement supplied by the caller.

use std::sync::LazyLock;

use regex::Regex;

/// Runs a line may break after: Chinese sentence punctuation and whitespace.
static BREAK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[，。；：！？、\s]+").expect("valid"));

/// Wraps `text` into lines no wider than `max_width` as reported by `measure`.
///
/// Lines first break after punctuation or whitespace, so a clause and its trailing `，` stay together.
/// If any of those lines still overflows (a long run with no break point), the whole text is rewrapped one character at a time.
/// A single character wider than `max_width` still gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
	let text = text.trim();
	if text.is_empty() {
		return Vec::new();
	}

	let lines = greedy(clause_tokens(text), max_width, &measure);
	if lines.iter().all(|line| measure(line) <= max_width) {
		return lines;
	}

	tracing::debug!(max_width, "clause wrapping overflowed, falling back to per-character wrapping");
	let chars = text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]);
	greedy(chars, max_width, &measure)
}

/// Content runs with their trailing break run attached.
fn clause_tokens(text: &str) -> impl Iterator<Item = &str> {
	let mut start = 0;
	let mut tokens = Vec::new();
	for run in BREAK_RUN.find_iter(text) {
		tokens.push(&text[start..run.end()]);
		start = run.end();
	}
	if start < text.len() {
		tokens.push(&text[start..]);
	}
	tokens.into_iter()
}

/// Accumulates tokens while the line fits, then flushes it trimmed. Blank lines are dropped.
fn greedy<'a>(tokens: impl Iterator<Item = &'a str>, max_width: f32, measure: &impl Fn(&str) -> f32) -> Vec<String> {
	let mut lines = Vec::new();
	let mut line = String::new();
	for token in tokens {
		let candidate = format!("{line}{token}");
		if measure(&candidate) > max_width && !line.is_empty() {
			let done = line.trim();
			if !done.is_empty() {
				lines.push(done.to_string());
			}
			line = token.to_string();
		} else {
			line = candidate;
		}
	}

	let last = line.trim();
	if !last.is_empty() {
		lines.push(last.to_string());
	}
	lines
}
