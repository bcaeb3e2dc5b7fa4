//! Cleanup of quote text coming from user input or the language model, and splitting it into quote and source.

use std::sync::LazyLock;

use derive_new::new;
use regex::Regex;

/// Attribution used when the text names no source.
pub const DEFAULT_SOURCE: &str = "智慧语录";

/// Separator between quote and attribution, e.g. `生于忧患，死于安乐 — 孟子`.
pub const SOURCE_SEPARATOR: char = '—';

/// Keywords that mark a bracketed note, as in `（注：…）`.
pub const NOTE_KEYWORDS: [&str; 10] = ["注", "解析", "说明", "备注", "提示", "补充", "附注", "详解", "释义", "注释"];

/// Bracket pairs a note may be wrapped in.
pub const NOTE_BRACKETS: [(char, char); 6] = [('（', '）'), ('(', ')'), ('【', '】'), ('[', ']'), ('〔', '〕'), ('〈', '〉')];

const LEFT_CURLY: char = '“';
const RIGHT_CURLY: char = '”';
const STRAIGHT: char = '"';

static NOTE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	let keywords = NOTE_KEYWORDS.join("|");
	NOTE_BRACKETS
		.iter()
		.map(|&(open, close)| {
			let open = regex::escape(&open.to_string());
			let close = regex::escape(&close.to_string());
			Regex::new(&format!("{open}(?:{keywords})[：:][^{close}]*{close}")).expect("note pattern is valid")
		})
		.collect()
});

static FORMAT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	[
		r"(?i)金句内容\s*[—\-]\s*出处",
		r"(?i)格式为[：:][^。]*。?",
		r"(?i)请直接输出[^。]*。?",
		r"(?i)要求[：:][^。]*。?",
		r"(?i)示例[：:][^。]*。?",
		r"(?i)例如[：:][^。]*。?",
		r"(?i)格式[：:][^。]*。?",
	]
	.into_iter()
	.map(|p| Regex::new(p).expect("format pattern is valid"))
	.collect()
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid"));
static PUNCT_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*([。，、；：！？])\s*").expect("valid"));
static SOURCE_LEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[—\-\s]+").expect("valid"));
static SOURCE_OPEN_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^["'「『《]"#).expect("valid"));
static SOURCE_CLOSE_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["'」』》]$"#).expect("valid"));

/// Quote body and its attribution.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct QuoteParts {
	pub quote: String,
	pub source: String,
}

/// Removes bracketed notes, tidies whitespace around punctuation and repairs unbalanced double quotes.
pub fn normalize(text: &str) -> String {
	let mut cleaned = text.to_string();
	for pattern in NOTE_PATTERNS.iter() {
		cleaned = pattern.replace_all(&cleaned, "").into_owned();
	}

	let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");
	let cleaned = PUNCT_SPACING.replace_all(&cleaned, "$1");

	fix_quote_matching(cleaned.trim())
}

fn fix_quote_matching(text: &str) -> String {
	let count = |c: char| text.chars().filter(|&x| x == c).count();
	let left = count(LEFT_CURLY);
	let right = count(RIGHT_CURLY);
	let straight = count(STRAIGHT);

	if left == 0 && right == 0 && straight == 0 {
		return text.to_string();
	}

	let mut fixed = text.to_string();
	if left != right {
		if left == 0 {
			fixed.insert(0, LEFT_CURLY);
		} else if right == 0 {
			fixed.push(RIGHT_CURLY);
		} else {
			fixed = fixed.replace([LEFT_CURLY, RIGHT_CURLY], "\"");
		}
	}

	if straight % 2 == 1 {
		let starts = fixed.starts_with(STRAIGHT);
		let ends = fixed.ends_with(STRAIGHT);
		if starts && !ends {
			fixed.push(STRAIGHT);
		} else if ends && !starts {
			fixed.insert(0, STRAIGHT);
		}
	}

	fixed
}

/// Drops prompt boilerplate a model sometimes echoes back, like `格式为：…。`.
pub fn strip_format_instructions(text: &str) -> String {
	let mut cleaned = text.to_string();
	for pattern in FORMAT_PATTERNS.iter() {
		cleaned = pattern.replace_all(&cleaned, "").into_owned();
	}
	WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

/// Splits `quote — source` on the last separator.
///
/// The attribution is conventionally appended at the very end, and the quote itself may contain the separator, so only the last one counts.
pub fn split_quote(text: &str) -> QuoteParts {
	let cleaned = strip_format_instructions(&normalize(text));

	let Some(at) = cleaned.rfind(SOURCE_SEPARATOR) else {
		return QuoteParts::new(cleaned, DEFAULT_SOURCE.to_string());
	};

	let quote = cleaned[..at].trim().to_string();
	let rest = cleaned[at + SOURCE_SEPARATOR.len_utf8()..].trim();
	let rest = SOURCE_LEAD.replace(rest, "");
	let rest = SOURCE_OPEN_QUOTE.replace(&rest, "");
	let source = SOURCE_CLOSE_QUOTE.replace(&rest, "").trim().to_string();

	let source = if source.is_empty() { DEFAULT_SOURCE.to_string() } else { source };
	QuoteParts::new(quote, source)
}

/// Whether the text has at least one CJK unified ideograph.
pub fn contains_chinese(text: &str) -> bool {
	text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn removes_notes_in_every_bracket_style() {
		for (open, close) in NOTE_BRACKETS {
			for keyword in NOTE_KEYWORDS {
				for colon in ['：', ':'] {
					let text = format!("天行健{open}{keyword}{colon}出自周易{close}，君子以自强不息");
					assert_eq!(normalize(&text), "天行健，君子以自强不息", "{text}");
				}
			}
		}
	}

	#[test]
	fn removes_each_note_independently() {
		let text = "上善若水（注：老子）【说明：道德经】利万物(备注:x)而不争";
		assert_eq!(normalize(text), "上善若水利万物而不争");
	}

	#[test]
	fn keeps_brackets_without_note_keyword() {
		assert_eq!(normalize("学而时习之（论语）"), "学而时习之（论语）");
		assert_eq!(normalize("学而时习之（注 论语）"), "学而时习之（注 论语）");
	}

	#[test]
	fn tidies_whitespace_and_punctuation() {
		assert_eq!(normalize("  路虽远 ，  行则将至 。 \n 事虽难\t做则必成  "), "路虽远，行则将至。事虽难 做则必成");
	}

	#[test]
	fn closes_lone_left_curly_quote() {
		assert_eq!(normalize("“知行合一"), "“知行合一”");
	}

	#[test]
	fn opens_lone_right_curly_quote() {
		assert_eq!(normalize("知行合一”"), "“知行合一”");
	}

	#[test]
	fn coerces_mismatched_curly_quotes_to_straight() {
		assert_eq!(normalize("“甲”和“乙"), "\"甲\"和\"乙");
	}

	#[test]
	fn balances_odd_straight_quotes() {
		assert_eq!(normalize("\"生活不止眼前"), "\"生活不止眼前\"");
		assert_eq!(normalize("生活不止眼前\""), "\"生活不止眼前\"");
		assert_eq!(normalize("生活\"不止眼前"), "生活\"不止眼前");
	}

	#[test]
	fn never_invents_quotes() {
		assert_eq!(normalize("一花一世界"), "一花一世界");
	}

	#[test]
	fn splits_on_separator() {
		assert_eq!(split_quote("内容 — 来源"), QuoteParts::new("内容".into(), "来源".into()));
	}

	#[test]
	fn splits_on_last_separator() {
		assert_eq!(split_quote("甲 — 乙 — 丙"), QuoteParts::new("甲 — 乙".into(), "丙".into()));
	}

	#[test]
	fn missing_separator_uses_default_source() {
		assert_eq!(split_quote("纯文本无分隔符"), QuoteParts::new("纯文本无分隔符".into(), DEFAULT_SOURCE.into()));
	}

	#[test]
	fn empty_source_uses_default() {
		assert_eq!(split_quote("存在即合理 — "), QuoteParts::new("存在即合理".into(), DEFAULT_SOURCE.into()));
	}

	#[test]
	fn strips_source_decorations() {
		assert_eq!(split_quote("人生如逆旅，我亦是行人 —- 《临江仙》").source, "临江仙");
		assert_eq!(split_quote("我思故我在 — 「笛卡尔」").source, "笛卡尔");
	}

	#[test]
	fn strips_echoed_instructions_before_splitting() {
		let parts = split_quote("格式为：金句—出处。天行健，君子以自强不息 — 《周易》");
		assert_eq!(parts, QuoteParts::new("天行健，君子以自强不息".into(), "周易".into()));
	}

	#[test]
	fn detects_chinese() {
		assert!(contains_chinese("Life 生活"));
		assert!(!contains_chinese("Life is like a box of chocolates"));
		assert!(!contains_chinese("「」，。"));
	}

	proptest! {
		#[test]
		fn quote_free_text_gains_no_quotes(s in "[a-z生活智慧，。 ]{0,40}") {
			let out = normalize(&s);
			for mark in [LEFT_CURLY, RIGHT_CURLY, STRAIGHT] {
				prop_assert!(!out.contains(mark));
			}
		}

		#[test]
		fn lone_left_quote_gets_one_closing_quote(s in "[生活智慧人]{1,20}") {
			let out = normalize(&format!("“{s}"));
			prop_assert!(out.ends_with(RIGHT_CURLY));
			prop_assert_eq!(out.chars().filter(|&c| c == RIGHT_CURLY).count(), 1);
		}
	}
}
