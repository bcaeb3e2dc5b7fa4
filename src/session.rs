//! The card being edited: content, theme, and the bookkeeping that keeps stale generations from overwriting newer edits.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::{
	error::RenderError,
	export,
	generator::Generated,
	raster::{CardContent, CardRasterizer, RenderRequest},
	text::split_quote,
	theme::VisualTheme,
};

pub const INITIAL_QUOTE: &str = "生于忧患，死于安乐";
pub const INITIAL_SOURCE: &str = "孟子";

/// Handed out when a generation starts; only the newest ticket may apply its result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GenerationTicket(u64);

#[derive(Clone, Debug)]
pub struct CardSession {
	pub content: CardContent,
	pub theme: VisualTheme,
	/// Set when the last generation fell back to a bundled quote.
	pub using_default: bool,
	generation: u64,
}

impl Default for CardSession {
	fn default() -> Self {
		Self::new(Local::now().date_naive())
	}
}

impl CardSession {
	pub fn new(date: NaiveDate) -> Self {
		Self {
			content: CardContent::new(INITIAL_QUOTE.into(), INITIAL_SOURCE.into(), date),
			theme: VisualTheme::default(),
			using_default: false,
			generation: 0,
		}
	}

	/// Replaces the content wholesale. Any generation still in flight is superseded.
	pub fn update_content(&mut self, content: CardContent) {
		self.content = content;
		self.using_default = false;
		self.generation += 1;
	}

	pub fn set_theme(&mut self, theme: VisualTheme) {
		self.theme = theme;
	}

	pub fn begin_generation(&mut self) -> GenerationTicket {
		self.generation += 1;
		debug!(generation = self.generation, "generation started");
		GenerationTicket(self.generation)
	}

	/// Splits generated text into quote and source and takes it as the new content, dated `date`.
	///
	/// Returns `false`, leaving the session untouched, when the ticket has been superseded by a later edit or generation.
	pub fn apply_generated(&mut self, ticket: GenerationTicket, generated: &Generated, date: NaiveDate) -> bool {
		if ticket.0 != self.generation {
			info!(ticket = ticket.0, latest = self.generation, "discarding superseded generation");
			return false;
		}

		let parts = split_quote(&generated.text);
		self.content = CardContent::new(parts.quote, parts.source, date);
		self.using_default = generated.used_default;
		true
	}

	pub fn render_with(&self, rasterizer: &mut CardRasterizer, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
		rasterizer.render(&RenderRequest::new(&self.content, self.theme, width, height))
	}

	pub fn default_filename(&self) -> String {
		export::card_filename(self.content.date, self.theme)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date() -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
	}

	fn generated(text: &str, used_default: bool) -> Generated {
		Generated { text: text.into(), used_default, attempts: 1 }
	}

	#[test]
	fn starts_with_initial_quote() {
		let session = CardSession::new(date());
		assert_eq!(session.content.quote, INITIAL_QUOTE);
		assert_eq!(session.content.source, INITIAL_SOURCE);
		assert_eq!(session.theme, VisualTheme::Classic);
		assert_eq!(session.default_filename(), "card-2024-03-15-classic.png");
	}

	#[test]
	fn latest_generation_applies() {
		let mut session = CardSession::new(date());
		let ticket = session.begin_generation();
		assert!(session.apply_generated(ticket, &generated("上善若水 — 《道德经》", true), date()));
		assert_eq!(session.content.quote, "上善若水");
		assert_eq!(session.content.source, "道德经");
		assert!(session.using_default);
	}

	#[test]
	fn superseded_generation_is_dropped() {
		let mut session = CardSession::new(date());
		let stale = session.begin_generation();
		let fresh = session.begin_generation();
		assert!(session.apply_generated(fresh, &generated("三人行，必有我师焉 — 《论语》", false), date()));
		assert!(!session.apply_generated(stale, &generated("存在即合理 — 黑格尔", false), date()));
		assert_eq!(session.content.quote, "三人行，必有我师焉");
	}

	#[test]
	fn user_edit_supersedes_generation() {
		let mut session = CardSession::new(date());
		let ticket = session.begin_generation();
		session.update_content(CardContent::new("我的句子".into(), "我".into(), date()));
		assert!(!session.apply_generated(ticket, &generated("存在即合理 — 黑格尔", false), date()));
		assert_eq!(session.content.quote, "我的句子");
	}
}
