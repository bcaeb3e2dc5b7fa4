use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use color_eyre::{
	Result,
	eyre::{WrapErr as _, eyre},
};
use quote_card::{
	CardContent, CardRasterizer, VisualTheme,
	config::AppConfig,
	export,
	generator::QuoteGenerator,
	quotes::ContentTopic,
	session::CardSession,
	text::{self, DEFAULT_SOURCE},
	theme::Fill,
};
use rand::seq::IndexedRandom;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quote_card")]
#[command(about = "Render themed daily-quote cards to PNG")]
struct Args {
	/// Config file. Defaults to $XDG_CONFIG_HOME/quote_card.{toml,json,yaml} when present.
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
	/// Render a card from your own text
	Render {
		#[command(flatten)]
		text: TextArgs,
		#[command(flatten)]
		card: CardArgs,
	},
	/// Generate a quote with the language model (or pick a bundled one) and render it
	Generate {
		#[arg(long, value_enum, default_value_t)]
		topic: ContentTopic,
		/// Pick the topic at random
		#[arg(long, conflicts_with = "topic")]
		random: bool,
		#[command(flatten)]
		card: CardArgs,
	},
	/// Explain a quote
	Explain { text: String },
	/// List available themes
	Themes,
}

#[derive(Debug, clap::Args)]
struct TextArgs {
	/// Free text as `quote — source`; notes are removed and the source split off
	#[arg(long, conflicts_with_all = ["quote", "source", "pick"])]
	text: Option<String>,
	#[arg(long, conflicts_with = "pick")]
	quote: Option<String>,
	#[arg(long)]
	source: Option<String>,
	/// Use a random quote from the config file
	#[arg(long)]
	pick: bool,
}

#[derive(Debug, clap::Args)]
struct CardArgs {
	/// Date shown on the card, YYYY-MM-DD. Defaults to today.
	#[arg(long)]
	date: Option<NaiveDate>,
	#[arg(long, value_enum)]
	theme: Option<VisualTheme>,
	#[arg(long)]
	width: Option<u32>,
	#[arg(long)]
	height: Option<u32>,
	/// Device scale factor; never below 2
	#[arg(long)]
	scale: Option<f32>,
	#[arg(short, long)]
	output_dir: Option<PathBuf>,
	/// Defaults to card-<date>-<theme>.png
	#[arg(long)]
	filename: Option<String>,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	let args = Args::parse();
	let config = AppConfig::read(args.config.as_deref())?;

	match args.command {
		Command::Render { text, card } => {
			let date = card.date.unwrap_or_else(|| Local::now().date_naive());
			let mut session = CardSession::new(date);
			session.set_theme(card.theme.unwrap_or(config.card.theme));
			if let Some(content) = content_from_args(&text, &config, date)? {
				session.update_content(content);
			}
			render_and_export(&session, &card, &config)?;
		}
		Command::Generate { topic, random, card } => {
			let date = card.date.unwrap_or_else(|| Local::now().date_naive());
			let mut session = CardSession::new(date);
			session.set_theme(card.theme.unwrap_or(config.card.theme));

			let generator = QuoteGenerator::new(config.api.backend()?, config.api.model.clone());
			if !generator.is_configured() {
				println!("AI service is not configured, using a bundled quote");
			}
			let ticket = session.begin_generation();
			let generated = if random {
				let (topic, generated) = generator.generate_random(&mut rand::rng());
				println!("Topic: {topic}");
				generated
			} else {
				generator.generate(topic)
			};
			session.apply_generated(ticket, &generated, date);
			if session.using_default {
				println!("Using default content");
			}
			println!("Quote: {}", session.content.quote);
			println!("Source: {}", session.content.source);

			render_and_export(&session, &card, &config)?;
		}
		Command::Explain { text } => {
			let generator = QuoteGenerator::new(config.api.backend()?, config.api.model.clone());
			match generator.explain(&text) {
				Some(explanation) => println!("{explanation}"),
				None => println!("No explanation available"),
			}
		}
		Command::Themes => {
			for theme in VisualTheme::ALL {
				let fill = match theme.spec().fill {
					Fill::Solid(color) => color.css(),
					Fill::Gradient(stops) => stops.iter().map(|s| format!("{}@{}", s.color.css(), s.offset)).collect::<Vec<_>>().join(" -> "),
				};
				println!("{:<8} {fill}", theme.id());
			}
		}
	}

	Ok(())
}

fn content_from_args(args: &TextArgs, config: &AppConfig, date: NaiveDate) -> Result<Option<CardContent>> {
	if args.pick {
		let quote = config.quotes.choose(&mut rand::rng()).ok_or_else(|| eyre!("No quotes configured"))?;
		let parts = quote.parts();
		return Ok(Some(CardContent::new(parts.quote, parts.source, date)));
	}
	if let Some(raw) = &args.text {
		let parts = text::split_quote(raw);
		return Ok(Some(CardContent::new(parts.quote, parts.source, date)));
	}
	if args.quote.is_none() && args.source.is_none() {
		return Ok(None);
	}

	let quote = args.quote.as_deref().map(text::normalize).unwrap_or_default();
	let source = args.source.as_deref().map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SOURCE).to_string();
	Ok(Some(CardContent::new(quote, source, date)))
}

fn render_and_export(session: &CardSession, card: &CardArgs, config: &AppConfig) -> Result<()> {
	let mut options = config.raster_options();
	if let Some(scale) = card.scale {
		options.device_scale = scale;
	}
	let width = card.width.unwrap_or(config.card.width);
	let height = card.height.unwrap_or(config.card.height);
	options.width = width;
	options.height = height;

	let mut rasterizer = CardRasterizer::new(options).wrap_err("Failed to set up card rasterizer")?;
	let png = session.render_with(&mut rasterizer, width, height).wrap_err("Failed to render card")?;

	let filename = card.filename.clone().unwrap_or_else(|| session.default_filename());
	let output_dir = card.output_dir.clone().unwrap_or_else(|| config.output_dir());
	let path = export::save_png(&png, &output_dir, &filename).wrap_err("Failed to export card")?;

	let (px_w, px_h) = rasterizer.pixel_size(width, height);
	println!("Card saved to {} ({px_w}x{px_h})", path.display());
	Ok(())
}
