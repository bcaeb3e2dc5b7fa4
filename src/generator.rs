//! Quote generation through an OpenAI-style chat-completions endpoint, falling back to bundled quotes.

use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
	error::GenerateError,
	quotes::{self, ContentTopic},
	text::{contains_chinese, split_quote},
};

pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_ATTEMPTS: u32 = 3;

const QUOTE_MAX_TOKENS: u32 = 150;
const QUOTE_TEMPERATURE: f32 = 0.8;
const MAX_TEMPERATURE: f32 = 0.9;
const CHINESE_REMINDER: &str = " 注意：必须生成中文金句，不能使用英文或其他语言。";

const EXPLAIN_MAX_TOKENS: u32 = 300;
const EXPLAIN_TEMPERATURE: f32 = 0.7;
const MIN_EXPLANATION_CHARS: usize = 20;

static EXPLANATION_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(金句解释[：:]?|解释[：:]?|分析[：:]?)").expect("valid"));
static WRAPPING_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^["']|["']$"#).expect("valid"));
static REFUSAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(抱歉|无法|不能|没有|未知)").expect("valid"));

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
	pub model: String,
	pub messages: Vec<ChatMessage>,
	pub max_tokens: u32,
	pub temperature: f32,
}

impl ChatRequest {
	fn user(model: &str, prompt: String, max_tokens: u32, temperature: f32) -> Self {
		Self {
			model: model.to_string(),
			messages: vec![ChatMessage { role: "user".into(), content: prompt }],
			max_tokens,
			temperature,
		}
	}
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
	message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
	content: String,
}

/// Something that turns a chat request into the text of its first completion.
pub trait CompletionBackend {
	fn complete(&self, request: &ChatRequest) -> Result<String, GenerateError>;

	fn is_configured(&self) -> bool {
		true
	}
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for &B {
	fn complete(&self, request: &ChatRequest) -> Result<String, GenerateError> {
		(**self).complete(request)
	}

	fn is_configured(&self) -> bool {
		(**self).is_configured()
	}
}

/// Blocking HTTP client for `{base_url}/chat/completions`.
#[derive(Debug)]
pub struct HttpBackend {
	client: reqwest::blocking::Client,
	base_url: String,
	api_key: Option<String>,
	timeout: Duration,
}

impl HttpBackend {
	pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, GenerateError> {
		let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			base_url: base_url.into(),
			api_key: api_key.filter(|key| !key.trim().is_empty()),
			timeout,
		})
	}
}

impl CompletionBackend for HttpBackend {
	#[instrument(skip_all, fields(model = %request.model))]
	fn complete(&self, request: &ChatRequest) -> Result<String, GenerateError> {
		let api_key = self.api_key.as_deref().ok_or(GenerateError::NotConfigured)?;
		let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

		let response = self.client.post(&url).bearer_auth(api_key).json(request).send().map_err(|e| {
			if e.is_timeout() {
				GenerateError::Timeout(self.timeout.as_secs())
			} else {
				GenerateError::Http(e)
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			return Err(GenerateError::Status { status });
		}

		let content = first_choice(&response.text()?)?;
		debug!(chars = content.chars().count(), "received completion");
		Ok(content)
	}

	fn is_configured(&self) -> bool {
		self.api_key.is_some()
	}
}

fn first_choice(body: &str) -> Result<String, GenerateError> {
	let body: ChatResponse = serde_json::from_str(body).map_err(|e| GenerateError::Malformed(e.to_string()))?;
	let choice = body.choices.into_iter().next().ok_or_else(|| GenerateError::Malformed("response has no choices".into()))?;
	Ok(strip_wrapping_quotes(&choice.message.content))
}

fn strip_wrapping_quotes(text: &str) -> String {
	WRAPPING_QUOTE.replace_all(text.trim(), "").trim().to_string()
}

/// Raw `quote — source` text, and whether it came from the bundled library instead of the model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Generated {
	pub text: String,
	pub used_default: bool,
	pub attempts: u32,
}

pub fn prompt_for(topic: ContentTopic) -> &'static str {
	match topic {
		ContentTopic::Inspirational => "请生成一句励志名言或金句，要求简洁有力，能够激励人心。请直接输出具体的金句和真实出处，用\"—\"分隔。必须使用中文。",
		ContentTopic::Philosophical => "请生成一句哲理名言或智慧语录，要求有深度，能够引发思考。请直接输出具体的金句和真实出处，用\"—\"分隔。必须使用中文。",
		ContentTopic::Emotional => "请生成一句温暖治愈的情感金句，要求能够打动人心，传递正能量。请直接输出具体的金句和真实出处，用\"—\"分隔。必须使用中文。",
		ContentTopic::Life => "请生成一句关于生活的智慧语录，要求贴近日常，有实用价值。请直接输出具体的金句和真实出处，用\"—\"分隔。必须使用中文。",
		ContentTopic::Wisdom => "请生成一句古今中外的智慧名言，要求经典深刻，有教育意义。请直接输出具体的金句和真实出处，用\"—\"分隔。必须使用中文。",
	}
}

fn explanation_prompt(content: &str) -> String {
	format!(
		"请为这句金句提供深入的解释和分析：\"{content}\"\n\n\
		要求：\n\
		1. 分析金句的含义和哲理\n\
		2. 解释其价值和启发意义\n\
		3. 如果能识别出处，请简要介绍背景\n\
		4. 控制在100-200字之间\n\
		5. 语言要通俗易懂，富有启发性\n\n\
		请直接输出解释内容，不要包含\"这句话\"、\"金句解释\"等前缀。"
	)
}

pub struct QuoteGenerator<B> {
	backend: B,
	model: String,
}

impl<B: CompletionBackend> QuoteGenerator<B> {
	pub fn new(backend: B, model: impl Into<String>) -> Self {
		Self { backend, model: model.into() }
	}

	pub fn is_configured(&self) -> bool {
		self.backend.is_configured()
	}

	pub fn generate(&self, topic: ContentTopic) -> Generated {
		self.generate_with_rng(topic, &mut rand::rng())
	}

	/// Asks the model for a quote on `topic`, retrying when the reply is not Chinese.
	///
	/// Never fails: after [`MAX_ATTEMPTS`] unusable replies, or as soon as the backend reports it is not configured, a bundled quote is returned instead.
	#[instrument(skip(self, rng))]
	pub fn generate_with_rng<R: rand::Rng + ?Sized>(&self, topic: ContentTopic, rng: &mut R) -> Generated {
		let base_prompt = prompt_for(topic);
		let mut request = ChatRequest::user(&self.model, base_prompt.to_string(), QUOTE_MAX_TOKENS, QUOTE_TEMPERATURE);

		let mut attempts = 0;
		while attempts < MAX_ATTEMPTS {
			attempts += 1;
			match self.backend.complete(&request) {
				Ok(reply) => {
					let parts = split_quote(&reply);
					if contains_chinese(&parts.quote) {
						info!(attempt = attempts, quote = %parts.quote, "generated quote");
						return Generated {
							text: reply,
							used_default: false,
							attempts,
						};
					}
					warn!(attempt = attempts, quote = %parts.quote, "generated quote is not Chinese");
					if attempts < MAX_ATTEMPTS {
						request.messages[0].content = format!("{base_prompt}{CHINESE_REMINDER}");
						request.temperature = (request.temperature + 0.1).min(MAX_TEMPERATURE);
					}
				}
				Err(GenerateError::NotConfigured) => {
					warn!("quote service is not configured");
					break;
				}
				Err(e) => warn!(attempt = attempts, error = %e, "quote generation failed"),
			}
		}

		let fallback = quotes::pick_default(topic, rng);
		info!(content = fallback.content, "using bundled quote");
		Generated {
			text: fallback.content.to_string(),
			used_default: true,
			attempts,
		}
	}

	/// Picks a topic at random and generates for it.
	pub fn generate_random<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> (ContentTopic, Generated) {
		let topic = ContentTopic::ALL[rng.random_range(0..ContentTopic::ALL.len())];
		(topic, self.generate_with_rng(topic, rng))
	}

	/// Commentary on a quote: the bundled one when the quote is known, otherwise one asked from the model.
	#[instrument(skip(self))]
	pub fn explain(&self, content: &str) -> Option<String> {
		if let Some(explanation) = quotes::find_explanation(content) {
			return Some(explanation.to_string());
		}

		let request = ChatRequest::user(&self.model, explanation_prompt(content), EXPLAIN_MAX_TOKENS, EXPLAIN_TEMPERATURE);
		let reply = match self.backend.complete(&request) {
			Ok(reply) => reply,
			Err(e) => {
				warn!(error = %e, "explanation generation failed");
				return None;
			}
		};
		clean_explanation(&reply)
	}
}

fn clean_explanation(reply: &str) -> Option<String> {
	let cleaned = EXPLANATION_PREFIX.replace(reply, "");
	let cleaned = strip_wrapping_quotes(&cleaned);
	if cleaned.chars().count() < MIN_EXPLANATION_CHARS || REFUSAL.is_match(&cleaned) {
		debug!(reply, "discarding unusable explanation");
		return None;
	}
	Some(cleaned)
}
