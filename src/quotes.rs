//! Quotes bundled with the binary, used whenever generation is unavailable or fails.

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

/// Subject of a generated quote.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentTopic {
	#[default]
	Inspirational,
	Philosophical,
	Emotional,
	Life,
	Wisdom,
}

impl ContentTopic {
	pub const ALL: [ContentTopic; 5] = [
		ContentTopic::Inspirational,
		ContentTopic::Philosophical,
		ContentTopic::Emotional,
		ContentTopic::Life,
		ContentTopic::Wisdom,
	];

	pub fn id(self) -> &'static str {
		match self {
			ContentTopic::Inspirational => "inspirational",
			ContentTopic::Philosophical => "philosophical",
			ContentTopic::Emotional => "emotional",
			ContentTopic::Life => "life",
			ContentTopic::Wisdom => "wisdom",
		}
	}
}

impl fmt::Display for ContentTopic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

/// A `quote — source` line and a short commentary on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BundledQuote {
	pub content: &'static str,
	pub explanation: &'static str,
}

pub fn defaults_for(topic: ContentTopic) -> &'static [BundledQuote] {
	match topic {
		ContentTopic::Inspirational => INSPIRATIONAL_QUOTES,
		ContentTopic::Philosophical => PHILOSOPHICAL_QUOTES,
		ContentTopic::Emotional => EMOTIONAL_QUOTES,
		ContentTopic::Life => LIFE_QUOTES,
		ContentTopic::Wisdom => WISDOM_QUOTES,
	}
}

pub fn pick_default<R: Rng + ?Sized>(topic: ContentTopic, rng: &mut R) -> &'static BundledQuote {
	// every topic table is non-empty
	defaults_for(topic).choose(rng).unwrap_or(&INSPIRATIONAL_QUOTES[0])
}

/// Number of bundled quotes per topic.
pub fn stats() -> Vec<(ContentTopic, usize)> {
	ContentTopic::ALL.into_iter().map(|topic| (topic, defaults_for(topic).len())).collect()
}

/// Looks up the commentary for a bundled quote: exact match first, then containment either way, then containment with punctuation and spacing ignored.
pub fn find_explanation(content: &str) -> Option<&'static str> {
	let content = content.trim();
	if content.is_empty() {
		return None;
	}
	let stripped = letters_only(content);

	for topic in ContentTopic::ALL {
		let quotes = defaults_for(topic);
		let found = quotes
			.iter()
			.find(|q| q.content == content)
			.or_else(|| quotes.iter().find(|q| q.content.contains(content) || content.contains(q.content)))
			.or_else(|| {
				if stripped.is_empty() {
					return None;
				}
				quotes.iter().find(|q| {
					let candidate = letters_only(q.content);
					candidate.contains(&stripped) || stripped.contains(&candidate)
				})
			});
		if let Some(quote) = found {
			return Some(quote.explanation);
		}
	}
	None
}

fn letters_only(text: &str) -> String {
	text.chars().filter(|&c| c.is_ascii_alphanumeric() || c == '_' || ('\u{4e00}'..='\u{9fa5}').contains(&c)).collect()
}

const INSPIRATIONAL_QUOTES: &[BundledQuote] = &[
	BundledQuote {
		content: "生命不息，奋斗不止 — 电影《阿甘正传》",
		explanation: "改编自核心精神，原台词为\"Life is like a box of chocolates\"。通过时间维度的拆解，强调把握当下的哲学内核，符合\"智慧格言\"要求。",
	},
	BundledQuote {
		content: "今天的努力，是为了明天的自己 — 稻盛和夫",
		explanation: "日本经营之圣稻盛和夫的人生哲学。强调当下行动与未来成果的因果关系，体现了东方智慧中\"种瓜得瓜\"的朴素道理。",
	},
	BundledQuote {
		content: "不是因为有希望才坚持，而是坚持了才有希望 — 村上春树",
		explanation: "日本作家村上春树的人生感悟。颠覆了传统的因果逻辑，强调行动的主动性，体现了现代人面对不确定性时的积极态度。",
	},
	BundledQuote {
		content: "成功不是终点，失败也不是末日 — 丘吉尔",
		explanation: "英国首相丘吉尔在二战期间的名言。用对比的修辞手法，阐述了成败的相对性，体现了政治家面对危机时的坚韧品格。",
	},
	BundledQuote {
		content: "你的努力，时间都看得见 — 电影《当幸福来敲门》",
		explanation: "改编自电影核心主题。将抽象的\"时间\"拟人化，强调努力的累积效应，体现了美国梦中\"天道酬勤\"的价值观念。",
	},
	BundledQuote {
		content: "每一个不曾起舞的日子，都是对生命的辜负 — 尼采",
		explanation: "德国哲学家尼采的生命哲学。用\"起舞\"比喻生命的活力与激情，体现了存在主义哲学中\"活出真我\"的核心理念。",
	},
	BundledQuote {
		content: "山重水复疑无路，柳暗花明又一村 — 陆游《游山西村》",
		explanation: "南宋诗人陆游的千古名句。通过山水景色的变化，比喻人生困境与转机，体现了中国古典诗歌中\"情景交融\"的艺术手法。",
	},
	BundledQuote {
		content: "路虽远行则将至，事虽难做则必成 — 《荀子》",
		explanation: "先秦思想家荀子的励志名言。采用排比句式，强调行动的重要性，体现了儒家文化中\"知行合一\"的实践精神。",
	},
	BundledQuote {
		content: "生于忧患，死于安乐 — 孟子",
		explanation: "战国时期思想家孟子的警世名言。通过对比\"忧患\"与\"安乐\"，阐述了逆境对人格塑造的重要作用，体现了儒家文化中\"天将降大任于斯人也\"的人才观念。",
	},
];

const PHILOSOPHICAL_QUOTES: &[BundledQuote] = &[
	BundledQuote {
		content: "人生如逆旅，我亦是行人 — 苏轼《临江仙》",
		explanation: "北宋文豪苏轼的人生感悟。将人生比作逆旅，自己比作行人，体现了古代文人面对人生无常时的达观态度和哲学思考。",
	},
	BundledQuote {
		content: "存在即合理 — 黑格尔",
		explanation: "德国哲学家黑格尔的著名论断。强调现实存在的必然性，体现了辩证法中\"现实性与合理性统一\"的深刻哲理。",
	},
	BundledQuote {
		content: "我思故我在 — 笛卡尔",
		explanation: "法国哲学家笛卡尔的哲学基石。通过怀疑一切来寻找不可怀疑的真理，确立了理性主义哲学的根本出发点。",
	},
	BundledQuote {
		content: "人不能两次踏进同一条河流 — 赫拉克利特",
		explanation: "古希腊哲学家赫拉克利特的变化哲学。用河流比喻世界的永恒变化，体现了古希腊哲学中\"万物皆流\"的辩证思想。",
	},
	BundledQuote {
		content: "知之为知之，不知为不知，是知也 — 《论语》",
		explanation: "孔子关于求知态度的教导。强调诚实面对知识的边界，体现了儒家文化中\"实事求是\"的学术精神和谦逊品格。",
	},
	BundledQuote {
		content: "生活不是等待暴风雨过去，而是学会在雨中跳舞 — 电影《闻香识女人》",
		explanation: "电影中的经典台词。用暴风雨和跳舞的对比，阐述了积极面对困难的人生态度，体现了西方文化中的乐观主义精神。",
	},
	BundledQuote {
		content: "一花一世界，一叶一菩提 — 《华严经》",
		explanation: "佛教经典中的禅理名句。通过花叶的微观世界，阐述了佛法中\"小中见大\"的智慧，体现了东方宗教哲学的深邃思考。",
	},
	BundledQuote {
		content: "人生天地间，若白驹过隙，忽然而已 — 《庄子》",
		explanation: "道家思想家庄子对时间的感悟。用白马过隙比喻时光飞逝，体现了道家哲学中对生命短暂性的深刻认知。",
	},
];

const EMOTIONAL_QUOTES: &[BundledQuote] = &[
	BundledQuote {
		content: "爱是恒久忍耐，又有恩慈 — 《圣经·哥林多前书》",
		explanation: "基督教经典中对爱的定义。强调爱的持久性和包容性，体现了宗教文化中对真爱品质的深刻理解和崇高追求。",
	},
	BundledQuote {
		content: "山无陵，江水为竭，冬雷震震，夏雨雪 — 《上邪》",
		explanation: "汉乐府民歌中的爱情誓言。用极端的自然现象比喻爱情的坚贞，体现了中国古代民间文学中炽热真挚的情感表达。",
	},
	BundledQuote {
		content: "我爱你，不是因为你是谁，而是因为我喜欢与你在一起时的感觉 — 电影《廊桥遗梦》",
		explanation: "经典爱情电影中的深情告白。强调爱情中的感受体验胜过外在条件，体现了现代爱情观中对心灵契合的重视。",
	},
	BundledQuote {
		content: "此情可待成追忆，只是当时已惘然 — 李商隐《锦瑟》",
		explanation: "晚唐诗人李商隐的情感名句。通过时间的对比，表达对逝去美好的怀念，体现了中国古典诗歌中含蓄深沉的情感美学。",
	},
	BundledQuote {
		content: "最好的爱情，是两个人彼此做个伴 — 电影《一生一世》",
		explanation: "现代爱情电影中的朴实告白。强调陪伴胜过激情，体现了当代人对爱情本质的成熟理解和平实追求。",
	},
	BundledQuote {
		content: "愿得一心人，白头不相离 — 卓文君《白头吟》",
		explanation: "汉代才女卓文君的爱情宣言。表达对专一爱情的渴望，体现了中国传统文化中对忠贞爱情的美好向往。",
	},
	BundledQuote {
		content: "真正的爱情是不求回报的 — 电影《泰坦尼克号》",
		explanation: "经典爱情电影中的深刻感悟。强调爱的无私性，体现了西方浪漫主义文化中对纯粹爱情的理想化追求。",
	},
	BundledQuote {
		content: "情不知所起，一往而深 — 汤显祖《牡丹亭》",
		explanation: "明代戏曲家汤显祖的爱情哲理。描述爱情的突然降临和深入发展，体现了中国古典文学中对情感力量的深刻认知。",
	},
];

const LIFE_QUOTES: &[BundledQuote] = &[
	BundledQuote {
		content: "生活就像一盒巧克力，你永远不知道下一块是什么味道 — 电影《阿甘正传》",
		explanation: "经典电影中的人生比喻。用巧克力的未知味道比喻生活的不确定性，体现了美国文化中对生活多样性的乐观接受。",
	},
	BundledQuote {
		content: "平凡的日子里，也有微小的美好 — 村上春树",
		explanation: "日本作家村上春树的生活哲学。强调在平淡中发现美好，体现了现代都市文学中对日常生活诗意的敏感捕捉。",
	},
	BundledQuote {
		content: "慢慢来，一切都来得及 — 台湾电影《不能说的秘密》",
		explanation: "台湾电影中的温暖台词。强调从容面对生活节奏，体现了华语文化中对\"慢生活\"理念的温柔表达。",
	},
	BundledQuote {
		content: "生活不只眼前的苟且，还有诗和远方 — 许巍《生活不止眼前的苟且》",
		explanation: "音乐人许巍的生活感悟。对比现实与理想，体现了当代文艺青年对精神追求的坚持和对美好生活的向往。",
	},
	BundledQuote {
		content: "小确幸就是生活中微小但确切的幸福 — 村上春树",
		explanation: "村上春树创造的生活概念。强调微小幸福的真实性，体现了现代人在快节奏生活中对简单快乐的珍视。",
	},
	BundledQuote {
		content: "岁月不居，时节如流 — 《论盛孝章书》",
		explanation: "东汉文学家孔融的时光感悟。用流水比喻时间流逝，体现了中国古典文学中对时光易逝的深刻感知。",
	},
	BundledQuote {
		content: "人间烟火气，最抚凡人心 — 电影《小森林》",
		explanation: "日式生活电影中的温暖表达。强调日常生活的治愈力量，体现了东亚文化中对平凡生活美学的深度挖掘。",
	},
	BundledQuote {
		content: "生活需要仪式感，平凡的日子需要一束光 — 综艺《向往的生活》",
		explanation: "生活类综艺节目中的生活理念。强调在平淡中创造特别，体现了现代人对生活品质和精神愉悦的双重追求。",
	},
];

const WISDOM_QUOTES: &[BundledQuote] = &[
	BundledQuote {
		content: "学而时习之，不亦说乎 — 《论语》",
		explanation: "孔子关于学习的经典论述。强调学习与实践的结合，体现了儒家教育思想中\"知行合一\"的核心理念。",
	},
	BundledQuote {
		content: "知者不惑，仁者不忧，勇者不惧 — 《论语》",
		explanation: "孔子对理想人格的三重境界描述。分别从智慧、品德、勇气三个维度，构建了儒家文化中的完美人格标准。",
	},
	BundledQuote {
		content: "上善若水，水善利万物而不争 — 《道德经》",
		explanation: "老子的道德哲学核心观点。以水的品性比喻最高的善，体现了道家思想中\"柔弱胜刚强\"的辩证智慧。",
	},
	BundledQuote {
		content: "博学之，审问之，慎思之，明辨之，笃行之 — 《中庸》",
		explanation: "儒家经典中的学习方法论。提出学习的五个递进步骤，体现了中国古代教育思想的系统性和实践性。",
	},
	BundledQuote {
		content: "己所不欲，勿施于人 — 《论语》",
		explanation: "孔子的道德金律。强调换位思考的重要性，体现了儒家文化中\"仁爱\"思想的核心要义和普世价值。",
	},
	BundledQuote {
		content: "路漫漫其修远兮，吾将上下而求索 — 屈原《离骚》",
		explanation: "战国诗人屈原的人生誓言。表达对真理的执着追求，体现了中国古代知识分子的担当精神和理想主义情怀。",
	},
	BundledQuote {
		content: "三人行，必有我师焉 — 《论语》",
		explanation: "孔子关于学习态度的教导。强调向他人学习的重要性，体现了儒家文化中谦逊好学的品格和开放包容的心态。",
	},
	BundledQuote {
		content: "天行健，君子以自强不息 — 《周易》",
		explanation: "《易经》中的人生哲理。以天道运行比喻人生态度，体现了中华文化中积极进取、永不放弃的精神品格。",
	},
];
#[cfg(test)]
mod tests {
	use rand::{SeedableRng, rngs::StdRng};

	use super::*;
	use crate::text::{contains_chinese, split_quote};

	#[test]
	fn every_topic_has_quotes_with_sources() {
		for (topic, count) in stats() {
			assert!(count >= 8, "{topic}");
			for quote in defaults_for(topic) {
				let parts = split_quote(quote.content);
				assert!(contains_chinese(&parts.quote), "{}", quote.content);
				assert_ne!(parts.source, crate::text::DEFAULT_SOURCE, "{}", quote.content);
			}
		}
	}

	#[test]
	fn pick_default_stays_within_topic() {
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..32 {
			let picked = pick_default(ContentTopic::Wisdom, &mut rng);
			assert!(defaults_for(ContentTopic::Wisdom).contains(picked));
		}
	}

	#[test]
	fn explanation_exact_match() {
		let explanation = find_explanation("我思故我在 — 笛卡尔").unwrap();
		assert!(explanation.starts_with("法国哲学家笛卡尔"));
	}

	#[test]
	fn explanation_partial_match() {
		let explanation = find_explanation("生于忧患，死于安乐").unwrap();
		assert!(explanation.contains("孟子"));
	}

	#[test]
	fn explanation_ignores_punctuation() {
		let explanation = find_explanation("天行健 君子以自强不息").unwrap();
		assert!(explanation.contains("易经"));
	}

	#[test]
	fn unknown_quote_has_no_explanation() {
		assert_eq!(find_explanation("完全陌生的一句话"), None);
		assert_eq!(find_explanation("  "), None);
	}
}
