//! Platform templated content rewriting.
//!
//! The rewrite wraps the caller's text in a per-platform template: a prefix,
//! a summary of the applied tone and style, the platform's call to action and
//! its hashtags. Word accounting for the daily quota lives here too.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::parser::count_words;

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_STYLE: &str = "engaging";

/// Expected growth of a text once the template is applied
const EXPANSION_FACTOR: f64 = 1.2;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported platform: {0}")]
pub struct UnknownPlatform(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Blog,
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Youtube,
    Email,
}

struct Template {
    prefix: &'static str,
    structure: &'static str,
    cta: &'static str,
    hashtags: &'static str,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Blog,
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Youtube,
        Platform::Email,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Platform::Blog => "blog",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Youtube => "youtube",
            Platform::Email => "email",
        }
    }

    fn template(self) -> Template {
        match self {
            Platform::Blog => Template {
                prefix: "## ",
                structure: "comprehensive analysis with headers, bullet points, and actionable insights",
                cta: "Read more insights on our blog and subscribe for weekly updates.",
                hashtags: "",
            },
            Platform::Facebook => Template {
                prefix: "🌟 ",
                structure: "engaging story format with emojis and social proof",
                cta: "Like and share if this resonates with you! 💙",
                hashtags: "#SocialMedia #Growth #Marketing",
            },
            Platform::Instagram => Template {
                prefix: "✨ ",
                structure: "visual storytelling with line breaks and emojis",
                cta: "Double-tap if you agree! Save this post for later 📱",
                hashtags: "#Instagram #ContentCreator #Digital #Growth #Inspiration",
            },
            Platform::Twitter => Template {
                prefix: "🔥 ",
                structure: "concise thread-worthy content with key takeaways",
                cta: "Retweet to share this insight with your network!",
                hashtags: "#TwitterTips #Marketing #Growth",
            },
            Platform::Linkedin => Template {
                prefix: "🎯 ",
                structure: "professional insights with industry statistics and thought leadership",
                cta: "What's your experience with this? Share your thoughts in the comments.",
                hashtags: "#LinkedIn #Professional #Business #Strategy",
            },
            Platform::Youtube => Template {
                prefix: "🎬 ",
                structure: "engaging script format with hooks, timestamps, and viewer engagement",
                cta: "Don't forget to like, subscribe, and hit the notification bell! 🔔",
                hashtags: "#YouTube #ContentCreator #Tutorial",
            },
            Platform::Email => Template {
                prefix: "📧 ",
                structure: "personalized email format with clear subject line and actionable content",
                cta: "Reply to this email with your thoughts - I read every response!",
                hashtags: "",
            },
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPlatform(wanted.to_string()))
    }
}

/// How a text should be rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub platform: Platform,
    pub tone: String,
    pub style: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            tone: DEFAULT_TONE.to_string(),
            style: DEFAULT_STYLE.to_string(),
        }
    }
}

/// Words to reserve before rewriting `content`: its word count plus 20%, rounded up
pub fn estimate_words(content: &str) -> u32 {
    let words = count_words(content) as f64;
    (words * EXPANSION_FACTOR).ceil() as u32
}

/// Apply the platform template to `content`
pub fn rewrite_content(content: &str, options: &RewriteOptions) -> String {
    let template = options.platform.template();

    format!(
        "{prefix}{content}\n\n📈 SEO-Optimized for {platform}\n✅ {tone} tone applied\n🎯 {style} writing style\n📊 {structure}\n\n{cta}\n\n{hashtags}",
        prefix = template.prefix,
        content = content,
        platform = capitalize(options.platform.id()),
        tone = capitalize(&options.tone),
        style = capitalize(&options.style),
        structure = template.structure,
        cta = template.cta,
        hashtags = template.hashtags,
    )
}

/// Upper-case the first character and keep the rest as is
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
