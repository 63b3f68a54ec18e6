//! Robots.txt parser
//!
//! Parses robots.txt files into per-agent rule groups. The SEO report uses it
//! to check whether search engine crawlers can reach the site and whether a
//! sitemap is declared.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search engine crawlers whose access matters for ranking
pub const SEARCH_CRAWLERS: &[&str] = &[
    "Googlebot",
    "Bingbot",
    "Slurp",
    "DuckDuckBot",
    "Baiduspider",
    "YandexBot",
];

/// Parsed robots.txt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotsTxtAnalysis {
    /// Sitemap URLs declared with `Sitemap:`
    pub sitemaps: Vec<String>,

    /// Rules keyed by lower-cased user agent
    pub agent_rules: HashMap<String, AgentRules>,

    /// Parsing and policy issues
    pub issues: Vec<String>,
}

/// Rules for a specific user agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRules {
    pub user_agent: String,
    pub disallow: Vec<String>,
    pub allow: Vec<String>,
    /// Crawl delay in seconds
    pub crawl_delay: Option<u32>,
    /// `Disallow: /` with no overriding `Allow`
    pub blocks_all: bool,
}

/// Parse robots.txt content.
///
/// Consecutive `User-agent` lines share the rule group that follows them.
pub fn parse_robots_txt(content: &str) -> RobotsTxtAnalysis {
    let mut analysis = RobotsTxtAnalysis::default();

    let mut group_agents: Vec<String> = Vec::new();
    let mut group_rules = AgentRules::default();
    let mut group_has_rules = false;

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else {
            analysis
                .issues
                .push(format!("Line {}: missing ':' in \"{}\"", line_no + 1, line));
            continue;
        };

        let directive = directive.trim().to_ascii_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => {
                if group_has_rules {
                    flush_group(&mut analysis, &group_agents, &group_rules);
                    group_agents.clear();
                    group_rules = AgentRules::default();
                    group_has_rules = false;
                }
                group_agents.push(value.to_string());
            }
            "disallow" => {
                group_has_rules = true;
                if !value.is_empty() {
                    group_rules.disallow.push(value.to_string());
                }
            }
            "allow" => {
                group_has_rules = true;
                if !value.is_empty() {
                    group_rules.allow.push(value.to_string());
                }
            }
            "crawl-delay" => {
                group_has_rules = true;
                match value.parse::<u32>() {
                    Ok(delay) => group_rules.crawl_delay = Some(delay),
                    Err(_) => analysis
                        .issues
                        .push(format!("Line {}: invalid crawl-delay \"{}\"", line_no + 1, value)),
                }
            }
            "sitemap" => {
                if !value.is_empty() {
                    analysis.sitemaps.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    flush_group(&mut analysis, &group_agents, &group_rules);

    if analysis.sitemaps.is_empty() {
        analysis.issues.push("No sitemap URLs declared".to_string());
    }

    if !analysis.is_path_allowed("/", "*") {
        analysis
            .issues
            .push("All bots blocked with 'Disallow: /'".to_string());
    }

    analysis
}

fn flush_group(analysis: &mut RobotsTxtAnalysis, agents: &[String], rules: &AgentRules) {
    for agent in agents {
        let entry = analysis
            .agent_rules
            .entry(agent.to_ascii_lowercase())
            .or_insert_with(|| AgentRules {
                user_agent: agent.clone(),
                ..AgentRules::default()
            });

        entry.disallow.extend(rules.disallow.iter().cloned());
        entry.allow.extend(rules.allow.iter().cloned());
        if rules.crawl_delay.is_some() {
            entry.crawl_delay = rules.crawl_delay;
        }
        entry.blocks_all =
            entry.disallow.iter().any(|p| p == "/") && !entry.allow.iter().any(|p| p == "/");
    }
}

impl RobotsTxtAnalysis {
    /// Rules that apply to `agent`, falling back to the `*` group
    pub fn rules_for(&self, agent: &str) -> Option<&AgentRules> {
        self.agent_rules
            .get(&agent.to_ascii_lowercase())
            .or_else(|| self.agent_rules.get("*"))
    }

    /// Whether `agent` is barred from the whole site
    pub fn blocks_all(&self, agent: &str) -> bool {
        self.rules_for(agent).is_some_and(|rules| rules.blocks_all)
    }

    /// Search crawlers that may not fetch the site root
    pub fn blocked_search_crawlers(&self) -> Vec<&'static str> {
        SEARCH_CRAWLERS
            .iter()
            .copied()
            .filter(|crawler| !self.is_path_allowed("/", crawler))
            .collect()
    }

    /// Check if `path` may be crawled by `agent`.
    ///
    /// Patterns support `*` for any run of characters and a trailing `$`
    /// anchor. The longest matching rule wins; `Allow` wins a tie.
    pub fn is_path_allowed(&self, path: &str, agent: &str) -> bool {
        let Some(rules) = self.rules_for(agent) else {
            return true;
        };

        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| pattern_matches(p, path))
                .map(|p| p.len())
                .max()
        };

        match (longest(&rules.allow), longest(&rules.disallow)) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(allow), Some(disallow)) => allow >= disallow,
        }
    }
}

/// Match a robots.txt path pattern against the start of `path`
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut pieces = pattern.split('*');
    let head = pieces.next().unwrap_or_default();
    let Some(mut rest) = path.strip_prefix(head) else {
        return false;
    };

    let pieces: Vec<&str> = pieces.collect();
    if pieces.is_empty() {
        return !anchored || rest.is_empty();
    }

    for (i, piece) in pieces.iter().enumerate() {
        if anchored && i == pieces.len() - 1 {
            return rest.ends_with(*piece);
        }
        match rest.find(*piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }

    true
}
