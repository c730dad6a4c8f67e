//! robots.txt rules for the crawled site.

use robotstxt::DefaultMatcher;

/// robots.txt body of the crawled site. The empty value allows everything.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    body: String,
}

impl RobotsTxt {
    pub fn parse(content: &str) -> Self {
        Self {
            body: content.to_string(),
        }
    }

    /// Whether `user_agent` may fetch the absolute `url`. Matching follows the
    /// usual robots.txt rules: `*` and `$` wildcards, longest match wins,
    /// allow wins a tie.
    pub fn is_allowed(&self, user_agent: &str, url: &str) -> bool {
        if self.body.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.body, user_agent, url)
    }
}
