//! robots.txt rule parsing and ranked-rule matching.
//!
//! Rules are pure data: `(path prefix, verdict, agent-specificity)` tuples
//! selected by a deterministic comparator. Longest matching prefix wins;
//! ties go to agent-specific rules over wildcard rules, then to Allow over
//! Disallow.

use std::time::Duration;

/// Whether a matched rule permits or forbids retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Path may be retrieved.
    Allow,
    /// Path must not be retrieved.
    Disallow,
}

/// A single path rule from a robots.txt agent group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    /// Normalized path prefix (leading slash, `*` and everything after removed).
    pub path: String,
    /// Allow or Disallow.
    pub verdict: Verdict,
    /// True when the rule came from a group naming the requesting agent
    /// rather than the wildcard `*` group.
    pub agent_specific: bool,
}

/// One `User-agent:` group with its rules and optional crawl delay.
#[derive(Debug, Clone, Default, PartialEq)]
struct Group {
    agents: Vec<String>,
    rules: Vec<(String, Verdict)>,
    crawl_delay: Option<Duration>,
}

impl Group {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    /// Product-token prefix match, case-insensitive (the conventional
    /// interpretation: `User-agent: harvester` matches `harvester/0.1`).
    fn matches_agent(&self, agent_lower: &str) -> bool {
        self.agents
            .iter()
            .any(|a| a != "*" && agent_lower.starts_with(a.as_str()))
    }
}

/// A parsed robots.txt document.
///
/// An empty document (no reachable or empty robots.txt) permits everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsDoc {
    groups: Vec<Group>,
}

impl RobotsDoc {
    /// Returns a document with no rules, which allows all paths.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a robots.txt body into agent groups.
    ///
    /// Tolerates comments, blank lines, unknown directives, and missing
    /// colons; consecutive `User-agent:` lines share one group.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current = Group::default();
        // True while consecutive User-agent lines are still accumulating.
        let mut collecting_agents = false;

        for raw in body.lines() {
            let line = match raw.split('#').next() {
                Some(l) => l.trim(),
                None => continue,
            };
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !collecting_agents && !current.agents.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_ascii_lowercase());
                    collecting_agents = true;
                }
                "allow" | "disallow" => {
                    collecting_agents = false;
                    // An empty Disallow means "allow all"; an empty Allow is
                    // meaningless. Both are skipped.
                    let Some(path) = normalize_rule_path(value) else {
                        continue;
                    };
                    let verdict = if key == "allow" {
                        Verdict::Allow
                    } else {
                        Verdict::Disallow
                    };
                    current.rules.push((path, verdict));
                }
                "crawl-delay" => {
                    collecting_agents = false;
                    if let Ok(secs) = value.parse::<f64>() {
                        if secs.is_finite() && secs > 0.0 {
                            current.crawl_delay = Some(Duration::from_secs_f64(secs));
                        }
                    }
                }
                _ => {
                    collecting_agents = false;
                }
            }
        }
        if !current.agents.is_empty() {
            groups.push(current);
        }
        Self { groups }
    }

    /// Collects the rules applicable to `agent`: every rule from groups
    /// naming the agent (marked agent-specific) plus, when no such group
    /// exists, rules from wildcard groups.
    #[must_use]
    pub fn rules_for(&self, agent: &str) -> Vec<RobotsRule> {
        let agent_lower = agent.to_ascii_lowercase();
        let specific: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.matches_agent(&agent_lower))
            .collect();
        let mut rules = Vec::new();
        for g in &specific {
            for (path, verdict) in &g.rules {
                rules.push(RobotsRule {
                    path: path.clone(),
                    verdict: *verdict,
                    agent_specific: true,
                });
            }
        }
        if specific.is_empty() {
            for g in self.groups.iter().filter(|g| g.is_wildcard()) {
                for (path, verdict) in &g.rules {
                    rules.push(RobotsRule {
                        path: path.clone(),
                        verdict: *verdict,
                        agent_specific: false,
                    });
                }
            }
        }
        rules
    }

    /// Crawl delay for `agent`: the agent-specific group's delay when one
    /// names the agent, else the wildcard group's delay.
    #[must_use]
    pub fn crawl_delay_for(&self, agent: &str) -> Option<Duration> {
        let agent_lower = agent.to_ascii_lowercase();
        self.groups
            .iter()
            .find(|g| g.matches_agent(&agent_lower))
            .and_then(|g| g.crawl_delay)
            .or_else(|| {
                self.groups
                    .iter()
                    .find(|g| g.is_wildcard())
                    .and_then(|g| g.crawl_delay)
            })
    }

    /// Whether `path` may be retrieved by `agent`.
    ///
    /// No matching rule means allowed (absence of a stated restriction
    /// permits crawling). Otherwise the best-ranked matching rule decides.
    #[must_use]
    pub fn is_allowed(&self, path: &str, agent: &str) -> bool {
        let rules = self.rules_for(agent);
        match best_match(&rules, path) {
            Some(rule) => rule.verdict == Verdict::Allow,
            None => true,
        }
    }
}

/// Selects the most specific rule matching `path`.
///
/// Rank order: longest path prefix, then agent-specific over wildcard, then
/// Allow over Disallow. Deterministic for any input ordering.
#[must_use]
pub fn best_match<'a>(rules: &'a [RobotsRule], path: &str) -> Option<&'a RobotsRule> {
    rules
        .iter()
        .filter(|r| path.starts_with(r.path.as_str()))
        .max_by_key(|r| (r.path.len(), r.agent_specific, r.verdict == Verdict::Allow))
}

/// Normalizes a rule path to a plain prefix.
///
/// Ensures a leading slash and truncates at the first `*` (a `/dir/*`
/// pattern degrades to the `/dir/` prefix). Returns `None` for paths that
/// are empty after normalization.
fn normalize_rule_path(path: &str) -> Option<String> {
    let mut s = path.trim().to_string();
    if let Some(star) = s.find('*') {
        s.truncate(star);
    }
    s = s.trim_end_matches('$').to_string();
    if s.is_empty() {
        return None;
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    Some(s)
}
