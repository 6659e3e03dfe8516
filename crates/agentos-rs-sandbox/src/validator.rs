//! Whitelist and denylist checks for raw command strings.

use log::{debug, warn};
use std::sync::Arc;

use crate::error::RejectionReason;
use crate::types::{CommandPolicy, SafetyReport};

/// Gate deciding whether a raw command may run.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    policy: Arc<CommandPolicy>,
}

impl CommandValidator {
    /// Create a validator over a shared policy.
    pub fn new(policy: Arc<CommandPolicy>) -> Self {
        Self { policy }
    }

    /// Policy the validator enforces.
    pub fn policy(&self) -> &CommandPolicy {
        &self.policy
    }

    /// Validate a command, returning the trimmed command on success.
    ///
    /// Checks run in order and the first failure wins: empty input, the
    /// whitelist on the first whitespace token, then every denylist pattern
    /// as a literal substring of the lower-cased command.
    pub fn validate(&self, raw: &str) -> Result<String, RejectionReason> {
        let trimmed = raw.trim();
        let Some(base) = base_command(trimmed) else {
            warn!("command rejected (reason=empty)");
            return Err(RejectionReason::EmptyCommand);
        };
        if !self.policy.is_allowed(base) {
            warn!("command rejected (reason=not_whitelisted, base={base})");
            return Err(RejectionReason::CommandNotWhitelisted {
                base: base.to_string(),
                allowed: self.policy.sorted_allowed(),
            });
        }
        let lowered = trimmed.to_lowercase();
        if let Some(hit) = self
            .policy
            .denylist
            .iter()
            .find(|entry| lowered.contains(entry.pattern))
        {
            warn!(
                "command rejected (reason=dangerous_pattern, base={base}, pattern={})",
                hit.pattern
            );
            return Err(RejectionReason::DangerousPatternDetected(
                hit.pattern.to_string(),
            ));
        }
        debug!("command accepted (base={base}, len={})", trimmed.len());
        Ok(trimmed.to_string())
    }

    /// Run every check without short-circuiting and never execute anything.
    pub fn check_safety(&self, raw: &str) -> SafetyReport {
        let trimmed = raw.trim();
        let mut report = SafetyReport {
            command: raw.to_string(),
            base_command: String::new(),
            is_allowed: false,
            is_safe: false,
            safety_issues: Vec::new(),
            recommendations: Vec::new(),
        };
        let Some(base) = base_command(trimmed) else {
            report.safety_issues.push("Empty command".to_string());
            return report;
        };
        report.base_command = base.to_string();
        report.is_allowed = self.policy.is_allowed(base);
        if !report.is_allowed {
            report
                .safety_issues
                .push(format!("Command '{base}' not in whitelist"));
            report.recommendations.push(format!(
                "Use one of the allowed commands: {}",
                self.policy.sorted_allowed().join(", ")
            ));
        }
        let lowered = trimmed.to_lowercase();
        for entry in self.policy.denylist {
            if lowered.contains(entry.pattern) {
                report.safety_issues.push(entry.description.to_string());
                report
                    .recommendations
                    .push(format!("Avoid using '{}' in commands", entry.pattern));
            }
        }
        report.is_safe = report.safety_issues.is_empty();
        debug!(
            "safety check (base={base}, allowed={}, issues={})",
            report.is_allowed,
            report.safety_issues.len()
        );
        report
    }
}

/// First whitespace-delimited token.
pub(crate) fn base_command(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}
