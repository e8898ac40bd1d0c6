use std::fmt;

const RULE_WIDTH: usize = 50;

/// Result of a single named check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
}

impl CheckOutcome {
    pub fn new(name: &str, passed: bool) -> Self {
        Self {
            name: name.to_string(),
            passed,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.passed {
            "✅ PASS"
        } else {
            "❌ FAIL"
        }
    }
}

/// Ordered pass/fail table printed at the end of a probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    title: String,
    outcomes: Vec<CheckOutcome>,
}

impl Summary {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, name: &str, passed: bool) {
        self.outcomes.push(CheckOutcome::new(name, passed));
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn passed(&self, name: &str) -> bool {
        self.outcome(name).map(|o| o.passed).unwrap_or(false)
    }

    /// True when at least one check ran and none failed.
    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }
}

/// Horizontal rule separating the sections of probe output.
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", rule())?;
        writeln!(f, "📋 {}:", self.title)?;
        for outcome in &self.outcomes {
            writeln!(f, "   {}: {}", outcome.name, outcome.label())?;
        }
        Ok(())
    }
}
