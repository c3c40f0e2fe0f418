//! Declarative structural constraints
//!
//! Each rule type owns a static table of named predicates. Readiness is the
//! conjunction of the table, evaluated on demand and never cached.

/// A named structural predicate over a rule
pub struct Constraint<R> {
    /// Human-readable statement of what must hold
    pub description: &'static str,
    /// The predicate
    pub check: fn(&R) -> bool,
}

impl<R> Constraint<R> {
    /// Create a constraint
    pub const fn new(description: &'static str, check: fn(&R) -> bool) -> Self {
        Self { description, check }
    }

    /// Whether the constraint holds for `rule`
    pub fn holds(&self, rule: &R) -> bool {
        (self.check)(rule)
    }
}

impl<R> std::fmt::Debug for Constraint<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("description", &self.description)
            .finish()
    }
}

/// Outcome of evaluating a rule's constraint table
///
/// A rule that is not ready is a valid intermediate state, so this is
/// reported rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStatus {
    /// Whether every constraint holds
    pub ready: bool,
    /// Descriptions of the constraints that do not hold, in table order
    pub unmet: Vec<&'static str>,
}

impl RuleStatus {
    /// Evaluate `constraints` against `rule`
    pub fn evaluate<R>(rule: &R, constraints: &[Constraint<R>]) -> Self {
        let unmet: Vec<&'static str> = constraints
            .iter()
            .filter(|c| !c.holds(rule))
            .map(|c| c.description)
            .collect();
        Self {
            ready: unmet.is_empty(),
            unmet,
        }
    }

    /// Combine two evaluations of the same rule
    pub fn merge(mut self, other: RuleStatus) -> Self {
        self.ready &= other.ready;
        self.unmet.extend(other.unmet);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    const TABLE: &[Constraint<Counter>] = &[
        Constraint::new("counter is positive", |c| c.0 > 0),
        Constraint::new("counter is even", |c| c.0 % 2 == 0),
    ];

    #[test]
    fn test_status_lists_unmet_in_order() {
        let status = RuleStatus::evaluate(&Counter(0), TABLE);
        assert!(!status.ready);
        assert_eq!(status.unmet, vec!["counter is positive"]);

        let status = RuleStatus::evaluate(&Counter(3), TABLE);
        assert_eq!(status.unmet, vec!["counter is even"]);

        assert!(RuleStatus::evaluate(&Counter(4), TABLE).ready);
    }

    #[test]
    fn test_merge() {
        let a = RuleStatus::evaluate(&Counter(4), TABLE);
        let b = RuleStatus {
            ready: false,
            unmet: vec!["other"],
        };
        let merged = a.merge(b);
        assert!(!merged.ready);
        assert_eq!(merged.unmet, vec!["other"]);
    }
}
