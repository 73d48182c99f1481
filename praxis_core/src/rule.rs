//! Forward-chaining rules.
//!
//! A rule pairs a precondition query with an action run once per solution.
//! Running a rule set is a single pass in declaration order: facts asserted
//! by one rule are visible to the rules after it, but nothing loops to a
//! fixpoint. Run the set again to derive further consequences.

use tracing::{debug, debug_span, trace};

use crate::error::Result;
use crate::query::Query;
use crate::trie::Trie;
use crate::variable::Bindings;

/// Effect run for each solution of a rule's precondition.
pub type Action = Box<dyn FnMut(&mut Trie, &mut Bindings) -> Result<()>>;

/// A forward-chaining inference rule.
pub struct Rule {
    name: String,
    precondition: Box<dyn Query>,
    action: Action,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        precondition: impl Query + 'static,
        action: impl FnMut(&mut Trie, &mut Bindings) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            precondition: Box::new(precondition),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precondition(&self) -> &dyn Query {
        self.precondition.as_ref()
    }

    /// Run the action once per precondition solution, returning the number
    /// of firings. Duplicate solutions fire twice.
    pub fn run(&mut self, trie: &mut Trie, env: &mut Bindings) -> Result<usize> {
        let name = &self.name;
        let action = &mut self.action;
        let firings = self.precondition.do_all(trie, env, &mut |trie, env| {
            trace!(rule = %name, "rule fired");
            action(trie, env)
        })?;
        debug!(rule = %self.name, firings, "rule ran");
        Ok(firings)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("precondition", &self.precondition.name())
            .finish()
    }
}

/// An ordered collection of rules run together.
#[derive(Debug)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a new empty rule set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule to the end of the set.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add multiple rules, in order.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule once, in order, returning the total number of firings.
    pub fn run(&mut self, trie: &mut Trie, env: &mut Bindings) -> Result<usize> {
        let _span = debug_span!("rule_set", name = %self.name).entered();
        let mut firings = 0;
        for rule in &mut self.rules {
            firings += rule.run(trie, env)?;
        }
        debug!(rules = self.rules.len(), firings, "rule set ran");
        Ok(firings)
    }
}
