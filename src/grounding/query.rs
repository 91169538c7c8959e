use crate::grounding::{Grounder, GroundingScope};
use crate::structs::{GroundOperator, LiftedDecisionList, State};

impl Grounder {
    /// Queries `policy` in `atoms` while pursuing `goal`: the action of the
    /// first satisfied grounding of the first rule that has one, or `None`
    /// when no rule applies.
    pub fn query(
        &self,
        policy: &LiftedDecisionList,
        scope: GroundingScope,
        atoms: &State,
        goal: &State,
    ) -> Option<GroundOperator> {
        policy.rules().iter().find_map(|rule| {
            self.candidates(rule, scope, atoms, goal)
                .as_slice()
                .iter()
                .find(|ground| ground.is_satisfied(atoms, goal))
                .map(|ground| ground.ground_operator())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::grounding::*;
    use crate::structs::{LdlRule, LiftedDecisionList, Variable};
    use crate::test_utils::*;
    use std::collections::BTreeSet;

    fn grounders() -> Vec<Grounder> {
        vec![
            Grounder::new(GroundingMode::Exhaustive, 16),
            Grounder::new(
                GroundingMode::ConstraintMatching(ConstraintMatcher::default()),
                16,
            ),
        ]
    }

    #[test]
    fn first_satisfied_grounding_of_first_rule() {
        // a and b are both on the table; the rule grounds to a before b
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);

        for grounder in grounders() {
            let action = grounder.query(&policy, scope, task.init(), task.goal());
            assert_eq!(action.map(|a| a.to_string()), Some("(pick-up a)".to_string()));
        }
    }

    #[test]
    fn earlier_rules_take_priority() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let block = domain.type_by_name("block").unwrap();
        let clear = domain.predicate_by_name("clear").unwrap();
        let on = domain.predicate_by_name("on").unwrap();
        let pick_up = domain.operator_by_name("pick-up").unwrap();
        let (x, y) = (Variable::new("x", block), Variable::new("y", block));
        // pick up a block that should end up on top of something
        let pick_up_mover = LdlRule::new(
            "pick-up-mover",
            vec![x, y],
            BTreeSet::from([clear.lift([x])]),
            BTreeSet::new(),
            BTreeSet::from([on.lift([x, y])]),
            pick_up,
            vec![x],
        )
        .unwrap();
        // pick up a block that something should end up on
        let pick_up_base = LdlRule::new(
            "pick-up-base",
            vec![x, y],
            BTreeSet::from([clear.lift([x])]),
            BTreeSet::new(),
            BTreeSet::from([on.lift([y, x])]),
            pick_up,
            vec![x],
        )
        .unwrap();

        for grounder in grounders() {
            let query = |rules: Vec<LdlRule>| {
                grounder
                    .query(&LiftedDecisionList::new(rules), scope, task.init(), task.goal())
                    .map(|action| action.to_string())
            };
            let (mover, base) = (pick_up_mover.clone(), pick_up_base.clone());
            assert_eq!(query(vec![mover.clone()]), Some("(pick-up a)".to_string()));
            assert_eq!(query(vec![base.clone()]), Some("(pick-up b)".to_string()));
            assert_eq!(
                query(vec![mover.clone(), base.clone()]),
                query(vec![mover.clone()])
            );
            assert_eq!(query(vec![base.clone(), mover]), query(vec![base]));
        }
    }

    #[test]
    fn no_applicable_rule_abstains() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let block = domain.type_by_name("block").unwrap();
        let x = Variable::new("x", block);
        let put_down = LdlRule::new(
            "put-down-held",
            vec![x],
            BTreeSet::from([domain.predicate_by_name("holding").unwrap().lift([x])]),
            BTreeSet::new(),
            BTreeSet::new(),
            domain.operator_by_name("put-down").unwrap(),
            vec![x],
        )
        .unwrap();
        let policy = LiftedDecisionList::new(vec![put_down]);

        for grounder in grounders() {
            assert_eq!(grounder.query(&policy, scope, task.init(), task.goal()), None);
            assert_eq!(
                grounder.query(&LiftedDecisionList::default(), scope, task.init(), task.goal()),
                None
            );
        }
    }

    #[test]
    fn exhaustive_queries_reuse_cached_groundings() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        let grounder = Grounder::default();

        let first = grounder.query(&policy, scope, task.init(), task.goal());
        let second = grounder.query(&policy, scope, task.init(), task.goal());
        assert_eq!(first, second);
        assert_eq!(grounder.cache().misses(), 1);
        assert_eq!(grounder.cache().hits(), 1);
    }
}
