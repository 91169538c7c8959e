use crate::grounding::GroundingScope;
use crate::structs::{GroundLdlRule, LdlRule, Object, Predicate, Variable};
use itertools::Itertools;
use std::collections::HashMap;

/// The objects each parameter of `rule` may take, in parameter order. Each
/// list is sorted and contains the objects of the parameter's type (or a
/// subtype) that pass the unary static preconditions on that parameter.
pub fn parameter_candidates(rule: &LdlRule, scope: &GroundingScope) -> Vec<Vec<Object>> {
    let mut required: HashMap<Variable, Vec<Predicate>> = HashMap::new();
    let mut forbidden: HashMap<Variable, Vec<Predicate>> = HashMap::new();
    for (atoms, filters) in [
        (rule.pos_state_preconditions(), &mut required),
        (rule.neg_state_preconditions(), &mut forbidden),
    ] {
        for atom in atoms {
            if let [variable] = atom.variables() {
                if scope.is_static(atom.predicate()) {
                    filters.entry(*variable).or_default().push(atom.predicate());
                }
            }
        }
    }

    let holds = |predicate: &Predicate, object: Object| {
        scope
            .static_init()
            .contains(&predicate.ground([object]))
    };

    rule.parameters()
        .iter()
        .map(|parameter| {
            let required = required.get(parameter).map(Vec::as_slice).unwrap_or(&[]);
            let forbidden = forbidden.get(parameter).map(Vec::as_slice).unwrap_or(&[]);
            scope
                .objects()
                .iter()
                .copied()
                .filter(|object| object.is_instance(parameter.type_()))
                .filter(|object| required.iter().all(|predicate| holds(predicate, *object)))
                .filter(|object| !forbidden.iter().any(|predicate| holds(predicate, *object)))
                .collect()
        })
        .collect()
}

/// Every type-correct grounding of `rule` over the scope's objects, in
/// lexicographic order of the per-parameter candidate indices.
pub fn ground_exhaustively(rule: &LdlRule, scope: &GroundingScope) -> Vec<GroundLdlRule> {
    let candidates = parameter_candidates(rule, scope);
    if candidates.is_empty() {
        return rule.ground(&[]).into_iter().collect();
    }
    candidates
        .into_iter()
        .multi_cartesian_product()
        .filter_map(|objects| rule.ground(&objects))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::Grounder;
    use crate::structs::{LiftedDecisionList, Task};
    use crate::test_utils::*;
    use std::collections::BTreeSet;

    #[test]
    fn groundings_follow_sorted_candidate_order() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let block = domain.type_by_name("block").unwrap();
        let (x, y) = (Variable::new("x", block), Variable::new("y", block));
        let rule = LdlRule::new(
            "stack-any",
            vec![x, y],
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            domain.operator_by_name("stack").unwrap(),
            vec![x, y],
        )
        .unwrap();

        let actions: Vec<String> = ground_exhaustively(&rule, &scope)
            .iter()
            .map(|ground| ground.ground_operator().to_string())
            .collect();
        assert_eq!(actions.len(), 9);
        assert_eq!(actions[0], "(stack a a)");
        assert_eq!(actions[1], "(stack a b)");
        assert_eq!(actions[3], "(stack b a)");
    }

    #[test]
    fn two_blocks_ground_and_query_in_object_order() {
        let domain = blocks_domain();
        let task = Task::from_text(BLOCKS_PROBLEM_TWO_TEXT, &domain).unwrap();
        let scope = GroundingScope::for_task(&domain, &task);
        let rule = pick_up_rule(&domain);

        let actions: Vec<String> = ground_exhaustively(&rule, &scope)
            .iter()
            .map(|ground| ground.ground_operator().to_string())
            .collect();
        assert_eq!(actions, ["(pick-up a)", "(pick-up b)"]);

        let policy = LiftedDecisionList::new(vec![rule]);
        let action = Grounder::default().query(&policy, scope, task.init(), task.goal());
        assert_eq!(action.map(|a| a.to_string()).as_deref(), Some("(pick-up a)"));
    }

    #[test]
    fn grounding_is_deterministic() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let rule = pick_up_rule(&domain);
        assert_eq!(
            ground_exhaustively(&rule, &scope),
            ground_exhaustively(&rule, &scope)
        );
    }

    #[test]
    fn only_type_correct_objects_are_used() {
        let domain = logistics_domain();
        let task = logistics_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let package = domain.type_by_name("package").unwrap();
        let vehicle = domain.type_by_name("vehicle").unwrap();
        let location = domain.type_by_name("location").unwrap();
        let (p, v, l) = (
            Variable::new("p", package),
            Variable::new("v", vehicle),
            Variable::new("l", location),
        );
        let rule = LdlRule::new(
            "load-any",
            vec![p, v, l],
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            domain.operator_by_name("load").unwrap(),
            vec![p, v, l],
        )
        .unwrap();

        let groundings = ground_exhaustively(&rule, &scope);
        // 2 packages, a truck and an airplane, 2 locations
        assert_eq!(groundings.len(), 8);
        for ground in &groundings {
            for (object, parameter) in ground.objects().iter().zip(rule.parameters()) {
                assert!(object.is_instance(parameter.type_()));
            }
        }
    }

    #[test]
    fn static_unary_preconditions_filter_candidates() {
        let domain = logistics_domain();
        let task = logistics_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let vehicle = domain.type_by_name("vehicle").unwrap();
        let location = domain.type_by_name("location").unwrap();
        let is_truck = domain.predicate_by_name("is-truck").unwrap();
        let (v, from, to) = (
            Variable::new("v", vehicle),
            Variable::new("from", location),
            Variable::new("to", location),
        );
        let drive = domain.operator_by_name("drive").unwrap();
        let positive = LdlRule::new(
            "drive-trucks",
            vec![v, from, to],
            BTreeSet::from([is_truck.lift([v])]),
            BTreeSet::new(),
            BTreeSet::new(),
            drive,
            vec![v, from, to],
        )
        .unwrap();
        let candidates = parameter_candidates(&positive, &scope);
        let vehicles: Vec<&str> = candidates[0].iter().map(|o| o.name().as_str()).collect();
        assert_eq!(vehicles, vec!["t1"]);

        let negative = LdlRule::new(
            "drive-non-trucks",
            vec![v, from, to],
            BTreeSet::new(),
            BTreeSet::from([is_truck.lift([v])]),
            BTreeSet::new(),
            drive,
            vec![v, from, to],
        )
        .unwrap();
        let candidates = parameter_candidates(&negative, &scope);
        let vehicles: Vec<&str> = candidates[0].iter().map(|o| o.name().as_str()).collect();
        assert_eq!(vehicles, vec!["plane"]);
    }
}
