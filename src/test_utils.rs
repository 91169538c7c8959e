use crate::structs::{Domain, GroundAtom, LdlRule, Task, Variable};
use std::collections::BTreeSet;

pub const BLOCKS_DOMAIN_TEXT: &str = r#"
; four-operator blocksworld
(define (domain blocks)
  (:requirements :strips :typing)
  (:types block)
  (:predicates (on ?x - block ?y - block)
               (on-table ?x - block)
               (clear ?x - block)
               (holding ?x - block)
               (handempty))

  (:action pick-up
    :parameters (?x - block)
    :precondition (and (clear ?x) (on-table ?x) (handempty))
    :effect (and (not (on-table ?x)) (not (clear ?x)) (not (handempty)) (holding ?x)))

  (:action put-down
    :parameters (?x - block)
    :precondition (holding ?x)
    :effect (and (not (holding ?x)) (clear ?x) (handempty) (on-table ?x)))

  (:action stack
    :parameters (?x - block ?y - block)
    :precondition (and (holding ?x) (clear ?y))
    :effect (and (not (holding ?x)) (not (clear ?y)) (clear ?x) (handempty) (on ?x ?y)))

  (:action unstack
    :parameters (?x - block ?y - block)
    :precondition (and (on ?x ?y) (clear ?x) (handempty))
    :effect (and (holding ?x) (clear ?y) (not (clear ?x)) (not (handempty)) (not (on ?x ?y)))))
"#;

pub const BLOCKS_PROBLEM_TEXT: &str = r#"
(define (problem three-blocks)
  (:domain blocks)
  (:objects a b c - block)
  (:init (clear a) (clear b) (clear c)
         (on-table a) (on-table b) (on-table c)
         (handempty))
  (:goal (and (on a b) (on b c))))
"#;

pub const BLOCKS_PROBLEM_TWO_TEXT: &str = r#"
(define (problem two-blocks)
  (:domain blocks)
  (:objects a b - block)
  (:init (clear a) (clear b) (on-table a) (on-table b) (handempty))
  (:goal (on a b)))
"#;

pub const LOGISTICS_DOMAIN_TEXT: &str = r#"
(define (domain logistics)
  (:requirements :strips :typing :negative-preconditions)
  (:types truck airplane - vehicle
          vehicle package location - object)
  (:predicates (at ?o - object ?l - location)
               (in ?p - package ?v - vehicle)
               (connected ?from ?to - location)
               (is-truck ?v - vehicle))

  (:action drive
    :parameters (?v - vehicle ?from ?to - location)
    :precondition (and (is-truck ?v) (at ?v ?from) (connected ?from ?to))
    :effect (and (not (at ?v ?from)) (at ?v ?to)))

  (:action load
    :parameters (?p - package ?v - vehicle ?l - location)
    :precondition (and (at ?p ?l) (at ?v ?l))
    :effect (and (not (at ?p ?l)) (in ?p ?v)))

  (:action unload
    :parameters (?p - package ?v - vehicle ?l - location)
    :precondition (and (in ?p ?v) (at ?v ?l) (not (at ?p ?l)))
    :effect (and (not (in ?p ?v)) (at ?p ?l))))
"#;

pub const LOGISTICS_PROBLEM_TEXT: &str = r#"
(define (problem deliver-one)
  (:domain logistics)
  (:objects t1 - truck
            plane - airplane
            p1 p2 - package
            l1 l2 - location)
  (:init (is-truck t1)
         (at t1 l1) (at plane l1)
         (at p1 l1) (at p2 l2)
         (connected l1 l2) (connected l2 l1))
  (:goal (at p1 l2)))
"#;

pub fn blocks_domain() -> Domain {
    Domain::from_text(BLOCKS_DOMAIN_TEXT).unwrap()
}

pub fn blocks_task(domain: &Domain) -> Task {
    Task::from_text(BLOCKS_PROBLEM_TEXT, domain).unwrap()
}

pub fn logistics_domain() -> Domain {
    Domain::from_text(LOGISTICS_DOMAIN_TEXT).unwrap()
}

pub fn logistics_task(domain: &Domain) -> Task {
    Task::from_text(LOGISTICS_PROBLEM_TEXT, domain).unwrap()
}

pub fn ground(domain: &Domain, task: &Task, predicate: &str, objects: &[&str]) -> GroundAtom {
    domain
        .predicate_by_name(predicate)
        .unwrap()
        .ground(objects.iter().map(|name| task.object_by_name(name).unwrap()))
}

/// `(:rule pick-up-any :parameters (?x - block) :preconditions (and (clear ?x)
/// (on-table ?x)) :action (pick-up ?x))`
pub fn pick_up_rule(domain: &Domain) -> LdlRule {
    let block = domain.type_by_name("block").unwrap();
    let x = Variable::new("x", block);
    LdlRule::new(
        "pick-up-any",
        vec![x],
        BTreeSet::from([
            domain.predicate_by_name("clear").unwrap().lift([x]),
            domain.predicate_by_name("on-table").unwrap().lift([x]),
        ]),
        BTreeSet::new(),
        BTreeSet::new(),
        domain.operator_by_name("pick-up").unwrap(),
        vec![x],
    )
    .unwrap()
}
