// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn status(s: &str) -> IssueStatus {
    IssueStatus::new(s)
}

#[parameterized(
    backlog_solo = { "Backlog", false, Some(WorkType::Development) },
    backlog_parent = { "Backlog", true, Some(WorkType::Coordination) },
    started_solo = { "Started", false, Some(WorkType::Inflight) },
    started_parent = { "Started", true, Some(WorkType::Inflight) },
    finished_solo = { "Finished", false, Some(WorkType::Qa) },
    finished_parent = { "Finished", true, Some(WorkType::QaCoordination) },
    delivered_solo = { "Delivered", false, Some(WorkType::Acceptance) },
    delivered_parent = { "Delivered", true, Some(WorkType::AcceptanceCoordination) },
    rejected = { "Rejected", false, Some(WorkType::Refinement) },
    icebox = { "Icebox", false, None },
    accepted = { "Accepted", false, None },
    canceled = { "Canceled", true, None },
)]
fn base_derivation(s: &str, is_parent: bool, expected: Option<WorkType>) {
    assert_eq!(base_work_type(&status(s), is_parent), expected);
}

#[test]
fn hint_refines_within_valid_set() {
    // "coordination" is valid for Backlog, so the hint wins over the base.
    let derived = derive_work_type(&status("Backlog"), false, Some("run coordination pass"));
    assert_eq!(derived, Some(WorkType::Coordination));
}

#[test]
fn hint_outside_valid_set_is_ignored() {
    // "qa" is not valid for Backlog; base derivation stands.
    let derived = derive_work_type(&status("Backlog"), false, Some("please do qa now"));
    assert_eq!(derived, Some(WorkType::Development));
}

#[test]
fn hint_without_keyword_keeps_base() {
    let derived = derive_work_type(&status("Finished"), true, Some("take another look"));
    assert_eq!(derived, Some(WorkType::QaCoordination));
}

#[parameterized(
    icebox = { "Icebox", &[WorkType::Research, WorkType::BacklogCreation] },
    started = { "Started", &[WorkType::Inflight] },
    rejected = { "Rejected", &[WorkType::Refinement] },
    terminal = { "Accepted", &[] },
    unknown = { "Blocked", &[] },
)]
fn valid_sets(s: &str, expected: &[WorkType]) {
    assert_eq!(valid_work_types(&status(s)), expected);
}

#[parameterized(
    development = { WorkType::Development, true, Some("Finished") },
    inflight = { WorkType::Inflight, true, Some("Finished") },
    qa = { WorkType::Qa, true, Some("Delivered") },
    acceptance = { WorkType::Acceptance, true, Some("Accepted") },
    refinement = { WorkType::Refinement, true, Some("Backlog") },
    coordination = { WorkType::Coordination, true, Some("Finished") },
    qa_coord = { WorkType::QaCoordination, true, Some("Delivered") },
    acceptance_coord = { WorkType::AcceptanceCoordination, true, Some("Accepted") },
    research = { WorkType::Research, true, None },
    qa_failed = { WorkType::Qa, false, Some("Rejected") },
    acceptance_failed = { WorkType::Acceptance, false, Some("Rejected") },
    qa_coord_failed = { WorkType::QaCoordination, false, Some("Rejected") },
    development_failed = { WorkType::Development, false, None },
)]
fn completion_transitions(work: WorkType, success: bool, expected: Option<&str>) {
    assert_eq!(completion_transition(work, success), expected);
}

#[test]
fn serde_uses_kebab_case() {
    let json = serde_json::to_string(&WorkType::QaCoordination).unwrap();
    assert_eq!(json, "\"qa-coordination\"");
    let back: WorkType = serde_json::from_str("\"backlog-creation\"").unwrap();
    assert_eq!(back, WorkType::BacklogCreation);
}

#[test]
fn every_work_type_has_a_priority() {
    for work in WorkType::all() {
        assert!(work.default_priority() > 0, "{work} priority");
    }
    // Inflight resumes interrupted sessions ahead of everything else.
    for work in WorkType::all() {
        if *work != WorkType::Inflight {
            assert!(work.default_priority() > WorkType::Inflight.default_priority());
        }
    }
}
