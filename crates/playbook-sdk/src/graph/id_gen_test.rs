use super::{assign_missing_ids, IdGenerator};
use crate::{build_playbook, NodeSpec, PlaybookDocument};

#[test]
fn ids_count_up_from_one() {
    let mut ids = IdGenerator::new();
    assert_eq!(ids.next_id(), "1");
    assert_eq!(ids.next_id(), "2");
    assert_eq!(IdGenerator::starting_at(40).next_id(), "40");
}

#[test]
fn assigned_ids_match_the_built_graph() {
    let mut document = PlaybookDocument::new(vec![
        NodeSpec::action("a/one"),
        NodeSpec::for_each("@alert:hosts")
            .body(vec![NodeSpec::action("a/two"), NodeSpec::action("a/three").id("kept")]),
        NodeSpec::action("a/four").id("  "),
    ]);
    let built = build_playbook(&document, &mut IdGenerator::new()).expect("valid playbook");

    assign_missing_ids(&mut document, &mut IdGenerator::new());

    let ids = [
        document.nodes[0].id.clone(),
        document.nodes[1].id.clone(),
        document.nodes[1].body[0].id.clone(),
        document.nodes[1].body[1].id.clone(),
        document.nodes[2].id.clone(),
    ];
    assert_eq!(
        ids,
        [
            Some("1".to_string()),
            Some("2".to_string()),
            Some("3".to_string()),
            Some("kept".to_string()),
            Some("4".to_string()),
        ]
    );
    for id in ids.iter().flatten() {
        assert!(built.find(id).is_some(), "graph lacks {id}");
    }
}
