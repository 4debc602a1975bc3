use crate::{build_playbook, IdGenerator, NodeKind, NodeSpec, NodeType, PlaybookDocument};

fn sample() -> PlaybookDocument {
    PlaybookDocument::new(vec![
        NodeSpec::action("www.vt.com/scan").id("ac1"),
        NodeSpec::if_node("@node:ac1$score > 50")
            .id("if1")
            .on_true(vec![NodeSpec::action("www.block.com/ip").id("yes1")])
            .on_false(vec![NodeSpec::action("www.log.com/write").id("no1")]),
        NodeSpec::action("www.mail.com/send").id("ac2"),
    ])
}

#[test]
fn chain_follows_next_links_from_root() {
    let playbook = build_playbook(&sample(), &mut IdGenerator::new()).expect("valid playbook");
    let ids = playbook
        .chain(playbook.root())
        .map(|(_, node)| node.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["ac1", "if1", "ac2"]);
    assert_eq!(playbook.len(), 5);
}

#[test]
fn branches_are_separate_chains() {
    let playbook = build_playbook(&sample(), &mut IdGenerator::new()).expect("valid playbook");
    let if_ref = playbook.find("if1").expect("if1 is indexed");
    assert_eq!(playbook.node_type(if_ref), NodeType::If);
    let NodeKind::If(if_node) = &playbook.node(if_ref).kind else {
        panic!("if1 should be an if node");
    };
    let yes = if_node.yes.expect("onTrue chain");
    let no = if_node.no.expect("onFalse chain");
    assert_eq!(playbook.node(yes).id, "yes1");
    assert_eq!(playbook.node(no).id, "no1");
    assert_eq!(playbook.next(yes), None);
    assert_eq!(playbook.next(if_ref), playbook.find("ac2"));
}

#[test]
fn empty_document_has_no_root() {
    let playbook =
        build_playbook(&PlaybookDocument::default(), &mut IdGenerator::new()).expect("empty ok");
    assert!(playbook.is_empty());
    assert_eq!(playbook.root(), None);
    assert_eq!(playbook.chain(playbook.root()).count(), 0);
}
