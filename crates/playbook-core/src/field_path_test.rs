use super::FieldPath;

#[test]
fn root_renders_as_dollar() {
    let path = FieldPath::root();
    assert!(path.is_root());
    assert_eq!(path.to_string(), "$");
}

#[test]
fn nested_node_path_renders_indexes_and_keys() {
    let path = FieldPath::root().index(2).key("onTrue").index(0).key("urn");
    assert_eq!(path.to_string(), "$[2].onTrue[0].urn");
    assert!(!path.is_root());
}

#[test]
fn builders_do_not_mutate_the_parent() {
    let parent = FieldPath::root().index(0);
    let _child = parent.key("body");
    assert_eq!(parent.to_string(), "$[0]");
}
