use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn rejects_tags_it_cannot_create() {
    let mut host = MemoryHost::new();

    assert_eq!(
        host.create_element(""),
        Err(FiberError::UnsupportedElementType { tag: String::new() })
    );
    assert_eq!(
        host.create_element("my widget"),
        Err(FiberError::UnsupportedElementType {
            tag: "my widget".to_owned()
        })
    );
    assert!(host.create_element("custom-element").is_ok());
}

#[test]
fn append_and_remove_maintain_tree() {
    let mut host = MemoryHost::new();
    let root = host.create_container("root");
    let list = host.create_element("ul").unwrap();
    let item = host.create_element("li").unwrap();
    let text = host.create_text().unwrap();
    host.set_property(&text, NODE_VALUE, &PropValue::from("one"))
        .unwrap();

    host.append_child(&root, &list).unwrap();
    host.append_child(&list, &item).unwrap();
    host.append_child(&item, &text).unwrap();

    assert_eq!(host.tag_preorder(root), vec!["ul", "li", "#text"]);
    assert_eq!(host.text_content(root), "one");
    assert_eq!(host.parent(item), Some(list));

    host.remove_child(&root, &list).unwrap();

    assert!(host.children(root).is_empty());
    assert!(!host.contains(item), "removed subtree is released");
    assert_eq!(host.len(), 1);
}

#[test]
fn removing_a_non_child_is_reported() {
    let mut host = MemoryHost::new();
    let root = host.create_container("root");
    let stray = host.create_element("div").unwrap();

    assert_eq!(
        host.remove_child(&root, &stray),
        Err(FiberError::MissingNode { id: stray })
    );
    assert_eq!(
        host.set_property(&42, "id", &PropValue::from("x")),
        Err(FiberError::MissingNode { id: 42 })
    );
}

#[test]
fn dispatch_invokes_registered_listeners() {
    let mut host = MemoryHost::new();
    let button = host.create_container("button");
    let clicks = Rc::new(Cell::new(0));
    let listener = {
        let clicks = Rc::clone(&clicks);
        Listener::new(move || clicks.set(clicks.get() + 1))
    };

    host.add_listener(&button, "click", &listener).unwrap();
    assert_eq!(host.dispatch(button, "click"), Ok(1));
    assert_eq!(host.dispatch(button, "keydown"), Ok(0));

    host.remove_listener(&button, "click", &listener).unwrap();
    assert_eq!(host.dispatch(button, "click"), Ok(0));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn dump_tree_lists_properties_and_text() {
    let mut host = MemoryHost::new();
    let root = host.create_container("root");
    let heading = host.create_element("h1").unwrap();
    host.set_property(&heading, "id", &PropValue::from("title"))
        .unwrap();
    let text = host.create_text().unwrap();
    host.set_property(&text, NODE_VALUE, &PropValue::from("Hello"))
        .unwrap();
    host.append_child(&root, &heading).unwrap();
    host.append_child(&heading, &text).unwrap();

    assert_eq!(
        host.dump_tree(root),
        "[0] <root>\n  [1] <h1> id=title\n    [2] \"Hello\"\n"
    );
}

#[test]
fn released_ids_are_not_reused_and_log_drains() {
    let mut host = MemoryHost::new();
    let root = host.create_container("root");
    let first = host.create_element("p").unwrap();
    host.append_child(&root, &first).unwrap();
    host.remove_child(&root, &first).unwrap();

    let second = host.create_element("p").unwrap();

    assert_ne!(first, second);
    assert!(!host.contains(first));
    assert_eq!(host.len(), 2);
    assert_eq!(host.take_ops().len(), 4);
    assert!(host.ops().is_empty());
}
