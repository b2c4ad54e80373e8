use modal::{Content, DomError, ModalError, ModalOptions, dom::Dom};
use test_helpers::Harness;

#[test]
fn added_to_and_removed_from_container() -> anyhow::Result<()> {
    let h = Harness::new();
    let el = h.element();
    let (modal, _) = h.modal(Content::Node(el), h.options())?;

    assert!(h.in_container(el));
    assert_eq!(*modal.el(), el);
    assert_eq!(*modal.container(), h.container);

    modal.destroy()?;
    assert!(!h.in_container(el));
    assert_eq!(h.doc.parent(&el), None);
    Ok(())
}

#[test]
fn body_is_the_default_container() -> anyhow::Result<()> {
    let h = Harness::new();
    let el = h.element();
    let (modal, _) = h.modal(Content::Node(el), ModalOptions::new())?;

    let body = h.doc.body_node();
    assert_eq!(h.doc.parent(&el), Some(body));

    modal.destroy()?;
    assert!(!h.doc.contains(&body, &el));
    Ok(())
}

#[test]
fn original_parent_gets_element_back() -> anyhow::Result<()> {
    let h = Harness::new();
    let parent = h.element();
    let el = h.element();
    h.doc.append_child(&parent, &el)?;

    let (modal, _) = h.modal(Content::Node(el), ModalOptions::new())?;
    assert_eq!(h.doc.parent(&el), Some(h.doc.body_node()));

    modal.destroy()?;
    assert_eq!(h.doc.parent(&el), Some(parent));
    assert!(!h.doc.contains(&h.doc.body_node(), &el));
    Ok(())
}

#[test]
fn element_already_in_container_stays_put() -> anyhow::Result<()> {
    let h = Harness::new();
    let wrapper = h.element();
    let el = h.element();
    h.doc.append_child(&h.container, &wrapper)?;
    h.doc.append_child(&wrapper, &el)?;

    let (_modal, _) = h.modal(Content::Node(el), h.options())?;
    assert_eq!(h.doc.parent(&el), Some(wrapper));
    assert_eq!(h.doc.children(h.container), vec![wrapper]);
    Ok(())
}

#[test]
fn markup_becomes_element_in_container() -> anyhow::Result<()> {
    let h = Harness::new();
    let (modal, _) = h.modal(
        Content::from(r#"  <div class="my-modal"><p>Are you sure?</p></div> "#),
        h.options(),
    )?;

    assert_eq!(
        h.doc.elements_by_class_name(h.container, "my-modal"),
        vec![*modal.el()]
    );
    assert_eq!(h.doc.text_content(*modal.el()), "Are you sure?");

    modal.destroy()?;
    assert!(h.doc.elements_by_class_name(h.container, "my-modal").is_empty());
    Ok(())
}

#[test]
fn markup_without_element_is_rejected() {
    let h = Harness::new();
    let result = h.modal(Content::from("just some text"), h.options());
    assert!(matches!(result, Err(ModalError::EmptyMarkup)));
}

#[test]
fn destroy_calls_lifecycle_destroy() -> anyhow::Result<()> {
    let h = Harness::new();
    let (modal, probe) = h.modal(Content::Node(h.element()), h.options())?;

    modal.destroy()?;
    assert_eq!(probe.destroy_calls(), 1);
    assert!(!modal.is_active());
    Ok(())
}

#[test]
fn failed_restore_still_releases_container_and_lifecycle() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let parent = h.element();
    let el = h.element();
    h.doc.append_child(&parent, &el)?;

    let (modal, probe) = h.modal(Content::Node(el), h.options())?;
    let _ = modal.show();
    h.settle();
    assert!(h.container_active());

    // The original parent now lives inside the element, so it cannot take
    // the element back
    h.doc.append_child(&el, &parent)?;

    let result = modal.destroy();
    assert!(matches!(
        result,
        Err(ModalError::Dom(DomError::HierarchyRequest))
    ));
    assert_eq!(probe.destroy_calls(), 1);
    assert!(!modal.is_active());
    assert!(!h.container_active());

    h.doc.dispatch_click(h.doc.body_node());
    assert_eq!(probe.hide_calls(), 0);
    Ok(())
}
