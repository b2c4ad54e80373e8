use modal::{
    Content,
    dom::{
        Dom,
        memory::{Phase, Propagation},
    },
};
use test_helpers::{ACTIVE_CLASS, CallCounter, Harness};

#[test]
fn document_click_hides_by_default() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let el = h.element();
    let (modal, probe) = h.modal(Content::Node(el), h.options())?;

    let shown = modal.show();
    h.pool.run_until(shown);
    assert_eq!(probe.hide_calls(), 0);

    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(probe.hide_calls(), 1);
    assert!(!modal.is_active());
    assert!(!h.doc.has_class(&el, ACTIVE_CLASS));

    h.settle();
    assert!(!h.container_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn click_inside_element_is_ignored() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let el = h.element();
    let inner = h.doc.create_element("button");
    h.doc.append_child(&el, &inner)?;
    let (modal, probe) = h.modal(Content::Node(el), h.options())?;

    let shown = modal.show();
    h.pool.run_until(shown);

    h.doc.dispatch_click(inner);
    h.doc.dispatch_click(el);
    assert_eq!(probe.hide_calls(), 0);
    assert!(modal.is_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn on_click_outside_replaces_hide() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let outside = CallCounter::new();
    let (modal, probe) = h.modal(
        Content::Node(h.element()),
        h.options().on_click_outside(outside.callback()),
    )?;

    let shown = modal.show();
    h.pool.run_until(shown);
    assert_eq!(outside.count(), 0);

    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(probe.hide_calls(), 0);
    assert_eq!(outside.count(), 1);
    assert!(modal.is_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn click_is_seen_when_bubbling_is_stopped() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let outside = CallCounter::new();
    let (modal, _) = h.modal(
        Content::Node(h.element()),
        h.options().on_click_outside(outside.callback()),
    )?;
    let button = h.doc.create_element("button");
    h.doc.append_child(&h.doc.body_node(), &button)?;
    let _stopper =
        h.doc
            .add_click_listener(button, Phase::Bubble, |_| Propagation::Stop);

    let _ = modal.show();
    h.settle();

    assert!(!h.doc.dispatch_click(button));
    assert_eq!(outside.count(), 1);

    modal.destroy()?;
    Ok(())
}

#[test]
fn inactive_modal_ignores_outside_clicks() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let outside = CallCounter::new();
    let (modal, probe) = h.modal(
        Content::Node(h.element()),
        h.options().on_click_outside(outside.callback()),
    )?;

    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(outside.count(), 0);

    let _ = modal.show();
    h.settle();
    probe.set_active(false);
    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(outside.count(), 0);

    let _ = modal.hide();
    h.settle();
    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(outside.count(), 0);

    modal.destroy()?;
    Ok(())
}

#[test]
fn listener_is_released_on_hide_and_destroy() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, _) = h.modal(Content::Node(h.element()), h.options())?;
    assert_eq!(h.doc.listener_count(), 0);

    let _ = modal.show();
    assert_eq!(h.doc.listener_count(), 1);
    let _ = modal.show();
    assert_eq!(h.doc.listener_count(), 1, "showing twice keeps one listener");

    let _ = modal.hide();
    assert_eq!(h.doc.listener_count(), 0);
    h.settle();

    let _ = modal.show();
    h.settle();
    modal.destroy()?;
    assert_eq!(h.doc.listener_count(), 0);
    Ok(())
}

#[test]
fn dropped_modal_stops_reacting() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let el = h.element();
    let (modal, probe) = h.modal(Content::Node(el), h.options())?;

    let _ = modal.show();
    h.settle();
    drop(modal);

    h.doc.dispatch_click(h.doc.document_node());
    assert_eq!(probe.hide_calls(), 0);
    Ok(())
}
