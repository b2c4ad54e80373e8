use modal::{Content, dom::Dom};
use test_helpers::{ACTIVE_CLASS, CallCounter, Harness};

#[test]
fn container_class_added_before_show_resolves() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, probe) = h.modal(Content::Node(h.element()), h.options())?;
    probe.hold();

    let _ = modal.show();
    assert!(h.container_active());
    assert!(h.doc.has_class(modal.el(), ACTIVE_CLASS));
    h.settle();
    assert!(h.container_active());
    assert_eq!(probe.pending(), 1);

    modal.destroy()?;
    Ok(())
}

#[test]
fn container_class_removed_only_after_hide_resolves() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, probe) = h.modal(Content::Node(h.element()), h.options())?;

    let shown = modal.show();
    h.pool.run_until(shown);
    assert!(h.container_active());

    probe.hold();
    let hidden = modal.hide();
    h.settle();
    assert!(h.container_active(), "still active after the stack cleared");

    probe.release();
    h.pool.run_until(hidden);
    assert!(!h.container_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn repeated_hides_wait_for_completion() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let hidden = CallCounter::new();
    let (modal, probe) = h.modal(
        Content::Node(h.element()),
        h.options().on_hide(hidden.callback()),
    )?;
    let _ = modal.show();
    h.settle();

    probe.hold();
    let _ = modal.hide();
    let _ = modal.hide();
    h.settle();
    assert!(h.container_active());
    assert_eq!(hidden.count(), 0);
    assert_eq!(probe.pending(), 2);

    probe.release();
    h.settle();
    assert!(!h.container_active());
    assert_eq!(hidden.count(), 2);
    Ok(())
}

#[test]
fn destroy_removes_container_class() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, _) = h.modal(Content::Node(h.element()), h.options())?;

    let _ = modal.show();
    h.settle();
    assert!(h.container_active());

    modal.destroy()?;
    assert!(!h.container_active());
    Ok(())
}

#[test]
fn custom_active_class_removed_on_hide() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let el = h.element();
    let (modal, _) = h.modal(
        Content::Node(el),
        h.options().active_class("my-custom-module-active"),
    )?;

    let _ = modal.show();
    h.settle();
    assert!(h.doc.has_class(&el, "my-custom-module-active"));

    let _ = modal.hide();
    h.settle();
    assert!(!h.doc.has_class(&el, "my-custom-module-active"));
    assert!(!h.container_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn custom_active_class_removed_on_destroy_while_showing() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let el = h.element();
    let (modal, _) = h.modal(
        Content::Node(el),
        h.options().active_class("my-custom-module-active"),
    )?;

    let _ = modal.show();
    h.settle();
    modal.destroy()?;
    assert!(!h.doc.has_class(&el, "my-custom-module-active"));
    Ok(())
}

#[test]
fn shared_container_stays_active_until_last_modal_hides() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let options = || {
        h.options()
            .active_class("my-custom-modal-active")
            .container_active_class("my-custom-modal-container-active")
    };
    let (first, _) = h.modal(Content::Node(h.element()), options())?;
    let (second, _) = h.modal(Content::Node(h.element()), options())?;
    let container_active =
        |h: &Harness| h.doc.has_class(&h.container, "my-custom-modal-container-active");

    let _ = first.show();
    let _ = second.show();
    h.settle();
    assert!(container_active(&h));

    let _ = first.hide();
    h.settle();
    assert!(container_active(&h));
    assert!(second.is_active());

    let _ = second.hide();
    h.settle();
    assert!(!container_active(&h));

    first.destroy()?;
    second.destroy()?;
    Ok(())
}

#[test]
fn destroy_out_of_order_keeps_other_modal_active() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (first, _) = h.modal(Content::Node(h.element()), h.options())?;
    let (second, _) = h.modal(Content::Node(h.element()), h.options())?;

    let _ = first.show();
    let _ = second.show();
    h.settle();

    first.destroy()?;
    assert!(h.container_active());

    let _ = second.hide();
    h.settle();
    assert!(!h.container_active());
    Ok(())
}

#[test]
fn showing_one_modal_does_not_hide_another() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (first, first_probe) = h.modal(Content::Node(h.element()), h.options())?;
    let (second, _) = h.modal(Content::Node(h.element()), h.options())?;

    h.settle();
    assert_eq!(first_probe.hide_calls(), 0);
    let _ = second.show();
    h.settle();
    assert_eq!(first_probe.hide_calls(), 0);

    first.destroy()?;
    second.destroy()?;
    Ok(())
}

#[test]
fn lifecycle_is_called_once_per_operation() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, probe) = h.modal(Content::Node(h.element()), h.options())?;

    let _ = modal.show();
    assert_eq!(probe.setup_calls(), 1);
    assert_eq!(probe.show_calls(), 1);
    h.settle();

    let _ = modal.hide();
    assert_eq!(probe.hide_calls(), 1);
    h.settle();

    modal.destroy()?;
    assert_eq!(probe.destroy_calls(), 1);
    Ok(())
}

#[test]
fn hide_without_show_is_harmless() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let (modal, probe) = h.modal(Content::Node(h.element()), h.options())?;

    let _ = modal.hide();
    h.settle();
    assert_eq!(probe.hide_calls(), 1);
    assert!(!h.container_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn on_show_fires_after_show_resolves() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let shown = CallCounter::new();
    let (modal, probe) = h.modal(
        Content::Node(h.element()),
        h.options().on_show(shown.callback()),
    )?;
    probe.hold();

    let completion = modal.show();
    assert_eq!(shown.count(), 0);
    h.settle();
    assert_eq!(shown.count(), 0, "not triggered after the stack cleared");

    probe.release();
    h.pool.run_until(completion);
    assert_eq!(shown.count(), 1);

    modal.destroy()?;
    Ok(())
}

#[test]
fn on_hide_fires_after_hide_resolves() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let hidden = CallCounter::new();
    let (modal, probe) = h.modal(
        Content::Node(h.element()),
        h.options().on_hide(hidden.callback()),
    )?;
    probe.hold();

    let _ = modal.hide();
    assert_eq!(hidden.count(), 0);
    h.settle();
    assert_eq!(hidden.count(), 0);

    probe.release();
    h.settle();
    assert_eq!(hidden.count(), 1);

    modal.destroy()?;
    Ok(())
}

#[test]
fn callbacks_fire_even_if_completion_is_dropped() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let shown = CallCounter::new();
    let (modal, _) = h.modal(
        Content::Node(h.element()),
        h.options().on_show(shown.callback()),
    )?;

    drop(modal.show());
    h.settle();
    assert_eq!(shown.count(), 1);
    Ok(())
}
