mod click_outside;
mod placement;
mod visibility;

use modal::{Content, Modal, ModalOptions, dom::memory::MemoryDocument};
use test_helpers::{CallCounter, Harness};

#[test]
fn css_transition_lifecycle() -> anyhow::Result<()> {
    let mut h = Harness::new();
    let shown = CallCounter::new();
    let hidden = CallCounter::new();
    let modal = Modal::new(
        h.doc.clone(),
        Content::Node(h.element()),
        h.options()
            .on_show(shown.callback())
            .on_hide(hidden.callback()),
        h.pool.spawner(),
    )?;

    let completion = modal.show();
    assert!(modal.is_active());
    assert_eq!(shown.count(), 0);
    h.pool.run_until(completion);
    assert_eq!(shown.count(), 1);

    let completion = modal.hide();
    assert!(!modal.is_active());
    h.pool.run_until(completion);
    assert_eq!(hidden.count(), 1);
    assert!(!h.container_active());

    modal.destroy()?;
    Ok(())
}

#[test]
fn memory_document_default_options() -> anyhow::Result<()> {
    let h = Harness::new();
    let doc = MemoryDocument::new();
    let modal = Modal::new(
        doc.clone(),
        Content::from("<div class='dialog'></div>"),
        ModalOptions::new(),
        h.pool.spawner(),
    )?;

    assert_eq!(modal.classes().active_class, "modal-active");
    assert_eq!(
        modal.classes().container_active_class,
        "modal-container-active"
    );
    assert_eq!(*modal.container(), doc.body_node());
    Ok(())
}
