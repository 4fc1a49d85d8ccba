use proptest::prelude::*;
use roadmap_layout::{build_connectors, ConnectorStyle, LayoutEngine, ObserveTarget, Rect, Trigger};
use roadmap_model::StepId;
use roadmap_test_utils::{grid_rect, FakeElement, FakePlatform, FakeSubscription};
use std::rc::Rc;

const WIDTH: f64 = 1000.0;

fn ids(list: &[&str]) -> Vec<StepId> {
    list.iter().map(|s| StepId::from(*s)).collect()
}

/// Engine with a mounted container and one grid-placed card per id
fn mounted(list: &[&str]) -> (LayoutEngine<Rc<FakePlatform>>, Rc<FakePlatform>, Vec<Rc<FakeElement>>) {
    let platform = FakePlatform::new(1280.0);
    let mut engine = LayoutEngine::new(Rc::clone(&platform));
    engine.mount_container(Some(FakeElement::new(Rect::new(20.0, 60.0, WIDTH, 3000.0))));

    let mut elements = Vec::new();
    for (i, id) in list.iter().enumerate() {
        let el = FakeElement::new(grid_rect(i, WIDTH, 120.0).translate(20.0, 60.0));
        engine.register(StepId::from(*id), Some(el.clone()));
        elements.push(el);
    }
    (engine, platform, elements)
}

#[test]
fn measurement_is_idempotent() {
    let (mut engine, _platform, _els) = mounted(&["a", "b", "c"]);
    let first = engine.sync(&ids(&["a", "b", "c"]), &Trigger::Mount);
    let second = engine.measure();
    let third = engine.measure();

    assert_eq!(*first, *second);
    assert!(second.approx_eq(&third, 1e-9));
}

#[test]
fn filtering_drops_stale_rectangles() {
    let (mut engine, _platform, _els) = mounted(&["a", "b", "c"]);
    engine.sync(&ids(&["a", "b", "c"]), &Trigger::Mount);

    let snap = engine.sync(&ids(&["b"]), &Trigger::VisibleSetChanged);
    assert_eq!(snap.ids().cloned().collect::<Vec<_>>(), ids(&["b"]));
}

#[test]
fn card_resize_is_picked_up_on_flush() {
    let (mut engine, _platform, els) = mounted(&["a", "b"]);
    engine.sync(&ids(&["a", "b"]), &Trigger::Mount);

    let mut grown = els[0].get();
    grown.height += 200.0;
    els[0].set(grown);

    engine.notify(Trigger::CardResize(StepId::from("a")));
    assert!(engine.flush());
    assert_eq!(engine.snapshot().get("a").map(|r| r.height), Some(320.0));
}

#[test]
fn scroll_keeps_container_relative_positions() {
    let (mut engine, platform, els) = mounted(&["a"]);
    let container = FakeElement::new(Rect::new(20.0, 60.0, WIDTH, 3000.0));
    engine.mount_container(Some(container.clone()));
    let before = engine.sync(&ids(&["a"]), &Trigger::Mount);

    // the whole page moves up by 500
    container.set(container.get().translate(0.0, -500.0));
    els[0].set(els[0].get().translate(0.0, -500.0));
    engine.notify(Trigger::WindowScroll);
    engine.flush();

    assert!(before.approx_eq(&engine.snapshot(), 1e-9));
    assert!(platform.observes(&FakeSubscription::Scroll));
}

#[test]
fn sync_subscribes_container_cards_scroll_and_resize() {
    let (mut engine, platform, _els) = mounted(&["a", "b", "c"]);
    engine.sync(&ids(&["a", "c"]), &Trigger::Mount);

    assert!(platform.observes(&FakeSubscription::Size(ObserveTarget::Container)));
    assert!(platform.observes(&FakeSubscription::Scroll));
    assert!(platform.observes(&FakeSubscription::Resize));
    assert!(platform.observes_card("a"));
    assert!(!platform.observes_card("b"));
    assert!(platform.observes_card("c"));
    assert_eq!(platform.active_count(), 5);
    assert_eq!(engine.subscription_count(), 5);
}

#[test]
fn resync_never_leaks_subscriptions() {
    let (mut engine, platform, _els) = mounted(&["a", "b", "c"]);
    for _ in 0..10 {
        engine.sync(&ids(&["a", "b", "c"]), &Trigger::ExpandedChanged);
        engine.sync(&ids(&["b"]), &Trigger::VisibleSetChanged);
    }
    assert_eq!(platform.active_count(), 4);
}

#[test]
fn late_registration_is_observed_and_measured() {
    let platform = FakePlatform::new(1280.0);
    let mut engine = LayoutEngine::new(Rc::clone(&platform));
    engine.mount_container(Some(FakeElement::new(Rect::new(0.0, 0.0, WIDTH, 2000.0))));
    engine.sync(&ids(&["a"]), &Trigger::Mount);
    assert!(engine.snapshot().is_empty());

    engine.register(StepId::from("a"), Some(FakeElement::new(grid_rect(0, WIDTH, 100.0))));
    assert!(platform.observes_card("a"));
    assert!(engine.flush());
    assert!(engine.snapshot().contains("a"));

    engine.register(StepId::from("a"), None);
    assert!(!platform.observes_card("a"));
    engine.measure();
    assert!(engine.snapshot().is_empty());
}

#[test]
fn teardown_and_drop_release_everything() {
    let (mut engine, platform, _els) = mounted(&["a", "b"]);
    engine.sync(&ids(&["a", "b"]), &Trigger::Mount);
    engine.teardown();
    assert_eq!(platform.active_count(), 0);
    assert!(!engine.is_observing());

    engine.sync(&ids(&["a", "b"]), &Trigger::Mount);
    assert!(platform.active_count() > 0);
    drop(engine);
    assert_eq!(platform.active_count(), 0);
}

#[test]
fn unmounting_container_freezes_snapshot() {
    let (mut engine, platform, _els) = mounted(&["a"]);
    let before = engine.sync(&ids(&["a"]), &Trigger::Mount);

    engine.mount_container(None);
    assert!(!platform.observes(&FakeSubscription::Size(ObserveTarget::Container)));
    let after = engine.measure();
    assert_eq!(*before, *after);
}

#[test]
fn filtering_while_unmounted_drops_hidden_steps() {
    let (mut engine, _platform, _els) = mounted(&["a", "b"]);
    let full = engine.sync(&ids(&["a", "b"]), &Trigger::Mount);
    assert_eq!(full.len(), 2);

    engine.mount_container(None);
    let narrowed = engine.sync(&ids(&["a"]), &Trigger::VisibleSetChanged);
    assert_eq!(narrowed.ids().map(StepId::as_str).collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(narrowed.get("a"), full.get("a"));
    assert_eq!(narrowed.container_width(), full.container_width());

    let none = engine.sync(&[], &Trigger::VisibleSetChanged);
    assert!(none.is_empty());
}

#[test]
fn replacing_a_card_element_moves_its_subscription() {
    let (mut engine, platform, els) = mounted(&["a", "b"]);
    engine.sync(&ids(&["a", "b"]), &Trigger::Mount);
    assert!(platform.observes_element(&els[0]));

    let replacement = FakeElement::new(grid_rect(0, WIDTH, 300.0).translate(20.0, 60.0));
    engine.register(StepId::from("a"), Some(replacement.clone()));

    assert!(platform.observes_element(&replacement));
    assert!(!platform.observes_element(&els[0]));
    assert_eq!(platform.card_subscriptions("a"), 1);
    assert!(platform.observes_element(&els[1]));

    engine.flush();
    assert_eq!(engine.snapshot().get("a").map(|r| r.height), Some(300.0));
}

#[test]
fn re_registering_the_same_element_keeps_its_subscription() {
    let (mut engine, platform, els) = mounted(&["a"]);
    engine.sync(&ids(&["a"]), &Trigger::Mount);
    let opened = platform.total_opened();

    engine.register(StepId::from("a"), Some(els[0].clone()));
    assert_eq!(platform.total_opened(), opened);
    assert_eq!(platform.card_subscriptions("a"), 1);
}

#[test]
fn container_subscription_watches_the_mounted_element() {
    let (mut engine, platform, _els) = mounted(&[]);
    engine.sync(&[], &Trigger::Mount);

    let container = FakeElement::new(Rect::new(0.0, 0.0, WIDTH, 800.0));
    engine.mount_container(Some(container.clone()));
    assert!(platform.observes_element(&container));
}

#[test]
fn narrow_viewport_is_delegated_to_platform() {
    let (engine, platform, _els) = mounted(&[]);
    assert!(!engine.is_narrow(820.0));
    platform.set_viewport_width(600.0);
    assert!(engine.is_narrow(820.0));
}

#[test]
fn scenario_query_matching_nothing_has_no_axis() {
    let (mut engine, _platform, _els) = mounted(&["a", "b", "c"]);
    engine.sync(&ids(&["a", "b", "c"]), &Trigger::Mount);

    let snap = engine.sync(&[], &Trigger::VisibleSetChanged);
    let set = build_connectors(&snap, engine.visible(), &ConnectorStyle::default());
    assert!(set.is_empty());
    assert!(set.extent.is_none());
}

proptest! {
    #[test]
    fn prop_snapshot_keys_are_visible(
        registered in prop::collection::vec(any::<bool>(), 6),
        passes in prop::collection::vec(prop::collection::vec(any::<bool>(), 6), 1..6),
    ) {
        let all = ["s0", "s1", "s2", "s3", "s4", "s5"];
        let platform = FakePlatform::new(1280.0);
        let mut engine = LayoutEngine::new(Rc::clone(&platform));
        engine.mount_container(Some(FakeElement::new(Rect::new(0.0, 0.0, WIDTH, 4000.0))));
        for (i, id) in all.iter().enumerate() {
            if registered[i] {
                engine.register(StepId::from(*id), Some(FakeElement::new(grid_rect(i, WIDTH, 90.0))));
            }
        }

        for mask in passes {
            let visible: Vec<StepId> = all
                .iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .map(|(id, _)| StepId::from(*id))
                .collect();
            let snap = engine.sync(&visible, &Trigger::VisibleSetChanged);

            for id in snap.ids() {
                prop_assert!(visible.contains(id));
            }
            let measured = snap.ids().count();
            let expected = visible.iter().filter(|id| engine.is_registered(id.as_str())).count();
            prop_assert_eq!(measured, expected);
        }
    }
}
