use indexmap::IndexMap;
use netsim::{
    Circuit, Error, Inputs, NetlistConfig, PartObserver, PartState, Registry, BOUNDARY,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

fn register(registry: &Registry, widget: Option<&str>) -> netsim::Result<Circuit> {
    let mut c = NetlistConfig::new();
    c.boundary(&["d"], &["q"]);
    let d = c.net("d", 4, 0);
    let q = c.net("q", 4, 0);
    let reg = c.part("reg", "register");
    c.drive(BOUNDARY, "d", d);
    c.wire(BOUNDARY, "q", q);
    c.wire(reg, "d", d);
    c.drive(reg, "q", q);
    if let Some(widget) = widget {
        c.widget(reg, widget);
    }
    Circuit::from_config(&c, registry)
}

type Seen = Rc<RefCell<Vec<(IndexMap<String, u32>, u32)>>>;

#[test]
fn test_observer_sees_inputs_and_state() {
    let mut c = register(&Registry::with_primitives(), None).unwrap();
    let seen: Seen = Default::default();
    let sink = Rc::clone(&seen);
    let reg = c.part_by_name("reg").unwrap();
    c.attach_observer(reg, move |inputs: &Inputs<'_>, state: &PartState| {
        sink.borrow_mut().push((inputs.to_map(), state.get("q")))
    })
    .unwrap();

    c.update([("d", 3)]).unwrap();
    c.update([("d", 9)]).unwrap();
    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0["d"], 3);
        // Observers run after the outputs, so they see the updated state.
        assert_eq!(seen[0].1, 3);
        assert_eq!(seen[1].0["d"], 9);
        assert_eq!(seen[1].1, 9);
    }

    assert!(c.detach_observer(reg).unwrap().is_some());
    c.update([("d", 1)]).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert!(c.detach_observer(reg).unwrap().is_none());
}

#[test]
fn test_boundary_observer_never_runs() {
    let mut c = register(&Registry::with_primitives(), None).unwrap();
    let calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&calls);
    c.attach_observer(BOUNDARY, move |_: &Inputs<'_>, _: &PartState| {
        *sink.borrow_mut() += 1
    })
    .unwrap();
    c.update([("d", 1)]).unwrap();
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_attach_out_of_range() {
    let mut c = register(&Registry::with_primitives(), None).unwrap();
    let noop = |_: &Inputs<'_>, _: &PartState| {};
    assert!(matches!(
        c.attach_observer(netsim::PartIndex::new(4), noop),
        Err(Error::PartOutOfRange { len: 2, .. })
    ));
}

#[test]
fn test_widget_factory() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::with_primitives();
    let sink = Arc::clone(&log);
    registry.register_widget("scope", move |part| {
        let sink = Arc::clone(&sink);
        let part = part.to_owned();
        let observer: Box<dyn PartObserver> =
            Box::new(move |inputs: &Inputs<'_>, _: &PartState| {
                sink.lock().unwrap().push(format!("{}:{}", part, inputs["d"]))
            });
        observer
    });

    let mut c = register(&registry, Some("scope")).unwrap();
    c.update([("d", 5)]).unwrap();
    c.update([("d", 6)]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["reg:5", "reg:6"]);

    assert!(matches!(
        register(&registry, Some("seven_segment")),
        Err(Error::UnregisteredWidget { key, .. }) if key == "seven_segment"
    ));
}

#[test]
fn test_log_widget() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut c = register(&Registry::with_primitives(), Some("log")).unwrap();
    assert_eq!(c.update([("d", 2)]).unwrap()["q"], 0);
    assert_eq!(c.update([("d", 2)]).unwrap()["q"], 2);
}

#[test]
fn test_pull_style_scan() {
    let mut c = register(&Registry::with_primitives(), None).unwrap();
    c.update([("d", 7)]).unwrap();
    c.update([("d", 7)]).unwrap();
    let settled: Vec<_> = c.nets().map(|n| (n.name, n.value)).collect();
    assert_eq!(settled, vec![(Some("d"), Some(7)), (Some("q"), Some(7))]);
}

#[cfg(feature = "probes")]
#[test]
fn test_probe() {
    let mut c = register(&Registry::with_primitives(), None).unwrap();
    let q = c.net_by_name("q").unwrap();
    c.probe(q, "q").unwrap();
    assert!(matches!(
        c.probe(netsim::NetIndex::new(9), "x"),
        Err(Error::NetOutOfRange { .. })
    ));
    assert_eq!(c.update([("d", 1)]).unwrap()["q"], 0);
}
