use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::prelude::*;
use crate::property::values_equal;
use crate::scope::current_scope;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn counter<T: 'static>() -> (Rc<Cell<usize>>, Listener<T>) {
    let hits = Rc::new(Cell::new(0));
    let listener = Listener::new({
        let hits = hits.clone();
        move |_: &PropertyChange<T>| hits.set(hits.get() + 1)
    });
    (hits, listener)
}

#[test]
fn test_read_after_write() {
    init_logging();
    let p = property(42);
    assert_eq!(p.get(), 42);

    p.set(100);
    assert_eq!(p.get(), 100);

    p.update(|v| *v += 1);
    assert_eq!(p.get(), 101);
}

#[test]
fn test_with_reads_in_place() {
    init_logging();
    let p = property(vec![1, 2, 3]);
    assert_eq!(p.with(|v| v.len()), 3);
    assert_eq!(p.with(|v| v.iter().sum::<i32>()), 6);
}

#[test]
fn test_equal_assignment_is_silent() {
    init_logging();
    let p = property(String::from("a"));
    let (hits, listener) = counter();
    p.add_listener(&listener);

    p.set(p.get());
    assert_eq!(hits.get(), 0);

    p.set("b".into());
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_nan_assignment_is_silent() {
    init_logging();
    let p = property(f64::NAN);
    let (hits, listener) = counter();
    p.add_listener(&listener);

    p.set(f64::NAN);
    assert_eq!(hits.get(), 0);

    p.set(1.0);
    assert_eq!(hits.get(), 1);
    assert!(values_equal(&f64::NAN, &f64::NAN));
    assert!(!values_equal(&f64::NAN, &1.0));
}

#[test]
fn test_nullable_values() {
    init_logging();
    let p: Property<Option<&str>> = property(None);
    let (hits, listener) = counter();
    p.add_listener(&listener);

    p.set(None);
    assert_eq!(hits.get(), 0);
    p.set(Some("x"));
    p.set(None);
    assert_eq!(hits.get(), 2);
}

#[test]
fn test_change_snapshot() {
    init_logging();
    let p = property(1);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _sub = p.subscribe({
        let seen = seen.clone();
        move |c| seen.borrow_mut().push(c.clone())
    });

    p.set(2);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].source, p.id());
    assert_eq!((seen[0].old, seen[0].new), (1, 2));
}

#[test]
fn test_listeners_fire_in_registration_order() {
    init_logging();
    let p = property(0);
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        p.add_listener(&Listener::new(move |_| order.borrow_mut().push(tag)));
    }

    p.set(1);
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_duplicate_listener_fires_twice() {
    init_logging();
    let p = property(0);
    let (hits, listener) = counter();
    p.add_listener(&listener);
    p.add_listener(&listener);
    assert_eq!(p.listener_count(), 2);

    p.set(1);
    assert_eq!(hits.get(), 2);

    // one occurrence per removal
    p.remove_listener(&listener);
    p.set(2);
    assert_eq!(hits.get(), 3);
}

#[test]
fn test_remove_absent_listener_is_noop() {
    init_logging();
    let p = property(0);
    let (_, never_added) = counter::<i32>();
    p.remove_listener(&never_added);
    assert_eq!(p.listener_count(), 0);
}

#[test]
fn test_listener_may_unsubscribe_itself() {
    init_logging();
    let p = property(0);
    let hits = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<Listener<i32>>>> = Rc::new(RefCell::new(None));
    let listener = Listener::new({
        let p = p.clone();
        let hits = hits.clone();
        let slot = slot.clone();
        move |_| {
            hits.set(hits.get() + 1);
            if let Some(me) = slot.borrow().as_ref() {
                p.remove_listener(me);
            }
        }
    });
    *slot.borrow_mut() = Some(listener.clone());
    p.add_listener(&listener);

    p.set(1);
    p.set(2);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_subscribe_dispose_twice() {
    init_logging();
    let p = property(0);
    let hits = Rc::new(Cell::new(0));
    let sub = p.subscribe({
        let hits = hits.clone();
        move |_| hits.set(hits.get() + 1)
    });

    p.set(1);
    sub.dispose();
    sub.dispose();
    assert!(sub.is_disposed());
    p.set(2);
    assert_eq!(hits.get(), 1);
    assert_eq!(p.listener_count(), 0);
}

#[test]
fn test_binding_initial_sync() {
    init_logging();
    let a = property(7);
    let b = property(0);

    let _binding = Binder::from(&a).to(&b);
    assert_eq!(b.get(), 7);
}

#[test]
fn test_binding_to_many_slaves_notifies_each_once() {
    init_logging();
    let a = property(1);
    let b = property(0);
    let c = property(0);
    let _binding = Binder::from(&a)
        .to_all([b.clone(), c.clone()])
        .expect("two slaves");

    let (b_hits, b_listener) = counter();
    let (c_hits, c_listener) = counter();
    b.add_listener(&b_listener);
    c.add_listener(&c_listener);

    a.set(5);
    assert_eq!((b.get(), c.get()), (5, 5));
    assert_eq!((b_hits.get(), c_hits.get()), (1, 1));
}

#[test]
fn test_slave_already_holding_value_stays_silent() {
    init_logging();
    let a = property(3);
    let b = property(3);
    let (hits, listener) = counter();
    b.add_listener(&listener);

    let _binding = Binder::from(&a).to(&b);
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_bidirectional_bindings_terminate() {
    init_logging();
    let a = property(0);
    let b = property(0);
    let _ab = Binder::from(&a).to(&b);
    let _ba = Binder::from(&b).to(&a);

    let (a_hits, a_listener) = counter();
    let (b_hits, b_listener) = counter();
    a.add_listener(&a_listener);
    b.add_listener(&b_listener);

    a.set(10);
    assert_eq!((a.get(), b.get()), (10, 10));
    assert_eq!((a_hits.get(), b_hits.get()), (1, 1));

    b.set(20);
    assert_eq!((a.get(), b.get()), (20, 20));
    assert_eq!((a_hits.get(), b_hits.get()), (2, 2));
}

#[test]
fn test_bidirectional_bindings_settle_on_nan() {
    init_logging();
    let a = property(0.0_f64);
    let b = property(0.0_f64);
    let _ab = Binder::from(&a).to(&b);
    let _ba = Binder::from(&b).to(&a);

    let (a_hits, a_listener) = counter();
    let (b_hits, b_listener) = counter();
    a.add_listener(&a_listener);
    b.add_listener(&b_listener);

    a.set(f64::NAN);
    assert!(a.get().is_nan() && b.get().is_nan());
    assert_eq!((a_hits.get(), b_hits.get()), (1, 1));

    b.set(f64::NAN);
    assert_eq!((a_hits.get(), b_hits.get()), (1, 1));

    b.set(1.5);
    assert_eq!((a.get(), b.get()), (1.5, 1.5));
    assert_eq!((a_hits.get(), b_hits.get()), (2, 2));
}

#[test]
fn test_bidirectional_helper() {
    init_logging();
    let a = property(String::from("left"));
    let b = property(String::new());
    let binding = Binder::bidirectional(&a, &b);
    assert_eq!(b.get(), "left");
    assert_eq!((binding.master_count(), binding.slave_count()), (2, 2));

    b.set("right".into());
    assert_eq!(a.get(), "right");

    binding.dispose();
    a.set("detached".into());
    assert_eq!(b.get(), "right");
}

#[test]
fn test_transform_binding() {
    init_logging();
    let n = property(2);
    let label = property(String::new());
    let _binding = Binder::from(&n)
        .transform(|v: &i32| format!("n = {v}"))
        .to(&label);
    assert_eq!(label.get(), "n = 2");

    n.set(3);
    assert_eq!(label.get(), "n = 3");
}

#[test]
fn test_transform_chain() {
    init_logging();
    let n = property(4);
    let out = property(String::new());
    let _binding = Binder::from(&n)
        .transform(|v: &i32| v * 10)
        .then(|v: &i32| v.to_string())
        .to(&out);
    assert_eq!(out.get(), "40");
}

#[test]
fn test_pointwise_transform_over_many_masters() {
    init_logging();
    let a = property(1);
    let b = property(2);
    let out = property(0);
    let _binding = Binder::from_all([a.clone(), b.clone()])
        .expect("masters")
        .transform(|v: &i32| v * 100)
        .to(&out);
    // declaration order: last master wins the initial sync
    assert_eq!(out.get(), 200);

    a.set(3);
    assert_eq!(out.get(), 300);
}

#[test]
fn test_and_aggregate_recomputes_once_per_change() {
    init_logging();
    let flags: Vec<Property<bool>> = [true, false, false].into_iter().map(property).collect();
    let all = property(true);
    let runs = Rc::new(Cell::new(0));

    let _binding = Binder::from_all(flags.iter().cloned())
        .expect("masters")
        .aggregate({
            let runs = runs.clone();
            move |xs: &[bool]| {
                runs.set(runs.get() + 1);
                xs.iter().all(|x| *x)
            }
        })
        .expect("no arity")
        .to(&all);
    assert!(!all.get());
    assert_eq!(runs.get(), 1);

    flags[1].set(true);
    assert!(!all.get());
    flags[2].set(true);
    assert!(all.get());
    assert_eq!(runs.get(), 3);
}

struct Difference;

impl Aggregator<i32, i32> for Difference {
    fn aggregate(&self, inputs: &[i32]) -> i32 {
        inputs[0] - inputs[1]
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}

#[test]
fn test_aggregate_arity_checked_at_construction() {
    init_logging();
    let a = property(1);
    let err = Binder::from(&a).aggregate(Difference).err();
    assert_eq!(
        err,
        Some(BindError::ArityMismatch {
            expected: 2,
            actual: 1
        })
    );

    let b = property(10);
    let c = property(4);
    let out = property(0);
    let _binding = Binder::from_all([b.clone(), c.clone()])
        .expect("masters")
        .aggregate(Difference.then_map(|d: &i32| d * 2))
        .expect("arity 2")
        .to(&out);
    assert_eq!(out.get(), 12);
    c.set(0);
    assert_eq!(out.get(), 20);
}

#[test]
fn test_empty_masters_and_slaves_rejected() {
    init_logging();
    let none: Vec<Property<i32>> = Vec::new();
    assert_eq!(Binder::from_all(none).err(), Some(BindError::NoMasters));

    let a = property(1);
    let no_slaves: Vec<Property<i32>> = Vec::new();
    assert_eq!(
        Binder::from(&a).to_all(no_slaves).err(),
        Some(BindError::NoSlaves)
    );
    assert_eq!(a.listener_count(), 0);
}

#[test]
fn test_binding_dispose_detaches_and_is_idempotent() {
    init_logging();
    let a = property(1);
    let b = property(0);
    let binding = Binder::from(&a).to(&b);
    assert_eq!(a.listener_count(), 1);

    binding.dispose();
    binding.dispose();
    assert!(binding.is_disposed());
    assert_eq!(a.listener_count(), 0);

    a.set(2);
    assert_eq!(b.get(), 1);
}

#[test]
fn test_aggregate_dispose_detaches_masters() {
    init_logging();
    let a = property(1);
    let b = property(2);
    let sum = property(0);
    let binding = Binder::from_all([a.clone(), b.clone()])
        .expect("masters")
        .aggregate(|xs: &[i32]| xs.iter().sum::<i32>())
        .expect("no arity")
        .to(&sum);
    assert_eq!(sum.get(), 3);

    binding.dispose();
    assert_eq!((a.listener_count(), b.listener_count()), (0, 0));
    a.set(10);
    assert_eq!(sum.get(), 3);
}

#[test]
fn test_dropped_binding_handle_keeps_edge_alive() {
    init_logging();
    let a = property(1);
    let b = property(0);
    drop(Binder::from(&a).to(&b));
    a.set(2);
    assert_eq!(b.get(), 2);
}

/// Registers a listener on `p` that pulls any value above `limit` back down.
fn clamp_above(p: &Property<i32>, limit: i32) -> Listener<i32> {
    let target = p.clone();
    let listener = Listener::new(move |c: &PropertyChange<i32>| {
        if c.new > limit {
            target.set(limit);
        }
    });
    p.add_listener(&listener);
    listener
}

#[test]
fn test_binding_follows_master_corrected_during_dispatch() {
    init_logging();
    let a = property(0);
    let b = property(0);
    let clamp = clamp_above(&a, 10);
    let _binding = Binder::from(&a).to(&b);

    a.set(15);
    assert_eq!((a.get(), b.get()), (10, 10));

    a.set(7);
    assert_eq!((a.get(), b.get()), (7, 7));
    a.remove_listener(&clamp);
}

#[test]
fn test_composite_follows_source_corrected_during_dispatch() {
    init_logging();
    let a = property(0);
    let clamp = clamp_above(&a, 10);
    let composite = CompositeProperty::new([a.clone()]).expect("sources");
    let last = Rc::new(RefCell::new(Vec::new()));
    composite.add_listener(&Listener::new({
        let last = last.clone();
        move |c: &PropertyChange<Vec<i32>>| *last.borrow_mut() = c.new.clone()
    }));

    a.set(15);
    assert_eq!(composite.get(), vec![a.get()]);
    assert_eq!(*last.borrow(), vec![10]);

    composite.dispose();
    a.remove_listener(&clamp);
}

#[test]
fn test_composite_publishes_full_sequences() {
    init_logging();
    let a = property(1);
    let b = property(2);
    let composite = CompositeProperty::new([a.clone(), b.clone()]).expect("sources");
    assert_eq!(composite.get(), vec![1, 2]);

    let seen = Rc::new(RefCell::new(Vec::new()));
    composite.add_listener(&Listener::new({
        let seen = seen.clone();
        move |c: &PropertyChange<Vec<i32>>| seen.borrow_mut().push((c.old.clone(), c.new.clone()))
    }));

    a.set(5);
    b.set(6);
    assert_eq!(
        *seen.borrow(),
        vec![(vec![1, 2], vec![5, 2]), (vec![5, 2], vec![5, 6])]
    );
}

#[test]
fn test_composite_one_notification_per_source_change() {
    init_logging();
    let sources: Vec<Property<i32>> = (0..3).map(property).collect();
    let composite = CompositeProperty::new(sources.iter().cloned()).expect("sources");
    let (hits, listener) = counter();
    composite.add_listener(&listener);

    for (i, s) in sources.iter().enumerate() {
        s.set(10 + i as i32);
    }
    assert_eq!(hits.get(), 3);
    assert_eq!(composite.get(), vec![10, 11, 12]);
    assert_eq!(composite.value_at(1), Some(11));
    assert_eq!(composite.value_at(3), None);
}

#[test]
fn test_composite_rejects_no_sources_and_disposes() {
    init_logging();
    let none: Vec<Property<u8>> = Vec::new();
    assert_eq!(
        CompositeProperty::new(none).err(),
        Some(BindError::EmptyComposite)
    );

    let a = property(1u8);
    let composite = CompositeProperty::new([a.clone()]).expect("one source");
    assert_eq!(a.listener_count(), 1);
    composite.dispose();
    composite.dispose();
    assert_eq!(a.listener_count(), 0);
    a.set(9);
    assert_eq!(composite.get(), vec![1]);
}

#[test]
fn test_read_only_wrapper_binds_as_master() {
    init_logging();
    let a = property(1);
    let view = a.read_only();
    let b = property(0);
    let _binding = Binder::from(&view).to(&b);
    a.set(2);
    assert_eq!(b.get(), 2);
    assert_eq!(ReadableProperty::id(&view), a.id());
}

#[test]
fn test_write_only_wrapper_as_slave() {
    init_logging();
    let a = property(1);
    let b = property(0);
    let _binding = Binder::from(&a).to(&b.write_only());
    a.set(3);
    assert_eq!(b.get(), 3);
}

#[test]
fn test_scope_collects_bindings() {
    init_logging();
    let a = property(1);
    let b = property(0);
    let c = property(0);
    let scope = Scope::new();

    scope.run(|| {
        assert!(current_scope().is_some());
        let _ = Binder::from(&a).to(&b);
        let _ = Binder::from(&a).to(&c);
    });
    assert!(current_scope().is_none());
    assert_eq!(scope.disposer_count(), 2);
    assert_eq!(a.listener_count(), 2);

    scope.dispose();
    scope.dispose();
    assert_eq!(a.listener_count(), 0);
}

#[test]
fn test_scope_children_dispose_first() {
    init_logging();
    let order = Rc::new(RefCell::new(Vec::new()));
    let parent = Scope::new();
    let child = parent.child();

    for (scope, tag) in [(&parent, "parent"), (&child, "child")] {
        let order = order.clone();
        scope.add_disposer(Dispose::new(move || order.borrow_mut().push(tag)));
    }

    parent.dispose();
    assert_eq!(*order.borrow(), vec!["child", "parent"]);
    assert!(child.is_disposed());
}

#[test]
fn test_scope_not_disposed_on_drop() {
    init_logging();
    let cleaned_up = Rc::new(Cell::new(false));
    {
        let scope = Scope::new();
        let cleaned_up = cleaned_up.clone();
        scope.add_disposer(Dispose::new(move || cleaned_up.set(true)));
    }
    assert!(!cleaned_up.get());
}

#[test]
fn test_list_structural_changes() {
    init_logging();
    let list = ObservableList::from_vec(vec!['a', 'b']);
    let changes = Rc::new(RefCell::new(Vec::new()));
    let _sub = list.subscribe_changes({
        let changes = changes.clone();
        move |c| changes.borrow_mut().push(c.kind.clone())
    });

    list.push('c');
    assert!(list.insert(0, 'z'));
    assert!(!list.insert(10, 'q'));
    assert_eq!(list.remove(1), Some('a'));
    assert_eq!(list.remove(10), None);
    assert_eq!(list.replace(0, 'y'), Some('z'));
    assert_eq!(list.replace(0, 'y'), Some('y'));
    list.clear();
    list.clear();

    assert_eq!(
        *changes.borrow(),
        vec![
            ListChangeKind::Added {
                start: 2,
                items: vec!['c']
            },
            ListChangeKind::Added {
                start: 0,
                items: vec!['z']
            },
            ListChangeKind::Removed {
                start: 1,
                items: vec!['a']
            },
            ListChangeKind::Replaced {
                start: 0,
                removed: vec!['z'],
                added: vec!['y']
            },
            ListChangeKind::Removed {
                start: 0,
                items: vec!['y', 'b', 'c']
            },
        ]
    );
    assert!(list.is_empty());
}

#[test]
fn test_list_extend_appends_one_change() {
    init_logging();
    let list = ObservableList::from_vec(vec!['a']);
    let (hits, listener) = counter::<Vec<char>>();
    list.add_listener(&listener);
    let changes = Rc::new(RefCell::new(Vec::new()));
    let _sub = list.subscribe_changes({
        let changes = changes.clone();
        move |c| changes.borrow_mut().push(c.kind.clone())
    });

    list.extend(['b', 'c']);
    list.extend(Vec::new());
    assert_eq!(
        *changes.borrow(),
        vec![ListChangeKind::Added {
            start: 1,
            items: vec!['b', 'c']
        }]
    );
    assert_eq!(hits.get(), 1);
    assert_eq!(list.to_vec(), vec!['a', 'b', 'c']);
}

#[test]
fn test_list_set_all_kinds() {
    init_logging();
    let list = ObservableList::new();
    let starts = Rc::new(RefCell::new(Vec::new()));
    list.add_list_listener(&ListListener::new({
        let starts = starts.clone();
        move |c: &ListChange<i32>| {
            let kind = match &c.kind {
                ListChangeKind::Added { .. } => "added",
                ListChangeKind::Removed { .. } => "removed",
                ListChangeKind::Replaced { .. } => "replaced",
            };
            starts.borrow_mut().push((kind, c.start()));
        }
    }));

    list.set_all(vec![1, 2]);
    list.set_all(vec![1, 2]);
    list.set_all(vec![3]);
    list.set_all(Vec::new());
    assert_eq!(
        *starts.borrow(),
        vec![("added", 0), ("replaced", 0), ("removed", 0)]
    );
}

#[test]
fn test_list_as_binding_master_and_slave() {
    init_logging();
    let list = ObservableList::from_vec(vec![1, 2]);
    let total = property(0);
    let _sum = Binder::from(&list)
        .transform(|xs: &Vec<i32>| xs.iter().sum::<i32>())
        .to(&total);
    assert_eq!(total.get(), 3);

    list.push(4);
    assert_eq!(total.get(), 7);

    let mirror: ObservableList<i32> = ObservableList::new();
    let _copy = Binder::from(&list).to(&mirror);
    assert_eq!(mirror.to_vec(), vec![1, 2, 4]);
    list.remove(0);
    assert_eq!(mirror.to_vec(), vec![2, 4]);
}

#[test]
fn test_marshalled_values_applied_on_drain() {
    init_logging();
    let p = property(0);
    let marshalled = Marshalled::new(p.clone());
    let sender = marshalled.sender();

    std::thread::scope(|s| {
        for v in 1..=3 {
            let sender = sender.clone();
            s.spawn(move || sender.post(v));
        }
    });
    assert_eq!(sender.pending(), 3);
    assert_eq!(p.get(), 0);

    let (hits, listener) = counter();
    p.add_listener(&listener);
    assert_eq!(marshalled.drain(), 3);
    assert_eq!(hits.get(), 3);
    assert_eq!(sender.pending(), 0);
    assert_eq!(marshalled.drain(), 0);
}
