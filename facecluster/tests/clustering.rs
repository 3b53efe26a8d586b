use std::collections::BTreeSet;

use facecluster::{
    Classifier, ClusterStore, Config, Decision, Embedding, FileStore, MemoryStore, Observation,
    PersonId, SnapshotStore, load_store,
};

const DIM: usize = 4;

/// Deterministic stream: a few identities with jitter, plus strangers.
fn stream(n: usize) -> Vec<Observation> {
    let centers = [
        [0.0, 0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0, 0.0],
        [0.0, 2.0, 0.0, 0.0],
        [0.0, 0.0, 2.0, 2.0],
    ];
    let mut state: u64 = 7;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f32) / (u32::MAX >> 1) as f32
    };
    (0..n)
        .map(|i| {
            let pick = (next() * 5.0) as usize;
            let v: Vec<f32> = if pick < centers.len() {
                centers[pick].iter().map(|c| c + (next() - 0.5) * 0.3).collect()
            } else {
                (0..DIM).map(|_| next() * 10.0 + 5.0).collect()
            };
            Observation::new(i as f64 * 0.5, format!("obs{i:03}"), Embedding::new(v).unwrap())
        })
        .collect()
}

fn classifier(threshold: f32) -> Classifier {
    Classifier::new(Config { dim: DIM, threshold }).unwrap()
}

fn all_labels(store: &ClusterStore) -> Vec<String> {
    let mut v: Vec<String> = store
        .persons()
        .iter()
        .flat_map(|p| p.observations())
        .chain(store.unresolved())
        .map(|o| o.label.clone())
        .collect();
    v.sort();
    v
}

fn obs(label: &str, v: [f32; DIM]) -> Observation {
    Observation::new(0.0, label, Embedding::new(v.to_vec()).unwrap())
}

#[test]
fn every_prefix_partitions_observations() {
    let c = classifier(0.5);
    let mut store = c.new_store();
    let mut fed = Vec::new();

    for o in stream(200) {
        fed.push(o.label.clone());
        c.classify(&mut store, o).unwrap();

        let mut expected = fed.clone();
        expected.sort();
        assert_eq!(all_labels(&store), expected, "after {} observations", fed.len());
        assert!(store.persons().iter().all(|p| p.len() >= 2));
    }
    assert!(store.person_count() >= 4, "got {}", store);
}

#[test]
fn person_ids_are_unique_and_increasing() {
    let c = classifier(0.5);
    let mut store = c.new_store();
    let mut created = Vec::new();
    for o in stream(200) {
        if let Decision::Created(id) = c.classify(&mut store, o).unwrap() {
            created.push(id);
        }
    }
    assert!(created.windows(2).all(|w| w[0] < w[1]));
    let ids: Vec<PersonId> = store.persons().iter().map(|p| p.id()).collect();
    assert_eq!(ids, created);
}

#[test]
fn bridge_scenario() {
    // d(A,B) < t and d(A,C) >= t, but C is still within t of B.
    let c = classifier(1.0);
    let mut store = c.new_store();
    let a = obs("A", [0.0, 0.0, 0.0, 0.0]);
    let b = obs("B", [0.6, 0.0, 0.0, 0.0]);
    let cc = obs("C", [1.2, 0.0, 0.0, 0.0]);

    assert_eq!(c.classify(&mut store, a).unwrap(), Decision::Deferred);
    assert_eq!(store.unresolved()[0].label, "A");

    assert_eq!(c.classify(&mut store, b).unwrap(), Decision::Created(PersonId(1)));
    let members: Vec<&str> = store.persons()[0]
        .observations()
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(members, ["A", "B"]);
    assert!(store.unresolved().is_empty());

    // C is 0.6 from B but 1.2 from the representative A.
    assert_eq!(c.classify(&mut store, cc).unwrap(), Decision::Deferred);
    assert_eq!(store.unresolved_count(), 1);
    assert_eq!(store.unresolved()[0].label, "C");
}

#[test]
fn bridge_scenario_c_far_from_both() {
    // d(A,B) = 0.6 < t, d(B,C) = 1.1 >= t, d(A,C) = 1.7 >= t.
    let c = classifier(1.0);
    let mut store = c.new_store();

    assert_eq!(c.classify(&mut store, obs("A", [0.0, 0.0, 0.0, 0.0])).unwrap(), Decision::Deferred);
    assert_eq!(store.unresolved_count(), 1);
    assert_eq!(
        c.classify(&mut store, obs("B", [0.6, 0.0, 0.0, 0.0])).unwrap(),
        Decision::Created(PersonId(1))
    );
    assert!(store.unresolved().is_empty());

    assert_eq!(c.classify(&mut store, obs("C", [1.7, 0.0, 0.0, 0.0])).unwrap(), Decision::Deferred);
    assert_eq!(store.person_count(), 1);
    assert_eq!(store.persons()[0].len(), 2);
    assert_eq!(store.unresolved_count(), 1);
    assert_eq!(store.unresolved()[0].label, "C");
}

#[test]
fn representative_stays_pinned() {
    let c = classifier(1.0);
    let mut store = c.new_store();
    c.classify(&mut store, obs("a", [0.0; DIM])).unwrap();
    c.classify(&mut store, obs("b", [0.5, 0.0, 0.0, 0.0])).unwrap();
    // Walk more matches towards +x; the representative must not follow.
    for i in 0..20 {
        let d = c
            .classify(&mut store, obs(&format!("m{i}"), [0.9, 0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(d, Decision::Matched(PersonId(1)));
    }
    assert_eq!(store.persons()[0].representative().as_slice(), &[0.0; DIM]);
    assert_eq!(store.persons()[0].len(), 22);

    // 1.0 from the founding face: a non-match despite the many faces at 0.9.
    let d = c.classify(&mut store, obs("far", [1.0, 0.0, 0.0, 0.0])).unwrap();
    assert_eq!(d, Decision::Deferred);
}

#[test]
fn decisions_are_reproducible() {
    let run = || {
        let c = classifier(0.5);
        let mut store = c.new_store();
        stream(150)
            .into_iter()
            .map(|o| c.classify(&mut store, o).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn equidistant_persons_pick_lowest_id() {
    let c = classifier(1.0);
    let mut store = c.new_store();
    for (l, x) in [("a1", -0.6), ("a2", -0.6), ("b1", 0.6), ("b2", 0.6)] {
        c.classify(&mut store, obs(l, [x, 0.0, 0.0, 0.0])).unwrap();
    }
    assert_eq!(store.person_count(), 2);
    for i in 0..5 {
        let d = c.classify(&mut store, obs(&format!("q{i}"), [0.0; DIM])).unwrap();
        assert_eq!(d, Decision::Matched(PersonId(1)));
    }
}

fn check_resume(store_impl: &dyn SnapshotStore) {
    let c = classifier(0.5);
    let all = stream(160);
    let (head, tail) = all.split_at(80);

    let mut live = c.new_store();
    for o in head {
        c.classify(&mut live, o.clone()).unwrap();
    }
    store_impl.save(&live.snapshot()).unwrap();
    let mut restored = load_store(store_impl, &c).unwrap();

    assert_eq!(restored.persons(), live.persons());
    assert_eq!(restored.unresolved(), live.unresolved());

    for o in tail {
        let a = c.classify(&mut live, o.clone()).unwrap();
        let b = c.classify(&mut restored, o.clone()).unwrap();
        assert_eq!(a, b, "diverged at {}", o.label);
    }
    assert_eq!(all_labels(&live), all_labels(&restored));
}

#[test]
fn save_then_load_preserves_behavior_in_memory() {
    check_resume(&MemoryStore::new());
}

#[test]
fn save_then_load_preserves_behavior_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    check_resume(&FileStore::new(dir.path()));
}

#[test]
fn threshold_boundary_is_exclusive() {
    let c = classifier(0.5);
    let mut store = c.new_store();
    // Unresolved path: exactly 0.5 apart.
    c.classify(&mut store, obs("u1", [0.0; DIM])).unwrap();
    assert_eq!(
        c.classify(&mut store, obs("u2", [0.0, 0.5, 0.0, 0.0])).unwrap(),
        Decision::Deferred
    );

    // Person path: found a person at x = 10, then probe exactly 0.5 away.
    c.classify(&mut store, obs("p1", [10.0, 0.0, 0.0, 0.0])).unwrap();
    let id = c
        .classify(&mut store, obs("p2", [10.0, 0.0, 0.0, 0.0]))
        .unwrap()
        .person()
        .unwrap();
    let before = store.person(id).unwrap().len();
    c.classify(&mut store, obs("edge", [10.0, 0.0, 0.0, 0.5])).unwrap();
    assert_eq!(store.person(id).unwrap().len(), before);

    let labels: BTreeSet<&str> = store.unresolved().iter().map(|o| o.label.as_str()).collect();
    assert!(labels.contains("edge"));
}
