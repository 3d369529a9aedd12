use mapty_core::{
    Coordinates, KindField, StoreError, Workout, WorkoutKind, WorkoutPatch, WorkoutStore,
};
use uuid::Uuid;

fn run(distance: f64) -> Workout {
    Workout::create(
        Coordinates::new(9.057, 7.448),
        distance,
        24.0,
        KindField::Cadence(178.0),
    )
    .unwrap()
}

fn ride(distance: f64) -> Workout {
    Workout::create(
        Coordinates::new(9.06, 7.45),
        distance,
        95.0,
        KindField::ElevationGain(534.0),
    )
    .unwrap()
}

#[test]
fn add_keeps_insertion_order() {
    let mut store = WorkoutStore::new();
    let first = run(5.0);
    let second = ride(27.0);
    let third = run(10.0);
    let expected = vec![first.id(), second.id(), third.id()];

    store.add(first);
    store.add(second);
    store.add(third);

    let ids: Vec<_> = store.iter().map(Workout::id).collect();
    assert_eq!(ids, expected);
    assert_eq!(store.len(), 3);
}

#[test]
fn iteration_is_restartable() {
    let mut store = WorkoutStore::new();
    store.add(run(5.0));
    store.add(ride(27.0));

    let first_pass: Vec<_> = store.iter().map(Workout::id).collect();
    let second_pass: Vec<_> = (&store).into_iter().map(Workout::id).collect();
    assert_eq!(first_pass, second_pass);
    assert_eq!(store.iter().count(), 2);
}

#[test]
fn find_by_id_returns_match_or_none() {
    let mut store = WorkoutStore::new();
    let workout = run(5.0);
    let id = workout.id();
    store.add(workout);

    assert_eq!(store.find_by_id(id).unwrap().distance_km(), 5.0);
    assert!(store.find_by_id(Uuid::new_v4()).is_none());
}

#[test]
fn duplicate_ids_resolve_to_first_match() {
    let mut store = WorkoutStore::new();
    let original = run(5.0);
    let mut duplicate = original.clone();
    duplicate.record_focus();

    store.add(original.clone());
    store.add(duplicate);

    assert_eq!(store.len(), 2);
    assert_eq!(store.find_by_id(original.id()).unwrap().clicks(), 0);
}

#[test]
fn update_overwrites_metrics_and_recomputes_derived_metric() {
    let mut store = WorkoutStore::new();
    let workout = run(5.2);
    let id = workout.id();
    let created_at = workout.created_at();
    let description = workout.description().to_string();
    store.add(workout);

    store
        .update_by_id(id, &WorkoutPatch::new(10.0, 50.0, KindField::Cadence(170.0)))
        .unwrap();

    let updated = store.find_by_id(id).unwrap();
    assert_eq!(updated.kind(), WorkoutKind::Running);
    assert_eq!(updated.distance_km(), 10.0);
    assert_eq!(updated.duration_min(), 50.0);
    assert_eq!(updated.metrics().kind_field(), KindField::Cadence(170.0));
    assert_eq!(updated.pace_min_per_km(), Some(5.0));
    assert_eq!(updated.id(), id);
    assert_eq!(updated.created_at(), created_at);
    assert_eq!(updated.description(), description);
    updated.validate().unwrap();
}

#[test]
fn update_rejects_kind_change_and_leaves_record_untouched() {
    let mut store = WorkoutStore::new();
    let workout = ride(27.0);
    let id = workout.id();
    let before = workout.clone();
    store.add(workout);

    let err = store
        .update_by_id(id, &WorkoutPatch::new(5.0, 24.0, KindField::Cadence(178.0)))
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::KindMismatch {
            id,
            expected: WorkoutKind::Cycling,
            actual: WorkoutKind::Running,
        }
    );
    assert_eq!(store.find_by_id(id), Some(&before));
}

#[test]
fn update_rejects_invalid_values_and_leaves_record_untouched() {
    let mut store = WorkoutStore::new();
    let workout = run(5.2);
    let id = workout.id();
    let before = workout.clone();
    store.add(workout);

    let err = store
        .update_by_id(id, &WorkoutPatch::new(0.0, 24.0, KindField::Cadence(178.0)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.find_by_id(id), Some(&before));
}

#[test]
fn update_rejects_patch_with_overflowing_speed() {
    let mut store = WorkoutStore::new();
    let workout = ride(27.0);
    let id = workout.id();
    let before = workout.clone();
    store.add(workout);

    let err = store
        .update_by_id(
            id,
            &WorkoutPatch::new(1e308, 1e-10, KindField::ElevationGain(534.0)),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.find_by_id(id), Some(&before));
}

#[test]
fn update_unknown_id_returns_not_found() {
    let mut store = WorkoutStore::new();
    store.add(run(5.0));
    let missing = Uuid::new_v4();

    let err = store
        .update_by_id(missing, &WorkoutPatch::new(5.0, 24.0, KindField::Cadence(178.0)))
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound(missing));
}

#[test]
fn remove_by_id_removes_only_the_match() {
    let mut store = WorkoutStore::new();
    let keep = run(5.0);
    let drop = ride(27.0);
    let drop_id = drop.id();
    store.add(keep.clone());
    store.add(drop);

    let removed = store.remove_by_id(drop_id).unwrap();
    assert_eq!(removed.id(), drop_id);
    assert_eq!(store.as_slice(), &[keep]);
}

#[test]
fn remove_on_empty_or_non_matching_store_is_not_found_and_no_op() {
    let mut empty = WorkoutStore::new();
    let missing = Uuid::new_v4();
    assert_eq!(
        empty.remove_by_id(missing).unwrap_err(),
        StoreError::NotFound(missing)
    );
    assert!(empty.is_empty());

    let mut store = WorkoutStore::new();
    store.add(run(5.0));
    let before = store.clone();
    assert!(store.remove_by_id(missing).is_err());
    assert_eq!(store, before);
}

#[test]
fn replace_all_swaps_contents() {
    let mut store = WorkoutStore::new();
    store.add(run(5.0));

    let replacement = vec![ride(20.0), ride(30.0)];
    store.replace_all(replacement.clone());
    assert_eq!(store.as_slice(), replacement.as_slice());

    store.clear();
    assert!(store.is_empty());
}
