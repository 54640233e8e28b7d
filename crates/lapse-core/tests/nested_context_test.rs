use lapse_core::{ManualClock, Measure, Timer};

fn manual_timer() -> (ManualClock, Timer<ManualClock>) {
    let clock = ManualClock::new();
    let timer = Timer::with_clock(clock.clone());
    (clock, timer)
}

#[test]
fn colliding_context_names_keep_both_children() {
    let (clock, mut timer) = manual_timer();

    timer.with_context("s").measure("inner-a");
    clock.advance_ms(2);
    timer.with_context("s").measure("inner-b");

    let snapshot = timer.snapshot();
    let children = snapshot.children.as_ref().unwrap();
    assert_eq!(children.len(), 2);

    // The first child keeps its key; the second lands under "s-1" (one
    // less than the child count after insertion).
    assert_eq!(children.get("s").unwrap().measures[0].name, "inner-a");
    assert_eq!(children.get("s-1").unwrap().measures[0].name, "inner-b");
}

#[test]
fn each_collision_is_suffixed_with_count_before_insertion() {
    let (_clock, mut timer) = manual_timer();

    timer.with_context("s");
    timer.with_context("s");
    timer.with_context("s");

    let keys: Vec<&str> = timer.children().map(|(name, _)| name).collect();
    assert_eq!(keys, ["s", "s-1", "s-2"]);
}

#[test]
fn renamed_key_may_collide_with_an_organic_sibling() {
    let (_clock, mut timer) = manual_timer();

    timer.with_context("s");
    timer.with_context("s-2");
    timer.with_context("s");

    // The literal rename rule mints "s-2" again; both entries survive and
    // serialize in creation order.
    let keys: Vec<&str> = timer.children().map(|(name, _)| name).collect();
    assert_eq!(keys, ["s", "s-2", "s-2"]);

    let json = serde_json::to_string(&timer.snapshot()).unwrap();
    assert_eq!(json.matches("\"s-2\"").count(), 2);
}

#[test]
fn leaf_snapshot_has_no_children_key() {
    let (clock, mut timer) = manual_timer();

    clock.advance_ms(1);
    timer.finalize();

    let value = serde_json::to_value(timer.snapshot()).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.contains_key("measures"));
    assert!(!object.contains_key("children"));
}

#[test]
fn snapshot_nests_to_three_levels() {
    let (clock, mut timer) = manual_timer();

    {
        let outer = timer.with_context("outer");
        let middle = outer.with_context("middle");
        let inner = middle.with_context("inner");
        clock.advance_ms(4);
        inner.measure("deep-work");
    }
    timer.measure("root-work");
    timer.finalize();

    let value = serde_json::to_value(timer.snapshot()).unwrap();
    let deep = &value["children"]["outer"]["children"]["middle"]["children"]["inner"];
    assert_eq!(deep["measures"][0]["name"], "deep-work");
    assert_eq!(deep["measures"][0]["duration"], 4.0);

    // The innermost timer has no children of its own.
    assert!(deep.as_object().unwrap().get("children").is_none());
}

#[test]
fn serialized_field_names_are_the_wire_contract() {
    let (clock, mut timer) = manual_timer();

    clock.advance_ms(2);
    timer.measure("op");
    timer.with_context("sub");
    clock.advance_ms(1);
    timer.finalize();

    let json = timer.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["measures"][0]["name"], "op");
    assert_eq!(value["measures"][0]["duration"], 2.0);
    assert_eq!(value["children"]["sub"]["measures"][0]["name"], "total");
}

#[test]
fn children_serialize_in_creation_order() {
    let (_clock, mut timer) = manual_timer();

    timer.with_context("zeta");
    timer.with_context("alpha");
    timer.with_context("mid");
    timer.finalize();

    let json = serde_json::to_string(&timer.snapshot()).unwrap();
    let zeta = json.find("\"zeta\"").unwrap();
    let alpha = json.find("\"alpha\"").unwrap();
    let mid = json.find("\"mid\"").unwrap();
    assert!(zeta < alpha && alpha < mid);
}

#[test]
fn sibling_subtrees_record_independently() {
    let (clock, mut timer) = manual_timer();

    timer.with_context("left").mark("l");
    clock.advance_ms(3);
    timer.with_context("right").mark("r");
    clock.advance_ms(2);

    assert!(timer.child("left").is_some());
    timer.finalize();

    let snapshot = timer.snapshot();
    let children = snapshot.children.as_ref().unwrap();
    assert_eq!(children.get("left").unwrap().measures, [Measure::new("l", 5.0)]);
    assert_eq!(children.get("right").unwrap().measures, [Measure::new("r", 2.0)]);
}

#[test]
fn empty_context_name_is_permitted() {
    let (clock, mut timer) = manual_timer();

    timer.with_context("");
    clock.advance_ms(1);
    timer.finalize();

    let snapshot = timer.snapshot();
    let children = snapshot.children.as_ref().unwrap();
    assert_eq!(children.get("").unwrap().measures, [Measure::new("total", 1.0)]);
}
