//! Cross-module properties of the timeline algebra.

use std::cell::Cell;

use rust_decimal_macros::dec;
use themis::{
    calendar_days, date, periods, preceding_state, preceding_state_for_logic, switch, EpistemicValue,
    Entity, Interval, Knowledge, SwitchCase, TBool, TNumber, TSet, Temporal, Timeline,
};

fn stepped_set(a: &Entity, b: &Entity, c: &Entity) -> TSet {
    let mut t = Timeline::eternal(EpistemicValue::known(vec![a.clone(), b.clone()]));
    t.push(
        date(2015, 1, 1),
        EpistemicValue::known(vec![b.clone(), c.clone()]),
    );
    TSet::from_timeline(t)
}

#[test]
fn compaction_is_idempotent_and_preserves_lookup() {
    let mut t = Timeline::eternal(EpistemicValue::known(dec!(1)));
    t.push(date(2014, 1, 1), EpistemicValue::known(dec!(1)));
    t.push(date(2015, 1, 1), EpistemicValue::known(dec!(2)));
    t.push(date(2016, 1, 1), EpistemicValue::known(dec!(2)));

    let leaned = t.lean();
    assert_eq!(leaned, leaned.lean());
    assert_eq!(leaned.len(), 2);
    for probe in [
        date(2013, 6, 1),
        date(2014, 6, 1),
        date(2015, 6, 1),
        date(2017, 6, 1),
    ] {
        assert_eq!(t.value_as_of(probe), leaned.value_as_of(probe));
    }
}

#[test]
fn set_union_commutes_and_intersection_associates_over_time() {
    let a = Entity::new("a");
    let b = Entity::new("b");
    let c = Entity::new("c");

    let s1 = stepped_set(&a, &b, &c);
    let s2 = TSet::of(vec![b.clone(), c.clone()]);
    let s3 = TSet::of(vec![a.clone(), c.clone()]);

    let u12 = s1.union(&s2);
    let u21 = s2.union(&s1);
    assert!(u12.set_equals(&u21).is_always_true());

    let left = s1.intersection(&s2.intersection(&s3));
    let right = s1.intersection(&s2).intersection(&s3);
    assert!(left.set_equals(&right).is_always_true());
}

#[test]
fn precedence_orders_disagree_on_stub_versus_unstated() {
    let states = [Knowledge::Stub, Knowledge::Unstated];
    assert_eq!(preceding_state(states), Knowledge::Stub);
    assert_eq!(preceding_state_for_logic(states), Knowledge::Unstated);

    // The same asymmetry observed through the operators.
    let sum = TNumber::stub().plus(&TNumber::unstated());
    assert_eq!(sum.state_if_unknown(), Knowledge::Stub);
    let conj = TBool::stub().and(&TBool::unstated());
    assert_eq!(conj.state_if_unknown(), Knowledge::Unstated);
}

#[test]
fn switch_never_evaluates_past_a_covering_condition() {
    let later = Cell::new(0u32);
    let n = switch(
        vec![
            SwitchCase::new(|| TBool::always(true), || TNumber::constant(dec!(1))),
            SwitchCase::new(
                || {
                    later.set(later.get() + 1);
                    TBool::always(true)
                },
                || {
                    later.set(later.get() + 1);
                    TNumber::constant(dec!(2))
                },
            ),
        ],
        || TNumber::constant(dec!(9)),
    );
    assert_eq!(n.to_text(), "1");
    assert_eq!(later.get(), 0);
}

#[test]
fn elapsed_intervals_match_worked_example() {
    let mut b = Timeline::eternal(EpistemicValue::known(false));
    b.push(date(2015, 1, 1), EpistemicValue::known(true));
    b.push(date(2015, 1, 2), EpistemicValue::known(false));
    b.push(date(2015, 1, 3), EpistemicValue::known(true));
    b.push(date(2015, 1, 4), EpistemicValue::known(false));
    let b = TBool::from_timeline(b);

    let day = calendar_days(date(2015, 1, 1), date(2015, 1, 5));
    assert_eq!(
        b.running_elapsed_intervals(&day).to_text(),
        "{Dawn: 0; 2015-01-02: 1; 2015-01-04: 2}"
    );
}

#[test]
fn running_sum_matches_worked_example() {
    let mut rate = Timeline::eternal(EpistemicValue::known(dec!(0)));
    rate.push(date(2015, 1, 1), EpistemicValue::known(dec!(1000)));
    rate.push(date(2015, 3, 1), EpistemicValue::known(dec!(0)));
    let rate = TNumber::from_timeline(rate);

    let month = periods(Interval::Month, date(2015, 1, 1), date(2015, 12, 1));
    assert_eq!(
        rate.running_summed_intervals(&month).to_text(),
        "{Dawn: 0; 2015-02-01: 1000; 2015-03-01: 2000}"
    );
}

#[test]
fn and_or_decisive_values_beat_every_unknown() {
    let operands = [
        TBool::always(false),
        TBool::unstated(),
        TBool::uncertain(),
        TBool::stub(),
        TBool::always(true),
    ];
    for x in &operands {
        assert!(!TBool::always(false).and(x).is_ever_true());
        assert!(TBool::always(true).or(x).is_always_true());
    }
}

#[test]
fn timeline_text_round_trips_through_answer_parsing() {
    let mut t = Timeline::eternal(EpistemicValue::known(dec!(0)));
    t.push(date(2015, 1, 1), EpistemicValue::known(dec!(50000)));
    t.push(date(2016, 1, 1), EpistemicValue::unstated());
    let rendered = TNumber::from_timeline(t).to_text();
    assert_eq!(rendered, "{Dawn: 0; 2015-01-01: 50000; 2016-01-01: Unstated}");

    let parsed = themis::parse_answer(themis::AnswerKind::Number, &rendered, &mut |name| {
        Entity::new(name)
    })
    .expect("rendered text parses back");
    assert_eq!(parsed.to_text(), rendered);
}
