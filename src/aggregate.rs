//! Higher-order aggregation over entity-set timelines.
//!
//! Every aggregator is evaluated pointwise over time: the supplied
//! per-entity function is applied once to every entity that was ever a
//! member, then the set timeline and all per-entity sub-timelines are
//! merged and the aggregate recomputed at each breakpoint against the
//! membership in force there.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::algebra::breakpoint_union;
use crate::entity::Entity;
use crate::state::preceding_state;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TNumber, TSet, Temporal};

fn sub_timelines<T, F>(set: &TSet, f: F) -> Vec<(Entity, Timeline)>
where
    T: Temporal,
    F: Fn(&Entity) -> T,
{
    set.ever_members()
        .into_iter()
        .map(|e| {
            let sub = f(&e).into_timeline();
            (e, sub)
        })
        .collect()
}

/// The pointwise aggregation engine.
///
/// At each merged breakpoint: an unknown set propagates its own tag;
/// unknown members resolve by data precedence across exactly the
/// unknown members' tags; otherwise `agg` runs over the known row.
fn pointwise<F>(set: &TSet, subs: &[(Entity, Timeline)], agg: F) -> Timeline
where
    F: Fn(&[(&Entity, &Value)]) -> EpistemicValue,
{
    let mut inputs: Vec<&Timeline> = vec![set.timeline()];
    inputs.extend(subs.iter().map(|(_, sub)| sub));
    let keys = breakpoint_union(&inputs);

    let mut out: Option<Timeline> = None;
    for at in keys {
        let current = set.timeline().value_as_of(at);
        let value = match current.payload().and_then(Value::as_members) {
            None => EpistemicValue::of_state(current.state()),
            Some(members) => {
                let mut row: Vec<(&Entity, &EpistemicValue)> = Vec::with_capacity(members.len());
                for member in members {
                    let (_, sub) = subs
                        .iter()
                        .find(|(e, _)| e == member)
                        .unwrap_or_else(|| panic!("no sub-timeline for member {member}"));
                    row.push((member, sub.value_as_of(at)));
                }
                let state = preceding_state(row.iter().map(|(_, v)| v.state()));
                if state.is_unknown() {
                    EpistemicValue::of_state(state)
                } else {
                    let known: Vec<(&Entity, &Value)> = row
                        .iter()
                        .filter_map(|(e, v)| v.payload().map(|p| (*e, p)))
                        .collect();
                    agg(&known)
                }
            }
        };
        match &mut out {
            None => out = Some(Timeline::eternal(value)),
            Some(t) => t.set(at, value),
        }
    }
    out.unwrap_or_else(|| panic!("aggregation over an empty breakpoint union"))
        .lean()
}

/// An eternally-decisive member of an eternally-known set, if any.
///
/// Lets the quantifiers answer without the full breakpoint scan.
fn decisive_member(set: &TSet, subs: &[(Entity, Timeline)], decisive: bool) -> bool {
    if !set.timeline().is_eternally_known() {
        return false;
    }
    let Some(members) = set.timeline().first_value().payload().and_then(Value::as_members)
    else {
        return false;
    };
    subs.iter().any(|(e, sub)| {
        members.contains(e)
            && sub.is_eternal()
            && sub.first_value().payload() == Some(&Value::Bool(decisive))
    })
}

/// True wherever at least one current member satisfies `f`.
pub fn exists<F>(set: &TSet, f: F) -> TBool
where
    F: Fn(&Entity) -> TBool,
{
    let subs = sub_timelines(set, f);
    if decisive_member(set, &subs, true) {
        return TBool::always(true);
    }
    TBool::from_timeline(pointwise(set, &subs, |row| {
        EpistemicValue::known(row.iter().any(|(_, v)| matches!(v, Value::Bool(true))))
    }))
}

/// True wherever every current member satisfies `f`; vacuously true
/// over an empty membership.
pub fn for_all<F>(set: &TSet, f: F) -> TBool
where
    F: Fn(&Entity) -> TBool,
{
    let subs = sub_timelines(set, f);
    if decisive_member(set, &subs, false) {
        return TBool::always(false);
    }
    TBool::from_timeline(pointwise(set, &subs, |row| {
        EpistemicValue::known(row.iter().all(|(_, v)| matches!(v, Value::Bool(true))))
    }))
}

/// The sub-set of current members satisfying `f` at each instant.
pub fn filter<F>(set: &TSet, f: F) -> TSet
where
    F: Fn(&Entity) -> TBool,
{
    let subs = sub_timelines(set, f);
    TSet::from_timeline(pointwise(set, &subs, |row| {
        let kept: Vec<Entity> = row
            .iter()
            .filter(|(_, v)| matches!(v, Value::Bool(true)))
            .map(|(e, _)| (*e).clone())
            .collect();
        EpistemicValue::known(kept)
    }))
}

fn number_of(entity: &Entity, value: &Value) -> Decimal {
    match value {
        Value::Number(n) => *n,
        other => panic!(
            "numeric aggregation over {entity} found a {} payload",
            other.type_name()
        ),
    }
}

/// The sum of `f` over current members; zero over an empty membership.
pub fn sum<F>(set: &TSet, f: F) -> TNumber
where
    F: Fn(&Entity) -> TNumber,
{
    let subs = sub_timelines(set, f);
    TNumber::from_timeline(pointwise(set, &subs, |row| {
        let total = row
            .iter()
            .fold(Decimal::ZERO, |acc, (e, v)| acc + number_of(e, v));
        EpistemicValue::known(total)
    }))
}

/// The minimum of `f` over current members; zero over an empty
/// membership.
pub fn min_of<F>(set: &TSet, f: F) -> TNumber
where
    F: Fn(&Entity) -> TNumber,
{
    extremum(set, f, Decimal::min)
}

/// The maximum of `f` over current members; zero over an empty
/// membership.
pub fn max_of<F>(set: &TSet, f: F) -> TNumber
where
    F: Fn(&Entity) -> TNumber,
{
    extremum(set, f, Decimal::max)
}

fn extremum<F>(set: &TSet, f: F, pick: fn(Decimal, Decimal) -> Decimal) -> TNumber
where
    F: Fn(&Entity) -> TNumber,
{
    let subs = sub_timelines(set, f);
    TNumber::from_timeline(pointwise(set, &subs, |row| {
        let best = row
            .iter()
            .map(|(e, v)| number_of(e, v))
            .reduce(pick)
            .unwrap_or(Decimal::ZERO);
        EpistemicValue::known(best)
    }))
}

/// Current members in ascending order of `f`, ties keeping membership
/// order.
pub fn order_by<F>(set: &TSet, f: F) -> TSet
where
    F: Fn(&Entity) -> TNumber,
{
    let subs = sub_timelines(set, f);
    TSet::from_timeline(pointwise(set, &subs, |row| {
        let mut ranked: Vec<(Entity, Decimal)> = row
            .iter()
            .map(|(e, v)| ((*e).clone(), number_of(e, v)))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| a.cmp(b));
        EpistemicValue::known(ranked.into_iter().map(|(e, _)| e).collect::<Vec<_>>())
    }))
}

/// The highest-scoring non-empty subset of the base set's members, per
/// interval of the base set's timeline.
///
/// Subsets are enumerated in binary-counting order and scored with
/// `score`; within each interval the first enumerated subset matching
/// the running maximum wins ties. Enumeration is exponential in the
/// member count and carries no internal cutoff.
pub fn optimal_subset<F>(set: &TSet, score: F) -> TSet
where
    F: Fn(&[Entity]) -> TNumber,
{
    let keys: Vec<DateTime<Utc>> = set.timeline().keys().copied().collect();
    let mut out: Option<Timeline> = None;
    let mut record = |at: DateTime<Utc>, v: EpistemicValue| match &mut out {
        None => out = Some(Timeline::eternal(v)),
        Some(t) => t.set(at, v),
    };

    for (i, start) in keys.iter().enumerate() {
        let end = keys.get(i + 1).copied();
        let current = set.timeline().value_as_of(*start);
        let Some(members) = current.payload().and_then(Value::as_members) else {
            record(*start, EpistemicValue::of_state(current.state()));
            continue;
        };
        if members.is_empty() {
            record(*start, EpistemicValue::known(Vec::<Entity>::new()));
            continue;
        }

        let subsets: Vec<Vec<Entity>> = (1..1usize << members.len())
            .map(|mask| {
                members
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .collect();
        let scores: Vec<TNumber> = subsets.iter().map(|s| score(s)).collect();
        let mut best = scores[0].clone();
        for s in &scores[1..] {
            best = best.max_with(s);
        }

        // The interval start plus every maximum breakpoint inside it.
        let mut samples = vec![*start];
        samples.extend(
            best.timeline()
                .keys()
                .copied()
                .filter(|k| *k > *start && end.map_or(true, |e| *k < e)),
        );

        for at in samples {
            let top = best.timeline().value_as_of(at);
            let winner = match top.payload().and_then(Value::as_number) {
                None => EpistemicValue::of_state(top.state()),
                Some(m) => {
                    let first = subsets
                        .iter()
                        .zip(&scores)
                        .find(|(_, s)| {
                            s.timeline().value_as_of(at).payload().and_then(Value::as_number)
                                == Some(m)
                        })
                        .map(|(subset, _)| subset.clone())
                        .unwrap_or_else(|| panic!("running maximum matched no subset"));
                    EpistemicValue::known(first)
                }
            };
            record(at, winner);
        }
    }

    TSet::from_timeline(
        out.unwrap_or_else(|| panic!("subset search over an empty timeline"))
            .lean(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Knowledge;
    use crate::time::date;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn household() -> (Entity, Entity, Entity, TSet) {
        let a = Entity::new("ann");
        let b = Entity::new("bob");
        let c = Entity::new("cal");
        let set = TSet::of(vec![a.clone(), b.clone(), c.clone()]);
        (a, b, c, set)
    }

    fn incomes(a: &Entity, b: &Entity, c: &Entity) -> HashMap<Entity, Decimal> {
        HashMap::from([
            (a.clone(), dec!(5)),
            (b.clone(), dec!(3)),
            (c.clone(), dec!(4)),
        ])
    }

    #[test]
    fn test_exists_and_for_all() {
        let (a, _, _, set) = household();
        assert_eq!(
            exists(&set, |e| TBool::always(*e == a)).to_text(),
            "true"
        );
        assert_eq!(
            for_all(&set, |e| TBool::always(*e == a)).to_text(),
            "false"
        );
        assert_eq!(for_all(&set, |_| TBool::always(true)).to_text(), "true");
    }

    #[test]
    fn test_for_all_over_empty_set_is_true() {
        assert_eq!(for_all(&TSet::empty(), |_| TBool::always(false)).to_text(), "true");
        assert_eq!(exists(&TSet::empty(), |_| TBool::always(true)).to_text(), "false");
    }

    #[test]
    fn test_filter_and_order_by() {
        let (a, b, c, set) = household();
        let income = incomes(&a, &b, &c);

        let rich = filter(&set, |e| {
            TNumber::constant(income[e]).ge(&TNumber::constant(dec!(4)))
        });
        assert_eq!(rich.count().to_text(), "2");
        assert_eq!(rich.contains(&b).to_text(), "false");

        let ranked = order_by(&set, |e| TNumber::constant(income[e]));
        assert_eq!(ranked.to_text(), "[bob, cal, ann]");
    }

    #[test]
    fn test_sum_min_max() {
        let (a, b, c, set) = household();
        let income = incomes(&a, &b, &c);
        let by_income = |e: &Entity| TNumber::constant(income[e]);

        assert_eq!(sum(&set, by_income).to_text(), "12");
        assert_eq!(min_of(&set, by_income).to_text(), "3");
        assert_eq!(max_of(&set, by_income).to_text(), "5");
        assert_eq!(sum(&TSet::empty(), by_income).to_text(), "0");
    }

    #[test]
    fn test_aggregation_tracks_membership_changes() {
        let (a, b, c, _) = household();
        let income = incomes(&a, &b, &c);

        let mut t = Timeline::eternal(EpistemicValue::known(vec![a.clone(), b.clone()]));
        t.push(date(2015, 1, 1), EpistemicValue::known(vec![b.clone(), c.clone()]));
        let set = TSet::from_timeline(t);

        let total = sum(&set, |e| TNumber::constant(income[e]));
        assert_eq!(total.to_text(), "{Dawn: 8; 2015-01-01: 7}");
    }

    #[test]
    fn test_unknown_member_resolves_by_data_precedence() {
        let (a, b, _, _) = household();
        let set = TSet::of(vec![a.clone(), b.clone()]);
        let total = sum(&set, |e| {
            if *e == a {
                TNumber::constant(dec!(5))
            } else {
                TNumber::unstated()
            }
        });
        assert_eq!(total.state_if_unknown(), Knowledge::Unstated);
    }

    #[test]
    fn test_unknown_set_propagates_its_own_tag() {
        let total = sum(&TSet::uncertain(), |_| TNumber::constant(dec!(1)));
        assert_eq!(total.state_if_unknown(), Knowledge::Uncertain);
    }

    #[test]
    fn test_optimal_subset_finds_maximum_sum() {
        let (a, b, c, set) = household();
        let income = incomes(&a, &b, &c);

        let best = optimal_subset(&set, |subset| {
            subset
                .iter()
                .fold(TNumber::zero(), |acc, e| acc.plus(&TNumber::constant(income[e])))
        });
        assert_eq!(best.count().to_text(), "3");
        assert_eq!(best.to_text(), "[ann, bob, cal]");
    }

    #[test]
    fn test_optimal_subset_ties_break_to_first_enumerated() {
        let (a, b, c, set) = household();
        let income = incomes(&a, &b, &c);

        // Scoring by the best single member: {ann} (mask 001) is the
        // first subset in binary-counting order to reach 5.
        let best = optimal_subset(&set, |subset| {
            subset.iter().fold(TNumber::constant(Decimal::MIN), |acc, e| {
                acc.max_with(&TNumber::constant(income[e]))
            })
        });
        assert_eq!(best.to_text(), "[ann]");
    }

    #[test]
    fn test_optimal_subset_follows_score_changes() {
        let a = Entity::new("ann");
        let b = Entity::new("bob");
        let set = TSet::of(vec![a.clone(), b.clone()]);

        // Ann scores 5 until 2015, then 1; Bob scores 3 throughout.
        let mut ann = Timeline::eternal(EpistemicValue::known(dec!(5)));
        ann.push(date(2015, 1, 1), EpistemicValue::known(dec!(1)));
        let ann = TNumber::from_timeline(ann);
        let bob = TNumber::constant(dec!(3));

        let best = optimal_subset(&set, |subset| {
            let mut score = TNumber::constant(Decimal::MIN);
            for e in subset {
                let s = if *e == a { ann.clone() } else { bob.clone() };
                score = score.max_with(&s);
            }
            score
        });
        assert_eq!(best.to_text(), "{Dawn: [ann]; 2015-01-01: [bob]}");
    }
}
