// Rating resolution: clamping, lenient parsing and the default.

use ksb_core::{Rating, RawRating};

#[test]
fn out_of_range_integers_clamp() {
    assert_eq!(Rating::resolve(&0_i32.into()).get(), 1);
    assert_eq!(Rating::resolve(&9_i32.into()).get(), 5);
    assert_eq!(Rating::resolve(&(-3_i32).into()).get(), 1);
    for r in 1..=5_i32 {
        assert_eq!(Rating::resolve(&r.into()).get(), r as u8);
    }
}

#[test]
fn non_numeric_text_defaults_to_three() {
    assert_eq!(Rating::resolve(&"abc".into()).get(), 3);
    assert_eq!(Rating::resolve(&"".into()).get(), 3);
    assert_eq!(Rating::resolve(&RawRating::Missing).get(), 3);
    assert_eq!(Rating::resolve(&RawRating::from(None::<i32>)).get(), 3);
}

#[test]
fn numeric_text_and_floats_are_accepted() {
    assert_eq!(Rating::resolve(&" 4 ".into()).get(), 4);
    assert_eq!(Rating::resolve(&"5.0".into()).get(), 5);
    assert_eq!(Rating::resolve(&"12".into()).get(), 5);
    assert_eq!(Rating::resolve(&2.9_f64.into()).get(), 2);
    assert_eq!(Rating::resolve(&f64::NAN.into()).get(), 3);
    assert_eq!(Rating::resolve(&f64::INFINITY.into()).get(), 5);
    assert_eq!(Rating::resolve(&f64::NEG_INFINITY.into()).get(), 1);
    assert_eq!(Rating::resolve(&"inf".into()).get(), 5);
}

#[test]
fn normalized_spans_unit_interval() {
    assert_eq!(Rating::new(1).normalized(), 0.0);
    assert_eq!(Rating::new(3).normalized(), 0.5);
    assert_eq!(Rating::new(5).normalized(), 1.0);
    assert_eq!(Rating::default(), Rating::DEFAULT);
    assert_eq!(Rating::DEFAULT.to_string(), "3");
}
