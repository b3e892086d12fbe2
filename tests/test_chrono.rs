use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use pretty_assertions::assert_eq;
use serde::Serialize;

use deepobject::Params;

fn params(pairs: &[(&str, &str)]) -> Params {
    let mut params = Params::new();
    for (key, value) in pairs {
        params
            .entry((*key).to_owned())
            .or_default()
            .push((*value).to_owned());
    }
    params
}

// ========== DATES ==========

#[derive(Debug, Default, PartialEq, Serialize)]
struct Booking {
    d: NaiveDate,
}

deepobject::assign_struct! {
    Booking { d }
}

#[test]
fn dates_use_the_iso_form() {
    let booking = Booking {
        d: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
    };
    let encoded = deepobject::encode(&booking, "p").unwrap();
    assert_eq!(encoded, "p[d]=2020-02-01");

    let mut decoded = Booking::default();
    deepobject::decode(&mut decoded, "p", &params(&[("p[d]", "2020-02-01")])).unwrap();
    assert_eq!(decoded, booking);
}

#[test]
fn optional_dates_encode_only_when_set() {
    #[derive(Debug, Default, PartialEq, Serialize)]
    struct Window {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    }

    deepobject::assign_struct! {
        Window { from, to }
    }

    let window = Window {
        from: NaiveDate::from_ymd_opt(2020, 2, 1),
        to: None,
    };
    let encoded = deepobject::encode(&window, "p").unwrap();
    assert_eq!(encoded, "p[from]=2020-02-01");

    let mut decoded = Window::default();
    deepobject::decode(&mut decoded, "p", &params(&[("p[from]", "2020-02-01")])).unwrap();
    assert_eq!(decoded, window);
}

#[test]
fn invalid_dates_report_the_expected_grammar() {
    let mut booking = Booking::default();
    let err =
        deepobject::decode(&mut booking, "p", &params(&[("p[d]", "02/01/2020")])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error assigning field `d`: cannot parse `02/01/2020` as a date (YYYY-MM-DD)"
    );
}

// ========== TIMESTAMPS ==========

#[derive(Debug, Default, PartialEq, Serialize)]
struct Event {
    when: DateTime<Utc>,
}

deepobject::assign_struct! {
    Event { when }
}

#[test]
fn utc_timestamps_roundtrip() {
    let event = Event {
        when: Utc.with_ymd_and_hms(2020, 2, 1, 22, 30, 0).unwrap(),
    };
    let encoded = deepobject::encode(&event, "p").unwrap();
    assert!(encoded.starts_with("p[when]=2020-02-01T22:30:00"), "{encoded}");

    let value = encoded.strip_prefix("p[when]=").unwrap();
    let mut decoded = Event::default();
    deepobject::decode(&mut decoded, "p", &params(&[("p[when]", value)])).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn offset_timestamps_keep_their_offset() {
    #[derive(Debug, Default, PartialEq, Serialize)]
    struct Stamped {
        t: DateTime<FixedOffset>,
    }

    deepobject::assign_struct! {
        Stamped { t }
    }

    let offset = FixedOffset::east_opt(9 * 3600).unwrap();
    let stamped = Stamped {
        t: offset
            .with_ymd_and_hms(2014, 11, 28, 21, 45, 59)
            .unwrap()
            .with_nanosecond(324310806)
            .unwrap(),
    };
    let encoded = deepobject::encode(&stamped, "p").unwrap();
    assert_eq!(encoded, "p[t]=2014-11-28T21:45:59.324310806+09:00");

    let mut decoded = Stamped::default();
    deepobject::decode(
        &mut decoded,
        "p",
        &params(&[("p[t]", "2014-11-28T21:45:59.324310806+09:00")]),
    )
    .unwrap();
    assert_eq!(decoded, stamped);
    assert_eq!(decoded.t.offset(), &offset);
}

#[test]
fn timestamps_convert_to_the_destination_zone() {
    let mut event = Event::default();
    deepobject::decode(
        &mut event,
        "p",
        &params(&[("p[when]", "2014-11-28T21:45:59+09:00")]),
    )
    .unwrap();
    assert_eq!(
        event.when,
        Utc.with_ymd_and_hms(2014, 11, 28, 12, 45, 59).unwrap()
    );
}

#[test]
fn bare_dates_fill_in_midnight_utc() {
    let mut event = Event::default();
    deepobject::decode(&mut event, "p", &params(&[("p[when]", "2020-02-01")])).unwrap();
    assert_eq!(event.when, Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap());
}

#[test]
fn bare_dates_fill_in_midnight_for_offset_destinations() {
    #[derive(Debug, Default, PartialEq, Serialize)]
    struct Stamped {
        t: DateTime<FixedOffset>,
    }

    deepobject::assign_struct! {
        Stamped { t }
    }

    let mut stamped = Stamped::default();
    deepobject::decode(&mut stamped, "p", &params(&[("p[t]", "2020-02-01")])).unwrap();
    assert_eq!(
        stamped.t,
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 2, 1, 0, 0, 0)
            .unwrap()
    );
}

#[test]
fn unparseable_timestamps_name_both_grammars() {
    let mut event = Event::default();
    let err =
        deepobject::decode(&mut event, "p", &params(&[("p[when]", "late tuesday")])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error assigning field `when`: cannot parse `late tuesday` as an RFC 3339 timestamp or YYYY-MM-DD date"
    );
}
