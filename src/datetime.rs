//! UTCTime / GeneralizedTime codec (C5).
//!
//! Faithfully preserves two quirks from the system this was modeled on (see
//! the design notes in `DESIGN.md`): the zone-offset sign on encode is
//! inverted relative to what a reader would expect, and the minute
//! component of a decoded zone offset is always treated as negative.

use core::fmt::Write as _;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time as ClockTime, UtcOffset};

use crate::error::{Error, ErrorKind};
use crate::tag::universal;

/// Range of years a `UTCTime` can round-trip under the century rule (§4.5).
const UTC_TIME_YEAR_RANGE: core::ops::Range<i32> = 1950..2050;

fn map_component_err(_: time::error::ComponentRange) -> Error {
    ErrorKind::InvalidData.into()
}

/// Encode `dt` as the ASCII payload of a `UTCTime` or `GeneralizedTime`
/// value (tag/length not included). `dt`'s own UTC offset selects Zulu vs a
/// signed zone suffix; its wall-clock fields are emitted verbatim (no
/// conversion) when the offset is non-zero.
pub fn encode_payload(dt: OffsetDateTime, precise: bool, generalized: bool) -> Result<Vec<u8>, Error> {
    let year = dt.year();

    if !generalized && !UTC_TIME_YEAR_RANGE.contains(&year) {
        return Err(ErrorKind::InvalidData.into());
    }

    let mut out = String::new();

    if generalized {
        write!(out, "{year:04}").unwrap();
    } else {
        write!(out, "{:02}", year.rem_euclid(100)).unwrap();
    }

    write!(
        out,
        "{:02}{:02}{:02}{:02}{:02}",
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
    .unwrap();

    if precise {
        write!(out, ".{:03}", dt.millisecond()).unwrap();
    }

    let offset = dt.offset();
    if offset == UtcOffset::UTC {
        out.push('Z');
    } else {
        let (hours, minutes, _seconds) = offset.as_hms();
        // Quirk, preserved literally: '-' when both components are
        // non-negative, '+' whenever either is negative.
        let sign = if hours >= 0 && minutes >= 0 { '-' } else { '+' };
        write!(out, "{sign}{:02}{:02}", hours.unsigned_abs(), minutes.unsigned_abs()).unwrap();
    }

    Ok(out.into_bytes())
}

/// Decode a `UTCTime`/`GeneralizedTime` ASCII payload.
///
/// Returns the decoded instant and whether the source used the
/// `GeneralizedTime` (4-digit year) layout.
pub fn decode_payload(bytes: &[u8]) -> Result<(OffsetDateTime, bool), Error> {
    let s = core::str::from_utf8(bytes).map_err(|_| Error::from(ErrorKind::InvalidData))?;

    let zone_pos = s
        .find(|c| c == 'Z' || c == '+' || c == '-')
        .ok_or_else(|| Error::from(ErrorKind::InvalidData))?;
    let is_zulu = s.as_bytes()[zone_pos] == b'Z';

    let dot_pos = s[..zone_pos].find('.');
    let datetime_end = dot_pos.unwrap_or(zone_pos);
    let datetime_str = &s[..datetime_end];

    let generalized = match datetime_str.len() {
        12 => false,
        14 => true,
        _ => return Err(ErrorKind::InvalidData.into()),
    };

    let digit = |range: core::ops::Range<usize>| -> Result<u32, Error> {
        datetime_str
            .get(range)
            .and_then(|chunk| chunk.parse::<u32>().ok())
            .ok_or_else(|| Error::from(ErrorKind::InvalidData))
    };

    let (year_raw, rest_start) = if generalized {
        (digit(0..4)?, 4)
    } else {
        (digit(0..2)?, 2)
    };

    let month_num = digit(rest_start..rest_start + 2)?;
    let day = digit(rest_start + 2..rest_start + 4)?;
    let hour = digit(rest_start + 4..rest_start + 6)?;
    let minute = digit(rest_start + 6..rest_start + 8)?;
    let second = digit(rest_start + 8..rest_start + 10)?;

    let milliseconds: u16 = if let Some(dp) = dot_pos {
        s[dp + 1..zone_pos]
            .parse()
            .map_err(|_| Error::from(ErrorKind::InvalidData))?
    } else {
        0
    };

    let year = if generalized {
        year_raw as i32
    } else if year_raw >= 50 {
        1900 + year_raw as i32
    } else {
        2000 + year_raw as i32
    };

    let month = Month::try_from(month_num as u8).map_err(map_component_err)?;
    let date = Date::from_calendar_date(year, month, day as u8).map_err(map_component_err)?;
    let clock = ClockTime::from_hms_milli(hour as u8, minute as u8, second as u8, milliseconds)
        .map_err(map_component_err)?;
    let naive = PrimitiveDateTime::new(date, clock).assume_utc();

    let dt = if is_zulu {
        naive
    } else {
        let sign = s.as_bytes()[zone_pos];
        let zone_str = &s[zone_pos + 1..];

        let hh: i64 = zone_str
            .get(0..2)
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| Error::from(ErrorKind::InvalidData))?;
        let mm: i64 = if zone_str.len() >= 4 {
            zone_str
                .get(2..4)
                .and_then(|c| c.parse().ok())
                .ok_or_else(|| Error::from(ErrorKind::InvalidData))?
        } else {
            0
        };
        if !(0..24).contains(&hh) || !(0..60).contains(&mm) {
            return Err(ErrorKind::InvalidData.into());
        }

        let hours = if sign == b'-' { -hh } else { hh };
        // Quirk, preserved literally: the minute component is always
        // applied as negative, independent of the sign octet.
        let minutes = -mm;

        // `UtcOffset::from_hms` rejects component combinations whose signs
        // disagree, which this quirk produces whenever `sign` is `+` and
        // the minute field is non-zero. Reassemble by duration arithmetic
        // instead (§4.5 step 6: AddHours then AddMinutes), which tolerates
        // any sign combination.
        naive + Duration::hours(hours) + Duration::minutes(minutes)
    };

    Ok((dt, generalized))
}

/// Tag to use for `dt` under the convenience "RFC 5280 date" rule: `UTCTime`
/// for years before 2050, `GeneralizedTime` otherwise.
pub fn rfc5280_tag_for_year(year: i32) -> u8 {
    if year < 2050 {
        universal::UTC_TIME
    } else {
        universal::GENERALIZED_TIME
    }
}
