// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datetime and time-delta coders.

use chrono::{DateTime, NaiveDateTime};

use crate::coder::{
    claim_mismatch, decode_err, envelope_with_tag, take_i64, take_string, Envelope, TypeCoder,
};
use crate::engine::CoderContext;
use crate::error::CoderError;
use crate::value::{TimeDelta, Value};

/// Encodes offset-aware timestamps as ISO-8601 text.
///
/// Payloads without an offset decode as UTC; re-encoding such a value gains
/// an explicit `+00:00`.
pub struct DateTimeCoder;

impl TypeCoder for DateTimeCoder {
    fn tag(&self) -> &'static str {
        "datetime"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::DateTime(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::DateTime(dt) = value else {
            return Err(claim_mismatch(value));
        };
        let mut env = envelope_with_tag(cx, self.tag());
        env.insert("isostr".to_string(), Value::String(dt.to_rfc3339()));
        Ok(env)
    }

    fn decode(&self, mut payload: Envelope, _cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let isostr = take_string(&mut payload, self.tag(), "isostr")?;
        let parsed = DateTime::parse_from_rfc3339(&isostr).or_else(|_| {
            NaiveDateTime::parse_from_str(&isostr, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
        });
        match parsed {
            Ok(dt) => Ok(Value::DateTime(dt)),
            Err(_) => Err(decode_err(
                self.tag(),
                format!("invalid ISO-8601 timestamp '{}'", isostr),
            )),
        }
    }
}

/// Encodes time deltas as the additive (days, seconds, microseconds) triple.
pub struct TimeDeltaCoder;

impl TypeCoder for TimeDeltaCoder {
    fn tag(&self) -> &'static str {
        "timedelta"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::TimeDelta(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::TimeDelta(td) = value else {
            return Err(claim_mismatch(value));
        };
        let mut env = envelope_with_tag(cx, self.tag());
        env.insert("days".to_string(), Value::Int(td.days()));
        env.insert("seconds".to_string(), Value::Int(td.seconds() as i64));
        env.insert("microsec".to_string(), Value::Int(td.microseconds() as i64));
        Ok(env)
    }

    fn decode(&self, mut payload: Envelope, _cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let days = take_i64(&mut payload, self.tag(), "days")?;
        let seconds = take_i64(&mut payload, self.tag(), "seconds")?;
        let microsec = take_i64(&mut payload, self.tag(), "microsec")?;
        Ok(Value::TimeDelta(TimeDelta::new(days, seconds, microsec)))
    }
}
