// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JSON form of `f64` that keeps non-finite values.
//!
//! serde_json writes NaN and infinities as `null`, which does not read back
//! as a number. Here they are written as the strings `"NaN"`, `"Infinity"`
//! or `"-Infinity"`, and a bare `null` reads back as NaN.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

#[derive(Debug, Clone, Copy)]
struct Float(f64);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_nan() {
            serializer.serialize_str(NAN)
        } else if v.is_infinite() {
            serializer.serialize_str(if v > 0.0 { INFINITY } else { NEG_INFINITY })
        } else {
            serializer.serialize_f64(v)
        }
    }
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = Float;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a number, null, \"{NAN}\", \"{INFINITY}\" or \"{NEG_INFINITY}\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Float, E> {
        Ok(Float(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Float, E> {
        Ok(Float(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Float, E> {
        Ok(Float(v as f64))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Float, E> {
        Ok(Float(f64::NAN))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Float, E> {
        match v {
            NAN => Ok(Float(f64::NAN)),
            INFINITY => Ok(Float(f64::INFINITY)),
            NEG_INFINITY => Ok(Float(f64::NEG_INFINITY)),
            _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for Float {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}

/// `#[serde(with)]` adapter for `Vec<Vec<f64>>`.
pub(crate) mod rows {
    use super::*;

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(rows.iter().map(|row| row.iter().copied().map(Float).collect::<Vec<_>>()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows = Vec::<Vec<Float>>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.0).collect())
            .collect())
    }
}

/// `#[serde(with)]` adapter for `BTreeMap<String, f64>`.
pub(crate) mod map {
    use super::*;

    pub fn serialize<S: Serializer>(map: &BTreeMap<String, f64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, &v)| (k, Float(v))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error> {
        let map = BTreeMap::<String, Float>::deserialize(deserializer)?;
        Ok(map.into_iter().map(|(k, v)| (k, v.0)).collect())
    }
}

/// `#[serde(with)]` adapter for `Option<f64>`. `null` stays `None`.
pub(crate) mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&Float(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Float>::deserialize(deserializer)?.map(|v| v.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Table {
        #[serde(with = "rows")]
        rows: Vec<Vec<f64>>,
        #[serde(default, with = "option")]
        ofv: Option<f64>,
    }

    #[test]
    fn non_finite_cells_are_written_as_text() {
        let table = Table {
            rows: vec![vec![1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY]],
            ofv: Some(f64::NAN),
        };
        let written = serde_json::to_value(&table).unwrap();
        assert_eq!(written, json!({"rows": [[1.0, "NaN", "Infinity", "-Infinity"]], "ofv": "NaN"}));

        let read: Table = serde_json::from_value(written).unwrap();
        assert_eq!(read.rows[0][0], 1.0);
        assert!(read.rows[0][1].is_nan());
        assert_eq!(read.rows[0][2], f64::INFINITY);
        assert_eq!(read.rows[0][3], f64::NEG_INFINITY);
        assert!(read.ofv.unwrap().is_nan());
    }

    #[test]
    fn null_cells_read_as_nan() {
        let read: Table = serde_json::from_value(json!({"rows": [[null, 2]], "ofv": null})).unwrap();
        assert!(read.rows[0][0].is_nan());
        assert_eq!(read.rows[0][1], 2.0);
        assert_eq!(read.ofv, None);
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = serde_json::from_value::<Table>(json!({"rows": [["missing"]]})).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
