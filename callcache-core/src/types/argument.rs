//! Argument serialization.
//!
//! JSON has no form for NaN or infinities and `serde_json` writes them as
//! `null`, which would make `f(NaN)`, `f(inf)` and `f(())` share a key.
//! Arguments are walked once with `FiniteCheck` before conversion so such
//! values fail instead.

use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

/// Serializes one argument into its canonical JSON value.
///
/// Fails with [`CacheError::Fingerprint`] when the value contains a
/// non-finite float or has no JSON representation at all.
pub fn to_argument<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value
        .serialize(FiniteCheck)
        .map_err(|e| CacheError::Fingerprint(e.0))?;
    serde_json::to_value(value).map_err(|e| CacheError::Fingerprint(e.to_string()))
}

#[derive(Debug)]
struct CheckError(String);

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CheckError {}

impl ser::Error for CheckError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CheckError(msg.to_string())
    }
}

type Checked = std::result::Result<(), CheckError>;

fn check_float(v: f64) -> Checked {
    if v.is_finite() {
        Ok(())
    } else {
        Err(CheckError(format!("non-finite float {v} has no canonical form")))
    }
}

/// Serializer that produces nothing and rejects non-finite floats.
struct FiniteCheck;

macro_rules! accept {
    ($($method:ident($ty:ty)),+ $(,)?) => {
        $(fn $method(self, _v: $ty) -> Checked {
            Ok(())
        })+
    };
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_f32(self, v: f32) -> Checked {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Checked {
        check_float(v)
    }

    fn serialize_none(self) -> Checked {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Checked {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Checked {
        Ok(())
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, _variant: &'static str) -> Checked {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Checked {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Checked {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, CheckError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Checked {
        key.serialize(FiniteCheck)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Checked {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde::Serialize;
    use serde_json::json;
    use test_case::test_case;

    #[derive(Serialize)]
    struct Rate {
        currency: &'static str,
        value: f64,
    }

    #[test_case(f64::INFINITY ; "positive infinity")]
    #[test_case(f64::NEG_INFINITY ; "negative infinity")]
    #[test_case(f64::NAN ; "nan")]
    fn test_non_finite_float_rejected(v: f64) {
        assert!(matches!(to_argument(&v), Err(CacheError::Fingerprint(_))));
        assert!(matches!(to_argument(&(v as f32)), Err(CacheError::Fingerprint(_))));
    }

    #[test]
    fn test_non_finite_nested_rejected() {
        let rate = Rate { currency: "EUR", value: f64::NAN };
        assert!(matches!(to_argument(&rate), Err(CacheError::Fingerprint(_))));
        assert!(to_argument(&vec![Some(1.0), Some(f64::INFINITY)]).is_err());

        let mut map = BTreeMap::new();
        map.insert("rate", f32::NEG_INFINITY);
        assert!(to_argument(&map).is_err());
    }

    #[test]
    fn test_finite_values_pass_through() {
        let rate = Rate { currency: "EUR", value: 1.5 };
        assert_eq!(to_argument(&rate).unwrap(), json!({ "currency": "EUR", "value": 1.5 }));
        assert_eq!(to_argument(&-0.0f64).unwrap(), json!(-0.0));
        assert_eq!(to_argument(&()).unwrap(), Value::Null);
        assert_eq!(to_argument(&Some("x")).unwrap(), json!("x"));
    }
}
