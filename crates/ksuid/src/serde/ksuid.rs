use core::fmt;

use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{BYTE_LEN, Ksuid};

/// Human-readable formats get the 27-character base62 string; binary formats
/// get the 20 raw bytes.
impl Serialize for Ksuid {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&self.encode())
        } else {
            s.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Ksuid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        if d.is_human_readable() {
            d.deserialize_str(KsuidVisitor)
        } else {
            d.deserialize_bytes(KsuidVisitor)
        }
    }
}

struct KsuidVisitor;

impl<'de> de::Visitor<'de> for KsuidVisitor {
    type Value = Ksuid;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a base62 encoded string or 20 raw bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ksuid::decode(v).map_err(de::Error::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ksuid::try_from_slice(v).map_err(de::Error::custom)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = [0_u8; BYTE_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(BYTE_LEN + 1, &self));
        }
        Ok(Ksuid::from_bytes(bytes))
    }
}

/// Always (de)serializes as the base62 string, regardless of format.
///
/// Use with `#[serde(with = "ksuid::serde::as_base62")]`.
pub mod as_base62 {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Ksuid, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.encode())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Ksuid, D::Error> {
        d.deserialize_str(KsuidVisitor)
    }
}

/// Always (de)serializes as the 20 raw bytes, regardless of format.
///
/// Use with `#[serde(with = "ksuid::serde::as_bytes")]`.
pub mod as_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Ksuid, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(id.as_bytes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Ksuid, D::Error> {
        d.deserialize_bytes(KsuidVisitor)
    }
}
