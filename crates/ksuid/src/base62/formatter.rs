use core::{fmt, ops::Deref};

use crate::{Ksuid, base62::encode_base62, id::ENCODED_LEN};

/// An owned, stack-allocated base62 rendering of a [`Ksuid`].
///
/// Returned by [`Ksuid::encode`]. Dereferences to `str` and implements
/// [`fmt::Display`], so it can be printed, compared, or parsed back without a
/// heap allocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base62Formatter {
    buf: [u8; ENCODED_LEN],
}

impl Base62Formatter {
    pub fn new(id: &Ksuid) -> Self {
        let mut buf = [0_u8; ENCODED_LEN];
        encode_base62(id.as_bytes(), &mut buf);
        Self { buf }
    }

    /// Returns a `&str` view of the base62 encoding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: `self.buf` holds only base62 ASCII characters
        unsafe { core::str::from_utf8_unchecked(&self.buf) }
    }

    /// Returns an allocated `String` of the base62 encoding.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn as_string(&self) -> alloc::string::String {
        alloc::string::String::from(self.as_str())
    }

    /// Consumes the formatter and returns the raw buffer.
    pub const fn into_inner(self) -> [u8; ENCODED_LEN] {
        self.buf
    }
}

impl Deref for Base62Formatter {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Base62Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Base62Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl AsRef<str> for Base62Formatter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for Base62Formatter {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl PartialEq<str> for Base62Formatter {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Base62Formatter {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(feature = "alloc")]
impl PartialEq<alloc::string::String> for Base62Formatter {
    fn eq(&self, other: &alloc::string::String) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A base62 view that borrows a caller-supplied buffer.
///
/// Returned by [`Ksuid::encode_to_buf`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base62FormatterRef<'buf> {
    buf: &'buf [u8; ENCODED_LEN],
}

impl<'buf> Base62FormatterRef<'buf> {
    pub fn new(id: &Ksuid, buf: &'buf mut [u8; ENCODED_LEN]) -> Self {
        encode_base62(id.as_bytes(), buf);
        Self { buf }
    }

    /// Returns a `&str` view of the base62 encoding.
    #[must_use]
    pub fn as_str(&self) -> &'buf str {
        // SAFETY: `self.buf` holds only base62 ASCII characters
        unsafe { core::str::from_utf8_unchecked(self.buf) }
    }
}

impl Deref for Base62FormatterRef<'_> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Base62FormatterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Base62FormatterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl AsRef<str> for Base62FormatterRef<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Base62FormatterRef<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Base62FormatterRef<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use crate::{ENCODED_LEN, Ksuid};

    #[test]
    fn formatter_views_agree() {
        let id = Ksuid::decode("0ujtsYcgvSTl8PAuAdqWYSMnLOv").unwrap();

        let owned = id.encode();
        assert_eq!(owned, "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
        assert_eq!(owned.len(), ENCODED_LEN);
        assert_eq!(&owned.into_inner(), b"0ujtsYcgvSTl8PAuAdqWYSMnLOv");

        let mut buf = [0_u8; ENCODED_LEN];
        let borrowed = id.encode_to_buf(&mut buf);
        assert_eq!(borrowed, owned.as_str());
        assert_eq!(&buf, b"0ujtsYcgvSTl8PAuAdqWYSMnLOv");
    }

    #[cfg(feature = "std")]
    #[test]
    fn formatter_displays_as_text() {
        let id = Ksuid::MAX;
        assert_eq!(format!("{}", id.encode()), "aWgEPTl1tmebfsQzFP4bxwgy80V");
        assert_eq!(format!("{:?}", id.encode()), "\"aWgEPTl1tmebfsQzFP4bxwgy80V\"");
        assert_eq!(id.encode().as_string(), "aWgEPTl1tmebfsQzFP4bxwgy80V");
    }
}
