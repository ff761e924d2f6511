use ksuid::{
    BinaryColumn, Ksuid as InnerKsuid, KsuidGenerator, SystemClock, ThreadRandom, BYTE_LEN,
    PAYLOAD_LEN,
};
use pgrx::{
    callconv::{ArgAbi, BoxRet},
    datum::{FromDatum, IntoDatum},
    pg_sys,
    pgrx_sql_entity_graph::metadata::{
        ArgumentError, Returns, ReturnsError, SqlMapping, SqlTranslatable,
    },
    prelude::*,
    rust_regtypein, PgMemoryContexts, StringInfo,
};

pgrx::pg_module_magic!();

// ============================================================================
// KSUID
// ============================================================================

pub type Bytes = [u8; BYTE_LEN];

/// A PostgreSQL KSUID type backed by the `ksuid` crate.
///
/// Represents a 160-bit identifier: a 32-bit big-endian timestamp (seconds
/// since the KSUID epoch) followed by a 128-bit random payload.
///
/// Storage characteristics:
/// - Fixed width: 20 bytes
/// - Representation: raw binary KSUID, the same bytes the binary column
///   adapter produces
/// - Passed by reference (not by value)
/// - Byte order equals creation order at one-second granularity, so B-tree
///   indexes cluster by time
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, PostgresHash, PostgresEq, PostgresOrd,
)]
#[repr(transparent)]
pub struct KSUID {
    pub(crate) bytes: Bytes,
}

impl KSUID {
    #[inline(always)]
    pub const fn from_bytes(bytes: Bytes) -> Self {
        Self { bytes }
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[inline(always)]
    fn to_ksuid(self) -> InnerKsuid {
        InnerKsuid::from_bytes(self.bytes)
    }

    #[inline(always)]
    fn from_ksuid(id: InnerKsuid) -> Self {
        Self::from_bytes(id.marshal())
    }
}

impl From<InnerKsuid> for KSUID {
    #[inline(always)]
    fn from(id: InnerKsuid) -> Self {
        Self::from_ksuid(id)
    }
}

impl From<KSUID> for InnerKsuid {
    #[inline(always)]
    fn from(p: KSUID) -> Self {
        p.to_ksuid()
    }
}

impl core::fmt::Display for KSUID {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.to_ksuid().encode().fmt(f)
    }
}

// ============================================================================
// DATUM + CALLCONV GLUE
// ============================================================================

impl FromDatum for KSUID {
    unsafe fn from_polymorphic_datum(
        datum: pg_sys::Datum,
        is_null: bool,
        _typoid: pg_sys::Oid,
    ) -> Option<Self> {
        if is_null {
            return None;
        }

        // SAFETY:
        // - `ksuid` is defined with INTERNALLENGTH = 20 and STORAGE = plain, so
        //   Postgres stores exactly `size_of::<Bytes>()` bytes here.
        // - `Bytes` is `[u8; 20]` with alignment 1, so this cast is sound.
        // - We copy into a local `Bytes` and do not retain a pointer into
        //   Postgres-managed memory.
        let ptr = datum.cast_mut_ptr::<u8>() as *const Bytes;
        Some(KSUID::from_bytes(unsafe { *ptr }))
    }
}

impl IntoDatum for KSUID {
    fn into_datum(self) -> Option<pg_sys::Datum> {
        let raw: *mut Bytes = unsafe {
            // SAFETY:
            // - `CurrentMemoryContext` is a valid Postgres MemoryContext.
            // - `palloc_struct::<Bytes>()` allocates exactly
            //   `size_of::<Bytes>()` bytes and is aligned.
            PgMemoryContexts::CurrentMemoryContext.palloc_struct::<Bytes>()
        };

        unsafe {
            // SAFETY:
            // - `raw` points to uninitialized but valid memory for one `Bytes`.
            // - We fully initialize it before exposing it.
            *raw = self.bytes;
        }

        Some((raw as *mut u8).into())
    }

    fn type_oid() -> pg_sys::Oid {
        rust_regtypein::<Self>()
    }
}

unsafe impl<'fcx> ArgAbi<'fcx> for KSUID
where
    Self: 'fcx,
{
    unsafe fn unbox_arg_unchecked(arg: ::pgrx::callconv::Arg<'_, 'fcx>) -> Self {
        unsafe {
            arg.unbox_arg_using_from_datum()
                .unwrap_or_else(|| pgrx::error!("KSUID argument must not be NULL"))
        }
    }
}

unsafe impl BoxRet for KSUID {
    unsafe fn box_into<'fcx>(
        self,
        fcinfo: &mut pgrx::callconv::FcInfo<'fcx>,
    ) -> pgrx::datum::Datum<'fcx> {
        match self.into_datum() {
            Some(datum) => unsafe { fcinfo.return_raw_datum(datum) },
            None => fcinfo.return_null(),
        }
    }
}

unsafe impl SqlTranslatable for KSUID {
    fn argument_sql() -> Result<SqlMapping, ArgumentError> {
        Ok(SqlMapping::As("ksuid".into()))
    }
    fn return_sql() -> Result<Returns, ReturnsError> {
        Ok(Returns::One(SqlMapping::As("ksuid".into())))
    }
}

// ============================================================================
// TEXT I/O (base62 encoding/decoding)
// ============================================================================
#[pg_extern(immutable, parallel_safe, strict, requires = ["shell_type"])]
fn ksuid_in(input: &core::ffi::CStr) -> KSUID {
    InnerKsuid::decode(input.to_bytes())
        .map(KSUID::from_ksuid)
        .unwrap_or_else(|e| pgrx::error!("{}", e))
}

#[pg_extern(immutable, parallel_safe, strict, requires = ["shell_type"])]
fn ksuid_out(ksuid: KSUID) -> &'static core::ffi::CStr {
    let encoded = ksuid.to_ksuid().encode();
    let bytes = encoded.as_bytes();
    let len = bytes
        .len()
        .try_into()
        .unwrap_or_else(|e| pgrx::error!("KSUID base62 length overflowed i32: {}", e));

    let mut s = StringInfo::with_capacity(len);
    s.push_bytes(bytes);
    // SAFETY:
    // - `s` was created via `StringInfo::with_capacity` and only modified with
    //   `push_bytes`, which maintains the internal trailing NUL and correct
    //   len.
    // - base62 output is 27 non-NUL ASCII bytes, so there are no interior
    //   NULs.
    // - Postgres owns and frees the underlying memory.
    unsafe { s.leak_cstr() }
}

// ============================================================================
// KSUID GENERATION
// ============================================================================

static GENERATOR: KsuidGenerator<SystemClock, ThreadRandom> =
    KsuidGenerator::new(SystemClock, ThreadRandom);

/// Generate a new KSUID for the current second with a random payload
#[pg_extern(strict, parallel_safe)]
fn gen_ksuid() -> KSUID {
    GENERATOR
        .generate()
        .map(KSUID::from_ksuid)
        .unwrap_or_else(|e| pgrx::error!("failed to generate KSUID: {}", e))
}

// ============================================================================
// CASTING SUPPORT
// ============================================================================

// PostgreSQL epoch: 2000-01-01 00:00:00 UTC Unix epoch: 1970-01-01 00:00:00 UTC
// Difference: 946684800 seconds = 946684800000000 microseconds
const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Cast KSUID to timestamptz (requires explicit cast)
#[pg_cast(immutable, parallel_safe, strict)]
fn ksuid_to_timestamptz(ksuid: KSUID) -> TimestampWithTimeZone {
    let unix_micros = (ksuid.to_ksuid().timestamp() as i64).saturating_mul(MICROS_PER_SECOND);
    let pg_micros = unix_micros.saturating_sub(PG_EPOCH_OFFSET_MICROS);

    TimestampWithTimeZone::try_from(pg_micros)
        .unwrap_or_else(|e| pgrx::error!("timestamp out of range: {}", e))
}

/// Cast timestamptz to KSUID (requires explicit cast)
///
/// The result has an all-zero payload: the smallest KSUID of that second, which
/// makes it a lower bound for range scans.
#[pg_cast(immutable, parallel_safe, strict)]
fn timestamptz_to_ksuid(ts: TimestampWithTimeZone) -> KSUID {
    let pg_micros: i64 = ts
        .try_into()
        .unwrap_or_else(|e| pgrx::error!("invalid timestamp: {}", e));

    let unix_micros = pg_micros.saturating_add(PG_EPOCH_OFFSET_MICROS);
    let unix_seconds = u64::try_from(unix_micros.div_euclid(MICROS_PER_SECOND))
        .unwrap_or_else(|_| pgrx::error!("timestamp precedes the Unix epoch"));

    InnerKsuid::from_unix_parts(unix_seconds, &[0; PAYLOAD_LEN])
        .map(KSUID::from_ksuid)
        .unwrap_or_else(|e| pgrx::error!("{}", e))
}

/// Cast text to KSUID (requires explicit cast)
#[pg_cast(immutable, parallel_safe, strict)]
fn text_to_ksuid(text: &str) -> KSUID {
    InnerKsuid::decode(text)
        .map(KSUID::from_ksuid)
        .unwrap_or_else(|e| pgrx::error!("{}", e))
}

/// Cast KSUID to text (requires explicit cast)
#[pg_cast(immutable, parallel_safe, strict)]
fn ksuid_to_text(ksuid: KSUID) -> String {
    ksuid.to_ksuid().encode().as_string()
}

/// Cast bytea to KSUID (requires explicit cast)
#[pg_cast(immutable, parallel_safe, strict)]
fn bytea_to_ksuid(bytes: &[u8]) -> KSUID {
    InnerKsuid::unmarshal(bytes)
        .map(KSUID::from_ksuid)
        .unwrap_or_else(|e| pgrx::error!("{}", e))
}

/// Cast KSUID to bytea (requires explicit cast)
#[pg_cast(immutable, parallel_safe, strict)]
fn ksuid_to_bytea(ksuid: KSUID) -> Vec<u8> {
    ksuid.to_ksuid().marshal().to_vec()
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Check if a string is a valid KSUID
#[pg_extern(immutable, parallel_safe, strict)]
fn ksuid_is_valid(text: &str) -> bool {
    InnerKsuid::decode(text).is_ok()
}

/// Seconds since the Unix epoch encoded in the KSUID
#[pg_extern(immutable, parallel_safe, strict)]
fn ksuid_timestamp(ksuid: KSUID) -> i64 {
    ksuid.to_ksuid().timestamp() as i64
}

/// The 16-byte random payload
#[pg_extern(immutable, parallel_safe, strict)]
fn ksuid_payload(ksuid: KSUID) -> Vec<u8> {
    ksuid.to_ksuid().payload().to_vec()
}

// ============================================================================
// SQL TYPE CREATION
// ============================================================================
extension_sql!(r#"CREATE TYPE ksuid;"#, name = "shell_type", bootstrap);
extension_sql!(
    r#"
CREATE TYPE ksuid (
    INPUT = ksuid_in,
    OUTPUT = ksuid_out,
    INTERNALLENGTH = 20,
    ALIGNMENT = char,
    STORAGE = plain,
    PASSEDBYVALUE = false
);
"#,
    name = "concrete_type",
    creates = [Type(KSUID)],
    requires = ["shell_type", ksuid_in, ksuid_out]
);
extension_sql!(
    r#"
COMMENT ON TYPE ksuid IS 'K-Sortable Unique IDentifier - 160-bit identifier ordered by creation second';
COMMENT ON FUNCTION gen_ksuid() IS 'Generate a new KSUID for the current second';
COMMENT ON FUNCTION ksuid_is_valid(text) IS 'Check if a text string is a valid KSUID';
COMMENT ON FUNCTION ksuid_timestamp(ksuid) IS 'Unix seconds encoded in a KSUID';
COMMENT ON FUNCTION ksuid_payload(ksuid) IS 'Random payload of a KSUID';
"#,
    name = "add_comments",
    requires = [
        "concrete_type",
        gen_ksuid,
        ksuid_is_valid,
        ksuid_timestamp,
        ksuid_payload
    ]
);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(any(test, feature = "pg_test"))]
#[pg_schema]
mod tests {
    use super::*;

    const KNOWN_TEXT: &str = "0ujtsYcgvSTl8PAuAdqWYSMnLOv";
    const KNOWN_UNIX_SECONDS: i64 = 1_507_608_047;

    // ========================================================================
    // Core Type Tests
    // ========================================================================

    /// Verify KSUID has correct type properties in PostgreSQL catalog
    #[pg_test]
    fn type_properties() {
        assert_eq!(
            core::mem::size_of::<KSUID>(),
            20,
            "Rust size should be 20 bytes"
        );

        let typlen = Spi::get_one::<i16>("SELECT typlen FROM pg_type WHERE typname = 'ksuid'")
            .unwrap()
            .unwrap();
        assert_eq!(typlen, 20, "PostgreSQL INTERNALLENGTH should be 20");

        let typalign =
            Spi::get_one::<String>("SELECT typalign::text FROM pg_type WHERE typname = 'ksuid'")
                .unwrap()
                .unwrap();
        assert_eq!(typalign, "c", "Alignment should be char");

        let typstorage =
            Spi::get_one::<String>("SELECT typstorage::text FROM pg_type WHERE typname = 'ksuid'")
                .unwrap()
                .unwrap();
        assert_eq!(typstorage, "p", "Storage should be plain");

        let typbyval = Spi::get_one::<bool>("SELECT typbyval FROM pg_type WHERE typname = 'ksuid'")
            .unwrap()
            .unwrap();
        assert!(!typbyval, "Should be passed by reference");
    }

    /// Verify storage is exactly 20 bytes (no varlena header)
    #[pg_test]
    fn fixed_size_storage() {
        let ksuid = gen_ksuid();
        let size = Spi::get_one::<i32>(&format!("SELECT pg_column_size('{}'::ksuid)", ksuid))
            .unwrap()
            .unwrap();
        assert_eq!(size, 20, "Storage must be exactly 20 bytes");
    }

    // ========================================================================
    // Generation Tests
    // ========================================================================

    #[pg_test]
    fn generation_basic() {
        let a = gen_ksuid();
        let b = gen_ksuid();
        assert_ne!(a, b, "Random payloads should differ");
    }

    #[pg_test]
    fn generation_uses_current_second() {
        let now = Spi::get_one::<i64>("SELECT extract(epoch FROM clock_timestamp())::bigint")
            .unwrap()
            .unwrap();
        let ts = ksuid_timestamp(gen_ksuid());
        assert!((ts - now).abs() <= 2, "expected ~{now}, got {ts}");
    }

    // ========================================================================
    // Text I/O Tests
    // ========================================================================

    #[pg_test]
    fn text_io_known_vector() {
        let text = Spi::get_one::<String>(&format!("SELECT '{}'::ksuid::text", KNOWN_TEXT))
            .unwrap()
            .unwrap();
        assert_eq!(text, KNOWN_TEXT);

        let ts = Spi::get_one::<i64>(&format!("SELECT ksuid_timestamp('{}'::ksuid)", KNOWN_TEXT))
            .unwrap()
            .unwrap();
        assert_eq!(ts, KNOWN_UNIX_SECONDS);
    }

    #[pg_test]
    fn text_io_round_trip() {
        let ksuid = gen_ksuid();
        let parsed = Spi::get_one::<KSUID>(&format!("SELECT '{}'::ksuid", ksuid))
            .unwrap()
            .unwrap();
        assert_eq!(parsed, ksuid);
    }

    #[pg_test(error = "invalid ksuid encoding: invalid length: expected 27 characters, got 3")]
    fn text_io_rejects_short_input() {
        Spi::run("SELECT 'abc'::ksuid").unwrap();
    }

    #[pg_test(error = "invalid ksuid encoding: decoded value overflows 20 bytes")]
    fn text_io_rejects_overflow() {
        Spi::run("SELECT 'aWgEPTl1tmebfsQzFP4bxwgy80W'::ksuid").unwrap();
    }

    #[pg_test]
    fn validity_check() {
        assert!(ksuid_is_valid(KNOWN_TEXT));
        assert!(ksuid_is_valid("aWgEPTl1tmebfsQzFP4bxwgy80V"));
        assert!(!ksuid_is_valid("aWgEPTl1tmebfsQzFP4bxwgy80W"));
        assert!(!ksuid_is_valid("0ujtsYcgvSTl8PAuAdqWYSMnLO!"));
        assert!(!ksuid_is_valid(""));
    }

    // ========================================================================
    // Cast Tests
    // ========================================================================

    #[pg_test]
    fn cast_bytea_round_trip() {
        let ksuid = gen_ksuid();
        let bytes = Spi::get_one::<Vec<u8>>(&format!("SELECT '{}'::ksuid::bytea", ksuid))
            .unwrap()
            .unwrap();
        assert_eq!(bytes.as_slice(), ksuid.as_bytes());

        let back = Spi::get_one::<KSUID>(&format!(
            "SELECT '\\x{}'::bytea::ksuid",
            bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
        ))
        .unwrap()
        .unwrap();
        assert_eq!(back, ksuid);
    }

    #[pg_test(error = "invalid ksuid length: expected 20 bytes, got 3")]
    fn cast_bytea_rejects_wrong_length() {
        Spi::run("SELECT '\\x010203'::bytea::ksuid").unwrap();
    }

    #[pg_test]
    fn cast_known_bytes() {
        let hex = Spi::get_one::<String>(&format!(
            "SELECT encode('{}'::ksuid::bytea, 'hex')",
            KNOWN_TEXT
        ))
        .unwrap()
        .unwrap();
        assert_eq!(hex, "0669f7efb5a1cd34b5f99d1154fb6853345c9735");

        let payload = Spi::get_one::<String>(&format!(
            "SELECT encode(ksuid_payload('{}'::ksuid), 'hex')",
            KNOWN_TEXT
        ))
        .unwrap()
        .unwrap();
        assert_eq!(payload, "b5a1cd34b5f99d1154fb6853345c9735");
    }

    #[pg_test]
    fn cast_timestamptz() {
        let epoch = Spi::get_one::<i64>(&format!(
            "SELECT extract(epoch FROM '{}'::ksuid::timestamptz)::bigint",
            KNOWN_TEXT
        ))
        .unwrap()
        .unwrap();
        assert_eq!(epoch, KNOWN_UNIX_SECONDS);

        let lower = Spi::get_one::<KSUID>(
            "SELECT '2017-10-10 04:00:47+00'::timestamptz::ksuid",
        )
        .unwrap()
        .unwrap();
        assert_eq!(ksuid_timestamp(lower), KNOWN_UNIX_SECONDS);
        assert_eq!(ksuid_payload(lower), vec![0u8; PAYLOAD_LEN]);
    }

    #[pg_test(error = "timestamp out of range: Some(1000000000)")]
    fn cast_timestamptz_rejects_before_ksuid_epoch() {
        Spi::run("SELECT '2001-09-09 01:46:40+00'::timestamptz::ksuid").unwrap();
    }

    // ========================================================================
    // Storage Tests
    // ========================================================================

    #[pg_test]
    fn storage_round_trip() {
        let original = gen_ksuid();

        Spi::run("CREATE TEMP TABLE ksuid_test (id ksuid)").unwrap();
        Spi::run(&format!("INSERT INTO ksuid_test VALUES ('{}'::ksuid)", original)).unwrap();

        let retrieved = Spi::get_one::<KSUID>("SELECT id FROM ksuid_test")
            .unwrap()
            .unwrap();
        assert_eq!(original, retrieved, "KSUID should survive storage round-trip");
    }

    #[pg_test]
    fn storage_null_handling() {
        Spi::run("CREATE TEMP TABLE ksuid_nullable (id ksuid)").unwrap();
        Spi::run("INSERT INTO ksuid_nullable VALUES (NULL)").unwrap();

        let result = Spi::get_one::<KSUID>("SELECT id FROM ksuid_nullable").unwrap();
        assert!(result.is_none(), "NULL should be returned as None");
    }

    /// Verify B-tree index orders by timestamp, then payload
    #[pg_test]
    fn storage_btree_index() {
        let early = KSUID::from(InnerKsuid::from_components(1, [0xFF; PAYLOAD_LEN]));
        let middle = KSUID::from(InnerKsuid::from_components(2, [0x00; PAYLOAD_LEN]));
        let late = KSUID::from(InnerKsuid::from_components(2, [0x01; PAYLOAD_LEN]));

        Spi::run("CREATE TEMP TABLE ksuid_indexed (id ksuid PRIMARY KEY)").unwrap();
        Spi::run(&format!(
            "INSERT INTO ksuid_indexed VALUES ('{}'::ksuid), ('{}'::ksuid), ('{}'::ksuid)",
            late, early, middle
        ))
        .unwrap();

        let first = Spi::get_one::<KSUID>("SELECT id FROM ksuid_indexed ORDER BY id LIMIT 1")
            .unwrap()
            .unwrap();
        let last = Spi::get_one::<KSUID>("SELECT id FROM ksuid_indexed ORDER BY id DESC LIMIT 1")
            .unwrap()
            .unwrap();

        assert_eq!(first, early, "Smallest KSUID should come first");
        assert_eq!(last, late, "Largest KSUID should come last");
    }

    #[pg_test]
    fn storage_hash_index() {
        let ksuid = gen_ksuid();

        Spi::run("CREATE TEMP TABLE ksuid_hash (id ksuid)").unwrap();
        Spi::run("CREATE INDEX ksuid_hash_idx ON ksuid_hash USING hash(id)").unwrap();
        Spi::run(&format!("INSERT INTO ksuid_hash VALUES ('{}'::ksuid)", ksuid)).unwrap();

        let found = Spi::get_one::<bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM ksuid_hash WHERE id = '{}'::ksuid)",
            ksuid
        ))
        .unwrap()
        .unwrap();

        assert!(found, "Hash index should find inserted KSUID");
    }

    // ========================================================================
    // Range Query Tests
    // ========================================================================

    #[pg_test]
    fn range_query_by_timestamp() {
        let at = |secs: u64, fill: u8| {
            KSUID::from(InnerKsuid::from_unix_parts(secs, &[fill; PAYLOAD_LEN]).unwrap())
        };
        // 2024-01-01 10:00, 12:00 and 14:00 UTC
        let a = at(1_704_103_200, 0x7F);
        let b = at(1_704_110_400, 0x7F);
        let c = at(1_704_117_600, 0x7F);

        Spi::run("CREATE TEMP TABLE events (id ksuid PRIMARY KEY)").unwrap();
        Spi::run(&format!(
            "INSERT INTO events VALUES ('{}'::ksuid), ('{}'::ksuid), ('{}'::ksuid)",
            a, b, c
        ))
        .unwrap();

        let count = Spi::get_one::<i64>(
            "SELECT COUNT(*) FROM events \
             WHERE id >= '2024-01-01 10:00:00+00'::timestamptz::ksuid \
               AND id < '2024-01-01 14:00:00+00'::timestamptz::ksuid",
        )
        .unwrap()
        .unwrap();

        assert_eq!(count, 2, "Should find events at 10am and 12pm");
    }

    #[pg_test]
    fn aggregate_distinct() {
        let ksuid = gen_ksuid();

        Spi::run("CREATE TEMP TABLE ksuid_distinct (id ksuid)").unwrap();
        Spi::run(&format!(
            "INSERT INTO ksuid_distinct VALUES ('{}'::ksuid), ('{}'::ksuid), ('{}'::ksuid)",
            ksuid, ksuid, ksuid
        ))
        .unwrap();

        let count = Spi::get_one::<i64>("SELECT COUNT(DISTINCT id) FROM ksuid_distinct")
            .unwrap()
            .unwrap();

        assert_eq!(count, 1, "Should count only unique KSUIDs");
    }
}
