#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use typed_csv::{
    symbolic_field_type, CsvError, FieldType, FieldValue, Fields, Record, SchemaBuilder, Symbolic,
    Uri,
};
use uuid::Uuid;

/// `value` and `from_fields` for records whose source names match their Rust fields.
macro_rules! record_fields {
    ($($field:ident),* $(,)?) => {
        fn value(&self, field: &str) -> Option<FieldValue<'_>> {
            match field {
                $(stringify!($field) => Some(self.$field.to_value()),)*
                _ => None,
            }
        }

        fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
            Ok(Self {
                $($field: fields.take(stringify!($field))?,)*
            })
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Blaster,
    Lightsaber,
    Deflector,
}

impl Symbolic for WeaponKind {
    const SYMBOLS: &'static [&'static str] = &["Blaster", "Lightsaber", "Deflector"];

    fn symbol(&self) -> &'static str {
        match self {
            WeaponKind::Blaster => "Blaster",
            WeaponKind::Lightsaber => "Lightsaber",
            WeaponKind::Deflector => "Deflector",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "Blaster" => Some(WeaponKind::Blaster),
            "Lightsaber" => Some(WeaponKind::Lightsaber),
            "Deflector" => Some(WeaponKind::Deflector),
            _ => None,
        }
    }
}

symbolic_field_type!(WeaponKind);

#[derive(Debug, Clone, PartialEq)]
pub struct Flags {
    pub flag: bool,
    pub byte: u8,
}

impl Record for Flags {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<bool>("flag").column("Bool");
        schema.field::<u8>("byte").column("Byte");
    }

    record_fields!(flag, byte);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub name: String,
}

impl Record for Hero {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<String>("name").column("Name");
    }

    record_fields!(name);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub id: u32,
    pub name: String,
    pub weight: f64,
    pub made: NaiveDate,
}

impl Record for Weapon {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<u32>("id");
        schema.field::<String>("name");
        schema.field::<f64>("weight");
        schema.field::<NaiveDate>("made");
    }

    record_fields!(id, name, weight, made);
}

/// One field of every built-in kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AllKinds {
    pub flag: bool,
    pub byte: u8,
    pub small: i8,
    pub short: i16,
    pub ushort: u16,
    pub int: i32,
    pub uint: u32,
    pub long: i64,
    pub ulong: u64,
    pub single: f32,
    pub double: f64,
    pub money: Decimal,
    pub initial: char,
    pub text: String,
    pub stamp: NaiveDateTime,
    pub day: NaiveDate,
    pub clock: NaiveTime,
    pub span: TimeDelta,
    pub id: Uuid,
    pub link: Uri,
    pub kind: WeaponKind,
}

impl Record for AllKinds {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<bool>("flag");
        schema.field::<u8>("byte");
        schema.field::<i8>("small");
        schema.field::<i16>("short");
        schema.field::<u16>("ushort");
        schema.field::<i32>("int");
        schema.field::<u32>("uint");
        schema.field::<i64>("long");
        schema.field::<u64>("ulong");
        schema.field::<f32>("single");
        schema.field::<f64>("double");
        schema.field::<Decimal>("money");
        schema.field::<char>("initial");
        schema.field::<String>("text");
        schema.field::<NaiveDateTime>("stamp");
        schema.field::<NaiveDate>("day");
        schema.field::<NaiveTime>("clock");
        schema.field::<TimeDelta>("span");
        schema.field::<Uuid>("id");
        schema.field::<Uri>("link");
        schema.field::<WeaponKind>("kind");
    }

    record_fields!(
        flag, byte, small, short, ushort, int, uint, long, ulong, single, double, money, initial,
        text, stamp, day, clock, span, id, link, kind,
    );
}

/// The optional variant of every built-in kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Optionals {
    pub flag: Option<bool>,
    pub int: Option<i32>,
    pub double: Option<f64>,
    pub money: Option<Decimal>,
    pub initial: Option<char>,
    pub text: Option<String>,
    pub stamp: Option<NaiveDateTime>,
    pub day: Option<NaiveDate>,
    pub clock: Option<NaiveTime>,
    pub span: Option<TimeDelta>,
    pub id: Option<Uuid>,
    pub link: Option<Uri>,
    pub kind: Option<WeaponKind>,
}

impl Record for Optionals {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<Option<bool>>("flag");
        schema.field::<Option<i32>>("int");
        schema.field::<Option<f64>>("double");
        schema.field::<Option<Decimal>>("money");
        schema.field::<Option<char>>("initial");
        schema.field::<Option<String>>("text");
        schema.field::<Option<NaiveDateTime>>("stamp");
        schema.field::<Option<NaiveDate>>("day");
        schema.field::<Option<NaiveTime>>("clock");
        schema.field::<Option<TimeDelta>>("span");
        schema.field::<Option<Uuid>>("id");
        schema.field::<Option<Uri>>("link");
        schema.field::<Option<WeaponKind>>("kind");
    }

    record_fields!(
        flag, int, double, money, initial, text, stamp, day, clock, span, id, link, kind
    );
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_all_kinds() -> AllKinds {
    AllKinds {
        flag: true,
        byte: 102,
        small: -8,
        short: -1600,
        ushort: 65_000,
        int: -2_000_000,
        uint: 4_000_000_000,
        long: i64::MIN,
        ulong: u64::MAX,
        single: 1.5,
        double: -20.25,
        money: Decimal::new(1_999, 2),
        initial: '"',
        text: "Tony \"Iron Man\" Stark, genius\r\nbillionaire".into(),
        stamp: date(2019, 12, 13).and_hms_milli_opt(14, 30, 5, 250).unwrap(),
        day: date(1977, 5, 25),
        clock: NaiveTime::from_hms_opt(23, 59, 1).unwrap(),
        span: TimeDelta::new(3 * 86_400 + 3_723, 400_000_000).unwrap(),
        id: Uuid::from_u128(0x6f9619ff_8b86_d011_b42d_00c04fc964ff),
        link: Uri("https://example.com/armory?kind=blaster&page=2".into()),
        kind: WeaponKind::Lightsaber,
    }
}
