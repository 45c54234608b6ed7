use chrono::NaiveDate;
use typed_csv::{
    symbolic_field_type, CsvError, CsvSerializer, DecoderOptions, EncoderOptions, FieldType,
    FieldValue, Fields, FormatContext, Record, SchemaBuilder, Symbolic,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Blaster,
    Deflector,
}

impl Symbolic for Kind {
    const SYMBOLS: &'static [&'static str] = &["Blaster", "Deflector"];

    fn symbol(&self) -> &'static str {
        match self {
            Kind::Blaster => "Blaster",
            Kind::Deflector => "Deflector",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "Blaster" => Some(Kind::Blaster),
            "Deflector" => Some(Kind::Deflector),
            _ => None,
        }
    }
}

symbolic_field_type!(Kind);

#[derive(Debug, Clone, PartialEq)]
struct Weapon {
    id: u32,
    name: String,
    kind: Kind,
    weight: f64,
    made: NaiveDate,
    owner: Option<String>,
}

impl Record for Weapon {
    fn describe(schema: &mut SchemaBuilder) {
        schema.field::<u32>("id").column("Id");
        schema.field::<String>("name").column("Name");
        schema.field::<Kind>("kind").column("Kind");
        schema.field::<f64>("weight").column("Weight");
        schema
            .field::<NaiveDate>("made")
            .column("Made")
            .date_format("%d %b %Y");
        schema.field::<Option<String>>("owner").column("Owner");
    }

    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "kind" => Some(self.kind.to_value()),
            "weight" => Some(self.weight.to_value()),
            "made" => Some(self.made.to_value()),
            "owner" => Some(self.owner.to_value()),
            _ => None,
        }
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
        Ok(Self {
            id: fields.take("id")?,
            name: fields.take("name")?,
            kind: fields.take("kind")?,
            weight: fields.take("weight")?,
            made: fields.take("made")?,
            owner: fields.take("owner")?,
        })
    }
}

fn main() -> Result<(), CsvError> {
    println!("=== Typed CSV Roundtrip Examples ===\n");

    let csv = CsvSerializer::new();
    let weapons = vec![
        Weapon {
            id: 10,
            name: "Deflector, Dust".into(),
            kind: Kind::Deflector,
            weight: 20.5,
            made: NaiveDate::from_ymd_opt(2019, 12, 13).unwrap_or_default(),
            owner: Some("Tony \"Iron Man\" Stark".into()),
        },
        Weapon {
            id: 11,
            name: "E-11".into(),
            kind: Kind::Blaster,
            weight: 3.9,
            made: NaiveDate::from_ymd_opt(1977, 5, 25).unwrap_or_default(),
            owner: None,
        },
    ];

    // Example 1: Invariant culture, comma delimiter
    println!("1. Invariant culture:");
    let ctx = FormatContext::default();
    let text = csv.serialize(&weapons, &EncoderOptions { with_header: true }, &ctx)?;
    println!("{text}");

    // Example 2: Culture and delimiter loaded from configuration
    println!("2. fr-FR culture from JSON configuration:");
    let ctx = FormatContext::from_json(r#"{"culture": "fr-FR", "delimiter": ";"}"#)?;
    let text = csv.serialize(&weapons, &EncoderOptions { with_header: true }, &ctx)?;
    println!("{text}");

    // Example 3: Reading the rows back
    println!("3. Deserialized records:");
    let records = csv.deserialize::<Weapon>(&text, &DecoderOptions { has_header: true }, &ctx)?;
    for weapon in &records {
        println!("{:?}", weapon?);
    }

    // Example 4: A malformed row
    println!("\n4. Error reporting:");
    let broken = "10;\"Deflector, Dust\";Deflector;20,5\r\n";
    match csv
        .deserialize::<Weapon>(broken, &DecoderOptions::default(), &ctx)?
        .into_iter()
        .next()
    {
        Some(Err(err)) => println!("{err}"),
        other => println!("unexpected: {other:?}"),
    }

    println!("\n✓ Roundtrip complete ({} cached schema)", csv.cache().len());
    Ok(())
}
