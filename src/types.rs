use std::fmt;

// --------------------------------------------------------------------------------------------------------------------
// Catalog dialects
// --------------------------------------------------------------------------------------------------------------------

/// Flavour of the catalog being inspected
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Mysql,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Postgres
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Mysql => write!(f, "mysql"),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------
// Field kinds
// --------------------------------------------------------------------------------------------------------------------

/// Semantic kind of a column, argument or result slot.
/// An unresolved kind is represented as `Option::<Kind>::None` and never reaches the model.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Boolean,
    Json,
    Number,
    String,
    Time,
    Enum,
    Array,
    Binary,
    Uuid,
}

impl Kind {
    /// Name of the query-builder type constructed for this kind
    pub fn constructor(self) -> &'static str {
        match self {
            Kind::Boolean => "BooleanColumn",
            Kind::Json => "JsonColumn",
            Kind::Number => "NumberColumn",
            Kind::String => "StringColumn",
            Kind::Time => "TimeColumn",
            Kind::Enum => "EnumColumn",
            Kind::Array => "ArrayColumn",
            Kind::Binary => "BinaryColumn",
            Kind::Uuid => "UuidColumn",
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------
// Raw catalog records, as scanned
// --------------------------------------------------------------------------------------------------------------------

/// Column of a table or view, straight from the catalog
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub data_type: String,
    // Only MySQL reports it, e.g. `tinyint(1)` for a `tinyint` column
    pub exact_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawTable {
    pub schema: String,
    pub name: String,
    pub table_type: String,
    pub columns: Vec<RawField>,
}

impl RawTable {
    pub fn is_view(&self) -> bool {
        self.table_type.to_uppercase().contains("VIEW")
    }
}

/// One signature of a stored function; overloads share schema and name
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawFunction {
    pub schema: String,
    pub name: String,
    pub arguments: String,
    pub result: String,
}

// --------------------------------------------------------------------------------------------------------------------
// Populated records, ready to be rendered
// --------------------------------------------------------------------------------------------------------------------

/// Column of a table, or result slot of a function
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ident: String,
    pub kind: Kind,
    pub constructor: String,
}

/// Argument of a function constructor
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ident: String,
    pub kind: Kind,
    pub rs_type: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub is_view: bool,
    pub struct_name: String,
    pub constructor: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Function {
    pub schema: String,
    pub name: String,
    pub signature: String,
    pub struct_name: String,
    pub constructor: String,
    pub arguments: Vec<Argument>,
    pub results: Vec<Field>,
}

/// Everything the renderer needs, in output order
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Model {
    pub tables: Vec<Table>,
    pub functions: Vec<Function>,
}
