use regex::Regex;
use serde_json::Value;

/// Declared type of a field. Scalars are coerced into this type when the raw
/// value is a compatible string (`"42"` for a number, `"true"` for a boolean).
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object(Schema),
    Array(Box<FieldType>),
}

/// Constraint checked after the type check succeeds.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Rejects `""`. Checked before every other rule; a failure ends the field.
    NonEmpty,
    Pattern(Regex),
    Email,
    Uuid,
    /// Inclusive numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive length bounds: characters for strings, items for arrays.
    Length { min: Option<usize>, max: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) required: bool,
    pub(crate) rules: Vec<Rule>,
    pub(crate) default: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            rules: Vec::new(),
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldType::Object(schema))
    }

    pub fn array(name: impl Into<String>, items: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(items)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn non_empty(self) -> Self {
        self.rule(Rule::NonEmpty)
    }

    pub fn pattern(self, re: Regex) -> Self {
        self.rule(Rule::Pattern(re))
    }

    pub fn email(self) -> Self {
        self.rule(Rule::Email)
    }

    pub fn uuid(self) -> Self {
        self.rule(Rule::Uuid)
    }

    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.rule(Rule::Range { min, max })
    }

    pub fn length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.rule(Rule::Length { min, max })
    }

    /// Value inserted into the sanitized output when the field is absent.
    /// Defaults are trusted and not re-validated.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Ordered set of fields. Order matters: violations are reported in it.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}
