/// Logical fields a spreadsheet column can feed. Order is the auto-mapping
/// priority: a file laid out `date, amount, person, category, subcategory,
/// notes` maps with no manual work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Amount,
    Person,
    Category,
    Subcategory,
    Notes,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Date,
        Field::Amount,
        Field::Person,
        Field::Category,
        Field::Subcategory,
        Field::Notes,
    ];

    pub const REQUIRED: [Field; 4] = [Field::Date, Field::Amount, Field::Person, Field::Category];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Person => "person",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::Notes => "notes",
        }
    }

    /// Label shown to users, matching the spreadsheet headers they know.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Data",
            Self::Amount => "Valor",
            Self::Person => "Pessoa",
            Self::Category => "Categoria",
            Self::Subcategory => "Subcategoria",
            Self::Notes => "Observações",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.key() == key || f.label().to_lowercase() == key)
    }
}

/// Column-to-field assignment for one sheet. Invariant: each field occupies
/// at most one slot.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    slots: Vec<Option<Field>>,
}

impl ColumnMapping {
    /// All columns ignored.
    pub fn ignored(column_count: usize) -> Self {
        Self { slots: vec![None; column_count] }
    }

    /// Positional default: the first N columns take the N fields in priority
    /// order, the rest stay ignored.
    pub fn auto(column_count: usize) -> Self {
        let mut mapping = Self::ignored(column_count);
        for (col, field) in Field::ALL.iter().take(column_count).enumerate() {
            mapping.slots[col] = Some(*field);
        }
        mapping
    }

    pub fn column_count(&self) -> usize {
        self.slots.len()
    }

    /// Assign a field (or ignored) to a column. Last write wins: if the field
    /// already lives in another column, that slot is silently cleared so the
    /// 1:1 invariant holds. Out-of-range columns are ignored.
    pub fn assign(&mut self, col: usize, field: Option<Field>) {
        if col >= self.slots.len() {
            return;
        }
        if let Some(f) = field {
            for slot in &mut self.slots {
                if *slot == Some(f) {
                    *slot = None;
                }
            }
        }
        self.slots[col] = field;
    }

    pub fn field_at(&self, col: usize) -> Option<Field> {
        self.slots.get(col).copied().flatten()
    }

    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(field))
    }

    /// Required fields with no column; a non-empty result blocks validation.
    pub fn missing_required_fields(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.column_of(*f).is_none())
            .collect()
    }
}
