use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::TableError;

/// The five logical columns every upload must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Category,
    Product,
    Quantity,
    Amount,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Date,
        Role::Category,
        Role::Product,
        Role::Quantity,
        Role::Amount,
    ];

    /// Canonical lowercase name, as used in config files and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Category => "category",
            Role::Product => "product",
            Role::Quantity => "quantity",
            Role::Amount => "amount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// Built-in header spellings per logical column. The upstream exports carry
/// Russian headers; the English names cover everything else seen so far.
static BUILTIN_ALIASES: &[(Role, &[&str])] = &[
    (Role::Date, &["date", "дата"]),
    (Role::Category, &["category", "категория"]),
    (Role::Product, &["product", "item", "товар"]),
    (Role::Quantity, &["quantity", "qty", "количество"]),
    (Role::Amount, &["amount", "sum", "total", "сумма"]),
];

static BUILTIN: Lazy<AliasTable> = Lazy::new(|| {
    let mut table = AliasTable {
        by_header: HashMap::new(),
    };
    for (role, names) in BUILTIN_ALIASES {
        for name in *names {
            table.insert(*role, name);
        }
    }
    table
});

/// Lookup from normalized header spelling to logical column.
#[derive(Debug, Clone)]
pub struct AliasTable {
    by_header: HashMap<String, Role>,
}

impl AliasTable {
    /// The built-in alias set; config overrides are layered on top of this.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn insert(&mut self, role: Role, header: &str) {
        self.by_header.insert(normalize(header), role);
    }

    fn lookup(&self, header: &str) -> Option<Role> {
        self.by_header.get(&normalize(header)).copied()
    }
}

/// Trim whitespace, strip outer quotes if present, lowercase for matching.
fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    trimmed.to_lowercase()
}

/// Positions of the five logical columns within one upload's header row.
///
/// If a role matches several headers the leftmost wins.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: usize,
    pub category: usize,
    pub product: usize,
    pub quantity: usize,
    pub amount: usize,
}

impl ColumnMap {
    pub fn resolve(headers: &csv::StringRecord, aliases: &AliasTable) -> Result<Self, TableError> {
        let mut found: HashMap<Role, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(role) = aliases.lookup(header) {
                found.entry(role).or_insert(idx);
            }
        }

        for role in Role::ALL {
            if !found.contains_key(&role) {
                return Err(TableError::Schema {
                    column: role.name(),
                    headers: headers.iter().map(String::from).collect(),
                });
            }
        }

        Ok(Self {
            date: found[&Role::Date],
            category: found[&Role::Category],
            product: found[&Role::Product],
            quantity: found[&Role::Quantity],
            amount: found[&Role::Amount],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(names.to_vec())
    }

    #[test]
    fn resolves_english_headers() {
        let map = ColumnMap::resolve(
            &headers(&["date", "category", "product", "quantity", "amount"]),
            &AliasTable::builtin(),
        )
        .unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.amount, 4);
    }

    #[test]
    fn resolves_russian_headers_case_insensitively() {
        let map = ColumnMap::resolve(
            &headers(&["Дата", "Категория", "Товар", "Количество", "Сумма"]),
            &AliasTable::builtin(),
        )
        .unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.quantity, 3);
    }

    #[test]
    fn column_order_does_not_matter() {
        let map = ColumnMap::resolve(
            &headers(&["amount", "product", "date", "category", "qty"]),
            &AliasTable::builtin(),
        )
        .unwrap();
        assert_eq!(map.amount, 0);
        assert_eq!(map.date, 2);
        assert_eq!(map.quantity, 4);
    }

    #[test]
    fn missing_column_names_the_role() {
        let err = ColumnMap::resolve(
            &headers(&["date", "category", "product", "quantity"]),
            &AliasTable::builtin(),
        )
        .unwrap_err();
        match err {
            TableError::Schema { column, .. } => assert_eq!(column, "amount"),
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn custom_alias_wins() {
        let mut aliases = AliasTable::builtin();
        aliases.insert(Role::Amount, "Umsatz");
        let map = ColumnMap::resolve(
            &headers(&["date", "category", "product", "quantity", "umsatz"]),
            &aliases,
        )
        .unwrap();
        assert_eq!(map.amount, 4);
    }
}
