use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the native spreadsheet cell types.
///
/// Values are totally ordered: first by variant (missing < bool < integer <
/// float < text < date), then by content, with floats compared by
/// [`f64::total_cmp`]. Equality and hashing follow the same order, so `NaN`
/// equals itself and `0.0` and `-0.0` are distinct values.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

impl CellValue {
    /// Position of the variant in the total order.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::String(_) => 4,
            CellValue::Date(_) => 5,
        }
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::String(a), CellValue::String(b))
            | (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            // total_cmp equality is bit equality
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "(blank)"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred once at load time
// ---------------------------------------------------------------------------

/// Declared kind of a column, derived from the cells it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Text or mixed-type cells. The only kind that gets filter widgets.
    Categorical,
    Numeric,
    Boolean,
    Temporal,
}

impl ColumnKind {
    pub fn is_categorical(self) -> bool {
        self == ColumnKind::Categorical
    }
}

/// Infer the kind of a column from its raw cell values.
///
/// Missing cells are ignored. A column with no values at all counts as
/// numeric, the same as an all-blank spreadsheet column.
pub fn infer_column_kind<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            CellValue::Null => continue,
            CellValue::Integer(_) | CellValue::Float(_) => ColumnKind::Numeric,
            CellValue::Bool(_) => ColumnKind::Boolean,
            CellValue::Date(_) => ColumnKind::Temporal,
            CellValue::String(_) => return ColumnKind::Categorical,
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => return ColumnKind::Categorical,
            Some(_) => {}
        }
    }
    kind.unwrap_or(ColumnKind::Numeric)
}

// ---------------------------------------------------------------------------
// Table – the loaded (or filtered) dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One row, aligned with [`Table::columns`].
pub type Row = Vec<CellValue>;

/// An ordered set of rows over a fixed, ordered set of typed columns.
///
/// Every row holds exactly one value per column; [`Table::from_records`]
/// pads short rows with [`CellValue::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from a raw header and raw rows, normalising header names
    /// and inferring column kinds.
    pub fn from_records(header: Vec<String>, rows: Vec<Row>) -> Self {
        let names = normalize_header(header);
        let width = names.len();

        let rows: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                kind: infer_column_kind(rows.iter().map(|r| &r[idx])),
                name,
            })
            .collect();

        Table { columns, rows }
    }

    /// Derive a table that shares this table's columns but holds `rows`.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Categorical columns in table order.
    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_categorical())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |r| &r[idx])
    }

    /// The sorted set of distinct values of a column.
    pub fn unique_values(&self, column: &str) -> BTreeSet<CellValue> {
        match self.column_index(column) {
            Some(idx) => self.column_values(idx).cloned().collect(),
            None => BTreeSet::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Blank names become `Unnamed: <idx>`, repeated names get `.1`, `.2`, ...
fn normalize_header(header: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut names: Vec<String> = Vec::with_capacity(header.len());

    for (idx, raw) in header.into_iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("Unnamed: {idx}"),
            _ => raw,
        };
        let mut name = base.clone();
        while names.contains(&name) {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table of string cells from `&str` literals.
    pub(crate) fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_records(
            header.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn infers_kinds_from_cells() {
        use CellValue::*;
        assert_eq!(
            infer_column_kind(&[Integer(1), Float(2.5), Null]),
            ColumnKind::Numeric
        );
        assert_eq!(infer_column_kind(&[Bool(true), Null]), ColumnKind::Boolean);
        assert_eq!(
            infer_column_kind(&[Date("2024-01-01".into())]),
            ColumnKind::Temporal
        );
        assert_eq!(
            infer_column_kind(&[Integer(1), "x".into()]),
            ColumnKind::Categorical
        );
        assert_eq!(
            infer_column_kind(&[Bool(true), Integer(1)]),
            ColumnKind::Categorical
        );
        assert_eq!(infer_column_kind(&[Null, Null]), ColumnKind::Numeric);
        assert_eq!(infer_column_kind(&[]), ColumnKind::Numeric);
    }

    #[test]
    fn pads_short_rows_and_drops_extra_cells() {
        let t = Table::from_records(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1)],
                vec![
                    CellValue::Integer(2),
                    CellValue::from("x"),
                    CellValue::from("extra"),
                ],
            ],
        );
        assert_eq!(t.rows()[0], vec![CellValue::Integer(1), CellValue::Null]);
        assert_eq!(t.rows()[1].len(), 2);
        assert_eq!(t.columns()[0].kind, ColumnKind::Numeric);
        assert_eq!(t.columns()[1].kind, ColumnKind::Categorical);
    }

    #[test]
    fn normalizes_blank_and_duplicate_headers() {
        let names = normalize_header(vec![
            "Name".into(),
            "".into(),
            "Name".into(),
            "Name".into(),
        ]);
        assert_eq!(names, vec!["Name", "Unnamed: 1", "Name.1", "Name.2"]);
    }

    #[test]
    fn value_lookup_and_uniques() {
        let t = table(&["Gender"], &[&["F"], &["M"], &["F"]]);
        assert_eq!(t.value(1, "Gender"), Some(&CellValue::from("M")));
        assert_eq!(t.value(3, "Gender"), None);
        assert_eq!(t.value(0, "Nope"), None);
        let uniques: Vec<_> = t.unique_values("Gender").into_iter().collect();
        assert_eq!(uniques, vec![CellValue::from("F"), CellValue::from("M")]);
    }

    #[test]
    fn orders_values_by_variant_then_content() {
        let mut v = vec![
            CellValue::from("b"),
            CellValue::Float(1.5),
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::Bool(false),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                CellValue::Null,
                CellValue::Bool(false),
                CellValue::Integer(3),
                CellValue::Float(1.5),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn equality_agrees_with_ordering() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(v: &CellValue) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.cmp(&nan.clone()), Ordering::Equal);
        assert_eq!(hash_of(&nan), hash_of(&nan.clone()));

        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
        assert_ne!(CellValue::from("2024-01-01"), CellValue::Date("2024-01-01".into()));

        let t = Table::from_records(
            vec!["Score".into()],
            vec![vec![CellValue::Float(f64::NAN)], vec![CellValue::Null]],
        );
        assert_eq!(t, t.clone());
        assert_eq!(t.unique_values("Score").len(), 2);
    }
}
