// src/db/query.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;

// ---
// O Avaliador de Consultas
// ---
// Funções puras que aplicam as opções de consulta (filtro, ordenação,
// agregação) sobre um snapshot de uma coleção em memória. Nada aqui
// modifica a coleção de entrada.

/// Valor de um campo de um registro, já "desempacotado" para comparação.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Str(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    // Comparação usada pela ordenação: campos de data comparam
    // cronologicamente, os demais pela ordem natural do tipo.
    // Valores nulos vão para o final na ordem ascendente.
    fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            // Tipos incompatíveis não têm ordem definida entre si.
            _ => Ordering::Equal,
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Int(n) => Some(Decimal::from(*n)),
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// Condição sobre um campo: igualdade exata ou prefixo (`startsWith`).
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(FieldValue),
    StartsWith(String),
}

impl Condition {
    fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Condition::Eq(expected) => value == expected,
            Condition::StartsWith(prefix) => {
                matches!(value, FieldValue::Str(s) if s.starts_with(prefix.as_str()))
            }
        }
    }
}

// ---
// Filtro declarativo
// ---
// Lista ORDENADA de condições por campo, mais uma lista de alternativas (OR).
// ATENÇÃO à política de casamento: fora do OR, o PRIMEIRO campo do filtro que
// o registro conhece decide sozinho se ele entra no resultado. Não é um AND
// conjuntivo: é o comportamento do emulador original e os consumidores
// dependem dele. Ver o teste `first_known_field_decides_alone`.
#[derive(Debug, Clone, Default)]
pub struct Where {
    pub fields: Vec<(&'static str, Condition)>,
    pub or: Vec<Where>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lista de alternativas: o registro entra se casar com QUALQUER uma.
    pub fn any(alternatives: Vec<Where>) -> Self {
        Self {
            fields: Vec::new(),
            or: alternatives,
        }
    }

    pub fn field(mut self, name: &'static str, condition: Condition) -> Self {
        self.fields.push((name, condition));
        self
    }

    pub fn eq(self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.field(name, Condition::Eq(value.into()))
    }

    pub fn starts_with(self, name: &'static str, prefix: impl Into<String>) -> Self {
        self.field(name, Condition::StartsWith(prefix.into()))
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, condition)| condition)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.or.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Ordenação por um único par campo/direção.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: SortDir,
}

impl OrderBy {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDir::Asc,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDir::Desc,
        }
    }
}

/// Opções completas de uma consulta `find_many`, parametrizadas pelo tipo
/// de `include` de cada entidade.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions<I> {
    pub filter: Where,
    pub order_by: Option<OrderBy>,
    pub include: I,
}

/// Contrato que cada modelo implementa para ser consultável pelo avaliador.
pub trait Record: Clone {
    /// Campos identificadores sondados pelo `find_unique`, em ordem fixa de
    /// prioridade: id, depois chave natural, depois chave estrangeira.
    const UNIQUE_KEYS: &'static [&'static str];

    fn record_id(&self) -> i64;

    /// `None` para campo desconhecido; `Some(FieldValue::Null)` para campo
    /// presente porém nulo. Campo desconhecido nunca casa com filtro algum.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Um registro casa com o filtro?
pub fn matches<T: Record>(record: &T, criteria: &Where) -> bool {
    if !criteria.or.is_empty() {
        return criteria.or.iter().any(|alt| matches(record, alt));
    }
    if criteria.fields.is_empty() {
        return true;
    }
    for (name, condition) in &criteria.fields {
        if let Some(value) = record.field(name) {
            // O primeiro campo que o registro conhece decide sozinho.
            return condition.matches(&value);
        }
    }
    // Nenhum campo do filtro existe no registro: nunca casa.
    false
}

pub fn filter<T: Record>(rows: &[T], criteria: &Where) -> Vec<T> {
    rows.iter()
        .filter(|row| matches(*row, criteria))
        .cloned()
        .collect()
}

pub fn sort<T: Record>(rows: &mut [T], order: &OrderBy) {
    rows.sort_by(|a, b| {
        let ordering = match (a.field(order.field), b.field(order.field)) {
            (Some(x), Some(y)) => x.compare(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order.direction {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

pub fn count<T: Record>(rows: &[T], criteria: &Where) -> i64 {
    rows.iter().filter(|row| matches(*row, criteria)).count() as i64
}

/// Soma o campo numérico indicado sobre o subconjunto filtrado.
/// Campos não numéricos (ou ausentes) não contribuem para o total.
pub fn sum<T: Record>(rows: &[T], field: &str, criteria: &Where) -> Decimal {
    rows.iter()
        .filter(|row| matches(*row, criteria))
        .filter_map(|row| row.field(field).and_then(|v| v.as_decimal()))
        .sum()
}

pub fn find_first<T: Record>(rows: &[T], criteria: &Where) -> Option<T> {
    rows.iter().find(|row| matches(*row, criteria)).cloned()
}

/// Busca por chave identificadora: sonda `UNIQUE_KEYS` em ordem de
/// prioridade e a PRIMEIRA chave presente no filtro decide a busca.
/// Se ela não encontrar nada, o resultado é `None`, sem cair para a
/// próxima chave (mesmo encadeamento condicional do emulador original).
pub fn find_unique<T: Record>(rows: &[T], criteria: &Where) -> Option<T> {
    for key in T::UNIQUE_KEYS {
        if let Some(condition) = criteria.get(key) {
            return rows
                .iter()
                .find(|row| {
                    row.field(key)
                        .is_some_and(|value| condition.matches(&value))
                })
                .cloned();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // Registro de teste com o mínimo para exercitar o avaliador.
    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: String,
        city: Option<String>,
        amount: Decimal,
        due_date: NaiveDate,
    }

    impl Record for Row {
        const UNIQUE_KEYS: &'static [&'static str] = &["id", "name"];

        fn record_id(&self) -> i64 {
            self.id
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                "city" => Some(self.city.clone().into()),
                "amount" => Some(self.amount.into()),
                "dueDate" => Some(self.due_date.into()),
                _ => None,
            }
        }
    }

    fn row(id: i64, name: &str, city: Option<&str>, cents: i64, due: (i32, u32, u32)) -> Row {
        Row {
            id,
            name: name.to_string(),
            city: city.map(str::to_string),
            amount: Decimal::new(cents, 2),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
        }
    }

    fn fixture() -> Vec<Row> {
        vec![
            row(1, "Ana", Some("Campinas"), 41667, (2024, 1, 10)),
            row(2, "Bruno", Some("Santos"), 41667, (2024, 3, 10)),
            row(3, "Carla", None, 100000, (2024, 2, 10)),
            row(4, "Caio", Some("Campinas"), 41667, (2024, 4, 10)),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        let rows = fixture();
        assert_eq!(filter(&rows, &Where::new()).len(), 4);
    }

    #[test]
    fn exact_match_on_single_field() {
        let rows = fixture();
        let found = filter(&rows, &Where::new().eq("name", "Bruno"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn starts_with_matches_prefix_only() {
        let rows = fixture();
        let found = filter(&rows, &Where::new().starts_with("name", "Ca"));
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    // Política estreita do emulador: o primeiro campo conhecido decide
    // sozinho. Se alguém "consertar" isso para um AND conjuntivo, este
    // teste quebra, e deve quebrar.
    #[test]
    fn first_known_field_decides_alone() {
        let rows = fixture();
        // "name" = Ana casa; "city" = Santos NÃO casa para a Ana.
        // Com AND conjuntivo o resultado seria vazio; aqui "name" decide.
        let criteria = Where::new().eq("name", "Ana").eq("city", "Santos");
        let found = filter(&rows, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn unknown_leading_field_is_skipped() {
        let rows = fixture();
        // "placa" não existe no registro: pula para o próximo campo.
        let criteria = Where::new().eq("placa", "ABC1234").eq("name", "Carla");
        assert_eq!(filter(&rows, &criteria).len(), 1);
    }

    #[test]
    fn filter_with_only_unknown_fields_never_matches() {
        let rows = fixture();
        assert!(filter(&rows, &Where::new().eq("placa", "ABC1234")).is_empty());
    }

    #[test]
    fn or_returns_union_without_duplicates() {
        let rows = fixture();
        let criteria = Where::any(vec![
            Where::new().eq("city", "Campinas"),
            Where::new().starts_with("name", "A"),
        ]);
        // Ana casa nas duas alternativas mas aparece uma vez só.
        let ids: Vec<i64> = filter(&rows, &criteria).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn null_field_matches_eq_null() {
        let rows = fixture();
        let found = filter(&rows, &Where::new().field("city", Condition::Eq(FieldValue::Null)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);
    }

    #[test]
    fn sort_by_date_is_chronological() {
        let mut rows = fixture();
        sort(&mut rows, &OrderBy::asc("dueDate"));
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);

        sort(&mut rows, &OrderBy::desc("dueDate"));
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn sum_over_filtered_subset() {
        let rows = fixture();
        let total = sum(&rows, "amount", &Where::new().eq("city", "Campinas"));
        assert_eq!(total, Decimal::new(83334, 2));
    }

    #[test]
    fn count_applies_same_filter_semantics() {
        let rows = fixture();
        assert_eq!(count(&rows, &Where::new().starts_with("name", "Ca")), 2);
        assert_eq!(count(&rows, &Where::new()), 4);
    }

    #[test]
    fn find_unique_probes_id_before_natural_key() {
        let rows = fixture();
        // Com "id" presente, "name" é ignorado, mesmo apontando para outro registro.
        let criteria = Where::new().eq("name", "Carla").eq("id", 2i64);
        let found = find_unique(&rows, &criteria).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn find_unique_miss_does_not_fall_through() {
        let rows = fixture();
        // "id" presente mas inexistente: não cai para a chave "name".
        let criteria = Where::new().eq("id", 99i64).eq("name", "Ana");
        assert!(find_unique(&rows, &criteria).is_none());
    }

    #[test]
    fn find_first_returns_first_structural_match() {
        let rows = fixture();
        let found = find_first(&rows, &Where::new().eq("amount", Decimal::new(41667, 2)));
        assert_eq!(found.unwrap().id, 1);
    }
}
