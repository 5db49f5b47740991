use sqlx::{QueryBuilder, Sqlite};

/// A single condition on the `readings` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    DeviceUuid(String),
    /// Case-sensitive substring match on `type`.
    TypeContains(String),
    /// `date_created >= ts`
    CreatedFrom(i64),
    /// `date_created <= ts`
    CreatedUntil(i64),
    ValueEquals(i64),
}

/// Ordered list of predicates, AND-ed together when rendered.
///
/// Every filter starts from a device; the remaining predicates are optional
/// and are appended in the order the builder methods are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingFilter {
    predicates: Vec<Predicate>,
}

impl ReadingFilter {
    pub fn device(device_uuid: impl Into<String>) -> Self {
        Self {
            predicates: vec![Predicate::DeviceUuid(device_uuid.into())],
        }
    }

    pub fn type_contains(mut self, sensor_type: impl Into<String>) -> Self {
        self.predicates
            .push(Predicate::TypeContains(sensor_type.into()));
        self
    }

    pub fn created_from(mut self, ts: i64) -> Self {
        self.predicates.push(Predicate::CreatedFrom(ts));
        self
    }

    pub fn created_until(mut self, ts: i64) -> Self {
        self.predicates.push(Predicate::CreatedUntil(ts));
        self
    }

    pub fn value_equals(mut self, value: i64) -> Self {
        self.predicates.push(Predicate::ValueEquals(value));
        self
    }

    /// Drops every `TypeContains` predicate, keeping the rest in order.
    pub fn without_type(mut self) -> Self {
        self.predicates
            .retain(|p| !matches!(p, Predicate::TypeContains(_)));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Appends ` WHERE ... AND ...` with bound parameters to `qb`.
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::DeviceUuid(uuid) => {
                    qb.push("device_uuid = ").push_bind(uuid.clone());
                }
                Predicate::TypeContains(sensor_type) => {
                    qb.push("instr(\"type\", ")
                        .push_bind(sensor_type.clone())
                        .push(") > 0");
                }
                Predicate::CreatedFrom(ts) => {
                    qb.push("date_created >= ").push_bind(*ts);
                }
                Predicate::CreatedUntil(ts) => {
                    qb.push("date_created <= ").push_bind(*ts);
                }
                Predicate::ValueEquals(value) => {
                    qb.push("value = ").push_bind(*value);
                }
            }
        }
    }
}
