//! Deterministic TPC-H data seeder.
//!
//! Populates the eight TPC-H tables with synthetic rows. Row values are pure
//! functions of the row index, except for free-text comments which come from
//! a `StdRng` seeded with a fixed value, so two seeds at the same scale
//! produce identical databases.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::db::SqlSession;
use crate::model::Scalar;

pub const RNG_SEED: u64 = 42;
const COMMENT_LEN: usize = 15;
const COMMENT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Dates spread over two years from here so 1996 and 1997 both have data.
const DATE_SPAN_DAYS: i64 = 730;

const REGIONS: [&str; 5] = ["AFRICA", "AMERICA", "ASIA", "EUROPE", "MIDDLE EAST"];

const NATIONS: [(&str, i64); 25] = [
    ("ALGERIA", 0),
    ("ARGENTINA", 1),
    ("BRAZIL", 1),
    ("CANADA", 1),
    ("EGYPT", 4),
    ("ETHIOPIA", 0),
    ("FRANCE", 3),
    ("GERMANY", 3),
    ("INDIA", 2),
    ("INDONESIA", 2),
    ("IRAN", 4),
    ("IRAQ", 4),
    ("JAPAN", 2),
    ("JORDAN", 4),
    ("KENYA", 0),
    ("MOROCCO", 0),
    ("MOZAMBIQUE", 0),
    ("PERU", 1),
    ("CHINA", 2),
    ("ROMANIA", 3),
    ("SAUDI ARABIA", 4),
    ("VIETNAM", 2),
    ("RUSSIA", 3),
    ("UNITED KINGDOM", 3),
    ("UNITED STATES", 1),
];

const PART_TYPES: [&str; 5] = [
    "STANDARD ANODIZED TIN",
    "SMALL PLATED COPPER",
    "MEDIUM BRUSHED STEEL",
    "LARGE POLISHED BRASS",
    "ECONOMY BURNISHED NICKEL",
];

const DDL: [&str; 8] = [
    "CREATE TABLE REGION (R_REGIONKEY INTEGER NOT NULL PRIMARY KEY, R_NAME TEXT, R_COMMENT TEXT)",
    "CREATE TABLE NATION (N_NATIONKEY INTEGER NOT NULL PRIMARY KEY, N_NAME TEXT, N_REGIONKEY INTEGER, N_COMMENT TEXT)",
    "CREATE TABLE SUPPLIER (S_SUPPKEY INTEGER NOT NULL PRIMARY KEY, S_NAME TEXT, S_ADDRESS TEXT, S_NATIONKEY INTEGER, S_PHONE TEXT, S_ACCTBAL REAL, S_COMMENT TEXT)",
    "CREATE TABLE PART (P_PARTKEY INTEGER NOT NULL PRIMARY KEY, P_NAME TEXT, P_MFGR TEXT, P_BRAND TEXT, P_TYPE TEXT, P_SIZE INTEGER, P_CONTAINER TEXT, P_RETAILPRICE REAL, P_COMMENT TEXT)",
    "CREATE TABLE PARTSUPP (PS_PARTKEY INTEGER NOT NULL, PS_SUPPKEY INTEGER NOT NULL, PS_AVAILQTY INTEGER, PS_SUPPLYCOST REAL, PS_COMMENT TEXT, PRIMARY KEY (PS_PARTKEY, PS_SUPPKEY))",
    "CREATE TABLE CUSTOMER (C_CUSTKEY INTEGER NOT NULL PRIMARY KEY, C_NAME TEXT, C_ADDRESS TEXT, C_NATIONKEY INTEGER, C_PHONE TEXT, C_ACCTBAL REAL, C_MKTSEGMENT TEXT, C_COMMENT TEXT)",
    "CREATE TABLE ORDERS (O_ORDERKEY INTEGER NOT NULL PRIMARY KEY, O_CUSTKEY INTEGER, O_ORDERSTATUS TEXT, O_TOTALPRICE REAL, O_ORDERDATE TEXT, O_ORDERPRIORITY TEXT, O_CLERK TEXT, O_SHIPPRIORITY INTEGER, O_COMMENT TEXT)",
    "CREATE TABLE LINEITEM (L_ORDERKEY INTEGER NOT NULL, L_PARTKEY INTEGER, L_SUPPKEY INTEGER, L_LINENUMBER INTEGER NOT NULL, L_QUANTITY REAL, L_EXTENDEDPRICE REAL, L_DISCOUNT REAL, L_TAX REAL, L_RETURNFLAG TEXT, L_LINESTATUS TEXT, L_SHIPDATE TEXT, L_COMMITDATE TEXT, L_RECEIPTDATE TEXT, L_SHIPINSTRUCT TEXT, L_SHIPMODE TEXT, L_COMMENT TEXT)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Region,
    Nation,
    Supplier,
    Part,
    PartSupp,
    Customer,
    Orders,
    LineItem,
}

impl Table {
    /// Parent tables first.
    pub const LOAD_ORDER: [Table; 8] = [
        Table::Region,
        Table::Nation,
        Table::Supplier,
        Table::Part,
        Table::PartSupp,
        Table::Customer,
        Table::Orders,
        Table::LineItem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Region => "REGION",
            Table::Nation => "NATION",
            Table::Supplier => "SUPPLIER",
            Table::Part => "PART",
            Table::PartSupp => "PARTSUPP",
            Table::Customer => "CUSTOMER",
            Table::Orders => "ORDERS",
            Table::LineItem => "LINEITEM",
        }
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Region => &["R_REGIONKEY", "R_NAME", "R_COMMENT"],
            Table::Nation => &["N_NATIONKEY", "N_NAME", "N_REGIONKEY", "N_COMMENT"],
            Table::Supplier => &[
                "S_SUPPKEY", "S_NAME", "S_ADDRESS", "S_NATIONKEY", "S_PHONE", "S_ACCTBAL", "S_COMMENT",
            ],
            Table::Part => &[
                "P_PARTKEY", "P_NAME", "P_MFGR", "P_BRAND", "P_TYPE", "P_SIZE", "P_CONTAINER",
                "P_RETAILPRICE", "P_COMMENT",
            ],
            Table::PartSupp => &[
                "PS_PARTKEY", "PS_SUPPKEY", "PS_AVAILQTY", "PS_SUPPLYCOST", "PS_COMMENT",
            ],
            Table::Customer => &[
                "C_CUSTKEY", "C_NAME", "C_ADDRESS", "C_NATIONKEY", "C_PHONE", "C_ACCTBAL",
                "C_MKTSEGMENT", "C_COMMENT",
            ],
            Table::Orders => &[
                "O_ORDERKEY", "O_CUSTKEY", "O_ORDERSTATUS", "O_TOTALPRICE", "O_ORDERDATE",
                "O_ORDERPRIORITY", "O_CLERK", "O_SHIPPRIORITY", "O_COMMENT",
            ],
            Table::LineItem => &[
                "L_ORDERKEY", "L_PARTKEY", "L_SUPPKEY", "L_LINENUMBER", "L_QUANTITY",
                "L_EXTENDEDPRICE", "L_DISCOUNT", "L_TAX", "L_RETURNFLAG", "L_LINESTATUS",
                "L_SHIPDATE", "L_COMMITDATE", "L_RECEIPTDATE", "L_SHIPINSTRUCT", "L_SHIPMODE",
                "L_COMMENT",
            ],
        }
    }

    fn insert_sql(&self) -> String {
        let cols = self.columns();
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name(),
            cols.join(", "),
            placeholders.join(", ")
        )
    }
}

/// Row counts per table for one seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinalities {
    pub region: usize,
    pub nation: usize,
    pub supplier: usize,
    pub part: usize,
    pub partsupp: usize,
    pub customer: usize,
    pub orders: usize,
    pub lineitem: usize,
}

impl Cardinalities {
    /// Scale 1.0 is 10K suppliers, 20K parts, 150K customers, 700K orders
    /// and 4M line items. REGION and NATION never scale.
    pub fn at_scale(scale: f64) -> Self {
        let scaled = |base: f64, min: usize| ((base * scale).round() as usize).max(min);
        let part = scaled(20_000.0, 1);
        let orders = scaled(700_000.0, 1);
        Self {
            region: REGIONS.len(),
            nation: NATIONS.len(),
            supplier: scaled(10_000.0, 4),
            part,
            partsupp: part * 4,
            customer: scaled(150_000.0, 1),
            orders,
            // six lines per order at most, so every line has a parent order
            lineitem: scaled(4_000_000.0, 1).min(orders * 6),
        }
    }

    pub fn of(&self, table: Table) -> usize {
        match table {
            Table::Region => self.region,
            Table::Nation => self.nation,
            Table::Supplier => self.supplier,
            Table::Part => self.part,
            Table::PartSupp => self.partsupp,
            Table::Customer => self.customer,
            Table::Orders => self.orders,
            Table::LineItem => self.lineitem,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub scale: f64,
    pub chunk_size: usize,
    pub truncate: bool,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            scale: 0.1,
            chunk_size: 5_000,
            truncate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

/// Creates every table, skipping those that already exist. Any other DDL
/// failure is returned. Returns how many tables were created.
pub fn create_tables(session: &mut dyn SqlSession) -> anyhow::Result<usize> {
    let mut created = 0;
    for ddl in DDL {
        match session.execute(ddl) {
            Ok(_) => created += 1,
            Err(e) if e.is_already_exists() => {
                tracing::debug!(event = "seed.table_exists", detail = %e);
            }
            Err(e) => return Err(anyhow::anyhow!("create table failed: {}", e)),
        }
    }
    Ok(created)
}

/// Empties all tables, children first.
pub fn truncate_tables(session: &mut dyn SqlSession) -> anyhow::Result<()> {
    for table in Table::LOAD_ORDER.iter().rev() {
        session
            .execute(&format!("DELETE FROM {}", table.name()))
            .map_err(|e| anyhow::anyhow!("truncate {} failed: {}", table.name(), e))?;
    }
    Ok(())
}

struct RowGen {
    rng: StdRng,
    base_date: NaiveDate,
    card: Cardinalities,
}

impl RowGen {
    fn new(card: Cardinalities) -> Self {
        Self {
            rng: StdRng::seed_from_u64(RNG_SEED),
            base_date: NaiveDate::from_ymd_opt(1996, 1, 1).unwrap_or_default(),
            card,
        }
    }

    fn comment(&mut self) -> Scalar {
        let s: String = (0..COMMENT_LEN)
            .map(|_| COMMENT_CHARSET[self.rng.gen_range(0..COMMENT_CHARSET.len())] as char)
            .collect();
        Scalar::Text(s)
    }

    fn date(&self, offset_days: i64) -> Scalar {
        let d = self.base_date + Duration::days(offset_days);
        Scalar::Text(d.format("%Y-%m-%d").to_string())
    }

    /// Row `i` of `table`. Keys start at 1 except REGION and NATION, which start at 0.
    fn row(&mut self, table: Table, i: usize) -> Vec<Scalar> {
        let c = self.card;
        let n = i as i64;
        match table {
            Table::Region => vec![n.into(), REGIONS[i].into(), self.comment()],
            Table::Nation => {
                let (name, region) = NATIONS[i];
                vec![n.into(), name.into(), region.into(), self.comment()]
            }
            Table::Supplier => vec![
                n.into(),
                format!("Supplier#{:09}", i).into(),
                format!("Addr{}", i).into(),
                (n % 25).into(),
                format!("Ph{}", i).into(),
                ((5000 + i) as f64).into(),
                self.comment(),
            ],
            Table::Part => vec![
                n.into(),
                format!("Part#{}", i).into(),
                format!("Manufacturer#{}", i % 5 + 1).into(),
                format!("Brand#{}{}", i % 5 + 1, i % 5 + 1).into(),
                PART_TYPES[i % PART_TYPES.len()].into(),
                ((i % 50 + 1) as i64).into(),
                "SM BAG".into(),
                ((900 + i % 500) as f64).into(),
                self.comment(),
            ],
            Table::PartSupp => {
                let idx = i - 1;
                let part = idx / 4 + 1;
                let step = (c.supplier / 4).max(1);
                let supp = (part + (idx % 4) * step) % c.supplier + 1;
                vec![
                    (part as i64).into(),
                    (supp as i64).into(),
                    ((100 + i % 8000) as i64).into(),
                    ((50 + i % 100) as f64).into(),
                    self.comment(),
                ]
            }
            Table::Customer => vec![
                n.into(),
                format!("Customer#{:09}", i).into(),
                format!("Addr{}", i).into(),
                (n % 25).into(),
                format!("Ph{}", i).into(),
                ((1000 + i % 100_000) as f64).into(),
                ["AUTOMOBILE", "BUILDING", "FURNITURE", "MACHINERY", "HOUSEHOLD"][i % 5].into(),
                self.comment(),
            ],
            Table::Orders => vec![
                n.into(),
                ((i % c.customer + 1) as i64).into(),
                "O".into(),
                ((1500 + i % 100_000) as f64).into(),
                self.date(n % DATE_SPAN_DAYS),
                format!("{}-PRIORITY", i % 5 + 1).into(),
                format!("Clerk#{:09}", i % 1000 + 1).into(),
                0i64.into(),
                self.comment(),
            ],
            Table::LineItem => {
                let idx = i - 1;
                let day = n % DATE_SPAN_DAYS;
                vec![
                    ((idx / 6 + 1) as i64).into(),
                    ((i % c.part + 1) as i64).into(),
                    ((i % c.supplier + 1) as i64).into(),
                    ((idx % 6 + 1) as i64).into(),
                    ((i % 50 + 1) as f64).into(),
                    ((200 + i % 100_000) as f64).into(),
                    ((i % 11) as f64 / 100.0).into(),
                    0.02f64.into(),
                    "N".into(),
                    (if i % 2 == 0 { "F" } else { "O" }).into(),
                    self.date(day),
                    self.date(day + 30),
                    self.date(day + 45),
                    "DELIVER IN PERSON".into(),
                    "TRUCK".into(),
                    self.comment(),
                ]
            }
        }
    }
}

fn key_range(table: Table, count: usize) -> std::ops::Range<usize> {
    match table {
        Table::Region | Table::Nation => 0..count,
        _ => 1..count + 1,
    }
}

/// Inserts every table in dependency order, `chunk_size` rows per transaction.
pub fn insert_data(session: &mut dyn SqlSession, plan: &SeedPlan) -> anyhow::Result<Vec<TableCount>> {
    let card = Cardinalities::at_scale(plan.scale);
    let mut gen = RowGen::new(card);
    let chunk_size = plan.chunk_size.max(1);
    let mut out = Vec::new();

    for table in Table::LOAD_ORDER {
        let sql = table.insert_sql();
        let mut chunk = Vec::with_capacity(chunk_size);
        let mut inserted = 0usize;
        for i in key_range(table, card.of(table)) {
            chunk.push(gen.row(table, i));
            if chunk.len() == chunk_size {
                inserted += session.execute_many(&sql, &chunk)?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            inserted += session.execute_many(&sql, &chunk)?;
        }
        tracing::info!(event = "seed.table_loaded", table = table.name(), rows = inserted);
        out.push(TableCount {
            table: table.name(),
            rows: inserted as i64,
        });
    }
    Ok(out)
}

/// Row count of every TPC-H table.
pub fn verify(session: &mut dyn SqlSession) -> anyhow::Result<Vec<TableCount>> {
    let mut out = Vec::new();
    for table in Table::LOAD_ORDER {
        let set = session.query(&format!("SELECT COUNT(*) FROM {}", table.name()), None)?;
        let rows = match set.rows.first().and_then(|r| r.first()) {
            Some(Scalar::Integer(n)) => *n,
            other => anyhow::bail!("unexpected count for {}: {:?}", table.name(), other),
        };
        out.push(TableCount {
            table: table.name(),
            rows,
        });
    }
    Ok(out)
}

/// Create, optionally truncate, insert, verify.
pub fn seed(session: &mut dyn SqlSession, plan: &SeedPlan) -> anyhow::Result<Vec<TableCount>> {
    let created = create_tables(session)?;
    tracing::info!(event = "seed.tables_created", created, scale = plan.scale);
    if plan.truncate {
        truncate_tables(session)?;
    }
    insert_data(session, plan)?;
    verify(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteSession;

    fn tiny() -> SeedPlan {
        SeedPlan {
            scale: 0.001,
            chunk_size: 97,
            truncate: true,
        }
    }

    #[test]
    fn cardinalities_scale_except_fixed_tables() {
        let c = Cardinalities::at_scale(1.0);
        assert_eq!(
            (c.region, c.nation, c.supplier, c.part, c.partsupp, c.customer, c.orders, c.lineitem),
            (5, 25, 10_000, 20_000, 80_000, 150_000, 700_000, 4_000_000)
        );
        let t = Cardinalities::at_scale(0.001);
        assert_eq!((t.region, t.nation, t.supplier, t.customer, t.orders), (5, 25, 10, 150, 700));
        assert_eq!(t.lineitem, 4_000);
    }

    #[test]
    fn seed_creates_and_counts_all_tables() {
        let mut s = SqliteSession::memory().unwrap();
        let counts = seed(&mut s, &tiny()).unwrap();
        let get = |t: &str| counts.iter().find(|c| c.table == t).unwrap().rows;
        assert_eq!(get("REGION"), 5);
        assert_eq!(get("NATION"), 25);
        assert_eq!(get("PARTSUPP"), 80);
        assert_eq!(get("LINEITEM"), 4_000);
    }

    #[test]
    fn reseeding_is_idempotent_and_deterministic() {
        let mut s = SqliteSession::memory().unwrap();
        seed(&mut s, &tiny()).unwrap();
        let first = s
            .query("SELECT C_COMMENT FROM CUSTOMER WHERE C_CUSTKEY = 7", None)
            .unwrap();

        // tables exist now; create must be skipped, not fail
        assert_eq!(create_tables(&mut s).unwrap(), 0);
        let counts = seed(&mut s, &tiny()).unwrap();
        assert_eq!(counts.iter().find(|c| c.table == "ORDERS").unwrap().rows, 700);

        let second = s
            .query("SELECT C_COMMENT FROM CUSTOMER WHERE C_CUSTKEY = 7", None)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn seeded_data_supports_fixture_questions() {
        let mut s = SqliteSession::memory().unwrap();
        seed(&mut s, &tiny()).unwrap();
        let asia = s
            .query(
                "SELECT COUNT(*) FROM CUSTOMER C JOIN NATION N ON C.C_NATIONKEY = N.N_NATIONKEY JOIN REGION R ON N.N_REGIONKEY = R.R_REGIONKEY WHERE R.R_NAME = 'ASIA'",
                None,
            )
            .unwrap();
        assert!(matches!(asia.rows[0][0], Scalar::Integer(n) if n > 0));

        let years = s
            .query("SELECT DISTINCT strftime('%Y', O_ORDERDATE) FROM ORDERS ORDER BY 1", None)
            .unwrap();
        assert_eq!(years.rows.len(), 2);
    }

    #[test]
    fn other_ddl_failures_propagate() {
        struct Broken;
        impl SqlSession for Broken {
            fn dialect(&self) -> crate::model::Dialect {
                crate::model::Dialect::Sqlite
            }
            fn query(
                &mut self,
                _: &str,
                _: Option<std::time::Duration>,
            ) -> Result<crate::model::RowSet, crate::errors::DbError> {
                unreachable!()
            }
            fn execute(&mut self, _: &str) -> Result<usize, crate::errors::DbError> {
                Err(crate::errors::DbError::new("disk I/O error"))
            }
            fn execute_many(&mut self, _: &str, _: &[Vec<Scalar>]) -> Result<usize, crate::errors::DbError> {
                unreachable!()
            }
        }
        assert!(create_tables(&mut Broken).is_err());
    }
}
