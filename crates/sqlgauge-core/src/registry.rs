//! Fixture registry: the fixed set of natural-language questions with their
//! ground-truth SQL and complexity tier.
//!
//! The registry is an immutable list built once per run and passed to the
//! runner explicitly. It comes from the built-in TPC-H set, a config file,
//! or the `NL_SQL_TEST_QUERIES` table of the target database.

use std::collections::HashSet;

use crate::db::SqlSession;
use crate::errors::ConfigError;
use crate::model::{Complexity, Dialect, Scalar, TestQuery};

pub const QUERY_TABLE: &str = "NL_SQL_TEST_QUERIES";

/// Statement time limit for the anti-join query, the slowest of the set.
const ANTI_JOIN_TIME_LIMIT_SECS: u64 = 300;

struct Fixture {
    id: i64,
    question: &'static str,
    oracle: &'static str,
    sqlite: &'static str,
    complexity: Complexity,
}

use Complexity::{Complex, Medium, Simple};

const FIXTURES: &[Fixture] = &[
    Fixture {
        id: 1,
        question: "What is the total quantity of items sold?",
        oracle: "SELECT SUM(L_QUANTITY) FROM LINEITEM",
        sqlite: "SELECT SUM(L_QUANTITY) FROM LINEITEM",
        complexity: Simple,
    },
    Fixture {
        id: 2,
        question: "How many customers are there?",
        oracle: "SELECT COUNT(*) FROM CUSTOMER",
        sqlite: "SELECT COUNT(*) FROM CUSTOMER",
        complexity: Simple,
    },
    Fixture {
        id: 3,
        question: "What is the average retail price of parts?",
        oracle: "SELECT AVG(P_RETAILPRICE) FROM PART",
        sqlite: "SELECT AVG(P_RETAILPRICE) FROM PART",
        complexity: Simple,
    },
    Fixture {
        id: 4,
        question: "List all regions.",
        oracle: "SELECT * FROM REGION",
        sqlite: "SELECT * FROM REGION",
        complexity: Simple,
    },
    Fixture {
        id: 5,
        question: "How many suppliers are there?",
        oracle: "SELECT COUNT(*) FROM SUPPLIER",
        sqlite: "SELECT COUNT(*) FROM SUPPLIER",
        complexity: Simple,
    },
    Fixture {
        id: 6,
        question: "Show me all orders from 1996.",
        oracle: "SELECT * FROM ORDERS WHERE O_ORDERDATE BETWEEN TO_DATE('1996-01-01', 'YYYY-MM-DD') AND TO_DATE('1996-12-31', 'YYYY-MM-DD')",
        sqlite: "SELECT * FROM ORDERS WHERE O_ORDERDATE BETWEEN '1996-01-01' AND '1996-12-31'",
        complexity: Medium,
    },
    Fixture {
        id: 7,
        question: "Show top 5 most expensive orders.",
        oracle: "SELECT * FROM (SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC) WHERE ROWNUM <= 5",
        sqlite: "SELECT * FROM (SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC) LIMIT 5",
        complexity: Medium,
    },
    Fixture {
        id: 8,
        question: "Which nation has the most customers?",
        oracle: "SELECT N_NAME, COUNT(*) FROM CUSTOMER JOIN NATION ON C_NATIONKEY = N_NATIONKEY GROUP BY N_NAME ORDER BY 2 DESC FETCH FIRST 1 ROW ONLY",
        sqlite: "SELECT N_NAME, COUNT(*) FROM CUSTOMER JOIN NATION ON C_NATIONKEY = N_NATIONKEY GROUP BY N_NAME ORDER BY 2 DESC LIMIT 1",
        complexity: Medium,
    },
    Fixture {
        id: 9,
        question: "List the names of customers in the ASIA region.",
        oracle: "SELECT C.C_NAME FROM CUSTOMER C JOIN NATION N ON C.C_NATIONKEY = N.N_NATIONKEY JOIN REGION R ON N.N_REGIONKEY = R.R_REGIONKEY WHERE R.R_NAME = 'ASIA'",
        sqlite: "SELECT C.C_NAME FROM CUSTOMER C JOIN NATION N ON C.C_NATIONKEY = N.N_NATIONKEY JOIN REGION R ON N.N_REGIONKEY = R.R_REGIONKEY WHERE R.R_NAME = 'ASIA'",
        complexity: Medium,
    },
    Fixture {
        id: 10,
        question: "Find orders placed by Customer#1.",
        oracle: "SELECT * FROM ORDERS WHERE O_CUSTKEY = 1",
        sqlite: "SELECT * FROM ORDERS WHERE O_CUSTKEY = 1",
        complexity: Medium,
    },
    Fixture {
        id: 11,
        question: "What is the total discount given on all items?",
        oracle: "SELECT SUM(L_EXTENDEDPRICE * L_DISCOUNT) FROM LINEITEM",
        sqlite: "SELECT SUM(L_EXTENDEDPRICE * L_DISCOUNT) FROM LINEITEM",
        complexity: Medium,
    },
    Fixture {
        id: 12,
        question: "How many unique parts were supplied by Supplier#1?",
        oracle: "SELECT COUNT(DISTINCT PS_PARTKEY) FROM PARTSUPP S JOIN SUPPLIER SUP ON S.PS_SUPPKEY = SUP.S_SUPPKEY WHERE SUP.S_NAME = 'Supplier#000000001'",
        sqlite: "SELECT COUNT(DISTINCT PS_PARTKEY) FROM PARTSUPP S JOIN SUPPLIER SUP ON S.PS_SUPPKEY = SUP.S_SUPPKEY WHERE SUP.S_NAME = 'Supplier#000000001'",
        complexity: Medium,
    },
    Fixture {
        id: 13,
        question: "What is the average order value?",
        oracle: "SELECT AVG(O_TOTALPRICE) FROM ORDERS",
        sqlite: "SELECT AVG(O_TOTALPRICE) FROM ORDERS",
        complexity: Medium,
    },
    Fixture {
        id: 14,
        question: "List all parts with price greater than 50.",
        oracle: "SELECT P_NAME, P_RETAILPRICE FROM PART WHERE P_RETAILPRICE > 50",
        sqlite: "SELECT P_NAME, P_RETAILPRICE FROM PART WHERE P_RETAILPRICE > 50",
        complexity: Medium,
    },
    Fixture {
        id: 15,
        question: "How many orders were placed in 1997?",
        oracle: "SELECT COUNT(*) FROM ORDERS WHERE EXTRACT(YEAR FROM O_ORDERDATE) = 1997",
        sqlite: "SELECT COUNT(*) FROM ORDERS WHERE CAST(strftime('%Y', O_ORDERDATE) AS INTEGER) = 1997",
        complexity: Medium,
    },
    Fixture {
        id: 16,
        question: "Show revenue by region for year 1996.",
        oracle: "SELECT R.R_NAME, SUM(L.L_EXTENDEDPRICE * (1 - L.L_DISCOUNT)) FROM LINEITEM L JOIN ORDERS O ON L.L_ORDERKEY = O.O_ORDERKEY JOIN CUSTOMER C ON O.O_CUSTKEY = C.C_CUSTKEY JOIN NATION N ON C.C_NATIONKEY = N.N_NATIONKEY JOIN REGION R ON N.N_REGIONKEY = R.R_REGIONKEY WHERE EXTRACT(YEAR FROM O.O_ORDERDATE) = 1996 GROUP BY R.R_NAME",
        sqlite: "SELECT R.R_NAME, SUM(L.L_EXTENDEDPRICE * (1 - L.L_DISCOUNT)) FROM LINEITEM L JOIN ORDERS O ON L.L_ORDERKEY = O.O_ORDERKEY JOIN CUSTOMER C ON O.O_CUSTKEY = C.C_CUSTKEY JOIN NATION N ON C.C_NATIONKEY = N.N_NATIONKEY JOIN REGION R ON N.N_REGIONKEY = R.R_REGIONKEY WHERE CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER) = 1996 GROUP BY R.R_NAME",
        complexity: Complex,
    },
    Fixture {
        id: 17,
        question: "Find the top 5 customers by total spending.",
        oracle: "SELECT C.C_CUSTKEY, C.C_NAME, SUM(O.O_TOTALPRICE) FROM CUSTOMER C JOIN ORDERS O ON C.C_CUSTKEY = O.O_CUSTKEY GROUP BY C.C_CUSTKEY, C.C_NAME ORDER BY 3 DESC FETCH FIRST 5 ROWS ONLY",
        sqlite: "SELECT C.C_CUSTKEY, C.C_NAME, SUM(O.O_TOTALPRICE) FROM CUSTOMER C JOIN ORDERS O ON C.C_CUSTKEY = O.O_CUSTKEY GROUP BY C.C_CUSTKEY, C.C_NAME ORDER BY 3 DESC LIMIT 5",
        complexity: Complex,
    },
    Fixture {
        id: 18,
        question: "What is the total cost of parts supplied by each supplier?",
        oracle: "SELECT S.S_SUPPKEY, S.S_NAME, SUM(PS.PS_SUPPLYCOST * PS.PS_AVAILQTY) FROM SUPPLIER S JOIN PARTSUPP PS ON S.S_SUPPKEY = PS.PS_SUPPKEY GROUP BY S.S_SUPPKEY, S.S_NAME",
        sqlite: "SELECT S.S_SUPPKEY, S.S_NAME, SUM(PS.PS_SUPPLYCOST * PS.PS_AVAILQTY) FROM SUPPLIER S JOIN PARTSUPP PS ON S.S_SUPPKEY = PS.PS_SUPPKEY GROUP BY S.S_SUPPKEY, S.S_NAME",
        complexity: Complex,
    },
    Fixture {
        id: 19,
        question: "Average revenue by part type and year.",
        oracle: "SELECT P.P_TYPE, EXTRACT(YEAR FROM O.O_ORDERDATE) AS YEAR, AVG(L.L_EXTENDEDPRICE * (1 - L.L_DISCOUNT)) FROM LINEITEM L JOIN ORDERS O ON L.L_ORDERKEY = O.O_ORDERKEY JOIN PART P ON L.L_PARTKEY = P.P_PARTKEY GROUP BY P.P_TYPE, EXTRACT(YEAR FROM O.O_ORDERDATE)",
        sqlite: "SELECT P.P_TYPE, CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER) AS YEAR, AVG(L.L_EXTENDEDPRICE * (1 - L.L_DISCOUNT)) FROM LINEITEM L JOIN ORDERS O ON L.L_ORDERKEY = O.O_ORDERKEY JOIN PART P ON L.L_PARTKEY = P.P_PARTKEY GROUP BY P.P_TYPE, CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER)",
        complexity: Complex,
    },
    Fixture {
        id: 20,
        question: "Count orders per customer per year.",
        oracle: "SELECT C.C_CUSTKEY, EXTRACT(YEAR FROM O.O_ORDERDATE) AS YEAR, COUNT(*) FROM CUSTOMER C LEFT JOIN ORDERS O ON C.C_CUSTKEY = O.O_CUSTKEY GROUP BY C.C_CUSTKEY, EXTRACT(YEAR FROM O.O_ORDERDATE)",
        sqlite: "SELECT C.C_CUSTKEY, CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER) AS YEAR, COUNT(*) FROM CUSTOMER C LEFT JOIN ORDERS O ON C.C_CUSTKEY = O.O_CUSTKEY GROUP BY C.C_CUSTKEY, CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER)",
        complexity: Complex,
    },
    Fixture {
        id: 21,
        question: "Find customers who placed no orders in 1996.",
        oracle: "SELECT C.C_CUSTKEY, C.C_NAME FROM CUSTOMER C WHERE NOT EXISTS (SELECT 1 FROM ORDERS O WHERE C.C_CUSTKEY = O.O_CUSTKEY AND EXTRACT(YEAR FROM O.O_ORDERDATE) = 1996)",
        sqlite: "SELECT C.C_CUSTKEY, C.C_NAME FROM CUSTOMER C WHERE NOT EXISTS (SELECT 1 FROM ORDERS O WHERE C.C_CUSTKEY = O.O_CUSTKEY AND CAST(strftime('%Y', O.O_ORDERDATE) AS INTEGER) = 1996)",
        complexity: Complex,
    },
    Fixture {
        id: 22,
        question: "Total quantity shipped by line status.",
        oracle: "SELECT L.L_LINESTATUS, SUM(L.L_QUANTITY) FROM LINEITEM L GROUP BY L.L_LINESTATUS",
        sqlite: "SELECT L.L_LINESTATUS, SUM(L.L_QUANTITY) FROM LINEITEM L GROUP BY L.L_LINESTATUS",
        complexity: Complex,
    },
];

/// Statement limit for a query id, whichever source the query came from.
pub fn time_limit_for(id: i64) -> Option<u64> {
    (id == 21).then_some(ANTI_JOIN_TIME_LIMIT_SECS)
}

/// The 22 TPC-H questions with ground truth written for `dialect`.
pub fn builtin(dialect: Dialect) -> Vec<TestQuery> {
    FIXTURES
        .iter()
        .map(|f| TestQuery {
            id: f.id,
            question: f.question.to_string(),
            ground_truth_sql: match dialect {
                Dialect::Oracle => f.oracle,
                Dialect::Sqlite => f.sqlite,
            }
            .to_string(),
            complexity: f.complexity,
            category: None,
            time_limit_seconds: time_limit_for(f.id),
        })
        .collect()
}

/// Rejects empty sets, duplicate ids and blank SQL.
pub fn validate(queries: &[TestQuery]) -> Result<(), ConfigError> {
    if queries.is_empty() {
        return Err(ConfigError("query registry is empty".into()));
    }
    let mut seen = HashSet::new();
    for q in queries {
        if !seen.insert(q.id) {
            return Err(ConfigError(format!("duplicate query id {}", q.id)));
        }
        if q.question.trim().is_empty() || q.ground_truth_sql.trim().is_empty() {
            return Err(ConfigError(format!(
                "query {} needs both a question and ground-truth SQL",
                q.id
            )));
        }
    }
    Ok(())
}

/// Keeps only the listed ids, in registry order. An empty filter keeps everything.
pub fn select(queries: Vec<TestQuery>, ids: &[i64]) -> Result<Vec<TestQuery>, ConfigError> {
    if ids.is_empty() {
        return Ok(queries);
    }
    for id in ids {
        if !queries.iter().any(|q| q.id == *id) {
            return Err(ConfigError(format!("query id {} is not in the registry", id)));
        }
    }
    Ok(queries.into_iter().filter(|q| ids.contains(&q.id)).collect())
}

const CREATE_QUERY_TABLE: &str = "CREATE TABLE NL_SQL_TEST_QUERIES (
  query_id INTEGER PRIMARY KEY,
  nl_question TEXT NOT NULL,
  ground_truth_sql TEXT NOT NULL,
  complexity TEXT NOT NULL,
  category TEXT
)";

/// Creates the fixture table if needed and upserts every query. Returns the
/// number of rows written.
pub fn store_in_table(session: &mut dyn SqlSession, queries: &[TestQuery]) -> anyhow::Result<usize> {
    if let Err(e) = session.execute(CREATE_QUERY_TABLE) {
        if !e.is_already_exists() {
            return Err(e.into());
        }
    }
    let rows: Vec<Vec<Scalar>> = queries
        .iter()
        .map(|q| {
            vec![
                Scalar::Integer(q.id),
                Scalar::from(q.question.as_str()),
                Scalar::from(q.ground_truth_sql.as_str()),
                Scalar::from(q.complexity.as_str()),
                q.category.clone().map(Scalar::Text).unwrap_or(Scalar::Null),
            ]
        })
        .collect();
    let n = session.execute_many(
        "INSERT INTO NL_SQL_TEST_QUERIES (query_id, nl_question, ground_truth_sql, complexity, category)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(query_id) DO UPDATE SET nl_question=excluded.nl_question,
           ground_truth_sql=excluded.ground_truth_sql, complexity=excluded.complexity,
           category=excluded.category",
        &rows,
    )?;
    tracing::info!(event = "registry.stored", table = QUERY_TABLE, rows = n);
    Ok(n)
}

/// Reads the fixture table, ordered by id.
pub fn load_from_table(session: &mut dyn SqlSession) -> anyhow::Result<Vec<TestQuery>> {
    let set = session.query(
        "SELECT query_id, nl_question, ground_truth_sql, complexity, category FROM NL_SQL_TEST_QUERIES ORDER BY query_id",
        None,
    )?;
    let mut out = Vec::with_capacity(set.rows.len());
    for row in set.rows {
        let text = |i: usize| -> anyhow::Result<String> {
            match row.get(i) {
                Some(Scalar::Text(s)) => Ok(s.clone()),
                other => anyhow::bail!("{}: column {} is not text: {:?}", QUERY_TABLE, i, other),
            }
        };
        let id = match row.first() {
            Some(Scalar::Integer(id)) => *id,
            other => anyhow::bail!("{}: query_id is not an integer: {:?}", QUERY_TABLE, other),
        };
        out.push(TestQuery {
            id,
            question: text(1)?,
            ground_truth_sql: text(2)?,
            complexity: text(3)?.parse()?,
            category: match row.get(4) {
                Some(Scalar::Text(s)) => Some(s.clone()),
                _ => None,
            },
            time_limit_seconds: time_limit_for(id),
        });
    }
    Ok(out)
}
