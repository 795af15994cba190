//! Prompt composition for the generation endpoint.
//!
//! Three strategies are supported. `baseline` sends the bare question,
//! `enhanced` prepends a schema description and generation rules, and
//! `few_shot` adds worked question/SQL pairs on top of the schema.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ConfigError;
use crate::model::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    Baseline,
    #[default]
    Enhanced,
    FewShot,
}

impl PromptStrategy {
    pub const ALL: [PromptStrategy; 3] = [
        PromptStrategy::Baseline,
        PromptStrategy::Enhanced,
        PromptStrategy::FewShot,
    ];

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "baseline" => Ok(PromptStrategy::Baseline),
            "enhanced" => Ok(PromptStrategy::Enhanced),
            "few_shot" | "fewshot" => Ok(PromptStrategy::FewShot),
            other => Err(ConfigError(format!(
                "unknown prompt strategy {:?} (expected baseline|enhanced|few_shot)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStrategy::Baseline => "baseline",
            PromptStrategy::Enhanced => "enhanced",
            PromptStrategy::FewShot => "few_shot",
        }
    }

    pub fn compose(&self, question: &str, dialect: Dialect) -> String {
        match self {
            PromptStrategy::Baseline => question.to_string(),
            PromptStrategy::Enhanced => format!(
                "{schema}\nYOUR TASK: Generate {name} SQL for the following question.\nQuestion: {question}\n\nIMPORTANT GUIDELINES:\n{rules}",
                schema = SCHEMA_CONTEXT,
                name = dialect.display_name(),
                question = question,
                rules = rules(dialect),
            ),
            PromptStrategy::FewShot => format!(
                "{schema}\n{examples}\nNOW GENERATE {name} SQL FOR:\nQuestion: {question}\n\nRemember: Use the same style and best practices from the examples above.\n",
                schema = SCHEMA_CONTEXT,
                examples = few_shot_examples(dialect),
                name = dialect.display_name().to_ascii_uppercase(),
                question = question,
            ),
        }
    }
}

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const SCHEMA_CONTEXT: &str = r#"
DATABASE SCHEMA (TPC-H Benchmark):
- REGION: R_REGIONKEY, R_NAME, R_COMMENT
- NATION: N_NATIONKEY, N_NAME, N_REGIONKEY, N_COMMENT
- SUPPLIER: S_SUPPKEY, S_NAME, S_ADDRESS, S_NATIONKEY, S_PHONE, S_ACCTBAL, S_COMMENT
- PART: P_PARTKEY, P_NAME, P_MFGR, P_BRAND, P_TYPE, P_SIZE, P_CONTAINER, P_RETAILPRICE, P_COMMENT
- PARTSUPP: PS_PARTKEY, PS_SUPPKEY, PS_AVAILQTY, PS_SUPPLYCOST, PS_COMMENT
- CUSTOMER: C_CUSTKEY, C_NAME, C_ADDRESS, C_NATIONKEY, C_PHONE, C_ACCTBAL, C_MKTSEGMENT, C_COMMENT
- ORDERS: O_ORDERKEY, O_CUSTKEY, O_ORDERSTATUS, O_TOTALPRICE, O_ORDERDATE, O_ORDERPRIORITY, O_CLERK, O_SHIPPRIORITY, O_COMMENT
- LINEITEM: L_ORDERKEY, L_PARTKEY, L_SUPPKEY, L_LINENUMBER, L_QUANTITY, L_EXTENDEDPRICE, L_DISCOUNT, L_TAX, L_RETURNFLAG, L_LINESTATUS, L_SHIPDATE, L_COMMITDATE, L_RECEIPTDATE, L_SHIPINSTRUCT, L_SHIPMODE, L_COMMENT

ENTITY NAMING CONVENTIONS:
- Customer#1, Supplier#1 refer to ENTITY IDs (numbers), not names
- Always use ID columns for filtering (e.g., C_CUSTKEY, S_SUPPKEY)
- "SELECT *" means include ALL columns from that table
"#;

fn row_limit(dialect: Dialect, n: u32) -> String {
    match dialect {
        Dialect::Oracle => format!("FETCH FIRST {} ROWS ONLY", n),
        Dialect::Sqlite => format!("LIMIT {}", n),
    }
}

fn rules(dialect: Dialect) -> String {
    let limit_rule = match dialect {
        Dialect::Oracle => "5. Use FETCH FIRST X ROWS ONLY for TOP/LIMIT queries in Oracle",
        Dialect::Sqlite => "5. Use LIMIT X for TOP queries and strftime('%Y', col) for year extraction",
    };
    format!(
        "1. For entity references like \"Customer#1\", use the primary key (e.g., O_CUSTKEY = 1)\n\
         2. For discount calculations, always multiply: EXTENDEDPRICE * (1 - DISCOUNT)\n\
         3. Use SELECT * when the question implies \"all columns\"\n\
         4. Always use proper table aliases for joins\n\
         {}\n",
        limit_rule
    )
}

fn few_shot_examples(dialect: Dialect) -> String {
    format!(
        "EXAMPLE 1 - Discount Calculation:\n\
         Q: What is the total revenue with discount applied?\n\
         A: SELECT SUM(L_EXTENDEDPRICE * (1 - L_DISCOUNT)) FROM LINEITEM\n\
         Note: Discount is a multiplier, always use (1 - L_DISCOUNT) to apply it\n\
         \n\
         EXAMPLE 2 - Entity Reference:\n\
         Q: Find the top suppliers\n\
         A: SELECT * FROM SUPPLIER ORDER BY S_SUPPKEY DESC {ten}\n\
         Note: When mentioning \"Supplier#1\", use S_SUPPKEY = 1, not S_NAME\n\
         \n\
         EXAMPLE 3 - Complete Projection:\n\
         Q: Show me the top 5 expensive orders\n\
         A: SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC {five}\n\
         Note: SELECT * includes ALL columns unless explicitly limited\n",
        ten = row_limit(dialect, 10),
        five = row_limit(dialect, 5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_the_bare_question() {
        let p = PromptStrategy::Baseline.compose("How many customers are there?", Dialect::Sqlite);
        assert_eq!(p, "How many customers are there?");
    }

    #[test]
    fn enhanced_carries_schema_rules_and_question() {
        let p = PromptStrategy::Enhanced.compose("List all regions.", Dialect::Oracle);
        assert!(p.contains("DATABASE SCHEMA"));
        assert!(p.contains("Generate Oracle SQL"));
        assert!(p.contains("FETCH FIRST X ROWS ONLY"));
        assert!(p.contains("Question: List all regions."));
    }

    #[test]
    fn few_shot_examples_follow_dialect() {
        let p = PromptStrategy::FewShot.compose("q", Dialect::Sqlite);
        assert!(p.contains("LIMIT 5"));
        assert!(!p.contains("FETCH FIRST"));
        assert!(p.contains("NOW GENERATE SQLITE SQL FOR"));
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(PromptStrategy::parse("few-shot").unwrap(), PromptStrategy::FewShot);
        assert_eq!(PromptStrategy::parse(" Enhanced ").unwrap(), PromptStrategy::Enhanced);
        assert!(PromptStrategy::parse("zero").is_err());
    }
}
