//! Postgres schema for the two tables this core touches.

/// Embedded DDL, safe to run repeatedly.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS customer (
    id BIGINT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    last_contact_date TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS interaction_log (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL REFERENCES customer(id),
    note TEXT,
    type TEXT NOT NULL CHECK (type IN ('CALL', 'EMAIL', 'MEETING', 'PURCHASE', 'SUPPORT', 'OTHER')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE INDEX IF NOT EXISTS idx_interaction_log_customer_id ON interaction_log(customer_id);
";

/// Inserts customers `1..=$1` that do not exist yet.
pub(crate) const SEED_CUSTOMERS: &str = r"
INSERT INTO customer (id, name, email)
SELECT n, 'Customer ' || n, 'customer' || n || '@example.com'
FROM generate_series(1::bigint, $1::bigint) AS n
ON CONFLICT (id) DO NOTHING
";
