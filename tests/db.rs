use diesel::prelude::*;
use diesel::sql_types::Text;

mod common;

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    sql: String,
}

fn schema_object(conn: &mut SqliteConnection, kind: &str, name: &str) -> Option<SchemaObject> {
    diesel::sql_query("SELECT name, sql FROM sqlite_master WHERE type = ? AND name = ?")
        .bind::<Text, _>(kind)
        .bind::<Text, _>(name)
        .get_result::<SchemaObject>(conn)
        .optional()
        .expect("sqlite_master should be readable")
}

#[test]
fn test_migrations_create_promo_code_schema() {
    let test_db = common::TestDb::new("test_migrations_create_promo_code_schema.db");
    let mut conn = test_db.pool().get().expect("expected a connection");

    let table = schema_object(&mut conn, "table", "promo_codes").expect("promo_codes table");
    assert_eq!(table.name, "promo_codes");
    assert!(table.sql.contains("discount_value <= 10000"));

    let index = schema_object(&mut conn, "index", "idx_promo_codes_hub_code")
        .expect("unique code index");
    assert!(index.sql.contains("UNIQUE"));
    assert!(index.sql.contains("COLLATE NOCASE"));

    let trigger = schema_object(&mut conn, "trigger", "promo_codes_times_used_never_decreases")
        .expect("times_used trigger");
    assert!(trigger.sql.contains("RAISE(ABORT"));
}
